//! Core types shared by the extraction pipeline.

use crate::error::ItemError;
use crate::flatten::encode::COLUMN_SEPARATOR;
use serde::Serialize;
use std::fmt;

/// One of the four output relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Items,
    Users,
    Bids,
    Categories,
}

impl Relation {
    /// All relations, in the order their files are created.
    pub const ALL: [Relation; 4] = [
        Relation::Items,
        Relation::Users,
        Relation::Bids,
        Relation::Categories,
    ];

    /// File name of this relation's extract on disk.
    pub fn file_name(self) -> &'static str {
        match self {
            Relation::Items => "items.dat",
            Relation::Users => "users.dat",
            Relation::Bids => "bids.dat",
            Relation::Categories => "categories.dat",
        }
    }
}

/// One output row: already-encoded fields, rendered by joining with the
/// column separator. Column count is fixed per relation regardless of which
/// optional source fields were present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row(Vec<String>);

impl Row {
    pub fn new(fields: Vec<String>) -> Self {
        Row(fields)
    }

    /// The encoded fields, in column order.
    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", COLUMN_SEPARATOR)?;
            }
            f.write_str(field)?;
        }
        Ok(())
    }
}

/// The four row sequences derived from some unit of input: one item, one
/// document, or the whole run. Passed explicitly between pipeline stages;
/// nothing in this crate accumulates rows in process-wide state.
#[derive(Debug, Default, Clone)]
pub struct Extract {
    pub items: Vec<Row>,
    pub users: Vec<Row>,
    pub bids: Vec<Row>,
    pub categories: Vec<Row>,
}

impl Extract {
    pub fn new() -> Self {
        Extract::default()
    }

    /// Move all of `other`'s rows onto the end of `self`, relation by
    /// relation, preserving order. Merging per-item bundles in source order
    /// is what keeps output rows in source order.
    pub fn merge(&mut self, other: Extract) {
        self.items.extend(other.items);
        self.users.extend(other.users);
        self.bids.extend(other.bids);
        self.categories.extend(other.categories);
    }

    /// Rows of one relation.
    pub fn rows(&self, relation: Relation) -> &[Row] {
        match relation {
            Relation::Items => &self.items,
            Relation::Users => &self.users,
            Relation::Bids => &self.bids,
            Relation::Categories => &self.categories,
        }
    }

    pub fn counts(&self) -> RowCounts {
        RowCounts {
            items: self.items.len(),
            users: self.users.len(),
            bids: self.bids.len(),
            categories: self.categories.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Relation::ALL.iter().all(|r| self.rows(*r).is_empty())
    }
}

/// Result of extracting one source document: the rows that made it, plus a
/// record of every item that did not.
#[derive(Debug, Default)]
pub struct DocumentExtract {
    pub rows: Extract,
    pub skipped: Vec<SkippedItem>,
}

/// Diagnostic record for an item whose rows were discarded.
#[derive(Debug)]
pub struct SkippedItem {
    /// Zero-based position in the document's `Items` array.
    pub index: usize,
    /// The record's `ItemID`, when it was present and scalar.
    pub item_id: Option<String>,
    pub reason: ItemError,
}

/// Configuration for the extraction pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenConfig {
    /// Pass unrecognized month abbreviations through into the month
    /// position instead of skipping the item. Off by default; matches the
    /// legacy extractors when on.
    pub lenient_dates: bool,
}

/// Per-relation row totals for a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub items: usize,
    pub users: usize,
    pub bids: usize,
    pub categories: usize,
}

impl RowCounts {
    pub fn add(&mut self, extract: &Extract) {
        self.items += extract.items.len();
        self.users += extract.users.len();
        self.bids += extract.bids.len();
        self.categories += extract.categories.len();
    }

    pub fn total(&self) -> usize {
        self.items + self.users + self.bids + self.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Row {
        Row::new(fields.iter().map(|f| f.to_string()).collect())
    }

    #[test]
    fn test_row_renders_pipe_joined() {
        let r = row(&["100", "\"Books\""]);
        assert_eq!(r.to_string(), "100|\"Books\"");
    }

    #[test]
    fn test_row_keeps_empty_fields_visible() {
        let r = row(&["100", "", "null"]);
        assert_eq!(r.to_string(), "100||null");
    }

    #[test]
    fn test_merge_preserves_order() {
        let mut first = Extract::new();
        first.users.push(row(&["\"s1\"", "5", "null", "null"]));

        let mut second = Extract::new();
        second.users.push(row(&["\"u1\"", "3", "null", "null"]));

        first.merge(second);
        assert_eq!(first.users.len(), 2);
        assert!(first.users[0].to_string().starts_with("\"s1\""));
        assert!(first.users[1].to_string().starts_with("\"u1\""));
    }

    #[test]
    fn test_counts_cover_all_relations() {
        let mut extract = Extract::new();
        extract.items.push(row(&["1"]));
        extract.categories.push(row(&["1", "\"Books\""]));
        extract.categories.push(row(&["1", "\"Rare\""]));

        let counts = extract.counts();
        assert_eq!(counts.items, 1);
        assert_eq!(counts.categories, 2);
        assert_eq!(counts.total(), 3);
        assert!(!extract.is_empty());
    }
}
