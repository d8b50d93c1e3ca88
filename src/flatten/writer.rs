//! Writes extracted rows to the four relation files.

use crate::flatten::types::{Extract, Relation, Row, RowCounts};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// When rows reach the output files.
///
/// Both policies produce byte-identical files for the same sequence of
/// documents; they differ only in memory held and in how much output
/// survives an interrupted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Hold every row in memory and write each file once at the end.
    Buffered,
    /// Append each document's rows to the files as the document completes.
    PerDocument,
}

/// Writes rows to `items.dat`, `users.dat`, `bids.dat`, `categories.dat`
/// in an output directory, one file per relation.
pub struct ExtractWriter {
    policy: FlushPolicy,
    dedup_users: bool,
    files: HashMap<Relation, BufWriter<File>>,
    buffered: Extract,
    counts: RowCounts,
}

impl ExtractWriter {
    /// Create (truncating any previous run's output) the four relation
    /// files in `output_dir`.
    ///
    /// User deduplication needs the full row set in hand, so it is only
    /// available under [`FlushPolicy::Buffered`].
    pub fn create<P: AsRef<Path>>(
        output_dir: P,
        policy: FlushPolicy,
        dedup_users: bool,
    ) -> Result<Self> {
        if dedup_users && policy == FlushPolicy::PerDocument {
            anyhow::bail!("user deduplication requires buffered output");
        }

        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .context(format!("Failed to create output directory {}", output_dir.display()))?;

        let mut files = HashMap::new();
        for relation in Relation::ALL {
            let path = output_dir.join(relation.file_name());
            let file = File::create(&path)
                .context(format!("Failed to create {}", path.display()))?;
            files.insert(relation, BufWriter::new(file));
        }

        Ok(ExtractWriter {
            policy,
            dedup_users,
            files,
            buffered: Extract::new(),
            counts: RowCounts::default(),
        })
    }

    /// Take one document's rows. Under [`FlushPolicy::PerDocument`] they
    /// hit the files immediately; under [`FlushPolicy::Buffered`] they
    /// accumulate until [`finish`](Self::finish).
    pub fn write_document(&mut self, extract: Extract) -> Result<()> {
        match self.policy {
            FlushPolicy::Buffered => self.buffered.merge(extract),
            FlushPolicy::PerDocument => {
                if extract.is_empty() {
                    return Ok(());
                }
                self.counts.add(&extract);
                self.write_rows(&extract)?;
                self.flush()?;
            }
        }
        Ok(())
    }

    /// Write anything still buffered and flush all files. Returns the row
    /// counts actually written, after any dedup pass.
    pub fn finish(mut self) -> Result<RowCounts> {
        if self.policy == FlushPolicy::Buffered {
            if self.dedup_users {
                self.buffered.users = dedup_user_rows(std::mem::take(&mut self.buffered.users));
            }
            self.counts.add(&self.buffered);
            let buffered = std::mem::take(&mut self.buffered);
            self.write_rows(&buffered)?;
        }
        self.flush()?;
        Ok(self.counts)
    }

    fn write_rows(&mut self, extract: &Extract) -> Result<()> {
        for relation in Relation::ALL {
            let writer = self.files.get_mut(&relation).unwrap();
            for row in extract.rows(relation) {
                writeln!(writer, "{}", row)
                    .context(format!("Failed to write {}", relation.file_name()))?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        for writer in self.files.values_mut() {
            writer.flush().context("Failed to flush output file")?;
        }
        Ok(())
    }
}

/// Collapse repeated observations of a user into one row: the last-seen
/// observation wins, placed at the position the user first appeared.
fn dedup_user_rows(rows: Vec<Row>) -> Vec<Row> {
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<Row> = Vec::with_capacity(rows.len());

    for row in rows {
        let user_id = row.fields()[0].clone();
        match first_seen.get(&user_id) {
            Some(&slot) => out[slot] = row,
            None => {
                first_seen.insert(user_id, out.len());
                out.push(row);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn doc(item_id: &str, user: &str, rating: &str) -> Extract {
        let mut extract = Extract::new();
        extract
            .items
            .push(Row::new(vec![item_id.to_string(), "\"x\"".to_string()]));
        extract.users.push(user_row(user, rating));
        extract
    }

    fn user_row(user: &str, rating: &str) -> Row {
        Row::new(vec![
            format!("\"{user}\""),
            rating.to_string(),
            "null".to_string(),
            "null".to_string(),
        ])
    }

    fn read(dir: &Path, relation: Relation) -> String {
        fs::read_to_string(dir.join(relation.file_name())).unwrap()
    }

    #[test]
    fn test_all_four_files_exist_even_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExtractWriter::create(dir.path(), FlushPolicy::Buffered, false).unwrap();
        writer.finish().unwrap();

        for relation in Relation::ALL {
            assert_eq!(read(dir.path(), relation), "");
        }
    }

    #[test]
    fn test_create_truncates_stale_output() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("items.dat"), "stale\n").unwrap();

        let writer = ExtractWriter::create(dir.path(), FlushPolicy::Buffered, false).unwrap();
        writer.finish().unwrap();

        assert_eq!(read(dir.path(), Relation::Items), "");
    }

    #[test]
    fn test_flush_policies_produce_identical_files() {
        let docs = [doc("100", "a", "1"), doc("200", "b", "2")];

        let buffered_dir = tempfile::tempdir().unwrap();
        let mut writer =
            ExtractWriter::create(buffered_dir.path(), FlushPolicy::Buffered, false).unwrap();
        for d in &docs {
            writer.write_document(d.clone()).unwrap();
        }
        writer.finish().unwrap();

        let append_dir = tempfile::tempdir().unwrap();
        let mut writer =
            ExtractWriter::create(append_dir.path(), FlushPolicy::PerDocument, false).unwrap();
        for d in &docs {
            writer.write_document(d.clone()).unwrap();
        }
        writer.finish().unwrap();

        for relation in Relation::ALL {
            assert_eq!(
                read(buffered_dir.path(), relation),
                read(append_dir.path(), relation),
                "{} differs between flush policies",
                relation.file_name()
            );
        }
    }

    #[test]
    fn test_rows_are_newline_terminated_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer =
            ExtractWriter::create(dir.path(), FlushPolicy::PerDocument, false).unwrap();
        writer.write_document(doc("100", "a", "1")).unwrap();
        writer.write_document(doc("200", "b", "2")).unwrap();
        writer.finish().unwrap();

        assert_eq!(read(dir.path(), Relation::Items), "100|\"x\"\n200|\"x\"\n");
        assert_eq!(
            read(dir.path(), Relation::Users),
            "\"a\"|1|null|null\n\"b\"|2|null|null\n"
        );
    }

    #[test]
    fn test_dedup_keeps_last_observation_at_first_position() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ExtractWriter::create(dir.path(), FlushPolicy::Buffered, true).unwrap();

        let mut extract = Extract::new();
        extract.users.push(user_row("a", "1"));
        extract.users.push(user_row("b", "2"));
        extract.users.push(user_row("a", "9"));
        writer.write_document(extract).unwrap();

        let counts = writer.finish().unwrap();
        assert_eq!(counts.users, 2);
        assert_eq!(
            read(dir.path(), Relation::Users),
            "\"a\"|9|null|null\n\"b\"|2|null|null\n"
        );
    }

    #[test]
    fn test_dedup_is_rejected_with_per_document_flush() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ExtractWriter::create(dir.path(), FlushPolicy::PerDocument, true).is_err());
    }

    #[test]
    fn test_finish_reports_written_row_counts() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ExtractWriter::create(dir.path(), FlushPolicy::Buffered, false).unwrap();
        writer.write_document(doc("100", "a", "1")).unwrap();
        writer.write_document(doc("200", "a", "2")).unwrap();

        let counts = writer.finish().unwrap();
        assert_eq!(counts.items, 2);
        assert_eq!(counts.users, 2);
        assert_eq!(counts.bids, 0);
        assert_eq!(counts.total(), 4);
    }
}
