//! Auction flattening - turn nested auction documents into relational rows
//!
//! This module handles the conversion of one auction item record (a JSON
//! object with embedded seller, bid, bidder and category data) into rows
//! of the four flat relations: items, users, bids and categories.
//!
//! ## Field encoding
//!
//! Every emitted value goes through one of four encoding families (plain,
//! text, currency, timestamp); see [`encode::FieldKind`]. Nulls and absent
//! fields encode as a bare `null`, distinct from the empty quoted string.

pub mod encode;
pub mod extractor;
pub mod types;
pub mod writer;

pub use encode::{quote, FieldKind, COLUMN_SEPARATOR, NULL_MARKER};
pub use extractor::RowExtractor;
pub use types::{
    DocumentExtract, Extract, FlattenConfig, Relation, Row, RowCounts, SkippedItem,
};
pub use writer::{ExtractWriter, FlushPolicy};
