//! # Gavel - Auction Dump Flattening
//!
//! A library for converting nested auction dump files (JSON documents with
//! embedded sellers, bids, bidders and categories) into flat pipe-delimited
//! rows ready for bulk relational loading.
//!
//! ## Modules
//!
//! - **loader**: Read a dump file into its list of item records
//! - **flatten**: Turn item records into rows of the four relations
//!   (items, users, bids, categories) and write the `.dat` files
//! - **error**: The three failure scopes (file, item, value)
//!
//! ## Quick Start
//!
//! ### Extracting rows
//!
//! ```rust
//! use gavel::flatten::{FlattenConfig, RowExtractor};
//! use serde_json::json;
//!
//! let items = vec![json!({
//!     "ItemID": "100",
//!     "Name": "First edition",
//!     "Currently": "$12.50",
//!     "Number_of_Bids": "0",
//!     "Started": "Dec-05-01 10:00:00",
//!     "Ends": "Dec-17-01 12:00:00",
//!     "Seller": {"UserID": "s1", "Rating": "42"},
//!     "Category": ["Books"]
//! })];
//!
//! let extractor = RowExtractor::new(FlattenConfig::default());
//! let document = extractor.extract_document(&items);
//!
//! assert_eq!(document.rows.categories[0].to_string(), "100|\"Books\"");
//! assert_eq!(document.rows.counts().users, 1);
//! ```
//!
//! ### Whole files
//!
//! ```rust,no_run
//! use gavel::{flatten_path, FlattenConfig};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let document = flatten_path(Path::new("items-0.json"), FlattenConfig::default())?;
//! println!("{} items skipped", document.skipped.len());
//! # Ok(())
//! # }
//! ```

use std::path::Path;

pub mod error;
pub mod flatten;
pub mod loader;

// Re-export commonly used types for convenience
pub use error::{EncodeError, FlattenError, ItemError};
pub use flatten::{
    DocumentExtract, Extract, ExtractWriter, FlattenConfig, FlushPolicy, Relation, Row,
    RowCounts, RowExtractor, SkippedItem,
};
pub use loader::{has_json_ext, load_items};

/// Main entry point: flatten one dump file into its relation rows.
///
/// File-level failures (unreadable, malformed, no `Items` array) are the
/// `Err` case; item-level failures inside a loadable file are recorded in
/// the returned [`DocumentExtract`] alongside the rows of every item that
/// survived.
pub fn flatten_path(path: &Path, config: FlattenConfig) -> Result<DocumentExtract, FlattenError> {
    let items = loader::load_items(path)?;
    let extractor = RowExtractor::new(config);
    Ok(extractor.extract_document(&items))
}
