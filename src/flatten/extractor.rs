//! Row extraction: one auction item record to rows of the four relations.
//!
//! Each item contributes exactly one `items` row, one `users` observation
//! for its seller, one `users` observation per bidder, one `bids` row per
//! bid, and one `categories` row per category membership. Emission is
//! atomic per item: a record that fails validation contributes nothing at
//! all, and the failure never disturbs rows extracted from its neighbors.

use crate::error::ItemError;
use crate::flatten::encode::{quote, FieldKind, NULL_MARKER};
use crate::flatten::types::{DocumentExtract, Extract, FlattenConfig, Row, SkippedItem};
use log::warn;
use serde_json::{Map, Value};

/// Whether an absent/null field is an error or encodes as the null marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Need {
    Required,
    Optional,
}

/// The first nine columns of the `items` relation, in output order.
/// `SellerID` comes last and is read from the `Seller` sub-record.
const ITEM_COLUMNS: &[(&str, FieldKind, Need)] = &[
    ("ItemID", FieldKind::Plain, Need::Required),
    ("Name", FieldKind::Text, Need::Required),
    ("Description", FieldKind::Text, Need::Optional),
    ("Currently", FieldKind::Currency, Need::Required),
    ("First_Bid", FieldKind::Currency, Need::Optional),
    ("Buy_Price", FieldKind::Currency, Need::Optional),
    ("Number_of_Bids", FieldKind::Plain, Need::Required),
    ("Started", FieldKind::Timestamp, Need::Required),
    ("Ends", FieldKind::Timestamp, Need::Required),
];

/// The core extractor: walks item records and derives relation rows.
pub struct RowExtractor {
    config: FlattenConfig,
}

impl RowExtractor {
    pub fn new(config: FlattenConfig) -> Self {
        RowExtractor { config }
    }

    /// Extract every item of one document, in source order.
    ///
    /// Item-level failures skip that item (logged at `warn`, recorded in
    /// the result) while every other item's rows are kept.
    pub fn extract_document(&self, items: &[Value]) -> DocumentExtract {
        let mut document = DocumentExtract::default();

        for (index, value) in items.iter().enumerate() {
            let outcome = match value.as_object() {
                Some(record) => self.extract_item(record),
                None => Err(ItemError::NotAnObject),
            };

            match outcome {
                Ok(extract) => document.rows.merge(extract),
                Err(reason) => {
                    let item_id = value
                        .as_object()
                        .and_then(|record| record.get("ItemID"))
                        .and_then(scalar_to_string);
                    match &item_id {
                        Some(id) => warn!("skipping item {index} (ItemID {id}): {reason}"),
                        None => warn!("skipping item {index}: {reason}"),
                    }
                    document.skipped.push(SkippedItem {
                        index,
                        item_id,
                        reason,
                    });
                }
            }
        }

        document
    }

    /// Extract one item record into its complete row bundle.
    pub fn extract_item(&self, record: &Map<String, Value>) -> Result<Extract, ItemError> {
        let mut out = Extract::new();

        // ItemID also keys this item's bids and categories rows.
        let item_id = self.field(record, "ItemID", FieldKind::Plain, Need::Required)?;
        let seller = sub_object(record, "Seller")?;
        let seller_id = self
            .field(seller, "UserID", FieldKind::Text, Need::Required)
            .map_err(|e| qualify(e, "Seller"))?;

        // items row, fixed ten-column order.
        let mut fields = Vec::with_capacity(ITEM_COLUMNS.len() + 1);
        for &(key, kind, need) in ITEM_COLUMNS {
            fields.push(self.field(record, key, kind, need)?);
        }
        fields.push(seller_id.clone());
        out.items.push(Row::new(fields));

        // One seller observation per item. Location/Country may live on the
        // Seller sub-record or at the item level depending on the source
        // variant; the sub-record wins when both are present.
        out.users.push(
            self.user_row(seller, seller_id, Some(record))
                .map_err(|e| qualify(e, "Seller"))?,
        );

        // Zero categories rows for an absent, null, or empty list.
        if let Some(categories) = collection(record, "Category")? {
            for value in categories {
                let name = scalar_to_string(value)
                    .ok_or_else(|| ItemError::NotScalar("Category".to_string()))?;
                out.categories
                    .push(Row::new(vec![item_id.clone(), quote(&name)]));
            }
        }

        // One bids row plus one bidder observation per bid, in source
        // order. Presence of the Bids field decides; Number_of_Bids is not
        // cross-checked here.
        if let Some(bids) = collection(record, "Bids")? {
            for (i, wrapper) in bids.iter().enumerate() {
                let wrapper = wrapper
                    .as_object()
                    .ok_or_else(|| ItemError::ExpectedObject(format!("Bids[{i}]")))?;
                let bid =
                    sub_object(wrapper, "Bid").map_err(|e| qualify(e, &format!("Bids[{i}]")))?;
                let bidder = sub_object(bid, "Bidder")
                    .map_err(|e| qualify(e, &format!("Bids[{i}].Bid")))?;

                let bidder_id = self
                    .field(bidder, "UserID", FieldKind::Text, Need::Required)
                    .map_err(|e| qualify(e, &format!("Bids[{i}].Bid.Bidder")))?;
                let amount = self
                    .field(bid, "Amount", FieldKind::Currency, Need::Required)
                    .map_err(|e| qualify(e, &format!("Bids[{i}].Bid")))?;
                let time = self
                    .field(bid, "Time", FieldKind::Timestamp, Need::Required)
                    .map_err(|e| qualify(e, &format!("Bids[{i}].Bid")))?;

                out.bids.push(Row::new(vec![
                    item_id.clone(),
                    bidder_id.clone(),
                    amount,
                    time,
                ]));
                out.users.push(
                    self.user_row(bidder, bidder_id, None)
                        .map_err(|e| qualify(e, &format!("Bids[{i}].Bid.Bidder")))?,
                );
            }
        }

        Ok(out)
    }

    /// Build one users-relation observation: `UserID | Rating | Location |
    /// Country`. `fallback` supplies item-level Location/Country for seller
    /// rows; bidder rows carry those keys on the bidder record or not at
    /// all.
    fn user_row(
        &self,
        user: &Map<String, Value>,
        user_id: String,
        fallback: Option<&Map<String, Value>>,
    ) -> Result<Row, ItemError> {
        let rating = self.field(user, "Rating", FieldKind::Plain, Need::Required)?;
        let location = self.located_field(user, fallback, "Location")?;
        let country = self.located_field(user, fallback, "Country")?;
        Ok(Row::new(vec![user_id, rating, location, country]))
    }

    /// Resolve a nullable user field from the sub-record, falling back to
    /// the enclosing item record when the sub-record does not carry it.
    fn located_field(
        &self,
        user: &Map<String, Value>,
        fallback: Option<&Map<String, Value>>,
        key: &str,
    ) -> Result<String, ItemError> {
        let source = if present(user, key) {
            Some(user)
        } else if fallback.map_or(false, |record| present(record, key)) {
            fallback
        } else {
            None
        };

        match source {
            Some(map) => self.field(map, key, FieldKind::Text, Need::Optional),
            None => Ok(NULL_MARKER.to_string()),
        }
    }

    /// Encode one scalar field of `record`. Absent and null are the same:
    /// the null marker for optional fields, an error for required ones.
    fn field(
        &self,
        record: &Map<String, Value>,
        key: &str,
        kind: FieldKind,
        need: Need,
    ) -> Result<String, ItemError> {
        let raw = match record.get(key) {
            None | Some(Value::Null) => {
                return match need {
                    Need::Required => Err(ItemError::MissingField(key.to_string())),
                    Need::Optional => Ok(NULL_MARKER.to_string()),
                };
            }
            Some(value) => {
                scalar_to_string(value).ok_or_else(|| ItemError::NotScalar(key.to_string()))?
            }
        };

        kind.encode(&raw, self.config.lenient_dates)
            .map_err(|source| ItemError::value(key, source))
    }
}

/// String form of a scalar JSON value. The source data is all strings;
/// numbers and booleans are tolerated via their display form.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// A required nested record.
fn sub_object<'a>(
    record: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Map<String, Value>, ItemError> {
    match record.get(key) {
        None | Some(Value::Null) => Err(ItemError::MissingField(key.to_string())),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(ItemError::ExpectedObject(key.to_string())),
    }
}

/// A present, non-null sequence field, or `None` when absent/null.
fn collection<'a>(
    record: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a [Value]>, ItemError> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(values)) => Ok(Some(values)),
        Some(_) => Err(ItemError::ExpectedArray(key.to_string())),
    }
}

fn present(record: &Map<String, Value>, key: &str) -> bool {
    record.get(key).map_or(false, |value| !value.is_null())
}

/// Prefix a field path onto an error raised inside a sub-record.
fn qualify(err: ItemError, prefix: &str) -> ItemError {
    match err {
        ItemError::MissingField(field) => ItemError::MissingField(format!("{prefix}.{field}")),
        ItemError::NotScalar(field) => ItemError::NotScalar(format!("{prefix}.{field}")),
        ItemError::ExpectedObject(field) => ItemError::ExpectedObject(format!("{prefix}.{field}")),
        ItemError::ExpectedArray(field) => ItemError::ExpectedArray(format!("{prefix}.{field}")),
        ItemError::Value { field, source } => ItemError::Value {
            field: format!("{prefix}.{field}"),
            source,
        },
        other => other,
    }
}
