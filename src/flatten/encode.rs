//! Field encoding: raw scalar values to their serialized column form.
//!
//! Every value lands in one of four encoding families before a row is
//! joined with the column separator:
//!
//! - **Plain**: emitted bare. Used for integer-typed columns (item IDs,
//!   bid counts, ratings).
//! - **Text**: wrapped in double quotes, interior quotes doubled. Used for
//!   free text and user identifiers.
//! - **Currency**: `$3,453.23` stripped to `3453.23`, emitted bare.
//! - **Timestamp**: `Mon-DD-YY HH:MM:SS` normalized to
//!   `YYYY-MM-DD HH:MM:SS` (sorts chronologically as text), emitted quoted.
//!
//! Absent optional fields never reach an encoder; they are emitted as the
//! bare [`NULL_MARKER`], which is distinct from the empty quoted string.

use crate::error::EncodeError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Delimiter between fields within an output row.
pub const COLUMN_SEPARATOR: char = '|';

/// Literal emitted for an absent/None field value, always unquoted.
pub const NULL_MARKER: &str = "null";

static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]{3})-(\d{2})-(\d{2}) (\d{2}:\d{2}:\d{2})$").unwrap()
});

static DECIMAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+\.?\d*|\.\d+)$").unwrap()
});

/// Two-digit years at or above this map to 19xx, below it to 20xx
/// (the POSIX `%y` window).
const CENTURY_PIVOT: u32 = 69;

/// The encoding family a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Bare token, no quoting.
    Plain,
    /// Quoted free text with doubled interior quotes.
    Text,
    /// Currency string stripped to a bare decimal numeral.
    Currency,
    /// `Mon-DD-YY HH:MM:SS` timestamp, normalized then quoted.
    Timestamp,
}

impl FieldKind {
    /// Encode a raw scalar according to this family.
    ///
    /// `lenient_months` selects the legacy behavior for timestamps whose
    /// month abbreviation is not one of the twelve standard ones: pass the
    /// token through into the month position instead of failing.
    pub fn encode(self, raw: &str, lenient_months: bool) -> Result<String, EncodeError> {
        match self {
            FieldKind::Plain => Ok(raw.to_string()),
            FieldKind::Text => Ok(quote(raw)),
            FieldKind::Currency => normalize_currency(raw),
            FieldKind::Timestamp => {
                normalize_timestamp(raw, lenient_months).map(|dttm| quote(&dttm))
            }
        }
    }
}

/// Wrap a value in double quotes, doubling every interior quote.
///
/// Decoding (strip the outer quotes, collapse `""` back to `"`) recovers
/// the original string for any input.
pub fn quote(raw: &str) -> String {
    format!("\"{}\"", raw.replace('"', "\"\""))
}

/// Strip a currency-formatted string down to a decimal numeral:
/// `$3,453.23` becomes `3453.23`.
///
/// Empty input passes through unchanged (an absent amount is the caller's
/// null, never `0.00`). Non-empty input must strip to digits with at most
/// one `.`; anything else is rejected rather than emitted into a column
/// that downstream loads as a number. No rounding and no numeric
/// re-formatting: the result is text, already idempotent under a second
/// pass.
pub fn normalize_currency(raw: &str) -> Result<String, EncodeError> {
    if raw.is_empty() {
        return Ok(String::new());
    }

    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if DECIMAL_REGEX.is_match(&stripped) {
        Ok(stripped)
    } else {
        Err(EncodeError::Currency(raw.to_string()))
    }
}

/// Normalize `Mon-DD-YY HH:MM:SS` to `YYYY-MM-DD HH:MM:SS`.
///
/// Surrounding whitespace is trimmed first. The century for the two-digit
/// year comes from the POSIX window: `00`-`68` are 20xx, `69`-`99` are
/// 19xx. An unrecognized month abbreviation fails with
/// [`EncodeError::Month`] unless `lenient_months` is set, in which case the
/// token is passed through into the month position (the legacy behavior;
/// the value will then fail in any downstream date-typed column).
pub fn normalize_timestamp(raw: &str, lenient_months: bool) -> Result<String, EncodeError> {
    let trimmed = raw.trim();

    // Exact-length guard before the regex: Mon-DD-YY HH:MM:SS is always
    // 18 bytes.
    if trimmed.len() != 18 {
        return Err(EncodeError::Timestamp(raw.to_string()));
    }

    let caps = TIMESTAMP_REGEX
        .captures(trimmed)
        .ok_or_else(|| EncodeError::Timestamp(raw.to_string()))?;

    let month = match month_number(&caps[1]) {
        Some(number) => number,
        None if lenient_months => &caps[1],
        None => return Err(EncodeError::Month(caps[1].to_string())),
    };

    let day = &caps[2];
    let time = &caps[4];
    let year: u32 = caps[3]
        .parse()
        .map_err(|_| EncodeError::Timestamp(raw.to_string()))?;
    let century = if year >= CENTURY_PIVOT { "19" } else { "20" };

    Ok(format!("{century}{year:02}-{month}-{day} {time}"))
}

/// Map a three-letter month abbreviation to its two-digit number.
fn month_number(abbr: &str) -> Option<&'static str> {
    match abbr {
        "Jan" => Some("01"),
        "Feb" => Some("02"),
        "Mar" => Some("03"),
        "Apr" => Some("04"),
        "May" => Some("05"),
        "Jun" => Some("06"),
        "Jul" => Some("07"),
        "Aug" => Some("08"),
        "Sep" => Some("09"),
        "Oct" => Some("10"),
        "Nov" => Some("11"),
        "Dec" => Some("12"),
        _ => None,
    }
}
