//! MySQL column type mappings.
//!
//! This module maps driver values onto [`RowValue`].
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies the column's type name into a logical category
//! 2. A category decoder extracts the value, falling back to text and then
//!    raw bytes when the preferred Rust type is not compatible
//!
//! Exact numeric and temporal values are rendered as text so nothing is lost
//! to float rounding or time zone conversion.

use crate::models::{ResultRow, RowValue};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use sqlx::mysql::types::MySqlTime;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::{Column, Decode, Row, Type, TypeInfo, ValueRef};
use tracing::warn;

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for MySQL column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    /// Single precision FLOAT
    Float,
    Double,
    Decimal,
    Date,
    Time,
    DateTime,
    Json,
    Binary,
    Text,
}

/// Classify a MySQL type name into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();
    // "BIGINT UNSIGNED" -> "bigint"
    let base = lower.split_whitespace().next().unwrap_or("");

    match base {
        "decimal" | "numeric" => TypeCategory::Decimal,
        // TINYINT(1) is reported as BOOLEAN but may hold any TINYINT value
        "bool" | "boolean" | "year" => TypeCategory::Integer,
        "float" => TypeCategory::Float,
        "double" | "real" => TypeCategory::Double,
        "date" => TypeCategory::Date,
        "time" => TypeCategory::Time,
        "datetime" | "timestamp" => TypeCategory::DateTime,
        "json" => TypeCategory::Json,
        "bit" | "geometry" => TypeCategory::Binary,
        _ if base.contains("blob") || base.contains("binary") => TypeCategory::Binary,
        _ if base.ends_with("int") || base == "integer" => TypeCategory::Integer,
        // varchar, char, text, enum, set, null, ...
        _ => TypeCategory::Text,
    }
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw DECIMAL/NUMERIC values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

// =============================================================================
// Row Conversion
// =============================================================================

/// Convert a driver row into a [`ResultRow`] keyed by column name.
pub fn row_to_result(row: &MySqlRow) -> ResultRow {
    let mut result = ResultRow::with_capacity(row.columns().len());
    for (idx, col) in row.columns().iter().enumerate() {
        let type_name = col.type_info().name();
        let value = decode_column(row, idx, categorize_type(type_name));
        result.insert(col.name(), value);
    }
    result
}

/// Column names of a row, in cursor order.
pub fn column_names(row: &MySqlRow) -> Vec<String> {
    row.columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect()
}

/// Decode one column according to its category.
pub fn decode_column(row: &MySqlRow, idx: usize, category: TypeCategory) -> RowValue {
    let decoded = match category {
        TypeCategory::Integer => decode_integer(row, idx),
        TypeCategory::Float => decode_float(row, idx),
        TypeCategory::Double => decode_double(row, idx),
        TypeCategory::Decimal => decode_decimal(row, idx),
        TypeCategory::Date => decode_date(row, idx),
        TypeCategory::Time => decode_time(row, idx),
        TypeCategory::DateTime => decode_datetime(row, idx),
        TypeCategory::Json => decode_json(row, idx),
        TypeCategory::Binary => decode_raw(row, idx),
        TypeCategory::Text => None,
    };

    decoded
        .or_else(|| decode_text(row, idx))
        .or_else(|| decode_raw(row, idx))
        .unwrap_or_else(|| {
            warn!(
                column = idx,
                category = ?category,
                "Unsupported column value, emitting null"
            );
            RowValue::Null
        })
}

// =============================================================================
// Category Decoders
// =============================================================================
//
// Each decoder returns None when the Rust type is not compatible with the
// column, so the caller can try the next representation. SQL NULL decodes as
// Some(RowValue::Null).

fn try_decode<'r, T, F>(row: &'r MySqlRow, idx: usize, convert: F) -> Option<RowValue>
where
    T: Decode<'r, sqlx::MySql> + Type<sqlx::MySql>,
    F: FnOnce(T) -> RowValue,
{
    match row.try_get::<Option<T>, _>(idx) {
        Ok(Some(v)) => Some(convert(v)),
        Ok(None) => Some(RowValue::Null),
        Err(_) => None,
    }
}

fn decode_integer(row: &MySqlRow, idx: usize) -> Option<RowValue> {
    // Try signed types
    try_decode::<i8, _>(row, idx, |v| RowValue::Integer(v.into()))
        .or_else(|| try_decode::<i16, _>(row, idx, |v| RowValue::Integer(v.into())))
        .or_else(|| try_decode::<i32, _>(row, idx, |v| RowValue::Integer(v.into())))
        .or_else(|| try_decode::<i64, _>(row, idx, RowValue::Integer))
        // Try unsigned types
        .or_else(|| try_decode::<u8, _>(row, idx, |v| RowValue::Integer(v.into())))
        .or_else(|| try_decode::<u16, _>(row, idx, |v| RowValue::Integer(v.into())))
        .or_else(|| try_decode::<u32, _>(row, idx, |v| RowValue::Integer(v.into())))
        .or_else(|| try_decode::<u64, _>(row, idx, unsigned_to_value))
}

/// BIGINT UNSIGNED values above i64::MAX keep their exact digits as text.
fn unsigned_to_value(v: u64) -> RowValue {
    i64::try_from(v)
        .map(RowValue::Integer)
        .unwrap_or_else(|_| RowValue::Text(v.to_string()))
}

fn decode_float(row: &MySqlRow, idx: usize) -> Option<RowValue> {
    try_decode::<f32, _>(row, idx, single_to_value).or_else(|| decode_double(row, idx))
}

/// Widen through the shortest decimal form so 1.1 stays 1.1.
fn single_to_value(v: f32) -> RowValue {
    RowValue::Float(v.to_string().parse().unwrap_or_else(|_| f64::from(v)))
}

fn decode_double(row: &MySqlRow, idx: usize) -> Option<RowValue> {
    try_decode::<f64, _>(row, idx, RowValue::Float)
}

fn decode_decimal(row: &MySqlRow, idx: usize) -> Option<RowValue> {
    match row.try_get::<Option<RawDecimal>, _>(idx) {
        Ok(Some(v)) => Some(RowValue::Text(v.0)),
        Ok(None) => Some(RowValue::Null),
        Err(e) => {
            tracing::debug!(error = ?e, "DECIMAL decode failed, falling back to text");
            None
        }
    }
}

fn decode_date(row: &MySqlRow, idx: usize) -> Option<RowValue> {
    match row.try_get::<Option<NaiveDate>, _>(idx) {
        Ok(Some(v)) => Some(RowValue::Text(v.format("%Y-%m-%d").to_string())),
        // Zero and partial dates are rejected by chrono or read as NULL
        _ => decode_raw_temporal(row, idx, false),
    }
}

fn decode_datetime(row: &MySqlRow, idx: usize) -> Option<RowValue> {
    match row.try_get::<Option<NaiveDateTime>, _>(idx) {
        Ok(Some(v)) => Some(RowValue::Text(format_datetime(&v))),
        _ => decode_raw_temporal(row, idx, true),
    }
}

/// `YYYY-MM-DD HH:MM:SS`, with six fraction digits when the fraction is set.
fn format_datetime(v: &NaiveDateTime) -> String {
    if v.nanosecond() == 0 {
        v.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        v.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

/// Read a DATE/DATETIME value the driver would not decode.
///
/// Text-protocol values are the server's own rendering. Binary-protocol values
/// keep their length prefix; a zero length is the zero date.
fn decode_raw_temporal(row: &MySqlRow, idx: usize, with_time: bool) -> Option<RowValue> {
    match row.try_get_unchecked::<Vec<u8>, _>(idx) {
        Ok(bytes) => Some(RowValue::Text(format_temporal_bytes(&bytes, with_time))),
        // Only a true SQL NULL has no bytes at all
        Err(_) => Some(RowValue::Null),
    }
}

fn format_temporal_bytes(bytes: &[u8], with_time: bool) -> String {
    let binary = match bytes.split_first() {
        Some((&len, rest)) if matches!(len, 0 | 4 | 7 | 11) && usize::from(len) == rest.len() => {
            rest
        }
        _ => return String::from_utf8_lossy(bytes).into_owned(),
    };

    let field = |i: usize| binary.get(i).copied().unwrap_or(0);
    let year = u16::from_le_bytes([field(0), field(1)]);
    let date = format!("{year:04}-{:02}-{:02}", field(2), field(3));
    if !with_time {
        return date;
    }

    let micros = u32::from_le_bytes([field(7), field(8), field(9), field(10)]);
    let mut out = format!("{date} {:02}:{:02}:{:02}", field(4), field(5), field(6));
    if micros != 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}

fn decode_time(row: &MySqlRow, idx: usize) -> Option<RowValue> {
    // Text protocol: keep the server's rendering, "-00:30:00" included
    if let Ok(bytes) = row.try_get_unchecked::<Vec<u8>, _>(idx) {
        if bytes.first().is_some_and(|b| *b == b'-' || b.is_ascii_digit()) {
            return Some(RowValue::Text(String::from_utf8_lossy(&bytes).into_owned()));
        }
    }
    // Full TIME range, -838:59:59 to 838:59:59
    try_decode::<MySqlTime, _>(row, idx, |v| RowValue::Text(format_time(&v)))
}

/// `[-]HH:MM:SS[.ffffff]`
fn format_time(v: &MySqlTime) -> String {
    let sign = if v.sign().is_negative() { "-" } else { "" };
    let mut out = format!(
        "{sign}{:02}:{:02}:{:02}",
        v.hours(),
        v.minutes(),
        v.seconds()
    );
    if v.microseconds() != 0 {
        out.push_str(&format!(".{:06}", v.microseconds()));
    }
    out
}

fn decode_json(row: &MySqlRow, idx: usize) -> Option<RowValue> {
    // Prefer the server's own text; fall back to re-rendering the document
    decode_text(row, idx).or_else(|| {
        try_decode::<serde_json::Value, _>(row, idx, |v| RowValue::Text(v.to_string()))
    })
}

/// Raw column bytes, whatever the declared type (BIT, GEOMETRY, ...).
fn decode_raw(row: &MySqlRow, idx: usize) -> Option<RowValue> {
    let value = row.try_get_raw(idx).ok()?;
    if value.is_null() {
        return Some(RowValue::Null);
    }
    row.try_get_unchecked::<Vec<u8>, _>(idx)
        .ok()
        .map(RowValue::Binary)
}

fn decode_text(row: &MySqlRow, idx: usize) -> Option<RowValue> {
    try_decode::<String, _>(row, idx, RowValue::Text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_type_integer() {
        assert_eq!(categorize_type("INT"), TypeCategory::Integer);
        assert_eq!(categorize_type("BIGINT"), TypeCategory::Integer);
        assert_eq!(categorize_type("BIGINT UNSIGNED"), TypeCategory::Integer);
        assert_eq!(categorize_type("TINYINT"), TypeCategory::Integer);
        assert_eq!(categorize_type("MEDIUMINT"), TypeCategory::Integer);
        assert_eq!(categorize_type("YEAR"), TypeCategory::Integer);
    }

    #[test]
    fn test_categorize_type_decimal_and_float() {
        assert_eq!(categorize_type("DECIMAL"), TypeCategory::Decimal);
        assert_eq!(categorize_type("NUMERIC"), TypeCategory::Decimal);
        assert_eq!(categorize_type("FLOAT"), TypeCategory::Float);
        assert_eq!(categorize_type("DOUBLE"), TypeCategory::Double);
    }

    #[test]
    fn test_categorize_type_boolean_keeps_integer_value() {
        // TINYINT(1) may hold 2 or -1
        assert_eq!(categorize_type("BOOLEAN"), TypeCategory::Integer);
    }

    #[test]
    fn test_categorize_type_temporal() {
        assert_eq!(categorize_type("DATE"), TypeCategory::Date);
        assert_eq!(categorize_type("TIME"), TypeCategory::Time);
        assert_eq!(categorize_type("DATETIME"), TypeCategory::DateTime);
        assert_eq!(categorize_type("TIMESTAMP"), TypeCategory::DateTime);
    }

    #[test]
    fn test_categorize_type_binary() {
        assert_eq!(categorize_type("BLOB"), TypeCategory::Binary);
        assert_eq!(categorize_type("LONGBLOB"), TypeCategory::Binary);
        assert_eq!(categorize_type("VARBINARY"), TypeCategory::Binary);
        assert_eq!(categorize_type("BINARY"), TypeCategory::Binary);
        assert_eq!(categorize_type("BIT"), TypeCategory::Binary);
        assert_eq!(categorize_type("GEOMETRY"), TypeCategory::Binary);
    }

    #[test]
    fn test_categorize_type_text() {
        assert_eq!(categorize_type("VARCHAR"), TypeCategory::Text);
        assert_eq!(categorize_type("TEXT"), TypeCategory::Text);
        assert_eq!(categorize_type("ENUM"), TypeCategory::Text);
        assert_eq!(categorize_type("NULL"), TypeCategory::Text);
        assert_eq!(categorize_type("JSON"), TypeCategory::Json);
    }

    #[test]
    fn test_categorize_type_is_case_insensitive() {
        assert_eq!(categorize_type("varchar"), TypeCategory::Text);
        assert_eq!(categorize_type("Int"), TypeCategory::Integer);
    }

    #[test]
    fn test_unsigned_overflow_becomes_text() {
        assert_eq!(unsigned_to_value(42), RowValue::Integer(42));
        assert_eq!(
            unsigned_to_value(u64::MAX),
            RowValue::Text("18446744073709551615".to_string())
        );
    }

    #[test]
    fn test_single_precision_keeps_shortest_form() {
        assert_eq!(single_to_value(1.1), RowValue::Float(1.1));
        assert_eq!(single_to_value(-0.5), RowValue::Float(-0.5));
    }

    #[test]
    fn test_format_time_full_range() {
        use sqlx::mysql::types::MySqlTimeSign;

        let max = MySqlTime::new(MySqlTimeSign::Positive, 838, 59, 59, 0).unwrap();
        assert_eq!(format_time(&max), "838:59:59");

        let negative = MySqlTime::new(MySqlTimeSign::Negative, 1, 0, 0, 0).unwrap();
        assert_eq!(format_time(&negative), "-01:00:00");

        let fraction = MySqlTime::new(MySqlTimeSign::Positive, 7, 5, 3, 120).unwrap();
        assert_eq!(format_time(&fraction), "07:05:03.000120");
    }

    #[test]
    fn test_format_datetime_fraction() {
        let whole = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(format_datetime(&whole), "2024-01-31 12:00:00");

        let fraction = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_micro_opt(12, 0, 12, 120_000)
            .unwrap();
        assert_eq!(format_datetime(&fraction), "2024-01-31 12:00:12.120000");
    }

    #[test]
    fn test_zero_dates_from_binary_protocol() {
        assert_eq!(format_temporal_bytes(&[0], false), "0000-00-00");
        assert_eq!(format_temporal_bytes(&[0], true), "0000-00-00 00:00:00");
    }

    #[test]
    fn test_partial_dates_from_binary_protocol() {
        // 2024-00-15
        let date = [4, 0xE8, 0x07, 0, 15];
        assert_eq!(format_temporal_bytes(&date, false), "2024-00-15");

        // 2024-02-00 10:20:30.000005
        let datetime = [11, 0xE8, 0x07, 2, 0, 10, 20, 30, 5, 0, 0, 0];
        assert_eq!(
            format_temporal_bytes(&datetime, true),
            "2024-02-00 10:20:30.000005"
        );
    }

    #[test]
    fn test_text_protocol_temporal_passes_through() {
        assert_eq!(format_temporal_bytes(b"0000-00-00", false), "0000-00-00");
        assert_eq!(
            format_temporal_bytes(b"0000-00-00 00:00:00", true),
            "0000-00-00 00:00:00"
        );
    }
}
