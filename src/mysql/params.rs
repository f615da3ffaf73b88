use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use mysql_async::consts::ColumnType;
use mysql_async::{Column, Value};

use crate::types::RowValues;

/// Character set id of the `binary` pseudo-charset (BLOB/BINARY columns).
const BINARY_CHARSET: u16 = 63;

/// Convert a single `RowValues` into a driver value.
#[must_use]
pub fn row_value_to_mysql_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Int(*i),
        RowValues::Float(f) => Value::Double(*f),
        RowValues::Text(s) => Value::Bytes(s.as_bytes().to_vec()),
        RowValues::Bool(b) => Value::Int(i64::from(*b)),
        RowValues::Timestamp(dt) => timestamp_to_mysql(dt),
        RowValues::Null => Value::NULL,
        RowValues::Blob(bytes) => Value::Bytes(bytes.clone()),
    }
}

fn timestamp_to_mysql(dt: &NaiveDateTime) -> Value {
    Value::Date(
        u16::try_from(dt.year()).unwrap_or_default(),
        u8::try_from(dt.month()).unwrap_or_default(),
        u8::try_from(dt.day()).unwrap_or_default(),
        u8::try_from(dt.hour()).unwrap_or_default(),
        u8::try_from(dt.minute()).unwrap_or_default(),
        u8::try_from(dt.second()).unwrap_or_default(),
        dt.nanosecond() / 1_000,
    )
}

/// Build positional driver params.
#[must_use]
pub fn to_mysql_params(params: &[RowValues]) -> mysql_async::Params {
    if params.is_empty() {
        mysql_async::Params::Empty
    } else {
        mysql_async::Params::Positional(params.iter().map(row_value_to_mysql_value).collect())
    }
}

/// Convert a driver value read from `column` into `RowValues`.
///
/// Byte strings become text unless the column uses the binary character set or the bytes
/// are not valid UTF-8. Dates the chrono calendar cannot hold (e.g. `0000-00-00`) and TIME
/// values are returned as text.
#[must_use]
pub fn mysql_value_to_row_value(value: Value, column: Option<&Column>) -> RowValues {
    match value {
        Value::NULL => RowValues::Null,
        Value::Int(i) => RowValues::Int(i),
        Value::UInt(u) => match i64::try_from(u) {
            Ok(i) => RowValues::Int(i),
            Err(_) => RowValues::Text(u.to_string()),
        },
        Value::Float(f) => RowValues::Float(f64::from(f)),
        Value::Double(f) => RowValues::Float(f),
        Value::Bytes(bytes) => {
            // Text-protocol results carry every column as bytes.
            if let Some(decoded) =
                column.and_then(|c| decode_text_value(&bytes, c.column_type()))
            {
                return decoded;
            }
            let binary = column.is_some_and(|c| c.character_set() == BINARY_CHARSET);
            if binary {
                RowValues::Blob(bytes)
            } else {
                match String::from_utf8(bytes) {
                    Ok(s) => RowValues::Text(s),
                    Err(e) => RowValues::Blob(e.into_bytes()),
                }
            }
        }
        Value::Date(year, month, day, hour, minute, second, micros) => {
            NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
                .and_then(|d| {
                    d.and_hms_micro_opt(u32::from(hour), u32::from(minute), u32::from(second), micros)
                })
                .map_or_else(
                    || {
                        RowValues::Text(format!(
                            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
                        ))
                    },
                    RowValues::Timestamp,
                )
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let total_hours = u64::from(days) * 24 + u64::from(hours);
            let sign = if negative { "-" } else { "" };
            let frac = if micros > 0 {
                format!(".{micros:06}")
            } else {
                String::new()
            };
            RowValues::Text(format!(
                "{sign}{total_hours:02}:{minutes:02}:{seconds:02}{frac}"
            ))
        }
    }
}

/// Decode a text-protocol cell by its declared column type.
///
/// Returns `None` for types that stay on the generic byte path (strings, blobs, DECIMAL,
/// TIME) and for text that does not parse, such as zero dates.
#[must_use]
pub fn decode_text_value(bytes: &[u8], column_type: ColumnType) -> Option<RowValues> {
    let text = std::str::from_utf8(bytes).ok()?;
    match column_type {
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_YEAR => match text.parse::<i64>() {
            Ok(i) => Some(RowValues::Int(i)),
            Err(_) => text
                .parse::<u64>()
                .ok()
                .map(|u| RowValues::Text(u.to_string())),
        },
        ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE => {
            text.parse::<f64>().ok().map(RowValues::Float)
        }
        ColumnType::MYSQL_TYPE_DATETIME
        | ColumnType::MYSQL_TYPE_TIMESTAMP
        | ColumnType::MYSQL_TYPE_DATE => NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(RowValues::Timestamp),
        _ => None,
    }
}
