//! Culture-invariant parsing of raw parameter text.
//!
//! These functions are shared by strict sources and by overload binding when a
//! text value is coerced into a declared parameter type. None of them consult
//! the process locale.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::value::{Value, ValueKind};

/// Parses `true`/`false`, ignoring ASCII case and surrounding whitespace.
pub fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parses a signed decimal integer. Whitespace around the number is allowed.
pub fn parse_int(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}

/// Parses a float using `.` as decimal separator, with optional exponent.
pub fn parse_double(s: &str) -> Option<f64> {
    s.trim().parse().ok()
}

/// Parses a timestamp.
///
/// Accepted forms, tried in order:
///
/// | Form | Example |
/// |------|---------|
/// | RFC 3339 | `2024-03-01T12:30:00+02:00` |
/// | date and time, space separated | `2024-03-01 12:30:00` |
/// | date and time, `T` separated | `2024-03-01T12:30:00` |
/// | date only | `2024-03-01` |
///
/// Forms without an offset are taken as UTC.
pub fn parse_datetime(s: &str) -> Option<OffsetDateTime> {
    let s = s.trim();
    if let Ok(t) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(t);
    }
    if let Ok(t) = PrimitiveDateTime::parse(
        s,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Some(t.assume_utc());
    }
    if let Ok(t) = PrimitiveDateTime::parse(
        s,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(t.assume_utc());
    }
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}

/// Splits a comma separated list, trimming items and dropping empty ones.
pub fn parse_string_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Parses `s` as a value of `kind`.
///
/// Strings and string lists always succeed; the other kinds return `None`
/// when the text does not parse.
pub fn parse_as(s: &str, kind: ValueKind) -> Option<Value> {
    match kind {
        ValueKind::String => Some(Value::String(s.to_string())),
        ValueKind::Bool => parse_bool(s).map(Value::Bool),
        ValueKind::Int => parse_int(s).map(Value::Int),
        ValueKind::Double => parse_double(s).map(Value::Double),
        ValueKind::DateTime => parse_datetime(s).map(Value::DateTime),
        ValueKind::StringList => Some(Value::StringList(parse_string_list(s))),
    }
}
