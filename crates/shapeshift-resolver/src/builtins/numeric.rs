//! String to number converters.
//!
//! Surrounding whitespace is ignored and a leading sign is accepted.
//! Anything else that `str::parse` rejects has no result.

use std::str::FromStr;

use shapeshift_core::Converter;

fn parse_trimmed<T: FromStr>(source: &str) -> Option<T> {
    source.trim().parse().ok()
}

/// Parses a `String` into an `i32`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringToInt32;

impl Converter<String, i32> for StringToInt32 {
    fn convert(&self, source: &String) -> Option<i32> {
        parse_trimmed(source)
    }
}

/// Parses a `String` into an `i64`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringToInt64;

impl Converter<String, i64> for StringToInt64 {
    fn convert(&self, source: &String) -> Option<i64> {
        parse_trimmed(source)
    }
}

/// Parses a `String` into an `f64`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringToDouble;

impl Converter<String, f64> for StringToDouble {
    fn convert(&self, source: &String) -> Option<f64> {
        parse_trimmed(source)
    }
}
