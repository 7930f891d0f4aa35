//! String passthrough and boolean parsing.

use shapeshift_core::Converter;

/// Returns the source string unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringIdentity;

impl Converter<String, String> for StringIdentity {
    fn convert(&self, source: &String) -> Option<String> {
        Some(source.clone())
    }
}

/// Parses `true` or `false`, ignoring case and surrounding whitespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct StringToBool;

impl Converter<String, bool> for StringToBool {
    fn convert(&self, source: &String) -> Option<bool> {
        let trimmed = source.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Some(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }
}
