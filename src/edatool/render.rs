//! Rendering parameter values for tool command lines and scripts.

use crate::core::ParamValue;

/// Render a value in the literal syntax EDA tools expect.
///
/// Booleans become `1` or `0`. Strings are passed through, or wrapped in
/// double quotes when `quote_strings` is set; embedded quotes are not
/// escaped. Everything else uses its display form.
pub fn render_value(value: &ParamValue, quote_strings: bool) -> String {
    match value {
        ParamValue::Bool(true) => "1".to_string(),
        ParamValue::Bool(false) => "0".to_string(),
        ParamValue::Str(s) if quote_strings => format!("\"{}\"", s),
        ParamValue::Str(s) => s.clone(),
        ParamValue::Int(i) => i.to_string(),
        ParamValue::File(path) => path.display().to_string(),
    }
}
