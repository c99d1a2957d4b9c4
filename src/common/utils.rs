/// Splits a comma-separated variable into its elements.
///
/// An absent or empty value yields no elements. Elements are not trimmed, so a
/// trailing comma produces a trailing empty string.
pub fn parse_comma_list(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(value) if !value.is_empty() => value.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}
