use serde_json::Number;

/// Splits text into lowercase alphanumeric tokens, dropping single-character tokens.
///
/// Every character that is not a letter or digit acts as a separator.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .flat_map(|c| {
            let mapped: Vec<char> = if c.is_alphanumeric() {
                c.to_lowercase().collect()
            } else {
                vec![' ']
            };
            mapped
        })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

/// Formats an amount with comma thousands separators and no decimal places.
///
/// # Examples
/// - `125` -> `"125"`
/// - `1234567` -> `"1,234,567"`
/// - `-9876.6` -> `"-9,877"`
pub fn format_thousands(value: &Number) -> String {
    let digits = match (value.as_i64(), value.as_u64()) {
        (Some(v), _) => v.to_string(),
        (None, Some(v)) => v.to_string(),
        _ => format!("{:.0}", value.as_f64().unwrap_or(0.0)),
    };

    let (sign, magnitude) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };

    let mut grouped = String::with_capacity(magnitude.len() + magnitude.len() / 3);
    for (idx, ch) in magnitude.chars().enumerate() {
        if idx > 0 && (magnitude.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}", sign, grouped)
}
