//! Small text helpers used by command handlers.

/// Formats a list for prose: `nothing`, `a`, `a and b`, `a, b, and c`.
#[must_use]
pub fn english_list(items: &[String], empty: &str) -> String {
    match items {
        [] => empty.to_string(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [head @ .., last] => format!("{}, and {last}", head.join(", ")),
    }
}

/// Returns true for `y`, `ye`, or `yes`, case-insensitively.
#[must_use]
pub fn yes_or_no(response: &str) -> bool {
    matches!(response.trim().to_lowercase().as_str(), "y" | "ye" | "yes")
}

/// Returns the singular for a count of one, the plural otherwise.
#[must_use]
pub fn pluralise<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}
