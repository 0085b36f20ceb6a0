//! Text helpers for free-form definition fields

/// Normalize a multi-line description.
///
/// Blank and whitespace-only lines are removed and the remaining lines are
/// trimmed at both ends. Lines are joined back with `\n`.
pub fn normalize_description(input: &str) -> String {
    input
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_are_removed_and_lines_trimmed() {
        let raw = "\n    Current price of gold.\n\t \n   Updated hourly.   \r\n\n";
        assert_eq!(
            normalize_description(raw),
            "Current price of gold.\nUpdated hourly."
        );
    }

    #[test]
    fn test_whitespace_only_description_becomes_empty() {
        assert_eq!(normalize_description("  \n\t\n "), "");
        assert_eq!(normalize_description(""), "");
    }

    #[test]
    fn test_single_line_is_trimmed() {
        assert_eq!(normalize_description("  Current CPU usage.  "), "Current CPU usage.");
    }
}
