//! Cleans generated text before it reaches the SQL buffer.

const FENCE: &str = "```";

/// Strips markdown code fences from a model response.
///
/// The text is trimmed, an opening fence with or without a language tag is
/// dropped together with its tag, a closing fence is dropped, and any other
/// fence marker left in the text is removed. The SQL itself is not checked.
pub fn sanitize_sql(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        text = strip_language_tag(rest);
    }
    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }

    text.replace(FENCE, "").trim().to_string()
}

/// Removes the tag that may follow an opening fence (` ```sql `).
fn strip_language_tag(after_fence: &str) -> &str {
    match after_fence.split_once('\n') {
        Some((line, rest)) if line.trim().is_empty() || is_tag(line.trim()) => rest,
        None if is_tag(after_fence.trim()) => "",
        _ => strip_inline_tag(after_fence),
    }
}

/// Single-line form: ```` ```sql SELECT 1``` ````.
fn strip_inline_tag(after_fence: &str) -> &str {
    let Some((word, rest)) = after_fence.split_once(char::is_whitespace) else {
        return after_fence;
    };
    if matches!(word.to_ascii_lowercase().as_str(), "sql" | "mysql") {
        rest
    } else {
        after_fence
    }
}

/// Statement keywords that may start a fence body on its own line.
const KEYWORDS: [&str; 8] = [
    "select", "with", "show", "insert", "update", "delete", "begin", "commit",
];

fn is_tag(word: &str) -> bool {
    !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-'))
        && !KEYWORDS.contains(&word.to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fenced_with_tag() {
        assert_eq!(
            sanitize_sql("```sql\nSELECT COUNT(*) FROM users;\n```"),
            "SELECT COUNT(*) FROM users;"
        );
    }

    #[test]
    fn test_fenced_without_tag() {
        assert_eq!(sanitize_sql("```\nSELECT 1;\n```"), "SELECT 1;");
    }

    #[test]
    fn test_other_tags() {
        assert_eq!(sanitize_sql("```mysql\nSELECT 1;\n```"), "SELECT 1;");
        assert_eq!(sanitize_sql("```SQL\nSELECT 1;\n```"), "SELECT 1;");
    }

    #[test]
    fn test_single_line_fence() {
        assert_eq!(sanitize_sql("```sql SELECT 1;```"), "SELECT 1;");
        assert_eq!(sanitize_sql("```SELECT 1;```"), "SELECT 1;");
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_eq!(
            sanitize_sql("  \n```sql\n  SELECT *\n  FROM users;\n```\n\n"),
            "SELECT *\n  FROM users;"
        );
    }

    #[test]
    fn test_plain_sql_untouched() {
        assert_eq!(sanitize_sql("SELECT 1;"), "SELECT 1;");
        assert_eq!(sanitize_sql("  DELETE FROM t  "), "DELETE FROM t");
    }

    #[test]
    fn test_no_residual_fence() {
        let cleaned = sanitize_sql("Here you go:\n```sql\nSELECT 1;\n```\nDone.");
        assert!(!cleaned.contains("```"));
        assert!(cleaned.contains("SELECT 1;"));
    }

    #[test]
    fn test_multi_line_body_kept() {
        let raw = "```sql\nSELECT u.name\nFROM users u\nWHERE u.id = 1;\n```";
        assert_eq!(
            sanitize_sql(raw),
            "SELECT u.name\nFROM users u\nWHERE u.id = 1;"
        );
    }

    #[test]
    fn test_keyword_on_fence_line_is_not_a_tag() {
        assert_eq!(sanitize_sql("```SELECT\n*\nFROM t\n```"), "SELECT\n*\nFROM t");
    }

    #[test]
    fn test_only_fences_is_empty() {
        assert_eq!(sanitize_sql("```sql\n```"), "");
        assert_eq!(sanitize_sql("```"), "");
        assert_eq!(sanitize_sql(""), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "```sql\nSELECT 1;\n```",
            "```\nSELECT 1;\n```",
            "SELECT 1;",
            "```sql SELECT 1;```",
            "text ```sql\nSELECT 1;\n``` text",
            "   ",
        ];
        for input in inputs {
            let once = sanitize_sql(input);
            assert_eq!(sanitize_sql(&once), once, "input: {input:?}");
        }
    }
}
