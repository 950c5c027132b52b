//! Pulls a single SQL statement out of free-form model output.

use regex::Regex;
use std::sync::OnceLock;

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").unwrap())
}

fn select_keyword() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bselect\b").unwrap())
}

fn cte_start() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bwith\s+(?:recursive\s+)?\w+\s*(?:\([^)]*\)\s*)?as\s*\(").unwrap()
    })
}

fn statement_end() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\A(.*?)(;|\r?\n[ \t]*\r?\n|```|\z)").unwrap())
}

fn has_body() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\A\w+\b\s*\S").unwrap())
}

/// Returns the SQL statement embedded in `text`, or `None`.
///
/// Text without a case-insensitive `select` is rejected before any pattern
/// matching. A fenced code block holding a SELECT wins over inline prose;
/// otherwise the statement runs from the first `SELECT` (or the `WITH` of a
/// CTE in front of it) to the first `;` inclusive, blank line, fence, or
/// end of text.
pub fn sql_match(text: &str) -> Option<String> {
    if !text.to_lowercase().contains("select") {
        return None;
    }

    for cap in fenced_block().captures_iter(text) {
        let body = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
        if select_keyword().is_match(body) {
            if let Some(sql) = statement_in(body) {
                return Some(sql);
            }
        }
    }

    statement_in(text)
}

fn statement_in(text: &str) -> Option<String> {
    let select_at = select_keyword().find(text)?.start();
    let start = match cte_start().find(text) {
        Some(m) if m.start() < select_at => m.start(),
        _ => select_at,
    };

    let rest = &text[start..];
    let cap = statement_end().captures(rest)?;
    let mut sql = cap.get(1).map(|m| m.as_str()).unwrap_or_default().to_string();
    if cap.get(2).map(|m| m.as_str()) == Some(";") {
        sql.push(';');
    }

    let sql = sql.trim();
    if !has_body().is_match(sql) {
        return None;
    }
    Some(sql.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_in_prose_is_isolated() {
        let text = "Sure! Here you go: SELECT * FROM t; Hope that helps.";
        assert_eq!(sql_match(text).as_deref(), Some("SELECT * FROM t;"));
    }

    #[test]
    fn bare_statement_runs_to_end() {
        assert_eq!(sql_match("select 1").as_deref(), Some("select 1"));
        assert_eq!(sql_match("  select 1\n").as_deref(), Some("select 1"));
    }

    #[test]
    fn no_select_token_is_not_found() {
        assert_eq!(sql_match("I'm sorry, I can't answer that."), None);
        assert_eq!(sql_match(""), None);
    }

    #[test]
    fn select_inside_another_word_is_not_found() {
        assert_eq!(sql_match("I selected nothing useful."), None);
    }

    #[test]
    fn keyword_without_body_is_not_found() {
        assert_eq!(sql_match("Which column should I select"), None);
    }

    #[test]
    fn keyword_directly_followed_by_symbol_is_found() {
        assert_eq!(
            sql_match("Answer: SELECT*FROM t;").as_deref(),
            Some("SELECT*FROM t;")
        );
        assert_eq!(sql_match("select(1);").as_deref(), Some("select(1);"));
    }

    #[test]
    fn fenced_block_wins_over_prose() {
        let text = "You could select rows like this:\n```sql\nSELECT name\nFROM singer\nWHERE age > 30\n```\nThis selects singers.";
        assert_eq!(
            sql_match(text).as_deref(),
            Some("SELECT name\nFROM singer\nWHERE age > 30")
        );
    }

    #[test]
    fn blank_line_ends_statement() {
        let text = "SELECT count(*)\nFROM head\n\nThis counts the heads.";
        assert_eq!(sql_match(text).as_deref(), Some("SELECT count(*)\nFROM head"));
    }

    #[test]
    fn cte_is_kept_with_its_select() {
        let text = "Answer: WITH t AS (SELECT 1 AS x) SELECT x FROM t;";
        assert_eq!(
            sql_match(text).as_deref(),
            Some("WITH t AS (SELECT 1 AS x) SELECT x FROM t;")
        );
    }

    #[test]
    fn extraction_is_deterministic() {
        let text = "query: select a from b where c = 1; done";
        assert_eq!(sql_match(text), sql_match(text));
    }
}
