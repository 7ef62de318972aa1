//! Read-only query validation
//!
//! Two policies are available:
//!
//! - [`ValidationPolicy::Denylist`] (default): a textual scan for mutation
//!   keywords. It does not parse SQL, so a keyword inside a string literal,
//!   comment or identifier is rejected too.
//! - [`ValidationPolicy::Strict`]: the denylist scan, then a parse that
//!   requires exactly one statement and that statement to be a read query.

use serde::Deserialize;
use sqlparser::ast::{SetExpr, Statement};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

/// Keywords that mark a query as mutating, matched as lower-case substrings
pub const DENIED_KEYWORDS: [&str; 7] = [
    "insert", "update", "delete", "drop", "create", "alter", "truncate",
];

/// Reason given for every denylist rejection
pub const READ_ONLY_REASON: &str = "only read-only statements are permitted";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    #[default]
    Denylist,
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The query may run; carries the original text unchanged
    Accepted(String),
    Rejected(String),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted(_))
    }
}

/// Classify `query` with the denylist policy
pub fn validate(query: &str) -> ValidationOutcome {
    let lowered = query.to_lowercase();
    match DENIED_KEYWORDS.iter().find(|kw| lowered.contains(*kw)) {
        Some(keyword) => {
            tracing::debug!(keyword, "Query matched denylist");
            ValidationOutcome::Rejected(READ_ONLY_REASON.to_string())
        }
        None => ValidationOutcome::Accepted(query.to_string()),
    }
}

/// Classify `query` under `policy`
pub fn validate_with(policy: ValidationPolicy, query: &str) -> ValidationOutcome {
    let outcome = validate(query);
    if policy == ValidationPolicy::Denylist || !outcome.is_accepted() {
        return outcome;
    }

    match classify_statements(query) {
        Ok(()) => outcome,
        Err(reason) => ValidationOutcome::Rejected(reason),
    }
}

fn classify_statements(query: &str) -> Result<(), String> {
    let statements = Parser::parse_sql(&SQLiteDialect {}, query)
        .map_err(|e| format!("query could not be parsed: {}", e))?;

    match statements.as_slice() {
        [] => Err("query is empty".to_string()),
        [Statement::Query(query)] if is_read_body(&query.body) => Ok(()),
        [_] => Err(READ_ONLY_REASON.to_string()),
        _ => Err("only a single statement is permitted".to_string()),
    }
}

fn is_read_body(body: &SetExpr) -> bool {
    match body {
        SetExpr::Select(_) | SetExpr::Values(_) => true,
        SetExpr::Query(inner) => is_read_body(&inner.body),
        SetExpr::SetOperation { left, right, .. } => is_read_body(left) && is_read_body(right),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(outcome: ValidationOutcome) -> String {
        match outcome {
            ValidationOutcome::Rejected(reason) => reason,
            ValidationOutcome::Accepted(q) => panic!("expected rejection, accepted {:?}", q),
        }
    }

    #[test]
    fn test_every_denied_keyword_rejected() {
        for keyword in DENIED_KEYWORDS {
            let query = format!("{} something", keyword.to_uppercase());
            assert_eq!(rejected(validate(&query)), READ_ONLY_REASON);
        }
    }

    #[test]
    fn test_keyword_inside_literal_rejected() {
        let outcome = validate("SELECT * FROM t WHERE name = 'update me'");
        assert!(!outcome.is_accepted());
    }

    #[test]
    fn test_keyword_inside_comment_or_identifier_rejected() {
        assert!(!validate("SELECT 1 -- drop everything").is_accepted());
        assert!(!validate("SELECT created_at FROM t").is_accepted());
    }

    #[test]
    fn test_read_query_accepted_verbatim() {
        let query = "SELECT Name, Salary FROM Employees WHERE department = '工程部'";
        assert_eq!(validate(query), ValidationOutcome::Accepted(query.to_string()));
    }

    #[test]
    fn test_denylist_policy_allows_batches() {
        let outcome = validate_with(ValidationPolicy::Denylist, "SELECT 1; SELECT 2");
        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_strict_accepts_reads() {
        for query in [
            "SELECT * FROM employees",
            "select name from employees where salary > 60000;",
            "WITH senior AS (SELECT * FROM employees) SELECT name FROM senior",
            "SELECT id FROM employees UNION SELECT id FROM departments",
        ] {
            assert!(
                validate_with(ValidationPolicy::Strict, query).is_accepted(),
                "{}",
                query
            );
        }
    }

    #[test]
    fn test_strict_rejects_multiple_statements() {
        let reason = rejected(validate_with(
            ValidationPolicy::Strict,
            "SELECT 1; SELECT 2",
        ));
        assert_eq!(reason, "only a single statement is permitted");
    }

    #[test]
    fn test_strict_rejects_non_query_statements() {
        let reason = rejected(validate_with(
            ValidationPolicy::Strict,
            "EXPLAIN SELECT * FROM employees",
        ));
        assert_eq!(reason, READ_ONLY_REASON);
    }

    #[test]
    fn test_strict_rejects_unparseable() {
        let reason = rejected(validate_with(ValidationPolicy::Strict, "SELEC nonsense"));
        assert!(reason.starts_with("query could not be parsed"));
    }

    #[test]
    fn test_strict_still_applies_denylist() {
        let reason = rejected(validate_with(
            ValidationPolicy::Strict,
            "SELECT * FROM t WHERE note = 'delete'",
        ));
        assert_eq!(reason, READ_ONLY_REASON);
    }
}
