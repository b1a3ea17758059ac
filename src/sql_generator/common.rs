//! Common utilities for SQL generation

use std::sync::LazyLock;

use regex::Regex;

static PLAIN_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_]*$").expect("identifier pattern is valid")
});

/// Check whether a name can be spliced into generated SQL without quoting.
///
/// Data Vault names are lower-cased on construction, so only lower-case
/// letters, digits and underscores are accepted.
///
/// # Examples
/// ```
/// use vaultgen::sql_generator::is_plain_identifier;
/// assert!(is_plain_identifier("h_customer_hashkey"));
/// assert!(!is_plain_identifier("customer id"));
/// assert!(!is_plain_identifier("1st_key"));
/// ```
pub fn is_plain_identifier(name: &str) -> bool {
    PLAIN_IDENTIFIER.is_match(name)
}

/// Format a qualified column reference: table_alias.column_name
///
/// # Examples
/// ```
/// use vaultgen::sql_generator::qualified_column;
/// assert_eq!(qualified_column("staging", "customer_id"), "staging.customer_id");
/// ```
pub fn qualified_column(table_alias: &str, column_name: &str) -> String {
    format!("{}.{}", table_alias, column_name)
}

/// Render a value as a SQL string literal.
///
/// Single quotes are doubled, as in standard SQL.
///
/// # Examples
/// ```
/// use vaultgen::sql_generator::quote_literal;
/// assert_eq!(quote_literal("orders"), "'orders'");
/// assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
/// ```
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
