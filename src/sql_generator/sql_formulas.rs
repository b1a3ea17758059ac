//! SQL formula helpers
//!
//! Pure string builders shared by every Data Vault table: SELECT lists, JOIN
//! predicates, hash expressions and the record end timestamp expression.
//!
//! All helpers that take a field list reject an empty one. An empty list would
//! otherwise produce things like `ON ` or `PARTITION BY ` with no operands.

use std::sync::LazyLock;

use super::common::qualified_column;
use super::errors::FormattingError;
use crate::data_vault::constants::RECORD_START_TIMESTAMP;

/// Separator placed between the values concatenated into a hash.
pub const HASH_DELIMITER: &str = "|~~|";

/// Open-version sentinel stored in `r_timestamp_end`.
pub const END_OF_TIME_SQL: &str = "CAST('9999-12-31 00:00:00' AS TIMESTAMP)";

pub const BUSINESS_KEY_SQL_TEMPLATE: &str = "COALESCE(CAST({business_key} AS TEXT), 'dv_unknown')";

pub const CHILD_KEY_SQL_TEMPLATE: &str = "COALESCE(CAST({child_key} AS TEXT), '')";

pub const DESCRIPTIVE_FIELD_SQL_TEMPLATE: &str = "COALESCE(CAST({descriptive_field} AS TEXT), '')";

pub const HASHKEY_SQL_TEMPLATE: &str = "MD5({hashkey_expression}) AS {hashkey}";

pub const HASHDIFF_SQL_TEMPLATE: &str = "MD5({hashdiff_expression}) AS {hashdiff}";

/// End of a driving-key group's version: the load time of the next version
/// of the same group, or the end of time for the latest one.
pub static RECORD_END_TIMESTAMP_SQL_TEMPLATE: LazyLock<String> = LazyLock::new(|| {
    format!(
        "COALESCE(LEAD({start}) OVER (PARTITION BY {{key_fields}} ORDER BY {start}), {end_of_time})",
        start = RECORD_START_TIMESTAMP,
        end_of_time = END_OF_TIME_SQL
    )
});

/// Anything that renders as a column in generated SQL.
pub trait SqlField {
    fn name(&self) -> &str;
}

impl SqlField for str {
    fn name(&self) -> &str {
        self
    }
}

impl SqlField for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

impl<T: SqlField + ?Sized> SqlField for &T {
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// One SELECT-list fragment per field, `alias.name` or `name`.
///
/// # Examples
/// ```
/// use vaultgen::sql_generator::format_fields_for_select;
/// let fields = ["h_customer_hashkey", "r_timestamp"];
/// assert_eq!(
///     format_fields_for_select(&fields, Some("staging")).unwrap(),
///     vec!["staging.h_customer_hashkey", "staging.r_timestamp"]
/// );
/// ```
pub fn format_fields_for_select<F: SqlField>(
    fields: &[F],
    table_alias: Option<&str>,
) -> Result<Vec<String>, FormattingError> {
    if fields.is_empty() {
        return Err(FormattingError::empty_field_list(match table_alias {
            Some(alias) => format!("SELECT list for alias '{}'", alias),
            None => "SELECT list".to_string(),
        }));
    }

    Ok(fields
        .iter()
        .map(|field| match table_alias {
            Some(alias) => qualified_column(alias, field.name()),
            None => field.name().to_string(),
        })
        .collect())
}

/// One equality predicate per field, `table_1.name = table_2.name`.
///
/// Callers join the predicates with `" AND "`.
pub fn format_fields_for_join<F: SqlField>(
    fields: &[F],
    table_1_alias: &str,
    table_2_alias: &str,
) -> Result<Vec<String>, FormattingError> {
    if fields.is_empty() {
        return Err(FormattingError::empty_field_list(format!(
            "JOIN condition between '{}' and '{}'",
            table_1_alias, table_2_alias
        )));
    }

    Ok(fields
        .iter()
        .map(|field| {
            format!(
                "{} = {}",
                qualified_column(table_1_alias, field.name()),
                qualified_column(table_2_alias, field.name())
            )
        })
        .collect())
}

/// Render [`RECORD_END_TIMESTAMP_SQL_TEMPLATE`] partitioned by `key_fields`.
pub fn record_end_timestamp_expression(key_fields: &[String]) -> Result<String, FormattingError> {
    if key_fields.is_empty() {
        return Err(FormattingError::empty_field_list(
            "record end timestamp partition",
        ));
    }
    Ok(RECORD_END_TIMESTAMP_SQL_TEMPLATE.replace("{key_fields}", &key_fields.join(", ")))
}

/// Hashkey expression: MD5 over business keys followed by child keys.
///
/// `MD5(COALESCE(CAST(bk_1 AS TEXT), 'dv_unknown')||'|~~|'||...) AS hashkey`
pub fn hashkey_sql(
    hashkey: &str,
    business_keys: &[String],
    child_keys: &[String],
) -> Result<String, FormattingError> {
    if business_keys.is_empty() {
        return Err(FormattingError::empty_field_list(format!(
            "hashkey '{}'",
            hashkey
        )));
    }

    let parts: Vec<String> = business_keys
        .iter()
        .map(|key| BUSINESS_KEY_SQL_TEMPLATE.replace("{business_key}", key))
        .chain(
            child_keys
                .iter()
                .map(|key| CHILD_KEY_SQL_TEMPLATE.replace("{child_key}", key)),
        )
        .collect();

    Ok(HASHKEY_SQL_TEMPLATE
        .replace("{hashkey_expression}", &concat_for_hash(&parts))
        .replace("{hashkey}", hashkey))
}

/// Hashdiff expression: MD5 over the parent hashkey and descriptive fields.
pub fn hashdiff_sql(
    hashdiff: &str,
    hashkey: &str,
    descriptive_fields: &[String],
) -> String {
    let parts: Vec<String> = std::iter::once(hashkey)
        .chain(descriptive_fields.iter().map(String::as_str))
        .map(|field| DESCRIPTIVE_FIELD_SQL_TEMPLATE.replace("{descriptive_field}", field))
        .collect();

    HASHDIFF_SQL_TEMPLATE
        .replace("{hashdiff_expression}", &concat_for_hash(&parts))
        .replace("{hashdiff}", hashdiff)
}

fn concat_for_hash(parts: &[String]) -> String {
    parts.join(&format!("||'{}'||", HASH_DELIMITER))
}
