mod common;
mod errors;
pub mod sql_formulas;
pub mod template;

pub use common::{is_plain_identifier, qualified_column, quote_literal};
pub use errors::{FormattingError, TemplateError};
pub use sql_formulas::{
    format_fields_for_join, format_fields_for_select, hashdiff_sql, hashkey_sql,
    record_end_timestamp_expression, SqlField, END_OF_TIME_SQL, RECORD_END_TIMESTAMP_SQL_TEMPLATE,
};
pub use template::{
    init_template_registry, render_named_template, render_template, template_registry,
    SqlPlaceholders, TemplateRegistry, EFFECTIVITY_SATELLITE_DML, HUB_DML, LINK_DML,
    ROLE_PLAYING_HUB_DML, SATELLITE_DML, STAGING_TABLE_DDL,
};
