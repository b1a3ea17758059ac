//! # Data Vault Error Types
//!
//! - **Configuration errors**: a model that cannot be loaded as declared
//!   (missing metadata fields, empty driving keys, unknown parent table...)
//! - **Template errors**: a load template that cannot be fetched or rendered,
//!   tagged with the table being generated
//! - **Formatting errors**: SQL formula helpers given nothing to format
//! - **Model errors**: a YAML model that cannot be read, parsed or validated

use thiserror::Error;

use crate::sql_generator::{FormattingError, TemplateError};

#[derive(Debug, Error)]
pub enum DataVaultError {
    #[error("{table}: invalid configuration: {message}")]
    Configuration { table: String, message: String },

    #[error("{table}: failed to generate SQL: {source}")]
    Template {
        table: String,
        #[source]
        source: TemplateError,
    },

    #[error(transparent)]
    Formatting(#[from] FormattingError),

    #[error("Failed to read model file: {error}")]
    ModelRead { error: String },

    #[error("Failed to parse model: {error}")]
    ModelParse { error: String },

    #[error("Invalid model: {0}")]
    ModelValidation(#[from] validator::ValidationErrors),
}

impl DataVaultError {
    /// Create a configuration error for `table`
    pub fn configuration(table: impl Into<String>, message: impl Into<String>) -> Self {
        DataVaultError::Configuration {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Attach the table name to a template error
    pub fn template(table: impl Into<String>, source: TemplateError) -> Self {
        DataVaultError::Template {
            table: table.into(),
            source,
        }
    }
}
