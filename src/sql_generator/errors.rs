use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the SQL formula helpers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FormattingError {
    #[error("Cannot render {context}: field list is empty (at least one field is required)")]
    EmptyFieldList { context: String },
}

impl FormattingError {
    pub fn empty_field_list(context: impl Into<String>) -> Self {
        FormattingError::EmptyFieldList {
            context: context.into(),
        }
    }
}

/// Errors raised while loading or rendering SQL templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("SQL template '{name}' not found (no built-in template and no override file)")]
    NotFound { name: String },

    #[error("Failed to read SQL template '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template '{template}' references placeholder '{placeholder}' which was not provided")]
    MissingPlaceholder {
        template: String,
        placeholder: String,
    },

    #[error("Template '{template}' contains invalid placeholder name '{placeholder}' (must be alphanumeric or underscore)")]
    InvalidPlaceholder {
        template: String,
        placeholder: String,
    },

    #[error("Template '{template}' has an unbalanced brace at byte {position} (use '{{{{' or '}}}}' for literal braces)")]
    UnbalancedBrace { template: String, position: usize },
}
