use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use validator::{Validate, ValidationError};

pub const DEFAULT_STATEMENT_SEPARATOR: &str = ";\n\n";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Generator configuration with validation
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory whose SQL files override the built-in templates
    #[validate(custom(function = "validate_template_dir"))]
    pub template_dir: Option<PathBuf>,

    /// File receiving the generated SQL (stdout when unset)
    pub output: Option<PathBuf>,

    /// Text placed after every generated statement
    #[validate(length(min = 1, message = "Statement separator cannot be empty"))]
    pub statement_separator: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            template_dir: None,
            output: None,
            statement_separator: DEFAULT_STATEMENT_SEPARATOR.to_string(),
        }
    }
}

fn validate_template_dir(dir: &PathBuf) -> Result<(), ValidationError> {
    if dir.is_dir() {
        Ok(())
    } else {
        let mut error = ValidationError::new("template_dir");
        error.message = Some(format!("Template directory {} does not exist", dir.display()).into());
        Err(error)
    }
}

impl GeneratorConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            template_dir: env::var("VAULTGEN_TEMPLATE_DIR").ok().map(PathBuf::from),
            output: env::var("VAULTGEN_OUTPUT").ok().map(PathBuf::from),
            statement_separator: parse_env_var(
                "VAULTGEN_STATEMENT_SEPARATOR",
                DEFAULT_STATEMENT_SEPARATOR,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from CLI arguments with validation
    pub fn from_cli(cli: CliConfig) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.merge(cli)?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Overlay the values given on the command line, then validate
    pub fn merge(&mut self, cli: CliConfig) -> Result<(), ConfigError> {
        if let Some(template_dir) = cli.template_dir {
            self.template_dir = Some(template_dir);
        }
        if let Some(output) = cli.output {
            self.output = Some(output);
        }
        if let Some(separator) = cli.statement_separator {
            self.statement_separator = separator;
        }

        self.validate()?;
        Ok(())
    }

    /// Join statements into one script, each followed by the separator
    pub fn join_statements<S: AsRef<str>>(&self, statements: &[S]) -> String {
        statements
            .iter()
            .map(|statement| format!("{}{}", statement.as_ref(), self.statement_separator))
            .collect()
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub template_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub statement_separator: Option<String>,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
