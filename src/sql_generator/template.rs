//! SQL template loading and named placeholder substitution
//!
//! Templates are plain SQL files with `{placeholder}` markers. `{{` and `}}`
//! render literal braces. Every marker must have a value in the placeholder
//! map; values that no marker references are ignored.
//!
//! Built-in templates are compiled into the binary. A directory can be
//! registered once at startup to override them file by file.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};

use super::errors::TemplateError;

/// Placeholder name to SQL fragment.
pub type SqlPlaceholders = BTreeMap<String, String>;

pub const STAGING_TABLE_DDL: &str = "staging_table_ddl.sql";
pub const HUB_DML: &str = "hub_dml.sql";
pub const ROLE_PLAYING_HUB_DML: &str = "role_playing_hub_dml.sql";
pub const LINK_DML: &str = "link_dml.sql";
pub const SATELLITE_DML: &str = "satellite_dml.sql";
pub const EFFECTIVITY_SATELLITE_DML: &str = "effectivity_satellite_dml.sql";

lazy_static::lazy_static! {
    static ref BUILTIN_TEMPLATES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert(STAGING_TABLE_DDL, include_str!("templates/staging_table_ddl.sql"));
        m.insert(HUB_DML, include_str!("templates/hub_dml.sql"));
        m.insert(ROLE_PLAYING_HUB_DML, include_str!("templates/role_playing_hub_dml.sql"));
        m.insert(LINK_DML, include_str!("templates/link_dml.sql"));
        m.insert(SATELLITE_DML, include_str!("templates/satellite_dml.sql"));
        m.insert(EFFECTIVITY_SATELLITE_DML, include_str!("templates/effectivity_satellite_dml.sql"));
        m
    };
}

static GLOBAL_TEMPLATES: OnceLock<TemplateRegistry> = OnceLock::new();

/// Source of SQL templates, memoizing every template it reads from disk.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    override_dir: Option<PathBuf>,
    cache: RwLock<HashMap<String, Arc<str>>>,
}

impl TemplateRegistry {
    /// Registry serving only the compiled-in templates.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Registry reading `<dir>/<name>` first and falling back to built-ins.
    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
            cache: RwLock::default(),
        }
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }

    /// Fetch a template by file name.
    pub fn get(&self, name: &str) -> Result<Arc<str>, TemplateError> {
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
        {
            return Ok(Arc::clone(cached));
        }

        let content: Arc<str> = match self.read_override(name)? {
            Some(content) => Arc::from(content),
            None => match BUILTIN_TEMPLATES.get(name) {
                Some(builtin) => Arc::from(*builtin),
                None => {
                    return Err(TemplateError::NotFound {
                        name: name.to_string(),
                    })
                }
            },
        };

        self.cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.to_string(), Arc::clone(&content));
        Ok(content)
    }

    fn read_override(&self, name: &str) -> Result<Option<String>, TemplateError> {
        let Some(dir) = &self.override_dir else {
            return Ok(None);
        };
        let path = dir.join(name);
        if !path.is_file() {
            log::debug!(
                "No override for template '{}' in {}, using built-in",
                name,
                dir.display()
            );
            return Ok(None);
        }
        log::debug!("Loading template '{}' from {}", name, path.display());
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| TemplateError::Read { path, source })
    }
}

/// Install the process-wide registry.
///
/// Returns `false` when a registry was already installed (the first one wins).
pub fn init_template_registry(override_dir: Option<PathBuf>) -> bool {
    let registry = match override_dir {
        Some(dir) => TemplateRegistry::with_override_dir(dir),
        None => TemplateRegistry::builtin(),
    };
    GLOBAL_TEMPLATES.set(registry).is_ok()
}

/// The process-wide registry, built-in templates only unless
/// [`init_template_registry`] ran first.
pub fn template_registry() -> &'static TemplateRegistry {
    GLOBAL_TEMPLATES.get_or_init(TemplateRegistry::builtin)
}

/// Load `name` from the process-wide registry and render it.
pub fn render_named_template(
    name: &str,
    placeholders: &SqlPlaceholders,
) -> Result<String, TemplateError> {
    let template = template_registry().get(name)?;
    render_template(name, &template, placeholders)
}

fn is_valid_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Substitute every `{name}` marker of `template` with its value.
///
/// `template_name` only feeds error messages.
pub fn render_template(
    template_name: &str,
    template: &str,
    placeholders: &SqlPlaceholders,
) -> Result<String, TemplateError> {
    let mut result = String::with_capacity(template.len() * 2);
    let mut chars = template.char_indices().peekable();

    while let Some((position, ch)) = chars.next() {
        match ch {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    result.push('{');
                    continue;
                }

                let mut placeholder = String::new();
                let mut closed = false;
                for (_, next_ch) in chars.by_ref() {
                    if next_ch == '}' {
                        closed = true;
                        break;
                    }
                    placeholder.push(next_ch);
                }

                if !closed {
                    return Err(TemplateError::UnbalancedBrace {
                        template: template_name.to_string(),
                        position,
                    });
                }
                if !is_valid_placeholder_name(&placeholder) {
                    return Err(TemplateError::InvalidPlaceholder {
                        template: template_name.to_string(),
                        placeholder,
                    });
                }

                match placeholders.get(&placeholder) {
                    Some(value) => result.push_str(value),
                    None => {
                        return Err(TemplateError::MissingPlaceholder {
                            template: template_name.to_string(),
                            placeholder,
                        });
                    }
                }
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    result.push('}');
                } else {
                    return Err(TemplateError::UnbalancedBrace {
                        template: template_name.to_string(),
                        position,
                    });
                }
            }
            _ => result.push(ch),
        }
    }

    Ok(result)
}
