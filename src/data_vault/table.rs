use std::collections::HashSet;
use std::fmt;

use super::constants::{RECORD_SOURCE, RECORD_START_TIMESTAMP};
use super::errors::DataVaultError;
use super::field::{DataVaultField, FieldRole};
use crate::sql_generator::{
    format_fields_for_select, hashkey_sql, is_plain_identifier, render_named_template,
    SqlPlaceholders,
};

/// Staging table every target table is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingTable {
    pub schema: String,
    pub table: String,
}

impl StagingTable {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }
}

/// State shared by hubs, links and satellites.
///
/// Fields are kept sorted by position so hash expressions always concatenate
/// columns in the same order.
#[derive(Debug, Clone)]
pub struct DataVaultTable {
    schema: String,
    name: String,
    fields: Vec<DataVaultField>,
    staging: Option<StagingTable>,
}

impl DataVaultTable {
    pub fn new(
        schema: &str,
        name: &str,
        mut fields: Vec<DataVaultField>,
    ) -> Result<Self, DataVaultError> {
        let name = name.to_lowercase();

        if !is_plain_identifier(schema) {
            return Err(DataVaultError::configuration(
                &name,
                format!("schema '{}' is not a valid SQL identifier", schema),
            ));
        }
        if fields.is_empty() {
            return Err(DataVaultError::configuration(&name, "table has no fields"));
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if field.parent_table_name() != name {
                return Err(DataVaultError::configuration(
                    &name,
                    format!(
                        "field '{}' is declared for table '{}'",
                        field.name(),
                        field.parent_table_name()
                    ),
                ));
            }
            if !seen.insert(field.name()) {
                return Err(DataVaultError::configuration(
                    &name,
                    format!("duplicate field '{}'", field.name()),
                ));
            }
        }

        fields.sort_by_key(|field| field.position());

        let table = Self {
            schema: schema.to_string(),
            name,
            fields,
            staging: None,
        };
        table.require_field(RECORD_START_TIMESTAMP)?;
        table.require_field(RECORD_SOURCE)?;
        Ok(table)
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[DataVaultField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&DataVaultField> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Fields holding `role`, in position order.
    pub fn fields_with_role(&self, role: FieldRole) -> Vec<&DataVaultField> {
        self.fields
            .iter()
            .filter(|field| field.role() == role)
            .collect()
    }

    /// The only field holding `role`.
    pub fn single_field_with_role(&self, role: FieldRole) -> Result<&DataVaultField, DataVaultError> {
        match self.fields_with_role(role).as_slice() {
            [field] => Ok(*field),
            [] => Err(DataVaultError::configuration(
                &self.name,
                format!("no field with role {:?} found", role),
            )),
            many => Err(DataVaultError::configuration(
                &self.name,
                format!("expected one field with role {:?}, found {}", role, many.len()),
            )),
        }
    }

    pub fn require_field(&self, name: &str) -> Result<&DataVaultField, DataVaultError> {
        self.field(name).ok_or_else(|| {
            DataVaultError::configuration(&self.name, format!("no field named '{}' found", name))
        })
    }

    pub fn staging(&self) -> Option<&StagingTable> {
        self.staging.as_ref()
    }

    pub fn set_staging_table(&mut self, staging: StagingTable) {
        self.staging = Some(staging);
    }

    /// Placeholders common to every load template.
    pub fn sql_placeholders(&self) -> Result<SqlPlaceholders, DataVaultError> {
        let staging = self.staging.as_ref().ok_or_else(|| {
            DataVaultError::configuration(&self.name, "staging table has not been set")
        })?;

        let mut placeholders = SqlPlaceholders::new();
        placeholders.insert("target_schema".into(), self.schema.clone());
        placeholders.insert("data_vault_table".into(), self.name.clone());
        placeholders.insert("staging_schema".into(), staging.schema.clone());
        placeholders.insert("staging_table".into(), staging.table.clone());
        placeholders.insert("record_start_timestamp".into(), RECORD_START_TIMESTAMP.into());
        placeholders.insert("record_source".into(), RECORD_SOURCE.into());
        Ok(placeholders)
    }

    /// Hashkey expression over business keys then child keys, for staging.
    pub fn hashkey_sql(&self) -> Result<String, DataVaultError> {
        let hashkey = self.single_field_with_role(FieldRole::Hashkey)?;
        let business_keys = names(&self.fields_with_role(FieldRole::BusinessKey));
        let child_keys = names(&self.fields_with_role(FieldRole::ChildKey));

        let sql = hashkey_sql(hashkey.name(), &business_keys, &child_keys)?;
        log::debug!("Hashkey SQL expression for table ({}) is '({})'", self.name, sql);
        Ok(sql)
    }

    /// All columns as a comma separated list, optionally aliased.
    pub fn field_list(&self, table_alias: Option<&str>) -> Result<String, DataVaultError> {
        Ok(format_fields_for_select(&self.fields, table_alias)?.join(", "))
    }
}

impl fmt::Display for DataVaultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

pub(crate) fn names(fields: &[&DataVaultField]) -> Vec<String> {
    fields.iter().map(|field| field.name().to_string()).collect()
}

/// A table that can be loaded from staging.
pub trait LoadableEntity: fmt::Display {
    fn table(&self) -> &DataVaultTable;

    fn table_mut(&mut self) -> &mut DataVaultTable;

    /// Position in the load script: parents load before children.
    fn loading_order(&self) -> u8;

    /// File name of the load template.
    fn template_name(&self) -> &'static str;

    /// Placeholders provided by the underlying table kind.
    fn base_placeholders(&self) -> Result<SqlPlaceholders, DataVaultError> {
        self.table().sql_placeholders()
    }

    /// Every placeholder the load template needs.
    fn sql_placeholders(&self) -> Result<SqlPlaceholders, DataVaultError> {
        self.base_placeholders()
    }

    fn sql_load_statement(&self) -> Result<String, DataVaultError> {
        let placeholders = self.sql_placeholders()?;
        let sql = render_named_template(self.template_name(), &placeholders)
            .map_err(|e| DataVaultError::template(self.to_string(), e))?;

        log::info!("{}: loading SQL generated", self);
        log::debug!("{}:\n({})", self, sql);
        Ok(sql)
    }
}
