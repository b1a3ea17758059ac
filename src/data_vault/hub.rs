use std::fmt;

use super::constants::STAGING_ALIAS;
use super::errors::DataVaultError;
use super::field::{DataVaultField, FieldRole};
use super::table::{DataVaultTable, LoadableEntity};
use crate::sql_generator::{SqlPlaceholders, HUB_DML};

/// A hub: unique business keys and their hashkey.
#[derive(Debug, Clone)]
pub struct Hub {
    table: DataVaultTable,
}

impl Hub {
    pub fn new(schema: &str, name: &str, fields: Vec<DataVaultField>) -> Result<Self, DataVaultError> {
        let hub = Self {
            table: DataVaultTable::new(schema, name, fields)?,
        };
        hub.validate()?;
        log::info!("{}: instance created", hub);
        Ok(hub)
    }

    /// A hub has exactly one hashkey, named `<hub>_hashkey`, and at least
    /// one business key.
    fn validate(&self) -> Result<(), DataVaultError> {
        validate_hub_table(&self.table)
    }

    pub fn hashkey(&self) -> Result<&DataVaultField, DataVaultError> {
        self.table.single_field_with_role(FieldRole::Hashkey)
    }
}

pub(crate) fn validate_hub_table(table: &DataVaultTable) -> Result<(), DataVaultError> {
    table.single_field_with_role(FieldRole::Hashkey)?;
    if table.fields_with_role(FieldRole::BusinessKey).is_empty() {
        return Err(DataVaultError::configuration(
            table.name(),
            "hub has no business key",
        ));
    }
    Ok(())
}

impl LoadableEntity for Hub {
    fn table(&self) -> &DataVaultTable {
        &self.table
    }

    fn table_mut(&mut self) -> &mut DataVaultTable {
        &mut self.table
    }

    fn loading_order(&self) -> u8 {
        1
    }

    fn template_name(&self) -> &'static str {
        HUB_DML
    }

    fn sql_placeholders(&self) -> Result<SqlPlaceholders, DataVaultError> {
        let mut placeholders = self.base_placeholders()?;
        placeholders.insert("hashkey_field".into(), self.hashkey()?.name().to_string());
        placeholders.insert("hub_fields".into(), self.table.field_list(None)?);
        placeholders.insert("staging_hub_fields".into(), self.table.field_list(Some(STAGING_ALIAS))?);
        Ok(placeholders)
    }
}

impl fmt::Display for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hub: {}", self.table)
    }
}
