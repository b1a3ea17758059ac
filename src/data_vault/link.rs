use std::fmt;

use super::constants::STAGING_ALIAS;
use super::errors::DataVaultError;
use super::field::{DataVaultField, FieldRole};
use super::table::{DataVaultTable, LoadableEntity};
use crate::sql_generator::{SqlPlaceholders, LINK_DML};

/// A link: relationship between two or more hubs.
#[derive(Debug, Clone)]
pub struct Link {
    table: DataVaultTable,
}

impl Link {
    pub fn new(schema: &str, name: &str, fields: Vec<DataVaultField>) -> Result<Self, DataVaultError> {
        let link = Self {
            table: DataVaultTable::new(schema, name, fields)?,
        };
        link.validate()?;
        log::info!("{}: instance created", link);
        Ok(link)
    }

    /// A link has exactly one own hashkey and at least two parent hashkeys.
    fn validate(&self) -> Result<(), DataVaultError> {
        self.table.single_field_with_role(FieldRole::Hashkey)?;
        let parents = self.table.fields_with_role(FieldRole::HashkeyParent).len();
        if parents < 2 {
            return Err(DataVaultError::configuration(
                self.table.name(),
                format!("link needs at least 2 parent hashkeys, found {}", parents),
            ));
        }
        Ok(())
    }

    pub fn hashkey(&self) -> Result<&DataVaultField, DataVaultError> {
        self.table.single_field_with_role(FieldRole::Hashkey)
    }

    pub fn parent_hashkeys(&self) -> Vec<&DataVaultField> {
        self.table.fields_with_role(FieldRole::HashkeyParent)
    }
}

impl LoadableEntity for Link {
    fn table(&self) -> &DataVaultTable {
        &self.table
    }

    fn table_mut(&mut self) -> &mut DataVaultTable {
        &mut self.table
    }

    fn loading_order(&self) -> u8 {
        3
    }

    fn template_name(&self) -> &'static str {
        LINK_DML
    }

    fn sql_placeholders(&self) -> Result<SqlPlaceholders, DataVaultError> {
        let mut placeholders = self.base_placeholders()?;
        placeholders.insert("hashkey_field".into(), self.hashkey()?.name().to_string());
        placeholders.insert("link_fields".into(), self.table.field_list(None)?);
        placeholders.insert("staging_link_fields".into(), self.table.field_list(Some(STAGING_ALIAS))?);
        Ok(placeholders)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link: {}", self.table)
    }
}
