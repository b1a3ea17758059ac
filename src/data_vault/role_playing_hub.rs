use std::fmt;
use std::sync::Arc;

use super::constants::{HUB_ALIAS, STAGING_ALIAS};
use super::errors::DataVaultError;
use super::field::{DataVaultField, FieldRole};
use super::hub::{validate_hub_table, Hub};
use super::table::{names, DataVaultTable, LoadableEntity};
use crate::sql_generator::{
    format_fields_for_select, qualified_column, SqlPlaceholders, ROLE_PLAYING_HUB_DML,
};

/// A hub that is not materialized on its own: its rows are loaded into a
/// parent hub.
///
/// An account hub can play the supplier, transporter or administrator role;
/// only the account hub is a table and every role loads into it.
#[derive(Debug, Clone)]
pub struct RolePlayingHub {
    hub: Hub,
    parent_hub_name: String,
    parent_table: Option<Arc<DataVaultTable>>,
}

impl RolePlayingHub {
    pub fn new(
        schema: &str,
        name: &str,
        fields: Vec<DataVaultField>,
        parent_hub_name: &str,
    ) -> Result<Self, DataVaultError> {
        Ok(Self {
            hub: Hub::new(schema, name, fields)?,
            parent_hub_name: parent_hub_name.to_lowercase(),
            parent_table: None,
        })
    }

    pub fn parent_hub_name(&self) -> &str {
        &self.parent_hub_name
    }

    /// Attach the hub this role loads into.
    ///
    /// Both hubs must line up: same number of business keys and of
    /// non-hashkey fields, matched by position.
    pub fn set_parent_table(&mut self, parent: Arc<DataVaultTable>) -> Result<(), DataVaultError> {
        let name = self.hub.table().name().to_string();
        if parent.name() != self.parent_hub_name {
            return Err(DataVaultError::configuration(
                &name,
                format!(
                    "expected parent hub '{}', got '{}'",
                    self.parent_hub_name,
                    parent.name()
                ),
            ));
        }
        validate_hub_table(&parent)?;

        let own_keys = self.hub.table().fields_with_role(FieldRole::BusinessKey).len();
        let parent_keys = parent.fields_with_role(FieldRole::BusinessKey).len();
        if own_keys != parent_keys {
            return Err(DataVaultError::configuration(
                &name,
                format!(
                    "has {} business keys but parent hub '{}' has {}",
                    own_keys,
                    parent.name(),
                    parent_keys
                ),
            ));
        }
        if non_hashkey_fields(self.hub.table()).len() != non_hashkey_fields(&parent).len() {
            return Err(DataVaultError::configuration(
                &name,
                format!("fields do not match the fields of parent hub '{}'", parent.name()),
            ));
        }

        self.parent_table = Some(parent);
        Ok(())
    }

    pub fn parent_table(&self) -> Result<&DataVaultTable, DataVaultError> {
        self.parent_table.as_deref().ok_or_else(|| {
            DataVaultError::configuration(
                self.hub.table().name(),
                format!("parent hub '{}' has not been set", self.parent_hub_name),
            )
        })
    }
}

fn non_hashkey_fields(table: &DataVaultTable) -> Vec<&DataVaultField> {
    table
        .fields()
        .iter()
        .filter(|field| field.role() != FieldRole::Hashkey)
        .collect()
}

impl LoadableEntity for RolePlayingHub {
    fn table(&self) -> &DataVaultTable {
        self.hub.table()
    }

    fn table_mut(&mut self) -> &mut DataVaultTable {
        self.hub.table_mut()
    }

    fn loading_order(&self) -> u8 {
        2
    }

    fn template_name(&self) -> &'static str {
        ROLE_PLAYING_HUB_DML
    }

    fn base_placeholders(&self) -> Result<SqlPlaceholders, DataVaultError> {
        self.hub.sql_placeholders()
    }

    /// Hub placeholders, with `data_vault_table` pointing at the parent hub.
    fn sql_placeholders(&self) -> Result<SqlPlaceholders, DataVaultError> {
        let parent = self.parent_table()?;
        let table = self.hub.table();

        let business_key_condition = parent
            .fields_with_role(FieldRole::BusinessKey)
            .iter()
            .zip(table.fields_with_role(FieldRole::BusinessKey))
            .map(|(parent_key, key)| {
                format!(
                    "{} = {}",
                    qualified_column(HUB_ALIAS, parent_key.name()),
                    qualified_column(STAGING_ALIAS, key.name())
                )
            })
            .collect::<Vec<_>>()
            .join(" AND ");

        let parent_hashkey = parent.single_field_with_role(FieldRole::Hashkey)?;
        let parent_non_hashkey_fields = names(&non_hashkey_fields(parent));
        let staging_non_hashkey_fields = format_fields_for_select(
            &names(&non_hashkey_fields(table)),
            Some(STAGING_ALIAS),
        )?;

        let mut placeholders = self.base_placeholders()?;
        placeholders.insert("data_vault_table".into(), parent.name().to_string());
        placeholders.insert("business_key_condition".into(), business_key_condition);
        placeholders.insert("parent_hashkey_field".into(), parent_hashkey.name().to_string());
        placeholders.insert(
            "parent_non_hashkey_fields".into(),
            format_fields_for_select(&parent_non_hashkey_fields, None)?.join(", "),
        );
        placeholders.insert(
            "staging_non_hashkey_fields".into(),
            staging_non_hashkey_fields.join(", "),
        );
        Ok(placeholders)
    }
}

impl fmt::Display for RolePlayingHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RolePlayingHub: {}", self.hub.table())
    }
}
