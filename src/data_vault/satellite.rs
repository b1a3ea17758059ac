use std::fmt;
use std::sync::Arc;

use super::constants::{
    HASHKEY_SUFFIX, RECORD_END_TIMESTAMP, SATELLITE_ALIAS, STAGING_ALIAS,
};
use super::errors::DataVaultError;
use super::field::{DataVaultField, FieldRole, TableType};
use super::table::{names, DataVaultTable, LoadableEntity};
use crate::sql_generator::{
    format_fields_for_select, hashdiff_sql, qualified_column, SqlPlaceholders, END_OF_TIME_SQL,
    SATELLITE_DML,
};

/// A satellite: versioned descriptive attributes of a hub or a link.
///
/// Every version is identified by the parent hashkey and its load timestamp;
/// the open version carries the end-of-time sentinel in `r_timestamp_end`.
#[derive(Debug, Clone)]
pub struct Satellite {
    table: DataVaultTable,
    parent_table: Option<Arc<DataVaultTable>>,
}

impl Satellite {
    pub fn new(schema: &str, name: &str, fields: Vec<DataVaultField>) -> Result<Self, DataVaultError> {
        let satellite = Self {
            table: DataVaultTable::new(schema, name, fields)?,
            parent_table: None,
        };
        satellite.validate()?;
        log::info!("{}: instance created", satellite);
        Ok(satellite)
    }

    fn validate(&self) -> Result<(), DataVaultError> {
        if TableType::from_table_name(self.table.name()) != TableType::Satellite {
            return Err(DataVaultError::configuration(
                self.table.name(),
                "satellite names must start with one of 'hs', 'ls' or 'sat'",
            ));
        }
        self.table.single_field_with_role(FieldRole::HashkeyParent)?;
        self.table.single_field_with_role(FieldRole::Hashdiff)?;
        self.table.require_field(RECORD_END_TIMESTAMP)?;
        Ok(())
    }

    /// Hashkey of the hub or link this satellite describes.
    pub fn parent_hashkey(&self) -> Result<&DataVaultField, DataVaultError> {
        self.table.single_field_with_role(FieldRole::HashkeyParent)
    }

    /// Name of the parent table, the parent hashkey without its suffix.
    pub fn parent_table_name(&self) -> Result<&str, DataVaultError> {
        let hashkey = self.parent_hashkey()?.name();
        Ok(hashkey
            .strip_suffix(HASHKEY_SUFFIX)
            .and_then(|name| name.strip_suffix('_'))
            .unwrap_or(hashkey))
    }

    pub fn hashdiff(&self) -> Result<&DataVaultField, DataVaultError> {
        self.table.single_field_with_role(FieldRole::Hashdiff)
    }

    pub fn descriptive_fields(&self) -> Vec<&DataVaultField> {
        self.table.fields_with_role(FieldRole::Descriptive)
    }

    /// Attach the hub or link owning the parent hashkey.
    pub fn set_parent_table(&mut self, parent: Arc<DataVaultTable>) -> Result<(), DataVaultError> {
        let hashkey = self.parent_hashkey()?.name().to_string();
        let parent_hashkey = parent.single_field_with_role(FieldRole::Hashkey)?;
        if parent_hashkey.name() != hashkey {
            return Err(DataVaultError::configuration(
                self.table.name(),
                format!(
                    "parent '{}' does not own hashkey '{}'",
                    parent.name(),
                    hashkey
                ),
            ));
        }
        self.parent_table = Some(parent);
        Ok(())
    }

    pub fn parent_table(&self) -> Result<&DataVaultTable, DataVaultError> {
        self.parent_table.as_deref().ok_or_else(|| {
            DataVaultError::configuration(self.table.name(), "parent table has not been set")
        })
    }

    /// Hashdiff expression computed in staging, named after this satellite.
    pub fn hashdiff_sql(&self) -> Result<String, DataVaultError> {
        let hashdiff = self.hashdiff()?;
        let sql = hashdiff_sql(
            &hashdiff.name_in_staging(),
            self.parent_hashkey()?.name(),
            &names(&self.descriptive_fields()),
        );
        log::debug!("Hashdiff SQL expression for table ({}) is '({})'", self.table.name(), sql);
        Ok(sql)
    }

    /// Hashdiff followed by descriptive fields.
    fn payload_fields(&self) -> Result<Vec<&DataVaultField>, DataVaultError> {
        let mut payload = vec![self.hashdiff()?];
        payload.extend(self.descriptive_fields());
        Ok(payload)
    }
}

impl LoadableEntity for Satellite {
    fn table(&self) -> &DataVaultTable {
        &self.table
    }

    fn table_mut(&mut self) -> &mut DataVaultTable {
        &mut self.table
    }

    fn loading_order(&self) -> u8 {
        4
    }

    fn template_name(&self) -> &'static str {
        SATELLITE_DML
    }

    fn sql_placeholders(&self) -> Result<SqlPlaceholders, DataVaultError> {
        let hashdiff = self.hashdiff()?;
        let payload = self.payload_fields()?;
        let payload_names = names(&payload);

        // The staged hashdiff is named after the satellite, renamed on select.
        let staging_payload_expressions: Vec<String> = payload
            .iter()
            .map(|field| {
                if field.role() == FieldRole::Hashdiff {
                    format!(
                        "{} AS {}",
                        qualified_column(STAGING_ALIAS, &field.name_in_staging()),
                        field.name()
                    )
                } else {
                    qualified_column(STAGING_ALIAS, field.name())
                }
            })
            .collect();

        let mut placeholders = self.base_placeholders()?;
        placeholders.insert("hashkey_field".into(), self.parent_hashkey()?.name().to_string());
        placeholders.insert("hashdiff_field".into(), hashdiff.name().to_string());
        placeholders.insert("staging_hashdiff_field".into(), hashdiff.name_in_staging());
        placeholders.insert("record_end_timestamp_name".into(), RECORD_END_TIMESTAMP.into());
        placeholders.insert("end_of_time".into(), END_OF_TIME_SQL.into());
        placeholders.insert(
            "payload_fields".into(),
            format_fields_for_select(&payload_names, None)?.join(", "),
        );
        placeholders.insert(
            "staging_payload_expressions".into(),
            staging_payload_expressions.join(", "),
        );
        placeholders.insert(
            "staging_payload_fields".into(),
            format_fields_for_select(&payload_names, Some(STAGING_ALIAS))?.join(", "),
        );
        placeholders.insert(
            "satellite_payload_fields".into(),
            format_fields_for_select(&payload_names, Some(SATELLITE_ALIAS))?.join(", "),
        );
        Ok(placeholders)
    }
}

impl fmt::Display for Satellite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Satellite: {}", self.table)
    }
}
