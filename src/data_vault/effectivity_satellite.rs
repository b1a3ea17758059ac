//! Effectivity satellites
//!
//! An effectivity satellite versions the relationships of a link. Among the
//! link rows sharing the same driving-key values only the latest one stays
//! open; loading a new relationship closes the one it supersedes.
//!
//! The load statement joins three relations on the driving keys: the open
//! satellite rows (`satellite`), the staged rows (`staging`) and the link
//! itself (`l`). Placeholders therefore carry the driving keys rendered under
//! each alias, plus the record end timestamp expression partitioned by them.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::constants::{LINK_ALIAS, SATELLITE_ALIAS, STAGING_ALIAS};
use super::driving_key::DrivingKeyField;
use super::errors::DataVaultError;
use super::field::{DataVaultField, FieldRole, TableType};
use super::satellite::Satellite;
use super::table::{DataVaultTable, LoadableEntity};
use crate::sql_generator::{
    format_fields_for_join, format_fields_for_select, record_end_timestamp_expression,
    SqlPlaceholders, EFFECTIVITY_SATELLITE_DML,
};

#[derive(Debug, Clone)]
pub struct EffectivitySatellite {
    satellite: Satellite,
    driving_keys: Vec<DrivingKeyField>,
}

impl EffectivitySatellite {
    /// Create an effectivity satellite versioning relationships by
    /// `driving_keys`.
    ///
    /// Fails when the satellite itself is invalid, when no driving key is
    /// given, or when a driving key is declared for another satellite or
    /// appears twice.
    pub fn new(
        schema: &str,
        name: &str,
        fields: Vec<DataVaultField>,
        driving_keys: Vec<DrivingKeyField>,
    ) -> Result<Self, DataVaultError> {
        Self::from_satellite(Satellite::new(schema, name, fields)?, driving_keys)
    }

    /// Turn a validated satellite into an effectivity satellite.
    pub fn from_satellite(
        satellite: Satellite,
        driving_keys: Vec<DrivingKeyField>,
    ) -> Result<Self, DataVaultError> {
        let name = satellite.table().name().to_string();

        if driving_keys.is_empty() {
            return Err(DataVaultError::configuration(
                &name,
                "effectivity satellite needs at least one driving key",
            ));
        }

        let mut seen = HashSet::new();
        for key in &driving_keys {
            if key.satellite_name() != name {
                return Err(DataVaultError::configuration(
                    &name,
                    format!(
                        "driving key '{}' is declared for satellite '{}'",
                        key.name(),
                        key.satellite_name()
                    ),
                ));
            }
            if !seen.insert(key.name()) {
                return Err(DataVaultError::configuration(
                    &name,
                    format!("duplicate driving key '{}'", key.name()),
                ));
            }
        }

        Ok(Self {
            satellite,
            driving_keys,
        })
    }

    pub fn driving_keys(&self) -> &[DrivingKeyField] {
        &self.driving_keys
    }

    pub fn satellite(&self) -> &Satellite {
        &self.satellite
    }

    /// Attach the link this satellite versions.
    ///
    /// Every driving key must be a key column of the link (a parent hashkey,
    /// business key or child key) and must not share its name with a column
    /// of this satellite, since the load statement selects both side by side.
    pub fn set_parent_table(&mut self, parent: Arc<DataVaultTable>) -> Result<(), DataVaultError> {
        let name = self.satellite.table().name().to_string();

        if TableType::from_table_name(parent.name()) != TableType::Link {
            return Err(DataVaultError::configuration(
                &name,
                format!("parent '{}' of an effectivity satellite must be a link", parent.name()),
            ));
        }

        for key in &self.driving_keys {
            if key.parent_table_name() != parent.name() {
                return Err(DataVaultError::configuration(
                    &name,
                    format!(
                        "driving key '{}' is sourced from '{}', not from link '{}'",
                        key.name(),
                        key.parent_table_name(),
                        parent.name()
                    ),
                ));
            }
            match parent.field(key.name()).map(DataVaultField::role) {
                Some(FieldRole::HashkeyParent | FieldRole::BusinessKey | FieldRole::ChildKey) => {}
                Some(FieldRole::Hashkey) => {
                    return Err(DataVaultError::configuration(
                        &name,
                        format!("driving key '{}' is the hashkey of link '{}'", key.name(), parent.name()),
                    ));
                }
                Some(role) => {
                    return Err(DataVaultError::configuration(
                        &name,
                        format!(
                            "driving key '{}' is not a key column of link '{}' (role {:?})",
                            key.name(),
                            parent.name(),
                            role
                        ),
                    ));
                }
                None => {
                    return Err(DataVaultError::configuration(
                        &name,
                        format!("driving key '{}' is not a column of link '{}'", key.name(), parent.name()),
                    ));
                }
            }
            if self.satellite.table().has_field(key.name()) {
                return Err(DataVaultError::configuration(
                    &name,
                    format!("driving key '{}' collides with a column of the satellite", key.name()),
                ));
            }
        }

        self.satellite.set_parent_table(parent)
    }

    /// Link this satellite versions.
    pub fn parent_table(&self) -> Result<&DataVaultTable, DataVaultError> {
        self.satellite.parent_table()
    }

    fn driving_key_fields(&self, alias: Option<&str>) -> Result<String, DataVaultError> {
        Ok(format_fields_for_select(&self.driving_keys, alias)?.join(", "))
    }

    fn driving_key_condition(&self, alias: &str) -> Result<String, DataVaultError> {
        Ok(format_fields_for_join(&self.driving_keys, alias, STAGING_ALIAS)?.join(" AND "))
    }

    fn driving_key_placeholders(&self) -> Result<SqlPlaceholders, DataVaultError> {
        let driving_key_names: Vec<String> = format_fields_for_select(&self.driving_keys, None)?;

        let mut placeholders = SqlPlaceholders::new();
        placeholders.insert("link_table".into(), self.parent_table()?.name().to_string());
        placeholders.insert("driving_keys".into(), self.driving_key_fields(None)?);
        placeholders.insert(
            "satellite_driving_keys".into(),
            self.driving_key_fields(Some(SATELLITE_ALIAS))?,
        );
        placeholders.insert(
            "staging_driving_keys".into(),
            self.driving_key_fields(Some(STAGING_ALIAS))?,
        );
        placeholders.insert("link_driving_keys".into(), self.driving_key_fields(Some(LINK_ALIAS))?);
        placeholders.insert(
            "satellite_driving_key_condition".into(),
            self.driving_key_condition(SATELLITE_ALIAS)?,
        );
        placeholders.insert(
            "link_driving_key_condition".into(),
            self.driving_key_condition(LINK_ALIAS)?,
        );
        placeholders.insert(
            "record_end_timestamp_expression".into(),
            record_end_timestamp_expression(&driving_key_names)?,
        );
        Ok(placeholders)
    }
}

impl LoadableEntity for EffectivitySatellite {
    fn table(&self) -> &DataVaultTable {
        self.satellite.table()
    }

    fn table_mut(&mut self) -> &mut DataVaultTable {
        self.satellite.table_mut()
    }

    fn loading_order(&self) -> u8 {
        self.satellite.loading_order()
    }

    fn template_name(&self) -> &'static str {
        EFFECTIVITY_SATELLITE_DML
    }

    fn base_placeholders(&self) -> Result<SqlPlaceholders, DataVaultError> {
        self.satellite.sql_placeholders()
    }

    /// Satellite placeholders overlaid with the driving-key ones.
    fn sql_placeholders(&self) -> Result<SqlPlaceholders, DataVaultError> {
        // Driving-key placeholders win over satellite ones of the same name.
        let mut placeholders = self.base_placeholders()?;
        placeholders.extend(self.driving_key_placeholders()?);
        Ok(placeholders)
    }
}

impl fmt::Display for EffectivitySatellite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EffectivitySatellite: {}", self.satellite.table())
    }
}
