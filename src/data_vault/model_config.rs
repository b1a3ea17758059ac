//! YAML description of a Data Vault load
//!
//! ```yaml
//! target_schema: dv
//! extract_schema: dv_extract
//! extract_table: extract_orders
//! staging_schema: dv_staging
//! staging_table: orders_20190806
//! extract_start_timestamp: "2019-08-06T00:00:00"
//! record_source: orders_system
//! hubs:
//!   - name: h_customer
//!     fields:
//!       - { name: h_customer_hashkey, data_type: TEXT, position: 1 }
//!       - { name: r_timestamp, data_type: TIMESTAMP, position: 2 }
//!       - { name: r_source, data_type: TEXT, position: 3 }
//!       - { name: customer_id, data_type: TEXT, position: 4 }
//! effectivity_satellites:
//!   - name: ls_order_customer_eff
//!     fields: [...]
//!     driving_keys: [h_customer_hashkey]
//! ```
//!
//! Every table kind has its own list; all lists are optional.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::data_vault_load::{DataVaultLoad, LoadParameters, TargetTable};
use super::driving_key::DrivingKeyField;
use super::effectivity_satellite::EffectivitySatellite;
use super::errors::DataVaultError;
use super::field::{DataVaultField, FieldDataType};
use super::hub::Hub;
use super::link::Link;
use super::role_playing_hub::RolePlayingHub;
use super::satellite::Satellite;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DataVaultModelConfig {
    #[validate(length(min = 1, message = "target schema cannot be empty"))]
    pub target_schema: String,

    #[validate(length(min = 1, message = "extract schema cannot be empty"))]
    pub extract_schema: String,

    #[validate(length(min = 1, message = "extract table cannot be empty"))]
    pub extract_table: String,

    #[validate(length(min = 1, message = "staging schema cannot be empty"))]
    pub staging_schema: String,

    #[validate(length(min = 1, message = "staging table cannot be empty"))]
    pub staging_table: String,

    /// ISO 8601 without offset, e.g. `2019-08-06T00:00:00`
    pub extract_start_timestamp: NaiveDateTime,

    #[validate(length(min = 1, message = "record source cannot be empty"))]
    pub record_source: String,

    #[serde(default)]
    #[validate(nested)]
    pub hubs: Vec<TableDefinition>,

    #[serde(default)]
    #[validate(nested)]
    pub role_playing_hubs: Vec<RolePlayingHubDefinition>,

    #[serde(default)]
    #[validate(nested)]
    pub links: Vec<TableDefinition>,

    #[serde(default)]
    #[validate(nested)]
    pub satellites: Vec<TableDefinition>,

    #[serde(default)]
    #[validate(nested)]
    pub effectivity_satellites: Vec<EffectivitySatelliteDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FieldDefinition {
    #[validate(length(min = 1, message = "field name cannot be empty"))]
    pub name: String,

    pub data_type: FieldDataType,

    /// 1-based column position
    #[validate(range(min = 1, message = "field position starts at 1"))]
    pub position: u32,

    #[serde(default = "default_mandatory")]
    pub is_mandatory: bool,

    #[serde(default)]
    pub precision: Option<u32>,

    #[serde(default)]
    pub scale: Option<u32>,

    #[serde(default)]
    pub length: Option<u32>,
}

fn default_mandatory() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TableDefinition {
    #[validate(length(min = 1, message = "table name cannot be empty"))]
    pub name: String,

    #[validate(length(min = 1, message = "table needs at least one field"), nested)]
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RolePlayingHubDefinition {
    #[validate(length(min = 1, message = "table name cannot be empty"))]
    pub name: String,

    #[validate(length(min = 1, message = "parent hub cannot be empty"))]
    pub parent_hub: String,

    #[validate(length(min = 1, message = "table needs at least one field"), nested)]
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EffectivitySatelliteDefinition {
    #[validate(length(min = 1, message = "table name cannot be empty"))]
    pub name: String,

    #[validate(length(min = 1, message = "table needs at least one field"), nested)]
    pub fields: Vec<FieldDefinition>,

    /// Columns of the parent link; checked when the satellite is built
    #[serde(default)]
    pub driving_keys: Vec<String>,
}

fn build_fields(table: &str, definitions: &[FieldDefinition]) -> Result<Vec<DataVaultField>, DataVaultError> {
    definitions
        .iter()
        .map(|definition| {
            Ok(DataVaultField::new(
                table,
                &definition.name,
                definition.data_type,
                definition.position,
                definition.is_mandatory,
            )?
            .with_precision(definition.precision, definition.scale)
            .with_length(definition.length))
        })
        .collect()
}

impl DataVaultModelConfig {
    /// Load a model from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, DataVaultError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| DataVaultError::ModelRead {
            error: format!("{}: {}", path.display(), e),
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse and validate a model from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DataVaultError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| DataVaultError::ModelParse {
            error: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_parameters(&self) -> LoadParameters {
        LoadParameters {
            extract_schema: self.extract_schema.clone(),
            extract_table: self.extract_table.clone(),
            staging_schema: self.staging_schema.clone(),
            staging_table: self.staging_table.clone(),
            extract_start_timestamp: self.extract_start_timestamp,
            record_source: self.record_source.clone(),
        }
    }

    /// Build every declared table, in declaration order per kind.
    pub fn target_tables(&self) -> Result<Vec<TargetTable>, DataVaultError> {
        let schema = self.target_schema.as_str();
        let mut tables: Vec<TargetTable> = Vec::new();

        for hub in &self.hubs {
            let fields = build_fields(&hub.name, &hub.fields)?;
            tables.push(Hub::new(schema, &hub.name, fields)?.into());
        }
        for hub in &self.role_playing_hubs {
            let fields = build_fields(&hub.name, &hub.fields)?;
            tables.push(RolePlayingHub::new(schema, &hub.name, fields, &hub.parent_hub)?.into());
        }
        for link in &self.links {
            let fields = build_fields(&link.name, &link.fields)?;
            tables.push(Link::new(schema, &link.name, fields)?.into());
        }
        for satellite in &self.satellites {
            let fields = build_fields(&satellite.name, &satellite.fields)?;
            tables.push(Satellite::new(schema, &satellite.name, fields)?.into());
        }
        for definition in &self.effectivity_satellites {
            let fields = build_fields(&definition.name, &definition.fields)?;
            let satellite = Satellite::new(schema, &definition.name, fields)?;

            // Driving keys are sourced from the link owning the parent hashkey.
            let link_name = satellite.parent_table_name()?.to_string();
            let driving_keys = definition
                .driving_keys
                .iter()
                .map(|key| DrivingKeyField::new(&link_name, key, &definition.name))
                .collect::<Result<Vec<_>, _>>()?;

            tables.push(EffectivitySatellite::from_satellite(satellite, driving_keys)?.into());
        }

        Ok(tables)
    }

    /// Build the load described by this model.
    pub fn into_load(&self) -> Result<DataVaultLoad, DataVaultError> {
        DataVaultLoad::new(self.load_parameters(), self.target_tables()?)
    }
}
