//! Data Vault model: fields, tables and the load that ties them together.
//!
//! Tables are built from field descriptions whose roles follow naming
//! conventions (see [`constants`]). Each table kind implements
//! [`LoadableEntity`] and renders its own load statement; a
//! [`DataVaultLoad`] orders them into a script.

pub mod constants;
pub mod data_vault_load;
pub mod driving_key;
pub mod effectivity_satellite;
pub mod errors;
pub mod field;
pub mod hub;
pub mod link;
pub mod model_config;
pub mod role_playing_hub;
pub mod satellite;
pub mod table;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use constants::{RECORD_END_TIMESTAMP, RECORD_SOURCE, RECORD_START_TIMESTAMP};
pub use data_vault_load::{DataVaultLoad, LoadParameters, TargetTable};
pub use driving_key::DrivingKeyField;
pub use effectivity_satellite::EffectivitySatellite;
pub use errors::DataVaultError;
pub use field::{DataVaultField, FieldDataType, FieldRole, TableType};
pub use hub::Hub;
pub use link::Link;
pub use model_config::DataVaultModelConfig;
pub use role_playing_hub::RolePlayingHub;
pub use satellite::Satellite;
pub use table::{DataVaultTable, LoadableEntity, StagingTable};
