//! Naming conventions of the Data Vault model.
//!
//! Roles and table types are derived from names, so these values are part of
//! the model contract.

pub const RECORD_START_TIMESTAMP: &str = "r_timestamp";
pub const RECORD_END_TIMESTAMP: &str = "r_timestamp_end";
pub const RECORD_SOURCE: &str = "r_source";

pub const METADATA_FIELDS: [&str; 3] = [RECORD_START_TIMESTAMP, RECORD_END_TIMESTAMP, RECORD_SOURCE];

pub const HASHKEY_SUFFIX: &str = "hashkey";
pub const HASHDIFF_SUFFIX: &str = "hashdiff";
pub const CHILD_KEY_PREFIX: &str = "ck";

/// Field prefixes that never denote a business key.
pub const RESERVED_FIELD_PREFIXES: [&str; 1] = [CHILD_KEY_PREFIX];

pub const HUB_PREFIXES: [&str; 2] = ["h", "hub"];
pub const LINK_PREFIXES: [&str; 2] = ["l", "link"];
pub const SATELLITE_PREFIXES: [&str; 3] = ["hs", "ls", "sat"];

// Aliases used by the effectivity satellite template
pub const SATELLITE_ALIAS: &str = "satellite";
pub const STAGING_ALIAS: &str = "staging";
pub const LINK_ALIAS: &str = "l";
pub const HUB_ALIAS: &str = "hub";
