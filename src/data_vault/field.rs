use std::fmt;

use serde::{Deserialize, Serialize};

use super::constants::{
    CHILD_KEY_PREFIX, HASHDIFF_SUFFIX, HASHKEY_SUFFIX, HUB_PREFIXES, LINK_PREFIXES,
    METADATA_FIELDS, RESERVED_FIELD_PREFIXES, SATELLITE_PREFIXES,
};
use super::errors::DataVaultError;
use crate::sql_generator::{is_plain_identifier, SqlField};

/// Column data types supported in staging casts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldDataType {
    Boolean,
    Date,
    Integer,
    Number,
    Text,
    Time,
    Timestamp,
    TimestampTz,
}

impl FieldDataType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            FieldDataType::Boolean => "BOOLEAN",
            FieldDataType::Date => "DATE",
            FieldDataType::Integer => "INTEGER",
            FieldDataType::Number => "NUMBER",
            FieldDataType::Text => "TEXT",
            FieldDataType::Time => "TIME",
            FieldDataType::Timestamp => "TIMESTAMP",
            FieldDataType::TimestampTz => "TIMESTAMP WITH TIME ZONE",
        }
    }
}

/// Role of a field in a Data Vault model, inferred from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldRole {
    /// Hashkey of the table the field belongs to
    Hashkey,
    /// Hashkey of a parent hub or link
    HashkeyParent,
    Hashdiff,
    BusinessKey,
    /// Link key that is not a business key of any hub (prefix `ck`)
    ChildKey,
    DrivingKey,
    Descriptive,
    Metadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableType {
    Hub,
    Link,
    Satellite,
}

impl TableType {
    /// Table type from the first `_`-separated part of the table name.
    /// Names without a link or satellite prefix are hubs.
    pub fn from_table_name(table_name: &str) -> Self {
        let prefix = first_part(table_name);
        if LINK_PREFIXES.contains(&prefix) {
            TableType::Link
        } else if SATELLITE_PREFIXES.contains(&prefix) {
            TableType::Satellite
        } else {
            if !HUB_PREFIXES.contains(&prefix) {
                log::debug!(
                    "Table '{}' has no known prefix, treating it as a hub",
                    table_name
                );
            }
            TableType::Hub
        }
    }
}

fn first_part(name: &str) -> &str {
    name.split('_').next().unwrap_or(name)
}

fn last_part(name: &str) -> &str {
    name.rsplit('_').next().unwrap_or(name)
}

/// A field in a Data Vault model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataVaultField {
    parent_table_name: String,
    name: String,
    data_type: FieldDataType,
    position: u32,
    is_mandatory: bool,
    precision: Option<u32>,
    scale: Option<u32>,
    length: Option<u32>,
    role: FieldRole,
}

impl DataVaultField {
    /// Create a field of `parent_table_name`. Both names are lower-cased.
    ///
    /// Fails when either name is not a plain SQL identifier or when no role
    /// can be inferred from the name.
    pub fn new(
        parent_table_name: &str,
        name: &str,
        data_type: FieldDataType,
        position: u32,
        is_mandatory: bool,
    ) -> Result<Self, DataVaultError> {
        let parent_table_name = parent_table_name.to_lowercase();
        let name = name.to_lowercase();

        for identifier in [&parent_table_name, &name] {
            if !is_plain_identifier(identifier) {
                return Err(DataVaultError::configuration(
                    &parent_table_name,
                    format!("'{}' is not a valid SQL identifier", identifier),
                ));
            }
        }

        let role = infer_role(&parent_table_name, &name, position).ok_or_else(|| {
            DataVaultError::configuration(
                &parent_table_name,
                format!(
                    "{}: it was not possible to assign a valid field role \
                     (check table and field naming conventions)",
                    name
                ),
            )
        })?;

        Ok(Self {
            parent_table_name,
            name,
            data_type,
            position,
            is_mandatory,
            precision: None,
            scale: None,
            length: None,
            role,
        })
    }

    /// Numeric precision and scale, only rendered for `NUMBER` fields.
    pub fn with_precision(mut self, precision: Option<u32>, scale: Option<u32>) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    /// Character length, only rendered for `TEXT` fields.
    pub fn with_length(mut self, length: Option<u32>) -> Self {
        self.length = length;
        self
    }

    pub fn parent_table_name(&self) -> &str {
        &self.parent_table_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> FieldDataType {
        self.data_type
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn is_mandatory(&self) -> bool {
        self.is_mandatory
    }

    pub fn role(&self) -> FieldRole {
        self.role
    }

    pub fn prefix(&self) -> &str {
        first_part(&self.name)
    }

    pub fn suffix(&self) -> &str {
        last_part(&self.name)
    }

    pub fn parent_table_type(&self) -> TableType {
        TableType::from_table_name(&self.parent_table_name)
    }

    /// Column name in the staging table.
    ///
    /// Every satellite names its hashdiff `s_hashdiff`, so in staging the
    /// hashdiff is prefixed with the satellite name instead.
    pub fn name_in_staging(&self) -> String {
        if self.role == FieldRole::Hashdiff {
            format!("{}_{}", self.parent_table_name, HASHDIFF_SUFFIX)
        } else {
            self.name.clone()
        }
    }

    /// SQL type used when casting the field into staging.
    pub fn sql_type(&self) -> String {
        match (self.data_type, self.precision, self.scale, self.length) {
            (FieldDataType::Number, Some(precision), Some(scale), _) => {
                format!("NUMBER({}, {})", precision, scale)
            }
            (FieldDataType::Text, _, _, Some(length)) if length > 0 => {
                format!("TEXT({})", length)
            }
            (data_type, ..) => data_type.as_sql().to_string(),
        }
    }

    /// Column definition in the staging table, `NOT NULL` when mandatory.
    pub fn ddl_in_staging(&self) -> String {
        let ddl = format!("{} {}", self.name_in_staging(), self.sql_type());
        if self.is_mandatory {
            format!("{} NOT NULL", ddl)
        } else {
            ddl
        }
    }
}

impl SqlField for DataVaultField {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for DataVaultField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataVaultField: {}", self.name)
    }
}

/// Role inference, first match wins:
/// metadata name, own hashkey, parent hashkey, child key prefix, business key
/// (hub/link field past position 1 without a reserved prefix), hashdiff
/// suffix, descriptive (any other satellite field).
fn infer_role(parent_table_name: &str, name: &str, position: u32) -> Option<FieldRole> {
    let prefix = first_part(name);
    let suffix = last_part(name);
    let parent_table_type = TableType::from_table_name(parent_table_name);

    if METADATA_FIELDS.contains(&name) {
        Some(FieldRole::Metadata)
    } else if suffix == HASHKEY_SUFFIX && name == format!("{}_{}", parent_table_name, suffix) {
        Some(FieldRole::Hashkey)
    } else if suffix == HASHKEY_SUFFIX {
        Some(FieldRole::HashkeyParent)
    } else if prefix == CHILD_KEY_PREFIX {
        Some(FieldRole::ChildKey)
    } else if parent_table_type != TableType::Satellite
        && !RESERVED_FIELD_PREFIXES.contains(&prefix)
        && position != 1
    {
        Some(FieldRole::BusinessKey)
    } else if suffix == HASHDIFF_SUFFIX {
        Some(FieldRole::Hashdiff)
    } else if parent_table_type == TableType::Satellite {
        Some(FieldRole::Descriptive)
    } else {
        None
    }
}
