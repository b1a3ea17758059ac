use std::fmt;

use super::errors::DataVaultError;
use super::field::FieldRole;
use crate::sql_generator::{is_plain_identifier, SqlField};

/// A link column used to decide which relationship of an effectivity
/// satellite is currently open.
///
/// With a link between customers and contacts where each customer keeps a
/// single active contact, `h_customer_hashkey` of the link is the driving key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DrivingKeyField {
    parent_table_name: String,
    name: String,
    satellite_name: String,
}

impl DrivingKeyField {
    /// Driving key `name` of link `parent_table_name`, used by `satellite_name`.
    pub fn new(
        parent_table_name: &str,
        name: &str,
        satellite_name: &str,
    ) -> Result<Self, DataVaultError> {
        let field = Self {
            parent_table_name: parent_table_name.to_lowercase(),
            name: name.to_lowercase(),
            satellite_name: satellite_name.to_lowercase(),
        };

        for identifier in [&field.parent_table_name, &field.name, &field.satellite_name] {
            if !is_plain_identifier(identifier) {
                return Err(DataVaultError::configuration(
                    &field.satellite_name,
                    format!("driving key '{}' is not a valid SQL identifier", identifier),
                ));
            }
        }

        Ok(field)
    }

    pub fn parent_table_name(&self) -> &str {
        &self.parent_table_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn satellite_name(&self) -> &str {
        &self.satellite_name
    }

    pub fn role(&self) -> FieldRole {
        FieldRole::DrivingKey
    }
}

impl SqlField for DrivingKeyField {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for DrivingKeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DrivingKeyField: {}.{}", self.parent_table_name, self.name)
    }
}
