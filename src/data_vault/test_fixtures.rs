//! Tables of a small order/customer model shared by unit tests.

use std::sync::Arc;

use super::driving_key::DrivingKeyField;
use super::effectivity_satellite::EffectivitySatellite;
use super::field::{DataVaultField, FieldDataType};
use super::hub::Hub;
use super::link::Link;
use super::role_playing_hub::RolePlayingHub;
use super::satellite::Satellite;
use super::table::{DataVaultTable, LoadableEntity, StagingTable};

pub const SCHEMA: &str = "dv";

pub fn staging() -> StagingTable {
    StagingTable::new("dv_stg", "orders_20190806_000000")
}

/// Fields of `table`, positions following slice order.
pub fn fields(table: &str, columns: &[(&str, FieldDataType)]) -> Vec<DataVaultField> {
    columns
        .iter()
        .enumerate()
        .map(|(i, (name, data_type))| {
            DataVaultField::new(table, name, *data_type, i as u32 + 1, true).unwrap()
        })
        .collect()
}

pub fn h_customer() -> Hub {
    Hub::new(
        SCHEMA,
        "h_customer",
        fields(
            "h_customer",
            &[
                ("h_customer_hashkey", FieldDataType::Text),
                ("r_timestamp", FieldDataType::Timestamp),
                ("r_source", FieldDataType::Text),
                ("customer_id", FieldDataType::Text),
            ],
        ),
    )
    .unwrap()
}

pub fn h_order() -> Hub {
    Hub::new(
        SCHEMA,
        "h_order",
        fields(
            "h_order",
            &[
                ("h_order_hashkey", FieldDataType::Text),
                ("r_timestamp", FieldDataType::Timestamp),
                ("r_source", FieldDataType::Text),
                ("order_id", FieldDataType::Text),
            ],
        ),
    )
    .unwrap()
}

pub fn h_customer_role_playing() -> RolePlayingHub {
    RolePlayingHub::new(
        SCHEMA,
        "h_customer_role_playing",
        fields(
            "h_customer_role_playing",
            &[
                ("h_customer_role_playing_hashkey", FieldDataType::Text),
                ("r_timestamp", FieldDataType::Timestamp),
                ("r_source", FieldDataType::Text),
                ("customer_role_playing_id", FieldDataType::Text),
            ],
        ),
        "h_customer",
    )
    .unwrap()
}

pub fn l_order_customer() -> Link {
    Link::new(
        SCHEMA,
        "l_order_customer",
        fields(
            "l_order_customer",
            &[
                ("l_order_customer_hashkey", FieldDataType::Text),
                ("h_order_hashkey", FieldDataType::Text),
                ("h_customer_hashkey", FieldDataType::Text),
                ("order_id", FieldDataType::Text),
                ("customer_id", FieldDataType::Text),
                ("ck_test_string", FieldDataType::Text),
                ("r_timestamp", FieldDataType::Timestamp),
                ("r_source", FieldDataType::Text),
            ],
        ),
    )
    .unwrap()
}

pub fn hs_customer() -> Satellite {
    Satellite::new(
        SCHEMA,
        "hs_customer",
        fields(
            "hs_customer",
            &[
                ("h_customer_hashkey", FieldDataType::Text),
                ("s_hashdiff", FieldDataType::Text),
                ("r_timestamp", FieldDataType::Timestamp),
                ("r_timestamp_end", FieldDataType::Timestamp),
                ("r_source", FieldDataType::Text),
                ("firstname", FieldDataType::Text),
                ("lastname", FieldDataType::Text),
            ],
        ),
    )
    .unwrap()
}

pub fn ls_order_customer_eff_fields() -> Vec<DataVaultField> {
    fields(
        "ls_order_customer_eff",
        &[
            ("l_order_customer_hashkey", FieldDataType::Text),
            ("s_hashdiff", FieldDataType::Text),
            ("r_timestamp", FieldDataType::Timestamp),
            ("r_timestamp_end", FieldDataType::Timestamp),
            ("r_source", FieldDataType::Text),
            ("dummy_descriptive_field", FieldDataType::Text),
        ],
    )
}

pub fn driving_key(name: &str) -> DrivingKeyField {
    DrivingKeyField::new("l_order_customer", name, "ls_order_customer_eff").unwrap()
}

/// Effectivity satellite with its link parent and staging table attached.
pub fn ls_order_customer_eff(driving_keys: &[&str]) -> EffectivitySatellite {
    let mut satellite = EffectivitySatellite::new(
        SCHEMA,
        "ls_order_customer_eff",
        ls_order_customer_eff_fields(),
        driving_keys.iter().map(|name| driving_key(name)).collect(),
    )
    .unwrap();
    satellite
        .set_parent_table(parent(l_order_customer().table()))
        .unwrap();
    satellite.table_mut().set_staging_table(staging());
    satellite
}

pub fn parent(table: &DataVaultTable) -> Arc<DataVaultTable> {
    Arc::new(table.clone())
}
