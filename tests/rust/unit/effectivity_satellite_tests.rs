//! Unit tests for effectivity satellite placeholders
//!
//! Builds a customer/contact link and its effectivity satellite through the
//! public API and checks the driving-key placeholders.

#[cfg(test)]
mod effectivity_satellite_tests {
    use std::sync::Arc;

    use vaultgen::data_vault::{
        DataVaultError, DataVaultField, DrivingKeyField, EffectivitySatellite, FieldDataType,
        LoadableEntity, Link, StagingTable,
    };

    const LINK: &str = "l_customer_contact";
    const SATELLITE: &str = "ls_customer_contact_eff";

    fn fields(table: &str, columns: &[(&str, FieldDataType)]) -> Vec<DataVaultField> {
        columns
            .iter()
            .enumerate()
            .map(|(i, (name, data_type))| {
                DataVaultField::new(table, name, *data_type, i as u32 + 1, true).unwrap()
            })
            .collect()
    }

    fn link() -> Link {
        Link::new(
            "dv",
            LINK,
            fields(
                LINK,
                &[
                    ("l_customer_contact_hashkey", FieldDataType::Text),
                    ("h_customer_hashkey", FieldDataType::Text),
                    ("h_contact_hashkey", FieldDataType::Text),
                    ("customer_id", FieldDataType::Text),
                    ("contact_id", FieldDataType::Text),
                    ("r_timestamp", FieldDataType::Timestamp),
                    ("r_source", FieldDataType::Text),
                ],
            ),
        )
        .unwrap()
    }

    fn satellite(driving_keys: &[&str]) -> Result<EffectivitySatellite, DataVaultError> {
        let keys = driving_keys
            .iter()
            .map(|key| DrivingKeyField::new(LINK, key, SATELLITE))
            .collect::<Result<Vec<_>, _>>()?;

        let mut satellite = EffectivitySatellite::new(
            "dv",
            SATELLITE,
            fields(
                SATELLITE,
                &[
                    ("l_customer_contact_hashkey", FieldDataType::Text),
                    ("s_hashdiff", FieldDataType::Text),
                    ("r_timestamp", FieldDataType::Timestamp),
                    ("r_timestamp_end", FieldDataType::Timestamp),
                    ("r_source", FieldDataType::Text),
                    ("is_primary", FieldDataType::Boolean),
                ],
            ),
            keys,
        )?;
        satellite.set_parent_table(Arc::new(link().table().clone()))?;
        satellite
            .table_mut()
            .set_staging_table(StagingTable::new("dv_stg", "contacts_20190806"));
        Ok(satellite)
    }

    #[test]
    fn test_driving_key_condition_for_each_key_list() {
        let cases: [(&[&str], &str); 3] = [
            (
                &["h_customer_hashkey"],
                "satellite.h_customer_hashkey = staging.h_customer_hashkey",
            ),
            (
                &["h_customer_hashkey", "h_contact_hashkey"],
                "satellite.h_customer_hashkey = staging.h_customer_hashkey AND \
                 satellite.h_contact_hashkey = staging.h_contact_hashkey",
            ),
            (
                &["h_contact_hashkey", "customer_id"],
                "satellite.h_contact_hashkey = staging.h_contact_hashkey AND \
                 satellite.customer_id = staging.customer_id",
            ),
        ];

        for (keys, expected) in cases {
            let placeholders = satellite(keys).unwrap().sql_placeholders().unwrap();
            assert_eq!(placeholders["satellite_driving_key_condition"], expected);
            assert_eq!(
                placeholders["link_driving_key_condition"],
                expected.replace("satellite.", "l.")
            );
        }
    }

    #[test]
    fn test_effectivity_keys_overlay_satellite_keys() {
        let satellite = satellite(&["h_customer_hashkey"]).unwrap();
        let base = satellite.base_placeholders().unwrap();
        let placeholders = satellite.sql_placeholders().unwrap();

        assert!(base.keys().all(|key| placeholders.contains_key(key)));
        for key in [
            "link_table",
            "driving_keys",
            "satellite_driving_keys",
            "staging_driving_keys",
            "link_driving_keys",
            "satellite_driving_key_condition",
            "link_driving_key_condition",
            "record_end_timestamp_expression",
        ] {
            assert!(placeholders.contains_key(key), "missing placeholder '{}'", key);
        }
        assert_eq!(placeholders["link_table"], LINK);
        assert_eq!(placeholders["payload_fields"], "s_hashdiff, is_primary");
    }

    #[test]
    fn test_empty_driving_keys_is_a_configuration_error() {
        assert!(matches!(
            satellite(&[]),
            Err(DataVaultError::Configuration { .. })
        ));
    }

    #[test]
    fn test_driving_key_outside_link_is_rejected() {
        let err = satellite(&["h_address_hashkey"]).unwrap_err();
        assert!(err.to_string().contains("not a column of link"), "{}", err);
    }

    #[test]
    fn test_metadata_columns_are_not_driving_keys() {
        for key in ["r_timestamp", "r_source"] {
            assert!(matches!(
                satellite(&[key]),
                Err(DataVaultError::Configuration { .. })
            ));
        }
    }

    #[test]
    fn test_load_statement_is_stable() {
        let satellite = satellite(&["h_customer_hashkey"]).unwrap();
        let placeholders = satellite.sql_placeholders().unwrap();
        let sql = satellite.sql_load_statement().unwrap();

        assert!(sql.contains(&format!("dv.{} AS l", placeholders["link_table"])));
        assert!(sql.contains(&placeholders["satellite_driving_key_condition"]));
        assert!(sql.contains(&placeholders["link_driving_key_condition"]));
        assert!(sql.contains(&placeholders["record_end_timestamp_expression"]));
        assert_eq!(sql, satellite.sql_load_statement().unwrap());
    }
}
