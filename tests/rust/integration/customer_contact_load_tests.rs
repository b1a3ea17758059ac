//! Integration tests for a customer/contact load
//!
//! A customer keeps one active contact at a time: the effectivity satellite
//! `ls_customer_contact_eff` versions link `l_customer_contact` by the
//! customer hashkey.

#[cfg(test)]
mod customer_contact_load_tests {
    use std::fs;

    use vaultgen::config::GeneratorConfig;
    use vaultgen::data_vault::{DataVaultError, DataVaultModelConfig, LoadableEntity, TargetTable};

    const MODEL: &str = r#"
target_schema: dv
extract_schema: dv_extract
extract_table: extract_customer_contacts
staging_schema: dv_stg
staging_table: customer_contacts_20190806_000000
extract_start_timestamp: "2019-08-06T00:00:00"
record_source: crm
hubs:
  - name: h_customer
    fields:
      - { name: h_customer_hashkey, data_type: TEXT, position: 1 }
      - { name: r_timestamp, data_type: TIMESTAMP, position: 2 }
      - { name: r_source, data_type: TEXT, position: 3 }
      - { name: customer_id, data_type: TEXT, position: 4 }
  - name: h_contact
    fields:
      - { name: h_contact_hashkey, data_type: TEXT, position: 1 }
      - { name: r_timestamp, data_type: TIMESTAMP, position: 2 }
      - { name: r_source, data_type: TEXT, position: 3 }
      - { name: contact_id, data_type: TEXT, position: 4 }
links:
  - name: l_customer_contact
    fields:
      - { name: l_customer_contact_hashkey, data_type: TEXT, position: 1 }
      - { name: h_customer_hashkey, data_type: TEXT, position: 2 }
      - { name: h_contact_hashkey, data_type: TEXT, position: 3 }
      - { name: customer_id, data_type: TEXT, position: 4 }
      - { name: contact_id, data_type: TEXT, position: 5 }
      - { name: r_timestamp, data_type: TIMESTAMP, position: 6 }
      - { name: r_source, data_type: TEXT, position: 7 }
satellites:
  - name: hs_contact
    fields:
      - { name: h_contact_hashkey, data_type: TEXT, position: 1 }
      - { name: s_hashdiff, data_type: TEXT, position: 2 }
      - { name: r_timestamp, data_type: TIMESTAMP, position: 3 }
      - { name: r_timestamp_end, data_type: TIMESTAMP, position: 4 }
      - { name: r_source, data_type: TEXT, position: 5 }
      - { name: email, data_type: TEXT, position: 6, length: 255, is_mandatory: false }
effectivity_satellites:
  - name: ls_customer_contact_eff
    driving_keys: [h_customer_hashkey]
    fields:
      - { name: l_customer_contact_hashkey, data_type: TEXT, position: 1 }
      - { name: s_hashdiff, data_type: TEXT, position: 2 }
      - { name: r_timestamp, data_type: TIMESTAMP, position: 3 }
      - { name: r_timestamp_end, data_type: TIMESTAMP, position: 4 }
      - { name: r_source, data_type: TEXT, position: 5 }
"#;

    fn model_file() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customer_contact.yaml");
        fs::write(&path, MODEL).unwrap();
        (dir, path)
    }

    #[test]
    fn test_effectivity_satellite_statement() {
        let (_dir, path) = model_file();
        let load = DataVaultModelConfig::from_yaml_file(&path)
            .unwrap()
            .into_load()
            .unwrap();

        let satellite = match load.table("ls_customer_contact_eff") {
            Some(TargetTable::EffectivitySatellite(satellite)) => satellite,
            other => panic!("expected an effectivity satellite, got {:?}", other),
        };
        let placeholders = satellite.sql_placeholders().unwrap();
        assert_eq!(placeholders["link_table"], "l_customer_contact");
        assert_eq!(placeholders["driving_keys"], "h_customer_hashkey");
        assert_eq!(
            placeholders["satellite_driving_key_condition"],
            "satellite.h_customer_hashkey = staging.h_customer_hashkey"
        );
        assert_eq!(
            placeholders["link_driving_key_condition"],
            "l.h_customer_hashkey = staging.h_customer_hashkey"
        );

        let sql = satellite.sql_load_statement().unwrap();
        assert!(sql.starts_with("MERGE INTO dv.ls_customer_contact_eff AS satellite"));
        assert!(sql.contains("    h_customer_hashkey,\n"));
        assert!(sql.contains("INNER JOIN dv.l_customer_contact AS l"));
        assert!(sql.contains("satellite.h_customer_hashkey = staging.h_customer_hashkey"));
        assert!(sql.contains("l.h_customer_hashkey = staging.h_customer_hashkey"));
        assert!(sql.contains("PARTITION BY h_customer_hashkey ORDER BY r_timestamp"));
    }

    #[test]
    fn test_full_script() {
        let (_dir, path) = model_file();
        let load = DataVaultModelConfig::from_yaml_file(&path)
            .unwrap()
            .into_load()
            .unwrap();

        let staging = load.staging_create_sql_statement().unwrap();
        assert!(staging.contains("CAST(email AS TEXT(255)) AS email"));
        assert!(staging.contains("\n  email TEXT(255),\n"));
        assert!(staging.contains("\n  customer_id TEXT NOT NULL,\n"));
        assert!(staging.contains("\n  l_customer_contact_hashkey TEXT NOT NULL,\n"));
        assert!(staging.contains("'crm' AS r_source"));
        assert!(staging.contains("AS hs_contact_hashdiff"));
        assert!(staging.contains("AS ls_customer_contact_eff_hashdiff"));

        let script = load.sql_load_script().unwrap();
        assert_eq!(script.len(), 5);
        assert!(script[0].starts_with("INSERT INTO dv.h_customer "));
        assert!(script[1].starts_with("INSERT INTO dv.h_contact "));
        assert!(script[2].starts_with("INSERT INTO dv.l_customer_contact "));
        assert!(script[3].starts_with("MERGE INTO dv.hs_contact "));
        assert!(script[4].starts_with("MERGE INTO dv.ls_customer_contact_eff "));

        let mut statements = vec![staging];
        statements.extend(script);
        let joined = GeneratorConfig::default().join_statements(&statements);
        assert_eq!(joined.matches(";\n\n").count(), 6);
        assert!(!joined.contains('{'));
    }

    #[test]
    fn test_sat_prefixed_effectivity_satellite() {
        let model = MODEL.replace("ls_customer_contact_eff", "sat_customer_contact_eff");
        let load = DataVaultModelConfig::from_yaml_str(&model)
            .unwrap()
            .into_load()
            .unwrap();

        let satellite = match load.table("sat_customer_contact_eff") {
            Some(TargetTable::EffectivitySatellite(satellite)) => satellite,
            other => panic!("expected an effectivity satellite, got {:?}", other),
        };
        let sql = satellite.sql_load_statement().unwrap();
        assert!(sql.starts_with("MERGE INTO dv.sat_customer_contact_eff AS satellite"));
        assert!(sql.contains("    h_customer_hashkey,\n"));
        assert!(sql.contains("INNER JOIN dv.l_customer_contact AS l"));
        assert!(sql.contains("satellite.h_customer_hashkey = staging.h_customer_hashkey"));
        assert!(sql.contains("l.h_customer_hashkey = staging.h_customer_hashkey"));
        assert!(sql.contains("staging.sat_customer_contact_eff_hashdiff"));

        let staging = load.staging_create_sql_statement().unwrap();
        assert!(staging.contains("AS sat_customer_contact_eff_hashdiff"));
    }

    #[test]
    fn test_driving_key_must_belong_to_link() {
        let model = MODEL.replace(
            "driving_keys: [h_customer_hashkey]",
            "driving_keys: [h_address_hashkey]",
        );
        let err = DataVaultModelConfig::from_yaml_str(&model)
            .unwrap()
            .into_load()
            .unwrap_err();
        assert!(matches!(err, DataVaultError::Configuration { .. }), "{}", err);
        assert!(err.to_string().contains("ls_customer_contact_eff"), "{}", err);
    }

    #[test]
    fn test_effectivity_satellite_without_link_is_rejected() {
        let model = MODEL.replace("links:", "unused_links:");
        let result = DataVaultModelConfig::from_yaml_str(&model);
        // Unknown keys are ignored, so the model parses and fails on parent resolution.
        let err = result.unwrap().into_load().unwrap_err();
        assert!(err.to_string().contains("'l_customer_contact' is not part of the load"), "{}", err);
    }
}
