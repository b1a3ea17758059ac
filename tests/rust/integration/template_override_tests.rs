//! Integration tests for template override directories

#[cfg(test)]
mod template_override_tests {
    use std::fs;

    use vaultgen::data_vault::DataVaultModelConfig;
    use vaultgen::sql_generator::{
        render_template, TemplateError, TemplateRegistry, HUB_DML, LINK_DML,
    };

    const MODEL: &str = r#"
target_schema: dv
extract_schema: dv_extract
extract_table: extract_customers
staging_schema: dv_stg
staging_table: customers_20190806_000000
extract_start_timestamp: "2019-08-06T00:00:00"
record_source: crm
hubs:
  - name: h_customer
    fields:
      - { name: h_customer_hashkey, data_type: TEXT, position: 1 }
      - { name: r_timestamp, data_type: TIMESTAMP, position: 2 }
      - { name: r_source, data_type: TEXT, position: 3 }
      - { name: customer_id, data_type: TEXT, position: 4 }
"#;

    #[test]
    fn test_override_renders_with_table_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(HUB_DML),
            "INSERT INTO {target_schema}.{data_vault_table} ({hub_fields}) \
             SELECT {staging_hub_fields} FROM {staging_schema}.{staging_table} AS staging",
        )
        .unwrap();
        let registry = TemplateRegistry::with_override_dir(dir.path());

        let load = DataVaultModelConfig::from_yaml_str(MODEL)
            .unwrap()
            .into_load()
            .unwrap();
        let hub = load.table("h_customer").unwrap().as_entity();

        let template = registry.get(HUB_DML).unwrap();
        let sql = render_template(HUB_DML, &template, &hub.sql_placeholders().unwrap()).unwrap();
        assert_eq!(
            sql,
            "INSERT INTO dv.h_customer (h_customer_hashkey, r_timestamp, r_source, customer_id) \
             SELECT staging.h_customer_hashkey, staging.r_timestamp, staging.r_source, staging.customer_id \
             FROM dv_stg.customers_20190806_000000 AS staging"
        );

        // Templates missing from the directory fall back to the built-in ones.
        assert!(registry.get(LINK_DML).unwrap().starts_with("INSERT INTO {target_schema}"));
    }

    #[test]
    fn test_override_with_unknown_placeholder_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(HUB_DML), "SELECT {hub_colour}").unwrap();
        let registry = TemplateRegistry::with_override_dir(dir.path());

        let load = DataVaultModelConfig::from_yaml_str(MODEL)
            .unwrap()
            .into_load()
            .unwrap();
        let placeholders = load
            .table("h_customer")
            .unwrap()
            .as_entity()
            .sql_placeholders()
            .unwrap();

        let template = registry.get(HUB_DML).unwrap();
        match render_template(HUB_DML, &template, &placeholders) {
            Err(TemplateError::MissingPlaceholder { placeholder, .. }) => {
                assert_eq!(placeholder, "hub_colour")
            }
            other => panic!("expected a missing placeholder error, got {:?}", other),
        }
    }
}
