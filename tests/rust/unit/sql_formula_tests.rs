//! Unit tests for the SQL formula helpers

#[cfg(test)]
mod sql_formula_tests {
    use vaultgen::sql_generator::{
        format_fields_for_join, format_fields_for_select, hashkey_sql,
        record_end_timestamp_expression, FormattingError,
    };

    #[test]
    fn test_select_fragments_follow_input_order() {
        let fields = ["h_contact_hashkey", "h_customer_hashkey"];

        assert_eq!(
            format_fields_for_select(&fields, Some("l")).unwrap(),
            vec!["l.h_contact_hashkey", "l.h_customer_hashkey"]
        );
        assert_eq!(
            format_fields_for_select(&fields, None).unwrap(),
            vec!["h_contact_hashkey", "h_customer_hashkey"]
        );
    }

    #[test]
    fn test_join_predicates_per_field() {
        let fields = vec!["k1".to_string(), "k2".to_string()];
        let predicates = format_fields_for_join(&fields, "satellite", "staging").unwrap();

        assert_eq!(
            predicates.join(" AND "),
            "satellite.k1 = staging.k1 AND satellite.k2 = staging.k2"
        );
    }

    #[test]
    fn test_empty_field_lists_are_rejected() {
        let empty: [&str; 0] = [];

        assert!(matches!(
            format_fields_for_select(&empty, None),
            Err(FormattingError::EmptyFieldList { .. })
        ));
        assert!(matches!(
            format_fields_for_join(&empty, "l", "staging"),
            Err(FormattingError::EmptyFieldList { .. })
        ));
        assert!(record_end_timestamp_expression(&[]).is_err());
        assert!(hashkey_sql("h_customer_hashkey", &[], &[]).is_err());
    }

    #[test]
    fn test_record_end_timestamp_expression() {
        let keys = vec!["h_customer_hashkey".to_string(), "h_contact_hashkey".to_string()];
        assert_eq!(
            record_end_timestamp_expression(&keys).unwrap(),
            "COALESCE(LEAD(r_timestamp) OVER (PARTITION BY h_customer_hashkey, h_contact_hashkey \
             ORDER BY r_timestamp), CAST('9999-12-31 00:00:00' AS TIMESTAMP))"
        );
    }
}
