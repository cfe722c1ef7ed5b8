use tracing::debug;
use crate::domain::{
    catalog::FieldCatalog,
    models::{ColumnMapping, RawTable, ValidatedRow},
};

/// Checks every row for blank required fields under the current mapping.
///
/// Always a full recomputation; callers rerun it after any table or mapping
/// change. Optional fields are never looked at and values are not coerced.
pub fn validate_rows(table: &RawTable, mapping: &ColumnMapping, catalog: &FieldCatalog) -> Vec<ValidatedRow> {
    let required: Vec<_> = catalog
        .required()
        .map(|field| (field, mapping.get(field.key)))
        .collect();

    let validated: Vec<ValidatedRow> = table
        .rows
        .iter()
        .enumerate()
        .map(|(position, row)| {
            let errors: Vec<String> = required
                .iter()
                .filter(|(_, header)| {
                    header
                        .and_then(|h| row.value(h))
                        .map_or(true, |value| value.trim().is_empty())
                })
                .map(|(field, _)| format!("Missing {}", field.label))
                .collect();

            ValidatedRow {
                row_number: position + 1,
                row: row.clone(),
                valid: errors.is_empty(),
                errors,
            }
        })
        .collect();

    debug!(
        "Validated {} rows: {} valid, {} invalid",
        validated.len(),
        valid_count(&validated),
        invalid_count(&validated)
    );
    validated
}

pub fn valid_count(rows: &[ValidatedRow]) -> usize {
    rows.iter().filter(|r| r.valid).count()
}

pub fn invalid_count(rows: &[ValidatedRow]) -> usize {
    rows.len() - valid_count(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::FieldSpec;
    use crate::infrastructure::parsers::csv_parser::parse_csv;
    use std::time::Instant;

    fn full_mapping() -> ColumnMapping {
        let mut mapping = ColumnMapping::new();
        mapping.set("recipient_name", "Name");
        mapping.set("recipient_phone", "Phone");
        mapping.set("recipient_address", "Address");
        mapping
    }

    #[test]
    fn test_fully_populated_row_is_valid() {
        let table = parse_csv("Name,Phone,Address\nAli,+9715,Dubai\n").unwrap();
        let rows = validate_rows(&table, &full_mapping(), &FieldCatalog::orders());

        assert_eq!(rows.len(), 1);
        assert!(rows[0].valid);
        assert!(rows[0].errors.is_empty());
        assert_eq!(rows[0].row_number, 1);
    }

    #[test]
    fn test_each_blank_required_field_invalidates_row() {
        let catalog = FieldCatalog::orders();
        let lines = [",+9715,Dubai", "Ali,   ,Dubai", "Ali,+9715,"];
        for (blank, line) in lines.iter().enumerate() {
            let table = parse_csv(&format!("Name,Phone,Address\n{line}\n")).unwrap();
            let rows = validate_rows(&table, &full_mapping(), &catalog);

            assert!(!rows[0].valid, "line {blank} should be invalid");
            assert_eq!(rows[0].errors.len(), 1);
        }
    }

    #[test]
    fn test_unmapped_required_field_fails_every_row() {
        let table = parse_csv("Name,Phone,Address\nAli,+9715,Dubai\nSara,+9716,Ajman\n").unwrap();
        let mut mapping = full_mapping();
        mapping.clear("recipient_phone");

        let rows = validate_rows(&table, &mapping, &FieldCatalog::orders());
        assert_eq!(invalid_count(&rows), 2);
        assert_eq!(rows[1].first_error(), Some("Missing Recipient Phone"));
    }

    #[test]
    fn test_optional_fields_are_ignored() {
        let table = parse_csv("Name,Phone,Address,Notes\nAli,1,Dubai,\n").unwrap();
        let mut mapping = full_mapping();
        mapping.set("notes", "Notes");

        let rows = validate_rows(&table, &mapping, &FieldCatalog::orders());
        assert!(rows[0].valid);
    }

    #[test]
    fn test_errors_follow_catalog_order() {
        let table = parse_csv("Name,Phone,Address\n,,\nx,y,z\n").unwrap();
        let rows = validate_rows(&table, &full_mapping(), &FieldCatalog::orders());

        assert_eq!(
            rows[0].errors,
            vec!["Missing Recipient Name", "Missing Recipient Phone", "Missing Recipient Address"]
        );
        assert_eq!(valid_count(&rows), 1);
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = FieldCatalog::new(vec![FieldSpec::required("sku", "SKU", "A-1")]);
        let table = parse_csv("sku,qty\nA-1,3\n,4\n").unwrap();
        let mut mapping = ColumnMapping::new();
        mapping.set("sku", "sku");

        let rows = validate_rows(&table, &mapping, &catalog);
        assert!(rows[0].valid);
        assert!(!rows[1].valid);
    }

    #[test]
    fn test_thousand_rows_validate_quickly() {
        let mut text = String::from("Name,Phone,Address,Notes\n");
        for i in 0..1_000 {
            text.push_str(&format!("Customer {i},+97150{i},Street {i},note\n"));
        }
        let table = parse_csv(&text).unwrap();

        let start = Instant::now();
        let rows = validate_rows(&table, &full_mapping(), &FieldCatalog::orders());
        assert_eq!(valid_count(&rows), 1_000);
        assert!(start.elapsed().as_millis() < 500);
    }
}
