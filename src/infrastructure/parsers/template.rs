use csv::WriterBuilder;
use tracing::debug;
use crate::domain::{catalog::FieldCatalog, error::ImportError};

pub const TEMPLATE_FILE_NAME: &str = "order_import_template.csv";

/// Builds the downloadable template: catalog keys as the header row and one
/// example row. Never read back by the parser.
pub fn template_csv(catalog: &FieldCatalog) -> Result<String, ImportError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record(catalog.fields().iter().map(|f| f.key))
        .map_err(|e| ImportError::Template(e.to_string()))?;
    writer
        .write_record(catalog.fields().iter().map(|f| f.example))
        .map_err(|e| ImportError::Template(e.to_string()))?;

    let bytes = writer
        .into_inner()
        .map_err(|e| ImportError::Template(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| ImportError::Template(e.to_string()))?;

    debug!("Generated import template with {} columns", catalog.fields().len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::FieldSpec;
    use crate::infrastructure::parsers::csv_parser::parse_csv;

    #[test]
    fn test_template_header_is_catalog_keys() {
        let catalog = FieldCatalog::orders();
        let text = template_csv(&catalog).unwrap();
        let header = text.lines().next().unwrap();

        let expected: Vec<_> = catalog.keys().collect();
        assert_eq!(header, expected.join(","));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_example_values_with_commas_are_quoted() {
        let catalog = FieldCatalog::new(vec![
            FieldSpec::required("recipient_name", "Recipient Name", "Doe, John"),
            FieldSpec::optional("notes", "Notes", "none"),
        ]);
        let text = template_csv(&catalog).unwrap();
        assert!(text.contains("\"Doe, John\""));

        let table = parse_csv(&text).unwrap();
        assert_eq!(table.rows[0].value("recipient_name"), Some("Doe, John"));
    }
}
