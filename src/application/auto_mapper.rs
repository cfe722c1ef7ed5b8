use tracing::debug;
use crate::domain::{
    catalog::{FieldCatalog, FieldSpec},
    models::ColumnMapping,
};

/// Suggests a source header for every catalog field.
///
/// For each field in catalog order the first matching header (in column order)
/// wins. A header can be suggested for several fields; no one-to-one pass is
/// made. The result is only a starting point for the user.
pub fn auto_map(headers: &[String], catalog: &FieldCatalog) -> ColumnMapping {
    let normalized: Vec<String> = headers.iter().map(|h| normalize(h)).collect();
    let mut mapping = ColumnMapping::new();

    for field in catalog.fields() {
        let candidate = headers
            .iter()
            .zip(&normalized)
            .find(|(_, norm)| is_candidate(norm, field));

        match candidate {
            Some((header, _)) => {
                debug!("Auto-mapped field '{}' to column '{}'", field.key, header);
                mapping.set(field.key, header.clone());
            }
            None => debug!("No column found for field '{}'", field.key),
        }
    }

    mapping
}

fn is_candidate(header: &str, field: &FieldSpec) -> bool {
    if header.is_empty() {
        return false;
    }
    let key = normalize(field.key);
    let label = normalize(field.label);

    header == key || header == label || header.contains(&key) || key.contains(header)
}

fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
