//! Destination schema for imported orders.

/// One destination attribute a CSV column can be mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
    /// Sample value written to the downloadable template.
    pub example: &'static str,
}

impl FieldSpec {
    pub const fn required(key: &'static str, label: &'static str, example: &'static str) -> Self {
        Self { key, label, required: true, example }
    }

    pub const fn optional(key: &'static str, label: &'static str, example: &'static str) -> Self {
        Self { key, label, required: false, example }
    }
}

const ORDER_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("recipient_name", "Recipient Name", "John Doe"),
    FieldSpec::required("recipient_phone", "Recipient Phone", "+971501234567"),
    FieldSpec::required("recipient_address", "Recipient Address", "123 Al Barsha Dubai"),
    FieldSpec::optional("recipient_area", "Area / District", "Al Barsha"),
    FieldSpec::optional("recipient_emirate", "Emirate / City", "Dubai"),
    FieldSpec::optional("sender_name", "Sender Name", "Sender Co"),
    FieldSpec::optional("sender_phone", "Sender Phone", "+971501111111"),
    FieldSpec::optional("sender_address", "Sender Address", "Warehouse 1"),
    FieldSpec::optional("order_type", "Order Type", "standard"),
    FieldSpec::optional("category", "Category", "parcel"),
    FieldSpec::optional("weight_kg", "Weight (kg)", "2.5"),
    FieldSpec::optional("description", "Description", "Electronics"),
    FieldSpec::optional("special_instructions", "Special Instructions", "Handle with care"),
    FieldSpec::optional("payment_method", "Payment Method", "cod"),
    FieldSpec::optional("cod_amount", "COD Amount", "150"),
    FieldSpec::optional("delivery_fee", "Delivery Fee", "25"),
    FieldSpec::optional("notes", "Notes", "Urgent delivery"),
];

/// Ordered, fixed list of destination fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCatalog {
    fields: Vec<FieldSpec>,
}

impl FieldCatalog {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// The create-order schema.
    pub fn orders() -> Self {
        Self::new(ORDER_FIELDS.to_vec())
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn required(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.key)
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::orders()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_order_catalog_requires_recipient_contact() {
        let catalog = FieldCatalog::orders();
        let required: Vec<_> = catalog.required().map(|f| f.key).collect();
        assert_eq!(required, vec!["recipient_name", "recipient_phone", "recipient_address"]);
    }

    #[test]
    fn test_order_catalog_keys_are_unique() {
        let catalog = FieldCatalog::orders();
        let keys: HashSet<_> = catalog.keys().collect();
        assert_eq!(keys.len(), catalog.fields().len());
    }

    #[test]
    fn test_get_unknown_key() {
        assert!(FieldCatalog::orders().get("tracking_number").is_none());
        assert_eq!(FieldCatalog::orders().get("notes").map(|f| f.required), Some(false));
    }
}
