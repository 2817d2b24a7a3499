use serde::{Deserialize, Serialize};

/// One row of the production order's item table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Sequence number as written in the source table.
    pub sequence: u32,
    /// Product drawing number with line breaks flattened.
    pub product_code: String,
    /// Display name. The production order carries no separate name, so this
    /// mirrors the product code.
    pub product_name: String,
    /// Material, optionally followed by ` (<specification>)`.
    pub material: String,
    /// Quantity to deliver.
    pub quantity: u32,
    /// File stem probed when looking for the item's picture.
    pub image_key: String,
}

impl LineItem {
    /// Creates an item whose name and image key both derive from the product code.
    pub fn new(
        sequence: u32,
        product_code: impl Into<String>,
        material: impl Into<String>,
        quantity: u32,
    ) -> Self {
        let product_code = product_code.into();
        Self {
            sequence,
            product_name: product_code.clone(),
            image_key: product_code.clone(),
            product_code,
            material: material.into(),
            quantity,
        }
    }
}

/// Order number and items extracted from a single production order file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionOrder {
    pub order_id: String,
    pub items: Vec<LineItem>,
}

impl ProductionOrder {
    /// Sum of all item quantities, shown in the delivery note header.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// Customer-facing header fields supplied by the caller rather than the input file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub customer_name: String,
    pub contact_person: String,
    #[serde(default)]
    pub material_number: Option<String>,
    pub prepared_by: String,
}

impl CustomerInfo {
    /// Material number as rendered in the header; absent values render empty.
    pub fn material_number_text(&self) -> &str {
        self.material_number.as_deref().unwrap_or_default()
    }
}
