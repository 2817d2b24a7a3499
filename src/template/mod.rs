//! Declarative description of the delivery note layout.
//!
//! Every visual constant used by the renderer lives in
//! [`DeliveryNoteTemplate`], so a layout change never touches the assembly
//! logic in [`excel_write`](crate::io::excel_write). The defaults reproduce the
//! reference layout exactly; a JSON file may override any subset of fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Number of columns spanned by the banner, header grid and item table.
pub const TABLE_COLUMNS: u16 = 7;
/// Extensions probed, in order, when looking for an item picture.
pub const IMAGE_EXTENSIONS: [&str; 5] = [".png", ".jpg", ".jpeg", ".bmp", ".gif"];

/// Font settings shared by one class of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontStyle {
    pub name: String,
    pub size: f64,
    #[serde(default)]
    pub bold: bool,
    #[serde(with = "hex_color")]
    pub color: u32,
}

impl FontStyle {
    fn new(size: f64, bold: bool, color: u32) -> Self {
        Self {
            name: "PingFang SC".to_string(),
            size,
            bold,
            color,
        }
    }
}

/// Text of every fixed label in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub order_number: String,
    pub customer_name: String,
    pub contact_person: String,
    pub material_number: String,
    pub delivery_date: String,
    pub prepared_by: String,
    pub total_quantity: String,
    pub signed_by: String,
    /// Item table headers, one per column A-G.
    pub table_headers: [String; TABLE_COLUMNS as usize],
    /// Shown in the image column when no picture exists for an item.
    pub image_placeholder: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            order_number: "交货单号".to_string(),
            customer_name: "客户名称".to_string(),
            contact_person: "联系人".to_string(),
            material_number: "料号".to_string(),
            delivery_date: "送货日期".to_string(),
            prepared_by: "制单人".to_string(),
            total_quantity: "货品总数".to_string(),
            signed_by: "签收人".to_string(),
            table_headers: [
                "序号".to_string(),
                "产品图片".to_string(),
                "产品编号".to_string(),
                "产品名称".to_string(),
                "材料".to_string(),
                "交货数量".to_string(),
                "备注".to_string(),
            ],
            image_placeholder: "—".to_string(),
        }
    }
}

/// Fonts used by the different regions of the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fonts {
    pub company: FontStyle,
    pub title: FontStyle,
    pub label: FontStyle,
    pub value: FontStyle,
    pub table_header: FontStyle,
    pub table_cell: FontStyle,
}

impl Default for Fonts {
    fn default() -> Self {
        Self {
            company: FontStyle::new(20.0, false, 0x1D1D1F),
            title: FontStyle::new(32.0, false, 0x1D1D1F),
            label: FontStyle::new(12.0, false, 0x86868B),
            value: FontStyle::new(12.0, false, 0x1D1D1F),
            table_header: FontStyle::new(11.0, true, 0x1D1D1F),
            table_cell: FontStyle::new(11.0, false, 0x1D1D1F),
        }
    }
}

/// Complete visual template of the delivery note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryNoteTemplate {
    pub sheet_name: String,
    pub company_name: String,
    pub title: String,
    pub labels: Labels,
    pub fonts: Fonts,
    /// Widths of columns A-G in character units.
    pub column_widths: [f64; TABLE_COLUMNS as usize],
    /// Heights of rows 1-8 in points.
    pub header_row_heights: [f64; 8],
    pub item_row_height: f64,
    pub signature_row_height: f64,
    /// Edge length, in pixels, pictures are scaled to.
    pub image_size: f64,
    #[serde(with = "hex_color")]
    pub header_fill: u32,
    #[serde(with = "hex_color")]
    pub border_color: u32,
}

impl Default for DeliveryNoteTemplate {
    fn default() -> Self {
        Self {
            sheet_name: "交货单".to_string(),
            company_name: "杭州越侬模型科技有限公司".to_string(),
            title: "交货单".to_string(),
            labels: Labels::default(),
            fonts: Fonts::default(),
            column_widths: [12.0, 15.0, 28.0, 28.0, 15.0, 12.0, 15.0],
            header_row_heights: [30.0, 45.0, 20.0, 25.0, 25.0, 25.0, 25.0, 15.0],
            item_row_height: 60.0,
            signature_row_height: 30.0,
            image_size: 75.0,
            header_fill: 0xF5F5F7,
            border_color: 0xE5E5EA,
        }
    }
}

impl DeliveryNoteTemplate {
    /// Loads a template override from a JSON file. Fields missing from the
    /// file keep their default values.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// Serialises `0xRRGGBB` colors as `"#RRGGBB"` strings.
mod hex_color {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("#{color:06X}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let text = String::deserialize(deserializer)?;
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(D::Error::custom(format!("expected #RRGGBB color, got '{text}'")));
        }
        u32::from_str_radix(digits, 16).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let template: DeliveryNoteTemplate = serde_json::from_str(
            r##"{"company_name": "Acme", "border_color": "#112233"}"##,
        )
        .expect("template parsed");

        assert_eq!(template.company_name, "Acme");
        assert_eq!(template.border_color, 0x112233);
        assert_eq!(template.sheet_name, "交货单");
        assert_eq!(template.item_row_height, 60.0);
    }

    #[test]
    fn rejects_malformed_color() {
        let result = serde_json::from_str::<DeliveryNoteTemplate>(r#"{"header_fill": "red"}"#);
        assert!(result.is_err());
    }
}
