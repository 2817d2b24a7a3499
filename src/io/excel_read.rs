use std::path::Path;

use calamine::{DataType, Range, Reader, open_workbook_auto};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ToolError};
use crate::model::{LineItem, ProductionOrder};

/// Text that labels the order number cell in the header region.
pub const ORDER_ID_MARKER: &str = "销售单号";
/// Text of the first header cell of the item table.
pub const TABLE_HEADER_MARKER: &str = "序号";
/// Number of leading rows searched for the order number.
pub const HEADER_SCAN_ROWS: u32 = 10;
/// Columns (A, B, C) searched for the table header marker.
const TABLE_HEADER_SCAN_COLUMNS: u32 = 3;

const SEQUENCE_COLUMN: &str = TABLE_HEADER_MARKER;
const PRODUCT_CODE_COLUMN: &str = "图号";
const MATERIAL_COLUMN: &str = "材料";
const QUANTITY_COLUMN: &str = "数量";
const SPECIFICATION_COLUMN: &str = "规格";

/// Reads the production order stored on the first worksheet of `path`.
///
/// calamine exposes no active-sheet marker, so the first worksheet stands in
/// for it, the same sheet a `sheet_name=0` reader would pick.
#[instrument(level = "info", skip_all, fields(input = %path.display()))]
pub fn read_production_order(path: &Path) -> Result<ProductionOrder> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ToolError::EmptyWorkbook(path.to_path_buf()))??;
    let order = extract_order(&range)?;
    info!(
        order_id = %order.order_id,
        item_count = order.items.len(),
        "extracted production order"
    );
    Ok(order)
}

/// Extracts the order number and item table from an in-memory sheet.
///
/// Positions are absolute sheet coordinates, so a range that does not start
/// at `A1` is handled the same way as one that does.
pub fn extract_order(range: &Range<DataType>) -> Result<ProductionOrder> {
    let order_id = find_order_id(range).ok_or_else(|| ToolError::MissingOrderId {
        marker: ORDER_ID_MARKER.to_string(),
        rows: HEADER_SCAN_ROWS,
    })?;
    let header_row = find_table_header_row(range)
        .ok_or_else(|| ToolError::MissingTableHeader(TABLE_HEADER_MARKER.to_string()))?;
    debug!(%order_id, header_row = header_row + 1, "located order header");

    let items = read_items(range, header_row)?;
    Ok(ProductionOrder { order_id, items })
}

/// Scans the first [`HEADER_SCAN_ROWS`] rows for the order number marker.
///
/// Every matching cell overwrites the previous candidate, so the last match
/// in row-major order wins. An empty winner counts as not found.
fn find_order_id(range: &Range<DataType>) -> Option<String> {
    let (_, end_col) = range.end()?;
    let mut order_id = None;

    for row in 0..HEADER_SCAN_ROWS {
        for col in 0..=end_col {
            let Some(DataType::String(text)) = range.get_value((row, col)) else {
                continue;
            };
            let text = text.replace('：', ":");
            if !text.contains(ORDER_ID_MARKER) {
                continue;
            }
            match text.split_once(':') {
                Some((_, value)) => {
                    if order_id.is_some() {
                        warn!(row = row + 1, "order number marker repeated, later value wins");
                    }
                    order_id = Some(value.trim().to_string());
                }
                None => debug!(row = row + 1, "order number marker without a colon ignored"),
            }
        }
    }

    order_id.filter(|id| !id.is_empty())
}

/// Returns the zero-based row of the first `序号` cell, searching column A
/// top to bottom, then B, then C.
fn find_table_header_row(range: &Range<DataType>) -> Option<u32> {
    let (end_row, _) = range.end()?;
    (0..TABLE_HEADER_SCAN_COLUMNS).find_map(|col| {
        (0..=end_row).find(|&row| {
            matches!(
                range.get_value((row, col)),
                Some(DataType::String(text)) if text.trim() == TABLE_HEADER_MARKER
            )
        })
    })
}

struct ItemColumns {
    sequence: u32,
    product_code: u32,
    material: u32,
    quantity: u32,
    specification: Option<u32>,
}

impl ItemColumns {
    fn locate(range: &Range<DataType>, header_row: u32) -> Result<Self> {
        let end_col = range.end().map(|(_, col)| col).unwrap_or(0);
        let headers: Vec<(u32, String)> = (0..=end_col)
            .map(|col| (col, cell_to_string(range.get_value((header_row, col)))))
            .collect();

        let find = |name: &str| {
            headers
                .iter()
                .find(|(_, header)| header.trim() == name)
                .map(|(col, _)| *col)
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| ToolError::MissingColumn {
                column: name.to_string(),
                row: header_row + 1,
            })
        };

        Ok(Self {
            sequence: require(SEQUENCE_COLUMN)?,
            product_code: require(PRODUCT_CODE_COLUMN)?,
            material: require(MATERIAL_COLUMN)?,
            quantity: require(QUANTITY_COLUMN)?,
            specification: find(SPECIFICATION_COLUMN),
        })
    }
}

fn read_items(range: &Range<DataType>, header_row: u32) -> Result<Vec<LineItem>> {
    let columns = ItemColumns::locate(range, header_row)?;
    let end_row = range.end().map(|(row, _)| row).unwrap_or(header_row);
    let mut items = Vec::new();

    for row in header_row + 1..=end_row {
        let sequence_cell = range.get_value((row, columns.sequence));
        if is_blank(sequence_cell) {
            debug!(row = row + 1, "blank sequence number ends the item table");
            break;
        }

        let sequence = cell_to_u32(sequence_cell, SEQUENCE_COLUMN, row)?;
        let product_code = flatten_lines(&cell_to_string(
            range.get_value((row, columns.product_code)),
        ));
        let mut material = cell_to_string(range.get_value((row, columns.material)));
        if let Some(spec_col) = columns.specification {
            let spec_cell = range.get_value((row, spec_col));
            if !is_blank(spec_cell) {
                material.push_str(&format!(" ({})", cell_to_string(spec_cell)));
            }
        }
        let quantity = cell_to_u32(
            range.get_value((row, columns.quantity)),
            QUANTITY_COLUMN,
            row,
        )?;

        items.push(LineItem::new(sequence, product_code, material, quantity));
    }

    Ok(items)
}

fn flatten_lines(value: &str) -> String {
    value.replace("\r\n", " ").replace(['\r', '\n'], " ").trim().to_string()
}

fn is_blank(cell: Option<&DataType>) -> bool {
    match cell {
        None | Some(DataType::Empty) => true,
        Some(DataType::String(value)) => value.trim().is_empty(),
        Some(_) => false,
    }
}

fn cell_to_u32(cell: Option<&DataType>, column: &str, row: u32) -> Result<u32> {
    let parsed = match cell {
        Some(DataType::Int(value)) => u32::try_from(*value).ok(),
        Some(DataType::Float(value)) => {
            let truncated = value.trunc();
            (truncated.is_finite() && truncated >= 0.0 && truncated <= f64::from(u32::MAX))
                .then_some(truncated as u32)
        }
        Some(DataType::String(value)) => value.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ToolError::InvalidNumber {
        column: column.to_string(),
        row: row + 1,
        value: cell_to_string(cell),
    })
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
