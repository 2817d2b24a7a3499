use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{info, instrument};

use crate::error::{Result, ToolError};
use crate::io::{discovery, excel_read, excel_write};
use crate::model::CustomerInfo;
use crate::template::DeliveryNoteTemplate;

/// File name prefix of the generated delivery note.
pub const OUTPUT_FILE_PREFIX: &str = "出货单";

/// Path of the delivery note generated for `order_id` inside `folder`.
pub fn output_path(folder: &Path, order_id: &str) -> PathBuf {
    folder.join(format!("{OUTPUT_FILE_PREFIX}_{order_id}.xlsx"))
}

/// Generates the delivery note for the production order found in `folder`,
/// dated today. Returns the path of the written file.
pub fn generate_delivery_note(
    folder: &Path,
    customer: &CustomerInfo,
    template: &DeliveryNoteTemplate,
) -> Result<PathBuf> {
    generate_delivery_note_on(folder, customer, template, Local::now().date_naive())
}

/// Same as [`generate_delivery_note`] with an explicit delivery date.
#[instrument(level = "info", skip_all, fields(folder = %folder.display(), %delivery_date))]
pub fn generate_delivery_note_on(
    folder: &Path,
    customer: &CustomerInfo,
    template: &DeliveryNoteTemplate,
    delivery_date: NaiveDate,
) -> Result<PathBuf> {
    if !folder.is_dir() {
        return Err(ToolError::MissingInput(folder.to_path_buf()));
    }

    let production_file = discovery::find_production_file(folder)?
        .ok_or_else(|| ToolError::ProductionFileNotFound(folder.to_path_buf()))?;
    info!(input = %production_file.display(), "using production order");

    let order = excel_read::read_production_order(&production_file)?;
    let output = output_path(folder, &order.order_id);
    excel_write::write_delivery_note(&order, customer, &output, folder, template, delivery_date)?;
    Ok(output)
}
