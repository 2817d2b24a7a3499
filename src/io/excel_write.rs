use std::path::Path;

use chrono::NaiveDate;
use rust_xlsxwriter::{
    Format, FormatAlign, FormatBorder, FormatPattern, Image, Workbook, Worksheet,
};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::io::discovery::find_item_image;
use crate::model::{CustomerInfo, LineItem, ProductionOrder};
use crate::template::{DeliveryNoteTemplate, FontStyle, TABLE_COLUMNS};

/// Zero-based row of the item table header (row 9 in the sheet).
const TABLE_HEADER_ROW: u32 = 8;
/// Zero-based row that carries the divider border above the table.
const DIVIDER_ROW: u32 = 7;
const LAST_COLUMN: u16 = TABLE_COLUMNS - 1;
const IMAGE_COLUMN: u16 = 1;

/// Cell formats derived once from the template.
struct Formats {
    company: Format,
    title: Format,
    label: Format,
    value: Format,
    bottom_rule: Format,
    table_header: Format,
    table_cell: Format,
}

impl Formats {
    fn new(template: &DeliveryNoteTemplate) -> Self {
        let fonts = &template.fonts;
        let centered = |format: Format| {
            format
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap()
        };
        let left = |format: Format| {
            format
                .set_align(FormatAlign::Left)
                .set_align(FormatAlign::VerticalCenter)
        };
        let boxed = |format: Format| {
            format
                .set_border(FormatBorder::Thin)
                .set_border_color(template.border_color)
        };

        Self {
            company: centered(font(&fonts.company)),
            title: centered(font(&fonts.title)),
            label: left(font(&fonts.label)),
            value: left(font(&fonts.value)),
            bottom_rule: Format::new()
                .set_border_bottom(FormatBorder::Thin)
                .set_border_bottom_color(template.border_color),
            table_header: boxed(centered(font(&fonts.table_header)))
                .set_pattern(FormatPattern::Solid)
                .set_background_color(template.header_fill),
            table_cell: boxed(centered(font(&fonts.table_cell))),
        }
    }
}

fn font(style: &FontStyle) -> Format {
    let format = Format::new()
        .set_font_name(&style.name)
        .set_font_size(style.size)
        .set_font_color(style.color);
    if style.bold { format.set_bold() } else { format }
}

/// Renders the delivery note and saves it to `output`.
#[instrument(
    level = "info",
    skip_all,
    fields(order_id = %order.order_id, output = %output.display())
)]
pub fn write_delivery_note(
    order: &ProductionOrder,
    customer: &CustomerInfo,
    output: &Path,
    image_dir: &Path,
    template: &DeliveryNoteTemplate,
    delivery_date: NaiveDate,
) -> Result<()> {
    let mut workbook = build_delivery_note(order, customer, image_dir, template, delivery_date)?;
    workbook.save(output)?;
    info!(item_count = order.items.len(), "delivery note written");
    Ok(())
}

/// Assembles the delivery note workbook in memory without saving it.
pub fn build_delivery_note(
    order: &ProductionOrder,
    customer: &CustomerInfo,
    image_dir: &Path,
    template: &DeliveryNoteTemplate,
    delivery_date: NaiveDate,
) -> Result<Workbook> {
    let formats = Formats::new(template);
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&template.sheet_name)?;

    for (col, width) in template.column_widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }
    for (row, height) in template.header_row_heights.iter().enumerate() {
        worksheet.set_row_height(row as u32, *height)?;
    }

    worksheet.merge_range(0, 0, 0, LAST_COLUMN, &template.company_name, &formats.company)?;
    worksheet.merge_range(1, 0, 1, LAST_COLUMN, &template.title, &formats.title)?;

    write_header_fields(worksheet, order, customer, template, &formats, delivery_date)?;

    for col in 0..TABLE_COLUMNS {
        worksheet.write_blank(DIVIDER_ROW, col, &formats.bottom_rule)?;
    }
    for (col, header) in template.labels.table_headers.iter().enumerate() {
        worksheet.write_string_with_format(
            TABLE_HEADER_ROW,
            col as u16,
            header,
            &formats.table_header,
        )?;
    }

    let mut row = TABLE_HEADER_ROW + 1;
    for item in &order.items {
        write_item_row(worksheet, row, item, image_dir, template, &formats)?;
        row += 1;
    }

    let signature_row = row + 2;
    worksheet.set_row_height(signature_row, template.signature_row_height)?;
    worksheet.write_string_with_format(
        signature_row,
        4,
        &template.labels.signed_by,
        &formats.label,
    )?;
    worksheet.merge_range(
        signature_row,
        5,
        signature_row,
        LAST_COLUMN,
        "",
        &formats.bottom_rule,
    )?;

    Ok(workbook)
}

/// Writes the label/value grid in rows 4-7.
fn write_header_fields(
    worksheet: &mut Worksheet,
    order: &ProductionOrder,
    customer: &CustomerInfo,
    template: &DeliveryNoteTemplate,
    formats: &Formats,
    delivery_date: NaiveDate,
) -> Result<()> {
    let labels = &template.labels;
    let date = delivery_date.format("%Y-%m-%d").to_string();

    let left = [
        (&labels.order_number, order.order_id.as_str()),
        (&labels.customer_name, customer.customer_name.as_str()),
        (&labels.contact_person, customer.contact_person.as_str()),
        (&labels.material_number, customer.material_number_text()),
    ];
    for (offset, (label, value)) in left.into_iter().enumerate() {
        let row = 3 + offset as u32;
        worksheet.write_string_with_format(row, 0, label, &formats.label)?;
        worksheet.merge_range(row, 1, row, 2, value, &formats.value)?;
    }

    let right = [
        (&labels.delivery_date, date.as_str()),
        (&labels.prepared_by, customer.prepared_by.as_str()),
    ];
    for (offset, (label, value)) in right.into_iter().enumerate() {
        let row = 3 + offset as u32;
        worksheet.write_string_with_format(row, 4, label, &formats.label)?;
        worksheet.merge_range(row, 5, row, 6, value, &formats.value)?;
    }

    worksheet.write_string_with_format(5, 4, &labels.total_quantity, &formats.label)?;
    worksheet.merge_range(5, 5, 5, 6, "", &formats.value)?;
    worksheet.write_number_with_format(5, 5, order.total_quantity() as f64, &formats.value)?;
    Ok(())
}

fn write_item_row(
    worksheet: &mut Worksheet,
    row: u32,
    item: &LineItem,
    image_dir: &Path,
    template: &DeliveryNoteTemplate,
    formats: &Formats,
) -> Result<()> {
    let cell = &formats.table_cell;
    worksheet.set_row_height(row, template.item_row_height)?;

    for col in 0..TABLE_COLUMNS {
        worksheet.write_blank(row, col, cell)?;
    }
    worksheet.write_number_with_format(row, 0, item.sequence, cell)?;
    worksheet.write_string_with_format(row, 2, &item.product_code, cell)?;
    worksheet.write_string_with_format(row, 3, &item.product_name, cell)?;
    worksheet.write_string_with_format(row, 4, &item.material, cell)?;
    worksheet.write_number_with_format(row, 5, item.quantity, cell)?;

    match find_item_image(image_dir, &item.image_key) {
        Some(path) => {
            let mut image = Image::new(&path)?;
            // Target size is in screen pixels; the writer corrects for the image DPI.
            image.set_scale_to_size(template.image_size, template.image_size, false);
            worksheet.insert_image(row, IMAGE_COLUMN, &image)?;
            debug!(sequence = item.sequence, image = %path.display(), "embedded item image");
        }
        None => {
            worksheet.write_string_with_format(
                row,
                IMAGE_COLUMN,
                &template.labels.image_placeholder,
                cell,
            )?;
            debug!(sequence = item.sequence, key = %item.image_key, "no image for item");
        }
    }
    Ok(())
}
