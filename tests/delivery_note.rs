use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use calamine::{DataType, Range, Reader, open_workbook_auto};
use chrono::NaiveDate;
use delivery_note::generate::{self, output_path};
use delivery_note::io::discovery::{find_item_image, find_production_file};
use delivery_note::io::excel_read;
use delivery_note::model::CustomerInfo;
use delivery_note::template::DeliveryNoteTemplate;
use delivery_note::ToolError;
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;
use zip::ZipArchive;

/// A valid 1x1 pixel PNG.
const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// A 2x2 pixel PNG declaring 72 DPI in its pHYs chunk.
const PNG_72_DPI: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x02, 0x08, 0x06, 0x00, 0x00, 0x00, 0x72,
    0xB6, 0x0D, 0x24, 0x00, 0x00, 0x00, 0x09, 0x70, 0x48, 0x59, 0x73, 0x00, 0x00, 0x0B, 0x13,
    0x00, 0x00, 0x0B, 0x13, 0x01, 0x00, 0x9A, 0x9C, 0x18, 0x00, 0x00, 0x00, 0x11, 0x49, 0x44,
    0x41, 0x54, 0x78, 0x9C, 0x63, 0xF8, 0xCF, 0xC0, 0xF0, 0x1F, 0x84, 0x19, 0x60, 0x0C, 0x00,
    0x47, 0xCA, 0x07, 0xF9, 0x67, 0x59, 0x6E, 0xB7, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E,
    0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// 75 px expressed in EMU (9525 EMU per pixel).
const IMAGE_EXTENT_EMU: &str = r#"cx="714375" cy="714375""#;

fn delivery_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
}

fn customer() -> CustomerInfo {
    CustomerInfo {
        customer_name: "Acme Models".to_string(),
        contact_person: "Li Lei".to_string(),
        material_number: Some("MN-42".to_string()),
        prepared_by: "系统自动".to_string(),
    }
}

/// Writes the sample production order: marker in A2, table header in row 5,
/// two items, a blank row and a trailing signature line.
fn write_production_order(path: &Path, with_marker: bool) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "生产单").expect("title");
    if with_marker {
        sheet.write_string(1, 0, "销售单号: SO-100").expect("marker");
    }
    sheet.write_string(2, 3, "交期：2026-11-01").expect("due date");

    for (col, header) in ["序号", "图号", "材料", "规格", "数量"].iter().enumerate() {
        sheet.write_string(4, col as u16, *header).expect("header");
    }

    sheet.write_number(5, 0, 1).expect("seq");
    sheet.write_string(5, 1, "P-1").expect("code");
    sheet.write_string(5, 2, "ABS").expect("material");
    sheet.write_number(5, 4, 10).expect("quantity");

    sheet.write_number(6, 0, 2).expect("seq");
    sheet.write_string(6, 1, "P-2").expect("code");
    sheet.write_string(6, 2, "PLA").expect("material");
    sheet.write_string(6, 3, "2mm").expect("specification");
    sheet.write_number(6, 4, 5).expect("quantity");

    sheet.write_string(8, 0, "制单人签字").expect("footer");
    sheet.write_string(8, 4, "合计").expect("footer total");

    workbook.save(path).expect("production order saved");
}

fn read_first_sheet(path: &Path) -> Range<DataType> {
    let mut workbook = open_workbook_auto(path).expect("output opened");
    workbook
        .worksheet_range_at(0)
        .expect("sheet present")
        .expect("sheet read")
}

fn text(range: &Range<DataType>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        _ => String::new(),
    }
}

fn read_zip_entry(path: &Path, name: &str) -> String {
    let file = fs::File::open(path).expect("output opened");
    let mut archive = ZipArchive::new(file).expect("output is a zip archive");
    let mut entry = archive.by_name(name).expect("entry present");
    let mut contents = String::new();
    entry.read_to_string(&mut contents).expect("entry read");
    contents
}

fn setup_folder() -> (tempfile::TempDir, PathBuf) {
    let dir = tempdir().expect("temporary directory");
    let input = dir.path().join("生产单_0001.xlsx");
    write_production_order(&input, true);
    (dir, input)
}

#[test]
fn extracts_items_in_source_order() {
    let (_dir, input) = setup_folder();

    let order = excel_read::read_production_order(&input).expect("order extracted");

    assert_eq!(order.order_id, "SO-100");
    let sequences: Vec<u32> = order.items.iter().map(|item| item.sequence).collect();
    assert_eq!(sequences, vec![1, 2]);
    assert_eq!(order.items[0].material, "ABS");
    assert_eq!(order.items[1].material, "PLA (2mm)");
    assert_eq!(order.total_quantity(), 15);
}

#[test]
fn generates_delivery_note_end_to_end() {
    let (dir, _input) = setup_folder();

    let output = generate::generate_delivery_note_on(
        dir.path(),
        &customer(),
        &DeliveryNoteTemplate::default(),
        delivery_date(),
    )
    .expect("delivery note generated");

    assert_eq!(output, dir.path().join("出货单_SO-100.xlsx"));
    assert_eq!(output, output_path(dir.path(), "SO-100"));
    assert!(output.is_file());

    let sheet = read_first_sheet(&output);
    assert_eq!(text(&sheet, 0, 0), "杭州越侬模型科技有限公司");
    assert_eq!(text(&sheet, 1, 0), "交货单");

    assert_eq!(text(&sheet, 3, 0), "交货单号");
    assert_eq!(text(&sheet, 3, 1), "SO-100");
    assert_eq!(text(&sheet, 4, 1), "Acme Models");
    assert_eq!(text(&sheet, 5, 1), "Li Lei");
    assert_eq!(text(&sheet, 6, 1), "MN-42");
    assert_eq!(text(&sheet, 3, 5), "2026-10-19");
    assert_eq!(text(&sheet, 4, 5), "系统自动");
    assert_eq!(text(&sheet, 5, 4), "货品总数");
    assert_eq!(sheet.get_value((5, 5)), Some(&DataType::Float(15.0)));

    let headers: Vec<String> = (0..7).map(|col| text(&sheet, 8, col)).collect();
    assert_eq!(
        headers,
        ["序号", "产品图片", "产品编号", "产品名称", "材料", "交货数量", "备注"]
    );

    assert_eq!(text(&sheet, 9, 0), "1");
    assert_eq!(text(&sheet, 9, 1), "—");
    assert_eq!(text(&sheet, 9, 2), "P-1");
    assert_eq!(text(&sheet, 9, 3), "P-1");
    assert_eq!(text(&sheet, 9, 4), "ABS");
    assert_eq!(text(&sheet, 9, 5), "10");

    assert_eq!(text(&sheet, 10, 0), "2");
    assert_eq!(text(&sheet, 10, 4), "PLA (2mm)");
    assert_eq!(text(&sheet, 10, 5), "5");

    assert_eq!(text(&sheet, 11, 0), "");
    assert_eq!(text(&sheet, 13, 4), "签收人");
}

#[test]
fn embeds_image_instead_of_placeholder() {
    let (dir, _input) = setup_folder();
    fs::write(dir.path().join("P-1.png"), TINY_PNG).expect("image written");

    let output = generate::generate_delivery_note_on(
        dir.path(),
        &CustomerInfo::default(),
        &DeliveryNoteTemplate::default(),
        delivery_date(),
    )
    .expect("delivery note generated");

    let sheet = read_first_sheet(&output);
    assert_ne!(text(&sheet, 9, 1), "—");
    assert_eq!(text(&sheet, 10, 1), "—");
    assert_eq!(text(&sheet, 6, 1), "");

    let bytes = fs::read(&output).expect("output read");
    let media = b"xl/media/image1.png";
    assert!(bytes.windows(media.len()).any(|window| window == media));
}

#[test]
fn images_render_at_fixed_size_regardless_of_dpi() {
    let (dir, _input) = setup_folder();
    fs::write(dir.path().join("P-1.png"), PNG_72_DPI).expect("image written");
    fs::write(dir.path().join("P-2.png"), TINY_PNG).expect("image written");

    let output = generate::generate_delivery_note_on(
        dir.path(),
        &customer(),
        &DeliveryNoteTemplate::default(),
        delivery_date(),
    )
    .expect("delivery note generated");

    let drawing = read_zip_entry(&output, "xl/drawings/drawing1.xml");
    assert_eq!(drawing.matches(IMAGE_EXTENT_EMU).count(), 2, "{drawing}");
}

#[test]
fn missing_production_file_is_reported() {
    let dir = tempdir().expect("temporary directory");
    fs::write(dir.path().join("notes.txt"), "not a spreadsheet").expect("file written");

    let error = generate::generate_delivery_note(
        dir.path(),
        &customer(),
        &DeliveryNoteTemplate::default(),
    )
    .expect_err("no production file");

    assert!(matches!(error, ToolError::ProductionFileNotFound(_)));
}

#[test]
fn missing_order_marker_writes_nothing() {
    let dir = tempdir().expect("temporary directory");
    write_production_order(&dir.path().join("生产单_0002.xlsx"), false);

    let error = generate::generate_delivery_note_on(
        dir.path(),
        &customer(),
        &DeliveryNoteTemplate::default(),
        delivery_date(),
    )
    .expect_err("order marker missing");

    assert!(matches!(error, ToolError::MissingOrderId { .. }));
    let outputs: Vec<_> = fs::read_dir(dir.path())
        .expect("folder listed")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("出货单"))
        .collect();
    assert!(outputs.is_empty());
}

#[test]
fn template_override_changes_banner() {
    let (dir, _input) = setup_folder();
    let template_path = dir.path().join("template.json");
    fs::write(
        &template_path,
        r#"{"company_name": "Acme Delivery", "sheet_name": "Note"}"#,
    )
    .expect("template written");
    let template = DeliveryNoteTemplate::from_json_file(&template_path).expect("template loaded");

    let output = generate::generate_delivery_note_on(
        dir.path(),
        &customer(),
        &template,
        delivery_date(),
    )
    .expect("delivery note generated");

    let workbook = open_workbook_auto(&output).expect("output opened");
    assert_eq!(workbook.sheet_names().to_vec(), vec!["Note".to_string()]);
    let sheet = read_first_sheet(&output);
    assert_eq!(text(&sheet, 0, 0), "Acme Delivery");
    assert_eq!(text(&sheet, 1, 0), "交货单");
}

#[test]
fn discovery_picks_one_of_several_candidates() {
    let dir = tempdir().expect("temporary directory");
    let first = dir.path().join("生产单_A.xlsx");
    let second = dir.path().join("生产单_B.xls");
    fs::write(&first, b"").expect("file written");
    fs::write(&second, b"").expect("file written");
    fs::write(dir.path().join("生产单_C.pdf"), b"").expect("file written");

    let found = find_production_file(dir.path())
        .expect("directory listed")
        .expect("candidate found");
    assert!(found == first || found == second);
}

#[test]
fn image_probe_follows_extension_order() {
    let dir = tempdir().expect("temporary directory");
    assert_eq!(find_item_image(dir.path(), "P-9"), None);

    fs::write(dir.path().join("P-9.gif"), b"gif").expect("file written");
    assert_eq!(
        find_item_image(dir.path(), "P-9"),
        Some(dir.path().join("P-9.gif"))
    );

    fs::write(dir.path().join("P-9.jpg"), b"jpg").expect("file written");
    fs::write(dir.path().join("P-9.png"), b"png").expect("file written");
    assert_eq!(
        find_item_image(dir.path(), "P-9"),
        Some(dir.path().join("P-9.png"))
    );
}
