//! Tabular export of extracted records.

use inspex_core::models::record::Record;
use rust_xlsxwriter::{Format, Workbook};

/// Write records as CSV under the given header. Absent values are empty
/// cells.
pub fn records_to_csv(columns: &[&str], records: &[Record]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(columns)?;
    for record in records {
        wtr.write_record(record.row())?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

/// Write records as a single-sheet XLSX workbook named `sheet`. The header
/// row is bold; absent values are left as empty cells.
pub fn records_to_xlsx(sheet: &str, columns: &[&str], records: &[Record]) -> anyhow::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet)?;

    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, value) in record.row().iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(row, col as u16, value)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Write records as a JSON array of objects. Absent values are `null`.
pub fn records_to_json(records: &[Record]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Plain text rendering of one record.
pub fn record_to_text(record: &Record) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} ({})\n",
        record.document_type().description(),
        record.document_type()
    ));
    if let Some(source) = record.source_file() {
        output.push_str(&format!("Source: {}\n", source));
    }
    output.push('\n');

    let width = record.fields().iter().map(|f| f.name.len()).max().unwrap_or(0);
    for field in record.fields() {
        output.push_str(&format!(
            "  {:width$}  {}\n",
            field.name,
            field.value.as_deref().unwrap_or("-"),
            width = width
        ));
    }

    output
}
