//! Decoders turning raw input into the analyzers' input shapes

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde_json::Value;
use std::io::Cursor;
use tracing::debug;

use super::context::AnalysisContext;
use super::tabular::RawTable;
use crate::error::{FiledocError, Result};

/// Decode CSV text; the first record is the header
pub fn read_csv(content: &[u8], ctx: &AnalysisContext<'_>) -> Result<RawTable> {
    let text = std::str::from_utf8(content).map_err(|e| FiledocError::decode("CSV", e))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record
            .map_err(|e| FiledocError::decode("CSV", e))?
            .iter()
            .map(|field| field.trim_start_matches('\u{feff}').trim().to_string())
            .collect(),
        None => return Ok(RawTable::default()),
    };

    let mut table = RawTable::new(header);
    for record in records {
        let record = record.map_err(|e| FiledocError::decode("CSV", e))?;
        table
            .rows
            .push(record.iter().map(|field| ctx.normalize_cell(field)).collect());
    }

    debug!("Read {} CSV rows", table.rows.len());
    Ok(table)
}

/// Decode the first worksheet of an xlsx/xls workbook
pub fn read_excel(content: &[u8], ctx: &AnalysisContext<'_>) -> Result<RawTable> {
    if content.is_empty() {
        return Ok(RawTable::default());
    }

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(content.to_vec()))
        .map_err(|e| FiledocError::decode("Excel", e))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| FiledocError::decode("Excel", e))?,
        None => return Ok(RawTable::default()),
    };

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(cells) => cells
            .iter()
            .map(|cell| cell_text(cell).unwrap_or_default().trim().to_string())
            .collect(),
        None => return Ok(RawTable::default()),
    };

    let mut table = RawTable::new(header);
    for cells in rows {
        table.rows.push(
            cells
                .iter()
                .map(|cell| cell_text(cell).and_then(|text| ctx.normalize_cell(&text)))
                .collect(),
        );
    }

    debug!("Read {} Excel rows", table.rows.len());
    Ok(table)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(
            dt.as_datetime()
                .map(|d| d.to_string())
                .unwrap_or_else(|| dt.as_f64().to_string()),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(_) => None,
    }
}

/// Decode JSON text; blank input reads as an empty record set
pub fn read_json(content: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(content).map_err(|e| FiledocError::decode("JSON", e))?;
    if text.trim().is_empty() {
        return Ok(Value::Array(Vec::new()));
    }

    serde_json::from_str(text).map_err(|e| FiledocError::decode("JSON", e))
}
