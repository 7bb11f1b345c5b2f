//! Load mortality tables from CSV
//!
//! Requires an age column and a qx column. Besides `age`, the Italian ISTAT
//! export header `Età` is recognised. Rows with an empty age or qx are
//! dropped before validation.

use super::MortalityTable;
use crate::error::{EngineError, Result};
use crate::market::loader::column_index;
use log::info;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const AGE_COLUMNS: &[&str] = &["age", "Age", "AGE", "Età", "Eta", "eta", "x"];
const QX_COLUMNS: &[&str] = &["qx", "Qx", "QX", "q_x"];

/// Load a mortality table from a CSV file
pub fn load_mortality_table<P: AsRef<Path>>(path: P) -> Result<MortalityTable> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let table = load_mortality_table_from_reader(file)?;
    info!(
        "Loaded mortality table with {} ages ({}-{}) from {}",
        table.rows().len(),
        table.min_age(),
        table.max_age(),
        path.display()
    );
    Ok(table)
}

/// Load a mortality table from any reader producing CSV text
pub fn load_mortality_table_from_reader<R: Read>(reader: R) -> Result<MortalityTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let age_idx = column_index(&headers, AGE_COLUMNS)
        .ok_or_else(|| EngineError::invalid_table("missing age column"))?;
    let qx_idx = column_index(&headers, QX_COLUMNS)
        .ok_or_else(|| EngineError::invalid_table("missing qx column"))?;

    let mut raw = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let age_raw = record.get(age_idx).unwrap_or("");
        let qx_raw = record.get(qx_idx).unwrap_or("");
        if age_raw.is_empty() || qx_raw.is_empty() {
            continue;
        }

        // Ages are sometimes exported as "65.0"
        let age = age_raw
            .parse::<u32>()
            .ok()
            .or_else(|| age_raw.parse::<f64>().ok().filter(|a| *a >= 0.0).map(|a| a as u32))
            .ok_or_else(|| {
                EngineError::invalid_table(format!("row {}: bad age '{age_raw}'", line + 2))
            })?;
        // Accept decimal commas
        let qx = qx_raw.replace(',', ".").parse::<f64>().map_err(|_| {
            EngineError::invalid_table(format!("row {}: bad qx '{qx_raw}'", line + 2))
        })?;
        raw.push((age, qx));
    }

    MortalityTable::load(&raw)
}
