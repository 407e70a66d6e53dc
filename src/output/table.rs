//! Tabular export renderer
//!
//! Accumulates one row per frame and serializes the whole table to CSV at
//! the end of the run. Fields a frame did not carry, and unresolved
//! variables or values, render as "Unknown".

use std::fmt::Display;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::engine::FrameRecord;
use crate::error::Result;

const UNKNOWN: &str = "Unknown";

/// One exported row with the fixed column schema
#[derive(Debug, Serialize)]
pub struct CsvRow {
    #[serde(rename = "Frame_Number")]
    pub frame_number: u64,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Timestamp_Epoch")]
    pub timestamp_epoch: String,
    #[serde(rename = "Timestamp_Shift")]
    pub timestamp_shift: String,
    #[serde(rename = "Source_IP")]
    pub source_ip: String,
    #[serde(rename = "Destination_IP")]
    pub destination_ip: String,
    #[serde(rename = "Length")]
    pub length: String,
    #[serde(rename = "Header_Rosctr")]
    pub header_rosctr: String,
    #[serde(rename = "Header_PduRef")]
    pub header_pduref: String,
    #[serde(rename = "Param_Function")]
    pub param_function: String,
    #[serde(rename = "Param_Item_Count")]
    pub param_item_count: String,
    #[serde(rename = "Param_Item_Transport_Size")]
    pub param_item_transport_size: String,
    #[serde(rename = "Param_Item_Length")]
    pub param_item_length: String,
    #[serde(rename = "Param_Item_DB")]
    pub param_item_db: String,
    #[serde(rename = "Param_Item_Area")]
    pub param_item_area: String,
    #[serde(rename = "Param_Address_Byte")]
    pub param_address_byte: String,
    #[serde(rename = "Param_Address_Bit")]
    pub param_address_bit: String,
    #[serde(rename = "Variable_Name")]
    pub variable_name: String,
    #[serde(rename = "Data_Type")]
    pub data_type: String,
    #[serde(rename = "Data_Value")]
    pub data_value: String,
    #[serde(rename = "Data_Return_Code")]
    pub data_return_code: String,
}

fn render<T: Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => UNKNOWN.to_string(),
    }
}

fn render_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| UNKNOWN.to_string())
}

impl From<&FrameRecord> for CsvRow {
    fn from(record: &FrameRecord) -> Self {
        CsvRow {
            frame_number: record.number,
            timestamp: record.time.clone(),
            timestamp_epoch: record.time_epoch.clone(),
            timestamp_shift: record.time_relative.clone(),
            source_ip: render_text(&record.src_ip),
            destination_ip: render_text(&record.dst_ip),
            length: render(&record.length),
            header_rosctr: render(&record.rosctr),
            header_pduref: render(&record.pdu_ref),
            param_function: render(&record.function),
            param_item_count: render(&record.item_count),
            param_item_transport_size: render(&record.transport_size),
            param_item_length: render(&record.item_length),
            param_item_db: render(&record.db_number),
            param_item_area: render(&record.area),
            param_address_byte: render(&record.address_byte),
            param_address_bit: render(&record.address_bit),
            variable_name: record
                .variable
                .as_ref()
                .map(|v| v.name.clone())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            data_type: record
                .variable
                .as_ref()
                .map(|v| v.var_type.to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            data_value: render(&record.value),
            data_return_code: render(&record.return_code),
        }
    }
}

/// In-memory table of decoded frame rows
#[derive(Debug, Default)]
pub struct Tabulator {
    rows: Vec<CsvRow>,
}

impl Tabulator {
    pub fn new() -> Self {
        Tabulator::default()
    }

    /// Append one frame record as a row
    pub fn push(&mut self, record: &FrameRecord) {
        self.rows.push(CsvRow::from(record));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize the full table to a CSV file, headers included
    ///
    /// Written once, at the end of the run; no partial writes.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        info!("{} rows written to {}", self.rows.len(), path.display());
        Ok(())
    }
}
