//! Decoded frame stream
//!
//! The raw capture is never dissected here. An external decoder (tshark)
//! emits one tab-separated line of field values per S7COMM frame; this
//! module turns those lines into [`RawFrame`] records. Lines the decoder
//! could not structure are reported as errors so the stream can count and
//! skip them.

pub mod editcap;
pub mod tshark;

use crate::error::{Result, S7TraceError};

/// Field names requested from the external decoder, in column order
pub const TSHARK_FIELDS: [&str; 19] = [
    "frame.number",
    "frame.time",
    "frame.time_epoch",
    "frame.time_relative",
    "ip.src",
    "ip.dst",
    "frame.len",
    "s7comm.header.rosctr",
    "s7comm.header.pduref",
    "s7comm.header.datlg",
    "s7comm.param.func",
    "s7comm.param.itemcount",
    "s7comm.param.item.transp_size",
    "s7comm.param.item.length",
    "s7comm.param.item.db",
    "s7comm.param.item.area",
    "s7comm.param.item.address",
    "s7comm.data.returncode",
    "s7comm.resp.data",
];

/// One captured frame as reported by the external decoder
///
/// Every protocol field is optional: frames legitimately omit fields their
/// role does not carry, and those render as "Unknown" downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    pub number: u64,
    pub time: String,
    pub time_epoch: String,
    pub time_relative: String,
    pub src_ip: Option<String>,
    pub dst_ip: Option<String>,
    pub length: Option<u32>,
    /// Frame role code (ROSCTR)
    pub rosctr: Option<u8>,
    /// 16-bit transaction reference correlating request and response
    pub pdu_ref: Option<u16>,
    /// Payload data length from the header
    pub data_length: Option<u16>,
    pub function: Option<u8>,
    pub item_count: Option<u8>,
    pub transport_size: Option<u8>,
    pub item_length: Option<u16>,
    pub db_number: Option<u16>,
    pub area: Option<u8>,
    /// Raw bit-offset address field (byte = offset div 8, bit = offset mod 8)
    pub bit_offset: Option<u32>,
    pub return_code: Option<u8>,
    /// Request/response payload as delimited hex text, when present
    pub payload: Option<String>,
}

/// Parse a numeric field that may be printed as decimal or as 0x-prefixed hex
fn parse_code(field: &str, value: &str) -> Result<u32> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| {
        S7TraceError::DecodeError(format!("unparseable {field} value: {value:?}"))
    })
}

fn opt_code<T: TryFrom<u32>>(field: &str, value: &str) -> Result<Option<T>> {
    if value.is_empty() {
        return Ok(None);
    }
    let code = parse_code(field, value)?;
    let narrowed = T::try_from(code).map_err(|_| {
        S7TraceError::DecodeError(format!("{field} value out of range: {value:?}"))
    })?;
    Ok(Some(narrowed))
}

fn opt_text(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl RawFrame {
    /// Parse one tab-separated field line in [`TSHARK_FIELDS`] order
    pub fn from_field_line(line: &str) -> Result<RawFrame> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != TSHARK_FIELDS.len() {
            return Err(S7TraceError::DecodeError(format!(
                "expected {} fields, got {}",
                TSHARK_FIELDS.len(),
                fields.len()
            )));
        }

        let number: u64 = fields[0].parse().map_err(|_| {
            S7TraceError::DecodeError(format!("unparseable frame number: {:?}", fields[0]))
        })?;

        Ok(RawFrame {
            number,
            time: fields[1].to_string(),
            time_epoch: fields[2].to_string(),
            time_relative: fields[3].to_string(),
            src_ip: opt_text(fields[4]),
            dst_ip: opt_text(fields[5]),
            length: opt_code("frame.len", fields[6])?,
            rosctr: opt_code("header.rosctr", fields[7])?,
            pdu_ref: opt_code("header.pduref", fields[8])?,
            data_length: opt_code("header.datlg", fields[9])?,
            function: opt_code("param.func", fields[10])?,
            item_count: opt_code("param.itemcount", fields[11])?,
            transport_size: opt_code("param.item.transp_size", fields[12])?,
            item_length: opt_code("param.item.length", fields[13])?,
            db_number: opt_code("param.item.db", fields[14])?,
            area: opt_code("param.item.area", fields[15])?,
            bit_offset: opt_code("param.item.address", fields[16])?,
            return_code: opt_code("data.returncode", fields[17])?,
            payload: opt_text(fields[18]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_line() -> String {
        [
            "4",
            "Mar 10, 2025 14:03:12.000000000 CET",
            "1741611792.000000000",
            "0.250000000",
            "10.0.0.50",
            "10.0.0.1",
            "79",
            "0x01",
            "7",
            "0",
            "0x04",
            "1",
            "0x02",
            "2",
            "1",
            "0x84",
            "0x000010",
            "",
            "",
        ]
        .join("\t")
    }

    #[test]
    fn test_parse_job_line() {
        let frame = RawFrame::from_field_line(&job_line()).unwrap();
        assert_eq!(frame.number, 4);
        assert_eq!(frame.src_ip.as_deref(), Some("10.0.0.50"));
        assert_eq!(frame.dst_ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(frame.length, Some(79));
        assert_eq!(frame.rosctr, Some(0x01));
        assert_eq!(frame.pdu_ref, Some(7));
        assert_eq!(frame.function, Some(0x04));
        assert_eq!(frame.area, Some(0x84));
        assert_eq!(frame.db_number, Some(1));
        // 0x10 = 16 bits -> byte 2, bit 0
        assert_eq!(frame.bit_offset, Some(16));
        assert_eq!(frame.return_code, None);
        assert_eq!(frame.payload, None);
    }

    #[test]
    fn test_parse_decimal_and_hex_codes() {
        assert_eq!(parse_code("x", "7").unwrap(), 7);
        assert_eq!(parse_code("x", "0x10").unwrap(), 16);
        assert_eq!(parse_code("x", "0X84").unwrap(), 0x84);
        assert!(parse_code("x", "ten").is_err());
    }

    #[test]
    fn test_missing_fields_are_none() {
        let line = ["12", "t", "e", "r", "", "", "", "", "", "", "", "", "", "", "", "", "", "", ""]
            .join("\t");
        let frame = RawFrame::from_field_line(&line).unwrap();
        assert_eq!(frame.number, 12);
        assert_eq!(frame.src_ip, None);
        assert_eq!(frame.rosctr, None);
        assert_eq!(frame.payload, None);
    }

    #[test]
    fn test_short_line_rejected() {
        assert!(RawFrame::from_field_line("1\t2\t3").is_err());
        assert!(RawFrame::from_field_line("").is_err());
    }

    #[test]
    fn test_garbage_field_rejected() {
        let mut fields: Vec<String> =
            job_line().split('\t').map(str::to_string).collect();
        fields[7] = "garbage".to_string();
        assert!(RawFrame::from_field_line(&fields.join("\t")).is_err());
    }
}
