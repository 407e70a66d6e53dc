//! Typed value decoding of S7COMM payloads
//!
//! Payload bytes arrive from the capture decoder as delimited hexadecimal
//! text ("00:32"). Multi-byte values are big-endian on the wire, most
//! significant byte first.

use std::fmt;

use crate::config::VarType;
use crate::error::{Result, S7TraceError};

/// A decoded variable value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i16),
    Real(f32),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
        }
    }
}

/// Convert delimited hex text into raw bytes
///
/// Accepts `:`, `-`, `.` and whitespace as delimiters, so "00:32", "00-32"
/// and "0032" all parse to the same bytes.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() || cleaned.len() % 2 != 0 {
        return Err(S7TraceError::DecodeError(format!(
            "malformed hex payload: {text:?}"
        )));
    }

    (0..cleaned.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&cleaned[i..i + 2], 16).map_err(|_| {
                S7TraceError::DecodeError(format!("malformed hex payload: {text:?}"))
            })
        })
        .collect()
}

/// Decode raw payload bytes according to the declared variable type
///
/// `bit_index` selects the bit within the first byte for `BOOL`; the other
/// types ignore it.
pub fn decode(raw: &[u8], var_type: VarType, bit_index: u8) -> Result<Value> {
    match var_type {
        VarType::Bool => {
            if bit_index > 7 {
                return Err(S7TraceError::DecodeError(format!(
                    "bit index {bit_index} out of range (expected 0-7)"
                )));
            }
            let byte = raw.first().ok_or_else(|| {
                S7TraceError::DecodeError("empty payload for BOOL".to_string())
            })?;
            Ok(Value::Bool(byte & (1 << bit_index) != 0))
        },
        VarType::Int => {
            let bytes: [u8; 2] = raw.get(..2).and_then(|s| s.try_into().ok()).ok_or_else(
                || {
                    S7TraceError::DecodeError(format!(
                        "payload too short for INT: {} bytes (need 2)",
                        raw.len()
                    ))
                },
            )?;
            Ok(Value::Int(i16::from_be_bytes(bytes)))
        },
        VarType::Real => {
            let bytes: [u8; 4] = raw.get(..4).and_then(|s| s.try_into().ok()).ok_or_else(
                || {
                    S7TraceError::DecodeError(format!(
                        "payload too short for REAL: {} bytes (need 4)",
                        raw.len()
                    ))
                },
            )?;
            Ok(Value::Real(f32::from_be_bytes(bytes)))
        },
    }
}

/// Parse delimited hex text and decode it in one step
pub fn decode_hex(text: &str, var_type: VarType, bit_index: u8) -> Result<Value> {
    decode(&parse_hex(text)?, var_type, bit_index)
}
