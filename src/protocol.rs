//! S7COMM protocol symbol tables
//!
//! Closed enumerations mapping the raw numeric codes carried on the wire to
//! symbolic names. Every table carries an explicit `Unknown(u8)` variant so
//! an unlisted code is reported as-is instead of being folded into a listed
//! member.

use std::fmt;

/// ROSCTR header field: distinguishes request and acknowledgment frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rosctr {
    /// Request frame (0x01)
    Job,
    /// Acknowledgment without data (0x02)
    Ack,
    /// Acknowledgment carrying data (0x03)
    AckData,
    /// Unlisted ROSCTR code
    Unknown(u8),
}

impl From<u8> for Rosctr {
    fn from(code: u8) -> Self {
        match code {
            0x01 => Rosctr::Job,
            0x02 => Rosctr::Ack,
            0x03 => Rosctr::AckData,
            other => Rosctr::Unknown(other),
        }
    }
}

impl From<Rosctr> for u8 {
    fn from(value: Rosctr) -> Self {
        match value {
            Rosctr::Job => 0x01,
            Rosctr::Ack => 0x02,
            Rosctr::AckData => 0x03,
            Rosctr::Unknown(code) => code,
        }
    }
}

impl fmt::Display for Rosctr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rosctr::Job => write!(f, "JOB"),
            Rosctr::Ack => write!(f, "ACK"),
            Rosctr::AckData => write!(f, "ACK_DATA"),
            Rosctr::Unknown(code) => write!(f, "UNKNOWN(0x{code:02X})"),
        }
    }
}

/// Parameter function field of job and acknowledgment frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// Read Var (0x04)
    Read,
    /// Write Var (0x05)
    Write,
    /// PLC Stop (0x29)
    PlcStop,
    /// Unlisted function code
    Unknown(u8),
}

impl From<u8> for Function {
    fn from(code: u8) -> Self {
        match code {
            0x04 => Function::Read,
            0x05 => Function::Write,
            0x29 => Function::PlcStop,
            other => Function::Unknown(other),
        }
    }
}

impl From<Function> for u8 {
    fn from(value: Function) -> Self {
        match value {
            Function::Read => 0x04,
            Function::Write => 0x05,
            Function::PlcStop => 0x29,
            Function::Unknown(code) => code,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Read => write!(f, "READ"),
            Function::Write => write!(f, "WRITE"),
            Function::PlcStop => write!(f, "PLC_STOP"),
            Function::Unknown(code) => write!(f, "UNKNOWN(0x{code:02X})"),
        }
    }
}

/// Addressed memory area of a request item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryArea {
    /// Process inputs (0x81)
    Input,
    /// Process outputs (0x82)
    Output,
    /// Data block (0x84), addressed by block number plus byte/bit offset
    DataBlock,
    /// Unlisted area code
    Unknown(u8),
}

impl From<u8> for MemoryArea {
    fn from(code: u8) -> Self {
        match code {
            0x81 => MemoryArea::Input,
            0x82 => MemoryArea::Output,
            0x84 => MemoryArea::DataBlock,
            other => MemoryArea::Unknown(other),
        }
    }
}

impl From<MemoryArea> for u8 {
    fn from(value: MemoryArea) -> Self {
        match value {
            MemoryArea::Input => 0x81,
            MemoryArea::Output => 0x82,
            MemoryArea::DataBlock => 0x84,
            MemoryArea::Unknown(code) => code,
        }
    }
}

impl fmt::Display for MemoryArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryArea::Input => write!(f, "INPUT"),
            MemoryArea::Output => write!(f, "OUTPUT"),
            MemoryArea::DataBlock => write!(f, "DATA_BLOCK"),
            MemoryArea::Unknown(code) => write!(f, "UNKNOWN(0x{code:02X})"),
        }
    }
}

/// Wire-level transport size of a request item
///
/// Distinct from the application-level declared type of the variable
/// (`BOOL`/`INT`/`REAL` in the mapping document).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportSize {
    Bit,
    Byte,
    Char,
    Word,
    Int,
    Unknown(u8),
}

impl From<u8> for TransportSize {
    fn from(code: u8) -> Self {
        match code {
            0x01 => TransportSize::Bit,
            0x02 => TransportSize::Byte,
            0x03 => TransportSize::Char,
            0x04 => TransportSize::Word,
            0x05 => TransportSize::Int,
            other => TransportSize::Unknown(other),
        }
    }
}

impl From<TransportSize> for u8 {
    fn from(value: TransportSize) -> Self {
        match value {
            TransportSize::Bit => 0x01,
            TransportSize::Byte => 0x02,
            TransportSize::Char => 0x03,
            TransportSize::Word => 0x04,
            TransportSize::Int => 0x05,
            TransportSize::Unknown(code) => code,
        }
    }
}

impl fmt::Display for TransportSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportSize::Bit => write!(f, "BIT"),
            TransportSize::Byte => write!(f, "BYTE"),
            TransportSize::Char => write!(f, "CHAR"),
            TransportSize::Word => write!(f, "WORD"),
            TransportSize::Int => write!(f, "INT"),
            TransportSize::Unknown(code) => write!(f, "UNKNOWN(0x{code:02X})"),
        }
    }
}

/// Per-item return code of acknowledgment frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemResponse {
    Success,
    Reserved,
    HardwareFault,
    AccessNotAllowed,
    AddressOutOfRange,
    DataTypeNotSupported,
    DataTypeInconsistent,
    ObjectDoesNotExist,
    Unknown(u8),
}

impl From<u8> for ItemResponse {
    fn from(code: u8) -> Self {
        match code {
            0xFF => ItemResponse::Success,
            0x00 => ItemResponse::Reserved,
            0x01 => ItemResponse::HardwareFault,
            0x03 => ItemResponse::AccessNotAllowed,
            0x05 => ItemResponse::AddressOutOfRange,
            0x06 => ItemResponse::DataTypeNotSupported,
            0x07 => ItemResponse::DataTypeInconsistent,
            0x0A => ItemResponse::ObjectDoesNotExist,
            other => ItemResponse::Unknown(other),
        }
    }
}

impl From<ItemResponse> for u8 {
    fn from(value: ItemResponse) -> Self {
        match value {
            ItemResponse::Success => 0xFF,
            ItemResponse::Reserved => 0x00,
            ItemResponse::HardwareFault => 0x01,
            ItemResponse::AccessNotAllowed => 0x03,
            ItemResponse::AddressOutOfRange => 0x05,
            ItemResponse::DataTypeNotSupported => 0x06,
            ItemResponse::DataTypeInconsistent => 0x07,
            ItemResponse::ObjectDoesNotExist => 0x0A,
            ItemResponse::Unknown(code) => code,
        }
    }
}

impl fmt::Display for ItemResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemResponse::Success => write!(f, "SUCCESS"),
            ItemResponse::Reserved => write!(f, "RESERVED"),
            ItemResponse::HardwareFault => write!(f, "HARDWARE_FAULT"),
            ItemResponse::AccessNotAllowed => write!(f, "ACCESS_NOT_ALLOWED"),
            ItemResponse::AddressOutOfRange => write!(f, "ADDRESS_OUT_OF_RANGE"),
            ItemResponse::DataTypeNotSupported => write!(f, "DATA_TYPE_NOT_SUPPORTED"),
            ItemResponse::DataTypeInconsistent => write!(f, "DATA_TYPE_INCONSISTENT"),
            ItemResponse::ObjectDoesNotExist => write!(f, "OBJECT_DOES_NOT_EXIST"),
            ItemResponse::Unknown(code) => write!(f, "UNKNOWN(0x{code:02X})"),
        }
    }
}
