//! Address index and variable resolution
//!
//! Built once from the mapping document, then read-only: per PLC, one
//! descriptor list per memory area. Resolution compares addresses as a
//! structured `(byte, bit)` pair rather than as formatted text, so "2.0"
//! and "02.00" in the document address the same location.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::warn;

use crate::config::{MappingDocument, VarType, VariableEntry};
use crate::error::{Result, S7TraceError};
use crate::protocol::MemoryArea;

/// Structured byte/bit address of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitAddress {
    pub byte: u32,
    pub bit: u8,
}

impl FromStr for BitAddress {
    type Err = S7TraceError;

    /// Parses the document's textual "byte.bit" form; a bare "byte" means
    /// bit 0.
    fn from_str(s: &str) -> Result<Self> {
        let malformed =
            || S7TraceError::ConfigError(format!("malformed variable address: {s:?}"));

        let (byte_text, bit_text) = match s.split_once('.') {
            Some((b, t)) => (b, t),
            None => (s, "0"),
        };

        let byte: u32 = byte_text.trim().parse().map_err(|_| malformed())?;
        let bit: u8 = bit_text.trim().parse().map_err(|_| malformed())?;
        if bit > 7 {
            return Err(S7TraceError::ConfigError(format!(
                "bit address out of range in {s:?} (expected 0-7)"
            )));
        }

        Ok(BitAddress { byte, bit })
    }
}

impl std::fmt::Display for BitAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.byte, self.bit)
    }
}

/// Immutable descriptor of one configured variable
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDescriptor {
    /// IP of the controlling PLC
    pub plc_ip: String,
    pub area: MemoryArea,
    /// Block number, present only for data-block variables
    pub db_number: Option<u16>,
    pub address: BitAddress,
    /// Operator-facing label
    pub name: String,
    pub var_type: VarType,
}

#[derive(Debug, Default)]
struct AreaLists {
    input: Vec<VariableDescriptor>,
    output: Vec<VariableDescriptor>,
    data_block: Vec<VariableDescriptor>,
}

impl AreaLists {
    fn for_area(&self, area: MemoryArea) -> Option<&Vec<VariableDescriptor>> {
        match area {
            MemoryArea::Input => Some(&self.input),
            MemoryArea::Output => Some(&self.output),
            MemoryArea::DataBlock => Some(&self.data_block),
            MemoryArea::Unknown(_) => None,
        }
    }
}

/// Fast lookup from (PLC, memory area, byte, bit) to variable descriptor
#[derive(Debug, Default)]
pub struct AddressIndex {
    plcs: HashMap<String, AreaLists>,
}

impl AddressIndex {
    /// Build the index from a parsed mapping document
    ///
    /// Duplicate (byte, bit) addresses within one PLC and memory area are a
    /// configuration warning: resolution keeps the first declaration.
    pub fn build(document: &MappingDocument) -> Result<AddressIndex> {
        let mut plcs: HashMap<String, AreaLists> = HashMap::new();

        for plc in &document.plc {
            let lists = plcs.entry(plc.ip.clone()).or_default();

            for db in &plc.io_mapping.data_block {
                for var in &db.variables {
                    let descriptor = Self::make_descriptor(
                        &plc.ip,
                        MemoryArea::DataBlock,
                        Some(db.number),
                        var,
                    )?;
                    Self::append(&mut lists.data_block, descriptor);
                }
            }
            for var in &plc.io_mapping.input {
                let descriptor =
                    Self::make_descriptor(&plc.ip, MemoryArea::Input, None, var)?;
                Self::append(&mut lists.input, descriptor);
            }
            for var in &plc.io_mapping.output {
                let descriptor =
                    Self::make_descriptor(&plc.ip, MemoryArea::Output, None, var)?;
                Self::append(&mut lists.output, descriptor);
            }
        }

        Ok(AddressIndex { plcs })
    }

    fn make_descriptor(
        ip: &str,
        area: MemoryArea,
        db_number: Option<u16>,
        var: &VariableEntry,
    ) -> Result<VariableDescriptor> {
        if var.name.is_empty() {
            return Err(S7TraceError::ConfigError(format!(
                "variable at {} ({}, {}) has an empty name",
                var.address, ip, area
            )));
        }
        let address: BitAddress = var.address.parse().map_err(|e| {
            S7TraceError::ConfigError(format!("variable {:?} on {}: {}", var.name, ip, e))
        })?;

        Ok(VariableDescriptor {
            plc_ip: ip.to_string(),
            area,
            db_number,
            address,
            name: var.name.clone(),
            var_type: var.var_type,
        })
    }

    fn append(list: &mut Vec<VariableDescriptor>, descriptor: VariableDescriptor) {
        if let Some(existing) = list.iter().find(|d| d.address == descriptor.address) {
            warn!(
                "duplicate address {} on {} ({}): {:?} shadows {:?}, first declaration wins",
                descriptor.address,
                descriptor.plc_ip,
                descriptor.area,
                descriptor.name,
                existing.name
            );
        }
        list.push(descriptor);
    }

    /// Look up the variable at (byte, bit) in one memory area of one PLC
    ///
    /// A miss is the expected case for traffic the mapping does not
    /// describe, so this returns `None` rather than an error.
    pub fn resolve(
        &self,
        plc_ip: &str,
        byte: u32,
        bit: u8,
        area: MemoryArea,
    ) -> Option<&VariableDescriptor> {
        let target = BitAddress { byte, bit };
        self.plcs
            .get(plc_ip)?
            .for_area(area)?
            .iter()
            .find(|d| d.address == target)
    }

    /// Number of configured PLCs
    pub fn plc_count(&self) -> usize {
        self.plcs.len()
    }

    /// Total number of variable descriptors across all PLCs and areas
    pub fn variable_count(&self) -> usize {
        self.plcs
            .values()
            .map(|l| l.input.len() + l.output.len() + l.data_block.len())
            .sum()
    }
}
