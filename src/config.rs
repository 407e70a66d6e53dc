//! PLC mapping document loading
//!
//! The mapping document is a YAML file describing, per PLC, which variables
//! live at which byte/bit addresses:
//!
//! ```yaml
//! plc:
//!   - ip: 10.0.0.1
//!     io_mapping:
//!       data_block:
//!         - number: 1
//!           variables:
//!             - { address: "2.0", name: SetPoint, type: INT }
//!       input:
//!         - { address: "0.1", name: StartButton, type: BOOL }
//!       output:
//!         - { address: "4.0", name: PumpSpeed, type: REAL }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, S7TraceError};

/// Declared variable type in the mapping document
///
/// Closed set: anything else is rejected at load time, not at decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarType {
    #[serde(rename = "BOOL")]
    Bool,
    #[serde(rename = "INT")]
    Int,
    #[serde(rename = "REAL")]
    Real,
}

impl VarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarType::Bool => "BOOL",
            VarType::Int => "INT",
            VarType::Real => "REAL",
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One variable declaration: textual "byte.bit" address, label, type
#[derive(Debug, Clone, Deserialize)]
pub struct VariableEntry {
    pub address: String,
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VarType,
}

/// One data block declaration with its variables
#[derive(Debug, Clone, Deserialize)]
pub struct DataBlockEntry {
    pub number: u16,
    pub variables: Vec<VariableEntry>,
}

/// Per-PLC I/O mapping section; every area is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IoMapping {
    #[serde(default)]
    pub data_block: Vec<DataBlockEntry>,
    #[serde(default)]
    pub input: Vec<VariableEntry>,
    #[serde(default)]
    pub output: Vec<VariableEntry>,
}

/// One PLC device entry
#[derive(Debug, Clone, Deserialize)]
pub struct PlcEntry {
    pub ip: String,
    #[serde(default)]
    pub io_mapping: IoMapping,
}

/// Root of the mapping document
#[derive(Debug, Clone, Deserialize)]
pub struct MappingDocument {
    pub plc: Vec<PlcEntry>,
}

/// Load and parse a mapping document from disk
///
/// Both the missing-file and the parse-failure cases carry the file path so
/// the failure can be diagnosed without re-running.
pub fn load(path: &Path) -> Result<MappingDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        S7TraceError::ConfigError(format!("failed to read {}: {}", path.display(), e))
    })?;

    let document: MappingDocument = serde_yaml::from_str(&content).map_err(|e| {
        S7TraceError::ConfigError(format!("failed to parse {}: {}", path.display(), e))
    })?;

    if document.plc.is_empty() {
        return Err(S7TraceError::ConfigError(format!(
            "no PLC entries in {}",
            path.display()
        )));
    }

    for plc in &document.plc {
        if plc.ip.is_empty() {
            return Err(S7TraceError::ConfigError(format!(
                "PLC entry without an ip in {}",
                path.display()
            )));
        }
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
plc:
  - ip: 10.0.0.1
    io_mapping:
      data_block:
        - number: 1
          variables:
            - { address: "2.0", name: SetPoint, type: INT }
            - { address: "6.0", name: TankLevel, type: REAL }
      input:
        - { address: "0.1", name: StartButton, type: BOOL }
"#;

    #[test]
    fn test_parse_sample_document() {
        let doc: MappingDocument = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(doc.plc.len(), 1);
        let plc = &doc.plc[0];
        assert_eq!(plc.ip, "10.0.0.1");
        assert_eq!(plc.io_mapping.data_block.len(), 1);
        assert_eq!(plc.io_mapping.data_block[0].number, 1);
        assert_eq!(plc.io_mapping.data_block[0].variables[0].name, "SetPoint");
        assert_eq!(
            plc.io_mapping.data_block[0].variables[0].var_type,
            VarType::Int
        );
        assert_eq!(plc.io_mapping.input[0].var_type, VarType::Bool);
        assert!(plc.io_mapping.output.is_empty());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let bad = r#"
plc:
  - ip: 10.0.0.1
    io_mapping:
      input:
        - { address: "0.0", name: X, type: DWORD }
"#;
        assert!(serde_yaml::from_str::<MappingDocument>(bad).is_err());
    }

    #[test]
    fn test_missing_variable_name_rejected() {
        let bad = r#"
plc:
  - ip: 10.0.0.1
    io_mapping:
      input:
        - { address: "0.0", type: BOOL }
"#;
        assert!(serde_yaml::from_str::<MappingDocument>(bad).is_err());
    }

    #[test]
    fn test_load_reports_path_on_missing_file() {
        let err = load(Path::new("/nonexistent/mapping.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/mapping.yaml"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let doc = load(file.path()).unwrap();
        assert_eq!(doc.plc[0].ip, "10.0.0.1");
    }
}
