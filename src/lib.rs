//! s7trace - S7COMM capture labelling library
//!
//! Inspects recorded S7COMM traffic and attaches human-meaningful variable
//! names to otherwise opaque byte/bit addresses, using a YAML mapping from
//! PLC + memory area + address to variable name and type.
//!
//! # Architecture
//!
//! - **Symbol tables** ([`protocol`]): closed enumerations for the raw
//!   protocol codes, with an explicit unrecognized-code variant
//! - **Address index** ([`index`]): per-PLC, per-area variable lookup built
//!   once from the mapping document
//! - **Value decoder** ([`decode`]): typed BOOL/INT/REAL decoding of wire
//!   payloads
//! - **Correlation engine** ([`engine`]): pairs Job frames with their
//!   acknowledgments via the PDU reference
//! - **Renderers** ([`output`]): pcap annotation and CSV tabulation
//!
//! The raw capture is dissected by an external decoder (tshark); comments
//! are attached by an external annotation utility (editcap). See [`capture`]
//! for both wrappers.

pub mod capture;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod index;
pub mod output;
pub mod protocol;

// Re-export core types
pub use capture::RawFrame;
pub use config::{MappingDocument, VarType};
pub use decode::Value;
pub use engine::{CorrelationEngine, EngineStats, FrameRecord};
pub use error::{Result, S7TraceError};
pub use index::{AddressIndex, BitAddress, VariableDescriptor};
pub use protocol::{Function, ItemResponse, MemoryArea, Rosctr, TransportSize};
