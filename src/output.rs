//! Output renderers
//!
//! Two independent consumers of the correlation engine's per-frame records:
//! a pcap annotator and a CSV tabulator.

pub mod annotate;
pub mod table;

pub use annotate::Annotator;
pub use table::Tabulator;
