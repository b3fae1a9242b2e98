//! Scan output: console table and JSON payload.

pub mod payload;
pub mod table;

pub use payload::{build_payload, payload_json, PayloadRow, ScanPayload};
pub use table::{render_table, signal_text, Colour, Palette};
