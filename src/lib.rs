//! PPLB delivery-label builder for 144-dot thermal label printers.
//! - Rasterizes each text line onto its own byte-aligned monochrome bitmap
//! - Packs rows MSB-first with the printer's inverted polarity (1 = unprinted)
//! - Frames bitmaps as binary `GW` blocks between literal PPLB commands
//! - Submits finished jobs base64-encoded through a local print bridge,
//!   one label at a time

pub mod barcode;
pub mod builder;
pub mod config;
pub mod consts;
pub mod epl;
pub mod error;
pub mod graphics;
pub mod label;
pub mod printer;

pub use builder::{build_delivery_job, build_delivery_label, PrintJob, Segment};
pub use config::PrintSettings;
pub use epl::{encode_gw, pack, GraphicsSegment, PackedRow};
pub use error::{LabelError, Result};
pub use graphics::{rasterize, rasterize_text, Bitmap, FontBook};
pub use label::{DeliveryLabelFields, LabelField};
pub use printer::{print_batch, submit, Alerts, BatchReport, BridgeSession, LogAlerts, PrintBridge};

