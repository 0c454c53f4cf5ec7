// Delivery label layout and PPLB tuning constants.
// Coordinates are absolute printer dots; the firmware reads them as-is.

/// Sent before anything else: clear buffer, 144-dot width, 144/16 form length, feed detect off.
pub const INIT_COMMANDS: &[&str] = &["N", "q144", "Q144,16", "JFJ"];
/// Terminal command: print one copy.
pub const PRINT_COMMAND: &str = "P1";

pub const LOGO_X: u32 = 10;
pub const LOGO_Y: u32 = 10;
pub const LOGO_FONT_PX: u32 = 16;

pub const BARCODE_X: u32 = 10;
pub const BARCODE_Y: u32 = 28;

pub const PRODUCT_X: u32 = 10;
pub const PRODUCT_Y: u32 = 80;
pub const PRODUCT_FONT_PX: u32 = 16;

pub const DETAIL_X: u32 = 10;
pub const DETAIL_Y: u32 = 95;     // cursor origin for the dynamic lines
pub const DETAIL_FONT_PX: u32 = 14;
pub const LINE_ADVANCE: u32 = 20;

/// Field separator for the spec and stone-memo lines.
pub const FIELD_SEPARATOR: &str = "/";
pub const WEIGHT_SUFFIX: &str = "g";

/// Height of a rasterized line relative to its font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;
/// A pixel is background when R+G+B exceeds this (average above 128).
pub const BACKGROUND_SUM_THRESHOLD: u32 = 384;

pub const DEFAULT_FONT_FAMILY: &str = "Malgun Gothic";
