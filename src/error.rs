//! Error types for label building and transmission.

use thiserror::Error;

/// Everything that can go wrong between business fields and the print bridge.
///
/// None of these are fatal to the host: rasterization failures degrade to a
/// blank graphics block, bridge failures become `false` plus a user alert,
/// and configuration failures are reported before any work starts.
#[derive(Debug, Error)]
pub enum LabelError {
    /// The off-screen drawing surface could not be created.
    #[error("Rasterization unavailable: {0}")]
    RasterizationUnavailable(String),

    /// connect / findPrinters / printRaw failed or threw.
    #[error("Print bridge unavailable: {0}")]
    BridgeUnavailable(String),

    /// No preferred printer has been configured.
    #[error("No printer selected. Choose a preferred label printer first.")]
    MissingPrinterSelection,

    /// No print-bridge endpoint has been configured.
    #[error("Print bridge is not configured.")]
    MissingBridgeConfiguration,

    /// Font data could not be read or parsed.
    #[error("Font error: {0}")]
    Font(String),

    /// Settings are present but unusable.
    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LabelError>;
