//! Print settings: which printer to use, where the bridge lives, and which
//! font the labels are measured in.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_FONT_FAMILY;
use crate::error::{LabelError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrintSettings {
    /// Printer name as reported by the bridge's printer discovery.
    pub preferred_printer: Option<String>,
    /// Endpoint of the local print bridge.
    pub bridge_url: Option<String>,
    pub font_family: String,
    /// TrueType/OpenType file backing `font_family`.
    pub font_path: Option<PathBuf>,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            preferred_printer: None,
            bridge_url: None,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_path: None,
        }
    }
}

impl PrintSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        if settings.font_family.trim().is_empty() {
            return Err(LabelError::Config("fontFamily must not be empty".into()));
        }
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Validate that a job can be sent at all and return the target printer.
    ///
    /// Must be called before any rasterization so that a missing selection
    /// is reported without doing throwaway work.
    pub fn printer(&self) -> Result<&str> {
        let printer = non_blank(self.preferred_printer.as_deref())
            .ok_or(LabelError::MissingPrinterSelection)?;
        non_blank(self.bridge_url.as_deref()).ok_or(LabelError::MissingBridgeConfiguration)?;
        Ok(printer)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
