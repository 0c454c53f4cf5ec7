//! Business fields printed on a delivery label.

use serde::{Deserialize, Serialize};

use crate::consts::{FIELD_SEPARATOR, WEIGHT_SUFFIX};

/// One line of text at an absolute dot position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelField {
    pub text: String,
    pub x: u32,
    pub y: u32,
    pub font_size_px: u32,
}

impl LabelField {
    pub fn new(text: impl Into<String>, x: u32, y: u32, font_size_px: u32) -> Self {
        Self { text: text.into(), x, y, font_size_px }
    }
}

/// Everything a delivery label shows.
///
/// Optional parts are `None` or empty when absent; both are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeliveryLabelFields {
    /// Store/tenant name printed as the logo line.
    pub subdomain: String,
    pub product_name: String,
    /// flowCode, printed as the barcode payload.
    pub serial: String,

    pub material: Option<String>,
    pub color: Option<String>,
    pub weight: Option<String>,
    pub size: Option<String>,

    pub main_stone_memo: Option<String>,
    pub assistant_stone_name: Option<String>,
    pub assistant_stone_memo: Option<String>,
}

impl DeliveryLabelFields {
    pub fn new(
        subdomain: impl Into<String>,
        product_name: impl Into<String>,
        serial: impl Into<String>,
    ) -> Self {
        Self {
            subdomain: subdomain.into(),
            product_name: product_name.into(),
            serial: serial.into(),
            ..Self::default()
        }
    }

    pub fn material(mut self, v: impl Into<String>) -> Self {
        self.material = Some(v.into());
        self
    }

    pub fn color(mut self, v: impl Into<String>) -> Self {
        self.color = Some(v.into());
        self
    }

    pub fn weight(mut self, v: impl Into<String>) -> Self {
        self.weight = Some(v.into());
        self
    }

    pub fn size(mut self, v: impl Into<String>) -> Self {
        self.size = Some(v.into());
        self
    }

    pub fn main_stone_memo(mut self, v: impl Into<String>) -> Self {
        self.main_stone_memo = Some(v.into());
        self
    }

    pub fn assistant_stone_name(mut self, v: impl Into<String>) -> Self {
        self.assistant_stone_name = Some(v.into());
        self
    }

    pub fn assistant_stone_memo(mut self, v: impl Into<String>) -> Self {
        self.assistant_stone_memo = Some(v.into());
        self
    }

    /// `material/color/{weight}g/size`, skipping absent parts.
    /// `None` when every part is absent.
    pub fn spec_line(&self) -> Option<String> {
        let weight = present(&self.weight).map(|w| format!("{w}{WEIGHT_SUFFIX}"));
        join_present([
            present(&self.material).map(str::to_string),
            present(&self.color).map(str::to_string),
            weight,
            present(&self.size).map(str::to_string),
        ])
    }

    /// `mainStoneMemo/assistantStoneName/assistantStoneMemo`, skipping absent parts.
    pub fn stone_memo_line(&self) -> Option<String> {
        join_present([
            present(&self.main_stone_memo).map(str::to_string),
            present(&self.assistant_stone_name).map(str::to_string),
            present(&self.assistant_stone_memo).map(str::to_string),
        ])
    }
}

fn present(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

fn join_present<const N: usize>(parts: [Option<String>; N]) -> Option<String> {
    let parts: Vec<String> = parts.into_iter().flatten().collect();
    (!parts.is_empty()).then(|| parts.join(FIELD_SEPARATOR))
}
