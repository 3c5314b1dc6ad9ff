use serde::{Deserialize, Serialize};

use crate::domain::Dimensions;

/// Fallback page limit used when `GET /config` cannot be reached. Matches the
/// render service's own built-in maximum.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Generation parameters for one stamping run. Always fully populated; field
/// names are the wire contract and serialize 1:1 into the `config_data` form
/// field of the preview and generate requests.
///
/// The `show_*_text` flags stay meaningful even when the matching `include_*`
/// flag is off: an editing surface disables them but never clears them, so the
/// last chosen value survives toggling the code type back on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampConfig {
    pub start_value: i64,
    pub end_value: i64,
    pub prefix: String,
    pub include_qr: bool,
    pub include_barcode: bool,
    pub show_qr_text: bool,
    pub show_barcode_text: bool,
    pub qr_size: u32,
    pub barcode_width: u32,
    pub barcode_height: u32,
    pub qr_x: u32,
    pub qr_y: u32,
    pub barcode_x: u32,
    pub barcode_y: u32,
    pub text_offset_y: u32,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            start_value: 1,
            end_value: 10,
            prefix: String::new(),
            include_qr: true,
            include_barcode: false,
            show_qr_text: false,
            show_barcode_text: false,
            qr_size: 100,
            barcode_width: 200,
            barcode_height: 50,
            qr_x: 100,
            qr_y: 100,
            barcode_x: 100,
            barcode_y: 200,
            text_offset_y: 10,
        }
    }
}

impl StampConfig {
    /// Returns a copy with exactly one field replaced. Never rejects a value;
    /// whether the resulting record is usable is the validator's concern.
    pub fn apply(&self, update: ConfigUpdate) -> StampConfig {
        let mut next = self.clone();
        match update {
            ConfigUpdate::StartValue(v) => next.start_value = v,
            ConfigUpdate::EndValue(v) => next.end_value = v,
            ConfigUpdate::Prefix(v) => next.prefix = v,
            ConfigUpdate::IncludeQr(v) => next.include_qr = v,
            ConfigUpdate::IncludeBarcode(v) => next.include_barcode = v,
            ConfigUpdate::ShowQrText(v) => next.show_qr_text = v,
            ConfigUpdate::ShowBarcodeText(v) => next.show_barcode_text = v,
            ConfigUpdate::QrSize(v) => next.qr_size = v,
            ConfigUpdate::BarcodeWidth(v) => next.barcode_width = v,
            ConfigUpdate::BarcodeHeight(v) => next.barcode_height = v,
            ConfigUpdate::QrX(v) => next.qr_x = v,
            ConfigUpdate::QrY(v) => next.qr_y = v,
            ConfigUpdate::BarcodeX(v) => next.barcode_x = v,
            ConfigUpdate::BarcodeY(v) => next.barcode_y = v,
            ConfigUpdate::TextOffsetY(v) => next.text_offset_y = v,
        }
        next
    }

    /// Inclusive page count of the configured range. Negative when
    /// `end_value < start_value`; the service generates one page per value.
    pub fn page_count(&self) -> i64 {
        self.end_value - self.start_value + 1
    }
}

/// Single-field edit of a [`StampConfig`], one variant per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigUpdate {
    StartValue(i64),
    EndValue(i64),
    Prefix(String),
    IncludeQr(bool),
    IncludeBarcode(bool),
    ShowQrText(bool),
    ShowBarcodeText(bool),
    QrSize(u32),
    BarcodeWidth(u32),
    BarcodeHeight(u32),
    QrX(u32),
    QrY(u32),
    BarcodeX(u32),
    BarcodeY(u32),
    TextOffsetY(u32),
}

/// Body of `GET /config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsResponse {
    pub max_pages: u32,
    #[serde(default)]
    pub supported_formats: Vec<String>,
}

/// Success body of `POST /upload-template`. The template image is an opaque
/// encoded payload the client never decodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadTemplateResponse {
    pub template_image: String,
    pub dimensions: Dimensions,
}

/// Success body of `POST /preview`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub preview_image: String,
    pub total_pages: u32,
}

/// Error body the render service attaches to non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_replaces_only_the_target_field() {
        let base = StampConfig::default();
        let cases: Vec<(ConfigUpdate, StampConfig)> = vec![
            (ConfigUpdate::StartValue(5), StampConfig { start_value: 5, ..base.clone() }),
            (ConfigUpdate::EndValue(42), StampConfig { end_value: 42, ..base.clone() }),
            (
                ConfigUpdate::Prefix("PT".into()),
                StampConfig { prefix: "PT".into(), ..base.clone() },
            ),
            (ConfigUpdate::IncludeQr(false), StampConfig { include_qr: false, ..base.clone() }),
            (
                ConfigUpdate::IncludeBarcode(true),
                StampConfig { include_barcode: true, ..base.clone() },
            ),
            (ConfigUpdate::ShowQrText(true), StampConfig { show_qr_text: true, ..base.clone() }),
            (
                ConfigUpdate::ShowBarcodeText(true),
                StampConfig { show_barcode_text: true, ..base.clone() },
            ),
            (ConfigUpdate::QrSize(150), StampConfig { qr_size: 150, ..base.clone() }),
            (ConfigUpdate::BarcodeWidth(300), StampConfig { barcode_width: 300, ..base.clone() }),
            (ConfigUpdate::BarcodeHeight(80), StampConfig { barcode_height: 80, ..base.clone() }),
            (ConfigUpdate::QrX(0), StampConfig { qr_x: 0, ..base.clone() }),
            (ConfigUpdate::QrY(17), StampConfig { qr_y: 17, ..base.clone() }),
            (ConfigUpdate::BarcodeX(9), StampConfig { barcode_x: 9, ..base.clone() }),
            (ConfigUpdate::BarcodeY(400), StampConfig { barcode_y: 400, ..base.clone() }),
            (ConfigUpdate::TextOffsetY(25), StampConfig { text_offset_y: 25, ..base.clone() }),
        ];

        for (update, expected) in cases {
            assert_eq!(base.apply(update.clone()), expected, "update {update:?}");
        }
    }

    #[test]
    fn toggling_include_qr_off_keeps_show_qr_text() {
        let config = StampConfig::default().apply(ConfigUpdate::ShowQrText(true));
        let toggled = config.apply(ConfigUpdate::IncludeQr(false));
        assert!(toggled.show_qr_text);
    }

    #[test]
    fn page_count_is_inclusive() {
        let config = StampConfig::default()
            .apply(ConfigUpdate::StartValue(1))
            .apply(ConfigUpdate::EndValue(10));
        assert_eq!(config.page_count(), 10);
    }

    #[test]
    fn config_serializes_with_wire_field_names() {
        let json = serde_json::to_value(StampConfig::default()).expect("serialize");
        for field in [
            "start_value",
            "end_value",
            "prefix",
            "include_qr",
            "include_barcode",
            "show_qr_text",
            "show_barcode_text",
            "qr_size",
            "barcode_width",
            "barcode_height",
            "qr_x",
            "qr_y",
            "barcode_x",
            "barcode_y",
            "text_offset_y",
        ] {
            assert!(json.get(field).is_some(), "missing wire field {field}");
        }
    }

    #[test]
    fn limits_response_tolerates_missing_supported_formats() {
        let limits: LimitsResponse =
            serde_json::from_str(r#"{"max_pages": 250}"#).expect("decode");
        assert_eq!(limits.max_pages, 250);
        assert!(limits.supported_formats.is_empty());
    }
}
