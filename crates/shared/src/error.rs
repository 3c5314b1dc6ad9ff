use thiserror::Error;

/// Every failure the stamping client can surface to its caller or its event
/// subscribers. Validation kinds (`NoCodeTypeSelected`, `RangeExceeded`) are
/// recoverable and re-derived on every change; transport kinds carry the
/// server-supplied detail message verbatim when one was present.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StampError {
    #[error("at least one code type must be selected")]
    NoCodeTypeSelected,
    #[error("range of {range} pages exceeds the maximum of {limit}")]
    RangeExceeded { range: i64, limit: u32 },
    #[error("template upload failed: {message}")]
    UploadFailed { message: String },
    #[error("preview generation failed: {message}")]
    PreviewFailed { message: String },
    #[error("document export failed: {message}")]
    ExportFailed { message: String },
    #[error("no template uploaded")]
    NoTemplate,
}

impl StampError {
    pub fn upload(message: impl Into<String>) -> Self {
        Self::UploadFailed {
            message: message.into(),
        }
    }

    pub fn preview(message: impl Into<String>) -> Self {
        Self::PreviewFailed {
            message: message.into(),
        }
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::ExportFailed {
            message: message.into(),
        }
    }
}
