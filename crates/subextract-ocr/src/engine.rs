use crate::band::RgbBand;
use crate::error::OcrError;
use crate::response::OcrResponse;

/// Common interface for all text recognition engines.
pub trait TextRecognizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// One-time initialization; model loading and language validation happen
    /// here so failures surface before any sampling starts.
    fn warm_up(&self) -> Result<(), OcrError> {
        Ok(())
    }

    fn recognize(&self, band: &RgbBand<'_>) -> Result<OcrResponse, OcrError>;
}

/// Placeholder engine used while a real backend is not wired.
#[derive(Debug, Default)]
pub struct NoopRecognizer;

impl TextRecognizer for NoopRecognizer {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn recognize(&self, _: &RgbBand<'_>) -> Result<OcrResponse, OcrError> {
        Ok(OcrResponse::empty())
    }
}
