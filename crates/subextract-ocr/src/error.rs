use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("crop band {top}..{bottom} does not fit a frame of height {height}")]
    BandOutOfBounds { top: u32, bottom: u32, height: u32 },
    #[error("band data length {provided} is smaller than stride * rows ({required})")]
    InsufficientBandData { provided: usize, required: usize },
    #[error("backend error: {message}")]
    Backend { message: String },
}

impl OcrError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
