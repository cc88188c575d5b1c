mod backends;
mod band;
mod engine;
mod error;
mod response;

#[cfg(feature = "engine-tesseract")]
pub use backends::tesseract::{TesseractConfig, TesseractRecognizer};
pub use band::RgbBand;
pub use engine::{NoopRecognizer, TextRecognizer};
pub use error::OcrError;
pub use response::{OcrFragment, OcrResponse};
