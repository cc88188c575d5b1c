use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use leptess::{LepTess, Variable};

use crate::band::RgbBand;
use crate::engine::TextRecognizer;
use crate::error::OcrError;
use crate::response::{OcrFragment, OcrResponse};

#[derive(Debug, Clone)]
pub struct TesseractConfig {
    /// Tesseract language codes, combined into a `lng1+lng2` set.
    pub languages: Vec<String>,
    /// Override for the tessdata directory; `None` uses the system default.
    pub data_path: Option<String>,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            languages: vec!["eng".to_string()],
            data_path: None,
        }
    }
}

/// Recognizer backed by Tesseract through `leptess`.
///
/// `LepTess` holds raw C pointers and is not `Send`, so the recognizer keeps
/// only its configuration and opens a fresh engine per call.
pub struct TesseractRecognizer {
    languages: String,
    data_path: Option<String>,
}

impl TesseractRecognizer {
    pub fn with_config(config: TesseractConfig) -> Result<Self, OcrError> {
        if config.languages.is_empty() {
            return Err(OcrError::backend("no recognition languages configured"));
        }
        Ok(Self {
            languages: config.languages.join("+"),
            data_path: config.data_path,
        })
    }

    fn open_engine(&self) -> Result<LepTess, OcrError> {
        let mut engine =
            LepTess::new(self.data_path.as_deref(), &self.languages).map_err(|err| {
                OcrError::backend(format!(
                    "failed to initialize tesseract for '{}': {err}",
                    self.languages
                ))
            })?;
        // Subtitle bands are a single uniform block of text.
        engine
            .set_variable(Variable::TesseditPagesegMode, "6")
            .map_err(|err| OcrError::backend(err.to_string()))?;
        Ok(engine)
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn warm_up(&self) -> Result<(), OcrError> {
        // Loads the language models once so an unsupported language set fails
        // before any sampling starts.
        self.open_engine().map(|_| ())
    }

    fn recognize(&self, band: &RgbBand<'_>) -> Result<OcrResponse, OcrError> {
        let encoded = encode_png(band)?;
        let mut engine = self.open_engine()?;
        engine
            .set_image_from_mem(&encoded)
            .map_err(|err| OcrError::backend(err.to_string()))?;
        let text = engine
            .get_utf8_text()
            .map_err(|err| OcrError::backend(err.to_string()))?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(OcrResponse::empty());
        }
        let confidence = engine.mean_text_conf() as f32 / 100.0;
        Ok(OcrResponse::new(vec![
            OcrFragment::new(trimmed.to_string()).with_confidence(confidence),
        ]))
    }
}

// Leptonica reads encoded images from memory, so the band is repacked without
// row padding and handed over as PNG.
fn encode_png(band: &RgbBand<'_>) -> Result<Vec<u8>, OcrError> {
    let row_bytes = band.width() as usize * 3;
    let mut packed = Vec::with_capacity(row_bytes * band.rows() as usize);
    for row in 0..band.rows() as usize {
        let offset = row * band.stride();
        packed.extend_from_slice(&band.data()[offset..offset + row_bytes]);
    }
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(&packed, band.width(), band.rows(), ColorType::Rgb8)
        .map_err(|err| OcrError::backend(err.to_string()))?;
    Ok(out)
}
