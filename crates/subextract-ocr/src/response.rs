/// One recognized piece of text within the band.
#[derive(Debug, Clone)]
pub struct OcrFragment {
    pub text: String,
    pub confidence: Option<f32>,
}

impl OcrFragment {
    pub fn new(text: String) -> Self {
        Self {
            text,
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, value: f32) -> Self {
        self.confidence = Some(value);
        self
    }
}

/// Collection of recognition results for a single band.
#[derive(Debug, Clone)]
pub struct OcrResponse {
    pub fragments: Vec<OcrFragment>,
}

impl OcrResponse {
    pub fn new(fragments: Vec<OcrFragment>) -> Self {
        Self { fragments }
    }

    pub fn empty() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }
}
