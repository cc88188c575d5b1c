use std::fs;
use std::sync::Mutex;

use subextract::extractor::{Extractor, ExtractorConfig, RunStatus};
use subextract::srt::render_srt;
use subextract_decoder::{Backend, Configuration};
use subextract_ocr::{NoopRecognizer, OcrError, OcrFragment, OcrResponse, RgbBand, TextRecognizer};
use subextract_types::CropBand;

struct SequenceRecognizer {
    script: Mutex<std::vec::IntoIter<&'static str>>,
}

impl SequenceRecognizer {
    fn new(script: &[&'static str]) -> Self {
        Self {
            script: Mutex::new(script.to_vec().into_iter()),
        }
    }
}

impl TextRecognizer for SequenceRecognizer {
    fn name(&self) -> &'static str {
        "sequence"
    }

    fn recognize(&self, _: &RgbBand<'_>) -> Result<OcrResponse, OcrError> {
        match self.script.lock().unwrap().next() {
            Some(text) if !text.is_empty() => {
                Ok(OcrResponse::new(vec![OcrFragment::new(text.to_string())]))
            }
            _ => Ok(OcrResponse::empty()),
        }
    }
}

fn mock_source() -> subextract_decoder::DynFrameSource {
    let mut config = Configuration::default();
    config.backend = Backend::Mock;
    config.create_source().expect("mock backend available")
}

#[test]
fn silent_mock_video_produces_an_empty_srt() {
    let mut source = mock_source();
    let extractor = Extractor::new(ExtractorConfig {
        interval: 1.0,
        band: CropBand::new(270, 360).unwrap(),
    })
    .unwrap();

    let report = extractor.run(source.as_mut(), &NoopRecognizer).unwrap();
    assert!(matches!(report.status, RunStatus::Completed));
    assert!(report.entries.is_empty());
    assert_eq!(render_srt(&report.entries), "");
}

#[test]
fn recognized_text_round_trips_into_an_srt_file() {
    let mut source = mock_source();
    // The mock video is 4 seconds long at 30 fps, so interval 1.0 samples
    // four frames.
    let recognizer = SequenceRecognizer::new(&["First line", "First line", "Second line", ""]);
    let extractor = Extractor::new(ExtractorConfig {
        interval: 1.0,
        band: CropBand::new(270, 360).unwrap(),
    })
    .unwrap();

    let report = extractor.run(source.as_mut(), &recognizer).unwrap();
    assert!(matches!(report.status, RunStatus::Completed));
    assert_eq!(report.entries.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("extracted_subtitles.srt");
    fs::write(&path, render_srt(&report.entries)).unwrap();

    let written = fs::read_to_string(&path).unwrap();
    let expected = "1\n00:00:00,000 --> 00:00:01,000\nFirst line\n\n\
                    2\n00:00:02,000 --> 00:00:03,000\nSecond line\n\n";
    assert_eq!(written, expected);
}

#[test]
fn crop_band_outside_the_mock_frame_is_rejected_before_sampling() {
    let mut source = mock_source();
    let extractor = Extractor::new(ExtractorConfig {
        interval: 1.0,
        band: CropBand::new(300, 400).unwrap(),
    })
    .unwrap();

    assert!(extractor.run(source.as_mut(), &NoopRecognizer).is_err());
}
