use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use subextract_decoder::FrameSource;
use subextract_ocr::{OcrError, OcrResponse, RgbBand, TextRecognizer};
use subextract_types::{CropBand, FrameError};

use crate::assembler::SubtitleAssembler;
use crate::srt::SubtitleEntry;

/// Observable side effects of a run. Presentation layers subscribe to these
/// instead of sharing state with the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionEvent {
    /// Monotonically non-decreasing fraction in [0, 1], pushed after every
    /// sample step.
    Progress { fraction: f64 },
    /// A new subtitle entry was opened at `timestamp`.
    Recognized { timestamp: f64, text: String },
}

pub type EventSink = Arc<dyn Fn(ExtractionEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct ExtractorConfig {
    /// Seconds between consecutive sample steps; must be positive.
    pub interval: f64,
    /// Vertical band handed to the recognizer.
    pub band: CropBand,
}

/// Sampling driver: walks the timeline at a fixed interval and feeds the
/// recognizer's observations to the deduplicating assembler.
pub struct Extractor {
    config: ExtractorConfig,
    events: Option<EventSink>,
    stop: Option<Arc<AtomicBool>>,
}

#[derive(Debug)]
pub struct ExtractionReport {
    /// Entries in emission order, indices dense from 1.
    pub entries: Vec<SubtitleEntry>,
    pub status: RunStatus,
}

#[derive(Debug)]
pub enum RunStatus {
    Completed,
    Cancelled,
    Failed(ExtractError),
}

#[derive(Debug)]
pub enum ExtractError {
    InvalidInterval(f64),
    MissingMetadata(&'static str),
    Source(FrameError),
    Recognizer(OcrError),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::InvalidInterval(value) => {
                write!(f, "sampling interval must be positive, got {value}")
            }
            ExtractError::MissingMetadata(field) => {
                write!(f, "video source does not report its {field}")
            }
            ExtractError::Source(err) => write!(f, "frame source error: {err}"),
            ExtractError::Recognizer(err) => write!(f, "recognizer error: {err}"),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::Source(err) => Some(err),
            ExtractError::Recognizer(err) => Some(err),
            _ => None,
        }
    }
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractError> {
        if !config.interval.is_finite() || config.interval <= 0.0 {
            return Err(ExtractError::InvalidInterval(config.interval));
        }
        Ok(Self {
            config,
            events: None,
            stop: None,
        })
    }

    pub fn with_events(mut self, sink: EventSink) -> Self {
        self.events = Some(sink);
        self
    }

    /// Installs a cooperative stop flag, checked at the top of every sample
    /// step. Entries emitted before the flag is seen stay valid.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    /// Runs one extraction over the whole timeline.
    ///
    /// Each step maps the current time to a frame via `round(time * fps)`
    /// (nearest frame, ties away from zero), decodes it, recognizes the crop
    /// band, and hands the observation to the assembler — strictly one decode
    /// then one recognition per step. A source that runs out of frames ends
    /// the run normally; a single missing frame is never retried. Cancelled
    /// and mid-run-failed runs report the entries collected so far.
    pub fn run(
        &self,
        source: &mut dyn FrameSource,
        recognizer: &dyn TextRecognizer,
    ) -> Result<ExtractionReport, ExtractError> {
        recognizer.warm_up().map_err(ExtractError::Recognizer)?;

        let metadata = source.metadata();
        let duration = metadata
            .duration_seconds()
            .ok_or(ExtractError::MissingMetadata("duration"))?;
        let fps = metadata.fps.ok_or(ExtractError::MissingMetadata("fps"))?;
        if let Some(height) = metadata.height {
            self.config
                .band
                .validate(height)
                .map_err(ExtractError::Source)?;
        }

        let interval = self.config.interval;
        let mut assembler = SubtitleAssembler::new(interval);
        let mut current = 0.0_f64;

        while current < duration {
            if self.stop_requested() {
                return Ok(ExtractionReport {
                    entries: assembler.into_entries(),
                    status: RunStatus::Cancelled,
                });
            }

            let frame_index = (current * fps).round() as u64;
            let frame = match source.frame_at(frame_index) {
                Ok(Some(frame)) => frame,
                // Stream exhausted: the normal end condition.
                Ok(None) => break,
                Err(err) => {
                    return Ok(ExtractionReport {
                        entries: assembler.into_entries(),
                        status: RunStatus::Failed(ExtractError::Source(err)),
                    });
                }
            };

            let text = match RgbBand::from_frame(&frame, self.config.band)
                .and_then(|band| recognizer.recognize(&band))
            {
                Ok(response) => flatten_response(&response),
                Err(err) => {
                    return Ok(ExtractionReport {
                        entries: assembler.into_entries(),
                        status: RunStatus::Failed(ExtractError::Recognizer(err)),
                    });
                }
            };

            if let Some(entry) = assembler.observe(current, &text) {
                self.emit(ExtractionEvent::Recognized {
                    timestamp: entry.span.start,
                    text: entry.text.clone(),
                });
            }

            current += interval;
            self.emit(ExtractionEvent::Progress {
                fraction: (current / duration).min(1.0),
            });
        }

        Ok(ExtractionReport {
            entries: assembler.into_entries(),
            status: RunStatus::Completed,
        })
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn emit(&self, event: ExtractionEvent) {
        if let Some(sink) = &self.events {
            sink(event);
        }
    }
}

fn flatten_response(response: &OcrResponse) -> String {
    let parts: Vec<&str> = response
        .fragments
        .iter()
        .map(|fragment| fragment.text.as_str())
        .collect();
    parts.join(" ").trim().to_string()
}
