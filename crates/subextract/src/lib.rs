pub mod assembler;
pub mod cli;
pub mod extractor;
pub mod progress;
pub mod settings;
pub mod srt;

pub use assembler::SubtitleAssembler;
pub use extractor::{
    EventSink, ExtractError, ExtractionEvent, ExtractionReport, Extractor, ExtractorConfig,
    RunStatus,
};
pub use srt::{SubtitleEntry, TimeSpan, format_timestamp, render_srt};
