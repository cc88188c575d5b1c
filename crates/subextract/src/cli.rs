use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OcrBackend {
    Auto,
    Tesseract,
    Noop,
}

#[derive(Debug, Default)]
pub struct CliSources {
    pub output_from_cli: bool,
    pub interval_from_cli: bool,
    pub crop_top_from_cli: bool,
    pub crop_bottom_from_cli: bool,
    pub ocr_backend_from_cli: bool,
    pub ocr_languages_from_cli: bool,
}

impl CliSources {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            output_from_cli: value_from_cli(matches, "output"),
            interval_from_cli: value_from_cli(matches, "interval"),
            crop_top_from_cli: value_from_cli(matches, "crop_top"),
            crop_bottom_from_cli: value_from_cli(matches, "crop_bottom"),
            ocr_backend_from_cli: value_from_cli(matches, "ocr_backend"),
            ocr_languages_from_cli: value_from_cli(matches, "ocr_languages"),
        }
    }
}

fn value_from_cli(matches: &ArgMatches, id: &str) -> bool {
    matches
        .value_source(id)
        .is_some_and(|source| matches!(source, ValueSource::CommandLine))
}

pub fn parse_cli() -> (CliArgs, CliSources) {
    let command = CliArgs::command();
    let matches = command.get_matches();
    let args = match CliArgs::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(err) => err.exit(),
    };
    let sources = CliSources::from_matches(&matches);
    (args, sources)
}

#[derive(Debug, Parser)]
#[command(
    name = "subextract",
    about = "Extract burned-in subtitles from a video into an SRT file",
    disable_help_subcommand = true
)]
pub struct CliArgs {
    /// Lock decoding to a specific backend implementation
    #[arg(short = 'b', long = "backend")]
    pub backend: Option<String>,

    /// Override the configuration file path
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Output path for the generated SRT file
    #[arg(
        long = "output",
        id = "output",
        value_name = "FILE",
        default_value = "extracted_subtitles.srt"
    )]
    pub output: PathBuf,

    /// Print the list of available decoding backends
    #[arg(long = "list-backends")]
    pub list_backends: bool,

    /// Seconds between consecutive samples
    #[arg(long = "interval", id = "interval", default_value_t = 1.0)]
    pub interval: f64,

    /// Top of the subtitle crop band in pixels (defaults to the bottom
    /// quarter of the frame)
    #[arg(long = "crop-top", id = "crop_top", value_name = "PX")]
    pub crop_top: Option<u32>,

    /// Bottom of the subtitle crop band in pixels (defaults to the frame
    /// height)
    #[arg(long = "crop-bottom", id = "crop_bottom", value_name = "PX")]
    pub crop_bottom: Option<u32>,

    /// Preferred OCR backend
    #[arg(long = "ocr-backend", id = "ocr_backend", value_enum, default_value_t = OcrBackend::Auto)]
    pub ocr_backend: OcrBackend,

    /// Restrict recognition to the provided language (repeatable)
    #[arg(long = "ocr-language", id = "ocr_languages", value_name = "LANG")]
    pub ocr_languages: Vec<String>,

    /// Input video path
    pub input: Option<PathBuf>,
}
