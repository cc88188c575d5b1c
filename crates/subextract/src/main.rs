use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use subextract::cli::{self, OcrBackend};
use subextract::extractor::{
    EventSink, ExtractError, ExtractionReport, Extractor, ExtractorConfig, RunStatus,
};
use subextract::progress;
use subextract::settings::{self, EffectiveSettings, OcrSettings};
use subextract::srt::render_srt;
use subextract_decoder::{Backend, Configuration, FrameError, VideoMetadata};
use subextract_ocr::{NoopRecognizer, OcrError, TextRecognizer};
#[cfg(feature = "ocr-tesseract")]
use subextract_ocr::{TesseractConfig, TesseractRecognizer};
use subextract_types::CropBand;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let (args, sources) = cli::parse_cli();

    if args.list_backends {
        print_available_backends();
        return ExitCode::SUCCESS;
    }

    let settings = match settings::resolve_settings(&args, &sources) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match run(args.input, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(input: Option<PathBuf>, settings: EffectiveSettings) -> Result<(), FrameError> {
    let mut config = Configuration::from_env().unwrap_or_default();
    if let Some(name) = settings.backend.as_deref() {
        config.backend = Backend::from_str(name)?;
    }
    if let Some(path) = input {
        config.input = Some(path);
    }

    let available = Configuration::available_backends();
    if available.is_empty() {
        return Err(FrameError::configuration(
            "no decoding backend available; rebuild with a backend feature such as \"backend-ffmpeg\"",
        ));
    }
    if !available.contains(&config.backend) {
        return Err(FrameError::unsupported(config.backend.as_str()));
    }

    let mut source = config.create_source()?;
    let metadata = source.metadata();
    if let (Some(duration), Some(fps)) = (metadata.duration_seconds(), metadata.fps) {
        println!("video duration: {duration:.2}s | fps: {fps:.2}");
    }

    let band = match settings.crop {
        Some(band) => band,
        None => default_band(&metadata)?,
    };

    let recognizer = build_recognizer(&settings.ocr).map_err(map_ocr_init_error)?;

    let stop = Arc::new(AtomicBool::new(false));
    let signal_stop = Arc::clone(&stop);
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_stop.store(true, Ordering::Relaxed);
        }
    });

    let (tx, rx) = progress::event_channel();
    let sink: EventSink = Arc::new(move |event| {
        let _ = tx.blocking_send(event);
    });

    let extractor = Extractor::new(ExtractorConfig {
        interval: settings.interval,
        band,
    })
    .map_err(map_extract_error)?
    .with_events(sink)
    .with_stop_flag(Arc::clone(&stop));

    let bar = progress::extraction_bar();
    let progress_task = tokio::spawn(progress::drive_progress(bar.clone(), rx));

    // The extractor owns the event sender; the channel closes when the
    // blocking run returns and the progress task drains to completion.
    let worker =
        tokio::task::spawn_blocking(move || extractor.run(source.as_mut(), recognizer.as_ref()));
    let report = worker
        .await
        .map_err(|err| FrameError::configuration(format!("extraction task panicked: {err}")))?
        .map_err(map_extract_error)?;
    let _ = progress_task.await;
    signal_task.abort();

    let ExtractionReport { entries, status } = report;
    match &status {
        RunStatus::Completed => {
            bar.finish_with_message(format!("{} entries", entries.len()));
        }
        RunStatus::Cancelled => {
            bar.abandon_with_message(format!("cancelled after {} entries", entries.len()));
        }
        RunStatus::Failed(err) => {
            bar.abandon_with_message(format!("failed after {} entries: {err}", entries.len()));
        }
    }

    // Entries collected before a cancellation or failure are valid partial
    // output and are still written.
    write_output(&settings.output, &render_srt(&entries)).await?;
    println!("subtitle output written to {}", settings.output.display());

    if let RunStatus::Failed(err) = status {
        return Err(map_extract_error(err));
    }
    Ok(())
}

fn default_band(metadata: &VideoMetadata) -> Result<CropBand, FrameError> {
    let height = metadata.height.ok_or_else(|| {
        FrameError::configuration(
            "frame height unknown; pass --crop-top and --crop-bottom explicitly",
        )
    })?;
    // Burned-in subtitles usually sit in the bottom quarter of the frame.
    CropBand::new(height - height / 4, height)
}

fn build_recognizer(settings: &OcrSettings) -> Result<Arc<dyn TextRecognizer>, OcrError> {
    match settings.backend {
        OcrBackend::Noop => build_noop_recognizer(),
        OcrBackend::Tesseract => build_tesseract_recognizer(settings),
        OcrBackend::Auto => build_auto_recognizer(settings),
    }
}

fn build_noop_recognizer() -> Result<Arc<dyn TextRecognizer>, OcrError> {
    let engine = NoopRecognizer;
    engine.warm_up()?;
    Ok(Arc::new(engine))
}

#[cfg(feature = "ocr-tesseract")]
fn build_tesseract_recognizer(settings: &OcrSettings) -> Result<Arc<dyn TextRecognizer>, OcrError> {
    let config = TesseractConfig {
        languages: settings.languages.clone(),
        data_path: None,
    };
    let engine = TesseractRecognizer::with_config(config)?;
    engine.warm_up()?;
    Ok(Arc::new(engine))
}

#[cfg(not(feature = "ocr-tesseract"))]
fn build_tesseract_recognizer(
    _settings: &OcrSettings,
) -> Result<Arc<dyn TextRecognizer>, OcrError> {
    Err(OcrError::backend(
        "tesseract OCR backend is not compiled into this build",
    ))
}

#[cfg(feature = "ocr-tesseract")]
fn build_auto_recognizer(settings: &OcrSettings) -> Result<Arc<dyn TextRecognizer>, OcrError> {
    match build_tesseract_recognizer(settings) {
        Ok(engine) => Ok(engine),
        Err(_) => build_noop_recognizer(),
    }
}

#[cfg(not(feature = "ocr-tesseract"))]
fn build_auto_recognizer(settings: &OcrSettings) -> Result<Arc<dyn TextRecognizer>, OcrError> {
    let _ = settings;
    build_noop_recognizer()
}

async fn write_output(path: &Path, contents: &str) -> Result<(), FrameError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

fn map_ocr_init_error(err: OcrError) -> FrameError {
    FrameError::configuration(format!("failed to initialize OCR engine: {err}"))
}

fn map_extract_error(err: ExtractError) -> FrameError {
    match err {
        ExtractError::Source(err) => err,
        ExtractError::Recognizer(err) => {
            FrameError::configuration(format!("ocr failure: {err}"))
        }
        other => FrameError::configuration(other.to_string()),
    }
}

fn print_available_backends() {
    let names: Vec<&'static str> = Configuration::available_backends()
        .iter()
        .map(Backend::as_str)
        .collect();
    if names.is_empty() {
        println!("available backends: (none compiled)");
    } else {
        println!("available backends: {}", names.join(", "));
    }
}
