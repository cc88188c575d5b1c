use std::time::Duration;

use futures_util::stream::unfold;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

use crate::extractor::ExtractionEvent;
use crate::srt::format_timestamp;

// Bar positions are per-mille of the progress fraction.
const PROGRESS_SCALE: u64 = 1000;
const PROGRESS_CHANNEL_CAPACITY: usize = 64;

pub fn event_channel() -> (
    mpsc::Sender<ExtractionEvent>,
    mpsc::Receiver<ExtractionEvent>,
) {
    mpsc::channel(PROGRESS_CHANNEL_CAPACITY)
}

pub fn extraction_bar() -> ProgressBar {
    let bar = ProgressBar::new(PROGRESS_SCALE);
    bar.set_style(bar_style());
    bar.set_prefix("extract");
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Consumes engine events until the channel closes: bar position follows the
/// progress fraction, each freshly recognized text is echoed above the bar.
pub async fn drive_progress(bar: ProgressBar, rx: mpsc::Receiver<ExtractionEvent>) {
    let mut events = Box::pin(unfold(rx, |mut receiver| async {
        receiver.recv().await.map(|item| (item, receiver))
    }));

    while let Some(event) = events.next().await {
        match event {
            ExtractionEvent::Progress { fraction } => {
                let clamped = fraction.clamp(0.0, 1.0);
                bar.set_position((clamped * PROGRESS_SCALE as f64).round() as u64);
            }
            ExtractionEvent::Recognized { timestamp, text } => {
                bar.println(format!("[{}] {}", format_timestamp(timestamp), text));
                bar.set_message(text);
            }
        }
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{prefix:.bold} {bar:40.cyan/blue} {percent:>3.bold}% [{elapsed_precise:.dim}] {msg:.yellow}",
    )
    .expect("invalid extraction bar template")
    .progress_chars("█▉▊▋▌▍▎▏ ")
}
