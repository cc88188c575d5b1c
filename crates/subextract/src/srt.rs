use std::fmt::Write as _;

/// Timing of one subtitle, in seconds from the start of the video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

/// One timed block of the output file.
///
/// Entries are immutable once created: the end time is fixed from the
/// sampling interval at creation and never adjusted, even when the same text
/// stays on screen for many more samples. Indices are 1-based and dense in
/// emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    pub index: u32,
    pub span: TimeSpan,
    pub text: String,
}

/// Formats seconds as the `HH:MM:SS,mmm` SRT clock.
///
/// Decomposes from total rounded milliseconds so an exact second boundary
/// carries into the seconds field instead of printing a 1000 ms part.
pub fn format_timestamp(seconds: f64) -> String {
    let millis = (seconds * 1000.0).round() as u64;
    let hours = millis / 3_600_000;
    let minutes = (millis % 3_600_000) / 60_000;
    let secs = (millis % 60_000) / 1000;
    let remain_ms = millis % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02},{remain_ms:03}")
}

/// Renders entries as SRT blocks: index line, timing line, text line, blank
/// line. The file ends with the final block's blank line.
pub fn render_srt(entries: &[SubtitleEntry]) -> String {
    let mut output = String::new();
    for entry in entries {
        let _ = writeln!(&mut output, "{}", entry.index);
        let _ = writeln!(
            &mut output,
            "{} --> {}",
            format_timestamp(entry.span.start),
            format_timestamp(entry.span.end)
        );
        let _ = writeln!(&mut output, "{}", entry.text);
        let _ = writeln!(&mut output);
    }
    output
}
