use crate::srt::{SubtitleEntry, TimeSpan};

/// Deduplicating subtitle assembler.
///
/// Tracks the text of the most recently opened entry and opens a new one only
/// when a non-empty observation differs from it. Two states: no active text
/// (initial) and active text; repeated or empty observations are self-loops
/// that leave everything unchanged. Entries are never revised after creation,
/// so consecutive differing texts produce back-to-back or overlapping spans
/// with no merging and no minimum duration.
pub struct SubtitleAssembler {
    interval: f64,
    last_text: Option<String>,
    next_index: u32,
    entries: Vec<SubtitleEntry>,
}

impl SubtitleAssembler {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            last_text: None,
            next_index: 1,
            entries: Vec::new(),
        }
    }

    /// Feeds one observation; returns the entry it opened, if any.
    ///
    /// An empty observation deliberately leaves the deduplication state
    /// untouched: the same text reappearing after a silent gap is not
    /// re-emitted.
    pub fn observe(&mut self, timestamp: f64, text: &str) -> Option<&SubtitleEntry> {
        if text.is_empty() || self.last_text.as_deref() == Some(text) {
            return None;
        }
        let entry = SubtitleEntry {
            index: self.next_index,
            span: TimeSpan {
                start: timestamp,
                end: timestamp + self.interval,
            },
            text: text.to_string(),
        };
        self.last_text = Some(entry.text.clone());
        self.next_index += 1;
        self.entries.push(entry);
        self.entries.last()
    }

    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<SubtitleEntry> {
        self.entries
    }
}
