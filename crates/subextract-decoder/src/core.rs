use std::time::Duration;

pub use subextract_types::{CropBand, FrameError, FrameResult, RgbFrame};

pub type DynFrameSource = Box<dyn FrameSource>;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VideoMetadata {
    pub duration: Option<Duration>,
    pub fps: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub total_frames: Option<u64>,
}

impl VideoMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration_and_fps(duration: Duration, fps: f64) -> Self {
        Self {
            duration: Some(duration),
            fps: Some(fps),
            ..Default::default()
        }
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration.map(|d| d.as_secs_f64())
    }

    pub fn calculate_total_frames(&self) -> Option<u64> {
        if let Some(total) = self.total_frames {
            return Some(total);
        }

        if let (Some(duration), Some(fps)) = (self.duration, self.fps) {
            let total = (duration.as_secs_f64() * fps).round();
            if total.is_finite() && total >= 0.0 {
                return Some(total as u64);
            }
        }

        None
    }
}

/// Random-access view of a decodable video.
///
/// `frame_at` returns `Ok(None)` at or past end of stream; that is the normal
/// termination signal for callers, not a failure. Calls block until the frame
/// is decoded.
pub trait FrameSource: Send {
    fn metadata(&self) -> VideoMetadata {
        VideoMetadata::default()
    }

    fn frame_at(&mut self, frame_index: u64) -> FrameResult<Option<RgbFrame>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_frames_prefers_container_count() {
        let metadata = VideoMetadata {
            duration: Some(Duration::from_secs(10)),
            fps: Some(30.0),
            total_frames: Some(299),
            ..Default::default()
        };
        assert_eq!(metadata.calculate_total_frames(), Some(299));
    }

    #[test]
    fn total_frames_derives_from_duration_and_fps() {
        let metadata = VideoMetadata::with_duration_and_fps(Duration::from_secs(10), 29.97);
        assert_eq!(metadata.calculate_total_frames(), Some(300));
        assert_eq!(metadata.duration_seconds(), Some(10.0));
    }

    #[test]
    fn total_frames_unknown_without_timing() {
        assert_eq!(VideoMetadata::new().calculate_total_frames(), None);
    }
}
