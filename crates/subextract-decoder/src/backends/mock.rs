use std::path::PathBuf;
use std::time::Duration;

use crate::core::{DynFrameSource, FrameResult, FrameSource, RgbFrame, VideoMetadata};

/// Synthetic source used by tests and CI: deterministic frames, no codecs.
pub struct MockSource {
    _input: Option<PathBuf>,
    width: u32,
    height: u32,
    fps: f64,
    frame_count: u64,
}

impl MockSource {
    const WIDTH: u32 = 640;
    const HEIGHT: u32 = 360;
    const FPS: f64 = 30.0;
    const FRAME_COUNT: u64 = 120;

    pub fn new(input: Option<PathBuf>) -> Self {
        Self {
            _input: input,
            width: Self::WIDTH,
            height: Self::HEIGHT,
            fps: Self::FPS,
            frame_count: Self::FRAME_COUNT,
        }
    }

    fn stride(&self) -> usize {
        self.width as usize * 3
    }
}

pub fn boxed_mock(input: Option<PathBuf>) -> FrameResult<DynFrameSource> {
    Ok(Box::new(MockSource::new(input)))
}

impl FrameSource for MockSource {
    fn metadata(&self) -> VideoMetadata {
        VideoMetadata {
            duration: Some(Duration::from_secs_f64(self.frame_count as f64 / self.fps)),
            fps: Some(self.fps),
            width: Some(self.width),
            height: Some(self.height),
            total_frames: Some(self.frame_count),
        }
    }

    fn frame_at(&mut self, frame_index: u64) -> FrameResult<Option<RgbFrame>> {
        if frame_index >= self.frame_count {
            return Ok(None);
        }
        let stride = self.stride();
        let mut data = vec![0u8; stride * self.height as usize];
        for (row, chunk) in data.chunks_mut(stride).enumerate() {
            let value = ((row as u64 + frame_index) % 256) as u8;
            chunk.fill(value);
        }
        let timestamp = Duration::from_secs_f64(frame_index as f64 / self.fps);
        let frame = RgbFrame::from_owned(self.width, self.height, stride, Some(timestamp), data)?
            .with_frame_index(Some(frame_index));
        Ok(Some(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_source_emits_frames() {
        let mut source = MockSource::new(None);
        let metadata = source.metadata();
        assert_eq!(metadata.total_frames, Some(120));
        assert_eq!(metadata.fps, Some(30.0));

        let frame = source.frame_at(0).unwrap().expect("first frame");
        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 360);
        assert_eq!(frame.data().len(), 640 * 3 * 360);
        assert_eq!(frame.frame_index(), Some(0));
    }

    #[test]
    fn mock_source_ends_past_last_frame() {
        let mut source = MockSource::new(None);
        assert!(source.frame_at(119).unwrap().is_some());
        assert!(source.frame_at(120).unwrap().is_none());
        assert!(source.frame_at(500).unwrap().is_none());
    }

    #[test]
    fn mock_frames_are_deterministic() {
        let mut source = MockSource::new(None);
        let a = source.frame_at(7).unwrap().unwrap();
        let b = source.frame_at(7).unwrap().unwrap();
        assert_eq!(a.data(), b.data());
        assert_eq!(a.timestamp(), b.timestamp());
    }
}
