//! Shared domain models for the subextract workspace.
//!
//! This crate centralizes the lightweight structures used across the decoder,
//! OCR, and CLI crates. Keep it backend-agnostic and free of heavy
//! dependencies so every member can depend on it without pulling native SDKs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

pub type FrameResult<T> = Result<T, FrameError>;

/// Packed RGB24 frame. Rows are `stride` bytes apart, `stride >= width * 3`.
#[derive(Clone)]
pub struct RgbFrame {
    width: u32,
    height: u32,
    stride: usize,
    frame_index: Option<u64>,
    timestamp: Option<Duration>,
    data: Arc<[u8]>,
}

impl fmt::Debug for RgbFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RgbFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("timestamp", &self.timestamp)
            .field("bytes", &self.data.len())
            .field("frame_index", &self.frame_index)
            .finish()
    }
}

impl RgbFrame {
    pub fn from_owned(
        width: u32,
        height: u32,
        stride: usize,
        timestamp: Option<Duration>,
        data: Vec<u8>,
    ) -> FrameResult<Self> {
        if stride < width as usize * 3 {
            return Err(FrameError::InvalidFrame {
                reason: format!("stride {stride} is shorter than {width} RGB pixels"),
            });
        }
        let required =
            stride
                .checked_mul(height as usize)
                .ok_or_else(|| FrameError::InvalidFrame {
                    reason: "calculated frame length overflowed".into(),
                })?;
        if data.len() < required {
            return Err(FrameError::InvalidFrame {
                reason: format!(
                    "insufficient frame bytes: got {} expected at least {}",
                    data.len(),
                    required
                ),
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            timestamp,
            data: Arc::from(data.into_boxed_slice()),
            frame_index: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn timestamp(&self) -> Option<Duration> {
        self.timestamp
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn frame_index(&self) -> Option<u64> {
        self.frame_index
    }

    pub fn with_frame_index(mut self, index: Option<u64>) -> Self {
        self.frame_index = index;
        self
    }
}

/// Vertical pixel range handed to the recognizer; the full frame width is
/// always kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBand {
    top: u32,
    bottom: u32,
}

impl CropBand {
    pub fn new(top: u32, bottom: u32) -> FrameResult<Self> {
        if top >= bottom {
            return Err(FrameError::configuration(format!(
                "crop band top {top} must be above bottom {bottom}"
            )));
        }
        Ok(Self { top, bottom })
    }

    pub fn top(&self) -> u32 {
        self.top
    }

    pub fn bottom(&self) -> u32 {
        self.bottom
    }

    pub fn rows(&self) -> u32 {
        self.bottom - self.top
    }

    /// Checks the band against a concrete frame height. Bands are rejected
    /// before a run starts, never discovered mid-loop.
    pub fn validate(&self, frame_height: u32) -> FrameResult<()> {
        if self.bottom > frame_height {
            return Err(FrameError::configuration(format!(
                "crop band {}..{} exceeds frame height {frame_height}",
                self.top, self.bottom
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("backend {backend} is not supported in this build")]
    Unsupported { backend: &'static str },

    #[error("{backend} backend failed: {message}")]
    BackendFailure {
        backend: &'static str,
        message: String,
    },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("invalid frame: {reason}")]
    InvalidFrame { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    pub fn unsupported(backend: &'static str) -> Self {
        Self::Unsupported { backend }
    }

    pub fn backend_failure(backend: &'static str, message: impl Into<String>) -> Self {
        Self::BackendFailure {
            backend,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rejects_short_buffer() {
        let err = RgbFrame::from_owned(4, 2, 12, None, vec![0; 20]).unwrap_err();
        assert!(matches!(err, FrameError::InvalidFrame { .. }));
    }

    #[test]
    fn frame_rejects_narrow_stride() {
        let err = RgbFrame::from_owned(4, 2, 8, None, vec![0; 64]).unwrap_err();
        assert!(matches!(err, FrameError::InvalidFrame { .. }));
    }

    #[test]
    fn frame_accessors_work() {
        let frame = RgbFrame::from_owned(2, 2, 6, Some(Duration::from_millis(40)), vec![7; 12])
            .unwrap()
            .with_frame_index(Some(3));
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.stride(), 6);
        assert_eq!(frame.timestamp(), Some(Duration::from_millis(40)));
        assert_eq!(frame.frame_index(), Some(3));
        assert_eq!(frame.data().len(), 12);
    }

    #[test]
    fn band_requires_top_above_bottom() {
        assert!(CropBand::new(10, 10).is_err());
        assert!(CropBand::new(20, 10).is_err());
        let band = CropBand::new(270, 360).unwrap();
        assert_eq!(band.rows(), 90);
    }

    #[test]
    fn band_validates_against_frame_height() {
        let band = CropBand::new(270, 360).unwrap();
        assert!(band.validate(360).is_ok());
        assert!(band.validate(359).is_err());
    }
}
