use std::fmt;

use subextract_types::{CropBand, RgbFrame};

use crate::error::OcrError;

/// Borrowed view over the rows `[top, bottom)` of a packed RGB frame. The
/// horizontal axis is never cropped.
#[derive(Clone)]
pub struct RgbBand<'a> {
    width: u32,
    rows: u32,
    stride: usize,
    data: &'a [u8],
}

impl<'a> RgbBand<'a> {
    pub fn from_frame(frame: &'a RgbFrame, band: CropBand) -> Result<Self, OcrError> {
        if band.bottom() > frame.height() {
            return Err(OcrError::BandOutOfBounds {
                top: band.top(),
                bottom: band.bottom(),
                height: frame.height(),
            });
        }
        let stride = frame.stride();
        let start = band.top() as usize * stride;
        let end = band.bottom() as usize * stride;
        let data = frame.data();
        if data.len() < end {
            return Err(OcrError::InsufficientBandData {
                provided: data.len(),
                required: end,
            });
        }
        Ok(Self {
            width: frame.width(),
            rows: band.rows(),
            stride,
            data: &data[start..end],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

impl fmt::Debug for RgbBand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RgbBand")
            .field("width", &self.width)
            .field("rows", &self.rows)
            .field("stride", &self.stride)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_rows(height: u32) -> RgbFrame {
        let stride = 4 * 3;
        let mut data = Vec::with_capacity(stride * height as usize);
        for row in 0..height {
            data.extend(std::iter::repeat_n(row as u8, stride));
        }
        RgbFrame::from_owned(4, height, stride, None, data).unwrap()
    }

    #[test]
    fn band_view_selects_requested_rows() {
        let frame = frame_with_rows(8);
        let band = CropBand::new(6, 8).unwrap();
        let view = RgbBand::from_frame(&frame, band).unwrap();
        assert_eq!(view.rows(), 2);
        assert_eq!(view.data().len(), 2 * frame.stride());
        assert!(view.data()[..frame.stride()].iter().all(|&b| b == 6));
        assert!(view.data()[frame.stride()..].iter().all(|&b| b == 7));
    }

    #[test]
    fn band_view_rejects_out_of_bounds() {
        let frame = frame_with_rows(8);
        let band = CropBand::new(6, 9).unwrap();
        let err = RgbBand::from_frame(&frame, band).unwrap_err();
        assert!(matches!(err, OcrError::BandOutOfBounds { height: 8, .. }));
    }
}
