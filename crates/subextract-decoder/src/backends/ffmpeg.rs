use std::path::{Path, PathBuf};
use std::time::Duration;

use ffmpeg::util::error::{EAGAIN, EWOULDBLOCK};
use ffmpeg_next as ffmpeg;

use crate::core::{
    DynFrameSource, FrameError, FrameResult, FrameSource, RgbFrame, VideoMetadata,
};

const BACKEND_NAME: &str = "ffmpeg";

pub struct FfmpegSource {
    ictx: ffmpeg::format::context::Input,
    decoder: ffmpeg::decoder::Video,
    scaler: ffmpeg::software::scaling::context::Context,
    stream_index: usize,
    time_base: ffmpeg::Rational,
    fps: f64,
    metadata: VideoMetadata,
}

impl FfmpegSource {
    pub fn open<P: AsRef<Path>>(path: P) -> FrameResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FrameError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input file {} does not exist", path.display()),
            )));
        }
        ffmpeg::init()
            .map_err(|err| FrameError::backend_failure(BACKEND_NAME, err.to_string()))?;

        let ictx = ffmpeg::format::input(&PathBuf::from(path))
            .map_err(|err| FrameError::backend_failure(BACKEND_NAME, err.to_string()))?;
        let input_stream = ictx
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| FrameError::backend_failure(BACKEND_NAME, "no video stream found"))?;
        let stream_index = input_stream.index();
        let time_base = input_stream.time_base();

        let rate = input_stream.avg_frame_rate();
        let fps = f64::from(rate);
        if !fps.is_finite() || fps <= 0.0 {
            return Err(FrameError::backend_failure(
                BACKEND_NAME,
                "could not determine the stream frame rate",
            ));
        }

        let total_frames = match input_stream.frames() {
            count if count > 0 => Some(count as u64),
            _ => None,
        };

        let context = ffmpeg::codec::context::Context::from_parameters(input_stream.parameters())
            .map_err(|err| FrameError::backend_failure(BACKEND_NAME, err.to_string()))?;
        let decoder = context
            .decoder()
            .video()
            .map_err(|err| FrameError::backend_failure(BACKEND_NAME, err.to_string()))?;

        let scaler = ffmpeg::software::scaling::context::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::format::pixel::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::flag::Flags::FAST_BILINEAR,
        )
        .map_err(|err| FrameError::backend_failure(BACKEND_NAME, err.to_string()))?;

        let duration = match ictx.duration() {
            av if av >= 0 => Some(Duration::from_secs_f64(
                av as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE),
            )),
            _ => None,
        };

        let metadata = VideoMetadata {
            duration,
            fps: Some(fps),
            width: Some(decoder.width()),
            height: Some(decoder.height()),
            total_frames,
        };

        Ok(Self {
            ictx,
            decoder,
            scaler,
            stream_index,
            time_base,
            fps,
            metadata,
        })
    }
}

impl FrameSource for FfmpegSource {
    fn metadata(&self) -> VideoMetadata {
        self.metadata
    }

    fn frame_at(&mut self, frame_index: u64) -> FrameResult<Option<RgbFrame>> {
        let target = frame_index as f64 / self.fps;
        // Accept the first decoded frame within half a frame period of the
        // requested timestamp.
        let tolerance = 0.5 / self.fps;

        let seek_ts = (target * f64::from(ffmpeg::ffi::AV_TIME_BASE)) as i64;
        self.ictx
            .seek(seek_ts, ..seek_ts)
            .map_err(|err| FrameError::backend_failure(BACKEND_NAME, err.to_string()))?;
        self.decoder.flush();

        let Self {
            ictx,
            decoder,
            scaler,
            stream_index,
            time_base,
            ..
        } = self;
        let tick = f64::from(*time_base);

        let mut decoded = ffmpeg::util::frame::Video::empty();
        let mut converted = ffmpeg::util::frame::Video::empty();

        let mut try_receive =
            |decoder: &mut ffmpeg::decoder::Video| -> FrameResult<Option<RgbFrame>> {
                loop {
                    match decoder.receive_frame(&mut decoded) {
                        Ok(()) => {
                            let seconds = decoded
                                .timestamp()
                                .or(decoded.pts())
                                .map(|pts| pts as f64 * tick);
                            if let Some(seconds) = seconds
                                && seconds + tolerance < target
                            {
                                continue;
                            }
                            scaler.run(&decoded, &mut converted).map_err(|err| {
                                FrameError::backend_failure(BACKEND_NAME, err.to_string())
                            })?;
                            let frame =
                                rgb_frame_from_converted(&converted, seconds, frame_index)?;
                            return Ok(Some(frame));
                        }
                        Err(err) if is_retryable_error(&err) => return Ok(None),
                        Err(ffmpeg::Error::Eof) => return Ok(None),
                        Err(err) => {
                            return Err(FrameError::backend_failure(
                                BACKEND_NAME,
                                err.to_string(),
                            ));
                        }
                    }
                }
            };

        for (stream, packet) in ictx.packets() {
            if stream.index() != *stream_index {
                continue;
            }
            if let Err(err) = decoder.send_packet(&packet) {
                if !is_retryable_error(&err) {
                    return Err(FrameError::backend_failure(BACKEND_NAME, err.to_string()));
                }
            }
            if let Some(frame) = try_receive(decoder)? {
                return Ok(Some(frame));
            }
        }

        if let Err(err) = decoder.send_eof()
            && !matches!(err, ffmpeg::Error::Eof)
        {
            return Err(FrameError::backend_failure(BACKEND_NAME, err.to_string()));
        }
        try_receive(decoder)
    }
}

fn rgb_frame_from_converted(
    frame: &ffmpeg::util::frame::Video,
    seconds: Option<f64>,
    frame_index: u64,
) -> FrameResult<RgbFrame> {
    let plane = frame.data(0);
    let stride = frame.stride(0);
    let width = frame.width();
    let height = frame.height();
    let mut buffer = Vec::with_capacity(stride * height as usize);
    for row in 0..height as usize {
        let offset = row * stride;
        buffer.extend_from_slice(&plane[offset..offset + stride]);
    }
    let timestamp = seconds
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(Duration::from_secs_f64);
    Ok(
        RgbFrame::from_owned(width, height, stride, timestamp, buffer)?
            .with_frame_index(Some(frame_index)),
    )
}

fn is_retryable_error(error: &ffmpeg::Error) -> bool {
    matches!(
        error,
        ffmpeg::Error::Other { errno }
            if *errno == EAGAIN || *errno == EWOULDBLOCK
    )
}

pub fn boxed_ffmpeg<P: AsRef<Path>>(path: P) -> FrameResult<DynFrameSource> {
    Ok(Box::new(FfmpegSource::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_returns_error() {
        let result = FfmpegSource::open("/tmp/nonexistent-file.mp4");
        assert!(result.is_err());
    }
}
