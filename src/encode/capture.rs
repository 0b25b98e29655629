use std::time::Duration;

use anyhow::Context as _;

use crate::content::model::DEFAULT_DURATION_SECS;
use crate::encode::ffmpeg::{DEFAULT_BITRATE_BPS, FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{IgError, IgResult};
use crate::render::frame::FrameRGBA;

/// Capture frame rate.
pub const CAPTURE_FPS: Fps = Fps { num: 30, den: 1 };

/// How a still frame is turned into a clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureSpec {
    /// Clip length in seconds.
    pub duration_secs: u32,
    pub fps: Fps,
    /// Target bitrate in bits per second.
    pub bitrate_bps: u32,
}

impl Default for CaptureSpec {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

impl CaptureSpec {
    /// 30 fps at 5 Mbps for `duration_secs`.
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            fps: CAPTURE_FPS,
            bitrate_bps: DEFAULT_BITRATE_BPS,
        }
    }

    /// Frames needed to cover the duration.
    pub fn frame_count(&self) -> u64 {
        self.fps.secs_to_frames_floor(f64::from(self.duration_secs))
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_secs))
    }
}

/// Turns one still frame into an encoded clip that shows it for the requested duration.
///
/// `progress` receives values in `[0, 100]`, non-decreasing, ending at 100 on success.
pub trait StillCapture {
    fn capture_still(
        &mut self,
        frame: &FrameRGBA,
        spec: &CaptureSpec,
        progress: &mut dyn FnMut(f64),
    ) -> IgResult<Vec<u8>>;

    /// MIME type of the produced bytes.
    fn mime(&self) -> &'static str {
        "video/webm"
    }

    /// File extension (without dot) of the produced bytes.
    fn extension(&self) -> &'static str {
        "webm"
    }
}

/// Push `frame` into `sink` once per output frame of `spec`.
///
/// Returns the number of frames pushed.
pub fn loop_still_into_sink(
    sink: &mut dyn FrameSink,
    frame: &FrameRGBA,
    spec: &CaptureSpec,
    progress: &mut dyn FnMut(f64),
) -> IgResult<u64> {
    let total = spec.frame_count();
    if total == 0 {
        return Err(IgError::invalid_input("capture duration must be > 0"));
    }

    sink.begin(SinkConfig {
        width: frame.width,
        height: frame.height,
        fps: spec.fps,
    })?;
    progress(0.0);
    for i in 0..total {
        sink.push_frame(FrameIndex(i), frame)?;
        progress(((i + 1) as f64 / total as f64) * 100.0);
    }
    sink.end()?;
    Ok(total)
}

/// [`StillCapture`] backed by the system `ffmpeg` (VP9 in WebM).
#[derive(Clone, Debug)]
pub struct FfmpegCapture {
    /// Extra time on top of the clip duration before the watchdog kills ffmpeg.
    pub grace: Duration,
    /// Flatten color for transparent pixels.
    pub bg_rgba: [u8; 4],
}

impl Default for FfmpegCapture {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

impl StillCapture for FfmpegCapture {
    fn capture_still(
        &mut self,
        frame: &FrameRGBA,
        spec: &CaptureSpec,
        progress: &mut dyn FnMut(f64),
    ) -> IgResult<Vec<u8>> {
        let dir = tempfile::tempdir().context("create capture temp dir")?;
        let out = dir.path().join("capture.webm");

        let mut opts = FfmpegSinkOpts::new(&out);
        opts.bg_rgba = self.bg_rgba;
        opts.bitrate_bps = spec.bitrate_bps;
        opts.watchdog = Some(spec.duration() + self.grace);
        let mut sink = FfmpegSink::new(opts);

        let frames = loop_still_into_sink(&mut sink, frame, spec, progress)?;
        let bytes = std::fs::read(&out)
            .with_context(|| format!("read captured video '{}'", out.display()))?;
        tracing::debug!(frames, bytes = bytes.len(), "captured still clip");
        Ok(bytes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/capture.rs"]
mod tests;
