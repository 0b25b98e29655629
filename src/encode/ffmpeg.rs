use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{IgError, IgResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::frame::FrameRGBA;

/// Default target video bitrate.
pub const DEFAULT_BITRATE_BPS: u32 = 5_000_000;

/// Options for [`FfmpegSink`] WebM output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output `.webm` file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Target video bitrate in bits per second.
    pub bitrate_bps: u32,
    /// Longest the ffmpeg process may live, measured from `begin`. `None` waits forever.
    pub watchdog: Option<Duration>,
}

impl FfmpegSinkOpts {
    /// Options for writing a WebM to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
            bitrate_bps: DEFAULT_BITRATE_BPS,
            watchdog: None,
        }
    }
}

struct Watchdog {
    cancel: mpsc::Sender<()>,
    fired: Arc<AtomicBool>,
    handle: std::thread::JoinHandle<()>,
    limit: Duration,
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin, producing VP9 WebM.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Arc<Mutex<Child>>>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    watchdog: Option<Watchdog>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            watchdog: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    fn timed_out(&self) -> Option<Duration> {
        self.watchdog
            .as_ref()
            .filter(|w| w.fired.load(Ordering::SeqCst))
            .map(|w| w.limit)
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> IgResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(IgError::invalid_input("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(IgError::invalid_input(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(IgError::invalid_input(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(IgError::invalid_input(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(anyhow::anyhow!(
                "ffmpeg is required for video capture, but was not found on PATH"
            )
            .into());
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });

        // Frames arrive premultiplied; push_frame flattens them to opaque RGBA first.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);
        cmd.args([
            "-an",
            "-c:v",
            "libvpx-vp9",
            "-b:v",
            &self.opts.bitrate_bps.to_string(),
            "-deadline",
            "realtime",
            "-cpu-used",
            "8",
            "-pix_fmt",
            "yuv420p",
            "-f",
            "webm",
        ]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            anyhow::anyhow!("failed to spawn ffmpeg (is it installed and on PATH?): {e}")
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow::anyhow!("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        let child = Arc::new(Mutex::new(child));
        self.watchdog = self
            .opts
            .watchdog
            .map(|limit| spawn_watchdog(Arc::clone(&child), limit));

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> IgResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(anyhow::anyhow!("ffmpeg sink received out-of-order frame index").into());
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(IgError::invalid_input(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(IgError::invalid_input(
                "frame.data size mismatch with width*height*4",
            ));
        }

        if frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(
                &mut self.scratch,
                &frame.data,
                self.opts.bg_rgba,
            )?;
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let write = match self.stdin.as_mut() {
            Some(stdin) => {
                use std::io::Write as _;
                stdin.write_all(&self.scratch)
            }
            None => return Err(anyhow::anyhow!("ffmpeg sink is already finalized").into()),
        };
        if let Err(e) = write {
            if let Some(limit) = self.timed_out() {
                return Err(timeout_error(limit));
            }
            return Err(anyhow::anyhow!("failed to write frame to ffmpeg stdin: {e}").into());
        }
        Ok(())
    }

    fn end(&mut self) -> IgResult<()> {
        drop(self.stdin.take());
        let child = self
            .child
            .take()
            .ok_or_else(|| anyhow::anyhow!("ffmpeg sink not started"))?;

        let status = wait_child(&child);
        let watchdog = self.watchdog.take();
        let fired = match watchdog {
            Some(w) => {
                let _ = w.cancel.send(());
                let _ = w.handle.join();
                w.fired.load(Ordering::SeqCst).then_some(w.limit)
            }
            None => None,
        };

        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow::anyhow!("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| anyhow::anyhow!("ffmpeg stderr read failed: {e}"))?,
            None => Vec::new(),
        };
        self.cfg = None;

        if let Some(limit) = fired {
            tracing::warn!(limit_ms = limit.as_millis() as u64, "ffmpeg watchdog fired");
            return Err(timeout_error(limit));
        }
        let status = status?;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(anyhow::anyhow!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )
            .into());
        }
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(child) = self.child.take()
            && let Ok(mut c) = child.lock()
        {
            let _ = c.kill();
            let _ = c.wait();
        }
        if let Some(w) = self.watchdog.take() {
            let _ = w.cancel.send(());
            let _ = w.handle.join();
        }
    }
}

fn spawn_watchdog(child: Arc<Mutex<Child>>, limit: Duration) -> Watchdog {
    let (cancel, rx) = mpsc::channel::<()>();
    let fired = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&fired);
    let handle = std::thread::spawn(move || {
        if let Err(mpsc::RecvTimeoutError::Timeout) = rx.recv_timeout(limit) {
            flag.store(true, Ordering::SeqCst);
            if let Ok(mut c) = child.lock() {
                let _ = c.kill();
            }
        }
    });
    Watchdog {
        cancel,
        fired,
        handle,
        limit,
    }
}

fn wait_child(child: &Mutex<Child>) -> IgResult<std::process::ExitStatus> {
    loop {
        let polled = {
            let mut c = child
                .lock()
                .map_err(|_| anyhow::anyhow!("ffmpeg child handle poisoned"))?;
            c.try_wait()
                .map_err(|e| anyhow::anyhow!("failed to wait for ffmpeg to finish: {e}"))?
        };
        if let Some(status) = polled {
            return Ok(status);
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}

fn timeout_error(limit: Duration) -> IgError {
    anyhow::anyhow!(
        "ffmpeg did not finish within {:.1}s and was killed",
        limit.as_secs_f64()
    )
    .into()
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // Rawvideo input rate goes before `-i`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> IgResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(IgError::invalid_input(
            "flatten expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> IgResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
