use crate::content::model::{ContentKind, DEFAULT_DURATION_SECS};
use crate::encode::capture::{CaptureSpec, StillCapture};
use crate::export::naming::{now_millis, post_filename, reel_filename, still_filename};
use crate::foundation::error::{IgError, IgResult};
use crate::render::frame::RenderedCanvas;
use crate::render::item::RenderedItem;

/// What a single-item video export does when capture fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VideoFallback {
    /// Surface the export error.
    #[default]
    Fail,
    /// Hand back the still frame as a PNG instead.
    StillFrame,
}

/// Options for single-item export.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExportOpts {
    pub video_fallback: VideoFallback,
    /// Fixed filename timestamp (ms since epoch); the current time when `None`.
    pub timestamp_ms: Option<i64>,
}

impl ExportOpts {
    pub(crate) fn timestamp(&self) -> i64 {
        self.timestamp_ms.unwrap_or_else(now_millis)
    }
}

/// One deliverable file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
    /// `true` when a video was replaced by its still frame.
    pub degraded: bool,
}

/// Lossless PNG bytes of `canvas`.
pub fn export_blob(canvas: &RenderedCanvas) -> IgResult<Vec<u8>> {
    canvas.to_png_bytes()
}

/// Capture `item`'s canvas as a clip of its resolved duration.
///
/// `progress` receives the capture percentage; errors are attributed to the item.
pub(crate) fn capture_video(
    item: &RenderedItem,
    capture: &mut dyn StillCapture,
    progress: &mut dyn FnMut(f64),
) -> IgResult<Vec<u8>> {
    let spec = CaptureSpec::new(item.duration.unwrap_or(DEFAULT_DURATION_SECS));
    capture
        .capture_still(item.canvas.frame(), &spec, progress)
        .map_err(|e| match e {
            IgError::Export { .. } => e,
            other => IgError::export(&item.id, other.chain_message()),
        })
}

/// Export one item: PNG for posts, a still-loop clip for videos.
///
/// Video progress is reported as `"Generating video... N%"` whenever the whole percentage
/// changes, followed by `"Video exported successfully!"`.
#[tracing::instrument(skip(item, capture, opts, on_progress), fields(id = %item.id))]
pub fn export_one(
    item: &RenderedItem,
    capture: &mut dyn StillCapture,
    opts: &ExportOpts,
    on_progress: &mut dyn FnMut(&str),
) -> IgResult<ExportedFile> {
    let ts = opts.timestamp();
    match item.kind {
        ContentKind::Post => Ok(ExportedFile {
            filename: post_filename(&item.id, ts),
            mime: "image/png",
            bytes: export_blob(&item.canvas)
                .map_err(|e| IgError::export(&item.id, e.chain_message()))?,
            degraded: false,
        }),
        ContentKind::Video => {
            let duration = item.duration.unwrap_or(DEFAULT_DURATION_SECS);
            let mut last: Option<u32> = None;
            let mut report = |p: f64| {
                let pct = p.clamp(0.0, 100.0).floor() as u32;
                if last != Some(pct) {
                    last = Some(pct);
                    on_progress(&format!("Generating video... {pct}%"));
                }
            };
            let captured = capture_video(item, capture, &mut report);
            match captured {
                Ok(bytes) => {
                    on_progress("Video exported successfully!");
                    Ok(ExportedFile {
                        filename: reel_filename(&item.id, duration, capture.extension(), ts),
                        mime: capture.mime(),
                        bytes,
                        degraded: false,
                    })
                }
                Err(e) if opts.video_fallback == VideoFallback::StillFrame => {
                    tracing::warn!(error = %e, "video capture failed; exporting still frame");
                    Ok(ExportedFile {
                        filename: still_filename(&item.id, ts),
                        mime: "image/png",
                        bytes: export_blob(&item.canvas)
                            .map_err(|e| IgError::export(&item.id, e.chain_message()))?,
                        degraded: true,
                    })
                }
                Err(e) => Err(e),
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/exporter.rs"]
mod tests;
