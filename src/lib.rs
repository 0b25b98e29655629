//! igcreator turns a small JSON description of social-media posts into ready-to-upload assets.
//!
//! The flow is one-way:
//!
//! - Load and validate a [`ContentDoc`]
//! - Render every record into a [`RenderedCanvas`] with a [`BatchPipeline`] (or a [`Session`])
//! - Export items one by one ([`export_one`]) or package them with [`build_archive`]
//!
//! Video export shows the rendered still for the requested duration; frame capture sits behind
//! the [`StillCapture`] trait so another encoder can replace the bundled `ffmpeg` one.
#![forbid(unsafe_code)]

mod foundation;

/// Zip packaging of a batch.
pub mod archive;
/// Image decode, fonts, templates and text layout.
pub mod assets;
pub mod content;
/// Frame sinks and still-frame capture.
pub mod encode;
pub mod export;
pub mod pipeline;
/// CPU scene rendering.
pub mod render;
pub mod session;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Fps, FrameIndex, Point, Rect, Rgba8, Rgba8Premul,
};
pub use crate::foundation::error::{IgError, IgResult};

pub use crate::archive::builder::{Archive, ArchiveOpts, build_archive};
pub use crate::archive::manifest::{Manifest, ManifestEntry};
pub use crate::assets::fonts::{FONT_ENV_VAR, FontSource, LoadedFont};
pub use crate::assets::template::{Template, TemplateSlot};
pub use crate::content::model::{ContentDoc, ContentKind, ContentRecord};
pub use crate::content::sample::{sample_document, sample_json_pretty};
pub use crate::content::validate::validate;
pub use crate::content::watermark::{DEFAULT_WATERMARK, Watermark};
pub use crate::encode::capture::{
    CaptureSpec, FfmpegCapture, StillCapture, loop_still_into_sink,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::export::exporter::{
    ExportOpts, ExportedFile, VideoFallback, export_blob, export_one,
};
pub use crate::pipeline::batch::{BatchOpts, BatchPipeline, BatchState, Pacing};
pub use crate::render::frame::{FrameRGBA, RenderedCanvas};
pub use crate::render::item::RenderedItem;
pub use crate::render::scene::SceneRenderer;
pub use crate::session::Session;
