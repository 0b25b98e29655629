use std::io::{Cursor, Write as _};

use crate::archive::manifest::{Manifest, ManifestEntry, readme_text, video_info_text};
use crate::content::model::DEFAULT_DURATION_SECS;
use crate::encode::capture::StillCapture;
use crate::export::exporter::{capture_video, export_blob};
use crate::export::naming::{
    archive_filename, archive_info_entry, archive_post_entry, archive_reel_entry,
    archive_still_entry, now_millis,
};
use crate::foundation::error::{IgError, IgResult};
use crate::render::item::RenderedItem;

/// Options for [`build_archive`].
#[derive(Clone, Debug, Default)]
pub struct ArchiveOpts {
    /// Fixed filename timestamp (ms since epoch); the current time when `None`.
    pub timestamp_ms: Option<i64>,
    /// Fixed README "Generated on" text; the current local time when `None`.
    pub generated_on: Option<String>,
}

/// A finished zip archive.
#[derive(Clone, Debug)]
pub struct Archive {
    /// `instagram_content_<ts>.zip`
    pub filename: String,
    pub bytes: Vec<u8>,
    /// The manifest written as `metadata.json`.
    pub manifest: Manifest,
}

impl Archive {
    /// Items archived as a still because video capture failed.
    pub fn degraded_ids(&self) -> Vec<&str> {
        self.manifest
            .entries()
            .iter()
            .filter(|(_, e)| e.degraded)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

struct ZipOut {
    zip: zip::ZipWriter<Cursor<Vec<u8>>>,
    opts: zip::write::SimpleFileOptions,
}

impl ZipOut {
    fn new() -> Self {
        Self {
            zip: zip::ZipWriter::new(Cursor::new(Vec::new())),
            opts: zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated),
        }
    }

    fn dir(&mut self, name: &str) -> IgResult<()> {
        self.zip
            .add_directory(name, self.opts)
            .map_err(|e| IgError::archive(format!("add directory '{name}': {e}")))
    }

    fn file(&mut self, name: &str, bytes: &[u8]) -> IgResult<()> {
        self.zip
            .start_file(name, self.opts)
            .map_err(|e| IgError::archive(format!("start entry '{name}': {e}")))?;
        self.zip
            .write_all(bytes)
            .map_err(|e| IgError::archive(format!("write entry '{name}': {e}")))
    }

    fn finish(self) -> IgResult<Vec<u8>> {
        let cursor = self
            .zip
            .finish()
            .map_err(|e| IgError::archive(format!("finalize zip: {e}")))?;
        Ok(cursor.into_inner())
    }
}

/// Package every item, a manifest, a README and the original input into one zip.
///
/// Posts go to `posts/`, videos to `videos/` with an info note. A video whose capture fails is
/// archived as a PNG still and flagged degraded; the rest of the archive is unaffected. Any
/// packaging failure discards the partial archive.
#[tracing::instrument(skip_all, fields(items = items.len()))]
pub fn build_archive(
    items: &[RenderedItem],
    original: &serde_json::Value,
    capture: &mut dyn StillCapture,
    opts: &ArchiveOpts,
    on_progress: &mut dyn FnMut(&str),
) -> IgResult<Archive> {
    let ts = opts.timestamp_ms.unwrap_or_else(now_millis);
    let total = items.len();
    tracing::info!(total, "building archive");

    let mut out = ZipOut::new();
    out.dir("posts/")?;
    out.dir("videos/")?;
    let mut manifest = Manifest::new();

    for (i, item) in items.iter().enumerate() {
        on_progress(&format!("Processing {}/{}...", i + 1, total));

        if !item.is_video() {
            let name = archive_post_entry(&item.id);
            let png = export_blob(&item.canvas).map_err(|e| {
                IgError::archive(format!("encode '{}': {}", item.id, e.chain_message()))
            })?;
            out.file(&name, &png)?;
            manifest.insert(&item.id, ManifestEntry::post(item, strip_folder(&name)));
            continue;
        }

        let duration = item.duration.unwrap_or(DEFAULT_DURATION_SECS);
        match capture_video(item, capture, &mut |_| {}) {
            Ok(clip) => {
                let name = archive_reel_entry(&item.id, duration, capture.extension());
                let short = strip_folder(&name);
                out.file(&name, &clip)?;
                out.file(
                    &archive_info_entry(&item.id),
                    video_info_text(item, short, duration).as_bytes(),
                )?;
                manifest.insert(&item.id, ManifestEntry::video(item, short, duration));
            }
            Err(e) => {
                tracing::warn!(id = %item.id, error = %e, "video capture failed; archiving still frame");
                let name = archive_still_entry(&item.id);
                let png = export_blob(&item.canvas).map_err(|e| {
                    IgError::archive(format!("encode '{}': {}", item.id, e.chain_message()))
                })?;
                out.file(&name, &png)?;
                manifest.insert(
                    &item.id,
                    ManifestEntry::degraded_video(item, strip_folder(&name)),
                );
            }
        }
    }

    let generated_on = opts
        .generated_on
        .clone()
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
    out.file("README.txt", readme_text(total, &generated_on).as_bytes())?;
    out.file("metadata.json", manifest.to_json_pretty()?.as_bytes())?;
    let original = serde_json::to_string_pretty(original)
        .map_err(|e| IgError::serde(format!("original data: {e}")))?;
    out.file("original_data.json", original.as_bytes())?;

    on_progress("Creating ZIP file...");
    let bytes = out.finish()?;
    on_progress("Export complete!");

    tracing::info!(
        bytes = bytes.len(),
        degraded = manifest.degraded_count(),
        "archive complete"
    );
    Ok(Archive {
        filename: archive_filename(ts),
        bytes,
        manifest,
    })
}

/// Entry path without its leading `posts/` or `videos/` folder.
fn strip_folder(entry: &str) -> &str {
    entry.split_once('/').map_or(entry, |(_, f)| f)
}

#[cfg(test)]
#[path = "../../tests/unit/archive/builder.rs"]
mod tests;
