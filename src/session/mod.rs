//! Interactive session: keeps the last document and its rendered items for preview and export.

use crate::archive::builder::{Archive, ArchiveOpts, build_archive};
use crate::assets::fonts::FontSource;
use crate::content::model::ContentDoc;
use crate::encode::capture::{FfmpegCapture, StillCapture};
use crate::export::exporter::{ExportOpts, ExportedFile, export_one};
use crate::foundation::error::{IgError, IgResult};
use crate::pipeline::batch::{BatchOpts, BatchPipeline, BatchState};
use crate::render::item::RenderedItem;
use crate::render::scene::SceneRenderer;

/// Generated items live here until [`Session::reset`] or [`Session::remove`].
pub struct Session {
    pipeline: BatchPipeline,
    capture: Box<dyn StillCapture>,
    doc: Option<ContentDoc>,
    items: Vec<RenderedItem>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", self.pipeline.state())
            .field("items", &self.items.len())
            .finish()
    }
}

impl Session {
    /// Session rendering with `font` and capturing video through `ffmpeg`.
    pub fn new(font: &FontSource) -> IgResult<Self> {
        Ok(Self::with_parts(
            SceneRenderer::from_source(font)?,
            Box::new(FfmpegCapture::default()),
        ))
    }

    pub fn with_parts(renderer: SceneRenderer, capture: Box<dyn StillCapture>) -> Self {
        Self {
            pipeline: BatchPipeline::new(renderer),
            capture,
            doc: None,
            items: Vec::new(),
        }
    }

    pub fn state(&self) -> &BatchState {
        self.pipeline.state()
    }

    /// Render `doc`, replacing any previous results.
    ///
    /// On failure the previous results are kept.
    pub fn generate(&mut self, doc: ContentDoc, opts: &BatchOpts) -> IgResult<&[RenderedItem]> {
        self.generate_with_progress(doc, opts, &mut |_, _, _| {})
    }

    pub fn generate_with_progress(
        &mut self,
        doc: ContentDoc,
        opts: &BatchOpts,
        on_item: &mut dyn FnMut(usize, usize, &str),
    ) -> IgResult<&[RenderedItem]> {
        let items = self.pipeline.run_with_progress(&doc, opts, on_item)?;
        self.doc = Some(doc);
        self.items = items;
        Ok(&self.items)
    }

    pub fn items(&self) -> &[RenderedItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&RenderedItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// The last successfully generated document.
    pub fn document(&self) -> Option<&ContentDoc> {
        self.doc.as_ref()
    }

    /// Drop one item and its canvas. Returns whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        before != self.items.len()
    }

    /// Drop everything generated so far.
    pub fn reset(&mut self) {
        self.items.clear();
        self.doc = None;
    }

    pub fn export_item(
        &mut self,
        id: &str,
        opts: &ExportOpts,
        on_progress: &mut dyn FnMut(&str),
    ) -> IgResult<ExportedFile> {
        let item = self
            .items
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| IgError::invalid_input(format!("no generated item '{id}'")))?;
        export_one(item, self.capture.as_mut(), opts, on_progress)
    }

    /// Archive every remaining item together with the original input.
    pub fn export_all(
        &mut self,
        opts: &ArchiveOpts,
        on_progress: &mut dyn FnMut(&str),
    ) -> IgResult<Archive> {
        let doc = self
            .doc
            .as_ref()
            .ok_or_else(|| IgError::invalid_input("nothing generated yet"))?;
        if self.items.is_empty() {
            return Err(IgError::invalid_input("no items left to export"));
        }
        build_archive(
            &self.items,
            doc.raw(),
            self.capture.as_mut(),
            opts,
            on_progress,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/mod.rs"]
mod tests;
