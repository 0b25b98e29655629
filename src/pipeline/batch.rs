use std::time::Duration;

use crate::assets::template::Template;
use crate::content::model::{ContentDoc, ContentKind};
use crate::content::validate::validate;
use crate::content::watermark::Watermark;
use crate::foundation::error::{IgError, IgResult};
use crate::render::item::RenderedItem;
use crate::render::scene::SceneRenderer;

/// Cooperative pause inserted between items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after this many items. `0` disables pacing.
    pub every: usize,
    /// Length of the pause; zero only yields the thread.
    pub pause: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            every: 5,
            pause: Duration::from_millis(100),
        }
    }
}

impl Pacing {
    /// No pauses at all.
    pub fn none() -> Self {
        Self {
            every: 0,
            pause: Duration::ZERO,
        }
    }

    /// Whether to pause after `done` items out of `total`.
    pub(crate) fn should_pause(&self, done: usize, total: usize) -> bool {
        self.every > 0 && done < total && done.is_multiple_of(self.every)
    }

    fn pause_now(&self) {
        if self.pause.is_zero() {
            std::thread::yield_now();
        } else {
            std::thread::sleep(self.pause);
        }
    }
}

/// Per-call generation inputs.
#[derive(Clone, Debug, Default)]
pub struct BatchOpts {
    /// Background for post items.
    pub post_template: Option<Template>,
    /// Background for video items.
    pub reel_template: Option<Template>,
    pub watermark: Watermark,
    pub pacing: Pacing,
}

impl BatchOpts {
    fn template_for(&self, kind: ContentKind) -> Option<&Template> {
        match kind {
            ContentKind::Post => self.post_template.as_ref(),
            ContentKind::Video => self.reel_template.as_ref(),
        }
    }
}

/// Where a batch run currently is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Validating,
    /// Rendering item `index` (0-based) of `total`.
    Rendering { index: usize, total: usize },
    Done,
    /// The last run stopped early; `id` names the item when one was at fault.
    Failed { id: Option<String> },
}

impl BatchState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Validating | Self::Rendering { .. })
    }
}

/// Validates a document and renders its records in order, one at a time.
#[derive(Debug)]
pub struct BatchPipeline {
    renderer: SceneRenderer,
    state: BatchState,
}

impl BatchPipeline {
    pub fn new(renderer: SceneRenderer) -> Self {
        Self {
            renderer,
            state: BatchState::Idle,
        }
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    /// Render every record of `doc` in document order.
    pub fn run(&mut self, doc: &ContentDoc, opts: &BatchOpts) -> IgResult<Vec<RenderedItem>> {
        self.run_with_progress(doc, opts, &mut |_, _, _| {})
    }

    /// [`BatchPipeline::run`] with a callback invoked before each item as `(index, total, id)`.
    ///
    /// Validation failure leaves nothing rendered; the first render failure aborts the call and
    /// names the item.
    #[tracing::instrument(skip_all, fields(items = doc.len()))]
    pub fn run_with_progress(
        &mut self,
        doc: &ContentDoc,
        opts: &BatchOpts,
        on_item: &mut dyn FnMut(usize, usize, &str),
    ) -> IgResult<Vec<RenderedItem>> {
        if self.state.is_running() {
            return Err(IgError::invalid_input(
                "a generation batch is already running",
            ));
        }

        self.state = BatchState::Validating;
        if let Err(e) = validate(doc.raw()) {
            self.state = BatchState::Failed { id: None };
            return Err(e);
        }

        let total = doc.len();
        tracing::info!(total, "rendering batch");
        let mut items = Vec::with_capacity(total);
        for (index, (id, record)) in doc.records().iter().enumerate() {
            self.state = BatchState::Rendering { index, total };
            on_item(index, total, id);
            tracing::debug!(index, id = %id, kind = record.kind.as_str(), "rendering item");

            let rendered = self
                .renderer
                .render(
                    id,
                    record,
                    index,
                    opts.template_for(record.kind),
                    &opts.watermark,
                )
                .and_then(|canvas| {
                    RenderedItem::new(id.clone(), record, canvas)
                        .map_err(|e| IgError::render(id, e.chain_message()))
                });
            match rendered {
                Ok(item) => items.push(item),
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "batch aborted");
                    self.state = BatchState::Failed {
                        id: Some(id.clone()),
                    };
                    return Err(e);
                }
            }

            if opts.pacing.should_pause(index + 1, total) {
                opts.pacing.pause_now();
            }
        }

        self.state = BatchState::Done;
        tracing::info!(total, "batch complete");
        Ok(items)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/batch.rs"]
mod tests;
