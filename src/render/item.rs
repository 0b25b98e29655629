use serde::Serialize;

use crate::content::model::{ContentKind, ContentRecord};
use crate::foundation::error::IgResult;
use crate::render::frame::RenderedCanvas;

/// One generated piece of content, ready for preview and export.
#[derive(Clone, Debug, Serialize)]
pub struct RenderedItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub content: String,
    pub caption: String,
    /// Resolved clip length; `Some` only for videos.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip)]
    pub canvas: RenderedCanvas,
    /// `data:image/png;base64,...` snapshot of the canvas.
    #[serde(skip)]
    pub preview: String,
}

impl RenderedItem {
    /// Bundle a record with its canvas and materialize the preview.
    pub fn new(
        id: impl Into<String>,
        record: &ContentRecord,
        canvas: RenderedCanvas,
    ) -> IgResult<Self> {
        let preview = canvas.to_data_uri()?;
        Ok(Self {
            id: id.into(),
            kind: record.kind,
            content: record.content.clone(),
            caption: record.caption.clone(),
            duration: record.resolved_duration(),
            canvas,
            preview,
        })
    }

    pub fn is_video(&self) -> bool {
        self.kind == ContentKind::Video
    }
}
