use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::assets::decode::{PreparedImage, decode_image, probe_dimensions};
use crate::content::model::ContentKind;
use crate::foundation::core::Canvas;
use crate::foundation::error::{IgError, IgResult};

/// Largest accepted template file.
pub const MAX_TEMPLATE_BYTES: usize = 10 * 1024 * 1024;
/// Allowed relative deviation from the slot's aspect ratio.
pub const ASPECT_TOLERANCE: f64 = 0.05;

/// Which kind of canvas a template backs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateSlot {
    /// Square post background, 1:1.
    Post,
    /// Reel background, 9:16.
    Reel,
}

impl TemplateSlot {
    pub fn canvas(self) -> Canvas {
        match self {
            Self::Post => Canvas::POST,
            Self::Reel => Canvas::REEL,
        }
    }

    pub fn for_kind(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Post => Self::Post,
            ContentKind::Video => Self::Reel,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Post => "post template (1:1)",
            Self::Reel => "reel template (9:16)",
        }
    }
}

/// Caller-supplied background image.
///
/// Size and aspect ratio are checked up front from the image header; the pixel data is only
/// decoded when an item is rendered, so a corrupt body surfaces as that item's render error.
#[derive(Clone)]
pub struct Template {
    slot: TemplateSlot,
    width: u32,
    height: u32,
    bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("slot", &self.slot)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl Template {
    /// Accept encoded image bytes for `slot`.
    pub fn from_bytes(slot: TemplateSlot, bytes: Vec<u8>) -> IgResult<Self> {
        if bytes.len() > MAX_TEMPLATE_BYTES {
            return Err(IgError::invalid_input(format!(
                "{} is too large ({} bytes, maximum 10MB)",
                slot.label(),
                bytes.len()
            )));
        }
        let (width, height) = probe_dimensions(&bytes).map_err(|e| {
            IgError::invalid_input(format!("{} is not a readable image: {}", slot.label(), e.chain_message()))
        })?;
        check_aspect(slot, width, height)?;

        Ok(Self {
            slot,
            width,
            height,
            bytes: Arc::new(bytes),
        })
    }

    /// Read a template image file from disk.
    pub fn from_path(slot: TemplateSlot, path: impl AsRef<Path>) -> IgResult<Self> {
        let path = path.as_ref();
        let len = std::fs::metadata(path)
            .with_context(|| format!("stat template '{}'", path.display()))?
            .len();
        if len > MAX_TEMPLATE_BYTES as u64 {
            return Err(IgError::invalid_input(format!(
                "{} '{}' is too large ({len} bytes, maximum 10MB)",
                slot.label(),
                path.display()
            )));
        }
        let bytes =
            std::fs::read(path).with_context(|| format!("read template '{}'", path.display()))?;
        Self::from_bytes(slot, bytes)
    }

    pub fn slot(&self) -> TemplateSlot {
        self.slot
    }

    /// Intrinsic `(width, height)` from the image header.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Fully decode the image.
    pub fn decode(&self) -> IgResult<PreparedImage> {
        decode_image(&self.bytes)
    }
}

fn check_aspect(slot: TemplateSlot, width: u32, height: u32) -> IgResult<()> {
    if width == 0 || height == 0 {
        return Err(IgError::invalid_input(format!(
            "{} has zero size",
            slot.label()
        )));
    }
    let want = slot.canvas().aspect_ratio();
    let got = f64::from(width) / f64::from(height);
    if ((got / want) - 1.0).abs() > ASPECT_TOLERANCE {
        return Err(IgError::invalid_input(format!(
            "{} has aspect ratio {width}x{height} ({got:.3}), expected {want:.3} within 5%",
            slot.label()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/template.rs"]
mod tests;
