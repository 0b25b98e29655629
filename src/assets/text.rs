use crate::assets::fonts::LoadedFont;
use crate::foundation::error::{IgError, IgResult};

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Shaped, line-broken text ready for drawing.
pub struct TextBlock {
    pub(crate) layout: parley::Layout<TextBrushRgba8>,
    /// Width of the box lines are centered in.
    pub(crate) box_width: f32,
}

impl TextBlock {
    /// Box width used for centering.
    pub fn width(&self) -> f32 {
        self.box_width
    }

    /// Total height of all lines.
    pub fn height(&self) -> f32 {
        self.layout.height()
    }

    pub fn line_count(&self) -> usize {
        self.layout.len()
    }

    /// Horizontal offset per line that centers its visible glyphs inside the box.
    pub(crate) fn centered_line_offsets(&self) -> Vec<f32> {
        self.layout
            .lines()
            .map(|line| {
                let m = line.metrics();
                let visible = (m.advance - m.trailing_whitespace).max(0.0);
                ((self.box_width - visible) * 0.5).max(0.0)
            })
            .collect()
    }
}

/// Stateful helper for building Parley layouts with one registered font.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
}

impl TextLayoutEngine {
    /// Register `font` and prepare fresh Parley contexts.
    pub fn new(font: &LoadedFont) -> IgResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes().to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            IgError::invalid_input("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| IgError::invalid_input("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape bold text, wrapping at `max_width_px` when given.
    ///
    /// Without a wrap width the box is as wide as the longest line.
    pub fn layout_bold(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: Option<f32>,
    ) -> IgResult<TextBlock> {
        self.layout(text, size_px, brush, max_width_px, true)
    }

    /// Shape regular-weight text on a single line per paragraph.
    pub fn layout_regular(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> IgResult<TextBlock> {
        self.layout(text, size_px, brush, None, false)
    }

    fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: Option<f32>,
        bold: bool,
    ) -> IgResult<TextBlock> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(IgError::invalid_input(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        if bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(max_width_px);
        layout.align(
            max_width_px,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        let box_width = max_width_px.unwrap_or_else(|| layout.width());
        Ok(TextBlock { layout, box_width })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
