use std::sync::Arc;

use kurbo::Shape as _;

use crate::assets::fonts::{FontSource, LoadedFont};
use crate::assets::template::Template;
use crate::assets::text::{TextBlock, TextBrushRgba8, TextLayoutEngine};
use crate::content::model::{ContentKind, ContentRecord};
use crate::content::watermark::Watermark;
use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8};
use crate::foundation::error::{IgError, IgResult};
use crate::render::blur::{blur_rgba8_premul, shadow_kernel_params};
use crate::render::frame::{FrameRGBA, RenderedCanvas};
use crate::render::scheme::{ColorScheme, scheme_for_slot};

/// Soft drop shadow behind the content text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextShadow {
    pub color: Rgba8,
    /// Canvas-style blur amount (twice the Gaussian sigma).
    pub blur: f32,
    pub offset_y: f32,
}

impl TextShadow {
    /// Shadow used for `kind`, stronger over a template than over a gradient.
    pub fn for_kind(kind: ContentKind, templated: bool) -> Self {
        let (alpha, blur, offset_y) = match (templated, kind) {
            (true, _) => (0.5, 20.0, 5.0),
            (false, ContentKind::Post) => (0.3, 10.0, 4.0),
            (false, ContentKind::Video) => (0.4, 15.0, 5.0),
        };
        Self {
            color: Rgba8::BLACK.with_opacity(alpha),
            blur,
            offset_y,
        }
    }
}

/// Per-kind geometry for text placement.
#[derive(Clone, Copy, Debug)]
struct KindMetrics {
    canvas: Canvas,
    font_px: f32,
    wrap_frac: f32,
    watermark_px: f32,
    watermark_inset: f32,
}

impl KindMetrics {
    fn for_kind(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Post => Self {
                canvas: Canvas::POST,
                font_px: 60.0,
                wrap_frac: 0.8,
                watermark_px: 20.0,
                watermark_inset: 50.0,
            },
            ContentKind::Video => Self {
                canvas: Canvas::REEL,
                font_px: 70.0,
                wrap_frac: 0.85,
                watermark_px: 24.0,
                watermark_inset: 80.0,
            },
        }
    }
}

const WATERMARK_OPACITY: f32 = 0.6;

/// CPU renderer that turns one content record into a finished canvas.
///
/// Owns the shaping contexts and the font, so one renderer is reused across a batch. Output is a
/// pure function of the record, slot, template and watermark.
pub struct SceneRenderer {
    text: TextLayoutEngine,
    font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for SceneRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneRenderer")
            .field("family", &self.text.family_name())
            .finish()
    }
}

impl SceneRenderer {
    pub fn new(font: &LoadedFont) -> IgResult<Self> {
        let text = TextLayoutEngine::new(font)?;
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.bytes().to_vec()),
            font.index(),
        );
        Ok(Self { text, font })
    }

    pub fn from_source(source: &FontSource) -> IgResult<Self> {
        Self::new(&source.load()?)
    }

    /// Render `record` (keyed `id`) at batch position `slot`.
    ///
    /// Any failure is reported as a render error naming `id`.
    #[tracing::instrument(skip(self, record, template, watermark), fields(kind = record.kind.as_str()))]
    pub fn render(
        &mut self,
        id: &str,
        record: &ContentRecord,
        slot: usize,
        template: Option<&Template>,
        watermark: &Watermark,
    ) -> IgResult<RenderedCanvas> {
        self.render_frame(record, slot, template, watermark)
            .map(RenderedCanvas::from_frame)
            .map_err(|e| match e {
                IgError::Render { .. } => e,
                other => IgError::render(id, other.chain_message()),
            })
    }

    fn render_frame(
        &mut self,
        record: &ContentRecord,
        slot: usize,
        template: Option<&Template>,
        watermark: &Watermark,
    ) -> IgResult<FrameRGBA> {
        let kind = record.kind;
        let metrics = KindMetrics::for_kind(kind);
        let scheme = scheme_for_slot(slot);
        let (w16, h16) = canvas_u16(metrics.canvas)?;
        let (w, h) = (f64::from(metrics.canvas.width), f64::from(metrics.canvas.height));

        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let base = match kind {
            ContentKind::Post => Rgba8::WHITE,
            ContentKind::Video => Rgba8::BLACK,
        };
        fill_rect(&mut ctx, Rect::new(0.0, 0.0, w, h), base);

        if let Some(t) = template {
            draw_template(&mut ctx, t, metrics.canvas)?;
        } else {
            draw_gradient(&mut ctx, kind, &scheme, metrics.canvas)?;
            match kind {
                ContentKind::Post => draw_post_decorations(&mut ctx, &scheme, w, h),
                ContentKind::Video => {
                    draw_reel_decorations(&mut ctx, &scheme, w, h);
                    draw_play_button(&mut ctx, &scheme, w, h);
                }
            }
        }

        let block = self.text.layout_bold(
            &record.content,
            metrics.font_px,
            brush(scheme.text),
            Some(w as f32 * metrics.wrap_frac),
        )?;
        let origin = Point::new(
            (w - f64::from(block.width())) * 0.5,
            (h - f64::from(block.height())) * 0.5,
        );
        let shadow = TextShadow::for_kind(kind, template.is_some());
        self.draw_text_shadow(&mut ctx, &block, origin, shadow)?;
        draw_text_block(&mut ctx, &self.font, &block, origin, None);

        let mark = self.text.layout_regular(
            watermark.as_str(),
            metrics.watermark_px,
            brush(scheme.text.with_opacity(WATERMARK_OPACITY)),
        )?;
        let mark_origin = Point::new(
            (w - f64::from(mark.width())) * 0.5,
            h - f64::from(metrics.watermark_inset) - f64::from(mark.height()) * 0.5,
        );
        draw_text_block(&mut ctx, &self.font, &mark, mark_origin, None);

        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: metrics.canvas.width,
            height: metrics.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    /// Rasterize the block in the shadow color into a padded side buffer, blur it and blit it
    /// under the text.
    fn draw_text_shadow(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        block: &TextBlock,
        origin: Point,
        shadow: TextShadow,
    ) -> IgResult<()> {
        let (radius, _) = shadow_kernel_params(shadow.blur);
        let pad = f64::from(radius) + 1.0;
        let sw = (f64::from(block.width()) + 2.0 * pad).ceil().max(1.0);
        let sh = (f64::from(block.height()) + 2.0 * pad).ceil().max(1.0);
        let (sw16, sh16) = canvas_u16(Canvas {
            width: sw as u32,
            height: sh as u32,
        })?;

        let mut side = vello_cpu::RenderContext::new(sw16, sh16);
        side.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        draw_text_block(
            &mut side,
            &self.font,
            block,
            Point::new(pad, pad),
            Some(shadow.color),
        );
        let mut pm = vello_cpu::Pixmap::new(sw16, sh16);
        side.flush();
        side.render_to_pixmap(&mut pm);

        let mut bytes = pm.data_as_u8_slice().to_vec();
        blur_rgba8_premul(&mut bytes, u32::from(sw16), u32::from(sh16), shadow.blur)?;
        let img = image_paint_from_premul(&bytes, u32::from(sw16), u32::from(sh16))?;

        ctx.set_transform(affine_to_cpu(Affine::translate((
            origin.x - pad,
            origin.y - pad + f64::from(shadow.offset_y),
        ))));
        ctx.set_paint(img);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(sw16),
            f64::from(sh16),
        ));
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

fn canvas_u16(c: Canvas) -> IgResult<(u16, u16)> {
    let w: u16 = c
        .width
        .try_into()
        .map_err(|_| IgError::invalid_input("canvas width exceeds u16"))?;
    let h: u16 = c
        .height
        .try_into()
        .map_err(|_| IgError::invalid_input("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn brush(c: Rgba8) -> TextBrushRgba8 {
    TextBrushRgba8 {
        r: c.r,
        g: c.g,
        b: c.b,
        a: c.a,
    }
}

fn color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, r: Rect, c: Rgba8) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color(c));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1));
}

fn fill_path(ctx: &mut vello_cpu::RenderContext, path: &BezPath, c: Rgba8) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color(c));
    ctx.fill_path(&bezpath_to_cpu(path));
}

fn stroke_path(ctx: &mut vello_cpu::RenderContext, path: &BezPath, width: f64, c: Rgba8) {
    let outline = kurbo::stroke(
        path.iter(),
        &kurbo::Stroke::new(width),
        &kurbo::StrokeOpts::default(),
        0.1,
    );
    fill_path(ctx, &outline, c);
}

fn circle(cx: f64, cy: f64, r: f64) -> BezPath {
    kurbo::Circle::new((cx, cy), r).to_path(0.1)
}

fn draw_template(
    ctx: &mut vello_cpu::RenderContext,
    template: &Template,
    canvas: Canvas,
) -> IgResult<()> {
    let img = template.decode()?;
    let paint = image_paint_from_premul(&img.rgba8_premul, img.width, img.height)?;
    let sx = f64::from(canvas.width) / f64::from(img.width);
    let sy = f64::from(canvas.height) / f64::from(img.height);

    ctx.set_transform(affine_to_cpu(Affine::scale_non_uniform(sx, sy)));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(img.width),
        f64::from(img.height),
    ));
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    Ok(())
}

/// Linear gradient from `bg` to `accent`: corner to corner for posts, top to bottom for reels.
fn draw_gradient(
    ctx: &mut vello_cpu::RenderContext,
    kind: ContentKind,
    scheme: &ColorScheme,
    canvas: Canvas,
) -> IgResult<()> {
    let bytes = gradient_rgba8_premul(kind, scheme.bg, scheme.accent, canvas);
    let paint = image_paint_from_premul(&bytes, canvas.width, canvas.height)?;
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(canvas.width),
        f64::from(canvas.height),
    ));
    Ok(())
}

pub(crate) fn gradient_rgba8_premul(
    kind: ContentKind,
    start: Rgba8,
    end: Rgba8,
    canvas: Canvas,
) -> Vec<u8> {
    let (w, h) = (canvas.width, canvas.height);
    let (dx, dy) = match kind {
        ContentKind::Post => (f64::from(w), f64::from(h)),
        ContentKind::Video => (0.0, f64::from(h)),
    };
    let len2 = dx * dx + dy * dy;
    let start = start.premul();
    let end = end.premul();

    let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
    for y in 0..h {
        for x in 0..w {
            let px = f64::from(x) + 0.5;
            let py = f64::from(y) + 0.5;
            let t = if len2 <= 0.0 {
                0.0
            } else {
                ((px * dx + py * dy) / len2).clamp(0.0, 1.0)
            };
            let lerp = |a: u8, b: u8| -> u8 {
                let af = f64::from(a);
                let bf = f64::from(b);
                (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
            };
            let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
            bytes[idx..idx + 4].copy_from_slice(&[
                lerp(start.r, end.r),
                lerp(start.g, end.g),
                lerp(start.b, end.b),
                lerp(start.a, end.a),
            ]);
        }
    }
    bytes
}

fn draw_post_decorations(ctx: &mut vello_cpu::RenderContext, scheme: &ColorScheme, w: f64, h: f64) {
    stroke_path(
        ctx,
        &circle(180.0, 180.0, 80.0),
        3.0,
        scheme.text.with_opacity(0.3),
    );
    fill_path(
        ctx,
        &circle(w - 80.0, h - 80.0, 100.0),
        scheme.text.with_opacity(0.1),
    );
}

fn draw_reel_decorations(ctx: &mut vello_cpu::RenderContext, scheme: &ColorScheme, w: f64, h: f64) {
    let bar = scheme.text.with_opacity(0.3);
    fill_rect(ctx, Rect::new(0.0, 0.0, 200.0, 10.0), bar);
    fill_rect(ctx, Rect::new(w - 200.0, h - 10.0, w, h), bar);
}

fn draw_play_button(ctx: &mut vello_cpu::RenderContext, scheme: &ColorScheme, w: f64, h: f64) {
    let (cx, cy) = (w * 0.5, h - 200.0);
    let ring = circle(cx, cy, 50.0);
    fill_path(ctx, &ring, Rgba8::WHITE.with_opacity(0.2));
    stroke_path(ctx, &ring, 3.0, scheme.text);

    let tx = cx + 5.0;
    let mut tri = BezPath::new();
    tri.move_to((tx + 17.5, cy));
    tri.line_to((tx - 17.5, cy - 15.0));
    tri.line_to((tx - 17.5, cy + 15.0));
    tri.close_path();
    fill_path(ctx, &tri, scheme.text);
}

/// Draw `block` with its top-left at `origin`, each line centered in the block's box.
///
/// `override_color` replaces the brush color, used for shadows.
fn draw_text_block(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    block: &TextBlock,
    origin: Point,
    override_color: Option<Rgba8>,
) {
    let offsets = block.centered_line_offsets();
    for (line, dx) in block.layout.lines().zip(offsets) {
        ctx.set_transform(affine_to_cpu(Affine::translate((
            origin.x + f64::from(dx),
            origin.y,
        ))));
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let c = override_color.unwrap_or_else(|| {
                let b = run.style().brush;
                Rgba8 {
                    r: b.r,
                    g: b.g,
                    b: b.b,
                    a: b.a,
                }
            });
            ctx.set_paint(color(c));
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_paint_from_premul(bytes: &[u8], width: u32, height: u32) -> IgResult<vello_cpu::Image> {
    let (w, h) = canvas_u16(Canvas { width, height })?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(IgError::invalid_input("pixmap byte len mismatch"));
    }
    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(bytes.len() / 4);
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
