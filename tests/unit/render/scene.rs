use super::*;
use crate::assets::template::TemplateSlot;

fn renderer() -> Option<SceneRenderer> {
    SceneRenderer::from_source(&FontSource::from_env_or_system()).ok()
}

fn record(kind: ContentKind, content: &str) -> ContentRecord {
    ContentRecord {
        content: content.to_owned(),
        caption: "Cap".to_owned(),
        kind,
        duration: None,
    }
}

fn px(canvas: &RenderedCanvas, x: u32, y: u32) -> [u8; 4] {
    let f = canvas.frame();
    let i = ((y * f.width + x) * 4) as usize;
    [f.data[i], f.data[i + 1], f.data[i + 2], f.data[i + 3]]
}

fn close(a: [u8; 4], b: [u8; 4], tol: i16) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(&x, &y)| (i16::from(x) - i16::from(y)).abs() <= tol)
}

#[test]
fn gradient_endpoints_follow_direction() {
    let c = Canvas {
        width: 10,
        height: 20,
    };
    let start = Rgba8::opaque(0, 0, 0);
    let end = Rgba8::opaque(200, 100, 0);

    let reel = gradient_rgba8_premul(ContentKind::Video, start, end, c);
    // Reel gradient is constant along each row.
    assert_eq!(&reel[0..4], &reel[36..40]);
    assert!(reel[0] < 10);
    let last = reel.len() - 4;
    assert!(reel[last] > 190);

    let post = gradient_rgba8_premul(ContentKind::Post, start, end, c);
    assert!(post[0] < post[36]);
}

#[test]
fn shadow_is_stronger_over_templates() {
    let plain = TextShadow::for_kind(ContentKind::Post, false);
    let templated = TextShadow::for_kind(ContentKind::Post, true);
    assert!(templated.color.a > plain.color.a);
    assert!(templated.blur > plain.blur);
    assert_eq!(TextShadow::for_kind(ContentKind::Video, false).offset_y, 5.0);
}

#[test]
fn post_and_reel_have_fixed_dimensions() {
    let Some(mut r) = renderer() else {
        return;
    };
    let wm = Watermark::default();

    let post = r
        .render("a", &record(ContentKind::Post, "Hi"), 0, None, &wm)
        .unwrap();
    assert_eq!((post.width(), post.height()), (1080, 1080));

    let reel = r
        .render("b", &record(ContentKind::Video, "Hi"), 0, None, &wm)
        .unwrap();
    assert_eq!((reel.width(), reel.height()), (1080, 1920));
}

#[test]
fn rendering_is_deterministic() {
    let Some(mut r) = renderer() else {
        return;
    };
    let wm = Watermark::default();
    let rec = record(ContentKind::Post, "Same text, same pixels");

    let a = r.render("a", &rec, 3, None, &wm).unwrap();
    let b = r.render("a", &rec, 3, None, &wm).unwrap();
    assert_eq!(a.frame().data, b.frame().data);
}

#[test]
fn slot_selects_scheme_modulo_eight() {
    let Some(mut r) = renderer() else {
        return;
    };
    let wm = Watermark::default();
    let rec = record(ContentKind::Post, "Hi");

    let s0 = r.render("a", &rec, 0, None, &wm).unwrap();
    let s8 = r.render("a", &rec, 8, None, &wm).unwrap();
    let s1 = r.render("a", &rec, 1, None, &wm).unwrap();

    assert_eq!(s0.frame().data, s8.frame().data);
    assert_ne!(s0.frame().data, s1.frame().data);

    let bg = COLOR_SCHEMES_FIRST_BG;
    assert!(close(px(&s0, 1, 1), bg, 3), "{:?}", px(&s0, 1, 1));
}

const COLOR_SCHEMES_FIRST_BG: [u8; 4] = [0x66, 0x7e, 0xea, 255];

#[test]
fn content_text_changes_center_pixels() {
    let Some(mut r) = renderer() else {
        return;
    };
    let wm = Watermark::default();
    let a = r
        .render("a", &record(ContentKind::Post, "Hello"), 0, None, &wm)
        .unwrap();
    let b = r
        .render("a", &record(ContentKind::Post, "World"), 0, None, &wm)
        .unwrap();
    assert_ne!(a.frame().data, b.frame().data);

    // Corners only carry background and decorations.
    assert_eq!(px(&a, 1, 1), px(&b, 1, 1));
}

#[test]
fn watermark_text_is_drawn_near_bottom() {
    let Some(mut r) = renderer() else {
        return;
    };
    let rec = record(ContentKind::Video, "Hi");
    let a = r
        .render("a", &rec, 0, None, &Watermark::default())
        .unwrap();
    let b = r
        .render("a", &rec, 0, None, &Watermark::new("@other").unwrap())
        .unwrap();

    let row = |c: &RenderedCanvas, y: u32| -> Vec<u8> {
        let f = c.frame();
        let start = (y * f.width * 4) as usize;
        f.data[start..start + (f.width * 4) as usize].to_vec()
    };
    assert_ne!(row(&a, 1920 - 80), row(&b, 1920 - 80));
    assert_eq!(row(&a, 400), row(&b, 400));
}

#[test]
fn template_replaces_gradient() {
    let Some(mut r) = renderer() else {
        return;
    };
    let img = image::RgbaImage::from_pixel(50, 50, image::Rgba([255, 0, 0, 255]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    let template = Template::from_bytes(TemplateSlot::Post, bytes.into_inner()).unwrap();

    let canvas = r
        .render(
            "a",
            &record(ContentKind::Post, "Hi"),
            0,
            Some(&template),
            &Watermark::default(),
        )
        .unwrap();
    assert!(close(px(&canvas, 2, 2), [255, 0, 0, 255], 2));
    assert!(close(px(&canvas, 1077, 1077), [255, 0, 0, 255], 2));
}

#[test]
fn corrupt_template_is_a_render_error_for_the_item() {
    let Some(mut r) = renderer() else {
        return;
    };
    let img = image::RgbaImage::from_pixel(64, 64, image::Rgba([1, 2, 3, 255]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    let mut bytes = bytes.into_inner();
    bytes.truncate(bytes.len() / 2);

    let Ok(template) = Template::from_bytes(TemplateSlot::Post, bytes) else {
        return;
    };
    let err = r
        .render(
            "broken",
            &record(ContentKind::Post, "Hi"),
            0,
            Some(&template),
            &Watermark::default(),
        )
        .unwrap_err();
    assert!(matches!(err, IgError::Render { .. }));
    assert_eq!(err.item_id(), Some("broken"));
}

#[test]
fn reel_bars_are_tinted_with_text_color() {
    let Some(mut r) = renderer() else {
        return;
    };
    let wm = Watermark::default();
    let reel = r
        .render("b", &record(ContentKind::Video, "Hi"), 0, None, &wm)
        .unwrap();

    // White text scheme: bars are lighter than the gradient next to them.
    for (bar, beside) in [((100, 5), (100, 20)), ((1000, 1915), (1000, 1900))] {
        let b = px(&reel, bar.0, bar.1);
        let g = px(&reel, beside.0, beside.1);
        assert!(b[..3].iter().zip(&g[..3]).all(|(b, g)| b > g), "{b:?} vs {g:?}");
    }

    // Dark text scheme: bars darken the pale gradient instead.
    let dark = r
        .render("d", &record(ContentKind::Video, "Hi"), 6, None, &wm)
        .unwrap();
    let b = px(&dark, 100, 5);
    let g = px(&dark, 100, 20);
    assert!(b[..3].iter().zip(&g[..3]).all(|(b, g)| b < g), "{b:?} vs {g:?}");
}
