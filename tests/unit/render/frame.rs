use super::*;

fn solid(width: u32, height: u32, px: [u8; 4]) -> RenderedCanvas {
    let data = px
        .iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect();
    RenderedCanvas::from_premul_rgba8(width, height, data).unwrap()
}

#[test]
fn rejects_mismatched_buffers() {
    assert!(RenderedCanvas::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(RenderedCanvas::from_premul_rgba8(0, 2, vec![]).is_err());
}

#[test]
fn png_roundtrips_pixels_and_size() {
    let canvas = solid(8, 4, [10, 20, 30, 255]);
    let png = canvas.to_png_bytes().unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (8, 4));
    assert_eq!(decoded.get_pixel(3, 2).0, [10, 20, 30, 255]);
}

#[test]
fn png_export_is_idempotent() {
    let canvas = solid(5, 5, [1, 2, 3, 255]);
    assert_eq!(canvas.to_png_bytes().unwrap(), canvas.to_png_bytes().unwrap());
}

#[test]
fn data_uri_has_png_prefix() {
    let uri = solid(2, 2, [0, 0, 0, 255]).to_data_uri().unwrap();
    assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
}

#[test]
fn straight_conversion_unpremultiplies() {
    let canvas = solid(1, 1, [64, 0, 0, 128]);
    let straight = canvas.frame().to_straight_rgba8();
    assert_eq!(straight[3], 128);
    assert!((straight[0] as i16 - 128).abs() <= 1);
}
