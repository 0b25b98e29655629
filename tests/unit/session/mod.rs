use super::*;
use crate::encode::capture::CaptureSpec;
use crate::pipeline::batch::Pacing;
use crate::render::frame::FrameRGBA;

struct StubCapture;

impl StillCapture for StubCapture {
    fn capture_still(
        &mut self,
        _frame: &FrameRGBA,
        spec: &CaptureSpec,
        progress: &mut dyn FnMut(f64),
    ) -> IgResult<Vec<u8>> {
        progress(100.0);
        Ok(vec![0u8; spec.duration_secs as usize])
    }
}

fn session() -> Option<Session> {
    let renderer = SceneRenderer::from_source(&FontSource::from_env_or_system()).ok()?;
    Some(Session::with_parts(renderer, Box::new(StubCapture)))
}

fn opts() -> BatchOpts {
    BatchOpts {
        pacing: Pacing::none(),
        ..BatchOpts::default()
    }
}

const DOC: &str = r#"{
    "p": {"content": "Post", "caption": "c1", "type": "post"},
    "v": {"content": "Reel", "caption": "c2", "type": "video", "duration": 6}
}"#;

#[test]
fn generate_then_lookup_and_export() {
    let Some(mut s) = session() else {
        return;
    };
    let items = s
        .generate(ContentDoc::from_json_str(DOC).unwrap(), &opts())
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(s.item("v").unwrap().duration, Some(6));

    let export_opts = ExportOpts {
        timestamp_ms: Some(7),
        ..ExportOpts::default()
    };
    let video = s.export_item("v", &export_opts, &mut |_| {}).unwrap();
    assert_eq!(video.filename, "v_reel_6s_7.webm");
    assert_eq!(video.bytes.len(), 6);

    let again = s.export_item("p", &export_opts, &mut |_| {}).unwrap();
    let twice = s.export_item("p", &export_opts, &mut |_| {}).unwrap();
    assert_eq!(again, twice);

    assert!(s.export_item("missing", &export_opts, &mut |_| {}).is_err());
}

#[test]
fn remove_and_reset_dispose_items() {
    let Some(mut s) = session() else {
        return;
    };
    s.generate(ContentDoc::from_json_str(DOC).unwrap(), &opts())
        .unwrap();

    assert!(s.remove("p"));
    assert!(!s.remove("p"));
    assert_eq!(s.items().len(), 1);

    let archive = s.export_all(&ArchiveOpts::default(), &mut |_| {}).unwrap();
    assert_eq!(archive.manifest.len(), 1);

    s.reset();
    assert!(s.items().is_empty());
    assert!(s.document().is_none());
    assert!(s.export_all(&ArchiveOpts::default(), &mut |_| {}).is_err());
}

#[test]
fn failed_generation_keeps_previous_results() {
    let Some(mut s) = session() else {
        return;
    };
    s.generate(ContentDoc::from_json_str(DOC).unwrap(), &opts())
        .unwrap();

    let mut bad = opts();
    let img = image::RgbaImage::from_pixel(64, 64, image::Rgba([1, 2, 3, 255]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    let mut bytes = bytes.into_inner();
    bytes.truncate(bytes.len() / 2);
    let Ok(t) = crate::assets::template::Template::from_bytes(
        crate::assets::template::TemplateSlot::Post,
        bytes,
    ) else {
        return;
    };
    bad.post_template = Some(t);

    assert!(
        s.generate(ContentDoc::from_json_str(DOC).unwrap(), &bad)
            .is_err()
    );
    assert_eq!(s.items().len(), 2);
    assert!(!s.state().is_running());
}
