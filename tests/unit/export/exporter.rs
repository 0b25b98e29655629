use super::*;
use crate::content::model::ContentRecord;
use crate::render::frame::FrameRGBA;

struct FakeCapture {
    fail: bool,
    seen_secs: Vec<u32>,
}

impl FakeCapture {
    fn new(fail: bool) -> Self {
        Self {
            fail,
            seen_secs: Vec::new(),
        }
    }
}

impl StillCapture for FakeCapture {
    fn capture_still(
        &mut self,
        _frame: &FrameRGBA,
        spec: &CaptureSpec,
        progress: &mut dyn FnMut(f64),
    ) -> IgResult<Vec<u8>> {
        self.seen_secs.push(spec.duration_secs);
        if self.fail {
            return Err(anyhow::anyhow!("encoder exploded").into());
        }
        for p in [0.0, 33.3, 33.9, 66.6, 100.0] {
            progress(p);
        }
        Ok(b"fake-webm".to_vec())
    }
}

fn item(id: &str, kind: ContentKind, duration: Option<u32>) -> RenderedItem {
    let canvas = RenderedCanvas::from_premul_rgba8(4, 4, vec![255; 64]).unwrap();
    let record = ContentRecord {
        content: "Hello".to_owned(),
        caption: "Cap".to_owned(),
        kind,
        duration,
    };
    RenderedItem::new(id, &record, canvas).unwrap()
}

fn fixed_ts() -> ExportOpts {
    ExportOpts {
        timestamp_ms: Some(1_700_000_000_000),
        ..ExportOpts::default()
    }
}

#[test]
fn post_exports_png_with_timestamped_name() {
    let out = export_one(
        &item("a", ContentKind::Post, None),
        &mut FakeCapture::new(true),
        &fixed_ts(),
        &mut |_| {},
    )
    .unwrap();
    assert_eq!(out.filename, "a_post_1700000000000.png");
    assert_eq!(out.mime, "image/png");
    assert!(!out.degraded);
    assert_eq!(image::load_from_memory(&out.bytes).unwrap().width(), 4);
}

#[test]
fn video_uses_resolved_duration_and_reports_progress() {
    let mut capture = FakeCapture::new(false);
    let mut msgs = Vec::new();
    let out = export_one(
        &item("v", ContentKind::Video, None),
        &mut capture,
        &fixed_ts(),
        &mut |m| msgs.push(m.to_owned()),
    )
    .unwrap();

    assert_eq!(capture.seen_secs, vec![15]);
    assert_eq!(out.filename, "v_reel_15s_1700000000000.webm");
    assert_eq!(out.mime, "video/webm");
    assert_eq!(out.bytes, b"fake-webm");
    assert_eq!(
        msgs,
        vec![
            "Generating video... 0%",
            "Generating video... 33%",
            "Generating video... 66%",
            "Generating video... 100%",
            "Video exported successfully!",
        ]
    );
}

#[test]
fn failed_capture_is_an_export_error_by_default() {
    let err = export_one(
        &item("v", ContentKind::Video, Some(30)),
        &mut FakeCapture::new(true),
        &fixed_ts(),
        &mut |_| {},
    )
    .unwrap_err();
    assert!(matches!(err, IgError::Export { .. }));
    assert_eq!(err.item_id(), Some("v"));
    assert!(err.to_string().contains("encoder exploded"));
}

#[test]
fn still_fallback_returns_degraded_png() {
    let opts = ExportOpts {
        video_fallback: VideoFallback::StillFrame,
        ..fixed_ts()
    };
    let out = export_one(
        &item("v", ContentKind::Video, Some(30)),
        &mut FakeCapture::new(true),
        &opts,
        &mut |_| {},
    )
    .unwrap();
    assert!(out.degraded);
    assert_eq!(out.filename, "v_frame_1700000000000.png");
    assert_eq!(out.mime, "image/png");
}

#[test]
fn re_export_is_idempotent() {
    let it = item("a", ContentKind::Post, None);
    assert_eq!(export_blob(&it.canvas).unwrap(), export_blob(&it.canvas).unwrap());
}

struct Mp4Capture;

impl StillCapture for Mp4Capture {
    fn capture_still(
        &mut self,
        _frame: &FrameRGBA,
        _spec: &CaptureSpec,
        progress: &mut dyn FnMut(f64),
    ) -> IgResult<Vec<u8>> {
        progress(100.0);
        Ok(b"fake-mp4".to_vec())
    }

    fn mime(&self) -> &'static str {
        "video/mp4"
    }

    fn extension(&self) -> &'static str {
        "mp4"
    }
}

#[test]
fn video_name_follows_capture_extension() {
    let out = export_one(
        &item("v", ContentKind::Video, Some(20)),
        &mut Mp4Capture,
        &fixed_ts(),
        &mut |_| {},
    )
    .unwrap();
    assert_eq!(out.filename, "v_reel_20s_1700000000000.mp4");
    assert_eq!(out.mime, "video/mp4");
}

#[test]
fn failed_capture_emits_no_success_message() {
    let mut msgs = Vec::new();
    let _ = export_one(
        &item("v", ContentKind::Video, Some(30)),
        &mut FakeCapture::new(true),
        &fixed_ts(),
        &mut |m| msgs.push(m.to_owned()),
    );
    assert!(!msgs.iter().any(|m| m == "Video exported successfully!"));
}
