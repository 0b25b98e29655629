use std::collections::BTreeSet;
use std::io::Read as _;

use super::*;
use crate::content::model::{ContentKind, ContentRecord};
use crate::encode::capture::CaptureSpec;
use crate::render::frame::{FrameRGBA, RenderedCanvas};

/// Capture that fails on the listed call numbers (1-based).
struct ScriptedCapture {
    fail_on: Vec<usize>,
    calls: usize,
}

impl StillCapture for ScriptedCapture {
    fn capture_still(
        &mut self,
        _frame: &FrameRGBA,
        spec: &CaptureSpec,
        progress: &mut dyn FnMut(f64),
    ) -> IgResult<Vec<u8>> {
        self.calls += 1;
        if self.fail_on.contains(&self.calls) {
            return Err(anyhow::anyhow!("capture backend stalled").into());
        }
        progress(100.0);
        Ok(format!("webm:{}s", spec.duration_secs).into_bytes())
    }
}

fn item(id: &str, kind: ContentKind, duration: Option<u32>) -> RenderedItem {
    let record = ContentRecord {
        content: format!("content {id}"),
        caption: format!("caption {id}"),
        kind,
        duration,
    };
    let canvas = RenderedCanvas::from_premul_rgba8(4, 4, vec![200; 64]).unwrap();
    RenderedItem::new(id, &record, canvas).unwrap()
}

fn opts() -> ArchiveOpts {
    ArchiveOpts {
        timestamp_ms: Some(42),
        generated_on: Some("fixed".to_owned()),
    }
}

fn entry_names(bytes: &[u8]) -> BTreeSet<String> {
    let zip = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    zip.file_names().map(str::to_owned).collect()
}

fn read_entry(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut zip = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut f = zip.by_name(name).unwrap();
    let mut out = Vec::new();
    f.read_to_end(&mut out).unwrap();
    out
}

#[test]
fn archive_has_entry_per_item_and_root_files() {
    let items = vec![
        item("p1", ContentKind::Post, None),
        item("v1", ContentKind::Video, Some(20)),
        item("v2", ContentKind::Video, None),
    ];
    let original = serde_json::json!({"p1": {"music": "kept"}});
    let mut capture = ScriptedCapture {
        fail_on: vec![],
        calls: 0,
    };
    let archive = build_archive(&items, &original, &mut capture, &opts(), &mut |_| {}).unwrap();

    assert_eq!(archive.filename, "instagram_content_42.zip");
    assert_eq!(archive.manifest.len(), 3);
    assert!(archive.degraded_ids().is_empty());

    let names = entry_names(&archive.bytes);
    for expected in [
        "posts/",
        "videos/",
        "posts/p1_post.png",
        "videos/v1_reel_20s.webm",
        "videos/v1_INFO.txt",
        "videos/v2_reel_15s.webm",
        "videos/v2_INFO.txt",
        "README.txt",
        "metadata.json",
        "original_data.json",
    ] {
        assert!(names.contains(expected), "missing {expected}: {names:?}");
    }

    // Every manifest filename exists in its folder.
    for (_, e) in archive.manifest.entries() {
        let folder = match e.kind {
            ContentKind::Post => "posts",
            ContentKind::Video => "videos",
        };
        assert!(names.contains(&format!("{folder}/{}", e.filename)));
    }

    assert_eq!(read_entry(&archive.bytes, "videos/v2_reel_15s.webm"), b"webm:15s");
    let meta: serde_json::Value =
        serde_json::from_slice(&read_entry(&archive.bytes, "metadata.json")).unwrap();
    assert_eq!(meta.as_object().unwrap().len(), 3);
    assert_eq!(meta["p1"]["caption"], "caption p1");

    let orig: serde_json::Value =
        serde_json::from_slice(&read_entry(&archive.bytes, "original_data.json")).unwrap();
    assert_eq!(orig, original);

    let png = read_entry(&archive.bytes, "posts/p1_post.png");
    assert_eq!(image::load_from_memory(&png).unwrap().width(), 4);
}

#[test]
fn failed_capture_degrades_only_that_item() {
    let items = vec![
        item("one", ContentKind::Video, Some(10)),
        item("two", ContentKind::Video, Some(10)),
        item("three", ContentKind::Video, Some(10)),
    ];
    let mut capture = ScriptedCapture {
        fail_on: vec![2],
        calls: 0,
    };
    let archive = build_archive(
        &items,
        &serde_json::json!({}),
        &mut capture,
        &opts(),
        &mut |_| {},
    )
    .unwrap();

    assert_eq!(archive.degraded_ids(), vec!["two"]);
    let names = entry_names(&archive.bytes);
    assert!(names.contains("videos/two_frame.png"));
    assert!(!names.contains("videos/two_reel_10s.webm"));
    assert!(!names.contains("videos/two_INFO.txt"));
    assert!(names.contains("videos/one_reel_10s.webm"));
    assert!(names.contains("videos/three_reel_10s.webm"));

    let two = archive.manifest.get("two").unwrap();
    assert_eq!(two.filename, "two_frame.png");
    assert_eq!(two.format, "PNG (video generation failed)");
    assert!(!archive.manifest.get("one").unwrap().degraded);
}

#[test]
fn progress_reports_each_item_then_serialization() {
    let items = vec![
        item("a", ContentKind::Post, None),
        item("b", ContentKind::Post, None),
    ];
    let mut capture = ScriptedCapture {
        fail_on: vec![],
        calls: 0,
    };
    let mut msgs = Vec::new();
    build_archive(
        &items,
        &serde_json::json!({}),
        &mut capture,
        &opts(),
        &mut |m| msgs.push(m.to_owned()),
    )
    .unwrap();

    assert_eq!(
        msgs,
        vec![
            "Processing 1/2...",
            "Processing 2/2...",
            "Creating ZIP file...",
            "Export complete!",
        ]
    );
    assert_eq!(capture.calls, 0);
}

#[test]
fn strip_folder_drops_only_the_top_folder() {
    assert_eq!(strip_folder("posts/a_post.png"), "a_post.png");
    assert_eq!(strip_folder("posts/x/y_post.png"), "x/y_post.png");
    assert_eq!(strip_folder("README.txt"), "README.txt");
}

#[test]
fn nested_ids_keep_manifest_names_resolvable() {
    let items = vec![item("x/y", ContentKind::Post, None)];
    let mut capture = ScriptedCapture {
        fail_on: vec![],
        calls: 0,
    };
    let archive = build_archive(
        &items,
        &serde_json::json!({}),
        &mut capture,
        &opts(),
        &mut |_| {},
    )
    .unwrap();

    let entry = archive.manifest.get("x/y").unwrap();
    assert_eq!(entry.filename, "x/y_post.png");
    assert!(entry_names(&archive.bytes).contains("posts/x/y_post.png"));
}

struct Mp4Capture;

impl StillCapture for Mp4Capture {
    fn capture_still(
        &mut self,
        _frame: &FrameRGBA,
        _spec: &CaptureSpec,
        _progress: &mut dyn FnMut(f64),
    ) -> IgResult<Vec<u8>> {
        Ok(b"mp4".to_vec())
    }

    fn mime(&self) -> &'static str {
        "video/mp4"
    }

    fn extension(&self) -> &'static str {
        "mp4"
    }
}

#[test]
fn video_entries_use_capture_extension() {
    let items = vec![item("v", ContentKind::Video, Some(10))];
    let archive = build_archive(
        &items,
        &serde_json::json!({}),
        &mut Mp4Capture,
        &opts(),
        &mut |_| {},
    )
    .unwrap();

    let names = entry_names(&archive.bytes);
    assert!(names.contains("videos/v_reel_10s.mp4"), "{names:?}");
    assert!(!names.contains("videos/v_reel_10s.webm"));
    assert_eq!(archive.manifest.get("v").unwrap().filename, "v_reel_10s.mp4");
}
