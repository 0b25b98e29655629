//! Output file names for single exports and archive entries.

/// Milliseconds since the Unix epoch, used as the filename timestamp.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// `<id>_post_<ts>.png`
pub fn post_filename(id: &str, ts: i64) -> String {
    format!("{id}_post_{ts}.png")
}

/// `<id>_reel_<duration>s_<ts>.<ext>`, where `ext` comes from the capture backend.
pub fn reel_filename(id: &str, duration_secs: u32, ext: &str, ts: i64) -> String {
    format!("{id}_reel_{duration_secs}s_{ts}.{ext}")
}

/// `<id>_frame_<ts>.png`, the still written when a single video export falls back.
pub fn still_filename(id: &str, ts: i64) -> String {
    format!("{id}_frame_{ts}.png")
}

/// `instagram_content_<ts>.zip`
pub fn archive_filename(ts: i64) -> String {
    format!("instagram_content_{ts}.zip")
}

pub(crate) fn archive_post_entry(id: &str) -> String {
    format!("posts/{id}_post.png")
}

pub(crate) fn archive_reel_entry(id: &str, duration_secs: u32, ext: &str) -> String {
    format!("videos/{id}_reel_{duration_secs}s.{ext}")
}

pub(crate) fn archive_still_entry(id: &str) -> String {
    format!("videos/{id}_frame.png")
}

pub(crate) fn archive_info_entry(id: &str) -> String {
    format!("videos/{id}_INFO.txt")
}
