use serde::Serialize;

use crate::content::model::ContentKind;
use crate::foundation::error::{IgError, IgResult};
use crate::render::item::RenderedItem;

/// `metadata.json` record for one archived item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub filename: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub caption: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Set when a video was archived as its still frame.
    pub degraded: bool,
}

impl ManifestEntry {
    pub fn post(item: &RenderedItem, filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            kind: ContentKind::Post,
            format: "PNG Image - Ready to upload".to_owned(),
            duration: None,
            caption: item.caption.clone(),
            content: item.content.clone(),
            specifications: Some("1080x1080, 1:1 ratio".to_owned()),
            note: None,
            degraded: false,
        }
    }

    pub fn video(item: &RenderedItem, filename: impl Into<String>, duration_secs: u32) -> Self {
        Self {
            filename: filename.into(),
            kind: ContentKind::Video,
            format: "WebM video (convert to MP4 for Instagram)".to_owned(),
            duration: Some(format!(
                "{duration_secs} seconds (convert to MP4 for Instagram)"
            )),
            caption: item.caption.clone(),
            content: item.content.clone(),
            specifications: Some("1080x1920, 9:16 ratio, static image video".to_owned()),
            note: None,
            degraded: false,
        }
    }

    /// Entry for a video whose capture failed and was replaced by a PNG still.
    pub fn degraded_video(item: &RenderedItem, filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            kind: ContentKind::Video,
            format: "PNG (video generation failed)".to_owned(),
            duration: None,
            caption: item.caption.clone(),
            content: item.content.clone(),
            specifications: None,
            note: Some("Use video editing software to create video".to_owned()),
            degraded: true,
        }
    }
}

/// Ordered `id -> entry` mapping written as `metadata.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<(String, ManifestEntry)>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, entry: ManifestEntry) {
        let id = id.into();
        match self.entries.iter_mut().find(|(k, _)| *k == id) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((id, entry)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, e)| e)
    }

    pub fn entries(&self) -> &[(String, ManifestEntry)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries marked degraded.
    pub fn degraded_count(&self) -> usize {
        self.entries.iter().filter(|(_, e)| e.degraded).count()
    }

    pub fn to_value(&self) -> IgResult<serde_json::Value> {
        let mut map = serde_json::Map::with_capacity(self.entries.len());
        for (id, entry) in &self.entries {
            let v = serde_json::to_value(entry)
                .map_err(|e| IgError::serde(format!("manifest entry '{id}': {e}")))?;
            map.insert(id.clone(), v);
        }
        Ok(serde_json::Value::Object(map))
    }

    pub fn to_json_pretty(&self) -> IgResult<String> {
        serde_json::to_string_pretty(&self.to_value()?)
            .map_err(|e| IgError::serde(format!("manifest: {e}")))
    }
}

/// `videos/<id>_INFO.txt` body.
pub fn video_info_text(item: &RenderedItem, filename: &str, duration_secs: u32) -> String {
    format!(
        "Instagram Reel: {id}

Format: WebM video ({duration_secs} seconds, static image)
Dimensions: 1080x1920 (9:16 ratio)
Caption: {caption}

Note: This is a WEBM file. Instagram accepts MP4.
To convert to MP4:
1. Use an online converter (e.g. CloudConvert, FreeConvert)
2. Or use FFmpeg: ffmpeg -i {filename} -c:v libx264 output.mp4
3. Upload the MP4 to Instagram Reels

Content: {content}",
        id = item.id,
        caption = item.caption,
        content = item.content,
    )
}

/// Archive-level `README.txt`.
pub fn readme_text(total_items: usize, generated_on: &str) -> String {
    format!(
        "# Instagram Content Export

Generated on: {generated_on}
Total Items: {total_items}

## Folder Structure

### /posts
Instagram post images (1080x1080)
- Ready to upload directly to Instagram
- PNG format, lossless

### /videos
Instagram Reel videos (1080x1920)
- WebM video format, static image shown for the requested duration
- Convert to MP4 before uploading to Instagram
- A <id>_frame.png here means video capture failed for that item

## How to Use

### Posts (Images)
1. Open the /posts folder
2. Upload the PNG files directly to Instagram
3. Use the captions from metadata.json

### Reels (Videos)
1. Open the /videos folder
2. Convert WEBM to MP4:
   - Online: CloudConvert.com or FreeConvert.com
   - FFmpeg: ffmpeg -i input.webm -c:v libx264 output.mp4
3. Upload the MP4 to Instagram Reels

## Video Format Details

- Format: WebM (needs conversion to MP4)
- Frame rate: 30 fps
- Type: Static image video
- Dimensions: 1080x1920 (9:16)
- Instagram accepts: MP4, MOV

## Files Included

- metadata.json: Complete information about all content
- original_data.json: Your original JSON input
- README.txt: This file

## Conversion Tools

Online (Free):
- CloudConvert.com
- FreeConvert.com
- Online-Convert.com

Desktop Software:
- HandBrake (Free)
- FFmpeg (Free, Command-line)
- VLC Media Player (Free)

## Support

For questions or issues, refer to metadata.json for complete content details.

---
Generated with IG Creator
"
    )
}

#[cfg(test)]
#[path = "../../tests/unit/archive/manifest.rs"]
mod tests;
