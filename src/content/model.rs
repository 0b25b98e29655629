use std::fs::File;
use std::io::Read as _;
use std::path::Path;

use serde_json::Value;

use crate::content::validate::{duration_secs, non_empty_str, validate};
use crate::foundation::core::Canvas;
use crate::foundation::error::{IgError, IgResult};

/// Maximum number of records in one document.
pub const MAX_ITEMS: usize = 24;
/// Shortest accepted reel duration, in seconds.
pub const MIN_DURATION_SECS: u32 = 5;
/// Longest accepted reel duration, in seconds.
pub const MAX_DURATION_SECS: u32 = 90;
/// Reel duration used when a record does not set one.
pub const DEFAULT_DURATION_SECS: u32 = 15;
/// Upper bound for JSON input files.
pub const MAX_INPUT_BYTES: u64 = 5 * 1024 * 1024;

/// What a record renders into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// 1080x1080 still image.
    Post,
    /// 1080x1920 looping still exported as video.
    Video,
}

impl ContentKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "post" => Some(Self::Post),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Video => "video",
        }
    }

    /// Fixed canvas dimensions for this kind.
    pub fn canvas(self) -> Canvas {
        match self {
            Self::Post => Canvas::POST,
            Self::Video => Canvas::REEL,
        }
    }
}

/// One validated input entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentRecord {
    /// Text drawn on the canvas.
    pub content: String,
    /// Caption carried into export metadata; never drawn.
    pub caption: String,
    pub kind: ContentKind,
    /// Requested reel length in seconds, as given in the input.
    pub duration: Option<u32>,
}

impl ContentRecord {
    /// Duration used for export: `Some` for videos (defaulting to 15s), `None` for posts.
    pub fn resolved_duration(&self) -> Option<u32> {
        match self.kind {
            ContentKind::Post => None,
            ContentKind::Video => Some(self.duration.unwrap_or(DEFAULT_DURATION_SECS)),
        }
    }
}

/// A validated input document: ordered `(key, record)` pairs plus the JSON it came from.
#[derive(Clone, Debug)]
pub struct ContentDoc {
    raw: Value,
    records: Vec<(String, ContentRecord)>,
}

impl ContentDoc {
    /// Validate an already-parsed document.
    pub fn from_value(raw: Value) -> IgResult<Self> {
        validate(&raw)?;

        let map = raw
            .as_object()
            .ok_or_else(|| IgError::invalid_input("input must be a JSON object"))?;
        let mut records = Vec::with_capacity(map.len());
        for (key, item) in map {
            let obj = item
                .as_object()
                .ok_or_else(|| IgError::invalid_input(format!("record '{key}' must be an object")))?;
            let kind = obj
                .get("type")
                .and_then(Value::as_str)
                .and_then(ContentKind::parse)
                .ok_or_else(|| IgError::invalid_input(format!("invalid 'type' in '{key}'")))?;
            let duration = match kind {
                ContentKind::Video => obj
                    .get("duration")
                    .and_then(duration_secs)
                    .and_then(|d| u32::try_from(d).ok()),
                ContentKind::Post => None,
            };
            records.push((
                key.clone(),
                ContentRecord {
                    content: non_empty_str(obj, "content").unwrap_or_default().to_owned(),
                    caption: non_empty_str(obj, "caption").unwrap_or_default().to_owned(),
                    kind,
                    duration,
                },
            ));
        }

        Ok(Self { raw, records })
    }

    /// Parse and validate a JSON string.
    pub fn from_json_str(s: &str) -> IgResult<Self> {
        if s.len() as u64 > MAX_INPUT_BYTES {
            return Err(IgError::invalid_input(format!(
                "JSON input is too large ({} bytes, maximum 5MB)",
                s.len()
            )));
        }
        if s.trim().is_empty() {
            return Err(IgError::invalid_input("JSON input is empty"));
        }
        let raw: Value = serde_json::from_str(s)
            .map_err(|e| IgError::invalid_input(format!("parse content JSON: {e}")))?;
        Self::from_value(raw)
    }

    /// Load a `.json` file from disk (at most 5MB).
    pub fn from_path(path: impl AsRef<Path>) -> IgResult<Self> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if !is_json {
            return Err(IgError::invalid_input(format!(
                "'{}' is not a .json file",
                path.display()
            )));
        }

        let f = File::open(path).map_err(|e| {
            IgError::invalid_input(format!("open content JSON '{}': {e}", path.display()))
        })?;
        let len = f
            .metadata()
            .map_err(|e| IgError::invalid_input(format!("stat '{}': {e}", path.display())))?
            .len();
        if len > MAX_INPUT_BYTES {
            return Err(IgError::invalid_input(format!(
                "'{}' is too large ({len} bytes, maximum 5MB)",
                path.display()
            )));
        }

        let mut s = String::with_capacity(len as usize);
        f.take(MAX_INPUT_BYTES + 1)
            .read_to_string(&mut s)
            .map_err(|e| IgError::invalid_input(format!("read '{}': {e}", path.display())))?;
        Self::from_json_str(&s)
    }

    /// Records in document order.
    pub fn records(&self) -> &[(String, ContentRecord)] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ContentRecord> {
        self.records.iter().find(|(k, _)| k == id).map(|(_, r)| r)
    }

    /// The document exactly as supplied, including fields this crate ignores.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/model.rs"]
mod tests;
