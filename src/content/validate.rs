use std::fmt;

use serde_json::{Map, Value};

use crate::content::model::{
    ContentKind, MAX_DURATION_SECS, MAX_ITEMS, MIN_DURATION_SECS,
};
use crate::foundation::error::{IgError, IgResult};

/// Location of a validation failure inside the input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldPath {
    pub(crate) key: Option<String>,
    pub(crate) field: Option<&'static str>,
}

impl FieldPath {
    fn root() -> Self {
        Self {
            key: None,
            field: None,
        }
    }

    fn record(key: &str) -> Self {
        Self {
            key: Some(key.to_owned()),
            field: None,
        }
    }

    fn field(key: &str, field: &'static str) -> Self {
        Self {
            key: Some(key.to_owned()),
            field: Some(field),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        if let Some(k) = &self.key {
            write!(f, ".{k}")?;
        }
        if let Some(field) = self.field {
            write!(f, ".{field}")?;
        }
        Ok(())
    }
}

/// First failure found in a document.
#[derive(Debug, Clone)]
pub(crate) struct ContentError {
    pub(crate) path: FieldPath,
    pub(crate) message: String,
}

impl ContentError {
    fn at(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl From<ContentError> for IgError {
    fn from(e: ContentError) -> Self {
        IgError::invalid_input(e.to_string())
    }
}

/// Validate a parsed JSON document against the content schema.
///
/// Stops at the first failing record or field; rendering never starts on a partially valid
/// document.
pub fn validate(doc: &Value) -> IgResult<()> {
    validate_document(doc).map_err(IgError::from)
}

pub(crate) fn validate_document(doc: &Value) -> Result<(), ContentError> {
    let Some(map) = doc.as_object() else {
        return Err(ContentError::at(
            FieldPath::root(),
            "input must be a JSON object mapping ids to records",
        ));
    };

    if map.is_empty() {
        return Err(ContentError::at(
            FieldPath::root(),
            "empty input: JSON data has no entries",
        ));
    }
    if map.len() > MAX_ITEMS {
        return Err(ContentError::at(
            FieldPath::root(),
            format!(
                "too many items: {} entries (maximum {MAX_ITEMS})",
                map.len()
            ),
        ));
    }

    for (key, item) in map {
        validate_record(key, item)?;
    }
    Ok(())
}

fn validate_record(key: &str, item: &Value) -> Result<(), ContentError> {
    if key.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(ContentError::at(
            FieldPath::record(key),
            format!("id '{key}' must not contain path separators or control characters"),
        ));
    }

    let Some(obj) = item.as_object() else {
        return Err(ContentError::at(
            FieldPath::record(key),
            format!("record '{key}' must be an object"),
        ));
    };

    if non_empty_str(obj, "content").is_none() {
        return Err(ContentError::at(
            FieldPath::field(key, "content"),
            format!("missing 'content' in '{key}'"),
        ));
    }
    if non_empty_str(obj, "caption").is_none() {
        return Err(ContentError::at(
            FieldPath::field(key, "caption"),
            format!("missing 'caption' in '{key}'"),
        ));
    }

    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .and_then(ContentKind::parse)
        .ok_or_else(|| {
            ContentError::at(
                FieldPath::field(key, "type"),
                format!("invalid or missing 'type' in '{key}'; must be 'post' or 'video'"),
            )
        })?;

    if kind == ContentKind::Video
        && let Some(raw) = obj.get("duration")
        && !raw.is_null()
    {
        let secs = duration_secs(raw).ok_or_else(|| {
            ContentError::at(
                FieldPath::field(key, "duration"),
                format!("invalid 'duration' in '{key}': not a number"),
            )
        })?;
        if !(i64::from(MIN_DURATION_SECS)..=i64::from(MAX_DURATION_SECS)).contains(&secs) {
            return Err(ContentError::at(
                FieldPath::field(key, "duration"),
                format!(
                    "invalid 'duration' in '{key}': duration out of range ({secs}s, must be \
                     {MIN_DURATION_SECS}-{MAX_DURATION_SECS} seconds)"
                ),
            ));
        }
    }

    Ok(())
}

pub(crate) fn non_empty_str<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    obj.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Integer seconds from a JSON number or numeric string. Fractions are truncated.
pub(crate) fn duration_secs(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/validate.rs"]
mod tests;
