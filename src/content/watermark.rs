use crate::foundation::error::{IgError, IgResult};

/// Text stamped when the caller does not supply one.
pub const DEFAULT_WATERMARK: &str = "Generated with IG Creator";

/// Longest accepted watermark, in characters.
pub const MAX_WATERMARK_CHARS: usize = 50;

/// Validated watermark text drawn at the bottom of every canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Watermark(String);

impl Default for Watermark {
    fn default() -> Self {
        Self(DEFAULT_WATERMARK.to_owned())
    }
}

impl Watermark {
    /// Accept `text`, falling back to the default when it is blank.
    pub fn new(text: impl Into<String>) -> IgResult<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let chars = trimmed.chars().count();
        if chars > MAX_WATERMARK_CHARS {
            return Err(IgError::invalid_input(format!(
                "watermark too long: {chars} characters (maximum {MAX_WATERMARK_CHARS})"
            )));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// `new` for optional input.
    pub fn from_option(text: Option<&str>) -> IgResult<Self> {
        text.map_or_else(|| Ok(Self::default()), Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Watermark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/watermark.rs"]
mod tests;
