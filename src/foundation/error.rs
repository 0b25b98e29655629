/// Convenience result type used across igcreator.
pub type IgResult<T> = Result<T, IgError>;

/// Top-level error taxonomy used by the generation, export and archive APIs.
#[derive(thiserror::Error, Debug)]
pub enum IgError {
    /// Malformed, oversized or incomplete user input. Raised before any rendering starts.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Template decode or drawing failure for a single item.
    #[error("render error for '{id}': {message}")]
    Render {
        /// Key of the offending record.
        id: String,
        /// Human-readable cause.
        message: String,
    },

    /// Capture or encode failure while exporting a single item.
    #[error("export error for '{id}': {message}")]
    Export {
        /// Key of the offending item.
        id: String,
        /// Human-readable cause.
        message: String,
    },

    /// Packaging failure while serializing an archive.
    #[error("archive error: {0}")]
    Archive(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IgError {
    /// Build an [`IgError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build an [`IgError::Render`] value for item `id`.
    pub fn render(id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Render {
            id: id.into(),
            message: msg.into(),
        }
    }

    /// Build an [`IgError::Export`] value for item `id`.
    pub fn export(id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Export {
            id: id.into(),
            message: msg.into(),
        }
    }

    /// Build an [`IgError::Archive`] value.
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }

    /// Build an [`IgError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Item key this error is attributed to, if any.
    pub fn item_id(&self) -> Option<&str> {
        match self {
            Self::Render { id, .. } | Self::Export { id, .. } => Some(id.as_str()),
            _ => None,
        }
    }

    /// Render a full cause chain (`outer: inner: ...`) for attaching to item-level errors.
    pub(crate) fn chain_message(&self) -> String {
        match self {
            Self::Other(e) => format!("{e:#}"),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
