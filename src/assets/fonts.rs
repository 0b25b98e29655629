use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{IgError, IgResult};

/// Environment variable pointing at a font file to use instead of system discovery.
pub const FONT_ENV_VAR: &str = "IGCREATOR_FONT";

/// Where the renderer gets its typeface from.
#[derive(Clone, Debug)]
pub enum FontSource {
    /// A `.ttf`/`.otf`/`.ttc` file on disk.
    File(PathBuf),
    /// Font bytes already in memory.
    Bytes(Arc<Vec<u8>>),
    /// Query installed fonts for a bold sans-serif face.
    System,
}

impl Default for FontSource {
    fn default() -> Self {
        Self::from_env_or_system()
    }
}

impl FontSource {
    /// `File($IGCREATOR_FONT)` when set, otherwise `System`.
    pub fn from_env_or_system() -> Self {
        match std::env::var_os(FONT_ENV_VAR) {
            Some(p) if !p.is_empty() => Self::File(PathBuf::from(p)),
            _ => Self::System,
        }
    }

    /// Resolve the source into font bytes.
    pub fn load(&self) -> IgResult<LoadedFont> {
        match self {
            Self::File(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("read font file '{}'", path.display()))?;
                Ok(LoadedFont {
                    bytes: Arc::new(bytes),
                    index: 0,
                })
            }
            Self::Bytes(bytes) => Ok(LoadedFont {
                bytes: bytes.clone(),
                index: 0,
            }),
            Self::System => load_system_bold_sans(),
        }
    }
}

/// Raw font data plus the face index inside a collection.
#[derive(Clone)]
pub struct LoadedFont {
    pub(crate) bytes: Arc<Vec<u8>>,
    pub(crate) index: u32,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

impl LoadedFont {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

fn load_system_bold_sans() -> IgResult<LoadedFont> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    let families = [
        usvg::fontdb::Family::Name("Arial"),
        usvg::fontdb::Family::Name("Helvetica"),
        usvg::fontdb::Family::Name("DejaVu Sans"),
        usvg::fontdb::Family::Name("Liberation Sans"),
        usvg::fontdb::Family::SansSerif,
    ];
    let query = usvg::fontdb::Query {
        families: &families,
        weight: usvg::fontdb::Weight::BOLD,
        stretch: usvg::fontdb::Stretch::Normal,
        style: usvg::fontdb::Style::Normal,
    };

    let id = db
        .query(&query)
        .or_else(|| db.faces().next().map(|f| f.id))
        .ok_or_else(|| {
            IgError::invalid_input(format!(
                "no system fonts found; install a sans-serif font or set {FONT_ENV_VAR}"
            ))
        })?;

    let (bytes, index) = db
        .with_face_data(id, |data, index| (data.to_vec(), index))
        .ok_or_else(|| IgError::invalid_input("selected system font could not be read"))?;
    tracing::debug!(bytes = bytes.len(), index, "loaded system font");

    Ok(LoadedFont {
        bytes: Arc::new(bytes),
        index,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
