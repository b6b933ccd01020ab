use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::error::{FiledocError, Result};

/// Input kinds, decided by file extension only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    Csv,
    Excel,
    Json,
    Python,
    Unsupported,
}

impl FileKind {
    /// Map a file name to its kind without failing
    pub fn from_name(name: impl AsRef<Path>) -> Self {
        match extension_of(name.as_ref()).as_deref() {
            Some("csv") => Self::Csv,
            Some("xlsx") | Some("xls") => Self::Excel,
            Some("json") => Self::Json,
            Some("py") => Self::Python,
            _ => Self::Unsupported,
        }
    }

    pub fn is_supported(&self) -> bool {
        *self != Self::Unsupported
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
            Self::Json => "JSON",
            Self::Python => "Python",
            Self::Unsupported => "Unsupported",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an input for dispatch.
///
/// Only the extension decides; `content` is never sniffed. Unknown
/// extensions are an error carrying the offending extension.
pub fn classify(path: impl AsRef<Path>, content: &[u8]) -> Result<FileKind> {
    let path = path.as_ref();
    let kind = FileKind::from_name(path);
    debug!("Classified {} ({} bytes) as {}", path.display(), content.len(), kind);

    if kind.is_supported() {
        Ok(kind)
    } else {
        Err(FiledocError::UnsupportedFileKind {
            extension: extension_of(path),
        })
    }
}

pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}
