use thiserror::Error;

/// Main error type for filedoc operations
#[derive(Error, Debug)]
pub enum FiledocError {
    #[error("Unsupported file kind: {}", display_extension(.extension))]
    UnsupportedFileKind { extension: Option<String> },

    #[error("Unparsable source: {0}")]
    UnparsableSource(String),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error("Failed to decode {kind} input: {reason}")]
    Decode { kind: &'static str, reason: String },

    #[error("File {path} is {size} bytes, above the {limit} byte limit")]
    FileTooLarge { path: String, size: u64, limit: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),
}

fn display_extension(extension: &Option<String>) -> String {
    match extension {
        Some(ext) => format!("'.{}'", ext),
        None => "no file extension".to_string(),
    }
}

impl FiledocError {
    pub fn decode(kind: &'static str, reason: impl ToString) -> Self {
        Self::Decode {
            kind,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FiledocError>;
