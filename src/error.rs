use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("version not found: {model}/v{version}")]
    VersionNotFound { model: String, version: u32 },
    #[error("no latest version for {model}: {reason}")]
    NoLatest { model: String, reason: String },
    #[error("stale index for {model}: latest points at v{version} which does not exist")]
    StaleLatest { model: String, version: u32 },
    #[error("corrupt index {}: {reason}", path.display())]
    CorruptIndex { path: PathBuf, reason: String },
    #[error("corrupt metadata {}: {reason}", path.display())]
    CorruptMetadata { path: PathBuf, reason: String },
    #[error("version mismatch in {}: directory is v{expected}, metadata says {found}", path.display())]
    VersionMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("publish failed: {0}")]
    Publish(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Stable code used in `--json` error output.
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::ModelNotFound(_)
            | CatalogError::VersionNotFound { .. }
            | CatalogError::NoLatest { .. }
            | CatalogError::StaleLatest { .. } => "NOT_FOUND",
            CatalogError::CorruptIndex { .. } => "CORRUPT_INDEX",
            CatalogError::CorruptMetadata { .. } => "CORRUPT_METADATA",
            CatalogError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CatalogError::InvalidArgument(_) => "INVALID_ARGUMENT",
            CatalogError::Publish(_) => "PUBLISH_FAILED",
            CatalogError::Io(_) => "IO",
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == "NOT_FOUND"
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
