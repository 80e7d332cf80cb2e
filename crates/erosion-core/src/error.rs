//! Error types for the erosion engine.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage unavailable: {0}")] Unavailable(String),
    #[error("quota exceeded writing {bytes} bytes to {key}")] QuotaExceeded { key: String, bytes: usize },
    #[error("io: {0}")] Io(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateDecodeError {
    #[error("malformed state: {0}")] Malformed(String),
    #[error("schema mismatch: found {found:?}, expected {expected}")] SchemaMismatch { found: Option<u64>, expected: u32 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")] InvalidParameter { name: &'static str, reason: String },
    #[error("parse: {0}")] Parse(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("clipboard unavailable")] Unavailable,
    #[error("clipboard rejected write: {0}")] Rejected(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("parse: {0}")] Parse(String),
    #[error("empty artifact id")] EmptyArtifactId,
    #[error("fragment index {index} out of range for {total} fragments")] FragmentIndexOutOfRange { index: u32, total: u32 },
    #[error("duplicate fragment index {0}")] DuplicateFragment(u32),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Binding(#[from] BindingError),
    #[error(transparent)] Store(#[from] StoreError),
}
