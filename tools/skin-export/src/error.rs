//! Error types for capture, encoding, validation and transfer.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a [`SkinHost`](crate::host::SkinHost) primitive.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("binding '{0}' not found")]
    UnknownBinding(String),

    #[error("influence '{influence}' is not bound to '{binding}'")]
    UnknownInfluence { binding: String, influence: String },

    #[error("vertex {vertex} out of range for '{binding}' ({vertex_count} vertices)")]
    VertexOutOfRange {
        binding: String,
        vertex: usize,
        vertex_count: usize,
    },

    #[error("host refused weight write: {0}")]
    WriteRefused(String),
}

/// A snapshot that breaks the parallel-array or unique-name invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("influence '{name}' has {found} weights, expected {expected}")]
    WeightCountMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("influence '{0}' appears more than once")]
    DuplicateInfluence(String),

    #[error("influence '{name}' has a non-finite weight at vertex {vertex}")]
    NonFiniteWeight { name: String, vertex: usize },
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no binding named '{0}' found")]
    BindingNotFound(String),

    #[error("binding '{binding}' lists influence '{influence}' more than once")]
    DuplicateInfluence { binding: String, influence: String },

    #[error("failed to query weights: {0}")]
    Host(#[from] HostError),
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("malformed weight document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("inconsistent weight document: {0}")]
    Snapshot(#[from] SnapshotError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error(
        "bindings must have geometry with the same vertex count \
         (file has {expected}, target has {found})"
    )]
    VertexCountMismatch { expected: usize, found: usize },

    #[error(
        "bindings must have the same influences \
         (missing from target: {missing:?}, not in file: {unexpected:?})"
    )]
    InfluenceSetMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("weights at vertex {vertex} sum to {sum}, expected 1.0")]
    WeightsNotNormalized { vertex: usize, sum: f64 },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("no binding named '{0}' found")]
    BindingNotFound(String),

    #[error("cannot apply inconsistent snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("snapshot has {expected} vertices but target has {found}")]
    VertexCountMismatch { expected: usize, found: usize },

    #[error("target influence '{0}' has no weights in the snapshot")]
    InfluenceNotMatched(String),

    #[error("weight write failed: {source} (target restored: {rolled_back})")]
    Host {
        #[source]
        source: HostError,
        rolled_back: bool,
    },
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("file already exists: {}", .0.display())]
    FileAlreadyExists(PathBuf),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("no binding named '{0}' found to import into")]
    BindingNotFound(String),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file too large: {} ({size} bytes, max {max} bytes)", .path.display())]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error(transparent)]
    Parse(#[from] CodecError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Apply(#[from] ApplyError),
}
