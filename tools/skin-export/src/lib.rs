//! skin-export library
//!
//! Saves the per-vertex influence weights of a skin binding to a JSON
//! document and restores them onto the same or a compatible binding.
//! Scene access goes through the [`SkinHost`] trait.

pub mod apply;
pub mod capture;
pub mod codec;
pub mod config;
pub mod error;
pub mod host;
pub mod model;
pub mod scene;
pub mod session;
pub mod validate;

pub use apply::{apply, ApplyReport};
pub use capture::capture;
pub use codec::{decode, decode_summary, encode, encode_pretty, DocumentSummary};
pub use config::SessionConfig;
pub use error::{
    ApplyError, CaptureError, CodecError, ExportError, HostError, ImportError, SnapshotError,
    ValidationError,
};
pub use host::{BindingInfo, FixedAnswer, OverwritePrompt, SkinHost};
pub use model::{BindingSnapshot, ExportDocument, InfluenceEntry, Metadata};
pub use scene::SceneFile;
pub use session::TransferSession;
pub use validate::{
    check_normalized, compare_influence_sets, validate_import, validate_vertex_count,
};
