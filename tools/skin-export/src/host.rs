//! Host scene interface
//!
//! Capture and apply never touch a scene directly; they go through
//! [`SkinHost`], which exposes the handful of per-binding primitives a
//! content tool provides (list, resolve, read one weight, write one weight).

use std::path::PathBuf;

use crate::error::HostError;

/// What the host knows about a live binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingInfo {
    /// Surface the binding deforms
    pub target_surface_id: String,
    pub vertex_count: usize,
    /// Influences in the binding's native order
    pub influence_names: Vec<String>,
}

/// Scene operations used by capture, apply and the transfer session.
pub trait SkinHost {
    /// Identifiers of every binding in the scene.
    fn list_bindings(&self) -> Vec<String>;

    /// Resolve a binding, or `None` if the scene has no binding with this id.
    fn resolve_binding(&self, binding_id: &str) -> Option<BindingInfo>;

    fn query_weight(
        &self,
        binding_id: &str,
        influence: &str,
        vertex: usize,
    ) -> Result<f64, HostError>;

    /// Weights of one influence for vertices `0..vertex_count`.
    ///
    /// The default issues one [`query_weight`](Self::query_weight) per vertex.
    /// Hosts with a batched read should override it; results must be identical.
    fn query_weights(
        &self,
        binding_id: &str,
        influence: &str,
        vertex_count: usize,
    ) -> Result<Vec<f64>, HostError> {
        (0..vertex_count)
            .map(|v| self.query_weight(binding_id, influence, v))
            .collect()
    }

    fn set_weight(
        &mut self,
        binding_id: &str,
        influence: &str,
        vertex: usize,
        value: f64,
    ) -> Result<(), HostError>;

    /// Root directory substituted for the `{project}/` token in paths.
    fn project_root(&self) -> PathBuf;

    /// Version string recorded in exported metadata.
    fn platform_version(&self) -> String;
}

/// Yes/no confirmation asked before overwriting an existing document.
pub trait OverwritePrompt {
    fn confirm_overwrite(&mut self, path: &std::path::Path) -> bool;
}

/// Prompt with a fixed answer, for non-interactive callers.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl OverwritePrompt for FixedAnswer {
    fn confirm_overwrite(&mut self, _path: &std::path::Path) -> bool {
        self.0
    }
}
