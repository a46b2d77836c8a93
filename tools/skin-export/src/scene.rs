//! File-backed scene document
//!
//! A [`SceneFile`] is a plain JSON description of bound surfaces that
//! implements [`SkinHost`] in memory. The CLI uses it as its host; tests use
//! it as a stand-in for a live scene.
//!
//! ```text
//! {
//!   "platform": "2024",
//!   "project_root": "/projects/hero",
//!   "bindings": {
//!     "skinCluster1": {
//!       "mesh": "|hero|body",
//!       "vertex_count": 4,
//!       "influences": [{"name": "root", "weights": [1.0, 0.75, 0.25, 0.0]}]
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::host::{BindingInfo, SkinHost};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub project_root: PathBuf,
    #[serde(default)]
    pub bindings: BTreeMap<String, SceneBinding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneBinding {
    pub mesh: String,
    pub vertex_count: usize,
    #[serde(default)]
    pub influences: Vec<SceneInfluence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneInfluence {
    pub name: String,
    pub weights: Vec<f64>,
}

impl SceneFile {
    pub fn new(project_root: impl Into<PathBuf>, platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            project_root: project_root.into(),
            bindings: BTreeMap::new(),
        }
    }

    /// Load a scene from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene: {}", path.display()))?;
        let scene: SceneFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse scene: {}", path.display()))?;
        scene.check()?;
        Ok(scene)
    }

    /// Write the scene back to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).context("Failed to serialize scene")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write scene: {}", path.display()))
    }

    /// Add (or replace) a binding. Vertex count is taken from the first
    /// influence's weights.
    pub fn add_binding(
        &mut self,
        id: impl Into<String>,
        mesh: impl Into<String>,
        influences: Vec<(String, Vec<f64>)>,
    ) {
        let vertex_count = influences.first().map(|(_, w)| w.len()).unwrap_or(0);
        self.bindings.insert(
            id.into(),
            SceneBinding {
                mesh: mesh.into(),
                vertex_count,
                influences: influences
                    .into_iter()
                    .map(|(name, weights)| SceneInfluence { name, weights })
                    .collect(),
            },
        );
    }

    fn check(&self) -> Result<()> {
        for (id, binding) in &self.bindings {
            for inf in &binding.influences {
                if inf.weights.len() != binding.vertex_count {
                    anyhow::bail!(
                        "Scene binding '{}': influence '{}' has {} weights, expected {}",
                        id,
                        inf.name,
                        inf.weights.len(),
                        binding.vertex_count
                    );
                }
            }
        }
        Ok(())
    }

    fn influence(&self, binding_id: &str, influence: &str) -> Result<&SceneInfluence, HostError> {
        let binding = self
            .bindings
            .get(binding_id)
            .ok_or_else(|| HostError::UnknownBinding(binding_id.to_string()))?;
        binding
            .influences
            .iter()
            .find(|i| i.name == influence)
            .ok_or_else(|| HostError::UnknownInfluence {
                binding: binding_id.to_string(),
                influence: influence.to_string(),
            })
    }
}

impl SkinHost for SceneFile {
    fn list_bindings(&self) -> Vec<String> {
        self.bindings.keys().cloned().collect()
    }

    fn resolve_binding(&self, binding_id: &str) -> Option<BindingInfo> {
        self.bindings.get(binding_id).map(|b| BindingInfo {
            target_surface_id: b.mesh.clone(),
            vertex_count: b.vertex_count,
            influence_names: b.influences.iter().map(|i| i.name.clone()).collect(),
        })
    }

    fn query_weight(
        &self,
        binding_id: &str,
        influence: &str,
        vertex: usize,
    ) -> Result<f64, HostError> {
        let inf = self.influence(binding_id, influence)?;
        inf.weights
            .get(vertex)
            .copied()
            .ok_or_else(|| HostError::VertexOutOfRange {
                binding: binding_id.to_string(),
                vertex,
                vertex_count: inf.weights.len(),
            })
    }

    fn query_weights(
        &self,
        binding_id: &str,
        influence: &str,
        vertex_count: usize,
    ) -> Result<Vec<f64>, HostError> {
        let inf = self.influence(binding_id, influence)?;
        if vertex_count > inf.weights.len() {
            return Err(HostError::VertexOutOfRange {
                binding: binding_id.to_string(),
                vertex: vertex_count - 1,
                vertex_count: inf.weights.len(),
            });
        }
        Ok(inf.weights[..vertex_count].to_vec())
    }

    fn set_weight(
        &mut self,
        binding_id: &str,
        influence: &str,
        vertex: usize,
        value: f64,
    ) -> Result<(), HostError> {
        let binding = self
            .bindings
            .get_mut(binding_id)
            .ok_or_else(|| HostError::UnknownBinding(binding_id.to_string()))?;
        let inf = binding
            .influences
            .iter_mut()
            .find(|i| i.name == influence)
            .ok_or_else(|| HostError::UnknownInfluence {
                binding: binding_id.to_string(),
                influence: influence.to_string(),
            })?;
        let vertex_count = inf.weights.len();
        let slot = inf
            .weights
            .get_mut(vertex)
            .ok_or_else(|| HostError::VertexOutOfRange {
                binding: binding_id.to_string(),
                vertex,
                vertex_count,
            })?;
        *slot = value;
        Ok(())
    }

    fn project_root(&self) -> PathBuf {
        self.project_root.clone()
    }

    fn platform_version(&self) -> String {
        self.platform.clone()
    }
}
