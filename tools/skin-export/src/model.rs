//! In-memory weight binding model
//!
//! A [`BindingSnapshot`] is a complete capture of one binding: which surface it
//! deforms, how many vertices that surface has, and one parallel weight array
//! per influence.

use hashbrown::HashSet;

use crate::error::SnapshotError;

/// Informational header written alongside every snapshot.
///
/// Never validated on import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub creator: String,
    pub created_at: String,
    pub platform_version: String,
}

impl Metadata {
    /// Timestamp layout used in the `created` field: `<date> - <time>`
    pub const CREATED_FORMAT: &'static str = "%Y/%m/%d - %H:%M:%S";

    pub fn new(
        creator: impl Into<String>,
        created_at: impl Into<String>,
        platform_version: impl Into<String>,
    ) -> Self {
        Self {
            creator: creator.into(),
            created_at: created_at.into(),
            platform_version: platform_version.into(),
        }
    }

    /// Build metadata stamped with the current local time.
    pub fn now(creator: impl Into<String>, platform_version: impl Into<String>) -> Self {
        let created_at = chrono::Local::now()
            .format(Self::CREATED_FORMAT)
            .to_string();
        Self::new(creator, created_at, platform_version)
    }
}

/// Weights of one influence across every vertex of the bound surface.
#[derive(Debug, Clone, PartialEq)]
pub struct InfluenceEntry {
    pub name: String,
    /// Position in the exporting binding's influence list. Only meaningful
    /// for that binding; matching on import goes by `name`.
    pub source_index: usize,
    pub weights: Vec<f64>,
}

impl InfluenceEntry {
    pub fn new(name: impl Into<String>, source_index: usize, weights: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            source_index,
            weights,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BindingSnapshot {
    pub binding_id: String,
    pub target_surface_id: String,
    pub vertex_count: usize,
    pub influences: Vec<InfluenceEntry>,
}

impl BindingSnapshot {
    /// Check that every weight array has `vertex_count` finite entries and
    /// that no influence name repeats.
    pub fn check(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::with_capacity(self.influences.len());
        for entry in &self.influences {
            if entry.weights.len() != self.vertex_count {
                return Err(SnapshotError::WeightCountMismatch {
                    name: entry.name.clone(),
                    expected: self.vertex_count,
                    found: entry.weights.len(),
                });
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(SnapshotError::DuplicateInfluence(entry.name.clone()));
            }
            if let Some(vertex) = entry.weights.iter().position(|w| !w.is_finite()) {
                return Err(SnapshotError::NonFiniteWeight {
                    name: entry.name.clone(),
                    vertex,
                });
            }
        }
        Ok(())
    }

    /// Influence names in stored order
    pub fn influence_names(&self) -> impl Iterator<Item = &str> {
        self.influences.iter().map(|e| e.name.as_str())
    }

    /// Look up an influence by name
    pub fn influence(&self, name: &str) -> Option<&InfluenceEntry> {
        self.influences.iter().find(|e| e.name == name)
    }
}

/// Metadata plus snapshot; the unit written to and read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub meta: Metadata,
    pub snapshot: BindingSnapshot,
}

impl ExportDocument {
    pub fn new(meta: Metadata, snapshot: BindingSnapshot) -> Self {
        Self { meta, snapshot }
    }
}
