//! Weight document format (JSON)
//!
//! Layout:
//! ```text
//! {
//!   "User Info":     {"user": str, "created": str, "platform": str},
//!   "Deformer Info": {
//!     "cluster": str, "mesh": str,
//!     "vtx": [0, 1, ..., n-1],
//!     "inf": [{"name": str, "index": i, "<i>": [f64; n]}, ...]
//!   }
//! }
//! ```
//!
//! Each influence stores its weight array under a key equal to its own
//! `index` as text. Existing documents depend on this, so the key is kept.
//! `vtx` only carries the vertex count.

use serde::de::{Error as _, IgnoredAny};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CodecError;
use crate::model::{BindingSnapshot, ExportDocument, InfluenceEntry, Metadata};

#[derive(Debug, Serialize, Deserialize)]
struct WireDocument {
    #[serde(rename = "User Info")]
    user_info: WireUserInfo,
    #[serde(rename = "Deformer Info")]
    deformer_info: WireDeformerInfo,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireUserInfo {
    user: String,
    created: String,
    platform: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireDeformerInfo {
    cluster: String,
    mesh: String,
    vtx: Vec<u64>,
    inf: Vec<WireInfluence>,
}

#[derive(Debug)]
struct WireInfluence {
    name: String,
    index: usize,
    weights: Vec<f64>,
}

impl Serialize for WireInfluence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("index", &self.index)?;
        map.serialize_entry(&self.index.to_string(), &self.weights)?;
        map.end()
    }
}

/// Influence object as read, before the dynamic weight key is resolved
#[derive(Deserialize)]
struct RawInfluence {
    name: String,
    index: usize,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

impl<'de> Deserialize<'de> for WireInfluence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = RawInfluence::deserialize(deserializer)?;
        let key = raw.index.to_string();
        let value = raw.rest.remove(&key).ok_or_else(|| {
            D::Error::custom(format!(
                "influence '{}' is missing its weight array \"{}\"",
                raw.name, key
            ))
        })?;
        let weights = Vec::<f64>::deserialize(value).map_err(|e| {
            D::Error::custom(format!("influence '{}' weights: {}", raw.name, e))
        })?;
        Ok(WireInfluence {
            name: raw.name,
            index: raw.index,
            weights,
        })
    }
}

impl From<&ExportDocument> for WireDocument {
    fn from(doc: &ExportDocument) -> Self {
        let snapshot = &doc.snapshot;
        WireDocument {
            user_info: WireUserInfo {
                user: doc.meta.creator.clone(),
                created: doc.meta.created_at.clone(),
                platform: doc.meta.platform_version.clone(),
            },
            deformer_info: WireDeformerInfo {
                cluster: snapshot.binding_id.clone(),
                mesh: snapshot.target_surface_id.clone(),
                vtx: (0..snapshot.vertex_count as u64).collect(),
                inf: snapshot
                    .influences
                    .iter()
                    .map(|e| WireInfluence {
                        name: e.name.clone(),
                        index: e.source_index,
                        weights: e.weights.clone(),
                    })
                    .collect(),
            },
        }
    }
}

impl From<WireDocument> for ExportDocument {
    fn from(wire: WireDocument) -> Self {
        let info = wire.deformer_info;
        ExportDocument {
            meta: Metadata {
                creator: wire.user_info.user,
                created_at: wire.user_info.created,
                platform_version: wire.user_info.platform,
            },
            snapshot: BindingSnapshot {
                binding_id: info.cluster,
                target_surface_id: info.mesh,
                vertex_count: info.vtx.len(),
                influences: info
                    .inf
                    .into_iter()
                    .map(|i| InfluenceEntry::new(i.name, i.index, i.weights))
                    .collect(),
            },
        }
    }
}

/// Encode a document as compact JSON.
pub fn encode(doc: &ExportDocument) -> Result<Vec<u8>, CodecError> {
    doc.snapshot.check()?;
    Ok(serde_json::to_vec(&WireDocument::from(doc))?)
}

/// Encode a document as indented JSON. Decodes identically to [`encode`].
pub fn encode_pretty(doc: &ExportDocument) -> Result<Vec<u8>, CodecError> {
    doc.snapshot.check()?;
    Ok(serde_json::to_vec_pretty(&WireDocument::from(doc))?)
}

/// Decode a document.
///
/// Unknown fields are ignored. Missing fields, a missing `"<index>"` weight
/// array, weight arrays whose length disagrees with `vtx`, and repeated
/// influence names are all errors.
pub fn decode(bytes: &[u8]) -> Result<ExportDocument, CodecError> {
    let wire: WireDocument = serde_json::from_slice(bytes)?;
    let doc = ExportDocument::from(wire);
    doc.snapshot.check()?;
    Ok(doc)
}

/// Header fields of a document, read without materializing the weights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub meta: Metadata,
    pub binding_id: String,
    pub target_surface_id: String,
    pub vertex_count: usize,
    pub influence_names: Vec<String>,
}

#[derive(Deserialize)]
struct SummaryDocument {
    #[serde(rename = "User Info")]
    user_info: WireUserInfo,
    #[serde(rename = "Deformer Info")]
    deformer_info: SummaryDeformerInfo,
}

#[derive(Deserialize)]
struct SummaryDeformerInfo {
    cluster: String,
    mesh: String,
    vtx: Vec<IgnoredAny>,
    inf: Vec<SummaryInfluence>,
}

#[derive(Deserialize)]
struct SummaryInfluence {
    name: String,
}

/// Decode only the metadata and binding header of a document.
pub fn decode_summary(bytes: &[u8]) -> Result<DocumentSummary, CodecError> {
    let doc: SummaryDocument = serde_json::from_slice(bytes)?;
    let info = doc.deformer_info;
    Ok(DocumentSummary {
        meta: Metadata {
            creator: doc.user_info.user,
            created_at: doc.user_info.created,
            platform_version: doc.user_info.platform,
        },
        binding_id: info.cluster,
        target_surface_id: info.mesh,
        vertex_count: info.vtx.len(),
        influence_names: info.inf.into_iter().map(|i| i.name).collect(),
    })
}
