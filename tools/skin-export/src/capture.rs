//! Weight capture (live binding -> snapshot)

use hashbrown::HashSet;

use crate::error::{CaptureError, HostError};
use crate::host::SkinHost;
use crate::model::{BindingSnapshot, InfluenceEntry};

/// Read every influence weight of `binding_id` into a snapshot.
///
/// Influences keep the binding's native order and record their position as
/// `source_index`. Every weight array is `vertex_count` long.
pub fn capture<H: SkinHost + ?Sized>(
    host: &H,
    binding_id: &str,
) -> Result<BindingSnapshot, CaptureError> {
    let info = host
        .resolve_binding(binding_id)
        .ok_or_else(|| CaptureError::BindingNotFound(binding_id.to_string()))?;

    let mut seen = HashSet::with_capacity(info.influence_names.len());
    let mut influences = Vec::with_capacity(info.influence_names.len());

    for (index, name) in info.influence_names.iter().enumerate() {
        if !seen.insert(name.as_str()) {
            return Err(CaptureError::DuplicateInfluence {
                binding: binding_id.to_string(),
                influence: name.clone(),
            });
        }

        let weights = host.query_weights(binding_id, name, info.vertex_count)?;
        if weights.len() != info.vertex_count {
            // A batched override returned the wrong length; treat as a bad read
            return Err(CaptureError::Host(HostError::VertexOutOfRange {
                binding: binding_id.to_string(),
                vertex: weights.len(),
                vertex_count: info.vertex_count,
            }));
        }
        influences.push(InfluenceEntry::new(name.clone(), index, weights));
    }

    tracing::debug!(
        "Captured '{}': {} vertices, {} influences",
        binding_id,
        info.vertex_count,
        influences.len()
    );

    Ok(BindingSnapshot {
        binding_id: binding_id.to_string(),
        target_surface_id: info.target_surface_id,
        vertex_count: info.vertex_count,
        influences,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneFile;

    fn scene() -> SceneFile {
        let mut scene = SceneFile::new("/proj", "2024");
        scene.add_binding(
            "skinCluster1",
            "|arm",
            vec![
                ("shoulder".to_string(), vec![1.0, 0.6, 0.2]),
                ("elbow".to_string(), vec![0.0, 0.4, 0.8]),
            ],
        );
        scene
    }

    #[test]
    fn test_capture_native_order() {
        let snap = capture(&scene(), "skinCluster1").unwrap();

        assert_eq!(snap.binding_id, "skinCluster1");
        assert_eq!(snap.target_surface_id, "|arm");
        assert_eq!(snap.vertex_count, 3);
        assert_eq!(snap.influences.len(), 2);
        assert_eq!(snap.influences[0].name, "shoulder");
        assert_eq!(snap.influences[0].source_index, 0);
        assert_eq!(snap.influences[1].name, "elbow");
        assert_eq!(snap.influences[1].source_index, 1);
        assert_eq!(snap.influences[1].weights, vec![0.0, 0.4, 0.8]);
        assert!(snap.check().is_ok());
    }

    #[test]
    fn test_capture_missing_binding() {
        let err = capture(&scene(), "skinCluster9").unwrap_err();
        assert!(matches!(err, CaptureError::BindingNotFound(id) if id == "skinCluster9"));
    }

    #[test]
    fn test_capture_empty_surface() {
        let mut scene = SceneFile::new("/proj", "2024");
        scene.add_binding("empty", "|nothing", vec![("root".to_string(), vec![])]);

        let snap = capture(&scene, "empty").unwrap();
        assert_eq!(snap.vertex_count, 0);
        assert!(snap.influences[0].weights.is_empty());
    }
}
