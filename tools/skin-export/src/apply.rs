//! Weight write-back (snapshot -> live binding)
//!
//! Target influences are paired with snapshot entries by name. The two
//! bindings may list the same influences in different orders, so
//! `source_index` is never used for matching.

use hashbrown::HashMap;

use crate::error::{ApplyError, HostError};
use crate::host::SkinHost;
use crate::model::{BindingSnapshot, InfluenceEntry};

/// Summary of a completed apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyReport {
    pub influences: usize,
    pub writes: usize,
}

/// Write `snapshot`'s weights onto `target_binding_id`.
///
/// The snapshot's own invariants are checked and every target influence is
/// matched before anything is written, so either failure leaves the target
/// untouched. If a host write fails partway, the weights read before the
/// first write are restored.
pub fn apply<H: SkinHost + ?Sized>(
    host: &mut H,
    target_binding_id: &str,
    snapshot: &BindingSnapshot,
) -> Result<ApplyReport, ApplyError> {
    snapshot.check()?;

    let target = host
        .resolve_binding(target_binding_id)
        .ok_or_else(|| ApplyError::BindingNotFound(target_binding_id.to_string()))?;

    if target.vertex_count != snapshot.vertex_count {
        return Err(ApplyError::VertexCountMismatch {
            expected: snapshot.vertex_count,
            found: target.vertex_count,
        });
    }

    let by_name: HashMap<&str, &InfluenceEntry> = snapshot
        .influences
        .iter()
        .map(|e| (e.name.as_str(), e))
        .collect();

    let plan = target
        .influence_names
        .iter()
        .map(|name| {
            by_name
                .get(name.as_str())
                .map(|entry| (name.as_str(), *entry))
                .ok_or_else(|| ApplyError::InfluenceNotMatched(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let previous = plan
        .iter()
        .map(|(name, _)| host.query_weights(target_binding_id, name, target.vertex_count))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| ApplyError::Host {
            source,
            rolled_back: true,
        })?;

    let mut writes = 0;
    for (name, entry) in &plan {
        for (vertex, &value) in entry.weights.iter().enumerate() {
            if let Err(source) = host.set_weight(target_binding_id, name, vertex, value) {
                let rolled_back = restore(host, target_binding_id, &plan, &previous);
                return Err(ApplyError::Host {
                    source,
                    rolled_back,
                });
            }
            writes += 1;
        }
        tracing::debug!("Applied '{}' to '{}'", name, target_binding_id);
    }

    Ok(ApplyReport {
        influences: plan.len(),
        writes,
    })
}

/// Put back the weights read before applying. Returns false if any restore
/// write also failed.
fn restore<H: SkinHost + ?Sized>(
    host: &mut H,
    binding_id: &str,
    plan: &[(&str, &InfluenceEntry)],
    previous: &[Vec<f64>],
) -> bool {
    let mut failed: Option<HostError> = None;
    for ((name, _), weights) in plan.iter().zip(previous) {
        for (vertex, &value) in weights.iter().enumerate() {
            if let Err(e) = host.set_weight(binding_id, name, vertex, value) {
                failed.get_or_insert(e);
            }
        }
    }

    match failed {
        Some(e) => {
            tracing::error!("Failed to restore weights on '{}': {}", binding_id, e);
            false
        }
        None => {
            tracing::warn!("Restored previous weights on '{}'", binding_id);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnapshotError;
    use crate::host::BindingInfo;
    use crate::scene::SceneFile;
    use std::path::PathBuf;

    fn snapshot(influences: Vec<(&str, Vec<f64>)>) -> BindingSnapshot {
        let vertex_count = influences.first().map(|(_, w)| w.len()).unwrap_or(0);
        BindingSnapshot {
            binding_id: "source".to_string(),
            target_surface_id: "|body".to_string(),
            vertex_count,
            influences: influences
                .into_iter()
                .enumerate()
                .map(|(i, (n, w))| InfluenceEntry::new(n, i, w))
                .collect(),
        }
    }

    fn target_scene(names: &[&str], vertex_count: usize) -> SceneFile {
        let mut scene = SceneFile::new("/proj", "2024");
        scene.add_binding(
            "target",
            "|body",
            names
                .iter()
                .map(|n| (n.to_string(), vec![0.5; vertex_count]))
                .collect(),
        );
        scene
    }

    #[test]
    fn test_apply_matches_by_name() {
        let snap = snapshot(vec![("jntA", vec![1.0, 0.0]), ("jntB", vec![0.0, 1.0])]);
        let mut scene = target_scene(&["jntB", "jntA"], 2);

        let report = apply(&mut scene, "target", &snap).unwrap();
        assert_eq!(report, ApplyReport { influences: 2, writes: 4 });

        assert_eq!(scene.query_weight("target", "jntA", 0), Ok(1.0));
        assert_eq!(scene.query_weight("target", "jntA", 1), Ok(0.0));
        assert_eq!(scene.query_weight("target", "jntB", 0), Ok(0.0));
        assert_eq!(scene.query_weight("target", "jntB", 1), Ok(1.0));
    }

    #[test]
    fn test_apply_unmatched_influence_writes_nothing() {
        let snap = snapshot(vec![("jntA", vec![1.0]), ("jntA2", vec![0.0])]);
        let mut scene = target_scene(&["jntA", "jntC"], 1);

        let err = apply(&mut scene, "target", &snap).unwrap_err();
        assert!(matches!(err, ApplyError::InfluenceNotMatched(ref n) if n == "jntC"));
        assert_eq!(scene.query_weight("target", "jntA", 0), Ok(0.5));
    }

    #[test]
    fn test_apply_rejects_vertex_mismatch() {
        let snap = snapshot(vec![("jntA", vec![1.0; 10])]);
        let mut scene = target_scene(&["jntA"], 12);

        assert!(matches!(
            apply(&mut scene, "target", &snap),
            Err(ApplyError::VertexCountMismatch {
                expected: 10,
                found: 12
            })
        ));
    }

    #[test]
    fn test_apply_short_weight_array_writes_nothing() {
        let mut snap = snapshot(vec![("jntA", vec![1.0])]);
        snap.vertex_count = 3;
        let mut scene = target_scene(&["jntA"], 3);

        let err = apply(&mut scene, "target", &snap).unwrap_err();
        assert!(matches!(
            err,
            ApplyError::Snapshot(SnapshotError::WeightCountMismatch {
                expected: 3,
                found: 1,
                ..
            })
        ));
        assert_eq!(scene.query_weights("target", "jntA", 3).unwrap(), vec![0.5; 3]);
    }

    #[test]
    fn test_apply_missing_target() {
        let snap = snapshot(vec![("jntA", vec![1.0])]);
        let mut scene = target_scene(&["jntA"], 1);
        assert!(matches!(
            apply(&mut scene, "nope", &snap),
            Err(ApplyError::BindingNotFound(_))
        ));
    }

    /// Host that refuses writes after a fixed number have succeeded
    struct FlakyHost {
        inner: SceneFile,
        writes_left: usize,
        failing: bool,
    }

    impl SkinHost for FlakyHost {
        fn list_bindings(&self) -> Vec<String> {
            self.inner.list_bindings()
        }

        fn resolve_binding(&self, binding_id: &str) -> Option<BindingInfo> {
            self.inner.resolve_binding(binding_id)
        }

        fn query_weight(
            &self,
            binding_id: &str,
            influence: &str,
            vertex: usize,
        ) -> Result<f64, HostError> {
            self.inner.query_weight(binding_id, influence, vertex)
        }

        fn set_weight(
            &mut self,
            binding_id: &str,
            influence: &str,
            vertex: usize,
            value: f64,
        ) -> Result<(), HostError> {
            if self.failing {
                if self.writes_left == 0 {
                    self.failing = false;
                    return Err(HostError::WriteRefused("locked".to_string()));
                }
                self.writes_left -= 1;
            }
            self.inner.set_weight(binding_id, influence, vertex, value)
        }

        fn project_root(&self) -> PathBuf {
            self.inner.project_root()
        }

        fn platform_version(&self) -> String {
            self.inner.platform_version()
        }
    }

    #[test]
    fn test_apply_rolls_back_on_write_failure() {
        let snap = snapshot(vec![("jntA", vec![1.0, 1.0]), ("jntB", vec![0.0, 0.0])]);
        let mut host = FlakyHost {
            inner: target_scene(&["jntA", "jntB"], 2),
            writes_left: 3,
            failing: true,
        };

        let err = apply(&mut host, "target", &snap).unwrap_err();
        assert!(matches!(
            err,
            ApplyError::Host {
                rolled_back: true,
                ..
            }
        ));
        for name in ["jntA", "jntB"] {
            for v in 0..2 {
                assert_eq!(host.inner.query_weight("target", name, v), Ok(0.5));
            }
        }
    }
}
