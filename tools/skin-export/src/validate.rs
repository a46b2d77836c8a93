//! Pre-import compatibility checks
//!
//! Nothing here touches the target binding; every check runs before the
//! first weight is written.

use crate::error::ValidationError;
use crate::host::BindingInfo;
use crate::model::BindingSnapshot;

/// Order-independent, duplicate-aware comparison of two influence lists.
///
/// Each name in `expected` must consume exactly one occurrence in `actual`
/// and nothing may be left over, so `[a, a, b]` and `[a, b, b]` differ even
/// though their sets are equal.
pub fn compare_influence_sets<A, B>(expected: &[A], actual: &[B]) -> bool
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    if expected.len() != actual.len() {
        return false;
    }

    let mut unmatched: Vec<&str> = actual.iter().map(AsRef::as_ref).collect();
    for name in expected {
        match unmatched.iter().position(|u| *u == name.as_ref()) {
            Some(pos) => {
                unmatched.swap_remove(pos);
            }
            None => return false,
        }
    }
    unmatched.is_empty()
}

pub fn validate_vertex_count(snapshot: &BindingSnapshot, target_vertex_count: usize) -> bool {
    snapshot.vertex_count == target_vertex_count
}

/// Check that `snapshot` can be applied to `target`.
///
/// Vertex count is checked first; the first failing check is returned.
pub fn validate_import(
    snapshot: &BindingSnapshot,
    target: &BindingInfo,
) -> Result<(), ValidationError> {
    if !validate_vertex_count(snapshot, target.vertex_count) {
        return Err(ValidationError::VertexCountMismatch {
            expected: snapshot.vertex_count,
            found: target.vertex_count,
        });
    }

    let names: Vec<&str> = snapshot.influence_names().collect();
    if !compare_influence_sets(&names, &target.influence_names) {
        let (missing, unexpected) = influence_difference(&names, &target.influence_names);
        return Err(ValidationError::InfluenceSetMismatch {
            missing,
            unexpected,
        });
    }

    Ok(())
}

/// Multiset difference for error reporting: names in the file with no
/// counterpart on the target, and target names the file does not cover.
fn influence_difference(file: &[&str], target: &[String]) -> (Vec<String>, Vec<String>) {
    let mut remaining: Vec<&str> = target.iter().map(String::as_str).collect();
    let mut missing = Vec::new();
    for name in file {
        match remaining.iter().position(|r| r == name) {
            Some(pos) => {
                remaining.remove(pos);
            }
            None => missing.push(name.to_string()),
        }
    }
    (missing, remaining.into_iter().map(str::to_string).collect())
}

/// Opt-in check that each vertex's weights sum to 1.0 within `tolerance`.
///
/// Not part of [`validate_import`]; weights are allowed to be unnormalized.
pub fn check_normalized(snapshot: &BindingSnapshot, tolerance: f64) -> Result<(), ValidationError> {
    snapshot.check()?;
    if snapshot.influences.is_empty() {
        return Ok(());
    }
    for vertex in 0..snapshot.vertex_count {
        let sum: f64 = snapshot.influences.iter().map(|e| e.weights[vertex]).sum();
        if (sum - 1.0).abs() > tolerance {
            return Err(ValidationError::WeightsNotNormalized { vertex, sum });
        }
    }
    Ok(())
}
