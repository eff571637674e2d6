//! Scalar regression functions fitted offline.
//!
//! Two artifact kinds are understood:
//! - `gradient_boosted_trees`: a JSON tree dump as written by gradient-boosting libraries
//!   (`nodeid`, `split: "f<idx>"`, `split_condition`, `yes`/`no`/`missing`, `children`, `leaf`).
//!   A sample goes to `yes` when `value < split_condition`, and to `missing` when it is NaN.
//! - `linear`: `bias + Σ weight·x`.

use std::collections::HashMap;
use std::fmt::Debug;

use serde::Deserialize;

use crate::bundle::BundleError;

/// A fitted scalar regression function over a fixed-width feature vector.
///
/// Carried in the bundle as `Box<dyn Regressor>` so tests can substitute their own.
pub trait Regressor: Send + Sync + Debug {
    /// Width of the feature vector the function was fitted on.
    fn n_features(&self) -> usize;

    /// Raw, unclamped prediction. Callers guarantee `features.len() == n_features()`.
    fn predict(&self, features: &[f64]) -> f64;
}

/// On-disk form of `match_model.json` / `ats_model.json`.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressorArtifact {
    GradientBoostedTrees {
        bundle_version: String,
        n_features: usize,
        #[serde(default)]
        base_score: f64,
        trees: Vec<DumpNode>,
    },
    Linear {
        bundle_version: String,
        n_features: usize,
        #[serde(default)]
        bias: f64,
        weights: Vec<f64>,
    },
}

impl RegressorArtifact {
    pub fn bundle_version(&self) -> &str {
        match self {
            RegressorArtifact::GradientBoostedTrees { bundle_version, .. }
            | RegressorArtifact::Linear { bundle_version, .. } => bundle_version,
        }
    }

    pub fn into_regressor(
        self,
        artifact: &'static str,
    ) -> Result<Box<dyn Regressor>, BundleError> {
        match self {
            RegressorArtifact::GradientBoostedTrees {
                n_features,
                base_score,
                trees,
                ..
            } => {
                let trees = trees
                    .into_iter()
                    .map(|root| Tree::compile(root, n_features))
                    .collect::<Result<Vec<_>, String>>()
                    .map_err(|reason| BundleError::Invalid { artifact, reason })?;
                Ok(Box::new(TreeEnsemble {
                    n_features,
                    base_score,
                    trees,
                }))
            }
            RegressorArtifact::Linear {
                n_features,
                bias,
                weights,
                ..
            } => {
                if weights.len() != n_features {
                    return Err(BundleError::Invalid {
                        artifact,
                        reason: format!(
                            "{} weights for {} features",
                            weights.len(),
                            n_features
                        ),
                    });
                }
                Ok(Box::new(LinearModel { bias, weights }))
            }
        }
    }
}

/// One node of a tree dump. Split nodes carry their children inline.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DumpNode {
    Split {
        nodeid: u32,
        split: String,
        split_condition: f64,
        yes: u32,
        no: u32,
        missing: u32,
        children: Vec<DumpNode>,
    },
    Leaf {
        nodeid: u32,
        leaf: f64,
    },
}

#[derive(Debug)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        yes: usize,
        no: usize,
        missing: usize,
    },
    Leaf(f64),
}

/// A single tree flattened into an arena; the root sits at index 0.
#[derive(Debug)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn compile(root: DumpNode, n_features: usize) -> Result<Self, String> {
        // First pass: assign arena slots in DFS order and remember each node's children.
        let mut flat: Vec<(DumpNode, Vec<u32>)> = Vec::new();
        let mut slots: HashMap<u32, usize> = HashMap::new();
        let mut stack = vec![root];

        while let Some(mut node) = stack.pop() {
            let (nodeid, children) = match &mut node {
                DumpNode::Split {
                    nodeid, children, ..
                } => (*nodeid, std::mem::take(children)),
                DumpNode::Leaf { nodeid, .. } => (*nodeid, Vec::new()),
            };
            if slots.insert(nodeid, flat.len()).is_some() {
                return Err(format!("duplicate nodeid {nodeid}"));
            }
            let child_ids = children.iter().map(DumpNode::nodeid).collect();
            flat.push((node, child_ids));
            stack.extend(children.into_iter().rev());
        }

        // Second pass: resolve node ids to slots. Branch targets must be direct children,
        // which keeps every walk finite.
        let nodes = flat
            .into_iter()
            .map(|(node, child_ids)| -> Result<Node, String> {
                match node {
                    DumpNode::Leaf { leaf, .. } => Ok(Node::Leaf(leaf)),
                    DumpNode::Split {
                        nodeid,
                        split,
                        split_condition,
                        yes,
                        no,
                        missing,
                        ..
                    } => {
                        let feature = parse_feature(&split)
                            .filter(|&f| f < n_features)
                            .ok_or_else(|| {
                                format!("node {nodeid}: bad split feature '{split}'")
                            })?;
                        let resolve = |target: u32| {
                            if !child_ids.contains(&target) {
                                return Err(format!("node {nodeid}: {target} is not a child"));
                            }
                            slots
                                .get(&target)
                                .copied()
                                .ok_or_else(|| format!("node {nodeid}: unknown child {target}"))
                        };
                        Ok(Node::Split {
                            feature,
                            threshold: split_condition,
                            yes: resolve(yes)?,
                            no: resolve(no)?,
                            missing: resolve(missing)?,
                        })
                    }
                }
            })
            .collect::<Result<Vec<_>, String>>()?;

        Ok(Self { nodes })
    }

    fn leaf_value(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    // Cut values are single-precision in the dump; compare at that width.
                    let x = features[feature];
                    index = if x.is_nan() {
                        missing
                    } else if (x as f32) < (threshold as f32) {
                        yes
                    } else {
                        no
                    };
                }
            }
        }
    }
}

impl DumpNode {
    fn nodeid(&self) -> u32 {
        match self {
            DumpNode::Split { nodeid, .. } | DumpNode::Leaf { nodeid, .. } => *nodeid,
        }
    }
}

/// Accepts `f12` (dump naming) or a bare `12`.
fn parse_feature(split: &str) -> Option<usize> {
    split.strip_prefix('f').unwrap_or(split).parse().ok()
}

#[derive(Debug)]
struct TreeEnsemble {
    n_features: usize,
    base_score: f64,
    trees: Vec<Tree>,
}

impl Regressor for TreeEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> f64 {
        self.base_score
            + self
                .trees
                .iter()
                .map(|tree| tree.leaf_value(features))
                .sum::<f64>()
    }
}

#[derive(Debug)]
struct LinearModel {
    bias: f64,
    weights: Vec<f64>,
}

impl Regressor for LinearModel {
    fn n_features(&self) -> usize {
        self.weights.len()
    }

    fn predict(&self, features: &[f64]) -> f64 {
        self.bias
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn load(value: serde_json::Value) -> Result<Box<dyn Regressor>, BundleError> {
        let artifact: RegressorArtifact = serde_json::from_value(value).unwrap();
        artifact.into_regressor("match_model")
    }

    fn stump(feature: &str, threshold: f64, left: f64, right: f64) -> serde_json::Value {
        json!({
            "nodeid": 0, "depth": 0, "split": feature, "split_condition": threshold,
            "yes": 1, "no": 2, "missing": 1,
            "children": [
                {"nodeid": 1, "leaf": left},
                {"nodeid": 2, "leaf": right}
            ]
        })
    }

    #[test]
    fn test_tree_ensemble_sums_leaves_over_base_score() {
        let model = load(json!({
            "kind": "gradient_boosted_trees",
            "bundle_version": "v1",
            "n_features": 3,
            "base_score": 50.0,
            "trees": [stump("f2", 0.5, -10.0, 20.0), stump("f0", 1.0, 1.5, -1.5)]
        }))
        .unwrap();

        assert_eq!(model.n_features(), 3);
        // f2 < 0.5 → -10, f0 >= 1.0 → -1.5
        assert_eq!(model.predict(&[2.0, 0.0, 0.1]), 38.5);
        // f2 >= 0.5 → 20, f0 < 1.0 → 1.5
        assert_eq!(model.predict(&[0.0, 0.0, 0.9]), 71.5);
    }

    #[test]
    fn test_split_threshold_is_strict_less_than() {
        let model = load(json!({
            "kind": "gradient_boosted_trees",
            "bundle_version": "v1",
            "n_features": 1,
            "trees": [stump("f0", 0.5, 1.0, 2.0)]
        }))
        .unwrap();
        assert_eq!(model.predict(&[0.5]), 2.0);
        assert_eq!(model.predict(&[0.4999]), 1.0);
    }

    #[test]
    fn test_split_compares_in_single_precision() {
        let ratio = 6.0_f64 / 11.0;
        let cut = ratio as f32 as f64;
        assert!(ratio < cut);
        let model = load(json!({
            "kind": "gradient_boosted_trees",
            "bundle_version": "v1",
            "n_features": 1,
            "trees": [stump("f0", cut, 10.0, 90.0)]
        }))
        .unwrap();
        assert_eq!(model.predict(&[ratio]), 90.0);
        assert_eq!(model.predict(&[5.0 / 11.0]), 10.0);
    }

    #[test]
    fn test_nan_follows_missing_branch() {
        let mut tree = stump("f0", 0.5, 1.0, 2.0);
        tree["missing"] = json!(2);
        let model = load(json!({
            "kind": "gradient_boosted_trees",
            "bundle_version": "v1",
            "n_features": 1,
            "trees": [tree]
        }))
        .unwrap();
        assert_eq!(model.predict(&[f64::NAN]), 2.0);
    }

    #[test]
    fn test_nested_tree() {
        let tree = json!({
            "nodeid": 0, "split": "f0", "split_condition": 5.0, "yes": 1, "no": 2, "missing": 1,
            "children": [
                {"nodeid": 1, "split": "f1", "split_condition": 0.3, "yes": 3, "no": 4, "missing": 3,
                 "children": [{"nodeid": 3, "leaf": 10.0}, {"nodeid": 4, "leaf": 40.0}]},
                {"nodeid": 2, "leaf": 90.0}
            ]
        });
        let model = load(json!({
            "kind": "gradient_boosted_trees",
            "bundle_version": "v1",
            "n_features": 2,
            "trees": [tree]
        }))
        .unwrap();
        assert_eq!(model.predict(&[1.0, 0.1]), 10.0);
        assert_eq!(model.predict(&[1.0, 0.9]), 40.0);
        assert_eq!(model.predict(&[7.0, 0.0]), 90.0);
    }

    #[test]
    fn test_split_feature_out_of_range_rejected() {
        let err = load(json!({
            "kind": "gradient_boosted_trees",
            "bundle_version": "v1",
            "n_features": 2,
            "trees": [stump("f7", 0.5, 1.0, 2.0)]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("bad split feature 'f7'"));
    }

    #[test]
    fn test_branch_to_non_child_rejected() {
        let mut tree = stump("f0", 0.5, 1.0, 2.0);
        tree["no"] = json!(0);
        let err = load(json!({
            "kind": "gradient_boosted_trees",
            "bundle_version": "v1",
            "n_features": 1,
            "trees": [tree]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("is not a child"));
    }

    #[test]
    fn test_linear_model() {
        let model = load(json!({
            "kind": "linear",
            "bundle_version": "v1",
            "n_features": 2,
            "bias": 5.0,
            "weights": [2.0, -1.0]
        }))
        .unwrap();
        assert_eq!(model.predict(&[10.0, 3.0]), 22.0);
    }

    #[test]
    fn test_linear_width_mismatch_rejected() {
        assert!(load(json!({
            "kind": "linear",
            "bundle_version": "v1",
            "n_features": 3,
            "weights": [1.0]
        }))
        .is_err());
    }
}
