//! Isolation Forest
//!
//! Evaluator for an isolation forest trained offline and exported as JSON.
//! Scores follow the scikit-learn convention:
//!
//! ```text
//! score_samples(x)     = -2^(-E[h(x)] / c(max_samples))
//! decision_function(x) = score_samples(x) - offset
//! ```
//!
//! `decision_function` is negative for outliers and positive for inliers,
//! with 0 at the contamination boundary.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Euler–Mascheroni constant
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeNode {
    /// Internal split: `x[feature] <= threshold` goes left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node holding `samples` training points
    Leaf { samples: u64 },
}

/// Single isolation tree (node 0 is the root)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationTree {
    pub nodes: Vec<TreeNode>,
}

impl IsolationTree {
    /// Path length of `sample`, including the average-path correction at the leaf
    pub fn path_length(&self, sample: &[f64]) -> f64 {
        let mut index = 0;
        let mut depth = 0.0;

        loop {
            match &self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if sample[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                    depth += 1.0;
                }
                TreeNode::Leaf { samples } => {
                    return depth + average_path_length(*samples);
                }
            }
        }
    }

    /// Children must point strictly forward so traversal always terminates
    fn validate(&self, tree_index: usize, n_features: usize) -> CoreResult<()> {
        if self.nodes.is_empty() {
            return Err(CoreError::invalid_artifact(format!(
                "tree {} has no nodes",
                tree_index
            )));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= n_features {
                    return Err(CoreError::invalid_artifact(format!(
                        "tree {} node {} splits on feature {} (model has {})",
                        tree_index, i, feature, n_features
                    )));
                }
                if !threshold.is_finite() {
                    return Err(CoreError::invalid_artifact(format!(
                        "tree {} node {} has a non-finite threshold",
                        tree_index, i
                    )));
                }
                for child in [*left, *right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(CoreError::invalid_artifact(format!(
                            "tree {} node {} has invalid child {}",
                            tree_index, i, child
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Average path length of an unsuccessful BST search over `n` points, c(n)
pub fn average_path_length(n: u64) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Frozen isolation forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForest {
    /// Artifact version label
    #[serde(default = "default_version")]
    pub version: String,
    /// Number of input features
    pub n_features: usize,
    /// Sub-sample size each tree was grown on
    pub max_samples: u64,
    /// Decision offset (sklearn `offset_`)
    pub offset: f64,
    /// Trees
    pub trees: Vec<IsolationTree>,
}

fn default_version() -> String {
    "unversioned".to_string()
}

impl IsolationForest {
    /// Check artifact consistency
    pub fn validate(&self) -> CoreResult<()> {
        if self.n_features == 0 {
            return Err(CoreError::invalid_artifact("model has no features"));
        }
        if self.trees.is_empty() {
            return Err(CoreError::invalid_artifact("model has no trees"));
        }
        if self.max_samples < 2 {
            return Err(CoreError::invalid_artifact("max_samples must be at least 2"));
        }
        if !self.offset.is_finite() {
            return Err(CoreError::invalid_artifact("offset is not finite"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, self.n_features)?;
        }
        Ok(())
    }

    /// `-2^(-E[h(x)] / c(max_samples))`, in [-1, 0]
    pub fn score_sample(&self, sample: &[f64]) -> CoreResult<f64> {
        if sample.len() != self.n_features {
            return Err(CoreError::FeatureDimension {
                expected: self.n_features,
                actual: sample.len(),
            });
        }

        let total: f64 = self.trees.iter().map(|t| t.path_length(sample)).sum();
        let mean_depth = total / self.trees.len() as f64;
        let normalizer = average_path_length(self.max_samples);

        Ok(-(2f64.powf(-mean_depth / normalizer)))
    }

    /// `score_sample - offset`; negative means anomalous
    pub fn decision_function(&self, sample: &[f64]) -> CoreResult<f64> {
        Ok(self.score_sample(sample)? - self.offset)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::threshold_forest;
    use super::*;

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // c(256) ≈ 10.24 (Liu et al.)
        assert!((average_path_length(256) - 10.2448).abs() < 1e-3);
    }

    #[test]
    fn test_isolated_point_scores_as_outlier() {
        let forest = threshold_forest();
        let outlier = forest.decision_function(&[9.0]).unwrap();
        let inlier = forest.decision_function(&[1.0]).unwrap();

        assert!(outlier < 0.0, "outlier decision was {}", outlier);
        assert!(inlier > 0.0, "inlier decision was {}", inlier);
        assert!(outlier < inlier);
    }

    #[test]
    fn test_score_sample_range() {
        let forest = threshold_forest();
        for x in [-100.0, 0.0, 5.0, 5.0001, 100.0] {
            let s = forest.score_sample(&[x]).unwrap();
            assert!((-1.0..=0.0).contains(&s));
        }
    }

    #[test]
    fn test_dimension_check() {
        let forest = threshold_forest();
        assert!(matches!(
            forest.score_sample(&[1.0, 2.0]),
            Err(CoreError::FeatureDimension { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let mut forest = threshold_forest();
        forest.trees[0].nodes[0] = TreeNode::Split {
            feature: 0,
            threshold: 1.0,
            left: 0,
            right: 2,
        };
        assert!(forest.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_feature() {
        let mut forest = threshold_forest();
        forest.trees[1].nodes[0] = TreeNode::Split {
            feature: 3,
            threshold: 1.0,
            left: 1,
            right: 2,
        };
        assert!(forest.validate().is_err());
    }

    #[test]
    fn test_json_artifact() {
        let json = r#"{
            "version": "iforest-2024-06",
            "n_features": 1,
            "max_samples": 256,
            "offset": -0.5,
            "trees": [{"nodes": [
                {"split": {"feature": 0, "threshold": 5.0, "left": 1, "right": 2}},
                {"leaf": {"samples": 255}},
                {"leaf": {"samples": 1}}
            ]}]
        }"#;
        let forest: IsolationForest = serde_json::from_str(json).unwrap();
        assert!(forest.validate().is_ok());
        assert_eq!(forest.version, "iforest-2024-06");
    }
}
