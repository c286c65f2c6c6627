//! Gradient boosted regression trees for binary classification
//!
//! Each stage fits a regression tree to the negative gradient of the logistic
//! loss, splitting on the Friedman MSE improvement, and sets leaf values with a
//! single Newton step. The ensemble output is a log-odds score.

use crate::error::ModelError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Frozen hyperparameters for the claim classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    /// Number of boosting stages
    pub n_estimators: usize,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Shrinkage applied to every tree
    pub learning_rate: f64,
    /// Fraction of rows drawn (without replacement) for each tree
    pub subsample: f64,
    /// Minimum rows needed to split a node
    pub min_samples_split: usize,
    /// Minimum rows on each side of a split
    pub min_samples_leaf: usize,
    /// Seed for row subsampling
    pub seed: u64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 300,
            max_depth: 6,
            learning_rate: 0.05,
            subsample: 0.8,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

impl BoostingParams {
    fn validate(&self) -> Result<(), ModelError> {
        if self.n_estimators == 0 {
            return Err(ModelError::InvalidParams("n_estimators must be positive".into()));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ModelError::InvalidParams("learning_rate must be positive".into()));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(ModelError::InvalidParams("subsample must be in (0, 1]".into()));
        }
        if self.min_samples_leaf == 0 {
            return Err(ModelError::InvalidParams("min_samples_leaf must be positive".into()));
        }
        Ok(())
    }
}

/// Tree node stored in a flat arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Rows with `x[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Regression tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return *value,
                None => return 0.0,
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }
}

/// Binary classifier built from boosted regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedClassifier {
    params: BoostingParams,
    n_features: usize,
    /// Prior log-odds of the positive class
    init_score: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoostedClassifier {
    /// Fit on a dense row-major feature matrix and 0/1 labels
    pub fn fit(x: &[Vec<f64>], y: &[u8], params: BoostingParams) -> Result<Self, ModelError> {
        params.validate()?;

        let n = x.len();
        if n == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if y.len() != n {
            return Err(ModelError::LabelCount {
                rows: n,
                labels: y.len(),
            });
        }
        let n_features = x[0].len();
        if let Some((row, found)) = x
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != n_features)
            .map(|(i, r)| (i, r.len()))
        {
            return Err(ModelError::RaggedRow {
                row,
                expected: n_features,
                found,
            });
        }

        let targets: Vec<f64> = y.iter().map(|&v| if v > 0 { 1.0 } else { 0.0 }).collect();
        let positives = targets.iter().filter(|&&t| t > 0.0).count();
        if positives == 0 || positives == n {
            return Err(ModelError::SingleClass {
                positives,
                total: n,
            });
        }

        let prior = positives as f64 / n as f64;
        let init_score = (prior / (1.0 - prior)).ln();

        let mut raw = vec![init_score; n];
        let mut gradients = vec![0.0; n];
        let mut hessians = vec![0.0; n];
        let mut trees = Vec::with_capacity(params.n_estimators);
        let mut rng = StdRng::seed_from_u64(params.seed);
        let in_bag = ((params.subsample * n as f64) as usize).clamp(1, n);

        for _ in 0..params.n_estimators {
            for i in 0..n {
                let p = sigmoid(raw[i]);
                gradients[i] = targets[i] - p;
                hessians[i] = p * (1.0 - p);
            }

            let mut rows: Vec<usize> = if in_bag < n {
                rand::seq::index::sample(&mut rng, n, in_bag).into_vec()
            } else {
                (0..n).collect()
            };
            rows.sort_unstable();

            let tree = TreeBuilder {
                x,
                gradients: &gradients,
                hessians: &hessians,
                params: &params,
                nodes: Vec::new(),
            }
            .build(&mut rows);

            for (score, row) in raw.iter_mut().zip(x) {
                *score += params.learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        Ok(Self {
            params,
            n_features,
            init_score,
            trees,
        })
    }

    /// Raw log-odds score for one row
    pub fn decision_function(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureCount {
                expected: self.n_features,
                found: row.len(),
            });
        }
        let boost: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        Ok(self.init_score + self.params.learning_rate * boost)
    }

    /// Probability of the positive (fraud) class
    pub fn predict_proba(&self, row: &[f64]) -> Result<f64, ModelError> {
        Ok(sigmoid(self.decision_function(row)?).clamp(0.0, 1.0))
    }

    /// Hard 0/1 prediction at the 0.5 probability threshold
    pub fn predict(&self, row: &[f64]) -> Result<u8, ModelError> {
        Ok(u8::from(self.predict_proba(row)? > 0.5))
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn params(&self) -> &BoostingParams {
        &self.params
    }

    pub fn init_score(&self) -> f64 {
        self.init_score
    }
}

/// Numerically stable logistic function
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    improvement: f64,
}

/// Grows one tree over a subset of rows
struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    gradients: &'a [f64],
    hessians: &'a [f64],
    params: &'a BoostingParams,
    nodes: Vec<TreeNode>,
}

impl TreeBuilder<'_> {
    fn build(mut self, rows: &mut [usize]) -> RegressionTree {
        self.grow(rows, 0);
        RegressionTree { nodes: self.nodes }
    }

    fn grow(&mut self, rows: &mut [usize], depth: usize) -> usize {
        let id = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { value: 0.0 });

        if depth < self.params.max_depth && rows.len() >= self.params.min_samples_split {
            if let Some(split) = self.best_split(rows) {
                let mid = self.partition(rows, split.feature, split.threshold);
                let (left_rows, right_rows) = rows.split_at_mut(mid);
                let left = self.grow(left_rows, depth + 1);
                let right = self.grow(right_rows, depth + 1);
                self.nodes[id] = TreeNode::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left,
                    right,
                };
                return id;
            }
        }

        self.nodes[id] = TreeNode::Leaf {
            value: self.newton_value(rows),
        };
        id
    }

    /// Best split by Friedman MSE improvement; `None` when no split helps
    fn best_split(&self, rows: &[usize]) -> Option<SplitCandidate> {
        let n = rows.len();
        let min_leaf = self.params.min_samples_leaf;
        if n < 2 * min_leaf {
            return None;
        }

        let total: f64 = rows.iter().map(|&r| self.gradients[r]).sum();
        let mut best: Option<SplitCandidate> = None;
        let mut sorted = rows.to_vec();

        for feature in 0..self.x[rows[0]].len() {
            sorted.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left_sum = 0.0;
            for k in 0..n - 1 {
                left_sum += self.gradients[sorted[k]];
                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let current = self.x[sorted[k]][feature];
                let next = self.x[sorted[k + 1]][feature];
                if current >= next {
                    continue;
                }

                let mean_left = left_sum / n_left as f64;
                let mean_right = (total - left_sum) / n_right as f64;
                let diff = mean_left - mean_right;
                let improvement = (n_left * n_right) as f64 / n as f64 * diff * diff;

                if improvement > best.as_ref().map_or(1e-12, |b| b.improvement) {
                    let mut threshold = current + (next - current) / 2.0;
                    if threshold >= next || !threshold.is_finite() {
                        threshold = current;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        improvement,
                    });
                }
            }
        }

        best
    }

    /// Move rows going left to the front; returns the left count
    fn partition(&self, rows: &mut [usize], feature: usize, threshold: f64) -> usize {
        let (left, right): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&r| self.x[r][feature] <= threshold);
        rows[..left.len()].copy_from_slice(&left);
        rows[left.len()..].copy_from_slice(&right);
        left.len()
    }

    /// Single Newton step for the logistic loss
    fn newton_value(&self, rows: &[usize]) -> f64 {
        let numerator: f64 = rows.iter().map(|&r| self.gradients[r]).sum();
        let denominator: f64 = rows.iter().map(|&r| self.hessians[r]).sum();
        if denominator.abs() < 1e-150 {
            0.0
        } else {
            numerator / denominator
        }
    }
}
