//! Least-squares gradient boosted regression trees
//!
//! Each boosting round fits a shallow CART regression tree to the current
//! residuals on a seeded row subsample and adds it with shrinkage. The same
//! data and seed always produce the same ensemble.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

/// Upper bound on boosting rounds
pub const MAX_TREES: usize = 100;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GbmError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("empty dataset")]
    EmptyDataset,

    #[error("row {row} has {got} features, expected {expected}")]
    DimensionMismatch { row: usize, got: usize, expected: usize },

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}

/// Boosting hyperparameters
#[derive(Debug, Clone, PartialEq)]
pub struct GbmParams {
    /// Number of boosting rounds (trees)
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// Shrinkage applied to every tree
    pub learning_rate: f64,
    /// Fraction of rows sampled per round
    pub subsample: f64,
    /// Minimum samples in a leaf
    pub min_samples_leaf: usize,
    /// Seed for row subsampling
    pub seed: u64,
}

impl Default for GbmParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 3,
            learning_rate: 0.05,
            subsample: 0.8,
            min_samples_leaf: 5,
            seed: 42,
        }
    }
}

impl GbmParams {
    pub fn validate(&self) -> Result<(), GbmError> {
        if self.n_trees == 0 || self.n_trees > MAX_TREES {
            return Err(GbmError::InvalidParams(format!(
                "n_trees must be in 1..={}, got {}",
                MAX_TREES, self.n_trees
            )));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(GbmError::InvalidParams(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(GbmError::InvalidParams(format!(
                "subsample must be in (0, 1], got {}",
                self.subsample
            )));
        }
        if self.max_depth == 0 || self.min_samples_leaf == 0 {
            return Err(GbmError::InvalidParams(
                "max_depth and min_samples_leaf must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f64]) -> f64 {
        match self {
            Node::Leaf(value) => *value,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Single CART regression tree fitted on squared error
#[derive(Debug, Clone)]
struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    fn fit(x: &[Vec<f64>], y: &[f64], indices: &[usize], max_depth: usize, min_leaf: usize) -> Self {
        Self {
            root: build_node(x, y, indices, 0, max_depth, min_leaf),
        }
    }

    fn predict(&self, row: &[f64]) -> f64 {
        self.root.predict(row)
    }
}

fn build_node(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    depth: usize,
    max_depth: usize,
    min_leaf: usize,
) -> Node {
    let leaf_value = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;

    if depth >= max_depth || indices.len() < 2 * min_leaf {
        return Node::Leaf(leaf_value);
    }

    let Some(split) = best_split(x, y, indices, min_leaf) else {
        return Node::Leaf(leaf_value);
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x[i][split.feature] <= split.threshold);

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(build_node(x, y, &left, depth + 1, max_depth, min_leaf)),
        right: Box::new(build_node(x, y, &right, depth + 1, max_depth, min_leaf)),
    }
}

struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Split maximising the reduction in squared error. Ties keep the first
/// candidate in (feature, threshold) order.
fn best_split(x: &[Vec<f64>], y: &[f64], indices: &[usize], min_leaf: usize) -> Option<Split> {
    let n = indices.len();
    let n_features = x[indices[0]].len();
    let total: f64 = indices.iter().map(|&i| y[i]).sum();
    let parent_score = total * total / n as f64;

    let mut best: Option<Split> = None;
    let mut sorted = indices.to_vec();

    for feature in 0..n_features {
        sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]).then(a.cmp(&b)));

        let mut left_sum = 0.0;
        for k in 0..n - 1 {
            left_sum += y[sorted[k]];
            let n_left = k + 1;
            let n_right = n - n_left;
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let here = x[sorted[k]][feature];
            let next = x[sorted[k + 1]][feature];
            if here >= next {
                continue;
            }

            let right_sum = total - left_sum;
            let gain = left_sum * left_sum / n_left as f64
                + right_sum * right_sum / n_right as f64
                - parent_score;

            if gain > 1e-15 && best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(Split {
                    feature,
                    threshold: here + (next - here) / 2.0,
                    gain,
                });
            }
        }
    }

    best
}

/// Fitted boosted ensemble
#[derive(Debug, Clone)]
pub struct GradientBoostingRegressor {
    params: GbmParams,
    base_prediction: f64,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl GradientBoostingRegressor {
    /// Fit a fresh ensemble on `x` (rows of equal width) against `y`
    pub fn fit(params: GbmParams, x: &[Vec<f64>], y: &[f64]) -> Result<Self, GbmError> {
        params.validate()?;

        if x.is_empty() || x.len() != y.len() {
            return Err(GbmError::EmptyDataset);
        }
        let n_features = x[0].len();
        for (row, values) in x.iter().enumerate() {
            if values.len() != n_features {
                return Err(GbmError::DimensionMismatch {
                    row,
                    got: values.len(),
                    expected: n_features,
                });
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(GbmError::NonFinite("features"));
            }
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(GbmError::NonFinite("targets"));
        }

        let n = x.len();
        let base_prediction = y.iter().sum::<f64>() / n as f64;
        let mut current = vec![base_prediction; n];
        let mut residuals = vec![0.0; n];
        let mut rng = StdRng::seed_from_u64(params.seed);
        let sample_size = ((n as f64 * params.subsample).round() as usize).clamp(1, n);
        let mut order: Vec<usize> = (0..n).collect();
        let mut trees = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            for i in 0..n {
                residuals[i] = y[i] - current[i];
            }

            order.shuffle(&mut rng);
            let mut sample = order[..sample_size].to_vec();
            sample.sort_unstable();

            let tree = RegressionTree::fit(x, &residuals, &sample, params.max_depth, params.min_samples_leaf);
            for i in 0..n {
                current[i] += params.learning_rate * tree.predict(&x[i]);
            }
            trees.push(tree);
        }

        Ok(Self {
            params,
            base_prediction,
            n_features,
            trees,
        })
    }

    pub fn predict(&self, row: &[f64]) -> Result<f64, GbmError> {
        if row.len() != self.n_features {
            return Err(GbmError::DimensionMismatch {
                row: 0,
                got: row.len(),
                expected: self.n_features,
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(GbmError::NonFinite("prediction input"));
        }

        let boost: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        Ok(self.base_prediction + self.params.learning_rate * boost)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn max_tree_depth(&self) -> usize {
        self.trees.iter().map(|t| t.root.depth()).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_dataset() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..100).map(|i| vec![i as f64, (i % 7) as f64]).collect();
        let y: Vec<f64> = (0..100).map(|i| if i < 50 { -1.0 } else { 1.0 }).collect();
        (x, y)
    }

    #[test]
    fn test_learns_step_function() {
        let (x, y) = step_dataset();
        let model = GradientBoostingRegressor::fit(GbmParams::default(), &x, &y).unwrap();

        assert!(model.predict(&[10.0, 3.0]).unwrap() < -0.5);
        assert!(model.predict(&[90.0, 3.0]).unwrap() > 0.5);
    }

    #[test]
    fn test_same_seed_same_model() {
        let (x, y) = step_dataset();
        let a = GradientBoostingRegressor::fit(GbmParams::default(), &x, &y).unwrap();
        let b = GradientBoostingRegressor::fit(GbmParams::default(), &x, &y).unwrap();

        for probe in [[5.0, 1.0], [49.5, 2.0], [77.0, 6.0]] {
            assert_eq!(a.predict(&probe).unwrap(), b.predict(&probe).unwrap());
        }
    }

    #[test]
    fn test_respects_complexity_bounds() {
        let (x, y) = step_dataset();
        let params = GbmParams {
            n_trees: 20,
            max_depth: 2,
            ..Default::default()
        };
        let model = GradientBoostingRegressor::fit(params, &x, &y).unwrap();
        assert_eq!(model.n_trees(), 20);
        assert!(model.max_tree_depth() <= 2);
    }

    #[test]
    fn test_constant_target_predicts_constant() {
        let x: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64]).collect();
        let y = vec![0.25; 30];
        let model = GradientBoostingRegressor::fit(GbmParams::default(), &x, &y).unwrap();
        assert!((model.predict(&[12.0]).unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_invalid_params() {
        let (x, y) = step_dataset();
        for params in [
            GbmParams { n_trees: 0, ..Default::default() },
            GbmParams { n_trees: 101, ..Default::default() },
            GbmParams { learning_rate: 0.0, ..Default::default() },
            GbmParams { subsample: 1.5, ..Default::default() },
        ] {
            assert!(matches!(
                GradientBoostingRegressor::fit(params, &x, &y),
                Err(GbmError::InvalidParams(_))
            ));
        }
    }

    #[test]
    fn test_rejects_bad_data() {
        assert_eq!(
            GradientBoostingRegressor::fit(GbmParams::default(), &[], &[]).unwrap_err(),
            GbmError::EmptyDataset
        );

        let x = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(
            GradientBoostingRegressor::fit(GbmParams::default(), &x, &[0.0, 1.0]),
            Err(GbmError::DimensionMismatch { row: 1, .. })
        ));

        let x = vec![vec![1.0], vec![2.0]];
        assert_eq!(
            GradientBoostingRegressor::fit(GbmParams::default(), &x, &[0.0, f64::NAN]).unwrap_err(),
            GbmError::NonFinite("targets")
        );
    }

    #[test]
    fn test_predict_checks_width() {
        let (x, y) = step_dataset();
        let model = GradientBoostingRegressor::fit(GbmParams::default(), &x, &y).unwrap();
        assert!(model.predict(&[1.0]).is_err());
    }
}
