use serde::{Deserialize, Serialize};

/// Growth limits for one regression tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth; `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it may split.
    pub min_samples_split: usize,
    /// Minimum samples each side of a split must keep.
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl TreeParams {
    /// Limits used by the boosted ensemble's shallow trees.
    #[must_use]
    pub const fn shallow(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// A CART-style regression tree splitting on squared-error reduction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode,
}

impl RegressionTree {
    /// Fits a tree on the rows selected by `indices`.
    ///
    /// `indices` may repeat entries (bootstrap samples).
    #[must_use]
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], indices: &[usize], params: TreeParams) -> Self {
        Self {
            root: build(rows, targets, indices.to_vec(), 0, params),
        }
    }

    /// Predicts the target for one feature row.
    #[must_use]
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

struct SplitChoice {
    feature: usize,
    threshold: f64,
    sse: f64,
}

fn build(
    rows: &[Vec<f64>],
    targets: &[f64],
    indices: Vec<usize>,
    depth: usize,
    params: TreeParams,
) -> TreeNode {
    if indices.is_empty() {
        return TreeNode::Leaf { value: 0.0 };
    }
    let count = indices.len() as f64;
    let sum: f64 = indices.iter().map(|&index| targets[index]).sum();
    let sum_squares: f64 = indices.iter().map(|&index| targets[index].powi(2)).sum();
    let node_sse = sum_squares - sum.powi(2) / count;
    let mean = sum / count;

    let depth_exhausted = params.max_depth.is_some_and(|limit| depth >= limit);
    if depth_exhausted || indices.len() < params.min_samples_split || node_sse <= 1e-12 {
        return TreeNode::Leaf { value: mean };
    }

    let Some(choice) = best_split(rows, targets, &indices, node_sse, params.min_samples_leaf)
    else {
        return TreeNode::Leaf { value: mean };
    };

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&index| rows[index][choice.feature] <= choice.threshold);

    TreeNode::Split {
        feature: choice.feature,
        threshold: choice.threshold,
        left: Box::new(build(rows, targets, left_indices, depth + 1, params)),
        right: Box::new(build(rows, targets, right_indices, depth + 1, params)),
    }
}

/// Scans every feature for the boundary with the lowest summed
/// left/right squared error. Returns `None` when no split both
/// respects `min_samples_leaf` and strictly improves on the node.
fn best_split(
    rows: &[Vec<f64>],
    targets: &[f64],
    indices: &[usize],
    node_sse: f64,
    min_samples_leaf: usize,
) -> Option<SplitChoice> {
    let width = rows[indices[0]].len();
    let total = indices.len();
    let total_sum: f64 = indices.iter().map(|&index| targets[index]).sum();
    let total_squares: f64 = indices.iter().map(|&index| targets[index].powi(2)).sum();

    let mut best: Option<SplitChoice> = None;
    for feature in 0..width {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

        let mut left_sum = 0.0;
        let mut left_squares = 0.0;
        for boundary in 1..total {
            let previous = order[boundary - 1];
            left_sum += targets[previous];
            left_squares += targets[previous].powi(2);

            let lower = rows[previous][feature];
            let upper = rows[order[boundary]][feature];
            if upper <= lower {
                continue;
            }
            if boundary < min_samples_leaf || total - boundary < min_samples_leaf {
                continue;
            }

            let left_count = boundary as f64;
            let right_count = (total - boundary) as f64;
            let right_sum = total_sum - left_sum;
            let right_squares = total_squares - left_squares;
            let sse = (left_squares - left_sum.powi(2) / left_count)
                + (right_squares - right_sum.powi(2) / right_count);

            if sse + 1e-12 < best.as_ref().map_or(node_sse, |choice| choice.sse) {
                // The midpoint of two adjacent floats can round up to
                // `upper`; fall back to `lower` so both sides stay
                // non-empty.
                let midpoint = (lower + upper) / 2.0;
                let threshold = if midpoint < upper { midpoint } else { lower };
                best = Some(SplitChoice {
                    feature,
                    threshold,
                    sse,
                });
            }
        }
    }
    best
}
