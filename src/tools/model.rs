//! Churn prediction model.
//!
//! A small random-forest classifier over the customer-360 numeric features.
//! The output the agent cares about is the ranked feature importances (mean
//! gini impurity decrease), not the fitted trees — the forest exists to name
//! the top churn drivers.
//!
//! Deterministic by construction: fixed seed, fixed tree count.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::dataset::{CustomerRecord, FEATURE_NAMES};
use super::errors::ToolError;

const N_TREES: usize = 50;
const MAX_DEPTH: usize = 3;
const MIN_SAMPLES_SPLIT: usize = 4;
const FEATURES_PER_SPLIT: usize = 3;
const SEED: u64 = 42;

/// Number of feature importances reported by the tool.
pub const TOP_FACTORS: usize = 5;

/// Train the forest and return feature importances, highest first.
///
/// Importances are normalized to sum to 1.0 across all features. Fails only
/// when the label column is single-class (nothing to split on).
pub fn train_churn_forest(
    records: &[CustomerRecord],
) -> Result<Vec<(String, f64)>, ToolError> {
    let data: Vec<[f64; 6]> = records.iter().map(|r| r.features()).collect();
    let labels: Vec<bool> = records.iter().map(|r| r.is_churned).collect();

    let churned = labels.iter().filter(|&&c| c).count();
    if churned == 0 || churned == labels.len() {
        return Err(ToolError::TrainingError {
            reason: format!(
                "label column is single-class ({churned} churned of {})",
                labels.len()
            ),
        });
    }

    let mut rng = StdRng::seed_from_u64(SEED);
    let mut importances = [0.0_f64; 6];
    let n = data.len();

    for _ in 0..N_TREES {
        // Bootstrap sample
        let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
        grow_tree(&data, &labels, &sample, 0, &mut rng, &mut importances);
    }

    let total: f64 = importances.iter().sum();
    if total <= 0.0 {
        return Err(ToolError::TrainingError {
            reason: "no informative splits found".to_string(),
        });
    }

    let mut ranked: Vec<(String, f64)> = FEATURE_NAMES
        .iter()
        .zip(importances.iter())
        .map(|(name, score)| (name.to_string(), score / total))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    tracing::info!(
        top_factor = %ranked[0].0,
        score = ranked[0].1,
        "churn forest trained"
    );

    Ok(ranked)
}

/// Recursively grow one tree, accumulating impurity decrease per feature.
fn grow_tree(
    data: &[[f64; 6]],
    labels: &[bool],
    indices: &[usize],
    depth: usize,
    rng: &mut StdRng,
    importances: &mut [f64; 6],
) {
    if depth >= MAX_DEPTH || indices.len() < MIN_SAMPLES_SPLIT {
        return;
    }

    let parent_gini = gini(labels, indices);
    if parent_gini == 0.0 {
        return; // pure node
    }

    let Some(split) = best_split(data, labels, indices, parent_gini, rng) else {
        return;
    };

    // Weight the gain by the fraction of samples reaching this node.
    importances[split.feature] += split.gain * indices.len() as f64 / data.len() as f64;

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| data[i][split.feature] <= split.threshold);
    grow_tree(data, labels, &left, depth + 1, rng, importances);
    grow_tree(data, labels, &right, depth + 1, rng, importances);
}

struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Pick the best gini split over a random feature subset.
fn best_split(
    data: &[[f64; 6]],
    labels: &[bool],
    indices: &[usize],
    parent_gini: f64,
    rng: &mut StdRng,
) -> Option<Split> {
    let mut candidates: Vec<usize> = (0..FEATURE_NAMES.len()).collect();
    // Fisher-Yates prefix shuffle to draw the feature subset
    for i in 0..FEATURES_PER_SPLIT {
        let j = rng.gen_range(i..candidates.len());
        candidates.swap(i, j);
    }

    let mut best: Option<Split> = None;
    for &feature in &candidates[..FEATURES_PER_SPLIT] {
        let mut values: Vec<f64> = indices.iter().map(|&i| data[i][feature]).collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        if values.len() < 2 {
            continue; // constant feature in this node
        }

        for window in values.windows(2) {
            let threshold = (window[0] + window[1]) / 2.0;
            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| data[i][feature] <= threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }
            let n = indices.len() as f64;
            let weighted = gini(labels, &left) * left.len() as f64 / n
                + gini(labels, &right) * right.len() as f64 / n;
            let gain = parent_gini - weighted;
            if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                best = Some(Split {
                    feature,
                    threshold,
                    gain,
                });
            }
        }
    }

    best
}

/// Gini impurity of the label subset at `indices`.
fn gini(labels: &[bool], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let churned = indices.iter().filter(|&&i| labels[i]).count() as f64;
    let p = churned / indices.len() as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
