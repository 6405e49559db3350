use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::confidence::ModelWeights;
use crate::context::ModelCapabilities;
use crate::features::FeatureVector;
use crate::statistical::WinProbs;
use crate::variants::{self, ModelKind};

/// Everything one combination pass needs, snapshotted so the gather can
/// run off-thread without touching shared state.
#[derive(Debug, Clone, Copy)]
pub struct EnsembleInputs<'a> {
    pub features: &'a FeatureVector,
    pub base_probs: &'a WinProbs,
    pub base_total: f64,
    pub base_margin: f64,
    pub weights: &'a ModelWeights,
    pub capabilities: ModelCapabilities,
    /// Seed for the variants' jitter; one run draws all its jitter from
    /// per-source streams derived from this value.
    pub seed: u64,
}

/// Enabled variants in a fixed order, statistical always last.
fn included_sources(caps: ModelCapabilities) -> Vec<ModelKind> {
    let mut kinds = Vec::with_capacity(4);
    if caps.catboost {
        kinds.push(ModelKind::CatBoost);
    }
    if caps.xgboost {
        kinds.push(ModelKind::XgBoost);
    }
    if caps.lightgbm {
        kinds.push(ModelKind::LightGbm);
    }
    kinds.push(ModelKind::Statistical);
    kinds
}

fn source_rng(seed: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(index as u64))
}

/// Weighted-average win probabilities over the enabled sources. Any
/// gathering failure falls back wholesale to the statistical baseline.
pub fn win_probabilities(inputs: &EnsembleInputs<'_>) -> WinProbs {
    gather_win_probabilities(inputs).unwrap_or(*inputs.base_probs)
}

pub fn projected_total(inputs: &EnsembleInputs<'_>) -> f64 {
    gather_scalar(inputs, |kind, inp, rng| {
        variants::projected_total(kind, inp.base_total, inp.features, rng)
    })
    .unwrap_or(inputs.base_total)
}

pub fn projected_margin(inputs: &EnsembleInputs<'_>) -> f64 {
    gather_scalar(inputs, |kind, inp, rng| {
        variants::projected_margin(kind, inp.base_margin, inp.features, rng)
    })
    .unwrap_or(inputs.base_margin)
}

fn gather_win_probabilities(inputs: &EnsembleInputs<'_>) -> Option<WinProbs> {
    let sources = included_sources(inputs.capabilities);

    // The gather is the engine's one concurrency boundary; the collect
    // waits for every requested source before combining.
    let results: Vec<(ModelKind, WinProbs)> = sources
        .par_iter()
        .enumerate()
        .map(|(idx, &kind)| {
            let mut rng = source_rng(inputs.seed, idx);
            let probs =
                variants::win_probabilities(kind, inputs.base_probs, inputs.features, &mut rng);
            (kind, probs)
        })
        .collect();

    let total_weight: f64 = results
        .iter()
        .map(|(kind, _)| inputs.weights.weight(*kind))
        .sum();
    if !(total_weight > 0.0) {
        return None;
    }

    let mut combined = WinProbs {
        team1: 0.0,
        team2: 0.0,
        draw: 0.0,
    };
    for (kind, probs) in &results {
        if !(probs.team1.is_finite() && probs.team2.is_finite() && probs.draw.is_finite()) {
            return None;
        }
        let w = inputs.weights.weight(*kind) / total_weight;
        combined.team1 += probs.team1 * w;
        combined.team2 += probs.team2 * w;
        combined.draw += probs.draw * w;
    }
    Some(combined)
}

/// Shared gather for the two scalar fields. A source that declines the
/// query (`None`) fails the whole gather, which the callers translate
/// into the statistical fallback for that field.
fn gather_scalar(
    inputs: &EnsembleInputs<'_>,
    query: fn(ModelKind, &EnsembleInputs<'_>, &mut StdRng) -> Option<f64>,
) -> Option<f64> {
    let sources = included_sources(inputs.capabilities);

    let results: Vec<(ModelKind, Option<f64>)> = sources
        .par_iter()
        .enumerate()
        .map(|(idx, &kind)| {
            let mut rng = source_rng(inputs.seed, idx);
            (kind, query(kind, inputs, &mut rng))
        })
        .collect();

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for (kind, value) in &results {
        let value = (*value)?;
        if !value.is_finite() {
            return None;
        }
        let w = inputs.weights.weight(*kind);
        weighted_sum += value * w;
        total_weight += w;
    }
    if !(total_weight > 0.0) {
        return None;
    }
    Some(weighted_sum / total_weight)
}
