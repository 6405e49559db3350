use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use anyhow::{Result, bail};

use crate::confidence::{self, ModelWeights};
use crate::context::{MIN_MATCHES_FOR_GOOD_ANALYSIS, MatchContext, ModelCapabilities};
use crate::edge;
use crate::ensemble::{self, EnsembleInputs};
use crate::features;
use crate::reconcile;
use crate::statistical::{self, WinProbs};
use crate::store::MatchStore;

/// One analysis run's inputs, cloned out of the UI so the worker never
/// shares mutable state with it.
#[derive(Debug, Clone)]
pub struct AnalysisSnapshot {
    pub store: MatchStore,
    pub context: MatchContext,
    pub capabilities: ModelCapabilities,
}

#[derive(Debug, Clone)]
pub struct PredictionResult {
    pub probs: WinProbs,
    pub projected_total: f64,
    pub projected_margin: f64,
    pub weights: ModelWeights,
}

/// The engine's full answer: the prediction plus the display values the
/// UI renders directly.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: PredictionResult,
    pub team1_projected: i32,
    pub team2_projected: i32,
    pub over_under_edge: f64,
    pub spread_edge: f64,
    pub total_recommendation: String,
    pub spread_recommendation: String,
}

/// Input-validation gate: errors here mean the analysis is not attempted.
pub fn validate_snapshot(snapshot: &AnalysisSnapshot) -> Result<()> {
    snapshot.context.validate_names()?;
    if snapshot.store.is_empty() {
        bail!("add match data before analyzing");
    }
    Ok(())
}

/// Below the good-data threshold the UI must ask the user to confirm
/// before running; the warning never blocks on its own.
pub fn needs_confirmation(store: &MatchStore) -> bool {
    store.total_matches() < MIN_MATCHES_FOR_GOOD_ANALYSIS
}

pub fn run_analysis(snapshot: &AnalysisSnapshot, seed: u64) -> Result<AnalysisOutcome> {
    validate_snapshot(snapshot)?;
    Ok(analyze(snapshot, seed))
}

fn analyze(snapshot: &AnalysisSnapshot, seed: u64) -> AnalysisOutcome {
    let store = &snapshot.store;
    let ctx = &snapshot.context;

    let feature_vector = features::derive_features(store, ctx);
    let base_probs = statistical::win_probabilities(store, ctx);
    let base_total = statistical::projected_total(store, ctx);
    let base_margin = statistical::projected_margin(store, ctx);
    let weights = confidence::compute_weights(
        store.total_matches(),
        store.h2h.len(),
        snapshot.capabilities,
    );

    let inputs = EnsembleInputs {
        features: &feature_vector,
        base_probs: &base_probs,
        base_total,
        base_margin,
        weights: &weights,
        capabilities: snapshot.capabilities,
        seed,
    };

    let probs = ensemble::win_probabilities(&inputs);
    let projected_total = ensemble::projected_total(&inputs);
    let raw_margin = ensemble::projected_margin(&inputs);

    finish(snapshot, probs, projected_total, raw_margin, weights)
}

/// The all-statistical path: the recovery route when anything downstream
/// of validation fails, and a working model in its own right with zero
/// data.
pub fn statistical_outcome(snapshot: &AnalysisSnapshot) -> AnalysisOutcome {
    let store = &snapshot.store;
    let ctx = &snapshot.context;
    finish(
        snapshot,
        statistical::win_probabilities(store, ctx),
        statistical::projected_total(store, ctx),
        statistical::projected_margin(store, ctx),
        ModelWeights::statistical_only(),
    )
}

fn finish(
    snapshot: &AnalysisSnapshot,
    probs: WinProbs,
    projected_total: f64,
    raw_margin: f64,
    weights: ModelWeights,
) -> AnalysisOutcome {
    let ctx = &snapshot.context;
    let projected_margin = reconcile::reconcile_margin(&probs, raw_margin);

    let (team1_projected, team2_projected) = edge::projected_scores(projected_total, projected_margin);
    let over_under_edge = edge::over_under_edge(projected_total, ctx.total_line);
    let spread_edge = edge::spread_edge(projected_margin, ctx);

    AnalysisOutcome {
        result: PredictionResult {
            probs,
            projected_total,
            projected_margin,
            weights,
        },
        team1_projected,
        team2_projected,
        over_under_edge,
        spread_edge,
        total_recommendation: edge::over_under_recommendation(over_under_edge, ctx.total_line),
        spread_recommendation: edge::spread_recommendation(spread_edge, ctx),
    }
}

/// Commands for the analysis worker thread.
#[derive(Debug)]
pub enum AnalysisCommand {
    Run(AnalysisSnapshot),
}

/// Worker replies, delivered back over the UI's delta channel.
#[derive(Debug)]
pub enum AnalysisDelta {
    Completed(Box<AnalysisOutcome>),
    /// The pipeline failed; the all-statistical outcome stands in and the
    /// UI reports the error once.
    Failed {
        error: String,
        fallback: Box<AnalysisOutcome>,
    },
}

/// Spawns the single analysis worker. Requests drain strictly in order,
/// one at a time, so two rapid analyze presses can never interleave; the
/// UI keeps a busy flag and rejects sends while a run is in flight.
pub fn spawn_analysis_worker(cmd_rx: Receiver<AnalysisCommand>, tx: Sender<AnalysisDelta>) {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AnalysisCommand::Run(snapshot) => {
                    let seed = rand::random::<u64>();
                    let delta = match run_analysis(&snapshot, seed) {
                        Ok(outcome) => AnalysisDelta::Completed(Box::new(outcome)),
                        Err(err) => AnalysisDelta::Failed {
                            error: err.to_string(),
                            fallback: Box::new(statistical_outcome(&snapshot)),
                        },
                    };
                    if tx.send(delta).is_err() {
                        return;
                    }
                }
            }
        }
    });
}
