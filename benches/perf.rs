use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use matchedge::context::{MatchContext, ModelCapabilities};
use matchedge::features::derive_features;
use matchedge::predict::{AnalysisSnapshot, run_analysis};
use matchedge::statistical;
use matchedge::store::{MatchCategory, MatchStore};

fn sample_snapshot() -> AnalysisSnapshot {
    let context = MatchContext {
        team1_name: "Alpha".to_string(),
        team2_name: "Beta".to_string(),
        team1_ranking: 4,
        team2_ranking: 11,
        importance: 1.2,
        total_line: 2.5,
        point_spread: 1.0,
        ..MatchContext::default()
    };

    let h2h: Vec<(u32, u32)> = (0..8).map(|i| (i % 4, (i + 1) % 3)).collect();
    let solo1: Vec<(u32, u32)> = (0..12).map(|i| ((i + 2) % 5, i % 2)).collect();
    let solo2: Vec<(u32, u32)> = (0..12).map(|i| (i % 3, (i + 1) % 4)).collect();

    let mut store = MatchStore::new();
    store.replace_category(MatchCategory::H2h, &h2h, &context);
    store.replace_category(MatchCategory::Team1, &solo1, &context);
    store.replace_category(MatchCategory::Team2, &solo2, &context);

    AnalysisSnapshot {
        store,
        context,
        capabilities: ModelCapabilities::default(),
    }
}

fn bench_feature_derivation(c: &mut Criterion) {
    let snap = sample_snapshot();
    c.bench_function("feature_derivation", |b| {
        b.iter(|| {
            let features = derive_features(black_box(&snap.store), black_box(&snap.context));
            black_box(features.team1_avg_score);
        })
    });
}

fn bench_statistical_model(c: &mut Criterion) {
    let snap = sample_snapshot();
    c.bench_function("statistical_model", |b| {
        b.iter(|| {
            let probs =
                statistical::win_probabilities(black_box(&snap.store), black_box(&snap.context));
            black_box(probs.team1);
        })
    });
}

fn bench_full_analysis(c: &mut Criterion) {
    let snap = sample_snapshot();
    c.bench_function("full_analysis", |b| {
        b.iter(|| {
            let outcome = run_analysis(black_box(&snap), black_box(42)).unwrap();
            black_box(outcome.result.projected_total);
        })
    });
}

criterion_group!(
    perf,
    bench_feature_derivation,
    bench_statistical_model,
    bench_full_analysis
);
criterion_main!(perf);
