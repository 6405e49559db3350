use matchedge::confidence::compute_weights;
use matchedge::context::ModelCapabilities;

#[test]
fn weights_sum_to_exactly_100_across_the_grid() {
    let caps_variants = [
        ModelCapabilities::default(),
        ModelCapabilities {
            catboost: false,
            ..ModelCapabilities::default()
        },
        ModelCapabilities {
            xgboost: false,
            ..ModelCapabilities::default()
        },
        ModelCapabilities {
            lightgbm: false,
            ..ModelCapabilities::default()
        },
        ModelCapabilities {
            catboost: false,
            xgboost: false,
            lightgbm: true,
        },
        ModelCapabilities::none(),
    ];

    for total in 0..25usize {
        for h2h in 0..6usize {
            for caps in caps_variants {
                let w = compute_weights(total, h2h.min(total), caps);
                assert_eq!(
                    w.sum(),
                    100.0,
                    "total={total} h2h={h2h} caps={caps:?} -> {w:?}"
                );
            }
        }
    }
}

#[test]
fn disabled_sources_hold_exactly_zero() {
    for caps in [
        ModelCapabilities {
            catboost: false,
            ..ModelCapabilities::default()
        },
        ModelCapabilities {
            catboost: false,
            xgboost: false,
            lightgbm: false,
        },
    ] {
        let w = compute_weights(12, 2, caps);
        if !caps.catboost {
            assert_eq!(w.catboost, 0.0);
        }
        if !caps.xgboost {
            assert_eq!(w.xgboost, 0.0);
        }
        if !caps.lightgbm {
            assert_eq!(w.lightgbm, 0.0);
        }
    }
}

#[test]
fn more_data_shifts_weight_away_from_the_baseline() {
    let caps = ModelCapabilities::default();
    let sparse = compute_weights(2, 0, caps);
    let excellent = compute_weights(15, 0, caps);
    assert!(excellent.statistical < sparse.statistical);
    assert!(excellent.xgboost > sparse.xgboost);
}

#[test]
fn h2h_bonus_lands_on_the_statistical_slot() {
    let caps = ModelCapabilities::default();
    let without = compute_weights(8, 1, caps);
    let with = compute_weights(8, 2, caps);
    assert_eq!(with.statistical, without.statistical + 5.0);
}

#[test]
fn all_variants_disabled_leaves_everything_statistical() {
    let w = compute_weights(20, 4, ModelCapabilities::none());
    assert_eq!(w.statistical, 100.0);
    assert_eq!(w.catboost + w.xgboost + w.lightgbm, 0.0);
}
