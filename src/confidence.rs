use crate::context::{
    MIN_H2H_MATCHES, MIN_MATCHES_FOR_EXCELLENT_ANALYSIS, MIN_MATCHES_FOR_GOOD_ANALYSIS,
    ModelCapabilities,
};
use crate::variants::ModelKind;

/// Per-source ensemble weights in percent. After `compute_weights` the
/// four always sum to exactly 100 and a disabled source holds exactly 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelWeights {
    pub catboost: f64,
    pub xgboost: f64,
    pub lightgbm: f64,
    pub statistical: f64,
}

impl ModelWeights {
    pub fn statistical_only() -> Self {
        Self {
            catboost: 0.0,
            xgboost: 0.0,
            lightgbm: 0.0,
            statistical: 100.0,
        }
    }

    pub fn weight(&self, kind: ModelKind) -> f64 {
        match kind {
            ModelKind::CatBoost => self.catboost,
            ModelKind::XgBoost => self.xgboost,
            ModelKind::LightGbm => self.lightgbm,
            ModelKind::Statistical => self.statistical,
        }
    }

    pub fn sum(&self) -> f64 {
        self.catboost + self.xgboost + self.lightgbm + self.statistical
    }
}

/// Data-availability-driven confidence split across the four sources.
///
/// Buckets by total match count, rewards direct H2H history, then
/// redistributes each disabled variant's weight 50/25/25 across the
/// remaining slots in a fixed order (catboost, xgboost, lightgbm).
/// Weight that lands in a slot that is itself disabled is swept into the
/// statistical slot at the end, so a disabled source always reports 0.
pub fn compute_weights(
    total_matches: usize,
    h2h_matches: usize,
    caps: ModelCapabilities,
) -> ModelWeights {
    let (mut catboost, mut xgboost, mut lightgbm, mut statistical): (f64, f64, f64, f64) =
        if total_matches >= MIN_MATCHES_FOR_EXCELLENT_ANALYSIS {
            (30.0, 25.0, 25.0, 20.0)
        } else if total_matches >= MIN_MATCHES_FOR_GOOD_ANALYSIS {
            (25.0, 20.0, 20.0, 35.0)
        } else {
            // Sparse data: the variant that degrades most gracefully on
            // small samples keeps the larger share.
            (30.0, 15.0, 15.0, 40.0)
        };

    if h2h_matches >= MIN_H2H_MATCHES {
        statistical += 5.0;
        catboost -= 2.0;
        xgboost -= 2.0;
        lightgbm -= 1.0;
    }

    if !caps.catboost {
        xgboost += catboost * 0.5;
        lightgbm += catboost * 0.25;
        statistical += catboost * 0.25;
        catboost = 0.0;
    }
    if !caps.xgboost {
        catboost += xgboost * 0.5;
        lightgbm += xgboost * 0.25;
        statistical += xgboost * 0.25;
        xgboost = 0.0;
    }
    if !caps.lightgbm {
        catboost += lightgbm * 0.5;
        xgboost += lightgbm * 0.25;
        statistical += lightgbm * 0.25;
        lightgbm = 0.0;
    }

    // An earlier redistribution may have refilled a slot a later check
    // already emptied; sweep that residue into the statistical slot.
    if !caps.catboost && catboost > 0.0 {
        statistical += catboost;
        catboost = 0.0;
    }
    if !caps.xgboost && xgboost > 0.0 {
        statistical += xgboost;
        xgboost = 0.0;
    }
    if !caps.lightgbm && lightgbm > 0.0 {
        statistical += lightgbm;
        lightgbm = 0.0;
    }

    let total = catboost + xgboost + lightgbm + statistical;
    let catboost = (catboost / total * 100.0).round();
    let xgboost = (xgboost / total * 100.0).round();
    let lightgbm = (lightgbm / total * 100.0).round();
    // The statistical slot is never disabled, so it absorbs the rounding
    // residue and the four land on exactly 100.
    let statistical = 100.0 - catboost - xgboost - lightgbm;

    ModelWeights {
        catboost,
        xgboost,
        lightgbm,
        statistical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_exactly_100() {
        for total in [0usize, 3, 5, 9, 10, 40] {
            for h2h in [0usize, 2, 5] {
                for caps in [
                    ModelCapabilities::default(),
                    ModelCapabilities {
                        catboost: false,
                        ..ModelCapabilities::default()
                    },
                    ModelCapabilities {
                        xgboost: false,
                        lightgbm: false,
                        ..ModelCapabilities::default()
                    },
                    ModelCapabilities::none(),
                ] {
                    let w = compute_weights(total, h2h, caps);
                    assert_eq!(w.sum(), 100.0, "total={total} h2h={h2h} caps={caps:?}");
                }
            }
        }
    }

    #[test]
    fn buckets_follow_data_volume() {
        let all = ModelCapabilities::default();
        let sparse = compute_weights(3, 0, all);
        assert_eq!(sparse.statistical, 40.0);
        assert_eq!(sparse.catboost, 30.0);

        let good = compute_weights(6, 0, all);
        assert_eq!(good.statistical, 35.0);

        let excellent = compute_weights(12, 0, all);
        assert_eq!(excellent.statistical, 20.0);
        assert_eq!(excellent.catboost, 30.0);
    }

    #[test]
    fn h2h_history_rewards_the_baseline() {
        let all = ModelCapabilities::default();
        let without = compute_weights(12, 0, all);
        let with = compute_weights(12, 2, all);
        assert_eq!(with.statistical, without.statistical + 5.0);
        assert_eq!(with.catboost, without.catboost - 2.0);
        assert_eq!(with.lightgbm, without.lightgbm - 1.0);
    }

    #[test]
    fn disabled_sources_end_at_zero() {
        let caps = ModelCapabilities {
            catboost: false,
            xgboost: false,
            lightgbm: true,
        };
        let w = compute_weights(12, 2, caps);
        assert_eq!(w.catboost, 0.0);
        assert_eq!(w.xgboost, 0.0);
        assert!(w.lightgbm > 0.0);
        assert_eq!(w.sum(), 100.0);

        let none = compute_weights(12, 2, ModelCapabilities::none());
        assert_eq!(none.statistical, 100.0);
    }

    #[test]
    fn single_disabled_variant_redistributes_50_25_25() {
        let caps = ModelCapabilities {
            catboost: false,
            ..ModelCapabilities::default()
        };
        // Excellent bucket, no H2H: catboost starts at 30.
        let w = compute_weights(12, 0, caps);
        assert_eq!(w.xgboost, 40.0); // 25 + 15
        assert_eq!(w.lightgbm, 33.0); // 25 + 7.5, rounded
        assert_eq!(w.statistical, 100.0 - 40.0 - 33.0);
    }
}
