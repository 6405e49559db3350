use rand::Rng;

use crate::features::FeatureVector;
use crate::statistical::WinProbs;

/// The four prediction sources the ensemble can draw from. The three
/// boosted variants are simulated: deterministic transforms of the
/// statistical baseline plus bounded jitter, named for the libraries
/// whose behavior they imitate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    CatBoost,
    XgBoost,
    LightGbm,
    Statistical,
}

impl ModelKind {
    pub fn label(self) -> &'static str {
        match self {
            ModelKind::CatBoost => "CatBoost",
            ModelKind::XgBoost => "XGBoost",
            ModelKind::LightGbm => "LightGBM",
            ModelKind::Statistical => "Statistical",
        }
    }
}

pub fn win_probabilities(
    kind: ModelKind,
    base: &WinProbs,
    features: &FeatureVector,
    rng: &mut impl Rng,
) -> WinProbs {
    match kind {
        ModelKind::CatBoost => catboost_win_probabilities(base, features, rng),
        ModelKind::XgBoost => xgboost_win_probabilities(features, rng),
        ModelKind::LightGbm => lightgbm_win_probabilities(base),
        ModelKind::Statistical => *base,
    }
}

/// `None` marks a query the variant does not answer; the combiner treats
/// that as a gathering failure. LightGBM-like only implements the
/// win-probability query, matching the behavior being simulated.
pub fn projected_total(
    kind: ModelKind,
    base_total: f64,
    features: &FeatureVector,
    rng: &mut impl Rng,
) -> Option<f64> {
    match kind {
        ModelKind::CatBoost => Some(catboost_projected_total(base_total, features, rng)),
        ModelKind::XgBoost => Some(xgboost_projected_total(features, rng)),
        ModelKind::LightGbm => None,
        ModelKind::Statistical => Some(base_total),
    }
}

pub fn projected_margin(
    kind: ModelKind,
    base_margin: f64,
    features: &FeatureVector,
    rng: &mut impl Rng,
) -> Option<f64> {
    match kind {
        ModelKind::CatBoost => Some(catboost_projected_margin(base_margin, features, rng)),
        ModelKind::XgBoost => Some(xgboost_projected_margin(features, rng)),
        ModelKind::LightGbm => None,
        ModelKind::Statistical => Some(base_margin),
    }
}

fn quality_differential(f: &FeatureVector) -> f64 {
    (f.team1_avg_score - f.team2_avg_score) + (f.team2_avg_conceded - f.team1_avg_conceded)
}

/// CatBoost-like: the baseline smoothed toward a uniform prior on small
/// samples, then nudged by importance, venue and the quality gap.
fn catboost_win_probabilities(
    base: &WinProbs,
    f: &FeatureVector,
    rng: &mut impl Rng,
) -> WinProbs {
    let mut team1 = base.team1 / 100.0;
    let mut team2 = base.team2 / 100.0;
    let mut draw = base.draw / 100.0;

    let n = f.matches_played.max(1) as f64;
    let smoothing = (5.0 / n).clamp(0.0, 0.2);
    team1 = team1 * (1.0 - smoothing) + 0.33 * smoothing;
    team2 = team2 * (1.0 - smoothing) + 0.33 * smoothing;
    draw = draw * (1.0 - smoothing) + 0.33 * smoothing;

    if f.importance > 1.0 {
        let boost = (f.importance - 1.0) * 0.15;
        if team1 > team2 {
            team1 += boost;
            team2 -= boost * 0.7;
            draw -= boost * 0.3;
        } else if team2 > team1 {
            team2 += boost;
            team1 -= boost * 0.7;
            draw -= boost * 0.3;
        }
    }

    if f.location_factor > 0.0 {
        team1 += 0.06;
        team2 -= 0.04;
        draw -= 0.02;
    } else if f.location_factor < 0.0 {
        team2 += 0.06;
        team1 -= 0.04;
        draw -= 0.02;
    }

    let quality = quality_differential(f);
    if quality.abs() > 0.5 {
        let adjustment = (quality.abs() * 0.08).min(0.12);
        if quality > 0.0 {
            team1 += adjustment;
            team2 -= adjustment * 0.7;
            draw -= adjustment * 0.3;
        } else {
            team2 += adjustment;
            team1 -= adjustment * 0.7;
            draw -= adjustment * 0.3;
        }
    }

    let sum = team1 + team2 + draw;
    let mut team1 = team1 / sum * 100.0;
    let mut team2 = team2 / sum * 100.0;

    // Jitter hits the win probabilities only; draw absorbs the remainder.
    const JITTER: f64 = 0.01;
    team1 = (team1 + rng.gen_range(-1.0..1.0) * JITTER * 100.0).clamp(5.0, 90.0);
    team2 = (team2 + rng.gen_range(-1.0..1.0) * JITTER * 100.0).clamp(5.0, 90.0);
    let draw = (100.0 - team1 - team2).max(0.0);

    // Identity unless the draw complement bottomed out at zero.
    WinProbs { team1, team2, draw }.normalized()
}

fn catboost_projected_total(base_total: f64, f: &FeatureVector, rng: &mut impl Rng) -> f64 {
    let n = f.matches_played.max(1) as f64;
    let regularization = (8.0 / n).clamp(0.0, 0.3);
    let mut total = base_total * (1.0 - regularization) + 2.5 * regularization;

    // Interaction terms: venue x form gap, defense x importance bucket.
    total += f.location_factor * (f.team1_recent_form - f.team2_recent_form) * 0.3;
    total += (f.team1_defense_strength + f.team2_defense_strength)
        * if f.importance < 1.0 { 0.4 } else { -0.2 };

    if f.importance < 1.0 {
        total += (1.0 - f.importance) * 0.6;
    } else if f.importance > 1.3 {
        total -= (f.importance - 1.3) * 0.4;
    }

    total += rng.gen_range(-0.2..0.2);
    total.max(0.5)
}

fn catboost_projected_margin(base_margin: f64, f: &FeatureVector, rng: &mut impl Rng) -> f64 {
    let n = f.matches_played.max(1) as f64;
    let regularization = (8.0 / n).clamp(0.0, 0.3);
    let mut margin = base_margin * (1.0 - regularization);

    margin += quality_differential(f) * f.location_factor * 0.2;
    margin += (f.team1_recent_form - f.team2_recent_form) * (f.importance - 1.0) * 0.5;

    if f.ranking_diff != 0.0 {
        // Diminishing returns on extreme ranking gaps.
        let effect = -f.ranking_diff / 50.0;
        margin += effect / (1.0 + effect.abs() * 0.5);
    }

    margin + rng.gen_range(-0.15..0.15)
}

/// XGBoost-like: a linear score over the pairwise feature differences on
/// top of a 0.4 base per side.
fn xgboost_win_probabilities(f: &FeatureVector, rng: &mut impl Rng) -> WinProbs {
    let team1_base = 0.4
        + (f.team1_avg_score - f.team2_avg_score) * 0.1
        + (f.team2_avg_conceded - f.team1_avg_conceded) * 0.05
        + (f.team1_recent_form - f.team2_recent_form) * 0.15
        + f.h2h_advantage * 0.1
        + f.location_factor * 0.05
        + (-f.ranking_diff / 100.0) * 0.05
        + (f.team2_defense_strength - f.team1_defense_strength) * 0.05
        + (f.team1_attack_variability - f.team2_attack_variability) * 0.03;

    let team2_base = 0.4
        + (f.team2_avg_score - f.team1_avg_score) * 0.1
        + (f.team1_avg_conceded - f.team2_avg_conceded) * 0.05
        + (f.team2_recent_form - f.team1_recent_form) * 0.15
        + (-f.h2h_advantage) * 0.1
        + (-f.location_factor) * 0.05
        + (f.ranking_diff / 100.0) * 0.05
        + (f.team1_defense_strength - f.team2_defense_strength) * 0.05
        + (f.team2_attack_variability - f.team1_attack_variability) * 0.03;

    const JITTER: f64 = 0.02;
    let team1 = (team1_base + rng.gen_range(-1.0..1.0) * JITTER).clamp(0.05, 0.9);
    let team2 = (team2_base + rng.gen_range(-1.0..1.0) * JITTER).clamp(0.05, 0.9);

    let (mut final_team1, mut final_team2) = (team1, team2);
    if f.importance > 1.0 {
        // High stakes amplify the favorite.
        if team1 > team2 {
            final_team1 = team1 * (1.0 + (f.importance - 1.0) * 0.1);
            final_team2 = team2 * (1.0 - (f.importance - 1.0) * 0.05);
        } else {
            final_team2 = team2 * (1.0 + (f.importance - 1.0) * 0.1);
            final_team1 = team1 * (1.0 - (f.importance - 1.0) * 0.05);
        }
    } else if f.importance < 1.0 {
        final_team1 = team1 * (1.0 - (1.0 - f.importance) * 0.2);
        final_team2 = team2 * (1.0 - (1.0 - f.importance) * 0.2);
    }

    let draw = (100.0 - final_team1 * 100.0 - final_team2 * 100.0).max(0.0);
    WinProbs {
        team1: final_team1 * 100.0,
        team2: final_team2 * 100.0,
        draw,
    }
    .normalized()
}

fn xgboost_projected_total(f: &FeatureVector, rng: &mut impl Rng) -> f64 {
    let base = f.team1_avg_score + f.team2_avg_score;
    let defense = (f.team1_avg_conceded + f.team2_avg_conceded) / 4.0;
    let form = (f.team1_recent_form + f.team2_recent_form) * 0.5;
    let importance = if f.importance < 1.0 {
        (1.0 - f.importance) * 0.5
    } else if f.importance > 1.3 {
        -(f.importance - 1.3) * 0.3
    } else {
        0.0
    };
    let variability = (f.team1_attack_variability + f.team2_attack_variability) * 0.2;

    base + defense + form + importance + variability + rng.gen_range(-0.2..0.2)
}

fn xgboost_projected_margin(f: &FeatureVector, rng: &mut impl Rng) -> f64 {
    let base = f.team1_avg_score - f.team2_avg_score;
    let defense = (f.team2_avg_conceded - f.team1_avg_conceded) / 2.0;
    let h2h = f.h2h_advantage * 0.5;
    let location = f.location_factor * 0.4;
    let form = (f.team1_recent_form - f.team2_recent_form) * 0.7;
    let ranking = -f.ranking_diff / 50.0;

    let importance = if f.importance > 1.0 {
        if base > 0.0 {
            (f.importance - 1.0) * 0.3
        } else if base < 0.0 {
            -(f.importance - 1.0) * 0.3
        } else {
            0.0
        }
    } else if f.importance < 1.0 {
        let sign = if base > 0.0 {
            1.0
        } else if base < 0.0 {
            -1.0
        } else {
            0.0
        };
        -sign * (1.0 - f.importance) * 0.2
    } else {
        0.0
    };

    base + defense + h2h + location + form + ranking + importance + rng.gen_range(-0.3..0.3)
}

/// LightGBM-like: a minimal fixed shift of the baseline toward team 1.
fn lightgbm_win_probabilities(base: &WinProbs) -> WinProbs {
    const SHIFT: f64 = 0.05;
    let team1 = base.team1 / 100.0 + SHIFT;
    let team2 = base.team2 / 100.0 - SHIFT;
    let draw = base.draw / 100.0 - SHIFT / 2.0;
    let sum = team1 + team2 + draw;
    WinProbs {
        team1: team1 / sum * 100.0,
        team2: team2 / sum * 100.0,
        draw: draw / sum * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn neutral_features() -> FeatureVector {
        FeatureVector {
            team1_avg_score: 1.5,
            team2_avg_score: 1.5,
            team1_avg_conceded: 1.5,
            team2_avg_conceded: 1.5,
            team1_recent_form: 0.5,
            team2_recent_form: 0.5,
            h2h_advantage: 0.0,
            importance: 1.0,
            location_factor: 0.0,
            ranking_diff: 0.0,
            total_line: 0.0,
            point_spread: 0.0,
            spread_sign: 1.0,
            matches_played: 6,
            team1_defense_strength: 1.0,
            team2_defense_strength: 1.0,
            team1_attack_variability: 1.0,
            team2_attack_variability: 1.0,
            team1_defense_variability: 1.0,
            team2_defense_variability: 1.0,
        }
    }

    fn base() -> WinProbs {
        WinProbs {
            team1: 45.0,
            team2: 30.0,
            draw: 25.0,
        }
    }

    #[test]
    fn every_variant_sums_to_100() {
        let f = neutral_features();
        let mut rng = StdRng::seed_from_u64(7);
        for kind in [
            ModelKind::CatBoost,
            ModelKind::XgBoost,
            ModelKind::LightGbm,
            ModelKind::Statistical,
        ] {
            let probs = win_probabilities(kind, &base(), &f, &mut rng);
            assert!(
                (probs.sum() - 100.0).abs() < 0.01,
                "{} sums to {}",
                kind.label(),
                probs.sum()
            );
        }
    }

    #[test]
    fn lightgbm_shifts_toward_team1() {
        let f = neutral_features();
        let mut rng = StdRng::seed_from_u64(1);
        let probs = win_probabilities(ModelKind::LightGbm, &base(), &f, &mut rng);
        assert!(probs.team1 > base().team1);
        assert!(probs.team2 < base().team2);
    }

    #[test]
    fn lightgbm_declines_total_and_margin() {
        let f = neutral_features();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(projected_total(ModelKind::LightGbm, 2.5, &f, &mut rng).is_none());
        assert!(projected_margin(ModelKind::LightGbm, 0.5, &f, &mut rng).is_none());
    }

    #[test]
    fn catboost_smooths_small_samples_toward_uniform() {
        let mut f = neutral_features();
        f.matches_played = 3;
        let lopsided = WinProbs {
            team1: 80.0,
            team2: 10.0,
            draw: 10.0,
        };
        let mut rng = StdRng::seed_from_u64(11);
        let probs = win_probabilities(ModelKind::CatBoost, &lopsided, &f, &mut rng);
        // With heavy smoothing the favorite must give up ground, jitter is
        // bounded by one point.
        assert!(probs.team1 < lopsided.team1 - 5.0);
    }

    #[test]
    fn catboost_total_floors_at_half_goal() {
        let mut f = neutral_features();
        f.team1_defense_strength = 0.0;
        f.team2_defense_strength = 0.0;
        f.importance = 2.0;
        let mut rng = StdRng::seed_from_u64(3);
        let total = catboost_projected_total(0.0, &f, &mut rng);
        assert!(total >= 0.5);
    }

    #[test]
    fn xgboost_win_probs_are_clamped() {
        let mut f = neutral_features();
        f.team1_avg_score = 9.0;
        f.team2_avg_score = 0.0;
        f.team1_recent_form = 1.0;
        f.team2_recent_form = 0.0;
        f.h2h_advantage = 1.0;
        let mut rng = StdRng::seed_from_u64(5);
        let probs = xgboost_win_probabilities(&f, &mut rng);
        assert!(probs.team1 <= 90.0 + 1e-9);
        assert!(probs.team2 >= 5.0 - 1e-9);
    }

    #[test]
    fn xgboost_friendly_compresses_both_sides() {
        let f = {
            let mut f = neutral_features();
            f.importance = 0.5;
            f
        };
        let mut strong = neutral_features();
        strong.importance = 1.0;

        // Same seed, same draws: the friendly run scales both sides down.
        let a = xgboost_win_probabilities(&f, &mut StdRng::seed_from_u64(9));
        let b = xgboost_win_probabilities(&strong, &mut StdRng::seed_from_u64(9));
        assert!(a.team1 < b.team1);
        assert!(a.team2 < b.team2);
    }
}
