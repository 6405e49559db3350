use crate::context::MatchContext;
use crate::store::{MatchOutcome, MatchRecord, MatchStore};

/// Fixed league-average goals prior used as the "unknown team" default and
/// as the reference point for defense strength.
pub const LEAGUE_AVG_GOALS: f64 = 1.5;

/// Recency window for the form score.
const FORM_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSide {
    Team1,
    Team2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aspect {
    Attack,
    Defense,
}

/// Ephemeral per-run aggregates; recomputed from the store on every
/// analysis, never persisted.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    pub team1_avg_score: f64,
    pub team2_avg_score: f64,
    pub team1_avg_conceded: f64,
    pub team2_avg_conceded: f64,
    pub team1_recent_form: f64,
    pub team2_recent_form: f64,
    pub h2h_advantage: f64,
    pub importance: f64,
    pub location_factor: f64,
    pub ranking_diff: f64,
    pub total_line: f64,
    pub point_spread: f64,
    pub spread_sign: f64,
    pub matches_played: usize,
    pub team1_defense_strength: f64,
    pub team2_defense_strength: f64,
    pub team1_attack_variability: f64,
    pub team2_attack_variability: f64,
    pub team1_defense_variability: f64,
    pub team2_defense_variability: f64,
}

pub fn derive_features(store: &MatchStore, ctx: &MatchContext) -> FeatureVector {
    FeatureVector {
        team1_avg_score: average_scored(store, TeamSide::Team1),
        team2_avg_score: average_scored(store, TeamSide::Team2),
        team1_avg_conceded: average_conceded(store, TeamSide::Team1),
        team2_avg_conceded: average_conceded(store, TeamSide::Team2),
        team1_recent_form: recent_form(store, TeamSide::Team1),
        team2_recent_form: recent_form(store, TeamSide::Team2),
        h2h_advantage: h2h_advantage(store),
        importance: ctx.importance,
        location_factor: ctx.location_factor(),
        ranking_diff: ctx.ranking_diff(),
        total_line: ctx.total_line,
        point_spread: ctx.point_spread,
        spread_sign: ctx.spread_sign(),
        matches_played: store.total_matches(),
        team1_defense_strength: defense_strength(store, TeamSide::Team1),
        team2_defense_strength: defense_strength(store, TeamSide::Team2),
        team1_attack_variability: variability(store, TeamSide::Team1, Aspect::Attack),
        team2_attack_variability: variability(store, TeamSide::Team2, Aspect::Attack),
        team1_defense_variability: variability(store, TeamSide::Team1, Aspect::Defense),
        team2_defense_variability: variability(store, TeamSide::Team2, Aspect::Defense),
    }
}

/// H2H plus the side's own solo category, one observation per record.
fn side_records<'a>(
    store: &'a MatchStore,
    side: TeamSide,
) -> impl Iterator<Item = &'a MatchRecord> {
    let solo = match side {
        TeamSide::Team1 => store.team1.iter(),
        TeamSide::Team2 => store.team2.iter(),
    };
    store.h2h.iter().chain(solo)
}

fn scored(record: &MatchRecord, side: TeamSide) -> u32 {
    match side {
        TeamSide::Team1 => record.team1_score,
        TeamSide::Team2 => record.team2_score,
    }
}

fn conceded(record: &MatchRecord, side: TeamSide) -> u32 {
    match side {
        TeamSide::Team1 => record.team2_score,
        TeamSide::Team2 => record.team1_score,
    }
}

fn won(record: &MatchRecord, side: TeamSide) -> bool {
    match side {
        TeamSide::Team1 => record.outcome == MatchOutcome::Team1Wins,
        TeamSide::Team2 => record.outcome == MatchOutcome::Team2Wins,
    }
}

pub fn average_scored(store: &MatchStore, side: TeamSide) -> f64 {
    mean_over(store, side, scored)
}

pub fn average_conceded(store: &MatchStore, side: TeamSide) -> f64 {
    mean_over(store, side, conceded)
}

fn mean_over(store: &MatchStore, side: TeamSide, pick: fn(&MatchRecord, TeamSide) -> u32) -> f64 {
    let mut sum = 0u64;
    let mut count = 0usize;
    for record in side_records(store, side) {
        sum += u64::from(pick(record, side));
        count += 1;
    }
    if count > 0 {
        sum as f64 / count as f64
    } else {
        LEAGUE_AVG_GOALS
    }
}

/// Form over the most recent matches: win 3, draw 1, loss 0, normalized
/// to 0..1. Neutral 0.5 with no matches at all.
pub fn recent_form(store: &MatchStore, side: TeamSide) -> f64 {
    let mut results: Vec<(i64, u32)> = side_records(store, side)
        .map(|record| {
            let points = if won(record, side) {
                3
            } else if record.outcome == MatchOutcome::Draw {
                1
            } else {
                0
            };
            (record.timestamp_ms, points)
        })
        .collect();

    if results.is_empty() {
        return 0.5;
    }

    results.sort_by(|a, b| b.0.cmp(&a.0));
    results.truncate(FORM_WINDOW);

    let points: u32 = results.iter().map(|(_, p)| p).sum();
    f64::from(points) / (results.len() as f64 * 3.0)
}

/// (team1 wins - team2 wins) / h2h count, in -1..1. Zero without H2H data.
pub fn h2h_advantage(store: &MatchStore) -> f64 {
    if store.h2h.is_empty() {
        return 0.0;
    }
    let team1_wins = store
        .h2h
        .iter()
        .filter(|m| m.outcome == MatchOutcome::Team1Wins)
        .count() as f64;
    let team2_wins = store
        .h2h
        .iter()
        .filter(|m| m.outcome == MatchOutcome::Team2Wins)
        .count() as f64;
    (team1_wins - team2_wins) / store.h2h.len() as f64
}

/// Coefficient-of-variation-like spread of a side's scored (attack) or
/// conceded (defense) goals. The mean in the denominator is floored at
/// 0.1; fewer than two observations read as neutral 1.0.
pub fn variability(store: &MatchStore, side: TeamSide, aspect: Aspect) -> f64 {
    let pick = match aspect {
        Aspect::Attack => scored,
        Aspect::Defense => conceded,
    };
    let values: Vec<f64> = side_records(store, side)
        .map(|record| f64::from(pick(record, side)))
        .collect();
    if values.len() < 2 {
        return 1.0;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt() / mean.max(0.1)
}

/// Conceded goals relative to the league average; below 1.0 means a
/// better-than-average defense.
pub fn defense_strength(store: &MatchStore, side: TeamSide) -> f64 {
    average_conceded(store, side) / LEAGUE_AVG_GOALS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MatchContext;
    use crate::store::MatchCategory;

    fn store_with(h2h: &[(u32, u32)], team1: &[(u32, u32)], team2: &[(u32, u32)]) -> MatchStore {
        let ctx = MatchContext::default();
        let mut store = MatchStore::new();
        store.replace_category(MatchCategory::H2h, h2h, &ctx);
        store.replace_category(MatchCategory::Team1, team1, &ctx);
        store.replace_category(MatchCategory::Team2, team2, &ctx);
        store
    }

    #[test]
    fn averages_default_to_league_prior() {
        let store = MatchStore::new();
        assert_eq!(average_scored(&store, TeamSide::Team1), LEAGUE_AVG_GOALS);
        assert_eq!(average_conceded(&store, TeamSide::Team2), LEAGUE_AVG_GOALS);
    }

    #[test]
    fn averages_weigh_h2h_and_solo_equally() {
        let store = store_with(&[(2, 0)], &[(4, 1)], &[]);
        assert_eq!(average_scored(&store, TeamSide::Team1), 3.0);
        assert_eq!(average_conceded(&store, TeamSide::Team1), 0.5);
    }

    #[test]
    fn team2_solo_reads_from_its_own_slot() {
        // Team 2 scored 3 and conceded 1 against an unnamed opponent.
        let store = store_with(&[], &[], &[(3, 1)]);
        assert_eq!(average_scored(&store, TeamSide::Team2), 3.0);
        assert_eq!(average_conceded(&store, TeamSide::Team2), 1.0);
    }

    #[test]
    fn form_uses_most_recent_window() {
        // 7 solo matches for team 1: two early wins age out of the window,
        // the last five are all losses.
        let pairs = [(2, 0), (3, 0), (0, 1), (0, 1), (0, 1), (0, 1), (0, 1)];
        let store = store_with(&[], &pairs, &[]);
        // First submitted record is newest: window = [(2,0),(3,0),(0,1),(0,1),(0,1)].
        let form = recent_form(&store, TeamSide::Team1);
        assert!((form - 6.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn form_is_neutral_without_matches() {
        let store = MatchStore::new();
        assert_eq!(recent_form(&store, TeamSide::Team1), 0.5);
    }

    #[test]
    fn h2h_advantage_bounds() {
        let store = store_with(&[(2, 1), (3, 0), (1, 1)], &[], &[]);
        let adv = h2h_advantage(&store);
        assert!((adv - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(h2h_advantage(&MatchStore::new()), 0.0);
    }

    #[test]
    fn variability_neutral_below_two_observations() {
        let store = store_with(&[(2, 1)], &[], &[]);
        assert_eq!(variability(&store, TeamSide::Team1, Aspect::Attack), 1.0);
    }

    #[test]
    fn variability_scales_by_mean() {
        // Scores 0 and 2: mean 1, population stddev 1 -> variability 1.0.
        let store = store_with(&[], &[(0, 0), (2, 0)], &[]);
        let v = variability(&store, TeamSide::Team1, Aspect::Attack);
        assert!((v - 1.0).abs() < 1e-12);
    }

    #[test]
    fn defense_strength_is_relative_to_league() {
        let store = store_with(&[], &[(0, 3), (0, 3)], &[]);
        assert_eq!(defense_strength(&store, TeamSide::Team1), 2.0);
    }
}
