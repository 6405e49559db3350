use crate::context::{Location, MatchContext};
use crate::features::{self, LEAGUE_AVG_GOALS, TeamSide};
use crate::store::{MatchOutcome, MatchRecord, MatchStore};

/// Default projected total when no data and no line exist.
const DEFAULT_TOTAL: f64 = 2.5;

/// Win/draw/loss probabilities in percent. Every producer in the engine
/// keeps the three summing to 100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WinProbs {
    pub team1: f64,
    pub team2: f64,
    pub draw: f64,
}

impl WinProbs {
    /// The no-data prior: a near-uniform split with the residue on draw.
    pub fn uniform_default() -> Self {
        Self {
            team1: 33.3,
            team2: 33.3,
            draw: 33.4,
        }
    }

    pub fn sum(&self) -> f64 {
        self.team1 + self.team2 + self.draw
    }

    /// Rescales the triple to sum to 100.
    pub fn normalized(self) -> Self {
        let total = self.sum();
        if total <= 0.0 {
            return Self::uniform_default();
        }
        Self {
            team1: self.team1 / total * 100.0,
            team2: self.team2 / total * 100.0,
            draw: self.draw / total * 100.0,
        }
    }
}

/// Baseline win probabilities from historical win rates plus the context
/// adjustments. Deterministic: identical inputs give identical output.
pub fn win_probabilities(store: &MatchStore, ctx: &MatchContext) -> WinProbs {
    if store.is_empty() {
        return WinProbs::uniform_default();
    }

    let (mut team1_pct, mut team2_pct, mut draw_pct) = if !store.h2h.is_empty() {
        h2h_base_percentages(&store.h2h)
    } else {
        solo_base_percentages(store)
    };

    // Venue.
    match ctx.location {
        Location::Home => {
            team1_pct += 10.0;
            team2_pct -= 5.0;
            draw_pct -= 5.0;
        }
        Location::Away => {
            team2_pct += 10.0;
            team1_pct -= 5.0;
            draw_pct -= 5.0;
        }
        Location::Neutral => {}
    }

    // Rankings: a lower number is a better rank, so a positive difference
    // favors team 1.
    if ctx.team1_ranking > 0 && ctx.team2_ranking > 0 {
        let adjustment =
            (f64::from(ctx.team2_ranking) - f64::from(ctx.team1_ranking)) * 0.5;
        team1_pct += adjustment;
        team2_pct -= adjustment;
    }

    // Importance: high stakes favor the current leader, friendlies pull
    // everything toward an even split.
    if ctx.importance > 1.0 {
        let boost = (ctx.importance - 1.0) * 5.0;
        if team1_pct > team2_pct {
            team1_pct += boost;
            team2_pct -= boost / 2.0;
            draw_pct -= boost / 2.0;
        } else if team2_pct > team1_pct {
            team2_pct += boost;
            team1_pct -= boost / 2.0;
            draw_pct -= boost / 2.0;
        }
    } else if ctx.importance < 1.0 {
        let equalizer = (1.0 - ctx.importance) * 15.0;
        team1_pct += if team1_pct > 33.3 { -equalizer } else { equalizer };
        team2_pct += if team2_pct > 33.3 { -equalizer } else { equalizer };
        draw_pct += if draw_pct > 33.3 { -equalizer } else { equalizer };
    }

    WinProbs {
        team1: team1_pct.clamp(5.0, 90.0),
        team2: team2_pct.clamp(5.0, 90.0),
        draw: draw_pct.clamp(5.0, 50.0),
    }
    .normalized()
}

fn h2h_base_percentages(h2h: &[MatchRecord]) -> (f64, f64, f64) {
    let n = h2h.len() as f64;
    let team1_wins = h2h
        .iter()
        .filter(|m| m.outcome == MatchOutcome::Team1Wins)
        .count() as f64;
    let team2_wins = h2h
        .iter()
        .filter(|m| m.outcome == MatchOutcome::Team2Wins)
        .count() as f64;
    let draws = h2h
        .iter()
        .filter(|m| m.outcome == MatchOutcome::Draw)
        .count() as f64;
    (
        team1_wins / n * 100.0,
        team2_wins / n * 100.0,
        draws / n * 100.0,
    )
}

/// Without direct history, each side's solo win rate stands in, with the
/// draw taking the remainder floored at 10 (both win rates paying equally
/// for the floor).
fn solo_base_percentages(store: &MatchStore) -> (f64, f64, f64) {
    let team1_matches = store.team1.len().max(1) as f64;
    let team1_wins = store
        .team1
        .iter()
        .filter(|m| m.outcome == MatchOutcome::Team1Wins)
        .count() as f64;

    let team2_matches = store.team2.len().max(1) as f64;
    let team2_wins = store
        .team2
        .iter()
        .filter(|m| m.outcome == MatchOutcome::Team2Wins)
        .count() as f64;

    let mut team1_pct = team1_wins / team1_matches * 100.0;
    let mut team2_pct = team2_wins / team2_matches * 100.0;
    let mut draw_pct = 100.0 - team1_pct - team2_pct;

    if draw_pct < 10.0 {
        let adjustment = (10.0 - draw_pct) / 2.0;
        team1_pct -= adjustment;
        team2_pct -= adjustment;
        draw_pct = 10.0;
    }
    (team1_pct, team2_pct, draw_pct)
}

/// Projected combined score from per-side averages with venue and
/// importance adjustments. Falls back to the total line (or 2.5) with no
/// data.
pub fn projected_total(store: &MatchStore, ctx: &MatchContext) -> f64 {
    if store.is_empty() {
        return if ctx.total_line > 0.0 {
            ctx.total_line
        } else {
            DEFAULT_TOTAL
        };
    }

    let (mut team1_avg, mut team2_avg) = if !store.h2h.is_empty() {
        (
            category_average(&store.h2h, |m| m.team1_score),
            category_average(&store.h2h, |m| m.team2_score),
        )
    } else {
        (
            category_average_or(&store.team1, |m| m.team1_score, LEAGUE_AVG_GOALS),
            category_average_or(&store.team2, |m| m.team2_score, LEAGUE_AVG_GOALS),
        )
    };

    match ctx.location {
        Location::Home => team1_avg *= 1.1,
        Location::Away => team2_avg *= 1.1,
        Location::Neutral => {}
    }

    if ctx.importance > 1.0 {
        let adjustment = (ctx.importance - 1.0) * 0.25;
        team1_avg += adjustment;
        team2_avg += adjustment;
    } else if ctx.importance < 1.0 {
        // Friendlies lean higher-scoring as defenses relax.
        team1_avg *= 1.1;
        team2_avg *= 1.1;
    }

    team1_avg + team2_avg
}

/// Projected signed margin (positive favors team 1), from mean H2H margins
/// or an attack/defense differential over the solo categories.
pub fn projected_margin(store: &MatchStore, ctx: &MatchContext) -> f64 {
    if store.is_empty() {
        return 0.0;
    }

    let mut margin = if !store.h2h.is_empty() {
        store
            .h2h
            .iter()
            .map(|m| f64::from(m.team1_score) - f64::from(m.team2_score))
            .sum::<f64>()
            / store.h2h.len() as f64
    } else {
        let team1_scoring =
            category_average_or(&store.team1, |m| m.team1_score, LEAGUE_AVG_GOALS);
        let team2_scoring =
            category_average_or(&store.team2, |m| m.team2_score, LEAGUE_AVG_GOALS);
        let team1_conceded =
            category_average_or(&store.team1, |m| m.team2_score, LEAGUE_AVG_GOALS);
        let team2_conceded =
            category_average_or(&store.team2, |m| m.team1_score, LEAGUE_AVG_GOALS);
        (team1_scoring - team2_conceded) - (team2_scoring - team1_conceded)
    };

    match ctx.location {
        Location::Home => margin += 0.5,
        Location::Away => margin -= 0.5,
        Location::Neutral => {}
    }

    if ctx.team1_ranking > 0 && ctx.team2_ranking > 0 {
        margin += (f64::from(ctx.team2_ranking) - f64::from(ctx.team1_ranking)) * 0.05;
    }

    if ctx.importance > 1.0 {
        // Only widen the margin when it already points at the stronger side.
        let team1_better = features::average_scored(store, TeamSide::Team1)
            > features::average_scored(store, TeamSide::Team2);
        if (team1_better && margin > 0.0) || (!team1_better && margin < 0.0) {
            margin *= ctx.importance;
        }
    } else if ctx.importance < 1.0 {
        margin *= ctx.importance;
    }

    margin
}

fn category_average(records: &[MatchRecord], pick: fn(&MatchRecord) -> u32) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|m| f64::from(pick(m))).sum::<f64>() / records.len() as f64
}

fn category_average_or(
    records: &[MatchRecord],
    pick: fn(&MatchRecord) -> u32,
    default: f64,
) -> f64 {
    if records.is_empty() {
        default
    } else {
        category_average(records, pick)
    }
}
