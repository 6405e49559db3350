use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::context::{MatchContext, SpreadSide};

const DAY_MS: i64 = 86_400_000;

/// Outcome tag, relative to the record's slots: `Team1Wins` means whoever
/// occupies the team1 slot won. For solo categories the opponent occupies
/// the other slot, so the tag stays valid if a team is renamed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Team1Wins,
    Team2Wins,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpreadCover {
    FavoriteCovered,
    UnderdogCovered,
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchCategory {
    /// Direct meetings between the two teams.
    H2h,
    /// Team 1 against unspecified other opponents.
    Team1,
    /// Team 2 against unspecified other opponents.
    Team2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_number: u32,
    pub team1_score: u32,
    pub team2_score: u32,
    pub total_score: u32,
    pub outcome: MatchOutcome,
    pub category: MatchCategory,
    /// `None` unless a positive total line was set when the mark was computed.
    pub total_over_line: Option<bool>,
    /// `None` unless a positive point spread was set.
    pub spread_cover: Option<SpreadCover>,
    pub margin_of_victory: u32,
    /// Synthetic recency marker: first record of a batch is newest, each
    /// following record is one day older. Only the ordering matters.
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchStore {
    pub h2h: Vec<MatchRecord>,
    pub team1: Vec<MatchRecord>,
    pub team2: Vec<MatchRecord>,
}

impl MatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_matches(&self) -> usize {
        self.h2h.len() + self.team1.len() + self.team2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_matches() == 0
    }

    pub fn records(&self, category: MatchCategory) -> &[MatchRecord] {
        match category {
            MatchCategory::H2h => &self.h2h,
            MatchCategory::Team1 => &self.team1,
            MatchCategory::Team2 => &self.team2,
        }
    }

    /// Replaces a category wholesale with one submitted batch of score
    /// pairs. For solo categories the pair is (named team, opponent); the
    /// opponent lands in the other slot. Returns the number of records.
    pub fn replace_category(
        &mut self,
        category: MatchCategory,
        pairs: &[(u32, u32)],
        ctx: &MatchContext,
    ) -> usize {
        let now = Utc::now().timestamp_millis();
        let records = match category {
            MatchCategory::H2h => &mut self.h2h,
            MatchCategory::Team1 => &mut self.team1,
            MatchCategory::Team2 => &mut self.team2,
        };
        records.clear();
        for (idx, &(own, other)) in pairs.iter().enumerate() {
            let (team1_score, team2_score) = match category {
                MatchCategory::H2h | MatchCategory::Team1 => (own, other),
                MatchCategory::Team2 => (other, own),
            };
            records.push(build_record(
                category,
                idx as u32 + 1,
                team1_score,
                team2_score,
                now - (idx as i64) * DAY_MS,
                ctx,
            ));
        }
        records.len()
    }

    pub fn clear(&mut self) {
        self.h2h.clear();
        self.team1.clear();
        self.team2.clear();
    }

    /// Re-derives the line-dependent marks after the betting lines change,
    /// without touching scores or outcomes.
    pub fn refresh_line_marks(&mut self, ctx: &MatchContext) {
        for record in self
            .h2h
            .iter_mut()
            .chain(self.team1.iter_mut())
            .chain(self.team2.iter_mut())
        {
            record.total_over_line = if ctx.total_line > 0.0 {
                Some(f64::from(record.total_score) > ctx.total_line)
            } else {
                None
            };
            record.spread_cover = spread_cover(record.team1_score, record.team2_score, ctx);
        }
    }

    /// Share of all entered matches whose total went over the line, in
    /// whole percent. `None` when no line is set or no matches exist.
    pub fn over_line_percentage(&self, total_line: f64) -> Option<u32> {
        if total_line <= 0.0 || self.is_empty() {
            return None;
        }
        let over = self
            .h2h
            .iter()
            .chain(self.team1.iter())
            .chain(self.team2.iter())
            .filter(|m| f64::from(m.total_score) > total_line)
            .count();
        let pct = (over as f64 / self.total_matches() as f64) * 100.0;
        Some(pct.round() as u32)
    }
}

fn build_record(
    category: MatchCategory,
    match_number: u32,
    team1_score: u32,
    team2_score: u32,
    timestamp_ms: i64,
    ctx: &MatchContext,
) -> MatchRecord {
    let total_score = team1_score + team2_score;
    let outcome = if team1_score == team2_score {
        MatchOutcome::Draw
    } else if team1_score > team2_score {
        MatchOutcome::Team1Wins
    } else {
        MatchOutcome::Team2Wins
    };
    MatchRecord {
        match_number,
        team1_score,
        team2_score,
        total_score,
        outcome,
        category,
        total_over_line: if ctx.total_line > 0.0 {
            Some(f64::from(total_score) > ctx.total_line)
        } else {
            None
        },
        spread_cover: spread_cover(team1_score, team2_score, ctx),
        margin_of_victory: team1_score.abs_diff(team2_score),
        timestamp_ms,
    }
}

/// Whether the favorite covered the configured spread in a historical
/// match. `None` when no positive spread is set.
pub fn spread_cover(team1_score: u32, team2_score: u32, ctx: &MatchContext) -> Option<SpreadCover> {
    if ctx.point_spread <= 0.0 {
        return None;
    }
    let (favorite, opposing) = match ctx.spread_direction {
        SpreadSide::Team1 => (f64::from(team1_score), f64::from(team2_score)),
        SpreadSide::Team2 => (f64::from(team2_score), f64::from(team1_score)),
    };
    let adjusted = favorite - ctx.point_spread;
    if adjusted > opposing {
        Some(SpreadCover::FavoriteCovered)
    } else if adjusted < opposing {
        Some(SpreadCover::UnderdogCovered)
    } else {
        Some(SpreadCover::Push)
    }
}
