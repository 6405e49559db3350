use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

pub const MIN_MATCHES_FOR_GOOD_ANALYSIS: usize = 5;
pub const MIN_MATCHES_FOR_EXCELLENT_ANALYSIS: usize = 10;
pub const MIN_H2H_MATCHES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Home,
    Away,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpreadSide {
    Team1,
    Team2,
}

/// Everything the user sets about the upcoming match. Mutated by the UI
/// between analysis runs, read-only during one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchContext {
    pub team1_name: String,
    pub team2_name: String,
    /// 0 means unranked.
    pub team1_ranking: u32,
    pub team2_ranking: u32,
    /// 1.0 is a neutral fixture, above 1 a high-stakes one, below 1 a friendly.
    pub importance: f64,
    /// Venue relative to team 1.
    pub location: Location,
    /// 0.0 means no total line set.
    pub total_line: f64,
    /// 0.0 means no spread set.
    pub point_spread: f64,
    pub spread_direction: SpreadSide,
}

impl Default for MatchContext {
    fn default() -> Self {
        Self {
            team1_name: "Team 1".to_string(),
            team2_name: "Team 2".to_string(),
            team1_ranking: 0,
            team2_ranking: 0,
            importance: 1.0,
            location: Location::Neutral,
            total_line: 0.0,
            point_spread: 0.0,
            spread_direction: SpreadSide::Team1,
        }
    }
}

impl MatchContext {
    pub fn validate_names(&self) -> Result<()> {
        if self.team1_name.trim().is_empty() || self.team2_name.trim().is_empty() {
            bail!("enter names for both teams");
        }
        if self.team1_name.trim() == self.team2_name.trim() {
            bail!("team names must be different");
        }
        Ok(())
    }

    /// +1 when team 1 is at home, -1 when away, 0 on neutral ground.
    pub fn location_factor(&self) -> f64 {
        match self.location {
            Location::Home => 1.0,
            Location::Away => -1.0,
            Location::Neutral => 0.0,
        }
    }

    /// Ranking difference team1 - team2, only when both are ranked.
    pub fn ranking_diff(&self) -> f64 {
        if self.team1_ranking > 0 && self.team2_ranking > 0 {
            f64::from(self.team1_ranking) - f64::from(self.team2_ranking)
        } else {
            0.0
        }
    }

    pub fn spread_sign(&self) -> f64 {
        match self.spread_direction {
            SpreadSide::Team1 => 1.0,
            SpreadSide::Team2 => -1.0,
        }
    }
}

/// Which simulated variants may contribute to the ensemble. A variant the
/// user toggled off and one whose backing library never loaded look the
/// same from here: excluded, weight redistributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCapabilities {
    pub catboost: bool,
    pub xgboost: bool,
    pub lightgbm: bool,
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self {
            catboost: true,
            xgboost: true,
            lightgbm: true,
        }
    }
}

impl ModelCapabilities {
    pub fn none() -> Self {
        Self {
            catboost: false,
            xgboost: false,
            lightgbm: false,
        }
    }

    pub fn any(&self) -> bool {
        self.catboost || self.xgboost || self.lightgbm
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataQuality {
    Insufficient,
    Good,
    Excellent,
}

pub fn data_quality(total_matches: usize, h2h_matches: usize) -> DataQuality {
    if total_matches >= MIN_MATCHES_FOR_EXCELLENT_ANALYSIS && h2h_matches >= MIN_H2H_MATCHES {
        DataQuality::Excellent
    } else if total_matches >= MIN_MATCHES_FOR_GOOD_ANALYSIS {
        DataQuality::Good
    } else {
        DataQuality::Insufficient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_validation_rejects_empty_and_duplicates() {
        let mut ctx = MatchContext::default();
        assert!(ctx.validate_names().is_ok());

        ctx.team2_name = "Team 1".to_string();
        assert!(ctx.validate_names().is_err());

        ctx.team2_name = "   ".to_string();
        assert!(ctx.validate_names().is_err());
    }

    #[test]
    fn ranking_diff_needs_both_ranks() {
        let mut ctx = MatchContext::default();
        ctx.team1_ranking = 3;
        assert_eq!(ctx.ranking_diff(), 0.0);
        ctx.team2_ranking = 10;
        assert_eq!(ctx.ranking_diff(), -7.0);
    }

    #[test]
    fn quality_buckets() {
        assert_eq!(data_quality(3, 0), DataQuality::Insufficient);
        assert_eq!(data_quality(5, 0), DataQuality::Good);
        assert_eq!(data_quality(10, 1), DataQuality::Good);
        assert_eq!(data_quality(10, 2), DataQuality::Excellent);
    }
}
