use std::collections::VecDeque;

use crate::context::{self, DataQuality, Location, MatchContext, ModelCapabilities, SpreadSide};
use crate::parse;
use crate::predict::{AnalysisDelta, AnalysisOutcome, AnalysisSnapshot};
use crate::store::{MatchCategory, MatchStore};

const LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Entry,
    Results,
}

/// Form fields in Tab order. `Location` and `SpreadDirection` are cycled
/// with the arrow keys rather than typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Team1Name,
    Team2Name,
    Team1Ranking,
    Team2Ranking,
    Importance,
    Location,
    TotalLine,
    PointSpread,
    SpreadDirection,
    H2hTeam1,
    H2hTeam2,
    Team1Scores,
    Team1Opponent,
    Team2Scores,
    Team2Opponent,
}

const FIELD_ORDER: [InputField; 15] = [
    InputField::Team1Name,
    InputField::Team2Name,
    InputField::Team1Ranking,
    InputField::Team2Ranking,
    InputField::Importance,
    InputField::Location,
    InputField::TotalLine,
    InputField::PointSpread,
    InputField::SpreadDirection,
    InputField::H2hTeam1,
    InputField::H2hTeam2,
    InputField::Team1Scores,
    InputField::Team1Opponent,
    InputField::Team2Scores,
    InputField::Team2Opponent,
];

/// Raw text buffers behind the form; context values are re-parsed from
/// these after every edit, with lenient fallbacks.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub team1_name: String,
    pub team2_name: String,
    pub team1_ranking: String,
    pub team2_ranking: String,
    pub importance: String,
    pub total_line: String,
    pub point_spread: String,
    pub h2h_team1: String,
    pub h2h_team2: String,
    pub team1_scores: String,
    pub team1_opponent: String,
    pub team2_scores: String,
    pub team2_opponent: String,
}

pub struct AppState {
    pub screen: Screen,
    pub focus: InputField,
    pub inputs: Inputs,
    pub store: MatchStore,
    pub context: MatchContext,
    pub capabilities: ModelCapabilities,
    pub last_outcome: Option<AnalysisOutcome>,
    pub analysis_busy: bool,
    /// Set when the run needs an explicit y/n because the data is thin.
    pub pending_confirmation: bool,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Entry,
            focus: InputField::Team1Name,
            inputs: Inputs::default(),
            store: MatchStore::new(),
            context: MatchContext::default(),
            capabilities: ModelCapabilities::default(),
            last_outcome: None,
            analysis_busy: false,
            pending_confirmation: false,
            help_overlay: false,
            logs: VecDeque::new(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        if self.logs.len() >= LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(msg.into());
    }

    pub fn focus_next(&mut self) {
        let idx = FIELD_ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = FIELD_ORDER[(idx + 1) % FIELD_ORDER.len()];
    }

    pub fn focus_prev(&mut self) {
        let idx = FIELD_ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = FIELD_ORDER[(idx + FIELD_ORDER.len() - 1) % FIELD_ORDER.len()];
    }

    /// The text buffer behind the focused field, if it takes typed input.
    pub fn focused_buffer_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            InputField::Team1Name => Some(&mut self.inputs.team1_name),
            InputField::Team2Name => Some(&mut self.inputs.team2_name),
            InputField::Team1Ranking => Some(&mut self.inputs.team1_ranking),
            InputField::Team2Ranking => Some(&mut self.inputs.team2_ranking),
            InputField::Importance => Some(&mut self.inputs.importance),
            InputField::TotalLine => Some(&mut self.inputs.total_line),
            InputField::PointSpread => Some(&mut self.inputs.point_spread),
            InputField::H2hTeam1 => Some(&mut self.inputs.h2h_team1),
            InputField::H2hTeam2 => Some(&mut self.inputs.h2h_team2),
            InputField::Team1Scores => Some(&mut self.inputs.team1_scores),
            InputField::Team1Opponent => Some(&mut self.inputs.team1_opponent),
            InputField::Team2Scores => Some(&mut self.inputs.team2_scores),
            InputField::Team2Opponent => Some(&mut self.inputs.team2_opponent),
            InputField::Location | InputField::SpreadDirection => None,
        }
    }

    /// Left/right on the two option fields.
    pub fn cycle_focused_option(&mut self) {
        match self.focus {
            InputField::Location => {
                self.context.location = match self.context.location {
                    Location::Neutral => Location::Home,
                    Location::Home => Location::Away,
                    Location::Away => Location::Neutral,
                };
            }
            InputField::SpreadDirection => {
                self.context.spread_direction = match self.context.spread_direction {
                    SpreadSide::Team1 => SpreadSide::Team2,
                    SpreadSide::Team2 => SpreadSide::Team1,
                };
                self.store.refresh_line_marks(&self.context);
            }
            _ => {}
        }
    }

    /// Re-derives the context from the raw buffers, with the form's
    /// lenient fallbacks, then refreshes line-dependent marks.
    pub fn apply_context_inputs(&mut self) {
        let name1 = self.inputs.team1_name.trim();
        let name2 = self.inputs.team2_name.trim();
        self.context.team1_name = if name1.is_empty() {
            "Team 1".to_string()
        } else {
            name1.to_string()
        };
        self.context.team2_name = if name2.is_empty() {
            "Team 2".to_string()
        } else {
            name2.to_string()
        };
        self.context.team1_ranking = parse::parse_or(&self.inputs.team1_ranking, 0);
        self.context.team2_ranking = parse::parse_or(&self.inputs.team2_ranking, 0);
        self.context.importance = parse::parse_or(&self.inputs.importance, 1.0);
        self.context.total_line = parse::parse_or(&self.inputs.total_line, 0.0);
        self.context.point_spread = parse::parse_or(&self.inputs.point_spread, 0.0);
        self.store.refresh_line_marks(&self.context);
    }

    /// Fills the form buffers from a loaded session so the UI shows what
    /// was restored.
    pub fn sync_inputs_from_context(&mut self) {
        self.inputs.team1_name = self.context.team1_name.clone();
        self.inputs.team2_name = self.context.team2_name.clone();
        self.inputs.team1_ranking = if self.context.team1_ranking > 0 {
            self.context.team1_ranking.to_string()
        } else {
            String::new()
        };
        self.inputs.team2_ranking = if self.context.team2_ranking > 0 {
            self.context.team2_ranking.to_string()
        } else {
            String::new()
        };
        self.inputs.importance = format!("{}", self.context.importance);
        self.inputs.total_line = if self.context.total_line > 0.0 {
            format!("{}", self.context.total_line)
        } else {
            String::new()
        };
        self.inputs.point_spread = if self.context.point_spread > 0.0 {
            format!("{}", self.context.point_spread)
        } else {
            String::new()
        };
    }

    /// Commits the score section the focused field belongs to. Returns
    /// true when a batch landed in the store.
    pub fn commit_focused_scores(&mut self) -> bool {
        let (category, own, other) = match self.focus {
            InputField::H2hTeam1 | InputField::H2hTeam2 => (
                MatchCategory::H2h,
                self.inputs.h2h_team1.clone(),
                self.inputs.h2h_team2.clone(),
            ),
            InputField::Team1Scores | InputField::Team1Opponent => (
                MatchCategory::Team1,
                self.inputs.team1_scores.clone(),
                self.inputs.team1_opponent.clone(),
            ),
            InputField::Team2Scores | InputField::Team2Opponent => (
                MatchCategory::Team2,
                self.inputs.team2_scores.clone(),
                self.inputs.team2_opponent.clone(),
            ),
            _ => return false,
        };

        let parsed = match parse::pair_scores(&own, &other) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.push_log(format!("[ERROR] {err}"));
                return false;
            }
        };
        if parsed.truncated {
            self.push_log(format!(
                "[WARN] Unequal score lists; using the first {} pairs",
                parsed.pairs.len()
            ));
        }

        let added = self
            .store
            .replace_category(category, &parsed.pairs, &self.context);
        let label = match category {
            MatchCategory::H2h => "head-to-head".to_string(),
            MatchCategory::Team1 => self.context.team1_name.clone(),
            MatchCategory::Team2 => self.context.team2_name.clone(),
        };
        self.push_log(format!("[INFO] Added {added} {label} matches"));
        self.clear_score_buffers(category);
        true
    }

    fn clear_score_buffers(&mut self, category: MatchCategory) {
        match category {
            MatchCategory::H2h => {
                self.inputs.h2h_team1.clear();
                self.inputs.h2h_team2.clear();
            }
            MatchCategory::Team1 => {
                self.inputs.team1_scores.clear();
                self.inputs.team1_opponent.clear();
            }
            MatchCategory::Team2 => {
                self.inputs.team2_scores.clear();
                self.inputs.team2_opponent.clear();
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.store.clear();
        self.last_outcome = None;
        self.pending_confirmation = false;
        self.push_log("[INFO] All match data cleared");
    }

    pub fn toggle_catboost(&mut self) {
        self.capabilities.catboost = !self.capabilities.catboost;
        self.log_capability("CatBoost", self.capabilities.catboost);
    }

    pub fn toggle_xgboost(&mut self) {
        self.capabilities.xgboost = !self.capabilities.xgboost;
        self.log_capability("XGBoost", self.capabilities.xgboost);
    }

    pub fn toggle_lightgbm(&mut self) {
        self.capabilities.lightgbm = !self.capabilities.lightgbm;
        self.log_capability("LightGBM", self.capabilities.lightgbm);
    }

    fn log_capability(&mut self, name: &str, enabled: bool) {
        let status = if enabled { "enabled" } else { "disabled" };
        self.push_log(format!("[INFO] {name} {status}"));
    }

    pub fn data_quality_line(&self) -> String {
        let total = self.store.total_matches();
        match context::data_quality(total, self.store.h2h.len()) {
            DataQuality::Excellent => "Excellent data quality for accurate predictions".to_string(),
            DataQuality::Good => "Good data quality for reliable predictions".to_string(),
            DataQuality::Insufficient => format!(
                "Add more match data ({} more needed for good quality)",
                context::MIN_MATCHES_FOR_GOOD_ANALYSIS.saturating_sub(total)
            ),
        }
    }

    pub fn snapshot(&self) -> AnalysisSnapshot {
        AnalysisSnapshot {
            store: self.store.clone(),
            context: self.context.clone(),
            capabilities: self.capabilities,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a worker reply to the UI state.
pub fn apply_delta(state: &mut AppState, delta: AnalysisDelta) {
    state.analysis_busy = false;
    match delta {
        AnalysisDelta::Completed(outcome) => {
            state.last_outcome = Some(*outcome);
            state.screen = Screen::Results;
            state.push_log("[INFO] Analysis complete");
        }
        AnalysisDelta::Failed { error, fallback } => {
            state.last_outcome = Some(*fallback);
            state.screen = Screen::Results;
            state.push_log(format!(
                "[WARN] Analysis failed ({error}); showing statistical result"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_cycles_through_every_field() {
        let mut state = AppState::new();
        for _ in 0..FIELD_ORDER.len() {
            state.focus_next();
        }
        assert_eq!(state.focus, InputField::Team1Name);
        state.focus_prev();
        assert_eq!(state.focus, InputField::Team2Opponent);
    }

    #[test]
    fn committing_scores_populates_the_store_and_clears_buffers() {
        let mut state = AppState::new();
        state.inputs.h2h_team1 = "2,1,3".to_string();
        state.inputs.h2h_team2 = "1,1,0".to_string();
        state.focus = InputField::H2hTeam1;

        assert!(state.commit_focused_scores());
        assert_eq!(state.store.h2h.len(), 3);
        assert!(state.inputs.h2h_team1.is_empty());
    }

    #[test]
    fn bad_scores_are_rejected_with_a_log() {
        let mut state = AppState::new();
        state.inputs.h2h_team1 = "2,x".to_string();
        state.inputs.h2h_team2 = "1,1".to_string();
        state.focus = InputField::H2hTeam2;

        assert!(!state.commit_focused_scores());
        assert!(state.store.h2h.is_empty());
        assert!(state.logs.back().unwrap().starts_with("[ERROR]"));
    }

    #[test]
    fn context_inputs_fall_back_leniently() {
        let mut state = AppState::new();
        state.inputs.team1_name = "  ".to_string();
        state.inputs.importance = "bogus".to_string();
        state.inputs.total_line = "2.5".to_string();
        state.apply_context_inputs();

        assert_eq!(state.context.team1_name, "Team 1");
        assert_eq!(state.context.importance, 1.0);
        assert_eq!(state.context.total_line, 2.5);
    }

    #[test]
    fn delta_application_updates_result_and_busy_flag() {
        use crate::predict::{self, AnalysisDelta};

        let mut state = AppState::new();
        state.analysis_busy = true;
        let outcome = predict::statistical_outcome(&state.snapshot());
        apply_delta(&mut state, AnalysisDelta::Completed(Box::new(outcome)));

        assert!(!state.analysis_busy);
        assert!(state.last_outcome.is_some());
        assert_eq!(state.screen, Screen::Results);
    }
}
