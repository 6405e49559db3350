use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::predict::{AnalysisOutcome, AnalysisSnapshot};
use crate::store::{MatchCategory, MatchOutcome, MatchRecord, SpreadCover};

pub struct ExportReport {
    pub matches: usize,
    pub prediction_rows: usize,
}

/// Writes the entered matches and the latest prediction to an .xlsx
/// workbook with one sheet per concern.
pub fn export_outcome(
    path: &Path,
    snapshot: &AnalysisSnapshot,
    outcome: &AnalysisOutcome,
) -> Result<ExportReport> {
    let ctx = &snapshot.context;

    let mut match_rows = vec![vec![
        "Category".to_string(),
        "Match #".to_string(),
        format!("{} Score", ctx.team1_name),
        format!("{} Score", ctx.team2_name),
        "Total".to_string(),
        "Outcome".to_string(),
        "Margin".to_string(),
        "Over Line".to_string(),
        "Spread Cover".to_string(),
    ]];
    for category in [MatchCategory::H2h, MatchCategory::Team1, MatchCategory::Team2] {
        for record in snapshot.store.records(category) {
            match_rows.push(match_row(record, snapshot));
        }
    }

    let result = &outcome.result;
    let prediction_rows: Vec<Vec<String>> = vec![
        vec!["Metric".to_string(), "Value".to_string()],
        row2(
            format!("{} Win Probability", ctx.team1_name),
            format!("{:.1}%", result.probs.team1),
        ),
        row2(
            format!("{} Win Probability", ctx.team2_name),
            format!("{:.1}%", result.probs.team2),
        ),
        row2("Draw Probability", format!("{:.1}%", result.probs.draw)),
        row2("Projected Total", format!("{:.2}", result.projected_total)),
        row2("Projected Margin", format!("{:+.2}", result.projected_margin)),
        row2(
            "Projected Score",
            format!(
                "{} {} - {} {}",
                ctx.team1_name, outcome.team1_projected, outcome.team2_projected, ctx.team2_name
            ),
        ),
        row2("Over/Under Edge", format!("{:.1}%", outcome.over_under_edge)),
        row2("Spread Edge", format!("{:.1}%", outcome.spread_edge)),
        row2("Total Recommendation", outcome.total_recommendation.clone()),
        row2("Spread Recommendation", outcome.spread_recommendation.clone()),
        row2("Weight: CatBoost", format!("{:.0}", result.weights.catboost)),
        row2("Weight: XGBoost", format!("{:.0}", result.weights.xgboost)),
        row2("Weight: LightGBM", format!("{:.0}", result.weights.lightgbm)),
        row2(
            "Weight: Statistical",
            format!("{:.0}", result.weights.statistical),
        ),
    ];

    let mut workbook = Workbook::new();
    write_sheet(workbook.add_worksheet(), "Matches", &match_rows)?;
    write_sheet(workbook.add_worksheet(), "Prediction", &prediction_rows)?;
    workbook
        .save(path)
        .with_context(|| format!("write workbook {}", path.display()))?;

    Ok(ExportReport {
        matches: match_rows.len() - 1,
        prediction_rows: prediction_rows.len() - 1,
    })
}

fn match_row(record: &MatchRecord, snapshot: &AnalysisSnapshot) -> Vec<String> {
    vec![
        category_label(record.category, snapshot).to_string(),
        record.match_number.to_string(),
        record.team1_score.to_string(),
        record.team2_score.to_string(),
        record.total_score.to_string(),
        outcome_label(record, snapshot),
        record.margin_of_victory.to_string(),
        match record.total_over_line {
            Some(true) => "Over".to_string(),
            Some(false) => "Under".to_string(),
            None => "-".to_string(),
        },
        match record.spread_cover {
            Some(SpreadCover::FavoriteCovered) => "Favorite".to_string(),
            Some(SpreadCover::UnderdogCovered) => "Underdog".to_string(),
            Some(SpreadCover::Push) => "Push".to_string(),
            None => "-".to_string(),
        },
    ]
}

fn category_label(category: MatchCategory, snapshot: &AnalysisSnapshot) -> String {
    match category {
        MatchCategory::H2h => "Head-to-Head".to_string(),
        MatchCategory::Team1 => snapshot.context.team1_name.clone(),
        MatchCategory::Team2 => snapshot.context.team2_name.clone(),
    }
}

/// Display names resolve here, at render time; the records themselves
/// only carry structural tags.
fn outcome_label(record: &MatchRecord, snapshot: &AnalysisSnapshot) -> String {
    let ctx = &snapshot.context;
    match (record.outcome, record.category) {
        (MatchOutcome::Draw, _) => "Draw".to_string(),
        (MatchOutcome::Team1Wins, MatchCategory::Team2) => "Opponent Wins".to_string(),
        (MatchOutcome::Team1Wins, _) => format!("{} Wins", ctx.team1_name),
        (MatchOutcome::Team2Wins, MatchCategory::Team1) => "Opponent Wins".to_string(),
        (MatchOutcome::Team2Wins, _) => format!("{} Wins", ctx.team2_name),
    }
}

fn row2(metric: impl Into<String>, value: impl Into<String>) -> Vec<String> {
    vec![metric.into(), value.into()]
}

fn write_sheet(worksheet: &mut Worksheet, name: &str, rows: &[Vec<String>]) -> Result<()> {
    worksheet.set_name(name).context("worksheet name")?;
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            worksheet
                .write_string(r as u32, c as u16, cell)
                .with_context(|| format!("write {name} row {r}"))?;
        }
    }
    Ok(())
}
