use crate::context::{MatchContext, SpreadSide};

/// Recommendation threshold: projections within 5% of the line carry no
/// edge worth acting on.
const EDGE_THRESHOLD: f64 = 5.0;

/// Percent deviation of the projected total from the posted line. Zero
/// when no line is set.
pub fn over_under_edge(projected_total: f64, total_line: f64) -> f64 {
    if total_line <= 0.0 {
        return 0.0;
    }
    (projected_total - total_line) / total_line.abs().max(1.0) * 100.0
}

/// Percent deviation of the projected margin from the spread, signed from
/// team 1's perspective. Zero when no spread is set.
pub fn spread_edge(projected_margin: f64, ctx: &MatchContext) -> f64 {
    if ctx.point_spread <= 0.0 {
        return 0.0;
    }
    let adjusted_spread = match ctx.spread_direction {
        SpreadSide::Team1 => ctx.point_spread,
        SpreadSide::Team2 => -ctx.point_spread,
    };
    (projected_margin - adjusted_spread) / adjusted_spread.abs().max(1.0) * 100.0
}

pub fn over_under_recommendation(edge: f64, total_line: f64) -> String {
    if total_line <= 0.0 {
        return "NO LINE SET".to_string();
    }
    if edge > EDGE_THRESHOLD {
        "OVER".to_string()
    } else if edge < -EDGE_THRESHOLD {
        "UNDER".to_string()
    } else {
        "NO EDGE".to_string()
    }
}

/// Names the side expected to cover. A positive edge means the projected
/// margin clears the spread, so the favorite covers; a negative edge
/// backs the underdog with the points.
pub fn spread_recommendation(edge: f64, ctx: &MatchContext) -> String {
    if ctx.point_spread <= 0.0 {
        return "NO SPREAD SET".to_string();
    }
    if edge > EDGE_THRESHOLD {
        match ctx.spread_direction {
            SpreadSide::Team1 => format!("{} -{}", ctx.team1_name, ctx.point_spread),
            SpreadSide::Team2 => format!("{} -{}", ctx.team2_name, ctx.point_spread),
        }
    } else if edge < -EDGE_THRESHOLD {
        match ctx.spread_direction {
            SpreadSide::Team1 => format!("{} +{}", ctx.team2_name, ctx.point_spread),
            SpreadSide::Team2 => format!("{} +{}", ctx.team1_name, ctx.point_spread),
        }
    } else {
        "NO EDGE".to_string()
    }
}

/// Splits the projected total along the projected margin into per-team
/// scores, rounded to whole goals.
pub fn projected_scores(projected_total: f64, projected_margin: f64) -> (i32, i32) {
    let team1 = (projected_total / 2.0 + projected_margin / 2.0).round() as i32;
    let team2 = (projected_total / 2.0 - projected_margin / 2.0).round() as i32;
    (team1, team2)
}
