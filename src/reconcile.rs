use crate::statistical::WinProbs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictedWinner {
    Team1,
    Team2,
    Draw,
}

/// The outcome with the strictly highest probability; any tie reads as a
/// draw.
pub fn predicted_winner(probs: &WinProbs) -> PredictedWinner {
    if probs.team1 > probs.team2 && probs.team1 > probs.draw {
        PredictedWinner::Team1
    } else if probs.team2 > probs.team1 && probs.team2 > probs.draw {
        PredictedWinner::Team2
    } else {
        PredictedWinner::Draw
    }
}

fn margin_winner(margin: f64) -> PredictedWinner {
    if margin > 0.0 {
        PredictedWinner::Team1
    } else if margin < 0.0 {
        PredictedWinner::Team2
    } else {
        PredictedWinner::Draw
    }
}

/// Forces the projected margin to agree with the probability-implied
/// winner. When they disagree the margin is halved and re-signed (or
/// zeroed for a draw); the probabilities are never touched.
pub fn reconcile_margin(probs: &WinProbs, margin: f64) -> f64 {
    let winner = predicted_winner(probs);
    if margin_winner(margin) == winner {
        return margin;
    }
    match winner {
        PredictedWinner::Team1 => margin.abs() * 0.5,
        PredictedWinner::Team2 => -margin.abs() * 0.5,
        PredictedWinner::Draw => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probs(team1: f64, team2: f64, draw: f64) -> WinProbs {
        WinProbs { team1, team2, draw }
    }

    #[test]
    fn consistent_margin_passes_through() {
        let p = probs(50.0, 30.0, 20.0);
        assert_eq!(reconcile_margin(&p, 1.4), 1.4);

        let p = probs(20.0, 55.0, 25.0);
        assert_eq!(reconcile_margin(&p, -0.8), -0.8);
    }

    #[test]
    fn disagreement_halves_and_resigns() {
        // Probabilities favor team 1, margin points the other way.
        let p = probs(50.0, 30.0, 20.0);
        assert_eq!(reconcile_margin(&p, -2.0), 1.0);

        let p = probs(25.0, 55.0, 20.0);
        assert_eq!(reconcile_margin(&p, 3.0), -1.5);
    }

    #[test]
    fn draw_prediction_zeroes_the_margin() {
        let p = probs(30.0, 30.0, 40.0);
        assert_eq!(reconcile_margin(&p, 1.7), 0.0);
        assert_eq!(reconcile_margin(&p, -0.3), 0.0);
        assert_eq!(reconcile_margin(&p, 0.0), 0.0);
    }

    #[test]
    fn ties_read_as_draw() {
        assert_eq!(predicted_winner(&probs(40.0, 40.0, 20.0)), PredictedWinner::Draw);
        assert_eq!(predicted_winner(&probs(45.0, 30.0, 45.0)), PredictedWinner::Draw);
        assert_eq!(predicted_winner(&probs(50.0, 20.0, 30.0)), PredictedWinner::Team1);
    }

    #[test]
    fn output_sign_matches_winner_for_nonzero_margins() {
        let cases = [
            (probs(60.0, 25.0, 15.0), -4.0),
            (probs(60.0, 25.0, 15.0), 2.0),
            (probs(10.0, 70.0, 20.0), 5.0),
            (probs(10.0, 70.0, 20.0), -1.0),
            (probs(20.0, 20.0, 60.0), 9.0),
        ];
        for (p, margin) in cases {
            let out = reconcile_margin(&p, margin);
            assert_eq!(margin_winner(out), predicted_winner(&p));
        }
    }
}
