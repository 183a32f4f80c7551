//! Point log records.
//!
//! One [`PointRecord`] is appended per point played. The field order is the
//! column order downstream CSV consumers rely on; do not reorder.

use serde::{Deserialize, Serialize};

use super::probability::ProbabilitySnapshot;
use crate::player::Side;

/// Column names, in serialization order. `p1`/`p2` are placeholders for the
/// player names.
pub const POINT_LOG_COLUMNS: [&str; 15] = [
    "server",
    "receiver",
    "point_score",
    "game_score",
    "set_score",
    "p1_match_win_prob",
    "p2_match_win_prob",
    "p1_set_win_prob",
    "p2_set_win_prob",
    "p1_game_win_prob",
    "p2_game_win_prob",
    "p1_next_point_win_prob",
    "p2_next_point_win_prob",
    "next_serve_ace_prob",
    "tiebreak_prob",
];

/// Post-point snapshot of one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub server: String,
    pub receiver: String,
    pub point_score: String,
    pub game_score: String,
    pub set_score: String,
    pub p1_match_win_prob: f64,
    pub p2_match_win_prob: f64,
    pub p1_set_win_prob: f64,
    pub p2_set_win_prob: f64,
    pub p1_game_win_prob: f64,
    pub p2_game_win_prob: f64,
    pub p1_next_point_win_prob: f64,
    pub p2_next_point_win_prob: f64,
    pub next_serve_ace_prob: f64,
    pub tiebreak_prob: f64,
}

impl PointRecord {
    pub fn new(
        server: &str,
        receiver: &str,
        scores: [String; 3],
        probs: &ProbabilitySnapshot,
    ) -> Self {
        let [point_score, game_score, set_score] = scores;
        let (p1, p2) = (Side::Player1, Side::Player2);
        Self {
            server: server.to_string(),
            receiver: receiver.to_string(),
            point_score,
            game_score,
            set_score,
            p1_match_win_prob: probs.match_win[p1],
            p2_match_win_prob: probs.match_win[p2],
            p1_set_win_prob: probs.set_win[p1],
            p2_set_win_prob: probs.set_win[p2],
            p1_game_win_prob: probs.game_win[p1],
            p2_game_win_prob: probs.game_win[p2],
            p1_next_point_win_prob: probs.next_point_win[p1],
            p2_next_point_win_prob: probs.next_point_win[p2],
            next_serve_ace_prob: probs.next_serve_ace,
            tiebreak_prob: probs.tiebreak,
        }
    }

    /// Probability fields in column order.
    pub fn probabilities(&self) -> [f64; 10] {
        [
            self.p1_match_win_prob,
            self.p2_match_win_prob,
            self.p1_set_win_prob,
            self.p2_set_win_prob,
            self.p1_game_win_prob,
            self.p2_game_win_prob,
            self.p1_next_point_win_prob,
            self.p2_next_point_win_prob,
            self.next_serve_ace_prob,
            self.tiebreak_prob,
        ]
    }
}

/// Header row with the placeholders replaced by the player names.
pub fn header_for(player1: &str, player2: &str) -> Vec<String> {
    POINT_LOG_COLUMNS
        .iter()
        .map(|col| {
            if let Some(rest) = col.strip_prefix("p1_") {
                format!("{}_{}", player1, rest)
            } else if let Some(rest) = col.strip_prefix("p2_") {
                format!("{}_{}", player2, rest)
            } else {
                col.to_string()
            }
        })
        .collect()
}

/// Point logs of one batch, handed to a sink.
#[derive(Debug, Clone, Default)]
pub struct BatchLog {
    pub batch_index: usize,
    /// Global index of the first match in the batch.
    pub first_match: u64,
    pub records: Vec<PointRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_substitutes_names() {
        let header = header_for("Federer", "Nadal");
        assert_eq!(header.len(), POINT_LOG_COLUMNS.len());
        assert_eq!(header[0], "server");
        assert_eq!(header[5], "Federer_match_win_prob");
        assert_eq!(header[6], "Nadal_match_win_prob");
        assert_eq!(header[13], "next_serve_ace_prob");
        assert_eq!(header[14], "tiebreak_prob");
    }

    #[test]
    fn test_serialized_fields_match_columns() {
        let record = PointRecord {
            server: "A".into(),
            receiver: "B".into(),
            point_score: "15-0".into(),
            game_score: "0-0".into(),
            set_score: "0-0".into(),
            p1_match_win_prob: 0.5,
            p2_match_win_prob: 0.5,
            p1_set_win_prob: 0.5,
            p2_set_win_prob: 0.5,
            p1_game_win_prob: 0.7,
            p2_game_win_prob: 0.3,
            p1_next_point_win_prob: 0.67,
            p2_next_point_win_prob: 0.33,
            next_serve_ace_prob: 0.11,
            tiebreak_prob: 0.1,
        };
        let value = serde_json::to_value(&record).unwrap();
        let mut keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        let mut expected: Vec<&str> = POINT_LOG_COLUMNS.to_vec();
        keys.sort_unstable();
        expected.sort_unstable();
        assert_eq!(keys, expected);
        assert_eq!(record.probabilities()[8], 0.11);
    }
}
