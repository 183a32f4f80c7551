//! Scoring rules and score display.
//!
//! Rule predicates are plain functions over raw counts so they can be
//! checked in isolation. Display strings are always server-first.

use super::match_state::MatchState;
use crate::config::GAMES_PER_SET;

/// Points needed to win a regular game.
pub const GAME_POINTS: u32 = 4;
/// Winning margin for games, sets and tiebreaks.
pub const WIN_MARGIN: u32 = 2;

pub const GAME_LABEL: &str = "GAME";
pub const SET_LABEL: &str = "SET";
pub const DEUCE_LABEL: &str = "Deuce";

/// First to `target` with a lead of at least two.
#[inline]
pub fn is_race_won(a: u32, b: u32, target: u32) -> bool {
    a.max(b) >= target && a.abs_diff(b) >= WIN_MARGIN
}

pub fn is_game_won(a: u32, b: u32) -> bool {
    is_race_won(a, b, GAME_POINTS)
}

/// Regular set end. 6-6 is not a finished set; it goes to a tiebreak.
pub fn is_set_won(a: u32, b: u32) -> bool {
    is_race_won(a, b, GAMES_PER_SET)
}

pub fn is_tiebreak_due(a: u32, b: u32) -> bool {
    a == GAMES_PER_SET && b == GAMES_PER_SET
}

pub fn is_tiebreak_won(a: u32, b: u32, target: u32) -> bool {
    is_race_won(a, b, target)
}

fn call(points: u32) -> String {
    match points {
        0 => "0".to_string(),
        1 => "15".to_string(),
        2 => "30".to_string(),
        3 => "40".to_string(),
        n => n.to_string(),
    }
}

/// Point score of a regular game, server first.
pub fn game_point_display(server_points: u32, receiver_points: u32) -> String {
    if server_points == receiver_points && server_points >= 3 {
        return DEUCE_LABEL.to_string();
    }
    if server_points.max(receiver_points) >= GAME_POINTS {
        return match server_points.abs_diff(receiver_points) {
            1 if server_points > receiver_points => "Ad-In".to_string(),
            1 => "Ad-Out".to_string(),
            _ => GAME_LABEL.to_string(),
        };
    }
    format!("{}-{}", call(server_points), call(receiver_points))
}

/// Point score of a tiebreak, server first, in raw points.
pub fn tiebreak_point_display(server_points: u32, receiver_points: u32) -> String {
    format!("{}-{}", server_points, receiver_points)
}

pub fn point_display(state: &MatchState) -> String {
    let (s, r) = (state.points[state.server], state.points[state.receiver()]);
    if state.is_tiebreak {
        tiebreak_point_display(s, r)
    } else {
        game_point_display(s, r)
    }
}

pub fn game_display(state: &MatchState) -> String {
    format!("{}-{}", state.games[state.server], state.games[state.receiver()])
}

pub fn set_display(state: &MatchState) -> String {
    format!("{}-{}", state.sets[state.server], state.sets[state.receiver()])
}
