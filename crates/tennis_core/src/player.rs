//! Player parameters and side tagging.
//!
//! A match always has exactly two participants. Everything that is tracked
//! per participant is stored in a [`PerSide`] pair indexed by [`Side`], so
//! there is no lookup by name and no reliance on reference identity.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Index, IndexMut};

use crate::error::ConfigError;

/// Which of the two participants a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player1,
    Player2,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Player1, Side::Player2];

    pub fn opponent(self) -> Self {
        match self {
            Side::Player1 => Side::Player2,
            Side::Player2 => Side::Player1,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Player1 => 0,
            Side::Player2 => 1,
        }
    }
}

/// Fixed two-slot container, one value per [`Side`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerSide<T>(pub [T; 2]);

impl<T> PerSide<T> {
    pub fn new(player1: T, player2: T) -> Self {
        Self([player1, player2])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        Side::BOTH.into_iter().zip(self.0.iter())
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> PerSide<U> {
        let [a, b] = self.0;
        PerSide([f(a), f(b)])
    }
}

impl<T: Copy + Add<Output = T>> PerSide<T> {
    pub fn total(&self) -> T {
        self.0[0] + self.0[1]
    }
}

impl<T> Index<Side> for PerSide<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        &self.0[side.index()]
    }
}

impl<T> IndexMut<Side> for PerSide<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        &mut self.0[side.index()]
    }
}

impl<T: Copy + AddAssign> AddAssign for PerSide<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.0[0] += rhs.0[0];
        self.0[1] += rhs.0[1];
    }
}

/// Static serve model of one player. Immutable for the lifetime of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Probability of winning a point on serve once neither an ace nor a
    /// double fault occurred.
    pub serve_win_prob: f64,
    pub ace_prob: f64,
    pub double_fault_prob: f64,
}

impl Player {
    pub fn new(
        name: impl Into<String>,
        serve_win_prob: f64,
        ace_prob: f64,
        double_fault_prob: f64,
    ) -> Self {
        Self {
            name: name.into(),
            serve_win_prob,
            ace_prob,
            double_fault_prob,
        }
    }

    /// Reject empty names and any probability outside `[0, 1]` (NaN included).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        let fields = [
            ("serve_win_prob", self.serve_win_prob),
            ("ace_prob", self.ace_prob),
            ("double_fault_prob", self.double_fault_prob),
        ];
        for (field, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability {
                    player: self.name.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Validate both players of a match, including name uniqueness.
pub fn validate_pair(players: &PerSide<Player>) -> Result<(), ConfigError> {
    for (_, player) in players.iter() {
        player.validate()?;
    }
    if players[Side::Player1].name == players[Side::Player2].name {
        return Err(ConfigError::DuplicateName(players[Side::Player1].name.clone()));
    }
    Ok(())
}
