// Trap-the-cat game types
// Shared by the decision engine, the game session and the binaries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::grid::MAX_GRID_SIZE;

/// A grid cell addressed by (row, col), 0-indexed
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Cell { row, col }
    }

    /// Offsets this cell by (d_row, d_col) without any bounds check
    pub fn offset(&self, d_row: i32, d_col: i32) -> Cell {
        Cell {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Ordered sequence of cells from start to goal, start inclusive
pub type Path = Vec<Cell>;

/// The single action the agent takes on its turn
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Step to an adjacent free cell
    Move { to: Cell },
    /// Remove an adjacent obstacle, then step to `to`
    Attack { remove: Cell, to: Cell },
    /// No legal action remains; the opponent wins
    Forfeit,
}

impl Action {
    /// Destination cell of the agent, if the action moves it
    pub fn destination(&self) -> Option<Cell> {
        match self {
            Action::Move { to } | Action::Attack { to, .. } => Some(*to),
            Action::Forfeit => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Move { .. } => "move",
            Action::Attack { .. } => "attack",
            Action::Forfeit => "forfeit",
        }
    }
}

/// Per-game monotonic flags. Once set they stay set until a new game.
#[derive(Deserialize, Serialize, Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct TurnFlags {
    #[serde(default)]
    pub has_attacked: bool,
    #[serde(default)]
    pub lure_ignored: bool,
    /// The opponent has already spent its one lure this game
    #[serde(default)]
    pub lure_used: bool,
}

impl TurnFlags {
    /// Combines two flag snapshots; a flag set in either stays set
    pub fn merge(self, other: TurnFlags) -> TurnFlags {
        TurnFlags {
            has_attacked: self.has_attacked || other.has_attacked,
            lure_ignored: self.lure_ignored || other.lure_ignored,
            lure_used: self.lure_used || other.lure_used,
        }
    }
}

/// Whose half-turn it is
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    Opponent,
    Agent,
}

/// How a finished game ended
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The agent reached a boundary cell
    AgentEscaped,
    /// The agent had no legal action left
    AgentTrapped,
}

/// Snapshot of a game handed to the engine each turn
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone)]
pub struct GameState {
    pub grid_size: usize,
    pub agent: Cell,
    #[serde(default)]
    pub obstacles: BTreeSet<Cell>,
    #[serde(default)]
    pub lure: Option<Cell>,
    #[serde(default)]
    pub flags: TurnFlags,
}

impl GameState {
    /// Fresh game: agent in the centre, empty board
    pub fn new(grid_size: usize) -> Self {
        let centre = (grid_size / 2) as i32;
        GameState {
            grid_size,
            agent: Cell::new(centre, centre),
            obstacles: BTreeSet::new(),
            lure: None,
            flags: TurnFlags::default(),
        }
    }

    /// Checks the snapshot's structural invariants
    ///
    /// # Returns
    /// * `Result<(), String>` - Description of the first violated invariant
    pub fn validate(&self) -> Result<(), String> {
        let n = self.grid_size as i64;
        let in_bounds =
            |c: &Cell| c.row >= 0 && (c.row as i64) < n && c.col >= 0 && (c.col as i64) < n;

        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(format!(
                "Grid size must be between 1 and {}, got {}",
                MAX_GRID_SIZE, self.grid_size
            ));
        }
        if !in_bounds(&self.agent) {
            return Err(format!("Agent {} is outside the {}x{} grid", self.agent, n, n));
        }
        if let Some(bad) = self.obstacles.iter().find(|c| !in_bounds(c)) {
            return Err(format!("Obstacle {} is outside the {}x{} grid", bad, n, n));
        }
        if self.obstacles.contains(&self.agent) {
            return Err(format!("Agent {} stands on an obstacle", self.agent));
        }
        if let Some(lure) = self.lure {
            if !in_bounds(&lure) {
                return Err(format!("Lure {} is outside the {}x{} grid", lure, n, n));
            }
            if self.obstacles.contains(&lure) {
                return Err(format!("Lure {} lies on an obstacle", lure));
            }
        }
        Ok(())
    }
}
