// Game session: owns the live state and enforces the rules between turns
//
// The opponent places obstacles (and at most one lure per game); the cat
// answers with a Decision from the Bot. Flags only ever get set here, and only
// `reset` clears them.

use log::{info, warn};

use crate::bot::Decision;
use crate::grid::Grid;
use crate::types::{Action, Cell, GameState, Outcome, Turn};

#[derive(Debug, Clone)]
pub struct Game {
    grid: Grid,
    state: GameState,
    turn: Turn,
    outcome: Option<Outcome>,
    turns_played: u32,
}

impl Game {
    /// Starts a new game with the cat in the centre and the opponent to move
    pub fn new(grid: Grid) -> Self {
        Game {
            grid,
            state: GameState::new(grid.size()),
            turn: Turn::Opponent,
            outcome: None,
            turns_played: 0,
        }
    }

    /// Resumes a game from a snapshot, with the opponent to move
    pub fn from_state(grid: Grid, state: GameState) -> Result<Self, String> {
        state.validate()?;
        if state.grid_size != grid.size() {
            return Err(format!(
                "Snapshot is for a {}x{} grid, game uses {}x{}",
                state.grid_size,
                state.grid_size,
                grid.size(),
                grid.size()
            ));
        }
        let mut game = Game {
            grid,
            state,
            turn: Turn::Opponent,
            outcome: None,
            turns_played: 0,
        };
        game.outcome = game.check_outcome();
        Ok(game)
    }

    /// Back to the initial position; the only place flags are cleared
    pub fn reset(&mut self) {
        info!("New game on a {}x{} grid", self.grid.size(), self.grid.size());
        *self = Game::new(self.grid);
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Completed opponent + cat turn pairs
    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    /// Opponent blocks a free cell, ending its turn
    pub fn place_obstacle(&mut self, cell: Cell) -> Result<(), String> {
        self.expect_turn(Turn::Opponent)?;
        self.check_free(cell)?;

        self.state.obstacles.insert(cell);
        self.turn = Turn::Agent;
        self.outcome = self.check_outcome();
        if self.outcome == Some(Outcome::AgentTrapped) {
            info!("Obstacle at {} leaves the cat without a move", cell);
        }
        Ok(())
    }

    /// Opponent drops its one lure of the game; does not end its turn
    pub fn place_lure(&mut self, cell: Cell) -> Result<(), String> {
        self.expect_turn(Turn::Opponent)?;
        if self.state.flags.lure_used {
            return Err("The lure has already been used this game".to_string());
        }
        self.check_free(cell)?;

        self.state.lure = Some(cell);
        self.state.flags.lure_used = true;
        info!("Lure placed at {}", cell);
        Ok(())
    }

    /// Applies the cat's decision
    ///
    /// # Returns
    /// * `Result<Option<Outcome>, String>` - The outcome if the game ended, or an error
    ///   if the action is illegal on the current board
    pub fn apply(&mut self, decision: &Decision) -> Result<Option<Outcome>, String> {
        self.expect_turn(Turn::Agent)?;

        let agent = self.state.agent;
        match decision.action {
            Action::Forfeit => {
                if !self.is_enclosed() || !self.state.flags.has_attacked {
                    warn!("Rejected forfeit at {} with a legal action left", agent);
                    return Err(format!("The cat at {} still has a legal action", agent));
                }
                self.state.flags = self.state.flags.merge(decision.flags);
                self.outcome = Some(Outcome::AgentTrapped);
                info!("Cat forfeits at {}", agent);
                return Ok(self.outcome);
            }
            Action::Attack { remove, .. } => {
                if self.state.flags.has_attacked {
                    return Err("The cat has already attacked this game".to_string());
                }
                if !self.grid.are_adjacent(agent, remove) || !self.state.obstacles.contains(&remove) {
                    return Err(format!("Cannot remove {} from {}", remove, agent));
                }
            }
            Action::Move { .. } => {}
        }

        // Validate the move against the board after any removal
        let to = decision.action.destination().unwrap_or(agent);
        let mut obstacles_after = self.state.obstacles.clone();
        if let Action::Attack { remove, .. } = decision.action {
            obstacles_after.remove(&remove);
        }
        if !self.grid.are_adjacent(agent, to) || obstacles_after.contains(&to) {
            warn!("Rejected move from {} to {}", agent, to);
            return Err(format!("Illegal move from {} to {}", agent, to));
        }

        self.state.obstacles = obstacles_after;
        self.state.agent = to;
        self.state.flags = self.state.flags.merge(decision.flags);
        if let Action::Attack { .. } = decision.action {
            self.state.flags.has_attacked = true;
        }
        if self.state.lure == Some(to) {
            info!("Cat reached the lure at {}", to);
            self.state.lure = None;
        }
        // A written-off lure is consumed for good
        if self.state.flags.lure_ignored {
            self.state.lure = None;
        }

        self.turns_played += 1;
        self.turn = Turn::Opponent;
        self.outcome = self.check_outcome();
        Ok(self.outcome)
    }

    fn check_outcome(&self) -> Option<Outcome> {
        let agent = self.state.agent;
        if self.grid.is_boundary(agent) {
            return Some(Outcome::AgentEscaped);
        }
        // A cat that may still attack is not yet trapped
        if self.is_enclosed() && self.state.flags.has_attacked {
            return Some(Outcome::AgentTrapped);
        }
        None
    }

    fn is_enclosed(&self) -> bool {
        self.grid
            .neighbors(self.state.agent)
            .all(|cell| self.state.obstacles.contains(&cell))
    }

    fn expect_turn(&self, turn: Turn) -> Result<(), String> {
        if let Some(outcome) = self.outcome {
            return Err(format!("Game is over ({:?})", outcome));
        }
        if self.turn != turn {
            return Err(format!("It is the {:?} turn, not the {:?} turn", self.turn, turn));
        }
        Ok(())
    }

    fn check_free(&self, cell: Cell) -> Result<(), String> {
        if !self.grid.contains(cell) {
            return Err(format!("{} is outside the grid", cell));
        }
        if cell == self.state.agent {
            return Err(format!("{} is occupied by the cat", cell));
        }
        if self.state.obstacles.contains(&cell) {
            return Err(format!("{} is already blocked", cell));
        }
        if self.state.lure == Some(cell) {
            return Err(format!("{} holds the lure", cell));
        }
        Ok(())
    }
}
