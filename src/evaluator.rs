// Board evaluation from the agent's point of view
//
// Terminal boards get the fixed sentinels; everything else scores the negated
// escape distance, so any sentinel dominates any heuristic value.

use crate::config::ScoresConfig;
use crate::grid::{Grid, ObstacleSet};
use crate::pathfinding::PathFinder;
use crate::types::Cell;

#[derive(Debug, Clone)]
pub struct BoardEvaluator {
    pathfinder: PathFinder,
    scores: ScoresConfig,
}

impl BoardEvaluator {
    pub fn new(pathfinder: PathFinder, scores: ScoresConfig) -> Self {
        BoardEvaluator { pathfinder, scores }
    }

    pub fn grid(&self) -> Grid {
        self.pathfinder.grid()
    }

    pub fn scores(&self) -> &ScoresConfig {
        &self.scores
    }

    /// Scores a board for the agent
    ///
    /// # Returns
    /// * `scores.escaped` if the agent is on the boundary
    /// * `scores.trapped` if no boundary cell is reachable
    /// * otherwise minus the number of steps on the shortest escape path
    pub fn evaluate(&self, agent: Cell, obstacles: &ObstacleSet) -> i32 {
        if self.grid().is_boundary(agent) {
            return self.scores.escaped;
        }
        match self.pathfinder.escape_distance(agent, obstacles) {
            Some(steps) => -(steps as i32),
            None => self.scores.trapped,
        }
    }

    /// True for either sentinel
    pub fn is_terminal(&self, score: i32) -> bool {
        self.scores.is_terminal(score)
    }
}
