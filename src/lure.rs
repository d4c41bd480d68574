// Lure risk analysis
//
// Walks the shortest path to the lure and, at every cell the agent would step
// on, models the opponent's reply as a single greedy block: the first step of
// that cell's own escape route. This is a one-ply approximation kept separate
// from the full search used for regular moves.

use crate::config::ScoresConfig;
use crate::grid::ObstacleSet;
use crate::pathfinding::PathFinder;
use crate::types::{Cell, Path};

/// Result of simulating a walk to the lure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LureAssessment {
    /// Path from the agent to the lure, both inclusive
    pub path: Path,
    /// Steps where an escape survives the modeled block
    pub escapes: u32,
    /// Steps that are inescapable, before or after the modeled block
    pub risks: u32,
}

impl LureAssessment {
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Next cell toward the lure
    pub fn first_step(&self) -> Option<Cell> {
        self.path.get(1).copied()
    }

    pub fn is_trap(&self) -> bool {
        self.risks > 0
    }
}

#[derive(Debug, Clone)]
pub struct LureRiskAnalyzer {
    pathfinder: PathFinder,
    scores: ScoresConfig,
}

impl LureRiskAnalyzer {
    pub fn new(pathfinder: PathFinder, scores: ScoresConfig) -> Self {
        LureRiskAnalyzer { pathfinder, scores }
    }

    /// True if some step toward the lure is inescapable once the opponent
    /// makes its greedy block. Unreachable or already-reached lures are not traps.
    pub fn is_trap(&self, agent: Cell, lure: Cell, obstacles: &ObstacleSet) -> bool {
        match self.lure_path(agent, lure, obstacles) {
            Some(path) => path[1..]
                .iter()
                .any(|&step| !self.survives_greedy_block(step, obstacles)),
            None => false,
        }
    }

    /// Scores the detour: `(escapes - risks) * weight - steps`, or the trapped
    /// sentinel if the lure is unreachable or no step could be assessed.
    pub fn score_path(&self, agent: Cell, lure: Cell, obstacles: &ObstacleSet) -> i32 {
        match self.assess(agent, lure, obstacles) {
            Some(assessment) => self.score(&assessment),
            None => self.scores.trapped,
        }
    }

    /// Score of an assessed walk, kept strictly between the two sentinels
    pub fn score(&self, assessment: &LureAssessment) -> i32 {
        let balance = assessment.escapes as i32 - assessment.risks as i32;
        let raw = balance * self.scores.lure_step_weight - assessment.steps() as i32;
        raw.min(self.scores.escaped - 1).max(self.scores.trapped + 1)
    }

    /// Simulates the whole walk, tallying safe and risky steps
    ///
    /// # Returns
    /// * `Option<LureAssessment>` - `None` if the lure is unreachable or already reached
    pub fn assess(&self, agent: Cell, lure: Cell, obstacles: &ObstacleSet) -> Option<LureAssessment> {
        let path = self.lure_path(agent, lure, obstacles)?;

        let (mut escapes, mut risks) = (0, 0);
        for &step in &path[1..] {
            if self.survives_greedy_block(step, obstacles) {
                escapes += 1;
            } else {
                risks += 1;
            }
        }

        Some(LureAssessment {
            path,
            escapes,
            risks,
        })
    }

    /// The opponent's modeled reply when the agent stands on `cell`
    pub fn greedy_block(&self, cell: Cell, obstacles: &ObstacleSet) -> Option<Cell> {
        self.pathfinder
            .escape_path(cell, obstacles)
            .and_then(|path| path.get(1).copied())
    }

    fn survives_greedy_block(&self, cell: Cell, obstacles: &ObstacleSet) -> bool {
        if self.pathfinder.grid().is_boundary(cell) {
            return true;
        }
        match self.greedy_block(cell, obstacles) {
            Some(block) => self
                .pathfinder
                .escape_path(cell, &obstacles.with(block))
                .is_some(),
            None => false,
        }
    }

    /// Path to the lure with at least one step
    fn lure_path(&self, agent: Cell, lure: Cell, obstacles: &ObstacleSet) -> Option<Path> {
        self.pathfinder
            .shortest_path(agent, obstacles, Some(lure))
            .filter(|path| path.len() > 1)
    }
}
