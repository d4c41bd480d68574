// Turn policy for the cat
//
// One decision cycle weighs three options against each other:
//   - the regular move from the adversarial search
//   - a step toward the lure, when one is present and not written off
//   - removing one adjacent obstacle ("attack"), once per game
// The Bot never mutates the caller's state; it returns a Decision that the
// caller applies.

use log::{debug, info};
use rand::Rng;
use serde::Serialize;

use crate::config::Config;
use crate::evaluator::BoardEvaluator;
use crate::grid::{Grid, ObstacleSet};
use crate::lure::LureRiskAnalyzer;
use crate::pathfinding::PathFinder;
use crate::search::GameTreeSearch;
use crate::types::{Action, Cell, GameState, TurnFlags};

/// Chosen action plus the scores that led to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub action: Action,
    /// Flags after this decision; the caller persists them
    pub flags: TurnFlags,
    pub regular_score: i32,
    pub lure_score: Option<i32>,
    pub attack_score: Option<i32>,
}

/// Engine components bound to one grid
struct Engine {
    grid: Grid,
    evaluator: BoardEvaluator,
    search: GameTreeSearch,
    lure_analyzer: LureRiskAnalyzer,
}

impl Engine {
    fn new(grid: Grid, config: &Config) -> Self {
        let pathfinder = PathFinder::new(grid);
        let evaluator = BoardEvaluator::new(pathfinder, config.scores.clone());
        let search = GameTreeSearch::new(evaluator.clone(), &config.search);
        let lure_analyzer = LureRiskAnalyzer::new(pathfinder, config.scores.clone());
        Engine {
            grid,
            evaluator,
            search,
            lure_analyzer,
        }
    }
}

/// Cat decision maker
/// Holds static configuration; every call to `decide` works on a snapshot
pub struct Bot {
    config: Config,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        Bot { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decides the cat's action for this turn, breaking ties with the thread RNG
    pub fn decide(&self, state: &GameState) -> Result<Decision, String> {
        self.decide_with_rng(state, &mut rand::rng())
    }

    /// Decides the cat's action for this turn
    ///
    /// # Arguments
    /// * `state` - Snapshot of the game; validated before use
    /// * `rng` - Source for breaking ties between equally good moves
    ///
    /// # Returns
    /// * `Result<Decision, String>` - The action, or an error for a malformed snapshot
    pub fn decide_with_rng<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        rng: &mut R,
    ) -> Result<Decision, String> {
        state.validate()?;
        let grid = self.config.grid.build(state.grid_size)?;
        let obstacles = ObstacleSet::from_cells(grid, state.obstacles.iter().copied())?;
        let engine = Engine::new(grid, &self.config);
        let agent = state.agent;
        let mut flags = state.flags;

        let lure_option = match state.lure {
            Some(lure) if !flags.lure_ignored => {
                self.lure_option(&engine, agent, lure, &obstacles, &mut flags)
            }
            _ => None,
        };

        let regular = engine.search.find_best_move(agent, &obstacles, rng);

        let attack_option = if flags.has_attacked {
            None
        } else {
            Self::attack_option(&engine, agent, &obstacles)
        };

        debug!(
            "Options at {} (depth {}, {} nodes): regular {:?} ({}), lure {:?}, attack {:?}",
            agent,
            engine.search.depth(),
            regular.nodes,
            regular.best_move,
            regular.score,
            lure_option,
            attack_option
        );

        let lure_score = lure_option.map(|(_, score)| score);
        let attack_score = attack_option.map(|(_, score)| score);
        let best_non_attack = regular.score.max(lure_score.unwrap_or(i32::MIN));

        let action = match (attack_option, lure_option, regular.best_move) {
            (Some((remove, score)), _, _) if score > best_non_attack => {
                self.attack(&engine, agent, &obstacles, remove, rng)
            }
            (_, Some((step, score)), _) if score > regular.score => Action::Move { to: step },
            (_, _, Some(to)) => Action::Move { to },
            // Enclosed, but breaking out is still a legal action
            (Some((remove, _)), _, None) => self.attack(&engine, agent, &obstacles, remove, rng),
            (None, _, None) => Action::Forfeit,
        };

        if matches!(action, Action::Attack { .. }) {
            flags.has_attacked = true;
        }

        info!(
            "Cat at {} chose {:?} (regular: {}, lure: {:?}, attack: {:?})",
            agent, action, regular.score, lure_score, attack_score
        );

        Ok(Decision {
            action,
            flags,
            regular_score: regular.score,
            lure_score,
            attack_score,
        })
    }

    /// Next step toward the lure and its score, or None when the lure is not worth it.
    /// Sets `lure_ignored` permanently if pursuing it walks into a trap.
    fn lure_option(
        &self,
        engine: &Engine,
        agent: Cell,
        lure: Cell,
        obstacles: &ObstacleSet,
        flags: &mut TurnFlags,
    ) -> Option<(Cell, i32)> {
        // Unreachable or already reached
        let assessment = engine.lure_analyzer.assess(agent, lure, obstacles)?;
        if assessment.is_trap() {
            info!("Lure at {} leads into a trap, ignoring it for the rest of the game", lure);
            flags.lure_ignored = true;
            return None;
        }

        let score = engine.lure_analyzer.score(&assessment);
        if score <= self.config.scores.trapped {
            return None;
        }
        Some((assessment.first_step()?, score))
    }

    /// Adjacent obstacle whose removal gives the best board, first one wins ties
    fn attack_option(engine: &Engine, agent: Cell, obstacles: &ObstacleSet) -> Option<(Cell, i32)> {
        let mut best: Option<(Cell, i32)> = None;
        for cell in engine.grid.neighbors(agent).filter(|&c| obstacles.contains(c)) {
            let score = engine.evaluator.evaluate(agent, &obstacles.without(cell));
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((cell, score));
            }
        }
        best
    }

    /// Removes `remove`, then searches again on the smaller obstacle set
    fn attack<R: Rng + ?Sized>(
        &self,
        engine: &Engine,
        agent: Cell,
        obstacles: &ObstacleSet,
        remove: Cell,
        rng: &mut R,
    ) -> Action {
        let opened = obstacles.without(remove);
        let follow_up = engine.search.find_best_move(agent, &opened, rng);
        Action::Attack {
            remove,
            to: follow_up.best_move.unwrap_or(remove),
        }
    }
}
