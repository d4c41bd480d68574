// Depth-bounded adversarial search (minimax with alpha-beta pruning)
//
// Agent plies maximize and step the agent to a free neighbor. Opponent plies
// minimize and place one hypothetical obstacle. Every placement is applied to
// a fresh copy of the obstacle set, so sibling branches never observe each
// other's hypotheses and the caller's set is never touched.

use log::debug;
use rand::seq::IndexedRandom;
use rand::Rng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{OpponentModel, SearchConfig};
use crate::evaluator::BoardEvaluator;
use crate::grid::ObstacleSet;
use crate::types::Cell;

/// Which side moves at a search node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ply {
    /// Maximizing: the agent steps to a free neighbor
    Agent,
    /// Minimizing: the opponent blocks a cell
    Opponent,
}

/// Outcome of a root search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Chosen destination, `None` when the agent has no free neighbor
    pub best_move: Option<Cell>,
    pub score: i32,
    /// Every root move that achieved `score`, in neighbor order
    pub candidates: Vec<Cell>,
    pub nodes: u64,
    pub cutoffs: u64,
}

/// Node and cutoff counters; atomic so root branches can share them across threads
#[derive(Debug, Default)]
struct SearchStats {
    nodes: AtomicU64,
    cutoffs: AtomicU64,
}

#[derive(Debug, Clone)]
pub struct GameTreeSearch {
    evaluator: BoardEvaluator,
    depth: u8,
    opponent_model: OpponentModel,
    parallel: bool,
}

impl GameTreeSearch {
    /// Creates a search over `evaluator` using the configured depth and opponent model.
    /// Root parallelism is used only when enabled and enough rayon threads exist.
    pub fn new(evaluator: BoardEvaluator, config: &SearchConfig) -> Self {
        let parallel =
            config.parallel_root && rayon::current_num_threads() >= config.min_cpus_for_parallel;
        GameTreeSearch {
            evaluator,
            depth: config.depth,
            opponent_model: config.opponent_model,
            parallel,
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn evaluator(&self) -> &BoardEvaluator {
        &self.evaluator
    }

    /// Picks the agent's best move, breaking ties uniformly at random
    ///
    /// # Returns
    /// * `SearchResult` - `best_move: None` with the trapped sentinel if the agent cannot move
    pub fn find_best_move<R: Rng + ?Sized>(
        &self,
        agent: Cell,
        obstacles: &ObstacleSet,
        rng: &mut R,
    ) -> SearchResult {
        let stats = SearchStats::default();
        let scored = self.score_root_moves(agent, obstacles, &stats);
        let nodes = stats.nodes.load(Ordering::Relaxed);
        let cutoffs = stats.cutoffs.load(Ordering::Relaxed);

        let Some(score) = scored.iter().map(|&(_, s)| s).max() else {
            debug!("Agent at {} has no free neighbor", agent);
            return SearchResult {
                best_move: None,
                score: self.evaluator.scores().trapped,
                candidates: Vec::new(),
                nodes,
                cutoffs,
            };
        };

        let candidates: Vec<Cell> = scored
            .iter()
            .filter(|&&(_, s)| s == score)
            .map(|&(cell, _)| cell)
            .collect();
        let best_move = candidates.choose(rng).copied();

        debug!(
            "Search from {} at depth {}: {} root moves, best score {} ({} tied), {} nodes, {} cutoffs",
            agent,
            self.depth,
            scored.len(),
            score,
            candidates.len(),
            nodes,
            cutoffs
        );

        SearchResult {
            best_move,
            score,
            candidates,
            nodes,
            cutoffs,
        }
    }

    /// Minimax value of every root move, in neighbor order
    pub fn root_scores(&self, agent: Cell, obstacles: &ObstacleSet) -> Vec<(Cell, i32)> {
        self.score_root_moves(agent, obstacles, &SearchStats::default())
    }

    /// Full-window alpha-beta value of a node
    pub fn value(&self, agent: Cell, obstacles: &ObstacleSet, depth: u8, ply: Ply) -> i32 {
        let stats = SearchStats::default();
        self.alpha_beta(agent, obstacles, depth, i32::MIN, i32::MAX, ply, &stats)
    }

    /// Cells the opponent may block at a node
    pub fn opponent_placements(&self, agent: Cell, obstacles: &ObstacleSet) -> Vec<Cell> {
        let grid = self.evaluator.grid();
        match self.opponent_model {
            OpponentModel::AgentNeighbors => grid.free_neighbors(agent, obstacles).collect(),
            OpponentModel::FullBoard => (0..grid.cell_count())
                .map(|idx| grid.cell_at(idx))
                .filter(|&cell| cell != agent && !obstacles.contains(cell))
                .collect(),
        }
    }

    fn score_root_moves(
        &self,
        agent: Cell,
        obstacles: &ObstacleSet,
        stats: &SearchStats,
    ) -> Vec<(Cell, i32)> {
        let grid = self.evaluator.grid();
        let moves: Vec<Cell> = grid.free_neighbors(agent, obstacles).collect();
        let child_depth = self.depth.saturating_sub(1);

        // Each root move gets a full window so equal scores are exact ties
        let score_move = |next: Cell| {
            let value = self.alpha_beta(
                next,
                obstacles,
                child_depth,
                i32::MIN,
                i32::MAX,
                Ply::Opponent,
                stats,
            );
            (next, value)
        };

        if self.parallel && moves.len() > 1 {
            moves.par_iter().map(|&next| score_move(next)).collect()
        } else {
            moves.iter().map(|&next| score_move(next)).collect()
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn alpha_beta(
        &self,
        agent: Cell,
        obstacles: &ObstacleSet,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        ply: Ply,
        stats: &SearchStats,
    ) -> i32 {
        stats.nodes.fetch_add(1, Ordering::Relaxed);

        // Covers all three base cases: depth exhausted, agent on the boundary,
        // agent with no escape path.
        let static_score = self.evaluator.evaluate(agent, obstacles);
        if depth == 0 || self.evaluator.is_terminal(static_score) {
            return static_score;
        }

        let grid = self.evaluator.grid();
        match ply {
            Ply::Agent => {
                let mut best = i32::MIN;
                for next in grid.free_neighbors(agent, obstacles) {
                    let value =
                        self.alpha_beta(next, obstacles, depth - 1, alpha, beta, Ply::Opponent, stats);
                    best = best.max(value);
                    alpha = alpha.max(best);
                    if beta <= alpha {
                        stats.cutoffs.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                }
                if best == i32::MIN {
                    static_score
                } else {
                    best
                }
            }
            Ply::Opponent => {
                let placements = self.opponent_placements(agent, obstacles);
                if placements.is_empty() {
                    return static_score;
                }
                let mut best = i32::MAX;
                for block in placements {
                    let branch = obstacles.with(block);
                    let value =
                        self.alpha_beta(agent, &branch, depth - 1, alpha, beta, Ply::Agent, stats);
                    best = best.min(value);
                    beta = beta.min(best);
                    if beta <= alpha {
                        stats.cutoffs.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                }
                best
            }
        }
    }
}
