// A* shortest paths over the grid with a dynamic obstacle set
//
// The goal is either a specific cell or "any boundary cell". Unreachable goals
// are an ordinary outcome and come back as None.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::grid::{Grid, ObstacleSet};
use crate::types::{Cell, Path};

const NO_PARENT: u32 = u32::MAX;

/// Shortest-path search bound to one grid geometry
#[derive(Debug, Clone, Copy)]
pub struct PathFinder {
    grid: Grid,
}

impl PathFinder {
    pub fn new(grid: Grid) -> Self {
        PathFinder { grid }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Finds a minimum-length path of unblocked steps from `start`
    ///
    /// # Arguments
    /// * `start` - First cell of the path; it is never checked against `obstacles`
    /// * `obstacles` - Blocked cells, read only
    /// * `goal` - A target cell, or `None` for the nearest reachable boundary cell
    ///
    /// # Returns
    /// * `Option<Path>` - Path including `start`, or `None` if no goal is reachable
    pub fn shortest_path(
        &self,
        start: Cell,
        obstacles: &ObstacleSet,
        goal: Option<Cell>,
    ) -> Option<Path> {
        let grid = self.grid;
        if !grid.contains(start) {
            return None;
        }

        match goal {
            None if grid.is_boundary(start) => return Some(vec![start]),
            Some(target) if target == start => return Some(vec![start]),
            Some(target) if !grid.contains(target) || obstacles.contains(target) => return None,
            _ => {}
        }

        let heuristic = |cell: Cell| -> u32 {
            match goal {
                Some(target) => grid.distance(cell, target),
                None => grid.boundary_distance(cell),
            }
        };
        let is_goal = |cell: Cell| -> bool {
            match goal {
                Some(target) => cell == target,
                None => grid.is_boundary(cell),
            }
        };

        let mut g_score = vec![u32::MAX; grid.cell_count()];
        let mut came_from = vec![NO_PARENT; grid.cell_count()];
        // (f, insertion order, g, index); equal f pops in insertion order
        let mut open: BinaryHeap<Reverse<(u32, u32, u32, usize)>> = BinaryHeap::new();
        let mut inserted: u32 = 0;

        let start_idx = grid.index(start);
        g_score[start_idx] = 0;
        open.push(Reverse((heuristic(start), inserted, 0, start_idx)));

        while let Some(Reverse((_, _, g, idx))) = open.pop() {
            if g > g_score[idx] {
                continue;
            }

            let cell = grid.cell_at(idx);
            if is_goal(cell) {
                return Some(Self::reconstruct(grid, &came_from, start_idx, idx));
            }

            for next in grid.free_neighbors(cell, obstacles) {
                let next_idx = grid.index(next);
                let tentative = g + 1;
                if tentative < g_score[next_idx] {
                    g_score[next_idx] = tentative;
                    came_from[next_idx] = idx as u32;
                    inserted += 1;
                    open.push(Reverse((tentative + heuristic(next), inserted, tentative, next_idx)));
                }
            }
        }

        None
    }

    /// Shortest path to the nearest reachable boundary cell
    pub fn escape_path(&self, start: Cell, obstacles: &ObstacleSet) -> Option<Path> {
        self.shortest_path(start, obstacles, None)
    }

    /// Number of steps on the shortest escape path
    pub fn escape_distance(&self, start: Cell, obstacles: &ObstacleSet) -> Option<usize> {
        self.escape_path(start, obstacles).map(|path| path.len() - 1)
    }

    fn reconstruct(grid: Grid, came_from: &[u32], start_idx: usize, goal_idx: usize) -> Path {
        let mut path = vec![grid.cell_at(goal_idx)];
        let mut current = goal_idx;
        while current != start_idx {
            current = came_from[current] as usize;
            path.push(grid.cell_at(current));
        }
        path.reverse();
        path
    }
}
