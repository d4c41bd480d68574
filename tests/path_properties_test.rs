// Property tests for the A* pathfinder on seeded random boards
//
// Every returned path is checked for step validity and compared against a
// breadth-first reference for optimality and reachability.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use trap_cat_engine::grid::{Connectivity, Grid, ObstacleSet};
use trap_cat_engine::pathfinding::PathFinder;
use trap_cat_engine::types::Cell;

/// Random obstacle layout that leaves `keep` free
fn random_board(grid: Grid, density: f64, keep: Cell, rng: &mut StdRng) -> ObstacleSet {
    let mut set = ObstacleSet::new(grid);
    for idx in 0..grid.cell_count() {
        let cell = grid.cell_at(idx);
        if cell != keep && rng.random_bool(density) {
            set.insert(cell);
        }
    }
    set
}

/// Unit-cost BFS distance to the goal (or to any boundary cell)
fn bfs_distance(grid: Grid, start: Cell, obstacles: &ObstacleSet, goal: Option<Cell>) -> Option<usize> {
    let is_goal = |cell: Cell| match goal {
        Some(target) => cell == target,
        None => grid.is_boundary(cell),
    };
    let mut dist = vec![usize::MAX; grid.cell_count()];
    let mut queue = VecDeque::new();
    dist[grid.index(start)] = 0;
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        let d = dist[grid.index(cell)];
        if is_goal(cell) {
            return Some(d);
        }
        for next in grid.free_neighbors(cell, obstacles) {
            if dist[grid.index(next)] == usize::MAX {
                dist[grid.index(next)] = d + 1;
                queue.push_back(next);
            }
        }
    }
    None
}

fn assert_valid_path(grid: Grid, path: &[Cell], start: Cell, obstacles: &ObstacleSet) {
    assert_eq!(path.first(), Some(&start));
    for pair in path.windows(2) {
        assert!(
            grid.are_adjacent(pair[0], pair[1]),
            "{} and {} are not neighbors",
            pair[0],
            pair[1]
        );
    }
    for cell in &path[1..] {
        assert!(!obstacles.contains(*cell), "path crosses obstacle {}", cell);
    }
}

#[test]
fn test_escape_paths_are_valid_and_shortest() {
    let mut rng = StdRng::seed_from_u64(2024);
    for connectivity in [Connectivity::Orthogonal, Connectivity::Octile] {
        let grid = Grid::new(9, connectivity).unwrap();
        let finder = PathFinder::new(grid);

        for _ in 0..200 {
            let start = Cell::new(rng.random_range(0..9), rng.random_range(0..9));
            let obstacles = random_board(grid, 0.35, start, &mut rng);
            let path = finder.escape_path(start, &obstacles);
            let reference = bfs_distance(grid, start, &obstacles, None);

            match (path, reference) {
                (Some(path), Some(distance)) => {
                    assert_valid_path(grid, &path, start, &obstacles);
                    assert!(grid.is_boundary(*path.last().unwrap()));
                    assert_eq!(path.len() - 1, distance, "A* path is not shortest");
                }
                (None, None) => {}
                (path, reference) => panic!(
                    "reachability mismatch from {}: A* {:?}, BFS {:?}",
                    start, path, reference
                ),
            }
        }
    }
}

#[test]
fn test_targeted_paths_are_valid_and_shortest() {
    let mut rng = StdRng::seed_from_u64(77);
    let grid = Grid::new(8, Connectivity::Orthogonal).unwrap();
    let finder = PathFinder::new(grid);

    for _ in 0..200 {
        let start = Cell::new(rng.random_range(0..8), rng.random_range(0..8));
        let goal = Cell::new(rng.random_range(0..8), rng.random_range(0..8));
        let mut obstacles = random_board(grid, 0.3, start, &mut rng);
        obstacles.remove(goal);

        let path = finder.shortest_path(start, &obstacles, Some(goal));
        let reference = bfs_distance(grid, start, &obstacles, Some(goal));
        match (path, reference) {
            (Some(path), Some(distance)) => {
                assert_valid_path(grid, &path, start, &obstacles);
                assert_eq!(path.last(), Some(&goal));
                assert_eq!(path.len() - 1, distance);
            }
            (None, None) => {}
            (path, reference) => panic!("mismatch {:?} vs {:?}", path, reference),
        }
    }
}

#[test]
fn test_boundary_start_shortcut_ignores_obstacles() {
    let mut rng = StdRng::seed_from_u64(5);
    let grid = Grid::new(6, Connectivity::Orthogonal).unwrap();
    let finder = PathFinder::new(grid);

    for idx in 0..grid.cell_count() {
        let start = grid.cell_at(idx);
        if !grid.is_boundary(start) {
            continue;
        }
        let obstacles = random_board(grid, 0.9, start, &mut rng);
        assert_eq!(finder.escape_path(start, &obstacles), Some(vec![start]));
    }
}

#[test]
fn test_pathfinding_does_not_mutate_obstacles() {
    let mut rng = StdRng::seed_from_u64(9);
    let grid = Grid::new(9, Connectivity::Orthogonal).unwrap();
    let finder = PathFinder::new(grid);
    let start = Cell::new(4, 4);
    let obstacles = random_board(grid, 0.3, start, &mut rng);
    let before = obstacles.clone();

    let _ = finder.escape_path(start, &obstacles);
    let _ = finder.shortest_path(start, &obstacles, Some(Cell::new(0, 0)));
    assert_eq!(obstacles, before);
}
