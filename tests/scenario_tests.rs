// Integration tests for the documented 5x5 decision scenarios
//
// Each test builds a snapshot through the public API and checks the engine's
// answer for one well-understood board.

use rand::rngs::StdRng;
use rand::SeedableRng;
use trap_cat_engine::bot::Bot;
use trap_cat_engine::config::Config;
use trap_cat_engine::evaluator::BoardEvaluator;
use trap_cat_engine::grid::{Connectivity, Grid, ObstacleSet};
use trap_cat_engine::lure::LureRiskAnalyzer;
use trap_cat_engine::pathfinding::PathFinder;
use trap_cat_engine::search::GameTreeSearch;
use trap_cat_engine::types::{Action, Cell, GameState};

fn grid5() -> Grid {
    Grid::new(5, Connectivity::Orthogonal).unwrap()
}

fn obstacles(grid: Grid, cells: &[(i32, i32)]) -> ObstacleSet {
    ObstacleSet::from_cells(grid, cells.iter().map(|&(r, c)| Cell::new(r, c))).unwrap()
}

fn snapshot(agent: (i32, i32), cells: &[(i32, i32)]) -> GameState {
    let mut state = GameState::new(5);
    state.agent = Cell::new(agent.0, agent.1);
    state.obstacles = cells.iter().map(|&(r, c)| Cell::new(r, c)).collect();
    state
}

/// Open board, cat in the centre: any of the four orthogonal moves is fine
#[test]
fn test_open_centre_moves_orthogonally() {
    let bot = Bot::new(Config::default_hardcoded().with_depth(2));
    let state = snapshot((2, 2), &[]);
    let neighbors = [
        Cell::new(1, 2),
        Cell::new(3, 2),
        Cell::new(2, 1),
        Cell::new(2, 3),
    ];

    for seed in 0..8 {
        let decision = bot
            .decide_with_rng(&state, &mut StdRng::seed_from_u64(seed))
            .unwrap();
        match decision.action {
            Action::Move { to } => assert!(neighbors.contains(&to), "moved to {}", to),
            other => panic!("expected a move, got {:?}", other),
        }
    }
}

/// Both shortest neighbors blocked: the evaluator still sees an escape route
#[test]
fn test_corner_pocket_is_scored_by_path_length() {
    let grid = grid5();
    let evaluator = BoardEvaluator::new(PathFinder::new(grid), Config::default_hardcoded().scores);
    let walls = obstacles(grid, &[(0, 1), (1, 0)]);

    let score = evaluator.evaluate(Cell::new(1, 1), &walls);
    assert_eq!(score, -2, "escape via (1,2) or (2,1) takes two steps");
    assert!(!evaluator.is_terminal(score));
}

/// Fully surrounded cat: no regular move, and Forfeit once the attack is spent
#[test]
fn test_surrounded_cat_forfeits() {
    let grid = grid5();
    let config = Config::default_hardcoded().with_depth(2);
    let evaluator = BoardEvaluator::new(PathFinder::new(grid), config.scores.clone());
    let search = GameTreeSearch::new(evaluator, &config.search);
    let walls = obstacles(grid, &[(1, 2), (3, 2), (2, 1), (2, 3)]);

    let result = search.find_best_move(Cell::new(2, 2), &walls, &mut StdRng::seed_from_u64(0));
    assert_eq!(result.best_move, None);
    assert_eq!(result.score, -1000);

    let mut state = snapshot((2, 2), &[(1, 2), (3, 2), (2, 1), (2, 3)]);
    state.flags.has_attacked = true;
    let decision = Bot::new(config).decide(&state).unwrap();
    assert_eq!(decision.action, Action::Forfeit);
}

/// The same board before the attack is spent: the cat breaks out instead
#[test]
fn test_surrounded_cat_attacks_when_allowed() {
    let bot = Bot::new(Config::default_hardcoded().with_depth(2));
    let state = snapshot((2, 2), &[(1, 2), (3, 2), (2, 1), (2, 3)]);
    let decision = bot.decide(&state).unwrap();

    assert!(matches!(decision.action, Action::Attack { .. }));
    assert!(decision.flags.has_attacked);
}

/// Lure one step away with nothing able to trap it there
#[test]
fn test_adjacent_safe_lure() {
    let grid = Grid::new(7, Connectivity::Orthogonal).unwrap();
    let analyzer = LureRiskAnalyzer::new(PathFinder::new(grid), Config::default_hardcoded().scores);
    let empty = ObstacleSet::new(grid);

    assert!(!analyzer.is_trap(Cell::new(3, 3), Cell::new(2, 3), &empty));
    assert!(analyzer.score_path(Cell::new(3, 3), Cell::new(2, 3), &empty) > -1000);
}

/// Cat already next to the edge never gets distracted
#[test]
fn test_escape_beats_lure() {
    let bot = Bot::new(Config::default_hardcoded().with_depth(2));
    let mut state = snapshot((1, 2), &[]);
    state.lure = Some(Cell::new(2, 2));
    let decision = bot.decide(&state).unwrap();
    assert_eq!(decision.action, Action::Move { to: Cell::new(0, 2) });
}
