// Self-play harness for the cat engine
//
// This module provides functionality to:
// 1. Play full games of the Bot against a scripted obstacle-placing opponent
// 2. Aggregate outcomes across many seeded games
// 3. Print a summary report

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::bot::Bot;
use crate::config::{Config, SimulationConfig};
use crate::game::Game;
use crate::grid::{Grid, ObstacleSet};
use crate::pathfinding::PathFinder;
use crate::types::{Action, Cell, GameState, Outcome};

/// Result of one simulated game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameReport {
    pub seed: u64,
    /// `None` if the turn limit was hit first
    pub outcome: Option<Outcome>,
    pub turns: u32,
    pub attacked: bool,
    pub lure_placed: bool,
    pub lure_reached: bool,
    pub lure_ignored: bool,
}

/// Statistics for a complete simulation session
#[derive(Debug, Default)]
pub struct SimulationStats {
    pub games: usize,
    pub escapes: usize,
    pub traps: usize,
    pub unfinished: usize,
    pub attacks: usize,
    pub lures_placed: usize,
    pub lures_reached: usize,
    pub lures_ignored: usize,
    pub escape_rate: f64,
    pub average_turns: f64,
}

/// Plays the Bot against a greedy blocker
pub struct Simulator {
    bot: Bot,
    grid: Grid,
    verbose: bool,
}

impl Simulator {
    /// Creates a simulator for the configured grid
    pub fn new(config: Config, verbose: bool) -> Result<Self, String> {
        let grid = config.grid.build(config.grid.size)?;
        info!(
            "Simulator on a {}x{} {:?} grid",
            grid.size(),
            grid.size(),
            grid.connectivity()
        );
        Ok(Simulator {
            bot: Bot::new(config),
            grid,
            verbose,
        })
    }

    fn settings(&self) -> &SimulationConfig {
        &self.bot.config().simulation
    }

    /// Plays `games` games with seeds `seed, seed + 1, ...`
    pub fn run(&self, games: usize, seed: u64) -> Result<Vec<GameReport>, String> {
        (0..games as u64)
            .map(|offset| self.play_game(seed.wrapping_add(offset)))
            .collect()
    }

    /// Plays one game to completion or to the turn limit
    pub fn play_game(&self, seed: u64) -> Result<GameReport, String> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = Game::new(self.grid);
        let mut report = GameReport {
            seed,
            outcome: None,
            turns: 0,
            attacked: false,
            lure_placed: false,
            lure_reached: false,
            lure_ignored: false,
        };

        while !game.is_over() && game.turns_played() < self.settings().max_turns {
            if !game.state().flags.lure_used && rng.random_bool(self.settings().lure_probability) {
                if let Some(cell) = self.random_free_cell(game.state(), &mut rng) {
                    game.place_lure(cell)?;
                    report.lure_placed = true;
                }
            }

            let Some(block) = self.choose_block(game.state(), &mut rng) else {
                debug!("Opponent has no legal placement left");
                break;
            };
            game.place_obstacle(block)?;
            if game.is_over() {
                break;
            }

            let lure_before = game.state().lure;
            let decision = self.bot.decide_with_rng(game.state(), &mut rng)?;
            game.apply(&decision)?;

            if lure_before.is_some() && lure_before == decision.action.destination() {
                report.lure_reached = true;
            }
            if let Action::Attack { remove, .. } = decision.action {
                debug!("Cat removed obstacle at {}", remove);
            }

            if self.verbose {
                match decision.action.destination() {
                    Some(to) => println!("Turn {}: {} to {}", game.turns_played(), decision.action.as_str(), to),
                    None => println!("Turn {}: {}", game.turns_played(), decision.action.as_str()),
                }
                println!("{}", render_board(game.state()));
            }
        }

        let flags = game.state().flags;
        report.outcome = game.outcome();
        report.turns = game.turns_played();
        report.attacked = flags.has_attacked;
        report.lure_ignored = flags.lure_ignored;

        info!(
            "Game {} finished after {} turns: {:?}",
            seed, report.turns, report.outcome
        );
        Ok(report)
    }

    /// Greedy opponent: block the first step of the cat's escape path,
    /// sometimes a random free cell instead
    fn choose_block<R: Rng + ?Sized>(&self, state: &GameState, rng: &mut R) -> Option<Cell> {
        if rng.random_bool(self.settings().random_block_probability) {
            return self.random_free_cell(state, rng);
        }

        let obstacles = ObstacleSet::from_cells(self.grid, state.obstacles.iter().copied()).ok()?;
        let greedy = PathFinder::new(self.grid)
            .escape_path(state.agent, &obstacles)
            .and_then(|path| path.get(1).copied())
            .filter(|&cell| state.lure != Some(cell));

        if greedy.is_some() {
            return greedy;
        }

        let near: Vec<Cell> = self
            .grid
            .free_neighbors(state.agent, &obstacles)
            .filter(|&cell| state.lure != Some(cell))
            .collect();
        match near.choose(rng) {
            Some(&cell) => Some(cell),
            None => self.random_free_cell(state, rng),
        }
    }

    fn random_free_cell<R: Rng + ?Sized>(&self, state: &GameState, rng: &mut R) -> Option<Cell> {
        let free: Vec<Cell> = (0..self.grid.cell_count())
            .map(|idx| self.grid.cell_at(idx))
            .filter(|cell| {
                *cell != state.agent && !state.obstacles.contains(cell) && state.lure != Some(*cell)
            })
            .collect();
        free.choose(rng).copied()
    }

    /// Generates statistics from game reports
    pub fn generate_stats(&self, reports: &[GameReport]) -> SimulationStats {
        let games = reports.len();
        let count = |pred: fn(&GameReport) -> bool| reports.iter().filter(|r| pred(r)).count();
        let escapes = count(|r| r.outcome == Some(Outcome::AgentEscaped));
        let traps = count(|r| r.outcome == Some(Outcome::AgentTrapped));

        let (escape_rate, average_turns) = if games > 0 {
            (
                escapes as f64 / games as f64 * 100.0,
                reports.iter().map(|r| r.turns as f64).sum::<f64>() / games as f64,
            )
        } else {
            (0.0, 0.0)
        };

        SimulationStats {
            games,
            escapes,
            traps,
            unfinished: games - escapes - traps,
            attacks: count(|r| r.attacked),
            lures_placed: count(|r| r.lure_placed),
            lures_reached: count(|r| r.lure_reached),
            lures_ignored: count(|r| r.lure_ignored),
            escape_rate,
            average_turns,
        }
    }

    /// Prints a summary of the simulated games
    pub fn print_report(&self, reports: &[GameReport]) {
        let stats = self.generate_stats(reports);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                  SELF-PLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Games:          {}", stats.games);
        println!("Cat escaped:    {} ({:.1}%)", stats.escapes, stats.escape_rate);
        println!("Cat trapped:    {}", stats.traps);
        println!("Turn limit:     {}", stats.unfinished);
        println!("Attacks used:   {}", stats.attacks);
        println!(
            "Lures:          {} placed, {} reached, {} ignored",
            stats.lures_placed, stats.lures_reached, stats.lures_ignored
        );
        println!("Average turns:  {:.1}", stats.average_turns);
        println!("═══════════════════════════════════════════════════════════\n");
    }
}

/// ASCII board: `C` cat, `#` obstacle, `M` lure, `.` free
pub fn render_board(state: &GameState) -> String {
    let n = state.grid_size as i32;
    let mut out = String::with_capacity((state.grid_size + 1) * state.grid_size * 2);
    for row in 0..n {
        for col in 0..n {
            let cell = Cell::new(row, col);
            let glyph = if cell == state.agent {
                'C'
            } else if state.obstacles.contains(&cell) {
                '#'
            } else if state.lure == Some(cell) {
                'M'
            } else {
                '.'
            };
            out.push(glyph);
            if col + 1 < n {
                out.push(' ');
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator(size: usize) -> Simulator {
        let mut config = Config::default_hardcoded().with_depth(2);
        config.grid.size = size;
        config.simulation.max_turns = 60;
        Simulator::new(config, false).unwrap()
    }

    #[test]
    fn test_games_terminate() {
        let sim = simulator(7);
        let reports = sim.run(3, 11).unwrap();
        assert_eq!(reports.len(), 3);
        for report in &reports {
            assert!(report.turns <= 60);
        }
    }

    #[test]
    fn test_same_seed_same_game() {
        let sim = simulator(7);
        assert_eq!(sim.play_game(42).unwrap(), sim.play_game(42).unwrap());
    }

    #[test]
    fn test_stats_add_up() {
        let sim = simulator(7);
        let reports = sim.run(4, 100).unwrap();
        let stats = sim.generate_stats(&reports);
        assert_eq!(stats.games, 4);
        assert_eq!(stats.escapes + stats.traps + stats.unfinished, 4);
        assert!(stats.lures_reached <= stats.lures_placed);
    }

    #[test]
    fn test_render_board() {
        let mut state = GameState::new(3);
        state.obstacles.insert(Cell::new(0, 0));
        state.lure = Some(Cell::new(2, 2));
        assert_eq!(render_board(&state), "# . .\n. C .\n. . M\n");
    }
}
