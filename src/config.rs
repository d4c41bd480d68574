// Configuration module for reading Cat.toml
// Holds the game parameters the engine recognizes plus its scoring and simulation tunables

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::grid::{Connectivity, Grid};

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub grid: GridConfig,
    pub search: SearchConfig,
    pub scores: ScoresConfig,
    pub simulation: SimulationConfig,
}

/// Board geometry
#[derive(Debug, Deserialize, Clone)]
pub struct GridConfig {
    pub size: usize,
    #[serde(default)]
    pub connectivity: Connectivity,
}

impl GridConfig {
    /// Builds the grid for a game of the given side
    pub fn build(&self, size: usize) -> Result<Grid, String> {
        Grid::new(size, self.connectivity)
    }
}

/// Opponent action space assumed by the adversarial search
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OpponentModel {
    /// Opponent may only block cells adjacent to the agent
    #[default]
    AgentNeighbors,
    /// Opponent may block any free cell
    FullBoard,
}

/// Adversarial search constants
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub depth: u8,
    #[serde(default)]
    pub opponent_model: OpponentModel,
    pub parallel_root: bool,
    pub min_cpus_for_parallel: usize,
}

/// Evaluation and scoring constants
#[derive(Debug, Deserialize, Clone)]
pub struct ScoresConfig {
    /// Agent already stands on the boundary
    pub escaped: i32,
    /// Agent has no path to the boundary
    pub trapped: i32,
    /// Weight of each safe-minus-risky step when scoring a lure detour
    pub lure_step_weight: i32,
}

impl ScoresConfig {
    pub fn is_terminal(&self, score: i32) -> bool {
        score >= self.escaped || score <= self.trapped
    }
}

/// Scripted opponent used by the self-play simulator
#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    pub max_turns: u32,
    /// Chance per opponent turn of spending the lure, while unused
    pub lure_probability: f64,
    /// Chance per opponent turn of blocking a random free cell instead of the escape route
    pub random_block_probability: f64,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Cat.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Cat.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Cat.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Cat.toml
    pub fn default_hardcoded() -> Self {
        Config {
            grid: GridConfig {
                size: 11,
                connectivity: Connectivity::Orthogonal,
            },
            search: SearchConfig {
                depth: 3,
                opponent_model: OpponentModel::AgentNeighbors,
                parallel_root: false,
                min_cpus_for_parallel: 2,
            },
            scores: ScoresConfig {
                escaped: 1000,
                trapped: -1000,
                lure_step_weight: 10,
            },
            simulation: SimulationConfig {
                max_turns: 200,
                lure_probability: 0.1,
                random_block_probability: 0.2,
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Cat.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    /// Same configuration with a different search depth
    pub fn with_depth(mut self, depth: u8) -> Self {
        self.search.depth = depth;
        self
    }
}
