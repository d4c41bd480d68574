// Library exports for the trap-the-cat engine
// The binaries and integration tests use the decision engine through these modules

pub mod bot;
pub mod config;
pub mod evaluator;
pub mod game;
pub mod grid;
pub mod lure;
pub mod pathfinding;
pub mod search;
pub mod simulation;
pub mod types;
