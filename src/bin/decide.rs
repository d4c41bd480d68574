// One-shot decision over a saved game snapshot
//
// Usage:
//   decide <state.json> [--config <path>] [--seed <n>]
//
// Reads a GameState JSON document and prints the cat's Decision as JSON.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::fs;
use std::process;

use trap_cat_engine::bot::Bot;
use trap_cat_engine::config::Config;
use trap_cat_engine::simulation::render_board;
use trap_cat_engine::types::GameState;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args[1] == "--help" {
        eprintln!("Usage: {} <state.json> [--config <path>] [--seed <n>]", args[0]);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let state_path = &args[1];
    let mut config_path = "Cat.toml".to_string();
    let mut seed: Option<u64> = None;

    let mut i = 2;
    while i < args.len() {
        match (args[i].as_str(), args.get(i + 1)) {
            ("--config", Some(path)) => config_path = path.clone(),
            ("--seed", Some(value)) => match value.parse() {
                Ok(n) => seed = Some(n),
                Err(e) => {
                    eprintln!("Error: invalid seed '{}': {}", value, e);
                    process::exit(1);
                }
            },
            (flag, _) => {
                eprintln!("Error: unknown or incomplete option '{}'", flag);
                process::exit(1);
            }
        }
        i += 2;
    }

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        Config::default_hardcoded()
    });

    let contents = fs::read_to_string(state_path).unwrap_or_else(|e| {
        eprintln!("Error: failed to read '{}': {}", state_path, e);
        process::exit(1);
    });
    let state: GameState = serde_json::from_str(&contents).unwrap_or_else(|e| {
        eprintln!("Error: failed to parse game state: {}", e);
        process::exit(1);
    });

    if let Err(e) = state.validate() {
        eprintln!("Error: invalid game state: {}", e);
        process::exit(1);
    }
    eprintln!("{}", render_board(&state));

    let bot = Bot::new(config);
    let result = match seed {
        Some(seed) => bot.decide_with_rng(&state, &mut StdRng::seed_from_u64(seed)),
        None => bot.decide(&state),
    };

    match result.and_then(|decision| {
        serde_json::to_string_pretty(&decision).map_err(|e| format!("Failed to encode decision: {}", e))
    }) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
