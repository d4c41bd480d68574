// Self-play simulator for the cat engine
//
// Usage:
//   cargo run --bin trap-cat -- [options]
//
// Options:
//   --games <n>      Number of games to play (default: 10)
//   --seed <n>       Seed of the first game (default: 0)
//   --config <path>  Path to Cat.toml (default: Cat.toml)
//   --verbose        Print the board after every cat turn

use log::info;
use std::env;
use std::process;

use trap_cat_engine::config::Config;
use trap_cat_engine::simulation::Simulator;

fn print_usage() {
    eprintln!("Trap-the-cat self-play simulator");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  trap-cat [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --games <n>       Number of games to play (default: 10)");
    eprintln!("  --seed <n>        Seed of the first game (default: 0)");
    eprintln!("  --config <path>   Path to Cat.toml (default: Cat.toml)");
    eprintln!("  --verbose         Print the board after every cat turn");
    eprintln!("  --help            Show this help message");
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> T
where
    T::Err: std::fmt::Display,
{
    let Some(value) = value else {
        eprintln!("Error: {} requires an argument", flag);
        process::exit(1);
    };
    value.parse::<T>().unwrap_or_else(|e| {
        eprintln!("Error: invalid value '{}' for {}: {}", value, flag, e);
        process::exit(1);
    })
}

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut games: usize = 10;
    let mut seed: u64 = 0;
    let mut config_path: Option<String> = None;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                games = parse_number("--games", args.get(i + 1));
                i += 1;
            }
            "--seed" => {
                seed = parse_number("--seed", args.get(i + 1));
                i += 1;
            }
            "--config" => {
                let Some(path) = args.get(i + 1) else {
                    eprintln!("Error: --config requires an argument");
                    process::exit(1);
                };
                config_path = Some(path.clone());
                i += 1;
            }
            "--verbose" => verbose = true,
            "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Error: Unknown option '{}'", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => Config::from_file(&path).unwrap_or_else(|e| {
            eprintln!("Warning: Could not load config from '{}': {}", path, e);
            eprintln!("Using default configuration");
            Config::default_hardcoded()
        }),
        None => Config::load_or_default(),
    };

    info!(
        "Playing {} games on a {}x{} grid at depth {}",
        games, config.grid.size, config.grid.size, config.search.depth
    );

    let simulator = match Simulator::new(config, verbose) {
        Ok(simulator) => simulator,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    match simulator.run(games, seed) {
        Ok(reports) => simulator.print_report(&reports),
        Err(e) => {
            eprintln!("Error during simulation: {}", e);
            process::exit(1);
        }
    }
}
