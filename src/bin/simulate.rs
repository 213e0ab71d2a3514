// Standalone game simulator for inspecting a single pairing
//
// Usage:
//   cargo run --bin simulate -- <code_a> <code_b> [options]
//
// Options:
//   --config <path>        Path to Finder.toml (default: Finder.toml)

use std::env;
use std::process;

use engine_finder::config::Config;
use engine_finder::game::{trace, Budget};
use engine_finder::input::parse_code;
use engine_finder::rules::Outcome;
use engine_finder::types::Symbol;

fn print_usage() {
    eprintln!("Engine Game Simulator");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  simulate <CODE_A> <CODE_B> [OPTIONS]");
    eprintln!();
    eprintln!("Each code is either an adaptive depth code (digits 1-5) or a");
    eprintln!("fixed move sequence (symbols W, V, A, L, D).");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --config <path>         Path to Finder.toml (default: Finder.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  simulate 111111111111 123412341234");
    eprintln!("  simulate 512345123451 WVALDWVALWVAL");
}

fn format_budget(budget: &Option<Budget>) -> String {
    match budget {
        Some(budget) => Symbol::all()
            .iter()
            .map(|s| format!("{}:{}", s, budget.remaining(*s)))
            .collect::<Vec<_>>()
            .join(" "),
        None => "fixed".to_string(),
    }
}

fn round_marker(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::FirstWins => "A",
        Outcome::SecondWins => "B",
        Outcome::Tie => "=",
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) {
            0
        } else {
            1
        });
    }

    let mut config_path = "Finder.toml".to_string();
    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --config requires an argument");
                    process::exit(1);
                }
                config_path = args[i + 1].clone();
                i += 1;
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    let rules = match config.game_rules() {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let code_a = match parse_code(&args[1], &rules) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let code_b = match parse_code(&args[2], &rules) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let game = match trace(&code_a, &code_b, &rules) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("Error during simulation: {}", e);
            process::exit(1);
        }
    };

    println!("A: {}", code_a);
    println!("B: {}", code_b);
    println!();
    println!("{:>5}  {:>2}  {:>2}  {}", "Round", "A", "B", "Winner");
    for (round, ((a, b), outcome)) in game
        .moves_a
        .iter()
        .zip(game.moves_b.iter())
        .zip(game.rounds.iter())
        .enumerate()
    {
        println!(
            "{:>5}  {:>2}  {:>2}  {}",
            round + 1,
            a.as_char(),
            b.as_char(),
            round_marker(*outcome)
        );
    }
    println!();
    println!(
        "Rounds won: A {} / B {} / ties {}",
        game.result.wins_a, game.result.wins_b, game.result.ties
    );
    println!("Budget left A: {}", format_budget(&game.budget_a));
    println!("Budget left B: {}", format_budget(&game.budget_b));
    println!(
        "Verdict for A: {} (margin {})",
        game.result.verdict(),
        game.result.margin()
    );
}
