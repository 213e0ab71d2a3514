use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use engine_finder::config::{Config, ModeKind};
use engine_finder::error::FinderError;
use engine_finder::evaluator::{Evaluator, SearchMode, SearchOutcome};
use engine_finder::game::Verdict;
use engine_finder::generator::CodeSpace;
use engine_finder::input::read_opponents;
use engine_finder::report::append_results;
use engine_finder::run_log::{RunLogEntry, RunLogger};

/// Search every depth-coded engine for ones that beat a set of opponents
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the TOML configuration (default: Finder.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// File with one opponent code per line; reads stdin when omitted
    #[arg(long)]
    opponents: Option<PathBuf>,

    /// Required leading digits, e.g. "51"
    #[arg(long)]
    prefix: Option<String>,

    /// exact, never_lose or top_k
    #[arg(long, value_parser = parse_mode)]
    mode: Option<ModeKind>,

    /// Win, Draw or Lose (exact mode)
    #[arg(long)]
    target: Option<Verdict>,

    /// Number of engines to keep in top_k mode
    #[arg(long)]
    top_k: Option<usize>,

    /// Worker threads (0 = two per CPU)
    #[arg(long)]
    threads: Option<usize>,

    /// Memory budget for buffered results, in MB
    #[arg(long)]
    memory_mb: Option<u64>,

    /// Results file to append to
    #[arg(long)]
    output: Option<PathBuf>,

    /// Do not fall back to a never-lose search when an exact search finds nothing
    #[arg(long)]
    no_fallback: bool,
}

fn parse_mode(s: &str) -> Result<ModeKind, String> {
    match s.to_lowercase().replace('-', "_").as_str() {
        "exact" => Ok(ModeKind::Exact),
        "never_lose" => Ok(ModeKind::NeverLose),
        "top_k" => Ok(ModeKind::TopK),
        other => Err(format!("Invalid mode '{}'. Use exact, never_lose or top_k", other)),
    }
}

fn main() -> anyhow::Result<()> {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args = Args::parse();
    let config = load_config(&args)?;
    config.validate().map_err(FinderError::InvalidConfig)?;
    let rules = config.game_rules().map_err(FinderError::InvalidConfig)?;

    let opponents = match &args.opponents {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open opponents file {}", path.display()))?;
            read_opponents(BufReader::new(file), &rules)?
        }
        None => {
            eprintln!(
                "Enter engine codes (one per line, '.' to stop): \
                 {} digits 1-5 or {} symbols W/V/A/L/D",
                rules.code_length(),
                rules.moves_per_game()
            );
            read_opponents(io::stdin().lock(), &rules)?
        }
    };
    for rejected in &opponents.rejected {
        eprintln!("{}", rejected);
    }
    if opponents.accepted.is_empty() {
        return Err(FinderError::NoOpponents.into());
    }

    let space = CodeSpace::from_prefix_str(&config.generator.prefix, &config.generator_config());
    if space.is_empty() {
        warn!("Prefix '{}' leaves no engines to search", config.generator.prefix);
    }

    let run_logger = RunLogger::new(config.debug.enabled, &config.debug.log_file_path);
    let evaluator = Evaluator::new(rules, config.worker_settings());
    let mode = config.search_mode();

    let outcome = evaluator.evaluate(&space, &opponents.accepted, mode)?;
    finish_run(&config, &run_logger, &outcome, opponents.accepted.len())?;

    if outcome.results.is_empty() && !outcome.cancelled {
        if let SearchMode::Exact(target) = mode {
            println!(
                "No engines found that {} against all input engines",
                target_verb(target)
            );
            if config.search.fallback_never_lose {
                info!("Falling back to a never-lose search");
                let fallback =
                    evaluator.evaluate(&space, &opponents.accepted, SearchMode::NeverLose)?;
                finish_run(&config, &run_logger, &fallback, opponents.accepted.len())?;
            }
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path).map_err(FinderError::InvalidConfig)?,
        None => Config::load_or_default(),
    };

    if let Some(prefix) = &args.prefix {
        config.generator.prefix = prefix.clone();
    }
    if let Some(mode) = args.mode {
        config.search.mode = mode;
    }
    if let Some(target) = args.target {
        config.search.target = target;
    }
    if let Some(k) = args.top_k {
        config.search.top_k = k;
    }
    if let Some(threads) = args.threads {
        config.workers.threads = threads;
    }
    if let Some(mb) = args.memory_mb {
        config.workers.memory_mb = mb;
    }
    if let Some(output) = &args.output {
        config.output.results_path = output.display().to_string();
    }
    if args.no_fallback {
        config.search.fallback_never_lose = false;
    }

    Ok(config)
}

/// Writes the results file, the history entry and the summary line
fn finish_run(
    config: &Config,
    run_logger: &RunLogger,
    outcome: &SearchOutcome,
    opponent_count: usize,
) -> anyhow::Result<()> {
    run_logger.log_run(&RunLogEntry::from_outcome(
        outcome,
        &config.generator.prefix,
        opponent_count,
    ));

    if outcome.results.is_empty() {
        if outcome.mode == SearchMode::NeverLose {
            println!("No engines found that never lose against all input engines");
        }
        return Ok(());
    }

    append_results(&config.output.results_path, &outcome.results)?;

    match outcome.mode {
        SearchMode::Exact(target) => println!(
            "We found {} engines / {} total generated engines who {} from all input engines",
            outcome.results.len(),
            outcome.generated,
            target_verb(target)
        ),
        SearchMode::NeverLose => println!(
            "We found {} engines / {} total generated engines \
             that never lose (win or draw) from all input engines",
            outcome.results.len(),
            outcome.generated
        ),
        SearchMode::TopK(k) => println!(
            "Top {} engines saved ({} kept) out of {} matches",
            k,
            outcome.results.len(),
            outcome.processed
        ),
    }
    Ok(())
}

fn target_verb(target: Verdict) -> &'static str {
    match target {
        Verdict::Win => "win",
        Verdict::Draw => "draw",
        Verdict::Loss => "lose",
    }
}
