// Configuration module for reading Finder.toml
// Every tunable of a search run lives here; command-line flags override it.

use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::evaluator::{default_threads, SearchMode, WorkerSettings};
use crate::game::{Budget, GameRules, Verdict};
use crate::generator::GeneratorConfig;

/// Longest supported code; keeps enumeration counts inside u64
pub const MAX_CODE_LENGTH: usize = 24;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub rules: RulesConfig,
    pub generator: GeneratorSection,
    pub search: SearchConfig,
    pub workers: WorkersConfig,
    pub progress: ProgressConfig,
    pub output: OutputConfig,
    pub debug: DebugConfig,
}

/// Game shape
#[derive(Debug, Deserialize, Clone)]
pub struct RulesConfig {
    pub code_length: usize,
    /// Starting uses per symbol in W, V, A, L, D order
    pub budget: [u8; 5],
}

/// Candidate enumeration constraints
#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorSection {
    /// Required leading digits; empty searches the whole space
    pub prefix: String,
    pub max_wildcards: usize,
    /// Allowed last digits; empty means any
    pub final_depths: Vec<u8>,
}

/// Which selection to run
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    Exact,
    NeverLose,
    TopK,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub mode: ModeKind,
    /// Required verdict in exact mode
    pub target: Verdict,
    pub top_k: usize,
    /// Run a never-lose search when an exact search selects nothing
    pub fallback_never_lose: bool,
}

/// Worker pool and buffering
#[derive(Debug, Deserialize, Clone)]
pub struct WorkersConfig {
    /// 0 picks two threads per CPU
    pub threads: usize,
    pub batch_size: u64,
    pub memory_mb: u64,
    pub bytes_per_result: u64,
    pub min_buffer: u64,
}

impl WorkersConfig {
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            default_threads()
        } else {
            self.threads
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProgressConfig {
    pub enabled: bool,
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub results_path: String,
}

/// Run history configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Finder.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Finder.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Finder.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the values in Finder.toml
    pub fn default_hardcoded() -> Self {
        Config {
            rules: RulesConfig {
                code_length: 12,
                budget: [3, 3, 3, 3, 1],
            },
            generator: GeneratorSection {
                prefix: String::new(),
                max_wildcards: 1,
                final_depths: Vec::new(),
            },
            search: SearchConfig {
                mode: ModeKind::Exact,
                target: Verdict::Win,
                top_k: 10_000,
                fallback_never_lose: true,
            },
            workers: WorkersConfig {
                threads: 0,
                batch_size: 1000,
                memory_mb: 100,
                bytes_per_result: 24,
                min_buffer: 1000,
            },
            progress: ProgressConfig {
                enabled: true,
                interval_ms: 5000,
            },
            output: OutputConfig {
                results_path: "matching_engines.txt".to_string(),
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "finder_runs.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            warn!("Could not load Finder.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    /// Checks values that would make a run meaningless
    pub fn validate(&self) -> Result<(), String> {
        if self.rules.code_length == 0 || self.rules.code_length > MAX_CODE_LENGTH {
            return Err(format!(
                "rules.code_length must be between 1 and {}",
                MAX_CODE_LENGTH
            ));
        }
        self.game_rules()?;
        if self.generator.prefix.len() > self.rules.code_length {
            return Err(format!(
                "generator.prefix '{}' is longer than the code length",
                self.generator.prefix
            ));
        }
        if !self.generator.prefix.chars().all(|c| ('1'..='5').contains(&c)) {
            return Err(format!(
                "generator.prefix '{}' may only contain digits 1-5",
                self.generator.prefix
            ));
        }
        if self.generator.max_wildcards > self.rules.code_length {
            return Err(format!(
                "generator.max_wildcards must be at most the code length ({})",
                self.rules.code_length
            ));
        }
        if let Some(d) = self.generator.final_depths.iter().find(|d| !(1..=5).contains(*d)) {
            return Err(format!("generator.final_depths contains {}, expected 1-5", d));
        }
        if self.search.mode == ModeKind::TopK && self.search.top_k == 0 {
            return Err("search.top_k must be at least 1".to_string());
        }
        if self.workers.batch_size == 0 {
            return Err("workers.batch_size must be at least 1".to_string());
        }
        if self.workers.bytes_per_result == 0 {
            return Err("workers.bytes_per_result must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn game_rules(&self) -> Result<GameRules, String> {
        GameRules::new(self.rules.code_length, Budget::new(self.rules.budget))
            .map_err(|e| e.to_string())
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            length: self.rules.code_length,
            max_wildcards: self.generator.max_wildcards,
            final_depths: self.generator.final_depths.clone(),
        }
    }

    pub fn search_mode(&self) -> SearchMode {
        match self.search.mode {
            ModeKind::Exact => SearchMode::Exact(self.search.target),
            ModeKind::NeverLose => SearchMode::NeverLose,
            ModeKind::TopK => SearchMode::TopK(self.search.top_k),
        }
    }

    pub fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            threads: self.workers.effective_threads(),
            batch_size: self.workers.batch_size,
            memory_mb: self.workers.memory_mb,
            bytes_per_result: self.workers.bytes_per_result,
            min_buffer: self.workers.min_buffer,
            progress_interval: if self.progress.enabled {
                Some(Duration::from_millis(self.progress.interval_ms.max(1)))
            } else {
                None
            },
        }
    }
}
