// Library exports for the engine finder
// The main binary and the simulate tool both drive the search through these modules

pub mod config;
pub mod error;
pub mod evaluator;
pub mod game;
pub mod generator;
pub mod input;
pub mod progress;
pub mod report;
pub mod rules;
pub mod run_log;
pub mod selection;
pub mod types;
