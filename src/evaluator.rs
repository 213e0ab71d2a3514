// Batch evaluator
//
// Plays every candidate against every reference opponent on a rayon pool and
// feeds the scored candidates to a selector. The candidate space is split into
// contiguous index batches; workers share nothing mutable except the progress
// counter, the bounded result channel (exact and never-lose modes) and the
// slot for a fatal error. Top-K mode keeps one bounded structure per worker
// split and merges them when the pool is done.

use log::{debug, error, info};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::fmt;
use std::ops::Range;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::FinderError;
use crate::game::{play, GameError, GameRules, Verdict};
use crate::generator::{batch_ranges, CodeSpace};
use crate::progress::{ProgressReporter, SearchProgress};
use crate::selection::{rank, CandidateResult, TopK};
use crate::types::Code;

/// What a run selects for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Candidate must reach the target verdict against every opponent
    Exact(Verdict),
    /// Candidate must not lose to any opponent
    NeverLose,
    /// Keep the K best total margins
    TopK(usize),
}

impl SearchMode {
    /// Name of one progress unit in this mode
    fn progress_unit(&self) -> &'static str {
        match self {
            SearchMode::TopK(_) => "matches",
            _ => "engines",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Exact(target) => write!(f, "exact ({})", target),
            SearchMode::NeverLose => write!(f, "never-lose"),
            SearchMode::TopK(k) => write!(f, "top-{}", k),
        }
    }
}

/// Anything that can hand out candidates by index
pub trait CandidateSource: Sync {
    fn candidate_count(&self) -> u64;
    fn candidate(&self, index: u64) -> Option<Code>;
}

impl CandidateSource for CodeSpace {
    fn candidate_count(&self) -> u64 {
        self.len()
    }

    fn candidate(&self, index: u64) -> Option<Code> {
        self.code_at(index).map(Code::Adaptive)
    }
}

impl CandidateSource for [Code] {
    fn candidate_count(&self) -> u64 {
        self.len() as u64
    }

    fn candidate(&self, index: u64) -> Option<Code> {
        self.get(index as usize).cloned()
    }
}

impl CandidateSource for Vec<Code> {
    fn candidate_count(&self) -> u64 {
        self.as_slice().candidate_count()
    }

    fn candidate(&self, index: u64) -> Option<Code> {
        self.as_slice().candidate(index)
    }
}

/// Scores one candidate against all opponents
///
/// Returns `Ok(None)` when the candidate is not selected in this mode and
/// `Err` only for a fatal simulator invariant violation. Unplayable pairings
/// disqualify the candidate in exact and never-lose modes and are skipped in
/// top-K mode.
pub fn score_candidate(
    candidate: &Code,
    opponents: &[Code],
    mode: &SearchMode,
    rules: &GameRules,
) -> Result<Option<i64>, FinderError> {
    let mut score = 0i64;

    for opponent in opponents {
        let result = match play(candidate, opponent, rules) {
            Ok(result) => result,
            Err(GameError::BudgetExhausted { round }) => {
                return Err(FinderError::BudgetExhausted { round })
            }
            Err(GameError::LengthMismatch { .. }) => match mode {
                SearchMode::TopK(_) => continue,
                _ => return Ok(None),
            },
        };

        match mode {
            SearchMode::Exact(target) => {
                if result.verdict() != *target {
                    return Ok(None);
                }
                score += match target {
                    Verdict::Win => result.margin(),
                    Verdict::Draw => result.wins_a as i64,
                    Verdict::Loss => -result.margin(),
                };
            }
            SearchMode::NeverLose => match result.verdict() {
                Verdict::Loss => return Ok(None),
                Verdict::Win => score += result.margin(),
                Verdict::Draw => score += result.wins_a as i64,
            },
            SearchMode::TopK(_) => score += result.margin(),
        }
    }

    if matches!(mode, SearchMode::TopK(_)) && score == 0 {
        return Ok(None);
    }
    Ok(Some(score))
}

/// Result-channel capacity for a memory budget
///
/// `memory_mb` divided by the per-result cost, capped at the candidate count
/// and then raised to `min_buffer`.
pub fn channel_capacity(
    memory_mb: u64,
    bytes_per_result: u64,
    min_buffer: u64,
    candidates: u64,
) -> usize {
    let by_memory = memory_mb.saturating_mul(1024 * 1024) / bytes_per_result.max(1);
    by_memory.min(candidates).max(min_buffer) as usize
}

/// Worker pool sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    pub threads: usize,
    pub batch_size: u64,
    pub memory_mb: u64,
    pub bytes_per_result: u64,
    pub min_buffer: u64,
    pub progress_interval: Option<Duration>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        WorkerSettings {
            threads: default_threads(),
            batch_size: 1000,
            memory_mb: 100,
            bytes_per_result: 24,
            min_buffer: 1000,
            progress_interval: Some(Duration::from_secs(5)),
        }
    }
}

/// Two threads per available CPU
pub fn default_threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(2)
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub mode: SearchMode,
    /// Selected candidates, highest score first
    pub results: Vec<CandidateResult>,
    /// Candidates in the searched space
    pub generated: u64,
    /// Progress units completed (candidates, or games in top-K mode)
    pub processed: u64,
    /// The run stopped early on request
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl SearchOutcome {
    pub fn best_score(&self) -> Option<i64> {
        self.results.first().map(|r| r.score)
    }
}

/// Parallel evaluator bound to one rule set and pool size
pub struct Evaluator {
    rules: GameRules,
    settings: WorkerSettings,
    progress: Arc<SearchProgress>,
}

impl Evaluator {
    pub fn new(rules: GameRules, settings: WorkerSettings) -> Self {
        Evaluator {
            rules,
            settings,
            progress: Arc::new(SearchProgress::new()),
        }
    }

    /// Shared progress handle; also used to cancel a running search
    pub fn progress(&self) -> Arc<SearchProgress> {
        self.progress.clone()
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Evaluates every candidate from `source` against `opponents`
    ///
    /// # Returns
    /// * `Ok(SearchOutcome)` - Selected candidates in descending score order
    /// * `Err(FinderError::NoOpponents)` - Nothing to play against
    /// * `Err(FinderError::BudgetExhausted)` - The simulator hit an impossible state
    pub fn evaluate<S>(
        &self,
        source: &S,
        opponents: &[Code],
        mode: SearchMode,
    ) -> Result<SearchOutcome, FinderError>
    where
        S: CandidateSource + ?Sized,
    {
        if opponents.is_empty() {
            return Err(FinderError::NoOpponents);
        }

        let start = Instant::now();
        let generated = source.candidate_count();
        let batches = batch_ranges(generated, self.settings.batch_size);
        let units_per_candidate = match mode {
            SearchMode::TopK(_) => opponents.len() as u64,
            _ => 1,
        };
        self.progress.reset(generated.saturating_mul(units_per_candidate));

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.threads.max(1))
            .build()?;

        info!(
            "Evaluating {} engines against {} opponents ({}, {} threads, {} batches)",
            generated,
            opponents.len(),
            mode,
            self.settings.threads.max(1),
            batches.len()
        );

        let reporter = self
            .settings
            .progress_interval
            .map(|interval| {
                ProgressReporter::spawn(self.progress.clone(), interval, mode.progress_unit())
            });

        let fatal: Mutex<Option<FinderError>> = Mutex::new(None);

        let results = match mode {
            SearchMode::TopK(k) => {
                let top = pool.install(|| {
                    batches
                        .par_iter()
                        .fold(
                            || TopK::new(k),
                            |mut local, range| {
                                let batch = range.clone();
                                self.run_batch(source, batch, opponents, &mode, &fatal, |r| {
                                    local.offer(r);
                                });
                                local
                            },
                        )
                        .reduce(|| TopK::new(k), TopK::merge)
                });
                top.into_sorted_vec()
            }
            SearchMode::Exact(_) | SearchMode::NeverLose => {
                let capacity = channel_capacity(
                    self.settings.memory_mb,
                    self.settings.bytes_per_result,
                    self.settings.min_buffer,
                    generated,
                );
                info!("Result buffer: {} entries", capacity);
                let (tx, rx) = mpsc::sync_channel::<CandidateResult>(capacity);

                let collected = thread::scope(|scope| {
                    let pool = &pool;
                    let batches = &batches;
                    let fatal = &fatal;
                    scope.spawn(move || {
                        pool.install(|| {
                            batches.par_iter().for_each_with(tx, |tx, range| {
                                self.run_batch(source, range.clone(), opponents, &mode, fatal, |r| {
                                    // The receiver outlives every sender
                                    let _ = tx.send(r);
                                });
                            });
                        });
                    });
                    rx.iter().collect::<Vec<CandidateResult>>()
                });
                rank(collected)
            }
        };

        if let Some(reporter) = reporter {
            reporter.finish();
        }

        if let Some(e) = fatal.into_inner() {
            error!("Search aborted: {}", e);
            return Err(e);
        }

        let outcome = SearchOutcome {
            mode,
            results,
            generated,
            processed: self.progress.processed(),
            cancelled: self.progress.is_cancelled(),
            elapsed: start.elapsed(),
        };

        let secs = outcome.elapsed.as_secs_f64();
        info!(
            "Selected {} / {} engines in {:.2}s ({:.0} {}/s){}",
            outcome.results.len(),
            outcome.generated,
            secs,
            if secs > 0.0 { outcome.processed as f64 / secs } else { 0.0 },
            mode.progress_unit(),
            if outcome.cancelled { " (cancelled)" } else { "" }
        );

        Ok(outcome)
    }

    /// Scores one contiguous batch, handing selected candidates to `emit`
    fn run_batch<S, F>(
        &self,
        source: &S,
        range: Range<u64>,
        opponents: &[Code],
        mode: &SearchMode,
        fatal: &Mutex<Option<FinderError>>,
        mut emit: F,
    ) where
        S: CandidateSource + ?Sized,
        F: FnMut(CandidateResult),
    {
        if self.progress.is_cancelled() {
            return;
        }

        let batch_len = range.end - range.start;
        for index in range.clone() {
            let Some(candidate) = source.candidate(index) else {
                continue;
            };
            match score_candidate(&candidate, opponents, mode, &self.rules) {
                Ok(Some(score)) => emit(CandidateResult {
                    code: candidate,
                    score,
                }),
                Ok(None) => {}
                Err(e) => {
                    error!("Invariant violation while playing {}: {}", candidate, e);
                    fatal.lock().get_or_insert(e);
                    self.progress.cancel();
                    return;
                }
            }
        }

        let units = match mode {
            SearchMode::TopK(_) => batch_len * opponents.len() as u64,
            _ => batch_len,
        };
        self.progress.add(units);
        debug!("Finished batch {}..{}", range.start, range.end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AdaptiveCode, FixedCode};

    fn adaptive(s: &str) -> Code {
        Code::Adaptive(s.parse::<AdaptiveCode>().unwrap())
    }

    fn fixed(s: &str) -> Code {
        Code::Fixed(s.parse::<FixedCode>().unwrap())
    }

    #[test]
    fn test_channel_capacity_clamps() {
        // 1 MB / 24 bytes = 43690, capped by candidate count
        assert_eq!(channel_capacity(1, 24, 1000, 10_000), 10_000);
        assert_eq!(channel_capacity(1, 24, 1000, 1_000_000), 43_690);
        // Raised to the minimum even for tiny spaces
        assert_eq!(channel_capacity(100, 24, 1000, 10), 1000);
    }

    #[test]
    fn test_draw_against_all_neutral_scores_wins() {
        let rules = GameRules::standard();
        let neutral = fixed("DDDDDDDDDDDDD");
        let candidate = adaptive("111111111111");
        let draw = SearchMode::Exact(Verdict::Draw);
        let score = score_candidate(&candidate, &[neutral.clone()], &draw, &rules).unwrap();
        assert_eq!(score, Some(0));
        assert_eq!(
            score_candidate(&candidate, &[neutral], &SearchMode::Exact(Verdict::Win), &rules)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_top_k_discards_zero_scores() {
        let rules = GameRules::standard();
        let candidate = adaptive("111111111111");
        // Self-play is a perfect mirror: margin 0
        let score =
            score_candidate(&candidate, &[candidate.clone()], &SearchMode::TopK(10), &rules)
                .unwrap();
        assert_eq!(score, None);
    }

    #[test]
    fn test_unplayable_opponent_disqualifies_in_exact_mode() {
        let rules = GameRules::standard();
        let candidate = adaptive("111111111111");
        let short = adaptive("1111");
        assert_eq!(
            score_candidate(&candidate, &[short.clone()], &SearchMode::Exact(Verdict::Draw), &rules)
                .unwrap(),
            None
        );
        assert_eq!(
            score_candidate(&candidate, &[short.clone()], &SearchMode::NeverLose, &rules).unwrap(),
            None
        );
        // Skipped in top-K mode, leaving a zero total which is discarded
        assert_eq!(
            score_candidate(&candidate, &[short], &SearchMode::TopK(1), &rules).unwrap(),
            None
        );
    }

    #[test]
    fn test_cancelled_search_stops_at_batch_boundary() {
        let settings = WorkerSettings {
            threads: 2,
            batch_size: 10,
            progress_interval: None,
            ..Default::default()
        };
        let evaluator = Evaluator::new(GameRules::standard(), settings);
        evaluator.progress().cancel();
        let space = CodeSpace::new(&[1, 1, 1, 1, 1, 1, 1, 1], &Default::default());
        let outcome = evaluator
            .evaluate(&space, &[adaptive("123412341234")], SearchMode::NeverLose)
            .unwrap();
        assert!(outcome.cancelled);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.processed, 0);
    }

    #[test]
    fn test_no_opponents_is_an_error() {
        let evaluator = Evaluator::new(GameRules::standard(), WorkerSettings::default());
        let space = CodeSpace::new(&[1; 12], &Default::default());
        assert!(matches!(
            evaluator.evaluate(&space, &[], SearchMode::NeverLose),
            Err(FinderError::NoOpponents)
        ));
    }
}
