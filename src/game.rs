// Game simulator
//
// A game is N reactive rounds followed by one forced closing move, so each
// side plays N + 1 symbols drawn from its budget. Three pairings exist:
// adaptive vs adaptive (mutual reaction), adaptive vs fixed (the adaptive side
// reacts to the fixed side's actual moves), and fixed vs fixed (straight
// position-by-position comparison).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FinderError;
use crate::rules::{base_symbol, next_symbol, outcome, Outcome};
use crate::types::{AdaptiveCode, Code, FixedCode, Symbol, SYMBOL_COUNT};

/// Default adaptive code length
pub const DEFAULT_CODE_LENGTH: usize = 12;

/// Default per-game allotment in W, V, A, L, D order
pub const DEFAULT_BUDGET: [u8; SYMBOL_COUNT] = [3, 3, 3, 3, 1];

/// Per-player remaining uses of each symbol for one game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    counts: [u8; SYMBOL_COUNT],
}

impl Budget {
    pub fn new(counts: [u8; SYMBOL_COUNT]) -> Self {
        Budget { counts }
    }

    pub fn standard() -> Self {
        Budget::new(DEFAULT_BUDGET)
    }

    #[inline]
    pub fn remaining(&self, symbol: Symbol) -> u8 {
        self.counts[symbol.index()]
    }

    #[inline]
    pub fn has(&self, symbol: Symbol) -> bool {
        self.counts[symbol.index()] > 0
    }

    pub fn counts(&self) -> [u8; SYMBOL_COUNT] {
        self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    pub fn is_exhausted(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Picks the symbol to play for a target without consuming it
    ///
    /// The target itself if any remain, otherwise the first available symbol
    /// found by stepping depth 1 around the cycle (at most four steps), then D.
    /// `None` only when the budget is empty.
    pub fn choose_available(&self, target: Symbol) -> Option<Symbol> {
        if self.has(target) {
            return Some(target);
        }
        let mut current = target;
        for _ in 0..4 {
            current = next_symbol(current, 1);
            if self.has(current) {
                return Some(current);
            }
        }
        if self.has(Symbol::D) {
            return Some(Symbol::D);
        }
        None
    }

    /// First symbol with remaining uses in W, V, A, L, D order
    pub fn closing_symbol(&self) -> Option<Symbol> {
        Symbol::all().into_iter().find(|&s| self.has(s))
    }

    #[inline]
    fn consume(&mut self, symbol: Symbol) {
        debug_assert!(self.has(symbol));
        self.counts[symbol.index()] -= 1;
    }
}

impl Default for Budget {
    fn default() -> Self {
        Budget::standard()
    }
}

/// Fixed game parameters: adaptive code length and starting budget
///
/// A game has `code_length + 1` moves per side, and the budget must hold
/// exactly that many uses so it is spent in full by the closing move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    code_length: usize,
    budget: Budget,
}

impl GameRules {
    pub fn new(code_length: usize, budget: Budget) -> Result<Self, FinderError> {
        if code_length == 0 {
            return Err(FinderError::InvalidConfig(
                "code_length must be at least 1".to_string(),
            ));
        }
        if budget.total() != code_length + 1 {
            return Err(FinderError::InvalidConfig(format!(
                "budget holds {} moves but a game needs {}",
                budget.total(),
                code_length + 1
            )));
        }
        Ok(GameRules { code_length, budget })
    }

    pub fn standard() -> Self {
        GameRules {
            code_length: DEFAULT_CODE_LENGTH,
            budget: Budget::standard(),
        }
    }

    pub fn code_length(&self) -> usize {
        self.code_length
    }

    /// Moves per side, including the closing move
    pub fn moves_per_game(&self) -> usize {
        self.code_length + 1
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }
}

impl Default for GameRules {
    fn default() -> Self {
        GameRules::standard()
    }
}

/// Game result from the first side's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Win,
    Draw,
    #[serde(alias = "Lose")]
    Loss,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Win => "Win",
            Verdict::Draw => "Draw",
            Verdict::Loss => "Lose",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "win" => Ok(Verdict::Win),
            "draw" => Ok(Verdict::Draw),
            "lose" | "loss" => Ok(Verdict::Loss),
            other => Err(format!("Invalid result '{}'. Use Win, Draw or Lose", other)),
        }
    }
}

/// Per-side round tally of a finished game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameResult {
    pub wins_a: u32,
    pub wins_b: u32,
    pub ties: u32,
}

impl GameResult {
    #[inline]
    fn record(&mut self, round: Outcome) {
        match round {
            Outcome::FirstWins => self.wins_a += 1,
            Outcome::SecondWins => self.wins_b += 1,
            Outcome::Tie => self.ties += 1,
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self.wins_a.cmp(&self.wins_b) {
            std::cmp::Ordering::Greater => Verdict::Win,
            std::cmp::Ordering::Less => Verdict::Loss,
            std::cmp::Ordering::Equal => Verdict::Draw,
        }
    }

    /// Round wins minus round losses for the first side
    pub fn margin(&self) -> i64 {
        self.wins_a as i64 - self.wins_b as i64
    }

    pub fn rounds(&self) -> u32 {
        self.wins_a + self.wins_b + self.ties
    }

    /// The same game seen from the second side
    pub fn swapped(self) -> GameResult {
        GameResult {
            wins_a: self.wins_b,
            wins_b: self.wins_a,
            ties: self.ties,
        }
    }
}

/// Why a pairing could not be played
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// A code does not have the length the pairing requires
    LengthMismatch { expected: usize, found: usize },
    /// A side had nothing left to play; the budget bookkeeping is broken
    BudgetExhausted { round: usize },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::LengthMismatch { expected, found } => {
                write!(f, "code length {} where {} was required", found, expected)
            }
            GameError::BudgetExhausted { round } => {
                write!(f, "budget exhausted in round {}", round)
            }
        }
    }
}

/// One adaptive side of a game: its digits and what is left of its budget
struct AdaptivePlayer<'a> {
    digits: &'a [u8],
    budget: Budget,
    round: usize,
}

impl<'a> AdaptivePlayer<'a> {
    fn new(digits: &'a [u8], budget: Budget) -> Self {
        AdaptivePlayer {
            digits,
            budget,
            round: 0,
        }
    }

    /// Plays the next move given the opponent's previous one
    ///
    /// The opening move comes straight from the first digit, later rounds
    /// rotate from `opponent_prev`, and once the digits run out the closing
    /// move takes whatever the budget still holds.
    fn next_move(&mut self, opponent_prev: Option<Symbol>) -> Result<Symbol, GameError> {
        let round = self.round;
        let chosen = match self.digits.get(round) {
            Some(&depth) => {
                let target = match opponent_prev {
                    Some(prev) if round > 0 => next_symbol(prev, depth),
                    _ => base_symbol(depth),
                };
                self.budget.choose_available(target)
            }
            None => self.budget.closing_symbol(),
        };
        let symbol = chosen.ok_or(GameError::BudgetExhausted { round })?;
        self.budget.consume(symbol);
        self.round += 1;
        Ok(symbol)
    }
}

fn check_length(found: usize, expected: usize) -> Result<(), GameError> {
    if found == expected {
        Ok(())
    } else {
        Err(GameError::LengthMismatch { expected, found })
    }
}

/// Plays two adaptive codes against each other
///
/// Each side reacts to the other's previous move; both spend their own
/// budget. Returns the round tally from `a`'s side.
pub fn play_adaptive(
    a: &AdaptiveCode,
    b: &AdaptiveCode,
    rules: &GameRules,
) -> Result<GameResult, GameError> {
    check_length(a.len(), rules.code_length())?;
    check_length(b.len(), rules.code_length())?;

    let mut player_a = AdaptivePlayer::new(a.digits(), rules.budget());
    let mut player_b = AdaptivePlayer::new(b.digits(), rules.budget());
    let mut prev_a = None;
    let mut prev_b = None;
    let mut result = GameResult::default();

    for _ in 0..rules.moves_per_game() {
        let move_a = player_a.next_move(prev_b)?;
        let move_b = player_b.next_move(prev_a)?;
        result.record(outcome(move_a, move_b));
        prev_a = Some(move_a);
        prev_b = Some(move_b);
    }

    Ok(result)
}

/// Plays an adaptive code against a fixed code
///
/// The adaptive side reacts to the fixed side's actual previous move. The
/// fixed side is not budget-constrained.
pub fn play_adaptive_vs_fixed(
    code: &AdaptiveCode,
    opponent: &FixedCode,
    rules: &GameRules,
) -> Result<GameResult, GameError> {
    check_length(code.len(), rules.code_length())?;
    check_length(opponent.len(), rules.moves_per_game())?;

    let mut player = AdaptivePlayer::new(code.digits(), rules.budget());
    let mut prev = None;
    let mut result = GameResult::default();

    for &fixed_move in opponent.moves() {
        let own = player.next_move(prev)?;
        result.record(outcome(own, fixed_move));
        prev = Some(fixed_move);
    }

    Ok(result)
}

/// Compares two move sequences position by position
pub fn play_fixed(a: &[Symbol], b: &[Symbol], rules: &GameRules) -> Result<GameResult, GameError> {
    check_length(a.len(), rules.moves_per_game())?;
    check_length(b.len(), rules.moves_per_game())?;

    let mut result = GameResult::default();
    for (&move_a, &move_b) in a.iter().zip(b) {
        result.record(outcome(move_a, move_b));
    }
    Ok(result)
}

/// Plays any two codes, dispatching on their shapes
///
/// A fixed code against an adaptive one is played as the mirrored
/// adaptive-vs-fixed game and reported from the fixed side.
pub fn play(a: &Code, b: &Code, rules: &GameRules) -> Result<GameResult, GameError> {
    match (a, b) {
        (Code::Adaptive(a), Code::Adaptive(b)) => play_adaptive(a, b, rules),
        (Code::Adaptive(a), Code::Fixed(b)) => play_adaptive_vs_fixed(a, b, rules),
        (Code::Fixed(a), Code::Adaptive(b)) => {
            play_adaptive_vs_fixed(b, a, rules).map(GameResult::swapped)
        }
        (Code::Fixed(a), Code::Fixed(b)) => play_fixed(a.moves(), b.moves(), rules),
    }
}

/// Realized move sequence of an adaptive code reacting to a fixed opponent
pub fn realize_against_fixed(
    code: &AdaptiveCode,
    opponent: &FixedCode,
    rules: &GameRules,
) -> Result<Vec<Symbol>, GameError> {
    check_length(code.len(), rules.code_length())?;
    check_length(opponent.len(), rules.moves_per_game())?;

    let mut player = AdaptivePlayer::new(code.digits(), rules.budget());
    let mut moves = Vec::with_capacity(rules.moves_per_game());
    let mut prev = None;
    for &fixed_move in opponent.moves() {
        moves.push(player.next_move(prev)?);
        prev = Some(fixed_move);
    }
    Ok(moves)
}

/// Full record of one game, for inspection tools and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTrace {
    pub moves_a: Vec<Symbol>,
    pub moves_b: Vec<Symbol>,
    pub rounds: Vec<Outcome>,
    pub result: GameResult,
    /// Budgets left after the game; `None` for a fixed side
    pub budget_a: Option<Budget>,
    pub budget_b: Option<Budget>,
}

/// Plays any two codes and records every move
pub fn trace(a: &Code, b: &Code, rules: &GameRules) -> Result<GameTrace, GameError> {
    let moves_per_game = rules.moves_per_game();
    let mut player_a = side_for(a, rules)?;
    let mut player_b = side_for(b, rules)?;

    let mut moves_a = Vec::with_capacity(moves_per_game);
    let mut moves_b = Vec::with_capacity(moves_per_game);
    let mut rounds = Vec::with_capacity(moves_per_game);
    let mut result = GameResult::default();

    for i in 0..moves_per_game {
        let prev_a = i.checked_sub(1).map(|p| moves_a[p]);
        let prev_b = i.checked_sub(1).map(|p| moves_b[p]);
        let move_a = player_a.next_move(i, prev_b)?;
        let move_b = player_b.next_move(i, prev_a)?;
        let round = outcome(move_a, move_b);
        result.record(round);
        rounds.push(round);
        moves_a.push(move_a);
        moves_b.push(move_b);
    }

    Ok(GameTrace {
        moves_a,
        moves_b,
        rounds,
        result,
        budget_a: player_a.budget(),
        budget_b: player_b.budget(),
    })
}

enum Side<'a> {
    Adaptive(AdaptivePlayer<'a>),
    Fixed(&'a [Symbol]),
}

impl<'a> Side<'a> {
    fn next_move(
        &mut self,
        round: usize,
        opponent_prev: Option<Symbol>,
    ) -> Result<Symbol, GameError> {
        match self {
            Side::Adaptive(player) => player.next_move(opponent_prev),
            Side::Fixed(moves) => Ok(moves[round]),
        }
    }

    fn budget(&self) -> Option<Budget> {
        match self {
            Side::Adaptive(player) => Some(player.budget),
            Side::Fixed(_) => None,
        }
    }
}

fn side_for<'a>(code: &'a Code, rules: &GameRules) -> Result<Side<'a>, GameError> {
    match code {
        Code::Adaptive(c) => {
            check_length(c.len(), rules.code_length())?;
            Ok(Side::Adaptive(AdaptivePlayer::new(c.digits(), rules.budget())))
        }
        Code::Fixed(c) => {
            check_length(c.len(), rules.moves_per_game())?;
            Ok(Side::Fixed(c.moves()))
        }
    }
}
