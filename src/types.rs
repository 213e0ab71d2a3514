// Core game types
//
// Symbols, depth digits and the two engine code shapes (adaptive and fixed).
// Codes are validated on construction, so everything downstream can assume
// well-formed digits and symbols.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FinderError;

/// Number of distinct symbols in the game
pub const SYMBOL_COUNT: usize = 5;

/// Smallest and largest legal depth digit
pub const MIN_DEPTH: u8 = 1;
pub const MAX_DEPTH: u8 = 5;

/// The wildcard depth, always resolving to the neutral symbol
pub const WILDCARD_DEPTH: u8 = 5;

/// One of the five playable symbols
///
/// W, V, A and L form the dominance cycle. D is neutral and ties with
/// everything, including itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Symbol {
    W,
    V,
    A,
    L,
    D,
}

impl Symbol {
    /// Returns all symbols in canonical order (W, V, A, L, D)
    pub fn all() -> [Symbol; SYMBOL_COUNT] {
        [Symbol::W, Symbol::V, Symbol::A, Symbol::L, Symbol::D]
    }

    /// Position of the symbol in canonical order, used to index budgets and tables
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_char(self) -> char {
        match self {
            Symbol::W => 'W',
            Symbol::V => 'V',
            Symbol::A => 'A',
            Symbol::L => 'L',
            Symbol::D => 'D',
        }
    }

    pub fn from_char(c: char) -> Option<Symbol> {
        match c {
            'W' => Some(Symbol::W),
            'V' => Some(Symbol::V),
            'A' => Some(Symbol::A),
            'L' => Some(Symbol::L),
            'D' => Some(Symbol::D),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Depth-coded engine: one depth digit (1-5) per round
///
/// Round 0 maps the digit directly to a symbol, later rounds rotate from the
/// opponent's previous move. Digit 5 is the wildcard and always yields D.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdaptiveCode {
    digits: Vec<u8>,
}

impl AdaptiveCode {
    /// Builds a code from raw digits, rejecting anything outside 1..=5
    pub fn new(digits: Vec<u8>) -> Result<Self, FinderError> {
        if digits.is_empty() {
            return Err(FinderError::MalformedCode {
                code: String::new(),
                reason: "empty code".to_string(),
            });
        }
        if let Some(bad) = digits.iter().find(|d| !(MIN_DEPTH..=MAX_DEPTH).contains(*d)) {
            return Err(FinderError::MalformedCode {
                code: digits_to_string(&digits),
                reason: format!("depth digit {} outside 1-5", bad),
            });
        }
        Ok(AdaptiveCode { digits })
    }

    /// Builds a code from digits already known to be in range
    pub(crate) fn from_trusted(digits: Vec<u8>) -> Self {
        debug_assert!(digits.iter().all(|d| (MIN_DEPTH..=MAX_DEPTH).contains(d)));
        AdaptiveCode { digits }
    }

    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Number of wildcard (5) digits in the code
    pub fn wildcard_count(&self) -> usize {
        self.digits.iter().filter(|&&d| d == WILDCARD_DEPTH).count()
    }
}

impl fmt::Display for AdaptiveCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&digits_to_string(&self.digits))
    }
}

impl FromStr for AdaptiveCode {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .chars()
            .map(|c| match c.to_digit(10) {
                Some(d) if (MIN_DEPTH as u32..=MAX_DEPTH as u32).contains(&d) => Ok(d as u8),
                _ => Err(FinderError::MalformedCode {
                    code: s.to_string(),
                    reason: format!("'{}' is not a depth digit 1-5", c),
                }),
            })
            .collect::<Result<Vec<u8>, FinderError>>()?;
        AdaptiveCode::new(digits)
    }
}

/// Pre-committed engine: one explicit symbol per move, no reactivity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedCode {
    moves: Vec<Symbol>,
}

impl FixedCode {
    pub fn new(moves: Vec<Symbol>) -> Result<Self, FinderError> {
        if moves.is_empty() {
            return Err(FinderError::MalformedCode {
                code: String::new(),
                reason: "empty code".to_string(),
            });
        }
        Ok(FixedCode { moves })
    }

    pub fn moves(&self) -> &[Symbol] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

impl fmt::Display for FixedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.moves {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

impl FromStr for FixedCode {
    type Err = FinderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let moves = s
            .chars()
            .map(|c| {
                Symbol::from_char(c).ok_or_else(|| FinderError::MalformedCode {
                    code: s.to_string(),
                    reason: format!("'{}' is not one of W, V, A, L, D", c),
                })
            })
            .collect::<Result<Vec<Symbol>, FinderError>>()?;
        FixedCode::new(moves)
    }
}

/// Either engine shape
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Code {
    Adaptive(AdaptiveCode),
    Fixed(FixedCode),
}

impl Code {
    pub fn is_adaptive(&self) -> bool {
        matches!(self, Code::Adaptive(_))
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Adaptive(code) => code.fmt(f),
            Code::Fixed(code) => code.fmt(f),
        }
    }
}

impl From<AdaptiveCode> for Code {
    fn from(code: AdaptiveCode) -> Self {
        Code::Adaptive(code)
    }
}

impl From<FixedCode> for Code {
    fn from(code: FixedCode) -> Self {
        Code::Fixed(code)
    }
}

fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}
