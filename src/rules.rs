// Rule engine: symbol dominance and depth transitions
//
// Both tables are immutable constants. Every lookup is a plain array index,
// these functions sit on the innermost loop of a full enumeration.

use crate::types::{Symbol, SYMBOL_COUNT, WILDCARD_DEPTH};

/// Result of comparing two symbols, from the first symbol's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    FirstWins,
    SecondWins,
    Tie,
}

impl Outcome {
    /// The same comparison seen from the other side
    pub fn flipped(self) -> Outcome {
        match self {
            Outcome::FirstWins => Outcome::SecondWins,
            Outcome::SecondWins => Outcome::FirstWins,
            Outcome::Tie => Outcome::Tie,
        }
    }
}

use Outcome::{FirstWins as F, SecondWins as S, Tie as T};

/// Dominance over the cycle W > L > A > V > W; D ties with everything
const DOMINANCE: [[Outcome; SYMBOL_COUNT]; SYMBOL_COUNT] = [
    //  W  V  A  L  D
    [T, S, T, F, T], // W
    [F, T, S, T, T], // V
    [T, F, T, S, T], // A
    [S, T, F, T, T], // L
    [T, T, T, T, T], // D
];

/// Rotation through the cycle for depths 1-4, indexed by [prev][depth - 1]
///
/// D has no place in the cycle and is looked up as L.
const DEPTH_TRANSITIONS: [[Symbol; 4]; 4] = [
    [Symbol::L, Symbol::A, Symbol::V, Symbol::W], // from W
    [Symbol::W, Symbol::L, Symbol::A, Symbol::V], // from V
    [Symbol::V, Symbol::W, Symbol::L, Symbol::A], // from A
    [Symbol::A, Symbol::V, Symbol::W, Symbol::L], // from L
];

/// Opening move for each depth digit, indexed by depth - 1
const BASE_SYMBOLS: [Symbol; 5] = [Symbol::W, Symbol::V, Symbol::A, Symbol::L, Symbol::D];

/// Compares two symbols
#[inline]
pub fn outcome(a: Symbol, b: Symbol) -> Outcome {
    DOMINANCE[a.index()][b.index()]
}

/// Derives the next symbol from the opponent's previous symbol and a depth digit
///
/// # Arguments
/// * `prev` - Opponent's previous move
/// * `depth` - Depth digit in 1..=5; 5 always yields D
///
/// # Panics
/// In debug builds, if `depth` is outside 1..=5. Codes are validated on
/// construction so this cannot happen for a well-formed code.
#[inline]
pub fn next_symbol(prev: Symbol, depth: u8) -> Symbol {
    debug_assert!((1..=WILDCARD_DEPTH).contains(&depth));
    if depth == WILDCARD_DEPTH {
        return Symbol::D;
    }
    let prev = if prev == Symbol::D { Symbol::L } else { prev };
    DEPTH_TRANSITIONS[prev.index()][(depth - 1) as usize]
}

/// Maps a depth digit straight to a symbol for the opening round
#[inline]
pub fn base_symbol(depth: u8) -> Symbol {
    debug_assert!((1..=WILDCARD_DEPTH).contains(&depth));
    BASE_SYMBOLS[(depth - 1) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_is_complementary() {
        for a in Symbol::all() {
            for b in Symbol::all() {
                assert_eq!(outcome(a, b), outcome(b, a).flipped(), "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_equal_symbols_and_neutral_tie() {
        for x in Symbol::all() {
            assert_eq!(outcome(x, x), Outcome::Tie);
            assert_eq!(outcome(x, Symbol::D), Outcome::Tie);
            assert_eq!(outcome(Symbol::D, x), Outcome::Tie);
        }
    }

    #[test]
    fn test_cycle_directions() {
        assert_eq!(outcome(Symbol::W, Symbol::L), Outcome::FirstWins);
        assert_eq!(outcome(Symbol::L, Symbol::W), Outcome::SecondWins);
        assert_eq!(outcome(Symbol::L, Symbol::A), Outcome::FirstWins);
        assert_eq!(outcome(Symbol::A, Symbol::V), Outcome::FirstWins);
        assert_eq!(outcome(Symbol::V, Symbol::W), Outcome::FirstWins);
        assert_ne!(outcome(Symbol::W, Symbol::V), Outcome::Tie);
    }

    #[test]
    fn test_non_adjacent_pairs_tie() {
        assert_eq!(outcome(Symbol::W, Symbol::A), Outcome::Tie);
        assert_eq!(outcome(Symbol::V, Symbol::L), Outcome::Tie);
    }

    #[test]
    fn test_depth_four_is_identity() {
        for prev in [Symbol::W, Symbol::V, Symbol::A, Symbol::L] {
            assert_eq!(next_symbol(prev, 4), prev);
        }
    }

    #[test]
    fn test_depth_five_always_neutral() {
        for prev in Symbol::all() {
            assert_eq!(next_symbol(prev, 5), Symbol::D);
        }
    }

    #[test]
    fn test_neutral_previous_is_read_as_l() {
        for depth in 1..=4 {
            assert_eq!(next_symbol(Symbol::D, depth), next_symbol(Symbol::L, depth));
        }
    }

    #[test]
    fn test_depth_one_walks_whole_cycle() {
        let mut current = Symbol::W;
        let mut seen = Vec::new();
        for _ in 0..4 {
            current = next_symbol(current, 1);
            seen.push(current);
        }
        assert_eq!(seen, vec![Symbol::L, Symbol::A, Symbol::V, Symbol::W]);
    }

    #[test]
    fn test_depth_one_picks_symbol_beaten_by_previous() {
        for prev in [Symbol::W, Symbol::V, Symbol::A, Symbol::L] {
            assert_eq!(outcome(prev, next_symbol(prev, 1)), Outcome::FirstWins);
            assert_eq!(outcome(next_symbol(prev, 3), prev), Outcome::FirstWins);
        }
    }

    #[test]
    fn test_base_symbols() {
        assert_eq!(base_symbol(1), Symbol::W);
        assert_eq!(base_symbol(2), Symbol::V);
        assert_eq!(base_symbol(3), Symbol::A);
        assert_eq!(base_symbol(4), Symbol::L);
        assert_eq!(base_symbol(5), Symbol::D);
    }
}
