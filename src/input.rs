// Opponent input parsing
//
// Reads reference engines one per line. A line may carry labels in front of
// the code ("name:source:code"); the code is the third field. Malformed codes
// are rejected one by one and the rest are kept.

use log::warn;
use std::io::BufRead;

use crate::error::FinderError;
use crate::game::GameRules;
use crate::types::{AdaptiveCode, Code, FixedCode};

/// Opponents read from an input, plus the lines that were turned away
#[derive(Debug, Default)]
pub struct OpponentList {
    pub accepted: Vec<Code>,
    pub rejected: Vec<FinderError>,
}

/// Pulls the code out of a possibly labelled line
pub fn extract_code(line: &str) -> &str {
    line.split(':').nth(2).unwrap_or(line).trim()
}

/// Parses one engine code for the given rules
///
/// Adaptive codes are `code_length` digits 1-5; a longer all-digit code is
/// cut down to `code_length`. Fixed codes are `code_length + 1` symbols from
/// W, V, A, L, D.
pub fn parse_code(raw: &str, rules: &GameRules) -> Result<Code, FinderError> {
    let code = extract_code(raw);
    let length = code.chars().count();
    let all_depths = !code.is_empty() && code.chars().all(|c| ('1'..='5').contains(&c));

    if all_depths && length >= rules.code_length() {
        let truncated: String = code.chars().take(rules.code_length()).collect();
        return truncated.parse::<AdaptiveCode>().map(Code::Adaptive);
    }
    if length == rules.code_length() {
        return code.parse::<AdaptiveCode>().map(Code::Adaptive);
    }
    if length == rules.moves_per_game() {
        return code.parse::<FixedCode>().map(Code::Fixed);
    }

    Err(FinderError::MalformedCode {
        code: code.to_string(),
        reason: format!(
            "must be {} digits (1-5) or {} symbols (W, V, A, L, D)",
            rules.code_length(),
            rules.moves_per_game()
        ),
    })
}

/// Reads opponents until a "." line, an empty line or end of input
pub fn read_opponents<R: BufRead>(
    reader: R,
    rules: &GameRules,
) -> Result<OpponentList, FinderError> {
    let mut list = OpponentList::default();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line == "." {
            break;
        }
        match parse_code(line, rules) {
            Ok(code) => list.accepted.push(code),
            Err(e) => {
                warn!("Skipping opponent: {}", e);
                list.rejected.push(e);
            }
        }
    }

    Ok(list)
}
