// Opponent input integration tests
//
// Reads a fixture file the same way the finder reads stdin and plays the
// accepted opponents to make sure they are usable as-is.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use engine_finder::error::FinderError;
use engine_finder::game::{play, GameRules};
use engine_finder::input::read_opponents;
use engine_finder::types::Code;

/// Helper function to get the path to test fixtures
fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(filename)
}

#[test]
fn test_fixture_opponents() {
    let rules = GameRules::standard();
    let file = File::open(fixture_path("opponents.txt")).expect("Failed to open opponents.txt");
    let list = read_opponents(BufReader::new(file), &rules).expect("Failed to read opponents");

    let accepted: Vec<String> = list.accepted.iter().map(|c| c.to_string()).collect();
    assert_eq!(
        accepted,
        vec![
            "111111111111",
            "432143214321",
            "WWWVVVAAALLLD",
            "224411334455",
            "DDDDDDDDDDDDD",
        ],
        "Lines after '.' must be ignored and long digit codes truncated"
    );
    assert_eq!(list.rejected.len(), 2, "Short code and bad symbol are rejected");
    assert!(list
        .rejected
        .iter()
        .all(|e| matches!(e, FinderError::MalformedCode { .. })));
}

#[test]
fn test_accepted_opponents_are_playable() {
    let rules = GameRules::standard();
    let file = File::open(fixture_path("opponents.txt")).expect("Failed to open opponents.txt");
    let list = read_opponents(BufReader::new(file), &rules).unwrap();
    let candidate = Code::Adaptive("123451234123".parse().unwrap());

    for opponent in &list.accepted {
        let result = play(&candidate, opponent, &rules).expect("accepted codes must play");
        assert_eq!(result.rounds() as usize, rules.moves_per_game());
    }
}
