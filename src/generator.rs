// Strategy generator
//
// Enumerates every adaptive code of a fixed length that extends a prefix and
// respects the wildcard limit (and, optionally, a restricted set of final
// digits). The space is ranked: its size is known up front and any index can
// be turned into its code directly, so workers can take disjoint index ranges
// without sharing an accumulator. Codes come out in ascending lexicographic
// order of their digits.

use std::ops::Range;

use crate::types::{AdaptiveCode, MAX_DEPTH, MIN_DEPTH, WILDCARD_DEPTH};

/// Shape constraints for generated codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Total code length
    pub length: usize,
    /// How many wildcard (5) digits a single code may contain
    pub max_wildcards: usize,
    /// Allowed digits for the last position; empty means unrestricted
    pub final_depths: Vec<u8>,
}

impl GeneratorConfig {
    pub fn new(length: usize) -> Self {
        GeneratorConfig {
            length,
            ..Default::default()
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            length: crate::game::DEFAULT_CODE_LENGTH,
            max_wildcards: 1,
            final_depths: Vec::new(),
        }
    }
}

/// The set of codes extending one prefix
#[derive(Debug, Clone)]
pub struct CodeSpace {
    prefix: Vec<u8>,
    length: usize,
    /// Bit `d` set when digit `d` may end a code
    final_mask: u8,
    /// completions[r][w]: ways to fill the last `r` positions with at most `w` wildcards
    completions: Vec<Vec<u64>>,
    wildcards_left: usize,
    total: u64,
}

impl CodeSpace {
    /// Builds the space of codes extending `prefix`
    ///
    /// A prefix with a digit outside 1..=5, longer than the code length, or
    /// with more wildcards than allowed yields an empty space rather than an
    /// error.
    pub fn new(prefix: &[u8], config: &GeneratorConfig) -> Self {
        let final_mask = if config.final_depths.is_empty() {
            (MIN_DEPTH..=MAX_DEPTH).fold(0u8, |mask, d| mask | (1 << d))
        } else {
            config
                .final_depths
                .iter()
                .filter(|d| (MIN_DEPTH..=MAX_DEPTH).contains(*d))
                .fold(0u8, |mask, &d| mask | (1 << d))
        };

        // A code cannot hold more wildcards than it has digits
        let max_wildcards = config.max_wildcards.min(config.length);
        let completions = completion_table(config.length, max_wildcards, final_mask);

        let mut space = CodeSpace {
            prefix: prefix.to_vec(),
            length: config.length,
            final_mask,
            completions,
            wildcards_left: 0,
            total: 0,
        };

        let prefix_valid = prefix.len() <= config.length
            && prefix.iter().all(|d| (MIN_DEPTH..=MAX_DEPTH).contains(d));
        if !prefix_valid {
            return space;
        }
        let used = prefix.iter().filter(|&&d| d == WILDCARD_DEPTH).count();
        if used > max_wildcards {
            return space;
        }
        if prefix.len() == config.length {
            if let Some(&last) = prefix.last() {
                if final_mask & (1 << last) == 0 {
                    return space;
                }
            }
        }

        space.wildcards_left = max_wildcards - used;
        space.total = space.completions[config.length - prefix.len()][space.wildcards_left];
        space
    }

    /// Parses a textual prefix such as "51"; any non-digit makes the space empty
    pub fn from_prefix_str(prefix: &str, config: &GeneratorConfig) -> Self {
        let digits: Option<Vec<u8>> = prefix
            .chars()
            .map(|c| c.to_digit(10).map(|d| d as u8))
            .collect();
        match digits {
            Some(digits) => CodeSpace::new(&digits, config),
            None => CodeSpace::new(&[0], config),
        }
    }

    /// Number of codes in the space
    pub fn len(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn code_length(&self) -> usize {
        self.length
    }

    /// The code at `index` in ascending order, or `None` past the end
    pub fn code_at(&self, index: u64) -> Option<AdaptiveCode> {
        if index >= self.total {
            return None;
        }
        let mut rest = index;
        let mut wildcards = self.wildcards_left;
        let mut digits = Vec::with_capacity(self.length);
        digits.extend_from_slice(&self.prefix);

        for pos in self.prefix.len()..self.length {
            let remaining = self.length - pos - 1;
            for d in MIN_DEPTH..=MAX_DEPTH {
                let is_wild = d == WILDCARD_DEPTH;
                if is_wild && wildcards == 0 {
                    continue;
                }
                if remaining == 0 && self.final_mask & (1 << d) == 0 {
                    continue;
                }
                let left = if is_wild { wildcards - 1 } else { wildcards };
                let count = self.completions[remaining][left];
                if rest < count {
                    digits.push(d);
                    wildcards = left;
                    break;
                }
                rest -= count;
            }
        }

        debug_assert_eq!(digits.len(), self.length);
        Some(AdaptiveCode::from_trusted(digits))
    }

    /// Lazily yields every code in the space
    pub fn iter(&self) -> Codes<'_> {
        self.range(0..self.total)
    }

    /// Lazily yields the codes at the given indices
    pub fn range(&self, range: Range<u64>) -> Codes<'_> {
        let end = range.end.min(self.total);
        Codes {
            space: self,
            next: range.start.min(end),
            end,
        }
    }
}

/// Splits `0..total` into contiguous ranges of at most `batch_size`
pub fn batch_ranges(total: u64, batch_size: u64) -> Vec<Range<u64>> {
    let batch_size = batch_size.max(1);
    (0..total.div_ceil(batch_size))
        .map(|i| {
            let start = i * batch_size;
            start..(start + batch_size).min(total)
        })
        .collect()
}

/// Iterator over a slice of a `CodeSpace`
pub struct Codes<'a> {
    space: &'a CodeSpace,
    next: u64,
    end: u64,
}

impl Iterator for Codes<'_> {
    type Item = AdaptiveCode;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let code = self.space.code_at(self.next);
        self.next += 1;
        code
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.end - self.next) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Codes<'_> {}

/// Counts completions for every suffix length and wildcard allowance
///
/// The last position only admits digits in `final_mask`.
fn completion_table(length: usize, max_wildcards: usize, final_mask: u8) -> Vec<Vec<u64>> {
    let mut table = vec![vec![0u64; max_wildcards + 1]; length + 1];
    for w in 0..=max_wildcards {
        table[0][w] = 1;
    }
    for r in 1..=length {
        for w in 0..=max_wildcards {
            let mut count = 0u64;
            for d in MIN_DEPTH..=MAX_DEPTH {
                if r == 1 && final_mask & (1 << d) == 0 {
                    continue;
                }
                if d == WILDCARD_DEPTH {
                    if w > 0 {
                        count = count.saturating_add(table[r - 1][w - 1]);
                    }
                } else {
                    count = count.saturating_add(table[r - 1][w]);
                }
            }
            table[r][w] = count;
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_full_space_cardinality() {
        let space = CodeSpace::new(&[], &GeneratorConfig::default());
        let expected = 4u64.pow(12) + 12 * 4u64.pow(11);
        assert_eq!(space.len(), expected);
    }

    #[test]
    fn test_short_space_enumerates_exactly() {
        let config = GeneratorConfig::new(6);
        let space = CodeSpace::new(&[], &config);
        let codes: Vec<String> = space.iter().map(|c| c.to_string()).collect();
        assert_eq!(codes.len() as u64, 4u64.pow(6) + 6 * 4u64.pow(5));

        let unique: HashSet<&String> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
        assert!(codes.iter().all(|c| c.matches('5').count() <= 1));
        assert!(codes.windows(2).all(|w| w[0] < w[1]), "ascending order");
        assert_eq!(codes.first().map(String::as_str), Some("111111"));
        assert_eq!(codes.last().map(String::as_str), Some("544444"));
    }

    #[test]
    fn test_prefix_restricts_space() {
        let config = GeneratorConfig::default();
        let space = CodeSpace::new(&[5, 1], &config);
        assert_eq!(space.len(), 4u64.pow(10));
        let first = space.code_at(0).unwrap();
        assert_eq!(first.to_string(), "511111111111");
        assert!(space.iter().take(1000).all(|c| c.wildcard_count() == 1));

        let space = CodeSpace::new(&[1, 2], &config);
        assert_eq!(space.len(), 4u64.pow(10) + 10 * 4u64.pow(9));
    }

    #[test]
    fn test_invalid_prefixes_yield_empty_space() {
        let config = GeneratorConfig::default();
        assert!(CodeSpace::new(&[1, 6], &config).is_empty());
        assert!(CodeSpace::new(&[0], &config).is_empty());
        assert!(CodeSpace::new(&[1; 13], &config).is_empty());
        assert!(CodeSpace::new(&[5, 5], &config).is_empty());
        assert!(CodeSpace::from_prefix_str("1x", &config).is_empty());
        assert_eq!(CodeSpace::new(&[5, 5], &config).iter().count(), 0);
    }

    #[test]
    fn test_full_length_prefix_is_single_code() {
        let config = GeneratorConfig::default();
        let space = CodeSpace::from_prefix_str("123451234123", &config);
        assert_eq!(space.len(), 1);
        assert_eq!(space.code_at(0).unwrap().to_string(), "123451234123");
        assert!(space.code_at(1).is_none());
    }

    #[test]
    fn test_final_digit_restriction() {
        let config = GeneratorConfig {
            length: 5,
            max_wildcards: 1,
            final_depths: vec![1, 3],
        };
        let space = CodeSpace::new(&[], &config);
        let codes: Vec<AdaptiveCode> = space.iter().collect();
        assert_eq!(codes.len() as u64, space.len());
        // 2 endings, first four positions: no wildcard or exactly one
        assert_eq!(space.len(), 2 * (4u64.pow(4) + 4 * 4u64.pow(3)));
        assert!(codes
            .iter()
            .all(|c| matches!(c.digits().last(), Some(1) | Some(3))));
    }

    #[test]
    fn test_no_wildcards_allowed() {
        let config = GeneratorConfig {
            length: 4,
            max_wildcards: 0,
            final_depths: Vec::new(),
        };
        let space = CodeSpace::new(&[], &config);
        assert_eq!(space.len(), 256);
        assert!(space.iter().all(|c| c.wildcard_count() == 0));
    }

    #[test]
    fn test_batches_cover_space_without_overlap() {
        let space = CodeSpace::new(&[], &GeneratorConfig::new(5));
        let batches = batch_ranges(space.len(), 97);
        assert_eq!(batches.first().map(|b| b.start), Some(0));
        assert_eq!(batches.last().map(|b| b.end), Some(space.len()));
        assert!(batches.windows(2).all(|w| w[0].end == w[1].start));

        let rebuilt: Vec<AdaptiveCode> = batches
            .iter()
            .flat_map(|b| space.range(b.clone()))
            .collect();
        let direct: Vec<AdaptiveCode> = space.iter().collect();
        assert_eq!(rebuilt, direct);
    }

    #[test]
    fn test_batch_ranges_edges() {
        assert_eq!(batch_ranges(2501, 1000), vec![0..1000, 1000..2000, 2000..2501]);
        assert!(batch_ranges(0, 1000).is_empty());
        // A zero batch size is treated as one
        assert_eq!(batch_ranges(3, 0), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_wildcard_limit_above_length_is_clamped() {
        let config = GeneratorConfig {
            length: 3,
            max_wildcards: 1 << 40,
            final_depths: Vec::new(),
        };
        let space = CodeSpace::new(&[], &config);
        assert_eq!(space.len(), 125);
        assert_eq!(space.code_at(124).unwrap().to_string(), "555");
    }

    #[test]
    fn test_iteration_is_restartable() {
        let space = CodeSpace::new(&[2], &GeneratorConfig::new(4));
        let first: Vec<AdaptiveCode> = space.iter().collect();
        let second: Vec<AdaptiveCode> = space.iter().collect();
        assert_eq!(first, second);
    }
}
