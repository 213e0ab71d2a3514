// Result selection: bounded top-K and final ordering

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::types::Code;

/// A selected candidate and its aggregate score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateResult {
    pub code: Code,
    pub score: i64,
}

impl CandidateResult {
    pub fn new(code: impl Into<Code>, score: i64) -> Self {
        CandidateResult {
            code: code.into(),
            score,
        }
    }
}

/// Heap entry ordered by score; among equal scores the earlier arrival ranks higher
#[derive(Debug)]
struct Entry {
    score: i64,
    seq: u64,
    result: CandidateResult,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Keeps the K highest-scoring candidates seen so far
///
/// Memory stays bounded by K regardless of how many candidates are offered.
/// A candidate is admitted while there is room, or when it beats the lowest
/// retained score, which is then evicted.
#[derive(Debug)]
pub struct TopK {
    capacity: usize,
    heap: BinaryHeap<Reverse<Entry>>,
    seq: u64,
}

impl TopK {
    pub fn new(capacity: usize) -> Self {
        TopK {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.min(1 << 16)),
            seq: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Lowest retained score, if any
    pub fn min_score(&self) -> Option<i64> {
        self.heap.peek().map(|Reverse(e)| e.score)
    }

    /// Offers a candidate; returns whether it was retained
    pub fn offer(&mut self, result: CandidateResult) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.heap.len() >= self.capacity {
            match self.min_score() {
                Some(min) if result.score > min => {
                    self.heap.pop();
                }
                _ => return false,
            }
        }
        let entry = Entry {
            score: result.score,
            seq: self.seq,
            result,
        };
        self.seq += 1;
        self.heap.push(Reverse(entry));
        true
    }

    /// Folds another structure into this one, keeping the best K of both
    pub fn merge(mut self, other: TopK) -> TopK {
        for Reverse(entry) in other.heap.into_sorted_vec() {
            self.offer(entry.result);
        }
        self
    }

    /// Retained candidates, highest score first
    pub fn into_sorted_vec(self) -> Vec<CandidateResult> {
        // Ascending order of Reverse<Entry> is descending order of Entry
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(e)| e.result)
            .collect()
    }
}

/// Orders collected results by descending score, keeping arrival order among ties
pub fn rank(mut results: Vec<CandidateResult>) -> Vec<CandidateResult> {
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results
}
