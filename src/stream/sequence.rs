//! Sequence reassembly for out-of-order audio fragments.
//!
//! The backend numbers audio fragments but the network may deliver them in
//! any order. The buffer holds early arrivals and releases only contiguous
//! runs starting at the next expected sequence number, so downstream code
//! always sees fragments in order.

use std::collections::HashMap;

/// Reordering buffer keyed by sequence number.
///
/// `next_expected` only increases. Every pending key of interest is
/// `>= next_expected`; a key below it is a late duplicate that is stored
/// but never released.
pub struct SequenceBuffer<T> {
    pending: HashMap<u64, Vec<T>>,
    next_expected: u64,
}

impl<T> SequenceBuffer<T> {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            next_expected: 0,
        }
    }

    /// Stores a payload under its sequence number and returns everything
    /// now releasable, in order. The result is empty while an earlier gap
    /// remains unfilled.
    ///
    /// Multiple payloads under one sequence number concatenate in push
    /// order. Input is never rejected; a pathological sender that never
    /// fills a gap grows `pending` without bound.
    pub fn push(&mut self, sequence: u64, payload: T) -> Vec<T> {
        self.pending.entry(sequence).or_default().push(payload);

        let mut released = Vec::new();
        while let Some(payloads) = self.pending.remove(&self.next_expected) {
            released.extend(payloads);
            self.next_expected += 1;
        }
        released
    }

    /// Clears pending fragments and restarts at sequence 0.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.next_expected = 0;
    }

    /// The sequence number the buffer is waiting for.
    pub fn next_expected(&self) -> u64 {
        self.next_expected
    }

    /// Number of sequence numbers currently held back.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl<T> Default for SequenceBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
