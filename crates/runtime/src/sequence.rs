/// Identifies one issued search request.
///
/// Small and copyable so completion handlers can carry it across an await
/// without borrowing shared state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// Monotonic request sequence for latest-wins ordering.
///
/// Overlapping async completions are not ordered by the event loop; tagging
/// each request with a generation and committing only the latest issued one
/// keeps a stale response from clobbering a newer result. Requests are never
/// aborted, only ignored on arrival.
#[derive(Debug, Default)]
pub struct SearchSequence {
    issued: u64,
}

impl SearchSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> Generation {
        self.issued = self.issued.wrapping_add(1);
        Generation(self.issued)
    }

    /// True while `generation` is the most recently issued request.
    pub fn is_latest(&self, generation: Generation) -> bool {
        generation.0 == self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::SearchSequence;

    #[test]
    fn single_generation_is_latest() {
        let mut seq = SearchSequence::new();
        let g = seq.issue();
        assert!(seq.is_latest(g));
    }

    #[test]
    fn newer_issue_supersedes_older() {
        let mut seq = SearchSequence::new();
        let g1 = seq.issue();
        let g2 = seq.issue();
        assert!(!seq.is_latest(g1));
        assert!(seq.is_latest(g2));
    }

    #[test]
    fn stale_generation_stays_stale() {
        let mut seq = SearchSequence::new();
        let g1 = seq.issue();
        let _g2 = seq.issue();
        let g3 = seq.issue();
        // Even after the latest completes, an older token never re-qualifies.
        assert!(seq.is_latest(g3));
        assert!(!seq.is_latest(g1));
    }
}
