//! Best-score table
//!
//! Kept sorted best first and capped at `BEST_SCORES` entries. Ordering is a
//! stable sort on the score, so equal scores keep the order they were
//! recorded in, and a new score lands after existing entries it ties with.

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistenceError, ScoreStore};

/// Maximum number of best scores to keep
pub const BEST_SCORES: usize = 5;

/// A single best-score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordScore {
    pub name: String,
    pub score: u64,
}

impl RecordScore {
    pub fn new(name: impl Into<String>, score: u64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Stable sort by score, ascending or descending
pub fn sort_scores(scores: &mut [RecordScore], ascending: bool) {
    if ascending {
        scores.sort_by(|a, b| a.score.cmp(&b.score));
    } else {
        scores.sort_by(|a, b| b.score.cmp(&a.score));
    }
}

/// Best-score leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<RecordScore>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Restore the best-first order and the size cap, e.g. after loading a
    /// hand-edited file
    pub fn normalize(&mut self) {
        sort_scores(&mut self.entries, false);
        self.entries.truncate(BEST_SCORES);
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < BEST_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        Some(self.insertion_index(score) + 1)
    }

    /// First slot holding a strictly lower score, so ties stay ahead
    fn insertion_index(&self, score: u64) -> usize {
        self.entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len())
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, name: &str, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let index = self.insertion_index(score);
        self.entries.insert(index, RecordScore::new(name.trim(), score));
        self.entries.truncate(BEST_SCORES);
        Some(index + 1)
    }

    /// Record a finished game and persist the table
    ///
    /// The in-memory table keeps the new entry even when saving fails; the
    /// error is handed back for the caller to report.
    pub fn register(
        &mut self,
        name: &str,
        score: u64,
        store: &mut dyn ScoreStore,
    ) -> Result<Option<usize>, PersistenceError> {
        let rank = self.add_score(name, score);
        if rank.is_some() {
            store.save(self)?;
        }
        Ok(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Parse the old `name,score` per line format
    pub fn from_legacy_text(text: &str) -> Result<Self, PersistenceError> {
        let mut entries = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((name, score)) = line.rsplit_once(',') else {
                return Err(PersistenceError::Parse {
                    line: index + 1,
                    reason: "expected name,score".to_string(),
                });
            };
            let score = score.trim().parse::<u64>().map_err(|e| PersistenceError::Parse {
                line: index + 1,
                reason: format!("bad score {:?}: {}", score.trim(), e),
            })?;
            entries.push(RecordScore::new(name.trim(), score));
        }

        let mut scores = Self { entries };
        scores.normalize();
        Ok(scores)
    }

    /// Write the table in the old `name,score` per line format
    pub fn to_legacy_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{},{}\n", e.name.replace(['\n', '\r'], " "), e.score))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use proptest::prelude::*;

    fn table(scores: &[u64]) -> HighScores {
        HighScores {
            entries: scores
                .iter()
                .enumerate()
                .map(|(i, &s)| RecordScore::new(format!("p{}", i), s))
                .collect(),
        }
    }

    fn values(scores: &HighScores) -> Vec<u64> {
        scores.entries.iter().map(|e| e.score).collect()
    }

    #[test]
    fn test_insert_into_middle() {
        let mut scores = table(&[900, 400, 100]);
        assert_eq!(scores.add_score("new", 500), Some(2));
        assert_eq!(values(&scores), vec![900, 500, 400, 100]);
    }

    #[test]
    fn test_tie_goes_after_existing() {
        let mut scores = table(&[900, 400, 100]);
        assert_eq!(scores.potential_rank(400), Some(3));
        scores.add_score("late", 400);
        assert_eq!(scores.entries[1].name, "p1");
        assert_eq!(scores.entries[2].name, "late");
    }

    #[test]
    fn test_full_table_qualification() {
        let mut scores = table(&[50, 40, 30, 20, 10]);
        assert!(!scores.qualifies(0));
        assert!(!scores.qualifies(10));
        assert_eq!(scores.add_score("low", 5), None);
        assert_eq!(scores.add_score("mid", 35), Some(3));
        assert_eq!(values(&scores), vec![50, 40, 35, 30, 20]);
        assert_eq!(scores.top_score(), Some(50));
    }

    #[test]
    fn test_sort_both_directions() {
        let mut entries = table(&[10, 30, 20, 30]).entries;
        sort_scores(&mut entries, true);
        assert_eq!(
            entries.iter().map(|e| e.score).collect::<Vec<_>>(),
            vec![10, 20, 30, 30]
        );
        // Equal scores keep their recorded order
        assert_eq!(entries[2].name, "p1");
        assert_eq!(entries[3].name, "p3");

        sort_scores(&mut entries, false);
        assert_eq!(entries[0].name, "p1");
        assert_eq!(entries[1].name, "p3");
    }

    #[test]
    fn test_legacy_text() {
        let scores = HighScores::from_legacy_text("bob,400\n\nada, 900\nx,y,100\n").unwrap();
        assert_eq!(values(&scores), vec![900, 400, 100]);
        assert_eq!(scores.entries[2].name, "x,y");
        assert_eq!(scores.to_legacy_text(), "ada,900\nbob,400\nx,y,100\n");

        let err = HighScores::from_legacy_text("ada,900\nbroken\n").unwrap_err();
        assert!(matches!(err, PersistenceError::Parse { line: 2, .. }));
        let err = HighScores::from_legacy_text("ada,lots").unwrap_err();
        assert!(matches!(err, PersistenceError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_register_keeps_entry_when_save_fails() {
        let mut scores = table(&[900]);
        let mut store = MemoryStore {
            fail_saves: true,
            ..Default::default()
        };
        assert!(scores.register("ada", 500, &mut store).is_err());
        assert_eq!(values(&scores), vec![900, 500]);

        store.fail_saves = false;
        assert_eq!(scores.register("bob", 700, &mut store).unwrap(), Some(2));
        assert_eq!(store.saves, 1);
        assert_eq!(store.scores, scores);

        // Nothing to save for a score that does not qualify
        assert_eq!(scores.register("zero", 0, &mut store).unwrap(), None);
        assert_eq!(store.saves, 1);
    }

    proptest! {
        #[test]
        fn prop_sort_is_stable(raw in proptest::collection::vec(0u64..5, 0..30), ascending in any::<bool>()) {
            let mut entries = table(&raw).entries;
            sort_scores(&mut entries, ascending);
            for pair in entries.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                if ascending {
                    prop_assert!(a.score <= b.score);
                } else {
                    prop_assert!(a.score >= b.score);
                }
                if a.score == b.score {
                    let ia: usize = a.name[1..].parse().unwrap();
                    let ib: usize = b.name[1..].parse().unwrap();
                    prop_assert!(ia < ib);
                }
            }
        }

        #[test]
        fn prop_add_keeps_table_sorted(adds in proptest::collection::vec(0u64..2000, 0..20)) {
            let mut scores = HighScores::new();
            for (i, s) in adds.iter().enumerate() {
                scores.add_score(&format!("p{}", i), *s);
                prop_assert!(scores.entries.len() <= BEST_SCORES);
                prop_assert!(scores.entries.windows(2).all(|w| w[0].score >= w[1].score));
            }
        }
    }
}
