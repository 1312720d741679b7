//! Best-score storage
//!
//! Features:
//! - `ScoreStore` trait so the session never touches files directly
//! - JSON file store with write-to-temp then rename
//! - Plain `name,score` text store for old score files
//! - In-memory store for tests and headless runs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::highscores::HighScores;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("score file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("score file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Somewhere the best-score table can be read from and written to
pub trait ScoreStore {
    /// Load the table; a store that has never been written yields an empty one
    fn load(&self) -> Result<HighScores, PersistenceError>;
    fn save(&mut self, scores: &HighScores) -> Result<(), PersistenceError>;
}

/// Read a whole file, treating a missing file as empty
fn read_optional(path: &Path) -> Result<Option<String>, PersistenceError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Write through a sibling temp file so a crash never leaves half a table
fn write_atomic(path: &Path, contents: &str) -> Result<(), PersistenceError> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Scores stored as pretty-printed JSON
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScoreStore for JsonFileStore {
    fn load(&self) -> Result<HighScores, PersistenceError> {
        let Some(json) = read_optional(&self.path)? else {
            log::info!("No score file at {}, starting fresh", self.path.display());
            return Ok(HighScores::new());
        };
        let mut scores: HighScores = serde_json::from_str(&json)?;
        scores.normalize();
        log::info!("Loaded {} best scores", scores.entries.len());
        Ok(scores)
    }

    fn save(&mut self, scores: &HighScores) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(scores)?;
        write_atomic(&self.path, &json)?;
        log::info!("Best scores saved ({} entries)", scores.entries.len());
        Ok(())
    }
}

/// Scores stored one `name,score` pair per line
#[derive(Debug, Clone)]
pub struct TextFileStore {
    path: PathBuf,
}

impl TextFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScoreStore for TextFileStore {
    fn load(&self) -> Result<HighScores, PersistenceError> {
        match read_optional(&self.path)? {
            Some(text) => HighScores::from_legacy_text(&text),
            None => Ok(HighScores::new()),
        }
    }

    fn save(&mut self, scores: &HighScores) -> Result<(), PersistenceError> {
        write_atomic(&self.path, &scores.to_legacy_text())
    }
}

/// Pick a file store by extension: `.json` or anything else as text
pub fn store_for_path(path: impl Into<PathBuf>) -> Box<dyn ScoreStore> {
    let path = path.into();
    if path.extension().is_some_and(|ext| ext == "json") {
        Box::new(JsonFileStore::new(path))
    } else {
        Box::new(TextFileStore::new(path))
    }
}

/// Keeps the table in memory; can be told to fail every save
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub scores: HighScores,
    pub fail_saves: bool,
    pub saves: usize,
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> Result<HighScores, PersistenceError> {
        Ok(self.scores.clone())
    }

    fn save(&mut self, scores: &HighScores) -> Result<(), PersistenceError> {
        if self.fail_saves {
            return Err(std::io::Error::other("storage unavailable").into());
        }
        self.scores = scores.clone();
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("asteroids-core-{}-{}", std::process::id(), name))
    }

    fn sample() -> HighScores {
        let mut scores = HighScores::new();
        scores.add_score("ada", 900);
        scores.add_score("bob", 400);
        scores
    }

    #[test]
    fn test_json_store_round_trip() {
        let path = temp_path("scores.json");
        let mut store = JsonFileStore::new(&path);
        store.save(&sample()).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, sample());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_empty_table() {
        let store = JsonFileStore::new(temp_path("never-written.json"));
        assert!(store.load().unwrap().is_empty());
        let store = TextFileStore::new(temp_path("never-written.txt"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_json_reports_format_error() {
        let path = temp_path("corrupt.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, PersistenceError::Format(_)));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_text_store_writes_name_score_lines() {
        let path = temp_path("scores.txt");
        let mut store = store_for_path(&path);
        store.save(&sample()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "ada,900\nbob,400\n");
        assert_eq!(store.load().unwrap(), sample());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_memory_store_failure() {
        let mut store = MemoryStore {
            fail_saves: true,
            ..Default::default()
        };
        let err = store.save(&sample()).unwrap_err();
        assert!(matches!(err, PersistenceError::Io(_)));
        assert_eq!(store.saves, 0);
        assert!(err.to_string().contains("storage unavailable"));
    }
}
