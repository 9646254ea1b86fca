//! High score tracking
//!
//! The best score ever reached, persisted as a plain decimal string so it
//! survives format changes to the session snapshot.

use crate::platform::{KeyValueStore, StorageError};

/// Storage key for the best score
pub const HIGH_SCORE_KEY: &str = "suika_high_score";

/// Read the stored high score (0 when missing or unreadable)
pub fn load(store: &impl KeyValueStore) -> u64 {
    match store.get(HIGH_SCORE_KEY).map(|s| s.trim().parse::<u64>()) {
        Some(Ok(score)) => {
            log::info!("Loaded high score {}", score);
            score
        }
        Some(Err(e)) => {
            log::warn!("Ignoring unreadable high score: {}", e);
            0
        }
        None => 0,
    }
}

pub fn save(store: &impl KeyValueStore, score: u64) -> Result<(), StorageError> {
    store.set(HIGH_SCORE_KEY, &score.to_string())
}

/// Store `score` if it beats the stored value; returns whether it did
pub fn submit(store: &impl KeyValueStore, score: u64) -> Result<bool, StorageError> {
    if score <= load(store) {
        return Ok(false);
    }
    save(store, score)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_missing_or_garbage_reads_zero() {
        let store = MemoryStore::new();
        assert_eq!(load(&store), 0);
        store.set(HIGH_SCORE_KEY, "lots").unwrap();
        assert_eq!(load(&store), 0);
    }

    #[test]
    fn test_submit_only_raises() {
        let store = MemoryStore::new();
        assert_eq!(submit(&store, 12), Ok(true));
        assert_eq!(submit(&store, 7), Ok(false));
        assert_eq!(submit(&store, 12), Ok(false));
        assert_eq!(load(&store), 12);
        assert_eq!(submit(&store, 30), Ok(true));
        assert_eq!(store.get(HIGH_SCORE_KEY).as_deref(), Some("30"));
    }
}
