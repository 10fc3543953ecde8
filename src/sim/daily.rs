/// Daily challenge record.
///
/// One word per calendar date, stored as a small JSON document next to the
/// profile store. Same date → the stored record verbatim; different date,
/// missing or unreadable file → a fresh random language and word, written
/// back before returning.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::language::Language;
use crate::error::GameError;
use crate::sim::save::write_document;
use crate::sim::words::{WordEntry, WordSource};

pub const DAILY_FILE: &str = "daily.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub date: NaiveDate,
    pub language: Language,
    pub word: String,
    pub hint: String,
    pub category: String,
}

impl DailyChallenge {
    pub fn entry(&self) -> WordEntry {
        WordEntry::new(&self.word, &self.hint, &self.category)
    }
}

#[derive(Clone, Debug)]
pub struct DailyStore {
    path: PathBuf,
}

impl DailyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DailyStore { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DAILY_FILE))
    }

    /// Today's challenge, generating and persisting one if needed.
    ///
    /// Returns `Ok(None)` only when the word source has nothing to offer.
    pub fn challenge_for(
        &self,
        today: NaiveDate,
        words: &dyn WordSource,
        rng: &mut fastrand::Rng,
    ) -> Result<Option<DailyChallenge>, GameError> {
        if let Some(stored) = self.load() {
            if stored.date == today {
                return Ok(Some(stored));
            }
        }

        let language = Language::ALL[rng.usize(..Language::ALL.len())];
        let Some(entry) = words.pick(language, rng) else {
            return Ok(None);
        };
        let challenge = DailyChallenge {
            date: today,
            language,
            word: entry.word,
            hint: entry.hint,
            category: entry.category,
        };
        write_document(&self.path, &serde_json::to_string_pretty(&challenge)?)?;
        info!(date = %today, language = language.code(), "generated daily challenge");
        Ok(Some(challenge))
    }

    fn load(&self) -> Option<DailyChallenge> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&text) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "daily record unreadable, regenerating");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::save::tests::scratch_dir;
    use crate::sim::words::BuiltinWords;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn same_day_returns_identical_record() {
        let store = DailyStore::in_dir(&scratch_dir("daily-same"));
        let mut rng = fastrand::Rng::with_seed(1);
        let first = store.challenge_for(day(4), &BuiltinWords, &mut rng).unwrap().unwrap();
        let mut other_rng = fastrand::Rng::with_seed(99);
        let again = store.challenge_for(day(4), &BuiltinWords, &mut other_rng).unwrap().unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn next_day_regenerates() {
        let store = DailyStore::in_dir(&scratch_dir("daily-next"));
        let mut rng = fastrand::Rng::with_seed(3);
        let d1 = store.challenge_for(day(4), &BuiltinWords, &mut rng).unwrap().unwrap();
        let d2 = store.challenge_for(day(5), &BuiltinWords, &mut rng).unwrap().unwrap();
        assert_eq!(d1.date, day(4));
        assert_eq!(d2.date, day(5));
        // and the new record is what is stored now
        let d2_again = store.challenge_for(day(5), &BuiltinWords, &mut rng).unwrap().unwrap();
        assert_eq!(d2, d2_again);
    }

    #[test]
    fn corrupt_record_is_replaced() {
        let dir = scratch_dir("daily-corrupt");
        std::fs::write(dir.join(DAILY_FILE), "garbage").unwrap();
        let store = DailyStore::in_dir(&dir);
        let mut rng = fastrand::Rng::with_seed(5);
        let c = store.challenge_for(day(9), &BuiltinWords, &mut rng).unwrap().unwrap();
        assert_eq!(c.date, day(9));
        assert!(!c.word.is_empty());
    }

    #[test]
    fn date_is_stored_as_iso_string() {
        let dir = scratch_dir("daily-format");
        let store = DailyStore::in_dir(&dir);
        let mut rng = fastrand::Rng::with_seed(8);
        store.challenge_for(day(12), &BuiltinWords, &mut rng).unwrap();
        let raw = std::fs::read_to_string(dir.join(DAILY_FILE)).unwrap();
        assert!(raw.contains("\"2026-03-12\""), "{raw}");
    }
}
