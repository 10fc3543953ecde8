/// Persistent player profile.
///
/// Every field has a serde default so that records written by an older
/// build (missing fields) load cleanly and are back-filled on the next save.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::language::Language;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProfile {
    pub points: u32,
    pub wins: u32,
    pub losses: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub wins_by_language: BTreeMap<Language, u32>,
    pub hint_free_wins: u32,
    pub total_games: u32,
    pub total_time_seconds: f64,
    /// `None` until the first win.
    pub best_win_time_seconds: Option<f64>,
    pub perfect_last_win: bool,
    pub loss_streak: u32,
    pub comeback_flag: bool,
    pub unlocked_achievements: BTreeSet<String>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        PlayerProfile {
            points: 0,
            wins: 0,
            losses: 0,
            current_streak: 0,
            best_streak: 0,
            wins_by_language: Language::ALL.iter().map(|&l| (l, 0)).collect(),
            hint_free_wins: 0,
            total_games: 0,
            total_time_seconds: 0.0,
            best_win_time_seconds: None,
            perfect_last_win: false,
            loss_streak: 0,
            comeback_flag: false,
            unlocked_achievements: BTreeSet::new(),
        }
    }
}

impl PlayerProfile {
    pub fn wins_in(&self, lang: Language) -> u32 {
        self.wins_by_language.get(&lang).copied().unwrap_or(0)
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses
    }

    /// Win percentage, `None` before the first game.
    pub fn win_rate(&self) -> Option<f64> {
        let games = self.games_played();
        (games > 0).then(|| self.wins as f64 * 100.0 / games as f64)
    }

    pub fn average_time_seconds(&self) -> Option<f64> {
        let games = self.games_played();
        (games > 0).then(|| self.total_time_seconds / games as f64)
    }

    /// Fill gaps a partial record leaves after deserialization.
    pub fn backfill(&mut self) {
        for lang in Language::ALL {
            self.wins_by_language.entry(lang).or_insert(0);
        }
    }
}
