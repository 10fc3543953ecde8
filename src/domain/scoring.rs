/// Point arithmetic. Pure functions, no state.

use super::difficulty::DifficultyConfig;

/// Flat reward for winning the daily challenge, independent of multiplier.
pub const DAILY_BONUS: u32 = 200;

const GUESS_BASE: f64 = 10.0;
const COMBO_STEP: u32 = 3;
const WIN_BASE: f64 = 50.0;
const END_COMBO_STEP: u32 = 4;

/// Reward breakdown for a finished round. All zero on a loss.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundReward {
    pub base: u32,
    pub time_bonus: u32,
    pub combo_bonus: u32,
    pub daily_bonus: u32,
}

impl RoundReward {
    pub fn total(&self) -> u32 {
        self.base + self.time_bonus + self.combo_bonus + self.daily_bonus
    }
}

/// Points for one correct letter.
///
/// `combo_before` is the combo length before this guess is counted, so the
/// first hit of a run earns only the base and every further hit adds 3.
pub fn correct_guess(difficulty: &DifficultyConfig, combo_before: u32) -> u32 {
    scaled(GUESS_BASE, difficulty) + combo_before * COMBO_STEP
}

/// End-of-round reward for a win.
pub fn round_end_win(difficulty: &DifficultyConfig, elapsed_seconds: f64, combo: u32) -> RoundReward {
    let left = difficulty.time_limit_seconds as f64 - elapsed_seconds;
    let time_bonus = if left > 0.0 { (left / 2.0).floor() as u32 } else { 0 };
    RoundReward {
        base: scaled(WIN_BASE, difficulty),
        time_bonus,
        combo_bonus: combo * END_COMBO_STEP,
        daily_bonus: 0,
    }
}

fn scaled(base: f64, difficulty: &DifficultyConfig) -> u32 {
    (base * difficulty.score_multiplier).round() as u32
}
