/// AppState: everything the front-end shows between key presses.
///
/// Owns the player session, the active round (if any), and the screen
/// `Phase`. All game rules stay in `RoundEngine`; this layer only routes
/// commands, settles finished rounds and keeps the status line.
///
/// ## Phases
///
///   Menu ─1─▶ Playing ──(round ends)──▶ RoundOver ─any key─▶ Menu
///   Menu ─5─▶ Playing (daily word)
///   Menu ─2/3/4/6─▶ Difficulty | Achievements | Leaderboard | Stats ─Esc─▶ Menu

use std::time::Instant;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::achievements::AchievementDef;
use crate::domain::difficulty::Difficulty;
use crate::domain::language::Language;
use crate::domain::profile::PlayerProfile;
use crate::domain::scoring::DAILY_BONUS;
use crate::error::GameError;
use crate::sim::daily::DailyStore;
use crate::sim::event::{AudioEvent, AudioSink};
use crate::sim::round::{GuessOutcome, HintDecline, HintPurchase, RoundEngine, RoundSetup, RoundSummary};
use crate::sim::session::PlayerSession;
use crate::sim::words::WordSource;

pub const LEADERBOARD_SIZE: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Menu,
    DifficultySelect,
    Playing,
    RoundOver,
    Achievements,
    Leaderboard,
    Stats,
}

pub struct AppState {
    pub phase: Phase,
    pub session: PlayerSession,
    pub language: Language,
    pub difficulty: Difficulty,
    pub round: Option<RoundEngine>,
    pub summary: Option<RoundSummary>,
    pub leaderboard: Vec<(String, PlayerProfile)>,

    // ── Status line ──
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,

    daily: DailyStore,
    words: Box<dyn WordSource>,
    rng: fastrand::Rng,
    message_ticks: u32,
}

impl AppState {
    pub fn new(
        session: PlayerSession,
        daily: DailyStore,
        words: Box<dyn WordSource>,
        language: Language,
        difficulty: Difficulty,
        message_ticks: u32,
    ) -> Self {
        AppState {
            phase: Phase::Menu,
            session,
            language,
            difficulty,
            round: None,
            summary: None,
            leaderboard: Vec::new(),
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
            daily,
            words,
            rng: fastrand::Rng::new(),
            message_ticks,
        }
    }

    #[cfg(test)]
    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }

    /// Duration 0 keeps the message until replaced.
    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Status line for the configured duration.
    pub fn flash(&mut self, msg: &str) {
        let ticks = self.message_ticks;
        self.set_message(msg, ticks);
    }

    /// Announce achievements unlocked outside a round (session load).
    pub fn announce(&mut self, unlocked: &[&'static AchievementDef], audio: &dyn AudioSink) {
        if unlocked.is_empty() {
            return;
        }
        for _ in unlocked {
            audio.emit(AudioEvent::AchievementUnlocked);
        }
        let names: Vec<_> = unlocked.iter().map(|a| format!("{} {}", a.icon, a.name)).collect();
        self.flash(&format!("Unlocked: {}", names.join(", ")));
    }

    // ── Menu actions ──

    pub fn open(&mut self, phase: Phase, audio: &dyn AudioSink) {
        audio.emit(AudioEvent::UiClick);
        if phase == Phase::Leaderboard {
            self.leaderboard = self.session.store().leaderboard(LEADERBOARD_SIZE);
        }
        self.phase = phase;
        self.anim_tick = 0;
    }

    pub fn back_to_menu(&mut self) {
        self.round = None;
        self.phase = Phase::Menu;
        self.anim_tick = 0;
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty, audio: &dyn AudioSink) {
        audio.emit(AudioEvent::UiClick);
        self.difficulty = difficulty;
        self.phase = Phase::Menu;
        self.flash(&format!("Difficulty: {}", difficulty.name()));
    }

    pub fn toggle_language(&mut self, audio: &dyn AudioSink) {
        audio.emit(AudioEvent::UiClick);
        self.language = self.language.other();
        self.flash(&format!("Language: {}", self.language.display_name()));
    }

    // ── Round lifecycle ──

    /// Start a normal round in the current language and difficulty.
    pub fn start_round(&mut self, now: Instant, audio: &dyn AudioSink) -> Result<(), GameError> {
        audio.emit(AudioEvent::UiClick);
        let Some(entry) = self.words.pick(self.language, &mut self.rng) else {
            self.flash("No words available for this language");
            return Ok(());
        };
        let setup = RoundSetup { entry, difficulty: self.difficulty, language: self.language, daily: false };
        self.begin(setup, now)
    }

    /// Start today's challenge at medium difficulty. Its language comes from
    /// the daily record, whatever bank the player has selected.
    pub fn start_daily(&mut self, today: NaiveDate, now: Instant, audio: &dyn AudioSink) -> Result<(), GameError> {
        audio.emit(AudioEvent::UiClick);
        let Some(challenge) = self.daily.challenge_for(today, self.words.as_ref(), &mut self.rng)? else {
            self.flash("No daily challenge available");
            return Ok(());
        };
        let setup = RoundSetup {
            entry: challenge.entry(),
            difficulty: Difficulty::Medium,
            language: challenge.language,
            daily: true,
        };
        self.begin(setup, now)
    }

    fn begin(&mut self, setup: RoundSetup, now: Instant) -> Result<(), GameError> {
        let daily = setup.daily;
        self.round = Some(RoundEngine::start(setup, now)?);
        self.summary = None;
        self.phase = Phase::Playing;
        self.anim_tick = 0;
        if daily {
            self.flash(&format!("Daily challenge: +{DAILY_BONUS} on a win"));
        } else {
            self.message.clear();
            self.message_timer = 0;
        }
        Ok(())
    }

    pub fn guess(&mut self, ch: char, now: Instant, audio: &dyn AudioSink) -> Result<(), GameError> {
        let Some(round) = self.round.as_mut() else { return Ok(()) };
        // An expired clock wins over a late key press
        round.tick(now, audio);
        match round.guess_letter(ch, &mut self.session, audio) {
            GuessOutcome::Correct { points, combo } if combo >= 2 => {
                self.flash(&format!("+{points}  combo x{combo}"));
            }
            GuessOutcome::Correct { points, .. } => self.flash(&format!("+{points}")),
            GuessOutcome::Wrong { mistakes_left } => {
                self.flash(&format!("No '{ch}'. {mistakes_left} mistakes left"));
            }
            GuessOutcome::Ignored => {}
        }
        self.settle_if_over(now, audio)
    }

    pub fn buy_hint(&mut self, audio: &dyn AudioSink) -> Result<(), GameError> {
        let Some(round) = self.round.as_mut() else { return Ok(()) };
        let msg = match round.buy_hint(&mut self.session, audio)? {
            HintPurchase::Revealed { cost } => format!("Hint bought for {cost} points"),
            HintPurchase::Declined(HintDecline::AlreadyUsed) => "Hint already shown".to_string(),
            HintPurchase::Declined(HintDecline::InsufficientPoints { cost, available }) => {
                format!("Hint costs {cost} points, you have {available}")
            }
            HintPurchase::Declined(HintDecline::RoundOver) => return Ok(()),
        };
        self.flash(&msg);
        Ok(())
    }

    pub fn quit_round(&mut self, now: Instant, audio: &dyn AudioSink) -> Result<(), GameError> {
        if let Some(round) = self.round.as_mut() {
            round.quit();
        }
        self.settle_if_over(now, audio)
    }

    /// Advance timers. Called once per tick from the main loop.
    pub fn tick(&mut self, now: Instant, audio: &dyn AudioSink) -> Result<(), GameError> {
        self.anim_tick = self.anim_tick.wrapping_add(1);
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
        if self.phase == Phase::Playing {
            if let Some(round) = self.round.as_mut() {
                round.tick(now, audio);
            }
            self.settle_if_over(now, audio)?;
        }
        Ok(())
    }

    fn settle_if_over(&mut self, now: Instant, audio: &dyn AudioSink) -> Result<(), GameError> {
        if self.phase != Phase::Playing {
            return Ok(());
        }
        let Some(round) = self.round.as_mut() else { return Ok(()) };
        if round.terminal_state().is_none() {
            return Ok(());
        }
        let summary = round.finish(now, &mut self.session, audio)?;
        info!(user = %self.session.username, points = self.session.profile.points, "profile saved");

        if summary.unlocked.is_empty() {
            self.message.clear();
            self.message_timer = 0;
        } else {
            let names: Vec<_> = summary.unlocked.iter().map(|a| format!("{} {}", a.icon, a.name)).collect();
            self.set_message(&format!("Unlocked: {}", names.join(", ")), 0);
        }
        self.summary = Some(summary);
        self.phase = Phase::RoundOver;
        self.anim_tick = 0;
        Ok(())
    }
}
