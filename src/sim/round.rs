/// Round engine: one word, one mistake budget, one clock.
///
/// ## State machine
///
///   Active ──(all letters found)──────────────▶ Won
///   Active ──(mistakes exhausted)─────────────▶ Lost(Mistakes)
///   Active ──(tick sees remaining == 0)───────▶ Lost(Timeout)
///   Active ──(quit)───────────────────────────▶ Lost(Abandoned)
///
/// Won/Lost are terminal. `finish()` settles the round against the profile
/// exactly once. A failed save keeps the settlement pending and the next call
/// retries the save; after a successful one every call returns the same summary.
///
/// ## Letter sets
///
///   guessed = correct ∪ wrong (disjoint), mistake_count == |wrong|,
///   required only ever shrinks.
///
/// Time is never read from the system clock here; every time-dependent
/// call takes `now`.

use std::collections::BTreeSet;
use std::time::Instant;

use tracing::info;

use crate::domain::achievements::{self, AchievementDef};
use crate::domain::difficulty::{Difficulty, DifficultyConfig};
use crate::domain::language::Language;
use crate::domain::scoring::{self, RoundReward, DAILY_BONUS};
use crate::error::GameError;
use crate::sim::event::{AudioEvent, AudioSink};
use crate::sim::session::PlayerSession;
use crate::sim::words::WordEntry;

/// Remaining seconds at or below which the round is "critical".
pub const CRITICAL_SECONDS: u32 = 10;

// ══════════════════════════════════════════════════════════════
// Public types
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LossReason {
    Mistakes,
    Timeout,
    Abandoned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    Active,
    Won,
    Lost(LossReason),
}

impl RoundStatus {
    pub fn is_terminal(self) -> bool {
        self != RoundStatus::Active
    }
}

#[derive(Clone, Debug)]
pub struct RoundSetup {
    pub entry: WordEntry,
    pub difficulty: Difficulty,
    pub language: Language,
    pub daily: bool,
}

#[derive(Clone, Debug)]
pub struct RoundState {
    pub target_word: String,
    pub hint_text: String,
    pub category: String,
    pub required_letters: BTreeSet<char>,
    pub guessed_letters: BTreeSet<char>,
    pub correct_letters: BTreeSet<char>,
    pub wrong_letters: BTreeSet<char>,
    pub mistake_count: u32,
    pub combo_count: u32,
    pub hint_used: bool,
    pub started_at: Instant,
    pub active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct { points: u32, combo: u32 },
    Wrong { mistakes_left: u32 },
    /// Repeated letter, non-letter input, or the round is over.
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HintDecline {
    AlreadyUsed,
    InsufficientPoints { cost: u32, available: u32 },
    RoundOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HintPurchase {
    Revealed { cost: u32 },
    Declined(HintDecline),
}

/// What the most recent command did, for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    None,
    Guess(GuessOutcome),
    Hint(HintPurchase),
    Quit,
}

#[derive(Clone, Debug)]
pub struct RoundSummary {
    pub status: RoundStatus,
    pub word: String,
    pub reward: RoundReward,
    pub elapsed_seconds: f64,
    pub mistakes: u32,
    pub daily: bool,
    pub unlocked: Vec<&'static AchievementDef>,
}

/// Read-only snapshot handed to the renderer after every command.
#[derive(Clone, Debug)]
pub struct RenderModel {
    pub state: RoundState,
    pub difficulty: DifficultyConfig,
    pub language: Language,
    pub daily: bool,
    pub status: RoundStatus,
    pub remaining_seconds: u32,
    pub feedback: Feedback,
    /// Full word, present once the round is lost.
    pub revealed_word: Option<String>,
}

impl RenderModel {
    /// One slot per character: `Some(c)` when shown, `None` when hidden.
    /// Non-letters (spaces, hyphens) are always shown.
    pub fn word_slots(&self) -> Vec<Option<char>> {
        self.state
            .target_word
            .chars()
            .map(|c| {
                let shown = !c.is_alphabetic()
                    || self.state.correct_letters.contains(&c)
                    || self.revealed_word.is_some();
                shown.then_some(c)
            })
            .collect()
    }

    pub fn letters_found(&self) -> (usize, usize) {
        let total = self.state.correct_letters.len() + self.state.required_letters.len();
        (self.state.correct_letters.len(), total)
    }
}

// ══════════════════════════════════════════════════════════════
// Engine
// ══════════════════════════════════════════════════════════════

pub struct RoundEngine {
    state: RoundState,
    difficulty: Difficulty,
    config: DifficultyConfig,
    language: Language,
    daily: bool,
    status: RoundStatus,
    remaining: u32,
    critical_announced: bool,
    feedback: Feedback,
    /// Applied to the profile but not yet saved.
    pending: Option<RoundSummary>,
    summary: Option<RoundSummary>,
}

impl RoundEngine {
    pub fn start(setup: RoundSetup, now: Instant) -> Result<Self, GameError> {
        let target_word = setup.entry.word.trim().to_lowercase();
        let required_letters: BTreeSet<char> =
            target_word.chars().filter(|c| c.is_alphabetic()).collect();
        if required_letters.is_empty() {
            return Err(GameError::EmptyWord);
        }

        let config = setup.difficulty.config();
        info!(
            difficulty = setup.difficulty.name(),
            language = setup.language.code(),
            daily = setup.daily,
            letters = required_letters.len(),
            "round started"
        );

        Ok(RoundEngine {
            state: RoundState {
                target_word,
                hint_text: setup.entry.hint,
                category: setup.entry.category,
                required_letters,
                guessed_letters: BTreeSet::new(),
                correct_letters: BTreeSet::new(),
                wrong_letters: BTreeSet::new(),
                mistake_count: 0,
                combo_count: 0,
                hint_used: false,
                started_at: now,
                active: true,
            },
            difficulty: setup.difficulty,
            config,
            language: setup.language,
            daily: setup.daily,
            status: RoundStatus::Active,
            remaining: config.time_limit_seconds,
            critical_announced: false,
            feedback: Feedback::None,
            pending: None,
            summary: None,
        })
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    /// `Some(status)` once the round has ended.
    pub fn terminal_state(&self) -> Option<RoundStatus> {
        self.status.is_terminal().then_some(self.status)
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining
    }

    /// Does not read the clock: call `tick` first so an expired round is
    /// already Lost(Timeout) and the guess is ignored.
    pub fn guess_letter(&mut self, ch: char, session: &mut PlayerSession, audio: &dyn AudioSink) -> GuessOutcome {
        let outcome = self.apply_guess(ch, session, audio);
        self.feedback = Feedback::Guess(outcome);
        outcome
    }

    fn apply_guess(&mut self, ch: char, session: &mut PlayerSession, audio: &dyn AudioSink) -> GuessOutcome {
        if self.status != RoundStatus::Active {
            return GuessOutcome::Ignored;
        }
        let ch = ch.to_lowercase().next().unwrap_or(ch);
        if !ch.is_alphabetic() || self.state.guessed_letters.contains(&ch) {
            return GuessOutcome::Ignored;
        }

        self.state.guessed_letters.insert(ch);

        if self.state.required_letters.remove(&ch) {
            self.state.correct_letters.insert(ch);
            let points = scoring::correct_guess(&self.config, self.state.combo_count);
            self.state.combo_count += 1;
            session.profile.points = session.profile.points.saturating_add(points);
            audio.emit(AudioEvent::GuessCorrect);
            if self.state.required_letters.is_empty() {
                self.end(RoundStatus::Won);
            }
            GuessOutcome::Correct { points, combo: self.state.combo_count }
        } else {
            self.state.wrong_letters.insert(ch);
            self.state.mistake_count += 1;
            self.state.combo_count = 0;
            audio.emit(AudioEvent::GuessWrong);
            if self.state.mistake_count >= self.config.max_mistakes {
                self.end(RoundStatus::Lost(LossReason::Mistakes));
            }
            GuessOutcome::Wrong {
                mistakes_left: self.config.max_mistakes.saturating_sub(self.state.mistake_count),
            }
        }
    }

    /// Spend points to reveal the hint. At most one purchase per round.
    pub fn buy_hint(&mut self, session: &mut PlayerSession, audio: &dyn AudioSink) -> Result<HintPurchase, GameError> {
        let cost = self.config.hint_cost;
        let available = session.profile.points;

        let purchase = if self.status != RoundStatus::Active {
            HintPurchase::Declined(HintDecline::RoundOver)
        } else if self.state.hint_used {
            HintPurchase::Declined(HintDecline::AlreadyUsed)
        } else if available < cost {
            audio.emit(AudioEvent::GuessWrong);
            HintPurchase::Declined(HintDecline::InsufficientPoints { cost, available })
        } else {
            session.profile.points = available - cost;
            self.state.hint_used = true;
            session.persist()?;
            audio.emit(AudioEvent::HintRevealed);
            HintPurchase::Revealed { cost }
        };

        self.feedback = Feedback::Hint(purchase);
        Ok(purchase)
    }

    /// Advance the clock. Call at least once per rendered frame.
    pub fn tick(&mut self, now: Instant, audio: &dyn AudioSink) {
        if self.status != RoundStatus::Active {
            return;
        }
        let elapsed = now.saturating_duration_since(self.state.started_at).as_secs();
        let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
        let remaining = self.config.time_limit_seconds.saturating_sub(elapsed);
        let dropped = remaining < self.remaining;
        self.remaining = remaining;

        if remaining == 0 {
            self.end(RoundStatus::Lost(LossReason::Timeout));
            return;
        }
        if !self.critical_announced {
            if remaining <= CRITICAL_SECONDS {
                self.critical_announced = true;
                audio.emit(AudioEvent::TimeCritical);
            }
        } else if dropped {
            audio.emit(AudioEvent::Tick);
        }
    }

    /// Walk away from the round. Counts as a loss.
    pub fn quit(&mut self) {
        if self.status == RoundStatus::Active {
            self.end(RoundStatus::Lost(LossReason::Abandoned));
            self.feedback = Feedback::Quit;
        }
    }

    fn end(&mut self, status: RoundStatus) {
        self.status = status;
        self.state.active = false;
    }

    /// Settle the round: reward, profile stats, achievements, save.
    pub fn finish(
        &mut self,
        now: Instant,
        session: &mut PlayerSession,
        audio: &dyn AudioSink,
    ) -> Result<RoundSummary, GameError> {
        if let Some(summary) = &self.summary {
            return Ok(summary.clone());
        }
        if self.status == RoundStatus::Active {
            return Err(GameError::RoundInProgress);
        }

        let summary = match self.pending.take() {
            Some(summary) => summary,
            None => self.settle(now, session),
        };
        if let Err(e) = session.persist() {
            self.pending = Some(summary);
            return Err(e);
        }

        if summary.status == RoundStatus::Won {
            audio.emit(AudioEvent::RoundWon);
            if self.daily {
                audio.emit(AudioEvent::Fanfare);
            }
        } else {
            audio.emit(AudioEvent::RoundLost);
        }
        for _ in &summary.unlocked {
            audio.emit(AudioEvent::AchievementUnlocked);
        }

        self.summary = Some(summary.clone());
        Ok(summary)
    }

    /// Apply the outcome to the profile. Runs once per round.
    fn settle(&self, now: Instant, session: &mut PlayerSession) -> RoundSummary {
        let limit = self.config.time_limit_seconds as f64;
        let elapsed = now
            .saturating_duration_since(self.state.started_at)
            .as_secs_f64()
            .min(limit);
        let won = self.status == RoundStatus::Won;

        let profile = &mut session.profile;
        let reward = if won {
            let mut reward = scoring::round_end_win(&self.config, elapsed, self.state.combo_count);
            if self.daily {
                reward.daily_bonus = DAILY_BONUS;
            }
            profile.points = profile.points.saturating_add(reward.total());
            profile.wins += 1;
            profile.current_streak += 1;
            profile.best_streak = profile.best_streak.max(profile.current_streak);
            profile.perfect_last_win = self.state.mistake_count == 0;
            if profile.loss_streak >= 3 {
                profile.comeback_flag = true;
            }
            profile.loss_streak = 0;
            if profile.best_win_time_seconds.map_or(true, |best| elapsed < best) {
                profile.best_win_time_seconds = Some(elapsed);
            }
            *profile.wins_by_language.entry(self.language).or_insert(0) += 1;
            if !self.state.hint_used {
                profile.hint_free_wins += 1;
            }
            reward
        } else {
            profile.losses += 1;
            profile.current_streak = 0;
            profile.perfect_last_win = false;
            profile.loss_streak += 1;
            RoundReward::default()
        };
        profile.total_games += 1;
        profile.total_time_seconds += elapsed;

        let unlocked = achievements::evaluate(profile);

        let summary = RoundSummary {
            status: self.status,
            word: self.state.target_word.clone(),
            reward,
            elapsed_seconds: elapsed,
            mistakes: self.state.mistake_count,
            daily: self.daily,
            unlocked,
        };

        info!(
            user = %session.username,
            difficulty = self.difficulty.name(),
            status = ?summary.status,
            earned = reward.total(),
            elapsed = format_args!("{:.1}", elapsed),
            unlocked = summary.unlocked.len(),
            "round finished"
        );
        summary
    }

    pub fn render_model(&self) -> RenderModel {
        RenderModel {
            state: self.state.clone(),
            difficulty: self.config,
            language: self.language,
            daily: self.daily,
            status: self.status,
            remaining_seconds: self.remaining,
            feedback: self.feedback,
            revealed_word: matches!(self.status, RoundStatus::Lost(_))
                .then(|| self.state.target_word.clone()),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::sim::event::testing::Recorder;
    use crate::sim::save::tests::scratch_dir;
    use crate::sim::save::{ProfileStore, PROFILE_FILE};
    use crate::sim::session::tests::session_in;

    fn setup(word: &str, difficulty: Difficulty) -> RoundSetup {
        RoundSetup {
            entry: WordEntry::new(word, "a hint", "Test"),
            difficulty,
            language: Language::En,
            daily: false,
        }
    }

    fn secs(t0: Instant, s: u64) -> Instant {
        t0 + Duration::from_secs(s)
    }

    fn assert_invariants(r: &RoundEngine) {
        let s = r.state();
        let union: BTreeSet<char> = s.correct_letters.union(&s.wrong_letters).copied().collect();
        assert_eq!(union, s.guessed_letters);
        assert!(s.correct_letters.is_disjoint(&s.wrong_letters));
        assert_eq!(s.mistake_count as usize, s.wrong_letters.len());
        assert!(s.required_letters.is_disjoint(&s.correct_letters));
    }

    #[test]
    fn start_rejects_words_without_letters() {
        let t0 = Instant::now();
        assert!(matches!(RoundEngine::start(setup("", Difficulty::Easy), t0), Err(GameError::EmptyWord)));
        assert!(matches!(RoundEngine::start(setup("   ", Difficulty::Easy), t0), Err(GameError::EmptyWord)));
    }

    #[test]
    fn spaces_are_not_required_letters() {
        let r = RoundEngine::start(setup("Ice Cream", Difficulty::Easy), Instant::now()).unwrap();
        let expected: BTreeSet<char> = "icream".chars().collect();
        assert_eq!(r.state().required_letters, expected);
        assert_eq!(r.state().target_word, "ice cream");
    }

    #[test]
    fn easy_perfect_win_on_cat() {
        let mut session = session_in("round-cat-win");
        let audio = Recorder::default();
        let t0 = Instant::now();
        let mut r = RoundEngine::start(setup("cat", Difficulty::Easy), t0).unwrap();

        let gains: Vec<_> = "cat".chars().map(|c| r.guess_letter(c, &mut session, &audio)).collect();
        assert_eq!(
            gains,
            vec![
                GuessOutcome::Correct { points: 10, combo: 1 },
                GuessOutcome::Correct { points: 13, combo: 2 },
                GuessOutcome::Correct { points: 16, combo: 3 },
            ]
        );
        assert_eq!(session.profile.points, 39);
        assert_eq!(r.status(), RoundStatus::Won);
        assert_eq!(r.state().mistake_count, 0);
        assert_invariants(&r);

        let summary = r.finish(secs(t0, 10), &mut session, &audio).unwrap();
        assert_eq!(summary.reward.base, 50);
        assert_eq!(summary.reward.time_bonus, 55);
        assert_eq!(summary.reward.combo_bonus, 12);
        assert_eq!(session.profile.points, 39 + 117);
        assert!(session.profile.perfect_last_win);
        assert_eq!(session.profile.current_streak, 1);
        assert_eq!(session.profile.wins_in(Language::En), 1);
        assert_eq!(session.profile.hint_free_wins, 1);
        assert_eq!(session.profile.best_win_time_seconds, Some(10.0));

        let events = audio.take();
        assert_eq!(events.iter().filter(|e| **e == AudioEvent::GuessCorrect).count(), 3);
        assert!(events.contains(&AudioEvent::RoundWon));
    }

    #[test]
    fn hard_loss_on_cat() {
        let mut session = session_in("round-cat-loss");
        session.profile.current_streak = 4;
        let audio = Recorder::default();
        let t0 = Instant::now();
        let mut r = RoundEngine::start(setup("cat", Difficulty::Hard), t0).unwrap();

        for c in ['x', 'y', 'z', 'q'] {
            r.guess_letter(c, &mut session, &audio);
            assert_invariants(&r);
        }
        assert_eq!(r.status(), RoundStatus::Lost(LossReason::Mistakes));
        assert_eq!(r.render_model().revealed_word.as_deref(), Some("cat"));
        assert!(r.render_model().word_slots().iter().all(Option::is_some));

        let summary = r.finish(secs(t0, 5), &mut session, &audio).unwrap();
        assert_eq!(summary.reward.total(), 0);
        assert_eq!(session.profile.current_streak, 0);
        assert_eq!(session.profile.loss_streak, 1);
        assert_eq!(session.profile.losses, 1);
        assert_eq!(audio.count(AudioEvent::RoundLost), 1);
    }

    #[test]
    fn guesses_after_the_round_ends_are_ignored() {
        let mut session = session_in("round-after-end");
        let audio = Recorder::default();
        let mut r = RoundEngine::start(setup("ab", Difficulty::Hard), Instant::now()).unwrap();
        for c in ['w', 'x', 'y', 'z'] {
            r.guess_letter(c, &mut session, &audio);
        }
        assert_eq!(r.guess_letter('a', &mut session, &audio), GuessOutcome::Ignored);
        assert_eq!(r.state().mistake_count, 4);
        assert!(!r.state().active);
    }

    #[test]
    fn repeated_guess_changes_nothing() {
        let mut session = session_in("round-repeat");
        let audio = Recorder::default();
        let mut r = RoundEngine::start(setup("banana", Difficulty::Easy), Instant::now()).unwrap();

        r.guess_letter('b', &mut session, &audio);
        r.guess_letter('q', &mut session, &audio);
        let (points, mistakes, combo) = (session.profile.points, r.state().mistake_count, r.state().combo_count);

        assert_eq!(r.guess_letter('b', &mut session, &audio), GuessOutcome::Ignored);
        assert_eq!(r.guess_letter('Q', &mut session, &audio), GuessOutcome::Ignored);
        assert_eq!(session.profile.points, points);
        assert_eq!(r.state().mistake_count, mistakes);
        assert_eq!(r.state().combo_count, combo);
        assert_invariants(&r);
    }

    #[test]
    fn non_letters_are_ignored() {
        let mut session = session_in("round-nonletter");
        let audio = Recorder::default();
        let mut r = RoundEngine::start(setup("cat", Difficulty::Easy), Instant::now()).unwrap();
        assert_eq!(r.guess_letter('3', &mut session, &audio), GuessOutcome::Ignored);
        assert_eq!(r.guess_letter(' ', &mut session, &audio), GuessOutcome::Ignored);
        assert!(r.state().guessed_letters.is_empty());
        assert!(audio.take().is_empty());
    }

    #[test]
    fn wrong_guess_breaks_combo_and_perfect() {
        let mut session = session_in("round-combo");
        let audio = Recorder::default();
        let t0 = Instant::now();
        let mut r = RoundEngine::start(setup("cat", Difficulty::Easy), t0).unwrap();

        r.guess_letter('c', &mut session, &audio);
        r.guess_letter('a', &mut session, &audio);
        r.guess_letter('z', &mut session, &audio);
        assert_eq!(r.state().combo_count, 0);
        assert_eq!(r.guess_letter('t', &mut session, &audio), GuessOutcome::Correct { points: 10, combo: 1 });

        r.finish(secs(t0, 30), &mut session, &audio).unwrap();
        assert!(!session.profile.perfect_last_win);
        assert!(!session.profile.unlocked_achievements.contains("flawless"));
    }

    #[test]
    fn hint_declined_when_points_short() {
        let mut session = session_in("round-hint-short");
        session.profile.points = 10;
        let audio = Recorder::default();
        let mut r = RoundEngine::start(setup("cat", Difficulty::Easy), Instant::now()).unwrap();

        let got = r.buy_hint(&mut session, &audio).unwrap();
        assert_eq!(got, HintPurchase::Declined(HintDecline::InsufficientPoints { cost: 20, available: 10 }));
        assert!(!r.state().hint_used);
        assert_eq!(session.profile.points, 10);
        assert_eq!(audio.count(AudioEvent::HintRevealed), 0);
    }

    #[test]
    fn hint_charged_exactly_once() {
        let mut session = session_in("round-hint-once");
        session.profile.points = 100;
        let audio = Recorder::default();
        let mut r = RoundEngine::start(setup("cat", Difficulty::Medium), Instant::now()).unwrap();

        assert_eq!(r.buy_hint(&mut session, &audio).unwrap(), HintPurchase::Revealed { cost: 35 });
        for _ in 0..3 {
            assert_eq!(
                r.buy_hint(&mut session, &audio).unwrap(),
                HintPurchase::Declined(HintDecline::AlreadyUsed)
            );
        }
        assert_eq!(session.profile.points, 65);
        assert_eq!(audio.count(AudioEvent::HintRevealed), 1);
        // the purchase is saved right away
        assert_eq!(session.store().load_all()["tester"].points, 65);
    }

    #[test]
    fn hint_win_does_not_count_as_hint_free() {
        let mut session = session_in("round-hint-win");
        session.profile.points = 50;
        let audio = Recorder::default();
        let t0 = Instant::now();
        let mut r = RoundEngine::start(setup("ox", Difficulty::Easy), t0).unwrap();
        r.buy_hint(&mut session, &audio).unwrap();
        r.guess_letter('o', &mut session, &audio);
        r.guess_letter('x', &mut session, &audio);
        r.finish(secs(t0, 3), &mut session, &audio).unwrap();
        assert_eq!(session.profile.hint_free_wins, 0);
        assert_eq!(session.profile.wins, 1);
    }

    #[test]
    fn finish_is_idempotent() {
        let mut session = session_in("round-idem");
        let audio = Recorder::default();
        let t0 = Instant::now();
        let mut r = RoundEngine::start(setup("cat", Difficulty::Easy), t0).unwrap();
        for c in "cat".chars() {
            r.guess_letter(c, &mut session, &audio);
        }
        let first = r.finish(secs(t0, 10), &mut session, &audio).unwrap();
        let after_first = session.profile.clone();
        audio.take();

        let second = r.finish(secs(t0, 50), &mut session, &audio).unwrap();
        assert_eq!(session.profile, after_first);
        assert_eq!(first.reward, second.reward);
        assert_eq!(first.elapsed_seconds, second.elapsed_seconds);
        assert!(audio.take().is_empty());
    }

    #[test]
    fn failed_save_is_retried_without_settling_twice() {
        let dir = scratch_dir("round-blocked-save");
        let mut session = PlayerSession::open(ProfileStore::in_dir(&dir), "tester").unwrap().0;
        let file = dir.join(PROFILE_FILE);
        std::fs::remove_file(&file).unwrap();
        std::fs::create_dir(&file).unwrap();

        let audio = Recorder::default();
        let t0 = Instant::now();
        let mut r = RoundEngine::start(setup("ab", Difficulty::Easy), t0).unwrap();
        r.guess_letter('a', &mut session, &audio);
        r.guess_letter('b', &mut session, &audio);
        audio.take();

        assert!(matches!(r.finish(secs(t0, 5), &mut session, &audio), Err(GameError::Persist { .. })));
        assert!(matches!(r.finish(secs(t0, 6), &mut session, &audio), Err(GameError::Persist { .. })));
        assert_eq!(session.profile.wins, 1);
        assert_eq!(session.profile.total_games, 1);
        assert_eq!(audio.count(AudioEvent::RoundWon), 0);

        std::fs::remove_dir(&file).unwrap();
        let summary = r.finish(secs(t0, 7), &mut session, &audio).unwrap();
        assert_eq!(summary.status, RoundStatus::Won);
        assert_eq!(summary.elapsed_seconds, 5.0);
        assert_eq!(session.profile.wins, 1);
        assert_eq!(session.store().load_all()["tester"].wins, 1);
        assert_eq!(audio.count(AudioEvent::RoundWon), 1);

        r.finish(secs(t0, 8), &mut session, &audio).unwrap();
        assert_eq!(audio.count(AudioEvent::RoundWon), 1);
    }

    #[test]
    fn finish_while_active_is_an_error() {
        let mut session = session_in("round-early-finish");
        let mut r = RoundEngine::start(setup("cat", Difficulty::Easy), Instant::now()).unwrap();
        let err = r.finish(Instant::now(), &mut session, &Recorder::default()).unwrap_err();
        assert!(matches!(err, GameError::RoundInProgress));
        assert_eq!(session.profile.total_games, 0);
    }

    #[test]
    fn first_win_is_reported_once() {
        let mut session = session_in("round-first-win");
        let audio = Recorder::default();
        let t0 = Instant::now();

        let mut r = RoundEngine::start(setup("ab", Difficulty::Easy), t0).unwrap();
        r.guess_letter('a', &mut session, &audio);
        r.guess_letter('b', &mut session, &audio);
        let s1 = r.finish(secs(t0, 40), &mut session, &audio).unwrap();
        assert_eq!(s1.unlocked.iter().filter(|a| a.id == "first_win").count(), 1);
        assert_eq!(audio.count(AudioEvent::AchievementUnlocked), s1.unlocked.len());

        let mut r = RoundEngine::start(setup("ab", Difficulty::Easy), t0).unwrap();
        r.guess_letter('a', &mut session, &audio);
        r.guess_letter('b', &mut session, &audio);
        let s2 = r.finish(secs(t0, 40), &mut session, &audio).unwrap();
        assert!(s2.unlocked.iter().all(|a| a.id != "first_win"));
    }

    #[test]
    fn critical_cue_fires_once_then_ticks() {
        let mut session = session_in("round-critical");
        let audio = Recorder::default();
        let t0 = Instant::now();
        let mut r = RoundEngine::start(setup("cat", Difficulty::Hard), t0).unwrap();

        r.tick(secs(t0, 30), &audio);
        assert!(audio.take().is_empty());
        r.tick(secs(t0, 50), &audio); // remaining 10
        r.tick(secs(t0, 50), &audio);
        assert_eq!(audio.take(), vec![AudioEvent::TimeCritical]);
        r.tick(secs(t0, 51), &audio);
        r.tick(secs(t0, 52), &audio);
        assert_eq!(audio.take(), vec![AudioEvent::Tick, AudioEvent::Tick]);
        assert_eq!(r.remaining_seconds(), 8);
        assert_eq!(audio.count(AudioEvent::TimeCritical), 0);

        r.guess_letter('c', &mut session, &audio);
        assert_eq!(r.status(), RoundStatus::Active);
    }

    #[test]
    fn timer_expiry_loses_the_round() {
        let mut session = session_in("round-timeout");
        let audio = Recorder::default();
        let t0 = Instant::now();
        let mut r = RoundEngine::start(setup("cat", Difficulty::Hard), t0).unwrap();
        r.tick(secs(t0, 61), &audio);
        assert_eq!(r.status(), RoundStatus::Lost(LossReason::Timeout));
        assert_eq!(r.remaining_seconds(), 0);

        let summary = r.finish(secs(t0, 61), &mut session, &audio).unwrap();
        assert_eq!(summary.elapsed_seconds, 60.0);
        assert_eq!(session.profile.total_time_seconds, 60.0);
    }

    #[test]
    fn quit_counts_as_loss_but_is_distinguishable() {
        let mut session = session_in("round-quit");
        let audio = Recorder::default();
        let t0 = Instant::now();
        let mut r = RoundEngine::start(setup("cat", Difficulty::Easy), t0).unwrap();
        r.guess_letter('c', &mut session, &audio);
        r.quit();
        let model = r.render_model();
        assert_eq!(model.status, RoundStatus::Lost(LossReason::Abandoned));
        assert_eq!(model.feedback, Feedback::Quit);

        r.finish(secs(t0, 4), &mut session, &audio).unwrap();
        assert_eq!(session.profile.losses, 1);
        assert_eq!(session.profile.total_games, 1);
    }

    #[test]
    fn comeback_after_three_losses() {
        let mut session = session_in("round-comeback");
        session.profile.loss_streak = 3;
        let audio = Recorder::default();
        let t0 = Instant::now();
        let mut r = RoundEngine::start(setup("ok", Difficulty::Easy), t0).unwrap();
        r.guess_letter('o', &mut session, &audio);
        r.guess_letter('k', &mut session, &audio);
        let summary = r.finish(secs(t0, 25), &mut session, &audio).unwrap();
        assert!(session.profile.comeback_flag);
        assert_eq!(session.profile.loss_streak, 0);
        assert!(summary.unlocked.iter().any(|a| a.id == "comeback"));
    }

    #[test]
    fn daily_win_adds_flat_bonus_and_fanfare() {
        let mut session = session_in("round-daily");
        let audio = Recorder::default();
        let t0 = Instant::now();
        let mut daily = setup("ok", Difficulty::Medium);
        daily.daily = true;
        let mut r = RoundEngine::start(daily, t0).unwrap();
        r.guess_letter('o', &mut session, &audio);
        r.guess_letter('k', &mut session, &audio);
        let summary = r.finish(secs(t0, 90), &mut session, &audio).unwrap();
        assert_eq!(summary.reward.daily_bonus, DAILY_BONUS);
        assert_eq!(summary.reward.total(), 75 + 8 + 200);
        assert_eq!(audio.count(AudioEvent::Fanfare), 1);
    }

    #[test]
    fn masked_slots_show_found_letters() {
        let mut session = session_in("round-slots");
        let audio = Recorder::default();
        let mut r = RoundEngine::start(setup("ice cream", Difficulty::Easy), Instant::now()).unwrap();
        r.guess_letter('c', &mut session, &audio);
        let slots = r.render_model().word_slots();
        let shown: String = slots.iter().map(|s| s.unwrap_or('_')).collect();
        assert_eq!(shown, "_c_ c____");
        assert_eq!(r.render_model().letters_found(), (1, 6));
    }
}
