/// Audio cues emitted by the game core.
/// The audio subsystem consumes these; the core never waits on them.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AudioEvent {
    GuessCorrect,
    GuessWrong,
    RoundWon,
    RoundLost,
    HintRevealed,
    AchievementUnlocked,
    UiClick,
    TimeCritical,
    Tick,
    Fanfare,
}

/// Fire-and-forget receiver of audio cues.
pub trait AudioSink {
    fn emit(&self, event: AudioEvent);
}

#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;

    use super::{AudioEvent, AudioSink};

    /// Records emitted cues for assertions.
    #[derive(Default)]
    pub struct Recorder {
        pub events: RefCell<Vec<AudioEvent>>,
    }

    impl Recorder {
        pub fn take(&self) -> Vec<AudioEvent> {
            std::mem::take(&mut *self.events.borrow_mut())
        }

        pub fn count(&self, event: AudioEvent) -> usize {
            self.events.borrow().iter().filter(|e| **e == event).count()
        }
    }

    impl AudioSink for Recorder {
        fn emit(&self, event: AudioEvent) {
            self.events.borrow_mut().push(event);
        }
    }
}
