/// Procedural waveforms: sine tones, chords, and one recipe per cue.
///
/// Everything here is pure. Samples are mono 16-bit at `SAMPLE_RATE`.

use std::io::Cursor;

use crate::error::AudioError;
use crate::sim::event::AudioEvent;

pub const SAMPLE_RATE: u32 = 22050;

/// Fraction of a tone spent fading in (and again fading out).
pub const DEFAULT_FADE: f32 = 0.2;

/// Default total volume for a chord, split across its notes.
pub const CHORD_VOLUME: f32 = 0.28;

const PEAK: f32 = 32767.0;

// ════════════════════════════════════════════════════════════
//  Generators
// ════════════════════════════════════════════════════════════

/// Sine tone with a linear fade at both ends.
///
/// `n = round(SAMPLE_RATE · duration)` samples; the fade covers
/// `floor(fade_fraction · n)` samples on each side.
pub fn tone(freq: f32, duration: f32, volume: f32, fade_fraction: f32) -> Vec<i16> {
    let n = (SAMPLE_RATE as f32 * duration.max(0.0)).round() as usize;
    let fade_n = (fade_fraction.clamp(0.0, 0.5) * n as f32).floor() as usize;
    let step = freq * 2.0 * std::f32::consts::PI / SAMPLE_RATE as f32;

    (0..n)
        .map(|i| {
            let env = if fade_n == 0 {
                1.0
            } else {
                let rise = i as f32 / fade_n as f32;
                let fall = (n - i) as f32 / fade_n as f32;
                rise.min(fall).min(1.0)
            };
            quantize((i as f32 * step).sin() * env * volume * PEAK)
        })
        .collect()
}

/// Notes played together; `volume` is shared between them.
pub fn chord(freqs: &[f32], duration: f32, volume: f32) -> Vec<i16> {
    if freqs.is_empty() {
        return Vec::new();
    }
    let each = volume / freqs.len() as f32;
    let voices: Vec<Vec<i16>> = freqs.iter().map(|&f| tone(f, duration, each, DEFAULT_FADE)).collect();
    let n = voices[0].len();

    (0..n)
        .map(|i| {
            let sum: i32 = voices.iter().map(|v| v[i] as i32).sum();
            sum.clamp(-(PEAK as i32), PEAK as i32) as i16
        })
        .collect()
}

fn quantize(s: f32) -> i16 {
    s.clamp(-PEAK, PEAK) as i16
}

// ════════════════════════════════════════════════════════════
//  Recipes
// ════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment {
    Tone { freq: f32, dur: f32, vol: f32 },
    Chord { freqs: &'static [f32], dur: f32, vol: f32 },
}

pub type Recipe = &'static [Segment];

const fn t(freq: f32, dur: f32, vol: f32) -> Segment {
    Segment::Tone { freq, dur, vol }
}

const fn c(freqs: &'static [f32], dur: f32, vol: f32) -> Segment {
    Segment::Chord { freqs, dur, vol }
}

const CORRECT: Recipe = &[t(523.0, 0.07, 0.4), t(659.0, 0.07, 0.4), t(784.0, 0.13, 0.4)];

const WRONG: Recipe = &[t(311.0, 0.09, 0.35), t(220.0, 0.16, 0.3)];

const WIN: Recipe = &[
    t(523.0, 0.11, 0.38),
    t(659.0, 0.11, 0.38),
    t(784.0, 0.11, 0.38),
    t(1047.0, 0.11, 0.38),
    t(1319.0, 0.11, 0.38),
    c(&[523.0, 659.0, 784.0], 0.5, 0.42),
];

const LOSE: Recipe = &[
    t(440.0, 0.14, 0.32),
    t(370.0, 0.14, 0.32),
    t(311.0, 0.14, 0.32),
    t(247.0, 0.14, 0.32),
];

const HINT: Recipe = &[
    c(&[880.0, 1100.0], 0.08, CHORD_VOLUME),
    c(&[1047.0, 1319.0], 0.16, CHORD_VOLUME),
];

const ACHIEVEMENT: Recipe = &[
    t(523.0, 0.09, 0.36),
    t(659.0, 0.09, 0.36),
    t(784.0, 0.09, 0.36),
    t(880.0, 0.09, 0.36),
    t(1047.0, 0.09, 0.36),
    t(1319.0, 0.09, 0.36),
    c(&[659.0, 784.0, 988.0], 0.45, 0.4),
];

const CLICK: Recipe = &[t(1200.0, 0.025, 0.18)];

const DANGER: Recipe = &[t(220.0, 0.11, 0.38), t(185.0, 0.09, 0.3)];

const TICK: Recipe = &[t(900.0, 0.03, 0.12)];

// C C E G G E C E G C'
const FANFARE: Recipe = &[
    t(523.0, 0.10, 0.36),
    t(523.0, 0.10, 0.36),
    t(659.0, 0.10, 0.36),
    t(784.0, 0.10, 0.36),
    t(784.0, 0.10, 0.36),
    t(659.0, 0.10, 0.36),
    t(523.0, 0.10, 0.36),
    t(659.0, 0.10, 0.36),
    t(784.0, 0.10, 0.36),
    t(1047.0, 0.10, 0.36),
];

pub fn recipe_for(event: AudioEvent) -> Recipe {
    match event {
        AudioEvent::GuessCorrect => CORRECT,
        AudioEvent::GuessWrong => WRONG,
        AudioEvent::RoundWon => WIN,
        AudioEvent::RoundLost => LOSE,
        AudioEvent::HintRevealed => HINT,
        AudioEvent::AchievementUnlocked => ACHIEVEMENT,
        AudioEvent::UiClick => CLICK,
        AudioEvent::TimeCritical => DANGER,
        AudioEvent::Tick => TICK,
        AudioEvent::Fanfare => FANFARE,
    }
}

/// Concatenate every segment of `recipe`.
pub fn render(recipe: Recipe) -> Vec<i16> {
    let mut samples = Vec::new();
    for seg in recipe {
        match *seg {
            Segment::Tone { freq, dur, vol } => samples.extend(tone(freq, dur, vol, DEFAULT_FADE)),
            Segment::Chord { freqs, dur, vol } => samples.extend(chord(freqs, dur, vol)),
        }
    }
    samples
}

// ════════════════════════════════════════════════════════════
//  WAV container
// ════════════════════════════════════════════════════════════

pub fn wav_spec() -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Mono 16-bit PCM WAV, in memory.
pub fn encode_wav(samples: &[i16]) -> Result<Vec<u8>, AudioError> {
    let mut cursor = Cursor::new(Vec::with_capacity(44 + samples.len() * 2));
    {
        let mut writer = hound::WavWriter::new(&mut cursor, wav_spec())?;
        for &s in samples {
            writer.write_sample(s)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_length_and_silent_edges() {
        let s = tone(440.0, 0.1, 0.5, DEFAULT_FADE);
        assert_eq!(s.len(), 2205);
        assert_eq!(s[0], 0);
        assert!(s.last().unwrap().abs() < 200);
    }

    #[test]
    fn tone_respects_volume() {
        let s = tone(440.0, 0.2, 0.5, DEFAULT_FADE);
        let peak = s.iter().map(|v| v.unsigned_abs()).max().unwrap();
        assert!(peak <= (0.5 * PEAK) as u16 + 1);
        assert!(peak > (0.45 * PEAK) as u16);
    }

    #[test]
    fn zero_fade_starts_at_full_envelope() {
        let with_fade = tone(1000.0, 0.05, 1.0, DEFAULT_FADE);
        let flat = tone(1000.0, 0.05, 1.0, 0.0);
        // sample 5 is near the sine's first peak at 1 kHz
        assert!(flat[5].abs() > with_fade[5].abs());
    }

    #[test]
    fn loud_tone_is_clipped_not_wrapped() {
        let s = tone(220.0, 0.05, 3.0, 0.0);
        assert!(s.iter().any(|&v| v == 32767));
        assert!(s.iter().all(|&v| v >= -32767));
    }

    #[test]
    fn chord_matches_tone_length_and_shares_volume() {
        let ch = chord(&[523.0, 659.0, 784.0], 0.1, 0.3);
        assert_eq!(ch.len(), tone(523.0, 0.1, 0.1, DEFAULT_FADE).len());
        let peak = ch.iter().map(|v| v.unsigned_abs()).max().unwrap();
        assert!(peak <= (0.3 * PEAK) as u16 + 3);
        assert!(chord(&[], 0.1, 0.3).is_empty());
    }

    #[test]
    fn every_cue_renders_sound() {
        use AudioEvent::*;
        for ev in [
            GuessCorrect, GuessWrong, RoundWon, RoundLost, HintRevealed,
            AchievementUnlocked, UiClick, TimeCritical, Tick, Fanfare,
        ] {
            let s = render(recipe_for(ev));
            assert!(!s.is_empty(), "{ev:?}");
            assert!(s.iter().any(|&v| v != 0), "{ev:?}");
        }
    }

    #[test]
    fn correct_cue_is_three_notes_long() {
        let expected = tone(523.0, 0.07, 0.4, DEFAULT_FADE).len() * 2 + tone(784.0, 0.13, 0.4, DEFAULT_FADE).len();
        assert_eq!(render(recipe_for(AudioEvent::GuessCorrect)).len(), expected);
    }

    #[test]
    fn wav_bytes_decode_back() {
        let samples = render(recipe_for(AudioEvent::UiClick));
        let bytes = encode_wav(&samples).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec(), wav_spec());
        assert_eq!(reader.len() as usize, samples.len());
    }
}
