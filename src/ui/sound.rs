/// Audio subsystem: cue dispatch, playback backends, background music.
///
/// ## Threads
///
///   main ──emit(cue)──▶ [jobs channel] ──▶ audio worker ──▶ Playback (non-blocking)
///   music worker: note ─▶ Playback (blocking) ─▶ pause ─▶ note ...
///
/// The round loop never waits on sound. Every failure is logged at debug
/// level and dropped.
///
/// ## Flags
///
/// `sound` and `music` are atomics shared with both workers and read fresh
/// before every note, so muting takes effect at the next sound without
/// cutting one that is already playing.
///
/// Build without the "sound" feature to leave out rodio; the `command`
/// backend still works through external players.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender};
use tracing::{debug, info};

use crate::error::AudioError;
use crate::sim::event::{AudioEvent, AudioSink};
use crate::ui::synth::{self, DEFAULT_FADE};

const PENTATONIC: [f32; 10] = [261.0, 293.0, 329.0, 392.0, 440.0, 523.0, 587.0, 659.0, 784.0, 880.0];
const NOTE_LENGTHS: [f32; 3] = [0.18, 0.22, 0.28];
const MUSIC_VOLUME: f32 = 0.10;
const MUSIC_IDLE: Duration = Duration::from_millis(300);

// ════════════════════════════════════════════════════════════
//  Backend selection
// ════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendChoice {
    Auto,
    Rodio,
    Command,
    Off,
}

impl BackendChoice {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(BackendChoice::Auto),
            "rodio" => Some(BackendChoice::Rodio),
            "command" => Some(BackendChoice::Command),
            "off" | "none" => Some(BackendChoice::Off),
            _ => None,
        }
    }
}

/// Something that can turn samples into sound.
pub trait Playback: Send + Sync {
    fn name(&self) -> &'static str;

    /// Play `samples`; with `blocking`, return only once playback ends.
    fn play(&self, samples: &[i16], blocking: bool) -> Result<(), AudioError>;
}

pub struct NoPlayback;

impl Playback for NoPlayback {
    fn name(&self) -> &'static str {
        "off"
    }

    fn play(&self, _samples: &[i16], _blocking: bool) -> Result<(), AudioError> {
        Ok(())
    }
}

// ── rodio ──

#[cfg(feature = "sound")]
mod rodio_backend {
    use std::io::Cursor;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Playback;
    use crate::error::AudioError;
    use crate::ui::synth;

    /// Plays in-memory WAV buffers on the default output device.
    pub struct RodioPlayback {
        handle: OutputStreamHandle,
    }

    impl RodioPlayback {
        /// The returned stream must outlive every playback; keep it on the
        /// thread that opened it.
        pub fn open() -> Result<(OutputStream, Self), AudioError> {
            let (stream, handle) =
                OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))?;
            Ok((stream, RodioPlayback { handle }))
        }
    }

    impl Playback for RodioPlayback {
        fn name(&self) -> &'static str {
            "rodio"
        }

        fn play(&self, samples: &[i16], blocking: bool) -> Result<(), AudioError> {
            let wav = synth::encode_wav(samples)?;
            let sink = Sink::try_new(&self.handle).map_err(|e| AudioError::Device(e.to_string()))?;
            let src = rodio::Decoder::new(Cursor::new(wav)).map_err(|e| AudioError::Device(e.to_string()))?;
            sink.append(src);
            if blocking {
                sink.sleep_until_end();
            } else {
                sink.detach(); // fire-and-forget
            }
            Ok(())
        }
    }
}

#[cfg(feature = "sound")]
pub use rodio_backend::RodioPlayback;

// ── external player ──

/// A WAV file in the temp dir, removed when dropped.
pub struct TempWav {
    path: PathBuf,
}

impl TempWav {
    pub fn write(samples: &[i16]) -> Result<Self, AudioError> {
        static SEQ: AtomicU32 = AtomicU32::new(0);
        let n = SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("hangman-{}-{}.wav", std::process::id(), n));
        // Guard first so a half-written file is still cleaned up.
        let guard = TempWav { path };
        let mut writer = hound::WavWriter::create(&guard.path, synth::wav_spec())?;
        for &s in samples {
            writer.write_sample(s)?;
        }
        writer.finalize()?;
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempWav {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

const WAV_SLOT: &str = "{wav}";

/// Shells out to whatever player the platform has.
pub struct CommandPlayback {
    /// Program followed by its arguments. The WAV path replaces `{wav}`,
    /// or is appended when no argument contains it.
    candidates: Vec<Vec<String>>,
}

impl CommandPlayback {
    pub fn platform_default() -> Self {
        let list: &[&[&str]] = if cfg!(target_os = "macos") {
            &[&["afplay"]]
        } else if cfg!(windows) {
            &[&["powershell", "-NoProfile", "-Command", "(New-Object Media.SoundPlayer '{wav}').PlaySync()"]]
        } else {
            &[&["aplay", "-q"], &["paplay"], &["play", "-q"]]
        };
        Self::with_candidates(list.iter().map(|c| c.iter().map(|s| s.to_string()).collect()).collect())
    }

    pub fn with_candidates(candidates: Vec<Vec<String>>) -> Self {
        CommandPlayback { candidates }
    }

    fn spawn(&self, wav: &Path) -> Result<Child, AudioError> {
        for cmd in &self.candidates {
            let Some((program, args)) = cmd.split_first() else { continue };
            let mut command = Command::new(program);
            let wav_arg = wav.to_string_lossy();
            let mut slotted = false;
            for arg in args {
                slotted |= arg.contains(WAV_SLOT);
                command.arg(arg.replace(WAV_SLOT, &wav_arg));
            }
            if !slotted {
                command.arg(wav);
            }
            let spawned = command
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn();
            match spawned {
                Ok(child) => return Ok(child),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(AudioError::NoPlayer)
    }
}

impl Playback for CommandPlayback {
    fn name(&self) -> &'static str {
        "command"
    }

    fn play(&self, samples: &[i16], blocking: bool) -> Result<(), AudioError> {
        let wav = TempWav::write(samples)?;
        let mut child = self.spawn(wav.path())?;
        if blocking {
            child.wait()?;
        } else {
            // Reaper owns the file until the player exits.
            std::thread::spawn(move || {
                let _ = child.wait();
                drop(wav);
            });
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════
//  Subsystem
// ════════════════════════════════════════════════════════════

#[derive(Debug)]
struct AudioFlags {
    sound: AtomicBool,
    music: AtomicBool,
}

enum AudioJob {
    Cue(AudioEvent),
    Samples(Vec<i16>),
}

struct MusicWorker {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

pub struct AudioSubsystem {
    flags: Arc<AudioFlags>,
    playback: Arc<dyn Playback>,
    jobs: Option<Sender<AudioJob>>,
    worker: Option<JoinHandle<()>>,
    music: Option<MusicWorker>,
    #[cfg(feature = "sound")]
    _stream: Option<rodio::OutputStream>,
}

impl AudioSubsystem {
    /// Open the configured backend. Never fails: the worst case is silence.
    pub fn new(choice: BackendChoice, sound_on: bool) -> Self {
        #[cfg(feature = "sound")]
        {
            let want_rodio = matches!(choice, BackendChoice::Auto | BackendChoice::Rodio);
            if want_rodio {
                match RodioPlayback::open() {
                    Ok((stream, playback)) => {
                        let mut audio = Self::with_playback(Arc::new(playback), sound_on);
                        audio._stream = Some(stream);
                        return audio;
                    }
                    Err(e) => debug!(error = %e, "rodio output unavailable"),
                }
            }
        }

        let playback: Arc<dyn Playback> = match choice {
            BackendChoice::Off => Arc::new(NoPlayback),
            BackendChoice::Rodio => {
                debug!("rodio backend requested but not available, staying silent");
                Arc::new(NoPlayback)
            }
            BackendChoice::Auto | BackendChoice::Command => Arc::new(CommandPlayback::platform_default()),
        };
        Self::with_playback(playback, sound_on)
    }

    pub fn with_playback(playback: Arc<dyn Playback>, sound_on: bool) -> Self {
        let flags = Arc::new(AudioFlags {
            sound: AtomicBool::new(sound_on),
            music: AtomicBool::new(false),
        });
        let (tx, rx) = crossbeam_channel::unbounded::<AudioJob>();

        let worker = {
            let flags = Arc::clone(&flags);
            let playback = Arc::clone(&playback);
            std::thread::Builder::new()
                .name("audio".into())
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        if !flags.sound.load(Ordering::Relaxed) {
                            continue;
                        }
                        let samples = match job {
                            AudioJob::Cue(ev) => synth::render(synth::recipe_for(ev)),
                            AudioJob::Samples(s) => s,
                        };
                        if let Err(e) = playback.play(&samples, false) {
                            debug!(error = %e, "sound effect dropped");
                        }
                    }
                })
        };
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                debug!(error = %e, "audio worker failed to start");
                None
            }
        };

        AudioSubsystem {
            flags,
            playback,
            jobs: worker.as_ref().map(|_| tx),
            worker,
            music: None,
            #[cfg(feature = "sound")]
            _stream: None,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.playback.name()
    }

    /// Best-effort playback. Non-blocking goes through the worker; blocking
    /// plays on the caller's thread until done.
    pub fn play(&self, samples: &[i16], blocking: bool) {
        if !self.sound_on() {
            return;
        }
        if blocking {
            if let Err(e) = self.playback.play(samples, true) {
                debug!(error = %e, "blocking playback failed");
            }
        } else if let Some(tx) = &self.jobs {
            let _ = tx.send(AudioJob::Samples(samples.to_vec()));
        }
    }

    // ── Flags ──

    pub fn sound_on(&self) -> bool {
        self.flags.sound.load(Ordering::Relaxed)
    }

    pub fn set_muted(&self, muted: bool) {
        self.flags.sound.store(!muted, Ordering::Relaxed);
    }

    /// Flip the sound flag; returns the new state.
    pub fn toggle_sound(&self) -> bool {
        let on = !self.sound_on();
        self.set_muted(!on);
        on
    }

    pub fn music_on(&self) -> bool {
        self.flags.music.load(Ordering::Relaxed)
    }

    // ── Music ──

    pub fn start_music(&mut self) {
        if self.music.is_some() {
            return;
        }
        let (stop, stop_rx) = crossbeam_channel::bounded::<()>(0);
        let flags = Arc::clone(&self.flags);
        let playback = Arc::clone(&self.playback);

        let spawned = std::thread::Builder::new().name("music".into()).spawn(move || {
            let mut rng = fastrand::Rng::new();
            let mut i = 0usize;
            loop {
                let pause = if flags.sound.load(Ordering::Relaxed) {
                    let note = PENTATONIC[i % PENTATONIC.len()];
                    let len = NOTE_LENGTHS[rng.usize(..NOTE_LENGTHS.len())];
                    let samples = synth::tone(note, len, MUSIC_VOLUME, DEFAULT_FADE);
                    if let Err(e) = playback.play(&samples, true) {
                        debug!(error = %e, "music note dropped");
                    }
                    Duration::from_millis(rng.u64(40..=180))
                } else {
                    MUSIC_IDLE
                };
                i = i.wrapping_add(1);
                match stop_rx.recv_timeout(pause) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    _ => break,
                }
            }
        });

        match spawned {
            Ok(thread) => {
                self.flags.music.store(true, Ordering::Relaxed);
                self.music = Some(MusicWorker { stop, thread });
                info!("music started");
            }
            Err(e) => debug!(error = %e, "music worker failed to start"),
        }
    }

    /// Stop the loop; returns once the current note has finished.
    pub fn stop_music(&mut self) {
        self.flags.music.store(false, Ordering::Relaxed);
        if let Some(MusicWorker { stop, thread }) = self.music.take() {
            drop(stop);
            let _ = thread.join();
            info!("music stopped");
        }
    }

    /// Returns whether music is now playing.
    pub fn toggle_music(&mut self) -> bool {
        if self.music.is_some() {
            self.stop_music();
        } else {
            self.start_music();
        }
        self.music_on()
    }
}

impl AudioSink for AudioSubsystem {
    fn emit(&self, event: AudioEvent) {
        if !self.sound_on() {
            return;
        }
        if let Some(tx) = &self.jobs {
            let _ = tx.send(AudioJob::Cue(event));
        }
    }
}

impl Drop for AudioSubsystem {
    fn drop(&mut self) {
        self.stop_music();
        self.jobs = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
