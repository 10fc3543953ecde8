/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Runs before logging is set up, so problems go to stderr.

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::difficulty::Difficulty;
use crate::domain::language::Language;
use crate::sim::save::default_data_dir;
use crate::ui::sound::BackendChoice;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub data_dir: PathBuf,
    pub language: Language,
    pub difficulty: Difficulty,
    /// Skip the name prompt when set.
    pub username: Option<String>,
    pub audio: AudioConfig,
    pub timing: TimingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct AudioConfig {
    pub sound: bool,
    pub music: bool,
    pub backend: BackendChoice,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub message_ticks: u32,  // how long a status line stays up
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub file: PathBuf,
    pub level: tracing::Level,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    logging: TomlLogging,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    data_dir: Option<String>,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_difficulty")]
    difficulty: String,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlAudio {
    #[serde(default = "default_true")]
    sound: bool,
    #[serde(default)]
    music: bool,
    #[serde(default = "default_backend")]
    backend: String,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_message_ticks")]
    message_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlLogging {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

// ── Defaults ──

fn default_language() -> String { "en".into() }
fn default_difficulty() -> String { "medium".into() }
fn default_true() -> bool { true }
fn default_backend() -> String { "auto".into() }
fn default_tick_rate() -> u64 { 100 }
fn default_message_ticks() -> u32 { 12 }  // 1.2s at 100ms tick
fn default_log_file() -> String { "hangman.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            data_dir: None,
            language: default_language(),
            difficulty: default_difficulty(),
            username: None,
        }
    }
}

impl Default for TomlAudio {
    fn default() -> Self {
        TomlAudio {
            sound: default_true(),
            music: false,
            backend: default_backend(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            message_ticks: default_message_ticks(),
        }
    }
}

impl Default for TomlLogging {
    fn default() -> Self {
        TomlLogging {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home. Missing file or keys fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());
        Self::resolve(toml_cfg)
    }

    fn resolve(toml_cfg: TomlConfig) -> Self {
        let general = toml_cfg.general;

        let data_dir = match general.data_dir.filter(|d| !d.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir(),
        };

        let language = Language::parse(&general.language).unwrap_or_else(|| {
            eprintln!("Warning: unknown language {:?}, using English.", general.language);
            Language::En
        });
        let difficulty = Difficulty::from_name(&general.difficulty).unwrap_or_else(|| {
            eprintln!("Warning: unknown difficulty {:?}, using medium.", general.difficulty);
            Difficulty::Medium
        });
        let backend = BackendChoice::from_name(&toml_cfg.audio.backend).unwrap_or_else(|| {
            eprintln!("Warning: unknown audio backend {:?}, using auto.", toml_cfg.audio.backend);
            BackendChoice::Auto
        });
        let level = toml_cfg.logging.level.parse::<tracing::Level>().unwrap_or_else(|_| {
            eprintln!("Warning: unknown log level {:?}, using info.", toml_cfg.logging.level);
            tracing::Level::INFO
        });

        // Relative log paths live next to the save data
        let log_file = PathBuf::from(&toml_cfg.logging.file);
        let log_file = if log_file.is_absolute() { log_file } else { data_dir.join(log_file) };

        GameConfig {
            data_dir,
            language,
            difficulty,
            username: general.username.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()),
            audio: AudioConfig {
                sound: toml_cfg.audio.sound,
                music: toml_cfg.audio.music,
                backend,
            },
            timing: TimingConfig {
                tick_rate_ms: toml_cfg.timing.tick_rate_ms.max(10),
                message_ticks: toml_cfg.timing.message_ticks,
            },
            logging: LoggingConfig { file: log_file, level },
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/hangman)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/hangman");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_toml(&text),
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Warning: config.toml parse error: {e}");
            eprintln!("Using default settings.");
            TomlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(text: &str) -> GameConfig {
        GameConfig::resolve(parse_toml(text))
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = resolve("[general]\ndata_dir = \"/tmp/hm\"\n");
        assert_eq!(cfg.language, Language::En);
        assert_eq!(cfg.difficulty, Difficulty::Medium);
        assert!(cfg.username.is_none());
        assert!(cfg.audio.sound);
        assert!(!cfg.audio.music);
        assert_eq!(cfg.audio.backend, BackendChoice::Auto);
        assert_eq!(cfg.timing.tick_rate_ms, 100);
        assert_eq!(cfg.timing.message_ticks, 12);
        assert_eq!(cfg.logging.level, tracing::Level::INFO);
        assert_eq!(cfg.logging.file, PathBuf::from("/tmp/hm/hangman.log"));
    }

    #[test]
    fn sections_override_defaults() {
        let cfg = resolve(
            r#"
            [general]
            data_dir = "/srv/hangman"
            language = "ar"
            difficulty = "hard"
            username = "  noor "

            [audio]
            sound = false
            music = true
            backend = "command"

            [timing]
            tick_rate_ms = 50

            [logging]
            file = "/var/log/hm.log"
            level = "debug"
            "#,
        );
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/hangman"));
        assert_eq!(cfg.language, Language::Ar);
        assert_eq!(cfg.difficulty, Difficulty::Hard);
        assert_eq!(cfg.username.as_deref(), Some("noor"));
        assert!(!cfg.audio.sound && cfg.audio.music);
        assert_eq!(cfg.audio.backend, BackendChoice::Command);
        assert_eq!(cfg.timing.tick_rate_ms, 50);
        assert_eq!(cfg.timing.message_ticks, 12);
        assert_eq!(cfg.logging.file, PathBuf::from("/var/log/hm.log"));
        assert_eq!(cfg.logging.level, tracing::Level::DEBUG);
    }

    #[test]
    fn bad_values_fall_back() {
        let cfg = resolve(
            "[general]\ndata_dir = \"/tmp/x\"\nlanguage = \"fr\"\ndifficulty = \"brutal\"\n[audio]\nbackend = \"jack\"\n",
        );
        assert_eq!(cfg.language, Language::En);
        assert_eq!(cfg.difficulty, Difficulty::Medium);
        assert_eq!(cfg.audio.backend, BackendChoice::Auto);
    }

    #[test]
    fn malformed_toml_uses_defaults() {
        let parsed = parse_toml("[audio\nsound = maybe");
        assert!(parsed.audio.sound);
        assert_eq!(parsed.general.language, "en");
    }
}
