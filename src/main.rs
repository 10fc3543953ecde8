/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{error, info};

use config::{GameConfig, LoggingConfig};
use domain::difficulty::Difficulty;
use domain::language::Language;
use error::GameError;
use sim::app::{AppState, Phase};
use sim::daily::DailyStore;
use sim::event::{AudioEvent, AudioSink};
use sim::save::ProfileStore;
use sim::session::PlayerSession;
use sim::words::BuiltinWords;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::AudioSubsystem;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const DEFAULT_NAME: &str = "Player";

fn main() {
    let config = GameConfig::load();
    init_logging(&config.logging);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %config.data_dir.display(),
        "starting hangman"
    );

    // Name and language are asked on the plain terminal, before raw mode
    let (username, language) = match &config.username {
        Some(name) => (name.clone(), config.language),
        None => (prompt_username(), prompt_language(config.language)),
    };

    let store = ProfileStore::in_dir(&config.data_dir);
    let (session, caught_up) = match PlayerSession::open(store, &username) {
        Ok(opened) => opened,
        Err(e) => {
            error!(error = %e, "could not open profile");
            eprintln!("Could not open profile: {e}");
            std::process::exit(1);
        }
    };

    let mut audio = AudioSubsystem::new(config.audio.backend, config.audio.sound);
    info!(backend = audio.backend_name(), sound = audio.sound_on(), "audio ready");
    if config.audio.music {
        audio.start_music();
    }

    let mut app = AppState::new(
        session,
        DailyStore::in_dir(&config.data_dir),
        Box::new(BuiltinWords),
        language,
        config.difficulty,
        config.timing.message_ticks,
    );
    app.announce(&caught_up, &audio);

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut app, &mut renderer, &mut audio, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    audio.stop_music();

    if let Err(e) = result {
        error!(error = %e, "game loop failed");
        eprintln!("Game error: {e}");
        std::process::exit(1);
    }

    info!(user = %app.session.username, points = app.session.profile.points, "goodbye");
    println!();
    println!("Thanks for playing, {}!", app.session.username);
    println!("Points: {}", app.session.profile.points);
}

/// Log to a file: the terminal belongs to the UI.
fn init_logging(cfg: &LoggingConfig) {
    if let Some(parent) = cfg.file.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).append(true).open(&cfg.file) {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_max_level(cfg.level)
                .try_init();
        }
        Err(e) => eprintln!("Warning: could not open log file {}: {e}", cfg.file.display()),
    }
}

fn read_line(prompt: &str) -> String {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
    line.trim().to_string()
}

fn prompt_username() -> String {
    let name = read_line("  Username: ");
    if name.is_empty() { DEFAULT_NAME.to_string() } else { name }
}

fn prompt_language(default: Language) -> Language {
    loop {
        let answer = read_line(&format!("  Language [en / ar] ({}): ", default.code()));
        if answer.is_empty() {
            return default;
        }
        match Language::parse(&answer) {
            Some(lang) => return lang,
            None => println!("  Please type 'en' or 'ar'."),
        }
    }
}

fn game_loop(
    app: &mut AppState,
    renderer: &mut Renderer,
    audio: &mut AudioSubsystem,
    config: &GameConfig,
) -> Result<(), GameError> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms);

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }
        let mut exit = false;
        for key in kb.presses.clone() {
            if handle_key(app, audio, key)? {
                exit = true;
                break;
            }
        }
        if exit {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick(Instant::now(), &*audio)?;
            last_tick = Instant::now();
        }

        renderer.render(app, audio.sound_on(), audio.music_on())?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn toggle_sound(app: &mut AppState, audio: &AudioSubsystem) {
    let on = audio.toggle_sound();
    audio.emit(AudioEvent::UiClick);
    app.flash(if on { "Sound effects: ON" } else { "Sound effects: OFF" });
}

fn toggle_music(app: &mut AppState, audio: &mut AudioSubsystem) {
    let on = audio.toggle_music();
    app.flash(if on { "Music: ON" } else { "Music: OFF" });
}

/// Returns true when the player asked to leave.
fn handle_key(app: &mut AppState, audio: &mut AudioSubsystem, key: KeyEvent) -> Result<bool, GameError> {
    let now = Instant::now();

    // ── Global keys ──
    match key.code {
        KeyCode::F(1) => {
            toggle_sound(app, audio);
            return Ok(false);
        }
        KeyCode::F(2) => {
            toggle_music(app, audio);
            return Ok(false);
        }
        _ => {}
    }
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return Ok(false);
    }

    match app.phase {
        Phase::Menu => match key.code {
            KeyCode::Esc | KeyCode::Char('0') => return Ok(true),
            KeyCode::Char('1') | KeyCode::Enter => app.start_round(now, &*audio)?,
            KeyCode::Char('2') => app.open(Phase::DifficultySelect, &*audio),
            KeyCode::Char('3') => app.open(Phase::Achievements, &*audio),
            KeyCode::Char('4') => app.open(Phase::Leaderboard, &*audio),
            KeyCode::Char('5') => {
                let today = chrono::Local::now().date_naive();
                app.start_daily(today, now, &*audio)?;
            }
            KeyCode::Char('6') => app.open(Phase::Stats, &*audio),
            KeyCode::Char('7') => toggle_sound(app, audio),
            KeyCode::Char('8') => toggle_music(app, audio),
            KeyCode::Char('9') => app.toggle_language(&*audio),
            _ => {}
        },

        Phase::DifficultySelect => match key.code {
            KeyCode::Char('e' | 'E' | '1') => app.set_difficulty(Difficulty::Easy, &*audio),
            KeyCode::Char('m' | 'M' | '2') => app.set_difficulty(Difficulty::Medium, &*audio),
            KeyCode::Char('h' | 'H' | '3') => app.set_difficulty(Difficulty::Hard, &*audio),
            KeyCode::Esc | KeyCode::Enter => app.back_to_menu(),
            _ => {}
        },

        Phase::Playing => match key.code {
            KeyCode::Esc => app.quit_round(now, &*audio)?,
            KeyCode::Tab => app.buy_hint(&*audio)?,
            KeyCode::Char(c) => app.guess(c, now, &*audio)?,
            _ => {}
        },

        Phase::RoundOver => match key.code {
            KeyCode::Char('1') => app.start_round(now, &*audio)?,
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => app.back_to_menu(),
            _ => {}
        },

        Phase::Achievements | Phase::Leaderboard | Phase::Stats => match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => app.back_to_menu(),
            _ => {}
        },
    }

    Ok(false)
}
