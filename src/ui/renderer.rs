/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screens read `AppState` and the round's `RenderModel`; nothing here
/// mutates game state.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::achievements::ACHIEVEMENTS;
use crate::domain::difficulty::Difficulty;
use crate::domain::scoring::DAILY_BONUS;
use crate::sim::app::{AppState, Phase};
use crate::sim::round::{LossReason, RenderModel, RoundStatus, CRITICAL_SECONDS};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit background for every cell so gaps between rows match.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 4],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel used to invalidate the back buffer; never equal to a real cell.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    fn from_char(c: char, fg: Color, wide: bool) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.wide = wide;
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

/// Rough East Asian width: emoji and CJK take two columns.
fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x231A..=0x231B
        | 0x23E9..=0x23EC | 0x23F0 | 0x23F3
        | 0x26A1 | 0x2705 | 0x2728 | 0x274C | 0x2B50
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFF00..=0xFF60
        | 0x1F300..=0x1F64F
        | 0x1F680..=0x1F6FF
        | 0x1F900..=0x1F9FF)
}

/// Zero-width joiners and variation selectors are dropped when drawing.
fn is_zero_width(c: char) -> bool {
    matches!(c as u32, 0x200D | 0xFE00..=0xFE0F | 0x0610..=0x061A | 0x064B..=0x065F)
}

/// Terminal columns `s` will occupy.
fn display_width(s: &str) -> usize {
    s.chars()
        .filter(|c| !is_zero_width(*c))
        .map(|c| if is_wide(c) { 2 } else { 1 })
        .sum()
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Returns the column after the last char.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) -> usize {
        let mut cx = x;
        for ch in s.chars().filter(|c| !is_zero_width(*c)) {
            if is_wide(ch) {
                if cx + 1 >= self.width { break; }
                self.set(cx, y, Cell::from_char(ch, fg, true));
                self.set(cx + 1, y, Cell::WIDE_CONT);
                cx += 2;
            } else {
                if cx >= self.width { break; }
                self.set(cx, y, Cell::from_char(ch, fg, false));
                cx += 1;
            }
        }
        cx
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let x = self.width.saturating_sub(display_width(s)) / 2;
        self.put_str(x, y, s, fg);
    }
}

// ── Pure helpers ──

/// Gallows drawing stage 0..=6, rounded up so the first mistake shows.
pub fn gallows_stage(mistakes: u32, max_mistakes: u32) -> usize {
    if max_mistakes == 0 {
        return 0;
    }
    let stage = (mistakes * 6 + max_mistakes - 1) / max_mistakes;
    stage.min(6) as usize
}

pub fn gallows_lines(stage: usize) -> [String; 7] {
    let part = |n: usize, c: char| if stage >= n { c } else { ' ' };
    [
        "  +---+".to_string(),
        "  |   |".to_string(),
        format!("  {}   |", part(1, 'O')),
        format!(" {}{}{}  |", part(3, '/'), part(2, '|'), part(4, '\\')),
        format!(" {} {}  |", part(5, '/'), part(6, '\\')),
        "      |".to_string(),
        "=========".to_string(),
    ]
}

/// Filled and empty halves of a progress bar.
fn bar(ratio: f64, width: usize) -> (String, String) {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64) as usize).min(width);
    ("█".repeat(filled), "░".repeat(width - filled))
}

fn ratio_color(ratio: f64) -> Color {
    if ratio > 0.5 {
        Color::Green
    } else if ratio > 0.25 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn danger_color(mistakes: u32, max: u32) -> Color {
    if max == 0 || mistakes == 0 {
        return Color::Green;
    }
    let r = mistakes as f64 / max as f64;
    if r < 0.5 {
        Color::Yellow
    } else if r < 0.84 {
        Color::Magenta
    } else {
        Color::Red
    }
}

pub fn fmt_seconds(secs: f64) -> String {
    if secs >= 60.0 {
        format!("{}m {:02}s", (secs / 60.0) as u64, (secs % 60.0) as u64)
    } else {
        format!("{secs:.1}s")
    }
}

fn on_off(flag: bool) -> (&'static str, Color) {
    if flag { ("ON", Color::Green) } else { ("OFF", Color::Red) }
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const BODY_ROW: usize = 2;
const LEFT: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, app: &AppState, sound_on: bool, music_on: bool) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clear for clean transition
        if self.last_phase != Some(app.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(app.phase);
        }

        self.front.clear();
        self.compose_hud(app, sound_on, music_on);

        match app.phase {
            Phase::Menu => self.compose_menu(app, sound_on, music_on),
            Phase::DifficultySelect => self.compose_difficulty(app),
            Phase::Playing => {
                if let Some(round) = &app.round {
                    self.compose_round(&round.render_model(), app.anim_tick);
                }
            }
            Phase::RoundOver => self.compose_round_over(app),
            Phase::Achievements => self.compose_achievements(app),
            Phase::Leaderboard => self.compose_leaderboard(app),
            Phase::Stats => self.compose_stats(app),
        }

        self.compose_footer(app);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Shared chrome ──

    fn compose_hud(&mut self, app: &AppState, sound_on: bool, music_on: bool) {
        let p = &app.session.profile;
        let f = &mut self.front;
        let mut x = f.put_str(LEFT, HUD_ROW, "HANGMAN", Color::Yellow) + 2;
        x = f.put_str(x, HUD_ROW, &app.session.username, Color::Cyan) + 2;
        x = f.put_str(x, HUD_ROW, &format!("{} pts", p.points), Color::Yellow) + 2;
        x = f.put_str(x, HUD_ROW, &format!("W {}", p.wins), Color::Green) + 1;
        x = f.put_str(x, HUD_ROW, &format!("L {}", p.losses), Color::Red) + 1;
        x = f.put_str(x, HUD_ROW, &format!("streak {}", p.current_streak), Color::Magenta) + 3;

        let (s, sc) = on_off(sound_on);
        let (m, mc) = on_off(music_on);
        x = f.put_str(x, HUD_ROW, "sound ", Color::DarkGrey);
        x = f.put_str(x, HUD_ROW, s, sc) + 1;
        x = f.put_str(x, HUD_ROW, "music ", Color::DarkGrey);
        f.put_str(x, HUD_ROW, m, mc);

        let rule = "─".repeat(f.width.saturating_sub(2));
        f.put_str(1, HUD_ROW + 1, &rule, Color::DarkGrey);
    }

    fn compose_footer(&mut self, app: &AppState) {
        let h = self.front.height;
        if h < 3 {
            return;
        }
        let help = match app.phase {
            Phase::Menu => "[1-9] choose  [0/Esc] exit  [F1] sound  [F2] music",
            Phase::DifficultySelect => "[E/M/H] choose  [Esc] back",
            Phase::Playing => "[letter] guess  [Tab] hint  [Esc] give up  [F1] sound  [F2] music",
            Phase::RoundOver => "[Enter] menu  [1] play again",
            Phase::Achievements | Phase::Leaderboard | Phase::Stats => "[Esc/Enter] back",
        };
        self.front.put_str(LEFT, h - 1, help, Color::DarkGrey);
        if !app.message.is_empty() {
            self.front.put_str(LEFT, h - 2, &app.message, Color::Yellow);
        }
    }

    // ── Menu ──

    fn compose_menu(&mut self, app: &AppState, sound_on: bool, music_on: bool) {
        let f = &mut self.front;
        let banner = [
            "█ █ ▄▀█ █▄ █ █▀▀ █▀▄▀█ ▄▀█ █▄ █",
            "█▀█ █▀█ █ ▀█ █▄█ █ ▀ █ █▀█ █ ▀█",
        ];
        f.put_centered(BODY_ROW + 1, banner[0], Color::Yellow);
        f.put_centered(BODY_ROW + 2, banner[1], Color::DarkYellow);
        f.put_centered(BODY_ROW + 3, "Word Guessing Game", Color::Cyan);

        let (s, sc) = on_off(sound_on);
        let (m, mc) = on_off(music_on);
        let items: [(&str, String, Color, Option<(&str, Color)>); 10] = [
            ("1", "Start Game".into(), Color::Green, None),
            ("2", format!("Difficulty ({})", app.difficulty.name()), Color::Cyan, None),
            ("3", "Achievements".into(), Color::Yellow, None),
            ("4", "Leaderboard".into(), Color::Magenta, None),
            ("5", "Daily Challenge".into(), Color::Blue, None),
            ("6", "Statistics".into(), Color::DarkCyan, None),
            ("7", "Sound".into(), Color::DarkCyan, Some((s, sc))),
            ("8", "Music".into(), Color::DarkCyan, Some((m, mc))),
            ("9", format!("Language ({})", app.language.display_name()), Color::White, None),
            ("0", "Exit".into(), Color::DarkGrey, None),
        ];

        let top = BODY_ROW + 5;
        let x0 = f.width.saturating_sub(30) / 2;
        for (i, (key, label, color, flag)) in items.iter().enumerate() {
            let y = top + i;
            let mut x = f.put_str(x0, y, &format!("[{key}]"), Color::DarkGrey) + 2;
            x = f.put_str(x, y, label, *color) + 1;
            if let Some((text, c)) = flag {
                f.put_str(x, y, text, *c);
            }
        }
    }

    fn compose_difficulty(&mut self, app: &AppState) {
        let f = &mut self.front;
        f.put_str(LEFT, BODY_ROW + 1, "Choose difficulty", Color::Cyan);
        for (i, d) in Difficulty::ALL.into_iter().enumerate() {
            let cfg = d.config();
            let y = BODY_ROW + 3 + i * 2;
            let color = if d == app.difficulty { Color::Green } else { Color::White };
            let marker = if d == app.difficulty { ">" } else { " " };
            let key = d.name().chars().next().unwrap_or(' ').to_ascii_uppercase();
            let line = format!(
                "{marker} [{key}] {:<8} mistakes {:<2} time {:>3}s  x{:.1} points  hint {} pts",
                d.name(),
                cfg.max_mistakes,
                cfg.time_limit_seconds,
                cfg.score_multiplier,
                cfg.hint_cost,
            );
            f.put_str(LEFT, y, &line, color);
        }
    }

    // ── Round ──

    fn compose_round(&mut self, m: &RenderModel, anim_tick: u32) {
        let f = &mut self.front;
        let cfg = &m.difficulty;
        let mut y = BODY_ROW;

        let mut x = f.put_str(LEFT, y, "Category: ", Color::DarkGrey);
        x = f.put_str(x, y, &m.state.category, Color::Cyan) + 3;
        x = f.put_str(x, y, m.language.display_name(), Color::White) + 3;
        if m.daily {
            f.put_str(x, y, &format!("DAILY +{DAILY_BONUS}"), Color::Blue);
        }
        y += 2;

        // Gallows on the left, word and bars on the right
        let stage = gallows_stage(m.state.mistake_count, cfg.max_mistakes);
        let gcolor = danger_color(m.state.mistake_count, cfg.max_mistakes);
        for (i, line) in gallows_lines(stage).iter().enumerate() {
            f.put_str(LEFT, y + i, line, gcolor);
        }

        let rx = LEFT + 14;
        let slots = m.word_slots();
        let mut top = String::new();
        let mut mid = Vec::new();
        let mut bot = String::new();
        for (ch, slot) in m.state.target_word.chars().zip(&slots) {
            if ch == ' ' {
                top.push_str("   ");
                bot.push_str("   ");
                mid.push((None, Color::White));
                continue;
            }
            top.push_str("┌─┐");
            bot.push_str("└─┘");
            let color = match slot {
                Some(c) if m.state.correct_letters.contains(c) => Color::Green,
                Some(c) if c.is_alphabetic() => Color::Red,
                Some(_) => Color::White,
                None => Color::DarkGrey,
            };
            mid.push((Some(*slot), color));
        }
        f.put_str(rx, y, &top, Color::DarkGrey);
        let mut cx = rx;
        for (slot, color) in &mid {
            match slot {
                None => cx += 3,
                Some(inner) => {
                    let c = inner.map_or(' ', |c| c.to_uppercase().next().unwrap_or(c));
                    f.put_str(cx, y + 1, "│", Color::DarkGrey);
                    f.put_str(cx + 1, y + 1, &c.to_string(), *color);
                    f.put_str(cx + 2, y + 1, "│", Color::DarkGrey);
                    cx += 3;
                }
            }
        }
        f.put_str(rx, y + 2, &bot, Color::DarkGrey);

        // Time bar
        let limit = cfg.time_limit_seconds.max(1);
        let tr = m.remaining_seconds as f64 / limit as f64;
        let tcolor = ratio_color(tr);
        let blink_off = m.remaining_seconds <= CRITICAL_SECONDS && anim_tick % 10 >= 5;
        let (filled, empty) = bar(tr, 30);
        let mut x = f.put_str(rx, y + 4, "Time     ", Color::DarkGrey);
        x = f.put_str(x, y + 4, &filled, tcolor);
        x = f.put_str(x, y + 4, &empty, Color::DarkGrey) + 1;
        if !blink_off {
            f.put_str(x, y + 4, &format!("{:>3}s", m.remaining_seconds), tcolor);
        }

        // Mistake bar
        let mr = m.state.mistake_count as f64 / cfg.max_mistakes.max(1) as f64;
        let (filled, empty) = bar(mr, 30);
        let mut x = f.put_str(rx, y + 5, "Mistakes ", Color::DarkGrey);
        x = f.put_str(x, y + 5, &filled, gcolor);
        x = f.put_str(x, y + 5, &empty, Color::DarkGrey) + 1;
        f.put_str(x, y + 5, &format!("{}/{}", m.state.mistake_count, cfg.max_mistakes), gcolor);

        let (found, total) = m.letters_found();
        let x = f.put_str(rx, y + 6, &format!("Letters {found}/{total}"), Color::DarkGrey) + 3;
        if m.state.combo_count >= 2 {
            f.put_str(x, y + 6, &format!("Combo x{}", m.state.combo_count), Color::Magenta);
        }
        y += 8;

        // Hint line
        if m.state.hint_used {
            let x = f.put_str(LEFT, y, "Hint: ", Color::DarkGrey);
            f.put_str(x, y, &m.state.hint_text, Color::Yellow);
        } else {
            f.put_str(LEFT, y, &format!("Hint [Tab]  {} pts", cfg.hint_cost), Color::DarkGrey);
        }
        y += 1;

        if !m.state.wrong_letters.is_empty() {
            let wrong: Vec<String> = m.state.wrong_letters.iter().map(|c| c.to_string()).collect();
            let x = f.put_str(LEFT, y, "Wrong: ", Color::DarkGrey);
            f.put_str(x, y, &wrong.join(" "), Color::Red);
        }
        y += 2;

        // Keyboard
        for row in m.language.keyboard_rows() {
            let mut x = LEFT;
            for ch in row.chars() {
                let (text, color) = if m.state.wrong_letters.contains(&ch) {
                    (format!("[{ch}]"), Color::Red)
                } else if m.state.correct_letters.contains(&ch) {
                    (format!("[{ch}]"), Color::Green)
                } else {
                    (format!(" {ch} "), Color::White)
                };
                f.put_str(x, y, &text, color);
                x += 4;
            }
            y += 1;
        }
    }

    fn compose_round_over(&mut self, app: &AppState) {
        let Some(s) = &app.summary else { return };
        let f = &mut self.front;
        let mut y = BODY_ROW + 1;

        match s.status {
            RoundStatus::Won => {
                f.put_centered(y, "YOU WIN!", Color::Green);
            }
            RoundStatus::Lost(reason) => {
                let why = match reason {
                    LossReason::Mistakes => "Out of guesses",
                    LossReason::Timeout => "Time's up",
                    LossReason::Abandoned => "Round abandoned",
                };
                f.put_centered(y, why, Color::Red);
            }
            RoundStatus::Active => {}
        }
        y += 2;
        f.put_centered(y, &format!("The word was: {}", s.word.to_uppercase()), Color::White);
        y += 2;

        let x0 = f.width.saturating_sub(34) / 2;
        let rows: Vec<(&str, String)> = if s.status == RoundStatus::Won {
            let mut rows = vec![
                ("Base", format!("+{}", s.reward.base)),
                ("Time bonus", format!("+{}", s.reward.time_bonus)),
                ("Combo bonus", format!("+{}", s.reward.combo_bonus)),
            ];
            if s.daily {
                rows.push(("Daily bonus", format!("+{}", s.reward.daily_bonus)));
            }
            rows.push(("Total", format!("+{}", s.reward.total())));
            rows
        } else {
            vec![("Points", "+0".to_string())]
        };
        for (label, value) in rows {
            f.put_str(x0, y, &format!("{label:<16}{value:>8}"), Color::Yellow);
            y += 1;
        }
        y += 1;
        f.put_str(x0, y, &format!("Time            {:>8}", fmt_seconds(s.elapsed_seconds)), Color::White);
        f.put_str(x0, y + 1, &format!("Mistakes        {:>8}", s.mistakes), Color::White);
        y += 3;

        for a in &s.unlocked {
            let x = f.put_str(x0, y, a.icon, Color::White) + 1;
            let x = f.put_str(x, y, a.name, Color::Yellow) + 2;
            f.put_str(x, y, a.description, Color::DarkGrey);
            y += 1;
        }
    }

    // ── Info screens ──

    fn compose_achievements(&mut self, app: &AppState) {
        let unlocked = &app.session.profile.unlocked_achievements;
        let f = &mut self.front;
        f.put_str(LEFT, BODY_ROW, &format!("Achievements  {}/{}", unlocked.len(), ACHIEVEMENTS.len()), Color::Yellow);
        for (i, a) in ACHIEVEMENTS.iter().enumerate() {
            let y = BODY_ROW + 2 + i;
            let have = unlocked.contains(a.id);
            let (mark, color) = if have { ("[x]", Color::Green) } else { ("[ ]", Color::DarkGrey) };
            let mut x = f.put_str(LEFT, y, mark, color) + 1;
            x = f.put_str(x, y, if have { a.icon } else { "··" }, Color::White) + 1;
            x = f.put_str(x, y, &format!("{:<14}", a.name), if have { Color::Yellow } else { Color::DarkGrey });
            f.put_str(x, y, a.description, Color::DarkGrey);
        }
    }

    fn compose_leaderboard(&mut self, app: &AppState) {
        let f = &mut self.front;
        f.put_str(LEFT, BODY_ROW, "Leaderboard", Color::Magenta);
        f.put_str(LEFT, BODY_ROW + 2, &format!("{:<5}{:<22}{:>7}{:>6}{:>6}", "#", "Player", "Points", "W", "L"), Color::DarkGrey);
        if app.leaderboard.is_empty() {
            f.put_str(LEFT, BODY_ROW + 3, "No players yet", Color::DarkGrey);
        }
        for (i, (name, p)) in app.leaderboard.iter().enumerate() {
            let color = match i {
                0 => Color::Yellow,
                1 => Color::White,
                2 => Color::DarkYellow,
                _ if *name == app.session.username => Color::Cyan,
                _ => Color::Grey,
            };
            let short: String = name.chars().take(20).collect();
            let line = format!("{:<5}{:<22}{:>7}{:>6}{:>6}", i + 1, short, p.points, p.wins, p.losses);
            f.put_str(LEFT, BODY_ROW + 3 + i, &line, color);
        }
    }

    fn compose_stats(&mut self, app: &AppState) {
        let p = &app.session.profile;
        let f = &mut self.front;
        f.put_str(LEFT, BODY_ROW, &format!("Statistics for {}", app.session.username), Color::Cyan);

        let pct = p.win_rate().map_or("-".to_string(), |r| format!("{:.0}%", r * 100.0));
        let best = p.best_win_time_seconds.map_or("-".to_string(), fmt_seconds);
        let avg = p.average_time_seconds().map_or("-".to_string(), fmt_seconds);
        let mut rows = vec![
            ("Points", p.points.to_string()),
            ("Games", p.total_games.to_string()),
            ("Wins", p.wins.to_string()),
            ("Losses", p.losses.to_string()),
            ("Win rate", pct),
            ("Current streak", p.current_streak.to_string()),
            ("Best streak", p.best_streak.to_string()),
            ("Fastest win", best),
            ("Average round", avg),
            ("Wins without hints", p.hint_free_wins.to_string()),
        ];
        for (lang, wins) in &p.wins_by_language {
            rows.push((lang.display_name(), format!("{wins} wins")));
        }
        for (i, (label, value)) in rows.iter().enumerate() {
            let y = BODY_ROW + 2 + i;
            let x = f.put_str(LEFT, y, &format!("{label:<22}"), Color::DarkGrey);
            f.put_str(x, y, value, Color::White);
        }

        if let Some(rate) = p.win_rate() {
            let y = BODY_ROW + 3 + rows.len();
            let (filled, empty) = bar(rate, 30);
            let x = f.put_str(LEFT, y, &filled, ratio_color(rate));
            f.put_str(x, y, &empty, Color::DarkGrey);
        }
    }
}
