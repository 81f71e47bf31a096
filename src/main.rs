mod display;

use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use brawler::audio::AudioEvent;
use brawler::config::{ConfigError, GameConfig, Settings};
use brawler::input::Key;
use brawler::level::LevelData;
use brawler::world::World;

use display::TerminalCanvas;

/// Longest simulated step per frame; a stalled terminal must not make the
/// world jump ahead.
const MAX_FRAME_DELTA_MS: u64 = 250;

/// How long a sound caption stays on the hint line.
const CAPTION_MS: u128 = 1200;
const MAX_CAPTIONS: usize = 3;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

#[derive(Debug, Error)]
enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn game_key(code: &KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char('f') | KeyCode::Char('F') => Some(Key::Attack),
        KeyCode::Char('d') | KeyCode::Char('D') => Some(Key::Throw),
        _ => None,
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal belongs to the game, so log lines go to a file.
fn init_tracing(path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    settings: &mut Settings,
    settings_path: &Path,
) -> std::io::Result<MenuResult> {
    loop {
        draw_menu(out, settings.muted)?;

        // Block until the user makes a choice
        if let Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) = rx.recv() {
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
                KeyCode::Char('m') | KeyCode::Char('M') => {
                    settings.muted = !settings.muted;
                    save_settings(settings, settings_path);
                }
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

fn draw_menu<W: Write>(out: &mut W, muted: bool) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "⚔  ORC  BRAWLER  ⚔";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    let sound = if muted { "off" } else { "on" };
    let options: [(&str, String, Color); 3] = [
        ("Enter", "Start".to_string(), Color::Green),
        ("M", format!("Sound: {sound}"), Color::Yellow),
        ("Q", "Quit".to_string(), Color::Red),
    ];
    for (i, (key, label, color)) in options.iter().enumerate() {
        let row = cy.saturating_sub(3) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(10), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{key}] ")))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(label))?;
    }

    let legend: [(&str, Color, &str); 4] = [
        ("o", Color::Green, " Orc: touch hurts, one hit kills"),
        ("B", Color::Magenta, " Boss: waits at the end of the level"),
        ("$", Color::Yellow, " Coin"),
        ("!", Color::Cyan, " Throwing ammo (max 5)"),
    ];
    for (i, (sym, color, desc)) in legend.iter().enumerate() {
        out.queue(cursor::MoveTo(cx.saturating_sub(10), cy + 1 + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*sym))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(*desc))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(10), cy + 6))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("← → : Move   SPACE/↑ : Jump   F : Attack   D : Throw"))?;

    out.queue(style::ResetColor)?;
    out.flush()
}

fn save_settings(settings: &Settings, path: &Path) {
    if let Err(err) = settings.save(path) {
        warn!(error = %err, "settings_save_failed");
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Quit,
    Restart,
}

/// Input model: `key_frame` records the frame of the last press/repeat event
/// per key; every frame the still-fresh keys become the world's held flags.
/// A `Press` for a key that was not already held is also forwarded as a
/// press edge, so OS key repeat never retriggers an attack.
///
/// Terminals with keyboard enhancement send `Release` and drop keys at once;
/// classic terminals let keys expire after `HOLD_WINDOW` frames of silence.
fn game_loop<W: Write>(
    out: &mut W,
    world: &mut World,
    rx: &mpsc::Receiver<Event>,
    settings: &mut Settings,
    settings_path: &Path,
    frame_time: Duration,
) -> std::io::Result<LoopExit> {
    let (width, height) = terminal::size()?;
    let mut canvas = TerminalCanvas::new(width, height);
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut captions: VecDeque<(Instant, &'static str)> = VecDeque::new();
    let mut frame: u64 = 0;
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        let mut edges: Vec<Key> = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            let (code, kind, modifiers) = match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => (code, kind, modifiers),
                Event::Resize(w, h) => {
                    canvas.resize(w, h);
                    continue;
                }
                _ => continue,
            };
            match kind {
                KeyEventKind::Press => {
                    let fresh = !is_held(&key_frame, &code, frame);
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(LoopExit::Quit);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(LoopExit::Quit);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') if world.is_game_ending() => {
                            return Ok(LoopExit::Restart);
                        }
                        KeyCode::Char('m') | KeyCode::Char('M') => {
                            settings.muted = !settings.muted;
                            world.audio_mut().set_muted(settings.muted);
                            save_settings(settings, settings_path);
                        }
                        _ => {}
                    }
                    if fresh {
                        edges.extend(game_key(&code));
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Feed the world's keyboard ─────────────────────────────────────────
        if !world.is_game_ending() {
            let keyboard = world.keyboard_mut();
            for key in Key::ALL {
                let held = key_frame
                    .iter()
                    .any(|(code, &last)| game_key(code) == Some(key) && frame.saturating_sub(last) <= HOLD_WINDOW);
                keyboard.set_down(key, held);
            }
            for key in edges {
                keyboard.press(key);
            }
        }

        let elapsed = (last_tick.elapsed().as_millis() as u64).min(MAX_FRAME_DELTA_MS);
        last_tick = Instant::now();
        world.advance(elapsed);

        // ── Sound captions ────────────────────────────────────────────────────
        for event in world.audio_mut().drain() {
            match event {
                AudioEvent::Play { cue, .. } => captions.push_back((Instant::now(), display::cue_caption(cue))),
                AudioEvent::PauseAll => captions.clear(),
                AudioEvent::StartLoop(_) | AudioEvent::StopLoop(_) => {}
            }
        }
        captions.retain(|(at, _)| at.elapsed().as_millis() < CAPTION_MS);
        while captions.len() > MAX_CAPTIONS {
            captions.pop_front();
        }
        let shown: Vec<&str> = captions.iter().map(|&(_, text)| text).collect();

        // A frozen world stops rendering; the last frame stays on screen.
        world.render(&mut canvas);
        canvas.present(out, &shown, settings.muted)?;

        let spent = frame_start.elapsed();
        if spent < frame_time {
            std::thread::sleep(frame_time - spent);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    if let Err(err) = try_main() {
        error!(error = %err, "startup_failed");
        eprintln!("brawler: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), AppError> {
    let config = GameConfig::from_env()?;
    init_tracing(&config.log_path)?;
    let level = config.level()?;
    let settings_path = Settings::default_path();
    let settings = Settings::load(&settings_path).unwrap_or_else(|err| {
        warn!(error = %err, "settings_load_failed");
        Settings::default()
    });
    info!(seed = ?config.seed, frame_rate = config.frame_rate, "startup");

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, &config, &level, settings, settings_path);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result.map_err(AppError::from)
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &GameConfig,
    level: &LevelData,
    mut settings: Settings,
    settings_path: PathBuf,
) -> std::io::Result<()> {
    let frame_time = Duration::from_millis(config.frame_ms());
    let mut rng = config.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

    if let MenuResult::Quit = show_menu(out, rx, &mut settings, &settings_path)? {
        return Ok(());
    }
    loop {
        let mut world = World::new(level.clone(), StdRng::seed_from_u64(rng.gen()));
        world.audio_mut().set_muted(settings.muted);
        info!("game_started");

        match game_loop(out, &mut world, rx, &mut settings, &settings_path, frame_time)? {
            LoopExit::Quit => break,
            LoopExit::Restart => info!("game_restarted"),
        }
    }
    Ok(())
}
