mod display;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    style::Print,
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pumpkin_maze::config::GameConfig;
use pumpkin_maze::game::Game;
use pumpkin_maze::grid::Grid;
use pumpkin_maze::hud::Hud;
use pumpkin_maze::movement::Action;
use pumpkin_maze::sound::{LogSound, SoundSink};
use pumpkin_maze::surface::Framebuffer;

use display::{Panel, PanelSink};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// OS key-repeat keeps refreshing the key while it is physically down.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

/// Keys bound to each held action.
const BINDINGS: &[(Action, &[KeyCode])] = &[
    (Action::TurnLeft, &[KeyCode::Left]),
    (Action::TurnRight, &[KeyCode::Right]),
    (Action::Forward, &[KeyCode::Up]),
    (Action::Back, &[KeyCode::Down]),
    (Action::ToggleSound, &[KeyCode::Char('s'), KeyCode::Char('S')]),
    (Action::ToggleAmbient, &[KeyCode::Char('a'), KeyCode::Char('A')]),
];

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "pumpkin_maze", about = "Halloween raycasting maze in the terminal")]
struct Args {
    /// Map file (comma separated cell codes, one row per line)
    #[arg(long)]
    map: Option<PathBuf>,

    /// TOML file overriding the default rules
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for pumpkin and guide placement
    #[arg(long)]
    seed: Option<u64>,

    /// Run without the sound port
    #[arg(long)]
    no_sound: bool,

    /// Write logs to this file (the terminal belongs to the game)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn invalid(what: &str, path: Option<&Path>, err: impl std::fmt::Display) -> std::io::Error {
    let source = path.map_or_else(|| "built-in".to_string(), |p| p.display().to_string());
    std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("{what} ({source}): {err}"),
    )
}

fn load(args: &Args) -> std::io::Result<(GameConfig, Grid)> {
    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .map_err(|err| invalid("config", Some(path.as_path()), err))?,
        None => GameConfig::default(),
    };
    let grid = match &args.map {
        Some(path) => Grid::load(path),
        None => Grid::builtin(),
    }
    .map_err(|err| invalid("map", args.map.as_deref(), err))?;
    info!(
        map = ?args.map,
        config = ?args.config,
        width = grid.width(),
        height = grid.height(),
        "loaded"
    );
    Ok((config, grid))
}

// ── Title ─────────────────────────────────────────────────────────────────────

enum TitleResult {
    Start,
    Quit,
}

fn show_title<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<TitleResult> {
    let (cols, rows) = terminal::size()?;
    display::draw_title(out, cols, rows)?;

    // Block until the user makes a choice
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            })) => match code {
                KeyCode::Enter => return Ok(TitleResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(TitleResult::Quit);
                }
                _ => {}
            },
            Ok(Event::Resize(cols, rows)) => display::draw_title(out, cols, rows)?,
            Ok(_) => {}
            Err(_) => return Ok(TitleResult::Quit),
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Quit,
    Restart,
}

/// Everything one session needs from the outside.
struct Session {
    game: Game,
    panel: Rc<RefCell<Panel>>,
    bell: Option<Arc<AtomicBool>>,
}

fn new_session(config: &GameConfig, grid: &Grid, no_sound: bool, rng: &mut StdRng) -> Session {
    let panel = Rc::new(RefCell::new(Panel::default()));
    let hud = Hud::new(Box::new(PanelSink(Rc::clone(&panel))));

    let (sound, bell) = if no_sound {
        (SoundSink::none(), None)
    } else {
        let port = LogSound::new();
        let bell = port.bell_handle();
        (SoundSink::new(Box::new(port)), Some(bell))
    };

    let game = Game::new(grid.clone(), config, sound, hud, rng, 0);
    Session { game, panel, bell }
}

/// Input model as in any held-key terminal game: a `key_frame` map records
/// the frame of the last press/repeat event per key, and every frame each
/// action is held while one of its keys is still fresh.  Terminals with
/// keyboard enhancement send releases, which drop the key at once.
fn game_loop<W: Write>(
    out: &mut W,
    session: &mut Session,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<LoopExit> {
    let (mut cols, mut rows) = terminal::size()?;
    let (w, h) = display::view_size(cols, rows);
    let mut fb = Framebuffer::new(w, h);
    session.game.resize(w, h);
    display::clear(out)?;

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let clock = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending events (non-blocking) ───────────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => match kind {
                    KeyEventKind::Press => {
                        key_frame.insert(code, frame);
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(LoopExit::Quit);
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(LoopExit::Quit);
                            }
                            KeyCode::Char('r') | KeyCode::Char('R')
                                if session.game.phase().is_terminal() =>
                            {
                                return Ok(LoopExit::Restart);
                            }
                            _ => {}
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_frame.insert(code, frame);
                    }
                    KeyEventKind::Release => {
                        key_frame.remove(&code);
                    }
                },
                Event::FocusLost => {
                    key_frame.clear();
                    session.game.keys_mut().release_all();
                }
                Event::Resize(new_cols, new_rows) => {
                    (cols, rows) = (new_cols, new_rows);
                    let (w, h) = display::view_size(cols, rows);
                    fb.resize(w, h);
                    session.game.resize(w, h);
                    display::clear(out)?;
                    info!(cols, rows, "terminal resized");
                }
                _ => {}
            }
        }

        // ── Held-key state for this frame ─────────────────────────────────────
        let keys = session.game.keys_mut();
        for (action, codes) in BINDINGS {
            let held = codes.iter().any(|code| is_held(&key_frame, code, frame));
            keys.set(*action, held);
        }

        let now = clock.elapsed().as_millis() as u64;
        if session.game.frame(now, &mut fb) {
            let ended = session.game.phase().is_terminal();
            let panel = session.panel.borrow();
            if let Err(err) = display::draw_frame(out, &fb, &panel, cols, rows, ended) {
                warn!(%err, "frame dropped");
            }
        }

        if let Some(bell) = &session.bell {
            if bell.swap(false, Ordering::Relaxed) {
                out.queue(Print('\x07'))?;
                out.flush()?;
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    // Load before touching the terminal so errors print normally.
    let (config, grid) = load(&args)?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    // Focus events let held keys be dropped when the window loses focus.
    let focus_reported = out.execute(EnableFocusChange).is_ok();

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

    let result = run(&mut out, &rx, &args, &config, &grid);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    if focus_reported {
        let _ = out.execute(DisableFocusChange);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    args: &Args,
    config: &GameConfig,
    grid: &Grid,
) -> std::io::Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if let TitleResult::Quit = show_title(out, rx)? {
        return Ok(());
    }

    loop {
        let mut session = new_session(config, grid, args.no_sound, &mut rng);
        match game_loop(out, &mut session, rx)? {
            LoopExit::Quit => break,
            LoopExit::Restart => info!("restarting"),
        }
    }
    Ok(())
}
