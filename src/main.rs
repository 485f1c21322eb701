mod display;

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use tracing_subscriber::EnvFilter;

use alien_intruders::collaborators::{DialogChoice, SilentAudio};
use alien_intruders::config::{GameConfig, DEFAULT_CONFIG_FILE};
use alien_intruders::game::{Flow, Game};
use alien_intruders::spaceship::ShipInput;
use alien_intruders::store::JsonStore;

use crate::display::TerminalView;

const LOG_FILE: &str = "alien-intruders.log";

/// A key counts as held if its last press/repeat arrived within this window.
/// Covers terminals that never send key-release events: OS key repeat is
/// ≥ 15 Hz, so a held key refreshes well before the window expires.
const HOLD_WINDOW: Duration = Duration::from_millis(150);

#[derive(Parser, Debug)]
#[command(name = "alien_intruders", about = "Defend the panel against the alien waves")]
struct Cli {
    /// Pilot name; progress and scores are kept per name
    #[arg(short, long)]
    name: Option<String>,

    /// TOML config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Seed for the random source (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Print the scoreboard and exit
    #[arg(long)]
    scores: bool,
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal belongs to the game, so logs go to a file in the data dir.
fn init_logging(data_dir: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))
        .with_context(|| format!("cannot open log file in {}", data_dir.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ── Held-key tracking ─────────────────────────────────────────────────────────

/// Turns raw key events into the ship's start/stop signals.
///
/// Each key maps to the instant it was last seen.  Terminals with keyboard
/// enhancement report releases and the key is dropped at once; classic
/// terminals only repeat presses and the key expires after [`HOLD_WINDOW`].
#[derive(Default)]
struct Controls {
    last_seen: HashMap<KeyCode, Instant>,
    left: bool,
    right: bool,
}

impl Controls {
    fn reset(&mut self) {
        *self = Controls::default();
    }

    /// Records a key event; returns `true` when it asks for a shot.
    fn record(&mut self, code: KeyCode, kind: KeyEventKind, now: Instant) -> bool {
        match kind {
            KeyEventKind::Press => {
                self.last_seen.insert(code, now);
                code == KeyCode::Char(' ')
            }
            KeyEventKind::Repeat => {
                self.last_seen.insert(code, now);
                false
            }
            KeyEventKind::Release => {
                self.last_seen.remove(&code);
                false
            }
        }
    }

    fn is_held(&self, keys: &[KeyCode], now: Instant) -> bool {
        keys.iter().any(|key| {
            self.last_seen
                .get(key)
                .is_some_and(|&seen| now.duration_since(seen) <= HOLD_WINDOW)
        })
    }

    /// Start/stop signals for every direction whose held state changed.
    ///
    /// Either stop halts the ship outright, so with both directions held,
    /// letting go of one stops it until the other is pressed again.
    fn transitions(&mut self, now: Instant) -> Vec<ShipInput> {
        let left = self.is_held(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')], now);
        let right = self.is_held(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')], now);
        let mut inputs = Vec::new();
        if left != self.left {
            inputs.push(if left { ShipInput::MoveLeftStart } else { ShipInput::MoveLeftStop });
        }
        if right != self.right {
            inputs.push(if right { ShipInput::MoveRightStart } else { ShipInput::MoveRightStop });
        }
        // A start pushes after any stop so the newest direction wins
        inputs.sort_by_key(|input| matches!(input, ShipInput::MoveLeftStart | ShipInput::MoveRightStart));
        self.left = left;
        self.right = right;
        inputs
    }
}

fn dialog_choice(code: KeyCode) -> Option<DialogChoice> {
    match code {
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Enter => Some(DialogChoice::PlayAgain),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(DialogChoice::MainMenu),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(DialogChoice::Exit),
        _ => None,
    }
}

fn is_interrupt(code: KeyCode, modifiers: KeyModifiers) -> bool {
    code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL)
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Play,
    Scoreboard,
    Quit,
}

fn show_menu<W: Write>(
    view: &mut TerminalView<W>,
    rx: &mpsc::Receiver<Event>,
    player_name: &str,
) -> anyhow::Result<MenuResult> {
    view.draw_menu(player_name)?;
    loop {
        let Ok(event) = rx.recv() else {
            return Ok(MenuResult::Quit);
        };
        if let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            modifiers,
            ..
        }) = event
        {
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Play),
                KeyCode::Char('s') | KeyCode::Char('S') => return Ok(MenuResult::Scoreboard),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(MenuResult::Quit),
                _ if is_interrupt(code, modifiers) => return Ok(MenuResult::Quit),
                _ => {}
            }
        }
    }
}

fn wait_for_key(rx: &mpsc::Receiver<Event>) {
    while let Ok(event) = rx.recv() {
        if matches!(event, Event::Key(KeyEvent { kind: KeyEventKind::Press, .. })) {
            return;
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Drives one run at the configured tick rate until the player leaves it.
fn game_loop<W: Write>(
    view: &mut TerminalView<W>,
    game: &mut Game,
    rx: &mpsc::Receiver<Event>,
    loop_delay: Duration,
) -> anyhow::Result<Flow> {
    let mut controls = Controls::default();
    game.start(view)?;

    loop {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(event) = rx.try_recv() {
            let Event::Key(KeyEvent {
                code, kind, modifiers, ..
            }) = event
            else {
                continue;
            };
            if is_interrupt(code, modifiers) {
                return Ok(Flow::Exit);
            }
            if let Some(dialog) = view.dialog() {
                if kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(choice) = dialog_choice(code) {
                    match game.choose(dialog, choice, view)? {
                        Flow::Continue => controls.reset(),
                        flow => return Ok(flow),
                    }
                }
                continue;
            }
            if code == KeyCode::Esc && kind == KeyEventKind::Press {
                tracing::info!("run abandoned from the keyboard");
                return Ok(Flow::MainMenu);
            }
            if controls.record(code, kind, frame_start) {
                game.handle_input(ShipInput::Fire);
            }
        }

        // ── Apply held-key transitions, then tick ─────────────────────────────
        if view.dialog().is_none() {
            for input in controls.transitions(frame_start) {
                game.handle_input(input);
            }
        }
        game.tick(view)?;
        view.take_error()?;

        let elapsed = frame_start.elapsed();
        if elapsed < loop_delay {
            thread::sleep(loop_delay - elapsed);
        }
    }
}

fn run<W: Write>(
    view: &mut TerminalView<W>,
    game: &mut Game,
    rx: &mpsc::Receiver<Event>,
    loop_delay: Duration,
) -> anyhow::Result<()> {
    loop {
        match show_menu(view, rx, game.player_name())? {
            MenuResult::Quit => break,
            MenuResult::Scoreboard => {
                let scores = game.scores().unwrap_or_else(|e| {
                    tracing::warn!("cannot read scoreboard: {e}");
                    Vec::new()
                });
                view.draw_scoreboard(&scores)?;
                wait_for_key(rx);
            }
            MenuResult::Play => {
                if game_loop(view, game, rx, loop_delay)? == Flow::Exit {
                    break;
                }
            }
        }
    }
    Ok(())
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn print_scores(store: &JsonStore) -> anyhow::Result<()> {
    use alien_intruders::collaborators::Persistence;

    let scores = store.list_scores()?;
    if scores.is_empty() {
        println!("No finished games yet.");
    }
    for line in display::scoreboard_lines(&scores) {
        println!("{line}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = GameConfig::from_file(&cli.config)
        .with_context(|| format!("invalid config file {}", cli.config.display()))?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let store = Arc::new(JsonStore::open(&config.data_dir).context("cannot open data directory")?);
    init_logging(&config.data_dir)?;

    if cli.scores {
        return print_scores(&store);
    }

    let waves = Arc::new(config.wave_table()?);
    let player_name = cli
        .name
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "player".to_string());
    let loop_delay = config.loop_delay();
    tracing::info!(player = %player_name, seed = ?config.seed, "alien intruders starting");

    let mut game = Game::new(config, store, waves, Arc::new(SilentAudio), player_name)?;

    let mut out = BufWriter::new(stdout());
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release events; terminals without the protocol fall back
    // to the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
        .is_ok();

    // Blocking event reads get their own thread so the tick loop never waits
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let mut view = TerminalView::new(out);
    let result = run(&mut view, &mut game, &rx, loop_delay);

    // Always restore the terminal
    let out = view.out();
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    if let Err(e) = &result {
        tracing::error!("game ended with an error: {e:#}");
    }
    result
}
