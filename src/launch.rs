/// Work that happens around a session rather than inside a tick: loading
/// the player's progress, the intro countdown, saving, and deciding what a
/// cleared wave leads to.
///
/// Anything slow runs on the task executor.  Results come back to the tick
/// thread either through a [`SessionGate`] or as [`Notice`]s, and only the
/// tick thread applies them to the session.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::collaborators::{AudioSink, Persistence, Sound, WaveCatalog};
use crate::error::{GameError, Result};
use crate::executor::Spawner;
use crate::records::{PlayerState, ScoreboardEntry};
use crate::session::{Rules, Session};

/// Messages from background work back to the tick thread.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    Message(String),
    ClearMessage,
    /// The intro has finished; the session may start running.
    StartRunning,
    /// The wave was cleared and saved; start a session at this state.
    NextWave(PlayerState),
    /// The last wave was cleared; fly the ship off the top of the panel.
    FlyOff,
}

/// Sends [`Notice`]s on behalf of one session.
///
/// Each game session has its own generation.  Notices carry it, and the tick
/// thread drops those from a session it has since abandoned.
#[derive(Clone, Debug)]
pub struct Notifier {
    generation: u64,
    tx: Sender<(u64, Notice)>,
}

impl Notifier {
    pub fn new(generation: u64, tx: Sender<(u64, Notice)>) -> Self {
        Notifier { generation, tx }
    }

    pub fn send(&self, notice: Notice) {
        // The game may be dropped while background work is still running
        if self.tx.send((self.generation, notice)).is_err() {
            tracing::debug!(generation = self.generation, "game is gone; notice dropped");
        }
    }
}

// ── Player state ─────────────────────────────────────────────────────────────

/// Decides where a player starts.
///
/// * never played → a fresh run at wave 1
/// * last run ended → reset to wave 1 with a zero score and a new start time
/// * run in progress → resume exactly where it was saved
pub fn resolve_player_state(
    stored: Option<PlayerState>,
    name: &str,
    waves: &dyn WaveCatalog,
    now: u64,
) -> Result<PlayerState> {
    let first_wave = || waves.find_wave(1).ok_or(GameError::UnknownWave(1));
    match stored {
        None => Ok(PlayerState::fresh(name, first_wave()?, now)),
        Some(mut state) if state.terminated => {
            state.player.last_game_started = now;
            state.terminated = false;
            state.score = 0;
            state.wave = first_wave()?;
            Ok(state)
        }
        Some(state) => Ok(state),
    }
}

/// Loads and resolves the player's state.  A storage failure is logged and
/// treated as a first game; the session carries on in memory.
pub fn load_player_state(
    store: &dyn Persistence,
    waves: &dyn WaveCatalog,
    name: &str,
    now: u64,
) -> Result<PlayerState> {
    let stored = match store.load_player_state(name) {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!(player = name, "failed to load player state: {e}");
            None
        }
    };
    resolve_player_state(stored, name, waves, now)
}

/// Saves the player's state and, once the run is over, their score.
pub fn save_records(store: &dyn Persistence, state: &PlayerState, game_time_elapsed: u64) -> Result<()> {
    store.save_player_state(state)?;
    if state.terminated {
        store.save_score(&ScoreboardEntry {
            player_name: state.player.name.clone(),
            score: state.score,
            game_time_elapsed,
        })?;
    }
    Ok(())
}

/// [`save_records`] on the task executor, returning only once the records
/// are written (or have failed to be).
pub fn save_blocking(
    tasks: &Spawner,
    store: Arc<dyn Persistence>,
    state: PlayerState,
    game_time_elapsed: u64,
) -> Result<()> {
    tasks.run_blocking(move || save_records(store.as_ref(), &state, game_time_elapsed))?
}

// ── Session bootstrap ────────────────────────────────────────────────────────

/// One-shot hand-off of a session built in the background.
pub struct SessionGate {
    rx: Receiver<Result<Session>>,
}

impl SessionGate {
    /// Non-blocking; `None` while the session is still being prepared.
    pub fn poll(&self) -> Option<Result<Session>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(GameError::WorkerGone)),
        }
    }

    pub fn wait(self) -> Result<Session> {
        self.rx.recv().map_err(|_| GameError::WorkerGone)?
    }
}

/// Loads `name`'s progress and lays out the roster on the task executor.
pub fn begin_session(
    tasks: &Spawner,
    store: Arc<dyn Persistence>,
    waves: Arc<dyn WaveCatalog>,
    name: String,
    rules: Rules,
    seed: u64,
    now: u64,
) -> Result<SessionGate> {
    let rx = tasks.submit(move || {
        let state = load_player_state(store.as_ref(), waves.as_ref(), &name, now)?;
        tracing::info!(
            player = %state.player.name,
            wave = state.wave.wave,
            score = state.score,
            "session loaded"
        );
        let mut rng = StdRng::seed_from_u64(seed);
        Ok(Session::new(state, rules, &mut rng))
    })?;
    Ok(SessionGate { rx })
}

/// Builds a session for an already-known state (the next wave).
pub fn resume_session(tasks: &Spawner, state: PlayerState, rules: Rules, seed: u64) -> Result<SessionGate> {
    let rx = tasks.submit(move || {
        let mut rng = StdRng::seed_from_u64(seed);
        Ok(Session::new(state, rules, &mut rng))
    })?;
    Ok(SessionGate { rx })
}

// ── Intro ────────────────────────────────────────────────────────────────────

/// "WAVE n" … "FIGHT!" then let the session run and start the music.
pub fn play_intro(
    tasks: &Spawner,
    audio: Arc<dyn AudioSink>,
    wave: u32,
    pause: Duration,
    notices: Notifier,
) -> Result<()> {
    tasks.submit(move || {
        audio.play(Sound::BuildUp);
        thread::sleep(pause);
        notices.send(Notice::Message(format!("WAVE {wave}")));
        thread::sleep(pause);
        notices.send(Notice::Message("FIGHT!".to_string()));
        thread::sleep(pause);
        notices.send(Notice::ClearMessage);
        notices.send(Notice::StartRunning);
        audio.play(Sound::Background);
    })?;
    Ok(())
}

// ── Victory ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum VictoryPlan {
    /// More waves remain; the state already points at the next one.
    NextWave(PlayerState),
    /// That was the last wave; the state is terminated.
    FinalVictory {
        state: PlayerState,
        game_time_elapsed: u64,
    },
}

pub fn plan_victory(state: &PlayerState, waves: &dyn WaveCatalog, now: u64) -> VictoryPlan {
    let current = state.wave.wave;
    if current < waves.count_waves() {
        if let Some(next) = waves.find_wave(current + 1) {
            tracing::info!(wave = current, "alien wave defeated; proceeding to the next wave");
            let mut state = state.clone();
            state.wave = next;
            return VictoryPlan::NextWave(state);
        }
        tracing::warn!(wave = current + 1, "next wave missing from catalog; ending the run");
    }
    tracing::info!("all alien waves have been defeated");
    let mut state = state.clone();
    state.terminated = true;
    VictoryPlan::FinalVictory {
        game_time_elapsed: state.time_played(now),
        state,
    }
}

/// Saves the outcome of a cleared wave and tells the tick thread what comes
/// next.
pub fn conclude_wave(
    tasks: &Spawner,
    store: Arc<dyn Persistence>,
    audio: Arc<dyn AudioSink>,
    plan: VictoryPlan,
    pause: Duration,
    notices: Notifier,
) -> Result<()> {
    tasks.submit(move || {
        audio.stop(Sound::Background);
        match plan {
            VictoryPlan::NextWave(state) => {
                match save_records(store.as_ref(), &state, 0) {
                    Ok(()) => tracing::info!("player status has been saved"),
                    Err(e) => tracing::error!("failed to save progress: {e}"),
                }
                thread::sleep(pause);
                notices.send(Notice::ClearMessage);
                notices.send(Notice::NextWave(state));
            }
            VictoryPlan::FinalVictory {
                state,
                game_time_elapsed,
            } => {
                match save_records(store.as_ref(), &state, game_time_elapsed) {
                    Ok(()) => tracing::info!("final victory saved"),
                    Err(e) => tracing::error!("failed to save final victory: {e}"),
                }
                notices.send(Notice::FlyOff);
                audio.play(Sound::Victory);
            }
        }
    })?;
    Ok(())
}
