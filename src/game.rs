/// Ties a [`Session`] to the rest of the game: background loading, the
/// intro, wave progression, the end-of-run dialog and saving.
///
/// `Game` lives on the tick thread.  The driver calls [`Game::tick`] at a
/// fixed rate, feeds keyboard signals to [`Game::handle_input`] and answers
/// dialogs with [`Game::choose`].

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::collaborators::{AudioSink, Dialog, DialogChoice, Persistence, Presentation, WaveCatalog};
use crate::config::GameConfig;
use crate::effects::EffectPlayer;
use crate::engine::{self, TickReport};
use crate::error::Result;
use crate::executor::{Executor, Spawner};
use crate::launch::{self, Notice, Notifier, SessionGate};
use crate::records::{now_secs, ScoreboardEntry};
use crate::session::{Phase, Session};
use crate::spaceship::ShipInput;

const EFFECT_QUEUE: usize = 32;
const TASK_QUEUE: usize = 8;

/// What the driver should do after a dialog has been answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// A new session is loading; keep ticking.
    Continue,
    MainMenu,
    Exit,
}

pub struct Game {
    // Spawner holders come first: an executor joins its worker on drop and
    // that only finishes once every spawner clone is gone.
    effects: EffectPlayer,
    tasks: Spawner,
    notices_tx: Sender<(u64, Notice)>,
    notices_rx: Receiver<(u64, Notice)>,
    /// Bumped whenever the current session is abandoned or replaced.
    generation: u64,
    config: GameConfig,
    store: Arc<dyn Persistence>,
    waves: Arc<dyn WaveCatalog>,
    player_name: String,
    rng: StdRng,
    gate: Option<SessionGate>,
    session: Option<Session>,
    flying_off: bool,
    _effect_executor: Executor,
    _task_executor: Executor,
}

impl Game {
    pub fn new(
        config: GameConfig,
        store: Arc<dyn Persistence>,
        waves: Arc<dyn WaveCatalog>,
        audio: Arc<dyn AudioSink>,
        player_name: impl Into<String>,
    ) -> Result<Self> {
        let effect_executor = Executor::spawn("effects", EFFECT_QUEUE)?;
        let task_executor = Executor::spawn("tasks", TASK_QUEUE)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (notices_tx, notices_rx) = mpsc::channel();
        Ok(Game {
            effects: EffectPlayer::new(effect_executor.spawner(), audio),
            tasks: task_executor.spawner(),
            notices_tx,
            notices_rx,
            generation: 0,
            config,
            store,
            waves,
            player_name: player_name.into(),
            rng,
            gate: None,
            session: None,
            flying_off: false,
            _effect_executor: effect_executor,
            _task_executor: task_executor,
        })
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub fn phase(&self) -> Phase {
        self.session.as_ref().map_or(Phase::NotInitialized, Session::phase)
    }

    pub fn is_flying_off(&self) -> bool {
        self.flying_off
    }

    /// Starts (or restarts) a run for the player: loads their progress in
    /// the background and clears whatever the presentation was showing.
    pub fn start(&mut self, presentation: &mut dyn Presentation) -> Result<()> {
        self.reset(presentation);
        let seed = self.rng.gen();
        self.gate = Some(launch::begin_session(
            &self.tasks,
            Arc::clone(&self.store),
            Arc::clone(&self.waves),
            self.player_name.clone(),
            self.config.rules(),
            seed,
            now_secs(),
        )?);
        tracing::info!(player = %self.player_name, "starting game");
        Ok(())
    }

    fn reset(&mut self, presentation: &mut dyn Presentation) {
        self.session = None;
        self.gate = None;
        self.flying_off = false;
        self.generation += 1;
        presentation.set_option_showing(false);
        presentation.set_victory_showing(false);
        presentation.clear_message();
    }

    /// Forwards a keyboard signal to the ship.  Ignored while loading.
    pub fn handle_input(&mut self, input: ShipInput) {
        if let Some(session) = self.session.as_mut() {
            session.handle_input(input, &mut self.effects);
        }
    }

    /// One step of the fixed-rate loop.  Returns the engine's report when a
    /// session was ticked.
    pub fn tick(&mut self, presentation: &mut dyn Presentation) -> Result<Option<TickReport>> {
        self.poll_gate(presentation)?;
        self.drain_notices(presentation)?;

        let mut report = None;
        if let Some(session) = self.session.as_mut() {
            let r = engine::tick(session, presentation, &mut self.effects, &mut self.rng);
            if r.victory_raised {
                let plan = launch::plan_victory(session.player_state(), self.waves.as_ref(), now_secs());
                launch::conclude_wave(
                    &self.tasks,
                    Arc::clone(&self.store),
                    self.effects.audio(),
                    plan,
                    self.config.intro_pause(),
                    Notifier::new(self.generation, self.notices_tx.clone()),
                )?;
            }
            report = Some(r);

            if self.flying_off {
                let ship = session.spaceship_mut();
                ship.climb();
                if ship.has_left_panel() {
                    self.flying_off = false;
                    presentation.set_option_showing(true);
                    presentation.show_option_dialog(Dialog::FinalVictory);
                }
            }
        }

        presentation.request_redraw(self.session.as_ref());
        Ok(report)
    }

    fn poll_gate(&mut self, presentation: &mut dyn Presentation) -> Result<()> {
        let Some(result) = self.gate.as_ref().and_then(SessionGate::poll) else {
            return Ok(());
        };
        self.gate = None;
        let session = result?;
        let wave = session.wave().wave;
        self.session = Some(session);
        presentation.clear_message();
        launch::play_intro(
            &self.tasks,
            self.effects.audio(),
            wave,
            self.config.intro_pause(),
            Notifier::new(self.generation, self.notices_tx.clone()),
        )
    }

    fn drain_notices(&mut self, presentation: &mut dyn Presentation) -> Result<()> {
        loop {
            let (generation, notice) = match self.notices_rx.try_recv() {
                Ok(stamped) => stamped,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return Ok(()),
            };
            if generation != self.generation {
                tracing::debug!(generation, current = self.generation, ?notice, "stale notice dropped");
                continue;
            }
            match notice {
                Notice::Message(text) => presentation.show_message(&text),
                Notice::ClearMessage => presentation.clear_message(),
                Notice::StartRunning => {
                    if let Some(session) = self.session.as_mut() {
                        session.set_running(true);
                        tracing::info!(wave = session.wave().wave, "wave started");
                    }
                }
                Notice::NextWave(state) => {
                    self.reset(presentation);
                    let seed = self.rng.gen();
                    self.gate = Some(launch::resume_session(&self.tasks, state, self.config.rules(), seed)?);
                }
                Notice::FlyOff => self.flying_off = true,
            }
        }
    }

    /// Answers the end-of-run dialog.  Every answer ends the run; only a
    /// defeat still needs saving, since a final victory was saved when it
    /// happened.
    pub fn choose(
        &mut self,
        dialog: Dialog,
        choice: DialogChoice,
        presentation: &mut dyn Presentation,
    ) -> Result<Flow> {
        if let Some(session) = self.session.as_mut() {
            session.set_running(false);
            let state = session.player_state_mut();
            state.terminated = true;
            let elapsed = state.time_played(now_secs());
            if dialog == Dialog::Defeat {
                let snapshot = state.clone();
                let store = Arc::clone(&self.store);
                if let Err(e) = launch::save_blocking(&self.tasks, store, snapshot, elapsed) {
                    tracing::error!("failed to save defeat: {e}");
                }
            }
        }
        presentation.set_option_showing(false);
        tracing::info!(?dialog, ?choice, "dialog answered");

        match choice {
            DialogChoice::PlayAgain => {
                self.start(presentation)?;
                Ok(Flow::Continue)
            }
            DialogChoice::MainMenu => {
                self.reset(presentation);
                Ok(Flow::MainMenu)
            }
            DialogChoice::Exit => Ok(Flow::Exit),
        }
    }

    pub fn scores(&self) -> Result<Vec<ScoreboardEntry>> {
        self.store.list_scores()
    }
}
