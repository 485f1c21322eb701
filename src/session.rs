/// One player's battle against one wave: the ship, the roster, the score
/// and the explosions still on screen.
///
/// A `Session` is owned by whoever drives the tick loop and handed by
/// reference to everything that needs it.  Building one lays out the roster,
/// so a session that exists is always initialized.

use rand::Rng;

use crate::effects::{self, EffectSink};
use crate::entities::{Explosion, Sprite};
use crate::formation::Formation;
use crate::geometry::Panel;
use crate::records::PlayerState;
use crate::spaceship::{ShipInput, Spaceship};
use crate::waves::WaveDefinition;

/// Fixed parameters of the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rules {
    pub panel: Panel,
    /// Milliseconds between ticks.
    pub tick_ms: i32,
    /// Ceiling of the random delay between alien launches, in milliseconds.
    pub activation_time_limit: i32,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            panel: Panel::default(),
            tick_ms: 17,
            activation_time_limit: crate::alien::DEFAULT_ACTIVATION_TIME_LIMIT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No session yet; the player's progress is still loading.  Only a
    /// [`crate::game::Game`] reports this.
    NotInitialized,
    /// Roster in place, waiting for the intro to finish.
    Initialized,
    Running,
    /// The ship is dead.
    Defeated,
    /// Every alien is dead, the ship survived and no missile is airborne.
    Cleared,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub(crate) rules: Rules,
    pub(crate) player_state: PlayerState,
    pub(crate) spaceship: Spaceship,
    pub(crate) formation: Formation,
    running: bool,
    explosions: Vec<Explosion>,
    ticks: u64,
}

impl Session {
    /// Builds the ship and the roster for the player's current wave.
    pub fn new(player_state: PlayerState, rules: Rules, rng: &mut impl Rng) -> Self {
        let formation = Formation::build(&player_state.wave, rules.activation_time_limit, rng);
        let spaceship = Spaceship::new(&rules.panel);
        Session::with_actors(player_state, rules, spaceship, formation)
    }

    /// A session around a hand-placed ship and roster.
    pub fn with_actors(
        player_state: PlayerState,
        rules: Rules,
        spaceship: Spaceship,
        formation: Formation,
    ) -> Self {
        Session {
            rules,
            player_state,
            spaceship,
            formation,
            running: false,
            explosions: Vec::new(),
            ticks: 0,
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn panel(&self) -> &Panel {
        &self.rules.panel
    }

    pub fn player_state(&self) -> &PlayerState {
        &self.player_state
    }

    pub fn player_state_mut(&mut self) -> &mut PlayerState {
        &mut self.player_state
    }

    pub fn into_player_state(self) -> PlayerState {
        self.player_state
    }

    pub fn wave(&self) -> &WaveDefinition {
        &self.player_state.wave
    }

    pub fn score(&self) -> u32 {
        self.player_state.score
    }

    pub(crate) fn award(&mut self, points: u32) {
        self.player_state.score = self.player_state.score.saturating_add(points);
    }

    pub fn spaceship(&self) -> &Spaceship {
        &self.spaceship
    }

    pub fn spaceship_mut(&mut self) -> &mut Spaceship {
        &mut self.spaceship
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn formation_mut(&mut self) -> &mut Formation {
        &mut self.formation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub(crate) fn count_tick(&mut self) {
        self.ticks += 1;
    }

    pub fn phase(&self) -> Phase {
        if self.spaceship.is_dead() {
            Phase::Defeated
        } else if self.formation.all_dead() && !self.formation.any_missile_in_flight() {
            Phase::Cleared
        } else if self.running {
            Phase::Running
        } else {
            Phase::Initialized
        }
    }

    /// Routes an input signal to the ship, playing the laser cue on a shot.
    pub fn handle_input(&mut self, input: ShipInput, effects: &mut dyn EffectSink) {
        if self.spaceship.handle_input(input, self.running) {
            effects.dispatch(effects::laser_shot());
        }
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    /// Queues one explosion for every alien that died since the last call,
    /// and one for the ship if it has just been destroyed.
    pub fn collect_explosions(&mut self) {
        for id in self.formation.drain_fallen() {
            if let Some(alien) = self.formation.get(id) {
                self.explosions.push(Explosion::at(alien.body()));
            }
        }
        if self.spaceship.take_explosion() {
            self.explosions.push(Explosion::at(self.spaceship.body()));
        }
    }

    /// Ages every explosion by one frame and drops the finished ones.
    pub fn age_explosions(&mut self) {
        for explosion in &mut self.explosions {
            explosion.frames = explosion.frames.saturating_sub(1);
        }
        self.explosions.retain(|e| e.frames > 0);
    }
}
