/// Seams between the game core and the world around it: wave data,
/// persistence, presentation and audio.

use crate::error::Result;
use crate::records::{PlayerState, ScoreboardEntry};
use crate::session::Session;
use crate::waves::WaveDefinition;

/// Source of wave definitions, indexed from 1.
pub trait WaveCatalog: Send + Sync {
    fn find_wave(&self, wave: u32) -> Option<WaveDefinition>;
    fn count_waves(&self) -> u32;
}

/// Durable storage for player progress and the scoreboard.
pub trait Persistence: Send + Sync {
    /// `Ok(None)` when the player has never played.
    fn load_player_state(&self, name: &str) -> Result<Option<PlayerState>>;
    fn save_player_state(&self, state: &PlayerState) -> Result<()>;
    fn save_score(&self, entry: &ScoreboardEntry) -> Result<()>;
    /// Best first: score descending, elapsed time ascending.
    fn list_scores(&self) -> Result<Vec<ScoreboardEntry>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialog {
    Defeat,
    FinalVictory,
}

impl Dialog {
    pub fn title(self) -> &'static str {
        match self {
            Dialog::Defeat => "YOU DIED!",
            Dialog::FinalVictory => "VICTORY!",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Dialog::Defeat => "You died. Do you want to play again?",
            Dialog::FinalVictory => "Great shooting! Do you want to play again?",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogChoice {
    PlayAgain,
    MainMenu,
    Exit,
}

/// Whatever draws the game.  The two sticky flags let the tick engine raise
/// each terminal condition only once per session.
pub trait Presentation {
    fn is_option_showing(&self) -> bool;
    fn set_option_showing(&mut self, showing: bool);
    fn is_victory_showing(&self) -> bool;
    fn set_victory_showing(&mut self, showing: bool);

    fn show_option_dialog(&mut self, dialog: Dialog);
    fn show_victory(&mut self);
    fn show_message(&mut self, text: &str);
    fn clear_message(&mut self);

    /// Called once after every tick; `None` while the session is loading.
    fn request_redraw(&mut self, session: Option<&Session>);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sound {
    Laser,
    Explosion,
    GameLost,
    Victory,
    BuildUp,
    Background,
}

/// Fire-and-forget sound playback.  A sink with a missing asset simply plays
/// nothing.
pub trait AudioSink: Send + Sync {
    fn play(&self, sound: Sound);
    fn stop(&self, sound: Sound);
}

/// An audio sink that only logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&self, sound: Sound) {
        tracing::trace!(?sound, "play");
    }

    fn stop(&self, sound: Sound) {
        tracing::trace!(?sound, "stop");
    }
}
