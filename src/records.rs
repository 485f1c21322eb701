/// Persistent player records: who is playing, how far they got, and the
/// scoreboard.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::waves::WaveDefinition;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Unix seconds at which the player last started a fresh game.
    pub last_game_started: u64,
}

/// A saved point within the sequence of waves battled by one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub player: Player,
    pub wave: WaveDefinition,
    /// Set once the player's run has ended (death, quit or final victory).
    pub terminated: bool,
    pub score: u32,
}

impl PlayerState {
    /// A brand-new run starting at `first_wave`.
    pub fn fresh(name: &str, first_wave: WaveDefinition, now: u64) -> Self {
        PlayerState {
            player: Player {
                name: name.to_string(),
                last_game_started: now,
            },
            wave: first_wave,
            terminated: false,
            score: 0,
        }
    }

    /// Seconds since the current run began.
    pub fn time_played(&self, now: u64) -> u64 {
        now.saturating_sub(self.player.last_game_started)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreboardEntry {
    pub player_name: String,
    pub score: u32,
    /// Seconds the run took.
    pub game_time_elapsed: u64,
}

/// Best first: higher score, then faster time.
pub fn sort_scoreboard(entries: &mut [ScoreboardEntry]) {
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.game_time_elapsed.cmp(&b.game_time_elapsed))
    });
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
