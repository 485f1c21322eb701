/// JSON-file persistence for player progress and the scoreboard.
///
/// Two documents live in the data directory: `players.json` (player name →
/// saved state) and `scoreboard.json` (every finished run).  Writes go to a
/// temporary file first and are renamed into place.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::collaborators::Persistence;
use crate::error::Result;
use crate::records::{sort_scoreboard, PlayerState, ScoreboardEntry};

const PLAYERS_FILE: &str = "players.json";
const SCOREBOARD_FILE: &str = "scoreboard.json";

pub struct JsonStore {
    dir: PathBuf,
    // serialises read-modify-write cycles
    lock: Mutex<()>,
}

impl JsonStore {
    /// Opens (and creates if needed) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(JsonStore {
            dir,
            lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T> {
        match fs::read_to_string(self.dir.join(file)) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        // The guarded data is `()`; a poisoned lock carries no broken state
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Persistence for JsonStore {
    fn load_player_state(&self, name: &str) -> Result<Option<PlayerState>> {
        let _guard = self.guard();
        let mut players: BTreeMap<String, PlayerState> = self.read(PLAYERS_FILE)?;
        Ok(players.remove(name))
    }

    fn save_player_state(&self, state: &PlayerState) -> Result<()> {
        let _guard = self.guard();
        let mut players: BTreeMap<String, PlayerState> = self.read(PLAYERS_FILE)?;
        players.insert(state.player.name.clone(), state.clone());
        self.write(PLAYERS_FILE, &players)?;
        tracing::info!(
            player = %state.player.name,
            wave = state.wave.wave,
            score = state.score,
            terminated = state.terminated,
            "saved player state"
        );
        Ok(())
    }

    fn save_score(&self, entry: &ScoreboardEntry) -> Result<()> {
        let _guard = self.guard();
        let mut scores: Vec<ScoreboardEntry> = self.read(SCOREBOARD_FILE)?;
        scores.push(entry.clone());
        sort_scoreboard(&mut scores);
        self.write(SCOREBOARD_FILE, &scores)?;
        tracing::info!(
            player = %entry.player_name,
            score = entry.score,
            game_time_elapsed = entry.game_time_elapsed,
            "inserted score"
        );
        Ok(())
    }

    fn list_scores(&self) -> Result<Vec<ScoreboardEntry>> {
        let _guard = self.guard();
        let mut scores: Vec<ScoreboardEntry> = self.read(SCOREBOARD_FILE)?;
        sort_scoreboard(&mut scores);
        Ok(scores)
    }
}
