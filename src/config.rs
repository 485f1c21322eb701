/// Runtime configuration loaded from a TOML file.
///
/// Every field has a compiled default, so a file only needs the keys it
/// wants to change:
///
/// ```toml
/// loop_delay_ms = 20
/// seed = 7
///
/// [[waves]]
/// wave = 1
/// description = "Practice"
/// rows = 1
/// columns = 3
/// missile_speed = 3
/// points = 50
/// ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::alien::DEFAULT_ACTIVATION_TIME_LIMIT;
use crate::entities::{ALIEN_WIDTH, SPACESHIP_HEIGHT, SPACESHIP_WIDTH};
use crate::error::{GameError, Result};
use crate::formation::{ALIEN_INIT_X, ALIEN_INIT_Y};
use crate::geometry::Panel;
use crate::session::Rules;
use crate::spaceship::SPACESHIP_BOTTOM_OFFSET;
use crate::waves::{builtin_waves, WaveDefinition, WaveTable};

pub const DEFAULT_CONFIG_FILE: &str = "alien-intruders.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub panel_width: i32,
    pub panel_height: i32,
    /// Milliseconds between ticks (≈59 Hz by default).
    pub loop_delay_ms: u64,
    pub activation_time_limit_ms: i32,
    /// Pause between the intro's "WAVE n" / "FIGHT!" beats.
    pub intro_pause_ms: u64,
    /// Where player records, the scoreboard and the log file live.
    pub data_dir: PathBuf,
    /// Seed for the pseudo-random source; random when absent.
    pub seed: Option<u64>,
    pub waves: Vec<WaveDefinition>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let panel = Panel::default();
        GameConfig {
            panel_width: panel.width,
            panel_height: panel.height,
            loop_delay_ms: 17,
            activation_time_limit_ms: DEFAULT_ACTIVATION_TIME_LIMIT,
            intro_pause_ms: 1000,
            data_dir: PathBuf::from(".alien-intruders"),
            seed: None,
            waves: builtin_waves(),
        }
    }
}

impl GameConfig {
    /// Reads `path`.  A missing file yields the defaults; a malformed one is
    /// an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no {} found; using compiled defaults", path.display());
                return Ok(GameConfig::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config: GameConfig = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.loop_delay_ms == 0 {
            return Err(GameError::InvalidConfig("loop_delay_ms must be positive".into()));
        }
        if self.panel_width < SPACESHIP_WIDTH || self.panel_width < ALIEN_INIT_X + ALIEN_WIDTH {
            return Err(GameError::InvalidConfig(format!(
                "panel_width {} is too narrow",
                self.panel_width
            )));
        }
        if self.panel_height < SPACESHIP_BOTTOM_OFFSET + SPACESHIP_HEIGHT
            || self.panel_height < ALIEN_INIT_Y + SPACESHIP_BOTTOM_OFFSET
        {
            return Err(GameError::InvalidConfig(format!(
                "panel_height {} is too short",
                self.panel_height
            )));
        }
        WaveTable::new(self.waves.clone()).map(|_| ())
    }

    pub fn panel(&self) -> Panel {
        Panel {
            width: self.panel_width,
            height: self.panel_height,
        }
    }

    pub fn rules(&self) -> Rules {
        Rules {
            panel: self.panel(),
            tick_ms: i32::try_from(self.loop_delay_ms).unwrap_or(i32::MAX),
            activation_time_limit: self.activation_time_limit_ms,
        }
    }

    pub fn loop_delay(&self) -> Duration {
        Duration::from_millis(self.loop_delay_ms)
    }

    pub fn intro_pause(&self) -> Duration {
        Duration::from_millis(self.intro_pause_ms)
    }

    pub fn wave_table(&self) -> Result<WaveTable> {
        WaveTable::new(self.waves.clone())
    }
}
