/// Alien wave definitions and the catalog the session draws them from.

use serde::{Deserialize, Serialize};

use crate::collaborators::WaveCatalog;
use crate::error::{GameError, Result};

/// Immutable description of one coordinated alien attack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// 1-based order of the wave.
    pub wave: u32,
    pub description: String,
    pub rows: u32,
    pub columns: u32,
    /// Pixels per tick along the dominant axis of an alien missile.
    pub missile_speed: i32,
    /// Points awarded for each alien destroyed.
    pub points: u32,
}

impl WaveDefinition {
    pub fn new(wave: u32, rows: u32, columns: u32, missile_speed: i32, points: u32) -> Self {
        WaveDefinition {
            wave,
            description: format!("Wave {wave}"),
            rows,
            columns,
            missile_speed,
            points,
        }
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| GameError::InvalidWave {
            wave: self.wave,
            reason: reason.to_string(),
        };
        if self.rows == 0 || self.columns == 0 {
            return Err(invalid("a wave needs at least one row and one column"));
        }
        if self.missile_speed <= 0 {
            return Err(invalid("missile speed must be positive"));
        }
        Ok(())
    }
}

/// The waves shipped with the game.
pub fn builtin_waves() -> Vec<WaveDefinition> {
    let table: &[(u32, u32, i32, u32, &str)] = &[
        (2, 6, 4, 100, "Scouts sweep the upper atmosphere."),
        (3, 8, 5, 150, "A raiding party descends on the outer colonies."),
        (4, 9, 6, 200, "The invasion fleet breaks through orbit."),
        (5, 10, 7, 250, "Elite squadrons target the capital."),
        (5, 12, 8, 300, "The mothership unleashes its final swarm."),
    ];
    table
        .iter()
        .enumerate()
        .map(|(i, &(rows, columns, missile_speed, points, description))| WaveDefinition {
            wave: i as u32 + 1,
            description: description.to_string(),
            rows,
            columns,
            missile_speed,
            points,
        })
        .collect()
}

/// In-memory wave catalog, ordered by wave number.
#[derive(Clone, Debug)]
pub struct WaveTable {
    waves: Vec<WaveDefinition>,
}

impl WaveTable {
    /// Waves must be numbered `1..=n` (in any order) and each must describe a
    /// non-empty roster.
    pub fn new(mut waves: Vec<WaveDefinition>) -> Result<Self> {
        if waves.is_empty() {
            return Err(GameError::EmptyWaveTable);
        }
        waves.sort_by_key(|w| w.wave);
        for (i, wave) in waves.iter().enumerate() {
            if wave.wave != i as u32 + 1 {
                return Err(GameError::InvalidWave {
                    wave: wave.wave,
                    reason: format!("expected wave number {}", i + 1),
                });
            }
            wave.validate()?;
        }
        Ok(WaveTable { waves })
    }

    pub fn builtin() -> Self {
        WaveTable {
            waves: builtin_waves(),
        }
    }

    pub fn waves(&self) -> &[WaveDefinition] {
        &self.waves
    }
}

impl WaveCatalog for WaveTable {
    fn find_wave(&self, wave: u32) -> Option<WaveDefinition> {
        wave.checked_sub(1)
            .and_then(|i| self.waves.get(i as usize))
            .cloned()
    }

    fn count_waves(&self) -> u32 {
        self.waves.len() as u32
    }
}
