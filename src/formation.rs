/// The alien roster for one wave.
///
/// Aliens live in an arena indexed by [`AlienId`]; the index never changes
/// for the life of the roster.  A parallel liveness table records which
/// aliens have died and whether their explosion has been queued yet.

use rand::Rng;

use crate::alien::{Alien, FormationExtent};
use crate::entities::{Sprite, ALIEN_WIDTH};
use crate::waves::WaveDefinition;

/// Top-left corner of the first alien in the roster.
pub const ALIEN_INIT_X: i32 = 450;
pub const ALIEN_INIT_Y: i32 = 40;
/// Distance between neighbouring aliens in both directions.
pub const ALIEN_SPACING: i32 = 50;

/// Stable handle of an alien within its roster (row-major order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlienId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    /// Dead, explosion not yet queued.
    Fallen,
    /// Dead and exploded.
    Cleared,
}

#[derive(Clone, Debug)]
pub struct Formation {
    aliens: Vec<Alien>,
    liveness: Vec<Liveness>,
    rows: usize,
    columns: usize,
}

impl Formation {
    /// Lays out `wave.rows × wave.columns` aliens on a regular grid.
    pub fn build(wave: &WaveDefinition, activation_time_limit: i32, rng: &mut impl Rng) -> Self {
        let rows = wave.rows as usize;
        let columns = wave.columns as usize;
        let mut aliens = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            for column in 0..columns {
                aliens.push(Alien::new(
                    ALIEN_INIT_X + ALIEN_SPACING * column as i32,
                    ALIEN_INIT_Y + ALIEN_SPACING * row as i32,
                    wave,
                    activation_time_limit,
                    rng,
                ));
            }
        }
        Formation::from_aliens(aliens, columns)
    }

    /// Wraps an already laid-out roster; `aliens` is row-major with
    /// `columns` aliens per row.
    pub fn from_aliens(aliens: Vec<Alien>, columns: usize) -> Self {
        let columns = columns.max(1);
        let rows = aliens.len().div_ceil(columns);
        let liveness = aliens
            .iter()
            .map(|a| if a.is_dead() { Liveness::Cleared } else { Liveness::Alive })
            .collect();
        Formation {
            aliens,
            liveness,
            rows,
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.aliens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliens.is_empty()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn ids(&self) -> impl Iterator<Item = AlienId> {
        (0..self.aliens.len()).map(AlienId)
    }

    pub fn get(&self, id: AlienId) -> Option<&Alien> {
        self.aliens.get(id.0)
    }

    pub fn get_mut(&mut self, id: AlienId) -> Option<&mut Alien> {
        self.aliens.get_mut(id.0)
    }

    pub fn aliens(&self) -> &[Alien] {
        &self.aliens
    }

    pub fn liveness(&self, id: AlienId) -> Option<Liveness> {
        self.liveness.get(id.0).copied()
    }

    pub fn living(&self) -> impl Iterator<Item = &Alien> {
        self.aliens.iter().filter(|a| !a.is_dead())
    }

    pub fn living_count(&self) -> usize {
        self.living().count()
    }

    pub fn all_dead(&self) -> bool {
        self.aliens.iter().all(|a| a.is_dead())
    }

    pub fn is_kamikazi(&self) -> bool {
        self.aliens.iter().any(|a| a.is_kamikazi_mode())
    }

    pub fn any_missile_in_flight(&self) -> bool {
        self.aliens.iter().any(|a| a.has_missile_in_flight())
    }

    /// Horizontal span the swarm tests against the walls.
    ///
    /// In formation this is the nominal grid edge (the first and last
    /// alien of the first row, dead or alive) widened by one step on each
    /// side.  In kamikazi mode it is the exact span of the living aliens,
    /// or `(-1, -1)` when none remain.
    pub fn extent(&self) -> FormationExtent {
        let Some(first) = self.aliens.first() else {
            return FormationExtent { left: -1, right: -1 };
        };
        if !first.is_kamikazi_mode() {
            let last = &self.aliens[(self.columns - 1).min(self.aliens.len() - 1)];
            return FormationExtent {
                left: first.x() - first.movement(),
                right: last.x() + ALIEN_WIDTH + last.movement(),
            };
        }
        let mut living = self.living().peekable();
        if living.peek().is_none() {
            return FormationExtent { left: -1, right: -1 };
        }
        let (left, right) = living.fold((i32::MAX, i32::MIN), |(left, right), a| {
            (left.min(a.x()), right.max(a.x() + ALIEN_WIDTH))
        });
        FormationExtent { left, right }
    }

    /// Kills an alien and marks its explosion as pending.  Returns `false`
    /// when the alien was already dead.
    pub fn kill(&mut self, id: AlienId) -> bool {
        let Some(alien) = self.aliens.get_mut(id.0) else {
            return false;
        };
        if alien.is_dead() {
            return false;
        }
        alien.kill();
        self.liveness[id.0] = Liveness::Fallen;
        true
    }

    /// Switches every alien into kamikazi mode when none is armed and none
    /// has switched yet.  Returns `true` on the tick the switch happens.
    pub fn engage_kamikazi_if_disarmed(&mut self) -> bool {
        let holding_back = self
            .aliens
            .iter()
            .any(|a| a.is_armed() || a.is_kamikazi_mode());
        if holding_back || self.aliens.is_empty() {
            return false;
        }
        for alien in &mut self.aliens {
            alien.enter_kamikazi_mode();
        }
        true
    }

    /// Hands out the aliens whose explosion is pending and marks them
    /// cleared.
    pub fn drain_fallen(&mut self) -> Vec<AlienId> {
        let mut fallen = Vec::new();
        for (i, state) in self.liveness.iter_mut().enumerate() {
            if *state == Liveness::Fallen {
                *state = Liveness::Cleared;
                fallen.push(AlienId(i));
            }
        }
        fallen
    }

    pub(crate) fn aliens_mut(&mut self) -> &mut [Alien] {
        &mut self.aliens
    }
}
