/// Alien intruders and the missiles they launch.

use rand::Rng;

use crate::entities::{ActorKind, Body, Sprite, ALIEN_HEIGHT, ALIEN_WIDTH};
use crate::geometry::{Panel, Rect};
use crate::route::{determine_missile_route, MissileRoute};
use crate::waves::WaveDefinition;

/// Horizontal pixels per tick in formation.
pub const NORMAL_ALIEN_MOVEMENT: i32 = 2;
/// Horizontal pixels per tick once the swarm has gone kamikazi.
pub const FAST_ALIEN_MOVEMENT: i32 = 6;
/// Missiles each alien carries for its whole life.
pub const LOADED_MISSILES: u32 = 5;
/// Default ceiling, in milliseconds, of the random delay between launches.
pub const DEFAULT_ACTIVATION_TIME_LIMIT: i32 = 22_000;

// ── AlienMissile ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct AlienMissile {
    body: Body,
    route: MissileRoute,
}

impl AlienMissile {
    pub fn launch(x: i32, y: i32, route: MissileRoute) -> Self {
        AlienMissile {
            body: Body::new(ActorKind::AlienMissile, x, y),
            route,
        }
    }

    pub fn route(&self) -> MissileRoute {
        self.route
    }

    /// Follows the route; dies below the panel or past either side.
    pub fn advance(&mut self, panel: &Panel) {
        if self.body.is_dead() {
            return;
        }
        self.body.y = (f64::from(self.body.y) + self.route.delta_y) as i32;
        self.body.x = (f64::from(self.body.x) + self.route.delta_x) as i32;
        if self.body.y > panel.height || self.body.x > panel.width || self.body.x < 0 {
            self.body.die();
        }
    }
}

impl Sprite for AlienMissile {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

// ── Formation extent ─────────────────────────────────────────────────────────

/// Horizontal span of the swarm used to decide when it reaches a wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormationExtent {
    pub left: i32,
    pub right: i32,
}

// ── Alien ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Alien {
    body: Body,
    movement: i32,
    /// Vertical distance covered during the current descent.
    approach: i32,
    moving_left: bool,
    fired_missile: Option<AlienMissile>,
    loaded_missiles: u32,
    /// Milliseconds until the next launch may happen.
    missile_activation_time: i32,
    activation_time_limit: i32,
    missile_speed: i32,
    points: u32,
    kamikazi_mode: bool,
}

impl Alien {
    pub fn new(
        x: i32,
        y: i32,
        wave: &WaveDefinition,
        activation_time_limit: i32,
        rng: &mut impl Rng,
    ) -> Self {
        Alien {
            body: Body::new(ActorKind::Alien, x, y),
            movement: NORMAL_ALIEN_MOVEMENT,
            approach: 0,
            moving_left: true,
            fired_missile: None,
            loaded_missiles: LOADED_MISSILES,
            missile_activation_time: random_countdown(rng, activation_time_limit),
            activation_time_limit,
            missile_speed: wave.missile_speed,
            points: wave.points,
            kamikazi_mode: false,
        }
    }

    pub fn x(&self) -> i32 {
        self.body.x
    }

    pub fn y(&self) -> i32 {
        self.body.y
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn movement(&self) -> i32 {
        self.movement
    }

    pub fn is_moving_left(&self) -> bool {
        self.moving_left
    }

    pub fn loaded_missiles(&self) -> u32 {
        self.loaded_missiles
    }

    pub fn missile_activation_time(&self) -> i32 {
        self.missile_activation_time
    }

    pub fn fired_missile(&self) -> Option<&AlienMissile> {
        self.fired_missile.as_ref()
    }

    pub fn fired_missile_mut(&mut self) -> Option<&mut AlienMissile> {
        self.fired_missile.as_mut()
    }

    pub fn has_missile_in_flight(&self) -> bool {
        self.fired_missile.as_ref().map_or(false, |m| !m.is_dead())
    }

    /// Alive with at least one missile left to launch.
    pub fn is_armed(&self) -> bool {
        !self.body.is_dead() && self.loaded_missiles > 0
    }

    pub fn is_kamikazi_mode(&self) -> bool {
        self.kamikazi_mode
    }

    /// One-way switch to the fast swarm speed.
    pub fn enter_kamikazi_mode(&mut self) {
        self.kamikazi_mode = true;
        self.movement = FAST_ALIEN_MOVEMENT;
    }

    /// Launch opportunity for this tick.  Returns `true` when a missile was
    /// launched towards `target`.
    ///
    /// Nothing happens unless the game is running, the alien is alive and
    /// its previous missile is gone.  With ammunition left, the countdown
    /// either expires (launch, then re-roll the countdown in
    /// `[0, activation_time_limit)`) or is decremented by `tick_ms`.
    pub fn fire_missile(
        &mut self,
        running: bool,
        target: &Rect,
        tick_ms: i32,
        rng: &mut impl Rng,
    ) -> bool {
        if !running || self.body.is_dead() || self.has_missile_in_flight() {
            return false;
        }
        if self.loaded_missiles == 0 {
            return false;
        }
        if self.missile_activation_time <= 0 {
            self.loaded_missiles -= 1;
            let route = determine_missile_route(&self.bounds(), target, self.missile_speed);
            self.fired_missile = Some(AlienMissile::launch(
                self.body.x + ALIEN_WIDTH / 2,
                self.body.y + ALIEN_HEIGHT / 2,
                route,
            ));
            self.missile_activation_time = random_countdown(rng, self.activation_time_limit);
            true
        } else {
            self.missile_activation_time -= tick_ms;
            false
        }
    }

    /// One step of formation movement.
    ///
    /// Heading into a wall the alien descends by its step until it has
    /// dropped a full alien height, then takes one step back from the wall
    /// and reverses direction.  The wall test uses the shared `extent`, not
    /// this alien's own position, so the whole swarm turns together.
    pub fn move_in_formation(&mut self, extent: FormationExtent, panel: &Panel) {
        let past_wall = if self.moving_left {
            extent.left < 0
        } else {
            extent.right > panel.width
        };

        if past_wall && self.approach < ALIEN_HEIGHT {
            self.body.y += self.movement;
            self.approach += self.movement;
        } else if past_wall {
            self.approach = 0;
            if self.moving_left {
                self.body.x += self.movement;
            } else {
                self.body.x -= self.movement;
            }
            self.moving_left = !self.moving_left;
        } else if self.moving_left {
            self.body.x -= self.movement;
        } else {
            self.body.x += self.movement;
        }
    }

    /// Kills the alien.  Its missile, if any, stays in flight.
    pub fn kill(&mut self) {
        self.body.die();
    }
}

impl Sprite for Alien {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

fn random_countdown(rng: &mut impl Rng, limit: i32) -> i32 {
    if limit > 0 {
        rng.gen_range(0..limit)
    } else {
        0
    }
}
