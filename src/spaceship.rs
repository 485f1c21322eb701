/// The player's ship and its laser.

use crate::entities::{ActorKind, Body, Sprite, SPACESHIP_HEIGHT, SPACESHIP_WIDTH};
use crate::geometry::Panel;

/// Horizontal pixels per tick while a direction is held.
pub const SPACESHIP_MOVEMENT: i32 = 4;

/// Distance from the bottom of the panel to the ship's top edge.
pub const SPACESHIP_BOTTOM_OFFSET: i32 = 100;

/// Vertical pixels per tick of a laser (upward).
pub const LASER_VERTICAL_MOVEMENT: i32 = -10;

/// Discrete input signals delivered to the ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShipInput {
    MoveLeftStart,
    MoveLeftStop,
    MoveRightStart,
    MoveRightStop,
    Fire,
}

// ── Laser ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Laser {
    body: Body,
}

impl Laser {
    /// A laser leaving the nose of a ship whose top-left corner is at
    /// `(ship_x, ship_y)`.
    pub fn fired_from(ship_x: i32, ship_y: i32) -> Self {
        Laser {
            body: Body::new(ActorKind::Laser, ship_x + SPACESHIP_WIDTH / 2, ship_y),
        }
    }

    /// Moves up; dies once above the panel.
    pub fn advance(&mut self) {
        if self.body.is_dead() {
            return;
        }
        self.body.y += LASER_VERTICAL_MOVEMENT;
        if self.body.y < 0 {
            self.body.die();
        }
    }
}

impl Sprite for Laser {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

// ── Spaceship ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Spaceship {
    body: Body,
    laser: Option<Laser>,
    /// Set together with `dead` when the ship is destroyed; cleared once the
    /// explosion has been queued.
    exploding: bool,
}

impl Spaceship {
    /// A ship centred horizontally near the bottom of `panel`.
    pub fn new(panel: &Panel) -> Self {
        let x = panel.width / 2 - SPACESHIP_WIDTH / 2;
        let y = panel.height - SPACESHIP_BOTTOM_OFFSET;
        Spaceship::at(x, y)
    }

    pub fn at(x: i32, y: i32) -> Self {
        Spaceship {
            body: Body::new(ActorKind::Spaceship, x, y),
            laser: None,
            exploding: false,
        }
    }

    pub fn x(&self) -> i32 {
        self.body.x
    }

    pub fn y(&self) -> i32 {
        self.body.y
    }

    pub fn delta_x(&self) -> i32 {
        self.body.delta_x
    }

    /// Applies the current horizontal velocity, clamped to
    /// `[0, panel.width - SPACESHIP_WIDTH]`.
    pub fn advance(&mut self, panel: &Panel) {
        if self.body.is_dead() {
            return;
        }
        let max_x = (panel.width - SPACESHIP_WIDTH).max(0);
        self.body.x = (self.body.x + self.body.delta_x).clamp(0, max_x);
    }

    pub fn laser(&self) -> Option<&Laser> {
        self.laser.as_ref()
    }

    pub fn laser_mut(&mut self) -> Option<&mut Laser> {
        self.laser.as_mut()
    }

    pub fn has_live_laser(&self) -> bool {
        self.laser.as_ref().map_or(false, |l| !l.is_dead())
    }

    /// Applies one input signal.  Returns `true` when a new laser was fired.
    ///
    /// Releasing either direction stops the ship.
    pub fn handle_input(&mut self, input: ShipInput, running: bool) -> bool {
        match input {
            ShipInput::MoveLeftStart => self.body.delta_x = -SPACESHIP_MOVEMENT,
            ShipInput::MoveRightStart => self.body.delta_x = SPACESHIP_MOVEMENT,
            ShipInput::MoveLeftStop | ShipInput::MoveRightStop => self.body.delta_x = 0,
            ShipInput::Fire => return self.fire(running),
        }
        false
    }

    /// Spawns a laser unless the game is paused, the ship is dead, or a
    /// laser is still in flight.
    pub fn fire(&mut self, running: bool) -> bool {
        if !running || self.body.is_dead() || self.has_live_laser() {
            return false;
        }
        self.laser = Some(Laser::fired_from(self.body.x, self.body.y));
        true
    }

    /// Destroyed by a missile or an alien.
    pub fn explode(&mut self) {
        self.body.die();
        self.exploding = true;
    }

    pub fn is_exploding(&self) -> bool {
        self.exploding
    }

    /// Returns `true` exactly once after [`Spaceship::explode`].
    pub fn take_explosion(&mut self) -> bool {
        let pending = self.body.is_dead() && self.exploding;
        self.exploding = false;
        pending
    }

    /// Moves the ship up one pixel; used by the final-victory fly-off.
    pub fn climb(&mut self) {
        self.body.y -= 1;
    }

    /// True once the ship is entirely above the panel.
    pub fn has_left_panel(&self) -> bool {
        self.body.y < -SPACESHIP_HEIGHT
    }
}

impl Sprite for Spaceship {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
