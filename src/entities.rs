/// Shared actor state (position, horizontal velocity and the one-way
/// `dead` flag) plus the dimensions of every actor kind.

use crate::geometry::Rect;

// ── Actor dimensions (panel pixels) ──────────────────────────────────────────

pub const SPACESHIP_WIDTH: i32 = 40;
pub const SPACESHIP_HEIGHT: i32 = 40;
pub const LASER_WIDTH: i32 = 7;
pub const LASER_HEIGHT: i32 = 20;
pub const ALIEN_WIDTH: i32 = 34;
pub const ALIEN_HEIGHT: i32 = 34;
pub const MISSILE_WIDTH: i32 = 11;
pub const MISSILE_HEIGHT: i32 = 22;

/// Number of frames an explosion stays on screen.
pub const EXPLOSION_FRAMES: u32 = 12;

// ── Tagged actor kind ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorKind {
    Spaceship,
    Laser,
    Alien,
    AlienMissile,
}

impl ActorKind {
    /// Fixed `(width, height)` of the bounding box for this kind.
    pub const fn size(self) -> (i32, i32) {
        match self {
            ActorKind::Spaceship => (SPACESHIP_WIDTH, SPACESHIP_HEIGHT),
            ActorKind::Laser => (LASER_WIDTH, LASER_HEIGHT),
            ActorKind::Alien => (ALIEN_WIDTH, ALIEN_HEIGHT),
            ActorKind::AlienMissile => (MISSILE_WIDTH, MISSILE_HEIGHT),
        }
    }
}

// ── Body ─────────────────────────────────────────────────────────────────────

/// Positional and lifecycle state common to every actor.
///
/// `dead` is private: the only way to change it is [`Body::die`], so once an
/// actor is dead it stays dead.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub kind: ActorKind,
    pub x: i32,
    pub y: i32,
    pub delta_x: i32,
    dead: bool,
}

impl Body {
    pub fn new(kind: ActorKind, x: i32, y: i32) -> Self {
        Body {
            kind,
            x,
            y,
            delta_x: 0,
            dead: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        let (width, height) = self.kind.size();
        Rect::new(self.x, self.y, width, height)
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Idempotent.
    pub fn die(&mut self) {
        self.dead = true;
    }
}

/// Capability set every actor exposes.  Collision is always the
/// axis-aligned bounding box of the body.
pub trait Sprite {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    fn bounds(&self) -> Rect {
        self.body().bounds()
    }

    fn is_dead(&self) -> bool {
        self.body().is_dead()
    }

    fn die(&mut self) {
        self.body_mut().die();
    }

    fn is_colliding(&self, other: &dyn Sprite) -> bool {
        self.bounds().intersects(&other.bounds())
    }
}

// ── Explosions ───────────────────────────────────────────────────────────────

/// A one-shot explosion queued when an actor dies.
#[derive(Clone, Debug, PartialEq)]
pub struct Explosion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Remaining frames to display.
    pub frames: u32,
}

impl Explosion {
    pub fn at(body: &Body) -> Self {
        let (width, height) = body.kind.size();
        Explosion {
            x: body.x,
            y: body.y,
            width,
            height,
            frames: EXPLOSION_FRAMES,
        }
    }
}
