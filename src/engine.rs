/// The fixed-rate update step.
///
/// [`tick`] moves every actor once, resolves every collision, updates the
/// score and raises the terminal conditions.  It runs on the tick thread
/// only; sounds leave through the [`EffectSink`] and terminal conditions
/// through the [`Presentation`].

use rand::Rng;

use crate::collaborators::{Dialog, Presentation};
use crate::effects::{self, EffectSink};
use crate::entities::Sprite;
use crate::formation::AlienId;
use crate::session::Session;

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Aliens destroyed by the laser, in the order they died.
    pub aliens_killed: Vec<AlienId>,
    /// Points added to the score.
    pub points_awarded: u32,
    /// The ship was hit by a missile or rammed by an alien.
    pub ship_destroyed: bool,
    /// The swarm switched to kamikazi mode.
    pub kamikazi_engaged: bool,
    /// The defeat dialog was requested.
    pub defeat_raised: bool,
    /// The victory banner was requested.
    pub victory_raised: bool,
}

/// Advance the session by one tick.  All randomness comes through `rng` so
/// callers control determinism (tests use a seeded RNG).
pub fn tick(
    session: &mut Session,
    presentation: &mut dyn Presentation,
    effects: &mut dyn EffectSink,
    rng: &mut impl Rng,
) -> TickReport {
    let mut report = TickReport::default();
    let panel = session.rules.panel;
    let tick_ms = session.rules.tick_ms;
    let running = session.is_running();
    session.count_tick();

    // ── 1. Ship ──────────────────────────────────────────────────────────────
    if session.spaceship.is_dead() {
        if !presentation.is_option_showing() {
            presentation.set_option_showing(true);
            presentation.show_option_dialog(Dialog::Defeat);
            report.defeat_raised = true;
            tracing::info!(score = session.score(), wave = session.wave().wave, "player defeated");
        }
    } else {
        session.spaceship.advance(&panel);
    }

    // ── 2. Laser ↔ aliens (first hit in roster order wins) ──────────────────
    let mut laser_hit: Option<AlienId> = None;
    if let Some(laser) = session.spaceship.laser_mut() {
        laser.advance();
        if !laser.is_dead() {
            laser_hit = session
                .formation
                .aliens()
                .iter()
                .position(|alien| !alien.is_dead() && alien.is_colliding(&*laser))
                .map(AlienId);
            if laser_hit.is_some() {
                laser.die();
            }
        }
    }
    if let Some(id) = laser_hit {
        let points = session.formation.get(id).map_or(0, |alien| alien.points());
        session.formation.kill(id);
        session.award(points);
        effects.dispatch(effects::alien_explosion());
        report.aliens_killed.push(id);
        report.points_awarded += points;
        tracing::debug!(alien = id.0, points, score = session.score(), "alien destroyed");
    }

    // ── 3. Aliens: move, fire, missiles ↔ ship ──────────────────────────────
    // The extent is taken once so the whole swarm turns on the same tick.
    let extent = session.formation.extent();
    let target = session.spaceship.bounds();
    let mut missiles_flying = false;
    for alien in session.formation.aliens_mut() {
        alien.move_in_formation(extent, &panel);
        if !alien.is_dead() {
            alien.fire_missile(running, &target, tick_ms, rng);
        }
        if let Some(missile) = alien.fired_missile_mut() {
            missile.advance(&panel);
            let ship = &mut session.spaceship;
            if !ship.is_dead() && !missile.is_dead() && ship.is_colliding(&*missile) {
                ship.explode();
                missile.die();
                effects.dispatch(effects::defeat_sequence());
                report.ship_destroyed = true;
                tracing::debug!("ship hit by alien missile");
            }
            if !missile.is_dead() {
                missiles_flying = true;
            }
        }
    }

    // ── 4. Kamikazi switch ───────────────────────────────────────────────────
    if session.formation.engage_kamikazi_if_disarmed() {
        report.kamikazi_engaged = true;
        tracing::info!(living = session.formation.living_count(), "aliens out of missiles; kamikazi mode");
    }

    // ── 5. Aliens ↔ ship ─────────────────────────────────────────────────────
    if !session.spaceship.is_dead() {
        let rammed = session
            .formation
            .aliens()
            .iter()
            .position(|alien| !alien.is_dead() && alien.is_colliding(&session.spaceship))
            .map(AlienId);
        if let Some(id) = rammed {
            session.formation.kill(id);
            session.spaceship.explode();
            effects.dispatch(effects::defeat_sequence());
            report.ship_destroyed = true;
            tracing::debug!(alien = id.0, "ship rammed");
        }
    }

    // ── 6. Victory ───────────────────────────────────────────────────────────
    if session.formation.all_dead()
        && !session.spaceship.is_dead()
        && !missiles_flying
        && !presentation.is_victory_showing()
    {
        presentation.set_victory_showing(true);
        presentation.show_victory();
        report.victory_raised = true;
        tracing::info!(score = session.score(), wave = session.wave().wave, "wave cleared");
    }

    // ── 7. Explosions ────────────────────────────────────────────────────────
    session.age_explosions();
    session.collect_explosions();

    report
}
