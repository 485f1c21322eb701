mod common;

use alien_intruders::collaborators::Dialog;
use alien_intruders::effects::{self, Effect};
use alien_intruders::engine::tick;
use alien_intruders::entities::Sprite;
use alien_intruders::formation::{AlienId, Formation};
use alien_intruders::session::{Phase, Rules, Session};
use alien_intruders::spaceship::{ShipInput, Spaceship};
use alien_intruders::waves::WaveDefinition;

use common::{player_state, seeded_rng, RecordingView};

fn make_session(rows: u32, columns: u32) -> Session {
    let wave = WaveDefinition::new(1, rows, columns, 4, 100);
    Session::new(player_state(wave), Rules::default(), &mut seeded_rng())
}

fn session_with_ship(rows: u32, columns: u32, ship: Spaceship) -> Session {
    let wave = WaveDefinition::new(1, rows, columns, 4, 100);
    let formation = Formation::build(&wave, Rules::default().activation_time_limit, &mut seeded_rng());
    Session::with_actors(player_state(wave), Rules::default(), ship, formation)
}

/// Parks a fresh ship right under `id` with a laser on its way up; the laser
/// hits on the next tick.
fn aim_at(session: &mut Session, id: AlienId) {
    let alien = session.formation().get(id).unwrap();
    let (x, y) = (alien.x(), alien.y());
    *session.spaceship_mut() = Spaceship::at(x - 6, y + 34);
    assert!(session.spaceship_mut().fire(true));
}

// ── Initial layout ────────────────────────────────────────────────────────────

#[test]
fn new_session_lays_out_the_roster() {
    let s = make_session(2, 3);
    assert_eq!(s.formation().len(), 6);
    let last = s.formation().get(AlienId(5)).unwrap();
    assert_eq!((last.x(), last.y()), (550, 90));
    assert_eq!(s.spaceship().x(), 580);
    assert_eq!(s.spaceship().y(), 650);
    assert_eq!(s.phase(), Phase::Initialized);
    assert_eq!(s.score(), 0);
}

// ── Not running ───────────────────────────────────────────────────────────────

#[test]
fn aliens_hold_fire_until_running() {
    let mut s = make_session(2, 2);
    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    let mut rng = seeded_rng();
    for _ in 0..200 {
        tick(&mut s, &mut view, &mut sink, &mut rng);
    }
    assert!(!s.formation().any_missile_in_flight());
    assert!(s.formation().aliens().iter().all(|a| a.loaded_missiles() == 5));
    assert_eq!(s.ticks(), 200);
}

#[test]
fn aliens_march_while_not_running() {
    let mut s = make_session(1, 2);
    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    tick(&mut s, &mut view, &mut sink, &mut seeded_rng());
    let first = s.formation().get(AlienId(0)).unwrap();
    assert_eq!(first.x(), 448); // one step left
    assert_eq!(first.y(), 40);
}

#[test]
fn fire_is_ignored_while_not_running() {
    let mut s = make_session(1, 1);
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    s.handle_input(ShipInput::Fire, &mut sink);
    assert!(s.spaceship().laser().is_none());
    assert!(sink.is_empty());
}

// ── Ship ──────────────────────────────────────────────────────────────────────

#[test]
fn ship_clamps_at_left_edge() {
    let mut s = session_with_ship(1, 1, Spaceship::at(2, 650));
    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    s.handle_input(ShipInput::MoveLeftStart, &mut sink);
    tick(&mut s, &mut view, &mut sink, &mut seeded_rng());
    assert_eq!(s.spaceship().x(), 0);
    tick(&mut s, &mut view, &mut sink, &mut seeded_rng());
    assert_eq!(s.spaceship().x(), 0);
}

#[test]
fn ship_clamps_at_right_edge() {
    let mut s = session_with_ship(1, 1, Spaceship::at(1158, 650));
    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    s.handle_input(ShipInput::MoveRightStart, &mut sink);
    for _ in 0..3 {
        tick(&mut s, &mut view, &mut sink, &mut seeded_rng());
    }
    assert_eq!(s.spaceship().x(), 1160); // panel width - ship width
}

#[test]
fn releasing_either_direction_stops_the_ship() {
    let mut s = make_session(1, 1);
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    s.handle_input(ShipInput::MoveLeftStart, &mut sink);
    s.handle_input(ShipInput::MoveRightStop, &mut sink);
    assert_eq!(s.spaceship().delta_x(), 0);
}

#[test]
fn only_one_laser_in_flight() {
    let mut s = make_session(1, 1);
    s.set_running(true);
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    s.handle_input(ShipInput::Fire, &mut sink);
    let first = s.spaceship().laser().unwrap().body().clone();
    s.handle_input(ShipInput::Fire, &mut sink);

    assert_eq!(sink, vec![effects::laser_shot()]);
    assert_eq!(s.spaceship().laser().unwrap().body(), &first);
    assert_eq!(first.x, 600); // ship x + 20
    assert_eq!(first.y, 650);
}

#[test]
fn laser_rises_and_expires_above_the_panel() {
    let mut s = make_session(1, 1);
    s.set_running(true);
    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    // Keep the laser clear of the roster
    *s.spaceship_mut() = Spaceship::at(1100, 650);
    s.handle_input(ShipInput::Fire, &mut sink);

    let mut rng = seeded_rng();
    tick(&mut s, &mut view, &mut sink, &mut rng);
    assert_eq!(s.spaceship().laser().unwrap().body().y, 640);

    for _ in 0..65 {
        tick(&mut s, &mut view, &mut sink, &mut rng);
    }
    assert!(!s.spaceship().has_live_laser());
    s.handle_input(ShipInput::Fire, &mut sink);
    assert!(s.spaceship().has_live_laser());
}

// ── Laser ↔ alien ─────────────────────────────────────────────────────────────

#[test]
fn laser_hit_kills_alien_and_scores() {
    let mut s = make_session(2, 2);
    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    aim_at(&mut s, AlienId(2));

    let report = tick(&mut s, &mut view, &mut sink, &mut seeded_rng());

    assert_eq!(report.aliens_killed, vec![AlienId(2)]);
    assert_eq!(report.points_awarded, 100);
    assert_eq!(s.score(), 100);
    assert!(s.formation().get(AlienId(2)).unwrap().is_dead());
    assert!(!s.spaceship().has_live_laser());
    assert_eq!(sink, vec![effects::alien_explosion()]);
    assert_eq!(s.explosions().len(), 1);
}

#[test]
fn a_dead_alien_is_never_scored_twice() {
    let mut s = make_session(2, 2);
    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    let mut rng = seeded_rng();
    aim_at(&mut s, AlienId(2));
    tick(&mut s, &mut view, &mut sink, &mut rng);

    // Same spot again: the corpse no longer collides
    let corpse = s.formation().get(AlienId(2)).unwrap();
    let (x, y) = (corpse.x(), corpse.y());
    *s.spaceship_mut() = Spaceship::at(x - 6, y + 34);
    s.spaceship_mut().fire(true);
    let report = tick(&mut s, &mut view, &mut sink, &mut rng);

    assert!(report.aliens_killed.is_empty());
    assert_eq!(s.score(), 100);
}

#[test]
fn a_laser_across_two_rows_kills_only_the_first_in_roster_order() {
    let mut s = make_session(2, 3);
    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    *s.spaceship_mut() = Spaceship::at(435, 600);
    assert!(s.spaceship_mut().fire(true));
    // After this tick's climb the laser spans y 72..92: the bottom of row 0
    // (40..74) and the top of row 1 (90..124) in column 0
    s.spaceship_mut().laser_mut().unwrap().body_mut().y = 82;

    let report = tick(&mut s, &mut view, &mut sink, &mut seeded_rng());

    assert_eq!(report.aliens_killed, vec![AlienId(0)]);
    assert_eq!(report.points_awarded, 100);
    assert_eq!(s.score(), 100);
    assert!(s.formation().get(AlienId(0)).unwrap().is_dead());
    assert!(!s.formation().get(AlienId(3)).unwrap().is_dead());
    assert!(!s.spaceship().has_live_laser());
}

// ── Whole-wave scenario ───────────────────────────────────────────────────────

#[test]
fn clearing_a_wave_scores_every_alien_and_raises_victory_once() {
    let mut s = make_session(2, 2);
    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    let mut rng = seeded_rng();

    // Bottom row first so the ship never overlaps a living alien
    for (i, id) in [2, 3, 0, 1].into_iter().map(AlienId).enumerate() {
        aim_at(&mut s, id);
        let report = tick(&mut s, &mut view, &mut sink, &mut rng);
        assert_eq!(report.aliens_killed, vec![id]);
        assert_eq!(report.victory_raised, i == 3);
    }

    assert_eq!(s.score(), 400);
    assert!(s.formation().all_dead());
    assert_eq!(s.phase(), Phase::Cleared);

    for _ in 0..20 {
        let report = tick(&mut s, &mut view, &mut sink, &mut rng);
        assert!(!report.victory_raised);
    }
    assert_eq!(view.victories, 1);
    assert!(view.dialogs.is_empty());
}

#[test]
fn victory_waits_for_missiles_to_land() {
    let mut s = make_session(1, 1);
    s.set_running(true);
    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    let mut rng = seeded_rng();
    *s.spaceship_mut() = Spaceship::at(0, 650);

    // Let the alien launch; the countdown can run for over a thousand ticks
    let mut launched = false;
    for _ in 0..2000 {
        tick(&mut s, &mut view, &mut sink, &mut rng);
        if s.formation().any_missile_in_flight() {
            launched = true;
            break;
        }
    }
    assert!(launched);

    // Kill the alien and move the ship out of the missile's way
    s.formation_mut().kill(AlienId(0));
    *s.spaceship_mut() = Spaceship::at(1160, 650);
    let report = tick(&mut s, &mut view, &mut sink, &mut rng);
    assert!(!report.victory_raised);
    assert!(s.formation().any_missile_in_flight());

    let mut raised = false;
    for _ in 0..400 {
        if tick(&mut s, &mut view, &mut sink, &mut rng).victory_raised {
            raised = true;
            break;
        }
    }
    assert!(raised);
    assert!(!s.formation().any_missile_in_flight());
    assert_eq!(view.victories, 1);
}

// ── Defeat ────────────────────────────────────────────────────────────────────

#[test]
fn ramming_alien_destroys_ship_and_defeat_is_raised_once() {
    let mut s = make_session(1, 1);
    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    let mut rng = seeded_rng();
    *s.spaceship_mut() = Spaceship::at(450, 40);

    let first = tick(&mut s, &mut view, &mut sink, &mut rng);
    assert!(first.ship_destroyed);
    assert!(!first.defeat_raised);
    assert!(s.spaceship().is_dead());
    assert!(s.formation().get(AlienId(0)).unwrap().is_dead());
    assert_eq!(sink, vec![effects::defeat_sequence()]);
    // One explosion for the alien, one for the ship
    assert_eq!(s.explosions().len(), 2);

    let second = tick(&mut s, &mut view, &mut sink, &mut rng);
    assert!(second.defeat_raised);
    for _ in 0..10 {
        assert!(!tick(&mut s, &mut view, &mut sink, &mut rng).defeat_raised);
    }
    assert_eq!(view.dialogs, vec![Dialog::Defeat]);
    assert_eq!(view.victories, 0);
    assert_eq!(s.phase(), Phase::Defeated);
}

#[test]
fn dead_ship_stays_dead_and_still() {
    let mut s = make_session(1, 1);
    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    s.set_running(true);
    s.spaceship_mut().explode();
    let x = s.spaceship().x();

    s.handle_input(ShipInput::MoveRightStart, &mut sink);
    s.handle_input(ShipInput::Fire, &mut sink);
    let mut rng = seeded_rng();
    for _ in 0..10 {
        tick(&mut s, &mut view, &mut sink, &mut rng);
    }
    assert!(s.spaceship().is_dead());
    assert_eq!(s.spaceship().x(), x);
    assert!(s.spaceship().laser().is_none());
}

#[test]
fn explosions_fade_out() {
    let mut s = make_session(2, 2);
    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    let mut rng = seeded_rng();
    aim_at(&mut s, AlienId(2));
    tick(&mut s, &mut view, &mut sink, &mut rng);
    assert_eq!(s.explosions().len(), 1);

    // Park the ship out of the way and let the explosion run its course
    *s.spaceship_mut() = Spaceship::at(1100, 650);
    for _ in 0..12 {
        tick(&mut s, &mut view, &mut sink, &mut rng);
    }
    assert!(s.explosions().is_empty());
}

// ── Missiles and kamikazi ─────────────────────────────────────────────────────

#[test]
fn each_alien_launches_at_most_five_missiles_then_swarm_goes_kamikazi() {
    // A zero countdown makes every alien launch as soon as it can
    let rules = Rules {
        activation_time_limit: 1,
        ..Rules::default()
    };
    let wave = WaveDefinition::new(1, 1, 2, 8, 100);
    let mut s = Session::new(player_state(wave), rules, &mut seeded_rng());
    s.set_running(true);
    // A dead ship is still a target but cannot be hit
    s.spaceship_mut().explode();

    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    let mut rng = seeded_rng();
    let mut launches = [0u32; 2];
    let mut was_flying = [false; 2];
    let mut engaged_at = None;

    for t in 0..5000 {
        let report = tick(&mut s, &mut view, &mut sink, &mut rng);
        for (i, alien) in s.formation().aliens().iter().enumerate() {
            let flying = alien.has_missile_in_flight();
            if flying && !was_flying[i] {
                launches[i] += 1;
            }
            was_flying[i] = flying;
        }
        if report.kamikazi_engaged {
            assert!(engaged_at.is_none(), "kamikazi engaged twice");
            engaged_at = Some(t);
        }
        if engaged_at.is_some_and(|e| t > e + 100) {
            break;
        }
    }

    assert!(engaged_at.is_some());
    assert_eq!(launches, [5, 5]);
    for alien in s.formation().aliens() {
        assert_eq!(alien.loaded_missiles(), 0);
        assert!(alien.is_kamikazi_mode());
        assert_eq!(alien.movement(), 6);
    }
    assert!(s.formation().is_kamikazi());
}

#[test]
fn missile_hit_destroys_the_ship() {
    let rules = Rules {
        activation_time_limit: 1,
        ..Rules::default()
    };
    let wave = WaveDefinition::new(1, 1, 1, 8, 100);
    let mut s = Session::new(player_state(wave), rules, &mut seeded_rng());
    s.set_running(true);
    // Centred under the alien at the moment it first launches (x = 448)
    *s.spaceship_mut() = Spaceship::at(445, 650);
    let mut view = RecordingView::default();
    let mut sink: Vec<Vec<Effect>> = Vec::new();
    let mut rng = seeded_rng();

    let mut destroyed = false;
    for _ in 0..500 {
        if tick(&mut s, &mut view, &mut sink, &mut rng).ship_destroyed {
            destroyed = true;
            break;
        }
    }
    assert!(destroyed);
    assert!(s.spaceship().is_dead());
    assert!(sink.contains(&effects::defeat_sequence()));
    // The alien was never touched
    assert!(!s.formation().get(AlienId(0)).unwrap().is_dead());
}
