mod common;

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use alien_intruders::collaborators::{AudioSink, Dialog, DialogChoice, Persistence, Sound};
use alien_intruders::config::GameConfig;
use alien_intruders::formation::AlienId;
use alien_intruders::game::{Flow, Game};
use alien_intruders::session::Phase;
use alien_intruders::spaceship::ShipInput;
use alien_intruders::store::JsonStore;
use alien_intruders::waves::WaveDefinition;

use common::RecordingView;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingAudio {
    played: Mutex<Vec<Sound>>,
    stopped: Mutex<Vec<Sound>>,
}

impl RecordingAudio {
    fn played(&self) -> Vec<Sound> {
        self.played.lock().unwrap().clone()
    }

    fn stopped(&self) -> Vec<Sound> {
        self.stopped.lock().unwrap().clone()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&self, sound: Sound) {
        self.played.lock().unwrap().push(sound);
    }

    fn stop(&self, sound: Sound) {
        self.stopped.lock().unwrap().push(sound);
    }
}

struct Harness {
    _dir: TempDir,
    store: Arc<JsonStore>,
    audio: Arc<RecordingAudio>,
    view: RecordingView,
    game: Game,
}

fn harness() -> Harness {
    harness_with_intro_pause(0)
}

fn harness_with_intro_pause(intro_pause_ms: u64) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config = GameConfig {
        data_dir: dir.path().to_path_buf(),
        intro_pause_ms,
        seed: Some(7),
        // Keep the aliens from firing during these tests
        activation_time_limit_ms: 1_000_000_000,
        waves: vec![
            WaveDefinition::new(1, 1, 1, 4, 100),
            WaveDefinition::new(2, 1, 1, 4, 250),
        ],
        ..GameConfig::default()
    };
    let store = Arc::new(JsonStore::open(&config.data_dir).unwrap());
    let waves = Arc::new(config.wave_table().unwrap());
    let audio = Arc::new(RecordingAudio::default());
    let game = Game::new(config, store.clone(), waves, audio.clone(), "tester").unwrap();
    Harness {
        _dir: dir,
        store,
        audio,
        view: RecordingView::default(),
        game,
    }
}

/// Ticks until `done` holds, giving background work a moment between ticks.
fn tick_until(h: &mut Harness, done: impl Fn(&Game, &RecordingView) -> bool) -> bool {
    for _ in 0..5000 {
        h.game.tick(&mut h.view).unwrap();
        if done(&h.game, &h.view) {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

fn running_on_wave(wave: u32) -> impl Fn(&Game, &RecordingView) -> bool {
    move |game: &Game, _: &RecordingView| {
        game.phase() == Phase::Running && game.session().is_some_and(|s| s.wave().wave == wave)
    }
}

// ── Start-up ──────────────────────────────────────────────────────────────────

#[test]
fn game_is_not_initialized_before_start() {
    let mut h = harness();
    assert_eq!(h.game.phase(), Phase::NotInitialized);
    h.game.handle_input(ShipInput::Fire);
    assert_eq!(h.game.tick(&mut h.view).unwrap(), None);
    assert_eq!(h.view.redraws_without_session, 1);
}

#[test]
fn intro_announces_the_wave_then_runs() {
    let mut h = harness();
    h.game.start(&mut h.view).unwrap();
    assert!(tick_until(&mut h, running_on_wave(1)));

    assert!(h.view.messages.contains(&"WAVE 1".to_string()));
    assert!(h.view.messages.contains(&"FIGHT!".to_string()));
    assert_eq!(h.view.message, None);

    // Background music starts once the intro is over
    thread::sleep(Duration::from_millis(20));
    let played = h.audio.played();
    assert_eq!(played.first(), Some(&Sound::BuildUp));
    assert!(played.contains(&Sound::Background));
}

#[test]
fn restarting_during_the_intro_plays_a_fresh_intro() {
    let mut h = harness_with_intro_pause(100);
    h.game.start(&mut h.view).unwrap();
    assert!(tick_until(&mut h, |game, _| game.session().is_some()));

    // Abandon the first run while its intro is still playing
    h.game.start(&mut h.view).unwrap();
    thread::sleep(Duration::from_millis(400));
    assert!(tick_until(&mut h, |game, _| game.session().is_some()));
    assert_eq!(h.game.phase(), Phase::Initialized);

    assert!(tick_until(&mut h, running_on_wave(1)));
    let fights = h.view.messages.iter().filter(|m| *m == "FIGHT!").count();
    assert_eq!(fights, 1);
}

// ── Defeat ────────────────────────────────────────────────────────────────────

#[test]
fn defeat_then_main_menu_records_the_score() {
    let mut h = harness();
    h.game.start(&mut h.view).unwrap();
    assert!(tick_until(&mut h, running_on_wave(1)));

    h.game.session_mut().unwrap().spaceship_mut().explode();
    h.game.tick(&mut h.view).unwrap();
    assert_eq!(h.view.dialogs, vec![Dialog::Defeat]);
    assert_eq!(h.game.phase(), Phase::Defeated);

    let flow = h.game.choose(Dialog::Defeat, DialogChoice::MainMenu, &mut h.view).unwrap();
    assert_eq!(flow, Flow::MainMenu);
    assert_eq!(h.game.phase(), Phase::NotInitialized);
    assert!(!h.view.option_showing);

    let scores = h.store.list_scores().unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].player_name, "tester");
    assert!(h.store.load_player_state("tester").unwrap().unwrap().terminated);
}

#[test]
fn exit_from_the_dialog_ends_the_game() {
    let mut h = harness();
    h.game.start(&mut h.view).unwrap();
    assert!(tick_until(&mut h, running_on_wave(1)));
    h.game.session_mut().unwrap().spaceship_mut().explode();
    h.game.tick(&mut h.view).unwrap();

    let flow = h.game.choose(Dialog::Defeat, DialogChoice::Exit, &mut h.view).unwrap();
    assert_eq!(flow, Flow::Exit);
}

// ── Waves and final victory ───────────────────────────────────────────────────

#[test]
fn clearing_every_wave_flies_off_and_play_again_resets() {
    let mut h = harness();
    h.game.start(&mut h.view).unwrap();
    assert!(tick_until(&mut h, running_on_wave(1)));

    // Wave 1 → wave 2, score carried over and saved
    h.game.session_mut().unwrap().formation_mut().kill(AlienId(0));
    assert!(tick_until(&mut h, running_on_wave(2)));
    assert_eq!(h.game.session().unwrap().score(), 100);
    let saved = h.store.load_player_state("tester").unwrap().unwrap();
    assert_eq!(saved.wave.wave, 2);
    assert!(!saved.terminated);
    assert!(h.store.list_scores().unwrap().is_empty());

    // Wave 2 is the last: the ship flies off, then the dialog shows
    h.game.session_mut().unwrap().formation_mut().kill(AlienId(0));
    assert!(tick_until(&mut h, |_, view| view.dialogs.contains(&Dialog::FinalVictory)));
    assert!(h.game.session().unwrap().spaceship().has_left_panel());
    assert!(!h.game.is_flying_off());
    assert!(h.audio.stopped().contains(&Sound::Background));
    assert!(h.audio.played().contains(&Sound::Victory));

    let scores = h.store.list_scores().unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].score, 350);

    // Playing again starts over from wave 1 with a clean score
    let flow = h
        .game
        .choose(Dialog::FinalVictory, DialogChoice::PlayAgain, &mut h.view)
        .unwrap();
    assert_eq!(flow, Flow::Continue);
    assert!(tick_until(&mut h, running_on_wave(1)));
    assert_eq!(h.game.session().unwrap().score(), 0);
    // A final victory is not saved twice
    assert_eq!(h.store.list_scores().unwrap().len(), 1);
}
