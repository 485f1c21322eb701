#![allow(dead_code)]

use alien_intruders::collaborators::{Dialog, Presentation};
use alien_intruders::records::PlayerState;
use alien_intruders::session::Session;
use alien_intruders::waves::WaveDefinition;

use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

pub fn player_state(wave: WaveDefinition) -> PlayerState {
    PlayerState::fresh("tester", wave, 0)
}

/// A presentation that only remembers what it was asked to show.
#[derive(Default, Debug)]
pub struct RecordingView {
    pub option_showing: bool,
    pub victory_showing: bool,
    pub dialogs: Vec<Dialog>,
    pub victories: usize,
    pub messages: Vec<String>,
    pub message: Option<String>,
    pub redraws: usize,
    pub redraws_without_session: usize,
}

impl Presentation for RecordingView {
    fn is_option_showing(&self) -> bool {
        self.option_showing
    }

    fn set_option_showing(&mut self, showing: bool) {
        self.option_showing = showing;
    }

    fn is_victory_showing(&self) -> bool {
        self.victory_showing
    }

    fn set_victory_showing(&mut self, showing: bool) {
        self.victory_showing = showing;
    }

    fn show_option_dialog(&mut self, dialog: Dialog) {
        self.dialogs.push(dialog);
    }

    fn show_victory(&mut self) {
        self.victories += 1;
    }

    fn show_message(&mut self, text: &str) {
        self.messages.push(text.to_string());
        self.message = Some(text.to_string());
    }

    fn clear_message(&mut self) {
        self.message = None;
    }

    fn request_redraw(&mut self, session: Option<&Session>) {
        self.redraws += 1;
        if session.is_none() {
            self.redraws_without_session += 1;
        }
    }
}
