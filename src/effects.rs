/// Audio side effects as data.
///
/// The tick engine never plays a sound itself; it hands a short sequence of
/// [`Effect`]s to an [`EffectSink`].  [`EffectPlayer`] runs each sequence on
/// the background executor, so a pause inside a sequence never stalls a
/// tick.

use std::sync::Arc;
use std::time::Duration;

use crate::collaborators::{AudioSink, Sound};
use crate::executor::Spawner;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Play(Sound),
    Stop(Sound),
    Pause(Duration),
}

/// Delay between the ship's explosion and the defeat jingle.
pub const DEFEAT_DELAY: Duration = Duration::from_secs(1);

pub fn laser_shot() -> Vec<Effect> {
    vec![Effect::Play(Sound::Laser)]
}

pub fn alien_explosion() -> Vec<Effect> {
    vec![Effect::Play(Sound::Explosion)]
}

/// Ship destroyed: explode, let it ring, cut the music, play the defeat cue.
pub fn defeat_sequence() -> Vec<Effect> {
    vec![
        Effect::Play(Sound::Explosion),
        Effect::Pause(DEFEAT_DELAY),
        Effect::Stop(Sound::Background),
        Effect::Play(Sound::GameLost),
    ]
}

pub trait EffectSink {
    fn dispatch(&mut self, effects: Vec<Effect>);
}

/// Collects sequences instead of playing them.
impl EffectSink for Vec<Vec<Effect>> {
    fn dispatch(&mut self, effects: Vec<Effect>) {
        self.push(effects);
    }
}

/// Plays effect sequences against an [`AudioSink`] on a background worker.
#[derive(Clone)]
pub struct EffectPlayer {
    spawner: Spawner,
    audio: Arc<dyn AudioSink>,
}

impl EffectPlayer {
    pub fn new(spawner: Spawner, audio: Arc<dyn AudioSink>) -> Self {
        EffectPlayer { spawner, audio }
    }

    pub fn audio(&self) -> Arc<dyn AudioSink> {
        Arc::clone(&self.audio)
    }
}

/// Runs a sequence on the calling thread.
pub fn perform(audio: &dyn AudioSink, effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::Play(sound) => audio.play(*sound),
            Effect::Stop(sound) => audio.stop(*sound),
            Effect::Pause(duration) => std::thread::sleep(*duration),
        }
    }
}

impl EffectSink for EffectPlayer {
    fn dispatch(&mut self, effects: Vec<Effect>) {
        let audio = Arc::clone(&self.audio);
        match self.spawner.try_submit(move || perform(audio.as_ref(), &effects)) {
            Ok(true) => {}
            Ok(false) => tracing::debug!("effect queue full; dropping sound"),
            Err(e) => tracing::warn!("cannot play sound: {e}"),
        }
    }
}
