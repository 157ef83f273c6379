//! Platform abstraction layer
//!
//! Narrow interfaces to the collaborators the simulation drives but does not
//! own: input capture, rendering, audio playback and the HUD. Collaborators
//! only ever receive data; nothing they do writes back into a session.

pub mod headless;

use crate::audio::SoundCue;
use crate::sim::TickInput;
use crate::snapshot::{FrameSnapshot, HudMessage};

pub use headless::{IdleInput, LogHud, NullRenderer, ScriptedInput, SilentAudio};

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("audio device unavailable: {0}")]
    Unavailable(String),
    #[error("sound asset {0:?} failed to load")]
    MissingAsset(SoundCue),
    #[error("playback failed: {0}")]
    Playback(String),
}

/// Per-tick input snapshot provider
pub trait InputSource {
    fn poll(&mut self) -> TickInput;
}

/// Receives one scene description per tick. Fire-and-forget.
pub trait Renderer {
    fn render(&mut self, frame: &FrameSnapshot);
}

/// Sound playback backend
pub trait AudioOut {
    fn play(&mut self, cue: SoundCue, volume: f32) -> Result<(), AudioError>;

    /// Stop a looping cue. Backends without loops can ignore this.
    fn stop(&mut self, _cue: SoundCue) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Score, timer, health, alerts and the game-over panel
pub trait Hud {
    fn apply(&mut self, message: &HudMessage);
}
