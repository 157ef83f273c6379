//! Audio cues
//!
//! The simulation never plays sound itself. The frame driver maps game events
//! to cues and hands them to an [`AudioOut`] backend through [`AudioMixer`],
//! which applies the volume settings and swallows backend failures.

use crate::platform::{AudioError, AudioOut};
use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Missile hit the ground
    Impact,
    /// Missile hit the player
    PlayerHit,
    /// Session over
    GameOver,
    Jump,
    Dash,
    /// Alert banner shown
    Alert,
    /// Looping music
    Background,
}

impl SoundCue {
    /// Base volume before settings are applied
    pub fn base_volume(&self) -> f32 {
        match self {
            SoundCue::Impact => 0.4,
            SoundCue::PlayerHit => 0.6,
            SoundCue::GameOver => 0.7,
            SoundCue::Jump => 0.4,
            SoundCue::Dash => 0.3,
            SoundCue::Alert => 0.5,
            SoundCue::Background => 0.5,
        }
    }

    pub fn is_music(&self) -> bool {
        matches!(self, SoundCue::Background)
    }
}

/// Impact loudness scales with missile size, capped at the cue's base volume
pub fn impact_volume(size: f32) -> f32 {
    (size / 5.0).clamp(0.0, SoundCue::Impact.base_volume())
}

/// Cue (and unscaled volume) for a game event, if it has one
pub fn cue_for(event: &GameEvent) -> Option<(SoundCue, f32)> {
    let cue = |c: SoundCue| Some((c, c.base_volume()));
    match event {
        GameEvent::Impact { size, .. } => Some((SoundCue::Impact, impact_volume(*size))),
        GameEvent::PlayerHit { .. } => cue(SoundCue::PlayerHit),
        GameEvent::SessionEnded(_) => cue(SoundCue::GameOver),
        GameEvent::Jumped => cue(SoundCue::Jump),
        GameEvent::Dashed => cue(SoundCue::Dash),
        GameEvent::Alert { .. } => cue(SoundCue::Alert),
        _ => None,
    }
}

/// Volume-aware front for an audio backend
pub struct AudioMixer {
    out: Box<dyn AudioOut>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    /// Backend failures seen so far
    failures: u32,
}

impl AudioMixer {
    pub fn new(out: Box<dyn AudioOut>) -> Self {
        Self {
            out,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            failures: 0,
        }
    }

    pub fn with_settings(out: Box<dyn AudioOut>, settings: &Settings) -> Self {
        let mut mixer = Self::new(out);
        mixer.apply_settings(settings);
        mixer
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_music_volume(settings.music_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Final volume for a cue played at `volume`
    pub fn effective_volume(&self, cue: SoundCue, volume: f32) -> f32 {
        if self.muted {
            return 0.0;
        }
        let channel = if cue.is_music() {
            self.music_volume
        } else {
            self.sfx_volume
        };
        (volume * self.master_volume * channel).clamp(0.0, 1.0)
    }

    /// Play a cue. Best effort: failures are logged and dropped.
    pub fn play(&mut self, cue: SoundCue, volume: f32) {
        let vol = self.effective_volume(cue, volume);
        if vol <= 0.0 {
            return;
        }
        let result = self.out.play(cue, vol);
        self.absorb(result);
    }

    /// Stop a looping cue
    pub fn stop(&mut self, cue: SoundCue) {
        let result = self.out.stop(cue);
        self.absorb(result);
    }

    /// Play whatever cue `event` maps to
    pub fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::SessionStarted => {
                self.play(SoundCue::Background, SoundCue::Background.base_volume());
            }
            GameEvent::SessionEnded(_) => self.stop(SoundCue::Background),
            _ => {}
        }
        if let Some((cue, volume)) = cue_for(event) {
            self.play(cue, volume);
        }
    }

    fn absorb(&mut self, result: Result<(), AudioError>) {
        if let Err(e) = result {
            self.failures += 1;
            log::warn!("Audio: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        played: Rc<RefCell<Vec<(SoundCue, f32)>>>,
        fail: bool,
    }

    impl AudioOut for Recorder {
        fn play(&mut self, cue: SoundCue, volume: f32) -> Result<(), AudioError> {
            if self.fail {
                return Err(AudioError::Unavailable("no device".into()));
            }
            self.played.borrow_mut().push((cue, volume));
            Ok(())
        }
    }

    #[test]
    fn test_impact_volume_scales_with_size() {
        assert!((impact_volume(1.0) - 0.2).abs() < 1e-6);
        assert_eq!(impact_volume(3.0), 0.4);
    }

    #[test]
    fn test_mixer_applies_volumes() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let out = Recorder {
            played: played.clone(),
            fail: false,
        };
        let mut mixer = AudioMixer::new(Box::new(out));
        mixer.set_master_volume(0.5);
        mixer.set_sfx_volume(0.5);
        mixer.on_event(&GameEvent::Jumped);
        let log = played.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0, SoundCue::Jump);
        assert!((log[0].1 - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_muted_plays_nothing() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let mut mixer = AudioMixer::new(Box::new(Recorder {
            played: played.clone(),
            fail: false,
        }));
        mixer.set_muted(true);
        mixer.on_event(&GameEvent::Dashed);
        assert!(played.borrow().is_empty());
    }

    #[test]
    fn test_failures_are_swallowed() {
        let mut mixer = AudioMixer::new(Box::new(Recorder {
            fail: true,
            ..Default::default()
        }));
        mixer.on_event(&GameEvent::Jumped);
        mixer.on_event(&GameEvent::NearMiss);
        assert_eq!(mixer.failures(), 1);
    }
}
