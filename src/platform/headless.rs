//! Headless collaborators
//!
//! Log-backed stand-ins used by the native runner and by tests.

use std::collections::VecDeque;

use super::{AudioError, AudioOut, Hud, InputSource, Renderer};
use crate::audio::SoundCue;
use crate::sim::TickInput;
use crate::snapshot::{FrameSnapshot, HudMessage};

/// Hands control to the autopilot every tick
#[derive(Debug, Default)]
pub struct IdleInput;

impl InputSource for IdleInput {
    fn poll(&mut self) -> TickInput {
        TickInput {
            idle_mode: true,
            ..Default::default()
        }
    }
}

/// Replays a fixed list of inputs, then repeats `fallback` forever
#[derive(Debug, Default)]
pub struct ScriptedInput {
    queue: VecDeque<TickInput>,
    fallback: TickInput,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = TickInput>) -> Self {
        Self {
            queue: script.into_iter().collect(),
            fallback: TickInput::default(),
        }
    }

    pub fn then(mut self, fallback: TickInput) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> TickInput {
        self.queue
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Drops frames, keeping a count and the most recent one
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
    pub last: Option<FrameSnapshot>,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &FrameSnapshot) {
        self.frames += 1;
        if self.frames % 600 == 0 {
            log::debug!(
                "Frame {}: {} projectiles, {} effects",
                self.frames,
                frame.projectiles.len(),
                frame.effects.len()
            );
        }
        self.last = Some(frame.clone());
    }
}

/// Accepts every cue and plays nothing
#[derive(Debug, Default)]
pub struct SilentAudio {
    pub cues: u64,
}

impl AudioOut for SilentAudio {
    fn play(&mut self, cue: SoundCue, volume: f32) -> Result<(), AudioError> {
        self.cues += 1;
        log::trace!("Cue {cue:?} at {volume:.2}");
        Ok(())
    }
}

/// Writes alerts and the game-over panel to the log
#[derive(Debug, Default)]
pub struct LogHud {
    pub alerts: Vec<&'static str>,
    pub game_over: Option<crate::sim::GameOverSummary>,
}

impl Hud for LogHud {
    fn apply(&mut self, message: &HudMessage) {
        match message {
            HudMessage::Status(_) | HudMessage::AlertCleared => {}
            HudMessage::Alert { text, .. } => {
                log::info!("{text}");
                self.alerts.push(*text);
            }
            HudMessage::TimeWarning { color } => log::debug!("Timer warning ({color})"),
            HudMessage::NearMiss => log::debug!("Near miss!"),
            HudMessage::GameOver(summary) => {
                log::info!(
                    "Final Score: {} | Coins Dodged: {} | Time Survived: {}",
                    summary.score,
                    summary.coins_dodged,
                    summary.time_survived()
                );
                self.game_over = Some(summary.clone());
            }
        }
    }
}
