//! Render and HUD snapshots
//!
//! Collaborators get copies, never references into the session. A frame is
//! built once per tick after the simulation has settled.

use glam::Vec3;
use serde::Serialize;

use crate::format_clock;
use crate::sim::{
    Archetype, ArchetypeKind, Effect, FlowState, GameEvent, GameOverSummary, Session,
};

const SHAKE_INTENSITY: f32 = 0.3;

/// One projectile as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub id: u32,
    pub kind: ArchetypeKind,
    pub pos: Vec3,
    /// Long-axis direction
    pub axis: Vec3,
    /// Spin angle around the long axis
    pub roll: f32,
    pub size: f32,
    /// Coin logo handle
    pub logo: String,
    /// Floating label; fragments carry none
    pub label: Option<String>,
    /// Emissive intensity (0 - 1)
    pub glow: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub pos: Vec3,
    pub heading: f32,
    pub dashing: bool,
    /// Translucent while invulnerable
    pub invulnerable: bool,
    /// Red body flash after a hit
    pub flash: bool,
}

/// Scene description for one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub elapsed: f32,
    pub player: PlayerView,
    pub projectiles: Vec<ProjectileView>,
    pub effects: Vec<Effect>,
    /// Camera shake amplitude, 0 when still
    pub shake: f32,
}

/// Presentation switches taken from the settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub screen_shake: bool,
    pub hit_flash: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            screen_shake: true,
            hit_flash: true,
        }
    }
}

fn glow(archetype: &Archetype) -> f32 {
    match archetype {
        Archetype::Homing { pulse } => *pulse,
        Archetype::Fragment => 0.3,
        Archetype::Regular | Archetype::Cluster => 0.5,
    }
}

impl FrameSnapshot {
    pub fn build(session: &Session, options: ViewOptions) -> Self {
        let projectiles = session
            .projectiles
            .iter()
            .map(|p| {
                let coin = session.roster.get(p.coin);
                let kind = p.kind();
                ProjectileView {
                    id: p.id,
                    kind,
                    pos: p.pos,
                    axis: p.axis,
                    roll: p.roll,
                    size: p.size,
                    logo: coin.map(|c| c.logo.clone()).unwrap_or_default(),
                    label: match kind {
                        ArchetypeKind::Fragment => None,
                        _ => coin.map(|c| c.label(kind)),
                    },
                    glow: glow(&p.archetype),
                }
            })
            .collect();

        let shake = if options.screen_shake && session.shake > 0.0 {
            SHAKE_INTENSITY * (session.shake / crate::consts::SHAKE_SECS)
        } else {
            0.0
        };

        Self {
            elapsed: session.clock.elapsed,
            player: PlayerView {
                pos: session.player.pos,
                heading: session.player.heading,
                dashing: session.player.is_dashing(),
                invulnerable: session.player.invulnerable,
                flash: options.hit_flash && session.hit_flash > 0.0,
            },
            projectiles,
            effects: session.effects.iter().copied().collect(),
            shake,
        }
    }
}

/// Always-on HUD readout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudStatus {
    pub score: u64,
    /// `m:ss` remaining
    pub time_remaining: String,
    /// 0 - 100
    pub health_percent: f32,
    pub health_color: &'static str,
    pub dash_cooldown: f32,
    pub flow_state: FlowState,
    pub last_hit: Option<String>,
}

impl HudStatus {
    pub fn build(session: &Session) -> Self {
        let health_percent = session.player.health_fraction() * 100.0;
        Self {
            score: session.clock.score(),
            time_remaining: format_clock(session.clock.remaining()),
            health_percent,
            health_color: health_color(health_percent),
            dash_cooldown: session
                .player
                .dash_cooldown_remaining(session.clock.elapsed),
            flow_state: session.difficulty.flow_state,
            last_hit: session.last_hit.clone(),
        }
    }
}

/// Health bar colour: red under 25, orange under 50
pub fn health_color(percent: f32) -> &'static str {
    if percent < 25.0 {
        "#f44336"
    } else if percent < 50.0 {
        "#ff9800"
    } else {
        "#4CAF50"
    }
}

/// Messages pushed to the HUD collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum HudMessage {
    Status(HudStatus),
    Alert {
        text: &'static str,
        color: &'static str,
    },
    AlertCleared,
    /// Timer colour pulse in the final seconds
    TimeWarning { color: &'static str },
    NearMiss,
    GameOver(GameOverSummary),
}

impl HudMessage {
    /// HUD message for a game event, if the HUD cares about it
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Alert { text, color } => Some(HudMessage::Alert {
                text: *text,
                color: *color,
            }),
            GameEvent::AlertCleared => Some(HudMessage::AlertCleared),
            GameEvent::TimeWarning { urgent } => Some(HudMessage::TimeWarning {
                color: if *urgent { "#f44336" } else { "#ff9800" },
            }),
            GameEvent::NearMiss => Some(HudMessage::NearMiss),
            GameEvent::SessionEnded(summary) => Some(HudMessage::GameOver(summary.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Coin, Roster};
    use crate::sim::{TickInput, tick};

    fn running_session() -> Session {
        let roster = Roster::from_coins(vec![Coin::new(1, "Bonk", "BONK", -12.7)]);
        let mut session = Session::new(roster, 3);
        tick(&mut session, &TickInput::default(), 1.0 / 60.0);
        session
    }

    #[test]
    fn test_frame_has_labels() {
        let session = running_session();
        let frame = FrameSnapshot::build(&session, ViewOptions::default());
        assert_eq!(frame.projectiles.len(), 1);
        let label = frame.projectiles[0].label.as_deref().unwrap();
        assert!(label.starts_with("BONK: -12.70%"));
        assert!(!frame.effects.is_empty());
    }

    #[test]
    fn test_shake_respects_options() {
        let mut session = running_session();
        session.shake = 0.25;
        let on = FrameSnapshot::build(&session, ViewOptions::default());
        assert!((on.shake - 0.15).abs() < 1e-5);
        let off = FrameSnapshot::build(
            &session,
            ViewOptions {
                screen_shake: false,
                hit_flash: true,
            },
        );
        assert_eq!(off.shake, 0.0);
    }

    #[test]
    fn test_hud_status() {
        let mut session = running_session();
        session.player.health = 40.0;
        let hud = HudStatus::build(&session);
        assert_eq!(hud.health_color, "#ff9800");
        assert_eq!(hud.time_remaining, "2:59");
        assert_eq!(hud.score, 0);
    }

    #[test]
    fn test_frame_serializes() {
        let session = running_session();
        let frame = FrameSnapshot::build(&session, ViewOptions::default());
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"projectiles\""));
    }
}
