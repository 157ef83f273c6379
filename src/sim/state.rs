//! Session state and core simulation types
//!
//! A `Session` is the explicit context every tick operates on. Nothing in the
//! simulation reaches for global state.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, fragment_bounds, missile_bounds, player_bounds};
use super::difficulty::DifficultyState;
use super::effects::Effects;
use super::schedule::Schedule;
use super::session::{GameOverSummary, SessionClock};
use crate::consts::*;
use crate::roster::Roster;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Terminal until restarted
    Ended,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TimeUp,
    HealthDepleted,
}

/// Archetype tag without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchetypeKind {
    Regular,
    Homing,
    Cluster,
    Fragment,
}

/// Projectile behavior. Fixed for the projectile's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Archetype {
    /// Falls with wind drift
    Regular,
    /// Steers toward the player
    Homing {
        /// Emissive pulse intensity (0.5 - 1.0)
        pulse: f32,
    },
    /// Falls with wind drift, bursts into fragments on impact
    Cluster,
    /// Ballistic debris from a cluster burst
    Fragment,
}

impl Archetype {
    pub fn from_kind(kind: ArchetypeKind) -> Self {
        match kind {
            ArchetypeKind::Regular => Archetype::Regular,
            ArchetypeKind::Homing => Archetype::Homing { pulse: 1.0 },
            ArchetypeKind::Cluster => Archetype::Cluster,
            ArchetypeKind::Fragment => Archetype::Fragment,
        }
    }

    pub fn kind(&self) -> ArchetypeKind {
        match self {
            Archetype::Regular => ArchetypeKind::Regular,
            Archetype::Homing { .. } => ArchetypeKind::Homing,
            Archetype::Cluster => ArchetypeKind::Cluster,
            Archetype::Fragment => ArchetypeKind::Fragment,
        }
    }
}

/// A falling missile or cluster fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    /// Index into the session roster
    pub coin: usize,
    pub archetype: Archetype,
    pub pos: Vec3,
    pub vel: Vec3,
    /// Seconds since spawn
    pub age: f32,
    /// Spin around the long axis (radians/sec)
    pub spin: f32,
    /// Accumulated spin angle
    pub roll: f32,
    /// Long-axis direction (missiles point down until homing steers them)
    pub axis: Vec3,
    /// Visual scale (fragments are smaller than their parent)
    pub size: f32,
    pub fall_speed: f32,
    pub damage: f32,
    pub bounds: Aabb,
    /// Latched once the near-miss event fired
    pub near_miss: bool,
    /// Outstanding near-miss slowdown layers applied to `vel`
    #[serde(default)]
    pub slowed: u8,
    /// Age at which the next trail particle is due
    #[serde(skip)]
    pub next_trail_at: f32,
}

impl Projectile {
    pub fn kind(&self) -> ArchetypeKind {
        self.archetype.kind()
    }

    /// Rebuild the collision volume from the current pose
    pub fn refresh_bounds(&mut self) {
        self.bounds = match self.archetype {
            Archetype::Fragment => fragment_bounds(self.pos, self.size),
            _ => missile_bounds(self.pos, self.axis, self.size),
        };
    }
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec3,
    pub vel: Vec3,
    pub on_ground: bool,
    pub health: f32,
    pub max_health: f32,
    /// Seconds left in the current dash (0 when not dashing)
    pub dash_remaining: f32,
    /// Session time of the last dash
    pub last_dash_at: Option<f32>,
    /// Facing angle around the vertical axis
    pub heading: f32,
    /// Hits are absorbed while set
    pub invulnerable: bool,
    pub bounds: Aabb,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            on_ground: true,
            health: MAX_HEALTH,
            max_health: MAX_HEALTH,
            dash_remaining: 0.0,
            last_dash_at: None,
            heading: 0.0,
            invulnerable: false,
            bounds: player_bounds(Vec3::ZERO),
        }
    }
}

impl Player {
    pub fn is_dashing(&self) -> bool {
        self.dash_remaining > 0.0
    }

    pub fn is_airborne(&self) -> bool {
        !self.on_ground
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }

    /// Seconds until a dash may start again
    pub fn dash_cooldown_remaining(&self, now: f32) -> f32 {
        self.last_dash_at
            .map_or(0.0, |t| (t + DASH_COOLDOWN - now).max(0.0))
    }
}

/// Side-channel notifications produced by a tick, drained by the frame driver
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    SessionStarted,
    Alert {
        text: &'static str,
        color: &'static str,
    },
    AlertCleared,
    Jumped,
    Dashed,
    Impact {
        pos: Vec3,
        size: f32,
        kind: ArchetypeKind,
    },
    PlayerHit {
        coin: String,
        percent_change: f32,
        damage: f32,
    },
    HitAbsorbed,
    LastHitCleared,
    NearMiss,
    StreakBonus { streak: u32, bonus: u32 },
    HealthRestored { amount: f32 },
    TimeWarning { urgent: bool },
    SessionEnded(GameOverSummary),
}

/// Complete state of one play session
#[derive(Debug, Clone)]
pub struct Session {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Bumped on every restart; scopes deferred effects to their session
    pub generation: u32,
    pub rng: Pcg32,
    pub roster: Roster,
    pub phase: GamePhase,
    pub end_reason: Option<EndReason>,
    pub player: Player,
    /// Live projectiles (sorted by id)
    pub projectiles: Vec<Projectile>,
    pub difficulty: DifficultyState,
    pub clock: SessionClock,
    pub effects: Effects,
    pub schedule: Schedule,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    /// Session time (ms) of the last regular spawn
    pub last_spawn_ms: Option<f32>,
    /// Text describing the most recent hit, while visible
    pub last_hit: Option<String>,
    /// Camera shake seconds remaining
    pub shake: f32,
    /// Player hit-flash seconds remaining
    pub hit_flash: f32,
    pub(super) next_id: u32,
}

impl Session {
    /// Create a new session over `roster` with the given seed
    pub fn new(roster: Roster, seed: u64) -> Self {
        Self::with_generation(roster, seed, 0)
    }

    fn with_generation(roster: Roster, seed: u64, generation: u32) -> Self {
        let mut session = Self {
            seed,
            generation,
            rng: Pcg32::seed_from_u64(seed),
            roster,
            phase: GamePhase::Running,
            end_reason: None,
            player: Player::default(),
            projectiles: Vec::new(),
            difficulty: DifficultyState::default(),
            clock: SessionClock::default(),
            effects: Effects::default(),
            schedule: Schedule::default(),
            events: Vec::new(),
            last_spawn_ms: None,
            last_hit: None,
            shake: 0.0,
            hit_flash: 0.0,
            next_id: 1,
        };

        if session.roster.is_empty() {
            log::warn!("Session started with an empty roster; nothing will spawn");
        }
        session.effects.seed_clouds(&mut session.rng);
        session.events.push(GameEvent::SessionStarted);
        session.alert("Get Ready!", "#4CAF50");
        log::info!(
            "Session {} started (seed {}, {} coins)",
            generation,
            seed,
            session.roster.len()
        );
        session
    }

    /// Reset everything for a new run in one step. Live projectiles, pending
    /// deferred effects and difficulty state from the old run are discarded.
    pub fn restart(&mut self, seed: u64) {
        let roster = std::mem::take(&mut self.roster);
        let budget = self.effects.budget();
        *self = Self::with_generation(roster, seed, self.generation.wrapping_add(1));
        self.effects.set_budget(budget);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Session time in milliseconds
    pub fn now_ms(&self) -> f32 {
        self.clock.elapsed * 1000.0
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Show an alert and schedule it to hide
    pub fn alert(&mut self, text: &'static str, color: &'static str) {
        self.events.push(GameEvent::Alert { text, color });
        let due = self.clock.elapsed + ALERT_SECS;
        self.schedule.push(due, super::schedule::Deferred::HideAlert);
    }

    /// End-of-run figures as they stand now
    pub fn summary(&self) -> GameOverSummary {
        GameOverSummary {
            score: self.clock.score(),
            coins_dodged: self.difficulty.coins_dodged,
            coins_hit: self.difficulty.coins_hit,
            seconds_survived: self.clock.elapsed.min(self.clock.max_seconds),
            health_depleted: self.end_reason == Some(EndReason::HealthDepleted),
        }
    }

    /// Ensure projectiles are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.projectiles.sort_by_key(|p| p.id);
    }
}
