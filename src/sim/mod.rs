//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (one stream per session)
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod effects;
pub mod kinematics;
pub mod player;
pub mod schedule;
pub mod session;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use difficulty::{DifficultyState, EngagementBand, FlowState, difficulty_for_interval};
pub use effects::{Effect, EffectKind, Effects, Lifecycle};
pub use kinematics::Retirement;
pub use player::{MoveIntent, PlayerActions};
pub use schedule::{Deferred, Schedule};
pub use session::{GameOverSummary, SessionClock, StreakReward, streak_reward};
pub use spawn::{cluster_fragments, determine_archetype, spawn_projectile};
pub use state::{
    Archetype, ArchetypeKind, EndReason, GameEvent, GamePhase, Player, Projectile, Session,
};
pub use tick::{TickInput, end_session, tick};
