//! Coin Dodge - arcade survival against falling market-tagged missiles
//!
//! Core modules:
//! - `sim`: Simulation (spawning, kinematics, collisions, adaptive difficulty)
//! - `roster`: The coin roster consumed at startup
//! - `platform`: Collaborator interfaces (render, audio, HUD, input)
//! - `game`: Frame driver that ties the simulation to its collaborators
//! - `settings`: Player preferences

pub mod audio;
pub mod game;
pub mod platform;
pub mod roster;
pub mod settings;
pub mod sim;
pub mod snapshot;

pub use game::Game;
pub use roster::{Coin, Roster, RosterError};
pub use settings::{QualityPreset, Settings};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Frame delta ceiling (prevents integration blow-up after a stall)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Session length in seconds
    pub const SESSION_SECONDS: f32 = 180.0;
    pub const MAX_HEALTH: f32 = 100.0;

    /// Player movement
    pub const PLAYER_GRAVITY: f32 = 20.0;
    pub const JUMP_VELOCITY: f32 = 10.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const DASH_SPEED: f32 = 15.0;
    pub const DASH_DURATION: f32 = 0.2;
    pub const DASH_COOLDOWN: f32 = 2.0;
    pub const TOUCH_SENSITIVITY: f32 = 0.05;
    /// Horizontal clamp for the player (both axes)
    pub const PLAY_AREA_HALF_EXTENT: f32 = 40.0;

    /// Player collision volume relative to its origin (feet sit below the origin)
    pub const PLAYER_HALF_WIDTH: f32 = 0.775;
    pub const PLAYER_HALF_DEPTH: f32 = 0.4;
    pub const PLAYER_BOTTOM: f32 = -1.3;
    pub const PLAYER_TOP: f32 = 2.3;

    /// Projectile spawn volumes
    pub const SPAWN_AREA: f32 = 80.0;
    pub const SPAWN_HEIGHT_MIN: f32 = 50.0;
    pub const SPAWN_HEIGHT_RANGE: f32 = 10.0;
    pub const HOMING_RING_MIN: f32 = 30.0;
    pub const HOMING_RING_RANGE: f32 = 20.0;
    pub const HOMING_HEIGHT_MIN: f32 = 20.0;
    pub const HOMING_HEIGHT_RANGE: f32 = 10.0;
    pub const HOMING_LAUNCH_SCALE: f32 = 0.8;

    /// Projectile motion
    pub const WIND_JITTER: f32 = 0.1;
    pub const MAX_DRIFT_SPEED: f32 = 3.0;
    pub const HOMING_GAIN: f32 = 0.5;
    pub const HOMING_MAX_STRENGTH: f32 = 3.0;
    pub const HOMING_SPEED_CAP: f32 = 1.5;
    pub const FRAGMENT_GRAVITY: f32 = 9.8;
    /// Anything older than this is despawned silently
    pub const MAX_PROJECTILE_AGE: f32 = 60.0;

    /// Retirement volume
    pub const WORLD_BOUNDS: f32 = 100.0;
    pub const WORLD_CEILING: f32 = 100.0;

    /// Near-miss shell around the player's origin (exclusive on both ends)
    pub const NEAR_MISS_INNER: f32 = 1.0;
    pub const NEAR_MISS_OUTER: f32 = 3.0;
    pub const NEAR_MISS_SLOWDOWN: f32 = 0.7;
    pub const NEAR_MISS_SLOWDOWN_SECS: f32 = 0.5;
    pub const NEAR_MISS_BONUS: f64 = 5.0;

    /// Spawn cadence (milliseconds)
    pub const SPAWN_INTERVAL_DEFAULT_MS: f32 = 2000.0;
    pub const SPAWN_INTERVAL_MIN_MS: f32 = 300.0;
    pub const SPAWN_INTERVAL_MAX_MS: f32 = 2000.0;
    pub const FLOW_INTERVAL_MIN_MS: f32 = 500.0;
    pub const FLOW_INTERVAL_MAX_MS: f32 = 1500.0;
    pub const EXTRA_SPAWN_DELAY_SECS: f32 = 0.5;
    pub const EVALUATION_INTERVAL_MS: f32 = 5000.0;

    /// Cluster burst
    pub const FRAGMENT_MIN: u32 = 5;
    pub const FRAGMENT_MAX: u32 = 9;
    pub const FRAGMENT_SCALE: f32 = 0.4;
    pub const FRAGMENT_START_HEIGHT: f32 = 0.2;

    /// Rewards
    pub const INVULNERABILITY_SECS: f32 = 3.0;
    pub const PICKUP_HEAL: f32 = 20.0;
    pub const PICKUP_LIFETIME: f32 = 15.0;

    /// HUD timings
    pub const ALERT_SECS: f32 = 2.0;
    pub const LAST_HIT_SECS: f32 = 3.0;
    pub const SHAKE_SECS: f32 = 0.5;
    pub const HIT_FLASH_SECS: f32 = 0.2;

    /// Visual effects
    pub const TRAIL_INTERVAL: f32 = 0.05;
    pub const CLOUD_COUNT: usize = 20;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Horizontal (x, z) part of a world vector
#[inline]
pub fn horizontal(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Scale the horizontal part of `v` down so its length is at most `max`
#[inline]
pub fn clamp_horizontal(v: Vec3, max: f32) -> Vec3 {
    let flat = horizontal(v);
    let speed = flat.length();
    if speed > max {
        let flat = flat * (max / speed);
        Vec3::new(flat.x, v.y, flat.y)
    } else {
        v
    }
}

/// Format seconds as `m:ss`
pub fn format_clock(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u32;
    format!("{}:{:02}", total / 60, total % 60)
}
