//! Player controller
//!
//! Grounded, airborne and dashing are derived from `on_ground` and
//! `dash_remaining` rather than stored as a separate state tag, so the three
//! can overlap (a dash may start mid-jump).

use glam::Vec2;

use super::collision::player_bounds;
use super::state::Player;
use crate::consts::*;
use crate::normalize_angle;

/// Per-tick movement intent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Analog stick offset (x, forward-is-negative y), unnormalized
    pub touch: Option<Vec2>,
    pub jump: bool,
    pub dash: bool,
}

impl MoveIntent {
    /// Unit direction from the digital inputs (zero when idle or cancelled out)
    pub fn direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.forward {
            dir.y -= 1.0;
        }
        if self.backward {
            dir.y += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir.normalize_or_zero()
    }
}

/// Impulses that started this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerActions {
    pub jumped: bool,
    pub dashed: bool,
}

impl Player {
    /// Horizontal speed multiplier (3x while dashing)
    pub fn dash_factor(&self) -> f32 {
        if self.is_dashing() {
            DASH_SPEED / PLAYER_SPEED
        } else {
            1.0
        }
    }

    fn can_dash(&self, now: f32) -> bool {
        !self.is_dashing() && self.last_dash_at.is_none_or(|t| now - t > DASH_COOLDOWN)
    }

    /// Advance the player by `dt`. `now` is session time in seconds.
    pub fn update(&mut self, intent: &MoveIntent, now: f32, dt: f32) -> PlayerActions {
        let mut actions = PlayerActions::default();

        if intent.jump && self.on_ground {
            self.vel.y = JUMP_VELOCITY;
            self.on_ground = false;
            actions.jumped = true;
        }

        if intent.dash && self.can_dash(now) {
            self.dash_remaining = DASH_DURATION;
            self.last_dash_at = Some(now);
            actions.dashed = true;
        }

        if !self.on_ground {
            self.vel.y -= PLAYER_GRAVITY * dt;
        }

        // Factor is sampled before the dash window is consumed
        let dash_factor = self.dash_factor();
        if self.is_dashing() {
            self.dash_remaining = (self.dash_remaining - dt).max(0.0);
        }

        let dir = intent.direction();
        let speed = PLAYER_SPEED * dash_factor;
        self.vel.x = dir.x * speed;
        self.vel.z = dir.y * speed;
        self.pos.x += self.vel.x * dt;
        self.pos.z += self.vel.z * dt;

        if let Some(touch) = intent.touch {
            let sensitivity = TOUCH_SENSITIVITY * dash_factor;
            self.pos.x += touch.x * sensitivity * dt;
            self.pos.z += touch.y * sensitivity * dt;
        }

        self.pos.y += self.vel.y * dt;
        if self.pos.y <= 0.0 {
            self.pos.y = 0.0;
            self.vel.y = 0.0;
            self.on_ground = true;
        }

        self.pos.x = self.pos.x.clamp(-PLAY_AREA_HALF_EXTENT, PLAY_AREA_HALF_EXTENT);
        self.pos.z = self.pos.z.clamp(-PLAY_AREA_HALF_EXTENT, PLAY_AREA_HALF_EXTENT);

        if dir != Vec2::ZERO {
            let target = dir.x.atan2(dir.y);
            let diff = normalize_angle(target - self.heading);
            self.heading = normalize_angle(self.heading + diff * (10.0 * dt).min(1.0));
        }

        self.bounds = player_bounds(self.pos);
        actions
    }

    /// Restore health, capped at max. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    /// Apply damage, clamped at zero. Returns true when health ran out.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health = (self.health - amount.max(0.0)).max(0.0);
        self.health <= 0.0
    }
}
