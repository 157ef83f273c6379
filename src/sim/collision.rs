//! Collision volumes and proximity tests
//!
//! Everything is an axis-aligned box rebuilt from the current pose every tick.
//! Projectile counts stay small, so the per-frame test is a plain linear scan.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Boxes that merely touch count as intersecting
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}

/// Player collision volume for a given origin
pub fn player_bounds(pos: Vec3) -> Aabb {
    Aabb::new(
        pos + Vec3::new(-PLAYER_HALF_WIDTH, PLAYER_BOTTOM, -PLAYER_HALF_DEPTH),
        pos + Vec3::new(PLAYER_HALF_WIDTH, PLAYER_TOP, PLAYER_HALF_DEPTH),
    )
}

/// Bounds of a tapered missile body: length `2 * size`, widest radius `0.5 * size`,
/// long axis along `axis`.
///
/// Per world axis the half extent is the projected half length plus the radius
/// of the cross-section disc seen edge-on.
pub fn missile_bounds(pos: Vec3, axis: Vec3, size: f32) -> Aabb {
    let axis = axis.try_normalize().unwrap_or(Vec3::NEG_Y);
    let half_length = size;
    let radius = 0.5 * size;
    let disc = |a: f32| (1.0 - a * a).max(0.0).sqrt();
    let half = Vec3::new(
        axis.x.abs() * half_length + radius * disc(axis.x),
        axis.y.abs() * half_length + radius * disc(axis.y),
        axis.z.abs() * half_length + radius * disc(axis.z),
    );
    Aabb::from_center(pos, half)
}

/// Bounds of a spherical fragment
pub fn fragment_bounds(pos: Vec3, radius: f32) -> Aabb {
    Aabb::from_center(pos, Vec3::splat(radius))
}

/// Whether a projectile is inside the near-miss shell around the player.
/// Grounded projectiles never count.
pub fn in_near_miss_shell(projectile: Vec3, player: Vec3) -> bool {
    let dist = projectile.distance(player);
    projectile.y > 0.0 && dist > NEAR_MISS_INNER && dist < NEAR_MISS_OUTER
}
