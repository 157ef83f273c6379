//! Projectile motion and retirement
//!
//! Every projectile is advanced by its archetype's motion rule, then checked
//! for retirement in a fixed priority order: ground impact, out of bounds,
//! player hit. A projectile leaves the live set through exactly one of these.

use glam::Vec3;
use rand::Rng;

use super::collision::in_near_miss_shell;
use super::state::{Archetype, ArchetypeKind, Player, Projectile};
use crate::clamp_horizontal;
use crate::consts::*;

/// How a projectile left the live set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retirement {
    /// Crossed y = 0: counts as a dodge
    Impact,
    /// Left the world volume or outlived `MAX_PROJECTILE_AGE`; no effect
    Despawned,
    /// Touched the player
    PlayerHit,
}

/// Everything one kinematics step produced, in projectile id order
#[derive(Debug, Default)]
pub struct StepReport {
    pub retired: Vec<(Projectile, Retirement)>,
    /// Projectiles that entered the near-miss shell for the first time
    pub near_misses: Vec<u32>,
    /// Trail puffs due this step: (position, tint)
    pub trails: Vec<(Vec3, ArchetypeKind)>,
}

/// Apply the archetype's motion rule to `vel`
pub fn steer<R: Rng + ?Sized>(projectile: &mut Projectile, target: Vec3, rng: &mut R, dt: f32) {
    match projectile.archetype {
        Archetype::Regular | Archetype::Cluster => {
            let wind = WIND_JITTER * dt;
            projectile.vel.x += (rng.random::<f32>() - 0.5) * 2.0 * wind;
            projectile.vel.z += (rng.random::<f32>() - 0.5) * 2.0 * wind;
            projectile.vel = clamp_horizontal(projectile.vel, MAX_DRIFT_SPEED);
        }
        Archetype::Homing { ref mut pulse } => {
            let to_target = (target - projectile.pos).normalize_or_zero();
            let strength = (projectile.age * HOMING_GAIN).min(HOMING_MAX_STRENGTH);

            projectile.vel.x += to_target.x * strength * dt;
            projectile.vel.z += to_target.z * strength * dt;
            // Keep a downward bias so homing missiles still come down
            projectile.vel.y += (to_target.y - 1.0) * strength * dt;

            let max_speed = projectile.fall_speed * HOMING_SPEED_CAP;
            let speed = projectile.vel.length();
            if speed > max_speed {
                projectile.vel *= max_speed / speed;
            }
            if speed > 0.1 {
                projectile.axis = projectile.vel.normalize_or(Vec3::NEG_Y);
            }

            let phase = 0.5 + 0.5 * (projectile.age * 10.0).sin();
            *pulse = 0.5 + 0.5 * phase;
        }
        Archetype::Fragment => {
            projectile.vel.y -= FRAGMENT_GRAVITY * dt;
        }
    }
}

/// Advance one projectile: steer, integrate, age, spin, refresh bounds
pub fn integrate<R: Rng + ?Sized>(projectile: &mut Projectile, target: Vec3, rng: &mut R, dt: f32) {
    steer(projectile, target, rng, dt);
    projectile.pos += projectile.vel * dt;
    projectile.age += dt;
    projectile.roll += projectile.spin * dt;
    projectile.refresh_bounds();
}

fn out_of_bounds(pos: Vec3) -> bool {
    pos.x.abs() > WORLD_BOUNDS || pos.z.abs() > WORLD_BOUNDS || pos.y > WORLD_CEILING
}

/// Advance every projectile and pull out the ones that retire this step
pub fn step<R: Rng + ?Sized>(
    projectiles: &mut Vec<Projectile>,
    player: &Player,
    rng: &mut R,
    dt: f32,
) -> StepReport {
    let mut report = StepReport::default();
    let mut live = Vec::with_capacity(projectiles.len());

    for mut projectile in projectiles.drain(..) {
        integrate(&mut projectile, player.pos, rng, dt);

        if projectile.age > projectile.next_trail_at {
            report.trails.push((projectile.pos, projectile.kind()));
            projectile.next_trail_at = projectile.age + TRAIL_INTERVAL;
        }

        if projectile.pos.y < 0.0 {
            report.retired.push((projectile, Retirement::Impact));
            continue;
        }

        if !projectile.near_miss && in_near_miss_shell(projectile.pos, player.pos) {
            projectile.near_miss = true;
            report.near_misses.push(projectile.id);
        }

        if out_of_bounds(projectile.pos) || projectile.age > MAX_PROJECTILE_AGE {
            report.retired.push((projectile, Retirement::Despawned));
            continue;
        }

        if projectile.bounds.intersects(&player.bounds) {
            report.retired.push((projectile, Retirement::PlayerHit));
            continue;
        }

        live.push(projectile);
    }

    *projectiles = live;
    report
}
