//! Transient visual effects registry
//!
//! Clouds, particles, craters and pickups share one list. Each entry is a
//! tagged variant with its own small payload and advances itself; the
//! registry drops whatever reports `Expire`.

use glam::Vec3;
use rand::Rng;
use serde::Serialize;

use super::collision::{Aabb, player_bounds};
use super::state::ArchetypeKind;
use crate::consts::*;

/// Default cap on live effects (clouds and pickups are exempt)
pub const DEFAULT_EFFECT_BUDGET: usize = 500;

/// Result of advancing an effect one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Continue,
    Expire,
}

/// Effect payloads
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum EffectKind {
    /// Scorch mark left by an impact (fades after 1s, gone at 5s)
    Crater {
        radius: f32,
        tint: ArchetypeKind,
        age: f32,
    },
    /// Impact debris with gravity
    Spark {
        vel: Vec3,
        age: f32,
        lifespan: f32,
        tint: ArchetypeKind,
    },
    /// Missile exhaust puff that drifts upward and grows
    Trail {
        age: f32,
        lifespan: f32,
        tint: ArchetypeKind,
    },
    /// Drifting cloud, wraps around the world edge
    Cloud {
        heading: Vec3,
        speed: f32,
        scale: f32,
    },
    /// Short burst left behind by a dash
    DashBurst { age: f32 },
    /// Hovering heal pickup
    HealthPickup { age: f32, spin: f32 },
}

/// A positioned effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Effect {
    pub pos: Vec3,
    pub kind: EffectKind,
}

impl Effect {
    pub fn new(pos: Vec3, kind: EffectKind) -> Self {
        Self { pos, kind }
    }

    /// Advance by `dt` seconds
    pub fn advance(&mut self, dt: f32) -> Lifecycle {
        match &mut self.kind {
            EffectKind::Crater { age, .. } => {
                *age += dt;
                expire_after(*age, 5.0)
            }
            EffectKind::Spark { vel, age, lifespan, .. } => {
                self.pos += *vel * dt;
                vel.y -= FRAGMENT_GRAVITY * dt;
                *age += dt;
                if *age >= *lifespan || self.pos.y < 0.0 {
                    Lifecycle::Expire
                } else {
                    Lifecycle::Continue
                }
            }
            EffectKind::Trail { age, lifespan, .. } => {
                *age += dt;
                self.pos.y += 0.5 * dt;
                expire_after(*age, *lifespan)
            }
            EffectKind::Cloud { heading, speed, .. } => {
                self.pos.x += heading.x * *speed * dt;
                self.pos.z += heading.z * *speed * dt;
                if self.pos.x.abs() > WORLD_BOUNDS || self.pos.z.abs() > WORLD_BOUNDS {
                    self.pos.x = -self.pos.x * 0.9;
                    self.pos.z = -self.pos.z * 0.9;
                }
                Lifecycle::Continue
            }
            EffectKind::DashBurst { age } => {
                *age += dt;
                expire_after(*age, 0.5)
            }
            EffectKind::HealthPickup { age, spin } => {
                *age += dt;
                *spin += 2.0 * dt;
                self.pos.y = 1.0 + (*age * 2.0).sin() * 0.2;
                expire_after(*age, PICKUP_LIFETIME)
            }
        }
    }

    /// Opacity for the renderer (0 - 1)
    pub fn opacity(&self) -> f32 {
        match self.kind {
            EffectKind::Crater { age, .. } => {
                if age <= 1.0 {
                    1.0
                } else {
                    (1.0 - (age - 1.0) / 4.0).clamp(0.0, 1.0)
                }
            }
            EffectKind::Spark { age, lifespan, .. } | EffectKind::Trail { age, lifespan, .. } => {
                0.8 * (1.0 - age / lifespan).clamp(0.0, 1.0)
            }
            EffectKind::Cloud { .. } => 0.9,
            EffectKind::DashBurst { age } => (1.0 - age / 0.5).clamp(0.0, 1.0),
            EffectKind::HealthPickup { .. } => 1.0,
        }
    }

    /// Scale multiplier for the renderer
    pub fn scale(&self) -> f32 {
        match self.kind {
            EffectKind::Crater { radius, .. } => radius,
            EffectKind::Spark { age, lifespan, .. } => 1.0 + (age / lifespan).min(1.0),
            EffectKind::Trail { age, lifespan, .. } => 1.0 + 2.0 * (age / lifespan).min(1.0),
            EffectKind::Cloud { scale, .. } => scale,
            EffectKind::DashBurst { age } => 1.0 + age * 4.0,
            EffectKind::HealthPickup { age, .. } => 1.0 + (age * 3.3).sin() * 0.1,
        }
    }

    /// Cosmetic effects may be dropped when the registry is full
    fn is_cosmetic(&self) -> bool {
        !matches!(
            self.kind,
            EffectKind::Cloud { .. } | EffectKind::HealthPickup { .. }
        )
    }

    fn pickup_bounds(&self) -> Option<Aabb> {
        match self.kind {
            EffectKind::HealthPickup { .. } => Some(Aabb::from_center(self.pos, Vec3::splat(0.7))),
            _ => None,
        }
    }
}

#[inline]
fn expire_after(age: f32, lifespan: f32) -> Lifecycle {
    if age >= lifespan {
        Lifecycle::Expire
    } else {
        Lifecycle::Continue
    }
}

/// All live effects
#[derive(Debug, Clone)]
pub struct Effects {
    items: Vec<Effect>,
    budget: usize,
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            budget: DEFAULT_EFFECT_BUDGET,
        }
    }
}

impl Effects {
    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn set_budget(&mut self, budget: usize) {
        self.budget = budget;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.items.iter()
    }

    /// Add an effect. Cosmetic effects beyond the budget are dropped.
    pub fn push(&mut self, effect: Effect) -> bool {
        if effect.is_cosmetic() {
            let cosmetic = self.items.iter().filter(|e| e.is_cosmetic()).count();
            if cosmetic >= self.budget {
                return false;
            }
        }
        self.items.push(effect);
        true
    }

    /// Advance every effect, dropping expired ones
    pub fn advance(&mut self, dt: f32) {
        self.items.retain_mut(|e| e.advance(dt) == Lifecycle::Continue);
    }

    /// Remove every pickup touching the player, returning how many were collected
    pub fn collect_pickups(&mut self, player_pos: Vec3) -> usize {
        let player = player_bounds(player_pos);
        let before = self.items.len();
        self.items.retain(|e| {
            e.pickup_bounds()
                .is_none_or(|bounds| !bounds.intersects(&player))
        });
        before - self.items.len()
    }

    /// Populate the sky
    pub fn seed_clouds<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for _ in 0..CLOUD_COUNT {
            let pos = Vec3::new(
                (rng.random::<f32>() - 0.5) * 100.0,
                30.0 + rng.random::<f32>() * 20.0,
                (rng.random::<f32>() - 0.5) * 100.0,
            );
            let heading = Vec3::new(
                (rng.random::<f32>() - 0.5) * 0.5,
                0.0,
                (rng.random::<f32>() - 0.5) * 0.5,
            )
            .normalize_or(Vec3::X);
            self.items.push(Effect::new(
                pos,
                EffectKind::Cloud {
                    heading,
                    speed: 0.5 + rng.random::<f32>() * 1.5,
                    scale: 2.0 + rng.random::<f32>() * 4.0,
                },
            ));
        }
    }

    /// Crater plus a burst of sparks; heavier archetypes throw more debris
    pub fn spawn_impact<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        pos: Vec3,
        size: f32,
        tint: ArchetypeKind,
    ) {
        self.push(Effect::new(
            Vec3::new(pos.x, 0.0, pos.z),
            EffectKind::Crater {
                radius: size / 2.0,
                tint,
                age: 0.0,
            },
        ));

        let count = match tint {
            ArchetypeKind::Homing => 40,
            ArchetypeKind::Cluster => 30,
            ArchetypeKind::Regular | ArchetypeKind::Fragment => 20,
        };
        for _ in 0..count {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let reach = rng.random::<f32>() * size;
            let speed = 1.0 + rng.random::<f32>() * 5.0;
            let spark = Effect::new(
                Vec3::new(
                    pos.x + angle.cos() * reach,
                    0.1 + rng.random::<f32>() * 0.5,
                    pos.z + angle.sin() * reach,
                ),
                EffectKind::Spark {
                    vel: Vec3::new(
                        angle.cos() * speed * 0.5,
                        1.0 + rng.random::<f32>() * 3.0,
                        angle.sin() * speed * 0.5,
                    ),
                    age: 0.0,
                    lifespan: 0.5 + rng.random::<f32>() * 0.5,
                    tint,
                },
            );
            if !self.push(spark) {
                break;
            }
        }
    }

    /// Exhaust puff just above a projectile
    pub fn spawn_trail<R: Rng + ?Sized>(&mut self, rng: &mut R, pos: Vec3, tint: ArchetypeKind) {
        let jitter = Vec3::new(
            rng.random::<f32>() - 0.5,
            rng.random::<f32>() - 0.5,
            rng.random::<f32>() - 0.5,
        ) * 0.5;
        self.push(Effect::new(
            pos + Vec3::Y + jitter,
            EffectKind::Trail {
                age: 0.0,
                lifespan: 0.5 + rng.random::<f32>() * 0.5,
                tint,
            },
        ));
    }

    /// Heal pickup 5-15 units away from the player
    pub fn spawn_health_pickup<R: Rng + ?Sized>(&mut self, rng: &mut R, player_pos: Vec3) {
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let distance = 5.0 + rng.random::<f32>() * 10.0;
        self.push(Effect::new(
            Vec3::new(
                player_pos.x + angle.cos() * distance,
                1.0,
                player_pos.z + angle.sin() * distance,
            ),
            EffectKind::HealthPickup {
                age: 0.0,
                spin: 0.0,
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_crater_lifecycle() {
        let mut crater = Effect::new(
            Vec3::ZERO,
            EffectKind::Crater {
                radius: 1.0,
                tint: ArchetypeKind::Regular,
                age: 0.0,
            },
        );
        assert_eq!(crater.advance(1.0), Lifecycle::Continue);
        assert_eq!(crater.opacity(), 1.0);
        assert_eq!(crater.advance(2.0), Lifecycle::Continue);
        assert!((crater.opacity() - 0.5).abs() < 1e-5);
        assert_eq!(crater.advance(2.0), Lifecycle::Expire);
    }

    #[test]
    fn test_spark_expires_on_ground() {
        let mut spark = Effect::new(
            Vec3::new(0.0, 0.1, 0.0),
            EffectKind::Spark {
                vel: Vec3::new(0.0, -5.0, 0.0),
                age: 0.0,
                lifespan: 10.0,
                tint: ArchetypeKind::Homing,
            },
        );
        assert_eq!(spark.advance(0.1), Lifecycle::Expire);
    }

    #[test]
    fn test_cloud_wraps_and_never_expires() {
        let mut cloud = Effect::new(
            Vec3::new(99.9, 40.0, 0.0),
            EffectKind::Cloud {
                heading: Vec3::X,
                speed: 2.0,
                scale: 3.0,
            },
        );
        assert_eq!(cloud.advance(1.0), Lifecycle::Continue);
        assert!(cloud.pos.x < 0.0);
    }

    #[test]
    fn test_budget_drops_cosmetics_only() {
        let mut effects = Effects::default();
        effects.set_budget(2);
        let mut rng = Pcg32::seed_from_u64(1);
        effects.spawn_trail(&mut rng, Vec3::ZERO, ArchetypeKind::Regular);
        effects.spawn_trail(&mut rng, Vec3::ZERO, ArchetypeKind::Regular);
        effects.spawn_trail(&mut rng, Vec3::ZERO, ArchetypeKind::Regular);
        assert_eq!(effects.len(), 2);

        effects.spawn_health_pickup(&mut rng, Vec3::ZERO);
        let pickups = effects
            .iter()
            .filter(|e| matches!(e.kind, EffectKind::HealthPickup { .. }))
            .count();
        assert_eq!(pickups, 1);
    }

    #[test]
    fn test_impact_spark_counts() {
        let mut rng = Pcg32::seed_from_u64(3);
        for (tint, sparks) in [
            (ArchetypeKind::Regular, 20),
            (ArchetypeKind::Cluster, 30),
            (ArchetypeKind::Homing, 40),
        ] {
            let mut effects = Effects::default();
            effects.spawn_impact(&mut rng, Vec3::ZERO, 1.0, tint);
            assert_eq!(effects.len(), 1 + sparks);
        }
    }

    #[test]
    fn test_collect_pickup() {
        let mut effects = Effects::default();
        effects.push(Effect::new(
            Vec3::new(0.5, 1.0, 0.0),
            EffectKind::HealthPickup {
                age: 0.0,
                spin: 0.0,
            },
        ));
        assert_eq!(effects.collect_pickups(Vec3::new(30.0, 0.0, 0.0)), 0);
        assert_eq!(effects.collect_pickups(Vec3::ZERO), 1);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_pickup_expires() {
        let mut pickup = Effect::new(
            Vec3::ZERO,
            EffectKind::HealthPickup {
                age: 0.0,
                spin: 0.0,
            },
        );
        assert_eq!(pickup.advance(PICKUP_LIFETIME - 0.1), Lifecycle::Continue);
        assert_eq!(pickup.advance(0.2), Lifecycle::Expire);
    }
}
