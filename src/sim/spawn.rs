//! Projectile factory
//!
//! Turns a roster entry into a live projectile. Everything here is a pure
//! function of the roster and the RNG stream.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use super::collision::Aabb;
use super::state::{Archetype, ArchetypeKind, Projectile};
use crate::consts::*;
use crate::roster::{Coin, Roster};

/// Pick an archetype for a coin with percent change `pc` from one uniform draw
/// `r` in [0, 1). The first matching rule wins.
pub fn determine_archetype(pc: f32, r: f32) -> ArchetypeKind {
    let severity = (pc.abs() / 50.0).min(1.0);

    if pc < -30.0 && r < 0.8 {
        ArchetypeKind::Homing
    } else if pc < -20.0 && r < 0.4 {
        ArchetypeKind::Cluster
    } else if r < 0.05 + 0.1 * severity {
        ArchetypeKind::Homing
    } else if r < 0.15 + 0.15 * severity {
        ArchetypeKind::Cluster
    } else {
        ArchetypeKind::Regular
    }
}

/// Launch position and velocity for a freshly spawned missile
pub fn launch<R: Rng + ?Sized>(kind: ArchetypeKind, fall_speed: f32, rng: &mut R) -> (Vec3, Vec3) {
    match kind {
        ArchetypeKind::Homing => {
            // Ring around the spawn origin, not the player's current position
            let angle = rng.random::<f32>() * TAU;
            let radius = HOMING_RING_MIN + rng.random::<f32>() * HOMING_RING_RANGE;
            let height = HOMING_HEIGHT_MIN + rng.random::<f32>() * HOMING_HEIGHT_RANGE;
            (
                Vec3::new(angle.cos() * radius, height, angle.sin() * radius),
                Vec3::new(0.0, -fall_speed * HOMING_LAUNCH_SCALE, 0.0),
            )
        }
        _ => {
            let pos = Vec3::new(
                (rng.random::<f32>() - 0.5) * SPAWN_AREA,
                SPAWN_HEIGHT_MIN + rng.random::<f32>() * SPAWN_HEIGHT_RANGE,
                (rng.random::<f32>() - 0.5) * SPAWN_AREA,
            );
            let vel = Vec3::new(
                (rng.random::<f32>() - 0.5) * 2.0,
                -fall_speed,
                (rng.random::<f32>() - 0.5) * 2.0,
            );
            (pos, vel)
        }
    }
}

fn build(
    id: u32,
    coin_index: usize,
    coin: &Coin,
    archetype: Archetype,
    (pos, vel): (Vec3, Vec3),
    size: f32,
    spin: f32,
) -> Projectile {
    let mut projectile = Projectile {
        id,
        coin: coin_index,
        archetype,
        pos,
        vel,
        age: 0.0,
        spin,
        roll: 0.0,
        axis: Vec3::NEG_Y,
        size,
        fall_speed: coin.fall_speed,
        damage: coin.damage,
        bounds: Aabb::default(),
        near_miss: false,
        slowed: 0,
        next_trail_at: TRAIL_INTERVAL,
    };
    projectile.refresh_bounds();
    projectile
}

/// Spawn one missile from a uniformly chosen roster entry.
/// Returns `None` for an empty roster.
pub fn spawn_projectile<R: Rng + ?Sized>(
    roster: &Roster,
    rng: &mut R,
    id: u32,
) -> Option<Projectile> {
    let (index, coin) = roster.pick(rng)?;
    let kind = determine_archetype(coin.percent_change, rng.random::<f32>());
    let motion = launch(kind, coin.fall_speed, rng);
    let spin = (rng.random::<f32>() - 0.5) * 2.0;

    log::debug!("Spawned {} as {:?}", coin.symbol, kind);
    Some(build(
        id,
        index,
        coin,
        Archetype::from_kind(kind),
        motion,
        coin.size,
        spin,
    ))
}

/// Burst a cluster impact into 5-9 fragments. `ids` supplies fresh entity ids.
///
/// Fragments start just above the ground at the impact point and fly out
/// radially; none inherit the parent's horizontal velocity.
pub fn cluster_fragments<R: Rng + ?Sized>(
    parent: &Projectile,
    coin: &Coin,
    rng: &mut R,
    mut ids: impl FnMut() -> u32,
) -> Vec<Projectile> {
    let count = rng.random_range(FRAGMENT_MIN..=FRAGMENT_MAX);
    let size = parent.size * FRAGMENT_SCALE;

    (0..count)
        .map(|_| {
            let angle = rng.random::<f32>() * TAU;
            let speed = 2.0 + rng.random::<f32>() * 3.0;
            let vel = Vec3::new(
                angle.cos() * speed,
                2.0 + rng.random::<f32>() * 3.0,
                angle.sin() * speed,
            );
            let pos = Vec3::new(parent.pos.x, FRAGMENT_START_HEIGHT, parent.pos.z);
            let spin = (rng.random::<f32>() - 0.5) * 5.0;
            build(
                ids(),
                parent.coin,
                coin,
                Archetype::Fragment,
                (pos, vel),
                size,
                spin,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn roster(pcs: &[f32]) -> Roster {
        Roster::from_coins(
            pcs.iter()
                .enumerate()
                .map(|(i, pc)| Coin::new(i as u64, "Coin", "CN", *pc))
                .collect(),
        )
    }

    #[test]
    fn test_archetype_rules() {
        assert_eq!(determine_archetype(-40.0, 0.5), ArchetypeKind::Homing);
        assert_eq!(determine_archetype(-25.0, 0.3), ArchetypeKind::Cluster);
        assert_eq!(determine_archetype(-25.0, 0.6), ArchetypeKind::Regular);
        assert_eq!(determine_archetype(-10.0, 0.05), ArchetypeKind::Homing);
        assert_eq!(determine_archetype(-10.0, 0.1), ArchetypeKind::Cluster);
        assert_eq!(determine_archetype(-10.0, 0.5), ArchetypeKind::Regular);
        assert_eq!(determine_archetype(0.0, 0.04), ArchetypeKind::Homing);
        assert_eq!(determine_archetype(0.0, 0.9), ArchetypeKind::Regular);
        assert_eq!(determine_archetype(-80.0, 0.95), ArchetypeKind::Regular);
    }

    #[test]
    fn test_empty_roster_spawns_nothing() {
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(spawn_projectile(&Roster::default(), &mut rng, 1).is_none());
    }

    #[test]
    fn test_spawn_volumes() {
        let roster = roster(&[-45.0, -12.7, -3.0]);
        let mut rng = Pcg32::seed_from_u64(42);
        for id in 0..500 {
            let p = spawn_projectile(&roster, &mut rng, id).unwrap();
            let coin = roster.get(p.coin).unwrap();
            assert_eq!(p.size, coin.size);
            assert_eq!(p.age, 0.0);
            assert!(!p.near_miss);
            match p.kind() {
                ArchetypeKind::Homing => {
                    let ring = Vec3::new(p.pos.x, 0.0, p.pos.z).length();
                    assert!((HOMING_RING_MIN - 1e-3..=HOMING_RING_MIN + HOMING_RING_RANGE + 1e-3)
                        .contains(&ring));
                    assert!((20.0..=30.0).contains(&p.pos.y));
                    assert!((p.vel.y + coin.fall_speed * 0.8).abs() < 1e-5);
                    assert_eq!(p.vel.x, 0.0);
                }
                ArchetypeKind::Regular | ArchetypeKind::Cluster => {
                    assert!(p.pos.x.abs() <= 40.0 && p.pos.z.abs() <= 40.0);
                    assert!((50.0..=60.0).contains(&p.pos.y));
                    assert_eq!(p.vel.y, -coin.fall_speed);
                    assert!(p.vel.x.abs() <= 1.0 && p.vel.z.abs() <= 1.0);
                }
                ArchetypeKind::Fragment => panic!("factory never spawns fragments"),
            }
        }
    }

    #[test]
    fn test_spawn_is_deterministic() {
        let roster = roster(&[-45.0, -12.7]);
        let mut a = Pcg32::seed_from_u64(9);
        let mut b = Pcg32::seed_from_u64(9);
        let pa = spawn_projectile(&roster, &mut a, 1).unwrap();
        let pb = spawn_projectile(&roster, &mut b, 1).unwrap();
        assert_eq!(pa.pos, pb.pos);
        assert_eq!(pa.vel, pb.vel);
        assert_eq!(pa.archetype, pb.archetype);
    }

    #[test]
    fn test_cluster_fragments() {
        let roster = roster(&[-25.0]);
        let coin = roster.get(0).unwrap();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut parent = spawn_projectile(&roster, &mut rng, 1).unwrap();
        parent.archetype = Archetype::Cluster;
        parent.pos = Vec3::new(4.0, -0.1, -7.0);
        parent.vel = Vec3::new(3.0, -5.0, 3.0);

        let mut next = 100;
        for _ in 0..50 {
            let fragments = cluster_fragments(&parent, coin, &mut rng, || {
                next += 1;
                next
            });
            assert!((5..=9).contains(&fragments.len()));
            for f in &fragments {
                assert_eq!(f.kind(), ArchetypeKind::Fragment);
                assert_eq!(f.pos, Vec3::new(4.0, FRAGMENT_START_HEIGHT, -7.0));
                assert!((f.size - parent.size * 0.4).abs() < 1e-5);
                let radial = Vec3::new(f.vel.x, 0.0, f.vel.z).length();
                assert!((2.0 - 1e-4..=5.0 + 1e-4).contains(&radial));
                assert!((2.0..=5.0).contains(&f.vel.y));
            }
        }
    }
}
