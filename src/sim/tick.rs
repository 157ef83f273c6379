//! Simulation tick
//!
//! Advances a session by one frame. Order within a tick is fixed:
//! player, clock, deferred actions, spawning, projectiles, effects.

use glam::{Vec2, Vec3};
use rand::Rng;

use super::effects::{Effect, EffectKind};
use super::kinematics::{self, Retirement};
use super::player::MoveIntent;
use super::schedule::Deferred;
use super::session::streak_reward;
use super::spawn::{cluster_fragments, spawn_projectile};
use super::state::{ArchetypeKind, EndReason, GameEvent, GamePhase, Projectile, Session};
use crate::consts::*;
use crate::horizontal;

/// Input snapshot for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Analog touch stick offset
    pub touch: Option<Vec2>,
    /// Jump (edge)
    pub jump: bool,
    /// Dash (edge)
    pub dash: bool,
    /// Start a fresh session (edge)
    pub restart: bool,
    /// Idle/demo mode - autopilot plays the game
    pub idle_mode: bool,
}

impl TickInput {
    fn intent(&self) -> MoveIntent {
        MoveIntent {
            forward: self.forward,
            backward: self.backward,
            left: self.left,
            right: self.right,
            touch: self.touch,
            jump: self.jump,
            dash: self.dash,
        }
    }
}

/// Advance the session by `dt` seconds (capped at `MAX_FRAME_DT`)
pub fn tick(session: &mut Session, input: &TickInput, dt: f32) {
    if input.restart {
        let seed = session.rng.random();
        session.restart(seed);
        return;
    }

    if session.phase != GamePhase::Running {
        return;
    }
    let dt = dt.clamp(0.0, MAX_FRAME_DT);

    let mut input = input.clone();
    if input.idle_mode {
        autopilot(session, &mut input);
    }

    // Player
    let now = session.clock.elapsed;
    let actions = session.player.update(&input.intent(), now, dt);
    if actions.jumped {
        session.events.push(GameEvent::Jumped);
    }
    if actions.dashed {
        session.events.push(GameEvent::Dashed);
        let at = session.player.pos + Vec3::new(0.0, 1.0, 0.2);
        session
            .effects
            .push(Effect::new(at, EffectKind::DashBurst { age: 0.0 }));
    }

    // Score and clock
    let dashing = session.player.is_dashing() || actions.dashed;
    session.clock.accrue(dt, dashing);
    if session.clock.advance(dt) {
        end_session(session, EndReason::TimeUp);
        return;
    }
    if let Some(urgent) = session.clock.time_warning(dt) {
        session.events.push(GameEvent::TimeWarning { urgent });
    }

    run_deferred(session);

    // Spawn cadence
    let now_ms = session.now_ms();
    let due = session
        .last_spawn_ms
        .is_none_or(|last| now_ms - last > session.difficulty.spawn_interval_ms);
    if due {
        spawn_one(session);
        session.last_spawn_ms = Some(now_ms);
        let health = session.player.health_fraction();
        let outcome = session
            .difficulty
            .on_spawn_cycle(now_ms, health, &mut session.rng);
        if outcome.extra_spawn {
            let at = session.clock.elapsed + EXTRA_SPAWN_DELAY_SECS;
            session.schedule.push(at, Deferred::ExtraSpawn);
        }
        if outcome.reclassified {
            log::debug!(
                "Flow state now {} (interval {:.0}ms)",
                session.difficulty.flow_state.as_str(),
                session.difficulty.spawn_interval_ms
            );
        }
    }

    // Projectiles
    let report = kinematics::step(
        &mut session.projectiles,
        &session.player,
        &mut session.rng,
        dt,
    );
    for (pos, tint) in report.trails {
        session.effects.spawn_trail(&mut session.rng, pos, tint);
    }
    for _ in &report.near_misses {
        near_miss(session);
    }
    for (projectile, cause) in report.retired {
        match cause {
            Retirement::Impact => impact(session, projectile),
            Retirement::Despawned => {}
            Retirement::PlayerHit => player_hit(session, &projectile),
        }
        if !session.is_running() {
            return;
        }
    }

    // Effects
    session.effects.advance(dt);
    let collected = session.effects.collect_pickups(session.player.pos);
    for _ in 0..collected {
        let amount = session.player.heal(PICKUP_HEAL);
        session.events.push(GameEvent::HealthRestored { amount });
        session.alert("Health +20!", "#4CAF50");
    }

    session.shake = (session.shake - dt).max(0.0);
    session.hit_flash = (session.hit_flash - dt).max(0.0);

    session.normalize_order();
}

/// Fire every deferred action that has come due
fn run_deferred(session: &mut Session) {
    for action in session.schedule.drain_due(session.clock.elapsed) {
        match action {
            Deferred::ExtraSpawn => spawn_one(session),
            Deferred::EndSlowdown { generation, ids } => {
                if generation != session.generation {
                    continue;
                }
                // Only the projectiles this slowdown touched, and only if still slowed
                for projectile in &mut session.projectiles {
                    if projectile.slowed > 0 && ids.binary_search(&projectile.id).is_ok() {
                        projectile.vel /= NEAR_MISS_SLOWDOWN;
                        projectile.slowed -= 1;
                    }
                }
            }
            Deferred::EndInvulnerability => session.player.invulnerable = false,
            Deferred::HideAlert => session.events.push(GameEvent::AlertCleared),
            Deferred::HideLastHit => {
                session.last_hit = None;
                session.events.push(GameEvent::LastHitCleared);
            }
        }
    }
}

fn spawn_one(session: &mut Session) {
    let id = session.next_entity_id();
    match spawn_projectile(&session.roster, &mut session.rng, id) {
        Some(projectile) => session.projectiles.push(projectile),
        None => log::warn!("Spawn skipped: roster is empty"),
    }
}

fn near_miss(session: &mut Session) {
    session.difficulty.record_near_miss();
    session.clock.award(NEAR_MISS_BONUS);
    session.events.push(GameEvent::NearMiss);

    let mut ids = Vec::with_capacity(session.projectiles.len());
    for projectile in &mut session.projectiles {
        projectile.vel *= NEAR_MISS_SLOWDOWN;
        projectile.slowed = projectile.slowed.saturating_add(1);
        ids.push(projectile.id);
    }
    ids.sort_unstable();
    let at = session.clock.elapsed + NEAR_MISS_SLOWDOWN_SECS;
    session.schedule.push(
        at,
        Deferred::EndSlowdown {
            generation: session.generation,
            ids,
        },
    );
}

fn impact(session: &mut Session, projectile: Projectile) {
    let kind = projectile.kind();
    session
        .effects
        .spawn_impact(&mut session.rng, projectile.pos, projectile.size, kind);
    session.events.push(GameEvent::Impact {
        pos: projectile.pos,
        size: projectile.size,
        kind,
    });

    if kind == ArchetypeKind::Cluster {
        if let Some(coin) = session.roster.get(projectile.coin) {
            let next_id = &mut session.next_id;
            let fragments = cluster_fragments(&projectile, coin, &mut session.rng, || {
                let id = *next_id;
                *next_id += 1;
                id
            });
            session.projectiles.extend(fragments);
        }
    }

    session.difficulty.record_dodge();
    let streak = session.difficulty.consecutive_dodges;
    if let Some(reward) = streak_reward(streak) {
        session.clock.award(f64::from(reward.bonus));
        session.events.push(GameEvent::StreakBonus {
            streak,
            bonus: reward.bonus,
        });
        session.alert(reward.title, reward.color);

        if reward.invulnerability {
            session.player.invulnerable = true;
            let until = session.clock.elapsed + INVULNERABILITY_SECS;
            session.schedule.push(until, Deferred::EndInvulnerability);
        }
        if reward.heal_pickup && session.player.health < session.player.max_health {
            session
                .effects
                .spawn_health_pickup(&mut session.rng, session.player.pos);
        }
    }
}

fn player_hit(session: &mut Session, projectile: &Projectile) {
    if session.player.invulnerable {
        session.events.push(GameEvent::HitAbsorbed);
        return;
    }

    let Some(coin) = session.roster.get(projectile.coin) else {
        log::warn!("Hit by projectile {} with no roster entry", projectile.id);
        return;
    };
    let damage = coin.percent_change.abs().floor();
    let text = format!(
        "Hit by {} ({:.2}%) -{} HP",
        coin.name, coin.percent_change, damage
    );
    let event = GameEvent::PlayerHit {
        coin: coin.name.clone(),
        percent_change: coin.percent_change,
        damage,
    };
    log::info!("{text}");

    let depleted = session.player.take_damage(damage);
    session.events.push(event);
    // The lethal hit ends the run without counting toward coins hit
    if depleted {
        end_session(session, EndReason::HealthDepleted);
        return;
    }

    session.difficulty.record_hit();
    session.last_hit = Some(text);
    let hide_at = session.clock.elapsed + LAST_HIT_SECS;
    session.schedule.push(hide_at, Deferred::HideLastHit);
    session.shake = SHAKE_SECS;
    session.hit_flash = HIT_FLASH_SECS;
}

/// Move the session to its terminal phase. Live projectiles and pending
/// deferred actions are dropped; no-op if already ended.
pub fn end_session(session: &mut Session, reason: EndReason) {
    if session.phase == GamePhase::Ended {
        return;
    }
    session.phase = GamePhase::Ended;
    session.end_reason = Some(reason);
    session.clock.ended = true;
    session.projectiles.clear();
    session.schedule.clear();
    session.player.invulnerable = false;

    let summary = session.summary();
    log::info!(
        "Session {} ended ({:?}): score {}, dodged {}, survived {}",
        session.generation,
        reason,
        summary.score,
        summary.coins_dodged,
        summary.time_survived()
    );
    session.events.push(GameEvent::SessionEnded(summary));
}

/// Where a falling projectile will reach the ground, and how soon
fn landing(projectile: &Projectile) -> Option<(Vec2, f32)> {
    if projectile.vel.y >= -0.1 {
        return None;
    }
    let t = projectile.pos.y / -projectile.vel.y;
    let at = projectile.pos + projectile.vel * t;
    Some((horizontal(at), t))
}

/// Demo player: sidestep the most imminent threat, otherwise fetch pickups
/// and drift back toward the middle of the play area.
fn autopilot(session: &Session, input: &mut TickInput) {
    let me = horizontal(session.player.pos);

    let threat = session
        .projectiles
        .iter()
        .filter_map(landing)
        .filter(|(at, t)| *t < 3.0 && at.distance(me) < 4.0)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    let pickup = session
        .effects
        .iter()
        .filter(|e| matches!(e.kind, EffectKind::HealthPickup { .. }))
        .map(|e| horizontal(e.pos))
        .min_by(|a, b| a.distance(me).total_cmp(&b.distance(me)));

    let heading = if let Some((at, t)) = threat {
        if t < 0.8 {
            input.dash = true;
        }
        let away = me - at;
        if away.length_squared() < 1e-4 {
            Vec2::X
        } else {
            away
        }
    } else if let Some(pickup) = pickup {
        pickup - me
    } else if me.length() > PLAY_AREA_HALF_EXTENT * 0.5 {
        -me
    } else {
        Vec2::ZERO
    };

    let dir = heading.normalize_or_zero();
    input.left = dir.x < -0.3;
    input.right = dir.x > 0.3;
    input.forward = dir.y < -0.3;
    input.backward = dir.y > 0.3;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Coin, Roster};

    const DT: f32 = 1.0 / 60.0;

    fn session(pcs: &[f32]) -> Session {
        let coins = pcs
            .iter()
            .enumerate()
            .map(|(i, pc)| Coin::new(i as u64, "Coin", "CN", *pc))
            .collect();
        Session::new(Roster::from_coins(coins), 11)
    }

    #[test]
    fn test_first_tick_spawns() {
        let mut s = session(&[-10.0]);
        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.projectiles.len(), 1);
        assert!(s.last_spawn_ms.is_some());
    }

    #[test]
    fn test_dt_is_capped() {
        let mut s = session(&[-10.0]);
        tick(&mut s, &TickInput::default(), 5.0);
        assert!((s.clock.elapsed - MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_time_up_ends_session() {
        let mut s = session(&[-10.0]);
        s.clock.elapsed = SESSION_SECONDS - 0.01;
        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.phase, GamePhase::Ended);
        assert_eq!(s.end_reason, Some(EndReason::TimeUp));
        assert!(s.projectiles.is_empty());
        assert!(s.schedule.is_empty());
        assert!(
            s.drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::SessionEnded(_)))
        );
    }

    #[test]
    fn test_ended_session_is_frozen() {
        let mut s = session(&[-10.0]);
        end_session(&mut s, EndReason::TimeUp);
        let elapsed = s.clock.elapsed;
        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.clock.elapsed, elapsed);
        assert!(s.projectiles.is_empty());
    }

    #[test]
    fn test_restart_input() {
        let mut s = session(&[-10.0]);
        for _ in 0..30 {
            tick(&mut s, &TickInput::default(), DT);
        }
        tick(
            &mut s,
            &TickInput {
                restart: true,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(s.generation, 1);
        assert_eq!(s.clock.elapsed, 0.0);
        assert!(s.projectiles.is_empty());
    }

    #[test]
    fn test_stale_slowdown_is_ignored() {
        let mut s = session(&[-10.0]);
        tick(&mut s, &TickInput::default(), DT);
        let vel = s.projectiles[0].vel;
        s.projectiles[0].slowed = 1;
        s.schedule.push(
            s.clock.elapsed,
            Deferred::EndSlowdown {
                generation: s.generation + 1,
                ids: vec![s.projectiles[0].id],
            },
        );
        run_deferred(&mut s);
        assert_eq!(s.projectiles[0].vel, vel);
        assert_eq!(s.projectiles[0].slowed, 1);
    }

    #[test]
    fn test_slowdown_round_trip() {
        let mut s = session(&[-10.0]);
        tick(&mut s, &TickInput::default(), DT);
        let before = s.projectiles[0].vel;
        near_miss(&mut s);
        assert!((s.projectiles[0].vel - before * NEAR_MISS_SLOWDOWN).length() < 1e-5);
        assert_eq!(s.difficulty.near_miss_count, 1);
        assert!((s.clock.score - NEAR_MISS_BONUS - f64::from(DT)).abs() < 1e-4);

        s.clock.elapsed += NEAR_MISS_SLOWDOWN_SECS;
        run_deferred(&mut s);
        assert!((s.projectiles[0].vel - before).length() < 1e-4);
        assert_eq!(s.projectiles[0].slowed, 0);
    }

    #[test]
    fn test_overlapping_slowdowns_end_separately() {
        let mut s = session(&[-10.0]);
        tick(&mut s, &TickInput::default(), DT);
        let first_id = s.projectiles[0].id;
        let first_at = s.clock.elapsed;
        near_miss(&mut s);

        s.clock.elapsed += 0.2;
        spawn_one(&mut s);
        let second_id = s.projectiles[1].id;
        let second_vel = s.projectiles[1].vel;
        let second_at = s.clock.elapsed;
        near_miss(&mut s);

        // First slowdown expires: the late arrival keeps its own layer
        s.clock.elapsed = first_at + NEAR_MISS_SLOWDOWN_SECS;
        run_deferred(&mut s);
        let late = s.projectiles.iter().find(|p| p.id == second_id).unwrap();
        assert_eq!(late.slowed, 1);
        assert!((late.vel - second_vel * NEAR_MISS_SLOWDOWN).length() < 1e-5);
        let early = s.projectiles.iter().find(|p| p.id == first_id).unwrap();
        assert_eq!(early.slowed, 1);

        s.clock.elapsed = second_at + NEAR_MISS_SLOWDOWN_SECS;
        run_deferred(&mut s);
        let late = s.projectiles.iter().find(|p| p.id == second_id).unwrap();
        assert_eq!(late.slowed, 0);
        assert!((late.vel - second_vel).length() < 1e-4);
        let early = s.projectiles.iter().find(|p| p.id == first_id).unwrap();
        assert_eq!(early.slowed, 0);
    }

    #[test]
    fn test_invulnerable_hit_is_absorbed() {
        let mut s = session(&[-12.7]);
        tick(&mut s, &TickInput::default(), DT);
        let projectile = s.projectiles[0].clone();
        s.player.invulnerable = true;
        s.difficulty.consecutive_dodges = 7;
        player_hit(&mut s, &projectile);
        assert_eq!(s.player.health, MAX_HEALTH);
        assert_eq!(s.difficulty.consecutive_dodges, 7);
        assert_eq!(s.difficulty.coins_hit, 0);
        assert!(s.events.contains(&GameEvent::HitAbsorbed));
    }

    #[test]
    fn test_autopilot_sidesteps() {
        let mut s = session(&[-10.0]);
        tick(&mut s, &TickInput::default(), DT);
        let p = &mut s.projectiles[0];
        p.pos = Vec3::new(0.5, 3.0, 0.0);
        p.vel = Vec3::new(0.0, -5.0, 0.0);
        let mut input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        autopilot(&s, &mut input);
        assert!(input.left);
        assert!(input.dash);
    }
}
