//! Session clock, score and streak rewards

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::format_clock;

/// Elapsed time, score and the terminal flag for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClock {
    /// Fractional score; display with `score()`
    pub score: f64,
    pub elapsed: f32,
    pub max_seconds: f32,
    /// Terminal once set
    pub ended: bool,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self {
            score: 0.0,
            elapsed: 0.0,
            max_seconds: SESSION_SECONDS,
            ended: false,
        }
    }
}

impl SessionClock {
    /// Whole points earned so far
    pub fn score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    pub fn remaining(&self) -> f32 {
        (self.max_seconds - self.elapsed).max(0.0)
    }

    /// Continuous score accrual: 1 point/s, doubled while dashing
    pub fn accrue(&mut self, dt: f32, dashing: bool) {
        if self.ended {
            return;
        }
        let multiplier = if dashing { 2.0 } else { 1.0 };
        self.score += f64::from(dt) * multiplier;
    }

    pub fn award(&mut self, points: f64) {
        if !self.ended {
            self.score += points;
        }
    }

    /// Advance time, returning true when the time budget is spent
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.ended {
            return false;
        }
        self.elapsed += dt;
        self.elapsed >= self.max_seconds
    }

    /// Low-time warning pulse: on whole seconds divisible by 5 within the last 30s.
    /// Returns `Some(urgent)` on the tick that crosses such a second.
    pub fn time_warning(&self, dt: f32) -> Option<bool> {
        let remaining = self.remaining();
        let before = remaining + dt;
        if remaining <= 0.0 || remaining > 30.0 {
            return None;
        }
        // Crossed a whole second this tick?
        if before.floor() == remaining.floor() {
            return None;
        }
        let second = before.floor() as u32;
        if second == 0 || second > 30 || second % 5 != 0 {
            return None;
        }
        Some(second <= 10)
    }
}

/// Reward for reaching a dodge-streak milestone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakReward {
    pub bonus: u32,
    pub title: &'static str,
    pub color: &'static str,
    /// Temporary invulnerability is granted
    pub invulnerability: bool,
    /// A heal pickup may spawn
    pub heal_pickup: bool,
}

/// Milestones at 5/10/15 dodges and every 10 from 20 on
pub fn streak_reward(streak: u32) -> Option<StreakReward> {
    let reward = |bonus, title, color| StreakReward {
        bonus,
        title,
        color,
        invulnerability: false,
        heal_pickup: false,
    };
    match streak {
        5 => Some(reward(50, "Great dodging!", "#4CAF50")),
        10 => Some(reward(100, "Impressive streak!", "#2196F3")),
        15 => Some(StreakReward {
            invulnerability: true,
            ..reward(200, "UNSTOPPABLE!", "#9C27B0")
        }),
        s if s >= 20 && s % 10 == 0 => Some(StreakReward {
            heal_pickup: true,
            ..reward(300, "LEGENDARY DODGER!", "#FF9800")
        }),
        _ => None,
    }
}

/// End-of-run summary pushed to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOverSummary {
    pub score: u64,
    pub coins_dodged: u32,
    pub coins_hit: u32,
    pub seconds_survived: f32,
    pub health_depleted: bool,
}

impl GameOverSummary {
    /// `m:ss` survival time
    pub fn time_survived(&self) -> String {
        format_clock(self.seconds_survived)
    }
}
