//! Adaptive difficulty
//!
//! A feedback controller, not an automaton: the flow label is re-derived from
//! the current spawn interval and skill band every evaluation, and only the
//! continuous quantities carry over between evaluations.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Challenge/skill balance label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlowState {
    /// Too easy: tighten the spawn interval
    Boredom,
    #[default]
    Neutral,
    /// Challenge matches skill
    Flow,
    /// Too hard: ease off
    Anxiety,
}

impl FlowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowState::Boredom => "boredom",
            FlowState::Neutral => "neutral",
            FlowState::Flow => "flow",
            FlowState::Anxiety => "anxiety",
        }
    }
}

/// Target difficulty window derived from skill
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementBand {
    pub min: f32,
    pub max: f32,
}

impl EngagementBand {
    pub const FLOOR: f32 = 10.0;
    pub const CEILING: f32 = 90.0;
    /// Sustained flow may stretch `max` up to here
    pub const STRETCH_CEILING: f32 = 95.0;
    pub const HALF_WIDTH: f32 = 15.0;

    /// Band centred on `skill`, clamped to [10, 90]
    pub fn around(skill: f32) -> Self {
        Self {
            min: (skill - Self::HALF_WIDTH).max(Self::FLOOR),
            max: (skill + Self::HALF_WIDTH).min(Self::CEILING),
        }
    }
}

impl Default for EngagementBand {
    fn default() -> Self {
        Self::around(50.0)
    }
}

/// What a spawn cycle asks of the spawner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleOutcome {
    /// Queue one more spawn shortly after this one
    pub extra_spawn: bool,
    /// The flow label changed during this cycle
    pub reclassified: bool,
}

/// Difficulty controller state. Reset at session (re)start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyState {
    /// Player skill estimate (0 - 100)
    pub skill_rating: f32,
    pub band: EngagementBand,
    pub flow_state: FlowState,
    pub spawn_interval_ms: f32,
    pub consecutive_dodges: u32,
    /// Near misses since the last evaluation
    pub near_miss_count: u32,
    pub coins_dodged: u32,
    pub coins_hit: u32,
    /// Session time (ms) of the last skill evaluation
    pub last_evaluation_ms: f32,
}

impl Default for DifficultyState {
    fn default() -> Self {
        Self {
            skill_rating: 50.0,
            band: EngagementBand::default(),
            flow_state: FlowState::Neutral,
            spawn_interval_ms: SPAWN_INTERVAL_DEFAULT_MS,
            consecutive_dodges: 0,
            near_miss_count: 0,
            coins_dodged: 0,
            coins_hit: 0,
            last_evaluation_ms: 0.0,
        }
    }
}

/// Difficulty (0 - 100) implied by a spawn interval: 300ms is 100, 2000ms is 0
pub fn difficulty_for_interval(interval_ms: f32) -> f32 {
    100.0
        - (interval_ms - SPAWN_INTERVAL_MIN_MS) / (SPAWN_INTERVAL_MAX_MS - SPAWN_INTERVAL_MIN_MS)
            * 100.0
}

impl DifficultyState {
    pub fn current_difficulty(&self) -> f32 {
        difficulty_for_interval(self.spawn_interval_ms)
    }

    pub fn record_dodge(&mut self) {
        self.coins_dodged += 1;
        self.consecutive_dodges += 1;
    }

    pub fn record_hit(&mut self) {
        self.coins_hit += 1;
        self.consecutive_dodges = 0;
    }

    pub fn record_near_miss(&mut self) {
        self.near_miss_count += 1;
    }

    pub fn dodge_rate(&self) -> f32 {
        self.coins_dodged as f32 / (self.coins_dodged + self.coins_hit).max(1) as f32
    }

    /// Retune the spawn interval for the current flow label
    pub fn tune_spawn_interval<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let mut extra_spawn = false;
        match self.flow_state {
            FlowState::Boredom => {
                self.spawn_interval_ms =
                    (self.spawn_interval_ms - 100.0).max(SPAWN_INTERVAL_MIN_MS);
                extra_spawn = rng.random::<f32>() < 0.3;
            }
            FlowState::Anxiety => {
                self.spawn_interval_ms =
                    (self.spawn_interval_ms + 50.0).min(SPAWN_INTERVAL_MAX_MS);
            }
            FlowState::Flow => {
                self.spawn_interval_ms += (rng.random::<f32>() - 0.5) * 100.0;
                self.spawn_interval_ms = self
                    .spawn_interval_ms
                    .clamp(FLOW_INTERVAL_MIN_MS, FLOW_INTERVAL_MAX_MS);
            }
            FlowState::Neutral => {}
        }
        self.spawn_interval_ms = self
            .spawn_interval_ms
            .clamp(SPAWN_INTERVAL_MIN_MS, SPAWN_INTERVAL_MAX_MS);
        extra_spawn
    }

    /// Fold the recent window into the skill rating and rebuild the band
    pub fn update_skill_rating(&mut self, health_fraction: f32) {
        let near_miss_factor = (self.near_miss_count as f32 / 5.0).min(1.0);
        let hit_penalty = if self.coins_hit > 0 { 1.0 } else { 0.0 };

        let change = self.dodge_rate() * 5.0 + health_fraction.clamp(0.0, 1.0) * 3.0
            + near_miss_factor * 2.0
            - hit_penalty * 5.0;

        self.skill_rating = (self.skill_rating + change).clamp(0.0, 100.0);
        self.band = EngagementBand::around(self.skill_rating);
        self.near_miss_count = 0;
    }

    /// Label `difficulty` against the band
    pub fn classify(&mut self, difficulty: f32) -> FlowState {
        self.flow_state = if difficulty < self.band.min {
            FlowState::Boredom
        } else if difficulty > self.band.max {
            FlowState::Anxiety
        } else {
            self.band.max = (self.band.max + 1.0).min(EngagementBand::STRETCH_CEILING);
            FlowState::Flow
        };
        self.flow_state
    }

    /// Run one spawn cycle: retune the interval and, when the evaluation
    /// window has elapsed, re-rate skill and reclassify.
    ///
    /// Classification uses the difficulty from before this cycle's retune.
    pub fn on_spawn_cycle<R: Rng + ?Sized>(
        &mut self,
        now_ms: f32,
        health_fraction: f32,
        rng: &mut R,
    ) -> CycleOutcome {
        let difficulty = self.current_difficulty();
        let extra_spawn = self.tune_spawn_interval(rng);

        let mut reclassified = false;
        if now_ms - self.last_evaluation_ms > EVALUATION_INTERVAL_MS {
            let previous = self.flow_state;
            self.update_skill_rating(health_fraction);
            let state = self.classify(difficulty);
            self.last_evaluation_ms = now_ms;
            reclassified = state != previous;
            log::debug!(
                "Skill {:.1}, band [{:.0}, {:.0}], difficulty {:.1} -> {}",
                self.skill_rating,
                self.band.min,
                self.band.max,
                difficulty,
                state.as_str()
            );
        }

        CycleOutcome {
            extra_spawn,
            reclassified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_difficulty_scale() {
        assert!((difficulty_for_interval(2000.0) - 0.0).abs() < 1e-4);
        assert!((difficulty_for_interval(300.0) - 100.0).abs() < 1e-4);
        assert!((difficulty_for_interval(1150.0) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_band_clamps() {
        assert_eq!(
            EngagementBand::around(0.0),
            EngagementBand {
                min: 10.0,
                max: 15.0,
            }
        );
        assert_eq!(
            EngagementBand::around(100.0),
            EngagementBand {
                min: 85.0,
                max: 90.0,
            }
        );
        assert_eq!(
            EngagementBand::around(50.0),
            EngagementBand {
                min: 35.0,
                max: 65.0,
            }
        );
    }

    #[test]
    fn test_skill_update_perfect_window() {
        let mut d = DifficultyState::default();
        d.coins_dodged = 10;
        d.near_miss_count = 5;
        d.update_skill_rating(1.0);
        // 5 + 3 + 2
        assert!((d.skill_rating - 60.0).abs() < 1e-4);
        assert_eq!(d.near_miss_count, 0);
        assert_eq!(
            d.band,
            EngagementBand {
                min: 45.0,
                max: 75.0,
            }
        );
    }

    #[test]
    fn test_skill_update_with_hits() {
        let mut d = DifficultyState::default();
        d.coins_dodged = 1;
        d.coins_hit = 1;
        d.update_skill_rating(0.5);
        // 2.5 + 1.5 + 0 - 5
        assert!((d.skill_rating - 49.0).abs() < 1e-4);
    }

    #[test]
    fn test_skill_rating_clamped() {
        let mut d = DifficultyState::default();
        d.skill_rating = 99.0;
        d.coins_dodged = 3;
        d.update_skill_rating(1.0);
        assert_eq!(d.skill_rating, 100.0);

        d.skill_rating = 2.0;
        d.coins_dodged = 0;
        d.coins_hit = 4;
        d.update_skill_rating(0.0);
        assert_eq!(d.skill_rating, 0.0);
    }

    #[test]
    fn test_classify() {
        let mut d = DifficultyState::default();
        d.band = EngagementBand {
            min: 40.0,
            max: 60.0,
        };
        assert_eq!(d.classify(20.0), FlowState::Boredom);
        assert_eq!(d.classify(80.0), FlowState::Anxiety);
        assert_eq!(d.classify(50.0), FlowState::Flow);
        assert_eq!(d.band.max, 61.0);
    }

    #[test]
    fn test_flow_band_stretch_ceiling() {
        let mut d = DifficultyState::default();
        d.band = EngagementBand {
            min: 80.0,
            max: 94.5,
        };
        d.classify(85.0);
        d.classify(85.0);
        assert_eq!(d.band.max, 95.0);
    }

    #[test]
    fn test_interval_tuning_bounds() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut d = DifficultyState::default();

        d.flow_state = FlowState::Boredom;
        for _ in 0..40 {
            d.tune_spawn_interval(&mut rng);
        }
        assert_eq!(d.spawn_interval_ms, SPAWN_INTERVAL_MIN_MS);

        d.flow_state = FlowState::Anxiety;
        for _ in 0..60 {
            d.tune_spawn_interval(&mut rng);
        }
        assert_eq!(d.spawn_interval_ms, SPAWN_INTERVAL_MAX_MS);

        d.flow_state = FlowState::Flow;
        for _ in 0..100 {
            d.tune_spawn_interval(&mut rng);
            assert!(d.spawn_interval_ms >= FLOW_INTERVAL_MIN_MS);
            assert!(d.spawn_interval_ms <= FLOW_INTERVAL_MAX_MS);
        }
    }

    #[test]
    fn test_neutral_keeps_interval() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut d = DifficultyState::default();
        assert!(!d.tune_spawn_interval(&mut rng));
        assert_eq!(d.spawn_interval_ms, SPAWN_INTERVAL_DEFAULT_MS);
    }

    #[test]
    fn test_evaluation_waits_for_window() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut d = DifficultyState::default();
        let outcome = d.on_spawn_cycle(2000.0, 1.0, &mut rng);
        assert!(!outcome.reclassified);
        assert_eq!(d.flow_state, FlowState::Neutral);

        // Default interval is difficulty 0, well under any band: boredom
        let outcome = d.on_spawn_cycle(5001.0, 1.0, &mut rng);
        assert!(outcome.reclassified);
        assert_eq!(d.flow_state, FlowState::Boredom);
        assert_eq!(d.last_evaluation_ms, 5001.0);
    }
}
