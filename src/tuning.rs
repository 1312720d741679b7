//! Data-driven randomisation parameters
//!
//! The fixed gameplay numbers live in `consts`. The values here shape the
//! random distributions (asteroid split divergence, saucer class odds, spawn
//! timing) and can be overridden from the settings file.

use serde::{Deserialize, Serialize};

use crate::consts::ASTEROID_VEL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Children leave at parent speed times this factor
    pub split_speed_gain: f64,
    /// Children never leave slower than this
    pub split_min_speed: f64,
    /// Each child is rotated away from the parent heading by an angle drawn
    /// uniformly from `[split_spread_min, split_spread_max]` radians, one to
    /// each side
    pub split_spread_min: f64,
    pub split_spread_max: f64,

    /// Probability that a spawned saucer is the small (accurate) kind at
    /// level 1
    pub small_alien_base_chance: f64,
    /// Added per level past the first
    pub small_alien_chance_per_level: f64,
    pub small_alien_max_chance: f64,

    /// Saucer spawn interval: base ticks, plus or minus jitter
    pub alien_spawn_ticks: u32,
    pub alien_spawn_jitter: u32,

    /// Asteroid spin is drawn from `[-spin, spin]` per unit of speed
    pub asteroid_spin_per_speed: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            split_speed_gain: 1.25,
            split_min_speed: ASTEROID_VEL,
            split_spread_min: 0.25,
            split_spread_max: 0.8,

            small_alien_base_chance: 0.25,
            small_alien_chance_per_level: 0.1,
            small_alien_max_chance: 0.75,

            alien_spawn_ticks: 500,
            alien_spawn_jitter: 250,

            asteroid_spin_per_speed: 0.0025,
        }
    }
}

impl Tuning {
    /// Chance that the next saucer is small, for a given level
    pub fn small_alien_chance(&self, level: u32) -> f64 {
        let extra = self.small_alien_chance_per_level * level.saturating_sub(1) as f64;
        (self.small_alien_base_chance + extra).clamp(0.0, self.small_alien_max_chance.clamp(0.0, 1.0))
    }

    /// Clamp nonsensical values coming from a hand-edited settings file
    pub fn sanitized(mut self) -> Self {
        self.split_speed_gain = self.split_speed_gain.max(0.0);
        self.split_min_speed = self.split_min_speed.max(0.0);
        self.split_spread_min = self.split_spread_min.max(0.01);
        if self.split_spread_max < self.split_spread_min {
            self.split_spread_max = self.split_spread_min;
        }
        self.alien_spawn_ticks = self.alien_spawn_ticks.max(1);
        self.alien_spawn_jitter = self.alien_spawn_jitter.min(self.alien_spawn_ticks - 1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_alien_chance_scales_and_caps() {
        let t = Tuning::default();
        assert!((t.small_alien_chance(1) - 0.25).abs() < 1e-12);
        assert!((t.small_alien_chance(3) - 0.45).abs() < 1e-12);
        assert!((t.small_alien_chance(50) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_sanitized_fixes_inverted_spread() {
        let t = Tuning {
            split_spread_min: 0.5,
            split_spread_max: 0.1,
            alien_spawn_ticks: 0,
            alien_spawn_jitter: 10,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(t.split_spread_max, 0.5);
        assert_eq!(t.alien_spawn_ticks, 1);
        assert_eq!(t.alien_spawn_jitter, 0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let t: Tuning = serde_json::from_str(r#"{ "split_speed_gain": 2.0 }"#).unwrap();
        assert_eq!(t.split_speed_gain, 2.0);
        assert_eq!(t.alien_spawn_ticks, 500);
    }
}
