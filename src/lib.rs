//! Asteroids Core - simulation engine for a 2D space combat arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, lifecycle, level flow)
//! - `audio`: Sound cue names and the audio command drain
//! - `highscores`: Best-score table ordering and ranking
//! - `persistence`: Best-score storage backends
//! - `settings` / `tuning`: Data-driven configuration

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::{HighScores, RecordScore};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::DVec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    use std::f64::consts::PI;

    /// Play-field dimensions
    pub const FIELD_WIDTH: f64 = 800.0;
    pub const FIELD_HEIGHT: f64 = 600.0;

    /// Simulation ticks per second driven by the host loop
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Fixed integration step applied to velocities every tick
    pub const SIM_DT: f64 = 0.1;

    /// Session defaults
    pub const MAX_LIVES: u32 = 3;
    pub const START_LEVEL: u32 = 1;
    /// Extra life every this many points
    pub const BONUS_POINTS: u64 = 1000;

    /// Player ship
    pub const SHIP_SIZE: f64 = 16.0;
    pub const SHIP_ROTSTEP: f64 = 10.0 * PI / 180.0;
    pub const SHIP_IMPULSE: f64 = 4.0;
    pub const SHIP_MAXVEL: f64 = 250.0;
    pub const SHIP_IMPULSETICKS: u32 = 20;
    pub const SHIP_EXPLOSIONTICKS: u32 = 64;
    pub const SHIP_NDEBRIS: usize = 16;
    pub const SHIELD_TICKS: u32 = 100;
    /// Heading the player starts with (nose up)
    pub const SHIP_START_ROTATION: f64 = PI;
    /// Minimum ticks between thrust cues
    pub const THRUST_SOUND_TICKS: u32 = 15;

    /// Alien saucers
    pub const ALIEN_SMALL_SIZE: f64 = 16.0;
    pub const ALIEN_BIG_SIZE: f64 = 24.0;
    pub const ALIEN_SHOT_DELAY_TICKS: u32 = 20;
    pub const ALIEN_STEER_TICKS: u32 = 25;
    pub const ALIEN_STEER_STEP: f64 = 5.0;
    pub const ALIEN_BASE_SPEED: f64 = 25.0;
    pub const ALIEN_BIG_INACCURACY: f64 = PI / 16.0;
    pub const ALIEN_SMALL_INACCURACY: f64 = PI / 64.0;
    /// Vertical margin kept free when a saucer enters the field
    pub const ALIEN_ENTRY_MARGIN: f64 = 50.0;
    pub const MAX_ALIENS: usize = 2;

    /// Missiles
    pub const MISSILE_SPEED: f64 = 100.0;
    pub const MISSILE_LIFETIME_TICKS: u32 = 60;
    pub const MISSILE_RADIUS: f64 = 1.0;
    /// Player re-fire delay (100 ms at 60 Hz)
    pub const SHOTDELAY: u32 = 6;

    /// Asteroids
    pub const ASTEROIDS_PER_LEVEL: u32 = 5;
    pub const ASTEROID_VEL: f64 = 10.0;
    pub const ASTEROID_MAX_SPEED: f64 = 60.0;
    pub const ASTEROID_BIG_SIZE: f64 = 30.0;
    pub const ASTEROID_MID_SIZE: f64 = 20.0;
    pub const ASTEROID_SMALL_SIZE: f64 = 10.0;
    pub const ASTEROID_MAXVERTS: usize = 16;

    /// Score values
    pub const BIGASTEROIDSCORE: u64 = 5;
    pub const MIDASTEROIDSCORE: u64 = 10;
    pub const SMALLASTEROIDSCORE: u64 = 20;
    pub const BIGALIENSHIPSCORE: u64 = 100;
    pub const SMALLALIENSHIPSCORE: u64 = 500;

    /// Respawn / spawn exclusion radius around the player
    pub const SAFETYDISTANCE: f64 = 2.0 * ASTEROID_BIG_SIZE;
    /// Scale applied to the summed radii of two colliding entities
    pub const COLLISION_MARGIN: f64 = 1.0;

    /// Rest period between a cleared level and the next wave
    pub const LEVEL_START_DELAY_TICKS: u32 = 2 * TICKS_PER_SECOND;

    /// Master volume step for volume up/down commands
    pub const VOLUME_STEP: f32 = 0.05;
}

/// Wrap a coordinate into `[0, extent)`
#[inline]
pub fn wrap_coord(value: f64, extent: f64) -> f64 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent { 0.0 } else { wrapped }
}

/// Wrap a position toroidally into the play field
#[inline]
pub fn wrap_position(pos: DVec2) -> DVec2 {
    DVec2::new(
        wrap_coord(pos.x, consts::FIELD_WIDTH),
        wrap_coord(pos.y, consts::FIELD_HEIGHT),
    )
}

/// Normalized angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    wrap_coord(angle, std::f64::consts::TAU)
}

/// Unit vector the ship nose points along for a given rotation.
///
/// Screen space is y-down; rotation π points straight up.
#[inline]
pub fn heading(rotation: f64) -> DVec2 {
    DVec2::new(rotation.sin(), rotation.cos())
}

/// Rotate a local-space point into the frame of an entity with `rotation`
#[inline]
pub fn rotate_local(point: DVec2, rotation: f64) -> DVec2 {
    DVec2::from_angle(-rotation).rotate(point)
}

/// Clamp the speed magnitude, preserving direction
#[inline]
pub fn clamp_speed(vel: DVec2, max_speed: f64) -> DVec2 {
    let speed = vel.length();
    if speed > max_speed && speed.is_finite() {
        vel * (max_speed / speed)
    } else {
        vel
    }
}

/// Normalize, falling back to `fallback` for zero-length or non-finite vectors
#[inline]
pub fn direction_or(v: DVec2, fallback: DVec2) -> DVec2 {
    v.try_normalize().unwrap_or(fallback)
}

/// Sign of a value as -1, 0 or 1
#[inline]
pub fn sign(value: f64) -> i32 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Uniform sample in `[-|max|, |max|]`
#[inline]
pub fn rand_symmetric<R: Rng + ?Sized>(rng: &mut R, max: f64) -> f64 {
    let max = max.abs();
    if max == 0.0 || !max.is_finite() {
        return 0.0;
    }
    rng.random_range(-max..=max)
}

/// Uniform sample in `[0, |max|]`
#[inline]
pub fn rand_abs<R: Rng + ?Sized>(rng: &mut R, max: f64) -> f64 {
    let max = max.abs();
    if max == 0.0 || !max.is_finite() {
        return 0.0;
    }
    rng.random_range(0.0..=max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_wrap_coord_bounds() {
        assert_eq!(wrap_coord(-1.0, 800.0), 799.0);
        assert_eq!(wrap_coord(800.0, 800.0), 0.0);
        assert_eq!(wrap_coord(805.5, 800.0), 5.5);
        assert!(wrap_coord(-1e-18, 800.0) < 800.0);
    }

    #[test]
    fn test_normalize_angle_range() {
        assert!((normalize_angle(-PI / 2.0) - 1.5 * PI).abs() < 1e-12);
        assert_eq!(normalize_angle(TAU), 0.0);
        let a = normalize_angle(7.0 * TAU + 0.25);
        assert!((a - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_heading_start_points_up() {
        let h = heading(consts::SHIP_START_ROTATION);
        assert!(h.x.abs() < 1e-12);
        assert!((h.y + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotate_local_matches_heading() {
        // Local nose is +y; rotated it must point along the heading
        for rot in [0.0, 0.3, PI / 2.0, PI, 4.0] {
            let nose = rotate_local(DVec2::Y, rot);
            assert!((nose - heading(rot)).length() < 1e-9);
        }
    }

    #[test]
    fn test_clamp_speed_preserves_direction() {
        let v = DVec2::new(300.0, 400.0);
        let c = clamp_speed(v, 250.0);
        assert!((c.length() - 250.0).abs() < 1e-9);
        assert!((c.normalize() - v.normalize()).length() < 1e-12);
        assert_eq!(clamp_speed(DVec2::new(1.0, 1.0), 250.0), DVec2::new(1.0, 1.0));
    }

    #[test]
    fn test_direction_or_zero_vector() {
        assert_eq!(direction_or(DVec2::ZERO, DVec2::X), DVec2::X);
        assert_eq!(direction_or(DVec2::new(0.0, 3.0), DVec2::X), DVec2::Y);
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(-2.5), -1);
        assert_eq!(sign(0.0), 0);
        assert_eq!(sign(3.0), 1);
    }

    #[test]
    fn test_rand_helpers_stay_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            let s = rand_symmetric(&mut rng, -4.0);
            assert!((-4.0..=4.0).contains(&s));
            let a = rand_abs(&mut rng, 4.0);
            assert!((0.0..=4.0).contains(&a));
        }
        assert_eq!(rand_symmetric(&mut rng, 0.0), 0.0);
        assert_eq!(rand_abs(&mut rng, 0.0), 0.0);
    }
}
