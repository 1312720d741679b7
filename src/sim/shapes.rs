//! Polygon outlines for ships and asteroids
//!
//! All outlines are in local space: origin at the entity center, +y toward
//! the ship nose. The renderer applies position and rotation.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;

use crate::consts::ASTEROID_MAXVERTS;

/// Vertices of the shield ring
const SHIELD_SEGMENTS: usize = 64;

fn scaled(points: &[(f64, f64)], sx: f64, sy: f64) -> Vec<DVec2> {
    points
        .iter()
        .map(|&(x, y)| DVec2::new(x * sx, y * sy))
        .collect()
}

/// Arrowhead hull of the player ship
pub fn player_hull(size: f64) -> Vec<DVec2> {
    scaled(
        &[(0.5, -0.5), (0.0, 0.5), (-0.5, -0.5), (0.0, -0.25), (0.5, -0.5)],
        size,
        size,
    )
}

/// Engine flame drawn behind the player while an impulse is active
pub fn engine_flame(size: f64) -> Vec<DVec2> {
    scaled(
        &[(-0.25, -0.25), (-0.1, -0.3), (0.0, -0.75), (0.1, -0.3), (0.25, -0.25)],
        size,
        size,
    )
}

/// Closed ring around the player while shielded
pub fn shield_ring(size: f64) -> Vec<DVec2> {
    let radius = size * 1.25;
    let step = TAU / SHIELD_SEGMENTS as f64;
    let mut ring: Vec<DVec2> = (0..SHIELD_SEGMENTS)
        .map(|i| DVec2::from_angle(i as f64 * step) * radius)
        .collect();
    ring.push(ring[0]);
    ring
}

/// Saucer body plus windshield
pub fn saucer_hull(size: f64) -> Vec<Vec<DVec2>> {
    let body = scaled(
        &[
            (0.5, 0.0),
            (0.25, 0.25),
            (-0.25, 0.25),
            (-0.5, 0.0),
            (-0.25, -0.25),
            (0.25, -0.25),
            (0.5, 0.0),
            (-0.5, 0.0),
        ],
        size,
        -size,
    );
    let windshield = scaled(
        &[(0.2, 0.25), (0.15, 0.4), (-0.15, 0.4), (-0.2, 0.25)],
        size,
        -size,
    );
    vec![body, windshield]
}

/// Lumpy closed outline for an asteroid of the given radius
pub fn asteroid_outline<R: Rng + ?Sized>(radius: f64, rng: &mut R) -> Vec<DVec2> {
    let step = TAU / ASTEROID_MAXVERTS as f64;
    (0..ASTEROID_MAXVERTS)
        .map(|i| {
            let angle = i as f64 * step;
            // Independent jitter per axis gives the irregular silhouette
            let jx: f64 = rng.random_range(0.0..0.5);
            let jy: f64 = rng.random_range(0.0..0.5);
            DVec2::new(radius * (angle + jx).cos(), radius * (angle + jy).sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_player_hull_nose_forward() {
        let hull = player_hull(16.0);
        assert_eq!(hull.len(), 5);
        assert_eq!(hull[1], DVec2::new(0.0, 8.0));
        // Closed outline
        assert_eq!(hull.first(), hull.last());
    }

    #[test]
    fn test_shield_ring_closed() {
        let ring = shield_ring(16.0);
        assert_eq!(ring.len(), SHIELD_SEGMENTS + 1);
        assert_eq!(ring[0], ring[SHIELD_SEGMENTS]);
        assert!(ring.iter().all(|p| (p.length() - 20.0).abs() < 1e-9));
    }

    #[test]
    fn test_asteroid_outline_within_radius() {
        let mut rng = Pcg32::seed_from_u64(3);
        let outline = asteroid_outline(30.0, &mut rng);
        assert_eq!(outline.len(), ASTEROID_MAXVERTS);
        // Each axis is bounded by the radius, so the vertex is within r * sqrt(2)
        assert!(outline.iter().all(|p| p.x.abs() <= 30.0 && p.y.abs() <= 30.0));
    }

    #[test]
    fn test_saucer_has_windshield() {
        let parts = saucer_hull(24.0);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 4);
    }
}
