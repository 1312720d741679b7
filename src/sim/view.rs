//! Read-only render snapshot
//!
//! The renderer sees each entity as a pose plus local-space polylines. It
//! never touches simulation state directly.

use glam::DVec2;

use super::shapes;
use super::state::{AsteroidTier, EntityId, GameState, Rgb, Ship, ShipClass, WHITE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Ship(ShipClass),
    Asteroid(AsteroidTier),
    Missile,
    /// Explosion fragments of a ship; points are already in world space
    Debris,
}

/// What the renderer needs to draw one entity
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPose {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: DVec2,
    pub rotation: f64,
    /// Polylines in local space (world space for debris)
    pub shape: Vec<Vec<DVec2>>,
    pub color: Rgb,
    pub visible: bool,
}

/// Poses for every live entity, ships first, in collection order
pub fn snapshot(state: &GameState) -> Vec<RenderPose> {
    let mut poses = Vec::with_capacity(state.ships.len() + state.asteroids.len() + state.missiles.len());

    for ship in &state.ships {
        if let Some(pose) = ship_pose(ship) {
            poses.push(pose);
        }
    }

    poses.extend(state.asteroids.iter().map(|a| RenderPose {
        id: a.id,
        kind: EntityKind::Asteroid(a.tier),
        position: a.pos,
        rotation: a.rotation,
        shape: vec![a.shape.clone()],
        color: a.color,
        visible: true,
    }));

    poses.extend(state.missiles.iter().map(|m| RenderPose {
        id: m.id,
        kind: EntityKind::Missile,
        position: m.pos,
        rotation: 0.0,
        shape: vec![vec![DVec2::ZERO]],
        color: WHITE,
        visible: true,
    }));

    poses
}

fn ship_pose(ship: &Ship) -> Option<RenderPose> {
    if ship.is_exploding() {
        let points = ship.debris_points();
        return Some(RenderPose {
            id: ship.id,
            kind: EntityKind::Debris,
            position: ship.pos,
            rotation: 0.0,
            shape: points.into_iter().map(|p| vec![p]).collect(),
            color: ship.debris_color(),
            visible: true,
        });
    }
    if !ship.alive {
        return None;
    }

    let mut shape = ship.shape.clone();
    if ship.class == ShipClass::Human {
        if ship.impulse_ticks > 0 {
            shape.push(shapes::engine_flame(ship.size));
        }
        if ship.is_shielded() {
            shape.push(shapes::shield_ring(ship.size));
        }
    }
    Some(RenderPose {
        id: ship.id,
        kind: EntityKind::Ship(ship.class),
        position: ship.pos,
        rotation: ship.rotation,
        shape,
        color: ship.color,
        visible: ship.visible,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SHIP_NDEBRIS;
    use crate::sim::state::ShipLifecycle;

    #[test]
    fn test_snapshot_covers_live_entities() {
        let state = GameState::new(5);
        let poses = snapshot(&state);
        assert_eq!(poses.len(), 1 + state.asteroids.len());
        assert_eq!(poses[0].kind, EntityKind::Ship(ShipClass::Human));
        // Fresh spawn: hull plus shield ring
        assert_eq!(poses[0].shape.len(), 2);
    }

    #[test]
    fn test_thrusting_player_shows_flame() {
        let mut state = GameState::new(5);
        let player = state.player_mut().unwrap();
        player.shield_ticks = 0;
        player.impulse_ticks = 3;
        let pose = snapshot(&state).remove(0);
        assert_eq!(pose.shape.len(), 2);
        assert!(pose.visible);
    }

    #[test]
    fn test_exploding_ship_renders_debris() {
        let mut state = GameState::new(6);
        state.ships[0].explode(&mut state.rng);
        state.ships[0].explosion_ticks -= 5;
        let pose = snapshot(&state).remove(0);
        assert_eq!(pose.kind, EntityKind::Debris);
        assert!((SHIP_NDEBRIS / 2..=SHIP_NDEBRIS).contains(&pose.shape.len()));

        // Waiting to respawn: nothing drawn
        state.ships[0].explosion_ticks = 0;
        assert_eq!(state.ships[0].lifecycle(), ShipLifecycle::Removed);
        assert!(snapshot(&state)
            .iter()
            .all(|p| p.kind != EntityKind::Debris && p.kind != EntityKind::Ship(ShipClass::Human)));
    }
}
