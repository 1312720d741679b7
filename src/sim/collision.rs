//! Collision detection over the tick snapshot
//!
//! `detect` only reads the session. Every hit is recorded in a
//! `CollisionReport` and applied later by the reconcile step, so no population
//! changes while pairs are still being tested.
//!
//! Pair order is ship vs asteroid, then missile vs ship and asteroid, then
//! player vs saucer. Within a category the populations are walked in
//! insertion order. An entity that took part in a resolved hit is skipped for
//! the rest of the pass, which caps every entity at one destructive event per
//! tick.

use glam::DVec2;

use super::state::{EntityId, Faction, GameState, ShipClass};
use crate::consts::{COLLISION_MARGIN, MISSILE_RADIUS};

/// One entity marked for destruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destruction {
    pub id: EntityId,
    /// Destroyed by the player ship or one of its missiles (scores points)
    pub by_player: bool,
}

/// Buffered outcome of one collision pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Ships that start exploding this tick
    pub ships: Vec<Destruction>,
    /// Asteroids to remove (and split)
    pub asteroids: Vec<Destruction>,
    /// Missiles consumed by a hit
    pub missiles: Vec<EntityId>,
}

impl CollisionReport {
    pub fn is_empty(&self) -> bool {
        self.ships.is_empty() && self.asteroids.is_empty() && self.missiles.is_empty()
    }

    pub fn ship_destroyed(&self, id: EntityId) -> bool {
        self.ships.iter().any(|d| d.id == id)
    }

    pub fn asteroid_destroyed(&self, id: EntityId) -> bool {
        self.asteroids.iter().any(|d| d.id == id)
    }

    pub fn missile_consumed(&self, id: EntityId) -> bool {
        self.missiles.contains(&id)
    }
}

/// Center distance below the scaled sum of both radii
#[inline]
pub fn overlaps(a: DVec2, ra: f64, b: DVec2, rb: f64) -> bool {
    let reach = (ra + rb) * COLLISION_MARGIN;
    a.distance_squared(b) < reach * reach
}

/// Test every relevant pair in the current session snapshot
pub fn detect(state: &GameState) -> CollisionReport {
    let mut report = CollisionReport::default();

    // Exploding ships are already out of play
    let mut ship_done: Vec<bool> = state.ships.iter().map(|s| !s.alive).collect();
    let mut asteroid_done = vec![false; state.asteroids.len()];
    let mut missile_done: Vec<bool> = state.missiles.iter().map(|m| m.is_expired()).collect();

    // Ship vs asteroid
    for (si, ship) in state.ships.iter().enumerate() {
        if ship_done[si] {
            continue;
        }
        for (ai, asteroid) in state.asteroids.iter().enumerate() {
            if asteroid_done[ai]
                || !overlaps(ship.pos, ship.radius(), asteroid.pos, asteroid.radius)
            {
                continue;
            }
            asteroid_done[ai] = true;
            ship_done[si] = true;
            report.asteroids.push(Destruction {
                id: asteroid.id,
                by_player: ship.class == ShipClass::Human,
            });
            if !ship.is_shielded() {
                report.ships.push(Destruction {
                    id: ship.id,
                    by_player: false,
                });
            }
            break;
        }
    }

    // Missile vs ship, then missile vs asteroid
    for (mi, missile) in state.missiles.iter().enumerate() {
        if missile_done[mi] {
            continue;
        }
        let by_player = missile.faction == Faction::Player;

        let ship_hit = state.ships.iter().enumerate().find(|(si, ship)| {
            !ship_done[*si]
                && ship.id != missile.owner
                && missile.faction.is_hostile_to(ship.class)
                && overlaps(missile.pos, MISSILE_RADIUS, ship.pos, ship.radius())
        });
        if let Some((si, ship)) = ship_hit {
            missile_done[mi] = true;
            ship_done[si] = true;
            report.missiles.push(missile.id);
            if !ship.is_shielded() {
                report.ships.push(Destruction {
                    id: ship.id,
                    by_player,
                });
            }
            continue;
        }

        let asteroid_hit = state.asteroids.iter().enumerate().find(|(ai, asteroid)| {
            !asteroid_done[*ai]
                && overlaps(missile.pos, MISSILE_RADIUS, asteroid.pos, asteroid.radius)
        });
        if let Some((ai, asteroid)) = asteroid_hit {
            missile_done[mi] = true;
            asteroid_done[ai] = true;
            report.missiles.push(missile.id);
            report.asteroids.push(Destruction {
                id: asteroid.id,
                by_player,
            });
        }
    }

    // Player vs saucer
    for (pi, player) in state.ships.iter().enumerate() {
        if player.class != ShipClass::Human || ship_done[pi] {
            continue;
        }
        for (ai, alien) in state.ships.iter().enumerate() {
            if !alien.class.is_alien()
                || ship_done[ai]
                || !overlaps(player.pos, player.radius(), alien.pos, alien.radius())
            {
                continue;
            }
            ship_done[ai] = true;
            ship_done[pi] = true;
            report.ships.push(Destruction {
                id: alien.id,
                by_player: true,
            });
            if !player.is_shielded() {
                report.ships.push(Destruction {
                    id: player.id,
                    by_player: false,
                });
            }
            break;
        }
    }

    debug_assert!(
        report
            .ships
            .iter()
            .enumerate()
            .all(|(i, d)| report.ships[..i].iter().all(|o| o.id != d.id)),
        "ship destroyed twice in one pass"
    );
    report
}
