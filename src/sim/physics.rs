//! Per-entity integrator
//!
//! Each function advances a single entity by one fixed step. Entities never
//! read each other here, so the order of integration does not matter.

use super::state::{Asteroid, Missile, Ship};
use crate::consts::*;
use crate::{clamp_speed, normalize_angle, wrap_coord, wrap_position};

/// Outcome of moving a ship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Stayed,
    /// A saucer crossed the left/right edge and leaves the field
    Departed,
}

/// Advance a ship. Dead ships (exploding or removed) hold still.
pub fn integrate_ship(ship: &mut Ship) -> Motion {
    if !ship.alive {
        return Motion::Stayed;
    }
    ship.vel = clamp_speed(ship.vel, SHIP_MAXVEL);
    let next = ship.pos + ship.vel * SIM_DT;

    if ship.class.is_alien() {
        // Saucers wrap top to bottom but fly off the sides
        let departed = next.x < 0.0 || next.x >= FIELD_WIDTH;
        ship.pos.x = wrap_coord(next.x, FIELD_WIDTH);
        ship.pos.y = wrap_coord(next.y, FIELD_HEIGHT);
        if departed {
            return Motion::Departed;
        }
    } else {
        ship.pos = wrap_position(next);
    }
    Motion::Stayed
}

pub fn integrate_asteroid(asteroid: &mut Asteroid) {
    asteroid.pos = wrap_position(asteroid.pos + asteroid.vel * SIM_DT);
    asteroid.rotation = normalize_angle(asteroid.rotation + asteroid.spin);
}

pub fn integrate_missile(missile: &mut Missile) {
    missile.pos = wrap_position(missile.pos + missile.vel * SIM_DT);
}
