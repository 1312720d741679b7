//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or storage I/O

pub mod collision;
pub mod events;
pub mod physics;
pub mod shapes;
pub mod state;
pub mod tick;
pub mod view;

pub use collision::{CollisionReport, Destruction, detect};
pub use events::GameEvent;
pub use state::{
    Asteroid, AsteroidTier, EntityId, Faction, GamePhase, GameState, Missile, Ship, ShipClass,
    ShipLifecycle,
};
pub use tick::{TickInput, generate_wave, tick};
pub use view::{EntityKind, RenderPose, snapshot};
