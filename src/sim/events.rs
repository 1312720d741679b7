//! Outgoing simulation events
//!
//! The tick appends events in the order they happen. Collaborators (audio,
//! HUD, score registration) drain the queue once the tick has completed.

use glam::DVec2;

use super::state::{AsteroidTier, EntityId, ShipClass};
use crate::audio::AudioCommand;

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Cue for the audio subsystem
    Audio(AudioCommand),
    MissileFired {
        id: EntityId,
        owner: EntityId,
    },
    AsteroidDestroyed {
        id: EntityId,
        tier: AsteroidTier,
        pos: DVec2,
        /// Number of smaller asteroids spawned in its place
        children: usize,
    },
    ShipExploded {
        id: EntityId,
        class: ShipClass,
    },
    AlienSpawned {
        id: EntityId,
        class: ShipClass,
    },
    /// Saucer flew off the far edge without being destroyed
    AlienDeparted {
        id: EntityId,
    },
    ScoreChanged {
        score: u64,
    },
    ExtraLife {
        lives: u32,
    },
    PlayerRespawned,
    LevelCleared {
        level: u32,
    },
    LevelStarted {
        level: u32,
        asteroids: usize,
    },
    /// Final score, ready for ranking
    GameOver {
        score: u64,
        level: u32,
    },
}
