//! Game state and core simulation types
//!
//! Every entity is owned by the `GameState` session. Collections keep
//! insertion order, which is also ascending `EntityId` order because ids are
//! handed out monotonically.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::events::GameEvent;
use super::shapes;
use crate::audio::{AudioCommand, SoundEffect};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{heading, normalize_angle, rand_abs};

/// Stable handle for any entity in the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

/// RGB color
pub type Rgb = [u8; 3];
pub const WHITE: Rgb = [255, 255, 255];

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Level cleared, next wave pending
    LevelStart,
    /// Game is paused
    Paused,
    /// Lives exhausted
    GameOver,
}

/// Ship classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipClass {
    Human,
    AlienSmall,
    AlienBig,
}

/// Per-class behavior table
#[derive(Debug)]
pub struct ShipProfile {
    pub size: f64,
    /// Points for destroying a ship of this class
    pub score: u64,
    /// Maximum aim error (radians) when firing at the player
    pub aim_inaccuracy: f64,
    /// Looping hum while the ship is on screen
    pub hum: Option<SoundEffect>,
    pub color: Rgb,
}

const HUMAN_PROFILE: ShipProfile = ShipProfile {
    size: SHIP_SIZE,
    score: 0,
    aim_inaccuracy: 0.0,
    hum: None,
    color: WHITE,
};

const ALIEN_SMALL_PROFILE: ShipProfile = ShipProfile {
    size: ALIEN_SMALL_SIZE,
    score: SMALLALIENSHIPSCORE,
    aim_inaccuracy: ALIEN_SMALL_INACCURACY,
    hum: Some(SoundEffect::SaucerSmall),
    color: WHITE,
};

const ALIEN_BIG_PROFILE: ShipProfile = ShipProfile {
    size: ALIEN_BIG_SIZE,
    score: BIGALIENSHIPSCORE,
    aim_inaccuracy: ALIEN_BIG_INACCURACY,
    hum: Some(SoundEffect::SaucerBig),
    color: WHITE,
};

impl ShipClass {
    pub fn profile(self) -> &'static ShipProfile {
        match self {
            ShipClass::Human => &HUMAN_PROFILE,
            ShipClass::AlienSmall => &ALIEN_SMALL_PROFILE,
            ShipClass::AlienBig => &ALIEN_BIG_PROFILE,
        }
    }

    pub fn is_alien(self) -> bool {
        !matches!(self, ShipClass::Human)
    }

    pub fn faction(self) -> Faction {
        match self {
            ShipClass::Human => Faction::Player,
            ShipClass::AlienSmall | ShipClass::AlienBig => Faction::Alien,
        }
    }
}

/// Which side fired a missile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Faction {
    Player,
    Alien,
}

impl Faction {
    /// Whether missiles of this faction can destroy a ship of `class`
    pub fn is_hostile_to(self, class: ShipClass) -> bool {
        self != class.faction()
    }
}

/// Lifecycle of a ship, derived from its timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipLifecycle {
    /// Alive behind a shield (fresh spawn or activated shield)
    Spawning,
    Active,
    /// Debris animation, non-interactive
    Exploding,
    /// Waiting to respawn or be dropped from the session
    Removed,
}

/// One explosion fragment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Debris {
    pub offset: DVec2,
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub id: EntityId,
    pub class: ShipClass,
    pub pos: DVec2,
    pub vel: DVec2,
    /// Radians in [0, 2π)
    pub rotation: f64,
    pub size: f64,
    /// Local-space polylines
    pub shape: Vec<Vec<DVec2>>,
    pub color: Rgb,
    pub alive: bool,
    pub visible: bool,
    pub shield_ticks: u32,
    pub explosion_ticks: u32,
    pub impulse_ticks: u32,
    pub debris: Vec<Debris>,
    /// Saucer course-change countdown (unused for the player)
    pub steer_ticks: u32,
}

impl Ship {
    pub fn new(id: EntityId, class: ShipClass, pos: DVec2) -> Self {
        let profile = class.profile();
        let shape = match class {
            ShipClass::Human => vec![shapes::player_hull(profile.size)],
            ShipClass::AlienSmall | ShipClass::AlienBig => shapes::saucer_hull(profile.size),
        };
        Self {
            id,
            class,
            pos,
            vel: DVec2::ZERO,
            rotation: 0.0,
            size: profile.size,
            shape,
            color: profile.color,
            alive: true,
            visible: true,
            shield_ticks: 0,
            explosion_ticks: 0,
            impulse_ticks: 0,
            debris: Vec::new(),
            steer_ticks: ALIEN_STEER_TICKS,
        }
    }

    /// Player ship at field center, nose up, behind a spawn shield
    pub fn player(id: EntityId) -> Self {
        let mut ship = Self::new(id, ShipClass::Human, field_center());
        ship.rotation = SHIP_START_ROTATION;
        ship.shield_ticks = SHIELD_TICKS;
        ship
    }

    /// Collision radius
    #[inline]
    pub fn radius(&self) -> f64 {
        self.size / 2.0
    }

    pub fn is_shielded(&self) -> bool {
        self.shield_ticks > 0
    }

    pub fn is_exploding(&self) -> bool {
        !self.alive && self.explosion_ticks > 0
    }

    pub fn lifecycle(&self) -> ShipLifecycle {
        if self.alive {
            if self.is_shielded() {
                ShipLifecycle::Spawning
            } else {
                ShipLifecycle::Active
            }
        } else if self.explosion_ticks > 0 {
            ShipLifecycle::Exploding
        } else {
            ShipLifecycle::Removed
        }
    }

    pub fn heading(&self) -> DVec2 {
        heading(self.rotation)
    }

    pub fn rotate(&mut self, delta: f64) {
        self.rotation = normalize_angle(self.rotation + delta);
    }

    /// Kick the ship along its heading and light the engine
    pub fn thrust(&mut self, impulse: f64) {
        self.vel = crate::clamp_speed(self.vel + self.heading() * impulse, SHIP_MAXVEL);
        self.impulse_ticks = SHIP_IMPULSETICKS;
    }

    /// Raise the shield if it is not already up
    pub fn activate_shield(&mut self) -> bool {
        if !self.alive || self.is_shielded() {
            return false;
        }
        self.shield_ticks = SHIELD_TICKS;
        true
    }

    /// Enter the exploding state and scatter debris
    pub fn explode<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        debug_assert!(self.alive, "ship {:?} exploded twice", self.id);
        self.alive = false;
        self.visible = false;
        self.shield_ticks = 0;
        self.impulse_ticks = 0;
        self.explosion_ticks = SHIP_EXPLOSIONTICKS;

        let count = SHIP_NDEBRIS / 2 + (rand_abs(rng, SHIP_NDEBRIS as f64) / 2.0) as usize;
        let count = count.min(SHIP_NDEBRIS);
        let step = std::f64::consts::TAU / count as f64;
        self.debris = (0..count)
            .map(|i| {
                let radius = SHIP_SIZE / 4.0 + rand_abs(rng, SHIP_SIZE);
                Debris {
                    offset: DVec2::from_angle(i as f64 * step) * radius,
                    scale: rand_abs(rng, 8.0),
                }
            })
            .collect();
    }

    /// World-space debris positions for the current explosion frame
    pub fn debris_points(&self) -> Vec<DVec2> {
        if !self.is_exploding() {
            return Vec::new();
        }
        let elapsed = (SHIP_EXPLOSIONTICKS - self.explosion_ticks.min(SHIP_EXPLOSIONTICKS)) as f64;
        self.debris
            .iter()
            .map(|d| self.pos + d.offset * (16.0 + d.scale) / 100.0 * elapsed)
            .collect()
    }

    /// Debris brightness, fading as the explosion runs out
    pub fn debris_color(&self) -> Rgb {
        let level = (255.0 * self.explosion_ticks as f64 / SHIP_EXPLOSIONTICKS as f64) as u8;
        [level, level, level]
    }

    /// Bring a destroyed player back at `pos` behind a spawn shield
    pub fn respawn(&mut self, pos: DVec2) {
        self.pos = pos;
        self.vel = DVec2::ZERO;
        self.rotation = SHIP_START_ROTATION;
        self.alive = true;
        self.visible = true;
        self.explosion_ticks = 0;
        self.impulse_ticks = 0;
        self.debris.clear();
        self.shield_ticks = SHIELD_TICKS;
    }
}

/// Asteroid size classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsteroidTier {
    Small,
    Medium,
    Large,
}

impl AsteroidTier {
    /// Tier the children of a split belong to
    pub fn smaller(self) -> Option<AsteroidTier> {
        match self {
            AsteroidTier::Large => Some(AsteroidTier::Medium),
            AsteroidTier::Medium => Some(AsteroidTier::Small),
            AsteroidTier::Small => None,
        }
    }

    pub fn score(self) -> u64 {
        match self {
            AsteroidTier::Large => BIGASTEROIDSCORE,
            AsteroidTier::Medium => MIDASTEROIDSCORE,
            AsteroidTier::Small => SMALLASTEROIDSCORE,
        }
    }

    /// Base radius and the maximum random extra added on creation
    pub fn radius_range(self) -> (f64, f64) {
        match self {
            AsteroidTier::Large => (ASTEROID_BIG_SIZE, ASTEROID_BIG_SIZE / 10.0),
            AsteroidTier::Medium => (ASTEROID_MID_SIZE, ASTEROID_MID_SIZE / 4.0),
            AsteroidTier::Small => (ASTEROID_SMALL_SIZE, ASTEROID_SMALL_SIZE / 2.0),
        }
    }

    pub fn bang(self) -> SoundEffect {
        match self {
            AsteroidTier::Large => SoundEffect::BangLarge,
            AsteroidTier::Medium => SoundEffect::BangMedium,
            AsteroidTier::Small => SoundEffect::BangSmall,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Asteroid {
    pub id: EntityId,
    pub tier: AsteroidTier,
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    pub rotation: f64,
    /// Radians per tick
    pub spin: f64,
    pub shape: Vec<DVec2>,
    pub color: Rgb,
}

impl Asteroid {
    pub fn new<R: Rng + ?Sized>(
        id: EntityId,
        tier: AsteroidTier,
        pos: DVec2,
        vel: DVec2,
        spin_per_speed: f64,
        rng: &mut R,
    ) -> Self {
        let (base, extra) = tier.radius_range();
        let radius = base + rand_abs(rng, extra);
        let spin = crate::rand_symmetric(rng, vel.length() * spin_per_speed);
        Self {
            id,
            tier,
            pos,
            vel,
            radius,
            rotation: 0.0,
            spin,
            shape: shapes::asteroid_outline(radius, rng),
            color: WHITE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Missile {
    pub id: EntityId,
    /// Ship that fired it; may no longer exist
    pub owner: EntityId,
    pub faction: Faction,
    pub pos: DVec2,
    pub vel: DVec2,
    pub ttl_ticks: u32,
}

impl Missile {
    pub fn new(id: EntityId, owner: &Ship, pos: DVec2, vel: DVec2) -> Self {
        Self {
            id,
            owner: owner.id,
            faction: owner.class.faction(),
            pos,
            vel,
            ttl_ticks: MISSILE_LIFETIME_TICKS,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.ttl_ticks == 0
    }
}

/// Center of the play field
pub fn field_center() -> DVec2 {
    DVec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0)
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    /// Current level (1-based)
    pub level: u32,
    /// Ships remaining, including the one in play
    pub lives: u32,
    pub score: u64,
    /// Next extra life is due at `BONUS_POINTS * bonus_count`
    pub bonus_count: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Cleared by the quit command
    pub running: bool,
    /// Ticks until the next wave spawns (LevelStart phase)
    pub level_start_ticks: u32,
    /// Ticks until the player may fire again
    pub shot_cooldown: u32,
    /// Ticks until the next saucer may appear
    pub splash_ticks: u32,
    /// Ticks until saucers fire again
    pub alien_fire_ticks: u32,
    pub thrust_sound_ticks: u32,
    pub master_volume: f32,
    /// Player first, then saucers in spawn order
    pub ships: Vec<Ship>,
    pub asteroids: Vec<Asteroid>,
    pub missiles: Vec<Missile>,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning: tuning.sanitized(),
            level: START_LEVEL,
            lives: MAX_LIVES,
            score: 0,
            bonus_count: 1,
            time_ticks: 0,
            phase: GamePhase::Playing,
            running: true,
            level_start_ticks: 0,
            shot_cooldown: 0,
            splash_ticks: 0,
            alien_fire_ticks: ALIEN_SHOT_DELAY_TICKS,
            thrust_sound_ticks: 0,
            master_volume: 0.8,
            ships: Vec::new(),
            asteroids: Vec::new(),
            missiles: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        };
        state.splash_ticks = state.roll_splash_delay();

        let id = state.next_entity_id();
        state.ships.push(Ship::player(id));
        super::tick::generate_wave(&mut state);
        log::info!("New session (seed {})", seed);
        state
    }

    /// Start over with the same seed stream, keeping tuning and volume
    pub fn restart(&mut self) {
        self.push_audio(AudioCommand::StopAll);
        self.level = START_LEVEL;
        self.lives = MAX_LIVES;
        self.score = 0;
        self.bonus_count = 1;
        self.phase = GamePhase::Playing;
        self.running = true;
        self.level_start_ticks = 0;
        self.shot_cooldown = 0;
        self.alien_fire_ticks = ALIEN_SHOT_DELAY_TICKS;
        self.thrust_sound_ticks = 0;
        self.splash_ticks = self.roll_splash_delay();
        self.missiles.clear();
        self.ships.clear();
        let id = self.next_entity_id();
        self.ships.push(Ship::player(id));
        super::tick::generate_wave(self);
        log::info!("Session restarted");
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// The controllable ship, if it is still part of the session
    pub fn player(&self) -> Option<&Ship> {
        self.ships.iter().find(|s| s.class == ShipClass::Human)
    }

    pub fn player_mut(&mut self) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|s| s.class == ShipClass::Human)
    }

    pub fn aliens(&self) -> impl Iterator<Item = &Ship> {
        self.ships.iter().filter(|s| s.class.is_alien())
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn push_audio(&mut self, command: AudioCommand) {
        self.events.push(GameEvent::Audio(command));
    }

    /// Events queued since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Add points and hand out any extra lives they unlock
    pub fn award(&mut self, points: u64) {
        if points == 0 {
            return;
        }
        self.score += points;
        self.push_event(GameEvent::ScoreChanged { score: self.score });
        while self.score >= BONUS_POINTS * self.bonus_count {
            self.lives += 1;
            self.bonus_count += 1;
            self.push_audio(AudioCommand::play(SoundEffect::Bonus));
            self.push_event(GameEvent::ExtraLife { lives: self.lives });
        }
    }

    /// Whether no asteroid lies within the safety distance of `pos`
    pub fn is_safe_position(&self, pos: DVec2) -> bool {
        self.asteroids
            .iter()
            .all(|a| a.pos.distance(pos) > SAFETYDISTANCE)
    }

    pub(crate) fn roll_splash_delay(&mut self) -> u32 {
        let base = self.tuning.alien_spawn_ticks as i64;
        let jitter = self.tuning.alien_spawn_jitter as i64;
        let offset = if jitter > 0 {
            self.rng.random_range(-jitter..=jitter)
        } else {
            0
        };
        (base + offset).max(1) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let state = GameState::new(42);
        assert_eq!(state.level, START_LEVEL);
        assert_eq!(state.lives, MAX_LIVES);
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.asteroids.len(), (ASTEROIDS_PER_LEVEL * START_LEVEL) as usize);
        assert!(state.asteroids.iter().all(|a| a.tier == AsteroidTier::Large));

        let player = state.player().unwrap();
        assert_eq!(player.lifecycle(), ShipLifecycle::Spawning);
        assert_eq!(player.pos, field_center());
        assert_eq!(state.aliens().count(), 0);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut state = GameState::new(1);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
        // Ids already handed out to the wave are all below the new ones
        assert!(state.asteroids.iter().all(|ast| ast.id < a));
    }

    #[test]
    fn test_ship_lifecycle_transitions() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut ship = Ship::player(EntityId(1));
        assert_eq!(ship.lifecycle(), ShipLifecycle::Spawning);

        ship.shield_ticks = 0;
        assert_eq!(ship.lifecycle(), ShipLifecycle::Active);

        ship.explode(&mut rng);
        assert_eq!(ship.lifecycle(), ShipLifecycle::Exploding);
        assert_eq!(ship.explosion_ticks, SHIP_EXPLOSIONTICKS);
        assert!((SHIP_NDEBRIS / 2..=SHIP_NDEBRIS).contains(&ship.debris.len()));

        ship.explosion_ticks = 0;
        assert_eq!(ship.lifecycle(), ShipLifecycle::Removed);

        ship.respawn(field_center());
        assert_eq!(ship.lifecycle(), ShipLifecycle::Spawning);
        assert!(ship.debris.is_empty());
    }

    #[test]
    fn test_explode_clears_shield() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ship = Ship::new(EntityId(5), ShipClass::AlienBig, DVec2::new(10.0, 10.0));
        ship.shield_ticks = 30;
        ship.explode(&mut rng);
        assert_eq!(ship.shield_ticks, 0);
        assert!(!ship.visible);
    }

    #[test]
    fn test_debris_expands() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ship = Ship::player(EntityId(1));
        ship.explode(&mut rng);
        let first: f64 = ship.debris_points().iter().map(|p| p.distance(ship.pos)).sum();
        ship.explosion_ticks -= 10;
        let later: f64 = ship.debris_points().iter().map(|p| p.distance(ship.pos)).sum();
        assert!(later > first);
        assert!(ship.debris_color()[0] < 255);
    }

    #[test]
    fn test_thrust_caps_speed() {
        let mut ship = Ship::player(EntityId(1));
        for _ in 0..500 {
            ship.thrust(SHIP_IMPULSE);
        }
        assert!(ship.vel.length() <= SHIP_MAXVEL + 1e-9);
        assert_eq!(ship.impulse_ticks, SHIP_IMPULSETICKS);
    }

    #[test]
    fn test_shield_only_when_down() {
        let mut ship = Ship::player(EntityId(1));
        assert!(!ship.activate_shield());
        ship.shield_ticks = 0;
        assert!(ship.activate_shield());
        assert_eq!(ship.shield_ticks, SHIELD_TICKS);
    }

    #[test]
    fn test_faction_hostility() {
        assert!(Faction::Player.is_hostile_to(ShipClass::AlienBig));
        assert!(Faction::Player.is_hostile_to(ShipClass::AlienSmall));
        assert!(!Faction::Player.is_hostile_to(ShipClass::Human));
        assert!(Faction::Alien.is_hostile_to(ShipClass::Human));
        assert!(!Faction::Alien.is_hostile_to(ShipClass::AlienSmall));
    }

    #[test]
    fn test_award_grants_bonus_lives() {
        let mut state = GameState::new(3);
        state.award(999);
        assert_eq!(state.lives, MAX_LIVES);
        state.award(1);
        assert_eq!(state.lives, MAX_LIVES + 1);
        // A single large award can cross several thresholds
        state.award(2000);
        assert_eq!(state.lives, MAX_LIVES + 3);
        assert_eq!(state.bonus_count, 4);
    }

    #[test]
    fn test_tier_table() {
        assert_eq!(AsteroidTier::Large.smaller(), Some(AsteroidTier::Medium));
        assert_eq!(AsteroidTier::Small.smaller(), None);
        assert!(AsteroidTier::Small.score() > AsteroidTier::Large.score());
    }
}
