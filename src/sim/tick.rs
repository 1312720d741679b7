//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically:
//! timers, player commands, saucer director, integration, collision,
//! reconcile, then player lifecycle and level flow.

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use rand::Rng;

use super::collision::{self, CollisionReport};
use super::events::GameEvent;
use super::physics::{self, Motion};
use super::state::{
    Asteroid, AsteroidTier, EntityId, GamePhase, GameState, Missile, Ship, ShipClass,
    ShipLifecycle, field_center,
};
use crate::audio::{AudioCommand, SoundEffect};
use crate::consts::*;
use crate::{direction_or, heading, normalize_angle, rand_abs, rand_symmetric, wrap_position};

/// Retries when placing a wave asteroid too close to the player
const WAVE_PLACEMENT_ATTEMPTS: usize = 16;

/// Demo pilot fires when its heading is within this angle of the target
const DEMO_AIM_TOLERANCE: f64 = 0.2;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub thrust: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub fire: bool,
    pub shield: bool,
    /// Pause toggle
    pub pause: bool,
    pub quit: bool,
    pub volume_up: bool,
    pub volume_down: bool,
    /// Idle/demo mode - the session flies the player ship
    pub demo: bool,
}

/// Entities created during a tick, appended after reconcile
#[derive(Debug, Default)]
struct Spawns {
    missiles: Vec<Missile>,
    aliens: Vec<Ship>,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.quit {
        if state.running {
            log::info!("Quit at tick {} with score {}", state.time_ticks, state.score);
        }
        state.running = false;
    }
    if !state.running {
        return;
    }

    apply_volume(state, input);

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing | GamePhase::LevelStart => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => {
                state.phase = if state.level_start_ticks > 0 {
                    GamePhase::LevelStart
                } else {
                    GamePhase::Playing
                };
            }
            GamePhase::GameOver => {}
        }
    }

    // Don't tick if paused or game over
    if matches!(state.phase, GamePhase::Paused | GamePhase::GameOver) {
        return;
    }

    state.time_ticks += 1;

    let mut input = input.clone();
    if input.demo {
        demo_input(state, &mut input);
    }

    advance_timers(state);

    let mut spawns = Spawns::default();
    apply_commands(state, &input, &mut spawns);
    if state.phase == GamePhase::Playing {
        direct_aliens(state, &mut spawns);
    }

    let departed = integrate(state);
    let report = collision::detect(state);
    reconcile(state, &report, &departed, spawns);

    update_player(state);
    check_level_clear(state);
}

fn apply_volume(state: &mut GameState, input: &TickInput) {
    let step = match (input.volume_up, input.volume_down) {
        (true, false) => VOLUME_STEP,
        (false, true) => -VOLUME_STEP,
        _ => return,
    };
    let volume = (state.master_volume + step).clamp(0.0, 1.0);
    if volume != state.master_volume {
        state.master_volume = volume;
        state.push_audio(AudioCommand::SetMasterVolume(volume));
    }
}

fn advance_timers(state: &mut GameState) {
    state.shot_cooldown = state.shot_cooldown.saturating_sub(1);
    state.thrust_sound_ticks = state.thrust_sound_ticks.saturating_sub(1);

    for ship in &mut state.ships {
        ship.shield_ticks = ship.shield_ticks.saturating_sub(1);
        ship.impulse_ticks = ship.impulse_ticks.saturating_sub(1);
        if !ship.alive {
            ship.explosion_ticks = ship.explosion_ticks.saturating_sub(1);
        }
    }
    for missile in &mut state.missiles {
        missile.ttl_ticks = missile.ttl_ticks.saturating_sub(1);
    }

    match state.phase {
        GamePhase::Playing => {
            state.splash_ticks = state.splash_ticks.saturating_sub(1);
        }
        GamePhase::LevelStart => {
            state.level_start_ticks = state.level_start_ticks.saturating_sub(1);
            if state.level_start_ticks == 0 {
                generate_wave(state);
                state.phase = GamePhase::Playing;
            }
        }
        _ => {}
    }
}

fn apply_commands(state: &mut GameState, input: &TickInput, spawns: &mut Spawns) {
    let Some(index) = state
        .ships
        .iter()
        .position(|s| s.class == ShipClass::Human && s.alive)
    else {
        return;
    };

    // Both rotate keys at once cancel out
    let turn = match (input.rotate_left, input.rotate_right) {
        (true, false) => SHIP_ROTSTEP,
        (false, true) => -SHIP_ROTSTEP,
        _ => 0.0,
    };
    if turn != 0.0 {
        state.ships[index].rotate(turn);
    }

    if input.thrust {
        state.ships[index].thrust(SHIP_IMPULSE);
        if state.thrust_sound_ticks == 0 {
            state.thrust_sound_ticks = THRUST_SOUND_TICKS;
            state.push_audio(AudioCommand::play(SoundEffect::ShipThrust));
        }
    }

    if input.fire && state.shot_cooldown == 0 {
        let id = state.next_entity_id();
        let ship = &state.ships[index];
        let nose = ship.heading();
        let missile = Missile::new(
            id,
            ship,
            wrap_position(ship.pos + nose * ship.radius()),
            nose * MISSILE_SPEED + ship.vel,
        );
        state.shot_cooldown = SHOTDELAY;
        state.push_audio(AudioCommand::play(SoundEffect::ShipFire));
        state.push_event(GameEvent::MissileFired {
            id,
            owner: missile.owner,
        });
        spawns.missiles.push(missile);
    }

    if input.shield && state.ships[index].activate_shield() {
        state.push_audio(AudioCommand::play(SoundEffect::Shield));
    }
}

/// Saucer steering, aimed fire and spawning
fn direct_aliens(state: &mut GameState, spawns: &mut Spawns) {
    for i in 0..state.ships.len() {
        if !state.ships[i].class.is_alien() || !state.ships[i].alive {
            continue;
        }
        state.ships[i].steer_ticks = state.ships[i].steer_ticks.saturating_sub(1);
        if state.ships[i].steer_ticks == 0 {
            let dy = rand_symmetric(&mut state.rng, 2.0 * ALIEN_STEER_STEP);
            let dx = rand_abs(&mut state.rng, ALIEN_STEER_STEP);
            let ship = &mut state.ships[i];
            ship.steer_ticks = ALIEN_STEER_TICKS;
            ship.vel += DVec2::new(dx, dy);
        }
    }

    state.alien_fire_ticks = state.alien_fire_ticks.saturating_sub(1);
    if state.alien_fire_ticks == 0 {
        state.alien_fire_ticks = ALIEN_SHOT_DELAY_TICKS;
        fire_at_player(state, spawns);
    }

    if state.splash_ticks == 0 {
        state.splash_ticks = state.roll_splash_delay();
        let present = state.aliens().count() + spawns.aliens.len();
        if present < MAX_ALIENS {
            let alien = spawn_alien(state);
            spawns.aliens.push(alien);
        }
    }
}

fn fire_at_player(state: &mut GameState, spawns: &mut Spawns) {
    let Some(target) = state.player().filter(|p| p.alive).map(|p| p.pos) else {
        return;
    };
    let shooters: Vec<usize> = state
        .ships
        .iter()
        .enumerate()
        .filter(|(_, s)| s.class.is_alien() && s.alive)
        .map(|(i, _)| i)
        .collect();

    for i in shooters {
        let aim = direction_or(target - state.ships[i].pos, DVec2::X);
        let inaccuracy = state.ships[i].class.profile().aim_inaccuracy;
        let angle = aim.x.atan2(aim.y) + rand_symmetric(&mut state.rng, inaccuracy);
        let dir = heading(angle);

        let id = state.next_entity_id();
        let shooter = &state.ships[i];
        let missile = Missile::new(
            id,
            shooter,
            wrap_position(shooter.pos + dir * shooter.radius()),
            dir * MISSILE_SPEED,
        );
        state.push_event(GameEvent::MissileFired {
            id,
            owner: missile.owner,
        });
        spawns.missiles.push(missile);
    }
}

fn spawn_alien(state: &mut GameState) -> Ship {
    let chance = state.tuning.small_alien_chance(state.level);
    let class = if state.rng.random::<f64>() < chance {
        ShipClass::AlienSmall
    } else {
        ShipClass::AlienBig
    };

    let center_y = FIELD_HEIGHT / 2.0;
    let y = center_y + rand_symmetric(&mut state.rng, center_y - ALIEN_ENTRY_MARGIN);
    let speed = ALIEN_BASE_SPEED + rand_abs(&mut state.rng, ALIEN_BASE_SPEED);

    let id = state.next_entity_id();
    let mut alien = Ship::new(id, class, DVec2::new(0.0, y));
    alien.vel = DVec2::new(speed, 0.0);

    if let Some(hum) = class.profile().hum {
        state.push_audio(AudioCommand::play_looped(hum));
    }
    state.push_event(GameEvent::AlienSpawned { id, class });
    log::info!("Saucer {:?} ({:?}) entering at y={:.0}", id, class, y);
    alien
}

/// Move everything one step; returns saucers that left the field
fn integrate(state: &mut GameState) -> Vec<EntityId> {
    let mut departed = Vec::new();
    for ship in &mut state.ships {
        if physics::integrate_ship(ship) == Motion::Departed {
            // Out of play before collisions are tested
            ship.alive = false;
            ship.visible = false;
            departed.push(ship.id);
        }
    }
    for asteroid in &mut state.asteroids {
        physics::integrate_asteroid(asteroid);
    }
    for missile in &mut state.missiles {
        physics::integrate_missile(missile);
    }
    departed
}

/// Apply a collision report, then drop dead entities and append new ones
fn reconcile(
    state: &mut GameState,
    report: &CollisionReport,
    departed: &[EntityId],
    spawns: Spawns,
) {
    for hit in &report.ships {
        let Some(index) = state.ships.iter().position(|s| s.id == hit.id) else {
            unreachable!("collision report names unknown ship {:?}", hit.id);
        };
        let class = state.ships[index].class;
        state.ships[index].explode(&mut state.rng);
        state.push_audio(AudioCommand::play(SoundEffect::ShipExplosion));
        state.push_event(GameEvent::ShipExploded { id: hit.id, class });

        if class == ShipClass::Human {
            state.lives = state.lives.saturating_sub(1);
            log::info!("Player destroyed, {} lives left", state.lives);
        } else {
            release_hum(state, class, &spawns.aliens);
            if hit.by_player {
                state.award(class.profile().score);
            }
        }
    }

    let mut children = Vec::new();
    for hit in &report.asteroids {
        let Some(parent) = state.asteroids.iter().find(|a| a.id == hit.id) else {
            unreachable!("collision report names unknown asteroid {:?}", hit.id);
        };
        let (tier, pos, vel) = (parent.tier, parent.pos, parent.vel);
        let split = split_asteroid(state, tier, pos, vel);
        state.push_audio(AudioCommand::play(tier.bang()));
        state.push_event(GameEvent::AsteroidDestroyed {
            id: hit.id,
            tier,
            pos,
            children: split.len(),
        });
        if hit.by_player {
            state.award(tier.score());
        }
        children.extend(split);
    }

    for &id in departed {
        let Some(class) = state.ships.iter().find(|s| s.id == id).map(|s| s.class) else {
            continue;
        };
        release_hum(state, class, &spawns.aliens);
        state.push_event(GameEvent::AlienDeparted { id });
        log::debug!("Saucer {:?} left the field", id);
    }

    state.asteroids.retain(|a| !report.asteroid_destroyed(a.id));
    state
        .missiles
        .retain(|m| !m.is_expired() && !report.missile_consumed(m.id));
    // The player is kept while waiting to respawn
    state
        .ships
        .retain(|s| !(s.class.is_alien() && s.lifecycle() == ShipLifecycle::Removed));

    state.missiles.extend(spawns.missiles);
    state.ships.extend(spawns.aliens);
    state.asteroids.extend(children);
}

/// Stop a saucer hum unless another live saucer of that class still uses it
fn release_hum(state: &mut GameState, class: ShipClass, pending: &[Ship]) {
    let Some(hum) = class.profile().hum else {
        return;
    };
    let still_flying = state
        .ships
        .iter()
        .chain(pending)
        .any(|s| s.class == class && s.alive);
    if !still_flying {
        state.push_audio(AudioCommand::Stop(hum));
    }
}

/// Two children one tier down, diverging to either side of the parent heading
fn split_asteroid(
    state: &mut GameState,
    tier: AsteroidTier,
    pos: DVec2,
    vel: DVec2,
) -> Vec<Asteroid> {
    let Some(child_tier) = tier.smaller() else {
        return Vec::new();
    };
    let tuning = state.tuning.clone();

    // A parent at rest sends its children off in a random direction
    let dir = match vel.try_normalize() {
        Some(dir) => dir,
        None => heading(state.rng.random_range(0.0..TAU)),
    };
    let speed = (vel.length() * tuning.split_speed_gain)
        .max(tuning.split_min_speed)
        .min(ASTEROID_MAX_SPEED);

    [1.0, -1.0]
        .into_iter()
        .map(|side| {
            let spread = tuning.split_spread_min
                + rand_abs(
                    &mut state.rng,
                    tuning.split_spread_max - tuning.split_spread_min,
                );
            let child_vel = DVec2::from_angle(side * spread).rotate(dir) * speed;
            let id = state.next_entity_id();
            Asteroid::new(
                id,
                child_tier,
                pos,
                child_vel,
                tuning.asteroid_spin_per_speed,
                &mut state.rng,
            )
        })
        .collect()
}

/// Respawn or retire the player once its explosion has finished
fn update_player(state: &mut GameState) {
    let Some(player) = state.player() else {
        return;
    };
    if player.lifecycle() != ShipLifecycle::Removed {
        return;
    }

    if state.lives == 0 {
        state.ships.retain(|s| s.class != ShipClass::Human);
        state.phase = GamePhase::GameOver;
        state.push_audio(AudioCommand::StopAll);
        state.push_audio(AudioCommand::play_looped(SoundEffect::GameOverTheme));
        state.push_event(GameEvent::GameOver {
            score: state.score,
            level: state.level,
        });
        log::info!(
            "Game over at level {} with score {} after {} ticks",
            state.level,
            state.score,
            state.time_ticks
        );
        return;
    }

    let center = field_center();
    if !state.is_safe_position(center) {
        return;
    }
    if let Some(player) = state.player_mut() {
        player.respawn(center);
    }
    state.push_event(GameEvent::PlayerRespawned);
}

fn check_level_clear(state: &mut GameState) {
    if state.phase != GamePhase::Playing
        || !state.asteroids.is_empty()
        || state.aliens().next().is_some()
    {
        return;
    }
    state.push_event(GameEvent::LevelCleared { level: state.level });
    log::info!("Level {} cleared with score {}", state.level, state.score);

    state.level += 1;
    state.missiles.clear();
    state.level_start_ticks = LEVEL_START_DELAY_TICKS;
    state.phase = GamePhase::LevelStart;
}

/// Spawn the asteroid wave for the current level
///
/// Five large asteroids per level, kept clear of the player's position.
pub fn generate_wave(state: &mut GameState) {
    state.asteroids.clear();

    let count = (ASTEROIDS_PER_LEVEL * state.level) as usize;
    let guard = state.player().filter(|p| p.alive).map(|p| p.pos);
    let speed_scale = 1.0 + 0.1 * state.level.saturating_sub(1) as f64;
    let spin = state.tuning.asteroid_spin_per_speed;

    for _ in 0..count {
        let mut pos = random_field_position(&mut state.rng);
        if let Some(guard) = guard {
            let mut attempts = 0;
            while pos.distance(guard) <= SAFETYDISTANCE && attempts < WAVE_PLACEMENT_ATTEMPTS {
                pos = random_field_position(&mut state.rng);
                attempts += 1;
            }
            if pos.distance(guard) <= SAFETYDISTANCE {
                let away = direction_or(pos - guard, DVec2::X);
                pos = wrap_position(guard + away * (SAFETYDISTANCE + 1.0));
            }
        }

        let dir = heading(state.rng.random_range(0.0..TAU));
        let speed = (ASTEROID_VEL * speed_scale * state.rng.random_range(0.5..=1.5))
            .min(ASTEROID_MAX_SPEED);

        let id = state.next_entity_id();
        let asteroid = Asteroid::new(
            id,
            AsteroidTier::Large,
            pos,
            dir * speed,
            spin,
            &mut state.rng,
        );
        state.asteroids.push(asteroid);
    }

    state.push_event(GameEvent::LevelStarted {
        level: state.level,
        asteroids: count,
    });
    log::info!("Level {}: {} asteroids", state.level, count);
}

fn random_field_position<R: Rng + ?Sized>(rng: &mut R) -> DVec2 {
    DVec2::new(
        rng.random_range(0.0..FIELD_WIDTH),
        rng.random_range(0.0..FIELD_HEIGHT),
    )
}

/// Idle/demo pilot: turn toward the nearest target, shoot when lined up,
/// shield when a rock gets close
fn demo_input(state: &GameState, input: &mut TickInput) {
    let Some(player) = state.player().filter(|p| p.alive) else {
        return;
    };

    let target = state
        .asteroids
        .iter()
        .map(|a| a.pos)
        .chain(state.aliens().filter(|s| s.alive).map(|s| s.pos))
        .min_by(|a, b| {
            a.distance_squared(player.pos)
                .partial_cmp(&b.distance_squared(player.pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    let Some(target) = target else {
        return;
    };

    let to_target = target - player.pos;
    let desired = normalize_angle(to_target.x.atan2(to_target.y));
    // Signed shortest turn in [-π, π)
    let diff = (desired - player.rotation + PI).rem_euclid(TAU) - PI;

    input.rotate_left = diff > SHIP_ROTSTEP / 2.0;
    input.rotate_right = diff < -SHIP_ROTSTEP / 2.0;
    input.fire = diff.abs() < DEMO_AIM_TOLERANCE;
    input.thrust = false;

    let threatened = state
        .asteroids
        .iter()
        .any(|a| a.pos.distance(player.pos) < a.radius + SAFETYDISTANCE * 0.5);
    input.shield = threatened;
}
