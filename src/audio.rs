//! Audio cue interface
//!
//! The simulation never plays sound itself. It queues `AudioCommand`s as
//! game events; the host drains them after each tick and hands them to an
//! `AudioManager`, which applies master volume and mute before forwarding to
//! whatever backend implements `AudioSink`.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Extra life awarded
    Bonus,
    /// Player shield raised
    Shield,
    /// Player fired
    ShipFire,
    /// Large asteroid destroyed
    BangLarge,
    /// Medium asteroid destroyed
    BangMedium,
    /// Small asteroid destroyed
    BangSmall,
    /// Big saucer hum (looped while on screen)
    SaucerBig,
    /// Small saucer hum (looped while on screen)
    SaucerSmall,
    /// Engine thrust
    ShipThrust,
    /// Any ship exploding
    ShipExplosion,
    /// Game over theme (looped)
    GameOverTheme,
}

impl SoundEffect {
    /// Every cue, in asset loading order
    pub const ALL: [SoundEffect; 11] = [
        SoundEffect::Bonus,
        SoundEffect::Shield,
        SoundEffect::ShipFire,
        SoundEffect::BangLarge,
        SoundEffect::BangMedium,
        SoundEffect::BangSmall,
        SoundEffect::SaucerBig,
        SoundEffect::SaucerSmall,
        SoundEffect::ShipThrust,
        SoundEffect::ShipExplosion,
        SoundEffect::GameOverTheme,
    ];

    /// Asset name the audio backend loads this cue from
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Bonus => "bonus",
            SoundEffect::Shield => "shield",
            SoundEffect::ShipFire => "ship_fire",
            SoundEffect::BangLarge => "bang_large",
            SoundEffect::BangMedium => "bang_medium",
            SoundEffect::BangSmall => "bang_small",
            SoundEffect::SaucerBig => "saucer_big",
            SoundEffect::SaucerSmall => "saucer_small",
            SoundEffect::ShipThrust => "ship_thrust",
            SoundEffect::ShipExplosion => "ship_explosion",
            SoundEffect::GameOverTheme => "starwars-trails",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// Fire-and-forget audio request emitted by the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCommand {
    Play { sound: SoundEffect, looping: bool },
    Stop(SoundEffect),
    StopAll,
    /// Master volume in `[0.0, 1.0]`
    SetMasterVolume(f32),
}

impl AudioCommand {
    pub fn play(sound: SoundEffect) -> Self {
        AudioCommand::Play {
            sound,
            looping: false,
        }
    }

    pub fn play_looped(sound: SoundEffect) -> Self {
        AudioCommand::Play {
            sound,
            looping: true,
        }
    }
}

/// Backend that actually produces sound
pub trait AudioSink {
    fn play(&mut self, sound: SoundEffect, looping: bool, volume: f32);
    fn stop(&mut self, sound: SoundEffect);
    fn stop_all(&mut self);
}

/// Sink that only logs cues (headless runs and tests)
#[derive(Debug, Default)]
pub struct LogSink {
    /// Cues played so far, in order
    pub played: Vec<SoundEffect>,
}

impl AudioSink for LogSink {
    fn play(&mut self, sound: SoundEffect, looping: bool, volume: f32) {
        log::debug!("play {} (loop={}, vol={:.2})", sound.name(), looping, volume);
        self.played.push(sound);
    }

    fn stop(&mut self, sound: SoundEffect) {
        log::debug!("stop {}", sound.name());
    }

    fn stop_all(&mut self) {
        log::debug!("stop all sounds");
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.sink.stop_all();
        }
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Apply one command from the simulation
    pub fn apply(&mut self, command: AudioCommand) {
        match command {
            AudioCommand::Play { sound, looping } => {
                let vol = self.effective_volume();
                if vol <= 0.0 {
                    return;
                }
                self.sink.play(sound, looping, vol);
            }
            AudioCommand::Stop(sound) => self.sink.stop(sound),
            AudioCommand::StopAll => self.sink.stop_all(),
            AudioCommand::SetMasterVolume(vol) => self.set_master_volume(vol),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
