//! Sound cues
//!
//! The simulation only records [`GameEvent`]s. The session maps them to
//! [`SoundEffect`]s and hands them to an [`AudioManager`], which applies the
//! volume settings and forwards to whatever [`AudioSink`] plays sound on
//! this platform. Playback is fire-and-forget. A looping background track
//! runs for the length of a session.

use crate::settings::Settings;
use crate::sim::state::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ball bounced off something
    BallHit,
    /// Terrain blasted
    Explosion,
    /// Pickup collected
    Harvest,
    /// Ball fell out of play
    LifeLost,
    LevelComplete,
    GameOver,
    /// Ball released from the paddle
    Launch,
}

impl SoundEffect {
    /// Cue for a simulation event
    pub fn for_event(event: &GameEvent) -> Self {
        match event {
            GameEvent::BallHit { .. } => SoundEffect::BallHit,
            GameEvent::Explosion { .. } => SoundEffect::Explosion,
            GameEvent::Harvest { .. } => SoundEffect::Harvest,
            GameEvent::LifeLost { .. } => SoundEffect::LifeLost,
            GameEvent::LevelComplete { .. } => SoundEffect::LevelComplete,
        }
    }
}

/// Platform sound output
pub trait AudioSink {
    /// Start playing `effect` at `volume` (0.0 - 1.0)
    fn play(&mut self, effect: SoundEffect, volume: f32);

    /// Loop the background track at `volume`; 0.0 silences it
    fn music(&mut self, _volume: f32) {}
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Writes cues to the log; used by the headless binary
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::debug!("sfx {effect:?} at {volume:.2}");
    }

    fn music(&mut self, volume: f32) {
        log::debug!("music at {volume:.2}");
    }
}

/// Records cues, handy for tests
impl AudioSink for Vec<SoundEffect> {
    fn play(&mut self, effect: SoundEffect, _volume: f32) {
        self.push(effect);
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    music_playing: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S, settings: &Settings) -> Self {
        Self {
            sink,
            master_volume: settings.master_volume.clamp(0.0, 1.0),
            sfx_volume: settings.sfx_volume.clamp(0.0, 1.0),
            music_volume: settings.music_volume.clamp(0.0, 1.0),
            muted: settings.muted,
            music_playing: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
        self.sync_music();
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
        self.sync_music();
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.sync_music();
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }

    /// Start the background loop; does nothing if it is already running
    pub fn start_music(&mut self) {
        if !self.music_playing {
            self.music_playing = true;
            self.sync_music();
        }
    }

    pub fn stop_music(&mut self) {
        if self.music_playing {
            self.music_playing = false;
            self.sink.music(0.0);
        }
    }

    pub fn is_music_playing(&self) -> bool {
        self.music_playing
    }

    /// Push the current music volume to the sink while the loop runs
    fn sync_music(&mut self) {
        if self.music_playing {
            let vol = self.effective_music_volume();
            self.sink.music(vol);
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    /// Play the cue for each event, in order
    pub fn play_events(&mut self, events: &[GameEvent]) {
        for event in events {
            self.play(SoundEffect::for_event(event));
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
