//! Game settings and tuning
//!
//! Loaded once at startup from JSON. Every field has a default, so a
//! settings file only needs the values it changes.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::transform::Rect;

/// Failure reading a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where the static sprites live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    /// Level catalog
    pub levels: String,
    /// Board frame pixel map and density map
    pub board_image: String,
    pub board_density: String,
    pub ball_image: String,
    pub paddle_image: String,
    /// Pickup sprite path; `{}` is replaced by the sprite variant
    pub pickup_pattern: String,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            levels: "data/levels.json".into(),
            board_image: "data/board.png".into(),
            board_density: "data/board_density.png".into(),
            ball_image: "data/ball.png".into(),
            paddle_image: "data/paddle.png".into(),
            pickup_pattern: "data/gem{}.png".into(),
        }
    }
}

impl AssetPaths {
    pub fn pickup_image(&self, variant: u32) -> String {
        self.pickup_pattern.replace("{}", &variant.to_string())
    }
}

/// Game settings/tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Play area ===
    pub screen_width: f32,
    pub screen_height: f32,

    // === Rules ===
    pub lives_max: u32,

    // === Physics (pixels per tick) ===
    pub paddle_speed: f32,
    pub ball_speed: f32,
    /// Downward acceleration of pickups
    pub gravity: f32,
    /// Largest random deviation from straight up on launch (radians)
    pub launch_max_deviation: f32,
    pub push_out_step: f32,
    pub push_out_max_steps: u32,

    // === Collision / destruction ===
    pub pixel_perfect: bool,
    pub explosion_radius: f32,
    /// Write back partial damage on pixels with more than one hit point
    pub multi_hit_density: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    pub assets: AssetPaths,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: RESOLUTION_X,
            screen_height: RESOLUTION_Y,

            lives_max: LIVES_MAX,

            paddle_speed: PADDLE_SPEED,
            ball_speed: BALL_SPEED,
            gravity: G_ACCELERATION,
            launch_max_deviation: LAUNCH_MAX_DEVIATION,
            push_out_step: PUSH_OUT_STEP,
            push_out_max_steps: PUSH_OUT_MAX_STEPS,

            pixel_perfect: true,
            explosion_radius: EXPLOSION_RADIUS,
            multi_hit_density: false,

            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.2,
            muted: false,

            assets: AssetPaths::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from `path`, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    /// Visible play area in global coordinates
    pub fn play_area(&self) -> Rect {
        Rect::new(Vec2::ZERO, Vec2::new(self.screen_width, self.screen_height))
    }

    /// Nominal launch velocity before deviation (straight up)
    pub fn launch_velocity(&self) -> Vec2 {
        Vec2::new(0.0, -self.ball_speed)
    }

    /// Paddle velocity for a horizontal input direction in [-1, 1]
    pub fn paddle_velocity(&self, direction: f32) -> Vec2 {
        Vec2::new(direction.clamp(-1.0, 1.0) * self.paddle_speed, 0.0)
    }
}
