//! Gembreaker - a breakout game played on destructible terrain
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pixel collision, physics, erosion, world step)
//! - `level`: Level catalog and level loading
//! - `assets`: Sprite sources (in-memory and procedurally generated)
//! - `game`: Session wrapper driving the simulation
//! - `settings`: Data-driven tuning
//! - `audio` / `render`: Presentation collaborator interfaces

pub mod assets;
pub mod audio;
pub mod game;
pub mod level;
pub mod render;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use level::{LevelCatalog, LevelError};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Visible play area
    pub const RESOLUTION_X: f32 = 800.0;
    pub const RESOLUTION_Y: f32 = 600.0;

    /// Fixed update rate (300 ticks per second)
    pub const UPDATE_PERIOD_MSEC: u32 = 1000 / 300;

    /// Ball sprite is square
    pub const BALL_SIZE: f32 = 15.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 134.0;
    pub const PADDLE_HEIGHT: f32 = 28.0;
    pub const PADDLE_POS_X: f32 = 350.0;
    pub const PADDLE_POS_Y: f32 = 550.0;

    pub const LIVES_MAX: u32 = 3;

    /// Speeds are in pixels per tick
    pub const PADDLE_SPEED: f32 = 4.0;
    pub const BALL_SPEED: f32 = 1.4;

    /// Constant downward acceleration applied to pickups
    pub const G_ACCELERATION: f32 = 0.001;

    /// Explosion window half-size; damage is applied within half of it
    pub const EXPLOSION_RADIUS: f32 = 150.0;

    /// Push-out step along the reversed velocity
    pub const PUSH_OUT_STEP: f32 = 0.45;
    /// Upper bound on push-out iterations per collision
    pub const PUSH_OUT_MAX_STEPS: u32 = 4096;

    /// Maximum launch deviation from straight up (radians)
    pub const LAUNCH_MAX_DEVIATION: f32 = 1.0;

    /// Density given to pixels of bodies built from a single image
    pub const MAX_DENSITY_DEFAULT: u8 = 1;
}

/// Rotate `v` by `angle` radians, preserving its length
#[inline]
pub fn rotate_vec(v: Vec2, angle: f32) -> Vec2 {
    let len = v.length();
    let rotated = Vec2::from_angle(angle).rotate(v);
    rotated.normalize_or_zero() * len
}
