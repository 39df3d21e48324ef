//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Randomness only through a caller-supplied RNG
//! - Stable iteration order (by body ID)
//! - No rendering, audio or file system dependencies

pub mod body;
pub mod collision;
pub mod erosion;
pub mod physics;
pub mod raster;
pub mod state;
pub mod tick;
pub mod transform;

pub use body::{BodyId, BodyRole, Capabilities, DensityBody, SizeMismatch};
pub use collision::{CollisionResult, collides, erase_overlap};
pub use erosion::{Crater, apply_explosion};
pub use physics::{ImpactBand, PushOut, deviate_vector, push_out, reflect_ball};
pub use raster::{DensityCell, DensityMap, Image, Rgba};
pub use state::{GameEvent, World};
pub use tick::{GameOverReason, StepOutcome, TickInput, step};
pub use transform::{Rect, Transform};
