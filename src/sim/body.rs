//! Density bodies: every object on the board
//!
//! A body is a raster sprite with a transform, a density map parallel to its
//! visible image, and trivial physics state. There is a single body type; the
//! role and capability flags tell the world step how to treat it.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::raster::{DensityCell, DensityMap, Image, Rgba};
use super::transform::{Rect, Transform};
use crate::consts::MAX_DENSITY_DEFAULT;

/// Body identifier, unique within a level
pub type BodyId = u32;

/// What a body is in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyRole {
    /// Board frame or level terrain
    Wall,
    Ball,
    Paddle,
    /// A diamond that falls and gets harvested
    Pickup,
}

/// Capability flags evaluated by the world step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Moves and is tested for collisions each tick
    pub dynamic: bool,
    /// Density map can be eroded by explosions
    pub destructible: bool,
}

impl BodyRole {
    /// Capabilities a freshly created body of this role starts with
    pub fn default_capabilities(self) -> Capabilities {
        match self {
            BodyRole::Wall => Capabilities::default(),
            BodyRole::Ball | BodyRole::Paddle | BodyRole::Pickup => Capabilities {
                dynamic: true,
                destructible: false,
            },
        }
    }
}

/// Pixel map and density map have different sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("pixel map is {image:?} but density map is {density:?}")]
pub struct SizeMismatch {
    pub image: (u32, u32),
    pub density: (u32, u32),
}

/// A raster body with density map and physics state
#[derive(Debug, Clone)]
pub struct DensityBody {
    pub role: BodyRole,
    pub caps: Capabilities,
    pub transform: Transform,
    image: Image,
    density: DensityMap,
    velocity: Vec2,
    /// Sum of permanently applied forces
    acceleration: Vec2,
    dead: bool,
    /// Cached grayscale view of the collision alpha, `None` when stale
    alpha_map: Option<Image>,
}

impl DensityBody {
    /// Body from a single image. Every pixel gets the default density and
    /// collides wherever the image is not fully transparent.
    pub fn from_image(role: BodyRole, image: Image) -> Self {
        let density = DensityMap::uniform(&image, MAX_DENSITY_DEFAULT);
        Self::assemble(role, image, density)
    }

    /// Body from a pixel map and a separate density map image
    pub fn with_density_map(
        role: BodyRole,
        image: Image,
        density_image: &Image,
    ) -> Result<Self, SizeMismatch> {
        if image.size() != density_image.size() {
            return Err(SizeMismatch {
                image: image.size(),
                density: density_image.size(),
            });
        }
        let density = DensityMap::from_image(density_image);
        Ok(Self::assemble(role, image, density))
    }

    fn assemble(role: BodyRole, image: Image, density: DensityMap) -> Self {
        Self {
            role,
            caps: role.default_capabilities(),
            transform: Transform::default(),
            image,
            density,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            dead: false,
            alpha_map: None,
        }
    }

    /// Builder-style capability override
    pub fn with_caps(mut self, caps: Capabilities) -> Self {
        self.caps = caps;
        self
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.transform.position = position;
        self
    }

    // --- geometry ---

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
    }

    /// Local size in pixels
    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.image.width() as f32, self.image.height() as f32)
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.density.area()
    }

    /// Global axis-aligned bounding box
    pub fn bounds(&self) -> Rect {
        self.transform.bounds(self.size())
    }

    /// Visual center in global space
    pub fn center(&self) -> Vec2 {
        self.transform.to_global(self.size() / 2.0)
    }

    // --- pixels ---

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn density_map(&self) -> &DensityMap {
        &self.density
    }

    /// Hit count at local (x, y)
    #[inline]
    pub fn density_at(&self, x: u32, y: u32) -> u8 {
        self.density.cell(x, y).density
    }

    /// Collision alpha at local (x, y)
    #[inline]
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.density.cell(x, y).alpha
    }

    /// Whether local (x, y) takes part in collisions
    #[inline]
    pub fn is_solid_at(&self, x: u32, y: u32) -> bool {
        self.density.cell(x, y).is_solid()
    }

    /// Write the density channel only; the visible pixel is untouched.
    /// Zero density also clears the collision alpha.
    pub fn set_density_at(&mut self, x: u32, y: u32, density: u8, alpha: u8) {
        self.density.set_cell(x, y, DensityCell::new(density, alpha));
        self.alpha_map = None;
    }

    /// Write the visible pixel only
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        self.image.set_pixel(x, y, color);
    }

    /// Punch a hole: clear both the visible pixel and its density
    pub fn clear_pixel(&mut self, x: u32, y: u32) {
        self.image.set_pixel(x, y, Rgba::TRANSPARENT);
        self.density.set_cell(x, y, DensityCell::EMPTY);
    }

    /// Mark the derived alpha view stale after bulk pixel edits
    pub fn invalidate_alpha_map(&mut self) {
        self.alpha_map = None;
    }

    /// Grayscale view of the collision alpha (more transparent is lighter),
    /// rebuilt on demand after pixels were removed
    pub fn debug_alpha_map(&mut self) -> &Image {
        let density = &self.density;
        self.alpha_map.get_or_insert_with(|| {
            Image::from_fn(density.width(), density.height(), |x, y| {
                Rgba::gray(255 - density.cell(x, y).alpha)
            })
        })
    }

    // --- physics ---

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Ignored for static bodies
    pub fn set_velocity(&mut self, velocity: Vec2) {
        if self.caps.dynamic {
            self.velocity = velocity;
        }
    }

    #[inline]
    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    /// Add a permanent force (fixed dt, unit mass)
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// Add a force for a single tick
    pub fn apply_impulse(&mut self, force: Vec2) {
        if self.caps.dynamic {
            self.velocity += force;
        }
    }

    /// Semi-implicit Euler step with dt = 1 tick
    pub fn physics_tick(&mut self) {
        self.velocity += self.acceleration;
        self.transform.position += self.velocity;
    }

    // --- lifecycle ---

    pub fn mark_dead(&mut self) {
        self.dead = true;
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.caps.dynamic
    }

    #[inline]
    pub fn is_destructible(&self) -> bool {
        self.caps.destructible
    }

    #[inline]
    pub fn is_pickup(&self) -> bool {
        self.role == BodyRole::Pickup
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(role: BodyRole, side: u32) -> DensityBody {
        DensityBody::from_image(role, Image::filled(side, side, Rgba::WHITE))
    }

    #[test]
    fn test_physics_tick_integrates_acceleration_first() {
        let mut b = square(BodyRole::Pickup, 2);
        b.set_velocity(Vec2::new(1.0, 0.0));
        b.apply_force(Vec2::new(0.0, 0.5));
        b.physics_tick();
        assert_eq!(b.velocity(), Vec2::new(1.0, 0.5));
        assert_eq!(b.position(), Vec2::new(1.0, 0.5));
        b.physics_tick();
        assert_eq!(b.position(), Vec2::new(2.0, 1.5));
    }

    #[test]
    fn test_static_body_ignores_velocity() {
        let mut wall = square(BodyRole::Wall, 2);
        wall.set_velocity(Vec2::new(3.0, 3.0));
        wall.apply_impulse(Vec2::ONE);
        assert_eq!(wall.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let img = Image::filled(3, 3, Rgba::WHITE);
        let dens = Image::filled(3, 4, Rgba::WHITE);
        let err = DensityBody::with_density_map(BodyRole::Wall, img, &dens).unwrap_err();
        assert_eq!(err.image, (3, 3));
        assert_eq!(err.density, (3, 4));
    }

    #[test]
    fn test_density_channel_independent_of_visible_alpha() {
        let img = Image::filled(2, 2, Rgba::WHITE);
        let dens = Image::filled(2, 2, Rgba::new(4, 4, 4, 255));
        let mut b = DensityBody::with_density_map(BodyRole::Wall, img, &dens).unwrap();
        assert_eq!(b.density_at(1, 1), 4);
        b.set_density_at(1, 1, 2, 255);
        assert_eq!(b.density_at(1, 1), 2);
        assert_eq!(b.image().pixel(1, 1), Rgba::WHITE);
        b.set_density_at(0, 1, 0, 255);
        assert_eq!(b.alpha_at(0, 1), 0);
        assert!(!b.is_solid_at(0, 1));
        b.clear_pixel(0, 0);
        assert_eq!(b.alpha_at(0, 0), 0);
        assert_eq!(b.image().pixel(0, 0).a, 0);
    }

    #[test]
    fn test_debug_alpha_map_regenerates() {
        let mut b = square(BodyRole::Wall, 2);
        assert_eq!(b.debug_alpha_map().pixel(0, 0), Rgba::gray(0));
        b.clear_pixel(0, 0);
        b.invalidate_alpha_map();
        assert_eq!(b.debug_alpha_map().pixel(0, 0), Rgba::gray(255));
    }

    #[test]
    fn test_center_accounts_for_transform() {
        let b = square(BodyRole::Ball, 10).at(Vec2::new(100.0, 50.0));
        assert_eq!(b.center(), Vec2::new(105.0, 55.0));
    }
}
