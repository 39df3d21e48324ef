//! Presentation interface
//!
//! Drawing goes through the [`Canvas`] trait so the simulation never depends
//! on a window or GPU. [`Framebuffer`] is a CPU canvas used by the headless
//! binary and tests; its pixels can be uploaded as raw bytes.

use glam::Vec2;

use crate::sim::raster::{Image, Rgba};
use crate::sim::state::World;
use crate::sim::transform::{Rect, Transform};

/// Something bodies can be drawn onto
pub trait Canvas {
    fn clear(&mut self, color: Rgba);

    /// Draw `image` placed by `transform`
    fn draw_image(&mut self, image: &Image, transform: &Transform);
}

/// Draw every body in ascending id order, so later bodies cover earlier
/// ones
pub fn draw_world(world: &World, canvas: &mut impl Canvas) {
    for (_, body) in world.bodies() {
        canvas.draw_image(body.image(), &body.transform);
    }
}

/// Text the HUD shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub collected: u32,
    pub required: u32,
    pub lives: u32,
    pub level_info: String,
    pub paused: bool,
}

impl Hud {
    pub fn from_world(world: &World, paused: bool) -> Self {
        Self {
            collected: world.collected,
            required: world.required,
            lives: world.lives,
            level_info: world.level_info.clone(),
            paused,
        }
    }

    /// Pickup counter as shown on screen
    pub fn pickups_label(&self) -> String {
        format!("{}/{}", self.collected, self.required)
    }
}

/// CPU render target
#[derive(Debug, Clone)]
pub struct Framebuffer {
    image: Image,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: Image::filled(width, height, Rgba::TRANSPARENT),
        }
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Raw RGBA8 bytes for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_bytes()
    }
}

/// Source-over blend of `src` onto `dst`
fn blend(dst: Rgba, src: Rgba) -> Rgba {
    match src.a {
        0 => dst,
        255 => src,
        a => {
            let a = a as u32;
            let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a)) / 255) as u8;
            Rgba::new(
                mix(src.r, dst.r),
                mix(src.g, dst.g),
                mix(src.b, dst.b),
                (a + dst.a as u32 * (255 - a) / 255) as u8,
            )
        }
    }
}

impl Canvas for Framebuffer {
    fn clear(&mut self, color: Rgba) {
        let (w, h) = self.image.size();
        self.image = Image::filled(w, h, color);
    }

    fn draw_image(&mut self, image: &Image, transform: &Transform) {
        let (w, h) = self.image.size();
        let size = Vec2::new(image.width() as f32, image.height() as f32);
        let screen = Rect::new(Vec2::ZERO, Vec2::new(w as f32, h as f32));
        let Some(area) = transform.bounds(size).intersection(&screen) else {
            return;
        };
        let to_local = transform.inverse();
        let (x0, y0) = (area.min.x as u32, area.min.y as u32);
        let max = area.max();
        let (x1, y1) = (max.x.ceil() as u32, max.y.ceil() as u32);

        for y in y0..y1.min(h) {
            for x in x0..x1.min(w) {
                // Sample at the pixel center
                let p = to_local.transform_point2(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if p.x < 0.0 || p.y < 0.0 || p.x >= size.x || p.y >= size.y {
                    continue;
                }
                let src = image.pixel(p.x as u32, p.y as u32);
                let dst = self.image.pixel(x, y);
                self.image.set_pixel(x, y, blend(dst, src));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::{BodyRole, DensityBody};

    #[test]
    fn test_draw_image_at_position() {
        let mut fb = Framebuffer::new(20, 20);
        let red = Rgba::new(255, 0, 0, 255);
        fb.draw_image(&Image::filled(4, 4, red), &Transform::at(Vec2::new(5.0, 6.0)));
        assert_eq!(fb.image().pixel(5, 6), red);
        assert_eq!(fb.image().pixel(8, 9), red);
        assert_eq!(fb.image().pixel(9, 9), Rgba::TRANSPARENT);
        assert_eq!(fb.image().pixel(4, 6), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_draw_clips_to_screen() {
        let mut fb = Framebuffer::new(10, 10);
        fb.draw_image(&Image::filled(8, 8, Rgba::WHITE), &Transform::at(Vec2::new(6.0, -4.0)));
        assert_eq!(fb.image().pixel(9, 0), Rgba::WHITE);
        assert_eq!(fb.image().pixel(9, 3), Rgba::WHITE);
        assert_eq!(fb.image().pixel(9, 4), Rgba::TRANSPARENT);
        assert_eq!(fb.as_bytes().len(), 10 * 10 * 4);
    }

    #[test]
    fn test_later_bodies_draw_on_top() {
        let mut world = World::new(Rect::new(Vec2::ZERO, Vec2::new(10.0, 10.0)), 3);
        let blue = Rgba::new(0, 0, 255, 255);
        world.add_body(DensityBody::from_image(BodyRole::Wall, Image::filled(10, 10, Rgba::WHITE)));
        world.add_body(
            DensityBody::from_image(BodyRole::Pickup, Image::filled(2, 2, blue))
                .at(Vec2::new(3.0, 3.0)),
        );
        let mut fb = Framebuffer::new(10, 10);
        fb.clear(Rgba::gray(0));
        draw_world(&world, &mut fb);
        assert_eq!(fb.image().pixel(3, 3), blue);
        assert_eq!(fb.image().pixel(0, 0), Rgba::WHITE);
    }

    #[test]
    fn test_transparent_pixels_keep_background() {
        assert_eq!(blend(Rgba::WHITE, Rgba::TRANSPARENT), Rgba::WHITE);
        let half = blend(Rgba::gray(0), Rgba::new(255, 255, 255, 128));
        assert!(half.r > 100 && half.r < 160);
    }

    #[test]
    fn test_hud_snapshot() {
        let mut world = World::new(Rect::new(Vec2::ZERO, Vec2::new(10.0, 10.0)), 3);
        world.required = 5;
        world.collected = 2;
        world.level_info = "Level 2, code: XY".into();
        let hud = Hud::from_world(&world, true);
        assert_eq!(hud.pickups_label(), "2/5");
        assert_eq!(hud.lives, 3);
        assert!(hud.paused);
    }
}
