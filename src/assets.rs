//! Sprite sources
//!
//! The game never decodes image files itself: a level load asks an
//! [`AssetSource`] for each raster by path. [`MemoryAssets`] serves them from
//! a map, and [`MemoryAssets::procedural`] fills that map with generated
//! sprites so the game runs without any files on disk.

use std::collections::HashMap;

use crate::level::{LevelCatalog, LevelError};
use crate::settings::Settings;
use crate::sim::raster::{Image, Rgba};

/// Something that can hand out images by path
pub trait AssetSource {
    fn image(&self, path: &str) -> Result<Image, LevelError>;
}

/// Images kept in memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    images: HashMap<String, Image>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, image: Image) {
        self.images.insert(path.into(), image);
    }

    /// Builder-style insert
    pub fn with(mut self, path: impl Into<String>, image: Image) -> Self {
        self.insert(path, image);
        self
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Generated sprites for every path the settings and catalog refer to
    pub fn procedural(settings: &Settings, catalog: &LevelCatalog) -> Self {
        let w = settings.screen_width as u32;
        let h = settings.screen_height as u32;
        let paths = &settings.assets;

        let mut assets = Self::new()
            .with(paths.board_image.as_str(), board_image(w, h))
            .with(paths.board_density.as_str(), board_density(w, h))
            .with(paths.ball_image.as_str(), ball_image())
            .with(paths.paddle_image.as_str(), paddle_image());

        for (i, level) in catalog.levels().iter().enumerate() {
            let seed = i as u32 + 1;
            assets.insert(level.image.as_str(), terrain_image(w, h, seed));
            assets.insert(level.density.as_str(), terrain_density(w, h, seed));
            for pickup in &level.pickups {
                let path = paths.pickup_image(pickup.variant);
                if !assets.images.contains_key(&path) {
                    assets.insert(path, gem_image(pickup.variant));
                }
            }
        }
        assets
    }
}

impl AssetSource for MemoryAssets {
    fn image(&self, path: &str) -> Result<Image, LevelError> {
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| LevelError::MissingAsset(path.to_string()))
    }
}

// === Generated sprites ===

/// Thickness of the board frame on the left, right and top edges
const FRAME: u32 = 10;

/// Band of rock the ball digs through
const TERRAIN_TOP: u32 = 60;
const TERRAIN_BOTTOM: u32 = 340;

fn in_frame(x: u32, y: u32, w: u32) -> bool {
    x < FRAME || x >= w.saturating_sub(FRAME) || y < FRAME
}

fn board_image(w: u32, h: u32) -> Image {
    Image::from_fn(w, h, |x, y| {
        if in_frame(x, y, w) {
            Rgba::new(90, 90, 110, 255)
        } else {
            Rgba::TRANSPARENT
        }
    })
}

fn board_density(w: u32, h: u32) -> Image {
    Image::from_fn(w, h, |x, y| {
        if in_frame(x, y, w) {
            Rgba::new(1, 0, 0, 255)
        } else {
            Rgba::TRANSPARENT
        }
    })
}

/// Rock layers with a wavy lower edge that differs per level
fn terrain_solid(x: u32, y: u32, w: u32, seed: u32) -> bool {
    if x < FRAME || x >= w.saturating_sub(FRAME) {
        return false;
    }
    let phase = seed as f32 * 0.7;
    let wave = ((x as f32 / 37.0 + phase).sin() * 20.0) as i32;
    let bottom = TERRAIN_BOTTOM as i32 + wave;
    y >= TERRAIN_TOP && (y as i32) < bottom
}

fn terrain_image(w: u32, h: u32, seed: u32) -> Image {
    Image::from_fn(w, h, |x, y| {
        if !terrain_solid(x, y, w, seed) {
            return Rgba::TRANSPARENT;
        }
        // Streaky earth tones
        let band = ((y / 12 + x / 53 + seed) % 3) as u8;
        Rgba::new(120 + band * 15, 80 + band * 10, 40, 255)
    })
}

fn terrain_density(w: u32, h: u32, seed: u32) -> Image {
    Image::from_fn(w, h, |x, y| {
        if !terrain_solid(x, y, w, seed) {
            return Rgba::TRANSPARENT;
        }
        // Harder rock near the top, only matters with multi-hit density
        let density = if y < TERRAIN_TOP + 20 { 2 } else { 1 };
        Rgba::new(density, 0, 0, 255)
    })
}

fn ball_image() -> Image {
    let size = crate::consts::BALL_SIZE as u32;
    let r = size as f32 / 2.0;
    Image::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - r;
        let dy = y as f32 + 0.5 - r;
        if dx * dx + dy * dy <= r * r {
            Rgba::new(230, 230, 240, 255)
        } else {
            Rgba::TRANSPARENT
        }
    })
}

fn paddle_image() -> Image {
    let w = crate::consts::PADDLE_WIDTH as u32;
    let h = crate::consts::PADDLE_HEIGHT as u32;
    Image::from_fn(w, h, |x, y| {
        // Clipped corners
        let edge = x.min(w - 1 - x) + y.min(h - 1 - y);
        if edge < 4 {
            Rgba::TRANSPARENT
        } else {
            Rgba::new(60, 140, 220, 255)
        }
    })
}

const GEM_SIZE: u32 = 12;

fn gem_image(variant: u32) -> Image {
    let colors = [
        Rgba::new(80, 220, 255, 255),
        Rgba::new(255, 80, 120, 255),
        Rgba::new(120, 255, 120, 255),
        Rgba::new(255, 220, 60, 255),
    ];
    let color = colors[variant as usize % colors.len()];
    let half = GEM_SIZE as i32 / 2;
    Image::from_fn(GEM_SIZE, GEM_SIZE, |x, y| {
        let d = (x as i32 - half).abs() + (y as i32 - half).abs();
        if d < half { color } else { Rgba::TRANSPARENT }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        { "code": "A", "image": "t1.png", "density": "d1.png",
          "gems": [ { "x": 100, "y": 200, "idx": 1 }, { "x": 300, "y": 200, "idx": 2 } ] }
    ]"#;

    #[test]
    fn test_missing_path_is_an_error() {
        let assets = MemoryAssets::new();
        assert!(matches!(
            assets.image("nope.png"),
            Err(LevelError::MissingAsset(p)) if p == "nope.png"
        ));
    }

    #[test]
    fn test_procedural_covers_catalog() {
        let settings = Settings::default();
        let catalog = LevelCatalog::from_json(CATALOG).unwrap();
        let assets = MemoryAssets::procedural(&settings, &catalog);
        for path in ["t1.png", "d1.png", "data/gem1.png", "data/gem2.png"] {
            assert!(assets.image(path).is_ok(), "{path}");
        }
        assert!(assets.image(&settings.assets.board_density).is_ok());
        // board + density + ball + paddle + terrain + density + 2 gems
        assert_eq!(assets.len(), 8);
    }

    #[test]
    fn test_terrain_and_density_match() {
        let t = terrain_image(200, 400, 3);
        let d = terrain_density(200, 400, 3);
        assert_eq!(t.size(), d.size());
        for (p, q) in t.pixels().iter().zip(d.pixels()) {
            assert_eq!(p.a, q.a);
        }
    }

    #[test]
    fn test_sprite_sizes() {
        assert_eq!(ball_image().size(), (15, 15));
        assert_eq!(paddle_image().size(), (134, 28));
        assert_eq!(gem_image(0).pixel(6, 6).a, 255);
        assert_eq!(gem_image(0).pixel(0, 0).a, 0);
    }
}
