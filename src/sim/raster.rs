//! Pixel rasters backing every body
//!
//! A body carries two parallel buffers of the same size: the visible RGBA
//! image and the density map used for collision and erosion.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// One RGBA8 pixel
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Gray pixel with full alpha
    pub const fn gray(v: u8) -> Self {
        Self::new(v, v, v, 255)
    }
}

/// Visible RGBA raster, row-major
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Image {
    /// Create an image filled with a single color
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width * height) as usize],
        }
    }

    /// Wrap existing pixels; returns `None` when the length does not match
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Option<Self> {
        (pixels.len() == (width * height) as usize).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build an image by evaluating `f(x, y)` for every pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgba) -> Self {
        let mut pixels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Pixel at (x, y); out-of-range reads are transparent
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.index(x, y)
            .map(|i| self.pixels[i])
            .unwrap_or(Rgba::TRANSPARENT)
    }

    /// Write a pixel; out-of-range writes are ignored
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA8 bytes for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// A density map cell: hit count plus collision alpha.
///
/// A cell with no hits left is empty whatever its alpha says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DensityCell {
    /// Remaining hits before the pixel is destroyed
    pub density: u8,
    /// 0 means empty (never collides)
    pub alpha: u8,
}

impl DensityCell {
    pub const EMPTY: DensityCell = DensityCell {
        density: 0,
        alpha: 0,
    };

    /// Cell with zero density forced to zero alpha
    #[inline]
    pub const fn new(density: u8, alpha: u8) -> Self {
        Self {
            density,
            alpha: if density == 0 { 0 } else { alpha },
        }
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.density != 0 && self.alpha != 0
    }
}

/// Per-pixel density buffer parallel to an [`Image`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityMap {
    width: u32,
    height: u32,
    cells: Vec<DensityCell>,
}

impl DensityMap {
    /// Density map for a plain sprite: every pixel has `density`, alpha is
    /// copied from the image
    pub fn uniform(image: &Image, density: u8) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            cells: image
                .pixels()
                .iter()
                .map(|p| DensityCell::new(density, p.a))
                .collect(),
        }
    }

    /// Density map decoded from a density image: red channel is the hit
    /// count, alpha is the collision alpha
    pub fn from_image(image: &Image) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            cells: image
                .pixels()
                .iter()
                .map(|p| DensityCell::new(p.r, p.a))
                .collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    pub fn cell(&self, x: u32, y: u32) -> DensityCell {
        self.index(x, y)
            .map(|i| self.cells[i])
            .unwrap_or(DensityCell::EMPTY)
    }

    pub fn set_cell(&mut self, x: u32, y: u32, cell: DensityCell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Number of pixels that still collide
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_solid()).count()
    }
}
