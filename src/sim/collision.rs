//! Pixel-perfect collision between density bodies
//!
//! The expensive part of the game: two bodies collide when a solid pixel of
//! one lands on a solid pixel of the other after mapping it through both
//! transforms. A bounding-box test rejects most pairs before any pixel is
//! touched, and the smaller body always does the scanning.

use std::cmp::Ordering;

use glam::{Affine2, Vec2};

use super::body::{BodyId, DensityBody};

/// Result of a collision query against the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Global position of the first colliding pixel
    pub point: Vec2,
    /// Body that was hit
    pub collidee: BodyId,
}

/// Test two bodies for collision.
///
/// Returns the global collision point on a hit. With `pixel_perfect` off the
/// bounding-box overlap alone decides, and the point is the center of the
/// overlap.
pub fn collides(a: &DensityBody, b: &DensityBody, pixel_perfect: bool) -> Option<Vec2> {
    let overlap = a.bounds().intersection(&b.bounds())?;
    if !pixel_perfect {
        return Some(overlap.min + overlap.size / 2.0);
    }
    let (scanner, other) = if scans_first(a, b) { (a, b) } else { (b, a) };
    first_hit(scanner, other)
}

/// Remove every solid pixel of the larger body that the smaller body
/// overlaps. Returns the number of pixels removed.
pub fn erase_overlap(a: &mut DensityBody, b: &mut DensityBody) -> usize {
    if !a.bounds().intersects(&b.bounds()) {
        return 0;
    }
    let (scanner, target) = if scans_first(a, b) { (&*a, b) } else { (&*b, a) };
    let erased = erase_hits(scanner, target);
    if erased > 0 {
        target.invalidate_alpha_map();
    }
    erased
}

/// Whether `a` scans when paired with `b`.
///
/// Smaller pixel area scans. Ties are broken by a total order over the
/// raster size and transform so that swapping the arguments never changes
/// which body scans.
pub fn scans_first(a: &DensityBody, b: &DensityBody) -> bool {
    scan_order(a, b) != Ordering::Greater
}

fn scan_order(a: &DensityBody, b: &DensityBody) -> Ordering {
    let (ta, tb) = (&a.transform, &b.transform);
    a.area()
        .cmp(&b.area())
        .then(a.size().x.total_cmp(&b.size().x))
        .then(a.size().y.total_cmp(&b.size().y))
        .then(ta.position.x.total_cmp(&tb.position.x))
        .then(ta.position.y.total_cmp(&tb.position.y))
        .then(ta.scale.x.total_cmp(&tb.scale.x))
        .then(ta.scale.y.total_cmp(&tb.scale.y))
        .then(ta.rotation.total_cmp(&tb.rotation))
}

/// Maps scanner-local pixel coordinates into the other body's raster
struct PixelMapper {
    to_other: Affine2,
    max: Vec2,
}

impl PixelMapper {
    fn new(scanner: &DensityBody, other: &DensityBody) -> Self {
        Self {
            to_other: other.transform.inverse() * scanner.transform.affine(),
            max: other.size() - Vec2::ONE,
        }
    }

    /// Integer pixel of the other raster under scanner pixel (x, y), or
    /// `None` when it falls outside. Coordinates are never wrapped.
    #[inline]
    fn map(&self, x: u32, y: u32) -> Option<(u32, u32)> {
        let p = self.to_other.transform_point2(Vec2::new(x as f32, y as f32));
        if p.x < 0.0 || p.y < 0.0 || p.x > self.max.x || p.y > self.max.y {
            return None;
        }
        Some((p.x as u32, p.y as u32))
    }
}

/// Row-major scan over the scanner's solid pixels, stopping at the first
/// pixel that lands on solid ground
fn first_hit(scanner: &DensityBody, other: &DensityBody) -> Option<Vec2> {
    let mapper = PixelMapper::new(scanner, other);
    let map = scanner.density_map();
    for y in 0..map.height() {
        for x in 0..map.width() {
            if !map.cell(x, y).is_solid() {
                continue;
            }
            let Some((ox, oy)) = mapper.map(x, y) else {
                continue;
            };
            if other.is_solid_at(ox, oy) {
                return Some(scanner.transform.to_global(Vec2::new(x as f32, y as f32)));
            }
        }
    }
    None
}

/// Same scan as [`first_hit`] but clears every hit pixel on `target` and
/// keeps going
fn erase_hits(scanner: &DensityBody, target: &mut DensityBody) -> usize {
    let mapper = PixelMapper::new(scanner, target);
    let map = scanner.density_map();
    let mut erased = 0;
    for y in 0..map.height() {
        for x in 0..map.width() {
            if !map.cell(x, y).is_solid() {
                continue;
            }
            let Some((ox, oy)) = mapper.map(x, y) else {
                continue;
            };
            if target.is_solid_at(ox, oy) {
                target.clear_pixel(ox, oy);
                erased += 1;
            }
        }
    }
    erased
}
