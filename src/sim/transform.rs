//! Body transforms and axis-aligned rectangles
//!
//! Local space has its origin at the top-left pixel of the body raster,
//! x to the right and y down. A transform maps local space to global
//! (screen) space as translate * rotate * scale.

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

/// Position, scale and rotation of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    pub scale: Vec2,
    /// Radians. Carried through every mapping but nothing in the game rotates.
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl Transform {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Local to global affine map
    #[inline]
    pub fn affine(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.rotation, self.position)
    }

    /// Global to local affine map
    #[inline]
    pub fn inverse(&self) -> Affine2 {
        self.affine().inverse()
    }

    #[inline]
    pub fn to_global(&self, local: Vec2) -> Vec2 {
        self.affine().transform_point2(local)
    }

    #[inline]
    pub fn to_local(&self, global: Vec2) -> Vec2 {
        self.inverse().transform_point2(global)
    }

    /// Global bounding box of the local rectangle `(0, 0, size)`
    pub fn bounds(&self, size: Vec2) -> Rect {
        Rect::new(Vec2::ZERO, size).transformed(&self.affine())
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Overlap of two rectangles. Rectangles that only share an edge do not
    /// intersect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let min = self.min.max(other.min);
        let max = self.max().min(other.max());
        (min.x < max.x && min.y < max.y).then(|| Rect::new(min, max - min))
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.y >= self.min.y && p.x <= self.max().x && p.y <= self.max().y
    }

    /// Bounding box of this rectangle after an affine map
    pub fn transformed(&self, affine: &Affine2) -> Rect {
        let corners = [
            self.min,
            Vec2::new(self.max().x, self.min.y),
            self.max(),
            Vec2::new(self.min.x, self.max().y),
        ]
        .map(|c| affine.transform_point2(c));
        let min = corners.iter().copied().fold(Vec2::splat(f32::INFINITY), Vec2::min);
        let max = corners
            .iter()
            .copied()
            .fold(Vec2::splat(f32::NEG_INFINITY), Vec2::max);
        Rect::new(min, max - min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_round_trip_point() {
        let t = Transform {
            position: Vec2::new(10.0, -4.0),
            scale: Vec2::new(2.0, 0.5),
            rotation: 0.3,
        };
        let p = Vec2::new(3.5, 7.25);
        let back = t.to_local(t.to_global(p));
        assert!((back - p).length() < 1e-4);
    }

    #[test]
    fn test_bounds_translated_and_scaled() {
        let t = Transform {
            position: Vec2::new(5.0, 6.0),
            scale: Vec2::splat(2.0),
            rotation: 0.0,
        };
        let r = t.bounds(Vec2::new(3.0, 4.0));
        assert_eq!(r.min, Vec2::new(5.0, 6.0));
        assert_eq!(r.size, Vec2::new(6.0, 8.0));
    }

    #[test]
    fn test_bounds_rotated_quarter_turn() {
        let t = Transform {
            rotation: FRAC_PI_2,
            ..Default::default()
        };
        let r = t.bounds(Vec2::new(4.0, 2.0));
        assert!((r.size.x - 2.0).abs() < 1e-4);
        assert!((r.size.y - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_touching_rects_do_not_intersect() {
        let a = Rect::new(Vec2::ZERO, Vec2::splat(10.0));
        let b = Rect::new(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        assert!(!a.intersects(&b));
        let c = Rect::new(Vec2::new(9.5, 9.5), Vec2::splat(10.0));
        let overlap = a.intersection(&c).unwrap();
        assert_eq!(overlap.size, Vec2::splat(0.5));
    }
}
