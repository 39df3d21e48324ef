//! Terrain erosion around impact points

use glam::Vec2;

use super::body::DensityBody;

/// What an explosion did to the terrain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crater {
    /// Pixels whose density reached zero and were cleared
    pub destroyed: u32,
    /// Pixels that lost a hit point but survived
    pub damaged: u32,
}

/// Blast a circular crater into a destructible body.
///
/// The pixel window is `radius` in every direction from the local impact
/// point, clamped to the raster; only pixels within `radius / 2` of the
/// impact lose a hit point. A pixel reaching zero density is cleared. With
/// `multi_hit` off, partial damage is not written back, so a pixel with
/// density above one survives any number of blasts unchanged.
///
/// Non-destructible bodies are left alone.
pub fn apply_explosion(
    body: &mut DensityBody,
    impact_global: Vec2,
    radius: f32,
    multi_hit: bool,
) -> Crater {
    let mut crater = Crater::default();
    if !body.is_destructible() {
        return crater;
    }
    let cp = body.transform.to_local(impact_global);
    let size = body.size();
    let min_x = (cp.x - radius).max(0.0) as u32;
    let min_y = (cp.y - radius).max(0.0) as u32;
    let max_x = (cp.x + radius).clamp(0.0, size.x) as u32;
    let max_y = (cp.y + radius).clamp(0.0, size.y) as u32;
    let damage_radius = radius / 2.0;

    for y in min_y..max_y {
        for x in min_x..max_x {
            let dist = Vec2::new(x as f32, y as f32).distance(cp);
            if dist > damage_radius {
                continue;
            }
            let density = body.density_at(x, y);
            if density == 0 {
                continue;
            }
            let left = density - 1;
            if left == 0 {
                body.clear_pixel(x, y);
                crater.destroyed += 1;
            } else if multi_hit {
                body.set_density_at(x, y, left, 255);
                crater.damaged += 1;
            }
        }
    }
    if crater.destroyed > 0 {
        body.invalidate_alpha_map();
    }
    crater
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::{BodyRole, Capabilities};
    use crate::sim::raster::{Image, Rgba};

    fn terrain(side: u32, density: u8) -> DensityBody {
        let img = Image::filled(side, side, Rgba::WHITE);
        let dens = Image::filled(side, side, Rgba::new(density, density, density, 255));
        DensityBody::with_density_map(BodyRole::Wall, img, &dens)
            .unwrap()
            .with_caps(Capabilities {
                dynamic: false,
                destructible: true,
            })
    }

    #[test]
    fn test_single_hit_pixels_cleared_inside_inner_radius() {
        let mut t = terrain(100, 1).at(Vec2::new(10.0, 10.0));
        let crater = apply_explosion(&mut t, Vec2::new(60.0, 60.0), 20.0, false);
        assert!(crater.destroyed > 0);
        // Local impact point is (50, 50)
        assert_eq!(t.density_at(50, 50), 0);
        assert_eq!(t.alpha_at(50, 50), 0);
        assert_eq!(t.image().pixel(50, 50), Rgba::TRANSPARENT);
        assert_eq!(t.density_at(59, 50), 0);
        // Inside the window but beyond radius / 2
        assert_eq!(t.density_at(62, 50), 1);
        assert_eq!(t.image().pixel(62, 50), Rgba::WHITE);
        assert_eq!(t.density_at(58, 58), 1);
    }

    #[test]
    fn test_crater_is_clamped_to_raster() {
        let mut t = terrain(10, 1);
        let crater = apply_explosion(&mut t, Vec2::new(0.0, 0.0), 8.0, false);
        // Quarter disc of radius 4 at the corner
        assert!(crater.destroyed > 0);
        assert_eq!(t.density_at(0, 0), 0);
        assert_eq!(t.density_at(4, 0), 0);
        assert_eq!(t.density_at(5, 0), 1);
        assert_eq!(t.density_at(3, 3), 1);
    }

    #[test]
    fn test_non_destructible_untouched() {
        let mut wall = DensityBody::from_image(BodyRole::Wall, Image::filled(10, 10, Rgba::WHITE));
        let crater = apply_explosion(&mut wall, Vec2::new(5.0, 5.0), 10.0, false);
        assert_eq!(crater, Crater::default());
        assert_eq!(wall.density_map().solid_count(), 100);
    }

    #[test]
    fn test_partial_damage_only_with_multi_hit() {
        let mut t = terrain(10, 2);
        let crater = apply_explosion(&mut t, Vec2::new(5.0, 5.0), 4.0, false);
        assert_eq!(crater.destroyed, 0);
        assert_eq!(t.density_at(5, 5), 2);

        let crater = apply_explosion(&mut t, Vec2::new(5.0, 5.0), 4.0, true);
        assert!(crater.damaged > 0);
        assert_eq!(t.density_at(5, 5), 1);
        assert_eq!(t.image().pixel(5, 5), Rgba::WHITE);

        apply_explosion(&mut t, Vec2::new(5.0, 5.0), 4.0, true);
        assert_eq!(t.alpha_at(5, 5), 0);
    }

    #[test]
    fn test_impact_outside_body_does_nothing() {
        let mut t = terrain(10, 1);
        let crater = apply_explosion(&mut t, Vec2::new(500.0, 500.0), 20.0, false);
        assert_eq!(crater.destroyed, 0);
    }
}
