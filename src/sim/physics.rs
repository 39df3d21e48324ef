//! Collision response: push-out and ball reflection
//!
//! Integration itself lives on the body (`DensityBody::physics_tick`); this
//! module decides what happens after a move ends inside something.

use std::f32::consts::FRAC_1_SQRT_2;

use glam::Vec2;
use rand::Rng;

use super::body::DensityBody;
use crate::rotate_vec;

const COS45: f32 = FRAC_1_SQRT_2;
const COS135: f32 = -FRAC_1_SQRT_2;

/// How a push-out attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOut {
    /// Body no longer overlaps after this many steps
    Clear { steps: u32 },
    /// Body has no velocity to back out along; left where it is
    Stationary,
    /// Step cap reached; body was put back at its pre-move position
    Fallback,
}

/// Back a penetrating body out along its reversed velocity.
///
/// Steps of `step` units are taken until `overlaps` reports false. After
/// `max_steps` steps without separating, the body is restored to
/// `pre_move`.
pub fn push_out(
    body: &mut DensityBody,
    pre_move: Vec2,
    step: f32,
    max_steps: u32,
    mut overlaps: impl FnMut(&DensityBody) -> bool,
) -> PushOut {
    let vel = body.velocity();
    if vel.length_squared() <= f32::EPSILON {
        return PushOut::Stationary;
    }
    let back = vel.normalize() * step;
    for steps in 1..=max_steps {
        body.set_position(body.position() - back);
        if !overlaps(body) {
            return PushOut::Clear { steps };
        }
    }
    log::warn!(
        "push-out did not separate {:?} after {} steps, restoring {:?}",
        body.role,
        max_steps,
        pre_move
    );
    body.set_position(pre_move);
    PushOut::Fallback
}

/// Which side of the ball an impact landed on (screen space, y down)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactBand {
    Right,
    Left,
    Top,
    Bottom,
}

impl ImpactBand {
    /// Classify a unit vector from the ball center toward the impact point.
    /// Vectors exactly on a 45 degree diagonal belong to no band.
    pub fn classify(dir: Vec2) -> Option<Self> {
        let mid = |v: f32| v > COS135 && v < COS45;
        if dir.x > COS45 && mid(dir.y) {
            Some(ImpactBand::Right)
        } else if dir.x < COS135 && mid(dir.y) {
            Some(ImpactBand::Left)
        } else if mid(dir.x) && dir.y < COS135 {
            Some(ImpactBand::Top)
        } else if mid(dir.x) && dir.y > COS45 {
            Some(ImpactBand::Bottom)
        } else {
            None
        }
    }
}

/// Axis-aligned bounce: flip the velocity component facing the impact.
///
/// `center` is the ball's visual center and `impact` the global collision
/// point. The velocity is unchanged when the impact direction falls on a
/// band boundary or coincides with the center.
pub fn reflect_ball(velocity: Vec2, center: Vec2, impact: Vec2) -> Vec2 {
    let dir = (impact - center).normalize_or_zero();
    match ImpactBand::classify(dir) {
        Some(ImpactBand::Left | ImpactBand::Right) => Vec2::new(-velocity.x, velocity.y),
        Some(ImpactBand::Top | ImpactBand::Bottom) => Vec2::new(velocity.x, -velocity.y),
        None => velocity,
    }
}

/// Rotate `v` by a random angle in `[-max_angle, max_angle]`, keeping its
/// length
pub fn deviate_vector<R: Rng + ?Sized>(v: Vec2, max_angle: f32, rng: &mut R) -> Vec2 {
    let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let k = rng.random_range(0..=1000) as f32 / 1000.0;
    rotate_vec(v, max_angle * k * direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodyRole;
    use crate::sim::collision::collides;
    use crate::sim::raster::{Image, Rgba};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_reflect_right_impact_flips_x() {
        let v = reflect_ball(Vec2::new(0.5, -1.0), Vec2::ZERO, Vec2::new(1.0, 0.0));
        assert_eq!(v, Vec2::new(-0.5, -1.0));
        let v = reflect_ball(Vec2::new(0.0, -1.0), Vec2::ZERO, Vec2::new(1.0, 0.0));
        assert_eq!(v.y, -1.0);
        assert_eq!(v.x, 0.0);
    }

    #[test]
    fn test_reflect_top_impact_flips_y() {
        let v = reflect_ball(Vec2::new(0.3, -1.4), Vec2::new(7.5, 7.5), Vec2::new(8.0, 0.0));
        assert_eq!(v, Vec2::new(0.3, 1.4));
    }

    #[test]
    fn test_reflect_left_and_bottom() {
        let vel = Vec2::new(2.0, 3.0);
        assert_eq!(
            reflect_ball(vel, Vec2::ZERO, Vec2::new(-5.0, 1.0)),
            Vec2::new(-2.0, 3.0)
        );
        assert_eq!(
            reflect_ball(vel, Vec2::ZERO, Vec2::new(1.0, 5.0)),
            Vec2::new(2.0, -3.0)
        );
    }

    #[test]
    fn test_diagonal_and_degenerate_impacts_do_not_reflect() {
        let vel = Vec2::new(1.0, 1.0);
        assert_eq!(ImpactBand::classify(Vec2::new(COS45, COS45)), None);
        assert_eq!(reflect_ball(vel, Vec2::ZERO, Vec2::ZERO), vel);
    }

    #[test]
    fn test_bands_are_exclusive() {
        for i in 0..360 {
            let a = (i as f32).to_radians();
            let dir = Vec2::new(a.cos(), a.sin());
            let hits = [
                dir.x > COS45 && dir.y > COS135 && dir.y < COS45,
                dir.x < COS135 && dir.y > COS135 && dir.y < COS45,
                dir.x > COS135 && dir.x < COS45 && dir.y < COS135,
                dir.x > COS135 && dir.x < COS45 && dir.y > COS45,
            ];
            assert!(hits.iter().filter(|h| **h).count() <= 1, "angle {i}");
        }
    }

    #[test]
    fn test_deviate_keeps_length_and_bounds_angle() {
        let mut rng = Pcg32::seed_from_u64(7);
        let up = Vec2::new(0.0, -1.4);
        for _ in 0..100 {
            let v = deviate_vector(up, 0.5, &mut rng);
            assert!((v.length() - 1.4).abs() < 1e-4);
            assert!(up.angle_to(v).abs() <= 0.5 + 1e-4);
        }
    }

    fn wall() -> DensityBody {
        DensityBody::from_image(BodyRole::Wall, Image::filled(50, 50, Rgba::WHITE))
            .at(Vec2::new(0.0, 100.0))
    }

    fn ball_at(y: f32) -> DensityBody {
        let mut ball = DensityBody::from_image(BodyRole::Ball, Image::filled(4, 4, Rgba::WHITE))
            .at(Vec2::new(20.0, y));
        ball.set_velocity(Vec2::new(0.0, 1.0));
        ball
    }

    #[test]
    fn test_push_out_backs_off_along_velocity() {
        let wall = wall();
        let mut ball = ball_at(98.0);
        let out = push_out(&mut ball, Vec2::new(20.0, 97.0), 0.45, 100, |b| {
            collides(b, &wall, true).is_some()
        });
        assert!(matches!(out, PushOut::Clear { .. }));
        assert!(collides(&ball, &wall, true).is_none());
        assert_eq!(ball.position().x, 20.0);
    }

    #[test]
    fn test_push_out_stationary_body() {
        let wall = wall();
        let mut ball = ball_at(98.0);
        ball.set_velocity(Vec2::ZERO);
        let out = push_out(&mut ball, Vec2::ZERO, 0.45, 100, |b| collides(b, &wall, true).is_some());
        assert_eq!(out, PushOut::Stationary);
    }

    #[test]
    fn test_push_out_falls_back_to_pre_move() {
        let mut ball = ball_at(98.0);
        let pre = Vec2::new(20.0, 90.0);
        let out = push_out(&mut ball, pre, 0.45, 10, |_| true);
        assert_eq!(out, PushOut::Fallback);
        assert_eq!(ball.position(), pre);
    }

    proptest! {
        #[test]
        fn prop_push_out_terminates(depth in 0.0f32..60.0, vx in -1.0f32..1.0) {
            let wall = wall();
            let mut ball = ball_at(96.5 + depth);
            ball.set_velocity(Vec2::new(vx, 1.0));
            let pre = ball.position();
            let out = push_out(&mut ball, pre, 0.45, 4096, |b| collides(b, &wall, true).is_some());
            prop_assert!(
                matches!(out, PushOut::Clear { .. }),
                "push-out did not clear: {:?}",
                out
            );
            prop_assert!(collides(&ball, &wall, true).is_none());
        }
    }
}
