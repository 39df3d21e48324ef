//! World state: the live bodies and the counters around them
//!
//! Bodies live in a `BTreeMap` keyed by id, so every pass over the world
//! visits them in ascending id order.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{BodyId, BodyRole, DensityBody};
use super::collision::{CollisionResult, collides, erase_overlap};
use super::transform::Rect;

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Ball bounced off something
    BallHit { point: Vec2 },
    /// Terrain was blasted at `point`
    Explosion { point: Vec2, destroyed: u32 },
    /// A pickup was collected
    Harvest { body: BodyId },
    /// Ball left the play area
    LifeLost { lives_left: u32 },
    LevelComplete { level: u32 },
}

/// All bodies of the current level plus the run counters
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) bodies: BTreeMap<BodyId, DensityBody>,
    next_id: BodyId,
    /// Distinguished bodies
    pub ball: BodyId,
    pub paddle: BodyId,
    /// Pickups harvested this level
    pub collected: u32,
    /// Pickups needed to finish the level
    pub required: u32,
    pub lives: u32,
    /// 1-based level index
    pub level: u32,
    /// HUD label for the level
    pub level_info: String,
    /// Ball rides on the paddle until launched
    pub ball_glued: bool,
    /// Visible play area; bodies fully outside it are lost
    pub play_area: Rect,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
}

impl World {
    pub fn new(play_area: Rect, lives: u32) -> Self {
        Self {
            bodies: BTreeMap::new(),
            next_id: 1,
            ball: 0,
            paddle: 0,
            collected: 0,
            required: 0,
            lives,
            level: 1,
            level_info: String::new(),
            ball_glued: true,
            play_area,
            events: Vec::new(),
        }
    }

    /// Allocate a new body ID
    fn next_body_id(&mut self) -> BodyId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a body and return its id. Ids are never reused.
    pub fn add_body(&mut self, body: DensityBody) -> BodyId {
        let id = self.next_body_id();
        match body.role {
            BodyRole::Ball => self.ball = id,
            BodyRole::Paddle => self.paddle = id,
            _ => {}
        }
        self.bodies.insert(id, body);
        id
    }

    pub fn body(&self, id: BodyId) -> Option<&DensityBody> {
        self.bodies.get(&id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut DensityBody> {
        self.bodies.get_mut(&id)
    }

    /// Live bodies in ascending id order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &DensityBody)> {
        self.bodies.iter().map(|(id, b)| (*id, b))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Drop every body (level reload)
    pub fn clear_bodies(&mut self) {
        self.bodies.clear();
    }

    /// Flag a body for removal at the end of the step
    pub fn remove_body(&mut self, id: BodyId) {
        if let Some(b) = self.bodies.get_mut(&id) {
            b.mark_dead();
        }
    }

    /// Remove bodies marked dead
    pub fn cull_dead(&mut self) -> usize {
        let before = self.bodies.len();
        self.bodies.retain(|_, b| !b.is_dead());
        before - self.bodies.len()
    }

    // --- input ---

    pub fn set_paddle_velocity(&mut self, velocity: Vec2) {
        if let Some(p) = self.bodies.get_mut(&self.paddle) {
            p.set_velocity(velocity);
        }
    }

    pub fn set_ball_velocity(&mut self, velocity: Vec2) {
        if let Some(b) = self.bodies.get_mut(&self.ball) {
            b.set_velocity(velocity);
        }
    }

    /// Release a glued ball with the given velocity. Returns false when the
    /// ball was already free.
    pub fn launch_ball(&mut self, velocity: Vec2) -> bool {
        if !self.ball_glued {
            return false;
        }
        self.ball_glued = false;
        self.set_ball_velocity(velocity);
        true
    }

    /// Park the ball centered on top of the paddle, at rest
    pub fn stick_ball_to_paddle(&mut self) {
        let Some(paddle) = self.bodies.get(&self.paddle) else {
            return;
        };
        let (paddle_pos, paddle_size) = (paddle.position(), paddle.size());
        if let Some(ball) = self.bodies.get_mut(&self.ball) {
            let size = ball.size();
            ball.set_position(Vec2::new(
                paddle_pos.x + (paddle_size.x - size.x) / 2.0,
                paddle_pos.y - size.y,
            ));
            ball.set_velocity(Vec2::ZERO);
        }
    }

    // --- queries ---

    /// First live body (ascending id) that `body` collides with.
    ///
    /// `body` is expected to be detached from the map while it is tested,
    /// so it never meets itself.
    pub fn find_collision(&self, body: &DensityBody, pixel_perfect: bool) -> Option<CollisionResult> {
        find_collision_in(&self.bodies, body, pixel_perfect)
    }

    /// Collision of a body that is still in the map against all the others
    pub fn collision_of(&self, id: BodyId, pixel_perfect: bool) -> Option<CollisionResult> {
        let body = self.bodies.get(&id)?;
        self.bodies
            .iter()
            .filter(|(other_id, other)| **other_id != id && !other.is_dead())
            .find_map(|(other_id, other)| {
                collides(body, other, pixel_perfect).map(|point| CollisionResult {
                    point,
                    collidee: *other_id,
                })
            })
    }

    /// Whether a body's bounds lie entirely outside the play area
    pub fn is_out_of_play(&self, body: &DensityBody) -> bool {
        !self.play_area.intersects(&body.bounds())
    }

    pub fn ball_out_of_play(&self) -> bool {
        self.body(self.ball)
            .is_some_and(|ball| self.is_out_of_play(ball))
    }

    pub fn level_complete(&self) -> bool {
        self.required > 0 && self.collected >= self.required
    }

    // --- mutation helpers used by the step ---

    /// Collect a pickup that is currently detached from the map
    pub(crate) fn harvest(&mut self, id: BodyId, pickup: &mut DensityBody) {
        if pickup.is_dead() || !pickup.is_pickup() {
            return;
        }
        pickup.mark_dead();
        self.collected = (self.collected + 1).min(self.required);
        self.events.push(GameEvent::Harvest { body: id });
    }

    /// Collect a pickup that lives in the map
    pub(crate) fn harvest_in_place(&mut self, id: BodyId) {
        if let Some(mut pickup) = self.bodies.remove(&id) {
            self.harvest(id, &mut pickup);
            self.bodies.insert(id, pickup);
        }
    }

    /// Erase terrain around a body so it does not start embedded. Only walls
    /// are carved.
    pub fn carve_around(&mut self, id: BodyId) -> usize {
        let Some(mut body) = self.bodies.remove(&id) else {
            return 0;
        };
        let erased: usize = self
            .bodies
            .values_mut()
            .filter(|other| other.role == BodyRole::Wall)
            .map(|wall| erase_overlap(&mut body, wall))
            .sum();
        self.bodies.insert(id, body);
        erased
    }

    /// Take the pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

pub(crate) fn find_collision_in(
    bodies: &BTreeMap<BodyId, DensityBody>,
    body: &DensityBody,
    pixel_perfect: bool,
) -> Option<CollisionResult> {
    bodies
        .iter()
        .filter(|(_, other)| !other.is_dead())
        .find_map(|(id, other)| {
            collides(body, other, pixel_perfect).map(|point| CollisionResult {
                point,
                collidee: *id,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::Capabilities;
    use crate::sim::raster::{Image, Rgba};

    fn area() -> Rect {
        Rect::new(Vec2::ZERO, Vec2::new(800.0, 600.0))
    }

    fn sprite(role: BodyRole, w: u32, h: u32, pos: Vec2) -> DensityBody {
        DensityBody::from_image(role, Image::filled(w, h, Rgba::WHITE)).at(pos)
    }

    #[test]
    fn test_ids_are_monotonic_and_never_reused() {
        let mut world = World::new(area(), 3);
        let a = world.add_body(sprite(BodyRole::Wall, 2, 2, Vec2::ZERO));
        let b = world.add_body(sprite(BodyRole::Ball, 2, 2, Vec2::ZERO));
        world.clear_bodies();
        let c = world.add_body(sprite(BodyRole::Paddle, 2, 2, Vec2::ZERO));
        assert!(a < b && b < c);
        assert_eq!(world.ball, b);
        assert_eq!(world.paddle, c);
    }

    #[test]
    fn test_find_collision_prefers_lowest_id() {
        let mut world = World::new(area(), 3);
        let first = world.add_body(sprite(BodyRole::Wall, 10, 10, Vec2::new(0.0, 0.0)));
        world.add_body(sprite(BodyRole::Wall, 10, 10, Vec2::new(4.0, 0.0)));
        let dot = sprite(BodyRole::Ball, 2, 2, Vec2::new(5.0, 5.0));
        let hit = world.find_collision(&dot, true).unwrap();
        assert_eq!(hit.collidee, first);
    }

    #[test]
    fn test_dead_bodies_are_ignored_and_culled() {
        let mut world = World::new(area(), 3);
        let wall = world.add_body(sprite(BodyRole::Wall, 10, 10, Vec2::ZERO));
        world.remove_body(wall);
        let dot = sprite(BodyRole::Ball, 2, 2, Vec2::new(5.0, 5.0));
        assert!(world.find_collision(&dot, true).is_none());
        assert_eq!(world.cull_dead(), 1);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_stick_ball_to_paddle() {
        let mut world = World::new(area(), 3);
        world.add_body(sprite(BodyRole::Paddle, 134, 28, Vec2::new(350.0, 550.0)));
        let ball = world.add_body(sprite(BodyRole::Ball, 15, 15, Vec2::ZERO));
        world.set_ball_velocity(Vec2::new(1.0, 1.0));
        world.stick_ball_to_paddle();
        let b = world.body(ball).unwrap();
        assert_eq!(b.position(), Vec2::new(409.5, 535.0));
        assert_eq!(b.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_launch_only_when_glued() {
        let mut world = World::new(area(), 3);
        world.add_body(sprite(BodyRole::Ball, 15, 15, Vec2::ZERO));
        assert!(world.launch_ball(Vec2::new(0.0, -1.4)));
        assert!(!world.ball_glued);
        assert!(!world.launch_ball(Vec2::new(0.0, 5.0)));
        assert_eq!(world.body(world.ball).unwrap().velocity(), Vec2::new(0.0, -1.4));
    }

    #[test]
    fn test_harvest_counts_once() {
        let mut world = World::new(area(), 3);
        world.required = 2;
        let gem = world.add_body(sprite(BodyRole::Pickup, 4, 4, Vec2::ZERO));
        world.harvest_in_place(gem);
        world.harvest_in_place(gem);
        assert_eq!(world.collected, 1);
        assert!(world.body(gem).unwrap().is_dead());
        assert_eq!(world.drain_events(), vec![GameEvent::Harvest { body: gem }]);
        assert!(world.events.is_empty());
    }

    #[test]
    fn test_carve_around_only_touches_walls() {
        let mut world = World::new(area(), 3);
        let terrain = world.add_body(
            sprite(BodyRole::Wall, 50, 50, Vec2::ZERO).with_caps(Capabilities {
                dynamic: false,
                destructible: true,
            }),
        );
        let paddle = world.add_body(sprite(BodyRole::Paddle, 40, 40, Vec2::ZERO));
        let gem = world.add_body(sprite(BodyRole::Pickup, 5, 5, Vec2::new(10.0, 10.0)));
        assert_eq!(world.carve_around(gem), 25);
        assert_eq!(world.body(terrain).unwrap().alpha_at(12, 12), 0);
        assert_eq!(world.body(paddle).unwrap().alpha_at(12, 12), 255);
    }

    #[test]
    fn test_out_of_play() {
        let world = World::new(area(), 3);
        assert!(world.is_out_of_play(&sprite(BodyRole::Ball, 15, 15, Vec2::new(100.0, 600.0))));
        assert!(!world.is_out_of_play(&sprite(BodyRole::Ball, 15, 15, Vec2::new(100.0, 590.0))));
        assert!(world.is_out_of_play(&sprite(BodyRole::Ball, 15, 15, Vec2::new(-15.0, 10.0))));
    }
}
