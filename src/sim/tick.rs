//! Fixed timestep simulation step
//!
//! One call advances every dynamic body by one tick, resolves the collisions
//! it ran into, and reports whether the level or the run ended. The step does
//! no timing of its own; the caller decides how often to run it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{BodyId, BodyRole, DensityBody};
use super::collision::CollisionResult;
use super::erosion::apply_explosion;
use super::physics::{PushOut, push_out, reflect_ball};
use super::state::{GameEvent, World, find_collision_in};
use crate::settings::Settings;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Paddle velocity requested by the player
    pub paddle_velocity: Vec2,
    /// Release the ball if it is glued to the paddle
    pub launch: bool,
    /// Pause toggle
    pub pause: bool,
    /// Finish the current level (debug)
    pub skip_level: bool,
    /// Go back one level (debug)
    pub previous_level: bool,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    OutOfLives,
    /// The next level could not be loaded
    LevelLoadFailed,
    /// The last level was completed
    CampaignComplete,
}

/// What the caller should do after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Continue,
    /// All pickups were collected; load the next level
    LevelComplete,
    GameOver(GameOverReason),
}

/// Advance the world by one fixed tick
pub fn step(world: &mut World, settings: &Settings) -> StepOutcome {
    if world.ball_glued {
        world.stick_ball_to_paddle();
    }

    // Ascending id order; see `World`
    let ids: Vec<BodyId> = world.bodies.keys().copied().collect();
    for id in ids {
        // Detach the body so it can be moved while the rest are queried
        let Some(mut body) = world.bodies.remove(&id) else {
            continue;
        };

        if body.is_dynamic() && !body.is_dead() {
            let pre_move = body.position();
            body.physics_tick();
            if let Some(hit) = find_collision_in(&world.bodies, &body, settings.pixel_perfect) {
                resolve_collision(world, settings, id, &mut body, pre_move, hit);
            }
        }

        // A pickup that fell out of sight still counts
        if body.is_pickup() && !body.is_dead() && world.is_out_of_play(&body) {
            log::debug!("pickup {id} left the play area, auto-collecting");
            world.harvest(id, &mut body);
        }

        world.bodies.insert(id, body);
    }

    world.cull_dead();

    if world.level_complete() {
        log::info!(
            "Level {} complete ({}/{})",
            world.level,
            world.collected,
            world.required
        );
        world.events.push(GameEvent::LevelComplete { level: world.level });
        return StepOutcome::LevelComplete;
    }

    if world.ball_out_of_play() {
        world.lives = world.lives.saturating_sub(1);
        world.events.push(GameEvent::LifeLost {
            lives_left: world.lives,
        });
        if world.lives == 0 {
            log::info!("Last life lost on level {}", world.level);
            return StepOutcome::GameOver(GameOverReason::OutOfLives);
        }
        log::info!("Ball lost, {} lives left", world.lives);
        world.ball_glued = true;
        world.stick_ball_to_paddle();
    }

    StepOutcome::Continue
}

/// Push-out, bounce, erosion and harvesting for one mover that ended its
/// move inside `hit.collidee`
fn resolve_collision(
    world: &mut World,
    settings: &Settings,
    id: BodyId,
    body: &mut DensityBody,
    pre_move: Vec2,
    hit: CollisionResult,
) {
    let bodies = &world.bodies;
    let pushed = push_out(
        body,
        pre_move,
        settings.push_out_step,
        settings.push_out_max_steps,
        |b| find_collision_in(bodies, b, settings.pixel_perfect).is_some(),
    );
    if pushed == PushOut::Fallback {
        log::debug!("body {id} restored to {pre_move:?}");
    }

    if id == world.ball {
        world.events.push(GameEvent::BallHit { point: hit.point });
        if let Some(target) = world.bodies.get_mut(&hit.collidee) {
            if target.is_destructible() {
                let crater = apply_explosion(
                    target,
                    hit.point,
                    settings.explosion_radius,
                    settings.multi_hit_density,
                );
                world.events.push(GameEvent::Explosion {
                    point: hit.point,
                    destroyed: crater.destroyed,
                });
            }
        }
        let bounced = reflect_ball(body.velocity(), body.center(), hit.point);
        body.set_velocity(bounced);
    }

    if body.role == BodyRole::Pickup {
        // Stop falling
        body.set_velocity(Vec2::ZERO);
        if hit.collidee == world.paddle {
            world.harvest(id, body);
        }
    }

    if id == world.paddle
        && world
            .bodies
            .get(&hit.collidee)
            .is_some_and(|other| other.is_pickup())
    {
        world.harvest_in_place(hit.collidee);
    }
}
