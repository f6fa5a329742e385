//! Per-frame simulation update
//!
//! Order is fixed: steer, integrate, walls (x then y), obstacle, relax.
//! Later steps overwrite the squash target of earlier ones.

use glam::Vec2;

use super::collision::{check_collision, wall_hits};
use super::state::Simulation;

/// Input sampled for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in world space, present while the primary button is held
    pub steer_toward: Option<Vec2>,
}

impl TickInput {
    pub fn steering(target: Vec2) -> Self {
        Self {
            steer_toward: Some(target),
        }
    }
}

/// Collisions that fired during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Impacts {
    pub wall_x: bool,
    pub wall_y: bool,
    pub obstacle: bool,
}

impl Impacts {
    pub fn any(&self) -> bool {
        self.wall_x || self.wall_y || self.obstacle
    }
}

/// Advance the simulation by `dt` seconds
pub fn tick(sim: &mut Simulation, input: &TickInput, dt: f32) -> Impacts {
    let Simulation {
        settings,
        ball,
        obstacle,
    } = sim;
    let mut impacts = Impacts::default();

    // Held pointer drives the ball straight at it. Pointer on the centre: no-op.
    if let Some(target) = input.steer_toward {
        if let Some(dir) = (target - ball.pos).try_normalize() {
            ball.vel = dir * ball.base_speed;
        }
    }

    ball.pos += ball.vel * dt;

    // No position correction: the reversed velocity carries the ball back in
    let walls = wall_hits(ball, settings.screen_size);
    if walls.x {
        ball.vel.x = -ball.vel.x;
        ball.squash = settings.wall_x_squash;
        impacts.wall_x = true;
    }
    if walls.y {
        ball.vel.y = -ball.vel.y;
        ball.squash = settings.wall_y_squash;
        impacts.wall_y = true;
    }

    // Full reversal, regardless of which face was hit
    if check_collision(ball, obstacle) {
        ball.vel = -ball.vel;
        ball.squash = settings.obstacle_squash;
        impacts.obstacle = true;
    }

    ball.squash = relax_squash(ball.squash, settings.relaxation_rate, dt);

    if impacts.any() {
        log::debug!(
            "impact {:?} at ({:.1}, {:.1}), vel ({:.1}, {:.1})",
            impacts,
            ball.pos.x,
            ball.pos.y,
            ball.vel.x,
            ball.vel.y
        );
    }

    impacts
}

/// One step of exponential decay of the squash factor toward (1, 1)
///
/// Monotonic with no overshoot while `rate * dt < 1`.
#[inline]
pub fn relax_squash(squash: Vec2, rate: f32, dt: f32) -> Vec2 {
    squash + (Vec2::ONE - squash) * rate * dt
}

/// Map a cursor position (window pixels, origin top-left) into world space
/// (origin bottom-left), scaling for windows that differ from the world size
pub fn window_to_world(cursor: Vec2, window_size: Vec2, world_size: Vec2) -> Vec2 {
    let scale = if window_size.x > 0.0 && window_size.y > 0.0 {
        world_size / window_size
    } else {
        Vec2::ONE
    };
    Vec2::new(cursor.x * scale.x, world_size.y - cursor.y * scale.y)
}
