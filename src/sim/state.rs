//! Simulation state
//!
//! The ball and the obstacle are plain data; `Simulation` owns both plus the
//! settings that shaped them.

use glam::{Vec2, Vec3};

use crate::settings::Settings;

/// The moving ball
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Fixed for the lifetime of the ball (the circle mesh is built from it)
    pub radius: f32,
    pub color: Vec3,
    /// Per-axis render scale, (1, 1) at rest
    pub squash: Vec2,
    /// Speed used when the pointer steers the ball
    pub base_speed: f32,
}

impl Ball {
    pub fn new(pos: Vec2, radius: f32, base_speed: f32, color: Vec3) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            color,
            squash: Vec2::ONE,
            base_speed,
        }
    }

    /// Lower-left corner of the bounding square
    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos - Vec2::splat(self.radius)
    }

    /// Upper-right corner of the bounding square
    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + Vec2::splat(self.radius)
    }
}

/// The static block the ball bounces off
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    /// Corner with the smallest coordinates
    pub pos: Vec2,
    pub size: Vec2,
    pub color: Vec3,
}

impl Obstacle {
    pub fn new(pos: Vec2, size: Vec2, color: Vec3) -> Self {
        Self { pos, size, color }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.size
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct Simulation {
    pub settings: Settings,
    pub ball: Ball,
    pub obstacle: Obstacle,
}

impl Simulation {
    /// Build the initial scene from settings
    pub fn new(settings: Settings) -> Self {
        let mut ball = Ball::new(
            settings.ball_start_position(),
            settings.ball_radius,
            settings.ball_base_speed,
            settings.ball_color,
        );
        ball.vel = settings.ball_start_velocity;

        let obstacle = Obstacle::new(
            settings.obstacle_pos,
            settings.obstacle_size,
            settings.obstacle_color,
        );

        Self {
            settings,
            ball,
            obstacle,
        }
    }

    /// World bounds the walls are tested against
    #[inline]
    pub fn bounds(&self) -> Vec2 {
        self.settings.screen_size
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
