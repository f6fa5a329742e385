//! Collision detection
//!
//! Everything is axis-aligned. The ball is approximated by its bounding
//! square, so a ball near an obstacle corner registers a hit slightly early.

use glam::Vec2;

use super::state::{Ball, Obstacle};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn of_ball(ball: &Ball) -> Self {
        Self::new(ball.min(), ball.max())
    }

    pub fn of_obstacle(obstacle: &Obstacle) -> Self {
        Self::new(obstacle.min(), obstacle.max())
    }

    /// Overlap on both axes. Bounds are inclusive: touching edges overlap.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.max.x >= other.min.x
            && self.min.x <= other.max.x
            && self.max.y >= other.min.y
            && self.min.y <= other.max.y
    }
}

/// Check whether the ball's bounding square touches the obstacle
pub fn check_collision(ball: &Ball, obstacle: &Obstacle) -> bool {
    Aabb::of_ball(ball).overlaps(&Aabb::of_obstacle(obstacle))
}

/// Which screen edges the ball is past
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallHits {
    /// Past the left or right edge
    pub x: bool,
    /// Past the bottom or top edge
    pub y: bool,
}

/// Test the ball against the screen rectangle `[0, bounds]`
///
/// Strict comparisons: a ball resting exactly against a wall is not a hit.
pub fn wall_hits(ball: &Ball, bounds: Vec2) -> WallHits {
    let min = ball.min();
    let max = ball.max();
    WallHits {
        x: min.x < 0.0 || max.x > bounds.x,
        y: min.y < 0.0 || max.y > bounds.y,
    }
}
