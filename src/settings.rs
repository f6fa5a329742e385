//! Screen size and tuning
//!
//! Everything that used to be a compile-time constant lives here so the
//! simulation can be built at any resolution or tuning (tests do this a lot).

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Simulation and presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Screen ===
    /// World size in pixels; also the initial window size
    pub screen_size: Vec2,
    pub window_title: String,
    pub background_color: Vec3,

    // === Ball ===
    pub ball_radius: f32,
    /// Speed the ball is driven at while the pointer is held
    pub ball_base_speed: f32,
    pub ball_color: Vec3,
    /// Start position; `None` means the centre of the screen
    pub ball_start: Option<Vec2>,
    pub ball_start_velocity: Vec2,

    // === Obstacle ===
    /// Corner with the smallest coordinates (world space, y up)
    pub obstacle_pos: Vec2,
    pub obstacle_size: Vec2,
    pub obstacle_color: Vec3,

    // === Tuning ===
    pub circle_segments: u32,
    pub relaxation_rate: f32,
    pub wall_x_squash: Vec2,
    pub wall_y_squash: Vec2,
    pub obstacle_squash: Vec2,
    /// Cap on the per-frame delta, seconds
    pub max_frame_delta: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_size: Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT),
            window_title: WINDOW_TITLE.to_string(),
            background_color: Vec3::from(BACKGROUND_COLOR),

            ball_radius: BALL_RADIUS,
            ball_base_speed: BALL_BASE_SPEED,
            ball_color: Vec3::from(BALL_COLOR),
            ball_start: None,
            ball_start_velocity: Vec2::ZERO,

            obstacle_pos: Vec2::from(OBSTACLE_POS),
            obstacle_size: Vec2::from(OBSTACLE_SIZE),
            obstacle_color: Vec3::from(OBSTACLE_COLOR),

            circle_segments: CIRCLE_SEGMENTS,
            relaxation_rate: SQUASH_RELAXATION_RATE,
            wall_x_squash: Vec2::from(WALL_X_SQUASH),
            wall_y_squash: Vec2::from(WALL_Y_SQUASH),
            obstacle_squash: Vec2::from(OBSTACLE_SQUASH),
            max_frame_delta: MAX_FRAME_DELTA,
        }
    }
}

impl Settings {
    /// Settings for a different resolution, everything else default
    pub fn with_screen_size(width: f32, height: f32) -> Self {
        Self {
            screen_size: Vec2::new(width, height),
            ..Self::default()
        }
    }

    /// Where the ball starts
    pub fn ball_start_position(&self) -> Vec2 {
        self.ball_start.unwrap_or(self.screen_size / 2.0)
    }

    /// Reject values the simulation or the mesh builders can't work with
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.screen_size.x > 0.0 && self.screen_size.y > 0.0,
            "screen size must be positive, got {}x{}",
            self.screen_size.x,
            self.screen_size.y
        );
        anyhow::ensure!(
            self.ball_radius > 0.0,
            "ball radius must be positive, got {}",
            self.ball_radius
        );
        anyhow::ensure!(
            self.obstacle_size.x > 0.0 && self.obstacle_size.y > 0.0,
            "obstacle size must be positive, got {}x{}",
            self.obstacle_size.x,
            self.obstacle_size.y
        );
        // Fan indices are u16
        anyhow::ensure!(
            (1..u16::MAX as u32).contains(&self.circle_segments),
            "circle segments must be in 1..{}, got {}",
            u16::MAX,
            self.circle_segments
        );
        anyhow::ensure!(
            self.relaxation_rate >= 0.0,
            "relaxation rate must not be negative, got {}",
            self.relaxation_rate
        );
        anyhow::ensure!(
            self.max_frame_delta > 0.0,
            "max frame delta must be positive, got {}",
            self.max_frame_delta
        );
        anyhow::ensure!(
            self.relaxation_rate * self.max_frame_delta <= 1.0,
            "relaxation rate {} overshoots within a {}s frame",
            self.relaxation_rate,
            self.max_frame_delta
        );
        Ok(())
    }

    /// Window size in whole pixels
    pub fn window_size(&self) -> (u32, u32) {
        (
            self.screen_size.x.round() as u32,
            self.screen_size.y.round() as u32,
        )
    }

    /// Compact JSON form, used for the startup log line
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("<unserializable: {e}>"))
    }
}
