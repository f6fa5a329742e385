//! Squash Ball - a bouncing ball with squash/stretch impacts
//!
//! Core modules:
//! - `sim`: Headless simulation (ball, obstacle, collisions, frame clock)
//! - `renderer`: Geometry, scene submission and the wgpu pipeline
//! - `platform`: Native window and input via winit
//! - `settings`: Screen size and tuning passed in at construction

pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::Settings;
pub use sim::Simulation;

/// Default configuration values (see `Settings::default`)
pub mod consts {
    /// Window / world dimensions in pixels
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;
    pub const WINDOW_TITLE: &str = "Ball and Static Object with Squashing";

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 50.0;
    pub const BALL_BASE_SPEED: f32 = 300.0;
    pub const BALL_COLOR: [f32; 3] = [1.0, 0.5, 0.2];

    /// Obstacle defaults (top-left corner in world space, bottom-left origin)
    pub const OBSTACLE_POS: [f32; 2] = [300.0, 300.0];
    pub const OBSTACLE_SIZE: [f32; 2] = [200.0, 100.0];
    pub const OBSTACLE_COLOR: [f32; 3] = [0.0, 1.0, 0.0];

    pub const BACKGROUND_COLOR: [f32; 3] = [0.0, 0.8, 0.8];

    /// Circle tessellation
    pub const CIRCLE_SEGMENTS: u32 = 36;

    /// Squash recovery rate toward (1, 1), per second
    pub const SQUASH_RELAXATION_RATE: f32 = 5.0;
    /// Squash applied on a left/right wall hit (narrow and tall)
    pub const WALL_X_SQUASH: [f32; 2] = [0.7, 1.3];
    /// Squash applied on a floor/ceiling or obstacle hit (wide and flat)
    pub const WALL_Y_SQUASH: [f32; 2] = [1.3, 0.7];
    pub const OBSTACLE_SQUASH: [f32; 2] = [1.3, 0.7];

    /// Largest frame delta fed to the simulation, seconds. At most
    /// `1 / SQUASH_RELAXATION_RATE` so one frame cannot relax past (1, 1).
    pub const MAX_FRAME_DELTA: f32 = 0.2;
}
