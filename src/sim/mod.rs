//! Simulation module
//!
//! All ball/obstacle logic lives here. No rendering or platform dependencies,
//! so every rule can be exercised headlessly:
//! - One ball, one obstacle, owned by `Simulation`
//! - Variable timestep from `FrameClock`, one update per frame
//! - World space has its origin at the bottom-left, y up

pub mod clock;
pub mod collision;
pub mod state;
pub mod tick;

pub use clock::FrameClock;
pub use collision::{Aabb, WallHits, check_collision, wall_hits};
pub use state::{Ball, Obstacle, Simulation};
pub use tick::{Impacts, TickInput, relax_squash, tick, window_to_world};
