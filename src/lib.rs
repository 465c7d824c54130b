//! Crash Derby - A top-down vehicular combat arena
//!
//! Core modules:
//! - `sim`: Gameplay simulation (vehicles, steering, AI, combat, status effects)
//! - `roster`: Monster archetypes used to spawn vehicles
//! - `tuning`: Data-driven game balance

pub mod roster;
pub mod sim;
pub mod tuning;

pub use roster::{Archetype, ArchetypeStats, Roster};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Full arena dimensions (walls included)
    pub const GAME_WIDTH: f32 = 800.0;
    pub const GAME_HEIGHT: f32 = 600.0;

    /// Collision circle of every car body
    pub const VEHICLE_RADIUS: f32 = 13.0;
    /// Collision circle of a power-up capsule
    pub const PICKUP_RADIUS: f32 = 14.0;
    /// Collision circle of a hazard decal
    pub const HAZARD_RADIUS: f32 = 20.0;

    /// Speeds below this are treated as stationary (skips grip projection)
    pub const REST_SPEED: f32 = 1.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector for a heading (0 = +x, y grows downward)
#[inline]
pub fn heading_vector(heading: f32) -> Vec2 {
    Vec2::new(heading.cos(), heading.sin())
}

/// Signed shortest rotation from `from` to `to`, in [-π, π)
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}
