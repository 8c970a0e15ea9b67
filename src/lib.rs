//! Skyhammer - a single-boss bullet-hell simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (boss AI, projectiles, collisions, scoring)
//! - `tuning`: Data-driven game balance
//!
//! The crate is headless: rendering, audio and input live in collaborator
//! processes that feed a [`sim::TickInput`] in and read snapshots out between
//! ticks. All timers are expressed in ticks at the 60 Hz baseline; the `dt`
//! passed to [`sim::tick`] is a tick-scale factor (1.0 = one full tick), so
//! slow-motion is just a smaller `dt`.

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Baseline simulation rate (ticks per second)
    pub const TICK_RATE: f32 = 60.0;

    /// Default arena dimensions (collaborators may override per display)
    pub const ARENA_WIDTH: f32 = 1600.0;
    pub const ARENA_HEIGHT: f32 = 900.0;

    /// Projectile defaults
    pub const PROJECTILE_SIZE: f32 = 6.0;
    /// Ticks a freshly spawned projectile telegraphs before going live
    pub const WARNING_DURATION: f32 = 120.0;
    /// Margin beyond the arena edge before a projectile is discarded
    pub const OFFSCREEN_MARGIN: f32 = 100.0;

    /// Player defaults (diameter; collaborators report the live value)
    pub const PLAYER_SIZE: f32 = 20.0;

    /// Broad-phase grid cell size
    pub const GRID_CELL_SIZE: f32 = 50.0;

    /// Pool capacities
    pub const PROJECTILE_POOL_CAP: usize = 500;
    pub const PARTICLE_POOL_CAP: usize = 300;
    /// Live particle budget
    pub const MAX_PARTICLES: usize = 300;
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

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Unit vector for an angle
#[inline]
pub fn angle_to_dir(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}
