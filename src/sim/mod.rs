//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Single-threaded, synchronous ticks
//! - No rendering or platform dependencies

pub mod beam;
pub mod boss;
pub mod combo;
pub mod grid;
pub mod pool;
pub mod projectile;
pub mod state;
pub mod tick;

pub use beam::{Beam, BeamOrientation};
pub use boss::Boss;
pub use combo::{ComboTracker, Milestone};
pub use grid::SpatialIndex;
pub use pool::ObjectPool;
pub use projectile::{ExplosionSpec, Projectile, ProjectileKind, ProjectilePhase};
pub use state::{Arena, GameEvent, GrazeTier, Particle, ParticleKind, PlayerView, SimState};
pub use tick::{ItemEffects, RiskContract, TickInput, TickOutcome, UpgradeModifiers, tick};
