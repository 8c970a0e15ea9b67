//! Simulation state and shared types
//!
//! Everything a collaborator may read between ticks lives here. The state is
//! deterministic: all randomness flows through one seeded PCG stream, so the
//! same seed and the same per-tick inputs reproduce a run exactly.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_PARTICLES, PARTICLE_POOL_CAP, PROJECTILE_POOL_CAP};
use crate::tuning::Tuning;

use super::beam::Beam;
use super::boss::Boss;
use super::combo::{ComboTracker, Milestone};
use super::grid::SpatialIndex;
use super::pool::ObjectPool;
use super::projectile::Projectile;

/// Playfield dimensions. The boss roams the top third; projectiles despawn
/// past the margin outside these bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: crate::consts::ARENA_WIDTH,
            height: crate::consts::ARENA_HEIGHT,
        }
    }
}

/// Read-only view of the player, supplied by the input collaborator each
/// tick. Absent during the respawn delay window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Collision radius
    pub radius: f32,
}

/// Graze classification by miss distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrazeTier {
    Normal,
    CloseCall,
    PerfectDodge,
}

/// One-shot events for the audio/score/achievement collaborators, drained
/// once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BossHit { remaining_health: u32 },
    BossDefeated { money_reward: u32 },
    PlayerDeath,
    Graze { tier: GrazeTier, value: u32, money_bonus: u32 },
    ComboMilestone(Milestone),
}

/// Visual effect particle kinds (color/shape decided by the renderer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Spark,
    ExplosionRing,
}

/// A transient visual effect. Not gameplay-affecting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Ticks remaining
    pub life: f32,
    pub size: f32,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn new() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            life: 0.0,
            size: 0.0,
            kind: ParticleKind::Spark,
        }
    }

    /// Full re-initialization for pool reuse
    pub fn reset(&mut self, pos: Vec2, vel: Vec2, life: f32, size: f32, kind: ParticleKind) {
        self.pos = pos;
        self.vel = vel;
        self.life = life;
        self.size = size;
        self.kind = kind;
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.life -= dt;
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed record kept alongside the live RNG for reproducibility
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn to_rng(self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

fn default_projectile_pool() -> ObjectPool<Projectile> {
    ObjectPool::new(PROJECTILE_POOL_CAP)
}

fn default_particle_pool() -> ObjectPool<Particle> {
    ObjectPool::new(PARTICLE_POOL_CAP)
}

/// Complete simulation state for one boss encounter.
///
/// Created at level start, dropped at level end; restart is reconstruction,
/// not teardown. Collaborators only hold `&SimState` between ticks.
#[derive(Debug, Serialize, Deserialize)]
pub struct SimState {
    pub arena: Arena,
    pub(crate) tuning: Tuning,
    /// Run seed for reproducibility
    pub rng_state: RngState,
    #[serde(skip, default = "default_rng")]
    pub(crate) rng: Pcg32,
    /// Simulation tick counter
    pub time_ticks: u64,

    pub(crate) boss: Boss,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) particles: Vec<Particle>,

    #[serde(skip, default = "default_projectile_pool")]
    pub(crate) projectile_pool: ObjectPool<Projectile>,
    #[serde(skip, default = "default_particle_pool")]
    pub(crate) particle_pool: ObjectPool<Particle>,
    #[serde(skip)]
    pub(crate) grid: SpatialIndex,

    pub(crate) combo: ComboTracker,

    // Player defense state carried across ticks
    pub(crate) shield_active: bool,
    pub(crate) perfect_dodge_iframes: f32,

    // Vulnerability window
    pub(crate) vulnerable: bool,
    pub(crate) vulnerability_timer: f32,
    /// While positive, no new window may open
    pub(crate) vulnerability_lockout: f32,

    pub(crate) events: Vec<GameEvent>,
}

impl SimState {
    pub fn new(level: u32, seed: u64, arena: Arena, tuning: Tuning) -> Self {
        let rng_state = RngState { seed };
        let mut rng = rng_state.to_rng();
        let boss = Boss::new(
            Vec2::new(arena.width / 2.0, arena.height / 6.0),
            level,
            &tuning,
            &mut rng,
        );
        log::info!(
            "level {level} start: {} boss, health {}, seed {seed}",
            if boss.is_mega() { "mega" } else { "mini" },
            boss.health(),
        );
        Self {
            arena,
            rng_state,
            rng,
            time_ticks: 0,
            boss,
            projectiles: Vec::new(),
            particles: Vec::new(),
            projectile_pool: default_projectile_pool(),
            particle_pool: default_particle_pool(),
            grid: SpatialIndex::new(),
            combo: ComboTracker::new(&tuning),
            shield_active: false,
            perfect_dodge_iframes: 0.0,
            vulnerable: false,
            vulnerability_timer: 0.0,
            vulnerability_lockout: tuning.vulnerability_start_lockout,
            events: Vec::new(),
            tuning,
        }
    }

    // === Read-only surface for rendering/HUD collaborators ===

    pub fn boss(&self) -> &Boss {
        &self.boss
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn beams(&self) -> &[Beam] {
        self.boss.beams()
    }

    pub fn combo(&self) -> &ComboTracker {
        &self.combo
    }

    pub fn shield_active(&self) -> bool {
        self.shield_active
    }

    pub fn boss_vulnerable(&self) -> bool {
        self.vulnerable
    }

    /// Ticks left in the open vulnerability window (0 when closed)
    pub fn vulnerability_remaining(&self) -> f32 {
        if self.vulnerable { self.vulnerability_timer } else { 0.0 }
    }

    /// Events emitted by the most recent tick
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Grant a shield directly (used by the respawn flow)
    pub fn grant_shield(&mut self) {
        self.shield_active = true;
    }

    /// Budget-capped particle spawn; overflow requests are dropped.
    pub(crate) fn spawn_particle(
        &mut self,
        pos: Vec2,
        vel: Vec2,
        life: f32,
        size: f32,
        kind: ParticleKind,
    ) {
        if self.particles.len() >= MAX_PARTICLES {
            return;
        }
        let mut particle = self.particle_pool.acquire_with(Particle::new);
        particle.reset(pos, vel, life, size, kind);
        self.particles.push(particle);
    }
}
