//! Projectile behavior and lifecycle
//!
//! Every projectile telegraphs for a fixed warning period, then runs one of
//! thirteen motion rules until it leaves the arena, detonates, or is consumed
//! by a collision. Explosions and splits are edge-triggered flags resolved by
//! the simulation loop, which recycles the spent instance into the pool.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{OFFSCREEN_MARGIN, PROJECTILE_SIZE, WARNING_DURATION};
use crate::normalize_angle;

use super::state::Arena;

/// Ticks a homing projectile keeps tracking before it expires
const HOMING_LIFETIME: f32 = 480.0;
/// Homing turn rate toward the player, radians-fraction per tick
const HOMING_TURN: f32 = 0.02;
/// Bouncing projectiles reflect off the walls at most this many times
const MAX_BOUNCES: u32 = 1;
/// Distance from the arena edge where bouncing projectiles reflect
const BOUNCE_MARGIN: f32 = 10.0;
/// Ticks until bombs/grenades/nukes detonate
const EXPLOSION_FUSE: f32 = 120.0;
/// Explosive drag per tick
const EXPLOSIVE_DRAG: f32 = 0.99;
/// Age at which a splitting projectile breaks apart
const SPLIT_AGE: f32 = 60.0;
/// Speed of the Fast children released by a split
const SPLIT_CHILD_SPEED: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Standard constant-velocity shot
    Normal,
    /// Faster, smaller shot
    Fast,
    /// Slower, larger shot
    Large,
    /// Gently tracks the player, expires after a fixed lifetime
    Homing,
    /// Reflects off the arena bounds once
    Bouncing,
    /// Velocity direction wobbles sinusoidally
    Spiral,
    /// Breaks into four Fast children after a fixed age
    Splitting,
    /// Speeds up over time, capped
    Accelerating,
    /// Sinusoidal lateral displacement perpendicular to travel
    Wave,
    /// Decelerates, then detonates into fragments
    Bomb,
    /// Aimed explosive, medium yield
    Grenade,
    /// Large explosive, heaviest yield
    Nuke,
    /// Inert straight-flying shard from an explosion
    Fragment,
}

/// Lifecycle phase. Explode/split are one-shot triggers queried by the loop
/// rather than phases of their own; `Done` marks an instance awaiting recycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectilePhase {
    Warning,
    Active,
    Done,
}

/// Particle/ring counts produced when an explosive detonates
#[derive(Debug, Clone, Copy)]
pub struct ExplosionSpec {
    pub particles: u32,
    pub rings: u32,
    pub fragments: u32,
    /// Innermost shockwave ring size
    pub ring_size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ProjectileKind,
    phase: ProjectilePhase,
    /// Ticks of telegraph remaining
    warning: f32,
    /// Ticks since activation
    age: f32,
    spiral_angle: f32,
    bounce_count: u32,
    /// Countdown to detonation for explosive kinds
    fuse: f32,
    grazed: bool,
    has_split: bool,
}

impl Projectile {
    pub fn spawn(pos: Vec2, vel: Vec2, kind: ProjectileKind) -> Self {
        Self {
            pos,
            vel,
            kind,
            phase: ProjectilePhase::Warning,
            warning: WARNING_DURATION,
            age: 0.0,
            spiral_angle: 0.0,
            bounce_count: 0,
            fuse: EXPLOSION_FUSE,
            grazed: false,
            has_split: false,
        }
    }

    /// Full re-initialization for pool reuse. Must cover every field: the
    /// pool guarantees nothing about residual state.
    pub fn reset(&mut self, pos: Vec2, vel: Vec2, kind: ProjectileKind) {
        *self = Self::spawn(pos, vel, kind);
    }

    pub fn phase(&self) -> ProjectilePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == ProjectilePhase::Active
    }

    pub fn is_done(&self) -> bool {
        self.phase == ProjectilePhase::Done
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn finish(&mut self) {
        self.phase = ProjectilePhase::Done;
    }

    /// Skip the warning telegraph. Fragments spawn live from a parent the
    /// player already dealt with; tests use this to plant active projectiles.
    pub(crate) fn force_active(&mut self) {
        self.warning = 0.0;
        self.phase = ProjectilePhase::Active;
    }

    /// Advance one tick. `dt` is the tick-scale factor; repeated calls within
    /// a tick are the caller's bug, each call advances state exactly once.
    pub fn update(&mut self, dt: f32, player: Option<Vec2>, arena: &Arena) {
        match self.phase {
            ProjectilePhase::Done => return,
            ProjectilePhase::Warning => {
                self.warning -= dt;
                if self.warning <= 0.0 {
                    self.phase = ProjectilePhase::Active;
                }
                return;
            }
            ProjectilePhase::Active => {}
        }

        self.age += dt;

        match self.kind {
            ProjectileKind::Normal
            | ProjectileKind::Fast
            | ProjectileKind::Large
            | ProjectileKind::Fragment => {}

            ProjectileKind::Homing => {
                if let Some(target) = player {
                    let to_player = target - self.pos;
                    let desired = to_player.y.atan2(to_player.x);
                    let current = self.vel.y.atan2(self.vel.x);
                    let diff = normalize_angle(desired - current);
                    let turned = current + diff * HOMING_TURN * dt;
                    let speed = self.vel.length();
                    self.vel = Vec2::new(turned.cos(), turned.sin()) * speed;
                }
            }

            ProjectileKind::Bouncing => {
                if self.bounce_count < MAX_BOUNCES {
                    if self.pos.x < BOUNCE_MARGIN || self.pos.x > arena.width - BOUNCE_MARGIN {
                        self.vel.x = -self.vel.x;
                        self.bounce_count += 1;
                    }
                    if self.pos.y < BOUNCE_MARGIN || self.pos.y > arena.height - BOUNCE_MARGIN {
                        self.vel.y = -self.vel.y;
                        self.bounce_count += 1;
                    }
                }
            }

            ProjectileKind::Spiral => {
                self.spiral_angle += 0.08 * dt;
                let base = self.vel.y.atan2(self.vel.x);
                let wobbled = base + self.spiral_angle.sin() * 0.5;
                let speed = self.vel.length();
                self.vel = Vec2::new(wobbled.cos(), wobbled.sin()) * speed;
            }

            ProjectileKind::Accelerating => {
                let factor = (1.0 + self.age * 0.01).min(1.05);
                self.vel *= factor.powf(dt);
            }

            ProjectileKind::Wave => {
                let perp = self.vel.y.atan2(self.vel.x) + std::f32::consts::FRAC_PI_2;
                let sway = (self.age * 0.2).sin() * 2.0 * dt;
                self.pos += Vec2::new(perp.cos(), perp.sin()) * sway;
            }

            ProjectileKind::Bomb | ProjectileKind::Grenade | ProjectileKind::Nuke => {
                self.vel *= EXPLOSIVE_DRAG.powf(dt);
                self.fuse -= dt;
            }

            ProjectileKind::Splitting => {}
        }

        self.pos += self.vel * dt;
    }

    /// Collision radius, by kind
    fn hit_size(&self) -> f32 {
        match self.kind {
            ProjectileKind::Large => PROJECTILE_SIZE + 4.0,
            ProjectileKind::Fast => PROJECTILE_SIZE - 2.0,
            _ => PROJECTILE_SIZE,
        }
    }

    /// Narrow-phase hit test against the player disc. Squared distances only;
    /// never true while the telegraph is showing.
    pub fn collides_with(&self, player_pos: Vec2, player_radius: f32) -> bool {
        if self.phase != ProjectilePhase::Active {
            return false;
        }
        let threshold = self.hit_size() * 0.5 + player_radius * 0.6;
        self.pos.distance_squared(player_pos) < threshold * threshold
    }

    pub fn is_offscreen(&self, arena: &Arena) -> bool {
        if self.kind == ProjectileKind::Homing && self.age > HOMING_LIFETIME {
            return true;
        }
        self.pos.x < -OFFSCREEN_MARGIN
            || self.pos.x > arena.width + OFFSCREEN_MARGIN
            || self.pos.y < -OFFSCREEN_MARGIN
            || self.pos.y > arena.height + OFFSCREEN_MARGIN
    }

    /// True exactly when an explosive's fuse has run out. The loop consumes
    /// the instance on the same tick, so the trigger cannot refire.
    pub fn should_explode(&self) -> bool {
        matches!(
            self.kind,
            ProjectileKind::Bomb | ProjectileKind::Grenade | ProjectileKind::Nuke
        ) && self.phase == ProjectilePhase::Active
            && self.fuse <= 0.0
    }

    /// One-shot split trigger, gated by `has_split`.
    pub fn should_split(&self) -> bool {
        self.kind == ProjectileKind::Splitting
            && self.phase == ProjectilePhase::Active
            && !self.has_split
            && self.age >= SPLIT_AGE
    }

    pub fn mark_split(&mut self) {
        debug_assert!(!self.has_split, "split fired twice");
        self.has_split = true;
    }

    /// Velocities for the four Fast children, cardinal offsets from the
    /// parent's heading.
    pub fn split_velocities(&self) -> [Vec2; 4] {
        let base = self.vel.y.atan2(self.vel.x);
        std::array::from_fn(|i| {
            let angle = base + std::f32::consts::FRAC_PI_2 * i as f32;
            Vec2::new(angle.cos(), angle.sin()) * SPLIT_CHILD_SPEED
        })
    }

    /// Yield of this explosive when it detonates.
    pub fn explosion_spec(&self) -> ExplosionSpec {
        match self.kind {
            ProjectileKind::Nuke => ExplosionSpec {
                particles: 40,
                rings: 4,
                fragments: 16,
                ring_size: 60.0,
            },
            ProjectileKind::Grenade => ExplosionSpec {
                particles: 25,
                rings: 3,
                fragments: 8,
                ring_size: 40.0,
            },
            _ => ExplosionSpec {
                particles: 15,
                rings: 2,
                fragments: 8,
                ring_size: 30.0,
            },
        }
    }

    pub fn has_grazed(&self) -> bool {
        self.grazed
    }

    /// Latch the graze flag. Callers must check `has_grazed` first; the flag
    /// transitions false -> true at most once.
    pub fn mark_grazed(&mut self) {
        debug_assert!(!self.grazed, "graze counted twice");
        self.grazed = true;
    }

    /// Multiplicative slow from upgrades/items
    pub fn apply_slow(&mut self, factor: f32) {
        self.vel *= factor;
    }

    /// Impulse from shockwave/magnet items
    pub fn apply_force(&mut self, impulse: Vec2) {
        self.vel += impulse;
    }

    pub fn multiply_speed(&mut self, factor: f32) {
        self.vel *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Arena {
        Arena {
            width: 1600.0,
            height: 900.0,
        }
    }

    #[test]
    fn test_warning_never_collides() {
        let p = Projectile::spawn(Vec2::new(100.0, 100.0), Vec2::ZERO, ProjectileKind::Large);
        // Dead center on the player, still in warning
        assert!(!p.collides_with(Vec2::new(100.0, 100.0), 10.0));
    }

    #[test]
    fn test_warning_counts_down_then_activates() {
        let mut p = Projectile::spawn(Vec2::ZERO, Vec2::new(2.0, 0.0), ProjectileKind::Normal);
        for _ in 0..119 {
            p.update(1.0, None, &arena());
        }
        assert_eq!(p.phase(), ProjectilePhase::Warning);
        assert_eq!(p.pos, Vec2::ZERO); // no movement while telegraphing

        p.update(1.0, None, &arena());
        assert_eq!(p.phase(), ProjectilePhase::Active);
    }

    #[test]
    fn test_split_fires_exactly_once_at_threshold() {
        let mut p = Projectile::spawn(Vec2::new(800.0, 400.0), Vec2::new(1.0, 0.0), ProjectileKind::Splitting);
        p.force_active();

        for tick in 0..60 {
            assert!(!p.should_split(), "split too early at tick {tick}");
            p.update(1.0, None, &arena());
        }
        // age == 60 now
        assert!(p.should_split());
        p.mark_split();
        assert!(!p.should_split());

        for _ in 0..60 {
            p.update(1.0, None, &arena());
        }
        assert!(p.age() >= 120.0);
        assert!(!p.should_split());
    }

    #[test]
    fn test_split_children_are_cardinal() {
        let mut p = Projectile::spawn(Vec2::ZERO, Vec2::new(1.0, 0.0), ProjectileKind::Splitting);
        p.force_active();
        let vels = p.split_velocities();
        assert!((vels[0].x - SPLIT_CHILD_SPEED).abs() < 1e-4);
        assert!((vels[1].y - SPLIT_CHILD_SPEED).abs() < 1e-4);
        assert!((vels[2].x + SPLIT_CHILD_SPEED).abs() < 1e-4);
        assert!((vels[3].y + SPLIT_CHILD_SPEED).abs() < 1e-4);
    }

    #[test]
    fn test_bomb_fuse_triggers_explosion() {
        let mut p = Projectile::spawn(Vec2::new(800.0, 400.0), Vec2::new(2.0, 0.0), ProjectileKind::Bomb);
        p.force_active();
        for _ in 0..119 {
            p.update(1.0, None, &arena());
            assert!(!p.should_explode());
        }
        p.update(1.0, None, &arena());
        assert!(p.should_explode());
    }

    #[test]
    fn test_explosive_drag_slows() {
        let mut p = Projectile::spawn(Vec2::new(800.0, 400.0), Vec2::new(4.0, 0.0), ProjectileKind::Nuke);
        p.force_active();
        for _ in 0..30 {
            p.update(1.0, None, &arena());
        }
        assert!(p.vel.x < 4.0);
        assert!(p.vel.x > 0.0);
    }

    #[test]
    fn test_bounce_limited_to_one() {
        let mut p = Projectile::spawn(Vec2::new(5.0, 400.0), Vec2::new(-2.0, 0.0), ProjectileKind::Bouncing);
        p.force_active();
        p.update(1.0, None, &arena());
        assert!(p.vel.x > 0.0, "first wall contact reflects");

        // Drag it back against the wall: no second bounce
        p.pos = Vec2::new(5.0, 400.0);
        p.vel = Vec2::new(-2.0, 0.0);
        p.update(1.0, None, &arena());
        assert!(p.vel.x < 0.0, "second wall contact passes through");
    }

    #[test]
    fn test_homing_turns_toward_player() {
        let mut p = Projectile::spawn(Vec2::ZERO, Vec2::new(2.0, 0.0), ProjectileKind::Homing);
        p.force_active();
        let player = Vec2::new(0.0, 300.0); // directly below (screen-space y-down)
        let speed_before = p.vel.length();
        for _ in 0..30 {
            p.update(1.0, Some(player), &arena());
        }
        assert!(p.vel.y > 0.0, "should have turned downward");
        assert!((p.vel.length() - speed_before).abs() < 0.01, "turn preserves speed");
    }

    #[test]
    fn test_homing_expires_after_lifetime() {
        let mut p = Projectile::spawn(Vec2::new(800.0, 400.0), Vec2::ZERO, ProjectileKind::Homing);
        p.force_active();
        for _ in 0..=(HOMING_LIFETIME as usize) {
            p.update(1.0, None, &arena());
        }
        assert!(p.is_offscreen(&arena()), "expired homing reads as off-screen");
    }

    #[test]
    fn test_graze_flag_latches() {
        let mut p = Projectile::spawn(Vec2::ZERO, Vec2::ZERO, ProjectileKind::Normal);
        assert!(!p.has_grazed());
        p.mark_grazed();
        assert!(p.has_grazed());
    }

    #[test]
    fn test_pool_reset_clears_residual_state() {
        let mut p = Projectile::spawn(Vec2::new(9.0, 9.0), Vec2::new(1.0, 1.0), ProjectileKind::Splitting);
        p.force_active();
        p.mark_grazed();
        p.mark_split();

        p.reset(Vec2::ZERO, Vec2::new(3.0, 0.0), ProjectileKind::Fast);
        assert_eq!(p.phase(), ProjectilePhase::Warning);
        assert!(!p.has_grazed());
        assert_eq!(p.age(), 0.0);
        assert!(!p.should_split());
    }

    #[test]
    fn test_explosion_yields_scale_with_subtype() {
        let nuke = Projectile::spawn(Vec2::ZERO, Vec2::ZERO, ProjectileKind::Nuke);
        let spec = nuke.explosion_spec();
        assert_eq!((spec.particles, spec.rings, spec.fragments), (40, 4, 16));

        let bomb = Projectile::spawn(Vec2::ZERO, Vec2::ZERO, ProjectileKind::Bomb);
        let spec = bomb.explosion_spec();
        assert_eq!((spec.particles, spec.rings, spec.fragments), (15, 2, 8));
    }
}
