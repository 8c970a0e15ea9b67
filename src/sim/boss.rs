//! Boss state machine: movement, health phases, attack rhythm, patterns
//!
//! Two orthogonal state machines drive emission cadence. Health phases step
//! up with each hit and freeze the boss briefly; the assault/recovery rhythm
//! alternates on level-scaled timers and re-rolls the attack pattern on every
//! assault entry. Patterns themselves are pure functions of boss position,
//! level, and (optionally) the player position.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;
use crate::{angle_to_dir, normalize_angle};

use super::beam::{Beam, BeamOrientation};
use super::pool::ObjectPool;
use super::projectile::{Projectile, ProjectileKind};
use super::state::Arena;

const BASE_SIZE: f32 = 100.0;
const MAX_SPEED: f32 = 2.5;
const ACCELERATION: f32 = 0.15;
const FRICTION: f32 = 0.92;
const ANGULAR_ACCELERATION: f32 = 0.015;
const ANGULAR_FRICTION: f32 = 0.85;
/// Boss stops accelerating inside this distance of its move target
const ARRIVAL_DEAD_ZONE: f32 = 10.0;
/// Chance per shot that a mega boss swaps in a special pattern
const MEGA_SPECIAL_CHANCE: f32 = 0.15;
/// Chance per beam volley that a mega boss uses a composite layout
const MEGA_SPECIAL_BEAM_CHANCE: f32 = 0.35;
/// Beams unlock at this level
const BEAM_UNLOCK_LEVEL: u32 = 4;

#[derive(Debug, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing angle; converges on travel direction via damped spring
    heading: f32,
    target_heading: f32,
    angular_vel: f32,

    level: u32,
    mega: bool,
    size: f32,

    max_health: u32,
    health: u32,
    phase: u32,
    phase_transitioning: bool,
    phase_transition_timer: f32,
    phase_transition_duration: f32,

    /// Rhythm flag: true = assault, false = recovery
    assault: bool,
    rhythm_timer: f32,
    assault_duration: f32,
    recovery_duration: f32,
    assault_speed_multiplier: f32,
    recovery_speed_multiplier: f32,

    pattern: u32,
    max_patterns: u32,
    shoot_timer: f32,
    shoot_interval: f32,
    /// Shots fired so far; seeds the rotating offset of spiral-family patterns
    shots_fired: u32,

    move_target: Vec2,
    move_timer: f32,
    move_deadline: f32,

    beam_timer: f32,
    beam_interval: f32,
    beams: Vec<Beam>,
}

impl Boss {
    pub fn new(pos: Vec2, level: u32, tuning: &Tuning, rng: &mut Pcg32) -> Self {
        // Every third boss is a mega: bigger, tougher, nastier patterns
        let mega = level % 3 == 0;
        let size = if mega { BASE_SIZE * 1.5 } else { BASE_SIZE * 0.95 };
        let max_health = if mega { 3 } else { 2 };
        let max_patterns = (2 + level).min(15);

        let mut assault_duration = tuning.assault_base + level as f32 * tuning.assault_per_level;
        let mut recovery_duration = (tuning.recovery_base - level as f32 * tuning.recovery_per_level)
            .max(tuning.recovery_floor);
        let mut assault_speed_multiplier = tuning.assault_speed_multiplier;
        if mega {
            assault_duration += 30.0;
            recovery_duration -= 15.0;
            assault_speed_multiplier = tuning.assault_speed_multiplier_mega;
        }

        Self {
            pos,
            vel: Vec2::ZERO,
            heading: std::f32::consts::FRAC_PI_2, // facing down at spawn
            target_heading: std::f32::consts::FRAC_PI_2,
            angular_vel: 0.0,
            level,
            mega,
            size,
            max_health,
            health: max_health,
            phase: 0,
            phase_transitioning: false,
            phase_transition_timer: 0.0,
            phase_transition_duration: tuning.phase_transition_duration,
            assault: true,
            rhythm_timer: 0.0,
            assault_duration,
            recovery_duration,
            assault_speed_multiplier,
            recovery_speed_multiplier: tuning.recovery_speed_multiplier,
            pattern: rng.random_range(0..max_patterns),
            max_patterns,
            shoot_timer: 0.0,
            shoot_interval: (75.0 + level as f32 * 2.0).max(45.0),
            shots_fired: 0,
            move_target: pos,
            move_timer: 0.0,
            move_deadline: 120.0 + rng.random::<f32>() * 60.0,
            beam_timer: 180.0 + rng.random::<f32>() * 60.0,
            beam_interval: (480.0 - level as f32 * 10.0).max(300.0),
            beams: Vec::new(),
        }
    }

    /// Advance movement, rhythm, shooting and beam emission by one tick.
    /// During a phase transition only the transition timer runs.
    pub fn update(
        &mut self,
        dt: f32,
        projectiles: &mut Vec<Projectile>,
        pool: &mut ObjectPool<Projectile>,
        player: Option<Vec2>,
        arena: &Arena,
        rng: &mut Pcg32,
    ) {
        if self.phase_transitioning {
            self.phase_transition_timer += dt;
            if self.phase_transition_timer >= self.phase_transition_duration {
                self.phase_transitioning = false;
                self.phase_transition_timer = 0.0;
                log::debug!("phase {} transition complete", self.phase);
            }
            return;
        }

        self.update_movement(dt, player, arena, rng);
        self.update_rhythm(dt, rng);

        // Shoot-timer advance compounds the per-phase bonus with the rhythm
        // multiplier; both scale the rate, not the interval.
        let phase_bonus = 1.0 + self.phase as f32 * 0.15;
        let rhythm_multiplier = if self.assault {
            self.assault_speed_multiplier
        } else {
            self.recovery_speed_multiplier
        };
        self.shoot_timer += dt * phase_bonus * rhythm_multiplier;
        if self.shoot_timer >= self.shoot_interval {
            self.shoot_timer = 0.0;
            self.shoot(projectiles, pool, player, rng);
        }

        if self.level >= BEAM_UNLOCK_LEVEL {
            self.beam_timer += dt;
            if self.beam_timer >= self.beam_interval {
                self.beam_timer = 0.0;
                self.spawn_beams(arena, rng);
            }
        }
    }

    fn update_movement(&mut self, dt: f32, player: Option<Vec2>, arena: &Arena, rng: &mut Pcg32) {
        self.move_timer += dt;
        if self.move_timer >= self.move_deadline {
            self.move_timer = 0.0;
            self.move_deadline = 120.0 + rng.random::<f32>() * 60.0;
            self.pick_move_target(player, arena, rng);
        }

        let to_target = self.move_target - self.pos;
        let distance = to_target.length();
        if distance > ARRIVAL_DEAD_ZONE {
            let strength = ACCELERATION * (1.0 + self.level as f32 * 0.025);
            self.vel += to_target / distance * strength * dt;
            self.target_heading = to_target.y.atan2(to_target.x);
        }

        self.vel *= FRICTION.powf(dt);

        let max_speed = MAX_SPEED * (1.0 + self.level as f32 * 0.05);
        let speed = self.vel.length();
        if speed > max_speed {
            self.vel *= max_speed / speed;
        }

        self.pos += self.vel * dt;

        // Heading converges on travel direction: damped angular spring, so
        // the turn overshoots slightly instead of snapping.
        let diff = normalize_angle(self.target_heading - self.heading);
        self.angular_vel += diff * ANGULAR_ACCELERATION * dt;
        self.angular_vel *= ANGULAR_FRICTION.powf(dt);
        self.heading += self.angular_vel * dt;

        // Stay in the top third of the arena; soft bounce off the walls.
        // Bounds are floored at `size` so a cramped arena degenerates to a
        // fixed point instead of an inverted range.
        let right = (arena.width - self.size).max(self.size);
        let floor_y = (arena.height / 3.0).max(self.size);
        if self.pos.x < self.size || self.pos.x > right {
            self.pos.x = self.pos.x.clamp(self.size, right);
            self.vel.x *= -0.5;
        }
        if self.pos.y < self.size || self.pos.y > floor_y {
            self.pos.y = self.pos.y.clamp(self.size, floor_y);
            self.vel.y *= -0.5;
        }
    }

    /// Pick a roam target biased away from the player: opposite angle plus
    /// up to 45 degrees of jitter, on a circle over the upper arena.
    fn pick_move_target(&mut self, player: Option<Vec2>, arena: &Arena, rng: &mut Pcg32) {
        let center = Vec2::new(arena.width / 2.0, arena.height / 3.0);
        let radius = arena.width.min(arena.height) / 2.0;

        let angle = match player {
            Some(p) => {
                let to_player = (p - self.pos).y.atan2((p - self.pos).x);
                to_player + std::f32::consts::PI
                    + (rng.random::<f32>() - 0.5) * std::f32::consts::FRAC_PI_2
            }
            None => rng.random::<f32>() * std::f32::consts::TAU,
        };

        let target = center + angle_to_dir(angle) * radius;
        self.move_target = Vec2::new(
            target.x.clamp(self.size, (arena.width - self.size).max(self.size)),
            target.y.clamp(self.size, (arena.height / 1.8 - self.size).max(self.size)),
        );
    }

    fn update_rhythm(&mut self, dt: f32, rng: &mut Pcg32) {
        self.rhythm_timer += dt;
        let duration = if self.assault {
            self.assault_duration
        } else {
            self.recovery_duration
        };
        if self.rhythm_timer >= duration {
            self.rhythm_timer = 0.0;
            self.assault = !self.assault;
            if self.assault {
                // Fresh assault, fresh pattern
                self.pattern = rng.random_range(0..self.max_patterns);
                log::debug!("assault phase, pattern {}", self.pattern);
            } else {
                log::debug!("recovery phase");
            }
        }
    }

    // === Health / phase ===

    /// One hit of damage. Stepping into a new phase (while still alive)
    /// freezes movement and emission for the transition duration.
    pub fn take_damage(&mut self) {
        debug_assert!(self.health > 0, "damage applied to a dead boss");
        if self.health == 0 {
            return;
        }
        self.health -= 1;
        let new_phase = self.max_health - self.health;
        if new_phase > self.phase && self.health > 0 {
            self.phase_transitioning = true;
            self.phase_transition_timer = 0.0;
            log::debug!("entering phase {new_phase}");
        }
        self.phase = new_phase;
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    // === Shooting patterns ===

    fn aim_at(&self, player: Option<Vec2>) -> f32 {
        match player {
            Some(p) => (p - self.pos).y.atan2((p - self.pos).x),
            // No player (respawn delay): fall back to straight down
            None => std::f32::consts::FRAC_PI_2,
        }
    }

    /// Level-scaled speed ramp shared by most patterns
    fn speed_ramp(&self) -> f32 {
        (0.4 + self.level as f32 * 0.15).min(1.3)
    }

    /// Gentler ramp used by the densest patterns
    fn dense_ramp(&self) -> f32 {
        (0.4 + self.level as f32 * 0.12).min(1.0)
    }

    fn emit(
        &self,
        projectiles: &mut Vec<Projectile>,
        pool: &mut ObjectPool<Projectile>,
        angle: f32,
        speed: f32,
        kind: ProjectileKind,
    ) {
        let dir = angle_to_dir(angle);
        let mut projectile = pool.acquire_with(|| Projectile::spawn(Vec2::ZERO, Vec2::ZERO, kind));
        projectile.reset(self.pos + dir * self.size * 1.5, dir * speed, kind);
        projectiles.push(projectile);
    }

    /// Emit one volley. Appends only; never touches existing projectiles.
    /// Must not be called during a phase transition.
    pub fn shoot(
        &mut self,
        projectiles: &mut Vec<Projectile>,
        pool: &mut ObjectPool<Projectile>,
        player: Option<Vec2>,
        rng: &mut Pcg32,
    ) {
        debug_assert!(!self.phase_transitioning, "shoot during phase transition");
        self.shots_fired += 1;

        if self.mega && rng.random::<f32>() < MEGA_SPECIAL_CHANCE {
            match rng.random_range(0..5u32) {
                0 => self.shoot_mega_barrage(projectiles, pool, player, rng),
                1 => self.shoot_mega_spiral(projectiles, pool),
                2 => self.shoot_mega_cross(projectiles, pool, player, rng),
                3 => self.shoot_mega_star(projectiles, pool),
                _ => self.shoot_mega_hex(projectiles, pool, player),
            }
            return;
        }

        // Normal cycling: one pattern per shot, wrapped into the unlocked pool
        self.pattern = (self.pattern + 1) % self.max_patterns;
        match self.pattern % 15 {
            0 => self.shoot_spiral(projectiles, pool),
            1 => self.shoot_circle(projectiles, pool, 15 + self.level),
            2 => self.shoot_at_player(projectiles, pool, player, 6),
            3 => self.shoot_wave(projectiles, pool),
            4 => self.shoot_random(projectiles, pool, 10 + self.level, rng),
            5 => self.shoot_fast(projectiles, pool, player, rng),
            6 => self.shoot_large(projectiles, pool),
            7 => self.shoot_mixed(projectiles, pool, player),
            8 => self.shoot_spiral_kind(projectiles, pool),
            9 => self.shoot_splitting(projectiles, pool),
            10 => self.shoot_accelerating(projectiles, pool, player),
            11 => self.shoot_wave_kind(projectiles, pool),
            12 => self.shoot_bombs(projectiles, pool),
            13 => self.shoot_grenades(projectiles, pool, player),
            _ => self.shoot_nukes(projectiles, pool),
        }
    }

    /// Rotating offset so spiral-family volleys precess between shots
    fn spin(&self) -> f32 {
        self.shots_fired as f32 * 0.45
    }

    fn shoot_spiral(&self, projectiles: &mut Vec<Projectile>, pool: &mut ObjectPool<Projectile>) {
        let count = 12 + self.level * 2;
        let ramp = self.dense_ramp();
        for i in 0..count {
            let angle = std::f32::consts::TAU * i as f32 / count as f32 + self.spin();
            self.emit(projectiles, pool, angle, 3.0 * ramp, ProjectileKind::Normal);
        }
    }

    fn shoot_circle(&self, projectiles: &mut Vec<Projectile>, pool: &mut ObjectPool<Projectile>, count: u32) {
        let ramp = self.speed_ramp();
        for i in 0..count {
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            self.emit(projectiles, pool, angle, 2.5 * ramp, ProjectileKind::Normal);
        }
    }

    fn shoot_at_player(
        &self,
        projectiles: &mut Vec<Projectile>,
        pool: &mut ObjectPool<Projectile>,
        player: Option<Vec2>,
        spread: i32,
    ) {
        let ramp = self.speed_ramp();
        let aim = self.aim_at(player);
        for i in -spread..=spread {
            let angle = aim + i as f32 * 0.2;
            self.emit(projectiles, pool, angle, 4.0 * ramp, ProjectileKind::Normal);
        }
    }

    fn shoot_wave(&self, projectiles: &mut Vec<Projectile>, pool: &mut ObjectPool<Projectile>) {
        let count = 16 + self.level;
        let ramp = self.speed_ramp();
        for i in 0..count {
            let angle = std::f32::consts::FRAC_PI_4
                + std::f32::consts::FRAC_PI_2 * i as f32 / count as f32;
            let speed = (2.0 + (i as f32 * 0.5).sin() * 1.5) * ramp;
            self.emit(projectiles, pool, angle, speed, ProjectileKind::Normal);
        }
    }

    fn shoot_random(
        &self,
        projectiles: &mut Vec<Projectile>,
        pool: &mut ObjectPool<Projectile>,
        count: u32,
        rng: &mut Pcg32,
    ) {
        let ramp = self.speed_ramp();
        for _ in 0..count {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let speed = (2.0 + rng.random::<f32>() * 2.0) * ramp;
            self.emit(projectiles, pool, angle, speed, ProjectileKind::Normal);
        }
    }

    fn shoot_fast(
        &self,
        projectiles: &mut Vec<Projectile>,
        pool: &mut ObjectPool<Projectile>,
        player: Option<Vec2>,
        rng: &mut Pcg32,
    ) {
        let ramp = self.speed_ramp();
        let aim = self.aim_at(player);
        for _ in 0..(5 + self.level / 2) {
            let angle = aim + (rng.random::<f32>() - 0.5) * 0.5;
            self.emit(projectiles, pool, angle, 6.0 * ramp, ProjectileKind::Fast);
        }
    }

    fn shoot_large(&self, projectiles: &mut Vec<Projectile>, pool: &mut ObjectPool<Projectile>) {
        let count = 5 + self.level / 2;
        let ramp = self.speed_ramp();
        for i in 0..count {
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            self.emit(projectiles, pool, angle, 1.5 * ramp, ProjectileKind::Large);
        }
    }

    fn shoot_mixed(
        &self,
        projectiles: &mut Vec<Projectile>,
        pool: &mut ObjectPool<Projectile>,
        player: Option<Vec2>,
    ) {
        let ramp = self.speed_ramp();
        let aim = self.aim_at(player);
        for i in 0..3 {
            let angle = aim + (i as f32 - 1.0) * 0.3;
            self.emit(projectiles, pool, angle, 2.5 * ramp, ProjectileKind::Homing);
        }
        if self.level >= 3 {
            for i in 0..8 {
                let angle = std::f32::consts::TAU * i as f32 / 8.0;
                self.emit(projectiles, pool, angle, 3.0 * ramp, ProjectileKind::Bouncing);
            }
        }
    }

    fn shoot_spiral_kind(&self, projectiles: &mut Vec<Projectile>, pool: &mut ObjectPool<Projectile>) {
        let count = 5 + self.level / 2;
        let ramp = self.speed_ramp();
        for i in 0..count {
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            self.emit(projectiles, pool, angle, 2.0 * ramp, ProjectileKind::Spiral);
        }
    }

    fn shoot_splitting(&self, projectiles: &mut Vec<Projectile>, pool: &mut ObjectPool<Projectile>) {
        let count = 4 + self.level / 2;
        let ramp = self.speed_ramp();
        for i in 0..count {
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            self.emit(projectiles, pool, angle, 2.5 * ramp, ProjectileKind::Splitting);
        }
    }

    fn shoot_accelerating(
        &self,
        projectiles: &mut Vec<Projectile>,
        pool: &mut ObjectPool<Projectile>,
        player: Option<Vec2>,
    ) {
        let ramp = self.speed_ramp();
        let aim = self.aim_at(player);
        for i in -2..=2 {
            let angle = aim + i as f32 * 0.3;
            self.emit(projectiles, pool, angle, 1.5 * ramp, ProjectileKind::Accelerating);
        }
    }

    fn shoot_wave_kind(&self, projectiles: &mut Vec<Projectile>, pool: &mut ObjectPool<Projectile>) {
        let count = 8 + self.level / 2;
        let ramp = self.speed_ramp();
        for i in 0..count {
            let angle = std::f32::consts::FRAC_PI_4
                + std::f32::consts::FRAC_PI_2 * i as f32 / count as f32;
            self.emit(projectiles, pool, angle, 2.5 * ramp, ProjectileKind::Wave);
        }
    }

    fn shoot_bombs(&self, projectiles: &mut Vec<Projectile>, pool: &mut ObjectPool<Projectile>) {
        let count = 3 + self.level / 2;
        let ramp = self.speed_ramp();
        for i in 0..count {
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            self.emit(projectiles, pool, angle, 2.0 * ramp, ProjectileKind::Bomb);
        }
    }

    fn shoot_grenades(
        &self,
        projectiles: &mut Vec<Projectile>,
        pool: &mut ObjectPool<Projectile>,
        player: Option<Vec2>,
    ) {
        let count = 2 + u32::from(self.level >= 5);
        let ramp = self.speed_ramp();
        let aim = self.aim_at(player);
        for i in 0..count {
            let angle = aim + (i as f32 - count as f32 / 2.0) * 0.3;
            self.emit(projectiles, pool, angle, 2.5 * ramp, ProjectileKind::Grenade);
        }
    }

    fn shoot_nukes(&self, projectiles: &mut Vec<Projectile>, pool: &mut ObjectPool<Projectile>) {
        let count = 1 + u32::from(self.level >= 4) + u32::from(self.level >= 7);
        let ramp = self.speed_ramp();
        for i in 0..count {
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            self.emit(projectiles, pool, angle, 1.5 * ramp, ProjectileKind::Nuke);
        }
    }

    // === Mega boss special patterns ===

    fn shoot_mega_barrage(
        &self,
        projectiles: &mut Vec<Projectile>,
        pool: &mut ObjectPool<Projectile>,
        player: Option<Vec2>,
        rng: &mut Pcg32,
    ) {
        let ramp = self.speed_ramp();
        let aim = self.aim_at(player);
        let count = 15 + self.level * 2;
        let spread = std::f32::consts::FRAC_PI_3; // 60 degree cone
        for i in 0..count {
            let angle = aim + (i as f32 / count as f32 - 0.5) * spread;
            let speed = (2.5 + rng.random::<f32>() * 2.0) * ramp;
            let kind = match rng.random::<f32>() {
                r if r < 0.3 => ProjectileKind::Fast,
                r if r < 0.5 => ProjectileKind::Homing,
                r if r < 0.7 => ProjectileKind::Accelerating,
                _ => ProjectileKind::Normal,
            };
            self.emit(projectiles, pool, angle, speed, kind);
        }
    }

    fn shoot_mega_spiral(&self, projectiles: &mut Vec<Projectile>, pool: &mut ObjectPool<Projectile>) {
        let ramp = self.speed_ramp();
        let layers = [8u32, 12, 16];
        let speeds = [2.0f32, 3.0, 4.0];
        let kinds = [ProjectileKind::Normal, ProjectileKind::Spiral, ProjectileKind::Wave];
        for layer in 0..3usize {
            let count = layers[layer] + self.level;
            let layer_offset = self.spin() * (1.0 + layer as f32 * 0.3);
            for i in 0..count {
                let angle = std::f32::consts::TAU * i as f32 / count as f32 + layer_offset;
                self.emit(projectiles, pool, angle, speeds[layer] * ramp, kinds[layer]);
            }
        }
    }

    fn shoot_mega_cross(
        &self,
        projectiles: &mut Vec<Projectile>,
        pool: &mut ObjectPool<Projectile>,
        player: Option<Vec2>,
        rng: &mut Pcg32,
    ) {
        let ramp = self.speed_ramp();
        for arm in 0..4u32 {
            let arm_angle = std::f32::consts::FRAC_PI_2 * arm as f32 + self.spin() * 0.2;
            let per_arm = 5 + self.level / 2;
            for i in 0..per_arm {
                let speed = (2.5 + (i + 1) as f32 * 0.3) * ramp;
                let kind = if i % 3 == 0 {
                    ProjectileKind::Large
                } else {
                    ProjectileKind::Normal
                };
                self.emit(projectiles, pool, arm_angle, speed, kind);
            }
        }
        // Homing cluster in the middle of the cross
        let aim = self.aim_at(player);
        for _ in 0..(3 + self.level / 3) {
            let angle = aim + (rng.random::<f32>() - 0.5) * 0.8;
            self.emit(projectiles, pool, angle, 2.5 * ramp, ProjectileKind::Homing);
        }
    }

    fn shoot_mega_star(&self, projectiles: &mut Vec<Projectile>, pool: &mut ObjectPool<Projectile>) {
        let ramp = self.speed_ramp();
        let points = 6 + self.level / 3;
        for point in 0..points {
            let point_angle = std::f32::consts::TAU * point as f32 / points as f32;
            for i in 0..3u32 {
                let angle = point_angle + (i as f32 - 2.0) * (0.4 / 5.0);
                let speed = (2.0 + i as f32 * 0.5) * ramp;
                let kind = if i == 2 {
                    ProjectileKind::Large
                } else {
                    ProjectileKind::Splitting
                };
                self.emit(projectiles, pool, angle, speed, kind);
            }
        }
        // Slow ring of bombs from the center
        let bombs = 3 + self.level / 4;
        for i in 0..bombs {
            let angle = std::f32::consts::TAU * i as f32 / (4 + self.level / 3) as f32;
            self.emit(projectiles, pool, angle, 1.5 * ramp, ProjectileKind::Bomb);
        }
    }

    fn shoot_mega_hex(
        &self,
        projectiles: &mut Vec<Projectile>,
        pool: &mut ObjectPool<Projectile>,
        player: Option<Vec2>,
    ) {
        let ramp = self.dense_ramp();
        for side in 0..6u32 {
            let side_angle = std::f32::consts::FRAC_PI_3 * side as f32 + self.spin() * 0.16;
            let per_side = 4 + self.level / 2;
            for i in 0..per_side {
                let angle = side_angle + (i as f32 - per_side as f32 / 2.0) * 0.1;
                let speed = (2.5 + (i as f32 * 0.5).sin()) * ramp;
                self.emit(projectiles, pool, angle, speed, ProjectileKind::Wave);
            }
        }
        let aim = self.aim_at(player);
        for i in 0..(2 + self.level / 3) {
            let angle = aim + (i as f32 - 1.0) * 0.4;
            self.emit(projectiles, pool, angle, 3.0 * ramp, ProjectileKind::Grenade);
        }
        let ring = 6 + self.level / 2;
        for i in 0..ring {
            let angle = std::f32::consts::TAU * i as f32 / (10 + self.level) as f32;
            self.emit(projectiles, pool, angle, 1.8 * ramp, ProjectileKind::Accelerating);
        }
    }

    // === Beam hazards ===

    fn spawn_beams(&mut self, arena: &Arena, rng: &mut Pcg32) {
        if self.mega && rng.random::<f32>() < MEGA_SPECIAL_BEAM_CHANCE {
            match rng.random_range(0..3u32) {
                0 => self.spawn_cross_beams(arena, rng),
                1 => self.spawn_grid_beams(arena),
                _ => self.spawn_rotating_beams(arena),
            }
            return;
        }

        let width = 40.0 + self.level as f32 * 5.0;
        let count = 1 + u32::from(self.level >= 5) + u32::from(self.level >= 8);
        if rng.random::<f32>() < 0.5 {
            for _ in 0..count {
                let position = arena.width * (0.2 + rng.random::<f32>() * 0.6);
                self.beams.push(Beam::new(position, width, BeamOrientation::Vertical));
            }
        } else {
            for _ in 0..count {
                let position = arena.height * (0.3 + rng.random::<f32>() * 0.5);
                self.beams.push(Beam::new(position, width, BeamOrientation::Horizontal));
            }
        }
    }

    /// One vertical and one horizontal beam crossing mid-arena
    fn spawn_cross_beams(&mut self, arena: &Arena, rng: &mut Pcg32) {
        let width = 50.0 + self.level as f32 * 6.0;
        let x = arena.width * (0.3 + rng.random::<f32>() * 0.4);
        let y = arena.height * (0.35 + rng.random::<f32>() * 0.3);
        self.beams.push(Beam::new(x, width, BeamOrientation::Vertical));
        self.beams.push(Beam::new(y, width, BeamOrientation::Horizontal));
    }

    /// Evenly spaced lattice of beams
    fn spawn_grid_beams(&mut self, arena: &Arena) {
        let width = 35.0 + self.level as f32 * 4.0;
        let vertical = 2 + self.level / 5;
        let horizontal = 2 + self.level / 5;
        for i in 0..vertical {
            let position = arena.width * (i + 1) as f32 / (vertical + 1) as f32;
            self.beams.push(Beam::new(position, width, BeamOrientation::Vertical));
        }
        for i in 0..horizontal {
            // Start lower on screen, away from the boss roam zone
            let position = arena.height * (i + 2) as f32 / (horizontal + 3) as f32;
            self.beams.push(Beam::new(position, width, BeamOrientation::Horizontal));
        }
    }

    /// Offset vertical/horizontal pairs that sweep across the arena
    fn spawn_rotating_beams(&mut self, arena: &Arena) {
        let width = 55.0 + self.level as f32 * 7.0;
        let pairs = 2 + u32::from(self.level >= 10);
        for i in 0..pairs {
            let offset = (i + 1) as f32 / (pairs + 1) as f32;
            self.beams.push(Beam::new(arena.width * offset, width, BeamOrientation::Vertical));
            self.beams.push(Beam::new(
                arena.height * (0.3 + offset * 0.4),
                width,
                BeamOrientation::Horizontal,
            ));
        }
    }

    #[cfg(test)]
    pub(crate) fn push_beam(&mut self, beam: Beam) {
        self.beams.push(beam);
    }

    /// Advance active beams and drop finished ones. Runs even during phase
    /// transitions: a beam already telegraphed keeps its schedule.
    pub fn update_beams(&mut self, dt: f32) {
        for beam in &mut self.beams {
            beam.update(dt);
        }
        self.beams.retain(|b| !b.is_done());
    }

    // === Read-only surface ===

    pub fn beams(&self) -> &[Beam] {
        &self.beams
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_mega(&self) -> bool {
        self.mega
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn current_phase(&self) -> u32 {
        self.phase
    }

    pub fn is_phase_transitioning(&self) -> bool {
        self.phase_transitioning
    }

    pub fn is_assault(&self) -> bool {
        self.assault
    }

    pub fn pattern_index(&self) -> u32 {
        self.pattern
    }

    /// Fraction of the current rhythm phase elapsed (HUD)
    pub fn rhythm_progress(&self) -> f32 {
        let duration = if self.assault {
            self.assault_duration
        } else {
            self.recovery_duration
        };
        self.rhythm_timer / duration
    }

    /// Contact hitbox is tighter than the sprite footprint
    pub fn hitbox_radius(&self) -> f32 {
        self.size * 0.6
    }

    /// Money awarded to the score collaborator on defeat
    pub fn money_reward(&self) -> u32 {
        if self.mega {
            700 + self.level * 250
        } else {
            150 + self.level * 70
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rig(level: u32) -> (Boss, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(7);
        let boss = Boss::new(Vec2::new(800.0, 150.0), level, &Tuning::default(), &mut rng);
        (boss, rng)
    }

    fn arena() -> Arena {
        Arena {
            width: 1600.0,
            height: 900.0,
        }
    }

    #[test]
    fn test_mega_every_third_level() {
        assert!(!rig(1).0.is_mega());
        assert!(!rig(2).0.is_mega());
        assert!(rig(3).0.is_mega());
        assert!(rig(6).0.is_mega());
        assert_eq!(rig(3).0.max_health(), 3);
        assert_eq!(rig(1).0.max_health(), 2);
    }

    #[test]
    fn test_pattern_pool_unlocks_with_level_and_caps() {
        assert_eq!(rig(1).0.max_patterns, 3);
        assert_eq!(rig(10).0.max_patterns, 12);
        assert_eq!(rig(30).0.max_patterns, 15);
    }

    #[test]
    fn test_two_hits_kill_mini_with_one_transition() {
        let (mut boss, _) = rig(1);

        boss.take_damage();
        assert_eq!(boss.health(), 1);
        assert_eq!(boss.current_phase(), 1);
        assert!(boss.is_phase_transitioning(), "first hit enters transition");
        assert!(!boss.is_dead());

        // Finish the transition so the second hit is legal gameplay-wise
        boss.phase_transitioning = false;

        boss.take_damage();
        assert_eq!(boss.health(), 0);
        assert_eq!(boss.current_phase(), 2);
        assert!(boss.is_dead());
        assert!(!boss.is_phase_transitioning(), "lethal hit has no transition");
    }

    #[test]
    fn test_phase_tracks_health_identity() {
        let (mut boss, _) = rig(3);
        for expected_phase in 1..=3u32 {
            boss.take_damage();
            boss.phase_transitioning = false;
            assert_eq!(boss.current_phase(), boss.max_health() - boss.health());
            assert_eq!(boss.current_phase(), expected_phase);
        }
    }

    #[test]
    fn test_phase_transition_suspends_emission() {
        let (mut boss, mut rng) = rig(1);
        boss.take_damage();
        assert!(boss.is_phase_transitioning());

        let mut projectiles = Vec::new();
        let mut pool = ObjectPool::new(16);
        // Long enough that shooting would certainly fire if not suspended
        for _ in 0..60 {
            boss.update(1.0, &mut projectiles, &mut pool, None, &arena(), &mut rng);
        }
        assert!(projectiles.is_empty());
        assert!(boss.is_phase_transitioning());

        // Timer keeps running and eventually releases the boss
        for _ in 0..30 {
            boss.update(1.0, &mut projectiles, &mut pool, None, &arena(), &mut rng);
        }
        assert!(!boss.is_phase_transitioning());
    }

    #[test]
    fn test_rhythm_alternates_at_exact_boundaries() {
        let (mut boss, mut rng) = rig(1);
        let mut projectiles = Vec::new();
        let mut pool = ObjectPool::new(512);

        // Level 1: assault 308, recovery 206
        let assault = 308;
        let recovery = 206;

        for tick in 0..(assault + recovery + assault) {
            assert_eq!(
                boss.is_assault(),
                tick < assault || tick >= assault + recovery,
                "wrong rhythm at tick {tick}"
            );
            boss.update(1.0, &mut projectiles, &mut pool, None, &arena(), &mut rng);
        }
        assert!(!boss.is_assault(), "back in recovery after second assault");
    }

    #[test]
    fn test_assault_entry_rerolls_from_unlocked_pool() {
        let (mut boss, mut rng) = rig(9);
        let mut projectiles = Vec::new();
        let mut pool = ObjectPool::new(2048);

        for _ in 0..3000 {
            boss.update(1.0, &mut projectiles, &mut pool, None, &arena(), &mut rng);
            assert!(boss.pattern_index() < boss.max_patterns);
        }
    }

    #[test]
    fn test_shoot_appends_without_touching_existing() {
        let (mut boss, mut rng) = rig(2);
        let mut projectiles = Vec::new();
        let mut pool = ObjectPool::new(64);

        boss.shoot(&mut projectiles, &mut pool, Some(Vec2::new(800.0, 700.0)), &mut rng);
        let first_volley = projectiles.len();
        assert!(first_volley > 0);
        let snapshot: Vec<Vec2> = projectiles.iter().map(|p| p.pos).collect();

        boss.shoot(&mut projectiles, &mut pool, Some(Vec2::new(800.0, 700.0)), &mut rng);
        assert!(projectiles.len() > first_volley);
        for (i, pos) in snapshot.iter().enumerate() {
            assert_eq!(projectiles[i].pos, *pos, "existing projectile mutated");
        }
    }

    #[test]
    fn test_boss_stays_in_roam_zone() {
        let (mut boss, mut rng) = rig(5);
        let mut projectiles = Vec::new();
        let mut pool = ObjectPool::new(1024);
        let arena = arena();

        for _ in 0..2000 {
            boss.update(
                1.0,
                &mut projectiles,
                &mut pool,
                Some(Vec2::new(800.0, 700.0)),
                &arena,
                &mut rng,
            );
            assert!(boss.pos.x >= boss.size() && boss.pos.x <= arena.width - boss.size());
            assert!(boss.pos.y >= boss.size() && boss.pos.y <= arena.height / 3.0);
        }
    }

    #[test]
    fn test_beams_gated_by_level() {
        let arena = arena();
        let mut projectiles = Vec::new();

        let (mut low, mut rng) = rig(2);
        let mut pool = ObjectPool::new(4096);
        for _ in 0..2000 {
            low.update(1.0, &mut projectiles, &mut pool, None, &arena, &mut rng);
            low.update_beams(1.0);
        }
        assert!(low.beams().is_empty(), "no beams below level 4");

        let (mut high, mut rng) = rig(5);
        projectiles.clear();
        let mut saw_beam = false;
        for _ in 0..2000 {
            high.update(1.0, &mut projectiles, &mut pool, None, &arena, &mut rng);
            high.update_beams(1.0);
            saw_beam |= !high.beams().is_empty();
        }
        assert!(saw_beam, "level 5 boss emits beams");
    }

    #[test]
    fn test_money_reward_scales() {
        assert_eq!(rig(3).0.money_reward(), 700 + 3 * 250);
        assert_eq!(rig(4).0.money_reward(), 150 + 4 * 70);
    }
}
