//! Fixed timestep simulation tick
//!
//! One call to [`tick`] advances the whole encounter by one step in a fixed
//! order: boss schedule, item impulses, projectile motion, explosion/split
//! resolution, broad-phase rebuild, player collision with fixed precedence,
//! graze scoring, beams, and the boss vulnerability window. The function is
//! synchronous and total; collaborators read state between calls.

use glam::Vec2;
use rand::Rng;

use super::projectile::{Projectile, ProjectileKind};
use super::state::{GameEvent, GrazeTier, ParticleKind, PlayerView, SimState};

/// Passive upgrade multipliers supplied by the progression collaborator
#[derive(Debug, Clone, Copy)]
pub struct UpgradeModifiers {
    /// Per-tick multiplicative drag on projectile velocity (1.0 = none)
    pub bullet_slow: f32,
    /// Scales the normal and close-call graze radii
    pub graze_radius: f32,
    /// Probability that a lethal hit is shrugged off
    pub lucky_dodge_chance: f32,
    /// Extra seconds added to each vulnerability window
    pub vulnerability_bonus_secs: f32,
    /// Scales the combo decay timeout
    pub combo_duration: f32,
}

impl Default for UpgradeModifiers {
    fn default() -> Self {
        Self {
            bullet_slow: 1.0,
            graze_radius: 1.0,
            lucky_dodge_chance: 0.0,
            vulnerability_bonus_secs: 0.0,
            combo_duration: 1.0,
        }
    }
}

/// Risk-contract modifiers: harder bullets for more money
#[derive(Debug, Clone, Copy)]
pub struct RiskContract {
    pub bullet_speed_multiplier: f32,
    /// Every volley is doubled with jittered copies
    pub duplicate_bullets: bool,
    /// Shield items are inert
    pub shieldless: bool,
    pub money_multiplier: f32,
}

impl Default for RiskContract {
    fn default() -> Self {
        Self {
            bullet_speed_multiplier: 1.0,
            duplicate_bullets: false,
            shieldless: false,
            money_multiplier: 1.0,
        }
    }
}

/// Active-item effects for this tick. Momentary flags (shockwave, bomb,
/// laser, magnet, shield) apply once on the tick they are set; the rest are
/// held while the item stays active.
#[derive(Debug, Clone, Copy)]
pub struct ItemEffects {
    pub invincibility: bool,
    /// Dash i-frames
    pub dash: bool,
    pub shield_activate: bool,
    /// Projectile time dilation (1.0 = none, 0.5 = half speed)
    pub time_slow_factor: f32,
    pub shockwave: bool,
    pub magnet: bool,
    pub bomb_clear: bool,
    pub laser_column: bool,
}

impl Default for ItemEffects {
    fn default() -> Self {
        Self {
            invincibility: false,
            dash: false,
            shield_activate: false,
            time_slow_factor: 1.0,
            shockwave: false,
            magnet: false,
            bomb_clear: false,
            laser_column: false,
        }
    }
}

/// Everything the simulation consumes from collaborators for one tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// None during the respawn delay window: all collision and graze
    /// checks short-circuit
    pub player: Option<PlayerView>,
    pub upgrades: UpgradeModifiers,
    pub contract: RiskContract,
    pub items: ItemEffects,
}

/// Terminal signal for the surrounding game state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    PlayerDeath,
    BossDefeated,
}

const SHOCKWAVE_RADIUS: f32 = 300.0;
const SHOCKWAVE_FORCE: f32 = 10.0;
const MAGNET_RADIUS: f32 = 400.0;
const MAGNET_FORCE: f32 = 0.5;
const LASER_HALF_WIDTH: f32 = 20.0;
/// Graze reward value per tier (normal, close call, perfect dodge)
const GRAZE_VALUES: [u32; 3] = [1, 2, 5];
/// Money bonus per tier before the contract multiplier
const GRAZE_MONEY: [f32; 3] = [2.0, 10.0, 25.0];

/// Advance the encounter by one fixed timestep. `dt` is the tick-scale
/// factor (1.0 = one full 60 Hz step; slow-motion passes less).
pub fn tick(state: &mut SimState, input: &TickInput, dt: f32) -> Option<TickOutcome> {
    state.events.clear();
    state.time_ticks += 1;

    let player_pos = input.player.map(|p| p.pos);

    // 1) Boss schedule: movement, rhythm, volleys, beam emission.
    //    Suspended (except the transition timer) during a phase transition.
    let volley_start = state.projectiles.len();
    state.boss.update(
        dt,
        &mut state.projectiles,
        &mut state.projectile_pool,
        player_pos,
        &state.arena,
        &mut state.rng,
    );
    apply_contract(state, input, volley_start);

    update_vulnerability_window(state, input, dt);

    // One-shot item impulses act before anything moves this tick
    apply_item_effects(state, input);

    if state.perfect_dodge_iframes > 0.0 {
        state.perfect_dodge_iframes -= dt;
    }

    // 2) Projectile motion. Time-slow dilates projectile time only; the
    //    bullet-slow upgrade is a velocity drag on top.
    let projectile_dt = dt * input.items.time_slow_factor;
    let drag = input.upgrades.bullet_slow.clamp(0.0, 1.0);
    for projectile in &mut state.projectiles {
        if drag < 1.0 {
            projectile.apply_slow(drag.powf(dt));
        }
        projectile.update(projectile_dt, player_pos, &state.arena);
    }

    // 3) Resolve explode/split flags over the index range captured here;
    //    children spawned this tick first move next tick.
    resolve_detonations(state);

    // Particles fade on their own clock
    let mut i = 0;
    while i < state.particles.len() {
        state.particles[i].update(dt);
        if state.particles[i].life <= 0.0 {
            let spent = state.particles.swap_remove(i);
            state.particle_pool.release(spent);
        } else {
            i += 1;
        }
    }

    // 4) Broad phase: rebuilt exactly once per tick, after motion and
    //    compaction, before any collision resolution.
    state.grid.rebuild(&state.projectiles);

    // 5) + 6) Narrow phase with fixed precedence, then graze scoring
    let mut outcome = None;
    if let Some(player) = input.player {
        outcome = resolve_player_collisions(state, input, &player);
    }
    recycle_done(state);

    state.combo.update(dt, input.upgrades.combo_duration);

    // 7) Beams: always advance; always lethal unless invincibility or
    //    i-frames apply (shield and lucky dodge do not help here)
    state.boss.update_beams(dt);
    if let (None, Some(player)) = (outcome, input.player) {
        let protected = input.items.invincibility
            || input.items.dash
            || state.perfect_dodge_iframes > 0.0;
        let beam_hit = state
            .boss
            .beams()
            .iter()
            .any(|beam| beam.collides_with(player.pos, player.radius));
        if beam_hit && !protected {
            log::info!("player killed by beam at tick {}", state.time_ticks);
            state.events.push(GameEvent::PlayerDeath);
            outcome = Some(TickOutcome::PlayerDeath);
        }
    }

    // Vulnerability contact: ramming the boss while the window is open
    if let (None, Some(player)) = (outcome, input.player) {
        if state.vulnerable && !state.boss.is_dead() {
            let threshold = player.radius * 0.8 + state.boss.size() * 0.6;
            if state.boss.pos.distance_squared(player.pos) < threshold * threshold {
                state.boss.take_damage();
                state.vulnerable = false;
                state.vulnerability_lockout = state.tuning.vulnerability_lockout;
                if state.boss.is_dead() {
                    let money_reward =
                        (state.boss.money_reward() as f32 * input.contract.money_multiplier) as u32;
                    log::info!("boss defeated at tick {}", state.time_ticks);
                    state.events.push(GameEvent::BossDefeated { money_reward });
                    outcome = Some(TickOutcome::BossDefeated);
                } else {
                    state.events.push(GameEvent::BossHit {
                        remaining_health: state.boss.health(),
                    });
                }
            }
        }
    }

    outcome
}

/// Risk-contract effects on the volley emitted this tick: speed scaling and
/// jittered duplicates. Never touches projectiles from earlier ticks.
fn apply_contract(state: &mut SimState, input: &TickInput, volley_start: usize) {
    let contract = &input.contract;
    let volley_end = state.projectiles.len();
    if volley_end == volley_start {
        return;
    }

    if contract.bullet_speed_multiplier != 1.0 {
        for projectile in &mut state.projectiles[volley_start..] {
            projectile.multiply_speed(contract.bullet_speed_multiplier);
        }
    }

    if contract.duplicate_bullets {
        for i in volley_start..volley_end {
            let pos = state.projectiles[i].pos;
            let vel = state.projectiles[i].vel;
            let kind = state.projectiles[i].kind;
            let jitter = Vec2::new(
                (state.rng.random::<f32>() - 0.5) * 10.0,
                (state.rng.random::<f32>() - 0.5) * 10.0,
            );
            let scale = 0.9 + state.rng.random::<f32>() * 0.2;
            let mut copy = state
                .projectile_pool
                .acquire_with(|| Projectile::spawn(Vec2::ZERO, Vec2::ZERO, kind));
            copy.reset(pos + jitter, vel * scale, kind);
            state.projectiles.push(copy);
        }
    }
}

fn update_vulnerability_window(state: &mut SimState, input: &TickInput, dt: f32) {
    if state.vulnerability_lockout > 0.0 {
        state.vulnerability_lockout -= dt;
    }

    if state.vulnerable {
        state.vulnerability_timer -= dt;
        if state.vulnerability_timer <= 0.0 {
            state.vulnerable = false;
            log::debug!("vulnerability window closed");
        }
        return;
    }

    if state.boss.is_dead() || state.vulnerability_lockout > 0.0 {
        return;
    }
    let mut chance = state.tuning.vulnerability_chance * dt;
    if state.boss.level() <= 3 {
        chance *= 0.5;
    }
    if state.rng.random::<f32>() < chance {
        state.vulnerable = true;
        state.vulnerability_timer = state.tuning.vulnerability_duration
            + input.upgrades.vulnerability_bonus_secs * crate::consts::TICK_RATE;
        log::debug!("vulnerability window open for {} ticks", state.vulnerability_timer);
    }
}

fn apply_item_effects(state: &mut SimState, input: &TickInput) {
    let items = &input.items;

    if items.shield_activate {
        if input.contract.shieldless {
            log::debug!("shield suppressed by contract");
        } else {
            state.shield_active = true;
        }
    }

    let Some(player) = input.player else {
        return;
    };

    if items.shockwave {
        for projectile in &mut state.projectiles {
            let away = projectile.pos - player.pos;
            let distance = away.length();
            if distance > 0.0 && distance < SHOCKWAVE_RADIUS {
                let force = SHOCKWAVE_FORCE * (1.0 - distance / SHOCKWAVE_RADIUS);
                projectile.apply_force(away / distance * force);
            }
        }
    }

    if items.magnet {
        for projectile in &mut state.projectiles {
            let toward = player.pos - projectile.pos;
            let distance = toward.length();
            if distance > 0.0 && distance < MAGNET_RADIUS {
                let force = MAGNET_FORCE * (1.0 - distance / MAGNET_RADIUS);
                projectile.apply_force(toward / distance * force);
            }
        }
    }

    if items.bomb_clear {
        for projectile in &mut state.projectiles {
            projectile.finish();
        }
        recycle_done(state);
    }

    if items.laser_column {
        for projectile in &mut state.projectiles {
            if (projectile.pos.x - player.pos.x).abs() < LASER_HALF_WIDTH
                && projectile.pos.y < player.pos.y
            {
                projectile.finish();
            }
        }
        recycle_done(state);
    }
}

/// Detonate explosives whose fuse ran out, split splitting projectiles, and
/// drop anything that left the arena. Consumed instances go back to the pool.
fn resolve_detonations(state: &mut SimState) {
    let mut spawned: Vec<Projectile> = Vec::new();

    let mut i = 0;
    while i < state.projectiles.len() {
        if state.projectiles[i].should_explode() {
            let pos = state.projectiles[i].pos;
            let spec = state.projectiles[i].explosion_spec();

            for _ in 0..spec.particles {
                let angle = state.rng.random::<f32>() * std::f32::consts::TAU;
                let speed = 1.0 + state.rng.random::<f32>() * 4.0;
                let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
                state.spawn_particle(pos, vel, 30.0, 5.0, ParticleKind::Spark);
            }
            for ring in 0..spec.rings {
                let size = spec.ring_size + ring as f32 * 20.0;
                state.spawn_particle(
                    pos,
                    Vec2::ZERO,
                    35.0 + ring as f32 * 10.0,
                    size,
                    ParticleKind::ExplosionRing,
                );
            }
            for f in 0..spec.fragments {
                let angle = std::f32::consts::TAU * f as f32 / spec.fragments as f32;
                let speed = 2.0 + state.rng.random::<f32>() * 1.5;
                let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
                let mut fragment = state
                    .projectile_pool
                    .acquire_with(|| Projectile::spawn(Vec2::ZERO, Vec2::ZERO, ProjectileKind::Fragment));
                fragment.reset(pos, vel, ProjectileKind::Fragment);
                fragment.force_active();
                spawned.push(fragment);
            }

            let spent = state.projectiles.swap_remove(i);
            state.projectile_pool.release(spent);
            continue;
        }

        if state.projectiles[i].should_split() {
            state.projectiles[i].mark_split();
            let pos = state.projectiles[i].pos;
            for vel in state.projectiles[i].split_velocities() {
                let mut child = state
                    .projectile_pool
                    .acquire_with(|| Projectile::spawn(Vec2::ZERO, Vec2::ZERO, ProjectileKind::Fast));
                child.reset(pos, vel, ProjectileKind::Fast);
                spawned.push(child);
            }
            // The split consumes the parent
            let spent = state.projectiles.swap_remove(i);
            state.projectile_pool.release(spent);
            continue;
        }

        if state.projectiles[i].is_offscreen(&state.arena) {
            let gone = state.projectiles.swap_remove(i);
            state.projectile_pool.release(gone);
            continue;
        }

        i += 1;
    }

    state.projectiles.append(&mut spawned);
}

/// Narrow-phase collisions at the player with the fixed precedence chain,
/// then graze classification for the candidates that missed. Returns the
/// terminal outcome if the player dies.
fn resolve_player_collisions(
    state: &mut SimState,
    input: &TickInput,
    player: &PlayerView,
) -> Option<TickOutcome> {
    // Copy out of the grid scratch buffer: the projectile list is mutated
    // during the sweep below.
    let candidates: Vec<u32> = state.grid.query_neighborhood(player.pos).to_vec();

    let graze_radius = state.tuning.graze_radius * input.upgrades.graze_radius;
    let close_call_radius = state.tuning.close_call_radius * input.upgrades.graze_radius;
    let perfect_radius = state.tuning.perfect_dodge_radius;

    for &index in &candidates {
        let index = index as usize;
        let projectile = &state.projectiles[index];
        if !projectile.is_active() {
            continue;
        }

        if projectile.collides_with(player.pos, player.radius) {
            // Fixed precedence: invincibility > dash > perfect-dodge
            // i-frames > shield > lucky dodge > death
            if input.items.invincibility || input.items.dash {
                continue;
            }
            if state.perfect_dodge_iframes > 0.0 {
                continue;
            }
            if state.shield_active {
                state.shield_active = false;
                state.projectiles[index].finish();
                spawn_burst(state, player.pos, 15, ParticleKind::Spark);
                continue;
            }
            if input.upgrades.lucky_dodge_chance > 0.0
                && state.rng.random::<f32>() < input.upgrades.lucky_dodge_chance
            {
                state.projectiles[index].finish();
                spawn_burst(state, player.pos, 8, ParticleKind::Spark);
                continue;
            }
            log::info!("player killed by projectile at tick {}", state.time_ticks);
            state.events.push(GameEvent::PlayerDeath);
            spawn_burst(state, player.pos, 20, ParticleKind::Spark);
            return Some(TickOutcome::PlayerDeath);
        }

        // Near miss: classify the graze tier, once per projectile lifetime
        let distance = state.projectiles[index].pos.distance(player.pos);
        if state.projectiles[index].has_grazed() || distance >= graze_radius {
            continue;
        }

        let tier = if distance < perfect_radius {
            GrazeTier::PerfectDodge
        } else if distance < close_call_radius {
            GrazeTier::CloseCall
        } else {
            GrazeTier::Normal
        };
        state.projectiles[index].mark_grazed();

        let tier_index = tier as usize;
        let value = GRAZE_VALUES[tier_index];
        let money_bonus = (GRAZE_MONEY[tier_index] * input.contract.money_multiplier) as u32;

        if tier == GrazeTier::PerfectDodge {
            state.perfect_dodge_iframes = state.tuning.perfect_dodge_iframes;
        }

        let milestone = state.combo.add_combo(
            value,
            tier == GrazeTier::CloseCall,
            tier == GrazeTier::PerfectDodge,
        );
        state.events.push(GameEvent::Graze {
            tier,
            value,
            money_bonus,
        });
        if let Some(milestone) = milestone {
            log::debug!("combo milestone: {}", milestone.message());
            state.events.push(GameEvent::ComboMilestone(milestone));
        }
    }

    None
}

/// Sweep projectiles consumed this tick back into the pool
fn recycle_done(state: &mut SimState) {
    let mut i = 0;
    while i < state.projectiles.len() {
        if state.projectiles[i].is_done() {
            let spent = state.projectiles.swap_remove(i);
            state.projectile_pool.release(spent);
        } else {
            i += 1;
        }
    }
}

fn spawn_burst(state: &mut SimState, pos: Vec2, count: u32, kind: ParticleKind) {
    for _ in 0..count {
        let angle = state.rng.random::<f32>() * std::f32::consts::TAU;
        let speed = 1.0 + state.rng.random::<f32>() * 3.0;
        let vel = Vec2::new(angle.cos(), angle.sin()) * speed;
        state.spawn_particle(pos, vel, 25.0, 5.0, kind);
    }
}
