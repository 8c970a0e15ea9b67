//! Headless demo runner
//!
//! Autoplays one boss encounter with a trivial dodge bot and prints a JSON
//! run summary. Useful for balance smoke-tests and for eyeballing the event
//! stream without a renderer:
//!
//! ```text
//! skyhammer [level] [seed] [max_ticks]
//! RUST_LOG=debug skyhammer 3 42 36000
//! ```

use glam::Vec2;
use serde::Serialize;

use skyhammer::consts::{ARENA_HEIGHT, ARENA_WIDTH, PLAYER_SIZE};
use skyhammer::sim::{Arena, GameEvent, PlayerView, SimState, TickInput, TickOutcome, tick};
use skyhammer::tuning::Tuning;

#[derive(Debug, Serialize)]
struct RunSummary {
    level: u32,
    seed: u64,
    ticks: u64,
    outcome: &'static str,
    grazes: u32,
    max_combo: u32,
    boss_health: u32,
    projectiles_live: usize,
}

/// Minimal bot: hug the bottom of the arena and drift away from the nearest
/// active projectile.
fn steer(state: &SimState, player: &mut Vec2) {
    let nearest = state
        .projectiles()
        .iter()
        .filter(|p| p.is_active())
        .min_by(|a, b| {
            a.pos
                .distance_squared(*player)
                .partial_cmp(&b.pos.distance_squared(*player))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some(threat) = nearest {
        let away = *player - threat.pos;
        if away.length_squared() > 0.0 && away.length() < 120.0 {
            *player += away.normalize() * 3.0;
        }
    }

    player.x = player.x.clamp(40.0, ARENA_WIDTH - 40.0);
    player.y = player.y.clamp(ARENA_HEIGHT * 0.6, ARENA_HEIGHT - 40.0);
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let level: u32 = args.next().and_then(|a| a.parse().ok()).unwrap_or(3);
    let seed: u64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(42);
    let max_ticks: u64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(18_000);

    let tuning = Tuning::load_or_default("tuning.json");
    let mut state = SimState::new(level, seed, Arena::default(), tuning);
    let mut player_pos = Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT * 0.85);

    let mut grazes = 0u32;
    let mut outcome_label = "timeout";

    for _ in 0..max_ticks {
        steer(&state, &mut player_pos);
        let input = TickInput {
            player: Some(PlayerView {
                pos: player_pos,
                vel: Vec2::ZERO,
                radius: PLAYER_SIZE / 2.0,
            }),
            ..Default::default()
        };

        let outcome = tick(&mut state, &input, 1.0);

        for event in state.events() {
            match event {
                GameEvent::Graze { tier, value, .. } => {
                    grazes += 1;
                    log::debug!("graze {tier:?} (+{value})");
                }
                GameEvent::ComboMilestone(m) => log::info!("combo milestone: {}", m.message()),
                GameEvent::BossHit { remaining_health } => {
                    log::info!("boss hit, {remaining_health} hp left");
                }
                _ => {}
            }
        }

        match outcome {
            Some(TickOutcome::PlayerDeath) => {
                outcome_label = "player_death";
                break;
            }
            Some(TickOutcome::BossDefeated) => {
                outcome_label = "boss_defeated";
                break;
            }
            None => {}
        }
    }

    let summary = RunSummary {
        level,
        seed,
        ticks: state.time_ticks,
        outcome: outcome_label,
        grazes,
        max_combo: state.combo().max_combo(),
        boss_health: state.boss().health(),
        projectiles_live: state.projectiles().len(),
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("failed to serialize run summary: {err}"),
    }
}
