//! Graze/dodge combo scoring
//!
//! Combo count grows with every graze, decays to zero on a countdown, and
//! feeds a multiplier used by the score collaborator. Milestones fire a
//! one-shot announcement with an escalating audio cue index.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Combo thresholds that trigger an announcement
const MILESTONES: [u32; 7] = [10, 25, 50, 100, 200, 500, 1000];
const MILESTONE_MESSAGES: [&str; 7] = [
    "NICE!",
    "GREAT!",
    "AMAZING!",
    "INCREDIBLE!",
    "LEGENDARY!",
    "GODLIKE!",
    "IMPOSSIBLE!",
];
/// Combo levels beyond this stop raising the base multiplier
const MULTIPLIER_CAP: u32 = 50;
const MULTIPLIER_PER_LEVEL: f64 = 0.05;
const CLOSE_CALL_BONUS: f64 = 0.02;
const PERFECT_DODGE_BONUS: f64 = 0.05;

/// A milestone crossing, reported once per upward crossing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub index: u32,
    /// Audio cue pitch, rising with the milestone tier
    pub cue_pitch: f32,
}

impl Milestone {
    pub fn message(&self) -> &'static str {
        MILESTONE_MESSAGES[self.index as usize % MILESTONE_MESSAGES.len()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboTracker {
    combo: u32,
    max_combo: u32,
    timer: f32,
    /// Current timeout, recomputed each update from the duration multiplier
    timeout: f32,
    base_timeout: f32,
    multiplier: f64,
    close_call_count: u32,
    perfect_dodge_count: u32,
    total_graze_value: u32,
    announcement: Option<Milestone>,
    announcement_timer: f32,
    announcement_duration: f32,
}

impl ComboTracker {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            combo: 0,
            max_combo: 0,
            timer: 0.0,
            timeout: tuning.combo_timeout,
            base_timeout: tuning.combo_timeout,
            multiplier: 1.0,
            close_call_count: 0,
            perfect_dodge_count: 0,
            total_graze_value: 0,
            announcement: None,
            announcement_timer: 0.0,
            announcement_duration: tuning.announcement_duration,
        }
    }

    /// Register a graze. Returns the milestone crossed this call, if any:
    /// the highest threshold with `previous < m <= new` fires exactly once.
    pub fn add_combo(&mut self, value: u32, close_call: bool, perfect_dodge: bool) -> Option<Milestone> {
        let previous = self.combo;
        self.combo += value;
        self.total_graze_value += value;

        if close_call {
            self.close_call_count += 1;
        }
        if perfect_dodge {
            self.perfect_dodge_count += 1;
        }

        self.max_combo = self.max_combo.max(self.combo);
        self.timer = self.timeout;

        for (i, &threshold) in MILESTONES.iter().enumerate().rev() {
            if self.combo >= threshold && previous < threshold {
                let milestone = Milestone {
                    index: i as u32,
                    cue_pitch: 1.0 + i as f32 * 0.15,
                };
                self.announcement = Some(milestone);
                self.announcement_timer = self.announcement_duration;
                return Some(milestone);
            }
        }
        None
    }

    /// Advance the countdown and recompute the multiplier. A timeout performs
    /// a full reset (count, tiers, multiplier) in the same tick.
    pub fn update(&mut self, dt: f32, duration_multiplier: f32) {
        self.timeout = self.base_timeout * duration_multiplier;

        if self.combo > 0 {
            self.timer -= dt;
            if self.timer <= 0.0 {
                self.reset();
            }
        }

        let base = 1.0 + f64::from(self.combo.min(MULTIPLIER_CAP)) * MULTIPLIER_PER_LEVEL;
        self.multiplier = base
            + f64::from(self.close_call_count) * CLOSE_CALL_BONUS
            + f64::from(self.perfect_dodge_count) * PERFECT_DODGE_BONUS;

        if self.announcement_timer > 0.0 {
            self.announcement_timer -= dt;
            if self.announcement_timer <= 0.0 {
                self.announcement = None;
            }
        }
    }

    /// Drop the whole combo state back to neutral, atomically.
    pub fn reset(&mut self) {
        self.combo = 0;
        self.timer = 0.0;
        self.multiplier = 1.0;
        self.close_call_count = 0;
        self.perfect_dodge_count = 0;
        self.total_graze_value = 0;
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn close_call_count(&self) -> u32 {
        self.close_call_count
    }

    pub fn perfect_dodge_count(&self) -> u32 {
        self.perfect_dodge_count
    }

    pub fn total_graze_value(&self) -> u32 {
        self.total_graze_value
    }

    /// Pending announcement text for the HUD, if one is showing
    pub fn announcement(&self) -> Option<&'static str> {
        self.announcement.map(|m| m.message())
    }

    /// Fraction of the countdown remaining (HUD decay bar)
    pub fn timeout_progress(&self) -> f32 {
        if self.combo == 0 || self.timeout <= 0.0 {
            return 0.0;
        }
        self.timer / self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ComboTracker {
        ComboTracker::new(&Tuning::default())
    }

    #[test]
    fn test_multiplier_formula() {
        let mut combo = tracker();
        for _ in 0..10 {
            combo.add_combo(1, false, false);
        }
        combo.add_combo(2, true, false);
        combo.add_combo(5, false, true);
        combo.update(1.0, 1.0);
        // count 17 -> 1 + 17*0.05, plus 0.02 close call, plus 0.05 perfect
        assert!((combo.multiplier() - (1.0 + 17.0 * 0.05 + 0.02 + 0.05)).abs() < 1e-9);
    }

    #[test]
    fn test_multiplier_caps_at_fifty() {
        let mut combo = tracker();
        combo.add_combo(80, false, false);
        combo.update(1.0, 1.0);
        assert!((combo.multiplier() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_timeout_resets_count_and_multiplier_same_tick() {
        let mut combo = tracker();
        combo.add_combo(5, false, false);

        for _ in 0..179 {
            combo.update(1.0, 1.0);
        }
        assert_eq!(combo.combo(), 5);
        assert!(combo.multiplier() > 1.0);

        combo.update(1.0, 1.0);
        assert_eq!(combo.combo(), 0);
        assert!((combo.multiplier() - 1.0).abs() < 1e-9);
        assert_eq!(combo.close_call_count(), 0);
    }

    #[test]
    fn test_duration_multiplier_stretches_timeout() {
        let mut combo = tracker();
        combo.update(1.0, 2.0); // apply the stretched timeout first
        combo.add_combo(1, false, false);
        for _ in 0..359 {
            combo.update(1.0, 2.0);
        }
        assert_eq!(combo.combo(), 1);
        combo.update(1.0, 2.0);
        assert_eq!(combo.combo(), 0);
    }

    #[test]
    fn test_milestone_fires_once_then_again_after_reset() {
        let mut combo = tracker();
        for _ in 0..9 {
            assert_eq!(combo.add_combo(1, false, false), None);
        }
        let milestone = combo.add_combo(1, false, false).expect("crossing 10 fires");
        assert_eq!(milestone.message(), "NICE!");
        assert!((milestone.cue_pitch - 1.0).abs() < 1e-6);

        // Climbing past 10 again without dropping below does not refire
        assert_eq!(combo.add_combo(1, false, false), None);

        // Timeout reset, then re-reach 10: fires again
        for _ in 0..=180 {
            combo.update(1.0, 1.0);
        }
        assert_eq!(combo.combo(), 0);
        assert_eq!(combo.add_combo(10, false, false).map(|m| m.message()), Some("NICE!"));
    }

    #[test]
    fn test_big_jump_fires_highest_crossed_only() {
        let mut combo = tracker();
        let milestone = combo.add_combo(60, false, false).expect("crossed 10/25/50");
        assert_eq!(milestone.message(), "AMAZING!");
        assert!((milestone.cue_pitch - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_announcement_expires() {
        let mut combo = tracker();
        combo.add_combo(10, false, false);
        assert_eq!(combo.announcement(), Some("NICE!"));
        for _ in 0..90 {
            combo.update(1.0, 1.0);
        }
        assert_eq!(combo.announcement(), None);
    }
}
