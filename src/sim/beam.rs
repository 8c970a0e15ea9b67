//! Full-arena beam hazards
//!
//! A beam telegraphs along a vertical or horizontal strip, then fires for a
//! short burst. Beams bypass shields and lucky dodges: while firing they are
//! lethal unless invincibility or i-frames apply.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Telegraph duration before the beam fires
const WARNING_DURATION: f32 = 210.0;
/// Firing duration
const ACTIVE_DURATION: f32 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeamOrientation {
    /// Spans top to bottom at a fixed x
    Vertical,
    /// Spans left to right at a fixed y
    Horizontal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beam {
    /// X for vertical beams, y for horizontal
    pub position: f32,
    pub width: f32,
    pub orientation: BeamOrientation,
    warning_timer: f32,
    active_timer: f32,
    firing: bool,
}

impl Beam {
    pub fn new(position: f32, width: f32, orientation: BeamOrientation) -> Self {
        Self {
            position,
            width,
            orientation,
            warning_timer: WARNING_DURATION,
            active_timer: ACTIVE_DURATION,
            firing: false,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.warning_timer > 0.0 {
            self.warning_timer -= dt;
            if self.warning_timer <= 0.0 {
                self.firing = true;
            }
        } else if self.firing {
            self.active_timer -= dt;
            if self.active_timer <= 0.0 {
                self.firing = false;
            }
        }
    }

    pub fn is_firing(&self) -> bool {
        self.firing
    }

    pub fn is_done(&self) -> bool {
        self.warning_timer <= 0.0 && self.active_timer <= 0.0
    }

    /// Telegraph progress in [0, 1] for the HUD (0 = just spawned)
    pub fn warning_progress(&self) -> f32 {
        (1.0 - self.warning_timer / WARNING_DURATION).clamp(0.0, 1.0)
    }

    /// Perpendicular-distance hit test. Only meaningful while firing.
    pub fn collides_with(&self, player_pos: Vec2, player_radius: f32) -> bool {
        if !self.firing {
            return false;
        }
        let offset = match self.orientation {
            BeamOrientation::Vertical => player_pos.x - self.position,
            BeamOrientation::Horizontal => player_pos.y - self.position,
        };
        offset.abs() < self.width / 2.0 + player_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_phase_lifecycle() {
        let mut beam = Beam::new(400.0, 50.0, BeamOrientation::Vertical);
        assert!(!beam.is_firing());
        assert!(!beam.is_done());

        for _ in 0..210 {
            beam.update(1.0);
        }
        assert!(beam.is_firing());
        assert!(!beam.is_done());

        for _ in 0..45 {
            beam.update(1.0);
        }
        assert!(!beam.is_firing());
        assert!(beam.is_done());
    }

    #[test]
    fn test_no_collision_during_warning() {
        let beam = Beam::new(400.0, 50.0, BeamOrientation::Vertical);
        assert!(!beam.collides_with(Vec2::new(400.0, 300.0), 10.0));
    }

    #[test]
    fn test_vertical_hit_test_uses_x_only() {
        let mut beam = Beam::new(400.0, 50.0, BeamOrientation::Vertical);
        for _ in 0..210 {
            beam.update(1.0);
        }
        assert!(beam.collides_with(Vec2::new(410.0, 9999.0), 10.0));
        assert!(!beam.collides_with(Vec2::new(500.0, 300.0), 10.0));
    }

    #[test]
    fn test_horizontal_hit_test_uses_y_only() {
        let mut beam = Beam::new(600.0, 40.0, BeamOrientation::Horizontal);
        for _ in 0..210 {
            beam.update(1.0);
        }
        assert!(beam.collides_with(Vec2::new(-50.0, 615.0), 10.0));
        assert!(!beam.collides_with(Vec2::new(0.0, 700.0), 10.0));
    }
}
