//! Player body: lane easing, jump arc and roll timer
//!
//! The motion mode is a single enum so jumping and rolling can never be active
//! at the same time.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::lane::Lane;
use crate::consts::BASE_HEIGHT;
use crate::tuning::Tuning;

/// Vertical motion mode
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MotionMode {
    #[default]
    Grounded,
    /// Airborne with the given vertical velocity
    Jumping { vy: f32 },
    /// Ducked under for the remaining ticks
    Rolling { remaining: u32 },
}

/// The player's runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// x = lateral offset, y = height of the feet
    pub pos: Vec2,
    /// Lane the player is heading for
    pub target_lane: Lane,
    pub motion: MotionMode,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(0.0, BASE_HEIGHT),
            target_lane: Lane::Center,
            motion: MotionMode::Grounded,
        }
    }
}

impl Player {
    /// Lane the body is currently in (nearest lane centre)
    pub fn current_lane(&self, lane_width: f32) -> Lane {
        Lane::nearest(self.pos.x, lane_width)
    }

    #[inline]
    pub fn is_jumping(&self) -> bool {
        matches!(self.motion, MotionMode::Jumping { .. })
    }

    #[inline]
    pub fn is_rolling(&self) -> bool {
        matches!(self.motion, MotionMode::Rolling { .. })
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.motion == MotionMode::Grounded
    }

    /// Height above the base
    #[inline]
    pub fn height(&self) -> f32 {
        self.pos.y - BASE_HEIGHT
    }

    /// Move the target one or more lanes over, clamped at the edges.
    /// Returns true if the target changed.
    pub fn shift(&mut self, delta: i32) -> bool {
        let next = self.target_lane.offset(delta);
        let changed = next != self.target_lane;
        self.target_lane = next;
        changed
    }

    /// Start a jump; no-op unless grounded
    pub fn jump(&mut self, impulse: f32) -> bool {
        if !self.is_grounded() {
            return false;
        }
        self.motion = MotionMode::Jumping { vy: impulse };
        true
    }

    /// Start a roll; no-op unless grounded
    pub fn roll(&mut self, duration_ticks: u32) -> bool {
        if !self.is_grounded() {
            return false;
        }
        self.motion = MotionMode::Rolling {
            remaining: duration_ticks,
        };
        true
    }

    /// Advance lateral and vertical motion by one tick
    pub fn integrate(&mut self, tuning: &Tuning, autopilot: bool) {
        // Lateral easing toward the target lane centre
        let target_x = self.target_lane.x(tuning.lane_width);
        let ease = if autopilot {
            tuning.lane_ease_autopilot
        } else {
            tuning.lane_ease
        };
        self.pos.x += (target_x - self.pos.x) * ease;
        if (target_x - self.pos.x).abs() < tuning.lane_snap_epsilon {
            self.pos.x = target_x;
        }

        match self.motion {
            MotionMode::Grounded => {}
            MotionMode::Jumping { vy } => {
                self.pos.y += vy;
                let vy = vy - tuning.gravity;
                if self.pos.y <= BASE_HEIGHT {
                    // Landed: no tunnelling below the base
                    self.pos.y = BASE_HEIGHT;
                    self.motion = MotionMode::Grounded;
                } else {
                    self.motion = MotionMode::Jumping { vy };
                }
            }
            MotionMode::Rolling { remaining } => {
                let remaining = remaining.saturating_sub(1);
                self.motion = if remaining == 0 {
                    MotionMode::Grounded
                } else {
                    MotionMode::Rolling { remaining }
                };
            }
        }
    }

    /// Visual lean into a lane change (radians)
    pub fn lean_angle(&self, tuning: &Tuning) -> f32 {
        let gap = self.target_lane.x(tuning.lane_width) - self.pos.x;
        (gap * tuning.lean_factor).clamp(-tuning.max_lean, tuning.max_lean)
    }
}
