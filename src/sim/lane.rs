//! Discrete three-lane coordinate system
//!
//! Lanes are `-1`, `0` and `1`. Continuous lateral position is
//! `lane * lane_width`; anything outside the three lanes is clamped, never wrapped.

use serde::{Deserialize, Serialize};

/// One of the three parallel paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "i8", from = "i8")]
pub enum Lane {
    Left,
    #[default]
    Center,
    Right,
}

impl Lane {
    /// All lanes ordered by lane index
    pub const ALL: [Lane; 3] = [Lane::Left, Lane::Center, Lane::Right];

    /// Clamp any integer onto a valid lane
    pub fn clamped(index: i32) -> Self {
        match index.clamp(-1, 1) {
            -1 => Lane::Left,
            0 => Lane::Center,
            _ => Lane::Right,
        }
    }

    /// Signed lane index in {-1, 0, 1}
    #[inline]
    pub fn index(self) -> i8 {
        match self {
            Lane::Left => -1,
            Lane::Center => 0,
            Lane::Right => 1,
        }
    }

    /// Position in `ALL` / telemetry score arrays
    #[inline]
    pub fn slot(self) -> usize {
        (self.index() + 1) as usize
    }

    /// Lateral offset of the lane centre
    #[inline]
    pub fn x(self, lane_width: f32) -> f32 {
        self.index() as f32 * lane_width
    }

    /// Lane whose centre is nearest to `x`
    pub fn nearest(x: f32, lane_width: f32) -> Self {
        if !x.is_finite() || lane_width <= 0.0 {
            return Lane::Center;
        }
        Self::clamped((x / lane_width).round() as i32)
    }

    /// Neighbouring lane `delta` steps away (clamped)
    pub fn offset(self, delta: i32) -> Self {
        Self::clamped(self.index() as i32 + delta)
    }

    /// One lane step from `self` toward `target` (self if already there)
    pub fn step_toward(self, target: Lane) -> Self {
        self.offset((target.index() - self.index()).signum() as i32)
    }

    /// Lanes reachable in at most one step, including this one
    pub fn with_neighbours(self) -> impl Iterator<Item = Lane> {
        [self.offset(-1), self, self.offset(1)]
            .into_iter()
            .enumerate()
            .filter(move |&(i, lane)| i == 1 || lane != self)
            .map(|(_, lane)| lane)
    }
}

impl From<Lane> for i8 {
    fn from(lane: Lane) -> Self {
        lane.index()
    }
}

impl From<i8> for Lane {
    fn from(index: i8) -> Self {
        Lane::clamped(index as i32)
    }
}
