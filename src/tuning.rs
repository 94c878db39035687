//! Game balance and physics tuning
//!
//! Every magic number the simulation and autopilot depend on lives here as a
//! named field so it can be overridden from JSON without recompiling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest jump the physics accepts (one minute at 60 Hz)
pub const MAX_AIRTIME_TICKS: f32 = 3600.0;

/// Errors raised when a tuning set would produce a broken simulation.
#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("{field} must be finite (got {value})")]
    NotFinite { field: &'static str, value: f32 },
    #[error("{field} must be greater than zero (got {value:.4})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },
    #[error("base speed {base:.3} exceeds max speed {max:.3}")]
    SpeedBounds { base: f32, max: f32 },
    #[error("reaction window invalid (min {min} > max {max})")]
    ReactionWindow { min: f32, max: f32 },
    #[error("jump apex {apex:.2} never clears barrier height {clearance:.2}")]
    JumpTooLow { apex: f32, clearance: f32 },
    #[error("hitbox radius {hitbox:.2} reaches the neighbouring lane at {lane_width:.2}")]
    HitboxOverlap { hitbox: f32, lane_width: f32 },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("jump stays airborne for {ticks:.0} ticks (limit {limit:.0})")]
    AirtimeTooLong { ticks: f32, limit: f32 },
    #[error("trailing cutoff {cutoff:.2} removes hazards inside the contact depth {half_depth:.2}")]
    CutoffInsideContact { cutoff: f32, half_depth: f32 },
    #[error("max speed {max_speed:.2} skips the contact window of depth {window:.2}")]
    Tunnelling { max_speed: f32, window: f32 },
    #[error("invalid tuning json: {0}")]
    Json(String),
}

/// Complete tuning set for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Lanes ===
    /// Lateral distance between lane centres
    pub lane_width: f32,
    /// Fraction of the remaining lateral gap closed per tick (manual control)
    pub lane_ease: f32,
    /// Fraction of the remaining lateral gap closed per tick (autopilot)
    pub lane_ease_autopilot: f32,
    /// Snap to the exact lane centre once this close
    pub lane_snap_epsilon: f32,
    /// Lean angle (radians) per unit of lateral gap, clamped to `max_lean`
    pub lean_factor: f32,
    pub max_lean: f32,

    // === Clock ===
    pub base_speed: f32,
    pub max_speed: f32,
    /// Speed added every tick until `max_speed`
    pub speed_increment: f32,
    /// Points per unit of distance travelled
    pub distance_score_factor: f32,

    // === Vertical motion ===
    pub jump_impulse: f32,
    pub gravity: f32,
    pub roll_duration_ticks: u32,

    // === Collision ===
    /// Hazard touches the player when |z| is below this
    pub contact_half_depth: f32,
    /// Hazard touches the player when its lateral gap is below this
    pub hitbox_radius: f32,
    /// Minimum height that clears a jump barrier
    pub jump_clearance: f32,
    pub coin_bonus: u64,
    /// Hazards behind the player past this z are removed
    pub trailing_cutoff: f32,

    // === World ===
    pub segment_length: f32,
    pub visibility_range: f32,
    pub visibility_buffer: f32,
    pub lamp_chance: f64,
    pub tree_chance: f64,
    pub building_chance: f64,

    // === Spawner ===
    /// Rows appear at z = -spawn_distance
    pub spawn_distance: f32,
    pub base_gap: f32,
    pub gap_speed_factor: f32,
    pub hazard_chance: f64,
    pub coin_chance: f64,

    // === Lane analysis ===
    pub lookahead: f32,
    pub side_block_window: f32,
    pub coin_score: f32,
    pub solid_penalty: f32,
    pub barrier_penalty: f32,
    pub commit_penalty: f32,
    pub commit_window: f32,
    pub center_bonus: f32,

    // === Navigator ===
    /// Emergency when the nearest solid is closer than speed * this many ticks
    pub imminent_ticks: f32,
    /// An intermediate lane is unconditionally safe when its nearest solid is past this
    pub emergency_safe_distance: f32,
    pub switch_margin: f32,
    pub comfortable_distance: f32,
    pub switch_cooldown_ticks: u32,
    pub reaction_min_ticks: f32,
    pub reaction_max_ticks: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lane_width: 2.5,
            lane_ease: 0.15,
            lane_ease_autopilot: 0.25,
            lane_snap_epsilon: 0.05,
            lean_factor: 0.12,
            max_lean: 0.3,

            base_speed: 0.5,
            max_speed: 1.2,
            speed_increment: 0.0001,
            distance_score_factor: 1.0,

            jump_impulse: 0.35,
            gravity: 0.015,
            roll_duration_ticks: 40,

            contact_half_depth: 1.0,
            hitbox_radius: 1.2,
            jump_clearance: 1.0,
            coin_bonus: 50,
            trailing_cutoff: 10.0,

            segment_length: 20.0,
            visibility_range: 160.0,
            visibility_buffer: 20.0,
            lamp_chance: 0.5,
            tree_chance: 0.4,
            building_chance: 0.3,

            spawn_distance: 120.0,
            base_gap: 20.0,
            gap_speed_factor: 20.0,
            hazard_chance: 0.85,
            coin_chance: 0.3,

            lookahead: 60.0,
            side_block_window: 3.0,
            coin_score: 5.0,
            solid_penalty: 1000.0,
            barrier_penalty: 15.0,
            commit_penalty: 200.0,
            commit_window: 15.0,
            center_bonus: 2.0,

            imminent_ticks: 25.0,
            emergency_safe_distance: 20.0,
            switch_margin: 10.0,
            comfortable_distance: 30.0,
            switch_cooldown_ticks: 20,
            reaction_min_ticks: 5.0,
            reaction_max_ticks: 20.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override on top of the defaults and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| TuningError::Json(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Number of segments the world ring needs to cover the visible road
    pub fn segment_count(&self) -> usize {
        ((self.visibility_range + self.visibility_buffer) / self.segment_length).ceil() as usize
    }

    /// Highest point of an undisturbed jump above the base height
    pub fn jump_apex(&self) -> f32 {
        if self.gravity <= 0.0 || !self.gravity.is_finite() || !self.jump_impulse.is_finite() {
            return f32::INFINITY;
        }
        if self.jump_impulse <= 0.0 {
            return 0.0;
        }
        // Sum of y += vy; vy -= g over the rising ticks, in closed form
        let (impulse, gravity) = (f64::from(self.jump_impulse), f64::from(self.gravity));
        let rising = (impulse / gravity).ceil();
        (rising * impulse - gravity * rising * (rising - 1.0) / 2.0) as f32
    }

    /// Approximate ticks from takeoff to landing
    pub fn jump_airtime(&self) -> f32 {
        2.0 * self.jump_impulse / self.gravity
    }

    /// Minimum longitudinal gap between consecutive rows at `speed`
    pub fn min_row_gap(&self, speed: f32) -> f32 {
        self.base_gap + speed * self.gap_speed_factor
    }

    /// Reject tunings that would break integration or the collision rules
    pub fn validate(&self) -> Result<(), TuningError> {
        let floats = [
            ("lane_width", self.lane_width),
            ("lane_ease", self.lane_ease),
            ("lane_ease_autopilot", self.lane_ease_autopilot),
            ("lane_snap_epsilon", self.lane_snap_epsilon),
            ("base_speed", self.base_speed),
            ("max_speed", self.max_speed),
            ("speed_increment", self.speed_increment),
            ("jump_impulse", self.jump_impulse),
            ("gravity", self.gravity),
            ("contact_half_depth", self.contact_half_depth),
            ("hitbox_radius", self.hitbox_radius),
            ("jump_clearance", self.jump_clearance),
            ("segment_length", self.segment_length),
            ("visibility_range", self.visibility_range),
            ("spawn_distance", self.spawn_distance),
            ("base_gap", self.base_gap),
            ("gap_speed_factor", self.gap_speed_factor),
            ("lookahead", self.lookahead),
            ("side_block_window", self.side_block_window),
            ("imminent_ticks", self.imminent_ticks),
            ("lean_factor", self.lean_factor),
            ("max_lean", self.max_lean),
            ("distance_score_factor", self.distance_score_factor),
            ("trailing_cutoff", self.trailing_cutoff),
            ("visibility_buffer", self.visibility_buffer),
            ("coin_score", self.coin_score),
            ("solid_penalty", self.solid_penalty),
            ("barrier_penalty", self.barrier_penalty),
            ("commit_penalty", self.commit_penalty),
            ("commit_window", self.commit_window),
            ("center_bonus", self.center_bonus),
            ("emergency_safe_distance", self.emergency_safe_distance),
            ("switch_margin", self.switch_margin),
            ("comfortable_distance", self.comfortable_distance),
            ("reaction_min_ticks", self.reaction_min_ticks),
            ("reaction_max_ticks", self.reaction_max_ticks),
        ];
        for (field, value) in floats {
            if !value.is_finite() {
                return Err(TuningError::NotFinite { field, value });
            }
        }

        let positives = [
            ("lane_width", self.lane_width),
            ("base_speed", self.base_speed),
            ("jump_impulse", self.jump_impulse),
            ("gravity", self.gravity),
            ("contact_half_depth", self.contact_half_depth),
            ("hitbox_radius", self.hitbox_radius),
            ("segment_length", self.segment_length),
            ("spawn_distance", self.spawn_distance),
            ("lookahead", self.lookahead),
        ];
        for (field, value) in positives {
            if value <= 0.0 {
                return Err(TuningError::NotPositive { field, value });
            }
        }
        let non_negatives = [
            ("speed_increment", self.speed_increment),
            ("visibility_buffer", self.visibility_buffer),
            ("base_gap", self.base_gap),
            ("gap_speed_factor", self.gap_speed_factor),
            ("side_block_window", self.side_block_window),
            ("imminent_ticks", self.imminent_ticks),
            ("solid_penalty", self.solid_penalty),
            ("barrier_penalty", self.barrier_penalty),
            ("commit_penalty", self.commit_penalty),
            ("commit_window", self.commit_window),
            ("emergency_safe_distance", self.emergency_safe_distance),
            ("switch_margin", self.switch_margin),
            ("comfortable_distance", self.comfortable_distance),
            ("reaction_min_ticks", self.reaction_min_ticks),
        ];
        for (field, value) in non_negatives {
            if value < 0.0 {
                return Err(TuningError::Negative { field, value });
            }
        }
        if self.roll_duration_ticks == 0 {
            return Err(TuningError::NotPositive {
                field: "roll_duration_ticks",
                value: 0.0,
            });
        }

        for (field, value) in [
            ("lane_ease", self.lane_ease),
            ("lane_ease_autopilot", self.lane_ease_autopilot),
        ] {
            if value <= 0.0 || value > 1.0 {
                return Err(TuningError::RangeViolation {
                    field,
                    min: 0.0,
                    max: 1.0,
                    value,
                });
            }
        }
        for (field, value) in [
            ("hazard_chance", self.hazard_chance),
            ("coin_chance", self.coin_chance),
            ("lamp_chance", self.lamp_chance),
            ("tree_chance", self.tree_chance),
            ("building_chance", self.building_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::RangeViolation {
                    field,
                    min: 0.0,
                    max: 1.0,
                    value: value as f32,
                });
            }
        }

        if self.base_speed > self.max_speed {
            return Err(TuningError::SpeedBounds {
                base: self.base_speed,
                max: self.max_speed,
            });
        }
        if self.reaction_min_ticks > self.reaction_max_ticks {
            return Err(TuningError::ReactionWindow {
                min: self.reaction_min_ticks,
                max: self.reaction_max_ticks,
            });
        }
        if self.hitbox_radius >= self.lane_width {
            return Err(TuningError::HitboxOverlap {
                hitbox: self.hitbox_radius,
                lane_width: self.lane_width,
            });
        }
        if self.trailing_cutoff < self.contact_half_depth {
            return Err(TuningError::CutoffInsideContact {
                cutoff: self.trailing_cutoff,
                half_depth: self.contact_half_depth,
            });
        }
        let window = 2.0 * self.contact_half_depth;
        if self.max_speed >= window {
            return Err(TuningError::Tunnelling {
                max_speed: self.max_speed,
                window,
            });
        }
        let airtime = self.jump_airtime();
        if airtime > MAX_AIRTIME_TICKS {
            return Err(TuningError::AirtimeTooLong {
                ticks: airtime,
                limit: MAX_AIRTIME_TICKS,
            });
        }
        let apex = self.jump_apex();
        if apex <= self.jump_clearance {
            return Err(TuningError::JumpTooLow {
                apex,
                clearance: self.jump_clearance,
            });
        }
        Ok(())
    }
}
