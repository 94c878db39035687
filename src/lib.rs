//! Lane Runner - simulation core for an endless three-lane runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world, spawner, physics, collisions, autopilot)
//! - `tuning`: Data-driven game balance and physics constants

pub mod sim;
pub mod tuning;

pub use sim::{AiTelemetry, Engine, GameObserver, GamePhase, GameState, ProxyCommand};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one logic tick per 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest wall-clock delta accepted by the fixed-step driver
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Player feet rest here when grounded
    pub const BASE_HEIGHT: f32 = 0.0;

    /// Distance reported for a lane with nothing in it
    pub const CLEAR_DISTANCE: f32 = 9999.0;
    /// Score forced onto a lane that is blocked beside the player
    pub const BLOCKED_SCORE: f32 = -10_000.0;
}
