//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One logic tick per frame, fixed order
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies; visuals are requested through
//!   [`ProxyCommand`]s

pub mod analyzer;
pub mod collision;
pub mod engine;
pub mod hazard;
pub mod lane;
pub mod navigator;
pub mod player;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod world;

pub use analyzer::{LaneAnalysis, analyze_all, analyze_lane};
pub use collision::{CollisionResult, resolve_contacts};
pub use engine::{Engine, GameObserver};
pub use hazard::{Contact, ContactPose, Hazard, HazardKind, Reflex};
pub use lane::Lane;
pub use navigator::{AiAction, AiTelemetry, NavCommand, NavDecision};
pub use player::{MotionMode, Player};
pub use spawner::{Row, Spawner};
pub use state::{DeathCause, Decor, EffectKind, GamePhase, GameState, ProxyCommand, RunStats};
pub use tick::{TickReport, tick};
pub use world::{Segment, WorldRing};
