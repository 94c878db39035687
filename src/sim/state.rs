//! Game state and core simulation types
//!
//! Everything the simulation mutates during a run lives in [`GameState`]; no
//! component keeps its own hidden state.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::hazard::{Hazard, HazardKind};
use super::lane::Lane;
use super::player::Player;
use super::spawner::Spawner;
use super::world::WorldRing;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Constructed, waiting for `start()`
    Ready,
    /// Ticking
    Running,
    /// Halted by `stop()`
    Stopped,
    /// Run ended on a fatal contact
    GameOver,
}

/// Roadside decoration rolled when a segment is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Decor {
    pub lamps: bool,
    pub trees: bool,
    pub buildings: bool,
}

/// Transient visual feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    CoinBurst,
    Crash,
}

/// World mutation for the presentation layer, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProxyCommand {
    /// Create the proxy for a ground segment
    PlaceSegment { index: usize, z: f32, decor: Decor },
    /// A segment wrapped to the far end with fresh decoration
    RecycleSegment { index: usize, z: f32, decor: Decor },
    SpawnHazard { id: u32, kind: HazardKind, position: Vec3 },
    DespawnHazard { id: u32 },
    SpawnEffect { kind: EffectKind, position: Vec3 },
    /// Player proxy transform for this frame
    PlayerMoved { position: Vec3, lean: f32, rolling: bool },
    /// Remove every proxy (run reset)
    ClearAll,
}

/// What ended the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathCause {
    pub kind: HazardKind,
    pub lane: Lane,
    pub tick: u64,
}

/// Per-run counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub ticks: u64,
    pub distance: f32,
    pub coins: u32,
    pub jumps: u32,
    pub rolls: u32,
    pub lane_changes: u32,
    pub rows_spawned: u32,
    pub top_speed: f32,
    pub death: Option<DeathCause>,
}

/// Complete simulation context for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// World units advanced per tick
    pub speed: f32,
    pub distance: f32,
    /// Points from pickups
    pub bonus_score: u64,
    pub player: Player,
    /// Active and recently spent hazards (sorted by id)
    pub hazards: Vec<Hazard>,
    pub world: WorldRing,
    pub spawner: Spawner,
    pub autopilot: bool,
    /// Ticks before the autopilot may make an optional lane change
    pub lane_cooldown: u32,
    pub stats: RunStats,
    /// Pending world mutations
    pub commands: Vec<ProxyCommand>,
    next_id: u32,
}

impl GameState {
    /// Create a fresh run with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut commands = Vec::new();
        let world = WorldRing::new(&tuning, &mut rng, &mut commands);
        Self {
            seed,
            rng,
            speed: tuning.base_speed,
            tuning,
            phase: GamePhase::Ready,
            time_ticks: 0,
            distance: 0.0,
            bonus_score: 0,
            player: Player::default(),
            hazards: Vec::new(),
            world,
            spawner: Spawner::default(),
            autopilot: false,
            lane_cooldown: 0,
            stats: RunStats::default(),
            commands,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Total score: distance points plus pickups
    pub fn score(&self) -> u64 {
        (self.distance * self.tuning.distance_score_factor).max(0.0).floor() as u64
            + self.bonus_score
    }

    /// Place a hazard directly (spawner and tests)
    pub fn add_hazard(&mut self, kind: HazardKind, lane: Lane, z: f32) -> u32 {
        let id = self.next_entity_id();
        let position = Vec3::new(lane.x(self.tuning.lane_width), 0.0, z);
        self.hazards.push(Hazard::new(id, kind, lane, z));
        self.commands.push(ProxyCommand::SpawnHazard { id, kind, position });
        id
    }

    /// Active hazards in one lane, nearest first
    pub fn hazards_in_lane(&self, lane: Lane) -> impl Iterator<Item = &Hazard> {
        let mut in_lane: Vec<&Hazard> = self
            .hazards
            .iter()
            .filter(|h| h.active && h.lane == lane)
            .collect();
        in_lane.sort_by(|a, b| a.z.abs().total_cmp(&b.z.abs()));
        in_lane.into_iter()
    }

    /// Move the target lane one step; clamped at the road edge
    pub fn shift_lane(&mut self, delta: i32) -> bool {
        let changed = self.player.shift(delta.signum());
        if changed {
            self.stats.lane_changes += 1;
        }
        changed
    }

    /// Jump if grounded
    pub fn jump(&mut self) -> bool {
        let started = self.player.jump(self.tuning.jump_impulse);
        if started {
            self.stats.jumps += 1;
        }
        started
    }

    /// Roll if grounded
    pub fn roll(&mut self) -> bool {
        let started = self.player.roll(self.tuning.roll_duration_ticks);
        if started {
            self.stats.rolls += 1;
        }
        started
    }

    /// Ensure hazards are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.hazards.sort_by_key(|h| h.id);
    }
}
