//! Per-lane lookahead scoring for the autopilot
//!
//! `analyze_lane` is a pure function of the hazard set, the candidate lane and
//! the player's current commitment. Higher scores are safer.

use serde::{Deserialize, Serialize};

use super::hazard::{Hazard, HazardKind, Reflex};
use super::lane::Lane;
use super::player::Player;
use crate::consts::{BLOCKED_SCORE, CLEAR_DISTANCE};
use crate::tuning::Tuning;

/// Lookahead summary for one lane, rebuilt every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneAnalysis {
    pub lane: Lane,
    pub score: f32,
    /// Distance to the nearest obstacle ahead (`CLEAR_DISTANCE` if none)
    pub nearest_threat: f32,
    /// Reflex the first barrier ahead needs
    pub required_action: Reflex,
    /// Distance to that barrier
    pub action_distance: f32,
    /// An obstacle sits right beside the player in this lane
    pub blocked_beside: bool,
    /// Distance to the nearest solid ahead (`CLEAR_DISTANCE` if none)
    pub nearest_solid: f32,
}

impl LaneAnalysis {
    fn empty(lane: Lane) -> Self {
        Self {
            lane,
            score: 0.0,
            nearest_threat: CLEAR_DISTANCE,
            required_action: Reflex::None,
            action_distance: CLEAR_DISTANCE,
            blocked_beside: false,
            nearest_solid: CLEAR_DISTANCE,
        }
    }
}

/// Score one lane against the current hazard set
pub fn analyze_lane(
    hazards: &[Hazard],
    lane: Lane,
    player: &Player,
    tuning: &Tuning,
) -> LaneAnalysis {
    let mut analysis = LaneAnalysis::empty(lane);

    // Everything in the lane from the lookahead horizon to just behind the player
    let mut scanned: Vec<&Hazard> = hazards
        .iter()
        .filter(|h| h.active && h.lane == lane)
        .filter(|h| h.z >= -tuning.lookahead && h.z < tuning.side_block_window)
        .collect();
    scanned.sort_by(|a, b| a.z.abs().total_cmp(&b.z.abs()));

    for hazard in scanned {
        let distance = hazard.distance_ahead();

        if hazard.kind.is_obstacle() && hazard.z.abs() < tuning.side_block_window {
            analysis.blocked_beside = true;
        }

        if hazard.kind == HazardKind::Coin {
            if distance >= 0.0 {
                analysis.score += tuning.coin_score;
            }
            continue;
        }

        if hazard.z >= 0.0 {
            // Already level with or behind the player: only matters for blocking
            continue;
        }

        analysis.nearest_threat = analysis.nearest_threat.min(distance);
        match hazard.kind {
            HazardKind::Solid => {
                analysis.score -= tuning.solid_penalty / distance.max(1.0);
                analysis.nearest_solid = analysis.nearest_solid.min(distance);
            }
            HazardKind::JumpBarrier | HazardKind::DuckBarrier => {
                analysis.score -= tuning.barrier_penalty;
                let reflex = hazard.kind.reflex();
                if analysis.required_action == Reflex::None {
                    analysis.required_action = reflex;
                    analysis.action_distance = distance;
                }
                let wrong_commitment = match reflex {
                    Reflex::Jump => player.is_rolling(),
                    Reflex::Duck => player.is_jumping(),
                    Reflex::None => false,
                };
                if wrong_commitment && distance < tuning.commit_window {
                    analysis.score -= tuning.commit_penalty;
                }
            }
            HazardKind::Coin => {}
        }
    }

    if lane == Lane::Center {
        analysis.score += tuning.center_bonus;
    }
    if analysis.blocked_beside {
        analysis.score = BLOCKED_SCORE;
    }
    analysis
}

/// Analysis of all three lanes, ordered by lane index
pub fn analyze_all(hazards: &[Hazard], player: &Player, tuning: &Tuning) -> [LaneAnalysis; 3] {
    Lane::ALL.map(|lane| analyze_lane(hazards, lane, player, tuning))
}
