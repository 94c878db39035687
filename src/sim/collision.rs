//! Contact detection and survival judgement
//!
//! A hazard touches the player when it is inside a short longitudinal window
//! and within the hitbox radius laterally. The same rule runs for manual and
//! autopilot play.

use glam::Vec3;

use super::hazard::{Contact, ContactPose, HazardKind};
use super::lane::Lane;
use super::state::{EffectKind, GameState, ProxyCommand};

/// Result of judging one tick of contacts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionResult {
    /// Coins picked up this tick
    pub coins: u32,
    /// Barriers passed over or under this tick
    pub survived: u32,
    /// The hazard that ended the run, if any
    pub fatal: Option<(HazardKind, Lane)>,
}

impl CollisionResult {
    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }
}

/// True when a hazard at `(hazard_x, z)` overlaps a player at `player_x`
#[inline]
pub fn in_contact(hazard_x: f32, z: f32, player_x: f32, half_depth: f32, hitbox: f32) -> bool {
    z.abs() < half_depth && (hazard_x - player_x).abs() < hitbox
}

/// Judge every active hazard against the player's current pose
pub fn resolve_contacts(state: &mut GameState) -> CollisionResult {
    let tuning = &state.tuning;
    let player_x = state.player.pos.x;
    let pose = ContactPose {
        height: state.player.height(),
        rolling: state.player.is_rolling(),
    };

    let mut result = CollisionResult::default();
    for hazard in state.hazards.iter_mut().filter(|h| h.active) {
        let hazard_x = hazard.lane.x(tuning.lane_width);
        if !in_contact(
            hazard_x,
            hazard.z,
            player_x,
            tuning.contact_half_depth,
            tuning.hitbox_radius,
        ) {
            continue;
        }

        match hazard.kind.resolve(pose, tuning.jump_clearance) {
            Contact::Collected => {
                hazard.deactivate();
                result.coins += 1;
                state.bonus_score += tuning.coin_bonus;
                state.commands.push(ProxyCommand::DespawnHazard { id: hazard.id });
                state.commands.push(ProxyCommand::SpawnEffect {
                    kind: EffectKind::CoinBurst,
                    position: Vec3::new(hazard_x, 1.0, hazard.z),
                });
            }
            Contact::Survived => result.survived += 1,
            Contact::Fatal => {
                if result.fatal.is_none() {
                    result.fatal = Some((hazard.kind, hazard.lane));
                    state.commands.push(ProxyCommand::SpawnEffect {
                        kind: EffectKind::Crash,
                        position: Vec3::new(player_x, state.player.pos.y, 0.0),
                    });
                }
            }
        }
    }
    state.stats.coins += result.coins;
    result
}
