//! Hazard catalog
//!
//! The closed set of things that can sit in a lane, and the rule that decides
//! whether the player survives touching each of them.

use serde::{Deserialize, Serialize};

use super::lane::Lane;

/// Hazard types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    /// Full-height block: never survivable
    Solid,
    /// Low barrier: must be airborne above the clearance height
    JumpBarrier,
    /// High barrier: must be rolling underneath
    DuckBarrier,
    /// Collectible, never fatal
    Coin,
}

/// Reflex needed to get past a barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Reflex {
    #[default]
    None,
    Jump,
    Duck,
}

/// What the player body looks like at the moment of contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPose {
    /// Height above the base
    pub height: f32,
    pub rolling: bool,
}

/// Result of touching a hazard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Passed over/under it
    Survived,
    /// Picked up a coin
    Collected,
    Fatal,
}

impl HazardKind {
    /// Row placement weights for the non-safe lanes: (kind, weight out of 100)
    pub const ROW_WEIGHTS: [(HazardKind, u32); 3] = [
        (HazardKind::JumpBarrier, 25),
        (HazardKind::DuckBarrier, 25),
        (HazardKind::Solid, 50),
    ];

    /// Coins are not obstacles
    #[inline]
    pub fn is_obstacle(self) -> bool {
        self != HazardKind::Coin
    }

    /// Reflex this hazard asks for, if any
    pub fn reflex(self) -> Reflex {
        match self {
            HazardKind::JumpBarrier => Reflex::Jump,
            HazardKind::DuckBarrier => Reflex::Duck,
            HazardKind::Solid | HazardKind::Coin => Reflex::None,
        }
    }

    /// Survival rule, identical for manual and autopilot control
    pub fn resolve(self, pose: ContactPose, jump_clearance: f32) -> Contact {
        match self {
            HazardKind::Coin => Contact::Collected,
            HazardKind::JumpBarrier if pose.height > jump_clearance => Contact::Survived,
            HazardKind::DuckBarrier if pose.rolling => Contact::Survived,
            HazardKind::JumpBarrier | HazardKind::DuckBarrier | HazardKind::Solid => Contact::Fatal,
        }
    }

    /// Pick a kind from a roll in `0..100` using `ROW_WEIGHTS`
    pub fn from_roll(roll: u32) -> Self {
        let mut acc = 0;
        for (kind, weight) in Self::ROW_WEIGHTS {
            acc += weight;
            if roll < acc {
                return kind;
            }
        }
        HazardKind::Solid
    }
}

/// A hazard or coin in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub kind: HazardKind,
    pub lane: Lane,
    /// Signed distance from the player; negative is ahead
    pub z: f32,
    /// Cleared once collected; never set again
    pub active: bool,
}

impl Hazard {
    pub fn new(id: u32, kind: HazardKind, lane: Lane, z: f32) -> Self {
        Self {
            id,
            kind,
            lane,
            z,
            active: true,
        }
    }

    /// Positive distance ahead of the player (negative once passed)
    #[inline]
    pub fn distance_ahead(&self) -> f32 {
        -self.z
    }

    /// Mark as spent
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CLEARANCE: f32 = 1.0;

    fn pose(height: f32, rolling: bool) -> ContactPose {
        ContactPose { height, rolling }
    }

    #[test]
    fn test_row_weights_sum_to_100() {
        let total: u32 = HazardKind::ROW_WEIGHTS.iter().map(|(_, w)| w).sum();
        assert_eq!(total, 100);
        assert_eq!(HazardKind::from_roll(0), HazardKind::JumpBarrier);
        assert_eq!(HazardKind::from_roll(24), HazardKind::JumpBarrier);
        assert_eq!(HazardKind::from_roll(25), HazardKind::DuckBarrier);
        assert_eq!(HazardKind::from_roll(50), HazardKind::Solid);
        assert_eq!(HazardKind::from_roll(99), HazardKind::Solid);
    }

    #[test]
    fn test_coin_always_collected() {
        assert_eq!(HazardKind::Coin.resolve(pose(0.0, false), CLEARANCE), Contact::Collected);
        assert_eq!(HazardKind::Coin.resolve(pose(3.0, false), CLEARANCE), Contact::Collected);
    }

    #[test]
    fn test_deactivate_is_permanent() {
        let mut hazard = Hazard::new(1, HazardKind::Coin, Lane::Center, -5.0);
        assert!(hazard.active);
        hazard.deactivate();
        hazard.deactivate();
        assert!(!hazard.active);
        assert_eq!(hazard.distance_ahead(), 5.0);
    }

    proptest! {
        #[test]
        fn prop_jump_barrier_needs_clearance(height in -1.0f32..5.0, rolling in any::<bool>()) {
            let outcome = HazardKind::JumpBarrier.resolve(pose(height, rolling), CLEARANCE);
            prop_assert_eq!(outcome == Contact::Survived, height > CLEARANCE);
        }

        #[test]
        fn prop_duck_barrier_needs_roll(height in -1.0f32..5.0, rolling in any::<bool>()) {
            let outcome = HazardKind::DuckBarrier.resolve(pose(height, rolling), CLEARANCE);
            prop_assert_eq!(outcome == Contact::Survived, rolling);
        }

        #[test]
        fn prop_solid_always_fatal(height in -1.0f32..50.0, rolling in any::<bool>()) {
            let outcome = HazardKind::Solid.resolve(pose(height, rolling), CLEARANCE);
            prop_assert_eq!(outcome, Contact::Fatal);
        }
    }
}
