//! Obstacle and coin rows
//!
//! Rows are emitted at the spawn line whenever the previous row has travelled
//! far enough toward the player. The minimum gap grows with speed, and each
//! row keeps one lane open that is at most one step away from the previous
//! row's open lane, so a path through the field always exists.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::hazard::HazardKind;
use super::lane::Lane;
use super::state::GameState;
use crate::tuning::Tuning;

/// Row bookkeeping carried between ticks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spawner {
    /// Open lane of the last emitted row
    pub prev_safe_lane: Lane,
    /// Current z of the last emitted row (moves with the world)
    pub last_row_z: Option<f32>,
}

/// One generated row
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub safe_lane: Lane,
    pub placements: Vec<(Lane, HazardKind)>,
}

impl Spawner {
    /// Move the row marker along with the world
    pub fn advance(&mut self, speed: f32) {
        if let Some(z) = self.last_row_z.as_mut() {
            *z += speed;
        }
    }

    /// True once the last row is at least `gap` in front of the spawn line
    pub fn ready(&self, spawn_z: f32, gap: f32) -> bool {
        match self.last_row_z {
            None => true,
            Some(z) => z - spawn_z >= gap,
        }
    }
}

/// Roll the contents of a row given the previous open lane
pub fn plan_row(rng: &mut Pcg32, prev_safe_lane: Lane, tuning: &Tuning) -> Row {
    let candidates: Vec<Lane> = prev_safe_lane.with_neighbours().collect();
    let safe_lane = candidates[rng.random_range(0..candidates.len())];

    let mut placements = Vec::with_capacity(Lane::ALL.len());
    for lane in Lane::ALL {
        if lane == safe_lane {
            if rng.random_bool(tuning.coin_chance) {
                placements.push((lane, HazardKind::Coin));
            }
        } else if rng.random_bool(tuning.hazard_chance) {
            let kind = HazardKind::from_roll(rng.random_range(0..100));
            placements.push((lane, kind));
        }
    }

    Row {
        safe_lane,
        placements,
    }
}

/// Emit the next row if the gap condition allows it
pub fn spawn_row(state: &mut GameState) -> Option<Row> {
    let spawn_z = -state.tuning.spawn_distance;
    let gap = state.tuning.min_row_gap(state.speed);
    if !state.spawner.ready(spawn_z, gap) {
        return None;
    }

    let row = plan_row(&mut state.rng, state.spawner.prev_safe_lane, &state.tuning);
    for &(lane, kind) in &row.placements {
        state.add_hazard(kind, lane, spawn_z);
    }
    state.spawner.prev_safe_lane = row.safe_lane;
    state.spawner.last_row_z = Some(spawn_z);
    state.stats.rows_spawned += 1;

    log::debug!(
        "Row {} at z={:.1} (gap {:.1}): safe={:?} {:?}",
        state.stats.rows_spawned,
        spawn_z,
        gap,
        row.safe_lane,
        row.placements
    );
    Some(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    #[test]
    fn test_safe_lane_is_never_blocked() {
        let tuning = Tuning {
            hazard_chance: 1.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let mut prev = Lane::Center;
        for _ in 0..500 {
            let row = plan_row(&mut rng, prev, &tuning);
            assert!((row.safe_lane.index() - prev.index()).abs() <= 1);
            for (lane, kind) in &row.placements {
                if *lane == row.safe_lane {
                    assert_eq!(*kind, HazardKind::Coin);
                } else {
                    assert!(kind.is_obstacle());
                }
            }
            // Every other lane is filled at hazard_chance = 1
            let obstacles = row.placements.iter().filter(|(_, k)| k.is_obstacle()).count();
            assert_eq!(obstacles, 2);
            prev = row.safe_lane;
        }
    }

    #[test]
    fn test_kind_mix_roughly_weighted() {
        let tuning = Tuning {
            hazard_chance: 1.0,
            coin_chance: 0.0,
            ..Default::default()
        };
        let mut rng = Pcg32::seed_from_u64(11);
        let mut solids = 0;
        let mut total = 0;
        for _ in 0..2000 {
            for (_, kind) in plan_row(&mut rng, Lane::Center, &tuning).placements {
                total += 1;
                if kind == HazardKind::Solid {
                    solids += 1;
                }
            }
        }
        let ratio = solids as f32 / total as f32;
        assert!((0.45..0.55).contains(&ratio), "solid ratio {ratio}");
    }

    #[test]
    fn test_first_row_spawns_immediately() {
        let mut state = GameState::new(1, Tuning::default());
        assert!(spawn_row(&mut state).is_some());
        assert_eq!(state.spawner.last_row_z, Some(-state.tuning.spawn_distance));
        // Gap not yet open
        assert!(spawn_row(&mut state).is_none());
    }

    proptest! {
        #[test]
        fn prop_rows_respect_speed_gap(seed in any::<u64>(), speed in 0.2f32..2.0) {
            let mut state = GameState::new(seed, Tuning::default());
            state.speed = speed;
            let spawn_z = -state.tuning.spawn_distance;
            spawn_row(&mut state);
            for _ in 0..2000 {
                state.spawner.advance(state.speed);
                let prev_z = state.spawner.last_row_z.unwrap();
                if spawn_row(&mut state).is_some() {
                    prop_assert!(prev_z - spawn_z >= state.tuning.min_row_gap(state.speed));
                }
            }
        }
    }
}
