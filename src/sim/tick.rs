//! Fixed timestep simulation tick
//!
//! One call advances the run by exactly one logic frame, in a fixed order:
//! clock, world (segments, hazards, spawner), autopilot, player physics,
//! collisions.

use glam::Vec3;

use super::collision::resolve_contacts;
use super::navigator::{self, AiTelemetry, NavCommand};
use super::spawner::spawn_row;
use super::state::{DeathCause, GamePhase, GameState, ProxyCommand};

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// False when the run was not running and nothing advanced
    pub advanced: bool,
    pub score: u64,
    /// Set only on the tick the run ended
    pub game_over: Option<u64>,
    /// Present when the autopilot ran this tick
    pub telemetry: Option<AiTelemetry>,
}

/// Advance speed, distance and tick counters
fn advance_clock(state: &mut GameState) {
    let tuning = &state.tuning;
    state.time_ticks += 1;
    state.speed = (state.speed + tuning.speed_increment).clamp(tuning.base_speed, tuning.max_speed);
    state.distance += state.speed;

    state.stats.ticks = state.time_ticks;
    state.stats.distance = state.distance;
    state.stats.top_speed = state.stats.top_speed.max(state.speed);
}

/// Stream segments and hazards toward the player and drop what has passed
fn advance_world(state: &mut GameState) {
    let speed = state.speed;
    state
        .world
        .advance(speed, &state.tuning, &mut state.rng, &mut state.commands);

    for hazard in &mut state.hazards {
        hazard.z += speed;
    }
    state.spawner.advance(speed);

    let cutoff = state.tuning.trailing_cutoff;
    let commands = &mut state.commands;
    state.hazards.retain(|hazard| {
        let keep = hazard.z <= cutoff;
        if !keep && hazard.active {
            commands.push(ProxyCommand::DespawnHazard { id: hazard.id });
        }
        keep
    });

    spawn_row(state);
}

/// Apply autopilot commands through the same entry points manual input uses
fn apply_nav_commands(state: &mut GameState, commands: &[NavCommand]) {
    for command in commands {
        match command {
            NavCommand::ShiftLeft => {
                state.shift_lane(-1);
            }
            NavCommand::ShiftRight => {
                state.shift_lane(1);
            }
            NavCommand::Jump => {
                state.jump();
            }
            NavCommand::Roll => {
                state.roll();
            }
        }
    }
}

/// Advance the game state by one logic tick
pub fn tick(state: &mut GameState) -> TickReport {
    if state.phase != GamePhase::Running {
        return TickReport {
            score: state.score(),
            ..Default::default()
        };
    }

    advance_clock(state);
    advance_world(state);

    let mut telemetry = None;
    if state.autopilot {
        let decision = navigator::decide(state);
        apply_nav_commands(state, &decision.commands);
        telemetry = Some(decision.telemetry);
    }

    state.player.integrate(&state.tuning, state.autopilot);
    let lean = state.player.lean_angle(&state.tuning);
    state.commands.push(ProxyCommand::PlayerMoved {
        position: Vec3::new(state.player.pos.x, state.player.pos.y, 0.0),
        lean,
        rolling: state.player.is_rolling(),
    });

    let collisions = resolve_contacts(state);
    let mut game_over = None;
    if let Some((kind, lane)) = collisions.fatal {
        state.phase = GamePhase::GameOver;
        state.stats.death = Some(DeathCause {
            kind,
            lane,
            tick: state.time_ticks,
        });
        let final_score = state.score();
        log::info!(
            "Game over at tick {}: hit {:?} in {:?} lane, score {}",
            state.time_ticks,
            kind,
            lane,
            final_score
        );
        log::debug!("Run stats: {:?}", state.stats);
        game_over = Some(final_score);
    }

    if let Some(telemetry) = telemetry.as_mut() {
        telemetry.current_lane = state.player.current_lane(state.tuning.lane_width);
    }

    // Ensure deterministic ordering
    state.normalize_order();

    TickReport {
        advanced: true,
        score: state.score(),
        game_over,
        telemetry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hazard::HazardKind;
    use crate::sim::lane::Lane;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    /// Running state with empty rows and a constant speed
    fn scripted(speed: f32) -> GameState {
        let tuning = Tuning {
            base_speed: speed,
            speed_increment: 0.0,
            hazard_chance: 0.0,
            coin_chance: 0.0,
            ..Default::default()
        };
        let mut state = GameState::new(12345, tuning);
        state.phase = GamePhase::Running;
        state
    }

    #[test]
    fn test_idle_when_not_running() {
        let mut state = GameState::new(1, Tuning::default());
        let report = tick(&mut state);
        assert!(!report.advanced);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_clock_accelerates_to_cap() {
        let tuning = Tuning {
            speed_increment: 0.01,
            ..Default::default()
        };
        let max_speed = tuning.max_speed;
        let mut state = GameState::new(1, tuning);
        state.phase = GamePhase::Running;
        state.autopilot = true;
        let mut last = state.speed;
        for _ in 0..200 {
            tick(&mut state);
            if state.phase != GamePhase::Running {
                break;
            }
            assert!(state.speed >= last);
            assert!(state.speed <= max_speed);
            last = state.speed;
        }
        assert!(state.stats.top_speed > state.tuning.base_speed);
    }

    #[test]
    fn test_score_tracks_distance() {
        let mut state = scripted(0.5);
        for _ in 0..10 {
            tick(&mut state);
        }
        assert_eq!(state.distance, 5.0);
        assert_eq!(state.score(), 5);
        assert_eq!(state.stats.ticks, 10);
    }

    #[test]
    fn test_passed_hazards_are_culled() {
        let mut state = scripted(0.5);
        state.player.target_lane = Lane::Left;
        state.player.pos.x = Lane::Left.x(state.tuning.lane_width);
        let id = state.add_hazard(HazardKind::Solid, Lane::Right, -1.0);
        let needed = ((state.tuning.trailing_cutoff + 1.0) / 0.5) as usize + 2;
        for _ in 0..needed {
            tick(&mut state);
        }
        assert!(state.hazards.iter().all(|h| h.id != id));
        assert!(state.commands.contains(&ProxyCommand::DespawnHazard { id }));
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_coin_scenario() {
        let mut state = scripted(0.5);
        let id = state.add_hazard(HazardKind::Coin, Lane::Center, -5.0);
        for _ in 0..30 {
            tick(&mut state);
        }
        assert_eq!(state.bonus_score, state.tuning.coin_bonus);
        assert_eq!(state.stats.coins, 1);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.hazards.iter().filter(|h| h.id == id).all(|h| !h.active));
    }

    #[test]
    fn test_manual_jump_barrier_without_jump_is_fatal() {
        let mut state = scripted(0.6);
        state.add_hazard(HazardKind::JumpBarrier, Lane::Center, -10.0);
        let mut reports = Vec::new();
        for _ in 0..40 {
            reports.push(tick(&mut state));
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(reports.iter().filter(|r| r.game_over.is_some()).count(), 1);
        let death = state.stats.death.unwrap();
        assert_eq!(death.kind, HazardKind::JumpBarrier);
    }

    #[test]
    fn test_manual_jump_clears_barrier() {
        let mut state = scripted(0.6);
        state.add_hazard(HazardKind::JumpBarrier, Lane::Center, -10.0);
        // 10 units at 0.6/tick: jump with ~12 ticks to spare
        for _ in 0..4 {
            tick(&mut state);
        }
        assert!(state.jump());
        for _ in 0..60 {
            tick(&mut state);
        }
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.stats.jumps, 1);
    }

    #[test]
    fn test_autopilot_reflex_jump_scenario() {
        let mut state = scripted(0.6);
        state.autopilot = true;
        for lane in Lane::ALL {
            state.add_hazard(HazardKind::JumpBarrier, lane, -10.0);
        }
        let first = tick(&mut state);
        assert_eq!(first.telemetry.as_ref().map(|t| t.action), Some(navigator::AiAction::Jump));
        assert!(state.player.is_jumping());
        for _ in 0..60 {
            tick(&mut state);
        }
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_autopilot_dodges_solid_scenario() {
        let mut state = scripted(0.6);
        state.autopilot = true;
        state.add_hazard(HazardKind::Solid, Lane::Center, -40.0);
        for _ in 0..120 {
            tick(&mut state);
        }
        assert_eq!(state.phase, GamePhase::Running);
        assert_ne!(state.player.target_lane, Lane::Center);
        assert!(state.stats.lane_changes >= 1);
    }

    #[test]
    fn test_boxed_in_solid_ends_run() {
        let mut state = scripted(0.6);
        state.autopilot = true;
        for lane in Lane::ALL {
            state.add_hazard(HazardKind::Solid, lane, -12.0);
        }
        let mut game_overs = 0;
        for _ in 0..60 {
            if tick(&mut state).game_over.is_some() {
                game_overs += 1;
            }
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(game_overs, 1);
        assert_eq!(state.stats.death.map(|d| d.kind), Some(HazardKind::Solid));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_autopilot_runs_stay_legal(seed in any::<u64>()) {
            let mut state = GameState::new(seed, Tuning::default());
            state.phase = GamePhase::Running;
            state.autopilot = true;
            let mut lane = state.player.target_lane;
            for _ in 0..1500 {
                tick(&mut state);
                let next = state.player.target_lane;
                prop_assert!((next.index() - lane.index()).abs() <= 1);
                prop_assert!(!(state.player.is_jumping() && state.player.is_rolling()));
                lane = next;
                if state.phase != GamePhase::Running {
                    break;
                }
            }
        }
    }

    #[test]
    fn test_autopilot_late_reflex_scenario() {
        let mut state = scripted(0.8);
        state.autopilot = true;
        for lane in Lane::ALL {
            state.add_hazard(HazardKind::JumpBarrier, lane, -4.3);
        }
        let first = tick(&mut state);
        assert_eq!(first.telemetry.map(|t| t.action), Some(navigator::AiAction::Jump));
        for _ in 0..60 {
            tick(&mut state);
        }
        assert_eq!(state.phase, GamePhase::Running);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn prop_autopilot_clears_generated_barriers(seed in any::<u64>()) {
            let mut state = GameState::new(seed, Tuning::default());
            state.phase = GamePhase::Running;
            state.autopilot = true;
            for _ in 0..2000 {
                if !tick(&mut state).advanced {
                    break;
                }
            }
            let death = state.stats.death;
            prop_assert!(
                death.is_none_or(|d| d.kind == HazardKind::Solid),
                "seed {} died on {:?}",
                seed,
                death
            );
        }
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let run = || {
            let mut state = GameState::new(99999, Tuning::default());
            state.phase = GamePhase::Running;
            state.autopilot = true;
            for _ in 0..600 {
                tick(&mut state);
            }
            state
        };
        let a = run();
        let b = run();
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.hazards, b.hazards);
        assert_eq!(a.player, b.player);
        assert_eq!(a.stats, b.stats);
    }
}
