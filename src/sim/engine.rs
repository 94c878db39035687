//! Run lifecycle, control surface and fixed-step driver
//!
//! The engine does not own a scheduler. A render loop, test harness or
//! headless driver calls [`Engine::tick`] (wall-clock delta) or
//! [`Engine::step`] (one logic frame) and drains world mutations afterwards.
//!
//! Queued [`ProxyCommand`]s accumulate in the state until
//! [`Engine::drain_commands`] is called; a host that never drains them grows
//! the queue without bound.

use super::navigator::AiTelemetry;
use super::state::{GamePhase, GameState, ProxyCommand};
use super::tick::{TickReport, tick};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::tuning::{Tuning, TuningError};

/// Callbacks fired synchronously from inside a tick
pub trait GameObserver {
    /// Every running tick
    fn on_score_change(&mut self, _score: u64) {}
    /// Exactly once per run
    fn on_game_over(&mut self, _final_score: u64) {}
    /// Every tick the autopilot is enabled
    fn on_telemetry(&mut self, _telemetry: &AiTelemetry) {}
}

/// Simulation core for one player
pub struct Engine {
    state: GameState,
    observer: Option<Box<dyn GameObserver>>,
    /// Wall time not yet consumed by whole logic steps
    accumulator: f32,
    base_seed: u64,
    runs: u64,
}

impl Engine {
    /// Validate the tuning and build an idle engine
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self {
            state: GameState::new(seed, tuning),
            observer: None,
            accumulator: 0.0,
            base_seed: seed,
            runs: 0,
        })
    }

    /// Install the observer, returning the previous one
    pub fn set_observer(
        &mut self,
        observer: Box<dyn GameObserver>,
    ) -> Option<Box<dyn GameObserver>> {
        self.observer.replace(observer)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for scripted scenarios and tooling
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn is_running(&self) -> bool {
        self.state.phase == GamePhase::Running
    }

    pub fn score(&self) -> u64 {
        self.state.score()
    }

    /// Seed the next run will use
    fn run_seed(&self) -> u64 {
        // Golden ratio hash keeps consecutive runs decorrelated
        self.base_seed
            .wrapping_add(self.runs.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Begin a fresh run. Score, speed, hazards and the player are reset;
    /// the autopilot setting carries over.
    pub fn start(&mut self) {
        let seed = self.run_seed();
        self.runs += 1;
        let autopilot = self.state.autopilot;
        let tuning = self.state.tuning.clone();

        let mut state = GameState::new(seed, tuning);
        state.commands.insert(0, ProxyCommand::ClearAll);
        state.autopilot = autopilot;
        state.phase = GamePhase::Running;
        self.state = state;
        self.accumulator = 0.0;

        log::info!("Run {} started with seed {} (autopilot={})", self.runs, seed, autopilot);
    }

    /// Halt ticking; a later `start()` begins a new run
    pub fn stop(&mut self) {
        if self.state.phase == GamePhase::Running {
            self.state.phase = GamePhase::Stopped;
            log::info!("Run {} stopped at score {}", self.runs, self.state.score());
        }
        self.accumulator = 0.0;
    }

    /// Run exactly one logic tick and notify the observer
    pub fn step(&mut self) -> TickReport {
        let report = tick(&mut self.state);
        if !report.advanced {
            return report;
        }
        if let Some(observer) = self.observer.as_mut() {
            observer.on_score_change(report.score);
            if let Some(final_score) = report.game_over {
                observer.on_game_over(final_score);
            }
            if let Some(telemetry) = report.telemetry.as_ref() {
                observer.on_telemetry(telemetry);
            }
        }
        if report.game_over.is_some() {
            self.accumulator = 0.0;
        }
        report
    }

    /// Consume `dt` seconds of wall time in fixed steps. Returns the number of
    /// logic ticks run.
    pub fn tick(&mut self, dt: f32) -> u32 {
        if !self.is_running() || !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.accumulator += dt.min(MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS && self.is_running() {
            self.step();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if !self.is_running() {
            self.accumulator = 0.0;
        }
        substeps
    }

    /// Pending world mutations since the last drain. Call once per frame;
    /// nothing else empties the queue.
    pub fn drain_commands(&mut self) -> Vec<ProxyCommand> {
        std::mem::take(&mut self.state.commands)
    }

    // === Control surface (manual input and tooling) ===

    pub fn shift_lane_left(&mut self) -> bool {
        self.is_running() && self.state.shift_lane(-1)
    }

    pub fn shift_lane_right(&mut self) -> bool {
        self.is_running() && self.state.shift_lane(1)
    }

    pub fn jump(&mut self) -> bool {
        self.is_running() && self.state.jump()
    }

    pub fn roll(&mut self) -> bool {
        self.is_running() && self.state.roll()
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        if self.state.autopilot != enabled {
            log::info!("Autopilot {}", if enabled { "engaged" } else { "released" });
        }
        self.state.autopilot = enabled;
        self.state.lane_cooldown = 0;
    }

    pub fn autopilot(&self) -> bool {
        self.state.autopilot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hazard::HazardKind;
    use crate::sim::lane::Lane;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorded {
        scores: Vec<u64>,
        game_overs: Vec<u64>,
        telemetry: Vec<AiTelemetry>,
    }

    struct Recorder(Rc<RefCell<Recorded>>);

    impl GameObserver for Recorder {
        fn on_score_change(&mut self, score: u64) {
            self.0.borrow_mut().scores.push(score);
        }
        fn on_game_over(&mut self, final_score: u64) {
            self.0.borrow_mut().game_overs.push(final_score);
        }
        fn on_telemetry(&mut self, telemetry: &AiTelemetry) {
            self.0.borrow_mut().telemetry.push(telemetry.clone());
        }
    }

    fn quiet_tuning() -> Tuning {
        Tuning {
            speed_increment: 0.0,
            hazard_chance: 0.0,
            coin_chance: 0.0,
            ..Default::default()
        }
    }

    fn recorded_engine(tuning: Tuning) -> (Engine, Rc<RefCell<Recorded>>) {
        let mut engine = Engine::new(7, tuning).unwrap();
        let log = Rc::new(RefCell::new(Recorded::default()));
        engine.set_observer(Box::new(Recorder(log.clone())));
        (engine, log)
    }

    #[test]
    fn test_rejects_bad_gravity_at_startup() {
        let tuning = Tuning {
            gravity: 0.0,
            ..Default::default()
        };
        assert!(Engine::new(1, tuning).is_err());
    }

    #[test]
    fn test_no_ticks_before_start_or_after_stop() {
        let (mut engine, log) = recorded_engine(quiet_tuning());
        assert_eq!(engine.tick(1.0), 0);
        assert!(!engine.step().advanced);
        assert!(!engine.jump());

        engine.start();
        assert!(engine.step().advanced);
        engine.stop();
        assert_eq!(engine.phase(), GamePhase::Stopped);
        assert_eq!(engine.tick(1.0), 0);
        assert_eq!(log.borrow().scores.len(), 1);
    }

    #[test]
    fn test_fixed_step_accumulates() {
        let (mut engine, _) = recorded_engine(quiet_tuning());
        engine.start();
        assert_eq!(engine.tick(SIM_DT * 0.5), 0);
        assert_eq!(engine.tick(SIM_DT * 0.6), 1);
        // Huge frame is capped
        assert!(engine.tick(10.0) <= MAX_SUBSTEPS);
        assert_eq!(engine.tick(f32::NAN), 0);
    }

    #[test]
    fn test_game_over_reported_once() {
        let (mut engine, log) = recorded_engine(quiet_tuning());
        engine.start();
        engine.state_mut().add_hazard(HazardKind::Solid, Lane::Center, -3.5);
        for _ in 0..50 {
            engine.step();
        }
        assert_eq!(engine.phase(), GamePhase::GameOver);
        let log = log.borrow();
        assert_eq!(log.game_overs.len(), 1);
        assert_eq!(log.game_overs[0], *log.scores.last().unwrap());
        assert!(log.telemetry.is_empty());
    }

    #[test]
    fn test_telemetry_only_with_autopilot() {
        let (mut engine, log) = recorded_engine(quiet_tuning());
        engine.start();
        engine.step();
        engine.set_autopilot(true);
        engine.step();
        engine.step();
        let log = log.borrow();
        assert_eq!(log.scores.len(), 3);
        assert_eq!(log.telemetry.len(), 2);
        assert!(log.telemetry.iter().all(|t| t.enabled));
    }

    #[test]
    fn test_restart_resets_run() {
        let (mut engine, _) = recorded_engine(Tuning::default());
        engine.set_autopilot(true);
        engine.start();
        for _ in 0..300 {
            engine.step();
        }
        engine.state_mut().add_hazard(HazardKind::Solid, Lane::Left, -0.5);
        engine.state_mut().add_hazard(HazardKind::Solid, Lane::Center, -0.5);
        engine.state_mut().add_hazard(HazardKind::Solid, Lane::Right, -0.5);
        engine.step();
        assert_eq!(engine.phase(), GamePhase::GameOver);

        engine.start();
        let state = engine.state();
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.score(), 0);
        assert_eq!(state.speed, state.tuning.base_speed);
        assert!(state.hazards.is_empty());
        assert_eq!(state.player, crate::sim::player::Player::default());
        assert_eq!(state.stats, crate::sim::state::RunStats::default());
        assert!(engine.autopilot());

        let commands = engine.drain_commands();
        assert_eq!(commands.first(), Some(&ProxyCommand::ClearAll));
        assert!(engine.drain_commands().is_empty());
    }

    #[test]
    fn test_commands_pile_up_until_drained() {
        let (mut engine, _) = recorded_engine(quiet_tuning());
        engine.start();
        engine.drain_commands();
        for _ in 0..5 {
            engine.step();
        }
        let pending = engine.state().commands.len();
        // One PlayerMoved per tick at least
        assert!(pending >= 5);
        assert_eq!(engine.drain_commands().len(), pending);
        assert!(engine.state().commands.is_empty());
    }

    #[test]
    fn test_manual_controls_clamp() {
        let (mut engine, _) = recorded_engine(quiet_tuning());
        engine.start();
        assert!(engine.shift_lane_left());
        assert!(!engine.shift_lane_left());
        assert_eq!(engine.state().player.target_lane, Lane::Left);
        assert!(engine.roll());
        assert!(!engine.jump());
    }
}
