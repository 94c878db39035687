//! Lane Runner headless entry point
//!
//! Runs one autopilot session in a fixed-step loop and prints the run
//! statistics. Usage: `lane-runner [seed] [max_ticks]`. A JSON tuning override
//! can be supplied in `LANE_RUNNER_TUNING`.

use std::error::Error;

use lane_runner::sim::{AiTelemetry, Engine, GameObserver};
use lane_runner::tuning::Tuning;

const DEFAULT_SEED: u64 = 0x5EED;
const DEFAULT_MAX_TICKS: u64 = 60 * 60 * 5;

/// Logs milestones instead of drawing a HUD
#[derive(Default)]
struct LogObserver {
    next_milestone: u64,
    last_action: Option<lane_runner::sim::AiAction>,
}

impl GameObserver for LogObserver {
    fn on_score_change(&mut self, score: u64) {
        if score >= self.next_milestone {
            log::info!("Score {}", score);
            self.next_milestone = score + 1000;
        }
    }

    fn on_game_over(&mut self, final_score: u64) {
        log::info!("Game over, final score {}", final_score);
    }

    fn on_telemetry(&mut self, telemetry: &AiTelemetry) {
        if self.last_action != Some(telemetry.action) {
            log::debug!(
                "AI {:?} lane {:?}->{:?} conf {} threat {:.1} scores {:?}",
                telemetry.action,
                telemetry.current_lane,
                telemetry.target_lane,
                telemetry.confidence,
                telemetry.nearest_threat_distance,
                telemetry.lane_scores
            );
            self.last_action = Some(telemetry.action);
        }
    }
}

fn parse_arg<T: std::str::FromStr>(
    arg: Option<String>,
    default: T,
    name: &str,
) -> Result<T, String> {
    match arg {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("invalid {name}: {raw:?}")),
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let seed = parse_arg(args.next(), DEFAULT_SEED, "seed")?;
    let max_ticks = parse_arg(args.next(), DEFAULT_MAX_TICKS, "max_ticks")?;

    let tuning = match std::env::var("LANE_RUNNER_TUNING") {
        Ok(json) => {
            log::info!("Using tuning override from LANE_RUNNER_TUNING");
            Tuning::from_json(&json)?
        }
        Err(_) => Tuning::default(),
    };

    let mut engine = Engine::new(seed, tuning)?;
    engine.set_observer(Box::new(LogObserver::default()));
    engine.set_autopilot(true);
    engine.start();

    for _ in 0..max_ticks {
        if !engine.is_running() {
            break;
        }
        engine.tick(lane_runner::consts::SIM_DT);
        // Presentation layer would apply these to its proxies
        engine.drain_commands();
    }
    engine.stop();

    println!("{}", serde_json::to_string_pretty(&engine.state().stats)?);
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Lane Runner (headless) starting...");

    if let Err(err) = run() {
        log::error!("{}", err);
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
