//! Autopilot
//!
//! Reads the lane analysis and issues the same lane/jump/roll commands a
//! human would. Two branches decide lane changes:
//! - emergency: a solid is about to hit, or the barrier ahead can no longer be
//!   passed, so take one step toward the best lane if the lane in between can
//!   be entered right now;
//! - optimization: drift toward a clearly better lane, gated by a cooldown so
//!   near-equal lanes do not cause flapping.
//!
//! Whether a barrier can still be passed is decided by rehearsing the player's
//! vertical motion on a copy of the body, so a lane is never entered when the
//! jump or roll it needs can no longer be started in time.
//!
//! Lane changes are always a single step. Jumps and rolls fire when the
//! barrier ahead is inside the reaction window, or later if starting now
//! still clears it.

use serde::{Deserialize, Serialize};

use super::analyzer::{LaneAnalysis, analyze_all};
use super::hazard::{Contact, ContactPose, HazardKind, Reflex};
use super::lane::Lane;
use super::player::Player;
use super::state::GameState;
use crate::consts::{BLOCKED_SCORE, CLEAR_DISTANCE};
use crate::tuning::Tuning;

/// Upper bound on ticks simulated when rehearsing the player's motion
const MAX_REHEARSAL_TICKS: u32 = 4096;

/// Commands the autopilot can issue through the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    ShiftLeft,
    ShiftRight,
    Jump,
    Roll,
}

/// Label shown on the telemetry overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AiAction {
    Run,
    Jump,
    Duck,
    Dodge,
    #[default]
    Scanning,
}

/// Read-only autopilot snapshot for the presentation layer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiTelemetry {
    pub enabled: bool,
    pub current_lane: Lane,
    pub target_lane: Lane,
    pub action: AiAction,
    /// Coarse 0..=100
    pub confidence: u8,
    pub nearest_threat_distance: f32,
    /// Ordered by lane index (left, centre, right)
    pub lane_scores: [f32; 3],
}

/// Everything decided in one autopilot tick
#[derive(Debug, Clone, PartialEq)]
pub struct NavDecision {
    pub commands: Vec<NavCommand>,
    pub emergency: bool,
    pub analyses: [LaneAnalysis; 3],
    pub telemetry: AiTelemetry,
}

/// How the first barrier of a lane gets passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Passage {
    /// No barrier, or the body's current motion already carries it through
    Clear,
    /// Start the reflex once at least `earliest` ticks (0 = this tick) have
    /// passed, before the contact ticks begin
    Fire { earliest: u32 },
    /// No reflex can be started in time
    Impossible,
}

/// Tick offsets (0 = this tick) at which a hazard `distance` ahead can touch
/// the body, widened by one tick on each side for speed drift
fn contact_ticks(distance: f32, speed: f32, half_depth: f32) -> (u32, u32) {
    let first = ((distance - half_depth) / speed).floor().max(0.0) as u32;
    let last = ((distance + half_depth) / speed).ceil().max(0.0) as u32;
    (first, last)
}

/// Whether the body's pose survives the barrier that needs `reflex`
fn protected(body: &Player, reflex: Reflex, tuning: &Tuning) -> bool {
    let barrier = match reflex {
        Reflex::Jump => HazardKind::JumpBarrier,
        Reflex::Duck => HazardKind::DuckBarrier,
        Reflex::None => return true,
    };
    let pose = ContactPose {
        height: body.height(),
        rolling: body.is_rolling(),
    };
    barrier.resolve(pose, tuning.jump_clearance) == Contact::Survived
}

fn start_reflex(body: &mut Player, reflex: Reflex, tuning: &Tuning) -> bool {
    match reflex {
        Reflex::Jump => body.jump(tuning.jump_impulse),
        Reflex::Duck => body.roll(tuning.roll_duration_ticks),
        Reflex::None => false,
    }
}

/// Offsets after starting `reflex` from the ground during which it protects
fn reflex_span(reflex: Reflex, tuning: &Tuning) -> Option<(u32, u32)> {
    let mut body = Player::default();
    if !start_reflex(&mut body, reflex, tuning) {
        return None;
    }
    let mut span: Option<(u32, u32)> = None;
    for tick in 0..MAX_REHEARSAL_TICKS {
        body.integrate(tuning, true);
        if protected(&body, reflex, tuning) {
            span = Some(span.map_or((tick, tick), |(from, _)| (from, tick)));
        } else if span.is_some() || body.is_grounded() {
            break;
        }
    }
    span
}

/// Ticks until the body is back on the ground and can start a reflex
fn ticks_until_grounded(body: &Player, tuning: &Tuning) -> u32 {
    let mut ghost = body.clone();
    let mut ticks = 0;
    while !ghost.is_grounded() && ticks < MAX_REHEARSAL_TICKS {
        ghost.integrate(tuning, true);
        ticks += 1;
    }
    ticks
}

/// True when the body's current motion protects it at every offset in `first..=last`
fn motion_carries(body: &Player, reflex: Reflex, first: u32, last: u32, tuning: &Tuning) -> bool {
    if body.is_grounded() {
        return false;
    }
    let mut ghost = body.clone();
    for tick in 0..=last {
        ghost.integrate(tuning, true);
        if tick >= first && !protected(&ghost, reflex, tuning) {
            return false;
        }
        if ghost.is_grounded() {
            return false;
        }
    }
    true
}

/// Plan the reflex for the first barrier described by `analysis`
fn plan_passage(body: &Player, analysis: &LaneAnalysis, speed: f32, tuning: &Tuning) -> Passage {
    let reflex = analysis.required_action;
    if reflex == Reflex::None || speed <= 0.0 {
        return Passage::Clear;
    }
    let (first, last) = contact_ticks(analysis.action_distance, speed, tuning.contact_half_depth);
    if motion_carries(body, reflex, first, last, tuning) {
        return Passage::Clear;
    }
    let Some((cover_from, cover_to)) = reflex_span(reflex, tuning) else {
        return Passage::Impossible;
    };
    let earliest = ticks_until_grounded(body, tuning).max(last.saturating_sub(cover_to));
    match first.checked_sub(cover_from) {
        Some(latest) if earliest <= latest => Passage::Fire { earliest },
        _ => Passage::Impossible,
    }
}

/// Ticks until a body changing lanes is outside the hitbox of the lane it left
fn lane_exit_ticks(tuning: &Tuning) -> u32 {
    let mut body = Player::default();
    body.shift(1);
    let mut ticks = 0;
    while body.pos.x.abs() < tuning.hitbox_radius && ticks < MAX_REHEARSAL_TICKS {
        body.integrate(tuning, true);
        ticks += 1;
    }
    ticks
}

/// Best-scoring lane; ties keep the committed lane, then prefer the centre
fn best_lane(analyses: &[LaneAnalysis; 3], committed: Lane) -> LaneAnalysis {
    let mut best = analyses[committed.slot()];
    for lane in [Lane::Center, Lane::Left, Lane::Right] {
        let candidate = analyses[lane.slot()];
        if candidate.score > best.score {
            best = candidate;
        }
    }
    best
}

fn shift_command(from: Lane, to: Lane) -> Option<NavCommand> {
    match to.index() - from.index() {
        d if d < 0 => Some(NavCommand::ShiftLeft),
        d if d > 0 => Some(NavCommand::ShiftRight),
        _ => None,
    }
}

/// Run one autopilot tick. Only the lane-change cooldown is mutated; the
/// returned commands are applied by the caller through the control surface.
pub fn decide(state: &mut GameState) -> NavDecision {
    state.lane_cooldown = state.lane_cooldown.saturating_sub(1);

    let tuning = &state.tuning;
    let speed = state.speed;
    let body = &state.player;
    let mut analyses = analyze_all(&state.hazards, body, tuning);
    let passages = analyses.map(|analysis| plan_passage(body, &analysis, speed, tuning));
    // A barrier that can no longer be passed is as bad as a blocked lane
    for (analysis, passage) in analyses.iter_mut().zip(passages) {
        if passage == Passage::Impossible {
            analysis.score = BLOCKED_SCORE;
        }
    }
    let enterable = |lane: Lane| {
        !analyses[lane.slot()].blocked_beside && passages[lane.slot()] != Passage::Impossible
    };

    let committed = body.target_lane;
    let current = analyses[committed.slot()];
    let best = best_lane(&analyses, committed);

    // Leaving is unsafe while a barrier of the lane being left can still touch
    // the body before it clears that lane's hitbox
    let exit_ticks = lane_exit_ticks(tuning);
    let can_leave = [committed, body.current_lane(tuning.lane_width)]
        .into_iter()
        .all(|lane| {
            let analysis = &analyses[lane.slot()];
            passages[lane.slot()] == Passage::Clear
                || contact_ticks(analysis.action_distance, speed, tuning.contact_half_depth).0
                    >= exit_ticks
        });

    let imminent = speed * tuning.imminent_ticks;
    let stranded = passages[committed.slot()] == Passage::Impossible;
    let emergency = current.nearest_solid < imminent || stranded;

    let mut next_lane = committed;
    if emergency {
        state.lane_cooldown = 0;
        if best.lane != committed {
            let step = committed.step_toward(best.lane);
            let mid = analyses[step.slot()];
            let squeeze_ok =
                mid.nearest_solid > tuning.emergency_safe_distance || mid.score > current.score;
            if enterable(step) && squeeze_ok && can_leave {
                next_lane = step;
            } else {
                log::debug!(
                    "Emergency at tick {}: {:?} not enterable, holding {:?}",
                    state.time_ticks,
                    step,
                    committed
                );
            }
        }
    } else if state.lane_cooldown == 0
        && best.lane != committed
        && best.score > current.score + tuning.switch_margin
        && best.nearest_solid > tuning.comfortable_distance
        && enterable(best.lane)
        && can_leave
    {
        let step = committed.step_toward(best.lane);
        if enterable(step) {
            next_lane = step;
            state.lane_cooldown = tuning.switch_cooldown_ticks;
        }
    }

    let mut commands = Vec::new();
    if let Some(shift) = shift_command(committed, next_lane) {
        log::debug!(
            "Autopilot {:?} -> {:?} (emergency={}, score {:.1} -> {:.1})",
            committed,
            next_lane,
            emergency,
            current.score,
            analyses[next_lane.slot()].score
        );
        commands.push(shift);
    }

    // Reflex for the lane we are now heading into
    let lane = analyses[next_lane.slot()];
    let mut reflex = Reflex::None;
    if lane.required_action != Reflex::None && body.is_grounded() && speed > 0.0 {
        let time_to_impact = lane.action_distance / speed;
        let window = tuning.reaction_min_ticks..=tuning.reaction_max_ticks;
        let fire_now = passages[next_lane.slot()] == Passage::Fire { earliest: 0 };
        if window.contains(&time_to_impact)
            || (fire_now && time_to_impact < tuning.reaction_min_ticks)
        {
            reflex = lane.required_action;
            commands.push(match reflex {
                Reflex::Duck => NavCommand::Roll,
                _ => NavCommand::Jump,
            });
        }
    }

    let action = if next_lane != committed {
        AiAction::Dodge
    } else if reflex == Reflex::Jump || body.is_jumping() {
        AiAction::Jump
    } else if reflex == Reflex::Duck || body.is_rolling() {
        AiAction::Duck
    } else if lane.nearest_threat < CLEAR_DISTANCE {
        AiAction::Run
    } else {
        AiAction::Scanning
    };

    let confidence = if emergency {
        35
    } else if lane.score < 0.0 {
        70
    } else {
        95
    };

    let telemetry = AiTelemetry {
        enabled: true,
        current_lane: body.current_lane(tuning.lane_width),
        target_lane: next_lane,
        action,
        confidence,
        nearest_threat_distance: lane.nearest_threat,
        lane_scores: analyses.map(|a| a.score),
    };

    NavDecision {
        commands,
        emergency,
        analyses,
        telemetry,
    }
}
