//! Crash Derby headless driver
//!
//! Runs autopiloted rounds against the reference kinematics and logs the
//! event stream. Usage: `crash-derby [seed] [archetype] [tuning.json] [rounds]`

use crash_derby::consts::{MAX_SUBSTEPS, SIM_DT};
use crash_derby::sim::body::{integrate_all, resolve_overlaps};
use crash_derby::sim::{ArenaState, GameEvent, TickInput, VehicleId, detect_contacts, tick};
use crash_derby::{Roster, Tuning};

/// Simulated display refresh
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up on rounds that stall (three minutes of game time)
const MAX_FRAMES: u32 = 60 * 180;

fn load_tuning(path: Option<&str>) -> Tuning {
    let Some(path) = path else {
        return Tuning::default();
    };
    match std::fs::read_to_string(path) {
        Ok(json) => Tuning::load_or_default(&json),
        Err(e) => {
            log::warn!("Could not read tuning file {path}: {e}; using defaults");
            Tuning::default()
        }
    }
}

fn name_of(state: &ArenaState, id: VehicleId) -> &str {
    state.vehicles.get(id).map_or("?", |v| v.name.as_str())
}

fn log_event(state: &ArenaState, event: &GameEvent) {
    match event {
        GameEvent::CountdownTick { remaining: 0 } => log::info!("GO!"),
        GameEvent::CountdownTick { remaining } => log::info!("{remaining}..."),
        GameEvent::VehicleDamaged { id, amount } => {
            log::debug!("{} took {amount:.1}", name_of(state, *id))
        }
        GameEvent::ShieldBlocked { id } => {
            log::debug!("{} shield absorbed a hit", name_of(state, *id))
        }
        GameEvent::VehicleDestroyed { id } => log::info!("{} wrecked", name_of(state, *id)),
        GameEvent::ScoreAwarded { points, combo, .. } => log::info!("+{points} (combo x{combo})"),
        GameEvent::PowerupCollected { id, kind } => {
            log::info!("{} grabbed {}", name_of(state, *id), kind.label())
        }
        GameEvent::HazardTriggered { id, kind } => {
            log::info!("{} ran over {}", name_of(state, *id), kind.label())
        }
        GameEvent::RoundEnded(summary) => log::info!("Round ended: victory={}", summary.victory),
        other => log::trace!("{other:?}"),
    }
}

fn log_final_standings(state: &ArenaState) {
    for v in state.vehicles.iter() {
        let condition = if !v.is_alive() {
            "wrecked"
        } else if v.is_smoking() {
            "smoking"
        } else {
            "intact"
        };
        log::info!(
            "{:>8}: {:>5.1} hp, {condition}, speed {:.0}% {}",
            v.name,
            v.hp(),
            v.normalized_speed() * 100.0,
            v.status_label()
        );
    }
}

/// Play one round to its report; returns false if it never finished
fn play_round(state: &mut ArenaState) -> bool {
    let mut accumulator = 0.0_f32;

    for _ in 0..MAX_FRAMES {
        accumulator += FRAME_DT;
        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            integrate_all(&mut state.vehicles, &state.tuning.arena, SIM_DT);
            let input = TickInput {
                contacts: detect_contacts(state),
                idle_mode: true,
                ..Default::default()
            };
            tick(state, &input, SIM_DT);
            resolve_overlaps(&mut state.vehicles);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        for event in state.drain_events() {
            log_event(state, &event);
        }

        if let Some(summary) = &state.summary {
            log_final_standings(state);
            match serde_json::to_string_pretty(summary) {
                Ok(json) => println!("{json}"),
                Err(e) => log::error!("Failed to serialize round summary: {e}"),
            }
            return true;
        }
    }

    log::warn!(
        "Round still undecided after {} ticks ({} of {} opponents destroyed)",
        state.time_ticks,
        state.destroyed_count(),
        state.total_opponents
    );
    false
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let seed = args.get(1).and_then(|s| s.parse::<u64>().ok()).unwrap_or(42);
    let pick = args.get(2).map_or("fang", String::as_str);
    let tuning = load_tuning(args.get(3).map(String::as_str));
    let rounds = args.get(4).and_then(|s| s.parse::<u32>().ok()).unwrap_or(1).max(1);

    let roster = Roster::default();
    let mut state = ArenaState::new(seed, tuning, &roster, pick);
    for round in 1..=rounds {
        if round > 1 {
            log::info!("Rematch {round} of {rounds}");
            state.rematch(&roster, pick);
        }
        if !play_round(&mut state) {
            return;
        }
    }
}
