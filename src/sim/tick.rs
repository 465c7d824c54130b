//! Fixed timestep simulation tick
//!
//! Round loop: deferred work, the countdown/playing/ended phase machine,
//! contact resolution, AI and player control, and the field spawners.

use rand::Rng;

use super::combat::{award_score, resolve_contact};
use super::contact::Contact;
use super::movement::{ControlIntent, drive_ai, drive_player};
use super::schedule::Deferred;
use super::state::{
    ArenaState, GameEvent, GamePhase, Hazard, HazardKind, Pickup, PickupKind, RoundSummary,
};
use super::store::VehicleId;
use super::vehicle::{Control, Side};
use crate::angle_delta;

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player controls held this tick
    pub controls: ControlIntent,
    /// Overlaps reported by the physics substrate since the last tick
    pub contacts: Vec<Contact>,
    /// Idle/demo mode - autopilot drives the player car
    pub idle_mode: bool,
}

/// Advance the round by one fixed timestep of `dt` seconds
pub fn tick(state: &mut ArenaState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;
    state.time_ms += dt as f64 * 1000.0;

    run_deferred(state);

    match state.phase {
        GamePhase::Countdown { .. } => advance_countdown(state),
        GamePhase::Playing => {
            if resolve_contacts(state, &input.contacts) {
                return;
            }

            let controls = if input.idle_mode {
                autopilot_intent(state)
            } else {
                input.controls
            };
            drive_vehicles(state, &controls, dt);
            run_spawners(state, dt as f64 * 1000.0);

            check_round_end(state);
        }
        // Frozen: cars drift out on the substrate until the report fires
        GamePhase::Ended { .. } => {}
    }
}

/// Service every deferred task that has come due
fn run_deferred(state: &mut ArenaState) {
    let now = state.time_ms;
    while let Some(task) = state.scheduler.pop_due(now) {
        match task {
            Deferred::ExpireSpeed { .. }
            | Deferred::ExpireDamage { .. }
            | Deferred::ExpireOil { .. } => {
                state.effects.expire(task, &mut state.vehicles);
            }
            Deferred::DespawnPickup { pickup } => {
                if let Some(idx) = state.pickups.iter().position(|p| p.id == pickup) {
                    state.pickups.remove(idx);
                    state.push_event(GameEvent::PowerupExpired { pickup });
                }
            }
            Deferred::DespawnHazard { hazard } => {
                if let Some(idx) = state.hazards.iter().position(|h| h.id == hazard) {
                    state.hazards.remove(idx);
                    state.effects.forget_hazard(hazard);
                    state.push_event(GameEvent::HazardExpired { hazard });
                }
            }
            Deferred::EnableHazards => {
                if state.phase == GamePhase::Playing {
                    log::debug!("Hazard spawner online");
                    state.hazard_spawner.running = true;
                }
            }
            Deferred::ReportResult => report_result(state),
        }
    }
}

fn advance_countdown(state: &mut ArenaState) {
    let GamePhase::Countdown {
        steps_left,
        next_step_at,
    } = state.phase
    else {
        return;
    };
    if state.time_ms < next_step_at {
        return;
    }

    let remaining = steps_left.saturating_sub(1);
    state.push_event(GameEvent::CountdownTick { remaining });
    if remaining == 0 {
        start_playing(state);
    } else {
        state.phase = GamePhase::Countdown {
            steps_left: remaining,
            next_step_at: next_step_at + state.tuning.round.countdown_step_ms,
        };
    }
}

fn start_playing(state: &mut ArenaState) {
    state.phase = GamePhase::Playing;
    for vehicle in state.vehicles.iter_mut() {
        vehicle.body.enabled = vehicle.is_alive();
    }
    state.powerup_spawner.running = true;
    let due = state.time_ms + state.tuning.round.hazard_start_delay_ms;
    state.scheduler.schedule(due, Deferred::EnableHazards);
    log::info!("GO! {} opponents on the field", state.ai_alive());
}

/// Apply this tick's contacts in order. Returns true once the round is
/// decided; remaining contacts are then dropped.
fn resolve_contacts(state: &mut ArenaState, contacts: &[Contact]) -> bool {
    let now = state.time_ms;
    for contact in contacts {
        match *contact {
            Contact::Vehicles(a, b) => {
                resolve_contact(
                    &mut state.vehicles,
                    a,
                    b,
                    now,
                    &state.tuning.combat,
                    &state.tuning.scoring,
                    &mut state.events,
                );
            }
            Contact::Pickup(id, pickup) => collect_pickup(state, id, pickup),
            Contact::Hazard(id, hazard_id) => {
                let Some(hazard) = state.hazards.iter().find(|h| h.id == hazard_id).cloned() else {
                    continue;
                };
                let Some(vehicle) = state.vehicles.get_mut(id) else {
                    continue;
                };
                state.effects.apply_hazard(
                    vehicle,
                    &hazard,
                    now,
                    &state.tuning,
                    &mut state.scheduler,
                    &mut state.rng,
                    &mut state.events,
                );
            }
        }
        if check_round_end(state) {
            return true;
        }
    }
    false
}

fn collect_pickup(state: &mut ArenaState, id: VehicleId, pickup: u32) {
    let now = state.time_ms;
    let Some(idx) = state.pickups.iter().position(|p| p.id == pickup) else {
        // Already taken by another car this tick
        return;
    };
    let Some(vehicle) = state.vehicles.get_mut(id) else {
        return;
    };
    let kind = state.pickups[idx].kind;
    if !state
        .effects
        .apply_pickup(vehicle, kind, now, &state.tuning, &mut state.scheduler)
    {
        return;
    }

    state.pickups.remove(idx);
    state.events.push(GameEvent::PowerupCollected { id, kind });
    if vehicle.is_player() {
        let points = state.tuning.scoring.powerup;
        award_score(vehicle, points, now, &state.tuning.scoring, &mut state.events);
    }
}

/// Refresh AI targets and write control commands for every live car
fn drive_vehicles(state: &mut ArenaState, controls: &ControlIntent, dt: f32) {
    let now = state.time_ms;
    let player_pos = state
        .player()
        .filter(|p| p.is_alive())
        .map(|p| p.body.position);
    let wander_area = state.tuning.arena.bounds.inset(state.tuning.ai.wander_margin);

    for vehicle in state.vehicles.iter_mut() {
        if !vehicle.is_alive() {
            continue;
        }
        let target = match &mut vehicle.control {
            Control::Ai(brain) => {
                brain.update(now, player_pos, &wander_area, &state.tuning.ai, &mut state.rng);
                Some(brain.target)
            }
            Control::Player => None,
        };
        match target {
            Some(target) => drive_ai(vehicle, target, &state.tuning.ai),
            None => drive_player(vehicle, controls, &state.tuning.movement, dt),
        }
    }
}

fn run_spawners(state: &mut ArenaState, dt_ms: f64) {
    for _ in 0..state.powerup_spawner.advance(dt_ms) {
        spawn_powerup(state);
    }
    for _ in 0..state.hazard_spawner.advance(dt_ms) {
        spawn_hazard(state);
    }
}

fn spawn_powerup(state: &mut ArenaState) {
    if state.pickups.len() >= state.tuning.powerups.max_count {
        log::debug!("Power-up cap reached, skipping spawn");
        return;
    }
    let kind = PickupKind::ALL[state.rng.random_range(0..PickupKind::ALL.len())];
    let pos = state.tuning.arena.spawn_region().sample(&mut state.rng);
    let id = state.next_entity_id();
    let now = state.time_ms;

    state.pickups.push(Pickup {
        id,
        kind,
        pos,
        spawned_at: now,
    });
    let due = now + state.tuning.powerups.lifetime_ms;
    state.scheduler.schedule(due, Deferred::DespawnPickup { pickup: id });
    state.push_event(GameEvent::PowerupSpawned { pickup: id, kind, pos });
    log::info!("{} spawned at ({:.0}, {:.0})", kind.label(), pos.x, pos.y);
}

fn spawn_hazard(state: &mut ArenaState) {
    if state.hazards.len() >= state.tuning.hazards.max_count {
        log::debug!("Hazard cap reached, skipping spawn");
        return;
    }
    let kind = HazardKind::ALL[state.rng.random_range(0..HazardKind::ALL.len())];
    let pos = state.tuning.arena.spawn_region().sample(&mut state.rng);
    let id = state.next_entity_id();
    let now = state.time_ms;

    state.hazards.push(Hazard {
        id,
        kind,
        pos,
        spawned_at: now,
    });
    // Oil evaporates; pits and spikes stay for the round
    if kind == HazardKind::OilSlick {
        let due = now + state.tuning.hazards.oil_lifetime_ms;
        state.scheduler.schedule(due, Deferred::DespawnHazard { hazard: id });
    }
    state.push_event(GameEvent::HazardSpawned { hazard: id, kind, pos });
    log::info!("{} spawned at ({:.0}, {:.0})", kind.label(), pos.x, pos.y);
}

/// Decide the round if it is over. Player loss is checked first, so a
/// mutual wreck is a defeat.
fn check_round_end(state: &mut ArenaState) -> bool {
    if state.phase != GamePhase::Playing {
        return state.is_over();
    }
    if !state.player_alive() {
        end_round(state, false);
    } else if state.ai_alive() == 0 {
        end_round(state, true);
    }
    state.is_over()
}

fn end_round(state: &mut ArenaState, victory: bool) {
    state.phase = GamePhase::Ended { victory };
    state.powerup_spawner.running = false;
    state.hazard_spawner.running = false;

    let end_drag = state.tuning.round.end_drag;
    for vehicle in state.vehicles.iter_mut().filter(|v| v.is_alive()) {
        vehicle.body.halt_commands();
        vehicle.body.drag = end_drag;
    }

    let due = state.time_ms + state.tuning.round.report_delay_ms;
    state.scheduler.schedule(due, Deferred::ReportResult);
    log::info!(
        "Round over: {} ({} / {} destroyed)",
        if victory { "victory" } else { "defeat" },
        state.destroyed_count(),
        state.total_opponents
    );
}

fn report_result(state: &mut ArenaState) {
    let GamePhase::Ended { victory } = state.phase else {
        return;
    };
    let (score, player_name) = state
        .player()
        .map(|p| (p.score, p.name.clone()))
        .unwrap_or_default();
    let summary = RoundSummary {
        victory,
        score,
        destroyed: state.destroyed_count(),
        total_opponents: state.total_opponents,
        player_name,
    };
    state.push_event(GameEvent::RoundEnded(summary.clone()));
    state.summary = Some(summary);
}

/// Demo driver for the player car: ram the nearest opponent, detouring for
/// a power-up when one is closer than the target
pub fn autopilot_intent(state: &ArenaState) -> ControlIntent {
    let Some(player) = state.player().filter(|p| p.is_alive()) else {
        return ControlIntent::default();
    };
    let pos = player.body.position;

    let nearest_ai = state
        .vehicles
        .iter()
        .filter(|v| v.side == Side::Ai && v.is_alive())
        .map(|v| v.body.position)
        .min_by(|a, b| a.distance_squared(pos).total_cmp(&b.distance_squared(pos)));
    let nearest_pickup = state
        .pickups
        .iter()
        .map(|p| p.pos)
        .min_by(|a, b| a.distance_squared(pos).total_cmp(&b.distance_squared(pos)));

    let target = match (nearest_ai, nearest_pickup) {
        (Some(ai), Some(pickup)) if pickup.distance(pos) < ai.distance(pos) => pickup,
        (Some(ai), _) => ai,
        (None, Some(pickup)) => pickup,
        (None, None) => return ControlIntent::default(),
    };

    let to_target = target - pos;
    let desired = to_target.y.atan2(to_target.x);
    let diff = angle_delta(player.body.heading, desired);
    let dead_zone = state.tuning.ai.heading_dead_zone;
    ControlIntent {
        steer_left: diff < -dead_zone,
        steer_right: diff > dead_zone,
        throttle: true,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Roster;
    use crate::sim::body::{integrate_all, resolve_overlaps};
    use crate::sim::contact::detect_contacts;
    use crate::tuning::Tuning;
    use glam::Vec2;

    // Exactly representable step so clock arithmetic stays exact
    const DT: f32 = 1.0 / 64.0;

    fn new_round(seed: u64) -> ArenaState {
        ArenaState::new(seed, Tuning::default(), &Roster::default(), "fang")
    }

    fn run_until(state: &mut ArenaState, input: &TickInput, ms: f64) {
        while state.time_ms < ms {
            tick(state, input, DT);
        }
    }

    fn start_round(seed: u64) -> ArenaState {
        let mut state = new_round(seed);
        let go = state.tuning.round.countdown_ms();
        run_until(&mut state, &TickInput::default(), go);
        assert_eq!(state.phase, GamePhase::Playing);
        state.drain_events();
        state
    }

    fn ai_ids(state: &ArenaState) -> Vec<VehicleId> {
        state
            .vehicles
            .iter()
            .filter(|v| v.side == Side::Ai)
            .map(|v| v.id)
            .collect()
    }

    fn wreck(state: &mut ArenaState, id: VehicleId) {
        state.vehicles.get_mut(id).unwrap().set_hp(0.0);
    }

    /// Full frame: integrate, collect contacts, tick, then separate
    fn frame(state: &mut ArenaState, idle_mode: bool) {
        integrate_all(&mut state.vehicles, &state.tuning.arena, DT);
        let input = TickInput {
            contacts: detect_contacts(state),
            idle_mode,
            ..Default::default()
        };
        tick(state, &input, DT);
        resolve_overlaps(&mut state.vehicles);
    }

    #[test]
    fn test_countdown_to_playing() {
        let mut state = new_round(1);
        state.drain_events();
        let throttle = TickInput {
            controls: ControlIntent {
                throttle: true,
                ..Default::default()
            },
            ..Default::default()
        };

        run_until(&mut state, &throttle, 2000.0);
        assert!(matches!(state.phase, GamePhase::Countdown { steps_left: 1, .. }));
        // Commands suppressed, bodies frozen
        assert!(state.vehicles.iter().all(|v| !v.body.enabled));
        assert!(state.vehicles.iter().all(|v| v.body.acceleration == Vec2::ZERO));

        run_until(&mut state, &throttle, 2400.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.vehicles.iter().all(|v| v.body.enabled));
        assert!(state.powerup_spawner.running);
        assert!(!state.hazard_spawner.running);

        let ticks: Vec<u32> = state
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::CountdownTick { remaining } => Some(remaining),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![2, 1, 0]);
    }

    #[test]
    fn test_hazards_start_after_delay() {
        let mut state = start_round(2);
        let go = state.time_ms;
        run_until(&mut state, &TickInput::default(), go + 3900.0);
        assert!(!state.hazard_spawner.running);
        run_until(&mut state, &TickInput::default(), go + 4000.0);
        assert!(state.hazard_spawner.running);
    }

    #[test]
    fn test_player_controls_drive_only_player() {
        let mut state = start_round(3);
        let input = TickInput {
            controls: ControlIntent {
                throttle: true,
                ..Default::default()
            },
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        let player = state.player().unwrap();
        // Facing up: throttle accelerates toward -y
        assert!(player.body.acceleration.y < 0.0);
        assert!(player.body.acceleration.x.abs() < 1e-3);
    }

    #[test]
    fn test_victory_requires_every_opponent() {
        let mut state = start_round(4);
        let ids = ai_ids(&state);
        for &id in &ids[..ids.len() - 1] {
            wreck(&mut state, id);
        }
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Playing);

        wreck(&mut state, ids[ids.len() - 1]);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Ended { victory: true });
        assert!(!state.powerup_spawner.running);
    }

    #[test]
    fn test_defeat_regardless_of_opponents() {
        let mut state = start_round(5);
        let player = state.player;
        wreck(&mut state, player);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Ended { victory: false });
        assert_eq!(state.ai_alive(), 4);
    }

    #[test]
    fn test_mutual_wreck_is_defeat() {
        let mut state = start_round(6);
        let ids = ai_ids(&state);
        for &id in &ids[1..] {
            wreck(&mut state, id);
        }
        let last = ids[0];
        let player = state.player;
        {
            let p = state.vehicles.get_mut(player).unwrap();
            p.set_hp(1.0);
            p.body.velocity = Vec2::new(200.0, 0.0);
        }
        {
            let ai = state.vehicles.get_mut(last).unwrap();
            ai.set_hp(1.0);
            ai.body.velocity = Vec2::new(-200.0, 0.0);
        }
        let input = TickInput {
            contacts: vec![Contact::Vehicles(player, last)],
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert_eq!(state.ai_alive(), 0);
        assert_eq!(state.phase, GamePhase::Ended { victory: false });
    }

    #[test]
    fn test_ramming_scores_and_wins() {
        let mut state = start_round(7);
        let ids = ai_ids(&state);
        for &id in &ids[1..] {
            wreck(&mut state, id);
        }
        let target = ids[0];
        let player = state.player;
        state.vehicles.get_mut(target).unwrap().set_hp(5.0);
        state.vehicles.get_mut(player).unwrap().body.velocity = Vec2::new(250.0, 0.0);
        state.vehicles.get_mut(target).unwrap().body.velocity = Vec2::ZERO;
        state.drain_events();

        let input = TickInput {
            contacts: vec![Contact::Vehicles(player, target)],
            ..Default::default()
        };
        tick(&mut state, &input, DT);

        assert_eq!(state.phase, GamePhase::Ended { victory: true });
        // HIT 10, then DESTROY inside the combo window: 100 * 1.5
        assert_eq!(state.player().unwrap().score, 160);

        let end = state.time_ms;
        run_until(&mut state, &TickInput::default(), end + 1700.0);
        assert!(state.summary.is_none());
        run_until(&mut state, &TickInput::default(), end + 1800.0);
        let summary = state.summary.clone().unwrap();
        assert!(summary.victory);
        assert_eq!(summary.score, 160);
        assert_eq!(summary.destroyed, 4);
        assert_eq!(summary.total_opponents, 4);
        assert!(state.drain_events().contains(&GameEvent::RoundEnded(summary)));
    }

    #[test]
    fn test_end_drains_acceleration() {
        let mut state = start_round(8);
        let throttle = TickInput {
            controls: ControlIntent {
                throttle: true,
                ..Default::default()
            },
            ..Default::default()
        };
        tick(&mut state, &throttle, DT);
        let player = state.player;
        wreck(&mut state, player);
        tick(&mut state, &throttle, DT);

        for v in state.vehicles.iter().filter(|v| v.is_alive()) {
            assert_eq!(v.body.acceleration, Vec2::ZERO);
            assert_eq!(v.body.angular_velocity, 0.0);
            assert_eq!(v.body.drag, state.tuning.round.end_drag);
        }
        // Further contacts are ignored once decided
        let hp_before: Vec<f32> = state.vehicles.iter().map(|v| v.hp()).collect();
        let ids = ai_ids(&state);
        for v in state.vehicles.iter_mut() {
            v.body.velocity = Vec2::new(300.0, 0.0);
        }
        state.vehicles.get_mut(ids[1]).unwrap().body.velocity = Vec2::new(-300.0, 0.0);
        let input = TickInput {
            contacts: vec![Contact::Vehicles(ids[0], ids[1])],
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        let hp_after: Vec<f32> = state.vehicles.iter().map(|v| v.hp()).collect();
        assert_eq!(hp_before, hp_after);
    }

    #[test]
    fn test_powerup_collection() {
        let mut state = start_round(9);
        let player = state.player;
        let id = state.next_entity_id();
        state.pickups.push(Pickup {
            id,
            kind: PickupKind::SpeedBoost,
            pos: Vec2::new(400.0, 480.0),
            spawned_at: state.time_ms,
        });

        let input = TickInput {
            contacts: vec![Contact::Pickup(player, id), Contact::Pickup(player, id)],
            ..Default::default()
        };
        tick(&mut state, &input, DT);

        assert!(state.pickups.is_empty());
        let p = state.player().unwrap();
        assert_eq!(p.speed_multiplier, 1.6);
        assert_eq!(p.score, 50);
        assert!((p.body.max_speed - p.stats.max_speed * 1.6).abs() < 1e-3);
        let collected = state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::PowerupCollected { .. }))
            .count();
        assert_eq!(collected, 1);

        let now = state.time_ms;
        run_until(&mut state, &TickInput::default(), now + 5000.0);
        assert_eq!(state.player().unwrap().speed_multiplier, 1.0);
    }

    #[test]
    fn test_ai_collects_without_scoring() {
        let mut state = start_round(10);
        let ai = ai_ids(&state)[0];
        let id = state.next_entity_id();
        state.pickups.push(Pickup {
            id,
            kind: PickupKind::Shield,
            pos: Vec2::ZERO,
            spawned_at: state.time_ms,
        });
        let input = TickInput {
            contacts: vec![Contact::Pickup(ai, id)],
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        let v = state.vehicles.get(ai).unwrap();
        assert_eq!(v.shield_hits, 2);
        assert_eq!(v.score, 0);
        assert_eq!(state.player().unwrap().score, 0);
    }

    #[test]
    fn test_hazard_debounced_across_ticks() {
        let mut state = start_round(11);
        let player = state.player;
        let id = state.next_entity_id();
        state.hazards.push(Hazard {
            id,
            kind: HazardKind::SpikeStrip,
            pos: Vec2::new(400.0, 480.0),
            spawned_at: state.time_ms,
        });
        let input = TickInput {
            contacts: vec![Contact::Hazard(player, id)],
            ..Default::default()
        };
        let full = state.player().unwrap().hp();

        tick(&mut state, &input, DT);
        assert_eq!(state.player().unwrap().hp(), full - 15.0);
        // Still overlapping well past the invulnerability window
        for _ in 0..50 {
            tick(&mut state, &input, DT);
        }
        assert_eq!(state.player().unwrap().hp(), full - 15.0);
        let triggered = state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::HazardTriggered { .. }))
            .count();
        assert_eq!(triggered, 1);
    }

    #[test]
    fn test_negative_oil_spin_tuning_is_usable() {
        let tuning = Tuning::load_or_default(r#"{ "hazards": { "oil_spin_deg": -10.0 } }"#);
        let mut state = ArenaState::new(11, tuning, &Roster::default(), "fang");
        let go = state.tuning.round.countdown_ms();
        run_until(&mut state, &TickInput::default(), go);
        assert_eq!(state.tuning.hazards.oil_spin_deg, 10.0);

        let player = state.player;
        let id = state.next_entity_id();
        state.hazards.push(Hazard {
            id,
            kind: HazardKind::OilSlick,
            pos: Vec2::new(400.0, 480.0),
            spawned_at: state.time_ms,
        });
        let input = TickInput {
            contacts: vec![Contact::Hazard(player, id)],
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        let vehicle = state.player().unwrap();
        assert_eq!(vehicle.drag_multiplier, 0.55);
        assert!(vehicle.spin.abs() <= 10f32.to_radians() + 1e-6);
    }

    #[test]
    fn test_spawners_respect_caps_and_lifetimes() {
        let mut state = start_round(12);
        let go = state.time_ms;
        let mut max_pickups = 0;
        let mut max_hazards = 0;
        while state.time_ms < go + 60_000.0 {
            tick(&mut state, &TickInput::default(), DT);
            max_pickups = max_pickups.max(state.pickups.len());
            max_hazards = max_hazards.max(state.hazards.len());
            let now = state.time_ms;
            assert!(state.pickups.iter().all(|p| now - p.spawned_at <= 15_000.0));
            assert!(
                state
                    .hazards
                    .iter()
                    .filter(|h| h.kind == HazardKind::OilSlick)
                    .all(|h| now - h.spawned_at <= 20_000.0)
            );
            let region = state.tuning.arena.spawn_region();
            assert!(state.pickups.iter().all(|p| region.contains(p.pos)));
        }
        assert!(max_pickups >= 1);
        assert!(max_pickups <= 3);
        assert!(max_hazards >= 1);
        assert!(max_hazards <= 4);

        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::PowerupExpired { .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::HazardSpawned { .. })));
    }

    #[test]
    fn test_autopilot_targets_opponent() {
        let mut state = start_round(13);
        let player = state.player;
        let ids = ai_ids(&state);
        for &id in &ids[1..] {
            wreck(&mut state, id);
        }
        // Opponent directly to the right of a car facing up
        let pos = state.player().unwrap().body.position;
        state.vehicles.get_mut(ids[0]).unwrap().body.position = pos + Vec2::new(200.0, 0.0);
        let intent = autopilot_intent(&state);
        assert!(intent.throttle);
        assert!(intent.steer_right);
        assert!(!intent.steer_left);

        wreck(&mut state, player);
        assert_eq!(autopilot_intent(&state), ControlIntent::default());
    }

    #[test]
    fn test_determinism() {
        // Two rounds with same seed should produce identical results
        let mut state1 = new_round(99999);
        let mut state2 = new_round(99999);

        for _ in 0..2000 {
            frame(&mut state1, true);
            frame(&mut state2, true);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.pickups, state2.pickups);
        assert_eq!(state1.hazards, state2.hazards);
        assert_eq!(state1.drain_events(), state2.drain_events());
        for (a, b) in state1.vehicles.iter().zip(state2.vehicles.iter()) {
            assert_eq!(a.body.position, b.body.position);
            assert_eq!(a.hp(), b.hp());
            assert_eq!(a.score, b.score);
        }
    }

    #[test]
    fn test_demo_round_stays_consistent() {
        let mut state = new_round(2024);
        for _ in 0..(64 * 120) {
            frame(&mut state, true);
            for v in state.vehicles.iter() {
                assert!(v.hp() >= 0.0 && v.hp() <= v.max_hp);
            }
            assert_eq!(state.destroyed_count() + state.ai_alive(), state.total_opponents);
            if state.summary.is_some() {
                break;
            }
        }
    }
}
