//! Collision combat resolution
//!
//! Two cars touching at speed both take damage proportional to their
//! relative speed. The player scores for hurting and wrecking AI cars, with
//! a combo multiplier for rapid consecutive scores.

use super::state::GameEvent;
use super::store::{VehicleId, VehicleStore};
use super::vehicle::{DamageOutcome, Side, Vehicle};
use crate::tuning::{CombatTuning, ScoringTuning};

/// What a car-to-car contact did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactOutcome {
    /// A car was already wrecked, or the handles are stale
    Ignored,
    /// Below the minimum collision speed
    SoftTap { relative_speed: f32 },
    Impact {
        relative_speed: f32,
        first: DamageOutcome,
        second: DamageOutcome,
    },
}

/// Apply damage through the shared shield/invulnerability path and report it
pub fn apply_damage(
    vehicle: &mut Vehicle,
    amount: f32,
    now: f64,
    tuning: &CombatTuning,
    events: &mut Vec<GameEvent>,
) -> DamageOutcome {
    let outcome = vehicle.take_damage(amount, now, tuning.invulnerability_ms);
    match outcome {
        DamageOutcome::Shielded => {
            log::debug!("{} blocked a hit ({} charges left)", vehicle.name, vehicle.shield_hits);
            events.push(GameEvent::ShieldBlocked { id: vehicle.id });
        }
        DamageOutcome::Applied { amount, destroyed } => {
            events.push(GameEvent::VehicleDamaged {
                id: vehicle.id,
                amount,
            });
            if destroyed {
                log::info!("{} destroyed", vehicle.name);
                events.push(GameEvent::VehicleDestroyed { id: vehicle.id });
            }
        }
        DamageOutcome::Ignored | DamageOutcome::Dead => {}
    }
    outcome
}

/// Credit `base` points through the combo rule; returns the points credited
pub fn award_score(
    vehicle: &mut Vehicle,
    base: u32,
    now: f64,
    tuning: &ScoringTuning,
    events: &mut Vec<GameEvent>,
) -> u64 {
    let in_window = vehicle
        .last_score_at
        .is_some_and(|last| now - last < tuning.combo_window_ms);
    vehicle.combo = if in_window { vehicle.combo + 1 } else { 0 };
    vehicle.last_score_at = Some(now);

    let multiplier = 1.0 + vehicle.combo as f64 * tuning.combo_multiplier;
    let points = (base as f64 * multiplier).round() as u64;
    vehicle.score += points;
    events.push(GameEvent::ScoreAwarded {
        id: vehicle.id,
        points,
        combo: vehicle.combo,
    });
    points
}

/// Resolve a contact notification between two cars
pub fn resolve_contact(
    vehicles: &mut VehicleStore,
    a: VehicleId,
    b: VehicleId,
    now: f64,
    combat: &CombatTuning,
    scoring: &ScoringTuning,
    events: &mut Vec<GameEvent>,
) -> ContactOutcome {
    let Some((first, second)) = vehicles.pair_mut(a, b) else {
        return ContactOutcome::Ignored;
    };
    if !first.is_alive() || !second.is_alive() {
        return ContactOutcome::Ignored;
    }

    let relative_speed = (first.body.velocity - second.body.velocity).length();
    if relative_speed < combat.min_collision_speed {
        return ContactOutcome::SoftTap { relative_speed };
    }

    let base = relative_speed * combat.collision_damage_factor;
    // Each side's multiplier scales the damage it deals, not what it takes
    let to_first = base * second.damage_multiplier;
    let to_second = base * first.damage_multiplier;
    log::debug!(
        "{} x {} at {:.0} px/s ({:.1} / {:.1})",
        first.name,
        second.name,
        relative_speed,
        to_first,
        to_second
    );

    let first_outcome = apply_damage(first, to_first, now, combat, events);
    let second_outcome = apply_damage(second, to_second, now, combat, events);

    credit_attacker(first, second, second_outcome, now, scoring, events);
    credit_attacker(second, first, first_outcome, now, scoring, events);

    ContactOutcome::Impact {
        relative_speed,
        first: first_outcome,
        second: second_outcome,
    }
}

/// Score the player for damage it dealt to an AI car
fn credit_attacker(
    attacker: &mut Vehicle,
    victim: &Vehicle,
    dealt: DamageOutcome,
    now: f64,
    scoring: &ScoringTuning,
    events: &mut Vec<GameEvent>,
) {
    if attacker.side != Side::Player || victim.side != Side::Ai {
        return;
    }
    if dealt.hp_lost() > 0.0 {
        award_score(attacker, scoring.hit, now, scoring, events);
    }
    if dealt.destroyed() {
        award_score(attacker, scoring.destroy, now, scoring, events);
    }
}
