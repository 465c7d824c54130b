//! Status effects: power-ups and hazards
//!
//! Timed effects bump a per-axis generation on the vehicle and queue an
//! expiry carrying that generation. Re-applying an effect bumps it again, so
//! the older expiry finds a mismatch and does nothing.

use std::collections::HashMap;

use rand::Rng;

use super::combat::apply_damage;
use super::schedule::{Deferred, Scheduler};
use super::state::{GameEvent, Hazard, HazardKind, PickupKind};
use super::store::{VehicleId, VehicleStore};
use super::vehicle::{DamageOutcome, Vehicle};
use crate::tuning::Tuning;

/// Owns the hazard debounce bookkeeping; everything else lives on the vehicle
#[derive(Debug, Clone, Default)]
pub struct StatusEffects {
    /// Last time each (vehicle, hazard) pair triggered
    last_trigger: HashMap<(VehicleId, u32), f64>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a collected power-up. No-op on a wrecked car.
    pub fn apply_pickup(
        &mut self,
        vehicle: &mut Vehicle,
        kind: PickupKind,
        now: f64,
        tuning: &Tuning,
        scheduler: &mut Scheduler,
    ) -> bool {
        if !vehicle.is_alive() {
            return false;
        }
        let powerups = &tuning.powerups;
        match kind {
            PickupKind::SpeedBoost => {
                vehicle.generations.speed = vehicle.generations.speed.wrapping_add(1);
                vehicle.speed_multiplier = powerups.speed_multiplier;
                scheduler.schedule(
                    now + powerups.speed_duration_ms,
                    Deferred::ExpireSpeed {
                        vehicle: vehicle.id,
                        generation: vehicle.generations.speed,
                    },
                );
            }
            PickupKind::Shield => {
                vehicle.shield_hits = powerups.shield_hits;
            }
            PickupKind::MegaRam => {
                vehicle.generations.damage = vehicle.generations.damage.wrapping_add(1);
                vehicle.damage_multiplier = powerups.mega_ram_multiplier;
                scheduler.schedule(
                    now + powerups.mega_ram_duration_ms,
                    Deferred::ExpireDamage {
                        vehicle: vehicle.id,
                        generation: vehicle.generations.damage,
                    },
                );
            }
        }
        log::debug!("{} picked up {}", vehicle.name, kind.label());
        true
    }

    /// Apply a hazard the car is overlapping. Returns `None` when the car is
    /// wrecked or the same hazard already hit it within the debounce window.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_hazard<R: Rng>(
        &mut self,
        vehicle: &mut Vehicle,
        hazard: &Hazard,
        now: f64,
        tuning: &Tuning,
        scheduler: &mut Scheduler,
        rng: &mut R,
        events: &mut Vec<GameEvent>,
    ) -> Option<DamageOutcome> {
        if !vehicle.is_alive() {
            return None;
        }
        let key = (vehicle.id, hazard.id);
        if self
            .last_trigger
            .get(&key)
            .is_some_and(|last| now - last < tuning.hazards.debounce_ms)
        {
            return None;
        }
        self.last_trigger.insert(key, now);

        let hazards = &tuning.hazards;
        let outcome = match hazard.kind {
            HazardKind::OilSlick => {
                let spread = hazards.oil_spin_deg.abs();
                let spin_deg = if spread.is_finite() {
                    rng.random_range(-spread..=spread)
                } else {
                    0.0
                };
                vehicle.generations.oil = vehicle.generations.oil.wrapping_add(1);
                vehicle.spin = spin_deg.to_radians();
                vehicle.drag_multiplier = hazards.oil_drag_factor;
                scheduler.schedule(
                    now + hazards.oil_duration_ms,
                    Deferred::ExpireOil {
                        vehicle: vehicle.id,
                        generation: vehicle.generations.oil,
                    },
                );
                DamageOutcome::Ignored
            }
            HazardKind::PitHole => {
                let damage = hazards.pit_damage;
                let outcome = apply_damage(vehicle, damage, now, &tuning.combat, events);
                if vehicle.is_alive() {
                    let spot = tuning.arena.spawn_region().sample(rng);
                    vehicle.body.teleport(spot);
                }
                outcome
            }
            HazardKind::SpikeStrip => {
                let damage = hazards.spike_damage;
                let outcome = apply_damage(vehicle, damage, now, &tuning.combat, events);
                vehicle.body.velocity *= hazards.spike_velocity_factor;
                outcome
            }
        };
        events.push(GameEvent::HazardTriggered {
            id: vehicle.id,
            kind: hazard.kind,
        });
        log::debug!("{} hit {}", vehicle.name, hazard.kind.label());
        Some(outcome)
    }

    /// Run an expiry task. Stale generations, wrecked cars and recycled
    /// slots are silently skipped. Returns true if something was reset.
    pub fn expire(&mut self, task: Deferred, vehicles: &mut VehicleStore) -> bool {
        let (id, generation) = match task {
            Deferred::ExpireSpeed { vehicle, generation }
            | Deferred::ExpireDamage { vehicle, generation }
            | Deferred::ExpireOil { vehicle, generation } => (vehicle, generation),
            _ => return false,
        };
        let Some(vehicle) = vehicles.get_mut(id).filter(|v| v.is_alive()) else {
            log::trace!("Dropping expiry for missing or wrecked vehicle {id:?}");
            return false;
        };

        match task {
            Deferred::ExpireSpeed { .. } if vehicle.generations.speed == generation => {
                vehicle.speed_multiplier = 1.0;
            }
            Deferred::ExpireDamage { .. } if vehicle.generations.damage == generation => {
                vehicle.damage_multiplier = 1.0;
            }
            Deferred::ExpireOil { .. } if vehicle.generations.oil == generation => {
                vehicle.drag_multiplier = 1.0;
                vehicle.spin = 0.0;
            }
            _ => {
                log::trace!("Dropping superseded expiry {task:?}");
                return false;
            }
        }
        true
    }

    /// Drop debounce entries for a hazard that left the field
    pub fn forget_hazard(&mut self, hazard: u32) {
        self.last_trigger.retain(|(_, h), _| *h != hazard);
    }
}
