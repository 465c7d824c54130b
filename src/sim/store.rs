//! Generational vehicle storage
//!
//! Deferred work never holds a reference to a vehicle, only a [`VehicleId`].
//! An id whose generation no longer matches its slot resolves to `None`, so a
//! timer that outlives a round (or a slot reset) simply finds nothing.

use serde::{Deserialize, Serialize};

use super::vehicle::Vehicle;

/// Handle to a vehicle slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId {
    pub index: u32,
    pub generation: u32,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    vehicle: Option<Vehicle>,
}

/// Indexed vehicle store with per-slot generations
#[derive(Debug, Clone, Default)]
pub struct VehicleStore {
    slots: Vec<Slot>,
}

impl VehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vehicle, reusing the first empty slot. The vehicle's `id`
    /// field is overwritten with the handle it was stored under.
    pub fn insert(&mut self, mut vehicle: Vehicle) -> VehicleId {
        if let Some(index) = self.slots.iter().position(|s| s.vehicle.is_none()) {
            let slot = &mut self.slots[index];
            let id = VehicleId {
                index: index as u32,
                generation: slot.generation,
            };
            vehicle.id = id;
            slot.vehicle = Some(vehicle);
            id
        } else {
            let id = VehicleId {
                index: self.slots.len() as u32,
                generation: 0,
            };
            vehicle.id = id;
            self.slots.push(Slot {
                generation: 0,
                vehicle: Some(vehicle),
            });
            id
        }
    }

    /// Empty every slot; outstanding handles go stale
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.vehicle.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.vehicle.as_ref())
    }

    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.vehicle.as_mut())
    }

    /// Mutable access to two distinct vehicles at once
    pub fn pair_mut(&mut self, a: VehicleId, b: VehicleId) -> Option<(&mut Vehicle, &mut Vehicle)> {
        if a.index == b.index {
            return None;
        }
        self.get(a)?;
        self.get(b)?;
        let (lo, hi, swapped) = if a.index < b.index {
            (a.index as usize, b.index as usize, false)
        } else {
            (b.index as usize, a.index as usize, true)
        };
        let (head, tail) = self.slots.split_at_mut(hi);
        let first = head[lo].vehicle.as_mut()?;
        let second = tail[0].vehicle.as_mut()?;
        Some(if swapped { (second, first) } else { (first, second) })
    }

    /// Every stored vehicle in slot order, destroyed ones included
    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.slots.iter().filter_map(|s| s.vehicle.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Vehicle> {
        self.slots.iter_mut().filter_map(|s| s.vehicle.as_mut())
    }

    pub fn ids(&self) -> Vec<VehicleId> {
        self.iter().map(|v| v.id).collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
