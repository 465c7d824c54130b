//! Contact notifications and the reference overlap detector
//!
//! In a full game the physics substrate reports these; the headless driver
//! and tests use [`detect_contacts`] instead.

use glam::Vec2;

use super::state::ArenaState;
use super::store::VehicleId;
use crate::consts::{HAZARD_RADIUS, PICKUP_RADIUS};

/// Something touched something this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Two car bodies overlap
    Vehicles(VehicleId, VehicleId),
    /// A car overlaps a power-up
    Pickup(VehicleId, u32),
    /// A car overlaps a hazard
    Hazard(VehicleId, u32),
}

/// Result of a circle overlap check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the circles overlap
    pub hit: bool,
    /// Unit normal from the second circle toward the first
    pub normal: Vec2,
    /// Overlap depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between two circles
pub fn circle_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> CollisionResult {
    let delta = a - b;
    let dist = delta.length();
    let reach = a_radius + b_radius;
    if dist >= reach {
        return CollisionResult::miss();
    }
    // Coincident centers: pick an arbitrary but stable axis
    let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::X };
    CollisionResult {
        hit: true,
        normal,
        penetration: reach - dist,
    }
}

/// Every overlap among live cars, pickups and hazards, in stable order
pub fn detect_contacts(state: &ArenaState) -> Vec<Contact> {
    let cars: Vec<_> = state
        .vehicles
        .iter()
        .filter(|v| v.is_alive() && v.body.enabled)
        .collect();

    let mut contacts = Vec::new();
    for (i, a) in cars.iter().enumerate() {
        for b in &cars[i + 1..] {
            if circle_overlap(a.body.position, a.body.radius, b.body.position, b.body.radius).hit {
                contacts.push(Contact::Vehicles(a.id, b.id));
            }
        }
    }
    for car in &cars {
        for pickup in &state.pickups {
            if circle_overlap(car.body.position, car.body.radius, pickup.pos, PICKUP_RADIUS).hit {
                contacts.push(Contact::Pickup(car.id, pickup.id));
            }
        }
        for hazard in &state.hazards {
            if circle_overlap(car.body.position, car.body.radius, hazard.pos, HAZARD_RADIUS).hit {
                contacts.push(Contact::Hazard(car.id, hazard.id));
            }
        }
    }
    contacts
}
