//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by slot index / entity ID)
//! - No rendering, input or platform dependencies

pub mod ai;
pub mod body;
pub mod combat;
pub mod contact;
pub mod effects;
pub mod movement;
pub mod schedule;
pub mod state;
pub mod store;
pub mod tick;
pub mod vehicle;

pub use ai::AiBrain;
pub use combat::{ContactOutcome, apply_damage, award_score, resolve_contact};
pub use contact::{CollisionResult, Contact, circle_overlap, detect_contacts};
pub use effects::StatusEffects;
pub use movement::{ControlIntent, SteeringModel, drive_ai, drive_player};
pub use schedule::{Deferred, Scheduler};
pub use state::{
    ArenaState, GameEvent, GamePhase, Hazard, HazardKind, Pickup, PickupKind, RoundSummary, Spawner,
};
pub use store::{VehicleId, VehicleStore};
pub use tick::{TickInput, autopilot_intent, tick};
pub use vehicle::{Body, Control, DamageOutcome, Side, Vehicle};
