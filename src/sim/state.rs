//! Arena state and core simulation types
//!
//! `ArenaState` owns every vehicle, field entity and timer of a round. Other
//! components borrow pieces of it for the duration of a tick only.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ai::AiBrain;
use super::effects::StatusEffects;
use super::schedule::Scheduler;
use super::store::{VehicleId, VehicleStore};
use super::vehicle::{Control, Side, Vehicle};
use crate::roster::{Archetype, Roster};
use crate::tuning::Tuning;

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Cars frozen while "3, 2, 1" counts down
    Countdown { steps_left: u32, next_step_at: f64 },
    /// Active gameplay
    Playing,
    /// Round decided; cars drift to a stop before the result is reported
    Ended { victory: bool },
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    SpeedBoost,
    Shield,
    MegaRam,
}

impl PickupKind {
    pub const ALL: [PickupKind; 3] = [
        PickupKind::SpeedBoost,
        PickupKind::Shield,
        PickupKind::MegaRam,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PickupKind::SpeedBoost => "SPEED BOOST",
            PickupKind::Shield => "SHIELD",
            PickupKind::MegaRam => "MEGA RAM",
        }
    }
}

/// Hazard types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    OilSlick,
    PitHole,
    SpikeStrip,
}

impl HazardKind {
    pub const ALL: [HazardKind; 3] = [
        HazardKind::OilSlick,
        HazardKind::PitHole,
        HazardKind::SpikeStrip,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HazardKind::OilSlick => "OIL SLICK",
            HazardKind::PitHole => "PIT HOLE",
            HazardKind::SpikeStrip => "SPIKES",
        }
    }
}

/// A power-up waiting on the field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub pos: Vec2,
    pub spawned_at: f64,
}

/// A hazard on the field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub kind: HazardKind,
    pub pos: Vec2,
    pub spawned_at: f64,
}

/// End-of-round report for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub victory: bool,
    pub score: u64,
    pub destroyed: usize,
    pub total_opponents: usize,
    pub player_name: String,
}

/// Discrete events for presentation and audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Countdown step; 0 is the go signal
    CountdownTick { remaining: u32 },
    VehicleDamaged { id: VehicleId, amount: f32 },
    ShieldBlocked { id: VehicleId },
    VehicleDestroyed { id: VehicleId },
    ScoreAwarded { id: VehicleId, points: u64, combo: u32 },
    PowerupSpawned { pickup: u32, kind: PickupKind, pos: Vec2 },
    PowerupExpired { pickup: u32 },
    PowerupCollected { id: VehicleId, kind: PickupKind },
    HazardSpawned { hazard: u32, kind: HazardKind, pos: Vec2 },
    HazardExpired { hazard: u32 },
    HazardTriggered { id: VehicleId, kind: HazardKind },
    RoundEnded(RoundSummary),
}

/// Fixed-interval repeating timer (paused until started)
#[derive(Debug, Clone, PartialEq)]
pub struct Spawner {
    pub interval_ms: f64,
    elapsed_ms: f64,
    pub running: bool,
}

impl Spawner {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            elapsed_ms: 0.0,
            running: false,
        }
    }

    /// Advance the timer; returns how many times it fired
    pub fn advance(&mut self, dt_ms: f64) -> u32 {
        if !self.running || self.interval_ms <= 0.0 {
            return 0;
        }
        self.elapsed_ms += dt_ms;
        let mut fires = 0;
        while self.elapsed_ms >= self.interval_ms {
            self.elapsed_ms -= self.interval_ms;
            fires += 1;
        }
        fires
    }
}

/// Complete round state
#[derive(Debug, Clone)]
pub struct ArenaState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulation clock (ms since round start)
    pub time_ms: f64,
    pub vehicles: VehicleStore,
    pub player: VehicleId,
    pub total_opponents: usize,
    /// Active pickups (sorted by id)
    pub pickups: Vec<Pickup>,
    /// Active hazards (sorted by id)
    pub hazards: Vec<Hazard>,
    pub powerup_spawner: Spawner,
    pub hazard_spawner: Spawner,
    pub scheduler: Scheduler,
    pub effects: StatusEffects,
    /// Set once the result has been reported
    pub summary: Option<RoundSummary>,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl ArenaState {
    /// Set up a round: the player drives `player_pick` (or the first
    /// archetype), opponents are the next archetypes in roster order.
    pub fn new(seed: u64, tuning: Tuning, roster: &Roster, player_pick: &str) -> Self {
        let tuning = tuning.sanitized();
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            powerup_spawner: Spawner::new(tuning.powerups.spawn_interval_ms),
            hazard_spawner: Spawner::new(tuning.hazards.spawn_interval_ms),
            phase: GamePhase::Playing,
            time_ticks: 0,
            time_ms: 0.0,
            vehicles: VehicleStore::new(),
            player: VehicleId {
                index: 0,
                generation: 0,
            },
            total_opponents: 0,
            pickups: Vec::new(),
            hazards: Vec::new(),
            scheduler: Scheduler::new(),
            effects: StatusEffects::new(),
            summary: None,
            events: Vec::new(),
            next_id: 1,
            tuning,
        };
        state.begin_round(roster, player_pick);
        state
    }

    /// Play again with the same tuning. The lineup is respawned into the
    /// same store, so handles from the previous round go stale; the RNG
    /// stream carries on.
    pub fn rematch(&mut self, roster: &Roster, player_pick: &str) {
        self.vehicles.clear();
        self.begin_round(roster, player_pick);
    }

    fn begin_round(&mut self, roster: &Roster, player_pick: &str) {
        self.time_ticks = 0;
        self.time_ms = 0.0;
        self.pickups.clear();
        self.hazards.clear();
        self.powerup_spawner = Spawner::new(self.tuning.powerups.spawn_interval_ms);
        self.hazard_spawner = Spawner::new(self.tuning.hazards.spawn_interval_ms);
        self.scheduler = Scheduler::new();
        self.effects = StatusEffects::new();
        self.summary = None;
        self.events.clear();
        self.next_id = 1;

        let fallback = Archetype {
            id: String::new(),
            name: "Monster".to_string(),
            stats: Default::default(),
        };
        let player_arch = roster.pick_or_first(player_pick).unwrap_or(&fallback);
        self.player = self.vehicles.insert(Vehicle::new(
            &player_arch.name,
            Side::Player,
            player_arch.stats,
            self.tuning.arena.player_spawn,
            -std::f32::consts::FRAC_PI_2, // Facing up
            Control::Player,
        ));

        let arena = &self.tuning.arena;
        let opponents = roster.opponents_for(&player_arch.id, self.tuning.round.opponent_count);
        // Face the arena center
        let center = arena.bounds.min().lerp(arena.bounds.max(), 0.5);
        self.total_opponents = 0;
        for (arch, spawn) in opponents.into_iter().zip(arena.ai_spawns.iter().copied()) {
            let brain = AiBrain::new(spawn, &self.tuning.ai, &mut self.rng);
            let to_center = center - spawn;
            let heading = to_center.y.atan2(to_center.x);
            let control = Control::Ai(brain);
            let vehicle = Vehicle::new(&arch.name, Side::Ai, arch.stats, spawn, heading, control);
            self.vehicles.insert(vehicle);
            self.total_opponents += 1;
        }

        // Freeze everyone for the countdown
        for vehicle in self.vehicles.iter_mut() {
            vehicle.body.enabled = false;
        }
        let round = &self.tuning.round;
        self.phase = GamePhase::Countdown {
            steps_left: round.countdown_steps,
            next_step_at: round.countdown_step_ms,
        };
        let steps = round.countdown_steps;
        self.push_event(GameEvent::CountdownTick { remaining: steps });

        log::info!(
            "Round seed {}: {} vs {} opponents",
            self.seed,
            player_arch.name,
            self.total_opponents
        );
    }

    /// Allocate a new field entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn player(&self) -> Option<&Vehicle> {
        self.vehicles.get(self.player)
    }

    pub fn player_alive(&self) -> bool {
        self.player().is_some_and(|p| p.is_alive())
    }

    pub fn ai_alive(&self) -> usize {
        self.vehicles
            .iter()
            .filter(|v| v.side == Side::Ai && v.is_alive())
            .count()
    }

    pub fn destroyed_count(&self) -> usize {
        self.total_opponents - self.ai_alive()
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::Ended { .. })
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
