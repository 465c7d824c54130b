//! Vehicle record and its substrate-facing body
//!
//! A vehicle is one car, player or AI. Shared state lives here; the only
//! behavioral difference between sides is the [`Control`] strategy.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ai::AiBrain;
use super::store::VehicleId;
use crate::consts::VEHICLE_RADIUS;
use crate::heading_vector;
use crate::roster::ArchetypeStats;

/// Which team a vehicle fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Ai,
}

/// How a vehicle produces its control intent each tick
#[derive(Debug, Clone)]
pub enum Control {
    /// Driven by the per-tick input flags
    Player,
    /// Driven by the decision engine
    Ai(AiBrain),
}

/// Kinematic mirror of the substrate body plus the command slots the
/// simulation writes back each tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Facing angle in radians (0 = +x, y grows downward)
    pub heading: f32,
    /// Commanded linear acceleration (px/s²)
    pub acceleration: Vec2,
    /// Commanded angular velocity (rad/s)
    pub angular_velocity: f32,
    /// Commanded speed clamp (px/s)
    pub max_speed: f32,
    /// Commanded linear deceleration while coasting (px/s²)
    pub drag: f32,
    pub bounce: f32,
    pub radius: f32,
    /// Disabled bodies neither move nor collide
    pub enabled: bool,
}

impl Body {
    pub fn new(position: Vec2, heading: f32, stats: &ArchetypeStats) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            heading,
            acceleration: Vec2::ZERO,
            angular_velocity: 0.0,
            max_speed: stats.max_speed,
            drag: stats.drag,
            bounce: stats.bounce,
            radius: VEHICLE_RADIUS,
            enabled: true,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn forward(&self) -> Vec2 {
        heading_vector(self.heading)
    }

    /// Move instantly; momentum is discarded
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
        self.angular_velocity = 0.0;
    }

    /// Zero every motion command
    pub fn halt_commands(&mut self) {
        self.acceleration = Vec2::ZERO;
        self.angular_velocity = 0.0;
    }
}

/// Per-axis effect generations; a deferred expiry only acts if its
/// generation still matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectGenerations {
    pub speed: u32,
    pub damage: u32,
    pub oil: u32,
}

/// What a damage application actually did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// A shield charge soaked the hit
    Shielded,
    /// Inside the invulnerability window (or zero damage)
    Ignored,
    /// Hp went down
    Applied { amount: f32, destroyed: bool },
    /// Vehicle was already destroyed
    Dead,
}

impl DamageOutcome {
    pub fn hp_lost(&self) -> f32 {
        match self {
            DamageOutcome::Applied { amount, .. } => *amount,
            _ => 0.0,
        }
    }

    pub fn destroyed(&self) -> bool {
        matches!(self, DamageOutcome::Applied { destroyed: true, .. })
    }
}

/// One car in the arena
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub side: Side,
    pub name: String,
    pub stats: ArchetypeStats,
    pub max_hp: f32,
    hp: f32,
    alive: bool,
    pub shield_hits: u32,
    pub speed_multiplier: f32,
    pub damage_multiplier: f32,
    /// Drag scale from hazards (1 = normal)
    pub drag_multiplier: f32,
    /// Extra spin from hazards (rad/s), added to steering output
    pub spin: f32,
    /// Damage is ignored while `now < invulnerable_until`
    pub invulnerable_until: Option<f64>,
    pub score: u64,
    pub combo: u32,
    pub last_score_at: Option<f64>,
    /// Set while the brake is held; picks the brake grip
    pub braking: bool,
    pub generations: EffectGenerations,
    pub body: Body,
    pub control: Control,
}

impl Vehicle {
    pub fn new(
        name: &str,
        side: Side,
        stats: ArchetypeStats,
        position: Vec2,
        heading: f32,
        control: Control,
    ) -> Self {
        Self {
            id: VehicleId {
                index: 0,
                generation: 0,
            },
            side,
            name: name.to_string(),
            stats,
            max_hp: stats.hp,
            hp: stats.hp,
            alive: true,
            shield_hits: 0,
            speed_multiplier: 1.0,
            damage_multiplier: 1.0,
            drag_multiplier: 1.0,
            spin: 0.0,
            invulnerable_until: None,
            score: 0,
            combo: 0,
            last_score_at: None,
            braking: false,
            generations: EffectGenerations::default(),
            body: Body::new(position, heading, &stats),
            control,
        }
    }

    pub fn hp(&self) -> f32 {
        self.hp
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_player(&self) -> bool {
        self.side == Side::Player
    }

    pub fn is_invulnerable(&self, now: f64) -> bool {
        self.invulnerable_until.is_some_and(|until| now < until)
    }

    /// Set hp directly, clamped to [0, max_hp]. Returns true if this call
    /// destroyed the vehicle.
    pub fn set_hp(&mut self, hp: f32) -> bool {
        if !self.alive {
            return false;
        }
        self.hp = hp.clamp(0.0, self.max_hp);
        if self.hp <= 0.0 {
            self.destroy();
            return true;
        }
        false
    }

    fn destroy(&mut self) {
        self.alive = false;
        self.hp = 0.0;
        self.speed_multiplier = 1.0;
        self.damage_multiplier = 1.0;
        self.drag_multiplier = 1.0;
        self.spin = 0.0;
        self.shield_hits = 0;
        self.braking = false;
        self.body.halt_commands();
        self.body.velocity = Vec2::ZERO;
        self.body.enabled = false;
    }

    /// Shared damage path for collisions and hazards: shield first, then the
    /// invulnerability window, then hp loss.
    pub fn take_damage(&mut self, amount: f32, now: f64, invulnerability_ms: f64) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::Dead;
        }
        if amount.is_nan() || amount <= 0.0 {
            return DamageOutcome::Ignored;
        }
        if self.shield_hits > 0 {
            self.shield_hits -= 1;
            return DamageOutcome::Shielded;
        }
        if self.is_invulnerable(now) {
            return DamageOutcome::Ignored;
        }

        let before = self.hp;
        let destroyed = self.set_hp(before - amount);
        let lost = before - self.hp;
        if !destroyed {
            self.invulnerable_until = Some(now + invulnerability_ms);
        }
        DamageOutcome::Applied {
            amount: lost,
            destroyed,
        }
    }

    /// Speed relative to the current top speed, 0-1
    pub fn normalized_speed(&self) -> f32 {
        let top = self.stats.max_speed * self.speed_multiplier;
        if top <= 0.0 {
            return 0.0;
        }
        (self.body.speed() / top).clamp(0.0, 1.0)
    }

    /// Badly damaged (below 30% hp)
    pub fn is_smoking(&self) -> bool {
        // Integer-scaled so exactly 30% is not smoking
        self.alive && self.hp * 10.0 < self.max_hp * 3.0
    }

    /// Display label for the most prominent active effect
    pub fn status_label(&self) -> String {
        if !self.alive {
            return String::new();
        }
        if self.speed_multiplier != 1.0 {
            "SPEED BOOST".to_string()
        } else if self.shield_hits > 0 {
            format!("SHIELD x{}", self.shield_hits)
        } else if self.damage_multiplier != 1.0 {
            "MEGA RAM".to_string()
        } else {
            String::new()
        }
    }
}
