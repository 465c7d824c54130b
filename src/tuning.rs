//! Data-driven game balance
//!
//! Every gameplay number lives here so balance passes never touch the
//! simulation code. All sections deserialize with per-field defaults, so a
//! partial JSON file only overrides what it names.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{GAME_HEIGHT, GAME_WIDTH};
use crate::sim::movement::SteeringModel;

/// Axis-aligned rectangle in arena coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }

    /// Uniform random point inside the rect
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            self.x + rng.random::<f32>() * self.w,
            self.y + rng.random::<f32>() * self.h,
        )
    }

    /// Shrink every side by `margin` (never below a zero-size rect)
    pub fn inset(&self, margin: f32) -> Rect {
        let mx = margin.min(self.w / 2.0);
        let my = margin.min(self.h / 2.0);
        Rect::new(self.x + mx, self.y + my, self.w - 2.0 * mx, self.h - 2.0 * my)
    }
}

/// A circular static obstacle (tire stack)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Obstacle {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Arena geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    /// Full arena including walls
    pub bounds: Rect,
    /// Playable interior inside the walls
    pub interior: Rect,
    pub obstacles: Vec<Obstacle>,
    /// Player spawn point
    pub player_spawn: Vec2,
    /// AI spawn points, used in order
    pub ai_spawns: Vec<Vec2>,
    /// Margin from the arena edge for power-up/hazard spawns and pit relocation
    pub spawn_margin: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, GAME_WIDTH, GAME_HEIGHT),
            interior: Rect::new(22.0, 22.0, 756.0, 556.0),
            obstacles: [
                (200.0, 180.0),
                (600.0, 180.0),
                (200.0, 420.0),
                (600.0, 420.0),
                (400.0, 300.0),
            ]
            .into_iter()
            .map(|(x, y)| Obstacle { x, y, radius: 18.0 })
            .collect(),
            player_spawn: Vec2::new(400.0, 480.0),
            ai_spawns: vec![
                Vec2::new(90.0, 90.0),
                Vec2::new(400.0, 90.0),
                Vec2::new(710.0, 90.0),
                Vec2::new(90.0, 300.0),
                Vec2::new(710.0, 300.0),
                Vec2::new(90.0, 510.0),
                Vec2::new(400.0, 510.0),
                Vec2::new(710.0, 510.0),
            ],
            spawn_margin: 70.0,
        }
    }
}

impl ArenaTuning {
    /// Region used for random spawns and relocations
    pub fn spawn_region(&self) -> Rect {
        self.bounds.inset(self.spawn_margin)
    }
}

/// Handling model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    pub steering: SteeringModel,
    /// Speed at which differential turning reaches full rate (px/s)
    pub full_turn_speed: f32,
    /// Reverse thrust as a fraction of forward acceleration
    pub reverse_factor: f32,
    /// Drag multiplier while the brake is held
    pub brake_drag_multiplier: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            steering: SteeringModel::Differential,
            full_turn_speed: 80.0,
            reverse_factor: 0.5,
            brake_drag_multiplier: 3.5,
        }
    }
}

/// AI decision engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    /// Base chance to target the player on a re-roll
    pub aggression: f32,
    /// Upper bound of the per-vehicle random aggression offset
    pub aggression_jitter: f32,
    /// Heading error (radians) below which the AI stops turning
    pub heading_dead_zone: f32,
    /// Chase retarget interval: base + U(0, jitter) ms
    pub chase_retarget_ms: f64,
    pub chase_retarget_jitter_ms: f64,
    /// Wander retarget interval: base + U(0, jitter) ms
    pub wander_retarget_ms: f64,
    pub wander_retarget_jitter_ms: f64,
    /// Margin from the arena edge for wander targets
    pub wander_margin: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            aggression: 0.35,
            aggression_jitter: 0.2,
            heading_dead_zone: 0.1,
            chase_retarget_ms: 800.0,
            chase_retarget_jitter_ms: 1200.0,
            wander_retarget_ms: 2000.0,
            wander_retarget_jitter_ms: 2000.0,
            wander_margin: 60.0,
        }
    }
}

/// Collision damage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub collision_damage_factor: f32,
    pub min_collision_speed: f32,
    pub invulnerability_ms: f64,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            collision_damage_factor: 0.12,
            min_collision_speed: 60.0,
            invulnerability_ms: 500.0,
        }
    }
}

/// Player scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    pub hit: u32,
    pub destroy: u32,
    pub powerup: u32,
    pub combo_window_ms: f64,
    pub combo_multiplier: f64,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            hit: 10,
            destroy: 100,
            powerup: 50,
            combo_window_ms: 2000.0,
            combo_multiplier: 0.5,
        }
    }
}

/// Power-up spawner and effect parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupTuning {
    pub spawn_interval_ms: f64,
    pub max_count: usize,
    /// Uncollected power-ups despawn after this long
    pub lifetime_ms: f64,
    pub speed_duration_ms: f64,
    pub speed_multiplier: f32,
    pub shield_hits: u32,
    pub mega_ram_duration_ms: f64,
    pub mega_ram_multiplier: f32,
}

impl Default for PowerupTuning {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 6000.0,
            max_count: 3,
            lifetime_ms: 15_000.0,
            speed_duration_ms: 5000.0,
            speed_multiplier: 1.6,
            shield_hits: 2,
            mega_ram_duration_ms: 6000.0,
            mega_ram_multiplier: 3.0,
        }
    }
}

/// Hazard spawner and effect parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    pub spawn_interval_ms: f64,
    pub max_count: usize,
    /// Same hazard instance cannot re-trigger on the same car inside this window
    pub debounce_ms: f64,
    pub oil_duration_ms: f64,
    pub oil_drag_factor: f32,
    /// Max spin imparted by oil, either direction (deg/s)
    pub oil_spin_deg: f32,
    /// Oil slicks evaporate after this long
    pub oil_lifetime_ms: f64,
    pub pit_damage: f32,
    pub spike_damage: f32,
    pub spike_velocity_factor: f32,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 8000.0,
            max_count: 4,
            debounce_ms: 1000.0,
            oil_duration_ms: 900.0,
            oil_drag_factor: 0.55,
            oil_spin_deg: 220.0,
            oil_lifetime_ms: 20_000.0,
            pit_damage: 30.0,
            spike_damage: 15.0,
            spike_velocity_factor: 0.3,
        }
    }
}

/// Round flow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundTuning {
    pub opponent_count: usize,
    /// Countdown steps ("3, 2, 1") before the go signal
    pub countdown_steps: u32,
    pub countdown_step_ms: f64,
    /// Hazard spawner stays paused this long after the go signal
    pub hazard_start_delay_ms: f64,
    /// Drag applied to drifting cars once the round is decided
    pub end_drag: f32,
    /// Delay between the round ending and the result report
    pub report_delay_ms: f64,
}

impl Default for RoundTuning {
    fn default() -> Self {
        Self {
            opponent_count: 4,
            countdown_steps: 3,
            countdown_step_ms: 800.0,
            hazard_start_delay_ms: 4000.0,
            end_drag: 600.0,
            report_delay_ms: 1800.0,
        }
    }
}

impl PowerupTuning {
    /// Replace unusable values with the defaults
    pub fn sanitized(mut self) -> Self {
        let base = Self::default();
        let section = "powerups";
        non_negative(
            section,
            "spawn_interval_ms",
            &mut self.spawn_interval_ms,
            base.spawn_interval_ms,
        );
        non_negative(section, "lifetime_ms", &mut self.lifetime_ms, base.lifetime_ms);
        non_negative(
            section,
            "speed_duration_ms",
            &mut self.speed_duration_ms,
            base.speed_duration_ms,
        );
        non_negative(
            section,
            "speed_multiplier",
            &mut self.speed_multiplier,
            base.speed_multiplier,
        );
        non_negative(
            section,
            "mega_ram_duration_ms",
            &mut self.mega_ram_duration_ms,
            base.mega_ram_duration_ms,
        );
        non_negative(
            section,
            "mega_ram_multiplier",
            &mut self.mega_ram_multiplier,
            base.mega_ram_multiplier,
        );
        self
    }
}

impl HazardTuning {
    /// Replace unusable values with the defaults. Oil spin is symmetric, so a
    /// negative spread is taken by magnitude.
    pub fn sanitized(mut self) -> Self {
        let base = Self::default();
        let section = "hazards";
        self.oil_spin_deg = self.oil_spin_deg.abs();
        non_negative(
            section,
            "spawn_interval_ms",
            &mut self.spawn_interval_ms,
            base.spawn_interval_ms,
        );
        non_negative(section, "debounce_ms", &mut self.debounce_ms, base.debounce_ms);
        non_negative(section, "oil_duration_ms", &mut self.oil_duration_ms, base.oil_duration_ms);
        non_negative(section, "oil_drag_factor", &mut self.oil_drag_factor, base.oil_drag_factor);
        non_negative(section, "oil_spin_deg", &mut self.oil_spin_deg, base.oil_spin_deg);
        non_negative(section, "oil_lifetime_ms", &mut self.oil_lifetime_ms, base.oil_lifetime_ms);
        non_negative(section, "pit_damage", &mut self.pit_damage, base.pit_damage);
        non_negative(section, "spike_damage", &mut self.spike_damage, base.spike_damage);
        if !(0.0..=1.0).contains(&self.spike_velocity_factor) {
            log::warn!(
                "Invalid {section}.spike_velocity_factor {}, using {}",
                self.spike_velocity_factor,
                base.spike_velocity_factor
            );
            self.spike_velocity_factor = base.spike_velocity_factor;
        }
        self
    }
}

/// Reset `value` to `fallback` unless it is finite and not negative
fn non_negative<T>(section: &str, field: &str, value: &mut T, fallback: T)
where
    T: Copy + Into<f64> + std::fmt::Display,
{
    let v: f64 = (*value).into();
    if !(v.is_finite() && v >= 0.0) {
        log::warn!("Invalid {section}.{field} {value}, using {fallback}");
        *value = fallback;
    }
}

impl RoundTuning {
    pub fn countdown_ms(&self) -> f64 {
        self.countdown_steps as f64 * self.countdown_step_ms
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub movement: MovementTuning,
    pub ai: AiTuning,
    pub combat: CombatTuning,
    pub scoring: ScoringTuning,
    pub powerups: PowerupTuning,
    pub hazards: HazardTuning,
    pub round: RoundTuning,
}

impl Tuning {
    /// Parse a (possibly partial) tuning file. Out-of-range effect values
    /// fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Replace unusable power-up and hazard values with the defaults
    pub fn sanitized(self) -> Self {
        Self {
            powerups: self.powerups.sanitized(),
            hazards: self.hazards.sanitized(),
            ..self
        }
    }

    /// Parse a tuning file, falling back to defaults on malformed input
    pub fn load_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(e) => {
                log::warn!("Invalid tuning ({e}), using defaults");
                Self::default()
            }
        }
    }
}
