//! Monster archetypes
//!
//! The roster is read once at round start; vehicles copy their stats out of
//! it and never look back.

use serde::{Deserialize, Serialize};

/// Fixed stat bundle for one archetype
///
/// Missing fields deserialize to the baseline car; out-of-range values are
/// replaced by the same baseline in [`ArchetypeStats::sanitized`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeStats {
    /// Top speed (px/s)
    pub max_speed: f32,
    /// Forward thrust (px/s²)
    pub acceleration: f32,
    /// Linear deceleration when coasting (px/s²)
    pub drag: f32,
    /// Turn rate (degrees/s)
    pub turn_speed: f32,
    /// Restitution against walls and obstacles
    pub bounce: f32,
    pub hp: f32,
    /// Fraction of sideways velocity removed per tick (0-1)
    pub side_grip: f32,
    /// Grip while braking (0-1)
    pub side_grip_brake: f32,
}

impl Default for ArchetypeStats {
    fn default() -> Self {
        Self {
            max_speed: 250.0,
            acceleration: 360.0,
            drag: 320.0,
            turn_speed: 155.0,
            bounce: 0.65,
            hp: 100.0,
            side_grip: 0.92,
            side_grip_brake: 0.96,
        }
    }
}

impl ArchetypeStats {
    /// Replace unusable values with the baseline
    pub fn sanitized(self, name: &str) -> Self {
        let base = Self::default();
        let positive = |value: f32, fallback: f32, field: &str| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                log::warn!("Archetype {name}: invalid {field} {value}, using {fallback}");
                fallback
            }
        };
        let unit = |value: f32, fallback: f32, field: &str| {
            if (0.0..=1.0).contains(&value) {
                value
            } else {
                log::warn!("Archetype {name}: invalid {field} {value}, using {fallback}");
                fallback
            }
        };
        Self {
            max_speed: positive(self.max_speed, base.max_speed, "max_speed"),
            acceleration: positive(self.acceleration, base.acceleration, "acceleration"),
            drag: positive(self.drag, base.drag, "drag"),
            turn_speed: positive(self.turn_speed, base.turn_speed, "turn_speed"),
            bounce: unit(self.bounce, base.bounce, "bounce"),
            hp: positive(self.hp, base.hp, "hp"),
            side_grip: unit(self.side_grip, base.side_grip, "side_grip"),
            side_grip_brake: unit(self.side_grip_brake, base.side_grip_brake, "side_grip_brake"),
        }
    }
}

/// A named monster car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub stats: ArchetypeStats,
}

impl Archetype {
    fn new(id: &str, name: &str, stats: ArchetypeStats) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            stats,
        }
    }
}

/// Ordered, immutable list of archetypes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    pub archetypes: Vec<Archetype>,
}

/// Built-in monsters: id, name, then max_speed, acceleration, drag,
/// turn_speed, bounce, hp, side_grip, side_grip_brake
const MONSTERS: [(&str, &str, [f32; 8]); 8] = [
    ("fang", "Fang", [260.0, 360.0, 320.0, 155.0, 0.62, 95.0, 0.92, 0.96]),
    ("brute", "Brute", [225.0, 320.0, 360.0, 135.0, 0.58, 130.0, 0.93, 0.97]),
    ("viper", "Viper", [285.0, 410.0, 280.0, 165.0, 0.66, 85.0, 0.90, 0.95]),
    ("magma", "Magma", [245.0, 355.0, 340.0, 145.0, 0.64, 110.0, 0.92, 0.96]),
    ("specter", "Specter", [275.0, 390.0, 300.0, 175.0, 0.65, 90.0, 0.91, 0.95]),
    ("titan", "Titan", [215.0, 300.0, 380.0, 125.0, 0.56, 140.0, 0.94, 0.97]),
    ("blitz", "Blitz", [295.0, 430.0, 260.0, 170.0, 0.68, 80.0, 0.90, 0.94]),
    ("thorn", "Thorn", [250.0, 345.0, 335.0, 150.0, 0.62, 115.0, 0.92, 0.96]),
];

const fn stats(values: [f32; 8]) -> ArchetypeStats {
    let [
        max_speed,
        acceleration,
        drag,
        turn_speed,
        bounce,
        hp,
        side_grip,
        side_grip_brake,
    ] = values;
    ArchetypeStats {
        max_speed,
        acceleration,
        drag,
        turn_speed,
        bounce,
        hp,
        side_grip,
        side_grip_brake,
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            archetypes: MONSTERS
                .iter()
                .map(|&(id, name, values)| Archetype::new(id, name, stats(values)))
                .collect(),
        }
    }
}

impl Roster {
    /// Parse a roster file; every archetype's stats are sanitized
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut roster: Roster = serde_json::from_str(json)?;
        for archetype in &mut roster.archetypes {
            archetype.stats = archetype.stats.sanitized(&archetype.name);
        }
        Ok(roster)
    }

    /// Parse a roster file, falling back to the built-in roster
    pub fn load_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(roster) if !roster.archetypes.is_empty() => roster,
            Ok(_) => {
                log::warn!("Empty roster, using built-in monsters");
                Self::default()
            }
            Err(e) => {
                log::warn!("Invalid roster ({e}), using built-in monsters");
                Self::default()
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Archetype> {
        self.archetypes.iter().find(|a| a.id == id)
    }

    /// The player's pick, or the first archetype when the id is unknown
    pub fn pick_or_first(&self, id: &str) -> Option<&Archetype> {
        self.get(id).or_else(|| self.archetypes.first())
    }

    /// First `count` archetypes other than the player's pick
    pub fn opponents_for(&self, player_id: &str, count: usize) -> Vec<&Archetype> {
        self.archetypes
            .iter()
            .filter(|a| a.id != player_id)
            .take(count)
            .collect()
    }
}
