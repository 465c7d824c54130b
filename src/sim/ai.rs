//! AI decision engine
//!
//! Each AI car is always seeking a point. When its retarget time passes it
//! re-rolls: chase the player (short interval) or wander to a random spot
//! (long interval). Steering toward the point is the movement controller's job.

use glam::Vec2;
use rand::Rng;

use crate::tuning::{AiTuning, Rect};

/// Seeking state of one AI car
#[derive(Debug, Clone, PartialEq)]
pub struct AiBrain {
    /// Chance (0-1) to pick the player on a re-roll
    pub aggression: f32,
    pub target: Vec2,
    /// Sim time (ms) of the next re-roll
    pub retarget_at: f64,
}

impl AiBrain {
    /// New brain with a per-car aggression offset. It re-rolls on its first update.
    pub fn new<R: Rng>(start: Vec2, tuning: &AiTuning, rng: &mut R) -> Self {
        let jitter = rng.random::<f32>() * tuning.aggression_jitter;
        Self {
            aggression: (tuning.aggression + jitter).clamp(0.0, 1.0),
            target: start,
            retarget_at: 0.0,
        }
    }

    /// Re-roll the target if due. `player` is the player's position while it
    /// is alive. Returns true when a new target was picked.
    pub fn update<R: Rng>(
        &mut self,
        now: f64,
        player: Option<Vec2>,
        wander_area: &Rect,
        tuning: &AiTuning,
        rng: &mut R,
    ) -> bool {
        if now < self.retarget_at {
            return false;
        }

        match player {
            Some(pos) if rng.random::<f32>() < self.aggression => {
                self.target = pos;
                let jitter = rng.random::<f64>() * tuning.chase_retarget_jitter_ms;
                self.retarget_at = now + tuning.chase_retarget_ms + jitter;
            }
            _ => {
                self.target = wander_area.sample(rng);
                let jitter = rng.random::<f64>() * tuning.wander_retarget_jitter_ms;
                self.retarget_at = now + tuning.wander_retarget_ms + jitter;
            }
        }
        true
    }
}
