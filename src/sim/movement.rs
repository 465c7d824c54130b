//! Movement controller
//!
//! Turns a control intent into this tick's body commands (acceleration,
//! angular velocity, speed clamp, drag) and then applies the lateral grip
//! correction. Integration itself belongs to the physics substrate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::vehicle::{Body, Vehicle};
use crate::consts::REST_SPEED;
use crate::tuning::{AiTuning, MovementTuning};
use crate::{angle_delta, heading_vector};

/// Player handling model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SteeringModel {
    /// Steer keys rotate the car, scaled down at low speed
    #[default]
    Differential,
    /// Direction keys name a heading; the car rotates toward it at its turn rate
    HeadingSeek,
}

/// Logical player controls for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlIntent {
    pub steer_left: bool,
    pub steer_right: bool,
    pub throttle: bool,
    pub reverse: bool,
    pub brake: bool,
}

impl ControlIntent {
    /// Combined direction of the held keys (screen space, y down)
    pub fn direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.steer_left {
            dir.x -= 1.0;
        }
        if self.steer_right {
            dir.x += 1.0;
        }
        if self.throttle {
            dir.y -= 1.0;
        }
        if self.reverse {
            dir.y += 1.0;
        }
        dir
    }
}

/// Drive the player's car from its input flags
pub fn drive_player(
    vehicle: &mut Vehicle,
    intent: &ControlIntent,
    tuning: &MovementTuning,
    dt: f32,
) {
    if !vehicle.is_alive() {
        return;
    }
    match tuning.steering {
        SteeringModel::Differential => differential_turn(vehicle, intent, tuning),
        SteeringModel::HeadingSeek => heading_seek(vehicle, intent, dt),
    }
    vehicle.braking = intent.brake;
    finish_commands(vehicle, tuning.brake_drag_multiplier);
}

fn differential_turn(vehicle: &mut Vehicle, intent: &ControlIntent, tuning: &MovementTuning) {
    let stats = vehicle.stats;
    let body = &mut vehicle.body;

    // No traction to turn with while nearly stationary
    let turn_factor = if tuning.full_turn_speed > 0.0 {
        (body.speed() / tuning.full_turn_speed).min(1.0)
    } else {
        1.0
    };
    let turn_rate = stats.turn_speed.to_radians() * turn_factor;
    body.angular_velocity = if intent.steer_left {
        -turn_rate
    } else if intent.steer_right {
        turn_rate
    } else {
        0.0
    };

    body.acceleration = if intent.throttle {
        body.forward() * stats.acceleration
    } else if intent.reverse {
        body.forward() * -(stats.acceleration * tuning.reverse_factor)
    } else {
        Vec2::ZERO
    };
}

fn heading_seek(vehicle: &mut Vehicle, intent: &ControlIntent, dt: f32) {
    let stats = vehicle.stats;
    let body = &mut vehicle.body;

    let dir = intent.direction();
    body.angular_velocity = if dir != Vec2::ZERO && dt > 0.0 {
        let desired = dir.y.atan2(dir.x);
        let delta = angle_delta(body.heading, desired);
        let max_delta = stats.turn_speed.to_radians() * dt;
        delta.clamp(-max_delta, max_delta) / dt
    } else {
        0.0
    };

    body.acceleration = if intent.throttle {
        body.forward() * stats.acceleration
    } else {
        Vec2::ZERO
    };
}

/// Steer an AI car toward `target`. AI always drives at full throttle and
/// never brakes or reverses.
pub fn drive_ai(vehicle: &mut Vehicle, target: Vec2, tuning: &AiTuning) {
    if !vehicle.is_alive() {
        return;
    }
    let stats = vehicle.stats;
    let body = &mut vehicle.body;

    let to_target = target - body.position;
    body.angular_velocity = if to_target.length_squared() > f32::EPSILON {
        let desired = to_target.y.atan2(to_target.x);
        let diff = angle_delta(body.heading, desired);
        if diff.abs() > tuning.heading_dead_zone {
            stats.turn_speed.to_radians() * diff.signum()
        } else {
            0.0
        }
    } else {
        0.0
    };
    body.acceleration = body.forward() * stats.acceleration;

    vehicle.braking = false;
    finish_commands(vehicle, 1.0);
}

/// Speed clamp, drag, hazard spin and grip: shared by every strategy
fn finish_commands(vehicle: &mut Vehicle, brake_drag_multiplier: f32) {
    let brake = if vehicle.braking { brake_drag_multiplier } else { 1.0 };
    let grip = if vehicle.braking {
        vehicle.stats.side_grip_brake
    } else {
        vehicle.stats.side_grip
    };

    let body = &mut vehicle.body;
    body.max_speed = vehicle.stats.max_speed * vehicle.speed_multiplier;
    body.drag = vehicle.stats.drag * vehicle.drag_multiplier * brake;
    body.angular_velocity += vehicle.spin;

    apply_grip(body, grip);
}

/// Remove `grip` of the sideways velocity component
pub fn apply_grip(body: &mut Body, grip: f32) {
    if body.speed() < REST_SPEED {
        return;
    }
    let forward = heading_vector(body.heading);
    let along = forward * body.velocity.dot(forward);
    let lateral = body.velocity - along;
    body.velocity = along + lateral * (1.0 - grip.clamp(0.0, 1.0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::roster::ArchetypeStats;
    use crate::sim::body::integrate;
    use crate::sim::vehicle::{Control, Side};
    use crate::tuning::ArenaTuning;
    use std::f32::consts::FRAC_PI_2;

    fn car() -> Vehicle {
        Vehicle::new(
            "Fang",
            Side::Player,
            ArchetypeStats::default(),
            Vec2::new(400.0, 300.0),
            0.0,
            Control::Player,
        )
    }

    fn open_arena() -> ArenaTuning {
        ArenaTuning {
            obstacles: Vec::new(),
            ..ArenaTuning::default()
        }
    }

    #[test]
    fn test_no_turning_at_rest() {
        let mut v = car();
        let intent = ControlIntent {
            steer_left: true,
            ..Default::default()
        };
        drive_player(&mut v, &intent, &MovementTuning::default(), SIM_DT);
        assert_eq!(v.body.angular_velocity, 0.0);
    }

    #[test]
    fn test_turn_rate_scales_with_speed() {
        let mut v = car();
        v.body.velocity = Vec2::new(40.0, 0.0);
        let intent = ControlIntent {
            steer_right: true,
            ..Default::default()
        };
        drive_player(&mut v, &intent, &MovementTuning::default(), SIM_DT);
        let expected = 155f32.to_radians() * 0.5;
        assert!((v.body.angular_velocity - expected).abs() < 1e-5);

        v.body.velocity = Vec2::new(200.0, 0.0);
        drive_player(&mut v, &intent, &MovementTuning::default(), SIM_DT);
        assert!((v.body.angular_velocity - 155f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn test_throttle_reverse_and_coast() {
        let mut v = car();
        let tuning = MovementTuning::default();
        let throttle = ControlIntent {
            throttle: true,
            ..Default::default()
        };
        drive_player(&mut v, &throttle, &tuning, SIM_DT);
        assert_eq!(v.body.acceleration, Vec2::new(360.0, 0.0));

        let reverse = ControlIntent {
            reverse: true,
            ..Default::default()
        };
        drive_player(&mut v, &reverse, &tuning, SIM_DT);
        assert_eq!(v.body.acceleration, Vec2::new(-180.0, 0.0));

        drive_player(&mut v, &ControlIntent::default(), &tuning, SIM_DT);
        assert_eq!(v.body.acceleration, Vec2::ZERO);
    }

    #[test]
    fn test_brake_raises_drag_and_grip() {
        let mut v = car();
        v.body.velocity = Vec2::new(100.0, 100.0);
        let brake = ControlIntent {
            brake: true,
            ..Default::default()
        };
        drive_player(&mut v, &brake, &MovementTuning::default(), SIM_DT);
        assert!((v.body.drag - 320.0 * 3.5).abs() < 1e-3);
        // Brake grip 0.96 leaves 4% of the lateral 100
        assert!((v.body.velocity.y - 4.0).abs() < 1e-3);
        assert!((v.body.velocity.x - 100.0).abs() < 1e-3);

        drive_player(&mut v, &ControlIntent::default(), &MovementTuning::default(), SIM_DT);
        assert!((v.body.drag - 320.0).abs() < 1e-3);
    }

    #[test]
    fn test_grip_skipped_at_rest() {
        let mut v = car();
        v.body.velocity = Vec2::new(0.0, 0.5);
        apply_grip(&mut v.body, 0.92);
        assert_eq!(v.body.velocity, Vec2::new(0.0, 0.5));
    }

    #[test]
    fn test_grip_keeps_forward_component() {
        let mut body = car().body;
        body.heading = FRAC_PI_2;
        body.velocity = Vec2::new(50.0, 120.0);
        apply_grip(&mut body, 0.92);
        assert!((body.velocity.y - 120.0).abs() < 1e-3);
        assert!((body.velocity.x - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_heading_seek_limits_rotation() {
        let mut v = car();
        let tuning = MovementTuning {
            steering: SteeringModel::HeadingSeek,
            ..Default::default()
        };
        // Facing +x, asked to face down (+y): a quarter turn, far more than one tick allows
        let intent = ControlIntent {
            reverse: true,
            ..Default::default()
        };
        drive_player(&mut v, &intent, &tuning, SIM_DT);
        let max_rate = 155f32.to_radians();
        assert!((v.body.angular_velocity - max_rate).abs() < 1e-4);
        assert_eq!(v.body.acceleration, Vec2::ZERO);
    }

    #[test]
    fn test_heading_seek_speed_boost_raises_clamp() {
        let mut v = car();
        v.speed_multiplier = 1.6;
        let tuning = MovementTuning {
            steering: SteeringModel::HeadingSeek,
            ..Default::default()
        };
        let intent = ControlIntent {
            throttle: true,
            ..Default::default()
        };
        drive_player(&mut v, &intent, &tuning, SIM_DT);
        assert!((v.body.max_speed - 400.0).abs() < 1e-3);
        assert!(v.body.acceleration.length() > 0.0);
    }

    #[test]
    fn test_ai_turns_toward_target() {
        let mut v = car();
        let tuning = AiTuning::default();
        // Target below: positive (clockwise in screen space) turn
        drive_ai(&mut v, Vec2::new(400.0, 500.0), &tuning);
        assert!((v.body.angular_velocity - 155f32.to_radians()).abs() < 1e-5);
        assert_eq!(v.body.acceleration, Vec2::new(360.0, 0.0));

        drive_ai(&mut v, Vec2::new(400.0, 100.0), &tuning);
        assert!((v.body.angular_velocity + 155f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn test_ai_dead_zone_holds_course() {
        let mut v = car();
        drive_ai(&mut v, Vec2::new(700.0, 310.0), &AiTuning::default());
        assert_eq!(v.body.angular_velocity, 0.0);
    }

    #[test]
    fn test_hazard_spin_adds_to_steering() {
        let mut v = car();
        v.spin = 2.0;
        drive_player(&mut v, &ControlIntent::default(), &MovementTuning::default(), SIM_DT);
        assert_eq!(v.body.angular_velocity, 2.0);
    }

    #[test]
    fn test_full_throttle_never_exceeds_top_speed() {
        let mut v = car();
        v.stats.acceleration = 360.0;
        v.stats.max_speed = 250.0;
        let tuning = MovementTuning::default();
        let arena = open_arena();
        let intent = ControlIntent {
            throttle: true,
            ..Default::default()
        };
        let mut last = 0.0;
        for _ in 0..120 {
            drive_player(&mut v, &intent, &tuning, SIM_DT);
            integrate(&mut v.body, &arena, SIM_DT);
            let speed = v.body.speed();
            assert!(speed <= 250.0 * v.speed_multiplier + 1e-3);
            assert!(speed >= last - 1e-3);
            last = speed;
        }
        assert!(last > 240.0);
    }
}
