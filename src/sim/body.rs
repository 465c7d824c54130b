//! Reference arcade kinematics
//!
//! Stands in for the external physics substrate: integrates the commands
//! the simulation writes into each [`Body`], keeps cars inside the walls,
//! bounces them off tire stacks and separates overlapping cars.

use glam::Vec2;

use super::contact::circle_overlap;
use super::store::VehicleStore;
use super::vehicle::Body;
use crate::normalize_angle;
use crate::tuning::ArenaTuning;

/// Advance one body by `dt` seconds
///
/// Drag only acts while the body is not accelerating, matching arcade
/// physics: thrust is never fought by drag, coasting decays linearly.
pub fn integrate(body: &mut Body, arena: &ArenaTuning, dt: f32) {
    if !body.enabled {
        return;
    }

    body.heading = normalize_angle(body.heading + body.angular_velocity * dt);

    if body.acceleration != Vec2::ZERO {
        body.velocity += body.acceleration * dt;
    } else {
        let speed = body.speed();
        let slowed = (speed - body.drag * dt).max(0.0);
        body.velocity = body.velocity.normalize_or_zero() * slowed;
    }
    body.velocity = body.velocity.clamp_length_max(body.max_speed.max(0.0));

    body.position += body.velocity * dt;

    bounce_off_walls(body, arena);
    for obstacle in &arena.obstacles {
        let hit = circle_overlap(body.position, body.radius, obstacle.center(), obstacle.radius);
        if hit.hit {
            body.position += hit.normal * hit.penetration;
            let into = body.velocity.dot(hit.normal);
            if into < 0.0 {
                body.velocity -= (1.0 + body.bounce) * into * hit.normal;
            }
        }
    }
}

fn bounce_off_walls(body: &mut Body, arena: &ArenaTuning) {
    let min = arena.interior.min() + Vec2::splat(body.radius);
    let max = arena.interior.max() - Vec2::splat(body.radius);

    if body.position.x < min.x {
        body.position.x = min.x;
        body.velocity.x = body.velocity.x.abs() * body.bounce;
    } else if body.position.x > max.x {
        body.position.x = max.x;
        body.velocity.x = -body.velocity.x.abs() * body.bounce;
    }
    if body.position.y < min.y {
        body.position.y = min.y;
        body.velocity.y = body.velocity.y.abs() * body.bounce;
    } else if body.position.y > max.y {
        body.position.y = max.y;
        body.velocity.y = -body.velocity.y.abs() * body.bounce;
    }
}

/// Push overlapping cars apart and exchange their closing velocity
pub fn separate(a: &mut Body, b: &mut Body) {
    if !a.enabled || !b.enabled {
        return;
    }
    let hit = circle_overlap(a.position, a.radius, b.position, b.radius);
    if !hit.hit {
        return;
    }
    let half = hit.normal * (hit.penetration * 0.5);
    a.position += half;
    b.position -= half;

    // Equal masses: swap the normal components, scaled by restitution
    let closing = (a.velocity - b.velocity).dot(hit.normal);
    if closing < 0.0 {
        let bounce = (a.bounce + b.bounce) * 0.5;
        let impulse = hit.normal * (closing * (1.0 + bounce) * 0.5);
        a.velocity -= impulse;
        b.velocity += impulse;
    }
}

/// Integrate every car
pub fn integrate_all(vehicles: &mut VehicleStore, arena: &ArenaTuning, dt: f32) {
    for vehicle in vehicles.iter_mut() {
        integrate(&mut vehicle.body, arena, dt);
    }
}

/// Resolve car-on-car overlaps. Run after contacts are collected so
/// collision damage sees the closing speed, not the rebound.
pub fn resolve_overlaps(vehicles: &mut VehicleStore) {
    let ids = vehicles.ids();
    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            if let Some((first, second)) = vehicles.pair_mut(a, b) {
                if first.is_alive() && second.is_alive() {
                    separate(&mut first.body, &mut second.body);
                }
            }
        }
    }
}
