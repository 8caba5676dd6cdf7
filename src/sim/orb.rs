//! The evading orb and the proximity score
//!
//! Ducks push the orb away (harder when held or moving fast), a weak spring
//! pulls it back toward the centre and a small wander keeps it alive. The
//! score grows faster the closer the orb runs to the ducks.

use glam::Vec2;

use super::collision::{contact_normal, reflect_velocity, resolve_walls};
use super::state::PondState;
use crate::settings::Tuning;

/// Advance the orb one step. Returns true if a duck touched it this step.
pub fn step_orb(state: &mut PondState, dt: f32, t: f32) -> bool {
    if !state.orb.active {
        return false;
    }

    let tuning = &state.tuning;
    let orb = &mut state.orb;

    orb.hit_cooldown = (orb.hit_cooldown - dt).max(0.0);

    let mut force = Vec2::ZERO;
    for duck in &state.ducks {
        let (normal, dist) = contact_normal(duck.pos, orb.pos);
        if dist > tuning.orb_sense_radius {
            continue;
        }
        let falloff = 1.0 - dist / tuning.orb_sense_radius;
        let mut weight = 1.0 + duck.vel.length() / tuning.orb_speed_ref;
        if duck.grabbed {
            weight += tuning.orb_drag_boost;
        }
        force += normal * tuning.orb_repulsion * weight * falloff;
    }

    let center = Vec2::new(state.width / 2.0, state.height / 2.0);
    force += (center - orb.pos) * tuning.orb_center_spring;
    force += Vec2::new((t * 0.9).sin(), (t * 1.3 + 1.7).cos()) * tuning.orb_wander;

    orb.vel += force * dt;
    orb.vel *= tuning.orb_damping.powf(dt * 60.0);
    orb.vel = orb.vel.clamp_length_max(tuning.orb_max_speed);
    orb.pos += orb.vel * dt;

    resolve_walls(
        &mut orb.pos,
        &mut orb.vel,
        orb.radius,
        state.width,
        state.height,
        tuning.orb_wall_restitution,
    );

    let mut hit = false;
    for duck in &state.ducks {
        let (normal, dist) = contact_normal(duck.pos, orb.pos);
        if dist < duck.radius + orb.radius {
            if orb.vel.dot(normal) < 0.0 {
                orb.vel = reflect_velocity(orb.vel, normal);
            }
            orb.vel += normal * tuning.orb_bump;
            orb.hit_cooldown = tuning.orb_hit_cooldown;
            hit = true;
        }
    }

    hit
}

/// Points per second for the current configuration
pub fn score_rate(state: &PondState) -> f32 {
    let tuning = &state.tuning;
    let orb = &state.orb;
    if !orb.active || state.ducks.is_empty() {
        return 0.0;
    }

    let nearest = state
        .ducks
        .iter()
        .map(|d| (orb.pos.distance(d.pos) - d.radius - orb.radius).max(0.0))
        .fold(f32::INFINITY, f32::min);

    let mut rate = tuning.score_base_rate + proximity_bonus(tuning, nearest);

    let held_near = state.ducks.iter().any(|d| {
        d.grabbed && orb.pos.distance(d.pos) - d.radius < tuning.score_drag_near_radius
    });
    if held_near {
        rate += tuning.score_drag_bonus;
    }

    if orb.is_cooling_down() {
        rate *= tuning.score_hit_penalty;
    }
    rate
}

fn proximity_bonus(tuning: &Tuning, edge_distance: f32) -> f32 {
    (tuning.score_proximity_k / edge_distance.max(1.0)).min(tuning.score_proximity_cap)
}

/// Accumulate score for one step
pub fn step_score(state: &mut PondState, dt: f32) {
    let rate = score_rate(state);
    state.score += f64::from(rate.max(0.0) * dt);
}
