//! Per-frame physics step
//!
//! Order: ambient drift, walls, pairwise collisions, orb, score. Ends with a
//! final clamp so every duck is inside the canvas after each call.

use glam::Vec2;

use super::collision::{resolve_all_pairs, resolve_walls};
use super::orb::{step_orb, step_score};
use super::state::PondState;
use crate::clamp_to_bounds;

/// What happened during one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Pair contacts resolved
    pub contacts: usize,
    /// Ducks that touched a wall
    pub wall_hits: usize,
    /// A duck touched the orb
    pub orb_hit: bool,
}

/// Smooth pseudo-random acceleration for a duck's idle drift
#[inline]
pub fn drift_accel(t: f32, seed_x: f32, seed_y: f32, strength: f32) -> Vec2 {
    Vec2::new(
        (t * 0.7 + seed_x).sin() + 0.5 * (t * 1.9 + seed_y).cos(),
        (t * 0.6 + seed_y).cos() + 0.5 * (t * 1.3 + seed_x).sin(),
    ) * strength
}

/// Advance the pond by `dt` seconds; `t` is the simulation clock
pub fn advance(state: &mut PondState, dt: f32, t: f32) -> StepReport {
    if !dt.is_finite() || dt <= 0.0 {
        return StepReport::default();
    }
    let dt = dt.min(state.tuning.max_dt);
    state.time = t;

    let tuning = &state.tuning;
    let drag = tuning.drag.powf(dt * 60.0);
    let (w, h) = (state.width, state.height);
    let mut wall_hits = 0;

    for duck in &mut state.ducks {
        if duck.pinned {
            duck.vel = Vec2::ZERO;
            continue;
        }
        if duck.grabbed {
            continue;
        }

        let accel = drift_accel(t, duck.drift_seed_x, duck.drift_seed_y, tuning.drift_accel);
        duck.vel += accel * dt;
        duck.vel *= drag;
        duck.pos += duck.vel * dt;

        let hit = resolve_walls(
            &mut duck.pos,
            &mut duck.vel,
            duck.radius,
            w,
            h,
            tuning.wall_restitution,
        );
        if hit.any() {
            wall_hits += 1;
        }
    }

    let contacts = resolve_all_pairs(
        &mut state.ducks,
        tuning.pair_restitution,
        tuning.grabbed_mobility,
    );

    // Separation can push a duck through a wall
    for duck in &mut state.ducks {
        duck.pos = clamp_to_bounds(duck.pos, duck.radius, w, h);
        if duck.pinned {
            duck.vel = Vec2::ZERO;
        }
    }

    let orb_hit = step_orb(state, dt, t);
    step_score(state, dt);

    for ripple in &mut state.ripples {
        ripple.age += dt;
    }
    state.ripples.retain(|r| !r.is_done());

    StepReport {
        contacts,
        wall_hits,
        orb_hit,
    }
}
