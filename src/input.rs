//! Pointer input state machine
//!
//! Raw browser events are translated once into `PointerEvent`; the
//! controller then drives grab, drag, throw, double-tap pin and burst.
//! Only one pointer drives a drag at a time.

use glam::Vec2;

use crate::clamp_to_bounds;
use crate::sim::collision::contact_normal;
use crate::sim::state::{PondState, Ripple};

/// Pointer lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Normalized pointer event in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub pointer_id: i32,
    pub phase: PointerPhase,
    /// Event timestamp (milliseconds, monotonic)
    pub time_ms: f64,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, pointer_id: i32, x: f32, y: f32, time_ms: f64) -> Self {
        Self {
            x,
            y,
            pointer_id,
            phase,
            time_ms,
        }
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// What an event did, for status text and effects
#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    Ignored,
    Grabbed { id: String },
    Dragged { id: String },
    Launched { id: String, speed: f32 },
    Pinned { id: String },
    Unpinned { id: String },
    Burst { pos: Vec2, affected: usize },
}

/// Transient state of one drag gesture
#[derive(Debug, Clone)]
struct DragSession {
    pointer_id: i32,
    duck_id: String,
    last_pos: Vec2,
    last_time: f64,
    smoothed_vel: Vec2,
    /// Total pointer travel since the grab
    travel: f32,
}

/// Previous tap release, for double-tap detection
#[derive(Debug, Clone)]
struct LastTap {
    duck_id: String,
    time_ms: f64,
}

#[derive(Debug, Clone, Default)]
pub struct InputController {
    session: Option<DragSession>,
    last_tap: Option<LastTap>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag gesture is in progress
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Id of the duck being dragged
    pub fn dragged_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.duck_id.as_str())
    }

    /// Drop any gesture state (profiles changed under us, pond destroyed)
    pub fn reset(&mut self, state: &mut PondState) {
        if let Some(session) = self.session.take() {
            if let Some(i) = state.find(&session.duck_id) {
                state.ducks[i].grabbed = false;
            }
        }
        self.last_tap = None;
    }

    pub fn handle(&mut self, state: &mut PondState, event: PointerEvent) -> InputOutcome {
        match event.phase {
            PointerPhase::Down => self.pointer_down(state, event),
            PointerPhase::Move => self.pointer_move(state, event),
            PointerPhase::Up | PointerPhase::Cancel => self.pointer_up(state, event),
        }
    }

    fn pointer_down(&mut self, state: &mut PondState, event: PointerEvent) -> InputOutcome {
        if self.session.is_some() {
            return InputOutcome::Ignored;
        }

        let pos = event.pos();
        match state.pick(pos) {
            Some(i) => {
                let duck = &mut state.ducks[i];
                duck.vel = Vec2::ZERO;
                duck.grabbed = true;
                self.session = Some(DragSession {
                    pointer_id: event.pointer_id,
                    duck_id: duck.id.clone(),
                    last_pos: pos,
                    last_time: event.time_ms,
                    smoothed_vel: Vec2::ZERO,
                    travel: 0.0,
                });
                log::debug!("Grabbed {}", duck.id);
                InputOutcome::Grabbed {
                    id: duck.id.clone(),
                }
            }
            None => {
                let affected = apply_burst(state, pos);
                InputOutcome::Burst { pos, affected }
            }
        }
    }

    fn pointer_move(&mut self, state: &mut PondState, event: PointerEvent) -> InputOutcome {
        let Some(session) = self.session.as_mut() else {
            return InputOutcome::Ignored;
        };
        if session.pointer_id != event.pointer_id {
            return InputOutcome::Ignored;
        }
        let Some(i) = state.find(&session.duck_id) else {
            // Profile removed mid-drag
            self.session = None;
            return InputOutcome::Ignored;
        };

        let pos = event.pos();
        let elapsed = ((event.time_ms - session.last_time) / 1000.0) as f32;
        if elapsed > 0.0 {
            let instant = (pos - session.last_pos) / elapsed;
            let keep = state.tuning.drag_smoothing;
            session.smoothed_vel = session.smoothed_vel * keep + instant * (1.0 - keep);
        }
        session.travel += pos.distance(session.last_pos);
        session.last_pos = pos;
        session.last_time = event.time_ms;

        let (w, h) = (state.width, state.height);
        let duck = &mut state.ducks[i];
        duck.pos = clamp_to_bounds(pos, duck.radius, w, h);
        duck.vel = session.smoothed_vel;
        InputOutcome::Dragged {
            id: duck.id.clone(),
        }
    }

    fn pointer_up(&mut self, state: &mut PondState, event: PointerEvent) -> InputOutcome {
        match &self.session {
            Some(s) if s.pointer_id == event.pointer_id => {}
            _ => return InputOutcome::Ignored,
        }
        let Some(session) = self.session.take() else {
            return InputOutcome::Ignored;
        };
        let Some(i) = state.find(&session.duck_id) else {
            return InputOutcome::Ignored;
        };

        let tuning = &state.tuning;
        let is_tap = session.travel <= tuning.tap_slop;
        let double_tap = is_tap
            && self.last_tap.as_ref().is_some_and(|tap| {
                tap.duck_id == session.duck_id
                    && event.time_ms - tap.time_ms <= tuning.double_tap_ms
            });
        let max_throw = tuning.max_throw_speed;

        let duck = &mut state.ducks[i];
        duck.grabbed = false;

        if double_tap {
            self.last_tap = None;
            duck.pinned = !duck.pinned;
            duck.vel = Vec2::ZERO;
            let id = duck.id.clone();
            log::debug!("{} {}", if duck.pinned { "Pinned" } else { "Unpinned" }, id);
            return if duck.pinned {
                InputOutcome::Pinned { id }
            } else {
                InputOutcome::Unpinned { id }
            };
        }

        self.last_tap = is_tap.then(|| LastTap {
            duck_id: session.duck_id.clone(),
            time_ms: event.time_ms,
        });

        duck.vel = session.smoothed_vel.clamp_length_max(max_throw);
        let speed = duck.vel.length();
        log::debug!("Launched {} at {:.0} px/s", duck.id, speed);
        InputOutcome::Launched {
            id: duck.id.clone(),
            speed,
        }
    }
}

/// Radial impulse on every free duck within the burst radius, falling off
/// linearly with distance. Returns the number of ducks pushed.
pub fn apply_burst(state: &mut PondState, at: Vec2) -> usize {
    let radius = state.tuning.burst_radius;
    let strength = state.tuning.burst_strength;
    let mut affected = 0;

    for duck in state.ducks.iter_mut().filter(|d| d.is_free()) {
        let (dir, dist) = contact_normal(at, duck.pos);
        if dist >= radius {
            continue;
        }
        duck.vel += dir * strength * (1.0 - dist / radius);
        affected += 1;
    }

    state.ripples.push(Ripple {
        pos: at,
        age: 0.0,
        duration: state.tuning.ripple_duration,
    });
    affected
}
