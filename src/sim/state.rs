//! Pond state and core simulation types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::settings::Tuning;
use crate::{clamp_to_bounds, sanitize_dimensions};

/// A user profile as supplied by the host page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub birthdate: String,
}

impl Profile {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, birthdate: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            birthdate: birthdate.into(),
        }
    }
}

/// A simulated duck, one per profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Duck {
    /// Owning profile id
    pub id: String,
    pub name: String,
    pub birthdate: String,
    /// Origin cycle day, `None` for an unparseable birthdate
    pub cycle_day: Option<u8>,
    /// Sprite URL for the cycle day
    pub sprite: Option<String>,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Phase seeds for the idle drift waveforms
    pub drift_seed_x: f32,
    pub drift_seed_y: f32,
    pub pulse_seed: f32,
    /// Frozen: velocity forced to zero every step
    pub pinned: bool,
    /// Held by the pointer (not serialized, gesture-scoped)
    #[serde(skip)]
    pub grabbed: bool,
}

impl Duck {
    /// A resting, unpinned duck with zeroed seeds
    pub fn new(id: impl Into<String>, name: impl Into<String>, pos: Vec2, radius: f32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            birthdate: String::new(),
            cycle_day: None,
            sprite: None,
            pos,
            vel: Vec2::ZERO,
            radius,
            drift_seed_x: 0.0,
            drift_seed_y: 0.0,
            pulse_seed: 0.0,
            pinned: false,
            grabbed: false,
        }
    }

    /// Label glyph used until the sprite loads
    pub fn glyph(&self) -> String {
        self.name
            .chars()
            .find(|c| !c.is_whitespace())
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_else(|| "?".to_string())
    }

    /// Whether the point lies within this duck's circle
    pub fn contains(&self, point: Vec2) -> bool {
        self.pos.distance_squared(point) <= self.radius * self.radius
    }

    pub fn is_free(&self) -> bool {
        !self.pinned && !self.grabbed
    }
}

/// The antagonist orb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orb {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Grace window after a duck touched the orb (seconds, never negative)
    pub hit_cooldown: f32,
    pub active: bool,
}

impl Orb {
    pub fn new(radius: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius,
            hit_cooldown: 0.0,
            active: false,
        }
    }

    pub fn is_cooling_down(&self) -> bool {
        self.hit_cooldown > 0.0
    }
}

/// Expanding ring left by a burst
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ripple {
    pub pos: Vec2,
    pub age: f32,
    pub duration: f32,
}

impl Ripple {
    /// 0 at spawn, 1 when finished
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.age / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn is_done(&self) -> bool {
        self.age >= self.duration
    }
}

/// Complete pond simulation state
#[derive(Debug, Clone)]
pub struct PondState {
    pub width: f32,
    pub height: f32,
    /// Ducks in profile order
    pub ducks: Vec<Duck>,
    pub orb: Orb,
    /// Accumulated score, displayed floored
    pub score: f64,
    /// Simulation clock (seconds)
    pub time: f32,
    /// Burst ripples (visual only)
    pub ripples: Vec<Ripple>,
    pub tuning: Tuning,
    pub rng: Pcg32,
}

impl PondState {
    pub fn new(width: f32, height: f32, tuning: Tuning, seed: u64) -> Self {
        let (width, height) = sanitize_dimensions(width, height);
        let orb = Orb::new(tuning.orb_radius);
        Self {
            width,
            height,
            ducks: Vec::new(),
            orb,
            score: 0.0,
            time: 0.0,
            ripples: Vec::new(),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Duck radius for the current canvas, clamped to the design range
    pub fn duck_radius(&self) -> f32 {
        let t = &self.tuning;
        (self.width.min(self.height) * t.duck_radius_scale)
            .clamp(t.duck_radius_min, t.duck_radius_max)
    }

    /// Floored score for display
    pub fn display_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    pub fn find(&self, id: &str) -> Option<usize> {
        self.ducks.iter().position(|d| d.id == id)
    }

    /// Swap in new constants; body radii follow immediately
    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.tuning = tuning;
        self.orb.radius = self.tuning.orb_radius;
        self.resize(self.width, self.height);
    }

    /// Resize the pond; ducks and orb are rescaled and re-clamped
    pub fn resize(&mut self, width: f32, height: f32) {
        let (width, height) = sanitize_dimensions(width, height);
        let sx = width / self.width;
        let sy = height / self.height;
        self.width = width;
        self.height = height;

        let radius = self.duck_radius();
        for duck in &mut self.ducks {
            duck.radius = radius;
            duck.pos = clamp_to_bounds(duck.pos * Vec2::new(sx, sy), radius, width, height);
        }
        self.orb.pos = clamp_to_bounds(
            self.orb.pos * Vec2::new(sx, sy),
            self.orb.radius,
            width,
            height,
        );
    }

    /// Hit-test: nearest duck whose circle contains the point
    pub fn pick(&self, point: Vec2) -> Option<usize> {
        self.ducks
            .iter()
            .enumerate()
            .filter(|(_, d)| d.contains(point))
            .min_by(|(_, a), (_, b)| {
                a.pos
                    .distance_squared(point)
                    .partial_cmp(&b.pos.distance_squared(point))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
    }
}
