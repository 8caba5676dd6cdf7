//! Duck Pond - drag, throw and pin cycle ducks while an orb dodges them
//!
//! Core modules:
//! - `cycle`: 18-day origin cycle resolver
//! - `sim`: Pond simulation (entity pool, physics, orb, scoring)
//! - `input`: Pointer state machine (grab, drag, throw, pin, burst)
//! - `renderer`: Surface-agnostic drawing (starfield, ripples, ducks)
//! - `carousel`: 3D card ring with drag, snap and coast
//! - `platform`: Tick scheduler, sinks, sprite resolution, asset epochs
//! - `pond`: The simulation facade the browser adapter talks to
//! - `settings`: Persisted preferences and tuning constants

pub mod carousel;
pub mod cycle;
pub mod input;
pub mod platform;
pub mod pond;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use carousel::{CarouselMode, RingCarousel};
pub use cycle::{CycleError, CYCLE_LENGTH};
pub use pond::Pond;
pub use settings::{QualityPreset, Settings, Tuning};

use glam::Vec2;

/// Pond configuration constants
pub mod consts {
    /// Canvas size used when the container is hidden or zero-sized
    pub const FALLBACK_WIDTH: f32 = 800.0;
    pub const FALLBACK_HEIGHT: f32 = 600.0;

    /// Guard for normalizing near-zero vectors
    pub const EPSILON: f32 = 1e-4;

    /// Delay after a fullscreen toggle before canvas dimensions are re-read
    pub const FULLSCREEN_SETTLE_MS: i32 = 250;

    /// Anchor date used when the host does not supply one
    pub const DEFAULT_ANCHOR: &str = "1985-04-20";

    /// Sprite path template, `{day}` is replaced with 1..=18
    pub const DEFAULT_SPRITE_TEMPLATE: &str = "/ducks/duck-{day}.png";

    /// Status strings
    pub const STATUS_INTRO: &str =
        "Drag and throw the ducks. Tap the water to splash, double-tap a duck to pin it.";
    pub const STATUS_EMPTY: &str = "Add a profile to fill the pond.";
    pub const STATUS_BURST: &str = "Splash!";
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}

/// Shortest signed angular distance from `from` to `to`, in degrees (-180, 180]
#[inline]
pub fn shortest_degrees(from: f32, to: f32) -> f32 {
    let d = normalize_degrees(to - from);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Clamp a point so a circle of `radius` stays inside a `width` x `height` box
#[inline]
pub fn clamp_to_bounds(pos: Vec2, radius: f32, width: f32, height: f32) -> Vec2 {
    // A circle larger than the box pins to the centre on that axis
    let clamp_axis = |v: f32, extent: f32| {
        if extent < 2.0 * radius {
            extent / 2.0
        } else {
            v.clamp(radius, extent - radius)
        }
    };
    Vec2::new(clamp_axis(pos.x, width), clamp_axis(pos.y, height))
}

/// Replace zero, negative or non-finite canvas dimensions with the fallback size
pub fn sanitize_dimensions(width: f32, height: f32) -> (f32, f32) {
    let ok = |v: f32| v.is_finite() && v >= 1.0;
    if ok(width) && ok(height) {
        (width, height)
    } else {
        log::warn!(
            "Invalid canvas size {}x{}, using {}x{}",
            width,
            height,
            consts::FALLBACK_WIDTH,
            consts::FALLBACK_HEIGHT
        );
        (consts::FALLBACK_WIDTH, consts::FALLBACK_HEIGHT)
    }
}
