//! Pond settings and tuning
//!
//! Preferences are persisted in LocalStorage. The physics, scoring and
//! carousel constants live in `Tuning`; they are tuned by feel, so they are
//! configuration rather than invariants.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SPRITE_TEMPLATE;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Number of starfield particles for this preset
    pub fn max_stars(&self) -> usize {
        match self {
            QualityPreset::Low => 0,
            QualityPreset::Medium => 90,
            QualityPreset::High => 180,
        }
    }

    /// Whether to render the starfield at all
    pub fn starfield_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// What the card ring does when a drag is released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CarouselMode {
    /// Ease straight to the nearest card
    #[default]
    Snap,
    /// Keep spinning with the release velocity, then snap
    Coast,
}

/// Physics, scoring, input and carousel constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Frame ===
    /// Largest step the integrator accepts (seconds)
    pub max_dt: f32,

    // === Ducks ===
    pub duck_radius_min: f32,
    pub duck_radius_max: f32,
    /// Duck radius as a fraction of the smaller canvas dimension
    pub duck_radius_scale: f32,
    /// Initial speed range (px/s, each axis)
    pub spawn_speed: f32,
    /// Spawn spread around centre as a fraction of width / height
    pub spawn_spread_x: f32,
    pub spawn_spread_y: f32,
    /// Ambient drift acceleration (px/s^2)
    pub drift_accel: f32,
    /// Per-frame (60 Hz) velocity multiplier
    pub drag: f32,
    pub wall_restitution: f32,
    pub pair_restitution: f32,
    /// How readily a held duck yields in pair separation (free ducks are 1.0)
    pub grabbed_mobility: f32,

    // === Orb ===
    pub orb_radius: f32,
    pub orb_sense_radius: f32,
    pub orb_repulsion: f32,
    /// Extra repulsion multiplier from a duck being dragged
    pub orb_drag_boost: f32,
    /// Duck speed that doubles its repulsion (px/s)
    pub orb_speed_ref: f32,
    pub orb_center_spring: f32,
    pub orb_wander: f32,
    /// Per-frame (60 Hz) velocity multiplier
    pub orb_damping: f32,
    pub orb_max_speed: f32,
    pub orb_wall_restitution: f32,
    /// Grace window after a duck touches the orb (seconds)
    pub orb_hit_cooldown: f32,
    /// Outward speed added to the orb on contact (px/s)
    pub orb_bump: f32,

    // === Score ===
    pub score_base_rate: f32,
    pub score_proximity_k: f32,
    pub score_proximity_cap: f32,
    pub score_drag_bonus: f32,
    pub score_drag_near_radius: f32,
    pub score_hit_penalty: f32,

    // === Input ===
    pub double_tap_ms: f64,
    /// Total pointer travel below which a release counts as a tap (px)
    pub tap_slop: f32,
    /// Weight kept from the previous velocity estimate
    pub drag_smoothing: f32,
    pub max_throw_speed: f32,
    pub burst_radius: f32,
    pub burst_strength: f32,
    /// Ripple fade-out duration (seconds)
    pub ripple_duration: f32,

    // === Carousel ===
    /// Ring rotation per horizontal pixel dragged (degrees)
    pub ring_drag_factor: f32,
    pub ring_radius_min: f32,
    pub ring_radius_max: f32,
    /// Ring radius as a fraction of container width
    pub ring_radius_scale: f32,
    /// Snap tween duration (seconds)
    pub ring_snap_duration: f32,
    /// Pointer travel that turns a click into a drag (px)
    pub ring_click_threshold: f32,
    /// Per-frame (60 Hz) coast velocity multiplier
    pub ring_coast_damping: f32,
    /// Coast speed below which the ring snaps (deg/s)
    pub ring_coast_min_speed: f32,
    pub ring_max_tilt_deg: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_dt: 1.0 / 30.0,

            duck_radius_min: 30.0,
            duck_radius_max: 52.0,
            duck_radius_scale: 0.09,
            spawn_speed: 40.0,
            spawn_spread_x: 0.35,
            spawn_spread_y: 0.25,
            drift_accel: 18.0,
            drag: 0.985,
            wall_restitution: 0.82,
            pair_restitution: 0.9,
            grabbed_mobility: 0.25,

            orb_radius: 22.0,
            orb_sense_radius: 260.0,
            orb_repulsion: 900.0,
            orb_drag_boost: 2.5,
            orb_speed_ref: 400.0,
            orb_center_spring: 0.6,
            orb_wander: 40.0,
            orb_damping: 0.96,
            orb_max_speed: 520.0,
            orb_wall_restitution: 0.55,
            orb_hit_cooldown: 1.2,
            orb_bump: 140.0,

            score_base_rate: 1.0,
            score_proximity_k: 180.0,
            score_proximity_cap: 6.0,
            score_drag_bonus: 3.0,
            score_drag_near_radius: 160.0,
            score_hit_penalty: 0.15,

            double_tap_ms: 280.0,
            tap_slop: 10.0,
            drag_smoothing: 0.7,
            max_throw_speed: 1400.0,
            burst_radius: 220.0,
            burst_strength: 420.0,
            ripple_duration: 0.9,

            ring_drag_factor: 0.35,
            ring_radius_min: 160.0,
            ring_radius_max: 380.0,
            ring_radius_scale: 0.35,
            ring_snap_duration: 0.35,
            ring_click_threshold: 6.0,
            ring_coast_damping: 0.92,
            ring_coast_min_speed: 12.0,
            ring_max_tilt_deg: 8.0,
        }
    }
}

/// Keep `value` when it is finite and at least `min`, otherwise use `fallback`
fn at_least(value: f32, min: f32, fallback: f32) -> f32 {
    if value.is_finite() && value >= min { value } else { fallback }
}

fn positive(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 { value } else { fallback }
}

/// Finite and inside `[0, 1]`
fn unit(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && (0.0..=1.0).contains(&value) { value } else { fallback }
}

impl Tuning {
    /// Replace every non-finite or out-of-range constant with its default.
    /// Min/max pairs are reordered so `max >= min`.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        let mut t = Self {
            max_dt: positive(self.max_dt, d.max_dt),

            duck_radius_min: positive(self.duck_radius_min, d.duck_radius_min),
            duck_radius_max: positive(self.duck_radius_max, d.duck_radius_max),
            duck_radius_scale: positive(self.duck_radius_scale, d.duck_radius_scale),
            spawn_speed: at_least(self.spawn_speed, 0.0, d.spawn_speed),
            spawn_spread_x: unit(self.spawn_spread_x, d.spawn_spread_x),
            spawn_spread_y: unit(self.spawn_spread_y, d.spawn_spread_y),
            drift_accel: at_least(self.drift_accel, 0.0, d.drift_accel),
            drag: unit(self.drag, d.drag),
            wall_restitution: unit(self.wall_restitution, d.wall_restitution),
            pair_restitution: unit(self.pair_restitution, d.pair_restitution),
            grabbed_mobility: unit(self.grabbed_mobility, d.grabbed_mobility),

            orb_radius: positive(self.orb_radius, d.orb_radius),
            orb_sense_radius: positive(self.orb_sense_radius, d.orb_sense_radius),
            orb_repulsion: at_least(self.orb_repulsion, 0.0, d.orb_repulsion),
            orb_drag_boost: at_least(self.orb_drag_boost, 0.0, d.orb_drag_boost),
            orb_speed_ref: positive(self.orb_speed_ref, d.orb_speed_ref),
            orb_center_spring: at_least(self.orb_center_spring, 0.0, d.orb_center_spring),
            orb_wander: at_least(self.orb_wander, 0.0, d.orb_wander),
            orb_damping: unit(self.orb_damping, d.orb_damping),
            orb_max_speed: positive(self.orb_max_speed, d.orb_max_speed),
            orb_wall_restitution: unit(self.orb_wall_restitution, d.orb_wall_restitution),
            orb_hit_cooldown: at_least(self.orb_hit_cooldown, 0.0, d.orb_hit_cooldown),
            orb_bump: at_least(self.orb_bump, 0.0, d.orb_bump),

            score_base_rate: at_least(self.score_base_rate, 0.0, d.score_base_rate),
            score_proximity_k: at_least(self.score_proximity_k, 0.0, d.score_proximity_k),
            score_proximity_cap: at_least(self.score_proximity_cap, 0.0, d.score_proximity_cap),
            score_drag_bonus: at_least(self.score_drag_bonus, 0.0, d.score_drag_bonus),
            score_drag_near_radius: at_least(
                self.score_drag_near_radius,
                0.0,
                d.score_drag_near_radius,
            ),
            score_hit_penalty: unit(self.score_hit_penalty, d.score_hit_penalty),

            double_tap_ms: if self.double_tap_ms.is_finite() && self.double_tap_ms >= 0.0 {
                self.double_tap_ms
            } else {
                d.double_tap_ms
            },
            tap_slop: at_least(self.tap_slop, 0.0, d.tap_slop),
            drag_smoothing: unit(self.drag_smoothing, d.drag_smoothing),
            max_throw_speed: positive(self.max_throw_speed, d.max_throw_speed),
            burst_radius: positive(self.burst_radius, d.burst_radius),
            burst_strength: at_least(self.burst_strength, 0.0, d.burst_strength),
            ripple_duration: positive(self.ripple_duration, d.ripple_duration),

            ring_drag_factor: positive(self.ring_drag_factor, d.ring_drag_factor),
            ring_radius_min: positive(self.ring_radius_min, d.ring_radius_min),
            ring_radius_max: positive(self.ring_radius_max, d.ring_radius_max),
            ring_radius_scale: positive(self.ring_radius_scale, d.ring_radius_scale),
            ring_snap_duration: at_least(self.ring_snap_duration, 0.0, d.ring_snap_duration),
            ring_click_threshold: at_least(self.ring_click_threshold, 0.0, d.ring_click_threshold),
            ring_coast_damping: unit(self.ring_coast_damping, d.ring_coast_damping),
            ring_coast_min_speed: at_least(self.ring_coast_min_speed, 0.0, d.ring_coast_min_speed),
            ring_max_tilt_deg: at_least(self.ring_max_tilt_deg, 0.0, d.ring_max_tilt_deg),
        };

        if t.duck_radius_max < t.duck_radius_min {
            std::mem::swap(&mut t.duck_radius_min, &mut t.duck_radius_max);
        }
        if t.ring_radius_max < t.ring_radius_min {
            std::mem::swap(&mut t.ring_radius_min, &mut t.ring_radius_max);
        }
        t
    }
}

/// Pond settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Starfield particles behind the pond
    pub starfield: bool,
    /// Ripple rings on bursts
    pub ripples: bool,
    /// Let the frame-rate guard switch the starfield off under load
    pub auto_degrade: bool,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Carousel ===
    /// Pointer tilt parallax on the card ring
    pub carousel_tilt: bool,
    /// Release behaviour of the card ring
    pub carousel_mode: CarouselMode,

    // === Assets ===
    /// Sprite URL template; `{day}` is replaced by the cycle day
    pub sprite_template: String,

    // === Accessibility ===
    /// Reduced motion (static grid, no physics, instant carousel snaps)
    pub reduced_motion: bool,

    /// Feel constants
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            starfield: true,
            ripples: true,
            auto_degrade: true,
            show_fps: false,
            carousel_tilt: true,
            carousel_mode: CarouselMode::Snap,
            sprite_template: DEFAULT_SPRITE_TEMPLATE.to_string(),
            reduced_motion: false,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        if preset == QualityPreset::Low {
            self.ripples = false;
        }
    }

    /// Effective starfield (respects preset and reduced_motion)
    pub fn effective_starfield(&self) -> bool {
        self.starfield && self.quality.starfield_enabled() && !self.reduced_motion
    }

    /// Effective star count cap
    pub fn max_stars(&self) -> usize {
        if self.effective_starfield() {
            self.quality.max_stars()
        } else {
            0
        }
    }

    /// Parse settings from JSON; missing fields take defaults and
    /// out-of-range tuning falls back to the default constant
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<Self>(json) {
            Ok(mut settings) => {
                settings.tuning = settings.tuning.sanitized();
                Some(settings)
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings: {}", e);
                None
            }
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "duck_pond_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
