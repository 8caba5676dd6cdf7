//! 3D card ring
//!
//! One card per profile placed at `rotateY(i * step) translateZ(radius)`.
//! Cards never move individually; dragging turns the whole ring, and on
//! release the ring settles on a multiple of `step` so a card faces front.
//!
//! Two release behaviours:
//! - `Snap`: ease-out tween to the nearest card
//! - `Coast`: keep the drag velocity, damp it, then snap

use chrono::NaiveDate;
use glam::Vec2;

use crate::cycle::{resolve_origin, today_cycle_day};
pub use crate::settings::CarouselMode;
use crate::settings::{Settings, Tuning};
use crate::sim::state::Profile;
use crate::{normalize_degrees, shortest_degrees};


/// One profile card
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: String,
    pub name: String,
    /// Origin cycle day relative to the anchor date
    pub origin_day: Option<u8>,
    /// Where today falls in the card holder's own cycle
    pub today_day: Option<u8>,
}

impl Card {
    pub fn from_profile(profile: &Profile, anchor: &str, today: Option<NaiveDate>) -> Self {
        let today_day = today.and_then(|d| today_cycle_day(&profile.birthdate, d).ok());
        Self {
            id: profile.id.clone(),
            name: profile.display_name.clone(),
            origin_day: resolve_origin(&profile.birthdate, anchor),
            today_day,
        }
    }
}

/// Static placement of one card on the ring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    /// Resting angle, `i * step`
    pub angle: f32,
    pub radius: f32,
    /// Closest card to the viewer, for styling only
    pub front: bool,
}

impl CardTransform {
    pub fn css(&self) -> String {
        format!("rotateY({:.3}deg) translateZ({:.1}px)", self.angle, self.radius)
    }
}

/// Cubic ease-out, `t` in 0..=1
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

#[derive(Debug, Clone)]
struct RingDrag {
    pointer_id: i32,
    last_x: f32,
    last_time_ms: f64,
    travel: f32,
    /// Smoothed angular velocity (deg/s)
    velocity: f32,
}

#[derive(Debug, Clone, Copy)]
struct SnapTween {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

#[derive(Debug, Clone)]
pub struct RingCarousel {
    cards: Vec<Card>,
    /// Ring rotation in degrees, unbounded
    rotation: f32,
    /// Coast velocity (deg/s)
    velocity: f32,
    coasting: bool,
    step: f32,
    radius: f32,
    mode: CarouselMode,
    reduced_motion: bool,
    tilt_enabled: bool,
    tuning: Tuning,
    drag: Option<RingDrag>,
    snap: Option<SnapTween>,
    /// The last release was a drag, so the click that follows is swallowed
    suppress_click: bool,
    /// Current tilt (x = rotateX, y = rotateY, degrees)
    tilt: Vec2,
    tilt_target: Vec2,
}

impl RingCarousel {
    pub fn new(settings: &Settings, mode: CarouselMode) -> Self {
        let tuning = settings.tuning.clone().sanitized();
        Self {
            cards: Vec::new(),
            rotation: 0.0,
            velocity: 0.0,
            coasting: false,
            step: 0.0,
            radius: tuning.ring_radius_min,
            mode,
            reduced_motion: settings.reduced_motion,
            tilt_enabled: settings.carousel_tilt,
            tuning,
            drag: None,
            snap: None,
            suppress_click: false,
            tilt: Vec2::ZERO,
            tilt_target: Vec2::ZERO,
        }
    }

    /// Replace the cards. The ring lands on the nearest card for the new count.
    pub fn set_profiles(&mut self, profiles: &[Profile], anchor: &str, today: Option<NaiveDate>) {
        self.cards = profiles
            .iter()
            .map(|p| Card::from_profile(p, anchor, today))
            .collect();
        self.step = if self.cards.is_empty() {
            0.0
        } else {
            360.0 / self.cards.len() as f32
        };
        self.drag = None;
        self.snap = None;
        self.coasting = false;
        self.velocity = 0.0;
        self.rotation = self.nearest_snap(self.rotation);
        log::debug!("Carousel holds {} cards, step {:.1}", self.cards.len(), self.step);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn mode(&self) -> CarouselMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CarouselMode) {
        self.mode = mode;
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
        if reduced {
            self.tilt = Vec2::ZERO;
            self.tilt_target = Vec2::ZERO;
            if let Some(snap) = self.snap.take() {
                self.rotation = snap.to;
            }
            if self.coasting {
                self.coasting = false;
                self.velocity = 0.0;
                self.rotation = self.nearest_snap(self.rotation);
            }
        }
    }

    /// Pick the ring radius for a container width
    pub fn layout(&mut self, container_width: f32) -> f32 {
        let t = &self.tuning;
        let width = if container_width.is_finite() && container_width > 0.0 {
            container_width
        } else {
            crate::consts::FALLBACK_WIDTH
        };
        self.radius = (width * t.ring_radius_scale).clamp(t.ring_radius_min, t.ring_radius_max);
        self.radius
    }

    pub fn card_transform(&self, index: usize) -> Option<CardTransform> {
        if index >= self.cards.len() {
            return None;
        }
        Some(CardTransform {
            angle: index as f32 * self.step,
            radius: self.radius,
            front: self.front_index() == Some(index),
        })
    }

    /// Transform for the ring container: pushes the ring back by its radius,
    /// applies tilt, then the ring rotation
    pub fn ring_css(&self) -> String {
        format!(
            "translateZ({:.1}px) rotateX({:.3}deg) rotateY({:.3}deg) rotateY({:.3}deg)",
            -self.radius, self.tilt.x, self.tilt.y, self.rotation
        )
    }

    /// Card whose effective angle is closest to 0°
    pub fn front_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for i in 0..self.cards.len() {
            let angle = normalize_degrees(i as f32 * self.step + self.rotation);
            let distance = angle.min(360.0 - angle);
            match best {
                Some((_, d)) if d <= distance => {}
                _ => best = Some((i, distance)),
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// No drag, tween or coast in progress
    pub fn is_settled(&self) -> bool {
        self.drag.is_none() && self.snap.is_none() && !self.coasting
    }

    pub fn pointer_down(&mut self, pointer_id: i32, x: f32, time_ms: f64) {
        if self.drag.is_some() || self.cards.is_empty() {
            return;
        }
        // Grabbing the ring stops whatever it was doing
        self.snap = None;
        self.coasting = false;
        self.velocity = 0.0;
        self.suppress_click = false;
        self.drag = Some(RingDrag {
            pointer_id,
            last_x: x,
            last_time_ms: time_ms,
            travel: 0.0,
            velocity: 0.0,
        });
    }

    pub fn pointer_move(&mut self, pointer_id: i32, x: f32, time_ms: f64) {
        let factor = self.tuning.ring_drag_factor;
        let Some(drag) = self.drag.as_mut().filter(|d| d.pointer_id == pointer_id) else {
            return;
        };
        let dx = x - drag.last_x;
        let delta = dx * factor;
        self.rotation += delta;

        let dt_s = ((time_ms - drag.last_time_ms) / 1000.0) as f32;
        if dt_s > 0.0 {
            drag.velocity = drag.velocity * 0.7 + (delta / dt_s) * 0.3;
        }
        drag.travel += dx.abs();
        drag.last_x = x;
        drag.last_time_ms = time_ms;
    }

    /// End a drag. Returns true when the gesture moved far enough to count
    /// as a drag (the following click is then ignored).
    pub fn pointer_up(&mut self, pointer_id: i32) -> bool {
        let Some(drag) = self.drag.take_if(|d| d.pointer_id == pointer_id) else {
            return false;
        };
        let dragged = drag.travel > self.tuning.ring_click_threshold;
        self.suppress_click = dragged;

        let coast = self.mode == CarouselMode::Coast
            && !self.reduced_motion
            && drag.velocity.abs() > self.tuning.ring_coast_min_speed;
        if coast {
            self.velocity = drag.velocity;
            self.coasting = true;
        } else {
            let target = self.nearest_snap(self.rotation);
            self.animate_to(target);
        }
        dragged
    }

    /// Bring card `index` to the front by the shortest way round. Returns
    /// false when the click was the tail of a drag or the index is invalid.
    pub fn click_card(&mut self, index: usize) -> bool {
        if std::mem::take(&mut self.suppress_click) {
            return false;
        }
        if index >= self.cards.len() || self.drag.is_some() {
            return false;
        }
        self.coasting = false;
        self.velocity = 0.0;
        let wanted = -(index as f32) * self.step;
        let target = self.rotation + shortest_degrees(self.rotation, wanted);
        self.animate_to(target);
        true
    }

    /// Pointer position over the ring, normalized to [-1, 1]
    pub fn set_tilt_pointer(&mut self, nx: f32, ny: f32) {
        if !self.tilt_enabled || self.reduced_motion {
            self.tilt_target = Vec2::ZERO;
            return;
        }
        let max = self.tuning.ring_max_tilt_deg;
        let nx = if nx.is_finite() { nx.clamp(-1.0, 1.0) } else { 0.0 };
        let ny = if ny.is_finite() { ny.clamp(-1.0, 1.0) } else { 0.0 };
        self.tilt_target = Vec2::new(-ny * max, nx * max);
    }

    pub fn tilt(&self) -> Vec2 {
        self.tilt
    }

    /// Advance tweens, coasting and tilt. Returns true while anything moves.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !dt.is_finite() || dt <= 0.0 {
            return !self.is_settled();
        }

        if self.coasting {
            self.rotation += self.velocity * dt;
            self.velocity *= self.tuning.ring_coast_damping.powf(dt * 60.0);
            if self.velocity.abs() < self.tuning.ring_coast_min_speed {
                self.coasting = false;
                self.velocity = 0.0;
                let target = self.nearest_snap(self.rotation);
                self.animate_to(target);
            }
        }

        if let Some(mut snap) = self.snap {
            snap.elapsed += dt;
            if snap.elapsed >= snap.duration {
                self.rotation = snap.to;
                self.snap = None;
            } else {
                let k = ease_out_cubic(snap.elapsed / snap.duration);
                self.rotation = snap.from + (snap.to - snap.from) * k;
                self.snap = Some(snap);
            }
        }

        // Tilt eases toward its target
        let blend = 1.0 - 0.85f32.powf(dt * 60.0);
        self.tilt += (self.tilt_target - self.tilt) * blend;

        !self.is_settled()
    }

    fn nearest_snap(&self, rotation: f32) -> f32 {
        if self.step <= 0.0 {
            return rotation;
        }
        (rotation / self.step).round() * self.step
    }

    fn animate_to(&mut self, target: f32) {
        if self.reduced_motion || self.tuning.ring_snap_duration <= 0.0 {
            self.rotation = target;
            self.snap = None;
            return;
        }
        self.snap = Some(SnapTween {
            from: self.rotation,
            to: target,
            elapsed: 0.0,
            duration: self.tuning.ring_snap_duration,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiles(n: usize) -> Vec<Profile> {
        (0..n)
            .map(|i| Profile::new(format!("p{i}"), format!("Name {i}"), "1990-01-01"))
            .collect()
    }

    fn carousel(n: usize, mode: CarouselMode) -> RingCarousel {
        let mut ring = RingCarousel::new(&Settings::default(), mode);
        ring.set_profiles(&profiles(n), "1985-04-20", None);
        ring
    }

    fn settle(ring: &mut RingCarousel) {
        for _ in 0..600 {
            if !ring.tick(1.0 / 60.0) {
                break;
            }
        }
    }

    /// Drag so the ring ends at `degrees`
    fn drag_to(ring: &mut RingCarousel, degrees: f32) {
        let dx = (degrees - ring.rotation()) / ring.tuning.ring_drag_factor;
        ring.pointer_down(1, 0.0, 0.0);
        ring.pointer_move(1, dx, 500.0);
        ring.pointer_up(1);
    }

    #[test]
    fn test_drag_release_snaps_to_nearest_card() {
        let mut ring = carousel(5, CarouselMode::Snap);
        assert_eq!(ring.step(), 72.0);

        drag_to(&mut ring, 80.0);
        assert!((ring.rotation() - 80.0).abs() < 1e-3);
        settle(&mut ring);
        assert!((ring.rotation() - 72.0).abs() < 1e-3);
        assert!(ring.is_settled());
    }

    #[test]
    fn test_reduced_motion_snaps_instantly() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let mut ring = RingCarousel::new(&settings, CarouselMode::Snap);
        ring.set_profiles(&profiles(4), "1985-04-20", None);
        drag_to(&mut ring, -100.0);
        assert_eq!(ring.rotation(), -90.0);
        assert!(ring.is_settled());
    }

    #[test]
    fn test_snap_tween_eases_out() {
        let mut ring = carousel(4, CarouselMode::Snap);
        drag_to(&mut ring, 60.0);
        ring.tick(0.1);
        let first = ring.rotation() - 60.0;
        ring.tick(0.1);
        let second = ring.rotation() - 60.0 - first;
        // Most of the distance is covered early
        assert!(first > second && second > 0.0);
    }

    #[test]
    fn test_click_centres_card_shortest_way() {
        let mut ring = carousel(6, CarouselMode::Snap);
        assert!(ring.click_card(5));
        settle(&mut ring);
        // -300 and +60 are the same place; +60 is closer
        assert!((ring.rotation() - 60.0).abs() < 1e-3);
        assert_eq!(ring.front_index(), Some(5));
    }

    #[test]
    fn test_click_after_drag_ignored() {
        let mut ring = carousel(6, CarouselMode::Snap);
        ring.pointer_down(1, 0.0, 0.0);
        ring.pointer_move(1, 40.0, 100.0);
        assert!(ring.pointer_up(1));
        assert!(!ring.click_card(2));
        // Only the one click is swallowed
        settle(&mut ring);
        assert!(ring.click_card(2));
    }

    #[test]
    fn test_small_travel_is_a_click() {
        let mut ring = carousel(6, CarouselMode::Snap);
        ring.pointer_down(1, 0.0, 0.0);
        ring.pointer_move(1, 3.0, 100.0);
        assert!(!ring.pointer_up(1));
        assert!(ring.click_card(1));
    }

    #[test]
    fn test_front_index() {
        let mut ring = carousel(4, CarouselMode::Snap);
        assert_eq!(ring.front_index(), Some(0));
        drag_to(&mut ring, -180.0);
        settle(&mut ring);
        assert_eq!(ring.front_index(), Some(2));
        assert!(ring.card_transform(2).is_some_and(|t| t.front));
        assert!(ring.card_transform(4).is_none());
    }

    #[test]
    fn test_card_transforms_static() {
        let mut ring = carousel(3, CarouselMode::Snap);
        let before = ring.card_transform(1).map(|t| t.angle);
        drag_to(&mut ring, 50.0);
        settle(&mut ring);
        assert_eq!(ring.card_transform(1).map(|t| t.angle), before);
        assert_eq!(before, Some(120.0));
    }

    #[test]
    fn test_coast_then_snap() {
        let mut ring = carousel(8, CarouselMode::Coast);
        ring.pointer_down(1, 0.0, 0.0);
        for i in 1..=5 {
            ring.pointer_move(1, i as f32 * 30.0, i as f64 * 16.0);
        }
        ring.pointer_up(1);
        assert!(!ring.is_settled());
        let released_at = ring.rotation();
        settle(&mut ring);
        assert!(ring.rotation() > released_at);
        let k = ring.rotation() / ring.step();
        assert!((k - k.round()).abs() < 1e-3);
    }

    #[test]
    fn test_switching_to_coast_from_settings() {
        let settings = Settings::from_json(r#"{"carousel_mode": "Coast"}"#).unwrap();
        let mut ring = carousel(8, CarouselMode::Snap);
        ring.set_mode(settings.carousel_mode);
        assert_eq!(ring.mode(), CarouselMode::Coast);

        ring.pointer_down(1, 0.0, 0.0);
        for i in 1..=5 {
            ring.pointer_move(1, i as f32 * 30.0, i as f64 * 16.0);
        }
        ring.pointer_up(1);
        let released_at = ring.rotation();
        ring.tick(1.0 / 60.0);
        // Coasting keeps turning the way the drag went
        assert!(ring.rotation() > released_at);
    }

    #[test]
    fn test_layout_radius_clamped() {
        let mut ring = carousel(5, CarouselMode::Snap);
        assert_eq!(ring.layout(100.0), ring.tuning.ring_radius_min);
        assert_eq!(ring.layout(10_000.0), ring.tuning.ring_radius_max);
        assert_eq!(ring.layout(0.0), 800.0 * ring.tuning.ring_radius_scale);
    }

    #[test]
    fn test_second_pointer_ignored() {
        let mut ring = carousel(5, CarouselMode::Snap);
        ring.pointer_down(1, 0.0, 0.0);
        ring.pointer_down(2, 500.0, 10.0);
        ring.pointer_move(2, 900.0, 20.0);
        assert_eq!(ring.rotation(), 0.0);
        assert!(!ring.pointer_up(2));
        assert!(ring.is_dragging());
    }

    #[test]
    fn test_tilt_eases_and_respects_setting() {
        let mut ring = carousel(5, CarouselMode::Snap);
        ring.set_tilt_pointer(1.0, 0.0);
        for _ in 0..120 {
            ring.tick(1.0 / 60.0);
        }
        assert!((ring.tilt().y - ring.tuning.ring_max_tilt_deg).abs() < 0.1);

        let settings = Settings {
            carousel_tilt: false,
            ..Settings::default()
        };
        let mut flat = RingCarousel::new(&settings, CarouselMode::Snap);
        flat.set_tilt_pointer(1.0, 1.0);
        flat.tick(0.5);
        assert_eq!(flat.tilt(), Vec2::ZERO);
    }

    #[test]
    fn test_cards_carry_cycle_days() {
        let mut ring = RingCarousel::new(&Settings::default(), CarouselMode::Snap);
        let today = NaiveDate::from_ymd_opt(1990, 1, 19);
        ring.set_profiles(
            &[
                Profile::new("a", "Ada", "1985-05-08"),
                Profile::new("b", "Bo", "not a date"),
            ],
            "1985-04-20",
            today,
        );
        assert_eq!(ring.cards()[0].origin_day, Some(1));
        assert_eq!(ring.cards()[1].origin_day, None);
        assert_eq!(ring.cards()[1].today_day, None);
    }
}
