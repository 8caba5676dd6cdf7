//! Pond rendering
//!
//! Draws against the `Surface` trait so the same code runs on a browser 2D
//! canvas, a command recorder in tests, or nothing at all in headless runs.
//!
//! Frame order: clear, background gradient, starfield, orb, ripples, ducks.

pub mod color;
pub mod layout;
pub mod perf;
pub mod starfield;

pub use color::Color;
pub use layout::{Slot, static_grid};
pub use perf::FpsGuard;
pub use starfield::Starfield;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::platform::AssetEpoch;
use crate::settings::Settings;
use crate::sim::state::{Duck, PondState};

/// Background hue cycle period (seconds)
pub const HUE_PERIOD: f32 = 60.0;

/// Minimal 2D drawing surface
pub trait Surface {
    fn clear(&mut self);
    fn fill_vertical_gradient(&mut self, top: Color, bottom: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, line_width: f32, color: Color);
    /// Draw an image centred on `center`, `size` px square. Returns false if
    /// the surface has no decoded image for `url`.
    fn draw_image(&mut self, url: &str, center: Vec2, size: f32) -> bool;
    fn fill_text(&mut self, text: &str, center: Vec2, size_px: f32, color: Color);
}

/// A recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Gradient { top: Color, bottom: Color },
    FillCircle { center: Vec2, radius: f32, color: Color },
    StrokeCircle { center: Vec2, radius: f32, line_width: f32, color: Color },
    Image { url: String, center: Vec2, size: f32 },
    Text { text: String, center: Vec2, size_px: f32, color: Color },
}

/// Surface that records commands instead of drawing
#[derive(Debug, Clone, Default)]
pub struct CommandList {
    pub commands: Vec<DrawCommand>,
    /// Images the recorder pretends to have decoded
    pub images: std::collections::HashSet<String>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

impl Surface for CommandList {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_vertical_gradient(&mut self, top: Color, bottom: Color) {
        self.commands.push(DrawCommand::Gradient { top, bottom });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, line_width: f32, color: Color) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            line_width,
            color,
        });
    }

    fn draw_image(&mut self, url: &str, center: Vec2, size: f32) -> bool {
        if !self.images.contains(url) {
            return false;
        }
        self.commands.push(DrawCommand::Image {
            url: url.to_string(),
            center,
            size,
        });
        true
    }

    fn fill_text(&mut self, text: &str, center: Vec2, size_px: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            center,
            size_px,
            color,
        });
    }
}

/// Stateful renderer: starfield particles plus the frame-rate guard
#[derive(Debug, Clone)]
pub struct Renderer {
    starfield: Starfield,
    guard: FpsGuard,
    starfield_wanted: bool,
    auto_degrade: bool,
    ripples: bool,
}

impl Renderer {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        Self {
            starfield: Starfield::new(settings.max_stars(), &mut rng),
            guard: FpsGuard::default(),
            starfield_wanted: settings.effective_starfield(),
            auto_degrade: settings.auto_degrade,
            ripples: settings.ripples,
        }
    }

    /// Whether the starfield pass runs this frame
    pub fn starfield_active(&self) -> bool {
        self.starfield_wanted
            && !self.starfield.is_empty()
            && (!self.auto_degrade || self.guard.starfield_allowed())
    }

    pub fn fps(&self) -> u32 {
        self.guard.fps()
    }

    /// Per-frame bookkeeping: frame-rate guard and star drift
    pub fn update(&mut self, dt: f32) {
        self.guard.record_frame(dt);
        if self.starfield_active() {
            self.starfield.update(dt);
        }
    }

    /// Draw one animated frame
    pub fn draw_frame(&self, surface: &mut dyn Surface, state: &PondState, assets: &AssetEpoch) {
        let t = state.time;
        surface.clear();
        draw_background(surface, t);

        if self.starfield_active() {
            self.starfield.draw(surface, state.width, state.height, t);
        }

        if state.orb.active {
            draw_orb(surface, state);
        }

        if self.ripples {
            for ripple in &state.ripples {
                let p = ripple.progress();
                let radius = 12.0 + p * state.tuning.burst_radius;
                let color = Color::WHITE.with_alpha(0.6 * (1.0 - p));
                surface.stroke_circle(ripple.pos, radius, 2.5, color);
                surface.stroke_circle(ripple.pos, radius * 0.6, 1.5, color.with_alpha(color.a * 0.6));
            }
        }

        for duck in &state.ducks {
            let pulse = 1.0 + 0.04 * (t * 2.2 + duck.pulse_seed).sin();
            draw_duck(surface, duck, duck.pos, duck.radius * pulse, assets);
        }
    }

    /// Reduced-motion frame: ducks on a static grid, no animation.
    /// Returns the slots used.
    pub fn draw_static(
        &self,
        surface: &mut dyn Surface,
        state: &PondState,
        assets: &AssetEpoch,
    ) -> Vec<Slot> {
        surface.clear();
        draw_background(surface, 0.0);

        let slots = static_grid(
            state.ducks.len(),
            state.width,
            state.height,
            state.tuning.duck_radius_max,
        );
        for (duck, slot) in state.ducks.iter().zip(&slots) {
            draw_duck(surface, duck, slot.center, slot.radius, assets);
        }
        slots
    }
}

/// Slowly hue-cycling vertical gradient
fn draw_background(surface: &mut dyn Surface, t: f32) {
    let hue = 200.0 + 360.0 * (t / HUE_PERIOD);
    let top = Color::from_hsl(hue, 0.55, 0.16, 1.0);
    let bottom = Color::from_hsl(hue + 40.0, 0.6, 0.3, 1.0);
    surface.fill_vertical_gradient(top, bottom);
}

fn draw_orb(surface: &mut dyn Surface, state: &PondState) {
    let orb = &state.orb;
    let hue = if orb.is_cooling_down() { 350.0 } else { 48.0 };
    let glow = 0.6 + 0.4 * (state.time * 3.0).sin();
    surface.fill_circle(orb.pos, orb.radius * 2.0, Color::from_hsl(hue, 1.0, 0.6, 0.12 * glow));
    surface.fill_circle(orb.pos, orb.radius * 1.4, Color::from_hsl(hue, 1.0, 0.6, 0.25));
    surface.fill_circle(orb.pos, orb.radius, Color::from_hsl(hue, 1.0, 0.7, 0.95));
}

fn draw_duck(surface: &mut dyn Surface, duck: &Duck, center: Vec2, radius: f32, assets: &AssetEpoch) {
    let halo_alpha = if duck.grabbed { 0.45 } else { 0.25 };
    surface.fill_circle(center, radius * 1.15, Color::WHITE.with_alpha(halo_alpha));

    let drew_sprite = match duck.sprite.as_deref() {
        Some(url) if assets.is_loaded(url) => surface.draw_image(url, center, radius * 2.0),
        _ => false,
    };
    if !drew_sprite {
        surface.fill_circle(center, radius, Color::from_hsl(45.0, 0.9, 0.6, 1.0));
        surface.fill_text(&duck.glyph(), center, radius, Color::rgba(0.1, 0.1, 0.15, 1.0));
    }

    if duck.pinned {
        surface.stroke_circle(center, radius + 6.0, 3.0, Color::from_hsl(190.0, 0.9, 0.7, 0.9));
    }

    if let Some(day) = duck.cycle_day {
        let badge = center + Vec2::new(radius * 0.72, -radius * 0.72);
        let badge_r = (radius * 0.3).max(9.0);
        surface.fill_circle(badge, badge_r, Color::rgba(0.08, 0.1, 0.2, 0.85));
        surface.fill_text(&day.to_string(), badge, badge_r * 1.1, Color::WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Ripple;

    fn pond_with_duck() -> PondState {
        let mut state = PondState::new(800.0, 600.0, Settings::default().tuning, 1);
        let mut duck = Duck::new("a", "Ada", Vec2::new(200.0, 200.0), 40.0);
        duck.cycle_day = Some(4);
        duck.sprite = Some("/duck-4.png".into());
        state.ducks.push(duck);
        state.orb.active = true;
        state.orb.pos = Vec2::new(500.0, 300.0);
        state
    }

    fn index_of(list: &CommandList, pred: impl Fn(&DrawCommand) -> bool) -> Option<usize> {
        list.commands.iter().position(pred)
    }

    #[test]
    fn test_draw_order() {
        let state = {
            let mut s = pond_with_duck();
            s.ripples.push(Ripple {
                pos: Vec2::new(50.0, 50.0),
                age: 0.1,
                duration: 0.9,
            });
            s
        };
        let renderer = Renderer::new(&Settings::default(), 3);
        let mut surface = CommandList::new();
        renderer.draw_frame(&mut surface, &state, &AssetEpoch::new());

        assert_eq!(surface.commands[0], DrawCommand::Clear);
        assert!(matches!(surface.commands[1], DrawCommand::Gradient { .. }));
        let orb = index_of(&surface, |c| {
            matches!(c, DrawCommand::FillCircle { center, .. } if *center == state.orb.pos)
        })
        .unwrap();
        let ripple = index_of(&surface, |c| matches!(c, DrawCommand::StrokeCircle { .. })).unwrap();
        let duck = index_of(&surface, |c| {
            matches!(c, DrawCommand::FillCircle { center, .. } if *center == Vec2::new(200.0, 200.0))
        })
        .unwrap();
        assert!(orb < ripple && ripple < duck);
    }

    #[test]
    fn test_placeholder_until_sprite_loads() {
        let state = pond_with_duck();
        let renderer = Renderer::new(&Settings::default(), 3);
        let mut surface = CommandList::new();
        surface.images.insert("/duck-4.png".into());

        let mut assets = AssetEpoch::new();
        renderer.draw_frame(&mut surface, &state, &assets);
        assert!(surface.commands.iter().any(|c| matches!(c, DrawCommand::Text { text, .. } if text == "A")));
        assert!(!surface.commands.iter().any(|c| matches!(c, DrawCommand::Image { .. })));

        let epoch = assets.begin(vec!["/duck-4.png".to_string()]);
        assets.complete(epoch, "/duck-4.png", true);
        surface.clear_commands();
        renderer.draw_frame(&mut surface, &state, &assets);
        assert!(surface.commands.iter().any(|c| matches!(c, DrawCommand::Image { .. })));
        assert!(!surface.commands.iter().any(|c| matches!(c, DrawCommand::Text { text, .. } if text == "A")));
    }

    #[test]
    fn test_no_badge_without_cycle_day() {
        let mut state = pond_with_duck();
        state.ducks[0].cycle_day = None;
        state.ducks[0].sprite = None;
        let renderer = Renderer::new(&Settings::default(), 3);
        let mut surface = CommandList::new();
        renderer.draw_frame(&mut surface, &state, &AssetEpoch::new());
        let texts: Vec<_> = surface
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["A".to_string()]);
    }

    #[test]
    fn test_pinned_ring_drawn() {
        let mut state = pond_with_duck();
        state.ducks[0].pinned = true;
        let settings = Settings {
            ripples: false,
            ..Settings::default()
        };
        let renderer = Renderer::new(&settings, 3);
        let mut surface = CommandList::new();
        renderer.draw_frame(&mut surface, &state, &AssetEpoch::new());
        assert!(surface.commands.iter().any(|c| matches!(c, DrawCommand::StrokeCircle { .. })));
    }

    #[test]
    fn test_reduced_motion_skips_starfield() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let renderer = Renderer::new(&settings, 3);
        assert!(!renderer.starfield_active());

        let renderer = Renderer::new(&Settings::default(), 3);
        assert!(renderer.starfield_active());
    }

    #[test]
    fn test_static_frame_uses_grid() {
        let mut state = pond_with_duck();
        state.ducks.push(Duck::new("b", "Bo", Vec2::new(210.0, 200.0), 40.0));
        let renderer = Renderer::new(&Settings::default(), 3);
        let mut surface = CommandList::new();
        let slots = renderer.draw_static(&mut surface, &state, &AssetEpoch::new());
        assert_eq!(slots.len(), 2);
        assert!(slots[0].center.distance(slots[1].center) >= slots[0].radius * 2.0);
    }
}
