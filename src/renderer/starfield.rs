//! Starfield particles behind the pond
//!
//! Stars live in normalized 0..1 coordinates so a resize never needs to
//! respawn them. They drift slowly upward, wrap, and twinkle.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::Surface;
use super::color::Color;

#[derive(Debug, Clone, Copy)]
pub struct Star {
    /// Normalized position
    pub pos: Vec2,
    pub size: f32,
    pub twinkle_seed: f32,
    /// Upward drift (normalized units per second)
    pub drift: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Starfield {
    stars: Vec<Star>,
}

impl Starfield {
    pub fn new<R: Rng>(count: usize, rng: &mut R) -> Self {
        let stars = (0..count)
            .map(|_| Star {
                pos: Vec2::new(rng.random_range(0.0..1.0), rng.random_range(0.0..1.0)),
                size: rng.random_range(0.6..2.2),
                twinkle_seed: rng.random_range(0.0..TAU),
                drift: rng.random_range(0.002..0.012),
            })
            .collect();
        Self { stars }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn update(&mut self, dt: f32) {
        for star in &mut self.stars {
            star.pos.y -= star.drift * dt;
            if star.pos.y < 0.0 {
                star.pos.y += 1.0;
            }
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface, width: f32, height: f32, t: f32) {
        for star in &self.stars {
            let twinkle = 0.55 + 0.45 * (t * 1.7 + star.twinkle_seed).sin();
            let center = Vec2::new(star.pos.x * width, star.pos.y * height);
            surface.fill_circle(center, star.size, Color::WHITE.with_alpha(0.25 + 0.6 * twinkle));
        }
    }
}
