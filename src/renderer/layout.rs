//! Static grid layout for reduced motion
//!
//! Places `count` circles on a grid that fills the canvas with no overlaps.
//! Used instead of the physics loop when the viewer asks for less motion.

use glam::Vec2;

/// One grid slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub center: Vec2,
    pub radius: f32,
}

/// Grid slots for `count` items in a `width` x `height` canvas
pub fn static_grid(count: usize, width: f32, height: f32, max_radius: f32) -> Vec<Slot> {
    if count == 0 || width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }

    let aspect = width / height;
    let cols = ((count as f32 * aspect).sqrt().ceil() as usize).clamp(1, count);
    let rows = count.div_ceil(cols);
    let cell = (width / cols as f32).min(height / rows as f32);
    let radius = (cell * 0.42).min(max_radius);

    // Centre the whole grid
    let origin = Vec2::new(
        (width - cell * cols as f32) / 2.0,
        (height - cell * rows as f32) / 2.0,
    );

    (0..count)
        .map(|i| {
            let col = (i % cols) as f32;
            let row = (i / cols) as f32;
            Slot {
                center: origin + Vec2::new((col + 0.5) * cell, (row + 0.5) * cell),
                radius,
            }
        })
        .collect()
}
