//! Frame-rate guard for the starfield pass
//!
//! Counts frames per rolling second. Below `low` fps the starfield is
//! switched off; it only comes back above `high`, so the pass does not
//! flap on the boundary.

pub const DEFAULT_LOW_FPS: u32 = 40;
pub const DEFAULT_HIGH_FPS: u32 = 52;
/// Frame gaps longer than this are pauses (tab switch), not slow frames
pub const MAX_FRAME_GAP: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct FpsGuard {
    frames: u32,
    window: f32,
    fps: u32,
    low: u32,
    high: u32,
    starfield_on: bool,
}

impl Default for FpsGuard {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_FPS, DEFAULT_HIGH_FPS)
    }
}

impl FpsGuard {
    pub fn new(low: u32, high: u32) -> Self {
        Self {
            frames: 0,
            window: 0.0,
            fps: 0,
            low,
            high: high.max(low),
            starfield_on: true,
        }
    }

    /// Frames counted in the last complete second
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn starfield_allowed(&self) -> bool {
        self.starfield_on
    }

    /// Count one frame. Returns `Some(allowed)` when the starfield state flips.
    pub fn record_frame(&mut self, dt: f32) -> Option<bool> {
        if !dt.is_finite() || dt < 0.0 {
            return None;
        }
        if dt > MAX_FRAME_GAP {
            self.frames = 0;
            self.window = 0.0;
            return None;
        }
        self.frames += 1;
        self.window += dt;
        if self.window < 1.0 {
            return None;
        }

        self.fps = (self.frames as f32 / self.window).round() as u32;
        self.frames = 0;
        self.window = 0.0;

        if self.starfield_on && self.fps < self.low {
            self.starfield_on = false;
            log::info!("Frame rate {} fps, starfield off", self.fps);
            Some(false)
        } else if !self.starfield_on && self.fps > self.high {
            self.starfield_on = true;
            log::info!("Frame rate {} fps, starfield back on", self.fps);
            Some(true)
        } else {
            None
        }
    }
}
