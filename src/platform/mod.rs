//! Platform abstraction layer
//!
//! Seams between the pond and whatever hosts it:
//! - Frame scheduling (`Scheduler`, `Tickable`)
//! - Status / score output (`StatusSink`, `ScoreSink`)
//! - Sprite lookup (`SpriteResolver`)
//! - Stale asset-load guarding (`AssetEpoch`)

pub mod assets;

pub use assets::AssetEpoch;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::consts::DEFAULT_SPRITE_TEMPLATE;

/// Something advanced once per frame
pub trait Tickable {
    fn on_tick(&mut self, dt: f32);
}

/// Drives `Tickable::on_tick` (requestAnimationFrame, a test harness, ...)
pub trait Scheduler {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Receives short advisory status lines
pub trait StatusSink {
    fn set_status(&mut self, text: &str);

    /// Toggle the "no profiles" presentation
    fn set_empty(&mut self, _empty: bool) {}
}

/// Receives the floored score
pub trait ScoreSink {
    fn set_score(&mut self, score: u64);
}

/// Maps a cycle day (1..=18) to a sprite URL. The URL is opaque to the pond.
pub trait SpriteResolver {
    fn sprite_url(&self, cycle_day: u8) -> String;
}

/// Sprite URLs from a `{day}` template
#[derive(Debug, Clone)]
pub struct TemplateSprites {
    template: String,
}

impl TemplateSprites {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Default for TemplateSprites {
    fn default() -> Self {
        Self::new(DEFAULT_SPRITE_TEMPLATE)
    }
}

impl SpriteResolver for TemplateSprites {
    fn sprite_url(&self, cycle_day: u8) -> String {
        self.template.replace("{day}", &cycle_day.to_string())
    }
}

/// Fixed-step scheduler for headless runs and tests
///
/// Clones share the running flag, so the pond can own one handle while the
/// harness drives frames through another.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    running: Rc<Cell<bool>>,
    dt: f32,
}

impl ManualScheduler {
    pub fn new(dt: f32) -> Self {
        Self {
            running: Rc::new(Cell::new(false)),
            dt,
        }
    }

    /// Tick `target` up to `frames` times, stopping early if it stops the
    /// scheduler. Returns the number of frames run.
    pub fn run<T: Tickable>(&self, target: &mut T, frames: u32) -> u32 {
        let mut ran = 0;
        while ran < frames && self.running.get() {
            target.on_tick(self.dt);
            ran += 1;
        }
        ran
    }
}

impl Scheduler for ManualScheduler {
    fn start(&mut self) {
        self.running.set(true);
    }

    fn stop(&mut self) {
        self.running.set(false);
    }

    fn is_running(&self) -> bool {
        self.running.get()
    }
}

/// Sink that records everything it is told, for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub status: Rc<RefCell<Vec<String>>>,
    pub empty: Rc<Cell<bool>>,
    pub score: Rc<Cell<u64>>,
}

impl RecordingSink {
    pub fn last_status(&self) -> Option<String> {
        self.status.borrow().last().cloned()
    }
}

impl StatusSink for RecordingSink {
    fn set_status(&mut self, text: &str) {
        self.status.borrow_mut().push(text.to_string());
    }

    fn set_empty(&mut self, empty: bool) {
        self.empty.set(empty);
    }
}

impl ScoreSink for RecordingSink {
    fn set_score(&mut self, score: u64) {
        self.score.set(score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        ticks: u32,
        stop_at: u32,
        sched: ManualScheduler,
    }

    impl Tickable for Counter {
        fn on_tick(&mut self, _dt: f32) {
            self.ticks += 1;
            if self.ticks == self.stop_at {
                self.sched.stop();
            }
        }
    }

    #[test]
    fn test_manual_scheduler_runs_while_started() {
        let sched = ManualScheduler::new(1.0 / 60.0);
        let mut counter = Counter {
            ticks: 0,
            stop_at: 100,
            sched: sched.clone(),
        };
        assert_eq!(sched.run(&mut counter, 10), 0);

        counter.sched.start();
        assert!(sched.is_running());
        assert_eq!(sched.run(&mut counter, 10), 10);
    }

    #[test]
    fn test_target_can_stop_scheduler() {
        let mut sched = ManualScheduler::new(1.0 / 60.0);
        sched.start();
        let mut counter = Counter {
            ticks: 0,
            stop_at: 3,
            sched: sched.clone(),
        };
        assert_eq!(sched.run(&mut counter, 10), 3);
        assert!(!sched.is_running());
    }

    #[test]
    fn test_template_sprites() {
        let sprites = TemplateSprites::new("/img/d{day}.webp");
        assert_eq!(sprites.sprite_url(7), "/img/d7.webp");
        assert_eq!(TemplateSprites::default().sprite_url(18), "/ducks/duck-18.png");
    }
}
