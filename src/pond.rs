//! Pond facade
//!
//! Owns the simulation state, input controller, renderer and asset epoch,
//! and talks to the host only through the injected scheduler, sprite
//! resolver and sinks. The browser adapter and the headless harness both
//! drive it through the same calls:
//! - `set_profiles` / `reload` / `destroy`
//! - `pointer` for normalized pointer events
//! - `on_tick` once per frame, then `render`

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::{STATUS_BURST, STATUS_EMPTY, STATUS_INTRO};
use crate::input::{InputController, InputOutcome, PointerEvent};
use crate::platform::{
    AssetEpoch, Scheduler, ScoreSink, SpriteResolver, StatusSink, TemplateSprites, Tickable,
};
use crate::renderer::{Renderer, Surface};
use crate::settings::Settings;
use crate::sim::{self, PondState, Profile, ReconcileOutcome};

/// Append a `v=<epoch>` query parameter so reloaded sprites skip the cache
pub fn with_cache_bust(url: String, epoch: u64) -> String {
    if epoch == 0 {
        return url;
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}v={epoch}")
}

pub struct Pond {
    state: PondState,
    input: InputController,
    renderer: Renderer,
    assets: AssetEpoch,
    sprites: Box<dyn SpriteResolver>,
    scheduler: Box<dyn Scheduler>,
    status: Option<Box<dyn StatusSink>>,
    score_sink: Option<Box<dyn ScoreSink>>,
    anchor: String,
    settings: Settings,
    seed: u64,
    /// Sprite cache-bust epoch, bumped by `reload`
    cache_bust: u64,
    last_score: Option<u64>,
    destroyed: bool,
    /// Reduced-motion layout needs a redraw
    static_dirty: bool,
}

impl Pond {
    pub fn new(
        width: f32,
        height: f32,
        anchor: impl Into<String>,
        mut settings: Settings,
        sprites: Box<dyn SpriteResolver>,
        scheduler: Box<dyn Scheduler>,
    ) -> Self {
        settings.tuning = settings.tuning.sanitized();
        let seed = default_seed();
        Self {
            state: PondState::new(width, height, settings.tuning.clone(), seed),
            input: InputController::new(),
            renderer: Renderer::new(&settings, seed.wrapping_add(1)),
            assets: AssetEpoch::new(),
            sprites,
            scheduler,
            status: None,
            score_sink: None,
            anchor: anchor.into(),
            settings,
            seed,
            cache_bust: 0,
            last_score: None,
            destroyed: false,
            static_dirty: true,
        }
    }

    pub fn with_status_sink(mut self, sink: Box<dyn StatusSink>) -> Self {
        self.status = Some(sink);
        self
    }

    pub fn with_score_sink(mut self, sink: Box<dyn ScoreSink>) -> Self {
        self.score_sink = Some(sink);
        self
    }

    /// Reseed spawn randomness and the starfield (deterministic runs)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.state.rng = Pcg32::seed_from_u64(seed);
        self.renderer = Renderer::new(&self.settings, seed.wrapping_add(1));
        self
    }

    pub fn state(&self) -> &PondState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_empty(&self) -> bool {
        self.state.ducks.is_empty()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn score(&self) -> u64 {
        self.state.display_score()
    }

    /// Frames per second over the last full second
    pub fn fps(&self) -> u32 {
        self.renderer.fps()
    }

    /// Current asset epoch; sprite loads report back with it
    pub fn asset_generation(&self) -> u64 {
        self.assets.generation()
    }

    /// Sprite URLs the current epoch is still waiting on
    pub fn pending_sprites(&self) -> Vec<String> {
        self.assets.pending().map(str::to_string).collect()
    }

    /// Reconcile ducks against `profiles`. Safe to call repeatedly.
    pub fn set_profiles(&mut self, profiles: &[Profile]) -> ReconcileOutcome {
        if self.destroyed {
            return ReconcileOutcome::default();
        }

        let sprites = &self.sprites;
        let bust = self.cache_bust;
        let sprite_for = move |day: u8| with_cache_bust(sprites.sprite_url(day), bust);
        let outcome = sim::reconcile(&mut self.state, profiles, &self.anchor, &sprite_for);

        // A duck being dragged may have gone away
        let orphaned = self
            .input
            .dragged_id()
            .is_some_and(|id| self.state.find(id).is_none());
        if orphaned {
            self.input.reset(&mut self.state);
        }

        if outcome.is_empty {
            self.scheduler.stop();
            if let Some(status) = self.status.as_mut() {
                status.set_empty(true);
                status.set_status(STATUS_EMPTY);
            }
            self.push_score();
        } else {
            if !self.scheduler.is_running() {
                self.scheduler.start();
            }
            if outcome.became_non_empty() {
                if let Some(status) = self.status.as_mut() {
                    status.set_empty(false);
                    status.set_status(STATUS_INTRO);
                }
            }
        }

        let urls: BTreeSet<String> = self
            .state
            .ducks
            .iter()
            .filter_map(|d| d.sprite.clone())
            .collect();
        let generation = self.assets.begin(urls);
        self.static_dirty = true;

        if outcome.changed() {
            log::info!(
                "Profiles reconciled: {} ducks (+{} -{}), asset epoch {}",
                self.state.ducks.len(),
                outcome.added.len(),
                outcome.removed.len(),
                generation
            );
        }
        outcome
    }

    /// Drop every loaded sprite, bump the cache-bust epoch, then reconcile
    pub fn reload(&mut self, profiles: &[Profile]) -> ReconcileOutcome {
        if self.destroyed {
            return ReconcileOutcome::default();
        }
        self.assets.invalidate();
        self.cache_bust = self.assets.generation();
        self.set_profiles(profiles)
    }

    /// Swap the sprite source. Existing ducks pick up new URLs immediately.
    pub fn set_sprite_resolver(&mut self, sprites: Box<dyn SpriteResolver>) {
        self.sprites = sprites;
        let sprites = &self.sprites;
        let bust = self.cache_bust;
        sim::refresh_sprites(&mut self.state, &move |day: u8| {
            with_cache_bust(sprites.sprite_url(day), bust)
        });
        let urls: BTreeSet<String> = self
            .state
            .ducks
            .iter()
            .filter_map(|d| d.sprite.clone())
            .collect();
        self.assets.begin(urls);
        self.static_dirty = true;
    }

    /// Stop the frame loop and drop gesture state. Returns true on the
    /// first call only, so the adapter detaches its listeners exactly once.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.scheduler.stop();
        self.input.reset(&mut self.state);
        log::info!("Pond destroyed");
        true
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if self.destroyed {
            return;
        }
        self.state.resize(width, height);
        self.static_dirty = true;
        log::debug!("Pond resized to {}x{}", self.state.width, self.state.height);
    }

    /// Swap preferences and tuning. Radii are recomputed for the new
    /// constants and a changed sprite template re-resolves every sprite.
    pub fn apply_settings(&mut self, mut settings: Settings) {
        settings.tuning = settings.tuning.sanitized();
        self.state.set_tuning(settings.tuning.clone());
        self.renderer = Renderer::new(&settings, self.seed.wrapping_add(1));
        if settings.reduced_motion && !self.settings.reduced_motion {
            self.input.reset(&mut self.state);
        }
        let template_changed = settings.sprite_template != self.settings.sprite_template;
        self.settings = settings;
        if template_changed && !self.destroyed {
            let template = self.settings.sprite_template.clone();
            self.set_sprite_resolver(Box::new(TemplateSprites::new(template)));
        }
        self.static_dirty = true;
    }

    /// Feed one normalized pointer event through the input state machine
    pub fn pointer(&mut self, event: PointerEvent) -> InputOutcome {
        if self.destroyed || self.settings.reduced_motion {
            return InputOutcome::Ignored;
        }
        let outcome = self.input.handle(&mut self.state, event);

        let text = match &outcome {
            InputOutcome::Launched { id, .. } => self.name_of(id).map(|n| format!("{n} launched")),
            InputOutcome::Pinned { id } => self.name_of(id).map(|n| format!("{n} pinned")),
            InputOutcome::Unpinned { id } => self.name_of(id).map(|n| format!("{n} unpinned")),
            InputOutcome::Burst { .. } if !self.is_empty() => Some(STATUS_BURST.to_string()),
            _ => None,
        };
        if let (Some(text), Some(status)) = (text, self.status.as_mut()) {
            status.set_status(&text);
        }
        outcome
    }

    /// A sprite finished loading (or failed). Stale epochs are ignored.
    pub fn sprite_loaded(&mut self, generation: u64, url: &str, ok: bool) -> bool {
        if self.destroyed {
            return false;
        }
        let accepted = self.assets.complete(generation, url, ok);
        if accepted {
            self.static_dirty = true;
        }
        accepted
    }

    /// Draw the current frame. Under reduced motion the static grid is drawn
    /// only when something changed. Returns whether anything was drawn.
    pub fn render(&mut self, surface: &mut dyn Surface) -> bool {
        if self.destroyed {
            return false;
        }
        if self.settings.reduced_motion {
            if !self.static_dirty {
                return false;
            }
            self.renderer.draw_static(surface, &self.state, &self.assets);
            self.static_dirty = false;
            return true;
        }
        self.renderer.draw_frame(surface, &self.state, &self.assets);
        true
    }

    fn name_of(&self, id: &str) -> Option<&str> {
        self.state
            .find(id)
            .map(|i| self.state.ducks[i].name.as_str())
    }

    fn push_score(&mut self) {
        let score = self.state.display_score();
        if self.last_score == Some(score) {
            return;
        }
        self.last_score = Some(score);
        if let Some(sink) = self.score_sink.as_mut() {
            sink.set_score(score);
        }
    }
}

impl Tickable for Pond {
    fn on_tick(&mut self, dt: f32) {
        if self.destroyed || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.renderer.update(dt);
        if self.settings.reduced_motion || self.state.ducks.is_empty() {
            return;
        }

        let step = dt.min(self.state.tuning.max_dt);
        let t = self.state.time + step;
        let report = sim::advance(&mut self.state, step, t);
        if report.orb_hit {
            log::debug!("Orb hit, score rate reduced");
        }
        self.push_score();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
fn default_seed() -> u64 {
    js_sys::Date::now() as u64
}
