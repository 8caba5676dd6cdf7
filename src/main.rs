//! Duck Pond entry point
//!
//! On wasm32 this wires the pond to a browser canvas (and an optional card
//! ring). Natively it runs a headless fixed-step simulation and prints a
//! summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, Element, EventTarget, HtmlCanvasElement, HtmlElement,
        HtmlImageElement,
    };

    use duck_pond::consts::{DEFAULT_ANCHOR, FULLSCREEN_SETTLE_MS};
    use duck_pond::cycle::local_today;
    use duck_pond::input::{PointerEvent, PointerPhase};
    use duck_pond::platform::{Scheduler, ScoreSink, SpriteResolver, StatusSink, TemplateSprites, Tickable};
    use duck_pond::renderer::{Color, Surface};
    use duck_pond::sim::Profile;
    use duck_pond::{Pond, RingCarousel, Settings};

    type Images = Rc<RefCell<HashMap<String, HtmlImageElement>>>;

    /// Canvas 2D implementation of the drawing surface (CSS pixel units)
    struct CanvasSurface {
        ctx: CanvasRenderingContext2d,
        width: f32,
        height: f32,
        images: Images,
    }

    impl Surface for CanvasSurface {
        fn clear(&mut self) {
            self.ctx
                .clear_rect(0.0, 0.0, self.width as f64, self.height as f64);
        }

        fn fill_vertical_gradient(&mut self, top: Color, bottom: Color) {
            let gradient = self.ctx.create_linear_gradient(0.0, 0.0, 0.0, self.height as f64);
            let _ = gradient.add_color_stop(0.0, &top.css());
            let _ = gradient.add_color_stop(1.0, &bottom.css());
            self.ctx.set_fill_style_canvas_gradient(&gradient);
            self.ctx
                .fill_rect(0.0, 0.0, self.width as f64, self.height as f64);
        }

        fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
            self.ctx.begin_path();
            let _ = self.ctx.arc(
                center.x as f64,
                center.y as f64,
                radius.max(0.0) as f64,
                0.0,
                std::f64::consts::TAU,
            );
            self.ctx.set_fill_style_str(&color.css());
            self.ctx.fill();
        }

        fn stroke_circle(&mut self, center: Vec2, radius: f32, line_width: f32, color: Color) {
            self.ctx.begin_path();
            let _ = self.ctx.arc(
                center.x as f64,
                center.y as f64,
                radius.max(0.0) as f64,
                0.0,
                std::f64::consts::TAU,
            );
            self.ctx.set_line_width(line_width as f64);
            self.ctx.set_stroke_style_str(&color.css());
            self.ctx.stroke();
        }

        fn draw_image(&mut self, url: &str, center: Vec2, size: f32) -> bool {
            let images = self.images.borrow();
            let Some(img) = images.get(url).filter(|img| img.complete() && img.natural_width() > 0)
            else {
                return false;
            };
            let half = size as f64 / 2.0;
            self.ctx
                .draw_image_with_html_image_element_and_dw_and_dh(
                    img,
                    center.x as f64 - half,
                    center.y as f64 - half,
                    size as f64,
                    size as f64,
                )
                .is_ok()
        }

        fn fill_text(&mut self, text: &str, center: Vec2, size_px: f32, color: Color) {
            self.ctx
                .set_font(&format!("bold {:.0}px system-ui, sans-serif", size_px));
            self.ctx.set_text_align("center");
            self.ctx.set_text_baseline("middle");
            self.ctx.set_fill_style_str(&color.css());
            let _ = self.ctx.fill_text(text, center.x as f64, center.y as f64);
        }
    }

    /// requestAnimationFrame keeps firing; the flag decides whether the pond ticks
    #[derive(Clone, Default)]
    struct RafScheduler {
        running: Rc<Cell<bool>>,
    }

    impl Scheduler for RafScheduler {
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

    struct DomStatus {
        status: Option<Element>,
        container: Option<Element>,
    }

    impl StatusSink for DomStatus {
        fn set_status(&mut self, text: &str) {
            if let Some(el) = &self.status {
                el.set_text_content(Some(text));
            }
        }

        fn set_empty(&mut self, empty: bool) {
            if let Some(el) = &self.container {
                let _ = el.class_list().toggle_with_force("is-empty", empty);
            }
        }
    }

    struct DomScore {
        element: Option<Element>,
    }

    impl ScoreSink for DomScore {
        fn set_score(&mut self, score: u64) {
            if let Some(el) = &self.element {
                el.set_text_content(Some(&score.to_string()));
            }
        }
    }

    /// An attached DOM listener, kept so destroy can detach it
    struct Listener {
        target: EventTarget,
        kind: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    /// Card ring bound to `#duck-ring`
    struct RingView {
        ring: RingCarousel,
        container: Element,
        cards: Vec<Element>,
        pointer_id: Option<i32>,
    }

    impl RingView {
        fn rebuild(&mut self, document: &Document, profiles: &[Profile], anchor: &str, template: &str) {
            let sprites = TemplateSprites::new(template);
            self.ring.set_profiles(profiles, anchor, local_today());
            self.container.set_inner_html("");
            self.cards.clear();

            for (i, card) in self.ring.cards().iter().enumerate() {
                let Ok(el) = document.create_element("div") else {
                    continue;
                };
                el.set_class_name("duck-card");
                let _ = el.set_attribute("data-index", &i.to_string());

                for (day, class) in [(card.origin_day, "origin"), (card.today_day, "today")] {
                    let Some(day) = day else { continue };
                    if let Ok(img) = document.create_element("img") {
                        img.set_class_name(class);
                        let _ = img.set_attribute("src", &sprites.sprite_url(day));
                        let _ = img.set_attribute("alt", &format!("Day {day}"));
                        let _ = el.append_child(&img);
                    }
                }
                if let Ok(label) = document.create_element("span") {
                    label.set_class_name("name");
                    label.set_text_content(Some(&card.name));
                    let _ = el.append_child(&label);
                }
                let _ = self.container.append_child(&el);
                self.cards.push(el);
            }
            let width = self.container.client_width() as f32;
            self.ring.layout(width);
            self.apply();
        }

        fn apply(&self) {
            if let Some(el) = self.container.dyn_ref::<HtmlElement>() {
                let _ = el.style().set_property("transform", &self.ring.ring_css());
            }
            for (i, card) in self.cards.iter().enumerate() {
                let Some(transform) = self.ring.card_transform(i) else {
                    continue;
                };
                if let Some(el) = card.dyn_ref::<HtmlElement>() {
                    let _ = el.style().set_property("transform", &transform.css());
                }
                let _ = card.class_list().toggle_with_force("front", transform.front);
            }
        }
    }

    struct App {
        pond: Pond,
        surface: CanvasSurface,
        scheduler: RafScheduler,
        canvas: HtmlCanvasElement,
        container: Option<Element>,
        ring: Option<RingView>,
        fps_el: Option<Element>,
        anchor: String,
        last_time: f64,
        listeners: Vec<Listener>,
    }

    thread_local! {
        static APP: RefCell<Option<Rc<RefCell<App>>>> = const { RefCell::new(None) };
    }

    fn with_app(f: impl FnOnce(&Rc<RefCell<App>>)) {
        let app = APP.with(|slot| slot.borrow().clone());
        if let Some(app) = app {
            f(&app);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
        log::info!("Duck Pond starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        let Some(canvas) = document
            .get_element_by_id("pond")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No <canvas id=\"pond\"> found");
            return;
        };
        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            log::error!("Canvas 2D context unavailable");
            return;
        };

        let mut settings = Settings::load();
        let prefers_reduced = window
            .match_media("(prefers-reduced-motion: reduce)")
            .ok()
            .flatten()
            .is_some_and(|mq| mq.matches());
        settings.reduced_motion |= prefers_reduced;

        let anchor = canvas
            .get_attribute("data-anchor")
            .unwrap_or_else(|| DEFAULT_ANCHOR.to_string());
        let container = document.get_element_by_id("pond-container");
        let scheduler = RafScheduler::default();
        let images: Images = Rc::new(RefCell::new(HashMap::new()));

        let pond = Pond::new(
            canvas.client_width() as f32,
            canvas.client_height() as f32,
            anchor.clone(),
            settings.clone(),
            Box::new(TemplateSprites::new(settings.sprite_template.clone())),
            Box::new(scheduler.clone()),
        )
        .with_status_sink(Box::new(DomStatus {
            status: document.get_element_by_id("pond-status"),
            container: container.clone(),
        }))
        .with_score_sink(Box::new(DomScore {
            element: document.get_element_by_id("pond-score"),
        }))
        .with_seed(js_sys::Date::now() as u64);

        let ring = document.get_element_by_id("duck-ring").map(|container| RingView {
            ring: RingCarousel::new(&settings, settings.carousel_mode),
            container,
            cards: Vec::new(),
            pointer_id: None,
        });

        let app = Rc::new(RefCell::new(App {
            pond,
            surface: CanvasSurface {
                ctx,
                width: 0.0,
                height: 0.0,
                images,
            },
            scheduler,
            canvas: canvas.clone(),
            container,
            ring,
            fps_el: if settings.show_fps {
                document.get_element_by_id("pond-fps")
            } else {
                None
            },
            anchor,
            last_time: 0.0,
            listeners: Vec::new(),
        }));

        resize_canvas(&app);
        app.borrow_mut().pond.set_profiles(&[]);

        setup_pointer_handlers(&app, &canvas);
        setup_ring_handlers(&app);
        {
            let handle = app.clone();
            listen(&app, window.as_ref(), "resize", move |_| resize_canvas(&handle));
        }

        APP.with(|slot| *slot.borrow_mut() = Some(app.clone()));
        request_animation_frame(app);
        log::info!("Duck Pond running!");
    }

    fn listen(
        app: &Rc<RefCell<App>>,
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(web_sys::Event) + 'static,
    ) {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
        if target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("Could not attach {} listener", kind);
            return;
        }
        app.borrow_mut().listeners.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
    }

    /// Translate a DOM pointer event into canvas coordinates
    fn normalize(canvas: &HtmlCanvasElement, event: &web_sys::PointerEvent, phase: PointerPhase) -> PointerEvent {
        let rect = canvas.get_bounding_client_rect();
        PointerEvent::new(
            phase,
            event.pointer_id(),
            (event.client_x() as f64 - rect.left()) as f32,
            (event.client_y() as f64 - rect.top()) as f32,
            event.time_stamp(),
        )
    }

    fn setup_pointer_handlers(app: &Rc<RefCell<App>>, canvas: &HtmlCanvasElement) {
        let phases = [
            ("pointerdown", PointerPhase::Down),
            ("pointermove", PointerPhase::Move),
            ("pointerup", PointerPhase::Up),
            ("pointercancel", PointerPhase::Cancel),
        ];
        for (kind, phase) in phases {
            let handle = app.clone();
            let canvas_clone = canvas.clone();
            listen(app, canvas.as_ref(), kind, move |event: web_sys::Event| {
                let Some(event) = event.dyn_ref::<web_sys::PointerEvent>() else {
                    return;
                };
                if phase == PointerPhase::Down {
                    event.prevent_default();
                }
                let normalized = normalize(&canvas_clone, event, phase);
                let outcome = handle.borrow_mut().pond.pointer(normalized);
                if let duck_pond::input::InputOutcome::Grabbed { .. } = outcome {
                    // Keep receiving moves when the pointer leaves the canvas
                    let _ = canvas_clone.set_pointer_capture(event.pointer_id());
                }
            });
        }
    }

    fn setup_ring_handlers(app: &Rc<RefCell<App>>) {
        let Some(container) = app.borrow().ring.as_ref().map(|r| r.container.clone()) else {
            return;
        };
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let handle = app.clone();
            listen(app, container.as_ref(), "pointerdown", move |event| {
                let Some(event) = event.dyn_ref::<web_sys::PointerEvent>() else {
                    return;
                };
                if let Some(view) = handle.borrow_mut().ring.as_mut() {
                    view.pointer_id = Some(event.pointer_id());
                    view.ring
                        .pointer_down(event.pointer_id(), event.client_x() as f32, event.time_stamp());
                }
            });
        }
        {
            // Moves and releases on the window so a drag survives leaving the ring
            let handle = app.clone();
            listen(app, window.as_ref(), "pointermove", move |event| {
                let Some(event) = event.dyn_ref::<web_sys::PointerEvent>() else {
                    return;
                };
                let mut app = handle.borrow_mut();
                let Some(view) = app.ring.as_mut() else {
                    return;
                };
                view.ring
                    .pointer_move(event.pointer_id(), event.client_x() as f32, event.time_stamp());

                let rect = view.container.get_bounding_client_rect();
                if rect.width() > 0.0 && rect.height() > 0.0 {
                    let nx = ((event.client_x() as f64 - rect.left()) / rect.width()) * 2.0 - 1.0;
                    let ny = ((event.client_y() as f64 - rect.top()) / rect.height()) * 2.0 - 1.0;
                    view.ring.set_tilt_pointer(nx as f32, ny as f32);
                }
            });
        }
        for kind in ["pointerup", "pointercancel"] {
            let handle = app.clone();
            listen(app, window.as_ref(), kind, move |event| {
                let Some(event) = event.dyn_ref::<web_sys::PointerEvent>() else {
                    return;
                };
                if let Some(view) = handle.borrow_mut().ring.as_mut() {
                    if view.pointer_id.take().is_some() {
                        view.ring.pointer_up(event.pointer_id());
                    }
                }
            });
        }
        {
            let handle = app.clone();
            listen(app, container.as_ref(), "click", move |event| {
                let index = event
                    .target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .and_then(|el| el.closest(".duck-card").ok().flatten())
                    .and_then(|card| card.get_attribute("data-index"))
                    .and_then(|i| i.parse::<usize>().ok());
                if let (Some(index), Some(view)) = (index, handle.borrow_mut().ring.as_mut()) {
                    view.ring.click_card(index);
                }
            });
        }
    }

    /// Re-read the canvas size and rescale the backing store
    fn resize_canvas(app: &Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut app = app.borrow_mut();
        if app.pond.is_destroyed() {
            return;
        }
        let dpr = window.device_pixel_ratio();
        let w = app.canvas.client_width();
        let h = app.canvas.client_height();
        app.canvas.set_width((w as f64 * dpr) as u32);
        app.canvas.set_height((h as f64 * dpr) as u32);
        let _ = app.surface.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);

        app.pond.resize(w as f32, h as f32);
        let (width, height) = (app.pond.state().width, app.pond.state().height);
        app.surface.width = width;
        app.surface.height = height;

        if let Some(view) = app.ring.as_mut() {
            let ring_width = view.container.client_width() as f32;
            view.ring.layout(ring_width);
        }
    }

    fn load_pending_sprites(app: &Rc<RefCell<App>>) {
        let (generation, urls) = {
            let app = app.borrow();
            (app.pond.asset_generation(), app.pond.pending_sprites())
        };
        for url in urls {
            let Ok(img) = HtmlImageElement::new() else {
                log::warn!("Could not create image for {}", url);
                continue;
            };
            let onload = {
                let handle = app.clone();
                let url = url.clone();
                let img = img.clone();
                Closure::once(move || {
                    let mut app = handle.borrow_mut();
                    if app.pond.sprite_loaded(generation, &url, true) {
                        app.surface.images.borrow_mut().insert(url, img);
                    }
                })
            };
            let onerror = {
                let handle = app.clone();
                let url = url.clone();
                Closure::once(move || {
                    handle.borrow_mut().pond.sprite_loaded(generation, &url, false);
                })
            };
            img.set_onload(Some(onload.as_ref().unchecked_ref()));
            img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onload.forget();
            onerror.forget();
            img.set_src(&url);
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut guard = app.borrow_mut();
            if guard.pond.is_destroyed() {
                return;
            }
            let dt = if guard.last_time > 0.0 {
                ((time - guard.last_time) / 1000.0) as f32
            } else {
                1.0 / 60.0
            };
            guard.last_time = time;

            let App {
                pond,
                surface,
                scheduler,
                ring,
                fps_el,
                ..
            } = &mut *guard;
            if scheduler.is_running() {
                pond.on_tick(dt);
            }
            pond.render(surface);

            if let Some(view) = ring.as_mut() {
                view.ring.tick(dt);
                view.apply();
            }
            if let Some(el) = fps_el {
                el.set_text_content(Some(&pond.fps().to_string()));
            }
        }
        request_animation_frame(app);
    }

    fn parse_profiles(json: &str) -> Option<Vec<Profile>> {
        match serde_json::from_str::<Vec<Profile>>(json) {
            Ok(profiles) => Some(profiles),
            Err(e) => {
                log::warn!("Ignoring malformed profile list: {}", e);
                None
            }
        }
    }

    fn refresh_ring(app: &Rc<RefCell<App>>, profiles: &[Profile]) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let mut app = app.borrow_mut();
        let anchor = app.anchor.clone();
        let template = app.pond.settings().sprite_template.clone();
        if let Some(view) = app.ring.as_mut() {
            view.rebuild(&document, profiles, &anchor, &template);
        }
    }

    pub fn set_profiles(json: &str) {
        let Some(profiles) = parse_profiles(json) else {
            return;
        };
        with_app(|app| {
            app.borrow_mut().pond.set_profiles(&profiles);
            load_pending_sprites(app);
            refresh_ring(app, &profiles);
        });
    }

    pub fn reload(json: &str) {
        let Some(profiles) = parse_profiles(json) else {
            return;
        };
        with_app(|app| {
            {
                let mut app = app.borrow_mut();
                app.surface.images.borrow_mut().clear();
                app.pond.reload(&profiles);
            }
            load_pending_sprites(app);
            refresh_ring(app, &profiles);
        });
    }

    pub fn destroy() {
        let Some(app) = APP.with(|slot| slot.borrow_mut().take()) else {
            return;
        };
        let listeners = {
            let mut app = app.borrow_mut();
            if !app.pond.destroy() {
                return;
            }
            std::mem::take(&mut app.listeners)
        };
        for listener in &listeners {
            let _ = listener
                .target
                .remove_event_listener_with_callback(listener.kind, listener.closure.as_ref().unchecked_ref());
        }
        log::info!("Detached {} listeners", listeners.len());
    }

    pub fn toggle_fullscreen() {
        with_app(|app| {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if document.fullscreen_element().is_some() {
                document.exit_fullscreen();
                log::info!("Leaving fullscreen");
            } else {
                let target = {
                    let app = app.borrow();
                    app.container
                        .clone()
                        .unwrap_or_else(|| app.canvas.clone().unchecked_into())
                };
                if target.request_fullscreen().is_err() {
                    log::warn!("Fullscreen request refused");
                    return;
                }
                log::info!("Entering fullscreen");
            }

            // The new size is only reliable once the browser has settled
            let Some(window) = web_sys::window() else {
                return;
            };
            let handle = app.clone();
            let closure = Closure::once(move || resize_canvas(&handle));
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                FULLSCREEN_SETTLE_MS,
            );
            closure.forget();
        });
    }

    pub fn apply_settings(json: &str) {
        let Some(settings) = Settings::from_json(json) else {
            return;
        };
        settings.save();
        with_app(|app| {
            {
                let mut app = app.borrow_mut();
                if let Some(view) = app.ring.as_mut() {
                    view.ring.set_reduced_motion(settings.reduced_motion);
                    view.ring.set_mode(settings.carousel_mode);
                }
                app.pond.apply_settings(settings);
            }
            // A new sprite template leaves fresh URLs pending
            load_pending_sprites(app);
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Replace the pond's profiles with a JSON array of `{id, display_name, birthdate}`
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_profiles(json: &str) {
    wasm_game::set_profiles(json);
}

/// Like `set_profiles`, but drops every cached sprite first
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn reload_profiles(json: &str) {
    wasm_game::reload(json);
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn destroy_pond() {
    wasm_game::destroy();
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn toggle_fullscreen() {
    wasm_game::toggle_fullscreen();
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn apply_settings(json: &str) {
    wasm_game::apply_settings(json);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Duck Pond (native) starting...");
    log::info!("The interactive pond runs in the browser - this is a headless simulation");

    let seconds = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(10);
    headless::run(seconds);
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use duck_pond::consts::{DEFAULT_ANCHOR, FALLBACK_HEIGHT, FALLBACK_WIDTH};
    use duck_pond::cycle::local_today;
    use duck_pond::input::{PointerEvent, PointerPhase};
    use duck_pond::platform::{ManualScheduler, RecordingSink, TemplateSprites};
    use duck_pond::renderer::CommandList;
    use duck_pond::sim::Profile;
    use duck_pond::{Pond, RingCarousel, Settings};

    const SEED: u64 = 42;

    fn demo_profiles() -> Vec<Profile> {
        vec![
            Profile::new("ada", "Ada", "1985-04-20"),
            Profile::new("bo", "Bo", "1990-07-01"),
            Profile::new("cy", "Cy", "2001-12-24"),
            Profile::new("dee", "Dee", "1978-02-14"),
            Profile::new("eli", "Eli", "not a date"),
        ]
    }

    pub fn run(seconds: u32) {
        let scheduler = ManualScheduler::new(1.0 / 60.0);
        let sink = RecordingSink::default();
        let settings = Settings::load();

        let mut pond = Pond::new(
            FALLBACK_WIDTH,
            FALLBACK_HEIGHT,
            DEFAULT_ANCHOR,
            settings.clone(),
            Box::new(TemplateSprites::new(settings.sprite_template.clone())),
            Box::new(scheduler.clone()),
        )
        .with_status_sink(Box::new(sink.clone()))
        .with_score_sink(Box::new(sink.clone()))
        .with_seed(SEED);

        let profiles = demo_profiles();
        pond.set_profiles(&profiles);

        // Throw the first duck toward the right wall
        if let Some(duck) = pond.state().ducks.first() {
            let start = duck.pos;
            pond.pointer(PointerEvent::new(PointerPhase::Down, 1, start.x, start.y, 0.0));
            for i in 1..=4 {
                let x = start.x + 30.0 * i as f32;
                pond.pointer(PointerEvent::new(PointerPhase::Move, 1, x, start.y, 16.0 * i as f64));
            }
            pond.pointer(PointerEvent::new(PointerPhase::Up, 1, start.x + 120.0, start.y, 80.0));
        }

        let frames = scheduler.run(&mut pond, seconds * 60);
        let mut surface = CommandList::new();
        pond.render(&mut surface);

        println!("\nSimulated {} frames ({} s, seed {})", frames, seconds, SEED);
        println!("Score: {}", sink.score.get());
        if let Some(status) = sink.last_status() {
            println!("Status: {}", status);
        }
        println!("Last frame: {} draw commands", surface.commands.len());
        for duck in &pond.state().ducks {
            let day = duck
                .cycle_day
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<4} day {:>2}  pos ({:>6.1}, {:>6.1})  vel ({:>7.1}, {:>7.1}){}",
                duck.name,
                day,
                duck.pos.x,
                duck.pos.y,
                duck.vel.x,
                duck.vel.y,
                if duck.pinned { "  pinned" } else { "" }
            );
        }

        let mut ring = RingCarousel::new(&settings, settings.carousel_mode);
        ring.set_profiles(&profiles, DEFAULT_ANCHOR, local_today());
        ring.pointer_down(1, 0.0, 0.0);
        ring.pointer_move(1, 230.0, 200.0);
        ring.pointer_up(1);
        while ring.tick(1.0 / 60.0) {}
        if let Some(front) = ring.front_index() {
            println!(
                "Ring ({:?}) settled at {:.1} deg, front card {}",
                ring.mode(),
                ring.rotation(),
                ring.cards()[front].name
            );
        }

        pond.destroy();
    }
}
