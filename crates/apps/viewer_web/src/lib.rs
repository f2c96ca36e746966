//! Browser entry points for the flight-traffic globe.
//!
//! The host page calls [`start_globe`] once; the module then owns a full-viewport
//! canvas, the window listeners and a `requestAnimationFrame` loop until
//! [`dispose_globe`] tears them down.

pub mod assets;
pub mod config;
pub mod error;
pub mod frame_loop;
pub mod geometry;
pub mod logging;
pub mod session;
pub mod traffic;
mod wgpu;

use console_error_panic_hook::set_once;
use foundation::TimeMs;
use gpu::{SurfaceError, Viewport};
use std::cell::RefCell;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, EventTarget, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

pub use config::{ConfigError, GlobeConfig};
pub use error::ViewerError;
pub use session::GlobeSession;
pub use wgpu::WgpuSurface;

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

struct App {
    session: GlobeSession<WgpuSurface>,
    canvas: HtmlCanvasElement,
    owns_canvas: bool,
    listeners: Vec<Listener>,
    frame_request: Option<i32>,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
    static FRAME_CALLBACK: RefCell<Option<Closure<dyn FnMut(f64)>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Mounts the globe and starts rendering.
///
/// `preset` is `"daylight"` or `"night"`; `config_json` overrides any subset of it.
/// The dataset arguments replace the bundled demo collections when given.
#[wasm_bindgen]
pub async fn start_globe(
    preset: String,
    config_json: Option<String>,
    countries: Option<String>,
    flights: Option<String>,
    airports: Option<String>,
) -> Result<(), JsValue> {
    launch(&preset, config_json.as_deref(), countries.as_deref(), flights.as_deref(), airports.as_deref())
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "globe failed to start");
            JsValue::from(err)
        })
}

/// Stops the frame loop, unbinds listeners and releases the globe. Safe to call
/// when nothing is running.
#[wasm_bindgen]
pub fn dispose_globe() {
    let Some(mut app) = APP.with(|app| app.borrow_mut().take()) else {
        return;
    };
    if let (Some(id), Some(window)) = (app.frame_request.take(), web_sys::window()) {
        if let Err(err) = window.cancel_animation_frame(id) {
            tracing::warn!(error = ?err, "animation frame not cancelled");
        }
    }
    FRAME_CALLBACK.with(|cb| cb.borrow_mut().take());
    unbind(std::mem::take(&mut app.listeners));
    app.session.dispose();
    if app.owns_canvas {
        app.canvas.remove();
    }
}

fn is_running() -> bool {
    APP.with(|app| app.borrow().is_some())
}

async fn launch(
    preset: &str,
    config_json: Option<&str>,
    countries: Option<&str>,
    flights: Option<&str>,
    airports: Option<&str>,
) -> Result<(), ViewerError> {
    if is_running() {
        return Err(ViewerError::AlreadyStarted);
    }
    logging::init();
    let config = match config_json {
        Some(json) => GlobeConfig::from_json(preset, json)?,
        None => GlobeConfig::preset(preset)?,
    };
    logging::set_filter(&config.log_filter);
    let datasets = assets::datasets_with_overrides(countries, flights, airports)?;

    let window = web_sys::window().ok_or(SurfaceError::NoWindow)?;
    let document = window.document().ok_or(SurfaceError::NoDocument)?;
    let (canvas, owns_canvas) = mount_canvas(&document, &config.renderer.canvas_id)?;
    let viewport = viewport_of(&window).with_max_pixel_ratio(config.renderer.max_pixel_ratio);
    let surface = match WgpuSurface::new(canvas.clone(), &config.renderer, viewport).await {
        Ok(surface) => surface,
        Err(err) => {
            if owns_canvas {
                canvas.remove();
            }
            return Err(err.into());
        }
    };

    // A second start may have finished while the adapter was being requested.
    if is_running() {
        if owns_canvas {
            canvas.remove();
        }
        return Err(ViewerError::AlreadyStarted);
    }
    let started = GlobeSession::bootstrap(datasets, config, viewport, surface, now_ms(&window))
        .and_then(|session| Ok((session, bind(&window, &canvas)?)));
    let (session, listeners) = match started {
        Ok(started) => started,
        Err(err) => {
            if owns_canvas {
                canvas.remove();
            }
            return Err(err);
        }
    };

    APP.with(|app| {
        *app.borrow_mut() = Some(App {
            session,
            canvas,
            owns_canvas,
            listeners,
            frame_request: None,
        })
    });
    FRAME_CALLBACK.with(|cb| *cb.borrow_mut() = Some(Closure::new(on_animation_frame)));
    request_frame(&window)
}

fn on_animation_frame(timestamp: f64) {
    let alive = APP.with(|app| match app.borrow_mut().as_mut() {
        Some(app) => {
            app.frame_request = None;
            app.session.tick(TimeMs(timestamp));
            true
        }
        None => false,
    });
    if !alive {
        return;
    }
    let requested = web_sys::window()
        .ok_or(ViewerError::Surface(SurfaceError::NoWindow))
        .and_then(|window| request_frame(&window));
    if let Err(err) = requested {
        tracing::error!(error = %err, "frame loop stopped");
    }
}

fn request_frame(window: &Window) -> Result<(), ViewerError> {
    let id = FRAME_CALLBACK.with(|cb| {
        cb.borrow()
            .as_ref()
            .map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()))
    });
    match id {
        Some(Ok(id)) => {
            APP.with(|app| {
                if let Some(app) = app.borrow_mut().as_mut() {
                    app.frame_request = Some(id);
                }
            });
            Ok(())
        }
        Some(Err(err)) => Err(ViewerError::js(err)),
        None => Ok(()),
    }
}

fn with_session(f: impl FnOnce(&mut GlobeSession<WgpuSurface>)) {
    APP.with(|app| {
        if let Some(app) = app.borrow_mut().as_mut() {
            f(&mut app.session);
        }
    });
}

fn now_ms(window: &Window) -> TimeMs {
    TimeMs(window.performance().map(|p| p.now()).unwrap_or(0.0))
}

fn viewport_of(window: &Window) -> Viewport {
    let size = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
    Viewport::new(
        size(window.inner_width()),
        size(window.inner_height()),
        window.device_pixel_ratio(),
    )
}

/// Reuses the page's canvas with the configured id, or appends one to the body.
fn mount_canvas(document: &Document, id: &str) -> Result<(HtmlCanvasElement, bool), ViewerError> {
    let (element, created) = match document.get_element_by_id(id) {
        Some(element) => (element, false),
        None => {
            let element = document.create_element("canvas").map_err(ViewerError::js)?;
            element.set_id(id);
            document
                .body()
                .ok_or(SurfaceError::NoBody)?
                .append_child(&element)
                .map_err(ViewerError::js)?;
            (element, true)
        }
    };
    let canvas: HtmlCanvasElement = element
        .dyn_into()
        .map_err(|_| SurfaceError::Canvas(format!("#{id} is not a canvas")))?;
    let style = canvas.style();
    for (name, value) in [
        ("position", "fixed"),
        ("inset", "0"),
        ("width", "100vw"),
        ("height", "100vh"),
        ("display", "block"),
        ("touch-action", "none"),
    ] {
        style.set_property(name, value).map_err(ViewerError::js)?;
    }
    Ok((canvas, created))
}

fn listen(
    target: &EventTarget,
    kind: &'static str,
    handler: Box<dyn FnMut(web_sys::Event)>,
) -> Result<Listener, ViewerError> {
    let closure = Closure::wrap(handler);
    target
        .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        .map_err(ViewerError::js)?;
    Ok(Listener {
        target: target.clone(),
        kind,
        closure,
    })
}

fn bind(window: &Window, canvas: &HtmlCanvasElement) -> Result<Vec<Listener>, ViewerError> {
    let window_target: &EventTarget = window.as_ref();
    let canvas_target: &EventTarget = canvas.as_ref();
    let handlers: [(&EventTarget, &'static str, Box<dyn FnMut(web_sys::Event)>); 5] = [
        (
            window_target,
            "resize",
            Box::new(|_: web_sys::Event| {
                if let Some(window) = web_sys::window() {
                    let viewport = viewport_of(&window);
                    with_session(|s| s.resize(viewport));
                }
            }),
        ),
        (
            window_target,
            "pointermove",
            Box::new(|event: web_sys::Event| {
                if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                    let (x, y) = (f64::from(mouse.client_x()), f64::from(mouse.client_y()));
                    with_session(|s| s.on_pointer_move(x, y));
                }
            }),
        ),
        (
            window_target,
            "pointerup",
            Box::new(|_: web_sys::Event| with_session(|s| s.on_pointer_up())),
        ),
        (
            canvas_target,
            "pointerdown",
            Box::new(|event: web_sys::Event| {
                if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                    let (x, y) = (f64::from(mouse.client_x()), f64::from(mouse.client_y()));
                    let button = mouse.button();
                    with_session(|s| s.on_pointer_down(x, y, button));
                }
            }),
        ),
        (
            canvas_target,
            "wheel",
            Box::new(|event: web_sys::Event| {
                if let Some(wheel) = event.dyn_ref::<WheelEvent>() {
                    event.prevent_default();
                    let delta = wheel.delta_y();
                    with_session(|s| s.on_wheel(delta));
                }
            }),
        ),
    ];

    let mut listeners = Vec::with_capacity(handlers.len());
    for (target, kind, handler) in handlers {
        match listen(target, kind, handler) {
            Ok(listener) => listeners.push(listener),
            Err(err) => {
                unbind(listeners);
                return Err(err);
            }
        }
    }
    Ok(listeners)
}

fn unbind(listeners: Vec<Listener>) {
    for listener in listeners {
        if let Err(err) = listener
            .target
            .remove_event_listener_with_callback(listener.kind, listener.closure.as_ref().unchecked_ref())
        {
            tracing::warn!(kind = listener.kind, error = ?err, "listener not removed");
        }
    }
}
