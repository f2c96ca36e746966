//! One page's worth of globe: bootstrap, per-frame tick, resize, input, dispose.

use formats::Datasets;
use foundation::TimeMs;
use gpu::{RenderSurface, Renderer, Viewport};
use rand::SeedableRng;
use rand::rngs::StdRng;
use runtime::{EventBus, FrameClock};
use scene::{Globe, GlobeEvent, OrbitControls, PerspectiveCamera, Scene, TrafficLayers};

use crate::config::GlobeConfig;
use crate::error::ViewerError;
use crate::frame_loop::{FrameStats, PointerOffset, apply_parallax};
use crate::traffic::{AttachReason, TrafficScheduler};

pub struct GlobeSession<S: RenderSurface> {
    config: GlobeConfig,
    datasets: Datasets,
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    surface: S,
    viewport: Viewport,
    pointer: PointerOffset,
    clock: FrameClock,
    events: EventBus<GlobeEvent>,
    traffic: TrafficScheduler,
    rng: StdRng,
    stats: FrameStats,
    disposed: bool,
}

impl<S: RenderSurface> GlobeSession<S> {
    /// Builds the scene and base globe geometry, sizes the surface and arms the traffic
    /// gate. `now` is the host timestamp the gate's timers count from.
    pub fn bootstrap(
        datasets: Datasets,
        config: GlobeConfig,
        viewport: Viewport,
        surface: S,
        now: TimeMs,
    ) -> Result<Self, ViewerError> {
        config.validate()?;

        let mut globe = Globe::new(config.globe.clone());
        globe.build_base(&datasets.countries)?;
        let scene = Scene::new(&config.scene, globe);

        let camera = PerspectiveCamera::new(&config.camera, viewport.aspect());
        let controls = OrbitControls::new(config.controls.clone());
        let traffic = TrafficScheduler::new(config.traffic.gate, now);

        let mut session = Self {
            config,
            datasets,
            scene,
            camera,
            controls,
            surface,
            viewport,
            pointer: PointerOffset::default(),
            clock: FrameClock::new(),
            events: EventBus::new(),
            traffic,
            rng: StdRng::from_entropy(),
            stats: FrameStats::default(),
            disposed: false,
        };
        session.resize(viewport);
        tracing::info!(
            countries = session.datasets.countries.len(),
            flights = session.datasets.flights.len(),
            airports = session.datasets.airports.len(),
            gate = ?session.traffic.gate(),
            "globe session started"
        );
        Ok(session)
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn pointer(&self) -> PointerOffset {
        self.pointer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Camera aspect and surface pixel size follow the viewport. Callable at any time.
    pub fn resize(&mut self, viewport: Viewport) {
        let viewport = viewport.with_max_pixel_ratio(self.config.renderer.max_pixel_ratio);
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
        self.controls.set_viewport_height(viewport.height);
        self.surface.resize(viewport);
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            dpr = viewport.device_pixel_ratio,
            "viewport resized"
        );
    }

    /// Hover position for parallax; also drives an active drag.
    pub fn on_pointer_move(&mut self, client_x: f64, client_y: f64) {
        self.pointer = PointerOffset::from_client(client_x, client_y, &self.viewport);
        self.controls.on_pointer_move([client_x, client_y]);
    }

    pub fn on_pointer_down(&mut self, client_x: f64, client_y: f64, button: i16) {
        self.controls.on_pointer_down([client_x, client_y], button);
    }

    pub fn on_pointer_up(&mut self) {
        self.controls.on_pointer_up();
    }

    pub fn on_wheel(&mut self, delta_y: f64) {
        self.controls.on_wheel(delta_y);
    }

    /// One display refresh. The look-at precedes the controls update so a drag in
    /// progress still turns the globe.
    pub fn tick(&mut self, now: TimeMs) {
        if self.disposed {
            return;
        }
        let frame = self.clock.tick(now);

        self.scene.globe.tick(frame, &mut self.events);
        let events = self.events.drain();
        if let Some(reason) = self.traffic.poll(now, &events) {
            self.attach_traffic(now, reason);
        }

        apply_parallax(&mut self.camera, self.pointer, &self.viewport, &self.config.parallax);
        self.camera.look_at(Scene::ORIGIN);
        self.controls.update(&mut self.camera);

        let render_frame = Renderer::collect(&self.scene, &self.camera, frame);
        match self.surface.render(&render_frame) {
            Ok(()) => self.stats.rendered += 1,
            Err(err) => {
                self.stats.skipped += 1;
                tracing::warn!(frame = frame.index, error = %err, "frame skipped");
                if err.needs_reconfigure() {
                    self.surface.resize(self.viewport);
                }
            }
        }
    }

    fn attach_traffic(&mut self, now: TimeMs, reason: AttachReason) {
        let layers = TrafficLayers::build(&self.datasets, &self.config.traffic.style, now, &mut self.rng);
        match self.scene.globe.attach_traffic(layers) {
            Ok(()) => tracing::info!(?reason, at_ms = now.0, "traffic attached"),
            Err(err) => tracing::warn!(?reason, error = %err, "traffic not attached"),
        }
    }

    /// Releases the globe geometry and disarms the traffic gate. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.traffic.cancel();
        self.scene.globe.dispose();
        self.disposed = true;
        tracing::info!(
            rendered = self.stats.rendered,
            skipped = self.stats.skipped,
            "globe session disposed"
        );
    }
}
