//! Application: lifecycle, per-frame tick, and deferred destroy

use crate::clock::FrameClock;
use crate::config::AppConfig;
use crate::events::{EventEmitter, FrameEvent, LifecycleEvent, ListenerId};
use crate::frame::{FrameHandle, FrameRequestSource};
use crate::input::InputDevice;
use crate::registry;
use crate::state::{DestroyRequest, Lifecycle, LifecycleState};
use crate::stats::FrameStats;
use crate::system::RuntimeSystem;
use kiln_core::{AppId, KilnError, Result};
use kiln_render::{
    ForwardRenderer, LayerComposition, RenderBackend, RenderPipeline, StaticBatcher,
};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// State shared between an application and its handles
struct Shared {
    id: AppId,
    lifecycle: RefCell<Lifecycle>,
    render_requested: Cell<bool>,
    time_scale: Cell<f64>,
    max_delta: Cell<f64>,
    /// Index of the next frame to run
    frame: Cell<u64>,
}

/// Cheap, clonable reference to a running application.
///
/// Passed to event listeners and systems. Calls made through a handle never re-enter the
/// frame loop: a destroy requested inside a frame runs after the frame completes, one
/// requested between frames is queued and runs at the next lifecycle call.
#[derive(Clone)]
pub struct AppHandle {
    shared: Rc<Shared>,
}

impl AppHandle {
    fn new(id: AppId) -> Self {
        Self {
            shared: Rc::new(Shared {
                id,
                lifecycle: RefCell::new(Lifecycle::new()),
                render_requested: Cell::new(false),
                time_scale: Cell::new(1.0),
                max_delta: Cell::new(0.1),
                frame: Cell::new(0),
            }),
        }
    }

    pub fn id(&self) -> AppId {
        self.shared.id
    }

    pub fn state(&self) -> LifecycleState {
        self.shared.lifecycle.borrow().state()
    }

    pub fn in_frame(&self) -> bool {
        self.shared.lifecycle.borrow().in_frame()
    }

    pub fn is_running(&self) -> bool {
        self.shared.lifecycle.borrow().is_running()
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.lifecycle.borrow().is_destroyed()
    }

    /// Index of the current frame while ticking, of the next frame otherwise
    pub fn frame(&self) -> u64 {
        self.shared.frame.get()
    }

    pub fn time_scale(&self) -> f64 {
        self.shared.time_scale.get()
    }

    pub fn set_time_scale(&self, scale: f64) {
        self.shared.time_scale.set(scale.max(0.0));
    }

    pub fn max_delta_time(&self) -> f64 {
        self.shared.max_delta.get()
    }

    pub fn set_max_delta_time(&self, max_delta: f64) {
        self.shared.max_delta.set(max_delta);
    }

    /// Render the next frame even when auto-render is off
    pub fn request_render(&self) {
        self.shared.render_requested.set(true);
    }

    pub fn is_render_requested(&self) -> bool {
        self.shared.render_requested.get()
    }

    /// Ask the application to shut down.
    ///
    /// Inside a frame this returns `Deferred` and teardown runs once the frame ends.
    /// Outside a frame it returns `Queued`: the application counts as destroyed at once and
    /// teardown runs at its next `initialize`, `start` or `tick`.
    pub fn destroy(&self) -> DestroyRequest {
        let request = self.shared.lifecycle.borrow_mut().request_destroy();
        match request {
            DestroyRequest::Queued => {
                log::debug!("{}: destroy queued between frames", self.id());
            }
            DestroyRequest::Deferred => {
                log::debug!("{}: destroy deferred until end of frame", self.id());
            }
            DestroyRequest::Now | DestroyRequest::AlreadyDestroyed => {}
        }
        request
    }

    fn lifecycle(&self) -> std::cell::RefMut<'_, Lifecycle> {
        self.shared.lifecycle.borrow_mut()
    }
}

impl fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppHandle")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("frame", &self.frame())
            .finish()
    }
}

/// The frame lifecycle orchestrator.
///
/// Owns the systems, input devices, render pipeline and backend of one application and
/// drives them through `initialize`, `start`, `tick` and `destroy`.
pub struct Application<B: RenderBackend> {
    handle: AppHandle,
    config: AppConfig,
    clock: FrameClock,
    events: EventEmitter<LifecycleEvent, FrameEvent>,
    systems: Vec<Box<dyn RuntimeSystem>>,
    input_devices: Vec<Box<dyn InputDevice>>,
    backend: B,
    pipeline: Option<RenderPipeline>,
    composition: LayerComposition,
    frame_source: Box<dyn FrameRequestSource>,
    pending_frame: Option<FrameHandle>,
    stats: FrameStats,
    last_timestamp: f64,
}

impl<B: RenderBackend> Application<B> {
    /// Create an application with the default forward pipeline and batching
    pub fn new(backend: B, frame_source: impl FrameRequestSource + 'static) -> Self {
        let pipeline = RenderPipeline::new(Box::new(ForwardRenderer::new()))
            .with_batcher(Box::new(StaticBatcher::new()));
        Self::with_pipeline(backend, frame_source, pipeline)
    }

    pub fn with_pipeline(
        backend: B,
        frame_source: impl FrameRequestSource + 'static,
        pipeline: RenderPipeline,
    ) -> Self {
        let handle = AppHandle::new(AppId::next());
        registry::register(handle.clone());
        log::debug!("{}: created", handle.id());

        Self {
            handle,
            config: AppConfig::default(),
            clock: FrameClock::new(),
            events: EventEmitter::new(),
            systems: Vec::new(),
            input_devices: Vec::new(),
            backend,
            pipeline: Some(pipeline),
            composition: LayerComposition::new(),
            frame_source: Box::new(frame_source),
            pending_frame: None,
            stats: FrameStats::new(),
            last_timestamp: 0.0,
        }
    }

    /// Register a system. Systems update in registration order.
    pub fn add_system(&mut self, system: Box<dyn RuntimeSystem>) {
        log::debug!("{}: system '{}' added", self.handle.id(), system.name());
        self.systems.push(system);
    }

    pub fn add_input_device(&mut self, device: Box<dyn InputDevice>) {
        self.input_devices.push(device);
    }

    pub fn on(
        &mut self,
        event: LifecycleEvent,
        callback: impl FnMut(&FrameEvent) + 'static,
    ) -> ListenerId {
        self.events.on(event, callback)
    }

    pub fn once(
        &mut self,
        event: LifecycleEvent,
        callback: impl FnMut(&FrameEvent) + 'static,
    ) -> ListenerId {
        self.events.once(event, callback)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    pub fn listener_count(&self) -> usize {
        self.events.listener_count()
    }

    /// Apply configuration. `Uninitialized → Initialized`.
    pub fn initialize(&mut self, config: AppConfig) -> Result<()> {
        if self.run_queued_destroy() {
            return Err(KilnError::Destroyed);
        }
        config.validate()?;
        self.handle.lifecycle().initialize()?;

        self.clock = FrameClock::with_settings(
            config.time.time_scale,
            config.time.max_delta_time,
            config.time.units_per_second,
        );
        self.handle.set_time_scale(config.time.time_scale);
        self.handle.set_max_delta_time(config.time.max_delta_time);
        if let Some(pipeline) = self.pipeline.as_mut() {
            pipeline.set_batching(config.render.batching);
        }
        self.config = config;

        log::info!("{}: initialized", self.handle.id());
        Ok(())
    }

    /// Start the application and run the first frame. `Initialized → Running`.
    pub fn start(&mut self, timestamp: f64) -> Result<()> {
        if self.run_queued_destroy() {
            return Err(KilnError::Destroyed);
        }
        self.handle.lifecycle().start()?;
        log::info!("{}: starting", self.handle.id());

        let event = self.frame_event(timestamp, 0.0, 0.0);
        self.events.fire(LifecycleEvent::Start, &event);

        for system in self.systems.iter_mut() {
            if let Err(e) = system.initialize(&self.handle) {
                report(system.name(), "initialize", e);
            }
        }
        self.events.fire(LifecycleEvent::Initialize, &event);

        for system in self.systems.iter_mut() {
            if let Err(e) = system.post_initialize(&self.handle) {
                report(system.name(), "post_initialize", e);
            }
        }
        self.events.fire(LifecycleEvent::PostInitialize, &event);

        if self.config.render.bake_lightmaps_on_start {
            if let Some(pipeline) = self.pipeline.as_mut() {
                pipeline.arm_lightmap_bake();
            }
        }

        self.tick(timestamp)
    }

    /// Run one frame at `timestamp`
    pub fn tick(&mut self, timestamp: f64) -> Result<()> {
        if self.run_queued_destroy() {
            return Ok(());
        }

        self.handle.lifecycle().begin_frame()?;

        if let Some(pending) = self.pending_frame.take() {
            self.frame_source.cancel(pending);
        }

        self.clock.scale = self.handle.time_scale();
        self.clock.max_delta = self.handle.max_delta_time();
        let dt = self.clock.tick(timestamp);
        let ms = self.clock.last_elapsed_ms();
        self.last_timestamp = timestamp;

        self.pending_frame = Some(self.frame_source.request());

        if self.backend.is_context_lost() {
            log::trace!(
                "{}: context lost, frame {} skipped",
                self.handle.id(),
                self.handle.frame()
            );
        } else {
            let event = self.frame_event(timestamp, dt, ms);
            self.update_phase(&event);
            self.render_phase(&event);
        }

        self.handle.shared.frame.set(self.handle.frame() + 1);
        let destroy_pending = self.handle.lifecycle().end_frame();
        if destroy_pending {
            self.teardown();
        }
        Ok(())
    }

    /// Shut the application down.
    ///
    /// Returns `Now` once teardown has run. Fails with `Destroyed` if it already ran.
    pub fn destroy(&mut self) -> Result<DestroyRequest> {
        let request = self.handle.lifecycle().request_destroy();
        match request {
            DestroyRequest::AlreadyDestroyed => Err(KilnError::Destroyed),
            DestroyRequest::Deferred => Ok(request),
            DestroyRequest::Now | DestroyRequest::Queued => {
                self.teardown();
                Ok(DestroyRequest::Now)
            }
        }
    }

    /// Run teardown for a destroy queued through a handle. Returns true if it ran.
    fn run_queued_destroy(&mut self) -> bool {
        let queued = self.handle.shared.lifecycle.borrow().is_destroy_queued();
        if queued {
            self.teardown();
        }
        queued
    }

    fn update_phase(&mut self, event: &FrameEvent) {
        self.stats.begin_frame(event.frame, event.ms, event.dt);
        self.events.fire(LifecycleEvent::FrameUpdate, event);

        self.backend.update();
        for device in self.input_devices.iter_mut() {
            device.update();
        }

        for system in self.systems.iter_mut() {
            if let Err(e) = system.update(event) {
                report(system.name(), "update", e);
            }
        }
        for system in self.systems.iter_mut() {
            if let Err(e) = system.post_update(event) {
                report(system.name(), "post_update", e);
            }
        }

        self.events.fire(LifecycleEvent::Update, event);
    }

    fn render_phase(&mut self, event: &FrameEvent) {
        self.events.fire(LifecycleEvent::FrameRender, event);

        if self.config.render.auto_render || self.handle.is_render_requested() {
            self.backend.frame_start();
            self.events.fire(LifecycleEvent::PreRender, event);

            if let Some(pipeline) = self.pipeline.as_mut() {
                match pipeline.render_composition(&mut self.composition, &mut self.backend) {
                    Ok(summary) => log::trace!(
                        "frame {}: {} passes, {} visible",
                        event.frame,
                        summary.passes,
                        summary.visible_items
                    ),
                    Err(e) => log::error!("frame {}: render failed: {}", event.frame, e),
                }
            }

            self.events.fire(LifecycleEvent::PostRender, event);
            self.backend.frame_end();
            self.stats.record_render(self.backend.counters());
            self.handle.shared.render_requested.set(false);
        }

        self.events.fire(LifecycleEvent::FrameEnd, event);
    }

    fn teardown(&mut self) {
        let id = self.handle.id();
        log::info!("{}: destroying", id);

        let started = matches!(
            self.handle.state(),
            LifecycleState::Running | LifecycleState::DestroyPending
        );
        let event = self.frame_event(self.last_timestamp, 0.0, 0.0);
        self.events.fire(LifecycleEvent::Destroy, &event);

        // Systems that never started are dropped without shutdown
        if started {
            for system in self.systems.iter_mut().rev() {
                if let Err(e) = system.shutdown() {
                    report(system.name(), "shutdown", e);
                }
            }
        }
        self.systems.clear();

        // Input devices are added after the pipeline is built
        for device in self.input_devices.iter_mut().rev() {
            device.release();
        }
        self.input_devices.clear();
        self.pipeline = None;

        if let Some(pending) = self.pending_frame.take() {
            self.frame_source.cancel(pending);
        }

        self.events.off_all();
        registry::unregister(id);
        self.handle.lifecycle().mark_destroyed();
        log::info!("{}: destroyed", id);
    }

    fn frame_event(&self, timestamp: f64, dt: f64, ms: f64) -> FrameEvent {
        FrameEvent {
            timestamp,
            dt,
            ms,
            frame: self.handle.frame(),
            app: self.handle.clone(),
        }
    }

    pub fn handle(&self) -> &AppHandle {
        &self.handle
    }

    pub fn id(&self) -> AppId {
        self.handle.id()
    }

    pub fn state(&self) -> LifecycleState {
        self.handle.state()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn time_scale(&self) -> f64 {
        self.handle.time_scale()
    }

    pub fn set_time_scale(&mut self, scale: f64) {
        self.handle.set_time_scale(scale);
    }

    pub fn max_delta_time(&self) -> f64 {
        self.handle.max_delta_time()
    }

    pub fn set_max_delta_time(&mut self, max_delta: f64) {
        self.handle.set_max_delta_time(max_delta);
    }

    pub fn set_auto_render(&mut self, auto_render: bool) {
        self.config.render.auto_render = auto_render;
    }

    pub fn request_render(&self) {
        self.handle.request_render();
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn composition(&self) -> &LayerComposition {
        &self.composition
    }

    pub fn composition_mut(&mut self) -> &mut LayerComposition {
        &mut self.composition
    }

    /// The render pipeline, `None` once destroyed
    pub fn pipeline_mut(&mut self) -> Option<&mut RenderPipeline> {
        self.pipeline.as_mut()
    }
}

impl<B: RenderBackend> Drop for Application<B> {
    fn drop(&mut self) {
        registry::unregister(self.handle.id());
    }
}

fn report(system: &str, phase: &str, error: KilnError) {
    let err = KilnError::SystemError {
        system: system.to_string(),
        message: format!("{} failed: {}", phase, error),
    };
    log::error!("{}", err);
}
