//! Petal field lifecycle.
//!
//! ```text
//! Uninitialized -> Loading -> Running <-> Paused -> Disposed
//! ```
//!
//! The animator never talks to the browser directly: page signals come in
//! through the `set_*`/`frame` methods and everything it needs goes out
//! through [`Environment`] and [`Surface`].
//!
//! Motion uses fixed per-frame increments, so petal speed follows the
//! display refresh rate.

use crate::config::PetalConfig;
use crate::env::{Environment, FrameHandle, FrameTask};
use crate::error::PetalError;
use crate::field::{target_count, PetalField};
use crate::petal::Petal;
use crate::surface::{Surface, SurfaceLayout};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Loading,
    Running,
    Paused,
    Disposed,
}

pub struct Animator<E, S> {
    env: E,
    surface: S,
    config: PetalConfig,
    field: PetalField,
    layout: SurfaceLayout,
    target: usize,
    state: Lifecycle,
    sprite_ready: bool,
    hidden: bool,
    reduced_motion: bool,
    tick: Option<FrameHandle>,
    resize: Option<FrameHandle>,
}

impl<E: Environment, S: Surface> Animator<E, S> {
    pub fn new(env: E, surface: S, config: PetalConfig, seed: u64) -> Self {
        let target = config.base_density;
        Self {
            env,
            surface,
            config,
            field: PetalField::new(seed),
            layout: SurfaceLayout::default(),
            target,
            state: Lifecycle::Uninitialized,
            sprite_ready: false,
            hidden: false,
            reduced_motion: false,
            tick: None,
            resize: None,
        }
    }

    /// Size the surface and wait for the sprite.
    pub fn start(&mut self) {
        if self.state != Lifecycle::Uninitialized {
            return;
        }
        self.handle_resize();
        self.state = Lifecycle::Loading;
    }

    /// The sprite decoded: populate and run, unless motion is reduced or the
    /// page is hidden.
    pub fn sprite_ready(&mut self) {
        if self.state != Lifecycle::Loading {
            return;
        }
        self.sprite_ready = true;
        self.state = Lifecycle::Paused;
        self.reconcile();
    }

    /// Without a sprite there is nothing to draw; shut down for good.
    pub fn sprite_failed(&mut self, err: &PetalError) {
        log::error!("petal animation disabled: {err}");
        self.dispose();
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        if self.hidden == hidden {
            return;
        }
        self.hidden = hidden;
        self.reconcile();
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        if self.reduced_motion == reduced {
            return;
        }
        self.reduced_motion = reduced;
        log::debug!("reduced motion {}", if reduced { "on" } else { "off" });
        self.reconcile();
    }

    /// Window resize. Coalesced into one resize pass per frame.
    pub fn request_resize(&mut self) {
        if self.state == Lifecycle::Disposed || self.resize.is_some() {
            return;
        }
        match self.env.request_frame(FrameTask::Resize) {
            Ok(handle) => self.resize = Some(handle),
            Err(err) => {
                log::warn!("resize not deferred: {err}");
                self.handle_resize();
            }
        }
    }

    /// A frame requested through [`Environment::request_frame`] fired.
    pub fn frame(&mut self, task: FrameTask) {
        match task {
            FrameTask::Resize => {
                self.resize = None;
                self.handle_resize();
            }
            FrameTask::Tick => {
                self.tick = None;
                if self.state != Lifecycle::Running {
                    return;
                }
                self.field
                    .step(self.layout.width, self.layout.height, &self.config);
                self.render();
                self.reconcile();
            }
        }
    }

    /// Re-measure the page, resize the surface and re-evaluate density.
    /// Called directly when the body changes size.
    pub fn handle_resize(&mut self) {
        if self.state == Lifecycle::Disposed {
            return;
        }
        let metrics = self.env.page_metrics();
        self.layout = SurfaceLayout::measure(
            &metrics,
            self.env.device_pixel_ratio(),
            self.config.max_device_scale,
        );
        self.surface.resize(&self.layout);

        let target = target_count(self.layout.height, metrics.viewport_height, &self.config);
        if target != self.target {
            log::debug!("petal density {} -> {}", self.target, target);
            self.target = target;
            if !self.field.is_empty() {
                self.field
                    .populate(target, self.layout.width, self.layout.height, &self.config);
            }
        }
    }

    pub fn dispose(&mut self) {
        if self.state == Lifecycle::Disposed {
            return;
        }
        self.cancel_tick();
        if let Some(handle) = self.resize.take() {
            self.env.cancel_frame(handle);
        }
        self.env.detach();
        self.field.clear();
        self.state = Lifecycle::Disposed;
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn petals(&self) -> &[Petal] {
        self.field.petals()
    }

    pub fn target_count(&self) -> usize {
        self.target
    }

    pub fn layout(&self) -> &SurfaceLayout {
        &self.layout
    }

    pub fn config(&self) -> &PetalConfig {
        &self.config
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.tick
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Bring the loop in line with the current visibility and motion
    /// preference. Keeps exactly one tick outstanding while running.
    fn reconcile(&mut self) {
        if self.state == Lifecycle::Disposed || !self.sprite_ready {
            return;
        }
        if self.reduced_motion {
            self.cancel_tick();
            self.field.clear();
            self.surface.clear(self.layout.width, self.layout.height);
            self.state = Lifecycle::Paused;
            return;
        }
        if self.hidden {
            self.cancel_tick();
            self.state = Lifecycle::Paused;
            return;
        }
        if self.field.is_empty() {
            self.field
                .populate(self.target, self.layout.width, self.layout.height, &self.config);
        }
        if self.tick.is_none() {
            match self.env.request_frame(FrameTask::Tick) {
                Ok(handle) => self.tick = Some(handle),
                Err(err) => {
                    log::error!("petal animation stalled: {err}");
                    self.state = Lifecycle::Paused;
                    return;
                }
            }
        }
        self.state = Lifecycle::Running;
    }

    fn cancel_tick(&mut self) {
        if let Some(handle) = self.tick.take() {
            self.env.cancel_frame(handle);
        }
    }

    fn render(&mut self) {
        // Whole-surface clear each frame; cheaper tricks smear on scroll-back.
        self.surface.clear(self.layout.width, self.layout.height);
        for petal in self.field.petals() {
            let half = petal.size / 2.0;
            self.surface.save();
            self.surface.set_alpha(petal.opacity);
            self.surface.translate(petal.x, petal.y);
            self.surface.rotate(petal.rotation);
            self.surface.draw_sprite(-half, -half, petal.size, petal.size);
            self.surface.restore();
        }
    }
}
