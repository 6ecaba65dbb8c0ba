// Long-running field behaviour through the public API, on the host.

use std::cell::Cell;
use std::rc::Rc;

use sakura_wasm::env::{Environment, FrameHandle, FrameTask, PageMetrics};
use sakura_wasm::error::Result;
use sakura_wasm::surface::{Surface, SurfaceLayout};
use sakura_wasm::{Animator, Lifecycle, PetalConfig};

struct Page {
    metrics: PageMetrics,
    next: FrameHandle,
    tick: Option<FrameHandle>,
}

impl Page {
    fn new(width: f64, height: f64, viewport: f64) -> Self {
        Self {
            metrics: PageMetrics {
                surface_width: width,
                document_width: width,
                heights: [height, height, height, height, viewport, viewport],
                viewport_height: viewport,
            },
            next: 0,
            tick: None,
        }
    }
}

impl Environment for Page {
    fn page_metrics(&self) -> PageMetrics {
        self.metrics
    }

    fn device_pixel_ratio(&self) -> f64 {
        2.0
    }

    fn request_frame(&mut self, task: FrameTask) -> Result<FrameHandle> {
        self.next += 1;
        if task == FrameTask::Tick {
            assert!(self.tick.is_none(), "second tick requested while one is pending");
            self.tick = Some(self.next);
        }
        Ok(self.next)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.tick == Some(handle) {
            self.tick = None;
        }
    }

    fn detach(&mut self) {}
}

/// Counts sprite draws; shared so the test can read it while the animator
/// owns the surface.
#[derive(Clone, Default)]
struct CountingSurface {
    draws: Rc<Cell<usize>>,
}

impl Surface for CountingSurface {
    fn resize(&mut self, _layout: &SurfaceLayout) {}
    fn clear(&mut self, _width: f64, _height: f64) {}
    fn save(&mut self) {}
    fn restore(&mut self) {}
    fn translate(&mut self, _x: f64, _y: f64) {}
    fn rotate(&mut self, _angle: f64) {}
    fn set_alpha(&mut self, _alpha: f64) {}
    fn draw_sprite(&mut self, _x: f64, _y: f64, _width: f64, _height: f64) {
        self.draws.set(self.draws.get() + 1);
    }
}

fn run_frames(animator: &mut Animator<Page, CountingSurface>, frames: usize) {
    for _ in 0..frames {
        animator.environment_mut().tick = None;
        animator.frame(FrameTask::Tick);
    }
}

#[test]
fn petals_stay_in_bounds_over_many_frames() {
    let config = PetalConfig::default();
    let surface = CountingSurface::default();
    let draws = Rc::clone(&surface.draws);
    let mut animator = Animator::new(Page::new(390.0, 2600.0, 844.0), surface, config.clone(), 2024);
    animator.start();
    animator.sprite_ready();
    assert_eq!(animator.state(), Lifecycle::Running);
    assert_eq!(animator.petals().len(), 120);

    let layout = *animator.layout();
    assert_eq!((layout.backing_width, layout.backing_height), (780, 5200));

    for _ in 0..200 {
        run_frames(&mut animator, 50);
        for petal in animator.petals() {
            assert!(petal.y <= layout.height + config.spawn_margin);
            assert!(petal.x >= -config.exit_margin_x);
            assert!(petal.x <= layout.width + config.exit_margin_x);
            assert!(config.opacity.contains(petal.opacity));
            assert!(config.size.contains(petal.size));
        }
    }
    assert_eq!(draws.get(), 120 * 200 * 50);
}

#[test]
fn shrinking_page_drops_back_to_base_density() {
    let mut animator = Animator::new(
        Page::new(1280.0, 4000.0, 900.0),
        CountingSurface::default(),
        PetalConfig::default(),
        7,
    );
    animator.start();
    animator.sprite_ready();
    assert_eq!(animator.petals().len(), 120);

    animator.environment_mut().metrics.heights = [900.0; 6];
    animator.handle_resize();
    assert_eq!(animator.target_count(), 60);
    assert_eq!(animator.petals().len(), 60);
    assert_eq!(animator.state(), Lifecycle::Running);
}
