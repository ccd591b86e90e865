use std::time::{Duration, Instant};

use crate::graphics::Renderer2d;
use crate::surface::SurfaceSize;
use crate::texture::TextureStore;
use crate::ui::Point;

/// Largest step a single frame may advance the simulation.
pub const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(100);

/// Turns frame timestamps into simulation deltas.
///
/// Deltas are clamped so a stall (a backgrounded window, a debugger pause) shows up as one
/// short step instead of a jump.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Option<Instant>,
    max_delta: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_DELTA)
    }
}

impl FrameClock {
    pub fn new(max_delta: Duration) -> Self {
        Self {
            last: None,
            max_delta,
        }
    }

    pub fn max_delta(&self) -> Duration {
        self.max_delta
    }

    pub fn clamp(&self, dt: Duration) -> Duration {
        dt.min(self.max_delta)
    }

    /// The first tick only records the timestamp and returns zero.
    pub fn tick(&mut self, now: Instant) -> Duration {
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        self.clamp(dt)
    }
}

/// What a host drives once per display frame.
///
/// Taps are delivered in device pixels, in the same space as the surface the game renders to.
pub trait FrameDriver {
    fn update(&mut self, dt: Duration);
    fn tap(&mut self, point: Point);
    fn resize(&mut self, size: SurfaceSize);
    fn render(&self, gfx: &mut dyn Renderer2d);

    /// Textures the renderer may sample while drawing this driver.
    fn textures(&self) -> Option<&TextureStore> {
        None
    }

    /// Called at the start of every frame, before `update`.
    fn poll(&mut self) {}
}

/// Drives a `FrameDriver` without a window: scripted deltas, scripted taps.
#[derive(Debug)]
pub struct HeadlessRunner<D: FrameDriver> {
    driver: D,
    clock: FrameClock,
    frame: usize,
    elapsed: Duration,
}

impl<D: FrameDriver> HeadlessRunner<D> {
    pub fn new(driver: D) -> Self {
        Self::with_max_delta(driver, DEFAULT_MAX_FRAME_DELTA)
    }

    pub fn with_max_delta(driver: D, max_delta: Duration) -> Self {
        Self {
            driver,
            clock: FrameClock::new(max_delta),
            frame: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Simulated time actually fed to the driver (after clamping).
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Runs one frame. Returns the (clamped) delta that was applied.
    pub fn step(&mut self, dt: Duration) -> Duration {
        let dt = self.clock.clamp(dt);
        self.driver.poll();
        self.driver.update(dt);
        self.frame += 1;
        self.elapsed += dt;
        dt
    }

    pub fn tap(&mut self, point: Point) {
        self.driver.tap(point);
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        self.driver.resize(size);
    }

    /// Steps with a fixed `dt` until `total` simulated time has passed.
    pub fn run_for(&mut self, total: Duration, dt: Duration) -> usize {
        if dt.is_zero() {
            return self.frame;
        }
        let target = self.elapsed + total;
        while self.elapsed < target {
            let remaining = target - self.elapsed;
            self.step(dt.min(remaining));
        }
        self.frame
    }

    /// Steps until `done` holds or `max_frames` have run. Returns whether `done` was reached.
    pub fn run_until<F>(&mut self, dt: Duration, max_frames: usize, mut done: F) -> bool
    where
        F: FnMut(&D) -> bool,
    {
        for _ in 0..max_frames {
            if done(&self.driver) {
                return true;
            }
            self.step(dt);
        }
        done(&self.driver)
    }

    pub fn render(&self, gfx: &mut dyn Renderer2d) {
        self.driver.render(gfx);
    }
}
