use std::error::Error;
use std::time::{Duration, Instant};

use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::clock::{DEFAULT_MAX_FRAME_DELTA, FrameClock, FrameDriver};
use crate::graphics::CpuRenderer;
use crate::surface::{Surface, SurfaceSize};
use crate::ui::Point;

pub struct AppConfig {
    pub title: String,
    pub desired_size: PhysicalSize<u32>,
    pub clamp_to_monitor: bool,
    pub vsync: Option<bool>,
    pub max_frame_delta: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: String::from("engine"),
            desired_size: PhysicalSize::new(1280, 720),
            clamp_to_monitor: true,
            vsync: None,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
        }
    }
}

/// `pixels` frame buffer viewed as a `Surface`.
///
/// The buffer always matches the window's physical size so one buffer pixel is one device pixel
/// and tap coordinates need no rescaling.
pub struct PixelsSurface {
    pixels: Pixels,
    size: SurfaceSize,
}

impl PixelsSurface {
    pub fn new(pixels: Pixels, size: SurfaceSize) -> Self {
        Self { pixels, size }
    }
}

impl Surface for PixelsSurface {
    type Error = pixels::Error;

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        self.pixels.frame_mut()
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), Self::Error> {
        if size.is_empty() {
            // Minimized: keep the old buffer, nothing will be presented.
            return Ok(());
        }
        self.pixels.resize_surface(size.width, size.height)?;
        self.pixels.resize_buffer(size.width, size.height)?;
        self.size = size;
        Ok(())
    }

    fn present(&mut self) -> Result<(), Self::Error> {
        self.pixels.render()
    }
}

fn tap_point(position: PhysicalPosition<f64>) -> Point {
    Point::new(position.x.max(0.0) as f32, position.y.max(0.0) as f32)
}

/// Opens a window and drives `driver` until the window is closed.
///
/// Left mouse presses and touch starts become taps at the cursor's physical position.
pub fn run_app<D: FrameDriver + 'static>(config: AppConfig, mut driver: D) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new();
    let monitor_size = if config.clamp_to_monitor {
        event_loop.primary_monitor().map(|m| m.size())
    } else {
        None
    };
    let initial_size = if let Some(monitor) = monitor_size {
        PhysicalSize::new(
            config.desired_size.width.min(monitor.width),
            config.desired_size.height.min(monitor.height),
        )
    } else {
        config.desired_size
    };
    let window = WindowBuilder::new()
        .with_title(config.title)
        .with_inner_size(initial_size)
        .build(&event_loop)?;

    let window_size = window.inner_size();
    let surface_size = SurfaceSize::new(window_size.width, window_size.height).at_least_one();

    let pixels = {
        let surface_texture = SurfaceTexture::new(surface_size.width, surface_size.height, &window);
        let mut builder = PixelsBuilder::new(surface_size.width, surface_size.height, surface_texture);
        if let Some(vsync) = config.vsync {
            builder = builder.enable_vsync(vsync);
        }
        builder.build()?
    };
    let mut surface = PixelsSurface::new(pixels, surface_size);
    driver.resize(surface_size);

    let mut clock = FrameClock::new(config.max_frame_delta);
    let mut cursor: Option<PhysicalPosition<f64>> = None;
    tracing::info!(width = surface_size.width, height = surface_size.height, "window opened");

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    let size = SurfaceSize::new(size.width, size.height);
                    if let Err(err) = surface.resize(size) {
                        tracing::warn!(%err, "resize failed");
                    }
                    if !size.is_empty() {
                        driver.resize(size);
                    }
                    window.request_redraw();
                }
                WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                    let size = SurfaceSize::new(new_inner_size.width, new_inner_size.height);
                    if let Err(err) = surface.resize(size) {
                        tracing::warn!(%err, "resize failed");
                    }
                    if !size.is_empty() {
                        driver.resize(size);
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    cursor = Some(position);
                }
                WindowEvent::CursorLeft { .. } => {
                    cursor = None;
                }
                WindowEvent::MouseInput {
                    state: ElementState::Pressed,
                    button: MouseButton::Left,
                    ..
                } => {
                    if let Some(position) = cursor {
                        driver.tap(tap_point(position));
                    }
                }
                WindowEvent::Touch(touch) => {
                    if touch.phase == TouchPhase::Started {
                        driver.tap(tap_point(touch.location));
                    }
                }
                _ => {}
            },
            Event::RedrawRequested(_) => {
                let dt = clock.tick(Instant::now());
                driver.poll();
                driver.update(dt);

                let size = surface.size();
                match driver.textures() {
                    Some(store) => {
                        let mut gfx = CpuRenderer::with_textures(surface.frame_mut(), size, store);
                        driver.render(&mut gfx);
                    }
                    None => {
                        let mut gfx = CpuRenderer::new(surface.frame_mut(), size);
                        driver.render(&mut gfx);
                    }
                }
                if let Err(err) = surface.present() {
                    tracing::warn!(%err, "present failed");
                }
            }
            Event::MainEventsCleared => {
                window.request_redraw();
            }
            _ => {}
        }
    });
}
