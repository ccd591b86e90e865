//! Small 2D plumbing for pixel-buffer games: layout rects, a software renderer, texture
//! loading and a frame-driven host.

pub mod app;
pub mod clock;
pub mod graphics;
pub mod surface;
pub mod texture;
pub mod ui;

pub use clock::{FrameClock, FrameDriver, HeadlessRunner};
pub use graphics::{Color, CpuRenderer, DrawCommand, DrawList, Renderer2d, TextStyle, UvRect};
pub use surface::{RgbaBufferSurface, Surface, SurfaceSize};
pub use texture::{AssetError, AssetLoader, RgbaImage, TextureCache, TextureId, TextureSlot, TextureStore};
pub use ui::{Point, Rect, Size};
