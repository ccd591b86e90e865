use std::convert::Infallible;

use crate::graphics::Color;
use crate::ui::Rect;

/// Size of a drawable surface in device pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Ties (square surfaces) count as portrait.
    pub const fn is_landscape(self) -> bool {
        self.width > self.height
    }

    /// Never reports a zero dimension; window systems reject zero-sized buffers.
    pub fn at_least_one(self) -> Self {
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
        }
    }

    pub fn as_rect(self) -> Rect {
        Rect::from_size(self.width as f32, self.height as f32)
    }

    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// A resizable RGBA surface.
///
/// Rendering writes RGBA pixels into `frame_mut()`; presentation shows them somewhere.
/// Works the same for a window and for an offscreen buffer.
pub trait Surface {
    type Error;

    fn size(&self) -> SurfaceSize;
    fn frame_mut(&mut self) -> &mut [u8];

    fn resize(&mut self, size: SurfaceSize) -> Result<(), Self::Error>;
    fn present(&mut self) -> Result<(), Self::Error>;
}

/// In-memory RGBA surface for headless runs and tests.
#[derive(Debug, Clone)]
pub struct RgbaBufferSurface {
    size: SurfaceSize,
    buf: Vec<u8>,
    presented: u64,
}

impl RgbaBufferSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            buf: vec![0u8; size.rgba_len()],
            presented: 0,
        }
    }

    pub fn frame(&self) -> &[u8] {
        &self.buf
    }

    /// Reads back one pixel, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let idx = (y as usize * self.size.width as usize + x as usize) * 4;
        let px = self.buf.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented
    }
}

impl Surface for RgbaBufferSurface {
    type Error = Infallible;

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), Self::Error> {
        self.size = size;
        self.buf.resize(size.rgba_len(), 0u8);
        Ok(())
    }

    fn present(&mut self) -> Result<(), Self::Error> {
        self.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_surface_is_portrait() {
        assert!(!SurfaceSize::new(600, 600).is_landscape());
        assert!(SurfaceSize::new(601, 600).is_landscape());
        assert!(!SurfaceSize::new(600, 800).is_landscape());
    }

    #[test]
    fn resize_reallocates_and_keeps_pixel_readback_in_bounds() {
        let mut surface = RgbaBufferSurface::new(SurfaceSize::new(4, 4));
        assert_eq!(surface.frame().len(), 64);
        assert_eq!(surface.pixel(3, 3), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(4, 0), None);

        surface.resize(SurfaceSize::new(8, 2)).unwrap();
        assert_eq!(surface.frame().len(), 64);
        assert_eq!(surface.pixel(7, 1), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(0, 2), None);
    }
}
