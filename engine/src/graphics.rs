use serde::{Deserialize, Serialize};

use crate::surface::SurfaceSize;
use crate::texture::{TextureId, TextureStore};
use crate::ui::{Point, Rect, Size};

/// Straight (non-premultiplied) RGBA8.
pub type Color = [u8; 4];

pub const MISSING_TEXTURE_COLOR: Color = [255, 0, 255, 255];

// A tiny block font (no external deps). Kept deliberately simple.
const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;
const GLYPH_CELL_H: f32 = (GLYPH_H + 1) as f32;

/// Parses `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
pub fn color_from_hex(hex: &str) -> Option<Color> {
    let digits = hex.trim().trim_start_matches('#');
    if !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i * 2..i * 2 + 2)?, 16).ok();
    match digits.len() {
        6 => Some([channel(0)?, channel(1)?, channel(2)?, 255]),
        8 => Some([channel(0)?, channel(1)?, channel(2)?, channel(3)?]),
        _ => None,
    }
}

pub fn color_to_hex(color: Color) -> String {
    let [r, g, b, a] = color;
    if a == 255 {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

/// Scales the alpha channel by `factor` (clamped to `0.0..=1.0`).
pub fn scale_alpha(color: Color, factor: f32) -> Color {
    let factor = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
    let [r, g, b, a] = color;
    [r, g, b, (a as f32 * factor).round() as u8]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Every recognized text option, with defaults for the ones a caller leaves out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Line height in device pixels.
    pub size: f32,
    pub color: Color,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 28.0,
            color: [255, 255, 255, 255],
            align: TextAlign::Left,
            baseline: TextBaseline::Top,
        }
    }
}

impl TextStyle {
    pub fn centered(self) -> Self {
        Self {
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
            ..self
        }
    }

    pub fn with_color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    pub fn with_baseline(self, baseline: TextBaseline) -> Self {
        Self { baseline, ..self }
    }

    fn scale(&self) -> u32 {
        let units = (self.size / GLYPH_CELL_H).round();
        if units.is_finite() && units >= 1.0 {
            units as u32
        } else {
            1
        }
    }
}

/// Sub-rectangle of a texture in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    pub const FULL: UvRect = UvRect {
        u0: 0.0,
        v0: 0.0,
        u1: 1.0,
        v1: 1.0,
    };

    /// The cell at (`row`, `col`) of an evenly divided `n`×`n` texture.
    pub fn grid_cell(row: usize, col: usize, n: usize) -> Self {
        let n = n.max(1) as f32;
        Self {
            u0: col as f32 / n,
            v0: row as f32 / n,
            u1: (col + 1) as f32 / n,
            v1: (row + 1) as f32 / n,
        }
    }
}

/// Unified 2D rendering interface.
///
/// Game code should only talk to this trait: it must not care whether the frame ends up in a
/// CPU buffer, a window, or a recorded command list.
pub trait Renderer2d {
    fn begin_frame(&mut self, size: SurfaceSize, clear: Color);
    fn size(&self) -> SurfaceSize;

    /// Alpha-blended fill.
    fn draw_rect(&mut self, rect: Rect, color: Color);

    fn draw_text(&mut self, text: &str, pos: Point, style: &TextStyle);

    /// `uv = None` samples the whole texture.
    fn draw_texture(&mut self, texture: TextureId, rect: Rect, uv: Option<UvRect>);

    /// Four bars of `thickness` drawn inside `rect`.
    fn draw_frame(&mut self, rect: Rect, thickness: f32, color: Color) {
        let t = thickness.max(0.0);
        self.draw_rect(Rect::new(rect.x, rect.y, rect.w, t), color);
        self.draw_rect(Rect::new(rect.x, rect.bottom() - t, rect.w, t), color);
        self.draw_rect(Rect::new(rect.x, rect.y, t, rect.h), color);
        self.draw_rect(Rect::new(rect.right() - t, rect.y, t, rect.h), color);
    }
}

/// Size of `text` once drawn with the block font at `style.size`.
pub fn measure_text(text: &str, style: &TextStyle) -> Size {
    let scale = style.scale() as f32;
    let advance = (GLYPH_W + 1) as f32 * scale;
    let line_height = GLYPH_CELL_H * scale;
    let mut widest = 0usize;
    let mut lines = 0usize;
    for line in text.split('\n') {
        widest = widest.max(line.chars().count());
        lines += 1;
    }
    if widest == 0 {
        return Size::new(0.0, line_height * lines as f32);
    }
    Size::new(widest as f32 * advance - scale, line_height * lines as f32 - scale)
}

/// Top-left corner of the text box for the given anchor point and alignment.
pub fn text_origin(text: &str, pos: Point, style: &TextStyle) -> Point {
    let size = measure_text(text, style);
    let x = match style.align {
        TextAlign::Left => pos.x,
        TextAlign::Center => pos.x - size.w / 2.0,
        TextAlign::Right => pos.x - size.w,
    };
    let y = match style.baseline {
        TextBaseline::Top => pos.y,
        TextBaseline::Middle => pos.y - size.h / 2.0,
        TextBaseline::Bottom => pos.y - size.h,
    };
    Point::new(x, y)
}

/// CPU renderer that draws into an RGBA frame buffer.
pub struct CpuRenderer<'a> {
    frame: &'a mut [u8],
    size: SurfaceSize,
    textures: Option<&'a TextureStore>,
}

impl<'a> CpuRenderer<'a> {
    pub fn new(frame: &'a mut [u8], size: SurfaceSize) -> Self {
        Self {
            frame,
            size,
            textures: None,
        }
    }

    pub fn with_textures(frame: &'a mut [u8], size: SurfaceSize, textures: &'a TextureStore) -> Self {
        Self {
            frame,
            size,
            textures: Some(textures),
        }
    }

    fn frame_is_valid(&self) -> bool {
        let len = self.size.rgba_len();
        len > 0 && self.frame.len() >= len
    }

    /// Clips `rect` to the surface and snaps it to whole pixels.
    fn pixel_bounds(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let snap = |v: f32, limit: u32| -> u32 {
            if v.is_nan() || v <= 0.0 {
                0
            } else {
                (v.round() as u64).min(limit as u64) as u32
            }
        };
        let x0 = snap(rect.x, self.size.width);
        let y0 = snap(rect.y, self.size.height);
        let x1 = snap(rect.right(), self.size.width);
        let y1 = snap(rect.bottom(), self.size.height);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0, y0, x1, y1))
    }

    fn blend_pixel(&mut self, x: u32, y: u32, color: Color) {
        let idx = (y as usize * self.size.width as usize + x as usize) * 4;
        let Some(px) = self.frame.get_mut(idx..idx + 4) else {
            return;
        };
        blend_into(px, color);
    }

    fn fill_bounds(&mut self, (x0, y0, x1, y1): (u32, u32, u32, u32), color: Color) {
        if color[3] == 0 {
            return;
        }
        let stride = self.size.width as usize * 4;
        for y in y0..y1 {
            let start = y as usize * stride + x0 as usize * 4;
            let end = y as usize * stride + x1 as usize * 4;
            for px in self.frame[start..end].chunks_exact_mut(4) {
                blend_into(px, color);
            }
        }
    }
}

fn blend_into(px: &mut [u8], color: Color) {
    let a = color[3] as u32;
    if a == 255 {
        px.copy_from_slice(&color);
        return;
    }
    let inv = 255 - a;
    for c in 0..3 {
        px[c] = ((px[c] as u32 * inv + color[c] as u32 * a + 127) / 255) as u8;
    }
    px[3] = (a + (px[3] as u32 * inv + 127) / 255).min(255) as u8;
}

impl Renderer2d for CpuRenderer<'_> {
    fn begin_frame(&mut self, size: SurfaceSize, clear: Color) {
        self.size = size;
        if !self.frame_is_valid() {
            return;
        }
        let len = size.rgba_len();
        for px in self.frame[..len].chunks_exact_mut(4) {
            px.copy_from_slice(&clear);
        }
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        if !self.frame_is_valid() {
            return;
        }
        if let Some(bounds) = self.pixel_bounds(rect) {
            self.fill_bounds(bounds, color);
        }
    }

    fn draw_text(&mut self, text: &str, pos: Point, style: &TextStyle) {
        if !self.frame_is_valid() || style.color[3] == 0 {
            return;
        }
        let scale = style.scale();
        let advance = ((GLYPH_W + 1) * scale) as f32;
        let line_height = GLYPH_CELL_H * scale as f32;
        let origin = text_origin(text, pos, style);

        for (line_idx, line) in text.split('\n').enumerate() {
            let line_y = origin.y + line_idx as f32 * line_height;
            for (col_idx, ch) in line.chars().enumerate() {
                if ch == ' ' {
                    continue;
                }
                let glyph_x = origin.x + col_idx as f32 * advance;
                for (row, bits) in glyph_rows(ch).into_iter().enumerate() {
                    for col in 0..GLYPH_W {
                        let mask = 1u8 << (GLYPH_W - 1 - col);
                        if (bits & mask) == 0 {
                            continue;
                        }
                        let cell = Rect::new(
                            glyph_x + (col * scale) as f32,
                            line_y + (row as u32 * scale) as f32,
                            scale as f32,
                            scale as f32,
                        );
                        if let Some(bounds) = self.pixel_bounds(cell) {
                            self.fill_bounds(bounds, style.color);
                        }
                    }
                }
            }
        }
    }

    fn draw_texture(&mut self, texture: TextureId, rect: Rect, uv: Option<UvRect>) {
        if !self.frame_is_valid() {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(rect) else {
            return;
        };
        let Some(image) = self.textures.and_then(|store| store.get(texture)) else {
            self.fill_bounds((x0, y0, x1, y1), MISSING_TEXTURE_COLOR);
            return;
        };
        if image.is_empty() {
            return;
        }

        let uv = uv.unwrap_or(UvRect::FULL);
        for y in y0..y1 {
            let fy = ((y as f32 + 0.5) - rect.y) / rect.h;
            let v = uv.v0 + (uv.v1 - uv.v0) * fy;
            for x in x0..x1 {
                let fx = ((x as f32 + 0.5) - rect.x) / rect.w;
                let u = uv.u0 + (uv.u1 - uv.u0) * fx;
                let texel = image.sample_nearest(u, v);
                self.blend_pixel(x, y, texel);
            }
        }
    }
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Begin { size: SurfaceSize, clear: Color },
    Rect { rect: Rect, color: Color },
    Frame { rect: Rect, thickness: f32, color: Color },
    Text { text: String, pos: Point, style: TextStyle },
    Texture { texture: TextureId, rect: Rect, uv: Option<UvRect> },
}

/// Renderer that records draw calls instead of rasterizing them.
///
/// Used by headless tests to assert on what was drawn and where.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    size: SurfaceSize,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|text| *text == needle)
    }

    pub fn textures(&self) -> Vec<(TextureId, Rect, Option<UvRect>)> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Texture { texture, rect, uv } => Some((*texture, *rect, *uv)),
                _ => None,
            })
            .collect()
    }

    pub fn frames(&self) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Frame { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn filled_rects(&self) -> Vec<(Rect, Color)> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Rect { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }
}

impl Renderer2d for DrawList {
    fn begin_frame(&mut self, size: SurfaceSize, clear: Color) {
        self.size = size;
        self.commands.clear();
        self.commands.push(DrawCommand::Begin { size, clear });
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn draw_frame(&mut self, rect: Rect, thickness: f32, color: Color) {
        self.commands.push(DrawCommand::Frame {
            rect,
            thickness,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, pos: Point, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            style: *style,
        });
    }

    fn draw_texture(&mut self, texture: TextureId, rect: Rect, uv: Option<UvRect>) {
        self.commands.push(DrawCommand::Texture { texture, rect, uv });
    }
}

fn glyph_rows(ch: char) -> [u8; GLYPH_H as usize] {
    let c = ch.to_ascii_uppercase();
    match c {
        // Digits
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],

        // Letters
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b111, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b111, 0b101, 0b111, 0b110, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],

        // Punctuation
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],

        _ => [0b111, 0b001, 0b010, 0b000, 0b010], // '?'
    }
}
