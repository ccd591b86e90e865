//! Decoded images, texture handles, and the asset-loading boundary.
//!
//! Loading is the only asynchronous edge of the engine: `BackgroundLoader` resolves image
//! references on a worker thread and hands results back over a channel, and `TextureCache`
//! remembers one outcome per distinct reference.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use serde::{Deserialize, Serialize};

use crate::graphics::Color;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("failed to decode {reference}: {message}")]
    Decode { reference: String, message: String },
    #[error("unsupported pixel format in {reference}: {format}")]
    UnsupportedFormat { reference: String, format: String },
    #[error("texture {reference} is unavailable: {reason}")]
    Unavailable { reference: String, reason: String },
}

/// Handle into a `TextureStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub u32);

/// Straight RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RgbaImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, AssetError> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if pixels.len() != expected {
            return Err(AssetError::Decode {
                reference: format!("{width}x{height} buffer"),
                message: format!("expected {expected} bytes, got {}", pixels.len()),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let count = (width as usize).saturating_mul(height as usize);
        let pixels = color.iter().copied().cycle().take(count * 4).collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Nearest texel for normalized `(u, v)`, clamped to the edges.
    pub fn sample_nearest(&self, u: f32, v: f32) -> Color {
        if self.is_empty() {
            return [0, 0, 0, 0];
        }
        let pick = |t: f32, extent: u32| -> u32 {
            let scaled = (t * extent as f32).floor();
            if scaled.is_nan() || scaled <= 0.0 {
                0
            } else {
                (scaled as u32).min(extent - 1)
            }
        };
        self.pixel(pick(u, self.width), pick(v, self.height))
            .unwrap_or([0, 0, 0, 0])
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextureStore {
    textures: Vec<RgbaImage>,
}

impl TextureStore {
    pub fn insert(&mut self, image: RgbaImage) -> TextureId {
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(image);
        id
    }

    pub fn get(&self, id: TextureId) -> Option<&RgbaImage> {
        self.textures.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Resolves an image reference to decoded pixels.
pub trait AssetLoader {
    fn load(&self, reference: &str) -> Result<RgbaImage, AssetError>;
}

/// Loads PNG files relative to a root directory.
#[derive(Debug, Clone)]
pub struct PngFileLoader {
    root: PathBuf,
}

impl PngFileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for PngFileLoader {
    fn load(&self, reference: &str) -> Result<RgbaImage, AssetError> {
        let path = self.root.join(reference);
        let file = File::open(&path).map_err(|err| AssetError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        decode_png_reader(BufReader::new(file), reference)
    }
}

/// Decodes an in-memory PNG into RGBA8.
pub fn decode_png(bytes: &[u8], reference: &str) -> Result<RgbaImage, AssetError> {
    decode_png_reader(Cursor::new(bytes), reference)
}

fn decode_png_reader<R>(reader: R, reference: &str) -> Result<RgbaImage, AssetError>
where
    R: std::io::BufRead + std::io::Seek,
{
    let decode_err = |err: png::DecodingError| AssetError::Decode {
        reference: reference.to_string(),
        message: err.to_string(),
    };

    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info().map_err(decode_err)?;
    let (color_type, _) = reader.output_color_type();
    let (width, height) = (reader.info().width, reader.info().height);
    let buf_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(color_type.samples()))
        .ok_or_else(|| AssetError::Decode {
            reference: reference.to_string(),
            message: "image too large".to_string(),
        })?;
    let mut buf = vec![0u8; buf_len];
    let info = reader.next_frame(&mut buf).map_err(decode_err)?;
    buf.truncate(info.buffer_size());

    let pixels = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        png::ColorType::GrayscaleAlpha => buf
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        other => {
            return Err(AssetError::UnsupportedFormat {
                reference: reference.to_string(),
                format: format!("{other:?}"),
            });
        }
    };
    RgbaImage::new(info.width, info.height, pixels)
}

/// Resolution state of one image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSlot {
    Pending,
    Ready(TextureId),
    Failed(AssetError),
}

/// One resolution per distinct reference, remembered by reference identity.
#[derive(Debug, Clone, Default)]
pub struct TextureCache {
    store: TextureStore,
    slots: HashMap<String, TextureSlot>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &TextureStore {
        &self.store
    }

    pub fn slot(&self, reference: &str) -> Option<&TextureSlot> {
        self.slots.get(reference)
    }

    /// Marks `reference` as pending. Returns `false` if it was already requested or resolved.
    pub fn request(&mut self, reference: &str) -> bool {
        if self.slots.contains_key(reference) {
            return false;
        }
        self.slots.insert(reference.to_string(), TextureSlot::Pending);
        true
    }

    /// Records the outcome of a load. A reference that already resolved keeps its first result.
    pub fn complete(
        &mut self,
        reference: &str,
        result: Result<RgbaImage, AssetError>,
    ) -> &TextureSlot {
        let already_resolved = matches!(
            self.slots.get(reference),
            Some(TextureSlot::Ready(_) | TextureSlot::Failed(_))
        );
        if !already_resolved {
            let slot = match result {
                Ok(image) => TextureSlot::Ready(self.store.insert(image)),
                Err(err) => {
                    tracing::warn!(reference, error = %err, "texture_load_failed");
                    TextureSlot::Failed(err)
                }
            };
            self.slots.insert(reference.to_string(), slot);
        }
        &self.slots[reference]
    }

    /// Synchronous path: loads on the calling thread unless already resolved.
    pub fn resolve_with(
        &mut self,
        reference: &str,
        loader: &dyn AssetLoader,
    ) -> Result<TextureId, AssetError> {
        match self.slots.get(reference) {
            Some(TextureSlot::Ready(id)) => return Ok(*id),
            Some(TextureSlot::Failed(err)) => return Err(err.clone()),
            _ => {}
        }
        match self.complete(reference, loader.load(reference)) {
            TextureSlot::Ready(id) => Ok(*id),
            TextureSlot::Failed(err) => Err(err.clone()),
            TextureSlot::Pending => Err(AssetError::Unavailable {
                reference: reference.to_string(),
                reason: "still pending".to_string(),
            }),
        }
    }
}

/// A finished load delivered by `BackgroundLoader`.
#[derive(Debug)]
pub struct LoadedAsset {
    pub reference: String,
    pub result: Result<RgbaImage, AssetError>,
}

/// Loads references on a worker thread; results are collected with `poll`.
pub struct BackgroundLoader {
    requests: Sender<String>,
    results: Receiver<LoadedAsset>,
}

impl BackgroundLoader {
    pub fn spawn<L>(loader: L) -> Self
    where
        L: AssetLoader + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<String>();
        let (result_tx, result_rx) = mpsc::channel::<LoadedAsset>();
        thread::spawn(move || {
            for reference in request_rx {
                let result = loader.load(&reference);
                if result_tx.send(LoadedAsset { reference, result }).is_err() {
                    break;
                }
            }
        });
        Self {
            requests: request_tx,
            results: result_rx,
        }
    }

    /// Queues a load. Fails only if the worker is gone.
    pub fn request(&self, reference: &str) -> Result<(), AssetError> {
        self.requests
            .send(reference.to_string())
            .map_err(|_| AssetError::Unavailable {
                reference: reference.to_string(),
                reason: "loader thread stopped".to_string(),
            })
    }

    /// Drains every result that has arrived so far without blocking.
    pub fn poll(&self) -> Vec<LoadedAsset> {
        self.results.try_iter().collect()
    }

    /// Blocks for the next result. `None` once the worker has exited.
    pub fn wait(&self) -> Option<LoadedAsset> {
        self.results.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct CountingLoader {
        calls: Cell<usize>,
        fail: bool,
    }

    impl AssetLoader for CountingLoader {
        fn load(&self, reference: &str) -> Result<RgbaImage, AssetError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(AssetError::Io {
                    path: reference.to_string(),
                    message: "not found".to_string(),
                });
            }
            Ok(RgbaImage::solid(2, 2, [1, 2, 3, 255]))
        }
    }

    struct SolidLoader;

    impl AssetLoader for SolidLoader {
        fn load(&self, _reference: &str) -> Result<RgbaImage, AssetError> {
            Ok(RgbaImage::solid(1, 1, [9, 9, 9, 255]))
        }
    }

    fn encode_png(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().expect("png header");
            writer.write_image_data(data).expect("png data");
        }
        out
    }

    #[test]
    fn image_rejects_wrong_buffer_length() {
        assert!(RgbaImage::new(2, 2, vec![0; 15]).is_err());
        assert!(RgbaImage::new(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn sample_nearest_clamps_outside_unit_square() {
        let image = RgbaImage::new(2, 1, vec![10, 0, 0, 255, 20, 0, 0, 255]).unwrap();
        assert_eq!(image.sample_nearest(-1.0, 0.5)[0], 10);
        assert_eq!(image.sample_nearest(0.75, 0.5)[0], 20);
        assert_eq!(image.sample_nearest(5.0, 5.0)[0], 20);
    }

    #[test]
    fn cache_resolves_each_reference_once() {
        let loader = CountingLoader {
            calls: Cell::new(0),
            fail: false,
        };
        let mut cache = TextureCache::new();
        let a = cache.resolve_with("a.png", &loader).unwrap();
        let again = cache.resolve_with("a.png", &loader).unwrap();
        let b = cache.resolve_with("b.png", &loader).unwrap();
        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(loader.calls.get(), 2);
        assert_eq!(cache.store().len(), 2);
    }

    #[test]
    fn cache_remembers_failures() {
        let loader = CountingLoader {
            calls: Cell::new(0),
            fail: true,
        };
        let mut cache = TextureCache::new();
        assert!(cache.resolve_with("missing.png", &loader).is_err());
        assert!(cache.resolve_with("missing.png", &loader).is_err());
        assert_eq!(loader.calls.get(), 1);
        assert!(matches!(
            cache.slot("missing.png"),
            Some(TextureSlot::Failed(AssetError::Io { .. }))
        ));
    }

    #[test]
    fn request_then_complete_moves_slot_from_pending_to_ready() {
        let mut cache = TextureCache::new();
        assert!(cache.request("x.png"));
        assert!(!cache.request("x.png"));
        assert_eq!(cache.slot("x.png"), Some(&TextureSlot::Pending));
        let slot = cache
            .complete("x.png", Ok(RgbaImage::solid(1, 1, [0, 0, 0, 255])))
            .clone();
        assert_eq!(slot, TextureSlot::Ready(TextureId(0)));
    }

    #[test]
    fn decode_png_expands_rgb_to_rgba() {
        let bytes = encode_png(2, 1, png::ColorType::Rgb, &[255, 0, 0, 0, 0, 255]);
        let image = decode_png(&bytes, "inline").unwrap();
        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 1);
        assert_eq!(image.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel(1, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn decode_png_reports_garbage_as_decode_error() {
        let err = decode_png(b"not a png", "junk").unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn background_loader_delivers_results() {
        let loader = BackgroundLoader::spawn(SolidLoader);
        loader.request("one.png").unwrap();
        let loaded = loader.wait().expect("worker result");
        assert_eq!(loaded.reference, "one.png");
        assert_eq!(loaded.result.unwrap().pixel(0, 0), Some([9, 9, 9, 255]));
    }

    #[test]
    fn png_file_loader_reports_missing_files() {
        let loader = PngFileLoader::new("/definitely/not/here");
        let err = loader.load("image.png").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
