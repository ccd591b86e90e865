use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine::graphics::{Color, TextStyle};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::serde_fmt::{duration_ms, hex_color, hex_palette};

pub const CONFIG_PATH_ENV: &str = "SWAP_PUZZLE_CONFIG";

/// Proportions used by the layout engine. Absolute sizes are device pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Outer margin as a fraction of the shorter viewport side.
    pub padding_ratio: f32,
    /// Gap between HUD, reference and play areas, fraction of the shorter side.
    pub gap_ratio: f32,
    pub hud_height_ratio: f32,
    pub hud_max_content_ratio: f32,
    pub restart_button_max_width: f32,
    pub restart_button_width_ratio: f32,
    pub restart_button_max_height: f32,
    pub restart_button_height_ratio: f32,
    pub panel_width_ratio: f32,
    pub panel_max_width_ratio: f32,
    pub panel_height_ratio: f32,
    pub panel_max_height_ratio: f32,
    pub panel_button_width_ratio: f32,
    pub panel_button_height: f32,
    pub panel_button_padding: f32,
    pub panel_button_inset_ratio: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding_ratio: 0.05,
            gap_ratio: 0.05,
            hud_height_ratio: 0.15,
            hud_max_content_ratio: 0.18,
            restart_button_max_width: 200.0,
            restart_button_width_ratio: 0.25,
            restart_button_max_height: 64.0,
            restart_button_height_ratio: 0.65,
            panel_width_ratio: 0.8,
            panel_max_width_ratio: 0.85,
            panel_height_ratio: 0.6,
            panel_max_height_ratio: 0.7,
            panel_button_width_ratio: 0.35,
            panel_button_height: 64.0,
            panel_button_padding: 24.0,
            panel_button_inset_ratio: 0.12,
        }
    }
}

impl LayoutConfig {
    pub fn sanitized(self) -> Self {
        let ratio = |v: f32, max: f32| if v.is_finite() { v.clamp(0.0, max) } else { 0.0 };
        let px = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        let defaults = Self::default();
        Self {
            // Two margins must leave something to draw in.
            padding_ratio: ratio(self.padding_ratio, 0.45),
            gap_ratio: ratio(self.gap_ratio, 0.5),
            hud_height_ratio: ratio(self.hud_height_ratio, 1.0),
            hud_max_content_ratio: ratio(self.hud_max_content_ratio, 1.0),
            restart_button_max_width: px(self.restart_button_max_width),
            restart_button_width_ratio: ratio(self.restart_button_width_ratio, 1.0),
            restart_button_max_height: px(self.restart_button_max_height),
            restart_button_height_ratio: ratio(self.restart_button_height_ratio, 1.0),
            panel_width_ratio: ratio(self.panel_width_ratio, 1.0),
            panel_max_width_ratio: ratio(self.panel_max_width_ratio, 1.0),
            panel_height_ratio: ratio(self.panel_height_ratio, 1.0),
            panel_max_height_ratio: ratio(self.panel_max_height_ratio, 1.0),
            panel_button_width_ratio: ratio(self.panel_button_width_ratio, 0.5),
            panel_button_height: px(self.panel_button_height),
            panel_button_padding: px(self.panel_button_padding),
            panel_button_inset_ratio: if self.panel_button_inset_ratio.is_finite()
                && self.panel_button_inset_ratio * 2.0 + self.panel_button_width_ratio.min(0.5) * 2.0
                    <= 1.0
            {
                self.panel_button_inset_ratio.max(0.0)
            } else {
                defaults.panel_button_inset_ratio
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Fraction of each cell left empty around the tile.
    pub tile_spacing_ratio: f32,
    #[serde(with = "duration_ms")]
    pub swap_duration: Duration,
    #[serde(with = "duration_ms")]
    pub solve_pulse_duration: Duration,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_spacing_ratio: 0.1,
            swap_duration: Duration::from_millis(180),
            solve_pulse_duration: Duration::from_millis(280),
        }
    }
}

impl GridConfig {
    pub fn sanitized(self) -> Self {
        let tile_spacing_ratio = if self.tile_spacing_ratio.is_finite() {
            self.tile_spacing_ratio.clamp(0.0, 0.9)
        } else {
            Self::default().tile_spacing_ratio
        };
        Self {
            tile_spacing_ratio,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    #[serde(with = "duration_ms")]
    pub max_frame_delta: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            max_frame_delta: engine::clock::DEFAULT_MAX_FRAME_DELTA,
        }
    }
}

impl TimingConfig {
    pub fn sanitized(self) -> Self {
        Self {
            max_frame_delta: self.max_frame_delta.max(Duration::from_millis(1)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Theme {
    #[serde(with = "hex_color")]
    pub background: Color,
    #[serde(with = "hex_color")]
    pub hud_background: Color,
    #[serde(with = "hex_color")]
    pub panel_background: Color,
    #[serde(with = "hex_color")]
    pub tile_background: Color,
    #[serde(with = "hex_color")]
    pub reference_background: Color,
    #[serde(with = "hex_color")]
    pub selection: Color,
    #[serde(with = "hex_color")]
    pub solved_glow: Color,
    #[serde(with = "hex_color")]
    pub hud_text: Color,
    #[serde(with = "hex_color")]
    pub button_background: Color,
    #[serde(with = "hex_color")]
    pub button_text: Color,
    /// Placeholder colors indexed by piece id while no texture is available.
    #[serde(with = "hex_palette")]
    pub palette: Vec<Color>,
    pub text_size: f32,
    pub small_text_size: f32,
    pub title_text_size: f32,
    pub selection_thickness: f32,
    pub selection_outset: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: [9, 10, 18, 255],
            hud_background: [20, 23, 38, 224],
            panel_background: [20, 31, 56, 240],
            tile_background: [31, 36, 51, 191],
            reference_background: [20, 26, 46, 191],
            selection: [255, 209, 51, 217],
            solved_glow: [61, 204, 133, 77],
            hud_text: [246, 247, 255, 255],
            button_background: [82, 92, 133, 235],
            button_text: [255, 255, 255, 255],
            palette: vec![
                [0xff, 0x6b, 0x6b, 255],
                [0xff, 0xd1, 0x66, 255],
                [0x4e, 0xcd, 0xc4, 255],
                [0x1a, 0x8f, 0xe3, 255],
                [0xc7, 0x7d, 0xff, 255],
                [0xff, 0x9f, 0x1c, 255],
                [0x9b, 0xe5, 0x64, 255],
                [0xff, 0x99, 0xc8, 255],
                [0x48, 0xca, 0xe4, 255],
                [0xf9, 0x41, 0x44, 255],
                [0x90, 0xbe, 0x6d, 255],
                [0x57, 0x75, 0x90, 255],
                [0xff, 0xaf, 0xcc, 255],
                [0xb5, 0x17, 0x9e, 255],
                [0xf3, 0x72, 0x2c, 255],
                [0x43, 0xaa, 0x8b, 255],
            ],
            text_size: 28.0,
            small_text_size: 22.0,
            title_text_size: 40.0,
            selection_thickness: 6.0,
            selection_outset: 6.0,
        }
    }
}

impl Theme {
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.palette.is_empty() {
            self.palette = defaults.palette;
        }
        let size = |v: f32, fallback: f32| if v.is_finite() && v > 0.0 { v } else { fallback };
        self.text_size = size(self.text_size, defaults.text_size);
        self.small_text_size = size(self.small_text_size, defaults.small_text_size);
        self.title_text_size = size(self.title_text_size, defaults.title_text_size);
        self.selection_thickness = size(self.selection_thickness, defaults.selection_thickness);
        if !self.selection_outset.is_finite() {
            self.selection_outset = defaults.selection_outset;
        }
        self
    }

    /// Placeholder color for a piece; the palette wraps around.
    pub fn piece_color(&self, piece_id: usize) -> Color {
        match self.palette.len() {
            0 => engine::graphics::MISSING_TEXTURE_COLOR,
            n => self.palette[piece_id % n],
        }
    }

    pub fn hud_text_style(&self) -> TextStyle {
        TextStyle {
            size: self.text_size,
            color: self.hud_text,
            ..TextStyle::default()
        }
    }

    pub fn button_text_style(&self) -> TextStyle {
        TextStyle {
            size: self.small_text_size,
            color: self.button_text,
            ..TextStyle::default()
        }
        .centered()
    }

    pub fn title_text_style(&self) -> TextStyle {
        TextStyle {
            size: self.title_text_size,
            color: self.button_text,
            ..TextStyle::default()
        }
        .centered()
    }
}

/// Everything tunable about the game, fixed for the lifetime of a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PuzzleConfig {
    pub layout: LayoutConfig,
    pub grid: GridConfig,
    pub theme: Theme,
    pub timing: TimingConfig,
}

impl PuzzleConfig {
    pub fn sanitized(self) -> Self {
        Self {
            layout: self.layout.sanitized(),
            grid: self.grid.sanitized(),
            theme: self.theme.sanitized(),
            timing: self.timing.sanitized(),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(text).map(Self::sanitized)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: Option<PathBuf>,
}

impl ConfigStore {
    /// Uses `SWAP_PUZZLE_CONFIG` when set, otherwise built-in defaults.
    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn defaults_only() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// A missing file means defaults; an unreadable or malformed one is an error.
    pub fn load(&self) -> Result<PuzzleConfig, ConfigError> {
        let Some(path) = &self.path else {
            return Ok(PuzzleConfig::default());
        };
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "config file not found, using defaults");
                return Ok(PuzzleConfig::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.clone(),
                    source,
                });
            }
        };
        PuzzleConfig::from_json_str(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })
    }

    pub fn save(&self, config: &PuzzleConfig) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no config path configured",
            ));
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(config)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PuzzleConfig::default();
        assert_eq!(config.layout.padding_ratio, 0.05);
        assert_eq!(config.grid.tile_spacing_ratio, 0.1);
        assert_eq!(config.grid.swap_duration, Duration::from_millis(180));
        assert_eq!(config.grid.solve_pulse_duration, Duration::from_millis(280));
        assert_eq!(config.timing.max_frame_delta, Duration::from_millis(100));
        assert_eq!(config.theme.palette.len(), 16);
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config = PuzzleConfig::from_json_str(
            r##"{ "grid": { "swap_duration": 250 }, "theme": { "selection": "#00ff00" } }"##,
        )
        .unwrap();
        assert_eq!(config.grid.swap_duration, Duration::from_millis(250));
        assert_eq!(config.grid.tile_spacing_ratio, 0.1);
        assert_eq!(config.theme.selection, [0, 255, 0, 255]);
        assert_eq!(config.theme.background, Theme::default().background);
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn sanitize_clamps_out_of_range_values() {
        let config = PuzzleConfig::from_json_str(
            r#"{ "grid": { "tile_spacing_ratio": 3.0 }, "layout": { "padding_ratio": -1.0 },
                 "theme": { "palette": [], "text_size": 0 }, "timing": { "max_frame_delta": 0 } }"#,
        )
        .unwrap();
        assert_eq!(config.grid.tile_spacing_ratio, 0.9);
        assert_eq!(config.layout.padding_ratio, 0.0);
        assert_eq!(config.theme.palette.len(), 16);
        assert_eq!(config.theme.text_size, 28.0);
        assert_eq!(config.timing.max_frame_delta, Duration::from_millis(1));
    }

    #[test]
    fn invalid_color_is_a_parse_error() {
        assert!(PuzzleConfig::from_json_str(r#"{ "theme": { "background": "blue" } }"#).is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = PuzzleConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(PuzzleConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn palette_wraps_around_for_large_piece_ids() {
        let theme = Theme::default();
        assert_eq!(theme.piece_color(16), theme.piece_color(0));
        assert_eq!(theme.piece_color(24), theme.piece_color(8));
    }

    #[test]
    fn store_without_file_yields_defaults() {
        let store = ConfigStore::with_path("/definitely/not/here/swap-puzzle.json");
        assert_eq!(store.load().unwrap(), PuzzleConfig::default());
        assert_eq!(ConfigStore::defaults_only().load().unwrap(), PuzzleConfig::default());
    }

    #[test]
    fn store_reports_parse_errors_with_path() {
        let dir = std::env::temp_dir().join(format!("swap-puzzle-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = ConfigStore::with_path(&path).load().unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn save_then_load_restores_config() {
        let dir = std::env::temp_dir().join(format!("swap-puzzle-save-{}", std::process::id()));
        let store = ConfigStore::with_path(dir.join("nested/config.json"));
        let mut config = PuzzleConfig::default();
        config.grid.swap_duration = Duration::from_millis(90);
        store.save(&config).unwrap();
        assert_eq!(store.load().unwrap(), config);
        fs::remove_dir_all(&dir).ok();
    }
}
