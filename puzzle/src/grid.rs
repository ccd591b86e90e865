//! Tile identity, position and swap animation for one board.
//!
//! A tile's logical cell changes the instant it is swapped; its drawn position catches up over
//! the swap animation. Drawing must go through `tile_position`, never through `Tile::current`.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use engine::ui::{Point, Rect};

use crate::config::GridConfig;
use crate::layout::TileMetrics;
use crate::level::Level;

/// Stable tile handle: the row-major index of the tile's starting cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Drawn position in cell units; fractional while a tile is moving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePosition {
    pub row: f32,
    pub col: f32,
}

impl From<CellPos> for TilePosition {
    fn from(cell: CellPos) -> Self {
        Self {
            row: cell.row as f32,
            col: cell.col as f32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Animation {
    #[default]
    Idle,
    Animating {
        from: CellPos,
        to: CellPos,
        elapsed: Duration,
        duration: Duration,
    },
}

impl Animation {
    pub fn is_active(&self) -> bool {
        matches!(self, Animation::Animating { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub id: TileId,
    /// Which part of the picture this tile shows.
    pub piece_id: usize,
    pub current: CellPos,
    pub target: CellPos,
    pub animation: Animation,
}

impl Tile {
    pub fn is_home(&self) -> bool {
        self.current == self.target
    }

    /// Where to draw the tile right now.
    pub fn position(&self) -> TilePosition {
        match self.animation {
            Animation::Idle => self.current.into(),
            Animation::Animating {
                from,
                to,
                elapsed,
                duration,
            } => {
                let t = if duration.is_zero() {
                    1.0
                } else {
                    (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
                };
                let eased = ease_in_out_cubic(t);
                let lerp = |a: usize, b: usize| a as f32 + (b as f32 - a as f32) * eased;
                TilePosition {
                    row: lerp(from.row, to.row),
                    col: lerp(from.col, to.col),
                }
            }
        }
    }
}

/// A piece id with no cell in the target grid; the tile was sent to its own index instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileResolutionFallback {
    pub tile_id: TileId,
    pub piece_id: usize,
    pub assigned: CellPos,
}

pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Debug, Clone)]
pub struct PuzzleGrid {
    size: usize,
    tiles: Vec<Tile>,
    /// Row-major occupancy: `cells[row * size + col]` is the tile logically there.
    cells: Vec<TileId>,
    config: GridConfig,
    animating: bool,
    pulse: Duration,
    fallbacks: Vec<TileResolutionFallback>,
}

impl PuzzleGrid {
    pub fn new(level: &Level, config: GridConfig) -> Self {
        let mut grid = Self {
            size: 0,
            tiles: Vec::new(),
            cells: Vec::new(),
            config,
            animating: false,
            pulse: Duration::ZERO,
            fallbacks: Vec::new(),
        };
        grid.reset(level);
        grid
    }

    /// Rebuilds every tile from `level`, dropping animations and the solve pulse.
    pub fn reset(&mut self, level: &Level) {
        let size = level.size();

        let mut target_of: HashMap<usize, CellPos> = HashMap::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                if let Some(piece_id) = level.target_at(row, col) {
                    target_of.entry(piece_id).or_insert(CellPos::new(row, col));
                }
            }
        }

        self.size = size;
        self.tiles.clear();
        self.cells.clear();
        self.fallbacks.clear();
        self.animating = false;
        self.pulse = Duration::ZERO;

        for row in 0..size {
            for col in 0..size {
                let id = TileId(self.tiles.len());
                let piece_id = level.scrambled_at(row, col).unwrap_or(id.0);
                let target = match target_of.get(&piece_id) {
                    Some(&cell) => cell,
                    None => {
                        let assigned = CellPos::new(id.0 / size, id.0 % size);
                        tracing::warn!(
                            tile_id = id.0,
                            piece_id,
                            row = assigned.row,
                            col = assigned.col,
                            "piece missing from target grid, using tile index"
                        );
                        self.fallbacks.push(TileResolutionFallback {
                            tile_id: id,
                            piece_id,
                            assigned,
                        });
                        assigned
                    }
                };
                self.tiles.push(Tile {
                    id,
                    piece_id,
                    current: CellPos::new(row, col),
                    target,
                    animation: Animation::Idle,
                });
                self.cells.push(id);
            }
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0)
    }

    /// Tiles whose piece had no target cell in the level they were built from.
    pub fn fallbacks(&self) -> &[TileResolutionFallback] {
        &self.fallbacks
    }

    /// The tile logically occupying `(row, col)`.
    pub fn tile_at(&self, row: usize, col: usize) -> Option<TileId> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.cells.get(row * self.size + col).copied()
    }

    /// Maps a point to the tile drawn under it.
    ///
    /// Points in the gutter between tiles, or outside `play_grid`, hit nothing.
    pub fn tile_at_point(&self, point: Point, play_grid: Rect, spacing_ratio: f32) -> Option<TileId> {
        let metrics = TileMetrics::new(play_grid, self.size, spacing_ratio);
        let (row, col) = metrics.cell_at(point)?;
        let id = self.tile_at(row, col)?;
        metrics
            .tile_rect(row as f32, col as f32)
            .contains(point)
            .then_some(id)
    }

    pub fn can_swap(&self) -> bool {
        !self.tiles.iter().any(|tile| tile.animation.is_active())
    }

    /// Exchanges two tiles' cells and starts both swap animations.
    ///
    /// Returns `false` (and changes nothing) when either tile is missing or both are the same.
    pub fn swap_tiles(&mut self, a: Option<TileId>, b: Option<TileId>) -> bool {
        let (Some(a), Some(b)) = (a, b) else {
            return false;
        };
        if a == b || a.0 >= self.tiles.len() || b.0 >= self.tiles.len() {
            return false;
        }

        let from_a = self.tiles[a.0].current;
        let from_b = self.tiles[b.0].current;
        let duration = self.config.swap_duration;

        for (id, from, to) in [(a, from_a, from_b), (b, from_b, from_a)] {
            let tile = &mut self.tiles[id.0];
            tile.current = to;
            tile.animation = Animation::Animating {
                from,
                to,
                elapsed: Duration::ZERO,
                duration,
            };
            self.cells[to.row * self.size + to.col] = id;
        }
        self.animating = true;
        true
    }

    /// Advances animations and decays the solve pulse.
    pub fn update(&mut self, dt: Duration) {
        let mut animating = false;
        for tile in &mut self.tiles {
            if let Animation::Animating {
                elapsed, duration, ..
            } = &mut tile.animation
            {
                *elapsed = elapsed.saturating_add(dt);
                if *elapsed >= *duration {
                    tile.animation = Animation::Idle;
                } else {
                    animating = true;
                }
            }
        }
        self.animating = animating;
        self.pulse = self.pulse.saturating_sub(dt);
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn trigger_solve_pulse(&mut self) {
        self.pulse = self.config.solve_pulse_duration;
    }

    pub fn pulse_remaining(&self) -> Duration {
        self.pulse
    }

    /// `(remaining / duration)²`, in `0.0..=1.0`.
    pub fn pulse_strength(&self) -> f32 {
        let duration = self.config.solve_pulse_duration;
        if duration.is_zero() || self.pulse.is_zero() {
            return 0.0;
        }
        let ratio = (self.pulse.as_secs_f32() / duration.as_secs_f32()).min(1.0);
        ratio * ratio
    }

    /// True when every tile sits on its target cell. Animations are ignored.
    pub fn is_solved(&self) -> bool {
        self.tiles.iter().all(Tile::is_home)
    }

    pub fn tile_position(&self, id: TileId) -> Option<TilePosition> {
        self.tile(id).map(Tile::position)
    }
}
