//! Screen geometry for one viewport size.
//!
//! `compute_layout` is a pure function of the viewport, the board size and the layout config.
//! Every rect it returns has non-negative size; a degenerate viewport yields zero-area rects.

use engine::ui::{Anchor, Insets, Point, Rect, Size};

use crate::config::LayoutConfig;

/// Panel buttons never take more than this share of the panel height.
const PANEL_BUTTON_MAX_HEIGHT_SHARE: f32 = 0.3;
const PANEL_BUTTON_MAX_PADDING_SHARE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudAction {
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Restart,
    Next,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub grid_size: usize,
    pub padding: f32,
    pub is_landscape: bool,
    pub hud_rect: Rect,
    pub play_grid: Rect,
    pub reference_rect: Rect,
    pub restart_button: Rect,
    pub completion_panel: Rect,
    pub panel_restart: Rect,
    pub panel_next: Rect,
}

fn non_negative(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

pub fn compute_layout(width: f32, height: f32, grid_size: usize, config: &LayoutConfig) -> Layout {
    let width = non_negative(width);
    let height = non_negative(height);
    let viewport = Rect::from_size(width, height);
    let shorter = width.min(height);
    let padding = shorter * config.padding_ratio;
    let content = viewport.inset(Insets::all(padding));
    let hud_h = (shorter * config.hud_height_ratio).min(content.h * config.hud_max_content_ratio);
    let gap = shorter * config.gap_ratio;

    let hud_rect = Rect::new(content.x, content.y, content.w, hud_h);

    let play_top = hud_rect.bottom() + gap;
    let available = Rect::new(content.x, play_top, content.w, content.bottom() - play_top);

    let is_landscape = width > height;
    let (reference_rect, play_grid) = if available.is_empty() {
        (Rect::ZERO, Rect::ZERO)
    } else if is_landscape {
        let side = available.h.min(((available.w - gap) / 2.0).max(0.0));
        let pair = available.place(Size::new(side * 2.0 + gap, side), Anchor::Center);
        (
            pair.place(Size::square(side), Anchor::CenterLeft),
            pair.place(Size::square(side), Anchor::CenterRight),
        )
    } else {
        let side = available.w.min(((available.h - gap) / 2.0).max(0.0));
        let pair = available.place(Size::new(side, side * 2.0 + gap), Anchor::Center);
        (
            pair.place(Size::square(side), Anchor::TopCenter),
            pair.place(Size::square(side), Anchor::BottomCenter),
        )
    };

    let button_w = config
        .restart_button_max_width
        .min(hud_rect.w * config.restart_button_width_ratio);
    let button_h = config
        .restart_button_max_height
        .min(hud_rect.h * config.restart_button_height_ratio);
    let restart_button = hud_rect.place(Size::new(button_w, button_h), Anchor::CenterRight);

    let panel_w = (content.w * config.panel_width_ratio).min(shorter * config.panel_max_width_ratio);
    let panel_h =
        (content.h * config.panel_height_ratio).min(shorter * config.panel_max_height_ratio);
    let completion_panel = viewport.place(Size::new(panel_w, panel_h), Anchor::Center);

    let panel_button_w = panel_w * config.panel_button_width_ratio;
    let panel_button_h = config
        .panel_button_height
        .min(panel_h * PANEL_BUTTON_MAX_HEIGHT_SHARE);
    let panel_button_pad = config
        .panel_button_padding
        .min(panel_h * PANEL_BUTTON_MAX_PADDING_SHARE);
    let inset = panel_w * config.panel_button_inset_ratio;
    let buttons_y = completion_panel.bottom() - panel_button_h - panel_button_pad;
    let panel_restart = Rect::new(
        completion_panel.x + inset,
        buttons_y,
        panel_button_w,
        panel_button_h,
    );
    let panel_next = Rect::new(
        completion_panel.right() - inset - panel_button_w,
        buttons_y,
        panel_button_w,
        panel_button_h,
    );

    Layout {
        width,
        height,
        grid_size,
        padding,
        is_landscape,
        hud_rect,
        play_grid,
        reference_rect,
        restart_button,
        completion_panel,
        panel_restart,
        panel_next,
    }
}

fn hits(rect: Rect, point: Point) -> bool {
    !rect.is_empty() && rect.contains(point)
}

impl Layout {
    pub fn hud_action(&self, point: Point) -> Option<HudAction> {
        hits(self.restart_button, point).then_some(HudAction::Restart)
    }

    pub fn panel_action(&self, point: Point) -> Option<PanelAction> {
        if hits(self.panel_restart, point) {
            Some(PanelAction::Restart)
        } else if hits(self.panel_next, point) {
            Some(PanelAction::Next)
        } else {
            None
        }
    }

    pub fn tile_metrics(&self, spacing_ratio: f32) -> TileMetrics {
        TileMetrics::new(self.play_grid, self.grid_size, spacing_ratio)
    }
}

/// Cell geometry of a square board drawn inside `area`.
///
/// Each cell is `unit` wide; the tile inside it is `tile_size` wide and centered, leaving a
/// gutter of `offset` on every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileMetrics {
    pub area: Rect,
    pub grid_size: usize,
    pub unit: f32,
    pub tile_size: f32,
    pub offset: f32,
}

impl TileMetrics {
    pub fn new(area: Rect, grid_size: usize, spacing_ratio: f32) -> Self {
        let unit = if grid_size == 0 {
            0.0
        } else {
            area.w / grid_size as f32
        };
        let tile_size = unit * (1.0 - spacing_ratio.clamp(0.0, 1.0));
        Self {
            area,
            grid_size,
            unit,
            tile_size,
            offset: (unit - tile_size) / 2.0,
        }
    }

    /// Tile rect at a (possibly fractional) board position.
    pub fn tile_rect(&self, row: f32, col: f32) -> Rect {
        Rect::new(
            self.area.x + col * self.unit + self.offset,
            self.area.y + row * self.unit + self.offset,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Cell bucket containing `point`. The right and bottom edges of the area are outside.
    pub fn cell_at(&self, point: Point) -> Option<(usize, usize)> {
        if self.unit <= 0.0 {
            return None;
        }
        let local_x = point.x - self.area.x;
        let local_y = point.y - self.area.y;
        if local_x < 0.0 || local_y < 0.0 || local_x >= self.area.w || local_y >= self.area.h {
            return None;
        }
        let col = (local_x / self.unit).floor() as usize;
        let row = (local_y / self.unit).floor() as usize;
        (row < self.grid_size && col < self.grid_size).then_some((row, col))
    }
}
