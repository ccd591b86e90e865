use engine::graphics::{Renderer2d, TextBaseline, UvRect, scale_alpha};
use engine::surface::SurfaceSize;
use engine::texture::TextureId;
use engine::ui::{Point, Rect};

use crate::config::Theme;
use crate::grid::{PuzzleGrid, TileId};
use crate::layout::{Layout, TileMetrics};
use crate::view::GameView;

const HUD_TEXT_MARGIN: f32 = 28.0;

pub const LOADING_TEXT: &str = "Loading images...";
pub const LOAD_FAILED_TEXT: &str = "Failed to load textures";
pub const RESTART_LABEL: &str = "Restart";
pub const NEXT_LABEL: &str = "Next Level";
pub const COMPLETE_TITLE: &str = "Level Complete!";

/// What the board can show for the current level's picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardTexture {
    Ready(TextureId),
    Loading,
    Failed,
}

/// Everything one frame needs, borrowed from the controller.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub viewport: SurfaceSize,
    pub layout: &'a Layout,
    pub grid: &'a PuzzleGrid,
    pub theme: &'a Theme,
    pub view: GameView,
    pub texture: BoardTexture,
    pub selected: Option<TileId>,
    pub level_id: u32,
    pub moves: usize,
    pub min_moves: usize,
}

impl Scene<'_> {
    fn metrics(&self) -> TileMetrics {
        TileMetrics::new(
            self.layout.play_grid,
            self.grid.size(),
            self.grid.config().tile_spacing_ratio,
        )
    }
}

pub fn moves_text(moves: usize, min_moves: usize) -> String {
    format!("Moves {moves} / {min_moves}")
}

pub fn draw_scene(gfx: &mut dyn Renderer2d, scene: &Scene<'_>) {
    gfx.begin_frame(scene.viewport, scene.theme.background);
    draw_reference(gfx, scene);
    draw_board(gfx, scene);
    draw_selection(gfx, scene);
    draw_status(gfx, scene);
    draw_hud(gfx, scene);
    if scene.view.shows_completion_panel() {
        draw_completion_panel(gfx, scene);
    }
}

/// The solved picture, or the solved placeholder pattern.
pub fn draw_reference(gfx: &mut dyn Renderer2d, scene: &Scene<'_>) {
    let rect = scene.layout.reference_rect;
    if rect.is_empty() {
        return;
    }
    gfx.draw_rect(rect, scene.theme.reference_background);
    match scene.texture {
        BoardTexture::Ready(texture) => gfx.draw_texture(texture, rect, None),
        BoardTexture::Loading | BoardTexture::Failed => {
            let cells = TileMetrics::new(rect, scene.grid.size(), 0.0);
            for tile in scene.grid.tiles() {
                let cell = cells.tile_rect(tile.target.row as f32, tile.target.col as f32);
                gfx.draw_rect(cell, scene.theme.piece_color(tile.piece_id));
            }
        }
    }
}

pub fn draw_board(gfx: &mut dyn Renderer2d, scene: &Scene<'_>) {
    let area = scene.layout.play_grid;
    if area.is_empty() {
        return;
    }
    gfx.draw_rect(area, scene.theme.tile_background);

    let size = scene.grid.size();
    let metrics = scene.metrics();
    for tile in scene.grid.tiles() {
        let pos = tile.position();
        let rect = metrics.tile_rect(pos.row, pos.col);
        match scene.texture {
            BoardTexture::Ready(texture) => {
                let uv = UvRect::grid_cell(tile.piece_id / size, tile.piece_id % size, size);
                gfx.draw_texture(texture, rect, Some(uv));
            }
            BoardTexture::Loading | BoardTexture::Failed => {
                gfx.draw_rect(rect, scene.theme.piece_color(tile.piece_id));
            }
        }
    }

    let strength = scene.grid.pulse_strength();
    if strength > 0.0 {
        gfx.draw_rect(area, scale_alpha(scene.theme.solved_glow, strength));
    }
}

pub fn draw_selection(gfx: &mut dyn Renderer2d, scene: &Scene<'_>) {
    let Some(pos) = scene.selected.and_then(|id| scene.grid.tile_position(id)) else {
        return;
    };
    let rect = scene
        .metrics()
        .tile_rect(pos.row, pos.col)
        .expand(scene.theme.selection_outset);
    gfx.draw_frame(rect, scene.theme.selection_thickness, scene.theme.selection);
}

pub fn draw_status(gfx: &mut dyn Renderer2d, scene: &Scene<'_>) {
    let text = match scene.texture {
        BoardTexture::Ready(_) => return,
        BoardTexture::Loading => LOADING_TEXT,
        BoardTexture::Failed => LOAD_FAILED_TEXT,
    };
    let center = scene.viewport.as_rect().center();
    gfx.draw_text(text, center, &scene.theme.hud_text_style().centered());
}

pub fn draw_hud(gfx: &mut dyn Renderer2d, scene: &Scene<'_>) {
    let hud = scene.layout.hud_rect;
    if hud.is_empty() {
        return;
    }
    let theme = scene.theme;
    gfx.draw_rect(hud, theme.hud_background);

    let center_y = hud.y + hud.h / 2.0;
    let text_style = theme.hud_text_style().with_baseline(TextBaseline::Middle);
    gfx.draw_text(
        &format!("Level {}", scene.level_id),
        Point::new(hud.x + HUD_TEXT_MARGIN, center_y),
        &text_style,
    );
    gfx.draw_text(
        &moves_text(scene.moves, scene.min_moves),
        Point::new(hud.x + hud.w / 2.0, center_y),
        &theme.hud_text_style().centered(),
    );

    draw_button(gfx, theme, scene.layout.restart_button, RESTART_LABEL);
}

pub fn draw_completion_panel(gfx: &mut dyn Renderer2d, scene: &Scene<'_>) {
    let panel = scene.layout.completion_panel;
    let theme = scene.theme;
    gfx.draw_rect(panel, theme.panel_background);

    let center_x = panel.x + panel.w / 2.0;
    gfx.draw_text(
        COMPLETE_TITLE,
        Point::new(center_x, panel.y + panel.h * 0.25),
        &theme.title_text_style(),
    );
    gfx.draw_text(
        &moves_text(scene.moves, scene.min_moves),
        Point::new(center_x, panel.y + panel.h * 0.45),
        &theme.hud_text_style().centered().with_color(theme.button_text),
    );

    draw_button(gfx, theme, scene.layout.panel_restart, RESTART_LABEL);
    draw_button(gfx, theme, scene.layout.panel_next, NEXT_LABEL);
}

fn draw_button(gfx: &mut dyn Renderer2d, theme: &Theme, rect: Rect, label: &str) {
    if rect.is_empty() {
        return;
    }
    gfx.draw_rect(rect, theme.button_background);
    gfx.draw_text(label, rect.center(), &theme.button_text_style());
}
