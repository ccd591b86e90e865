//! One play session: the current level, the selection flow and the level sequence.
//!
//! Input arrives as taps in surface pixels. Every state change goes through `GameView::handle`
//! so the panel, the HUD and the grid can never disagree about whether the level is solved.

use std::mem;
use std::time::Duration;

use engine::clock::FrameDriver;
use engine::graphics::Renderer2d;
use engine::surface::SurfaceSize;
use engine::texture::{
    AssetError, AssetLoader, LoadedAsset, RgbaImage, TextureCache, TextureSlot, TextureStore,
};
use engine::ui::Point;

use crate::config::PuzzleConfig;
use crate::draw::{self, BoardTexture, Scene};
use crate::grid::{PuzzleGrid, TileId};
use crate::layout::{HudAction, Layout, PanelAction, compute_layout};
use crate::level::{Level, LevelCatalog};
use crate::view::{GameView, GameViewEffect, GameViewEvent};

/// What a single tap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Ignored,
    Selected(TileId),
    /// The selection was dropped, either by tapping it again or by tapping off the board.
    Deselected,
    Swapped { a: TileId, b: TileId, solved: bool },
    Restarted,
    Advanced,
}

pub struct GameController {
    config: PuzzleConfig,
    catalog: LevelCatalog,
    level_index: usize,
    grid: PuzzleGrid,
    layout: Layout,
    viewport: SurfaceSize,
    view: GameView,
    selected: Option<TileId>,
    moves: usize,
    textures: TextureCache,
    texture_requests: Vec<String>,
}

impl GameController {
    pub fn new(catalog: LevelCatalog, config: PuzzleConfig) -> Self {
        Self::starting_at(catalog, config, 0)
    }

    /// Opens the level at `index` (wrapping) without touching any other level first.
    pub fn starting_at(catalog: LevelCatalog, config: PuzzleConfig, index: usize) -> Self {
        let config = config.sanitized();
        let index = index % catalog.len();
        let grid = PuzzleGrid::new(catalog.get(index), config.grid);
        let mut controller = Self {
            config,
            catalog,
            level_index: index,
            grid,
            layout: Layout::default(),
            viewport: SurfaceSize::default(),
            view: GameView::Playing,
            selected: None,
            moves: 0,
            textures: TextureCache::new(),
            texture_requests: Vec::new(),
        };
        controller.start_level(index);
        controller
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level(&self) -> &Level {
        self.catalog.get(self.level_index)
    }

    pub fn grid(&self) -> &PuzzleGrid {
        &self.grid
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn viewport(&self) -> SurfaceSize {
        self.viewport
    }

    pub fn view(&self) -> GameView {
        self.view
    }

    pub fn selected(&self) -> Option<TileId> {
        self.selected
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    pub fn texture_store(&self) -> &TextureStore {
        self.textures.store()
    }

    /// Resolution state of the current level's picture.
    pub fn texture_slot(&self) -> Option<&TextureSlot> {
        self.textures.slot(self.level().image())
    }

    pub fn board_texture(&self) -> BoardTexture {
        match self.texture_slot() {
            Some(TextureSlot::Ready(id)) => BoardTexture::Ready(*id),
            Some(TextureSlot::Failed(_)) => BoardTexture::Failed,
            Some(TextureSlot::Pending) | None => BoardTexture::Loading,
        }
    }

    /// Image references that still need loading. Each reference is handed out once.
    pub fn take_texture_requests(&mut self) -> Vec<String> {
        mem::take(&mut self.texture_requests)
    }

    pub fn texture_loaded(&mut self, reference: &str, result: Result<RgbaImage, AssetError>) {
        match self.textures.complete(reference, result) {
            TextureSlot::Ready(id) => tracing::debug!(reference, texture = id.0, "texture ready"),
            TextureSlot::Failed(_) | TextureSlot::Pending => {}
        }
    }

    pub fn asset_loaded(&mut self, asset: LoadedAsset) {
        self.texture_loaded(&asset.reference, asset.result);
    }

    /// Loads every outstanding request on the calling thread.
    pub fn resolve_textures_with(&mut self, loader: &dyn AssetLoader) {
        for reference in self.take_texture_requests() {
            // Failures are recorded in the slot and shown as status text.
            let _ = self.textures.resolve_with(&reference, loader);
        }
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        self.viewport = size;
        self.relayout();
    }

    fn relayout(&mut self) {
        self.layout = compute_layout(
            self.viewport.width as f32,
            self.viewport.height as f32,
            self.grid.size(),
            &self.config.layout,
        );
    }

    /// Jumps straight to the level at `index` (wrapping), discarding any progress.
    pub fn start_level(&mut self, index: usize) {
        self.level_index = index % self.catalog.len();
        let level = self.catalog.get(self.level_index);
        self.grid.reset(level);
        self.view = GameView::Playing;
        self.selected = None;
        self.moves = 0;

        let image = level.image().to_string();
        if self.textures.request(&image) {
            self.texture_requests.push(image);
        }
        self.relayout();

        let level = self.level();
        tracing::info!(
            level_id = level.id(),
            size = level.size(),
            min_moves = level.min_moves(),
            "level started"
        );
    }

    pub fn restart(&mut self) -> TapOutcome {
        self.send(GameViewEvent::Restart)
    }

    pub fn next_level(&mut self) -> TapOutcome {
        self.send(GameViewEvent::Next)
    }

    fn send(&mut self, event: GameViewEvent) -> TapOutcome {
        let (view, effect) = self.view.handle(event);
        self.view = view;
        match effect {
            GameViewEffect::None => TapOutcome::Ignored,
            GameViewEffect::TriggerSolvePulse => {
                self.grid.trigger_solve_pulse();
                TapOutcome::Ignored
            }
            GameViewEffect::ResetLevel => {
                self.start_level(self.level_index);
                TapOutcome::Restarted
            }
            GameViewEffect::AdvanceLevel => {
                self.start_level(self.catalog.next_index(self.level_index));
                TapOutcome::Advanced
            }
        }
    }

    pub fn handle_tap(&mut self, point: Point) -> TapOutcome {
        if self.view.shows_completion_panel() {
            return match self.layout.panel_action(point) {
                Some(PanelAction::Restart) => self.restart(),
                Some(PanelAction::Next) => self.next_level(),
                None => TapOutcome::Ignored,
            };
        }
        if !self.view.accepts_grid_taps() {
            return TapOutcome::Ignored;
        }
        self.handle_play_tap(point)
    }

    fn handle_play_tap(&mut self, point: Point) -> TapOutcome {
        if let Some(HudAction::Restart) = self.layout.hud_action(point) {
            return self.restart();
        }
        if !self.grid.can_swap() {
            return TapOutcome::Ignored;
        }

        let hit = self.grid.tile_at_point(
            point,
            self.layout.play_grid,
            self.config.grid.tile_spacing_ratio,
        );
        let Some(tile) = hit else {
            return match self.selected.take() {
                Some(_) => TapOutcome::Deselected,
                None => TapOutcome::Ignored,
            };
        };

        match self.selected {
            None => {
                self.selected = Some(tile);
                TapOutcome::Selected(tile)
            }
            Some(first) if first == tile => {
                self.selected = None;
                TapOutcome::Deselected
            }
            Some(first) => {
                self.selected = None;
                if !self.grid.swap_tiles(Some(first), Some(tile)) {
                    return TapOutcome::Deselected;
                }
                self.moves += 1;
                tracing::debug!(a = first.0, b = tile.0, moves = self.moves, "tiles swapped");

                let solved = self.grid.is_solved();
                if solved {
                    let level = self.level();
                    tracing::info!(
                        level_id = level.id(),
                        moves = self.moves,
                        min_moves = level.min_moves(),
                        "level solved"
                    );
                    self.send(GameViewEvent::Solved);
                }
                TapOutcome::Swapped {
                    a: first,
                    b: tile,
                    solved,
                }
            }
        }
    }

    pub fn update(&mut self, dt: Duration) {
        self.grid.update(dt);
        let settled = self.grid.can_swap() && self.grid.pulse_remaining().is_zero();
        if self.view == GameView::Celebrating && settled {
            self.send(GameViewEvent::Settled);
        }
    }

    pub fn scene(&self) -> Scene<'_> {
        let level = self.level();
        Scene {
            viewport: self.viewport,
            layout: &self.layout,
            grid: &self.grid,
            theme: &self.config.theme,
            view: self.view,
            texture: self.board_texture(),
            selected: self.selected,
            level_id: level.id(),
            moves: self.moves,
            min_moves: level.min_moves(),
        }
    }

    pub fn render(&self, gfx: &mut dyn Renderer2d) {
        draw::draw_scene(gfx, &self.scene());
    }
}

impl FrameDriver for GameController {
    fn update(&mut self, dt: Duration) {
        GameController::update(self, dt);
    }

    fn tap(&mut self, point: Point) {
        self.handle_tap(point);
    }

    fn resize(&mut self, size: SurfaceSize) {
        GameController::resize(self, size);
    }

    fn render(&self, gfx: &mut dyn Renderer2d) {
        GameController::render(self, gfx);
    }

    fn textures(&self) -> Option<&TextureStore> {
        Some(self.textures.store())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::grid::CellPos;

    struct SolidLoader;

    impl AssetLoader for SolidLoader {
        fn load(&self, _reference: &str) -> Result<RgbaImage, AssetError> {
            Ok(RgbaImage::solid(4, 4, [200, 10, 10, 255]))
        }
    }

    fn one_swap_catalog() -> LevelCatalog {
        let levels = vec![
            Level::from_swaps(1, 2, "a.png", &[(0, 1)]).unwrap(),
            Level::from_swaps(2, 3, "b.png", &[(0, 8)]).unwrap(),
        ];
        LevelCatalog::new(levels).unwrap()
    }

    fn controller() -> GameController {
        let mut c = GameController::new(one_swap_catalog(), PuzzleConfig::default());
        c.resize(SurfaceSize::new(800, 600));
        c
    }

    fn center_of(c: &GameController, row: usize, col: usize) -> Point {
        c.layout()
            .tile_metrics(c.config().grid.tile_spacing_ratio)
            .tile_rect(row as f32, col as f32)
            .center()
    }

    #[test]
    fn first_level_requests_its_picture_once() {
        let mut c = controller();
        assert_eq!(c.take_texture_requests(), vec!["a.png".to_string()]);
        assert!(c.take_texture_requests().is_empty());
        assert_eq!(c.board_texture(), BoardTexture::Loading);
        c.restart();
        assert!(c.take_texture_requests().is_empty());
    }

    #[test]
    fn loaded_texture_becomes_the_board_texture() {
        let mut c = controller();
        c.resolve_textures_with(&SolidLoader);
        assert!(matches!(c.board_texture(), BoardTexture::Ready(_)));
        assert_eq!(c.texture_store().len(), 1);
    }

    #[test]
    fn failed_texture_is_reported_and_play_continues() {
        let mut c = controller();
        c.texture_loaded(
            "a.png",
            Err(AssetError::Unavailable {
                reference: "a.png".into(),
                reason: "gone".into(),
            }),
        );
        assert_eq!(c.board_texture(), BoardTexture::Failed);
        let tap = center_of(&c, 0, 0);
        assert_eq!(c.handle_tap(tap), TapOutcome::Selected(TileId(0)));
    }

    #[test]
    fn select_then_deselect_same_tile() {
        let mut c = controller();
        let p = center_of(&c, 1, 1);
        assert_eq!(c.handle_tap(p), TapOutcome::Selected(TileId(3)));
        assert_eq!(c.selected(), Some(TileId(3)));
        assert_eq!(c.handle_tap(p), TapOutcome::Deselected);
        assert_eq!(c.selected(), None);
        assert_eq!(c.moves(), 0);
    }

    #[test]
    fn tapping_off_the_board_clears_selection() {
        let mut c = controller();
        c.handle_tap(center_of(&c, 0, 0));
        assert_eq!(c.handle_tap(Point::new(1.0, 599.0)), TapOutcome::Deselected);
        assert_eq!(c.handle_tap(Point::new(1.0, 599.0)), TapOutcome::Ignored);
    }

    #[test]
    fn solving_swap_counts_and_starts_celebration() {
        let mut c = controller();
        c.handle_tap(center_of(&c, 0, 0));
        let outcome = c.handle_tap(center_of(&c, 0, 1));
        assert_eq!(
            outcome,
            TapOutcome::Swapped {
                a: TileId(0),
                b: TileId(1),
                solved: true
            }
        );
        assert_eq!(c.moves(), 1);
        assert_eq!(c.view(), GameView::Celebrating);
        assert_eq!(c.grid().pulse_remaining(), c.config().grid.solve_pulse_duration);
        assert_eq!(c.grid().tile(TileId(0)).unwrap().current, CellPos::new(0, 1));
    }

    #[test]
    fn taps_during_swap_animation_are_ignored() {
        let mut c = GameController::new(
            LevelCatalog::new(vec![Level::from_swaps(1, 3, "a.png", &[(0, 1), (2, 3)]).unwrap()])
                .unwrap(),
            PuzzleConfig::default(),
        );
        c.resize(SurfaceSize::new(800, 600));
        c.handle_tap(center_of(&c, 0, 0));
        c.handle_tap(center_of(&c, 0, 1));
        assert_eq!(c.view(), GameView::Playing);
        assert_eq!(c.handle_tap(center_of(&c, 0, 2)), TapOutcome::Ignored);
        assert_eq!(c.selected(), None);
        c.update(Duration::from_millis(200));
        assert_eq!(c.handle_tap(center_of(&c, 0, 2)), TapOutcome::Selected(TileId(2)));
    }

    #[test]
    fn celebration_settles_into_complete_then_next_wraps() {
        let mut c = controller();
        c.handle_tap(center_of(&c, 0, 0));
        c.handle_tap(center_of(&c, 0, 1));
        c.update(Duration::from_millis(200));
        assert_eq!(c.view(), GameView::Celebrating);
        assert_eq!(c.handle_tap(c.layout().panel_next.center()), TapOutcome::Ignored);
        c.update(Duration::from_millis(100));
        assert_eq!(c.view(), GameView::Complete);

        let next = c.layout().panel_next.center();
        assert_eq!(c.handle_tap(next), TapOutcome::Advanced);
        assert_eq!(c.level().id(), 2);
        assert_eq!(c.moves(), 0);
        assert_eq!(c.view(), GameView::Playing);
        assert_eq!(c.take_texture_requests(), vec!["a.png".to_string(), "b.png".to_string()]);

        c.start_level(1);
        assert_eq!(c.level_index(), 1);
        assert_eq!(c.catalog().next_index(1), 0);
    }

    #[test]
    fn hud_restart_resets_moves_and_selection() {
        let mut c = GameController::new(
            LevelCatalog::new(vec![Level::from_swaps(1, 3, "a.png", &[(0, 1), (2, 3)]).unwrap()])
                .unwrap(),
            PuzzleConfig::default(),
        );
        c.resize(SurfaceSize::new(800, 600));
        c.handle_tap(center_of(&c, 0, 0));
        c.handle_tap(center_of(&c, 0, 1));
        c.update(Duration::from_millis(200));
        c.handle_tap(center_of(&c, 2, 2));
        assert_eq!(c.moves(), 1);

        let restart = c.layout().restart_button.center();
        assert_eq!(c.handle_tap(restart), TapOutcome::Restarted);
        assert_eq!(c.moves(), 0);
        assert_eq!(c.selected(), None);
        assert!(!c.grid().is_solved());
        assert_eq!(c.grid().tile(TileId(0)).unwrap().current, CellPos::new(0, 0));
    }

    #[test]
    fn resize_recomputes_layout_for_new_orientation() {
        let mut c = controller();
        assert!(c.layout().is_landscape);
        c.resize(SurfaceSize::new(600, 800));
        assert!(!c.layout().is_landscape);
        assert_eq!(c.layout().grid_size, 2);
    }

    #[test]
    fn builtin_catalog_starts_at_level_one() {
        let c = GameController::new(catalog::builtin().unwrap(), PuzzleConfig::default());
        assert_eq!(c.level().id(), 1);
        assert_eq!(c.grid().size(), 2);
        assert!(!c.grid().is_solved());
    }

    #[test]
    fn starting_at_a_later_level_only_requests_its_picture() {
        let mut c = GameController::starting_at(one_swap_catalog(), PuzzleConfig::default(), 1);
        assert_eq!(c.level_index(), 1);
        assert_eq!(c.level().id(), 2);
        assert_eq!(c.grid().size(), 3);
        assert_eq!(c.take_texture_requests(), vec![String::from("b.png")]);
        assert!(c.texture_store().is_empty());

        let wrapped = GameController::starting_at(one_swap_catalog(), PuzzleConfig::default(), 3);
        assert_eq!(wrapped.level().id(), 2);
    }

    #[test]
    fn taps_are_ignored_while_celebrating() {
        let mut c = controller();
        let (a, b) = (center_of(&c, 0, 0), center_of(&c, 0, 1));
        c.handle_tap(a);
        c.handle_tap(b);
        assert_eq!(c.view(), GameView::Celebrating);
        let restart = c.layout().restart_button.center();
        assert_eq!(c.handle_tap(a), TapOutcome::Ignored);
        assert_eq!(c.handle_tap(restart), TapOutcome::Ignored);
        assert_eq!(c.selected(), None);
    }
}
