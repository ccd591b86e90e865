use std::time::Duration;

use engine::clock::HeadlessRunner;
use engine::graphics::DrawList;
use engine::surface::SurfaceSize;
use engine::ui::Point;

use puzzle::catalog;
use puzzle::config::PuzzleConfig;
use puzzle::controller::{GameController, TapOutcome};
use puzzle::grid::TileId;
use puzzle::level::{Level, LevelCatalog};
use puzzle::view::GameView;

const FRAME: Duration = Duration::from_millis(16);

fn runner_for(catalog: LevelCatalog) -> HeadlessRunner<GameController> {
    let config = PuzzleConfig::default();
    let max_delta = config.timing.max_frame_delta;
    let mut runner = HeadlessRunner::with_max_delta(GameController::new(catalog, config), max_delta);
    runner.resize(SurfaceSize::new(800, 600));
    runner
}

fn tile_center(runner: &HeadlessRunner<GameController>, row: usize, col: usize) -> Point {
    let c = runner.driver();
    c.layout()
        .tile_metrics(c.config().grid.tile_spacing_ratio)
        .tile_rect(row as f32, col as f32)
        .center()
}

fn two_level_catalog() -> LevelCatalog {
    LevelCatalog::new(vec![
        Level::from_swaps(1, 2, "image/image1.png", &[(0, 1)]).unwrap(),
        Level::from_swaps(2, 2, "image/image2.png", &[(1, 3)]).unwrap(),
    ])
    .unwrap()
}

#[test]
fn single_swap_level_runs_to_the_completion_panel() {
    let mut runner = runner_for(two_level_catalog());
    assert_eq!(runner.driver().level().min_moves(), 1);

    let first = tile_center(&runner, 0, 0);
    let second = tile_center(&runner, 0, 1);
    runner.tap(first);
    runner.tap(second);
    assert_eq!(runner.driver().moves(), 1);
    assert_eq!(runner.driver().view(), GameView::Celebrating);

    let completed = runner.run_until(FRAME, 60, |c| c.view() == GameView::Complete);
    assert!(completed);
    assert!(runner.elapsed() >= Duration::from_millis(280));

    let mut list = DrawList::new();
    runner.render(&mut list);
    assert!(list.has_text("Level Complete!"));
    assert!(list.has_text("Moves 1 / 1"));
}

#[test]
fn next_level_after_the_last_wraps_to_the_first() {
    let mut runner = runner_for(two_level_catalog());

    for (a, b) in [((0, 0), (0, 1)), ((0, 1), (1, 1))] {
        let (p, q) = (tile_center(&runner, a.0, a.1), tile_center(&runner, b.0, b.1));
        runner.tap(p);
        runner.tap(q);
        assert!(runner.run_until(FRAME, 60, |c| c.view() == GameView::Complete));
        let next = runner.driver().layout().panel_next.center();
        assert_eq!(runner.driver_mut().handle_tap(next), TapOutcome::Advanced);
    }

    assert_eq!(runner.driver().level().id(), 1);
    assert_eq!(runner.driver().moves(), 0);
    assert!(!runner.driver().grid().is_solved());
}

#[test]
fn panel_restart_replays_the_same_level() {
    let mut runner = runner_for(two_level_catalog());
    let (p, q) = (tile_center(&runner, 0, 0), tile_center(&runner, 0, 1));
    runner.tap(p);
    runner.tap(q);
    assert!(runner.run_until(FRAME, 60, |c| c.view() == GameView::Complete));

    let restart = runner.driver().layout().panel_restart.center();
    runner.tap(restart);
    let c = runner.driver();
    assert_eq!(c.view(), GameView::Playing);
    assert_eq!(c.level().id(), 1);
    assert_eq!(c.moves(), 0);
    assert!(!c.grid().is_solved());
}

#[test]
fn long_stalls_are_clamped_to_the_frame_limit() {
    let mut runner = runner_for(two_level_catalog());
    let applied = runner.step(Duration::from_secs(5));
    assert_eq!(applied, Duration::from_millis(100));
}

#[test]
fn taps_while_tiles_move_do_not_select() {
    let catalog = LevelCatalog::new(vec![
        Level::from_swaps(1, 3, "image/image1.png", &[(0, 1), (4, 8)]).unwrap(),
    ])
    .unwrap();
    let mut runner = runner_for(catalog);
    let (p, q, r) = (
        tile_center(&runner, 0, 0),
        tile_center(&runner, 0, 1),
        tile_center(&runner, 1, 1),
    );
    runner.tap(p);
    runner.tap(q);
    runner.step(FRAME);
    runner.tap(r);
    assert_eq!(runner.driver().selected(), None);

    runner.run_for(Duration::from_millis(200), FRAME);
    runner.tap(r);
    assert_eq!(runner.driver().selected(), Some(TileId(4)));
}

#[test]
fn builtin_levels_need_at_least_their_minimum_moves() {
    let catalog = catalog::builtin().unwrap();
    for level in catalog.iter() {
        assert!(level.min_moves() >= 1);
        assert!(level.min_moves() < level.total_tiles());
    }
}

#[test]
fn hud_reflects_moves_as_they_happen() {
    let catalog = LevelCatalog::new(vec![
        Level::from_swaps(7, 3, "image/image1.png", &[(0, 1), (4, 8)]).unwrap(),
    ])
    .unwrap();
    let mut runner = runner_for(catalog);
    let (p, q) = (tile_center(&runner, 2, 0), tile_center(&runner, 2, 1));
    runner.tap(p);
    runner.tap(q);

    let mut list = DrawList::new();
    runner.render(&mut list);
    assert!(list.has_text("Level 7"));
    assert!(list.has_text("Moves 1 / 2"));
    assert!(list.has_text("Loading images..."));
}

#[test]
fn explicit_grids_one_transposition_pulses_exactly_once() {
    let level = Level::new(
        1,
        2,
        "image/image1.png",
        &[vec![0, 1], vec![2, 3]],
        &[vec![1, 0], vec![2, 3]],
    )
    .unwrap();
    assert_eq!(level.min_moves(), 1);
    let mut runner = runner_for(LevelCatalog::new(vec![level]).unwrap());

    let (p, q) = (tile_center(&runner, 0, 0), tile_center(&runner, 0, 1));
    runner.tap(p);
    runner.tap(q);
    assert_eq!(runner.driver().moves(), 1);
    assert!(runner.driver().grid().is_solved());

    let pulse = runner.driver().config().grid.solve_pulse_duration;
    assert_eq!(runner.driver().grid().pulse_remaining(), pulse);
    runner.step(FRAME);
    assert_eq!(runner.driver().grid().pulse_remaining(), pulse - FRAME);

    // Neither further taps nor settling restart the pulse.
    runner.tap(p);
    runner.tap(q);
    assert_eq!(runner.driver().moves(), 1);
    assert!(runner.run_until(FRAME, 60, |c| c.view() == GameView::Complete));
    runner.step(FRAME);
    assert!(runner.driver().grid().pulse_remaining().is_zero());
}
