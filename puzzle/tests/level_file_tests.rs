use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use puzzle::catalog;
use puzzle::config::{ConfigStore, PuzzleConfig};
use puzzle::error::{CatalogError, ConfigError, LevelError};

fn scratch_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!("puzzle-{name}-{}-{nanos}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn level_file_accepts_grids_and_swap_lists() {
    let dir = scratch_dir("levels");
    let path = dir.join("levels.json");
    fs::write(
        &path,
        r#"[
            {"id": 1, "size": 2, "image": "a.png", "scrambled": [[1, 0], [2, 3]], "minMoves": 1},
            {"id": 2, "size": 3, "image": "b.png", "swaps": [[0, 8], [1, 2]]}
        ]"#,
    )
    .unwrap();

    let catalog = catalog::load(&path).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.get(0).min_moves(), 1);
    assert_eq!(catalog.get(1).min_moves(), 2);
    assert_eq!(catalog.get(1).scrambled()[0], 8);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn level_file_errors_name_the_file_and_the_level() {
    let dir = scratch_dir("bad-levels");

    let missing = catalog::load(&dir.join("nope.json")).unwrap_err();
    assert!(matches!(missing, ConfigError::Io { .. }));

    let syntax = dir.join("syntax.json");
    fs::write(&syntax, "[{").unwrap();
    assert!(matches!(
        catalog::load(&syntax).unwrap_err(),
        ConfigError::Parse { .. }
    ));

    let duplicate = dir.join("duplicate.json");
    fs::write(
        &duplicate,
        r#"[{"id": 9, "size": 2, "image": "a.png", "scrambled": [[0, 0], [2, 3]]}]"#,
    )
    .unwrap();
    match catalog::load(&duplicate).unwrap_err() {
        ConfigError::Catalog {
            path,
            source: CatalogError::Level(LevelError::Permutation { id, .. }),
        } => {
            assert_eq!(path, duplicate);
            assert_eq!(id, 9);
        }
        other => panic!("unexpected error: {other}"),
    }

    let empty = dir.join("empty.json");
    fs::write(&empty, "[]").unwrap();
    assert!(matches!(
        catalog::load(&empty).unwrap_err(),
        ConfigError::Catalog {
            source: CatalogError::Empty,
            ..
        }
    ));

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn declared_min_moves_must_match() {
    let dir = scratch_dir("min-moves");
    let path = dir.join("levels.json");
    fs::write(
        &path,
        r#"[{"id": 3, "size": 2, "image": "a.png", "swaps": [[0, 1]], "minMoves": 2}]"#,
    )
    .unwrap();
    assert!(matches!(
        catalog::load(&path).unwrap_err(),
        ConfigError::Catalog {
            source: CatalogError::Level(LevelError::MinMovesMismatch {
                declared: 2,
                computed: 1,
                ..
            }),
            ..
        }
    ));
    fs::remove_dir_all(&dir).ok();
}

#[test]
fn builtin_levels_survive_export_and_reload() {
    let dir = scratch_dir("export");
    let path = dir.join("levels.json");
    let builtin = catalog::builtin().unwrap();
    let defs: Vec<_> = builtin.iter().map(|level| level.to_def()).collect();
    fs::write(&path, serde_json::to_string_pretty(&defs).unwrap()).unwrap();

    let reloaded = catalog::load(&path).unwrap();
    assert_eq!(reloaded, builtin);

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn config_store_saves_and_reloads_overrides() {
    let dir = scratch_dir("config");
    let store = ConfigStore::with_path(dir.join("nested/config.json"));
    assert_eq!(store.load().unwrap(), PuzzleConfig::default());

    let mut config = PuzzleConfig::default();
    config.grid.swap_duration = Duration::from_millis(250);
    config.theme.selection = [1, 2, 3, 4];
    store.save(&config).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.grid.swap_duration, Duration::from_millis(250));
    assert_eq!(loaded.theme.selection, [1, 2, 3, 4]);

    fs::remove_dir_all(&dir).ok();
}
