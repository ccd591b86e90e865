//! The built-in level set and level files.

use std::fs;
use std::path::Path;

use crate::error::{CatalogError, ConfigError};
use crate::level::{Level, LevelCatalog, LevelDef};

pub const IMAGE_REFERENCES: [&str; 3] = ["image/image1.png", "image/image2.png", "image/image3.png"];

/// Swap lists for boards of size 2 through 5, applied to the solved arrangement.
const BUILTIN_SWAPS: [(usize, &[(usize, usize)]); 4] = [
    (2, &[(0, 1), (2, 3)]),
    (3, &[(0, 1), (4, 5), (7, 8), (2, 4)]),
    (4, &[(0, 5), (1, 4), (2, 10), (6, 9), (7, 13)]),
    (5, &[(0, 24), (1, 6), (5, 10), (7, 17), (12, 18), (19, 23)]),
];

pub fn builtin() -> Result<LevelCatalog, CatalogError> {
    let levels = BUILTIN_SWAPS
        .iter()
        .enumerate()
        .map(|(index, &(size, swaps))| {
            let image = IMAGE_REFERENCES[index % IMAGE_REFERENCES.len()];
            Level::from_swaps(index as u32 + 1, size, image, swaps)
        })
        .collect::<Result<Vec<_>, _>>()?;
    LevelCatalog::new(levels)
}

/// Parses a JSON array of level records without validating them.
pub fn parse_defs(text: &str) -> Result<Vec<LevelDef>, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn load(path: &Path) -> Result<LevelCatalog, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let defs = parse_defs(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = LevelCatalog::from_defs(defs).map_err(|source| ConfigError::Catalog {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), levels = catalog.len(), "level catalog loaded");
    Ok(catalog)
}
