use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, GridKind, LevelError};
use crate::permutation::{self, arrangement_relative_to, compute_minimum_swap_count};

/// A validated puzzle: `target` and `scrambled` are both permutations of `0..size²`, stored
/// row-major, and `min_moves` is the exact number of swaps separating them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub(crate) id: u32,
    pub(crate) size: usize,
    pub(crate) image: String,
    pub(crate) target: Vec<usize>,
    pub(crate) scrambled: Vec<usize>,
    pub(crate) min_moves: usize,
}

impl Level {
    /// Builds a level from explicit `size`×`size` grids of piece ids.
    pub fn new(
        id: u32,
        size: usize,
        image: impl Into<String>,
        target: &[Vec<i64>],
        scrambled: &[Vec<i64>],
    ) -> Result<Self, LevelError> {
        check_size(id, size)?;
        let target = flatten_grid(id, size, GridKind::Target, target)?;
        let scrambled = flatten_grid(id, size, GridKind::Scrambled, scrambled)?;
        Ok(Self::from_validated(id, size, image.into(), target, scrambled))
    }

    /// Identity target, scrambled by exchanging flat indices pair by pair.
    pub fn from_swaps(
        id: u32,
        size: usize,
        image: impl Into<String>,
        swaps: &[(usize, usize)],
    ) -> Result<Self, LevelError> {
        check_size(id, size)?;
        let total = size * size;
        let target = permutation::identity(total);
        let scrambled = scramble(id, &target, swaps)?;
        Ok(Self::from_validated(id, size, image.into(), target, scrambled))
    }

    fn from_validated(
        id: u32,
        size: usize,
        image: String,
        target: Vec<usize>,
        scrambled: Vec<usize>,
    ) -> Self {
        let min_moves = compute_minimum_swap_count(&arrangement_relative_to(&scrambled, &target));
        Self {
            id,
            size,
            image,
            target,
            scrambled,
            min_moves,
        }
    }

    /// Skips validation. Only for exercising the grid's handling of malformed data.
    #[cfg(test)]
    pub(crate) fn unchecked(size: usize, target: Vec<usize>, scrambled: Vec<usize>) -> Self {
        Self {
            id: 0,
            size,
            image: String::new(),
            target,
            scrambled,
            min_moves: 0,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn total_tiles(&self) -> usize {
        self.size * self.size
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn min_moves(&self) -> usize {
        self.min_moves
    }

    pub fn target(&self) -> &[usize] {
        &self.target
    }

    pub fn scrambled(&self) -> &[usize] {
        &self.scrambled
    }

    pub fn target_at(&self, row: usize, col: usize) -> Option<usize> {
        self.cell(&self.target, row, col)
    }

    pub fn scrambled_at(&self, row: usize, col: usize) -> Option<usize> {
        self.cell(&self.scrambled, row, col)
    }

    fn cell(&self, grid: &[usize], row: usize, col: usize) -> Option<usize> {
        if row >= self.size || col >= self.size {
            return None;
        }
        grid.get(row * self.size + col).copied()
    }

    pub fn is_trivially_solved(&self) -> bool {
        self.target == self.scrambled
    }

    pub fn to_def(&self) -> LevelDef {
        let rows = |flat: &[usize]| -> Vec<Vec<i64>> {
            flat.chunks(self.size.max(1))
                .map(|row| row.iter().map(|&v| v as i64).collect())
                .collect()
        };
        LevelDef {
            id: self.id,
            size: self.size,
            image: self.image.clone(),
            target: Some(rows(&self.target)),
            scrambled: Some(rows(&self.scrambled)),
            swaps: None,
            min_moves: Some(self.min_moves),
        }
    }
}

fn check_size(id: u32, size: usize) -> Result<(), LevelError> {
    if size == 0 {
        return Err(LevelError::ZeroSize { id });
    }
    Ok(())
}

fn flatten_grid(
    id: u32,
    size: usize,
    grid: GridKind,
    rows: &[Vec<i64>],
) -> Result<Vec<usize>, LevelError> {
    let bad_row = rows.iter().find(|row| row.len() != size);
    if rows.len() != size || bad_row.is_some() {
        return Err(LevelError::Shape {
            id,
            grid,
            rows: rows.len(),
            cols: bad_row.map_or(size, Vec::len),
            size,
        });
    }
    let flat: Vec<i64> = rows.iter().flatten().copied().collect();
    permutation::validate(&flat, size * size)
        .map_err(|source| LevelError::Permutation { id, grid, source })
}

/// Exchanges entries of `target` pair by pair.
fn scramble(id: u32, target: &[usize], swaps: &[(usize, usize)]) -> Result<Vec<usize>, LevelError> {
    permutation::scramble_by_swaps(target, swaps).map_err(|(a, b)| LevelError::SwapOutOfRange {
        id,
        a,
        b,
        total: target.len(),
    })
}

/// On-disk level record.
///
/// `target` defaults to the identity. The scramble is either an explicit `scrambled` grid or
/// a `swaps` list applied to the target; an explicit grid wins when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDef {
    pub id: u32,
    pub size: usize,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec<Vec<i64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrambled: Option<Vec<Vec<i64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swaps: Option<Vec<(usize, usize)>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_moves: Option<usize>,
}

impl TryFrom<LevelDef> for Level {
    type Error = LevelError;

    fn try_from(def: LevelDef) -> Result<Self, Self::Error> {
        let LevelDef {
            id,
            size,
            image,
            target,
            scrambled,
            swaps,
            min_moves,
        } = def;
        check_size(id, size)?;

        let target = match target {
            Some(rows) => flatten_grid(id, size, GridKind::Target, &rows)?,
            None => permutation::identity(size * size),
        };
        let scrambled = match (scrambled, swaps) {
            (Some(rows), _) => flatten_grid(id, size, GridKind::Scrambled, &rows)?,
            (None, Some(swaps)) => scramble(id, &target, &swaps)?,
            (None, None) => return Err(LevelError::MissingScramble { id }),
        };

        let level = Level::from_validated(id, size, image, target, scrambled);
        if let Some(declared) = min_moves {
            if declared != level.min_moves {
                return Err(LevelError::MinMovesMismatch {
                    id,
                    declared,
                    computed: level.min_moves,
                });
            }
        }
        Ok(level)
    }
}

/// Ordered, non-empty list of levels. Advancing past the last level wraps to the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<Level>) -> Result<Self, CatalogError> {
        if levels.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { levels })
    }

    pub fn from_defs(defs: Vec<LevelDef>) -> Result<Self, CatalogError> {
        let levels = defs
            .into_iter()
            .map(Level::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(levels)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The level at `index`, wrapping around.
    pub fn get(&self, index: usize) -> &Level {
        &self.levels[index % self.levels.len()]
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.levels.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }
}
