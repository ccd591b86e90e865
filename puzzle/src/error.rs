use std::fmt;
use std::path::PathBuf;

/// Why a sequence is not a bijection of the expected length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermutationDefect {
    WrongLength { expected: usize, actual: usize },
    OutOfRange { index: usize, value: i64, total: usize },
    Duplicate { value: usize },
}

impl fmt::Display for PermutationDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongLength { expected, actual } => {
                write!(f, "expected {expected} entries, got {actual}")
            }
            Self::OutOfRange {
                index,
                value,
                total,
            } => write!(f, "entry {index} is {value}, outside 0..{total}"),
            Self::Duplicate { value } => write!(f, "value {value} appears more than once"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PermutationError {
    #[error("invalid permutation: {reason}")]
    InvalidPermutation { reason: PermutationDefect },
}

impl PermutationError {
    pub fn reason(&self) -> PermutationDefect {
        match self {
            Self::InvalidPermutation { reason } => *reason,
        }
    }
}

/// Which grid of a level definition an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Target,
    Scrambled,
}

impl fmt::Display for GridKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Target => "target",
            Self::Scrambled => "scrambled",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("level {id}: size must be at least 1")]
    ZeroSize { id: u32 },
    #[error("level {id}: {grid} grid has {rows} rows and a row of {cols} columns, expected {size}x{size}")]
    Shape {
        id: u32,
        grid: GridKind,
        rows: usize,
        cols: usize,
        size: usize,
    },
    #[error("level {id}: {grid} grid is not a permutation")]
    Permutation {
        id: u32,
        grid: GridKind,
        #[source]
        source: PermutationError,
    },
    #[error("level {id}: declared minMoves {declared} but the scramble needs {computed}")]
    MinMovesMismatch {
        id: u32,
        declared: usize,
        computed: usize,
    },
    #[error("level {id}: swap ({a}, {b}) is outside 0..{total}")]
    SwapOutOfRange {
        id: u32,
        a: usize,
        b: usize,
        total: usize,
    },
    #[error("level {id}: needs either a scrambled grid or a swaps list")]
    MissingScramble { id: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to load level catalog {}", path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("level catalog is empty")]
    Empty,
    #[error(transparent)]
    Level(#[from] LevelError),
}
