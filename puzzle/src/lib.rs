pub mod catalog;
pub mod config;
pub mod controller;
pub mod draw;
pub mod error;
pub mod grid;
pub mod layout;
pub mod level;
pub mod permutation;
pub mod serde_fmt;
pub mod view;

pub use config::{ConfigStore, PuzzleConfig};
pub use controller::{GameController, TapOutcome};
pub use error::{CatalogError, ConfigError, LevelError, PermutationError};
pub use grid::{PuzzleGrid, TileId};
pub use layout::{Layout, compute_layout};
pub use level::{Level, LevelCatalog, LevelDef};
pub use view::GameView;
