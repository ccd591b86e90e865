use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use engine::app::{AppConfig, run_app};
use engine::clock::FrameDriver;
use engine::graphics::Renderer2d;
use engine::surface::SurfaceSize;
use engine::texture::{BackgroundLoader, PngFileLoader, TextureStore};
use engine::ui::Point;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;

use puzzle::catalog;
use puzzle::config::ConfigStore;
use puzzle::controller::GameController;
use puzzle::level::LevelCatalog;

#[derive(Debug, Parser)]
#[command(name = "swap-puzzle")]
#[command(about = "Swap tiles until the board matches the reference picture")]
struct Cli {
    /// JSON config file; falls back to $SWAP_PUZZLE_CONFIG.
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON level list replacing the built-in levels.
    #[arg(long)]
    levels: Option<PathBuf>,
    /// Directory image references are resolved against.
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 720)]
    height: u32,
    /// 1-based level to start on.
    #[arg(long, default_value_t = 1)]
    level: usize,
    /// Print the level list as JSON and exit.
    #[arg(long, default_value_t = false)]
    print_levels: bool,
}

/// The controller plus a worker thread that decodes its pictures.
struct DesktopGame {
    controller: GameController,
    loader: BackgroundLoader,
}

impl DesktopGame {
    fn forward_requests(&mut self) {
        for reference in self.controller.take_texture_requests() {
            if let Err(err) = self.loader.request(&reference) {
                warn!(reference = %reference, error = %err, "texture_request_failed");
                self.controller.texture_loaded(&reference, Err(err));
            }
        }
    }
}

impl FrameDriver for DesktopGame {
    fn update(&mut self, dt: Duration) {
        self.controller.update(dt);
    }

    fn tap(&mut self, point: Point) {
        self.controller.handle_tap(point);
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.controller.resize(size);
    }

    fn render(&self, gfx: &mut dyn Renderer2d) {
        self.controller.render(gfx);
    }

    fn textures(&self) -> Option<&TextureStore> {
        Some(self.controller.texture_store())
    }

    fn poll(&mut self) {
        self.forward_requests();
        for asset in self.loader.poll() {
            self.controller.asset_loaded(asset);
        }
    }
}

fn main() {
    init_tracing();
    if let Err(err) = run(Cli::parse()) {
        error!(error = %format!("{err:#}"), "startup_failed");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn load_catalog(cli: &Cli) -> Result<LevelCatalog> {
    match &cli.levels {
        Some(path) => catalog::load(path)
            .with_context(|| format!("loading levels from {}", path.display())),
        None => catalog::builtin().context("building the built-in levels"),
    }
}

fn run(cli: Cli) -> Result<()> {
    let store = match &cli.config {
        Some(path) => ConfigStore::with_path(path),
        None => ConfigStore::from_env(),
    };
    let config = store.load().context("loading config")?;
    let catalog = load_catalog(&cli)?;

    if cli.print_levels {
        let defs: Vec<_> = catalog.iter().map(|level| level.to_def()).collect();
        println!("{}", serde_json::to_string_pretty(&defs)?);
        return Ok(());
    }
    if cli.level == 0 || cli.level > catalog.len() {
        bail!("--level must be between 1 and {}", catalog.len());
    }

    info!(
        levels = catalog.len(),
        assets = %cli.assets.display(),
        "starting"
    );

    let app_config = AppConfig {
        title: String::from("Swap Puzzle"),
        desired_size: PhysicalSize::new(cli.width, cli.height),
        max_frame_delta: config.timing.max_frame_delta,
        ..AppConfig::default()
    };

    let game = DesktopGame {
        controller: GameController::starting_at(catalog, config, cli.level - 1),
        loader: BackgroundLoader::spawn(PngFileLoader::new(cli.assets)),
    };

    run_app(app_config, game).map_err(|err| anyhow!("window loop failed: {err}"))
}
