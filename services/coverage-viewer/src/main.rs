//! Coverage viewer command-line tool.
//!
//! Renders tiles of a coverage parameter to PNG files, or prints a summary
//! of a coverage document.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use coverage_common::{BoundingBox, TileCoord};
use coverage_viewer::config::ViewerConfig;
use coverage_viewer::document::{load_documents, DomainDocument};
use coverage_viewer::view::MapView;
use coverage_viewer::{load_layers, LayerOptions};
use grid_processor::{InterpolationMethod, PaletteExtentMode};
use projection::ProjectionKind;
use renderer::PaletteRegistry;

#[derive(Parser, Debug)]
#[command(name = "coverage-viewer")]
#[command(about = "Render gridded coverages and profiles as map tiles")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "VIEWER_CONFIG")]
    config: Option<PathBuf>,

    /// Palette name
    #[arg(long)]
    palette: Option<String>,

    /// Interpolation method: nearestNeighbor or idw
    #[arg(long)]
    interpolation: Option<InterpolationMethod>,

    /// Projection: mercator, geographic or lambert
    #[arg(long)]
    projection: Option<ProjectionKind>,

    /// Palette extent: global or fov
    #[arg(long)]
    palette_range: Option<PaletteExtentMode>,

    /// Visible area as minLon,minLat,maxLon,maxLat (used by --palette-range fov)
    #[arg(long)]
    bbox: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single tile
    Tile {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(short)]
        z: u32,
        #[arg(short)]
        x: u32,
        #[arg(short)]
        y: u32,
        /// Output PNG path
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Render every tile of the world at one zoom level
    Zoom {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(short)]
        z: u32,
        /// Output directory; tiles are written as {z}/{x}/{y}.png
        #[arg(short, long)]
        out_dir: PathBuf,
    },
    /// Print a summary of a coverage document
    Info {
        /// Coverage document or collection
        input: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct SourceArgs {
    /// Coverage document or collection
    #[arg(short, long)]
    input: PathBuf,
    /// Parameter to render
    #[arg(short, long)]
    param: String,
    /// Time step index
    #[arg(long, default_value_t = 0)]
    time: usize,
    /// Vertical level index
    #[arg(long, default_value_t = 0)]
    vertical: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&args)?;
    info!(
        palette = %config.palette,
        projection = %config.projection,
        interpolation = %config.grid.interpolation,
        palette_range = %config.palette_range,
        tile_size = config.tile_size,
        "Loaded configuration"
    );

    match &args.command {
        Command::Tile { source, z, x, y, out } => {
            let view = build_view(&config, source, args.bbox.as_deref()).await?;
            let coord = TileCoord::new(*z, *x, *y);
            write_tile(&view, coord, out)?;
            info!(tile = %coord.cache_key(), out = %out.display(), "Wrote tile");
        }
        Command::Zoom { source, z, out_dir } => {
            let view = build_view(&config, source, args.bbox.as_deref()).await?;
            let tiles = view.world_tiles(*z);
            let start = Instant::now();
            tiles
                .par_iter()
                .try_for_each(|coord| {
                    let path = out_dir
                        .join(coord.z.to_string())
                        .join(coord.x.to_string())
                        .join(format!("{}.png", coord.y));
                    write_tile(&view, *coord, &path)
                })?;
            info!(
                zoom = z,
                tiles = tiles.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Wrote zoom level"
            );
        }
        Command::Info { input } => print_info(input).await?,
    }

    Ok(())
}

/// Defaults, then the YAML file, then environment, then flags.
fn load_config(args: &Args) -> Result<ViewerConfig> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::from_file(path)?.with_env(),
        None => ViewerConfig::from_env(),
    };
    if let Some(palette) = &args.palette {
        config.palette = palette.clone();
    }
    if let Some(method) = args.interpolation {
        config.grid.interpolation = method;
    }
    if let Some(kind) = args.projection {
        config.projection = kind;
    }
    if let Some(mode) = args.palette_range {
        config.palette_range = mode;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

async fn build_view(config: &ViewerConfig, source: &SourceArgs, bbox: Option<&str>) -> Result<MapView> {
    let mut view = MapView::new(config, PaletteRegistry::with_defaults())?;
    if let Some(bbox) = bbox {
        let bounds = BoundingBox::from_csv(bbox).with_context(|| format!("Invalid --bbox '{}'", bbox))?;
        view.set_bounds(bounds)?;
    }

    let options = LayerOptions {
        mask: config.grid.value_mask,
        cache_entries: config.tile_cache_entries,
        time_index: source.time,
        vertical_index: source.vertical,
    };
    let layers = load_layers(&source.input, &source.param, options)
        .await
        .with_context(|| format!("Failed to load '{}' from {}", source.param, source.input.display()))?;
    for layer in layers {
        view.add_layer(layer)?;
    }
    Ok(view)
}

fn write_tile(view: &MapView, coord: TileCoord, path: &Path) -> Result<()> {
    let png = view.render_tile(coord)?.to_png()?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, png).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

async fn print_info(input: &Path) -> Result<()> {
    let docs = load_documents(input).await?;
    let mut summary = Vec::with_capacity(docs.len());
    for doc in &docs {
        let params: Vec<&String> = doc.range_type.keys().collect();
        let entry = match &doc.domain {
            DomainDocument::Grid(_) => {
                let domain = doc.grid_domain()?;
                serde_json::json!({
                    "type": "Grid",
                    "shape": domain.shape(),
                    "bbox": domain.bbox(),
                    "parameters": params,
                })
            }
            DomainDocument::Profile(p) => serde_json::json!({
                "type": "Profile",
                "position": [p.x, p.y],
                "levels": p.z.len(),
                "parameters": params,
            }),
        };
        summary.push(entry);
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
