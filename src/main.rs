//! tilegen CLI - procedural planet surface generator.
//!
//! Generates a tile-mesh planet (tectonics, relief, seasonal climate, rivers,
//! biomes, resources) and writes it as compact JSON.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tilegen::export::{encode_context, write_json};
use tilegen::geometry::TileTemplate;
use tilegen::pipeline::Pipeline;
use tilegen::view::WorldView;
use tilegen::world::{ClimateModelPreference, RunConfig, WorldContext};

/// Procedural planet surface generator.
#[derive(Parser)]
#[command(name = "tilegen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a planet and write it as JSON.
    Generate {
        /// Number of tiles on a synthesized Fibonacci-sphere template.
        /// Ignored when --template is given.
        #[arg(short, long, default_value = "4000")]
        tiles: usize,

        /// Random seed. Defaults to the config file's seed, then 42.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of tectonic plates.
        #[arg(short, long, default_value = "12")]
        plates: usize,

        /// Axial tilt in degrees, clamped to [-90, 90].
        #[arg(long)]
        tilt: Option<f32>,

        /// Fraction of the surface below sea level (0..1).
        #[arg(short, long)]
        water: Option<f32>,

        /// Use the reduced-heuristics physical climate model.
        #[arg(long)]
        physical_climate: bool,

        /// Tile template CSV (`id,lat,lon` per line).
        #[arg(long)]
        template: Option<PathBuf>,

        /// JSON run configuration: `{ "planet": {..}, "settings": {..} }`.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output JSON file.
        #[arg(short, long, default_value = "planet.json")]
        output: PathBuf,
    },
    /// Write a Fibonacci-sphere tile template.
    Template {
        /// Number of tiles.
        #[arg(short, long, default_value = "4000")]
        tiles: usize,

        /// Output CSV file.
        #[arg(short, long, default_value = "template.csv")]
        output: PathBuf,
    },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            tiles,
            seed,
            plates,
            tilt,
            water,
            physical_climate,
            template,
            config,
            output,
        } => run_generate(GenerateArgs {
            tiles,
            seed,
            plates,
            tilt,
            water,
            physical_climate,
            template,
            config,
            output,
        }),
        Commands::Template { tiles, output } => run_template(tiles, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

struct GenerateArgs {
    tiles: usize,
    seed: Option<u64>,
    plates: usize,
    tilt: Option<f32>,
    water: Option<f32>,
    physical_climate: bool,
    template: Option<PathBuf>,
    config: Option<PathBuf>,
    output: PathBuf,
}

fn run_generate(args: GenerateArgs) -> CliResult {
    if args.plates == 0 {
        return Err("number of plates must be at least 1".into());
    }
    if let Some(w) = args.water {
        if !(0.0..=1.0).contains(&w) {
            return Err("water fraction must be between 0.0 and 1.0".into());
        }
    }

    let mut run = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(tilt) = args.tilt {
        run.planet.axial_tilt_deg = tilt;
    }
    if let Some(water) = args.water {
        run.planet.water_fraction = water;
    }
    let mut builder = run.settings;
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    if args.physical_climate {
        builder = builder.climate_model(ClimateModelPreference::ReducedHeuristicsPhysical);
    }
    let settings = builder.build();

    let template = match &args.template {
        Some(path) => TileTemplate::load(path)?,
        None => {
            if args.tiles < 2 {
                return Err("number of tiles must be at least 2".into());
            }
            TileTemplate::fibonacci(args.tiles)
        }
    };

    println!("tilegen - Procedural Planet Generator");
    println!("=====================================");
    println!("Tiles:  {}", template.len());
    println!("Seed:   {}", settings.seed());
    println!("Plates: {}", args.plates);
    println!(
        "Planet: {} (tilt {:.2}°, water {:.2})",
        run.planet.name,
        run.planet.effective_tilt_deg(),
        run.planet.water_fraction
    );
    println!("Climate model: {:?}", settings.climate_model());
    println!();

    let start = Instant::now();
    let pipeline = Pipeline::standard();
    let mut ctx = WorldContext::new(template.instantiate(), run.planet, settings, args.plates);
    pipeline.run_with_callbacks(
        &mut ctx,
        |name, i, total| {
            println!("  [{}/{}] Starting: {}", i + 1, total, name);
        },
        |name, i, total| {
            println!("  [{}/{}] Completed: {}", i + 1, total, name);
        },
    )?;
    println!("Generation completed in {:.2?}", start.elapsed());

    let view = WorldView::new(&ctx.tiles, ctx.planet());
    let land = (0..view.len())
        .filter(|&i| view.surface(i).is_ok_and(|s| s.is_land()))
        .count();
    let rivers = (0..view.len())
        .filter(|&i| view.is_river(i).unwrap_or(false))
        .count();
    match ctx.sea_level_m {
        Some(sea) => println!("Sea level: {sea:.0} m"),
        None => println!("Sea level: none (no liquid water)"),
    }
    println!("Land tiles: {land}, river tiles: {rivers}");

    let record = encode_context(&ctx)?;
    write_json(&args.output, &record)?;
    println!("Wrote {} tiles to {}", record.tiles.len(), args.output.display());
    Ok(())
}

fn run_template(tiles: usize, output: &Path) -> CliResult {
    if tiles < 2 {
        return Err("number of tiles must be at least 2".into());
    }
    let template = TileTemplate::fibonacci(tiles);
    template.write(output)?;
    println!("Wrote {} template rows to {}", template.len(), output.display());
    Ok(())
}
