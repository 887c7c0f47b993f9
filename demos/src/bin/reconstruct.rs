//! Reconstruct a surface from an oriented NOFF point file
//!
//! Usage: reconstruct [OPTIONS] <INPUT> <OUTPUT>

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use surfcrate_demos::init_tracing;
use surfcrate_io::{read_oriented_cloud, save_obj_soup};
use surfcrate_reconstruction::{ExtractionVariant, ReconstructionConfig, ReconstructionSession};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Variant {
    /// Plain marching cubes
    Standard,
    /// Relocate vertices in cells that cross a sharp edge
    Features,
}

impl From<Variant> for ExtractionVariant {
    fn from(v: Variant) -> Self {
        match v {
            Variant::Standard => ExtractionVariant::Standard,
            Variant::Features => ExtractionVariant::FeaturePreserving,
        }
    }
}

#[derive(Parser)]
#[command(name = "reconstruct")]
#[command(author, version, about = "Implicit surface reconstruction from a NOFF point file", long_about = None)]
struct Cli {
    /// Input NOFF file with positions and normals
    input: PathBuf,

    /// Output OBJ file for the triangle soup
    output: PathBuf,

    /// Lattice cells along x, y and z
    #[arg(short, long, num_args = 3, value_names = ["NX", "NY", "NZ"], default_values_t = [20, 10, 20])]
    resolution: Vec<usize>,

    /// Extraction variant
    #[arg(long, value_enum, default_value = "standard")]
    variant: Variant,

    /// Wendland kernel support (default: a tenth of the padded diagonal)
    #[arg(long)]
    kernel_width: Option<f32>,

    /// Neighborhood radius for the field (default: the kernel width)
    #[arg(long)]
    search_radius: Option<f32>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cloud = read_oriented_cloud(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    println!("Loaded {} oriented points", cloud.len());

    let mut config = ReconstructionConfig::default()
        .with_resolution([cli.resolution[0], cli.resolution[1], cli.resolution[2]])
        .with_variant(cli.variant.into());
    config.kernel_width = cli.kernel_width;
    config.search_radius = cli.search_radius;

    let start = Instant::now();
    let session = ReconstructionSession::new(cloud, config)?;
    println!(
        "Sampled {} lattice nodes ({} inside) in {:.2?}",
        session.grid().values().len(),
        session.grid().inside_count(),
        start.elapsed()
    );

    let start = Instant::now();
    let surface = session.extract()?;
    let report = &surface.report;
    println!(
        "Extracted {} triangles from {} active cells in {:.2?}",
        report.triangles,
        report.active_cells,
        start.elapsed()
    );
    if session.config().variant == ExtractionVariant::FeaturePreserving {
        println!("Feature cells: {} edge, {} corner", report.edge_cells, report.corner_cells);
    }
    if report.undefined_normals > 0 {
        println!("{} vertices have no defined normal", report.undefined_normals);
    }

    save_obj_soup(&surface.soup, &cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    println!("Wrote {}", cli.output.display());

    Ok(())
}
