//! Print SCONNECT connection-override records for a grid
//!
//! Reads a JSON dump of a table store (path → `{"dtype", "data"}`), builds
//! the connection engine and writes one `I J K   I J K   T` line per
//! connection.

use anyhow::{Context, Result};
use clap::Parser;
use resgrid_core::{ConnectionEngine, EngineConfig, GridIndex, MemoryStore};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Transmissibility export with configurable tolerances
#[derive(Parser, Debug)]
#[command(name = "sconnect")]
#[command(about = "Compute inter-cell transmissibilities and print SCONNECT records", long_about = None)]
struct Args {
    /// JSON table-store dump
    store: PathBuf,

    /// JSON engine configuration; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Distance tolerance for coincident faces and edge intersections
    #[arg(short, long)]
    epsilon: Option<f64>,

    /// Multiplier applied to Z before distance tests
    #[arg(short, long)]
    z_scale: Option<f64>,

    /// Rescale face normals to the summed triangle area
    #[arg(long)]
    precise_area: bool,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print the neighbour/NNC split to stderr
    #[arg(short, long)]
    summary: bool,
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(epsilon) = args.epsilon {
        config.epsilon = epsilon;
    }
    if let Some(z_scale) = args.z_scale {
        config.z_scale = z_scale;
    }
    config.precise_area |= args.precise_area;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let text = fs::read_to_string(&args.store)
        .with_context(|| format!("reading store {}", args.store.display()))?;
    let store: MemoryStore = serde_json::from_str(&text)
        .with_context(|| format!("parsing store {}", args.store.display()))?;
    info!("Loaded {} tables from {}", store.len(), args.store.display());

    let mut engine = ConnectionEngine::new(store, config)?;
    let connections = engine.connections()?.to_vec();
    let transmissibilities = engine.transmissibilities(false)?.to_vec();
    let records = engine.sconnect_records(&connections, Some(&transmissibilities))?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    writeln!(out, "SCONNECT")?;
    for record in &records {
        writeln!(out, "{record}")?;
    }
    writeln!(out, "/")?;
    out.flush()?;

    if args.summary {
        let cells: Vec<usize> = connections.iter().flat_map(|c| [c.cell_i, c.cell_j]).collect();
        let coords = engine.index().linear_to_structured_many(&cells)?;
        let nnc = coords
            .chunks_exact(2)
            .filter(|pair| !GridIndex::is_neighbor(&pair[0], &pair[1]))
            .count();
        let total: f64 = transmissibilities.iter().sum();
        eprintln!(
            "{} connections ({} non-neighbour), total transmissibility {:.4}",
            connections.len(),
            nnc,
            total
        );
    }
    Ok(())
}
