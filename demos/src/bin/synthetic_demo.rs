//! Runs the TLS analysis on a synthetic tissue section.
//!
//! Generates a uniform tumor background with scattered T cells, drops a few
//! Gaussian lymphoid aggregates of B, T and BnT cells into it, and prints what
//! the analysis recovers.
use anyhow::Result;
use clap::Parser;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Distribution;
use rand_distr::Normal;
use std::time::Instant;
use tls_finder::Cell;
use tls_finder::ClusterParams;
use tls_finder::PointSet;
use tls_finder::TlsConfig;
use tls_finder::TlsFinder;
use tls_finder_demos::summary::ReportSummary;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "Synthetic TLS Demo")]
struct Args {
  /// Number of lymphoid aggregates to plant
  #[arg(short, long, default_value = "4")]
  aggregates: usize,

  /// Cells per aggregate
  #[arg(short, long, default_value = "80")]
  cells_per_aggregate: usize,

  /// Background cells
  #[arg(short, long, default_value = "5000")]
  background: usize,

  /// Linking radius for clustering
  #[arg(short, long, default_value = "30")]
  radius: f64,

  /// Minimum cells for a cluster to count as TLS
  #[arg(short, long, default_value = "20")]
  min_cell: usize,

  /// RNG seed
  #[arg(long, default_value = "42")]
  seed: u64,
}

const SIDE: f64 = 5000.0;

fn generate(args: &Args) -> Result<PointSet> {
  let mut rng = StdRng::seed_from_u64(args.seed);
  let mut cells = Vec::with_capacity(args.background + args.aggregates * args.cells_per_aggregate);

  for _ in 0..args.background {
    let cell_type = match rng.random_range(0..10) {
      0..=3 => "CD15-Tumor",
      4..=6 => "CD15+Tumor",
      7 => "Macrophage",
      8 => "Dendritic",
      _ => "Tcell",
    };
    cells.push(Cell::new(
      rng.random_range(0.0..SIDE),
      rng.random_range(0.0..SIDE),
      cell_type,
      "tumor",
    ));
  }

  let spread = Normal::new(0.0, 40.0)?;
  for _ in 0..args.aggregates {
    let cx = rng.random_range(200.0..SIDE - 200.0);
    let cy = rng.random_range(200.0..SIDE - 200.0);
    for _ in 0..args.cells_per_aggregate {
      let cell_type = match rng.random_range(0..10) {
        0..=4 => "Bcell",
        5..=8 => "Tcell",
        _ => "BnT",
      };
      cells.push(Cell::new(
        cx + spread.sample(&mut rng),
        cy + spread.sample(&mut rng),
        cell_type,
        "stroma",
      ));
    }
  }

  Ok(PointSet::new(cells)?)
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();

  println!("Synthetic TLS Demo");
  println!("==================");
  println!("Aggregates: {}", args.aggregates);
  println!("Background cells: {}", args.background);
  println!();

  let points = generate(&args)?;
  let config = TlsConfig {
    clustering: ClusterParams {
      radius: args.radius,
      min_cell: args.min_cell,
    },
    ..Default::default()
  };
  let finder = TlsFinder::new(config)?;

  let start = Instant::now();
  let report = finder.analyze(&points)?;
  println!("Analysis completed in {:.2}s", start.elapsed().as_secs_f32());
  println!();
  print!("{}", ReportSummary(&report));

  let found = report
    .group(&finder.config().expansion_group)
    .map(|g| g.assignment.n_clusters())
    .unwrap_or(0);
  println!();
  println!(
    "Planted {} aggregates, recovered {} TLS",
    args.aggregates, found
  );
  Ok(())
}
