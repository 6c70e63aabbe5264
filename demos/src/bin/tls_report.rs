//! Locates candidate TLS in one patient's immunofluorescence panel.
//!
//! Reads `<data-dir>/IF_data/<panel>/<patient>_<panel>.csv` together with
//! `<data-dir>/<panel>_phen_to_cell_mapping.csv`, clusters the B cell, T cell
//! and combined immune groups and profiles the surroundings of the combined
//! clusters. Without `--patient` the available patients are listed.
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tls_finder::ClusterParams;
use tls_finder::ExpansionParams;
use tls_finder::TlsConfig;
use tls_finder::TlsFinder;
use tls_finder_demos::panel::PanelLayout;
use tls_finder_demos::summary::ReportSummary;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tls-report")]
struct Args {
  /// Root of the exported data
  #[arg(short, long, default_value = "data")]
  data_dir: PathBuf,

  /// Panel to analyze
  #[arg(long, default_value = "IF1")]
  panel: String,

  /// Patient id; lists the available patients when omitted
  #[arg(short, long)]
  patient: Option<String>,

  /// Linking radius for clustering
  #[arg(short, long, default_value = "30")]
  radius: f64,

  /// Minimum cells for a cluster to count as TLS
  #[arg(short, long, default_value = "20")]
  min_cell: usize,

  /// Surroundings radius (default: the clustering radius)
  #[arg(long)]
  expansion_radius: Option<f64>,

  /// Write the full report as JSON
  #[arg(long)]
  json: Option<PathBuf>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();
  let layout = PanelLayout::new(&args.data_dir);

  let Some(patient) = args.patient else {
    let patients = layout.patients(&args.panel)?;
    println!("{} patients with panel {}:", patients.len(), args.panel);
    for patient in patients {
      println!("  {patient}");
    }
    return Ok(());
  };

  let start = Instant::now();
  let points = layout.load(&args.panel, &patient)?;
  println!(
    "Loaded {} cells for patient {} in {:.2}s",
    points.len(),
    patient,
    start.elapsed().as_secs_f32()
  );

  let config = TlsConfig {
    clustering: ClusterParams {
      radius: args.radius,
      min_cell: args.min_cell,
    },
    expansion: ExpansionParams {
      radius: args.expansion_radius,
      ..Default::default()
    },
    ..Default::default()
  };
  let finder = TlsFinder::new(config)?;

  let start = Instant::now();
  let report = finder.analyze(&points)?;
  println!("Analysis completed in {:.2}s", start.elapsed().as_secs_f32());
  println!();
  print!("{}", ReportSummary(&report));

  if let Some(path) = args.json {
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    println!();
    println!("Report written to {}", path.display());
  }
  Ok(())
}
