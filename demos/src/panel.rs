use anyhow::Context;
use anyhow::Result;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use tls_finder::Cell;
use tls_finder::CellType;
use tls_finder::PointSet;
use tracing::info;
use tracing::warn;

/// Cell type given to cells whose phenotype has no mapping.
pub const UNKNOWN_CELL_TYPE: &str = "unknown";

/// Canonical form of a marker phenotype string.
///
/// The string is cut after every `+` or `-`; the distinct markers are sorted
/// and joined again, so `"CK-CD3+CD20-"` and `"CD3+CK-CD20-"` compare equal.
/// Anything after the last sign is dropped.
pub fn standardize_phenotype(phenotype: &str) -> String {
  let mut markers = BTreeSet::new();
  let mut start = 0;
  for (i, ch) in phenotype.char_indices() {
    if ch == '+' || ch == '-' {
      markers.insert(&phenotype[start..=i]);
      start = i + 1;
    }
  }
  markers.into_iter().collect()
}

#[derive(Debug, Deserialize)]
struct MappingRecord {
  phenotype: String,
  celltype: String,
}

#[derive(Debug, Deserialize)]
struct CellRecord {
  #[serde(rename = "nucleus.x")]
  x: f64,
  #[serde(rename = "nucleus.y")]
  y: f64,
  phenotype: String,
  #[serde(rename = "tissue.type")]
  tissue_type: String,
}

/// Reads a `phenotype,celltype` table keyed by canonical phenotype.
pub fn read_mapping<R: Read>(reader: R) -> Result<HashMap<String, CellType>> {
  let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
  let mut mapping = HashMap::new();
  for record in reader.deserialize() {
    let record: MappingRecord = record.context("malformed phenotype mapping row")?;
    mapping.insert(
      standardize_phenotype(&record.phenotype),
      CellType::from(record.celltype),
    );
  }
  Ok(mapping)
}

/// Reads a panel export and resolves every cell's type through `mapping`.
pub fn read_cells<R: Read>(reader: R, mapping: &HashMap<String, CellType>) -> Result<PointSet> {
  let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
  let mut cells = Vec::new();
  let mut unmapped = 0usize;
  for (row, record) in reader.deserialize().enumerate() {
    let record: CellRecord = record.with_context(|| format!("malformed cell row {row}"))?;
    let cell_type = match mapping.get(&standardize_phenotype(&record.phenotype)) {
      Some(t) => t.clone(),
      None => {
        unmapped += 1;
        CellType::from(UNKNOWN_CELL_TYPE)
      }
    };
    cells.push(Cell::new(record.x, record.y, cell_type, record.tissue_type));
  }
  if unmapped > 0 {
    warn!(unmapped, "cells with unmapped phenotype");
  }
  Ok(PointSet::new(cells)?)
}

/// File layout of the exported immunofluorescence data.
#[derive(Debug, Clone)]
pub struct PanelLayout {
  pub data_dir: PathBuf,
}

impl PanelLayout {
  pub fn new(data_dir: impl Into<PathBuf>) -> Self {
    Self {
      data_dir: data_dir.into(),
    }
  }

  pub fn mapping_path(&self, panel: &str) -> PathBuf {
    self
      .data_dir
      .join(format!("{panel}_phen_to_cell_mapping.csv"))
  }

  pub fn cells_path(&self, panel: &str, patient: &str) -> PathBuf {
    self
      .data_dir
      .join("IF_data")
      .join(panel)
      .join(format!("{patient}_{panel}.csv"))
  }

  /// Patient ids with an export for `panel`, sorted.
  pub fn patients(&self, panel: &str) -> Result<Vec<String>> {
    let dir = self.data_dir.join("IF_data").join(panel);
    let suffix = format!("_{panel}.csv");
    let mut patients = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("listing {}", dir.display()))? {
      let name = entry?.file_name().to_string_lossy().into_owned();
      if let Some(patient) = name.strip_suffix(&suffix) {
        patients.push(patient.to_string());
      }
    }
    patients.sort();
    Ok(patients)
  }

  /// Loads one patient's panel with resolved cell types.
  pub fn load(&self, panel: &str, patient: &str) -> Result<PointSet> {
    let mapping = open(&self.mapping_path(panel))?;
    let mapping = read_mapping(mapping)?;
    let cells = open(&self.cells_path(panel, patient))?;
    let points = read_cells(cells, &mapping)?;
    info!(panel, patient, n_cells = points.len(), "panel loaded");
    Ok(points)
  }
}

fn open(path: &Path) -> Result<fs::File> {
  fs::File::open(path).with_context(|| format!("opening {}", path.display()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn phenotype_markers_are_sorted_and_deduplicated() {
    assert_eq!(standardize_phenotype("CK-CD3+CD20-"), "CD20-CD3+CK-");
    assert_eq!(
      standardize_phenotype("CD3+CK-CD20-"),
      standardize_phenotype("CK-CD20-CD3+")
    );
    assert_eq!(standardize_phenotype("CD3+CD3+"), "CD3+");
    assert_eq!(standardize_phenotype("CD3+trailing"), "CD3+");
    assert_eq!(standardize_phenotype(""), "");
  }

  #[test]
  fn reads_panel_through_mapping() {
    let mapping = "phenotype,celltype\nCD20+CD3-,Bcell\nCD3+CD20-,Tcell\n";
    let cells = "\
,cell.ID,nucleus.x,nucleus.y,tissue.type,phenotype
0,1,10.5,20.0,stroma,CD3-CD20+
1,2,11.0,21.0,stroma,CD20-CD3+
2,3,50.0,50.0,tumor,CK+
";
    let mapping = read_mapping(mapping.as_bytes()).unwrap();
    let points = read_cells(cells.as_bytes(), &mapping).unwrap();

    assert_eq!(points.len(), 3);
    let types: Vec<&str> = points.cells().iter().map(|c| c.cell_type.as_str()).collect();
    assert_eq!(types, vec!["Bcell", "Tcell", UNKNOWN_CELL_TYPE]);
    assert_eq!(points.cells()[0].x, 10.5);
    assert_eq!(points.cells()[2].tissue_type, "tumor");
  }

  #[test]
  fn layout_paths() {
    let layout = PanelLayout::new("data");
    assert_eq!(
      layout.cells_path("IF1", "P001"),
      PathBuf::from("data/IF_data/IF1/P001_IF1.csv")
    );
    assert_eq!(
      layout.mapping_path("IF2"),
      PathBuf::from("data/IF2_phen_to_cell_mapping.csv")
    );
  }
}
