use crate::error::Result;
use crate::error::TlsError;
use ndarray::Array2;
use ndarray::ArrayView2;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashSet;
use std::fmt;

/// Phenotype-derived cell type label, e.g. `Bcell`, `Tcell`, `CD15+Tumor`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellType(String);

impl CellType {
  pub fn new(name: impl Into<String>) -> Self {
    Self(name.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for CellType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for CellType {
  fn from(name: &str) -> Self {
    Self(name.to_string())
  }
}

impl From<String> for CellType {
  fn from(name: String) -> Self {
    Self(name)
  }
}

/// A single segmented cell nucleus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
  pub x: f64,
  pub y: f64,
  pub cell_type: CellType,
  pub tissue_type: String,
}

impl Cell {
  pub fn new(x: f64, y: f64, cell_type: impl Into<CellType>, tissue_type: impl Into<String>) -> Self {
    Self {
      x,
      y,
      cell_type: cell_type.into(),
      tissue_type: tissue_type.into(),
    }
  }

  #[inline]
  pub fn position(&self) -> [f64; 2] {
    [self.x, self.y]
  }
}

/// The cells of one sample, in load order.
///
/// A cell's position in this set is its identity for the whole analysis: graph
/// nodes, cluster labels and surroundings rows all refer to it by that index.
/// The set is immutable once built.
#[derive(Debug, Clone)]
pub struct PointSet {
  cells: Vec<Cell>,
  /// n x 2 matrix of (x, y).
  coords: Array2<f64>,
}

impl PointSet {
  pub fn new(cells: Vec<Cell>) -> Result<Self> {
    if cells.len() >= u32::MAX as usize {
      return Err(TlsError::TooManyPoints { count: cells.len() });
    }
    if let Some(index) = cells
      .iter()
      .position(|c| !c.x.is_finite() || !c.y.is_finite())
    {
      return Err(TlsError::NonFiniteCoordinate { index });
    }
    let coords = Array2::from_shape_fn((cells.len(), 2), |(i, d)| match d {
      0 => cells[i].x,
      _ => cells[i].y,
    });
    Ok(Self { cells, coords })
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn cells(&self) -> &[Cell] {
    &self.cells
  }

  pub fn get(&self, index: usize) -> Option<&Cell> {
    self.cells.get(index)
  }

  pub fn coords(&self) -> ArrayView2<'_, f64> {
    self.coords.view()
  }

  #[inline]
  pub(crate) fn position(&self, index: usize) -> [f64; 2] {
    [self.coords[(index, 0)], self.coords[(index, 1)]]
  }

  /// Indices of the cells whose type is in `types`, ascending.
  pub fn select(&self, types: &BTreeSet<CellType>) -> Vec<usize> {
    self
      .cells
      .iter()
      .enumerate()
      .filter(|(_, c)| types.contains(&c.cell_type))
      .map(|(i, _)| i)
      .collect()
  }

  /// Number of cells per type.
  pub fn type_counts(&self) -> BTreeMap<CellType, usize> {
    let mut counts = BTreeMap::new();
    for cell in &self.cells {
      *counts.entry(cell.cell_type.clone()).or_insert(0) += 1;
    }
    counts
  }

  /// Distinct cell types in order of first appearance.
  pub fn cell_types(&self) -> Vec<CellType> {
    let mut seen = HashSet::new();
    self
      .cells
      .iter()
      .filter(|c| seen.insert(&c.cell_type))
      .map(|c| c.cell_type.clone())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_non_finite_coordinates() {
    let cells = vec![
      Cell::new(0.0, 0.0, "Bcell", "stroma"),
      Cell::new(f64::NAN, 1.0, "Tcell", "stroma"),
    ];
    assert_eq!(
      PointSet::new(cells).unwrap_err(),
      TlsError::NonFiniteCoordinate { index: 1 }
    );
  }

  #[test]
  fn select_and_count_by_type() {
    let points = PointSet::new(vec![
      Cell::new(0.0, 0.0, "Tcell", "tumor"),
      Cell::new(1.0, 0.0, "Bcell", "tumor"),
      Cell::new(2.0, 0.0, "Tcell", "stroma"),
    ])
    .unwrap();

    let types: BTreeSet<CellType> = [CellType::from("Tcell")].into_iter().collect();
    assert_eq!(points.select(&types), vec![0, 2]);
    assert_eq!(points.type_counts()[&CellType::from("Tcell")], 2);
    assert_eq!(
      points.cell_types(),
      vec![CellType::from("Tcell"), CellType::from("Bcell")]
    );
    assert_eq!(points.coords()[(2, 0)], 2.0);
    assert_eq!(points.get(1).map(|c| c.cell_type.as_str()), Some("Bcell"));
    assert!(points.get(3).is_none());
  }
}
