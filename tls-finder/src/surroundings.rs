use crate::cluster_name::ClusterName;
use crate::point_set::CellType;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashSet;

/// A cell found near a cluster, tagged with that cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurroundingsRow {
  /// Index of the cell in the full point set.
  pub index: usize,
  pub x: f64,
  pub y: f64,
  pub cell_type: CellType,
  pub cluster: ClusterName,
}

/// Cells around every qualifying cluster.
///
/// Rows are grouped by cluster in cluster order, ascending point index within
/// a cluster. A cell near several clusters appears once for each of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurroundingsTable {
  rows: Vec<SurroundingsRow>,
}

impl SurroundingsTable {
  pub fn new(rows: Vec<SurroundingsRow>) -> Self {
    Self { rows }
  }

  pub fn rows(&self) -> &[SurroundingsRow] {
    &self.rows
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn for_cluster(&self, cluster: ClusterName) -> impl Iterator<Item = &SurroundingsRow> {
    self.rows.iter().filter(move |r| r.cluster == cluster)
  }

  /// Distinct clusters in order of first appearance.
  pub fn cluster_names(&self) -> Vec<ClusterName> {
    let mut seen = HashSet::new();
    self
      .rows
      .iter()
      .filter(|r| seen.insert(r.cluster))
      .map(|r| r.cluster)
      .collect()
  }
}

/// Share of one cell type within one cluster's surroundings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionRow {
  pub cell_type: CellType,
  pub cluster: ClusterName,
  /// Percentage rounded to two decimals.
  pub percent: f64,
}
