use crate::cluster_assignment::ClusterAssignment;
use crate::cluster_assignment::ClusterSummary;
use crate::point_set::CellType;
use crate::surroundings::CompositionRow;
use crate::surroundings::SurroundingsTable;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Clustering result for one configured cell group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReport {
  pub name: String,
  pub types: BTreeSet<CellType>,
  pub assignment: ClusterAssignment,
  pub clusters: Vec<ClusterSummary>,
}

/// Everything one analysis of a sample produces.
///
/// Plain data only; rendering is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TlsReport {
  pub n_cells: usize,
  /// Cells per type over the whole sample.
  pub type_counts: BTreeMap<CellType, usize>,
  /// One entry per configured group, in configuration order.
  pub groups: Vec<GroupReport>,
  /// Group whose clusters were expanded.
  pub expansion_group: String,
  pub surroundings: SurroundingsTable,
  pub composition: Vec<CompositionRow>,
}

impl TlsReport {
  pub fn group(&self, name: &str) -> Option<&GroupReport> {
    self.groups.iter().find(|g| g.name == name)
  }
}
