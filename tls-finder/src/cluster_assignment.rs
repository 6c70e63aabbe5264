use crate::cluster_name::ClusterName;
use crate::error::Result;
use crate::error::TlsError;
use crate::point_set::CellType;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Outcome of clustering one group of cell types.
///
/// Maps every selected point (by point set index) to its cluster name and
/// records the parameters it was computed with. The assignment is immutable;
/// a different filter, radius or `min_cell` means clustering again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
  pub(crate) labels: BTreeMap<usize, ClusterName>,
  pub(crate) cluster_names: Vec<ClusterName>,
  pub(crate) type_filter: BTreeSet<CellType>,
  pub(crate) radius: f64,
  pub(crate) min_cell: usize,
  /// Number of cells of the point set the labels index into.
  pub(crate) source_len: usize,
}

/// Size of one qualifying cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
  pub name: ClusterName,
  pub size: usize,
}

impl ClusterAssignment {
  pub(crate) fn empty(
    type_filter: BTreeSet<CellType>,
    radius: f64,
    min_cell: usize,
    source_len: usize,
  ) -> Self {
    Self {
      labels: BTreeMap::new(),
      cluster_names: Vec::new(),
      type_filter,
      radius,
      min_cell,
      source_len,
    }
  }

  /// Cluster name of every selected point, keyed by point set index.
  pub fn labels(&self) -> &BTreeMap<usize, ClusterName> {
    &self.labels
  }

  pub fn label(&self, index: usize) -> Option<ClusterName> {
    self.labels.get(&index).copied()
  }

  /// Qualifying cluster names, `TLS no. 1` first.
  pub fn cluster_names(&self) -> &[ClusterName] {
    &self.cluster_names
  }

  pub fn n_clusters(&self) -> usize {
    self.cluster_names.len()
  }

  /// True when no point was selected.
  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn type_filter(&self) -> &BTreeSet<CellType> {
    &self.type_filter
  }

  pub fn radius(&self) -> f64 {
    self.radius
  }

  pub fn min_cell(&self) -> usize {
    self.min_cell
  }

  pub fn source_len(&self) -> usize {
    self.source_len
  }

  /// Point set indices labelled `name`, ascending.
  pub fn members(&self, name: ClusterName) -> Vec<usize> {
    self
      .labels
      .iter()
      .filter(|(_, n)| **n == name)
      .map(|(&i, _)| i)
      .collect()
  }

  pub fn n_unclassified(&self) -> usize {
    self
      .labels
      .values()
      .filter(|n| !n.is_tls())
      .count()
  }

  /// Members of every qualifying cluster, in cluster order.
  ///
  /// Fails if a label refers to a cluster that is not listed, or a listed
  /// cluster has no members; both mean the assignment was tampered with or
  /// stitched together from different runs.
  pub fn clusters(&self) -> Result<Vec<(ClusterName, Vec<usize>)>> {
    let position: BTreeMap<ClusterName, usize> = self
      .cluster_names
      .iter()
      .enumerate()
      .map(|(pos, &name)| (name, pos))
      .collect();
    let mut grouped: Vec<Vec<usize>> = vec![Vec::new(); self.cluster_names.len()];
    for (&index, &name) in &self.labels {
      if !name.is_tls() {
        continue;
      }
      let &pos = position.get(&name).ok_or_else(|| {
        TlsError::inconsistent(format!("point {index} is labelled {name}, an unknown cluster"))
      })?;
      grouped[pos].push(index);
    }
    if let Some(pos) = grouped.iter().position(|m| m.is_empty()) {
      return Err(TlsError::inconsistent(format!(
        "cluster {} has no members",
        self.cluster_names[pos]
      )));
    }
    Ok(self.cluster_names.iter().copied().zip(grouped).collect())
  }

  /// Sizes of the qualifying clusters, in cluster order.
  pub fn summaries(&self) -> Vec<ClusterSummary> {
    let mut sizes: BTreeMap<ClusterName, usize> = BTreeMap::new();
    for name in self.labels.values() {
      *sizes.entry(*name).or_insert(0) += 1;
    }
    self
      .cluster_names
      .iter()
      .map(|&name| ClusterSummary {
        name,
        size: sizes.get(&name).copied().unwrap_or(0),
      })
      .collect()
  }
}
