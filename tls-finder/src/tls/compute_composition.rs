use crate::cluster_name::ClusterName;
use crate::error::Result;
use crate::error::TlsError;
use crate::point_set::CellType;
use crate::surroundings::CompositionRow;
use crate::surroundings::SurroundingsTable;
use crate::utils::round::round2;
use std::collections::HashMap;
use tracing::warn;

/// Percentage composition of every cluster present in `table`.
///
/// Clusters are reported in order of first appearance, and for each cluster
/// one row per entry of `types`, in that order. Every row of the table must
/// carry one of `types`.
pub fn compute_composition(
  table: &SurroundingsTable,
  types: &[CellType],
) -> Result<Vec<CompositionRow>> {
  compute_composition_for(table, &table.cluster_names(), types)
}

/// Like [`compute_composition`] for an explicit list of clusters.
///
/// A listed cluster without rows in `table` has no defined composition and is
/// skipped with a warning instead of failing the whole aggregation.
pub fn compute_composition_for(
  table: &SurroundingsTable,
  clusters: &[ClusterName],
  types: &[CellType],
) -> Result<Vec<CompositionRow>> {
  let type_pos: HashMap<&CellType, usize> = types
    .iter()
    .enumerate()
    .rev()
    .map(|(pos, t)| (t, pos))
    .collect();

  let mut counts: HashMap<ClusterName, Vec<usize>> = HashMap::new();
  for row in table.rows() {
    let &pos = type_pos
      .get(&row.cell_type)
      .ok_or_else(|| TlsError::UnknownCellType {
        cell_type: row.cell_type.clone(),
        cluster: row.cluster,
      })?;
    counts
      .entry(row.cluster)
      .or_insert_with(|| vec![0; types.len()])[pos] += 1;
  }

  let mut composition = Vec::with_capacity(clusters.len() * types.len());
  for &cluster in clusters {
    let cluster_counts = counts.get(&cluster).map(Vec::as_slice).unwrap_or(&[]);
    match cluster_composition(cluster, cluster_counts, types) {
      Ok(rows) => composition.extend(rows),
      Err(e) if e.is_recoverable() => {
        warn!(cluster = %cluster, error = %e, "skipping cluster without surroundings");
      }
      Err(e) => return Err(e),
    }
  }
  Ok(composition)
}

fn cluster_composition(
  cluster: ClusterName,
  counts: &[usize],
  types: &[CellType],
) -> Result<Vec<CompositionRow>> {
  let total: usize = counts.iter().sum();
  if total == 0 {
    return Err(TlsError::DivisionByZero { cluster });
  }
  Ok(
    types
      .iter()
      .zip(counts)
      .map(|(cell_type, &count)| CompositionRow {
        cell_type: cell_type.clone(),
        cluster,
        percent: round2(count as f64 * 100.0 / total as f64),
      })
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::surroundings::SurroundingsRow;

  fn row(index: usize, cell_type: &str) -> SurroundingsRow {
    SurroundingsRow {
      index,
      x: index as f64,
      y: 0.0,
      cell_type: CellType::from(cell_type),
      cluster: ClusterName::Tls(1),
    }
  }

  #[test]
  fn exact_ties_round_to_even() {
    // 1 of 32 is 3.125% and 31 of 32 is 96.875%, both exact in binary.
    let rows = (0..32)
      .map(|i| row(i, if i == 0 { "Bcell" } else { "Tcell" }))
      .collect();
    let table = SurroundingsTable::new(rows);

    let composition =
      compute_composition(&table, &[CellType::from("Bcell"), CellType::from("Tcell")]).unwrap();

    let percents: Vec<f64> = composition.iter().map(|r| r.percent).collect();
    assert_eq!(percents, vec![3.12, 96.88]);
  }
}
