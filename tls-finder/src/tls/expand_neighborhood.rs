use crate::cluster_assignment::ClusterAssignment;
use crate::error::Result;
use crate::error::TlsError;
use crate::error::check_radius;
use crate::point_set::CellType;
use crate::point_set::PointSet;
use crate::spatial_index::SpatialIndex;
use crate::surroundings::SurroundingsRow;
use crate::surroundings::SurroundingsTable;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::debug;
use tracing::info;
use typed_builder::TypedBuilder;

/// Collects the cells around every qualifying cluster.
///
/// For one cluster the radius queries seeded at all of its members are merged
/// and deduplicated. Results of different clusters are concatenated as they
/// are, so a cell close to two clusters is reported under both. Cells whose
/// type is in `excluded_types` are never reported. `unclassified` points are
/// not expanded.
#[derive(TypedBuilder, Debug)]
pub struct ExpandNeighborhood<'a> {
  points: &'a PointSet,
  /// Index over `points`, as returned by [`SpatialIndex::new`].
  index: &'a SpatialIndex,
  clusters: &'a ClusterAssignment,
  #[builder(default, setter(strip_option))]
  excluded_types: Option<&'a BTreeSet<CellType>>,
  radius: f64,
}

impl<'a> ExpandNeighborhood<'a> {
  pub fn exec(self) -> Result<SurroundingsTable> {
    let ExpandNeighborhood {
      points,
      index,
      clusters,
      excluded_types,
      radius,
    } = self;

    check_radius(radius)?;
    if index.len() != points.len() {
      return Err(TlsError::inconsistent(format!(
        "spatial index holds {} points but the point set has {}",
        index.len(),
        points.len()
      )));
    }
    if clusters.source_len() != points.len() {
      return Err(TlsError::inconsistent(format!(
        "clusters were computed on {} points but the point set has {}",
        clusters.source_len(),
        points.len()
      )));
    }
    // Every labelled point must exist here and carry a clustered type.
    for &i in clusters.labels().keys() {
      let cell = points.get(i).ok_or_else(|| {
        TlsError::inconsistent(format!(
          "labelled point {i} is outside a point set of {} cells",
          points.len()
        ))
      })?;
      if !clusters.type_filter().contains(&cell.cell_type) {
        return Err(TlsError::inconsistent(format!(
          "labelled point {i} has type {}, which was not clustered",
          cell.cell_type
        )));
      }
    }
    let groups = clusters.clusters()?;

    let started = Instant::now();
    let per_cluster: Vec<Vec<SurroundingsRow>> = groups
      .par_iter()
      .map(|(name, members)| -> Result<Vec<SurroundingsRow>> {
        let seeds: Vec<[f64; 2]> = members.iter().map(|&i| points.position(i)).collect();
        let found = index.query_radius_any(&seeds, radius)?;
        let rows: Vec<SurroundingsRow> = found
          .into_iter()
          .filter_map(|i| {
            let cell = &points.cells()[i];
            if excluded_types.is_some_and(|ex| ex.contains(&cell.cell_type)) {
              return None;
            }
            Some(SurroundingsRow {
              index: i,
              x: cell.x,
              y: cell.y,
              cell_type: cell.cell_type.clone(),
              cluster: *name,
            })
          })
          .collect();
        debug!(
          cluster = %name,
          members = members.len(),
          surroundings = rows.len(),
          "cluster expanded"
        );
        Ok(rows)
      })
      .collect::<Result<_>>()?;

    let rows: Vec<SurroundingsRow> = per_cluster.into_iter().flatten().collect();
    info!(
      duration_ms = started.elapsed().as_millis(),
      n_clusters = groups.len(),
      n_rows = rows.len(),
      "neighborhood expansion complete"
    );
    Ok(SurroundingsTable::new(rows))
  }
}
