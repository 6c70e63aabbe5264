use crate::error::Result;
use crate::error::check_radius;
use crate::point_set::PointSet;
use rayon::prelude::*;
use rstar::RTree;
use rstar::primitives::GeomWithData;
use std::fmt;
use std::time::Instant;
use tracing::debug;

/// A 2D position tagged with its index in the indexed point list.
type IndexedPoint = GeomWithData<[f64; 2], u32>;

/// Query sets smaller than this are answered on the calling thread.
const PARALLEL_QUERY_THRESHOLD: usize = 256;

/// Read-only radius-query index over a fixed list of 2D points.
///
/// Built once with an R-tree bulk load (O(n log n)). The index never changes
/// after construction; a different point list needs a new index. It is `Sync`
/// and can be queried from many threads at once.
pub struct SpatialIndex {
  tree: RTree<IndexedPoint>,
  len: usize,
}

impl fmt::Debug for SpatialIndex {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SpatialIndex").field("len", &self.len).finish()
  }
}

impl SpatialIndex {
  /// Index every cell of a point set; results are point set indices.
  pub fn new(points: &PointSet) -> Self {
    Self::from_positions((0..points.len()).map(|i| points.position(i)))
  }

  /// Index arbitrary positions; results are positions in iteration order.
  pub fn from_positions(positions: impl IntoIterator<Item = [f64; 2]>) -> Self {
    let started = Instant::now();
    let entries: Vec<IndexedPoint> = positions
      .into_iter()
      .enumerate()
      .map(|(i, p)| IndexedPoint::new(p, i as u32))
      .collect();
    let len = entries.len();
    let tree = RTree::bulk_load(entries);
    debug!(
      duration_ms = started.elapsed().as_millis(),
      len, "spatial index built"
    );
    Self { tree, len }
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Indices of all points within `radius` of `point` (boundary included),
  /// ascending.
  pub fn query_radius(&self, point: [f64; 2], radius: f64) -> Result<Vec<usize>> {
    check_radius(radius)?;
    let mut found = self.within(point, radius * radius);
    found.sort_unstable();
    Ok(found)
  }

  /// Union of [`query_radius`](Self::query_radius) over every query point,
  /// without duplicates, ascending.
  pub fn query_radius_any(&self, points: &[[f64; 2]], radius: f64) -> Result<Vec<usize>> {
    check_radius(radius)?;
    let radius_sq = radius * radius;
    let mut found: Vec<usize> = if points.len() < PARALLEL_QUERY_THRESHOLD {
      points
        .iter()
        .flat_map(|&p| self.within(p, radius_sq))
        .collect()
    } else {
      points
        .par_iter()
        .flat_map_iter(|&p| self.within(p, radius_sq))
        .collect()
    };
    found.sort_unstable();
    found.dedup();
    Ok(found)
  }

  #[inline]
  fn within(&self, point: [f64; 2], radius_sq: f64) -> Vec<usize> {
    self
      .tree
      .locate_within_distance(point, radius_sq)
      .map(|p| p.data as usize)
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::TlsError;

  fn line() -> SpatialIndex {
    SpatialIndex::from_positions([[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [10.0, 0.0]])
  }

  #[test]
  fn radius_boundary_is_inclusive() {
    let index = line();
    assert_eq!(index.query_radius([0.0, 0.0], 2.0).unwrap(), vec![0, 1, 2]);
    assert_eq!(index.query_radius([0.0, 0.0], 0.0).unwrap(), vec![0]);
  }

  #[test]
  fn multi_point_query_is_deduplicated_union() {
    let index = line();
    let found = index
      .query_radius_any(&[[0.0, 0.0], [1.0, 0.0], [10.0, 0.0]], 1.0)
      .unwrap();
    assert_eq!(found, vec![0, 1, 2, 3]);
    assert!(index.query_radius_any(&[], 1.0).unwrap().is_empty());
  }

  #[test]
  fn large_query_set_matches_sequential_union() {
    // 40 x 40 grid with unit spacing.
    let grid: Vec<[f64; 2]> = (0..1600)
      .map(|i| [(i % 40) as f64, (i / 40) as f64])
      .collect();
    let index = SpatialIndex::from_positions(grid.iter().copied());
    let queries: Vec<[f64; 2]> = (0..300)
      .map(|i| [(i % 20) as f64 * 0.5 + 3.25, (i / 20) as f64 * 0.5 + 3.25])
      .collect();
    assert!(queries.len() >= PARALLEL_QUERY_THRESHOLD);

    let mut expected: Vec<usize> = queries
      .iter()
      .flat_map(|&q| index.query_radius(q, 1.5).unwrap())
      .collect();
    expected.sort_unstable();
    expected.dedup();

    assert_eq!(index.query_radius_any(&queries, 1.5).unwrap(), expected);
  }

  #[test]
  fn negative_radius_is_rejected() {
    let index = line();
    assert_eq!(
      index.query_radius([0.0, 0.0], -1.0),
      Err(TlsError::InvalidRadius { radius: -1.0 })
    );
    assert!(index.query_radius_any(&[[0.0, 0.0]], f64::NAN).is_err());
  }
}
