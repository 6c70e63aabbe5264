use crate::error::Result;
use crate::error::TlsError;
use crate::error::check_radius;
use crate::point_set::PointSet;
use crate::spatial_index::SpatialIndex;
use rayon::prelude::*;
use sprs::CsMatI;
use std::time::Instant;
use tracing::info;
use typed_builder::TypedBuilder;

/// Unweighted CSR adjacency; every stored entry is 1. Column indices are
/// local node ids, row pointers are `usize` so the edge count cannot overflow.
pub type AdjacencyMat = CsMatI<u8, u32, usize>;

/// Radius graph over a subset of a point set.
///
/// Node `i` is the `i`th selected point (selected points are kept in ascending
/// point set order). Two nodes are adjacent iff their Euclidean distance is at
/// most `radius`; every node is adjacent to itself, so an isolated point still
/// forms a component of its own.
#[derive(Debug, Clone)]
pub struct ProximityGraph {
  adjacency: AdjacencyMat,
  nodes: Vec<usize>,
  radius: f64,
}

impl ProximityGraph {
  pub fn n_nodes(&self) -> usize {
    self.nodes.len()
  }

  /// Undirected edges between distinct nodes.
  pub fn n_edges(&self) -> usize {
    (self.adjacency.nnz() - self.nodes.len()) / 2
  }

  pub fn radius(&self) -> f64 {
    self.radius
  }

  pub fn adjacency(&self) -> &AdjacencyMat {
    &self.adjacency
  }

  /// Point set index of local node `local`.
  pub fn global_index(&self, local: usize) -> usize {
    self.nodes[local]
  }

  /// Point set indices of all nodes, by local id.
  pub fn nodes(&self) -> &[usize] {
    &self.nodes
  }

  /// Local ids adjacent to `local`, itself included, ascending.
  #[inline]
  pub fn neighbors(&self, local: usize) -> &[u32] {
    let start = self.adjacency.indptr().index(local);
    let end = self.adjacency.indptr().index(local + 1);
    &self.adjacency.indices()[start..end]
  }
}

/// Builds the closed-ball radius graph over the selected points.
#[derive(TypedBuilder, Debug)]
pub struct BuildProximityGraph<'a> {
  points: &'a PointSet,
  /// Point set indices of the nodes. Sorted and deduplicated before use, so
  /// the resulting graph does not depend on the order given here.
  nodes: &'a [usize],
  radius: f64,
}

impl<'a> BuildProximityGraph<'a> {
  pub fn exec(self) -> Result<ProximityGraph> {
    let BuildProximityGraph {
      points,
      nodes,
      radius,
    } = self;

    check_radius(radius)?;
    if nodes.is_empty() {
      return Err(TlsError::EmptyInput);
    }
    if let Some(&bad) = nodes.iter().find(|&&i| i >= points.len()) {
      return Err(TlsError::inconsistent(format!(
        "node {bad} is outside a point set of {} cells",
        points.len()
      )));
    }

    let nodes: Vec<usize> = if nodes.windows(2).all(|w| w[0] < w[1]) {
      nodes.to_vec()
    } else {
      let mut sorted = nodes.to_vec();
      sorted.sort_unstable();
      sorted.dedup();
      sorted
    };
    let n_nodes = nodes.len();

    // Local index so neighbor ids come back as node ids.
    let started = Instant::now();
    let positions: Vec<[f64; 2]> = nodes.iter().map(|&i| points.position(i)).collect();
    let local_index = SpatialIndex::from_positions(positions.iter().copied());

    // Each row is the sorted neighbor set of one node, itself included.
    let rows: Vec<Vec<usize>> = positions
      .par_iter()
      .map(|&p| local_index.query_radius(p, radius))
      .collect::<Result<_>>()?;
    info!(
      duration_ms = started.elapsed().as_millis(),
      n_nodes, "proximity rows complete"
    );

    let started = Instant::now();
    let mut indptr: Vec<usize> = Vec::with_capacity(n_nodes + 1);
    indptr.push(0);
    let mut total = 0usize;
    for row in &rows {
      total += row.len();
      indptr.push(total);
    }
    let indices: Vec<u32> = rows.into_iter().flatten().map(|j| j as u32).collect();
    let data = vec![1u8; indices.len()];
    let adjacency = AdjacencyMat::try_new((n_nodes, n_nodes), indptr, indices, data)
      .map_err(|(_, _, _, e)| TlsError::inconsistent(format!("proximity graph: {e}")))?;
    info!(
      duration_ms = started.elapsed().as_millis(),
      nnz = adjacency.nnz(),
      "proximity csr complete"
    );

    Ok(ProximityGraph {
      adjacency,
      nodes,
      radius,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::point_set::Cell;

  fn points() -> PointSet {
    PointSet::new(vec![
      Cell::new(0.0, 0.0, "Bcell", "stroma"),
      Cell::new(5.0, 5.0, "CD15-Tumor", "tumor"),
      Cell::new(1.0, 0.0, "Bcell", "stroma"),
      Cell::new(2.0, 0.0, "Tcell", "stroma"),
    ])
    .unwrap()
  }

  #[test]
  fn builds_symmetric_closed_ball_graph() {
    let points = points();
    let graph = BuildProximityGraph::builder()
      .points(&points)
      .nodes(&[0, 2, 3])
      .radius(1.0)
      .build()
      .exec()
      .unwrap();

    assert_eq!(graph.n_nodes(), 3);
    assert_eq!(graph.neighbors(0), &[0, 1]);
    assert_eq!(graph.neighbors(1), &[0, 1, 2]);
    assert_eq!(graph.neighbors(2), &[1, 2]);
    assert_eq!(graph.n_edges(), 2);
    assert_eq!(graph.global_index(1), 2);
  }

  #[test]
  fn node_order_does_not_change_graph() {
    let points = points();
    let build = |nodes: &[usize]| {
      BuildProximityGraph::builder()
        .points(&points)
        .nodes(nodes)
        .radius(1.5)
        .build()
        .exec()
        .unwrap()
    };
    let a = build(&[0, 2, 3]);
    let b = build(&[3, 0, 2, 0]);
    assert_eq!(a.nodes(), b.nodes());
    for local in 0..a.n_nodes() {
      assert_eq!(a.neighbors(local), b.neighbors(local));
    }
  }

  #[test]
  fn rejects_empty_and_foreign_nodes() {
    let points = points();
    let empty = BuildProximityGraph::builder()
      .points(&points)
      .nodes(&[])
      .radius(1.0)
      .build()
      .exec();
    assert_eq!(empty.unwrap_err(), TlsError::EmptyInput);

    let foreign = BuildProximityGraph::builder()
      .points(&points)
      .nodes(&[0, 9])
      .radius(1.0)
      .build()
      .exec();
    assert!(matches!(foreign, Err(TlsError::InconsistentIndex(_))));
  }
}
