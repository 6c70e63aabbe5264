use crate::tls::build_proximity_graph::ProximityGraph;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::info;

const UNVISITED: u32 = u32::MAX;

/// Connected component id of every node of a proximity graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentLabels {
  /// `labels[local]` is the component of node `local`.
  labels: Vec<u32>,
  /// `sizes[c]` is the number of nodes in component `c`.
  sizes: Vec<usize>,
}

impl ComponentLabels {
  pub fn n_components(&self) -> usize {
    self.sizes.len()
  }

  pub fn labels(&self) -> &[u32] {
    &self.labels
  }

  pub fn label(&self, local: usize) -> u32 {
    self.labels[local]
  }

  pub fn sizes(&self) -> &[usize] {
    &self.sizes
  }

  pub fn size(&self, component: u32) -> usize {
    self.sizes[component as usize]
  }
}

/// Labels connected components by breadth-first search.
///
/// Nodes are scanned left to right; each unvisited node opens the next
/// component id. Component 0 therefore contains node 0, and the numbering only
/// depends on the graph. Runs in O(n + e).
pub fn label_components(graph: &ProximityGraph) -> ComponentLabels {
  let started = Instant::now();
  let n_nodes = graph.n_nodes();
  let mut labels = vec![UNVISITED; n_nodes];
  let mut sizes = Vec::new();
  let mut queue = VecDeque::new();

  for seed in 0..n_nodes {
    if labels[seed] != UNVISITED {
      continue;
    }
    let component = sizes.len() as u32;
    labels[seed] = component;
    queue.push_back(seed);
    let mut size = 0usize;

    while let Some(node) = queue.pop_front() {
      size += 1;
      for &next in graph.neighbors(node) {
        let next = next as usize;
        if labels[next] == UNVISITED {
          labels[next] = component;
          queue.push_back(next);
        }
      }
    }
    sizes.push(size);
  }

  info!(
    duration_ms = started.elapsed().as_millis(),
    n_nodes,
    n_components = sizes.len(),
    "connected components complete"
  );
  ComponentLabels { labels, sizes }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::point_set::Cell;
  use crate::point_set::PointSet;
  use crate::tls::build_proximity_graph::BuildProximityGraph;

  #[test]
  fn ids_follow_first_visit_order() {
    // Chain 0-2-4 far from 1-3, with an isolated point at the end.
    let points = PointSet::new(vec![
      Cell::new(0.0, 0.0, "Bcell", "stroma"),
      Cell::new(50.0, 0.0, "Bcell", "stroma"),
      Cell::new(1.0, 0.0, "Bcell", "stroma"),
      Cell::new(51.0, 0.0, "Bcell", "stroma"),
      Cell::new(2.0, 0.0, "Bcell", "stroma"),
      Cell::new(90.0, 90.0, "Bcell", "stroma"),
    ])
    .unwrap();
    let nodes: Vec<usize> = (0..points.len()).collect();
    let graph = BuildProximityGraph::builder()
      .points(&points)
      .nodes(&nodes)
      .radius(1.0)
      .build()
      .exec()
      .unwrap();

    let components = label_components(&graph);
    assert_eq!(components.labels(), &[0, 1, 0, 1, 0, 2]);
    assert_eq!(components.sizes(), &[3, 2, 1]);
  }
}
