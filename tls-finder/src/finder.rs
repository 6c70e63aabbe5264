use crate::cluster_assignment::ClusterAssignment;
use crate::config::CellGroup;
use crate::config::TlsConfig;
use crate::error::Result;
use crate::error::TlsError;
use crate::error::check_radius;
use crate::point_set::CellType;
use crate::point_set::PointSet;
use crate::report::GroupReport;
use crate::report::TlsReport;
use crate::spatial_index::SpatialIndex;
use crate::surroundings::CompositionRow;
use crate::surroundings::SurroundingsTable;
use crate::tls::build_proximity_graph::BuildProximityGraph;
use crate::tls::compute_composition::compute_composition;
use crate::tls::compute_composition::compute_composition_for;
use crate::tls::expand_neighborhood::ExpandNeighborhood;
use crate::tls::label_components::label_components;
use crate::tls::name_clusters::name_clusters;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::info;

/// Clusters the cells whose type is in `type_filter`.
///
/// Builds the radius graph over the selected cells, labels its connected
/// components and names them with the `min_cell` rule. Selecting no cells is
/// not an error: the result is an empty assignment with zero clusters.
pub fn cluster(
  points: &PointSet,
  type_filter: &BTreeSet<CellType>,
  radius: f64,
  min_cell: usize,
) -> Result<ClusterAssignment> {
  check_radius(radius)?;
  let nodes = points.select(type_filter);

  let graph = match BuildProximityGraph::builder()
    .points(points)
    .nodes(&nodes)
    .radius(radius)
    .build()
    .exec()
  {
    Ok(graph) => graph,
    Err(TlsError::EmptyInput) => {
      info!(?type_filter, "no cells selected, zero clusters");
      return Ok(ClusterAssignment::empty(
        type_filter.clone(),
        radius,
        min_cell,
        points.len(),
      ));
    }
    Err(e) => return Err(e),
  };

  let components = label_components(&graph);
  let names = name_clusters(&components, min_cell);
  let labels: BTreeMap<_, _> = (0..graph.n_nodes())
    .map(|local| (graph.global_index(local), names.name_of(&components, local)))
    .collect();
  info!(
    n_selected = graph.n_nodes(),
    n_edges = graph.n_edges(),
    n_components = components.n_components(),
    n_clusters = names.ordered.len(),
    min_cell,
    "clustering complete"
  );

  Ok(ClusterAssignment {
    labels,
    cluster_names: names.ordered,
    type_filter: type_filter.clone(),
    radius,
    min_cell,
    source_len: points.len(),
  })
}

/// Builds the spatial index [`expand`] queries.
pub fn build_index(points: &PointSet) -> SpatialIndex {
  SpatialIndex::new(points)
}

/// Collects the cells within `radius` of each qualifying cluster, leaving out
/// `excluded_types`.
pub fn expand(
  points: &PointSet,
  index: &SpatialIndex,
  clusters: &ClusterAssignment,
  excluded_types: &BTreeSet<CellType>,
  radius: f64,
) -> Result<SurroundingsTable> {
  ExpandNeighborhood::builder()
    .points(points)
    .index(index)
    .clusters(clusters)
    .excluded_types(excluded_types)
    .radius(radius)
    .build()
    .exec()
}

/// Per-cluster percentage of each of `types` in the surroundings table.
pub fn composition(table: &SurroundingsTable, types: &[CellType]) -> Result<Vec<CompositionRow>> {
  compute_composition(table, types)
}

/// Runs the configured analysis on whole samples.
///
/// Every configured cell group is clustered on its own; the clusters of the
/// expansion group are then expanded over the non-excluded cells and
/// profiled. One `TlsFinder` can analyze any number of samples.
///
/// # Example
///
/// ```ignore
/// use tls_finder::{TlsConfig, TlsFinder};
///
/// let finder = TlsFinder::new(TlsConfig::default())?;
/// let report = finder.analyze(&points)?;
/// for row in &report.composition {
///     println!("{} {} {:.2}", row.cluster, row.cell_type, row.percent);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TlsFinder {
  config: TlsConfig,
}

impl TlsFinder {
  /// Create a finder, rejecting invalid configurations.
  pub fn new(config: TlsConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self { config })
  }

  pub fn config(&self) -> &TlsConfig {
    &self.config
  }

  /// Clusters one cell group with the configured parameters.
  pub fn cluster_group(&self, points: &PointSet, group: &CellGroup) -> Result<ClusterAssignment> {
    cluster(
      points,
      &group.types,
      self.config.clustering.radius,
      self.config.clustering.min_cell,
    )
  }

  /// Full analysis of one sample.
  pub fn analyze(&self, points: &PointSet) -> Result<TlsReport> {
    let started = Instant::now();
    info!(
      n_cells = points.len(),
      n_groups = self.config.groups.len(),
      radius = self.config.clustering.radius,
      min_cell = self.config.clustering.min_cell,
      "starting analysis"
    );

    // Groups share nothing but the read-only point set.
    let groups: Vec<GroupReport> = self
      .config
      .groups
      .par_iter()
      .map(|group| -> Result<GroupReport> {
        let assignment = self.cluster_group(points, group)?;
        info!(
          group = %group.name,
          n_clusters = assignment.n_clusters(),
          n_unclassified = assignment.n_unclassified(),
          "group clustered"
        );
        Ok(GroupReport {
          name: group.name.clone(),
          types: group.types.clone(),
          clusters: assignment.summaries(),
          assignment,
        })
      })
      .collect::<Result<_>>()?;

    let expansion_group = groups
      .iter()
      .find(|g| g.name == self.config.expansion_group)
      .ok_or_else(|| {
        TlsError::InvalidConfig(format!(
          "expansion group {:?} is not among the configured groups",
          self.config.expansion_group
        ))
      })?;

    let excluded = &self.config.expansion.excluded_types;
    let index = build_index(points);
    let surroundings = expand(
      points,
      &index,
      &expansion_group.assignment,
      excluded,
      self.config.expansion_radius(),
    )?;

    let types: Vec<CellType> = points
      .cell_types()
      .into_iter()
      .filter(|t| !excluded.contains(t))
      .collect();
    let composition = compute_composition_for(
      &surroundings,
      expansion_group.assignment.cluster_names(),
      &types,
    )?;

    info!(
      duration_ms = started.elapsed().as_millis(),
      n_surroundings = surroundings.len(),
      n_composition_rows = composition.len(),
      "analysis complete"
    );

    Ok(TlsReport {
      n_cells: points.len(),
      type_counts: points.type_counts(),
      expansion_group: expansion_group.name.clone(),
      groups,
      surroundings,
      composition,
    })
  }
}
