use crate::error::Result;
use crate::error::TlsError;
use crate::error::check_radius;
use crate::point_set::CellType;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;

/// Configuration for proximity-graph clustering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterParams {
  /// Maximum distance between two cells for them to be linked.
  ///
  /// The boundary is inclusive. Larger values merge nearby groups into fewer,
  /// larger clusters; smaller values fragment them.
  ///
  /// Must be >= 0.
  ///
  /// Default: 30.0
  pub radius: f64,

  /// Minimum number of cells a connected component needs to be named a TLS.
  ///
  /// Smaller components are reported as `unclassified`. With a value of 0 or
  /// 1 every component, singletons included, becomes a TLS.
  ///
  /// Default: 20
  pub min_cell: usize,
}

impl Default for ClusterParams {
  fn default() -> Self {
    Self {
      radius: 30.0,
      min_cell: 20,
    }
  }
}

/// Configuration for collecting the surroundings of accepted clusters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionParams {
  /// Search radius around every cluster member.
  ///
  /// If `None`, the clustering radius is reused.
  ///
  /// Default: None
  pub radius: Option<f64>,

  /// Cell types that never count as surroundings.
  ///
  /// Default: `CD15-Tumor`, `CD15+Tumor`
  pub excluded_types: BTreeSet<CellType>,
}

impl Default for ExpansionParams {
  fn default() -> Self {
    Self {
      radius: None,
      excluded_types: ["CD15-Tumor", "CD15+Tumor"]
        .into_iter()
        .map(CellType::from)
        .collect(),
    }
  }
}

/// A named set of cell types clustered together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellGroup {
  pub name: String,
  pub types: BTreeSet<CellType>,
}

impl CellGroup {
  pub fn new<T: Into<CellType>>(name: impl Into<String>, types: impl IntoIterator<Item = T>) -> Self {
    Self {
      name: name.into(),
      types: types.into_iter().map(Into::into).collect(),
    }
  }
}

/// Complete analysis configuration.
///
/// # Example
///
/// ```ignore
/// use tls_finder::config::{ClusterParams, TlsConfig};
///
/// let config = TlsConfig {
///     clustering: ClusterParams {
///         radius: 25.0,
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
  /// Clustering parameters shared by every group.
  pub clustering: ClusterParams,

  /// Surroundings parameters.
  pub expansion: ExpansionParams,

  /// Groups clustered independently of each other.
  ///
  /// Default: `bcell` = {Bcell}, `tcell` = {Tcell}, `immune` = {Bcell, Tcell, BnT}
  pub groups: Vec<CellGroup>,

  /// Name of the group whose clusters are expanded and profiled.
  ///
  /// Default: "immune"
  pub expansion_group: String,
}

impl Default for TlsConfig {
  fn default() -> Self {
    Self {
      clustering: ClusterParams::default(),
      expansion: ExpansionParams::default(),
      groups: vec![
        CellGroup::new("bcell", ["Bcell"]),
        CellGroup::new("tcell", ["Tcell"]),
        CellGroup::new("immune", ["Bcell", "Tcell", "BnT"]),
      ],
      expansion_group: "immune".to_string(),
    }
  }
}

impl TlsConfig {
  /// Radius used for surroundings.
  pub fn expansion_radius(&self) -> f64 {
    self.expansion.radius.unwrap_or(self.clustering.radius)
  }

  pub fn group(&self, name: &str) -> Option<&CellGroup> {
    self.groups.iter().find(|g| g.name == name)
  }

  pub fn validate(&self) -> Result<()> {
    check_radius(self.clustering.radius)?;
    check_radius(self.expansion_radius())?;
    if self.group(&self.expansion_group).is_none() {
      return Err(TlsError::InvalidConfig(format!(
        "expansion group {:?} is not among the configured groups",
        self.expansion_group
      )));
    }
    let mut names = BTreeSet::new();
    if let Some(dup) = self.groups.iter().find(|g| !names.insert(g.name.as_str())) {
      return Err(TlsError::InvalidConfig(format!(
        "group {:?} is configured twice",
        dup.name
      )));
    }
    Ok(())
  }
}
