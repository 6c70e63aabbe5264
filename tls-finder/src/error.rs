use crate::cluster_name::ClusterName;
use crate::point_set::CellType;
use thiserror::Error;

/// Errors raised by the clustering engine.
///
/// `EmptyInput` and `DivisionByZero` are recoverable: the entry points turn
/// them into empty results or skipped rows. Everything else indicates bad
/// input or state mixed between runs and is surfaced to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TlsError {
  /// Radius is negative or NaN.
  #[error("invalid radius {radius}: must be a non-negative number")]
  InvalidRadius { radius: f64 },

  /// No points left after filtering by cell type.
  #[error("no points selected by the cell type filter")]
  EmptyInput,

  /// A cluster without any rows was asked for its composition.
  #[error("cluster {cluster} has no rows, composition is undefined")]
  DivisionByZero { cluster: ClusterName },

  /// An index or cluster refers to data that is not in the current point set.
  #[error("inconsistent index: {0}")]
  InconsistentIndex(String),

  /// A surroundings row carries a cell type outside the reported universe.
  #[error("cell type {cell_type} in {cluster} is not among the reported types")]
  UnknownCellType {
    cell_type: CellType,
    cluster: ClusterName,
  },

  #[error("cell {index} has a non-finite coordinate")]
  NonFiniteCoordinate { index: usize },

  #[error("{count} cells exceed the u32 index space")]
  TooManyPoints { count: usize },

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),
}

impl TlsError {
  pub fn inconsistent(message: impl Into<String>) -> Self {
    TlsError::InconsistentIndex(message.into())
  }

  /// Whether callers are expected to recover from this error locally.
  pub fn is_recoverable(&self) -> bool {
    matches!(self, TlsError::EmptyInput | TlsError::DivisionByZero { .. })
  }
}

pub type Result<T> = std::result::Result<T, TlsError>;

/// Rejects negative and NaN radii.
pub(crate) fn check_radius(radius: f64) -> Result<()> {
  if radius >= 0.0 {
    Ok(())
  } else {
    Err(TlsError::InvalidRadius { radius })
  }
}
