//! Spatial clustering of immune cells into candidate tertiary lymphoid
//! structures (TLS).
//!
//! Given the segmented cells of a tissue biopsy, this library links cells of
//! selected types that lie within a fixed radius of each other, takes the
//! connected components of that proximity graph as cluster candidates, keeps
//! those with enough cells as named TLS, and then collects the cells around
//! every TLS to profile its composition. Loading data and drawing results are
//! left to the caller.
//!
//! # Example
//!
//! ```ignore
//! use tls_finder::{Cell, CellType, PointSet};
//!
//! let points = PointSet::new(cells)?;
//! let immune: BTreeSet<CellType> = ["Bcell", "Tcell", "BnT"].into_iter().map(CellType::from).collect();
//!
//! let clusters = tls_finder::cluster(&points, &immune, 30.0, 20)?;
//! let index = tls_finder::build_index(&points);
//! let surroundings = tls_finder::expand(&points, &index, &clusters, &tumor, 30.0)?;
//! let composition = tls_finder::composition(&surroundings, &types)?;
//! ```
//!
//! # Features
//!
//! - **Parallel**: graph rows, radius queries and clusters are processed with Rayon
//! - **Deterministic naming**: identical inputs always yield identical `TLS no. k` labels
//! - **Sparse graphs**: the proximity graph is a CSR matrix from `sprs`
//!
//! # Public API
//!
//! * [`cluster`], [`expand`], [`composition`], [`build_index`] - Pipeline entry points
//! * [`TlsFinder`] - Configured multi-group analysis of a sample
//! * [`TlsConfig`] - Configuration parameters
//! * [`PointSet`] - The cells of one sample
//! * [`SpatialIndex`] - Radius queries over a point set
//! * [`TlsError`] - Error taxonomy

// Public modules
pub mod config;
pub mod error;

// Public re-exports (primary API)
pub use cluster_assignment::ClusterAssignment;
pub use cluster_assignment::ClusterSummary;
pub use cluster_name::ClusterName;
pub use config::CellGroup;
pub use config::ClusterParams;
pub use config::ExpansionParams;
pub use config::TlsConfig;
pub use error::Result;
pub use error::TlsError;
pub use finder::TlsFinder;
pub use finder::build_index;
pub use finder::cluster;
pub use finder::composition;
pub use finder::expand;
pub use point_set::Cell;
pub use point_set::CellType;
pub use point_set::PointSet;
pub use report::GroupReport;
pub use report::TlsReport;
pub use spatial_index::SpatialIndex;
pub use surroundings::CompositionRow;
pub use surroundings::SurroundingsRow;
pub use surroundings::SurroundingsTable;

// Internal modules (not exposed)
mod cluster_assignment;
mod cluster_name;
mod finder;
mod point_set;
mod report;
mod spatial_index;
mod surroundings;
mod utils;

// Public modules (for advanced users)
pub mod tls;
