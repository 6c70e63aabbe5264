use crate::cluster_name::ClusterName;
use crate::tls::label_components::ComponentLabels;

/// Cluster name of every component, plus the qualifying names in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentNames {
  pub per_component: Vec<ClusterName>,
  /// `TLS no. 1`, `TLS no. 2`, ... in increasing order; never `unclassified`.
  pub ordered: Vec<ClusterName>,
}

impl ComponentNames {
  /// Name of the component containing node `local`.
  pub fn name_of(&self, components: &ComponentLabels, local: usize) -> ClusterName {
    self.per_component[components.label(local) as usize]
  }
}

/// Applies the minimum-size rule to components in id order.
///
/// A component with at least `min_cell` members takes the next `TLS no. k`,
/// counting from 1; smaller ones are `unclassified` and do not advance the
/// counter. With `min_cell <= 1` every component qualifies.
pub fn name_clusters(components: &ComponentLabels, min_cell: usize) -> ComponentNames {
  let mut next_k = 1u32;
  let mut ordered = Vec::new();
  let per_component = components
    .sizes()
    .iter()
    .map(|&size| {
      if size >= min_cell {
        let name = ClusterName::Tls(next_k);
        next_k += 1;
        ordered.push(name);
        name
      } else {
        ClusterName::Unclassified
      }
    })
    .collect();

  ComponentNames {
    per_component,
    ordered,
  }
}
