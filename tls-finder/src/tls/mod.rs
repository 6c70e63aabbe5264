pub mod build_proximity_graph;
pub mod label_components;
pub mod name_clusters;
pub mod expand_neighborhood;
pub mod compute_composition;
