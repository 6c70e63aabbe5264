//! Data loading and reporting helpers shared by the demo binaries.

pub mod panel;
pub mod summary;
