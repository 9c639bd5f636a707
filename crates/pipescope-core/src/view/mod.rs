//! UI-agnostic view models built from table controllers and clusters.

pub mod common;
mod clusters;
mod tables;

pub use clusters::{ClusterRow, ClusterViewModel, build_cluster_view};
pub use common::{RowStyleClass, StyledRow, TableViewModel, ViewCell, ViewRow};
pub use tables::build_table_view;
