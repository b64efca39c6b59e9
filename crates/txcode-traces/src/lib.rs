#![deny(missing_docs)]
#![doc = "Trace building: turns per-round, per-channel spot detections into per-feature intensity tables."]

mod builder;
/// Exact-position trace building.
pub mod exact;
/// Intensity tables and their decoded columns.
pub mod intensity_table;
/// kd-tree used to match spots across rounds.
pub mod kdtree;
/// Anchor-round nearest-neighbor trace building.
pub mod nearest;
pub mod spots;

pub use builder::{build_traces, TraceBuilder, TraceBuildingStrategy};
pub use exact::ExactMatchBuilder;
pub use intensity_table::IntensityTable;
pub use kdtree::{Neighbor, SpotTree};
pub use nearest::NearestNeighborBuilder;
pub use spots::{Spot, SpotAttributes, SpotFindingResults};
