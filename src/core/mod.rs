pub mod store;
pub mod waypoint;

pub use store::{ImportSummary, Snapshot, WaypointStore};
pub use waypoint::{InvalidCoordinate, Waypoint};
