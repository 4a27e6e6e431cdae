pub mod csv;

pub use self::csv::{parse_waypoints, ImportError};
