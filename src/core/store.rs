use crate::core::waypoint::{InvalidCoordinate, Waypoint};
use crate::input::{parse_waypoints, ImportError};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Read-only view of the waypoint sequence
pub type Snapshot = Arc<[Waypoint]>;

/// Outcome of a bulk import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub added: usize,
    pub rejected: usize,
}

/// Ordered waypoint sequence with validated additions
///
/// Every mutation publishes a fresh snapshot, so a traversal holding an
/// older snapshot never observes a change underneath it.
pub struct WaypointStore {
    waypoints: Snapshot,
    path_tx: watch::Sender<Snapshot>,
}

impl Default for WaypointStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WaypointStore {
    pub fn new() -> Self {
        let waypoints: Snapshot = Arc::from(Vec::new());
        let (path_tx, _) = watch::channel(waypoints.clone());
        Self { waypoints, path_tx }
    }

    /// Append one manually entered waypoint
    pub fn add_waypoint(&mut self, lon: f64, lat: f64) -> Result<(), InvalidCoordinate> {
        let waypoint = Waypoint::new(lon, lat)?;
        self.extend(std::iter::once(waypoint));
        debug!("Added waypoint {} ({} total)", waypoint, self.len());
        Ok(())
    }

    /// Import `lon,lat` rows from raw text
    pub fn import_waypoints(&mut self, raw_text: &str) -> Result<ImportSummary, ImportError> {
        self.import_reader(raw_text.as_bytes())
    }

    /// Import `lon,lat` rows from any reader
    ///
    /// A read failure aborts the whole import and leaves the store unchanged.
    pub fn import_reader<R: Read>(&mut self, reader: R) -> Result<ImportSummary, ImportError> {
        let parsed = parse_waypoints(reader)?;
        let summary = ImportSummary {
            added: parsed.waypoints.len(),
            rejected: parsed.rejected,
        };

        if !parsed.waypoints.is_empty() {
            self.extend(parsed.waypoints);
        }

        info!(
            "Imported {} waypoints ({} rows rejected, {} total)",
            summary.added,
            summary.rejected,
            self.len()
        );
        Ok(summary)
    }

    /// Import a CSV file from disk
    pub fn import_file<P: AsRef<Path>>(&mut self, path: P) -> Result<ImportSummary, ImportError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| ImportError::Read {
            path: Some(path.to_path_buf()),
            source,
        })?;
        self.import_reader(std::io::BufReader::new(file))
    }

    /// Empty the sequence
    pub fn reset(&mut self) {
        self.waypoints = Arc::from(Vec::new());
        self.path_tx.send_replace(self.waypoints.clone());
        debug!("Waypoint store cleared");
    }

    /// Current sequence, in traversal order
    pub fn snapshot(&self) -> Snapshot {
        self.waypoints.clone()
    }

    /// Receive a new snapshot whenever the sequence changes
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.path_tx.subscribe()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    fn extend<I: IntoIterator<Item = Waypoint>>(&mut self, additions: I) {
        let mut next = self.waypoints.to_vec();
        next.extend(additions);
        self.waypoints = Arc::from(next);
        self.path_tx.send_replace(self.waypoints.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn wp(lon: f64, lat: f64) -> Waypoint {
        Waypoint::new(lon, lat).unwrap()
    }

    #[test]
    fn test_add_waypoint_appends_in_order() {
        let mut store = WaypointStore::new();
        for (i, (lon, lat)) in [(1.0, 2.0), (-179.5, 89.0), (0.0, -90.0)].iter().enumerate() {
            store.add_waypoint(*lon, *lat).unwrap();
            assert_eq!(store.snapshot().len(), i + 1);
            assert_eq!(store.snapshot()[i], wp(*lon, *lat));
        }
    }

    #[test]
    fn test_add_waypoint_rejects_without_mutation() {
        let mut store = WaypointStore::new();
        store.add_waypoint(1.0, 1.0).unwrap();

        assert!(store.add_waypoint(200.0, 10.0).is_err());
        assert!(store.add_waypoint(10.0, 95.0).is_err());
        assert!(store.add_waypoint(f64::NAN, 10.0).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_import_skips_bad_rows() {
        let mut store = WaypointStore::new();
        let summary = store.import_waypoints("10,20\nbad,row\n30,40").unwrap();

        assert_eq!(summary, ImportSummary { added: 2, rejected: 1 });
        assert_eq!(&*store.snapshot(), &[wp(10.0, 20.0), wp(30.0, 40.0)]);
    }

    #[test]
    fn test_import_stray_quote_keeps_later_rows() {
        let mut store = WaypointStore::new();
        let summary = store.import_waypoints("10,20\n\"5,6\n30,40\n50,60").unwrap();

        assert_eq!(summary, ImportSummary { added: 3, rejected: 1 });
        assert_eq!(
            &*store.snapshot(),
            &[wp(10.0, 20.0), wp(30.0, 40.0), wp(50.0, 60.0)]
        );
    }

    #[test]
    fn test_import_appends_after_existing() {
        let mut store = WaypointStore::new();
        store.add_waypoint(5.0, 5.0).unwrap();
        store.import_waypoints("6,6\n7,7\n").unwrap();

        assert_eq!(&*store.snapshot(), &[wp(5.0, 5.0), wp(6.0, 6.0), wp(7.0, 7.0)]);
    }

    #[test]
    fn test_import_empty_or_invalid_is_not_an_error() {
        let mut store = WaypointStore::new();
        assert_eq!(store.import_waypoints("").unwrap().added, 0);

        let summary = store.import_waypoints("a,b\n500,1\n").unwrap();
        assert_eq!(summary, ImportSummary { added: 0, rejected: 2 });
        assert!(store.is_empty());
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
        }
    }

    #[test]
    fn test_unreadable_source_leaves_store_unchanged() {
        let mut store = WaypointStore::new();
        store.add_waypoint(1.0, 1.0).unwrap();

        assert!(store.import_reader(FailingReader).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let mut store = WaypointStore::new();
        let err = store.import_file("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, ImportError::Read { path: Some(_), .. }));
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_mutation() {
        let mut store = WaypointStore::new();
        store.add_waypoint(1.0, 1.0).unwrap();
        let before = store.snapshot();

        store.add_waypoint(2.0, 2.0).unwrap();
        store.reset();

        assert_eq!(before.len(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let mut store = WaypointStore::new();
        let mut rx = store.subscribe();

        store.add_waypoint(1.0, 1.0).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        store.reset();
        assert!(rx.borrow_and_update().is_empty());
    }
}
