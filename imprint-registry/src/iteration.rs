//! Iteration state
//!
//! One iteration per pipeline run. Build records are kept in a sharded
//! concurrent map so workers touching different components never contend on a
//! single lock.

use dashmap::DashMap;
use imprint_core::domain::build::BuildRecord;
use std::future::Future;
use tokio::sync::OnceCell;
use uuid::Uuid;

/// Build records and provenance for one pipeline run
///
/// Calls for different component names may interleave freely. Calls for the
/// same component are expected to come from a single worker at a time.
#[derive(Debug)]
pub struct Iteration {
    /// Fingerprint of the run, supplied by the caller
    run_id: String,
    /// Identifies this process among the runs sharing a fingerprint
    run_uuid: Uuid,
    /// Set once the registry has created or matched the iteration
    remote_id: OnceCell<String>,
    /// Build records keyed by component name
    builds: DashMap<String, BuildRecord>,
}

impl Iteration {
    /// Creates an empty iteration for the given run fingerprint
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            run_uuid: Uuid::new_v4(),
            remote_id: OnceCell::new(),
            builds: DashMap::new(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn run_uuid(&self) -> Uuid {
        self.run_uuid
    }

    /// Remote identifier, if the iteration exists upstream yet
    pub fn remote_id(&self) -> Option<&str> {
        self.remote_id.get().map(String::as_str)
    }

    /// Records the remote identifier
    ///
    /// Returns `false` if one was already set; the first id is kept.
    pub fn set_remote_id(&self, id: impl Into<String>) -> bool {
        self.remote_id.set(id.into()).is_ok()
    }

    /// Returns the remote id, running `init` to obtain it if none is set
    ///
    /// Concurrent callers share one `init` call.
    pub(crate) async fn remote_id_or_try_init<F, Fut, E>(&self, init: F) -> Result<&str, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        self.remote_id
            .get_or_try_init(init)
            .await
            .map(String::as_str)
    }

    /// Inserts a placeholder record for `name` unless one exists
    pub fn register_component(&self, name: &str) {
        self.builds
            .entry(name.to_string())
            .or_insert_with(|| BuildRecord::placeholder(name));
    }

    /// Returns a snapshot of the record for `name`
    pub fn load(&self, name: &str) -> Option<BuildRecord> {
        self.builds.get(name).map(|entry| entry.value().clone())
    }

    /// Inserts or replaces the record for `name`
    pub fn store(&self, name: &str, record: BuildRecord) {
        debug_assert_eq!(
            record.component_type, name,
            "build records must be stored under their component type"
        );
        self.builds.insert(name.to_string(), record);
    }

    /// Applies `f` to the record for `name` while holding its shard lock
    ///
    /// Returns `None` if no record exists.
    pub fn update<R>(&self, name: &str, f: impl FnOnce(&mut BuildRecord) -> R) -> Option<R> {
        self.builds.get_mut(name).map(|mut entry| f(entry.value_mut()))
    }

    /// Names of all registered components, sorted
    pub fn components(&self) -> Vec<String> {
        let mut names: Vec<String> = self.builds.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    /// Snapshot of all records, sorted by component name
    pub fn builds(&self) -> Vec<BuildRecord> {
        let mut records: Vec<BuildRecord> =
            self.builds.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by(|a, b| a.component_type.cmp(&b.component_type));
        records
    }

    pub fn len(&self) -> usize {
        self.builds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_register_component_is_idempotent() {
        let iteration = Iteration::new("no-fingerprint-here");

        iteration.register_component("happycloud.image");
        iteration.update("happycloud.image", |record| {
            record.labels.insert("version".into(), "1.7.0".into());
        });
        iteration.register_component("happycloud.image");

        assert_eq!(iteration.len(), 1);
        let record = iteration.load("happycloud.image").unwrap();
        assert_eq!(record.labels.len(), 1);
    }

    #[test]
    fn test_load_missing() {
        let iteration = Iteration::new("no-fingerprint-here");
        assert!(iteration.load("happycloud.image").is_none());
        assert!(iteration.update("happycloud.image", |_| ()).is_none());
        assert!(iteration.is_empty());
    }

    #[test]
    fn test_store_replaces_record() {
        let iteration = Iteration::new("no-fingerprint-here");
        iteration.register_component("happycloud.image");

        let mut record = BuildRecord::placeholder("happycloud.image");
        record.remote_id = Some("build-1".into());
        iteration.store("happycloud.image", record.clone());

        assert_eq!(iteration.load("happycloud.image"), Some(record));
    }

    #[test]
    fn test_loaded_records_are_snapshots() {
        let iteration = Iteration::new("no-fingerprint-here");
        iteration.register_component("happycloud.image");

        let mut snapshot = iteration.load("happycloud.image").unwrap();
        snapshot.labels.insert("version".into(), "1.7.0".into());

        assert!(iteration.load("happycloud.image").unwrap().labels.is_empty());
    }

    #[test]
    fn test_remote_id_is_set_once() {
        let iteration = Iteration::new("no-fingerprint-here");
        assert!(iteration.remote_id().is_none());

        assert!(iteration.set_remote_id("iter-1"));
        assert!(!iteration.set_remote_id("iter-2"));
        assert_eq!(iteration.remote_id(), Some("iter-1"));
    }

    #[test]
    fn test_components_sorted() {
        let iteration = Iteration::new("no-fingerprint-here");
        iteration.register_component("b.image");
        iteration.register_component("a.image");

        assert_eq!(iteration.components(), vec!["a.image", "b.image"]);
        let types: Vec<_> = iteration
            .builds()
            .into_iter()
            .map(|record| record.component_type)
            .collect();
        assert_eq!(types, vec!["a.image", "b.image"]);
    }

    #[test]
    fn test_concurrent_registration_of_distinct_components() {
        let iteration = Arc::new(Iteration::new("no-fingerprint-here"));

        let handles: Vec<_> = (0..16)
            .map(|worker| {
                let iteration = Arc::clone(&iteration);
                std::thread::spawn(move || {
                    for n in 0..50 {
                        let name = format!("worker{worker}.image{n}");
                        iteration.register_component(&name);
                        iteration.update(&name, |record| {
                            record.labels.insert("worker".into(), worker.to_string());
                        });
                        let record = iteration.load(&name).unwrap();
                        assert_eq!(record.component_type, name);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(iteration.len(), 16 * 50);
        for record in iteration.builds() {
            assert_eq!(record.labels.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_remote_id_init_runs_once() {
        let iteration = Iteration::new("no-fingerprint-here");

        let first = iteration
            .remote_id_or_try_init(|| async { Ok::<_, ()>("iter-1".to_string()) })
            .await
            .unwrap()
            .to_string();
        let second = iteration
            .remote_id_or_try_init(|| async { Ok::<_, ()>("iter-2".to_string()) })
            .await
            .unwrap();

        assert_eq!(first, "iter-1");
        assert_eq!(second, "iter-1");
    }

    #[tokio::test]
    async fn test_failed_remote_id_init_can_retry() {
        let iteration = Iteration::new("no-fingerprint-here");

        let failed = iteration
            .remote_id_or_try_init(|| async { Err::<String, _>("offline") })
            .await;
        assert_eq!(failed, Err("offline"));
        assert!(iteration.remote_id().is_none());

        let id = iteration
            .remote_id_or_try_init(|| async { Ok::<_, &str>("iter-1".to_string()) })
            .await
            .unwrap();
        assert_eq!(id, "iter-1");
    }
}
