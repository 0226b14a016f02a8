//! In-memory registry service for tests

use async_trait::async_trait;
use imprint_client::{BuildHandle, BuildStatus, ClientError, IterationHandle, RegistryService};
use imprint_core::Labels;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub(crate) struct MockBuild {
    pub id: String,
    pub done: bool,
    pub labels: Labels,
}

#[derive(Debug, Default)]
struct MockState {
    /// (bucket slug, run id) -> iteration id
    iterations: HashMap<(String, String), String>,
    /// (iteration id, component) -> build
    builds: HashMap<(String, String), MockBuild>,
    /// Components whose create-or-get call fails
    failing: HashSet<String>,
    /// Components whose create-or-get call never returns
    hanging: HashSet<String>,
    iteration_unavailable: bool,
}

/// Registry service that keeps everything in memory
///
/// Ids are derived from their keys so tests can seed builds before the bucket
/// creates the iteration.
#[derive(Debug, Default)]
pub(crate) struct MockRegistry {
    state: Mutex<MockState>,
    iteration_calls: AtomicUsize,
    build_calls: AtomicUsize,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iteration_id(slug: &str, run_id: &str) -> String {
        format!("iter-{slug}-{run_id}")
    }

    pub fn build_id(iteration_id: &str, component: &str) -> String {
        format!("{iteration_id}/{component}")
    }

    /// Pretends an earlier run already created the iteration
    pub fn seed_iteration(&self, slug: &str, run_id: &str) -> String {
        let id = Self::iteration_id(slug, run_id);
        self.state
            .lock()
            .unwrap()
            .iterations
            .insert((slug.to_string(), run_id.to_string()), id.clone());
        id
    }

    /// Pretends an earlier run already created a build
    pub fn seed_build(&self, slug: &str, run_id: &str, component: &str, done: bool, labels: Labels) {
        let iteration_id = self.seed_iteration(slug, run_id);
        let build = MockBuild {
            id: Self::build_id(&iteration_id, component),
            done,
            labels,
        };
        self.state
            .lock()
            .unwrap()
            .builds
            .insert((iteration_id, component.to_string()), build);
    }

    pub fn fail_component(&self, component: &str) {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(component.to_string());
    }

    pub fn recover_component(&self, component: &str) {
        self.state.lock().unwrap().failing.remove(component);
    }

    pub fn hang_component(&self, component: &str) {
        self.state
            .lock()
            .unwrap()
            .hanging
            .insert(component.to_string());
    }

    pub fn set_iteration_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().iteration_unavailable = unavailable;
    }

    pub fn build(&self, slug: &str, run_id: &str, component: &str) -> Option<MockBuild> {
        let key = (Self::iteration_id(slug, run_id), component.to_string());
        self.state.lock().unwrap().builds.get(&key).cloned()
    }

    pub fn iteration_calls(&self) -> usize {
        self.iteration_calls.load(Ordering::SeqCst)
    }

    pub fn build_calls(&self) -> usize {
        self.build_calls.load(Ordering::SeqCst)
    }

    fn find_build<R>(&self, build_id: &str, f: impl FnOnce(&mut MockBuild) -> R) -> Result<R, ClientError> {
        let mut state = self.state.lock().unwrap();
        state
            .builds
            .values_mut()
            .find(|build| build.id == build_id)
            .map(f)
            .ok_or_else(|| ClientError::NotFound(build_id.to_string()))
    }
}

#[async_trait]
impl RegistryService for MockRegistry {
    async fn create_or_get_iteration(
        &self,
        bucket_slug: &str,
        run_id: &str,
    ) -> Result<IterationHandle, ClientError> {
        self.iteration_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let mut state = self.state.lock().unwrap();
        if state.iteration_unavailable {
            return Err(ClientError::api_error(503, "registry unavailable"));
        }

        let key = (bucket_slug.to_string(), run_id.to_string());
        let already_existed = state.iterations.contains_key(&key);
        let id = state
            .iterations
            .entry(key)
            .or_insert_with(|| Self::iteration_id(bucket_slug, run_id))
            .clone();

        Ok(IterationHandle {
            id,
            already_existed,
        })
    }

    async fn create_or_get_build(
        &self,
        iteration_id: &str,
        component_type: &str,
        _run_uuid: Uuid,
    ) -> Result<BuildHandle, ClientError> {
        self.build_calls.fetch_add(1, Ordering::SeqCst);

        let hang = self.state.lock().unwrap().hanging.contains(component_type);
        if hang {
            std::future::pending::<()>().await;
        }
        tokio::task::yield_now().await;

        let mut state = self.state.lock().unwrap();
        if state.failing.contains(component_type) {
            return Err(ClientError::api_error(500, "internal error"));
        }

        let key = (iteration_id.to_string(), component_type.to_string());
        let already_existed = state.builds.contains_key(&key);
        let build = state.builds.entry(key).or_insert_with(|| MockBuild {
            id: Self::build_id(iteration_id, component_type),
            ..MockBuild::default()
        });

        Ok(BuildHandle {
            id: build.id.clone(),
            already_existed,
        })
    }

    async fn get_build_status(&self, build_id: &str) -> Result<BuildStatus, ClientError> {
        self.find_build(build_id, |build| BuildStatus {
            done: build.done,
            labels: build.labels.clone(),
            updated_at: None,
        })
    }

    async fn update_build_labels(&self, build_id: &str, labels: &Labels) -> Result<(), ClientError> {
        self.find_build(build_id, |build| build.labels = labels.clone())
    }

    async fn complete_build(&self, build_id: &str) -> Result<(), ClientError> {
        self.find_build(build_id, |build| build.done = true)
    }
}
