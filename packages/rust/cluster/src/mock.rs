//! Mock object source for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use peanut_shared::{PeanutError, Result};

use crate::{ObjectSource, WorkloadList};

/// Returns the same list on every call, or fails with a cluster error.
#[derive(Debug)]
pub struct MockSource {
    list: WorkloadList,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockSource {
    /// A source that always returns `list`.
    pub fn new(list: WorkloadList) -> Self {
        Self {
            list,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A source whose every list call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            list: WorkloadList::Manifests(Vec::new()),
            failure: Some(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times [`ObjectSource::list`] has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ObjectSource for MockSource {
    async fn list(&self) -> Result<WorkloadList> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match &self.failure {
            Some(message) => Err(PeanutError::Cluster(message.clone())),
            None => Ok(self.list.clone()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
