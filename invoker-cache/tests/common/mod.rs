//! Hand-written fakes shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use invoker_cache::{
    CacheCoordinator, CacheError, CascadeConfig, CascadeOrchestrator, InMemorySharedCache,
    LocalCache, LocalCacheConfig, ManualClock, Result, ResultSet, ScoreResult, ScoreSource,
    SharedCache, ViewerId,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn viewer(id: &str) -> ViewerId {
    ViewerId::parse(id).unwrap()
}

pub fn result_set(pairs: &[(&str, i64)]) -> ResultSet {
    let scores = pairs
        .iter()
        .map(|(name, value)| ScoreResult::new(*name, *value).unwrap())
        .collect::<Vec<_>>();
    ResultSet::try_from(scores).unwrap()
}

/// What a fake source does when called
#[derive(Debug, Clone)]
pub enum Behavior {
    Value(i64),
    Fail,
    Hang,
    Delayed(Duration, i64),
    Mislabelled(&'static str),
}

pub struct FakeSource {
    name: String,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(name: &str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreSource for FakeSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, _viewer: &ViewerId) -> Result<ScoreResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            Behavior::Value(value) => ScoreResult::new(self.name.clone(), *value),
            Behavior::Fail => Err(CacheError::SourceFailed {
                source_name: self.name.clone(),
                reason: "status 500".to_string(),
            }),
            Behavior::Hang => std::future::pending().await,
            Behavior::Delayed(delay, value) => {
                tokio::time::sleep(*delay).await;
                ScoreResult::new(self.name.clone(), *value)
            }
            Behavior::Mislabelled(other) => ScoreResult::new(*other, 1),
        }
    }
}

pub fn as_sources(fakes: &[Arc<FakeSource>]) -> Vec<Arc<dyn ScoreSource>> {
    fakes
        .iter()
        .map(|f| Arc::clone(f) as Arc<dyn ScoreSource>)
        .collect()
}

pub fn total_calls(fakes: &[Arc<FakeSource>]) -> usize {
    fakes.iter().map(|f| f.calls()).sum()
}

/// Shared tier that counts calls and can be told to fail
#[derive(Default)]
pub struct CountingSharedCache {
    pub inner: InMemorySharedCache,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl CountingSharedCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_reads: true,
            fail_writes: true,
            ..Default::default()
        })
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    /// Seed a raw value without counting it as a write
    pub async fn seed(&self, key: &str, value: &str) {
        self.inner.set(key, value.to_string()).await.unwrap();
    }

    pub async fn stored(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.unwrap()
    }
}

#[async_trait]
impl SharedCache for CountingSharedCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(CacheError::SharedCache("connection refused".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(CacheError::SharedCache("connection refused".to_string()));
        }
        self.inner.set(key, value).await
    }

    fn backend(&self) -> &'static str {
        "counting"
    }
}

/// Coordinator over fakes, with a manual clock driving local expiry
pub struct Harness {
    pub coordinator: CacheCoordinator,
    pub shared: Arc<CountingSharedCache>,
    pub sources: Vec<Arc<FakeSource>>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(sources: Vec<Arc<FakeSource>>, shared: Arc<CountingSharedCache>) -> Self {
        Self::with_local(sources, shared, 3, Duration::from_secs(10))
    }

    pub fn with_local(
        sources: Vec<Arc<FakeSource>>,
        shared: Arc<CountingSharedCache>,
        max_size: usize,
        ttl: Duration,
    ) -> Self {
        let clock = Arc::new(ManualClock::new());
        let local = LocalCache::with_clock(
            LocalCacheConfig::builder().max_size(max_size).ttl(ttl).build(),
            clock.clone(),
        )
        .unwrap();
        let cascade = CascadeOrchestrator::new(
            as_sources(&sources),
            CascadeConfig {
                call_timeout: Duration::from_millis(500),
                deadline: None,
            },
        )
        .unwrap();

        let coordinator = CacheCoordinator::new(local, shared.clone(), cascade);

        Self {
            coordinator,
            shared,
            sources,
            clock,
        }
    }

    pub fn source_calls(&self) -> usize {
        total_calls(&self.sources)
    }
}
