use crate::loader::{CatalogLoader, LoadReport, LoaderConfig};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::info;
use tunematch_core::{Catalog, Error, Result};
use tunematch_similarity::{Recommendation, RecommendationCache, RecommendationEngine};

/// One immutable catalog together with its precomputed engine
#[derive(Debug)]
pub struct CatalogSnapshot {
    pub engine: RecommendationEngine,
    pub report: Option<LoadReport>,
    pub loaded_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    fn build(catalog: Catalog, report: Option<LoadReport>) -> Result<Self> {
        Ok(Self {
            engine: RecommendationEngine::new(Arc::new(catalog))?,
            report,
            loaded_at: Utc::now(),
        })
    }

    pub fn version(&self) -> u64 {
        self.engine.catalog().version()
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        self.engine.catalog()
    }
}

/// Holds the current catalog snapshot and swaps it atomically on reload
///
/// Readers clone the `Arc` and keep using their snapshot even while a
/// reload installs a newer one.
pub struct CatalogStore {
    current: RwLock<Arc<CatalogSnapshot>>,
    loader: Option<CatalogLoader>,
    cache: RecommendationCache,
    reload_lock: Mutex<()>,
}

impl CatalogStore {
    /// Load the configured CSV and build the first snapshot
    pub fn open(config: LoaderConfig) -> Result<Self> {
        let loader = CatalogLoader::new(config);
        let (catalog, report) = loader.load()?;
        let snapshot = CatalogSnapshot::build(catalog, Some(report))?;
        info!("Catalog store opened at version {}", snapshot.version());
        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
            loader: Some(loader),
            cache: RecommendationCache::default(),
            reload_lock: Mutex::new(()),
        })
    }

    /// Store over an in-memory catalog; [`reload`](Self::reload) is unavailable
    pub fn from_catalog(catalog: Catalog) -> Result<Self> {
        let snapshot = CatalogSnapshot::build(catalog, None)?;
        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
            loader: None,
            cache: RecommendationCache::default(),
            reload_lock: Mutex::new(()),
        })
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.current.read().version()
    }

    pub fn cache(&self) -> &RecommendationCache {
        &self.cache
    }

    /// Re-read the configured CSV and install it; returns the new version
    pub fn reload(&self) -> Result<u64> {
        let loader = self.loader.as_ref().ok_or_else(|| {
            Error::InvalidConfig("catalog store has no CSV source to reload".to_string())
        })?;
        let _guard = self.reload_lock.lock();
        let (catalog, report) = loader.load()?;
        self.install(CatalogSnapshot::build(catalog, Some(report))?)
    }

    /// Install an in-memory catalog; returns the new version
    pub fn replace(&self, catalog: Catalog) -> Result<u64> {
        let _guard = self.reload_lock.lock();
        self.install(CatalogSnapshot::build(catalog, None)?)
    }

    fn install(&self, snapshot: CatalogSnapshot) -> Result<u64> {
        let version = snapshot.version();
        let previous = {
            let mut current = self.current.write();
            if version <= current.version() {
                return Err(Error::InvalidConfig(format!(
                    "catalog version {} is not newer than the installed version {}",
                    version,
                    current.version()
                )));
            }
            std::mem::replace(&mut *current, Arc::new(snapshot))
        };
        self.cache.retain_version(version);
        info!(
            "Catalog reloaded: version {} -> {} ({} songs)",
            previous.version(),
            version,
            self.snapshot().catalog().len()
        );
        Ok(version)
    }

    /// Recommendations from the current snapshot, served through the cache
    pub fn recommend(&self, song_id: &str, count: usize) -> Result<Arc<Vec<Recommendation>>> {
        self.recommend_from(&self.snapshot(), song_id, count)
    }

    fn recommend_from(
        &self,
        snapshot: &CatalogSnapshot,
        song_id: &str,
        count: usize,
    ) -> Result<Arc<Vec<Recommendation>>> {
        let results = self.cache.get_or_compute(&snapshot.engine, song_id, count)?;
        // a reload may have landed while computing; drop what was cached for the old catalog
        let current = self.version();
        if current != snapshot.version() {
            self.cache.retain_version(current);
        }
        Ok(results)
    }
}
