//! Process-wide memoization of dataset loads

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::config::{DashboardConfig, SourceConfig};
use crate::error::Result;

use super::{CityCoordinates, Dataset};

/// Serialized source settings and coordinate table
type CacheKey = String;

static DATASET_CACHE: OnceLock<Mutex<HashMap<CacheKey, Arc<Dataset>>>> = OnceLock::new();

fn cache() -> &'static Mutex<HashMap<CacheKey, Arc<Dataset>>> {
    DATASET_CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Every setting that changes what `Dataset::load` returns
fn cache_key(config: &DashboardConfig) -> Result<CacheKey> {
    let source = SourceConfig {
        path: config.source.path.canonicalize()?,
        ..config.source.clone()
    };
    Ok(serde_json::to_string(&(&source, &config.coordinates))?)
}

/// Load the configured dataset once per process and share it afterwards.
///
/// Entries are keyed by the whole `[source]` section, with the path made
/// canonical, plus the coordinate table. Two configs that differ only in
/// `row_cap` or the column block get separate entries.
pub fn load_cached(config: &DashboardConfig) -> Result<Arc<Dataset>> {
    let source = &config.source;
    let key = cache_key(config)?;

    if let Some(dataset) = cache()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(&key)
    {
        log::debug!("dataset cache hit for {}", source.path.display());
        return Ok(Arc::clone(dataset));
    }

    // Loading happens outside the lock; a concurrent loader of the same key
    // simply loses the insert race.
    let dataset = Arc::new(Dataset::load(source, &CityCoordinates::from_config(config))?);
    let mut guard = cache().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let entry = guard.entry(key).or_insert(dataset);
    Ok(Arc::clone(entry))
}

/// Drop every cached dataset
pub fn clear_cache() {
    cache()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clear();
}
