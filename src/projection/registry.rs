use super::{SpatialReference, SpatialReferenceOptions};
use crate::{core::constants::REFERENCE_CACHE_CAPACITY, Result};
use lru::LruCache;
use once_cell::sync::Lazy;
use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex},
};

/// Process-wide cache of built references keyed by their serialized options.
///
/// Handing out the same `Arc` for equal options lets callers compare
/// references by pointer before falling back to a structural comparison.
static REFERENCES: Lazy<Mutex<LruCache<String, Arc<SpatialReference>>>> = Lazy::new(|| {
    let capacity = NonZeroUsize::new(REFERENCE_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
    Mutex::new(LruCache::new(capacity))
});

/// Returns the shared reference for `options`, building it on first use
pub fn reference_for(options: &SpatialReferenceOptions) -> Result<Arc<SpatialReference>> {
    let key = serde_json::to_string(options)?;

    if let Ok(mut cache) = REFERENCES.lock() {
        if let Some(reference) = cache.get(&key) {
            return Ok(reference.clone());
        }
    }

    let reference = Arc::new(SpatialReference::from_options(options)?);

    #[cfg(feature = "debug")]
    log::debug!("built spatial reference {}", reference.projection().code());

    if let Ok(mut cache) = REFERENCES.lock() {
        cache.put(key, reference.clone());
    }
    Ok(reference)
}
