use std::sync::Arc;

use gatehouse_core::{AppError, AppResult};

use crate::{CacheStore, PERMISSIONS_VERSION_KEY};

const DEFAULT_GENERATION: u64 = 1;

/// Process-shared cache generation counter backed by the cache store.
///
/// The counter only moves through the store's atomic increment.
#[derive(Clone)]
pub struct CacheGeneration {
    store: Arc<dyn CacheStore>,
}

impl CacheGeneration {
    /// Creates a generation counter over a cache store.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Returns the current generation, 1 when the counter was never bumped.
    pub async fn current(&self) -> AppResult<u64> {
        let Some(raw) = self.store.get(PERMISSIONS_VERSION_KEY).await? else {
            return Ok(DEFAULT_GENERATION);
        };

        raw.trim().parse::<u64>().map_err(|error| {
            AppError::Internal(format!(
                "invalid permissions version value '{raw}': {error}"
            ))
        })
    }

    /// Advances the generation and returns the new value.
    ///
    /// An absent counter reads as 1 but increments to 1, so in that case the
    /// counter is incremented a second time. The returned generation is
    /// therefore always newer than any value a reader could have seen.
    pub async fn bump(&self) -> AppResult<u64> {
        let mut value = self.store.increment(PERMISSIONS_VERSION_KEY).await?;
        if value <= DEFAULT_GENERATION as i64 {
            value = self.store.increment(PERMISSIONS_VERSION_KEY).await?;
        }

        u64::try_from(value).map_err(|error| {
            AppError::Internal(format!(
                "permissions version counter is negative ({value}): {error}"
            ))
        })
    }
}
