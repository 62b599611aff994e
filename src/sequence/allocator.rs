use log::{debug, error, warn};
use std::time::Duration;

use super::error::{AllocateError, StoreError};
use super::format::{CodeFormat, KindRegistry};
use super::store::CounterStore;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total tries per allocation, including the first.
    pub max_attempts: u32,
    /// Sleep before retry `n` is `backoff * n`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_millis(10),
        }
    }
}

/// Hands out the next code for an entity kind.
///
/// The allocator keeps no counter state of its own; each call goes to the
/// store, so several processes can share one database safely.
///
/// Store calls are never cancelled from this side. Dropping an in-flight
/// increment could lose a value the store already committed, so time limits
/// belong to the store, which must roll back whatever it reports as failed.
pub struct SequenceAllocator<S> {
    store: S,
    registry: KindRegistry,
    retry: RetryPolicy,
}

impl<S: CounterStore> SequenceAllocator<S> {
    pub fn new(store: S, registry: KindRegistry, retry: RetryPolicy) -> Self {
        Self {
            store,
            registry,
            retry,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    /// Returns the next code for `kind`, e.g. `BRD007`.
    ///
    /// A returned code is consumed even if the caller never persists it;
    /// codes are never handed out twice.
    pub async fn allocate(&self, kind: &str) -> Result<String, AllocateError> {
        let format = self
            .registry
            .get(kind)
            .ok_or_else(|| AllocateError::UnknownEntityKind(kind.to_string()))?;

        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.next_value(kind, format).await {
                Ok(value) => {
                    let code = format.render(value);
                    debug!("Allocated {} for {} (attempt {})", code, kind, attempt);
                    return Ok(code);
                }
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    warn!(
                        "Sequence store call for {} failed (attempt {}/{}): {}",
                        kind, attempt, max_attempts, err
                    );
                    tokio::time::sleep(self.retry.backoff * attempt).await;
                }
                Err(err) => {
                    error!(
                        "Giving up allocating a {} code after {} attempt(s): {}",
                        kind, attempt, err
                    );
                    return Err(AllocateError::StoreUnavailable {
                        kind: kind.to_string(),
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }

    async fn next_value(&self, kind: &str, format: &CodeFormat) -> Result<i64, StoreError> {
        if let Some(value) = self.store.increment(kind).await? {
            return Ok(value);
        }

        // First use of this kind. Whoever loses the create race just moves on
        // to the increment like the winner does.
        match self.store.create(kind, &format.prefix, format.width).await {
            Ok(()) => debug!("Created sequence counter for {}", kind),
            Err(StoreError::AlreadyExists) => {
                debug!("Sequence counter for {} created concurrently", kind)
            }
            Err(err) => return Err(err),
        }

        self.store
            .increment(kind)
            .await?
            .ok_or_else(|| StoreError::Backend(format!("counter for {} missing after creation", kind)))
    }
}
