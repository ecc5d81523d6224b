//! Latency-adaptive dispatch of chunks across a provider pool.
//!
//! Each pooled backend carries an exponential moving average of observed
//! latency, seeded at 1.0 seconds. A chunk task waits for a free backend,
//! takes the free one with the lowest EMA, and issues the call under a
//! fixed timeout. Success blends the observed latency into the EMA
//! (`0.7 * old + 0.3 * elapsed`); failure or timeout adds a flat 2.0
//! penalty, so flaky backends sink in the ranking until a retried call
//! succeeds and pulls the EMA back down. A chunk that keeps failing is
//! abandoned after its retry budget, which fails the whole batch call.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore};
use tokio::time::{Instant, timeout};
use tracing::{debug, warn};

use crate::error::{EmbedPoolError, Result};
use crate::provider::EmbeddingProvider;

/// EMA starting value for a freshly registered backend, in seconds.
const EMA_SEED: f64 = 1.0;
/// Weight of the previous EMA in the success blend.
const EMA_RETAIN: f64 = 0.7;
/// Weight of the observed latency in the success blend.
const EMA_BLEND: f64 = 0.3;
/// Flat addition to the EMA on a failed or timed-out attempt.
const FAILURE_PENALTY: f64 = 2.0;

/// Per-backend scheduling state.
#[derive(Debug, Clone, Copy)]
pub struct BackendState {
    /// Rolling average latency in seconds.
    pub ema_latency: f64,
    /// Whether another chunk's call is currently in flight on this backend.
    pub occupied: bool,
}

impl BackendState {
    fn new() -> Self {
        Self {
            ema_latency: EMA_SEED,
            occupied: false,
        }
    }
}

/// Assigns chunks of texts to the least-latent free backend, with bounded
/// retries.
///
/// The state table and the free-slot accounting are shared by every chunk
/// task running concurrently for one batch call; a mutex serializes the
/// read-modify-write of scheduling decisions while the provider I/O itself
/// overlaps.
#[derive(Debug)]
pub struct LatencyScheduler {
    states: Mutex<Vec<BackendState>>,
    free_slots: Semaphore,
    request_timeout: Duration,
    try_count_limit: usize,
}

impl LatencyScheduler {
    /// Create a scheduler for a pool of `backend_count` backends.
    #[must_use]
    pub fn new(backend_count: usize, request_timeout: Duration, try_count_limit: usize) -> Self {
        Self {
            states: Mutex::new(vec![BackendState::new(); backend_count]),
            free_slots: Semaphore::new(backend_count),
            request_timeout,
            try_count_limit,
        }
    }

    /// Grow the state table by one backend; called when a provider is
    /// admitted into the group.
    pub async fn register_backend(&self) {
        self.states.lock().await.push(BackendState::new());
        self.free_slots.add_permits(1);
    }

    /// Current per-backend state, for logging and inspection.
    pub async fn snapshot(&self) -> Vec<BackendState> {
        self.states.lock().await.clone()
    }

    /// Embed one chunk, retrying across backends until it succeeds or the
    /// retry budget is exhausted.
    ///
    /// `providers` is the pool snapshot the calling batch operates on; the
    /// scheduler only selects indices below its length.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedPoolError::RetryLimitExceeded`] once the chunk has
    /// failed more than `try_count_limit` times. Individual attempt
    /// failures and timeouts are recovered internally.
    pub async fn dispatch(
        &self,
        providers: &[Arc<dyn EmbeddingProvider>],
        chunk: &[String],
    ) -> Result<Vec<Vec<f32>>> {
        let mut attempts = 0_usize;
        loop {
            let index = self.acquire(providers.len()).await?;
            let provider = Arc::clone(&providers[index]);
            let started = Instant::now();

            match timeout(self.request_timeout, provider.embed_batch(chunk)).await {
                Ok(Ok(embeddings)) => {
                    let elapsed = started.elapsed();
                    self.release_success(index, elapsed).await;
                    debug!(
                        provider = provider.provider_name(),
                        items = chunk.len(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "chunk embedded"
                    );
                    return Ok(embeddings);
                }
                Ok(Err(err)) => {
                    self.release_failure(index).await;
                    warn!(
                        provider = provider.provider_name(),
                        %err,
                        "dispatch attempt failed, penalizing backend"
                    );
                }
                Err(_) => {
                    self.release_failure(index).await;
                    warn!(
                        provider = provider.provider_name(),
                        timeout_s = self.request_timeout.as_secs(),
                        "dispatch attempt timed out, penalizing backend"
                    );
                }
            }

            attempts += 1;
            if attempts > self.try_count_limit {
                return Err(EmbedPoolError::RetryLimitExceeded { attempts });
            }
        }
    }

    /// Wait for a free backend among the first `limit` and mark the one
    /// with the lowest EMA as occupied.
    async fn acquire(&self, limit: usize) -> Result<usize> {
        loop {
            let permit = self
                .free_slots
                .acquire()
                .await
                .map_err(|_| EmbedPoolError::internal("scheduler slot semaphore closed"))?;
            permit.forget();

            let mut states = self.states.lock().await;
            let candidate = states
                .iter()
                .enumerate()
                .take(limit)
                .filter(|(_, state)| !state.occupied)
                .min_by(|a, b| {
                    a.1.ema_latency
                        .partial_cmp(&b.1.ema_latency)
                        .unwrap_or(Ordering::Equal)
                })
                .map(|(index, _)| index);

            match candidate {
                Some(index) => {
                    states[index].occupied = true;
                    return Ok(index);
                }
                None => {
                    // The free slot belongs to a backend admitted after the
                    // caller took its pool snapshot. Hand it back and wait.
                    drop(states);
                    self.free_slots.add_permits(1);
                    tokio::task::yield_now().await;
                }
            }
        }
    }

    async fn release_success(&self, index: usize, elapsed: Duration) {
        let mut states = self.states.lock().await;
        let state = &mut states[index];
        state.ema_latency = EMA_RETAIN * state.ema_latency + EMA_BLEND * elapsed.as_secs_f64();
        state.occupied = false;
        drop(states);
        self.free_slots.add_permits(1);
    }

    async fn release_failure(&self, index: usize) {
        let mut states = self.states.lock().await;
        let state = &mut states[index];
        state.ema_latency += FAILURE_PENALTY;
        state.occupied = false;
        drop(states);
        self.free_slots.add_permits(1);
    }
}
