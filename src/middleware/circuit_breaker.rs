use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{warn, info, debug};

use crate::constants::{DEFAULT_SEARCH_COOLDOWN_SECS, DEFAULT_SEARCH_FAILURE_THRESHOLD};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitState {
    Closed,    // Normal operation
    Open,      // Circuit is open, failing fast
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,     // Consecutive failures to open circuit
    pub timeout: Duration,          // Cool-down before calls are let through again
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_SEARCH_FAILURE_THRESHOLD,
            timeout: Duration::from_secs(DEFAULT_SEARCH_COOLDOWN_SECS),
        }
    }
}

pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    state: RwLock<CircuitState>,
    opened_at: RwLock<Option<Instant>>,
    failure_count: AtomicU32,
    total_requests: AtomicU32,
    total_failures: AtomicU32,
    total_rejected: AtomicU32,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let name = name.into();
        info!("Circuit breaker '{}' initialized with config: {:?}", name, config);

        Self {
            name,
            config,
            state: RwLock::new(CircuitState::Closed),
            opened_at: RwLock::new(None),
            failure_count: AtomicU32::new(0),
            total_requests: AtomicU32::new(0),
            total_failures: AtomicU32::new(0),
            total_rejected: AtomicU32::new(0),
        }
    }

    /// Run `operation` unless the circuit is open. A rejected call never polls the future.
    pub async fn execute<F, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: std::future::Future<Output = Result<T, E>>,
    {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        self.check_timeout().await;

        if *self.state.read().await == CircuitState::Open {
            debug!("Circuit breaker '{}' is OPEN - failing fast", self.name);
            self.total_rejected.fetch_add(1, Ordering::Relaxed);
            return Err(CircuitBreakerError::CircuitOpen);
        }

        match operation.await {
            Ok(result) => {
                self.failure_count.store(0, Ordering::Relaxed);
                Ok(result)
            }
            Err(error) => {
                self.on_failure().await;
                Err(CircuitBreakerError::OperationFailed(error))
            }
        }
    }

    /// An expired cool-down closes the circuit with a fresh failure count,
    /// so it takes another `failure_threshold` failures to open it again.
    async fn check_timeout(&self) {
        let mut state = self.state.write().await;
        if *state != CircuitState::Open {
            return;
        }

        let elapsed = match *self.opened_at.read().await {
            Some(opened_at) => opened_at.elapsed(),
            None => self.config.timeout,
        };

        if elapsed >= self.config.timeout {
            info!("Circuit breaker '{}' cool-down expired, transitioning to CLOSED", self.name);
            *state = CircuitState::Closed;
            *self.opened_at.write().await = None;
            self.failure_count.store(0, Ordering::Relaxed);
        }
    }

    async fn on_failure(&self) {
        self.total_failures.fetch_add(1, Ordering::Relaxed);

        let mut state = self.state.write().await;
        if *state == CircuitState::Open {
            return;
        }

        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.config.failure_threshold {
            warn!("Circuit breaker '{}' transitioning to OPEN after {} failures",
                  self.name, failures);
            *state = CircuitState::Open;
            *self.opened_at.write().await = Some(Instant::now());
        }
    }

    /// Get current circuit breaker state
    pub async fn state(&self) -> CircuitState {
        *self.state.read().await
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Get circuit breaker metrics
    pub async fn metrics(&self) -> CircuitBreakerMetrics {
        let requests = self.total_requests.load(Ordering::Relaxed);
        let failures = self.total_failures.load(Ordering::Relaxed);

        CircuitBreakerMetrics {
            name: self.name.clone(),
            state: *self.state.read().await,
            total_requests: requests,
            total_failures: failures,
            total_rejected: self.total_rejected.load(Ordering::Relaxed),
            failure_rate: if requests > 0 {
                (failures as f64 / requests as f64) * 100.0
            } else {
                0.0
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerMetrics {
    pub name: String,
    pub state: CircuitState,
    pub total_requests: u32,
    pub total_failures: u32,
    pub total_rejected: u32,
    pub failure_rate: f64,
}

#[derive(Debug)]
pub enum CircuitBreakerError<E> {
    CircuitOpen,
    OperationFailed(E),
}

impl<E: std::fmt::Display> std::fmt::Display for CircuitBreakerError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitBreakerError::CircuitOpen => write!(f, "Circuit breaker is open"),
            CircuitBreakerError::OperationFailed(e) => write!(f, "Operation failed: {}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for CircuitBreakerError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CircuitBreakerError::CircuitOpen => None,
            CircuitBreakerError::OperationFailed(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new("test", CircuitBreakerConfig::default())
    }

    async fn fail(breaker: &CircuitBreaker) -> Result<(), CircuitBreakerError<&'static str>> {
        breaker.execute(async { Err::<(), _>("boom") }).await
    }

    #[tokio::test(start_paused = true)]
    async fn test_opens_after_three_failures() {
        let breaker = breaker();

        for _ in 0..2 {
            assert!(matches!(fail(&breaker).await, Err(CircuitBreakerError::OperationFailed(_))));
            assert_eq!(breaker.state().await, CircuitState::Closed);
        }
        assert!(fail(&breaker).await.is_err());
        assert_eq!(breaker.state().await, CircuitState::Open);

        let calls = AtomicUsize::new(0);
        let result = breaker
            .execute(async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &str>(())
            })
            .await;
        assert!(matches!(result, Err(CircuitBreakerError::CircuitOpen)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cooldown_closes_circuit() {
        let breaker = breaker();
        for _ in 0..3 {
            let _ = fail(&breaker).await;
        }

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(matches!(fail(&breaker).await, Err(CircuitBreakerError::CircuitOpen)));

        tokio::time::advance(Duration::from_secs(2)).await;
        let result = breaker.execute(async { Ok::<_, &str>(42) }).await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(breaker.state().await, CircuitState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopening_needs_full_threshold_after_cooldown() {
        let breaker = breaker();
        for _ in 0..3 {
            let _ = fail(&breaker).await;
        }

        tokio::time::advance(Duration::from_secs(30)).await;
        for _ in 0..2 {
            assert!(matches!(fail(&breaker).await, Err(CircuitBreakerError::OperationFailed(_))));
            assert_eq!(breaker.state().await, CircuitState::Closed);
        }
        assert!(matches!(fail(&breaker).await, Err(CircuitBreakerError::OperationFailed(_))));
        assert_eq!(breaker.state().await, CircuitState::Open);
        assert!(matches!(fail(&breaker).await, Err(CircuitBreakerError::CircuitOpen)));
    }

    #[tokio::test]
    async fn test_success_resets_failure_count() {
        let breaker = breaker();
        let _ = fail(&breaker).await;
        let _ = fail(&breaker).await;
        assert_eq!(breaker.consecutive_failures(), 2);

        breaker.execute(async { Ok::<_, &str>(()) }).await.unwrap();
        assert_eq!(breaker.consecutive_failures(), 0);

        let _ = fail(&breaker).await;
        assert_eq!(breaker.state().await, CircuitState::Closed);

        let metrics = breaker.metrics().await;
        assert_eq!(metrics.total_requests, 4);
        assert_eq!(metrics.total_failures, 3);
    }
}
