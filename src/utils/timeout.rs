use std::future::Future;
use std::time::Duration;
use anyhow::Result;
use thiserror::Error;
use tokio::time::timeout;
use tracing::error;

/// Raised when an operation does not settle within its budget.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Operation '{operation}' timed out after {} ms", .duration.as_millis())]
pub struct OperationTimeout {
    pub operation: String,
    pub duration: Duration,
}

/// Race a future against a timer. The future is dropped when the timer wins.
pub async fn with_timeout<F, T>(
    future: F,
    duration: Duration,
    operation_name: &str,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => {
            error!("Operation '{}' timed out after {:?}", operation_name, duration);
            Err(OperationTimeout {
                operation: operation_name.to_string(),
                duration,
            }
            .into())
        }
    }
}

/// True when the error chain contains an [`OperationTimeout`].
pub fn is_timeout(error: &anyhow::Error) -> bool {
    error.downcast_ref::<OperationTimeout>().is_some()
}
