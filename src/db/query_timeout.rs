// Database query timeout protection
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

pub struct QueryTimeout;

impl QueryTimeout {
    /// Runs a query future, failing with an I/O timeout error when it
    /// does not finish within `timeout_duration`.
    pub async fn run<F, T>(timeout_duration: Duration, query_fn: F) -> Result<T, sqlx::Error>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match timeout(timeout_duration, query_fn).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("Query timed out after {:?}", timeout_duration);
                Err(sqlx::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("Query timed out after {:?}", timeout_duration),
                )))
            }
        }
    }

    /// Longer timeout for earnings/revenue aggregation and reconciliation scans (30 seconds)
    pub const AGGREGATION_TIMEOUT: Duration = Duration::from_secs(30);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completed_query_passes_through() {
        let result = QueryTimeout::run(Duration::from_millis(50), async { Ok::<_, sqlx::Error>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_slow_query_times_out() {
        let result: Result<i32, sqlx::Error> = QueryTimeout::run(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(1)
        })
        .await;

        match result {
            Err(sqlx::Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::TimedOut),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
