//! Query timing and pool metrics.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record one query's duration under its repository-level name.
pub fn record_query_duration(query_name: &str, duration_secs: f64) {
    histogram!(
        "eventhub_db_query_duration_seconds",
        "query" => query_name.to_string()
    )
    .record(duration_secs);
}

/// Snapshot the connection pool gauges.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("eventhub_db_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("eventhub_db_connections_idle").set(idle as f64);
    gauge!("eventhub_db_connections_total").set(size as f64);
}

/// Times one repository query and records it on `record()`.
///
/// ```ignore
/// let timer = QueryTimer::new("find_event_by_id");
/// let result = sqlx::query_as::<_, EventEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: String,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: impl Into<String>) -> Self {
        Self {
            query_name: query_name.into(),
            start: Instant::now(),
        }
    }

    /// Record the elapsed duration. A timer that is dropped without
    /// `record()` (error path) reports nothing.
    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_query_duration(&self.query_name, duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_keeps_name() {
        let timer = QueryTimer::new("test_query");
        assert_eq!(timer.query_name, "test_query");
    }

    #[test]
    fn test_query_timer_accepts_owned_name() {
        let timer = QueryTimer::new(String::from("owned_query"));
        assert_eq!(timer.query_name, "owned_query");
    }
}
