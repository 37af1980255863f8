//! Command store metrics.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record the duration of one command store statement.
pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!(
        "command_store_query_duration_seconds",
        "query" => query_name
    )
    .record(duration_secs);
}

/// Record connection pool gauges. Called on every metrics scrape.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("command_store_connections_active").set(active as f64);
    gauge!("command_store_connections_idle").set(idle as f64);
    gauge!("command_store_connections_total").set(size as f64);
}

/// Times a statement from creation until [`QueryTimer::record`].
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}
