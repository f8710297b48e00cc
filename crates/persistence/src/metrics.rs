//! Ticket store query and pool metrics.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

fn outcome_label<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "error"
    }
}

/// Record connection pool gauges. Called periodically by the pool metrics job.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("ticket_store_pool_connections", "state" => "active").set(active as f64);
    gauge!("ticket_store_pool_connections", "state" => "idle").set(idle as f64);
    gauge!("ticket_store_pool_size").set(size as f64);
}

/// Times one store query and records it with its outcome.
///
/// ```ignore
/// let timer = QueryTimer::new("find_ticket_by_id");
/// let result = sqlx::query_as::<_, TicketEntity>(...).fetch_optional(&pool).await;
/// timer.finish(&result);
/// ```
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    pub fn finish<T, E>(self, result: &Result<T, E>) {
        let outcome = outcome_label(result);
        histogram!(
            "ticket_store_query_duration_seconds",
            "query" => self.query,
            "outcome" => outcome
        )
        .record(self.start.elapsed().as_secs_f64());

        if result.is_err() {
            counter!("ticket_store_query_errors_total", "query" => self.query).increment(1);
        }
    }
}
