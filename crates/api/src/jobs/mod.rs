//! Background job scheduler and job implementations.

mod pool_metrics;
mod prune_login_limiter;
mod purge_deleted_tickets;
mod scheduler;

pub use pool_metrics::PoolMetricsJob;
pub use prune_login_limiter::PruneLoginLimiterJob;
pub use purge_deleted_tickets::{PurgeDeletedTicketsJob, PurgeError};
pub use scheduler::{Job, JobFrequency, JobScheduler};
