//! Drops idle entries from the login rate limiter.

use std::sync::Arc;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::RateLimiterState;

pub struct PruneLoginLimiterJob {
    limiter: Arc<RateLimiterState>,
}

impl PruneLoginLimiterJob {
    pub fn new(limiter: Arc<RateLimiterState>) -> Self {
        Self { limiter }
    }
}

#[async_trait::async_trait]
impl Job for PruneLoginLimiterJob {
    fn name(&self) -> &'static str {
        "prune_login_limiter"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(5)
    }

    async fn execute(&self) -> Result<(), String> {
        self.limiter.prune();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prune_runs() {
        let limiter = Arc::new(RateLimiterState::new(5).unwrap());
        limiter.check("10.0.0.1").unwrap();

        let job = PruneLoginLimiterJob::new(limiter);
        assert_eq!(job.frequency(), JobFrequency::Minutes(5));
        assert!(job.execute().await.is_ok());
    }
}
