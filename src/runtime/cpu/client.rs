//! CPU client: launch configuration and thread pool

use super::launch::LaunchConfig;
use crate::error::Result;
#[cfg(feature = "rayon")]
use crate::error::Error;
#[cfg(feature = "rayon")]
use std::sync::Arc;

/// CPU client for operation dispatch
///
/// Holds the [`LaunchConfig`] used to tile every launch and, optionally, a
/// dedicated rayon pool. Without a dedicated pool, launches run on rayon's
/// global pool.
#[derive(Clone, Debug, Default)]
pub struct CpuClient {
    config: LaunchConfig,
    #[cfg(feature = "rayon")]
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl CpuClient {
    /// Create a new CPU client with the default launch configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a CPU client with a custom launch configuration
    pub fn with_config(config: LaunchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Run launches from this client on a dedicated pool of `num_threads` workers
    #[cfg(feature = "rayon")]
    pub fn with_num_threads(mut self, num_threads: usize) -> Result<Self> {
        if num_threads == 0 {
            return Err(Error::invalid_argument(
                "num_threads",
                "thread pool requires at least one thread",
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("dwconv1d-{}", i))
            .build()
            .map_err(|e| Error::Backend(format!("failed to build thread pool: {}", e)))?;
        self.pool = Some(Arc::new(pool));
        Ok(self)
    }

    /// Launch configuration used for every operation on this client
    #[inline]
    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Number of worker threads launches will be spread over
    pub fn num_threads(&self) -> usize {
        #[cfg(feature = "rayon")]
        {
            match &self.pool {
                Some(pool) => pool.current_num_threads(),
                None => rayon::current_num_threads(),
            }
        }
        #[cfg(not(feature = "rayon"))]
        {
            1
        }
    }

    /// Runs `op` inside this client's pool, if it has one.
    pub fn install_parallelism<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        #[cfg(feature = "rayon")]
        {
            if let Some(pool) = &self.pool {
                return pool.install(op);
            }
        }
        op()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_config_validates() {
        let client =
            CpuClient::with_config(LaunchConfig::default().with_pairs_per_lane(1)).unwrap();
        assert_eq!(client.config().pairs_per_lane, 1);
        assert!(CpuClient::with_config(LaunchConfig::default().with_pairs_per_lane(0)).is_err());
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_dedicated_pool() {
        let client = CpuClient::new().with_num_threads(2).unwrap();
        assert_eq!(client.num_threads(), 2);
        assert_eq!(client.install_parallelism(rayon::current_num_threads), 2);
        assert!(CpuClient::new().with_num_threads(0).is_err());
    }
}
