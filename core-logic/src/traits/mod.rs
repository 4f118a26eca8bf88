use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Per-worker completion counters, rolled up by the runner.
#[derive(Debug, Default, Clone)]
pub struct WorkerStats {
    /// Entries this worker finished processing.
    pub processed: u64,
    /// Entries that produced a recorded result (nonzero value or NFTs).
    pub hits: u64,
}

#[async_trait]
pub trait Worker: Send + Sync {
    /// Drive this worker's share of the input to completion.
    ///
    /// Implementations must observe the cancellation token between work
    /// items so a shutdown request stops the run at an entry boundary.
    async fn run(&self, cancellation_token: CancellationToken) -> Result<WorkerStats>;
}
