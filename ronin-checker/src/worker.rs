use crate::inspector::AddressInspector;
use crate::results::{fmt_usd, ResultsManager};
use anyhow::Result;
use async_trait::async_trait;
use core_logic::{MetricsCollector, WalletEntry, Worker, WorkerStats};
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// One concurrent worker over a strided slice of the input.
///
/// Worker `k` of `n` handles entries `k, k+n, k+2n, ...` -- a static
/// partition is enough because per-entry cost is network-bound, not
/// CPU-bound.
pub struct CheckerWorker {
    worker_index: usize,
    stride: usize,
    entries: Arc<Vec<WalletEntry>>,
    inspector: Arc<AddressInspector>,
    results: Arc<ResultsManager>,
    metrics: Arc<MetricsCollector>,
    progress: ProgressBar,
}

impl CheckerWorker {
    pub fn new(
        worker_index: usize,
        stride: usize,
        entries: Arc<Vec<WalletEntry>>,
        inspector: Arc<AddressInspector>,
        results: Arc<ResultsManager>,
        metrics: Arc<MetricsCollector>,
        progress: ProgressBar,
    ) -> Self {
        Self {
            worker_index,
            stride,
            entries,
            inspector,
            results,
            metrics,
            progress,
        }
    }
}

#[async_trait]
impl Worker for CheckerWorker {
    async fn run(&self, cancellation_token: CancellationToken) -> Result<WorkerStats> {
        let mut stats = WorkerStats::default();
        let mut index = self.worker_index;

        while index < self.entries.len() {
            if cancellation_token.is_cancelled() {
                info!("Worker stopping (cancelled).");
                break;
            }

            let entry = &self.entries[index];
            let started = Instant::now();

            let report = self.inspector.inspect(entry).await;
            self.metrics
                .record_address(started.elapsed(), report.error.is_none());

            if report.qualifies() {
                match self.results.record(&report).await {
                    Ok(()) => stats.hits += 1,
                    Err(e) => {
                        error!("Failed to record result for {}: {:#}", report.address, e)
                    }
                }
            }

            stats.processed += 1;

            let totals = self.results.totals().await;
            self.progress.inc(1);
            self.progress.set_message(format!(
                "Axies: {} | Total: {}$",
                totals.total_axies,
                fmt_usd(totals.total_usd_value)
            ));

            index += self.stride;
        }

        Ok(stats)
    }
}
