use crate::traits::{Worker, WorkerStats};
use anyhow::Result;
use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

pub struct WorkerRunner;

impl WorkerRunner {
    /// Spawns the workers as concurrent tasks and waits for all of them.
    /// Ctrl+C cancels the shared token; workers stop at their next entry
    /// boundary and the partial stats are still rolled up.
    pub async fn run_workers(workers: Vec<Box<dyn Worker>>) -> Result<WorkerStats> {
        let mut set = JoinSet::new();

        let token = CancellationToken::new();
        let cloned_token = token.clone();

        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C. Initiating graceful shutdown...");
                    cloned_token.cancel();
                }
                Err(err) => {
                    error!("Unable to listen for shutdown signal: {}", err);
                }
            }
        });

        let start_time = std::time::Instant::now();
        info!("Starting {} workers...", workers.len());

        for (i, worker) in workers.into_iter().enumerate() {
            let id = i + 1;
            let span = tracing::info_span!("worker", worker_id = format!("{:03}", id));
            let child_token = token.clone();

            set.spawn(
                async move {
                    match worker.run(child_token).await {
                        Ok(stats) => Ok(stats),
                        Err(e) => {
                            error!("Worker {} failed: {:?}", id, e);
                            Err(e)
                        }
                    }
                }
                .instrument(span),
            );
        }

        let mut totals = WorkerStats::default();

        while let Some(res) = set.join_next().await {
            match res {
                Ok(Ok(stats)) => {
                    totals.processed += stats.processed;
                    totals.hits += stats.hits;
                }
                Ok(Err(_)) => {
                    // Already logged in the worker task
                }
                Err(e) => {
                    error!("A worker task panicked or failed to join: {:?}", e);
                }
            }
        }

        let total_duration = start_time.elapsed();
        info!(
            "All workers finished. Time: {:.1}s | Processed: {} | Hits: {}",
            total_duration.as_secs_f64(),
            totals.processed,
            totals.hits
        );

        Ok(totals)
    }
}
