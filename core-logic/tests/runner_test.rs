use anyhow::Result;
use async_trait::async_trait;
use core_logic::{Worker, WorkerRunner, WorkerStats};
use tokio_util::sync::CancellationToken;

struct CountingWorker {
    processed: u64,
    hits: u64,
}

#[async_trait]
impl Worker for CountingWorker {
    async fn run(&self, _cancellation_token: CancellationToken) -> Result<WorkerStats> {
        Ok(WorkerStats {
            processed: self.processed,
            hits: self.hits,
        })
    }
}

struct FailingWorker;

#[async_trait]
impl Worker for FailingWorker {
    async fn run(&self, _cancellation_token: CancellationToken) -> Result<WorkerStats> {
        Err(anyhow::anyhow!("worker exploded"))
    }
}

#[tokio::test]
async fn rolls_up_stats_from_all_workers() {
    let workers: Vec<Box<dyn Worker>> = vec![
        Box::new(CountingWorker {
            processed: 3,
            hits: 1,
        }),
        Box::new(CountingWorker {
            processed: 2,
            hits: 2,
        }),
    ];

    let stats = WorkerRunner::run_workers(workers).await.expect("run");
    assert_eq!(stats.processed, 5);
    assert_eq!(stats.hits, 3);
}

#[tokio::test]
async fn one_failing_worker_does_not_abort_the_run() {
    let workers: Vec<Box<dyn Worker>> = vec![
        Box::new(FailingWorker),
        Box::new(CountingWorker {
            processed: 4,
            hits: 0,
        }),
    ];

    let stats = WorkerRunner::run_workers(workers).await.expect("run");
    assert_eq!(stats.processed, 4);
    assert_eq!(stats.hits, 0);
}
