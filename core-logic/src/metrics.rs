use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub addresses: AddressMetrics,
    pub performance: PerformanceMetrics,
    pub api: ApiMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddressMetrics {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    pub total_duration_ms: u64,
    pub avg_address_duration_ms: f64,
    pub min_address_duration_ms: u64,
    pub max_address_duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiMetrics {
    pub total_calls: u64,
    pub avg_latency_ms: f64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
}

/// Lock-free run counters, shared between workers and the API client.
#[derive(Debug)]
pub struct MetricsCollector {
    addresses_total: AtomicU64,
    addresses_success: AtomicU64,
    addresses_failed: AtomicU64,
    address_duration_sum_ms: AtomicU64,
    address_min_duration_ms: AtomicU64,
    address_max_duration_ms: AtomicU64,
    api_calls: AtomicU64,
    api_latency_sum_ms: AtomicU64,
    api_min_latency_ms: AtomicU64,
    api_max_latency_ms: AtomicU64,
    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            addresses_total: AtomicU64::new(0),
            addresses_success: AtomicU64::new(0),
            addresses_failed: AtomicU64::new(0),
            address_duration_sum_ms: AtomicU64::new(0),
            address_min_duration_ms: AtomicU64::new(u64::MAX),
            address_max_duration_ms: AtomicU64::new(0),
            api_calls: AtomicU64::new(0),
            api_latency_sum_ms: AtomicU64::new(0),
            api_min_latency_ms: AtomicU64::new(u64::MAX),
            api_max_latency_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

impl MetricsCollector {
    /// Record one completed address lookup. `success` means the inspection
    /// finished without an error attached to the report.
    pub fn record_address(&self, duration: Duration, success: bool) {
        self.addresses_total.fetch_add(1, Ordering::SeqCst);
        let duration_ms = duration.as_millis() as u64;
        self.address_duration_sum_ms
            .fetch_add(duration_ms, Ordering::SeqCst);

        self.address_min_duration_ms
            .fetch_min(duration_ms, Ordering::SeqCst);
        self.address_max_duration_ms
            .fetch_max(duration_ms, Ordering::SeqCst);

        if success {
            self.addresses_success.fetch_add(1, Ordering::SeqCst);
        } else {
            self.addresses_failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn record_api_latency(&self, latency: Duration) {
        self.api_calls.fetch_add(1, Ordering::SeqCst);
        let latency_ms = latency.as_millis() as u64;
        self.api_latency_sum_ms
            .fetch_add(latency_ms, Ordering::SeqCst);

        self.api_min_latency_ms
            .fetch_min(latency_ms, Ordering::SeqCst);
        self.api_max_latency_ms
            .fetch_max(latency_ms, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total = self.addresses_total.load(Ordering::SeqCst);
        let total_duration = self.address_duration_sum_ms.load(Ordering::SeqCst);
        let min_duration = self.address_min_duration_ms.load(Ordering::SeqCst);
        let max_duration = self.address_max_duration_ms.load(Ordering::SeqCst);

        let api_calls = self.api_calls.load(Ordering::SeqCst);
        let api_latency = self.api_latency_sum_ms.load(Ordering::SeqCst);
        let min_api = self.api_min_latency_ms.load(Ordering::SeqCst);
        let max_api = self.api_max_latency_ms.load(Ordering::SeqCst);

        let success = self.addresses_success.load(Ordering::SeqCst);

        MetricsSnapshot {
            timestamp: Utc::now().to_rfc3339(),
            addresses: AddressMetrics {
                total,
                success,
                failed: self.addresses_failed.load(Ordering::SeqCst),
                success_rate: if total > 0 {
                    success as f64 / total as f64 * 100.0
                } else {
                    0.0
                },
            },
            performance: PerformanceMetrics {
                total_duration_ms: total_duration,
                avg_address_duration_ms: if total > 0 {
                    total_duration as f64 / total as f64
                } else {
                    0.0
                },
                min_address_duration_ms: if min_duration == u64::MAX {
                    0
                } else {
                    min_duration
                },
                max_address_duration_ms: max_duration,
            },
            api: ApiMetrics {
                total_calls: api_calls,
                avg_latency_ms: if api_calls > 0 {
                    api_latency as f64 / api_calls as f64
                } else {
                    0.0
                },
                min_latency_ms: if min_api == u64::MAX { 0 } else { min_api },
                max_latency_ms: max_api,
            },
        }
    }

    pub fn to_json(&self) -> String {
        let snapshot = self.snapshot();
        serde_json::to_string_pretty(&snapshot).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn to_compact_json(&self) -> String {
        let snapshot = self.snapshot();
        serde_json::to_string(&snapshot).unwrap_or_else(|_| "{}".to_string())
    }

    pub async fn export_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = self.to_json();
        tokio::fs::write(path, json).await
    }

    pub fn addresses_total(&self) -> u64 {
        self.addresses_total.load(Ordering::SeqCst)
    }

    pub fn addresses_failed(&self) -> u64 {
        self.addresses_failed.load(Ordering::SeqCst)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_address_outcomes() {
        let metrics = MetricsCollector::default();

        metrics.record_address(Duration::from_millis(100), true);
        metrics.record_address(Duration::from_millis(300), false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.addresses.total, 2);
        assert_eq!(snapshot.addresses.success, 1);
        assert_eq!(snapshot.addresses.failed, 1);
        assert_eq!(snapshot.performance.min_address_duration_ms, 100);
        assert_eq!(snapshot.performance.max_address_duration_ms, 300);
    }

    #[test]
    fn records_api_latency() {
        let metrics = MetricsCollector::default();

        metrics.record_api_latency(Duration::from_millis(50));
        metrics.record_api_latency(Duration::from_millis(150));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.api.total_calls, 2);
        assert_eq!(snapshot.api.min_latency_ms, 50);
        assert_eq!(snapshot.api.max_latency_ms, 150);
        assert!((snapshot.api.avg_latency_ms - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_snapshot_has_zero_rates() {
        let metrics = MetricsCollector::default();
        let snapshot = metrics.snapshot();

        assert_eq!(snapshot.addresses.total, 0);
        assert_eq!(snapshot.addresses.success_rate, 0.0);
        assert_eq!(snapshot.performance.min_address_duration_ms, 0);
        assert_eq!(snapshot.api.avg_latency_ms, 0.0);
    }
}
