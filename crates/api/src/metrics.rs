use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,

    // Timing (in microseconds)
    total_list_time_us: AtomicU64,
    total_read_time_us: AtomicU64,
    total_graph_time_us: AtomicU64,

    // Counts
    listings_served: AtomicUsize,
    documents_read: AtomicUsize,
    graphs_built: AtomicUsize,
    situations_extracted: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            total_list_time_us: AtomicU64::new(0),
            total_read_time_us: AtomicU64::new(0),
            total_graph_time_us: AtomicU64::new(0),
            listings_served: AtomicUsize::new(0),
            documents_read: AtomicUsize::new(0),
            graphs_built: AtomicUsize::new(0),
            situations_extracted: AtomicUsize::new(0),
        })
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_listing(&self, duration: Duration) {
        self.total_list_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.listings_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read(&self, duration: Duration) {
        self.total_read_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.documents_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_graph(&self, duration: Duration, situations: usize) {
        self.total_graph_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.graphs_built.fetch_add(1, Ordering::Relaxed);
        self.situations_extracted.fetch_add(situations, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            avg_list_time_ms: avg_time_ms(&self.total_list_time_us, &self.listings_served),
            avg_read_time_ms: avg_time_ms(&self.total_read_time_us, &self.documents_read),
            avg_graph_time_ms: avg_time_ms(&self.total_graph_time_us, &self.graphs_built),
            listings_served: self.listings_served.load(Ordering::Relaxed),
            documents_read: self.documents_read.load(Ordering::Relaxed),
            graphs_built: self.graphs_built.load(Ordering::Relaxed),
            situations_extracted: self.situations_extracted.load(Ordering::Relaxed),
        }
    }
}

fn avg_time_ms(total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
    let total = total_us.load(Ordering::Relaxed) as f64;
    let cnt = count.load(Ordering::Relaxed) as f64;
    if cnt > 0.0 {
        total / cnt / 1000.0 // Convert to ms
    } else {
        0.0
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub avg_list_time_ms: f64,
    pub avg_read_time_ms: f64,
    pub avg_graph_time_ms: f64,
    pub listings_served: usize,
    pub documents_read: usize,
    pub graphs_built: usize,
    pub situations_extracted: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_averages() {
        let metrics = Metrics::new();
        metrics.record_request(true);
        metrics.record_request(false);
        metrics.record_graph(Duration::from_millis(4), 10);
        metrics.record_graph(Duration::from_millis(2), 5);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.failed_requests, 1);
        assert_eq!(snapshot.graphs_built, 2);
        assert_eq!(snapshot.situations_extracted, 15);
        assert!((snapshot.avg_graph_time_ms - 3.0).abs() < 1e-9);
        assert_eq!(snapshot.avg_list_time_ms, 0.0);
    }
}
