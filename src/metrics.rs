// Performance metrics module
//
// Provides lightweight metrics tracking for rule calculation and saving

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Session metrics
///
/// Uses atomic operations for thread-safe metric tracking without locks.
/// Logged on shutdown for performance analysis.
#[derive(Debug)]
pub struct Metrics {
    /// Number of rule recalculations
    pub recalculations: AtomicU64,

    /// Total recalculation time in microseconds
    pub total_calculation_time_us: AtomicU64,

    /// Number of rule documents saved
    pub rules_saved: AtomicU64,

    /// Number of failed saves
    pub save_failures: AtomicU64,

    /// Session start time
    start_time: Instant,
}

impl Metrics {
    /// Create a new Metrics instance
    pub fn new() -> Self {
        Self {
            recalculations: AtomicU64::new(0),
            total_calculation_time_us: AtomicU64::new(0),
            rules_saved: AtomicU64::new(0),
            save_failures: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a recalculation and the time it took
    pub fn record_recalculation(&self, duration: Duration) {
        self.recalculations.fetch_add(1, Ordering::Relaxed);
        self.total_calculation_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record a saved rule document
    pub fn record_rules_saved(&self) {
        self.rules_saved.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed save
    pub fn record_save_failed(&self) {
        self.save_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn recalculations(&self) -> u64 {
        self.recalculations.load(Ordering::Relaxed)
    }

    pub fn save_failures(&self) -> u64 {
        self.save_failures.load(Ordering::Relaxed)
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get average recalculation time in microseconds
    pub fn avg_calculation_time_us(&self) -> f64 {
        let total = self.total_calculation_time_us.load(Ordering::Relaxed);
        let count = self.recalculations();
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Session Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Recalculations: {} (avg: {:.0}us)",
            self.recalculations(),
            self.avg_calculation_time_us()
        );
        tracing::info!(
            "Rule files saved: {}, failed saves: {}",
            self.rules_saved.load(Ordering::Relaxed),
            self.save_failures()
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.recalculations(), 0);
        assert_eq!(metrics.save_failures(), 0);
    }

    #[test]
    fn test_record_recalculation() {
        let metrics = Metrics::new();

        metrics.record_recalculation(Duration::from_micros(100));
        metrics.record_recalculation(Duration::from_micros(300));

        assert_eq!(metrics.recalculations(), 2);
        assert_eq!(metrics.avg_calculation_time_us(), 200.0);
    }

    #[test]
    fn test_avg_without_recalculations() {
        let metrics = Metrics::new();
        assert_eq!(metrics.avg_calculation_time_us(), 0.0);
    }

    #[test]
    fn test_save_counters() {
        let metrics = Metrics::new();

        metrics.record_rules_saved();
        metrics.record_save_failed();
        metrics.record_save_failed();

        assert_eq!(metrics.rules_saved.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.save_failures(), 2);
    }
}
