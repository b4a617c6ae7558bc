// Import metrics module
//
// Lightweight counters for what the import pipeline did during a session

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Session-wide import metrics
///
/// Uses atomic operations so the counters can be shared through an `Arc`
/// without locks. Logged on shutdown or after a batch.
#[derive(Debug)]
pub struct ImportMetrics {
    /// Files that reached the post-processing stage
    pub files_imported: AtomicUsize,

    /// Files rejected before or during the scene import
    pub files_failed: AtomicUsize,

    /// Successful gr2 → dae conversions
    pub conversions: AtomicUsize,

    /// Total converter run time in milliseconds
    pub total_conversion_time_ms: AtomicU64,

    /// Objects the scene importer created
    pub objects_created: AtomicUsize,

    pub objects_renamed: AtomicUsize,

    pub objects_deleted: AtomicUsize,

    /// Materials created or reattached
    pub materials_assigned: AtomicUsize,

    /// Post-processing steps that failed
    pub step_failures: AtomicUsize,

    /// Metrics start time
    start_time: Instant,
}

impl ImportMetrics {
    pub fn new() -> Self {
        Self {
            files_imported: AtomicUsize::new(0),
            files_failed: AtomicUsize::new(0),
            conversions: AtomicUsize::new(0),
            total_conversion_time_ms: AtomicU64::new(0),
            objects_created: AtomicUsize::new(0),
            objects_renamed: AtomicUsize::new(0),
            objects_deleted: AtomicUsize::new(0),
            materials_assigned: AtomicUsize::new(0),
            step_failures: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_file_imported(&self) {
        self.files_imported.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished conversion and its run time
    pub fn record_conversion(&self, duration: Duration) {
        self.conversions.fetch_add(1, Ordering::Relaxed);
        self.total_conversion_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_objects_created(&self, count: usize) {
        self.objects_created.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_object_renamed(&self) {
        self.objects_renamed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_object_deleted(&self) {
        self.objects_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_material_assigned(&self) {
        self.materials_assigned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_step_failure(&self) {
        self.step_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average converter run time in milliseconds
    pub fn avg_conversion_time_ms(&self) -> f64 {
        let total = self.total_conversion_time_ms.load(Ordering::Relaxed);
        let count = self.conversions.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Import Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Files: {} imported, {} failed",
            self.files_imported.load(Ordering::Relaxed),
            self.files_failed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Conversions: {} (avg: {:.2}ms)",
            self.conversions.load(Ordering::Relaxed),
            self.avg_conversion_time_ms()
        );
        tracing::info!(
            "Objects: {} created, {} renamed, {} deleted; {} materials assigned",
            self.objects_created.load(Ordering::Relaxed),
            self.objects_renamed.load(Ordering::Relaxed),
            self.objects_deleted.load(Ordering::Relaxed),
            self.materials_assigned.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Post-processing step failures: {}",
            self.step_failures.load(Ordering::Relaxed)
        );
    }
}

impl Default for ImportMetrics {
    fn default() -> Self {
        Self::new()
    }
}
