// Activity metrics module
//
// Provides lightweight counters for the config store and notification queue

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Activity counters shared by the services
///
/// Uses atomic operations for thread-safe metric tracking without locks.
/// Metrics are collected throughout the application lifecycle and logged
/// on shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Notifications handed to the renderer
    pub notifications_shown: AtomicU64,

    /// Successful configuration refreshes
    pub config_refreshes: AtomicU64,

    /// Refreshes that fell back to the default document
    pub config_refresh_failures: AtomicU64,

    /// Successful configuration saves
    pub config_saves: AtomicU64,

    /// Saves that failed or were rejected as stale
    pub config_save_failures: AtomicU64,

    /// Event-driven refreshes skipped because of unsaved local edits
    pub refreshes_deferred: AtomicU64,

    /// Games whose device paths were filled from another device
    pub paths_reconciled: AtomicU64,

    /// Application start time
    start_time: Instant,
}

impl Metrics {
    /// Create a new Metrics instance
    pub fn new() -> Self {
        Self {
            notifications_shown: AtomicU64::new(0),
            config_refreshes: AtomicU64::new(0),
            config_refresh_failures: AtomicU64::new(0),
            config_saves: AtomicU64::new(0),
            config_save_failures: AtomicU64::new(0),
            refreshes_deferred: AtomicU64::new(0),
            paths_reconciled: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_notification_shown(&self) {
        self.notifications_shown.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refresh(&self, success: bool) {
        if success {
            self.config_refreshes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.config_refresh_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_save(&self, success: bool) {
        if success {
            self.config_saves.fetch_add(1, Ordering::Relaxed);
        } else {
            self.config_save_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_refresh_deferred(&self) {
        self.refreshes_deferred.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_paths_reconciled(&self) {
        self.paths_reconciled.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Activity Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Config: {} refreshes ({} failed, {} deferred), {} saves ({} failed)",
            self.config_refreshes.load(Ordering::Relaxed),
            self.config_refresh_failures.load(Ordering::Relaxed),
            self.refreshes_deferred.load(Ordering::Relaxed),
            self.config_saves.load(Ordering::Relaxed),
            self.config_save_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Notifications shown: {}, games reconciled: {}",
            self.notifications_shown.load(Ordering::Relaxed),
            self.paths_reconciled.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
