#[cfg(feature = "cli")]
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct UploadStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub bytes_uploaded: u64,
    pub elapsed_time: Duration,
}

#[cfg(feature = "cli")]
impl UploadStats {
    pub fn throughput_mb_per_sec(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs > 0.0 {
            self.bytes_uploaded as f64 / 1_000_000.0 / secs
        } else {
            0.0
        }
    }
}

/// Process resource and throughput monitor for long-running uploads.
#[cfg(feature = "cli")]
pub struct UploadMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    start_time: Instant,
    peak_memory: AtomicU64,
    bytes_uploaded: AtomicU64,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl UploadMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new_with_specifics(RefreshKind::everything());
        let pid = sysinfo::get_current_pid().ok();
        if enabled {
            system.refresh_all();
        }

        Self {
            system: Mutex::new(system),
            pid,
            start_time: Instant::now(),
            peak_memory: AtomicU64::new(0),
            bytes_uploaded: AtomicU64::new(0),
            enabled,
        }
    }

    pub fn record_upload(&self, bytes: u64) {
        self.bytes_uploaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> Option<UploadStats> {
        if !self.enabled {
            return None;
        }

        let mut system = self.system.lock().ok()?;
        system.refresh_all();

        let process = system.process(self.pid?)?;
        let memory_mb = process.memory() / 1024 / 1024;
        let peak_memory_mb = self
            .peak_memory
            .fetch_max(memory_mb, Ordering::Relaxed)
            .max(memory_mb);

        Some(UploadStats {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            peak_memory_mb,
            bytes_uploaded: self.bytes_uploaded.load(Ordering::Relaxed),
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Uploaded: {} bytes ({:.2} MB/s), Time: {:?}",
                phase,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.bytes_uploaded,
                stats.throughput_mb_per_sec(),
                stats.elapsed_time
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB, Uploaded: {} bytes",
                stats.elapsed_time,
                stats.peak_memory_mb,
                stats.bytes_uploaded
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for UploadMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// No-op monitor for library builds without the cli feature.
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct UploadMonitor;

#[cfg(not(feature = "cli"))]
impl UploadMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn record_upload(&self, _bytes: u64) {}

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
