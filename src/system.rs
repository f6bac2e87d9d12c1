//! Host utilisation sampling for the detailed health check.
//!
//! Metrics here are diagnostic only. A probe that cannot produce a sample
//! returns `None` and the caller reports zeros instead of failing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sysinfo::{Disks, System, MINIMUM_CPU_UPDATE_INTERVAL};
use tracing::debug;

/// One utilisation sample, all values in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemUsage {
    /// Global CPU usage.
    pub cpu_percent: f64,
    /// Used share of physical memory.
    pub memory_percent: f64,
    /// Used share of the probed filesystem, `None` if it could not be read.
    pub disk_percent: Option<f64>,
}

/// Source of host utilisation figures.
pub trait SystemProbe: Send + Sync + 'static {
    /// Take a sample, or `None` if the probe is unavailable on this host.
    ///
    /// May block; call through [`sample_blocking`] from async code.
    fn sample(&self) -> Option<SystemUsage>;
}

/// Probe backed by `sysinfo`.
#[derive(Debug, Clone)]
pub struct SysinfoProbe {
    disk_path: PathBuf,
}

impl SysinfoProbe {
    /// Create a probe reporting disk usage for the filesystem holding `disk_path`.
    pub fn new(disk_path: impl Into<PathBuf>) -> Self {
        Self {
            disk_path: disk_path.into(),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new("/")
    }
}

impl SystemProbe for SysinfoProbe {
    fn sample(&self) -> Option<SystemUsage> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return None;
        }

        let mut sys = System::new();

        // CPU usage is a delta between two refreshes.
        sys.refresh_cpu_usage();
        std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_usage();
        let cpu_percent = f64::from(sys.global_cpu_usage());

        sys.refresh_memory();
        let total = sys.total_memory();
        if total == 0 {
            return None;
        }
        let memory_percent = percent(sys.used_memory(), total);

        Some(SystemUsage {
            cpu_percent: round1(cpu_percent),
            memory_percent,
            disk_percent: disk_percent(&self.disk_path),
        })
    }
}

/// Probe that never has data. Installed when metrics are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableProbe;

impl SystemProbe for UnavailableProbe {
    fn sample(&self) -> Option<SystemUsage> {
        None
    }
}

/// Run `probe.sample()` on the blocking pool.
pub async fn sample_blocking(probe: Arc<dyn SystemProbe>) -> Option<SystemUsage> {
    match tokio::task::spawn_blocking(move || probe.sample()).await {
        Ok(sample) => sample,
        Err(e) => {
            debug!(error = %e, "System probe task failed");
            None
        }
    }
}

/// Usage of the mounted filesystem with the longest mount point containing `path`.
fn disk_percent(path: &Path) -> Option<f64> {
    let disks = Disks::new_with_refreshed_list();

    let disk = disks
        .list()
        .iter()
        .filter(|d| path.starts_with(d.mount_point()))
        .max_by_key(|d| d.mount_point().as_os_str().len());

    let Some(disk) = disk else {
        debug!(path = %path.display(), "No mounted filesystem for disk probe");
        return None;
    };

    let total = disk.total_space();
    if total == 0 {
        return None;
    }

    Some(percent(total.saturating_sub(disk.available_space()), total))
}

fn percent(used: u64, total: u64) -> f64 {
    round1(used as f64 / total as f64 * 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(0, 10), 0.0);
        assert_eq!(percent(10, 10), 100.0);
    }

    #[test]
    fn unavailable_source_has_no_sample() {
        assert!(UnavailableProbe.sample().is_none());
    }

    #[tokio::test]
    async fn sample_blocking_forwards_sample() {
        struct Fixed;
        impl SystemProbe for Fixed {
            fn sample(&self) -> Option<SystemUsage> {
                Some(SystemUsage {
                    cpu_percent: 12.5,
                    memory_percent: 40.0,
                    disk_percent: None,
                })
            }
        }

        let usage = sample_blocking(Arc::new(Fixed)).await.unwrap();
        assert_eq!(usage.cpu_percent, 12.5);
        assert_eq!(usage.disk_percent, None);
    }

    #[test]
    fn sysinfo_sample_is_within_percent_range() {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return;
        }

        let usage = SysinfoProbe::default()
            .sample()
            .expect("supported system yields a sample");

        assert!((0.0..=100.0).contains(&usage.cpu_percent), "cpu {}", usage.cpu_percent);
        assert!(
            (0.0..=100.0).contains(&usage.memory_percent),
            "memory {}",
            usage.memory_percent
        );
        if let Some(disk) = usage.disk_percent {
            assert!((0.0..=100.0).contains(&disk), "disk {}", disk);
        }
    }

    #[test]
    fn missing_mount_point_yields_no_disk_figure() {
        assert_eq!(disk_percent(Path::new("relative/path")), None);
    }
}
