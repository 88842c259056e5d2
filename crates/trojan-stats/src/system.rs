//! Host status sampling for the status export.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sysinfo::{Disks, System};

/// Host status as reported to the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    /// Global CPU usage, e.g. `"12%"`.
    pub cpu: String,
    /// Used memory share, e.g. `"40%"`.
    pub mem: String,
    /// Used share of the root filesystem, e.g. `"71%"`.
    pub disk: String,
    /// Host uptime in seconds.
    pub uptime: u64,
}

/// Reusable sampler; keeps the previous CPU reading so usage is measured
/// over the interval between samples.
#[derive(Debug)]
pub struct SystemSampler {
    sys: System,
}

impl SystemSampler {
    /// Create a sampler and take the initial CPU reading.
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        Self { sys }
    }

    /// Take a sample.
    pub fn sample(&mut self) -> SystemStatus {
        self.sys.refresh_cpu_usage();
        self.sys.refresh_memory();

        let disks = Disks::new_with_refreshed_list();
        let (disk_used, disk_total) = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == Path::new("/"))
            .map(|d| {
                let total = d.total_space();
                (total.saturating_sub(d.available_space()), total)
            })
            .unwrap_or((0, 0));

        SystemStatus {
            cpu: format!("{:.0}%", self.sys.global_cpu_usage()),
            mem: percent(self.sys.used_memory(), self.sys.total_memory()),
            disk: percent(disk_used, disk_total),
            uptime: System::uptime(),
        }
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(used: u64, total: u64) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.0}%", used as f64 * 100.0 / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_formatting() {
        assert_eq!(percent(0, 0), "0%");
        assert_eq!(percent(1, 4), "25%");
        assert_eq!(percent(2, 3), "67%");
        assert_eq!(percent(10, 10), "100%");
    }

    #[test]
    fn sample_is_well_formed() {
        let mut sampler = SystemSampler::new();
        let status = sampler.sample();
        assert!(status.cpu.ends_with('%'));
        assert!(status.mem.ends_with('%'));
        assert!(status.disk.ends_with('%'));
    }
}
