#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Resource snapshot taken at the end of a pipeline phase.
#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: String,
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub memory_percent: f32,
    /// Time since the previous checkpoint.
    pub phase_time: Duration,
    pub total_time: Duration,
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    last_checkpoint: Instant,
    peak_memory_mb: u64,
    phases: Vec<PhaseStats>,
}

#[cfg(feature = "cli")]
pub struct SystemMonitor {
    state: Option<Mutex<MonitorState>>,
    pid: Option<Pid>,
    start_time: Instant,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let start_time = Instant::now();
        if !enabled {
            return Self {
                state: None,
                pid: None,
                start_time,
            };
        }

        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!("Could not resolve current PID, monitoring disabled: {}", e);
                None
            }
        };

        let mut system = System::new();
        system.refresh_memory();

        Self {
            state: pid.map(|_| {
                Mutex::new(MonitorState {
                    system,
                    last_checkpoint: start_time,
                    peak_memory_mb: 0,
                    phases: Vec::new(),
                })
            }),
            pid,
            start_time,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }

    /// Sample the process and record the phase that just finished.
    pub fn checkpoint(&self, phase: &str) -> Option<PhaseStats> {
        let pid = self.pid?;
        let mut state = self.state.as_ref()?.lock().ok()?;

        state.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::everything(),
        );
        state.system.refresh_memory();

        let (cpu_usage, memory_mb) = {
            let process = state.system.process(pid)?;
            (process.cpu_usage(), process.memory() / 1024 / 1024)
        };
        let total_mb = state.system.total_memory() / 1024 / 1024;
        let memory_percent = if total_mb > 0 {
            memory_mb as f32 / total_mb as f32 * 100.0
        } else {
            0.0
        };

        let now = Instant::now();
        let stats = PhaseStats {
            phase: phase.to_string(),
            cpu_usage,
            memory_mb,
            memory_percent,
            phase_time: now - state.last_checkpoint,
            total_time: now - self.start_time,
        };
        state.last_checkpoint = now;
        state.peak_memory_mb = state.peak_memory_mb.max(memory_mb);
        state.phases.push(stats.clone());
        Some(stats)
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.checkpoint(phase) {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB ({:.1}%), Phase: {:?}, Total: {:?}",
                stats.phase,
                stats.cpu_usage,
                stats.memory_mb,
                stats.memory_percent,
                stats.phase_time,
                stats.total_time
            );
        }
    }

    pub fn log_final_stats(&self) {
        let Some(state) = self.state.as_ref().and_then(|s| s.lock().ok()) else {
            return;
        };
        let slowest = state
            .phases
            .iter()
            .max_by_key(|p| p.phase_time)
            .map(|p| format!("{} ({:?})", p.phase, p.phase_time))
            .unwrap_or_else(|| "n/a".to_string());

        tracing::info!(
            "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB, Slowest phase: {}",
            self.start_time.elapsed(),
            state.peak_memory_mb,
            slowest
        );
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// No-op monitor when sysinfo is not compiled in
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_records_nothing() {
        let monitor = SystemMonitor::new(false);
        assert!(!monitor.is_enabled());
        assert!(monitor.checkpoint("extract").is_none());
        monitor.log_final_stats();
    }

    #[test]
    fn test_checkpoints_measure_each_phase() {
        let monitor = SystemMonitor::new(true);
        if !monitor.is_enabled() {
            return;
        }
        let first = monitor.checkpoint("extract").unwrap();
        let second = monitor.checkpoint("transform").unwrap();
        assert_eq!(second.phase, "transform");
        assert!(second.total_time >= first.total_time);
        assert!(second.total_time >= second.phase_time);
    }
}
