use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::Serialize;
use sysinfo::System;
use thiserror::Error;

use super::platform::{self, NameForm, ProcessHandle};

/// Failure to construct a [`ProcessSnapshot`].
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The per-process query capability could not be acquired. Without it no
    /// resource sampling is meaningful, so construction fails instead of
    /// handing back a non-functional instance.
    #[error("failed to acquire process query handle: {0}")]
    HandleAcquisition(#[from] std::io::Error),
}

/// Resource and identity snapshot of the current process.
///
/// Identity facts (pid, cores, host names, startup epoch) are captured once
/// at construction and never change. Resource counters start at zero and are
/// overwritten by each [`sample`](Self::sample) call. The owned query handle
/// is released exactly once when the snapshot is dropped.
#[derive(Debug)]
pub struct ProcessSnapshot {
    /// OS identifier of the current process, fixed for its lifetime.
    pub process_id: u32,
    /// Logical processor count at construction time.
    pub cpu_cores: u32,
    /// Short host name; empty when resolution failed.
    pub hostname: String,
    /// Fully-qualified DNS host name; empty when resolution failed.
    pub fqdn: String,
    /// Physical (local) fully-qualified host name; empty when resolution
    /// failed. On unix this matches `fqdn`.
    pub physical_fqdn: String,
    /// DNS domain name; empty when resolution failed or unset.
    pub domain: String,
    /// Construction timestamp, the uptime epoch.
    pub startup_time: DateTime<Utc>,

    /// Open OS handles / file descriptors at the last sample.
    pub handle_count: u32,
    /// Threads at the last sample. Zero also stands in for "the system-wide
    /// scan found no matching process", which cannot happen for a live
    /// process but is not distinguished further.
    pub thread_count: u32,
    /// Peak working set at the last sample, kilobytes.
    pub peak_working_set_kb: u64,
    /// Current working set at the last sample, kilobytes.
    pub working_set_kb: u64,
    /// Private (committed) memory at the last sample, kilobytes.
    pub private_kb: u64,

    handle: ProcessHandle,
}

impl ProcessSnapshot {
    /// Captures the one-time identity facts for the current process.
    ///
    /// Host-name resolution is best-effort per form; a failed form leaves an
    /// empty string. Only handle acquisition can fail construction. No
    /// resource sampling happens here; counters stay zero until the first
    /// [`sample`](Self::sample) call.
    pub fn new() -> Result<Self, SnapshotError> {
        let handle = platform::acquire_self_handle()?;
        let process_id = std::process::id();

        let mut sys = System::new();
        sys.refresh_cpu_all();
        let cpu_cores = sys.cpus().len() as u32;

        let resolve = |form| platform::computer_name(form).unwrap_or_default();

        Ok(ProcessSnapshot {
            process_id,
            cpu_cores,
            hostname: resolve(NameForm::Hostname),
            fqdn: resolve(NameForm::DnsFullyQualified),
            physical_fqdn: resolve(NameForm::PhysicalDnsFullyQualified),
            domain: resolve(NameForm::DnsDomain),
            startup_time: Utc::now(),
            handle_count: 0,
            thread_count: 0,
            peak_working_set_kb: 0,
            working_set_kb: 0,
            private_kb: 0,
            handle,
        })
    }

    /// Refreshes the resource counters with a fresh point-in-time reading.
    ///
    /// This walks a system-wide process inventory and is by far the most
    /// expensive call in the crate; invoke it from a low-priority background
    /// task, not on a request path. A failed counter group keeps its previous
    /// value; a thread-scan miss stores zero.
    pub fn sample(&mut self) {
        #[cfg(feature = "perf-tracing")]
        let _sample_span = tracing::debug_span!("snapshot.sample").entered();

        // Each group is read whole, then stored whole.
        if let Some(mem) = platform::memory_counters(&self.handle) {
            self.peak_working_set_kb = mem.peak_working_set_kb;
            self.working_set_kb = mem.working_set_kb;
            self.private_kb = mem.private_kb;
        }

        if let Some(count) = platform::open_handle_count(&self.handle) {
            self.handle_count = count;
        }

        self.thread_count = platform::thread_count_of(self.process_id).unwrap_or(0);
    }

    /// Time elapsed since construction. Pure query, safe at any frequency.
    pub fn uptime(&self) -> Duration {
        Utc::now() - self.startup_time
    }

    /// Exports the flat serializable view. Pure read; the two timestamps and
    /// the uptime are rendered at call time, everything else is copied as-is.
    pub fn record(&self) -> SnapshotRecord {
        let now = Utc::now();
        SnapshotRecord {
            process_id: self.process_id,
            hostname: self.hostname.clone(),
            fqdn: self.fqdn.clone(),
            domain: self.domain.clone(),
            local_fqdn: self.physical_fqdn.clone(),
            cpu_handles: self.handle_count,
            cpu_threads: self.thread_count,
            cpu_cores: self.cpu_cores,
            mem_peak_working_set: self.peak_working_set_kb,
            mem_working_set: self.working_set_kb,
            mem_private_bytes: self.private_kb,
            time_startup: self
                .startup_time
                .to_rfc3339_opts(SecondsFormat::Micros, true),
            time_current: now.to_rfc3339_opts(SecondsFormat::Micros, true),
            uptime: (now - self.startup_time)
                .num_microseconds()
                .unwrap_or(i64::MAX),
        }
    }
}

/// Flat key-value view of a [`ProcessSnapshot`].
///
/// Field names serialize to the fixed wire keys (`processId`, `hostname`,
/// `fqdn`, `domain`, `localFqdn`, `cpuHandles`, `cpuThreads`, `cpuCores`,
/// `memPeakWorkingSet`, `memWorkingSet`, `memPrivateBytes`, `timeStartup`,
/// `timeCurrent`, `uptime`). Every key is always present; empty host names
/// serialize as empty strings, never as missing keys.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub process_id: u32,
    pub hostname: String,
    pub fqdn: String,
    pub domain: String,
    pub local_fqdn: String,
    pub cpu_handles: u32,
    pub cpu_threads: u32,
    pub cpu_cores: u32,
    pub mem_peak_working_set: u64,
    pub mem_working_set: u64,
    pub mem_private_bytes: u64,
    /// RFC 3339 startup timestamp.
    pub time_startup: String,
    /// RFC 3339 timestamp taken when the record was built.
    pub time_current: String,
    /// Microseconds since startup at render time.
    pub uptime: i64,
}
