use std::fs::File;
use std::io;

use super::{MemoryCounters, NameForm, PlatformProbe};

/// Exclusively owned query capability for one process: an open descriptor on
/// the process's `/proc` directory. Dropping the handle closes the
/// descriptor, which is the single release point.
#[derive(Debug)]
pub struct ProcessHandle {
    pid: u32,
    _proc_dir: File,
}

impl ProcessHandle {
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

pub struct Platform;

impl PlatformProbe for Platform {
    fn acquire_self_handle() -> io::Result<ProcessHandle> {
        let pid = std::process::id();
        let proc_dir = File::open(format!("/proc/{pid}"))?;
        Ok(ProcessHandle {
            pid,
            _proc_dir: proc_dir,
        })
    }

    fn memory_counters(handle: &ProcessHandle) -> Option<MemoryCounters> {
        // /proc/{pid}/status reports these in kB already.
        let status = std::fs::read_to_string(format!("/proc/{}/status", handle.pid)).ok()?;
        let mut peak = None;
        let mut resident = None;
        let mut anon = None;
        let mut data = None;
        for line in status.lines() {
            if let Some(val) = line.strip_prefix("VmHWM:") {
                peak = parse_kb(val);
            } else if let Some(val) = line.strip_prefix("VmRSS:") {
                resident = parse_kb(val);
            } else if let Some(val) = line.strip_prefix("RssAnon:") {
                anon = parse_kb(val);
            } else if let Some(val) = line.strip_prefix("VmData:") {
                data = parse_kb(val);
            }
        }
        Some(MemoryCounters {
            peak_working_set_kb: peak?,
            working_set_kb: resident?,
            // RssAnon is the closest analogue of private usage; kernels
            // before 4.5 only report VmData.
            private_kb: anon.or(data)?,
        })
    }

    fn open_handle_count(handle: &ProcessHandle) -> Option<u32> {
        let entries = std::fs::read_dir(format!("/proc/{}/fd", handle.pid)).ok()?;
        Some(entries.filter_map(|e| e.ok()).count() as u32)
    }

    fn thread_count_of(pid: u32) -> Option<u32> {
        for entry in std::fs::read_dir("/proc").ok()?.flatten() {
            let name = entry.file_name();
            let Some(entry_pid) = name.to_str().and_then(|s| s.parse::<u32>().ok()) else {
                continue;
            };
            if entry_pid != pid {
                continue;
            }
            let status = std::fs::read_to_string(entry.path().join("status")).ok()?;
            return status
                .lines()
                .find_map(|line| line.strip_prefix("Threads:"))
                .and_then(|val| val.trim().parse().ok());
        }
        None
    }

    fn computer_name(form: NameForm) -> Option<String> {
        super::unix::computer_name(form)
    }
}

fn parse_kb(val: &str) -> Option<u64> {
    // Lines look like "VmRSS:     1234 kB".
    val.trim().trim_end_matches("kB").trim().parse().ok()
}
