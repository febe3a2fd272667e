use std::io;

use libproc::libproc::bsd_info::BSDInfo;
use libproc::libproc::file_info::ListFDs;
use libproc::libproc::pid_rusage::{RUsageInfoV2, pidrusage};
use libproc::libproc::proc_pid::{listpidinfo, pidinfo};
use libproc::libproc::task_info::TaskInfo;
use libproc::processes::{ProcFilter, pids_by_type};

use super::{MemoryCounters, NameForm, PlatformProbe};

/// Query capability for one process. The kernel grants task-info queries by
/// pid; acquisition verifies the capability up front so construction fails
/// loudly when later sampling would be meaningless.
#[derive(Debug)]
pub struct ProcessHandle {
    pid: u32,
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
        pidinfo::<TaskInfo>(pid as i32, 0)
            .map_err(|e| io::Error::new(io::ErrorKind::PermissionDenied, e))?;
        Ok(ProcessHandle { pid })
    }

    fn memory_counters(handle: &ProcessHandle) -> Option<MemoryCounters> {
        let task = pidinfo::<TaskInfo>(handle.pid as i32, 0).ok()?;
        let resident_kb = task.pti_resident_size / 1024;
        // Mach keeps no peak working set; the footprint counter is the
        // closest thing to private usage.
        let private_kb = pidrusage::<RUsageInfoV2>(handle.pid as i32)
            .map(|ru| ru.ri_phys_footprint / 1024)
            .unwrap_or(resident_kb);
        Some(MemoryCounters {
            peak_working_set_kb: resident_kb,
            working_set_kb: resident_kb,
            private_kb,
        })
    }

    fn open_handle_count(handle: &ProcessHandle) -> Option<u32> {
        let info = pidinfo::<BSDInfo>(handle.pid as i32, 0).ok()?;
        let fds = listpidinfo::<ListFDs>(handle.pid as i32, info.pbi_nfiles as usize).ok()?;
        Some(fds.len() as u32)
    }

    fn thread_count_of(pid: u32) -> Option<u32> {
        let inventory = pids_by_type(ProcFilter::All).ok()?;
        let found = inventory.into_iter().find(|&entry| entry == pid)?;
        let task = pidinfo::<TaskInfo>(found as i32, 0).ok()?;
        u32::try_from(task.pti_threadnum).ok()
    }

    fn computer_name(form: NameForm) -> Option<String> {
        super::unix::computer_name(form)
    }
}
