use std::io;

use windows_sys::Win32::Foundation::{
    CloseHandle, ERROR_MORE_DATA, GetLastError, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
    TH32CS_SNAPPROCESS,
};
use windows_sys::Win32::System::ProcessStatus::{
    K32GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS, PROCESS_MEMORY_COUNTERS_EX,
};
use windows_sys::Win32::System::SystemInformation::{
    COMPUTER_NAME_FORMAT, ComputerNameDnsDomain, ComputerNameDnsFullyQualified,
    ComputerNameDnsHostname, ComputerNamePhysicalDnsFullyQualified, GetComputerNameExW,
};
use windows_sys::Win32::System::Threading::{
    GetProcessHandleCount, OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
};

use super::{MemoryCounters, NameForm, PlatformProbe};

/// Exclusively owned query capability for one process: a real (non-pseudo)
/// process handle. Dropping the wrapper closes it, which is the single
/// release point.
#[derive(Debug)]
pub struct ProcessHandle {
    pid: u32,
    raw: HANDLE,
}

impl ProcessHandle {
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

// The handle grants read-only queries about one process and carries no
// thread affinity.
unsafe impl Send for ProcessHandle {}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if !self.raw.is_null() {
            unsafe { CloseHandle(self.raw) };
        }
    }
}

pub struct Platform;

impl PlatformProbe for Platform {
    fn acquire_self_handle() -> io::Result<ProcessHandle> {
        let pid = std::process::id();
        let raw = unsafe { OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, 0, pid) };
        if raw.is_null() {
            return Err(io::Error::last_os_error());
        }
        Ok(ProcessHandle { pid, raw })
    }

    fn memory_counters(handle: &ProcessHandle) -> Option<MemoryCounters> {
        let mut counters = unsafe { std::mem::zeroed::<PROCESS_MEMORY_COUNTERS_EX>() };
        counters.cb = std::mem::size_of::<PROCESS_MEMORY_COUNTERS_EX>() as u32;
        let ok = unsafe {
            K32GetProcessMemoryInfo(
                handle.raw,
                &mut counters as *mut PROCESS_MEMORY_COUNTERS_EX as *mut PROCESS_MEMORY_COUNTERS,
                counters.cb,
            )
        };
        if ok == 0 {
            return None;
        }
        Some(MemoryCounters {
            peak_working_set_kb: counters.PeakWorkingSetSize as u64 / 1024,
            working_set_kb: counters.WorkingSetSize as u64 / 1024,
            private_kb: counters.PrivateUsage as u64 / 1024,
        })
    }

    fn open_handle_count(handle: &ProcessHandle) -> Option<u32> {
        let mut count = 0u32;
        let ok = unsafe { GetProcessHandleCount(handle.raw, &mut count) };
        if ok == 0 { None } else { Some(count) }
    }

    fn thread_count_of(pid: u32) -> Option<u32> {
        unsafe {
            let inventory = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0);
            if inventory == INVALID_HANDLE_VALUE {
                return None;
            }
            let mut entry = std::mem::zeroed::<PROCESSENTRY32W>();
            entry.dwSize = std::mem::size_of::<PROCESSENTRY32W>() as u32;

            let mut found = None;
            let mut ok = Process32FirstW(inventory, &mut entry);
            while ok != 0 {
                if entry.th32ProcessID == pid {
                    found = Some(entry.cntThreads);
                    break;
                }
                ok = Process32NextW(inventory, &mut entry);
            }
            CloseHandle(inventory);
            found
        }
    }

    fn computer_name(form: NameForm) -> Option<String> {
        let format: COMPUTER_NAME_FORMAT = match form {
            NameForm::Hostname => ComputerNameDnsHostname,
            NameForm::DnsFullyQualified => ComputerNameDnsFullyQualified,
            NameForm::PhysicalDnsFullyQualified => ComputerNamePhysicalDnsFullyQualified,
            NameForm::DnsDomain => ComputerNameDnsDomain,
        };

        // First attempt with a modest buffer; on ERROR_MORE_DATA the OS
        // reports the required length, grow once and retry.
        let mut size = 64u32;
        let mut buf = vec![0u16; size as usize];
        let ok = unsafe { GetComputerNameExW(format, buf.as_mut_ptr(), &mut size) };
        if ok == 0 {
            if unsafe { GetLastError() } != ERROR_MORE_DATA {
                return None;
            }
            buf = vec![0u16; size as usize];
            if unsafe { GetComputerNameExW(format, buf.as_mut_ptr(), &mut size) } == 0 {
                return None;
            }
        }

        let name = String::from_utf16_lossy(&buf[..size as usize]);
        if name.is_empty() { None } else { Some(name) }
    }
}
