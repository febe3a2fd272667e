use std::io;

/// Memory counters for one process, in kilobytes.
///
/// The three counters are read from the OS as a single group so one
/// `sample()` call never mixes old and new values within the group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryCounters {
    pub peak_working_set_kb: u64,
    pub working_set_kb: u64,
    pub private_kb: u64,
}

/// Host name form to resolve, mirroring the OS name-resolution selectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameForm {
    /// Short (unqualified) host name.
    Hostname,
    /// Fully-qualified DNS host name.
    DnsFullyQualified,
    /// Fully-qualified DNS name of the physical host. Distinct from
    /// `DnsFullyQualified` only on Windows; unix resolves both the same way.
    PhysicalDnsFullyQualified,
    /// DNS domain name.
    DnsDomain,
}

pub trait PlatformProbe {
    fn acquire_self_handle() -> io::Result<ProcessHandle>;
    fn memory_counters(handle: &ProcessHandle) -> Option<MemoryCounters>;
    fn open_handle_count(handle: &ProcessHandle) -> Option<u32>;
    fn thread_count_of(pid: u32) -> Option<u32>;
    fn computer_name(form: NameForm) -> Option<String>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(unix)]
mod unix;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub use platform_impl::ProcessHandle;

/// Acquires the query capability for the current process. This is the only
/// probe whose failure is fatal to snapshot construction.
pub fn acquire_self_handle() -> io::Result<ProcessHandle> {
    platform_impl::Platform::acquire_self_handle()
}

pub fn memory_counters(handle: &ProcessHandle) -> Option<MemoryCounters> {
    platform_impl::Platform::memory_counters(handle)
}

pub fn open_handle_count(handle: &ProcessHandle) -> Option<u32> {
    platform_impl::Platform::open_handle_count(handle)
}

/// Walks a fresh system-wide process inventory looking for `pid`.
///
/// The inventory is a one-shot, non-restartable enumeration; every call
/// acquires a new one and scans it linearly to the first match.
pub fn thread_count_of(pid: u32) -> Option<u32> {
    platform_impl::Platform::thread_count_of(pid)
}

pub fn computer_name(form: NameForm) -> Option<String> {
    platform_impl::Platform::computer_name(form)
}
