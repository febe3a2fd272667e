//! Host-name resolution shared by the unix platforms.

use std::ffi::{CStr, CString};

use super::NameForm;

pub(super) fn computer_name(form: NameForm) -> Option<String> {
    match form {
        NameForm::Hostname => short_hostname(),
        // POSIX has no physical/virtual host distinction; both qualified
        // forms resolve to the canonical name of the short host name.
        NameForm::DnsFullyQualified | NameForm::PhysicalDnsFullyQualified => {
            canonical_name(&short_hostname()?)
        }
        NameForm::DnsDomain => domain_name(),
    }
}

/// First-attempt buffer size; most host names fit. When the OS rejects it,
/// the buffer is grown once to the reported maximum and the call retried.
const INITIAL_NAME_BUF: usize = 64;

fn short_hostname() -> Option<String> {
    read_name_with_retry(|buf| unsafe {
        libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len())
    })
}

fn domain_name() -> Option<String> {
    let name = read_name_with_retry(|buf| unsafe {
        libc::getdomainname(buf.as_mut_ptr() as *mut libc::c_char, buf.len() as _)
    })?;
    // An unset NIS domain reads back as "(none)".
    if name == "(none)" { None } else { Some(name) }
}

fn read_name_with_retry(mut call: impl FnMut(&mut [u8]) -> libc::c_int) -> Option<String> {
    let mut buf = vec![0u8; INITIAL_NAME_BUF];
    if call(&mut buf) != 0 {
        let reported = unsafe { libc::sysconf(libc::_SC_HOST_NAME_MAX) };
        let grown = if reported > 0 {
            reported as usize + 1
        } else {
            256
        };
        buf = vec![0u8; grown];
        if call(&mut buf) != 0 {
            return None;
        }
    }
    // The OS does not guarantee a terminator when the name fills the buffer.
    if let Some(last) = buf.last_mut() {
        *last = 0;
    }
    let end = buf.iter().position(|&b| b == 0)?;
    let name = String::from_utf8_lossy(&buf[..end]).into_owned();
    if name.is_empty() { None } else { Some(name) }
}

fn canonical_name(host: &str) -> Option<String> {
    let node = CString::new(host).ok()?;
    let mut hints: libc::addrinfo = unsafe { std::mem::zeroed() };
    hints.ai_flags = libc::AI_CANONNAME;
    hints.ai_family = libc::AF_UNSPEC;

    let mut res: *mut libc::addrinfo = std::ptr::null_mut();
    let rc = unsafe { libc::getaddrinfo(node.as_ptr(), std::ptr::null(), &hints, &mut res) };
    if rc != 0 || res.is_null() {
        return None;
    }

    let name = unsafe {
        let canon = (*res).ai_canonname;
        let out = if canon.is_null() {
            None
        } else {
            Some(CStr::from_ptr(canon).to_string_lossy().into_owned())
        };
        libc::freeaddrinfo(res);
        out
    };
    name.filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hostname_resolves_on_unix() {
        // Every unix host has some name, even if it is just "localhost".
        let name = computer_name(NameForm::Hostname);
        assert!(name.is_some());
        assert!(!name.unwrap().is_empty());
    }

    #[test]
    fn failed_forms_yield_none_not_empty_strings() {
        // The domain form is the one most likely to be unset; whatever it
        // returns must never be an empty string.
        if let Some(domain) = computer_name(NameForm::DnsDomain) {
            assert!(!domain.is_empty());
        }
    }
}
