//! Platform collaborators: the resident-set-size oracle and the
//! best-effort heap trim.
//!
//! Both are optional. Where a platform offers no query or no trim
//! primitive, the oracle returns `None` (callers substitute the 0
//! sentinel) and the trim is a no-op. Neither failure mode propagates.

/// Whether [`resident_set_size`] can return a real value on this target.
pub const fn oracle_supported() -> bool {
    cfg!(any(target_os = "linux", target_os = "macos", target_family = "windows"))
}

/// Resident-set-size of the current process in bytes, or `None` where
/// the platform query is unsupported or fails.
pub fn resident_set_size() -> Option<usize> {
    imp::resident_set_size()
}

/// Ask the platform allocator to return free heap pages to the OS.
/// Best-effort: a no-op except on Linux/glibc.
pub(crate) fn trim_heap() {
    imp::trim_heap()
}

#[cfg(target_os = "linux")]
mod imp {
    use std::fs::File;
    use std::io::Read;

    // Sampling must not disturb the heap being measured, so statm is
    // parsed out of a stack buffer rather than a read-to-string.
    pub fn resident_set_size() -> Option<usize> {
        let mut buf = [0u8; 128];
        let mut file = File::open("/proc/self/statm").ok()?;
        let len = file.read(&mut buf).ok()?;

        // second whitespace-delimited field is resident pages
        let mut fields = buf[..len].split(|b| *b == b' ');
        let resident = fields.nth(1)?;
        let mut pages = 0usize;
        for b in resident {
            if !b.is_ascii_digit() {
                return None;
            }
            pages = pages.checked_mul(10)?.checked_add((b - b'0') as usize)?;
        }

        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if page_size <= 0 {
            return None;
        }

        Some(pages * page_size as usize)
    }

    #[cfg(target_env = "gnu")]
    pub fn trim_heap() {
        unsafe {
            libc::malloc_trim(0);
        }
    }

    #[cfg(not(target_env = "gnu"))]
    pub fn trim_heap() {}
}

#[cfg(target_os = "macos")]
mod imp {
    pub fn resident_set_size() -> Option<usize> {
        let mut info: libc::proc_taskinfo = unsafe { core::mem::zeroed() };
        let size = core::mem::size_of::<libc::proc_taskinfo>() as libc::c_int;

        let written = unsafe {
            libc::proc_pidinfo(
                libc::getpid(),
                libc::PROC_PIDTASKINFO,
                0,
                (&mut info as *mut libc::proc_taskinfo).cast(),
                size,
            )
        };

        if written != size {
            return None;
        }

        Some(info.pti_resident_size as usize)
    }

    pub fn trim_heap() {}
}

#[cfg(target_family = "windows")]
mod imp {
    use windows_sys::Win32::System::ProcessStatus::{
        K32GetProcessMemoryInfo, PROCESS_MEMORY_COUNTERS,
    };
    use windows_sys::Win32::System::Threading::GetCurrentProcess;

    pub fn resident_set_size() -> Option<usize> {
        let mut counters: PROCESS_MEMORY_COUNTERS = unsafe { core::mem::zeroed() };
        counters.cb = core::mem::size_of::<PROCESS_MEMORY_COUNTERS>() as u32;

        let ok = unsafe {
            K32GetProcessMemoryInfo(GetCurrentProcess(), &mut counters, counters.cb)
        };

        if ok == 0 {
            return None;
        }

        Some(counters.WorkingSetSize)
    }

    pub fn trim_heap() {}
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_family = "windows")))]
mod imp {
    pub fn resident_set_size() -> Option<usize> {
        None
    }

    pub fn trim_heap() {}
}
