use std::os::windows::io::RawHandle;
use std::time::{Duration, Instant};
use std::{io, ptr, thread};

use crossterm_utils::{ErrorKind, Result};
use winapi::shared::minwindef::DWORD;
use winapi::shared::winerror::{ERROR_BROKEN_PIPE, NO_ERROR, WAIT_TIMEOUT};
use winapi::um::fileapi::GetFileType;
use winapi::um::namedpipeapi::PeekNamedPipe;
use winapi::um::winbase::{
    FILE_TYPE_CHAR, FILE_TYPE_DISK, FILE_TYPE_PIPE, FILE_TYPE_UNKNOWN, INFINITE, WAIT_OBJECT_0,
};
use winapi::um::synchapi::WaitForSingleObject;
use winapi::um::winnt::HANDLE;

const PIPE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Returns `true` if `handle` has data to read within `timeout`.
///
/// Console handles are waited on, pipes are peeked until data shows up or the timeout
/// elapses and disk files are always readable.
pub(crate) fn wait_readable(handle: RawHandle, timeout: Duration) -> Result<bool> {
    let handle = handle as HANDLE;

    match unsafe { GetFileType(handle) } {
        FILE_TYPE_CHAR => wait_console(handle, timeout),
        FILE_TYPE_PIPE => peek_pipe(handle, timeout),
        FILE_TYPE_DISK => Ok(true),
        FILE_TYPE_UNKNOWN => {
            let error = io::Error::last_os_error();
            if error.raw_os_error() == Some(NO_ERROR as i32) {
                Ok(false)
            } else {
                Err(ErrorKind::IoError(error))
            }
        }
        _ => Ok(false),
    }
}

fn wait_console(handle: HANDLE, timeout: Duration) -> Result<bool> {
    let millis = timeout.as_millis().min((INFINITE - 1) as u128) as DWORD;

    match unsafe { WaitForSingleObject(handle, millis) } {
        WAIT_OBJECT_0 => Ok(true),
        WAIT_TIMEOUT => Ok(false),
        _ => Err(ErrorKind::IoError(io::Error::last_os_error())),
    }
}

fn peek_pipe(handle: HANDLE, timeout: Duration) -> Result<bool> {
    let start = Instant::now();

    loop {
        let mut available: DWORD = 0;
        let ok = unsafe {
            PeekNamedPipe(
                handle,
                ptr::null_mut(),
                0,
                ptr::null_mut(),
                &mut available,
                ptr::null_mut(),
            )
        };

        if ok == 0 {
            let error = io::Error::last_os_error();
            // The writer went away, reading reports end of file without blocking
            if error.raw_os_error() == Some(ERROR_BROKEN_PIPE as i32) {
                return Ok(true);
            }
            return Err(ErrorKind::IoError(error));
        }

        if available > 0 {
            return Ok(true);
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(false);
        }

        thread::sleep(PIPE_POLL_INTERVAL.min(timeout - elapsed));
    }
}
