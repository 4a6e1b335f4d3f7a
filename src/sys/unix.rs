use std::io;
use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm_utils::{ErrorKind, Result};
use lazy_static::lazy_static;
use tracing::{debug, warn};

use super::set_stty_echo;

// Set while stty echo is switched off by this process
static ECHO_DISABLED: AtomicBool = AtomicBool::new(false);

lazy_static! {
    static ref EXIT_HOOK_REGISTERED: bool = unsafe { libc::atexit(restore_echo_at_exit) == 0 };
}

extern "C" fn restore_echo_at_exit() {
    if ECHO_DISABLED.swap(false, Ordering::SeqCst) {
        if let Err(e) = set_stty_echo(true) {
            warn!("unable to restore terminal echo at exit: {:?}", e);
        }
    }
}

/// Remembers whether echo is off, so it can be switched back on if the process exits early.
///
/// `atexit` hooks run on `process::exit` and on returning from `main`, not on signals.
pub(crate) fn track_echo(enabled: bool) {
    if !enabled && !*EXIT_HOOK_REGISTERED {
        debug!("unable to register the echo restoring exit hook");
    }

    ECHO_DISABLED.store(!enabled, Ordering::SeqCst);
}

/// Returns `true` if `fd` has data to read within `timeout`.
///
/// A zero `timeout` polls without blocking.
pub(crate) fn poll_readable(fd: RawFd, timeout: Duration) -> Result<bool> {
    let mut pollfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    let ready = unsafe { libc::poll(&mut pollfd, 1, timeout_millis(timeout)) };

    match ready {
        -1 => Err(ErrorKind::IoError(io::Error::last_os_error())),
        0 => Ok(false),
        _ if pollfd.revents & libc::POLLNVAL != 0 => Err(ErrorKind::IoError(
            io::Error::from_raw_os_error(libc::EBADF),
        )),
        _ => Ok(true),
    }
}

// Rounds up so a sub-millisecond timeout still waits.
fn timeout_millis(timeout: Duration) -> libc::c_int {
    let mut millis = timeout.as_millis();
    if timeout.subsec_nanos() % 1_000_000 != 0 {
        millis += 1;
    }

    millis.min(libc::c_int::MAX as u128) as libc::c_int
}
