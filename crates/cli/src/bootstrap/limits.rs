use tracing::{debug, info, warn};

/// Raises the soft `RLIMIT_NOFILE` towards `target`, never past the hard limit.
///
/// Each in-flight miss holds one socket per upstream, so the default soft
/// limit of 1024 is reached quickly under load. `0` leaves the limit alone.
#[cfg(unix)]
pub fn raise_fd_limit(target: u64) {
    if target == 0 {
        return;
    }

    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: `limit` is a valid, writable rlimit.
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) } != 0 {
        warn!(
            error = %std::io::Error::last_os_error(),
            "Failed to read file descriptor limit"
        );
        return;
    }

    let wanted = (target as libc::rlim_t).min(limit.rlim_max);
    if wanted <= limit.rlim_cur {
        debug!(
            current = limit.rlim_cur as u64,
            "File descriptor limit already sufficient"
        );
        return;
    }

    let previous = limit.rlim_cur;
    limit.rlim_cur = wanted;
    // SAFETY: `limit` is a fully initialized rlimit.
    if unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &limit) } != 0 {
        warn!(
            error = %std::io::Error::last_os_error(),
            requested = wanted as u64,
            "Failed to raise file descriptor limit"
        );
        return;
    }

    info!(
        previous = previous as u64,
        current = wanted as u64,
        hard = limit.rlim_max as u64,
        "Raised file descriptor limit"
    );
}

#[cfg(not(unix))]
pub fn raise_fd_limit(_target: u64) {}
