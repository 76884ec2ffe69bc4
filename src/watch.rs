use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, SystemTime};

/// How often the source file's modification time is checked.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchState {
    Waiting,
    Converting,
}

fn modified(path: &Path) -> Option<SystemTime> {
    match fs::metadata(path).and_then(|meta| meta.modified()) {
        Ok(time) => Some(time),
        Err(e) => {
            // Editors that save by renaming leave a short window without the file
            log::debug!("Could not read mtime of {}: {}", path.display(), e);
            None
        }
    }
}

/// Call `on_change` every time the modification time of `path` changes.
///
/// Runs until `stop` is set. A failed mtime read counts as "unchanged".
pub fn watch<F>(path: &Path, interval: Duration, stop: &AtomicBool, mut on_change: F)
where
    F: FnMut(),
{
    let mut last_seen = modified(path);
    let mut state = WatchState::Waiting;

    while !stop.load(Ordering::SeqCst) {
        match state {
            WatchState::Waiting => {
                thread::sleep(interval);
                match modified(path) {
                    Some(current) if Some(current) != last_seen => {
                        log::debug!("{} changed", path.display());
                        state = WatchState::Converting;
                    }
                    _ => {}
                }
            }
            WatchState::Converting => {
                on_change();
                last_seen = modified(path);
                state = WatchState::Waiting;
            }
        }
    }

    log::debug!("Stopped watching {}", path.display());
}

/// Route Ctrl-C into a flag instead of killing the process, so watch mode
/// can wind down and exit with status 0.
pub fn install_interrupt_handler() -> Result<&'static AtomicBool> {
    ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst))
        .context("Failed to install the Ctrl-C handler")?;
    Ok(&INTERRUPTED)
}
