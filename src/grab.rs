//! Exclusive input capture
//!
//! Only one menu may own the pointer and keyboard at a time. Capture is
//! attempted a bounded number of times with a short sleep in between, since
//! another menu may just be closing, and is released by [`GrabGuard`] on every
//! exit path.

use std::fmt;
use std::fs::{File, OpenOptions, TryLockError};
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

use crate::config::PieMenuConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrabKind {
    Pointer,
    Keyboard,
}

impl GrabKind {
    pub const ALL: [GrabKind; 2] = [GrabKind::Pointer, GrabKind::Keyboard];

    fn name(self) -> &'static str {
        match self {
            GrabKind::Pointer => "pointer",
            GrabKind::Keyboard => "keyboard",
        }
    }
}

impl fmt::Display for GrabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that can capture an input device exclusively.
pub trait InputGrab {
    /// One attempt; `Ok(false)` means someone else holds it right now.
    fn try_grab(&mut self, kind: GrabKind) -> io::Result<bool>;
    fn release(&mut self, kind: GrabKind);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrabPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl From<&PieMenuConfig> for GrabPolicy {
    fn from(config: &PieMenuConfig) -> Self {
        Self {
            attempts: config.grab_attempts.max(1),
            interval: config.grab_interval(),
        }
    }
}

/// Held grabs; dropping it releases them in reverse order.
pub struct GrabGuard<G: InputGrab> {
    grab: G,
    held: Vec<GrabKind>,
}

impl<G: InputGrab> GrabGuard<G> {
    pub fn held(&self) -> &[GrabKind] {
        &self.held
    }
}

impl<G: InputGrab> Drop for GrabGuard<G> {
    fn drop(&mut self) {
        while let Some(kind) = self.held.pop() {
            self.grab.release(kind);
            debug!(%kind, "released");
        }
    }
}

/// Capture pointer then keyboard, retrying each per `policy`.
pub fn acquire<G: InputGrab>(grab: G, policy: GrabPolicy) -> Result<GrabGuard<G>> {
    let mut guard = GrabGuard { grab, held: Vec::new() };
    for kind in GrabKind::ALL {
        let mut attempt = 0;
        loop {
            attempt += 1;
            if guard.grab.try_grab(kind)? {
                debug!(%kind, attempt, "grabbed");
                guard.held.push(kind);
                break;
            }
            if attempt >= policy.attempts {
                // guard drops here, releasing what we already have
                return Err(Error::Grab(kind));
            }
            trace!(%kind, attempt, "busy, retrying");
            thread::sleep(policy.interval);
        }
    }
    Ok(guard)
}

/// Advisory per-device lock files shared by all menu processes of a user.
///
/// Locks are exclusive and non-blocking; closing the file releases them.
pub struct LockGrab {
    dir: PathBuf,
    files: Vec<(GrabKind, File)>,
}

impl LockGrab {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Vec::new(),
        }
    }

    /// Lock directory under `$XDG_RUNTIME_DIR`, or the temp dir without one.
    pub fn default_dir() -> PathBuf {
        dirs::runtime_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("cosmic-pmenu")
    }
}

impl Default for LockGrab {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl InputGrab for LockGrab {
    fn try_grab(&mut self, kind: GrabKind) -> io::Result<bool> {
        std::fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(format!("{kind}.lock")))?;

        match file.try_lock() {
            Ok(()) => {
                self.files.push((kind, file));
                Ok(true)
            }
            Err(TryLockError::WouldBlock) => Ok(false),
            Err(TryLockError::Error(e)) => Err(e),
        }
    }

    fn release(&mut self, kind: GrabKind) {
        // closing the descriptor drops the lock
        self.files.retain(|(k, _)| *k != kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Fails the first `busy` attempts per kind and records every call.
    #[derive(Clone)]
    struct Flaky {
        busy: u32,
        log: Rc<RefCell<Vec<String>>>,
        tries: Rc<RefCell<u32>>,
    }

    impl InputGrab for Flaky {
        fn try_grab(&mut self, kind: GrabKind) -> io::Result<bool> {
            let mut tries = self.tries.borrow_mut();
            *tries += 1;
            if *tries <= self.busy {
                return Ok(false);
            }
            *tries = 0;
            self.log.borrow_mut().push(format!("grab {kind}"));
            Ok(true)
        }

        fn release(&mut self, kind: GrabKind) {
            self.log.borrow_mut().push(format!("release {kind}"));
        }
    }

    fn flaky(busy: u32) -> Flaky {
        Flaky {
            busy,
            log: Rc::default(),
            tries: Rc::default(),
        }
    }

    const FAST: GrabPolicy = GrabPolicy {
        attempts: 5,
        interval: Duration::from_millis(0),
    };

    #[test]
    fn test_retries_then_releases_in_reverse() {
        let grab = flaky(3);
        let log = grab.log.clone();
        {
            let guard = acquire(grab, FAST).unwrap();
            assert_eq!(guard.held(), &[GrabKind::Pointer, GrabKind::Keyboard]);
        }
        assert_eq!(
            *log.borrow(),
            ["grab pointer", "grab keyboard", "release keyboard", "release pointer"]
        );
    }

    #[test]
    fn test_gives_up_and_releases_partial_grab() {
        let grab = flaky(5);
        let log = grab.log.clone();
        // pointer succeeds on the 6th try, which is past the limit
        let err = acquire(grab, FAST).err().unwrap();
        assert!(matches!(err, Error::Grab(GrabKind::Pointer)));
        assert!(log.borrow().is_empty());

        let grab = flaky(4);
        let log = grab.log.clone();
        let policy = GrabPolicy { attempts: 5, ..FAST };
        let guard = acquire(grab, policy).unwrap();
        drop(guard);
        assert_eq!(log.borrow().len(), 4);
    }

    #[test]
    fn test_lock_files_exclude_second_holder() {
        let dir = tempfile::tempdir().unwrap();
        let first = acquire(LockGrab::new(dir.path()), FAST).unwrap();

        let policy = GrabPolicy { attempts: 2, ..FAST };
        let err = acquire(LockGrab::new(dir.path()), policy).err().unwrap();
        assert!(matches!(err, Error::Grab(GrabKind::Pointer)));

        drop(first);
        assert!(acquire(LockGrab::new(dir.path()), policy).is_ok());
    }
}
