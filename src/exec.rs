//! Running the chosen output as a detached shell command.

use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use tracing::debug;

use crate::error::{Error, Result};

/// Start `<shell> -c <command>` detached from this process.
///
/// The child gets its own process group and no stdio, so it outlives the
/// menu and never writes into the caller's pipe. It is reaped on a helper
/// thread while we live; after we exit it is reparented.
pub fn spawn_detached(shell: &Path, command: &str) -> Result<()> {
    let mut child = Command::new(shell)
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .process_group(0)
        .spawn()
        .map_err(|source| Error::Command {
            command: command.to_string(),
            source,
        })?;

    let pid = child.id();
    debug!(command, pid, "spawned");
    thread::Builder::new()
        .name("reaper".to_string())
        .spawn(move || {
            if let Ok(status) = child.wait() {
                debug!(pid, %status, "command finished");
            }
        })
        .map_err(Error::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_command_runs_detached() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let command = format!("echo done > '{}'", marker.display());

        spawn_detached(Path::new("/bin/sh"), &command).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !marker.exists() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(marker.exists());
    }

    #[test]
    fn test_command_gets_its_own_process_group() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("pgid");
        // field 5 of /proc/self/stat is the process group, field 1 the pid
        let command = format!("cut -d' ' -f1,5 /proc/$$/stat > '{}'", out.display());

        spawn_detached(Path::new("/bin/sh"), &command).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut text = String::new();
        while Instant::now() < deadline {
            text = std::fs::read_to_string(&out).unwrap_or_default();
            if text.ends_with('\n') {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        let fields: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], fields[1]);
    }

    #[test]
    fn test_missing_shell_is_reported() {
        let err = spawn_detached(Path::new("/nonexistent/shell"), "true").unwrap_err();
        assert!(matches!(err, Error::Command { .. }));
    }
}
