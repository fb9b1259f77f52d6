//! Submenus produced by deferred `$ command` slices.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::input::Entries;
use crate::layout::{LayoutEngine, Rect};
use crate::menu::{MenuId, MenuTree, SliceId};
use crate::nav::Expander;

/// Runs deferred commands through the shell and turns their output into
/// laid-out, placed submenus.
pub struct Generator {
    shell: PathBuf,
    layout: LayoutEngine,
    monitor: Rect,
}

impl Generator {
    pub fn new(shell: impl Into<PathBuf>, layout: LayoutEngine, monitor: Rect) -> Self {
        Self {
            shell: shell.into(),
            layout,
            monitor,
        }
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn shell(&self) -> &Path {
        &self.shell
    }

    pub fn monitor(&self) -> Rect {
        self.monitor
    }

    pub fn set_monitor(&mut self, monitor: Rect) {
        self.monitor = monitor;
    }

    /// Run `command` with `<shell> -c` and return its stdout.
    pub fn run(&self, command: &str) -> Result<Vec<u8>> {
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| Error::Command {
                command: command.to_string(),
                source,
            })?;
        if !output.status.success() {
            debug!(command, status = %output.status, "deferred command exited unsuccessfully");
        }
        Ok(output.stdout)
    }
}

impl Expander for Generator {
    fn expand(&mut self, tree: &mut MenuTree, slice: SliceId) -> Option<MenuId> {
        let command = tree[slice].output().to_string();
        let stdout = match self.run(&command) {
            Ok(stdout) => stdout,
            Err(e) => {
                warn!("{e}");
                return None;
            }
        };

        let level = tree[tree[slice].menu].level + 1;
        let sub = match tree.build(Entries::with_offset(stdout.as_slice(), level), level) {
            Ok(Some(sub)) => sub,
            Ok(None) => {
                info!(command, "no menu generated");
                return None;
            }
            Err(e) => {
                warn!(command, "unusable menu: {e}");
                return None;
            }
        };

        tree.attach(slice, sub);
        tree[sub].generated = true;
        self.layout.layout(tree, sub);

        let placed = self
            .layout
            .place(tree, sub, self.monitor, None)
            .and_then(|()| self.layout.place_subtree(tree, sub, self.monitor));
        if let Err(e) = placed {
            warn!(command, "{e}");
            tree.remove_menu(sub);
            return None;
        }

        info!(command, menu = %sub, slices = tree[sub].len(), "menu generated");
        Some(sub)
    }
}
