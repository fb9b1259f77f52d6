//! Root mode trigger detection
//!
//! Watches pointer buttons and modifier keys on Linux evdev devices and opens
//! a fresh menu process whenever the configured button is pressed while the
//! configured modifier is held. Requires the user to be in the 'input' group.

use evdev::{Device, InputEvent, InputEventKind, Key};
use std::collections::HashSet;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while setting up or running root mode
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("unknown button `{0}` (expected left, middle or right)")]
    UnknownButton(String),

    #[error("unknown modifier `{0}` (expected super, alt, control or shift)")]
    UnknownModifier(String),

    #[error("no pointer or keyboard device found")]
    NoDeviceFound,

    #[error("permission denied accessing {0}; add user to 'input' group: sudo usermod -aG input $USER")]
    PermissionDenied(String),

    #[error("could not start menu: {0}")]
    Launch(#[source] std::io::Error),

    #[error("thread error: {0}")]
    Thread(#[source] std::io::Error),
}

/// How often the device list is refreshed for hotplugged devices
const RESCAN_INTERVAL: Duration = Duration::from_secs(30);

/// Button plus modifier that opens the menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub button: Key,
    pub modifiers: Vec<Key>,
}

impl Binding {
    pub fn parse(button: &str, modifier: &str) -> Result<Self, TriggerError> {
        let button = match button.to_ascii_lowercase().as_str() {
            "left" | "1" => Key::BTN_LEFT,
            "middle" | "2" => Key::BTN_MIDDLE,
            "right" | "3" => Key::BTN_RIGHT,
            _ => return Err(TriggerError::UnknownButton(button.to_string())),
        };
        let modifiers = match modifier.to_ascii_lowercase().as_str() {
            "super" | "mod4" | "meta" => vec![Key::KEY_LEFTMETA, Key::KEY_RIGHTMETA],
            "alt" | "mod1" => vec![Key::KEY_LEFTALT, Key::KEY_RIGHTALT],
            "control" | "ctrl" => vec![Key::KEY_LEFTCTRL, Key::KEY_RIGHTCTRL],
            "shift" => vec![Key::KEY_LEFTSHIFT, Key::KEY_RIGHTSHIFT],
            _ => return Err(TriggerError::UnknownModifier(modifier.to_string())),
        };
        Ok(Self { button, modifiers })
    }

    /// Whether a device reports anything this binding listens to
    fn interested_in(&self, device: &Device) -> bool {
        let Some(keys) = device.supported_keys() else {
            return false;
        };
        keys.contains(self.button) || self.modifiers.iter().any(|&m| keys.contains(m))
    }
}

/// Modifier keys currently held, by key code
#[derive(Debug, Default)]
struct TriggerState {
    held: HashSet<u16>,
}

/// Events returned from process_event
#[derive(Debug, Clone, Copy, PartialEq)]
enum TriggerEvent {
    None,
    Fire,
}

/// Process a single input event, returning trigger events
fn process_event(event: &InputEvent, binding: &Binding, state: &mut TriggerState) -> TriggerEvent {
    if let InputEventKind::Key(key) = event.kind() {
        if binding.modifiers.contains(&key) {
            match event.value() {
                0 => {
                    state.held.remove(&key.code());
                }
                _ => {
                    state.held.insert(key.code());
                }
            }
        } else if key == binding.button && event.value() == 1 && !state.held.is_empty() {
            return TriggerEvent::Fire;
        }
    }
    TriggerEvent::None
}

/// Messages from the per-device reader threads
enum DeviceMessage {
    Event(InputEvent),
    Gone(PathBuf),
}

/// Find all event devices in /dev/input/ relevant to `binding`
fn find_device_paths(binding: &Binding) -> Vec<PathBuf> {
    let input_dir = match std::fs::read_dir("/dev/input") {
        Ok(dir) => dir,
        Err(_) => return Vec::new(),
    };

    input_dir
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.to_string_lossy().contains("event"))
        .filter(|path| {
            // may fail without permissions
            Device::open(path).is_ok_and(|device| binding.interested_in(&device))
        })
        .collect()
}

/// Distinguish "nothing to watch" from "not allowed to look"
fn check_permissions() -> TriggerError {
    if let Ok(mut dir) = std::fs::read_dir("/dev/input") {
        if let Some(Ok(entry)) = dir.find(|e| {
            e.as_ref()
                .map(|e| e.path().to_string_lossy().contains("event"))
                .unwrap_or(false)
        }) {
            let path = entry.path();
            if let Err(e) = Device::open(&path) {
                if e.raw_os_error() == Some(libc::EACCES) {
                    return TriggerError::PermissionDenied(path.display().to_string());
                }
            }
        }
    }
    TriggerError::NoDeviceFound
}

/// Forward every event of one device until it disappears
fn device_loop(path: PathBuf, tx: Sender<DeviceMessage>) {
    let mut device = match Device::open(&path) {
        Ok(d) => d,
        Err(e) => {
            warn!(device = %path.display(), "could not open: {e}");
            let _ = tx.send(DeviceMessage::Gone(path));
            return;
        }
    };
    debug!(device = %path.display(), name = device.name().unwrap_or("Unknown"), "watching");

    loop {
        match device.fetch_events() {
            Ok(events) => {
                for event in events {
                    if tx.send(DeviceMessage::Event(event)).is_err() {
                        // Channel closed, exit loop
                        return;
                    }
                }
            }
            Err(e) if e.raw_os_error() == Some(libc::ENODEV) => {
                info!(device = %path.display(), "device disconnected, will rescan");
                let _ = tx.send(DeviceMessage::Gone(path));
                return;
            }
            Err(e) => {
                warn!(device = %path.display(), "read failed: {e}");
                std::thread::sleep(Duration::from_secs(1));
            }
        }
    }
}

fn watch(path: &Path, tx: &Sender<DeviceMessage>) -> Result<(), TriggerError> {
    let (path, tx) = (path.to_path_buf(), tx.clone());
    std::thread::Builder::new()
        .name("trigger-device".to_string())
        .spawn(move || device_loop(path, tx))
        .map_err(TriggerError::Thread)?;
    Ok(())
}

/// Run one menu process fed `menu` on stdin and wait for it
fn launch(menu: &str, args: &[OsString]) -> Result<(), TriggerError> {
    let exe = std::env::current_exe().map_err(TriggerError::Launch)?;
    let mut child = Command::new(exe)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(TriggerError::Launch)?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(menu.as_bytes()).map_err(TriggerError::Launch)?;
    }
    let status = child.wait().map_err(TriggerError::Launch)?;
    debug!(%status, "menu closed");
    Ok(())
}

/// Root mode main loop
///
/// Never returns on success: every trigger opens a menu process with `args`
/// and waits for it to finish before listening again.
pub fn run(menu: &str, binding: &Binding, args: &[OsString]) -> Result<(), TriggerError> {
    let paths = find_device_paths(binding);
    if paths.is_empty() {
        return Err(check_permissions());
    }

    let (tx, rx) = mpsc::channel();
    let mut watched: HashSet<PathBuf> = HashSet::new();
    for path in paths {
        watch(&path, &tx)?;
        watched.insert(path);
    }
    info!(devices = watched.len(), "root mode started");

    let mut state = TriggerState::default();
    loop {
        match rx.recv_timeout(RESCAN_INTERVAL) {
            Ok(DeviceMessage::Event(event)) => {
                if process_event(&event, binding, &mut state) == TriggerEvent::Fire {
                    info!("trigger pressed, opening menu");
                    launch(menu, args)?;
                    // catch up on modifier releases, ignore clicks made inside the menu
                    for message in rx.try_iter() {
                        match message {
                            DeviceMessage::Event(event) => {
                                process_event(&event, binding, &mut state);
                            }
                            DeviceMessage::Gone(path) => {
                                watched.remove(&path);
                            }
                        }
                    }
                }
            }
            Ok(DeviceMessage::Gone(path)) => {
                watched.remove(&path);
            }
            Err(RecvTimeoutError::Timeout) => {
                for path in find_device_paths(binding) {
                    if !watched.contains(&path) {
                        watch(&path, &tx)?;
                        watched.insert(path);
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }
    }
}
