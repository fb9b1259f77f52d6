//! Configuration module for cosmic-pmenu
//!
//! Handles all configuration for the pie menus:
//! - Pie geometry (diameter, border, separators, dead zone, submenu triangles)
//! - Font and colour overrides on top of the desktop theme
//! - Icon search paths
//! - Terminal behaviour (print vs execute, pointer warping)
//! - Root-mode trigger and input capture retry policy

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::Result;

/// Environment variable holding extra colon-separated icon directories
pub const ICONPATH_ENV: &str = "ICONPATH";

/// Configuration for pie menus, as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieMenuConfig {
    /// Diameter of every pie in pixels
    pub diameter_pixels: u32,
    /// Width of the outer border in pixels
    pub border_pixels: u32,
    /// Thickness of the separators between slices in pixels
    pub separator_pixels: u32,
    /// Where separators start, as a fraction of the radius
    pub separator_begin: f64,
    /// Where separators end, as a fraction of the radius
    pub separator_end: f64,
    /// Radius of the central dead zone, as a fraction of the radius
    pub dead_zone: f64,
    /// Submenu indicator triangle: half the base width
    pub triangle_width: u32,
    /// Submenu indicator triangle: height
    pub triangle_height: u32,
    /// Submenu indicator triangle: distance from the outer edge
    pub triangle_distance: u32,
    /// Fraction of the radius at which the icon chord is measured
    pub icon_fraction: f64,
    /// Label font size in pixels
    pub font_size: f32,
    /// Label font family; the toolkit default when unset
    pub font: Option<String>,
    /// Colours replacing the desktop theme's
    pub colors: ColorOverrides,
    /// Directories searched for relative icon references
    pub icon_paths: Vec<PathBuf>,
    /// Shell used for deferred commands and execute mode
    pub shell: PathBuf,
    /// Run the chosen output instead of printing it
    pub execute: bool,
    /// Re-centre opened submenus on the pointer
    pub warp: bool,
    /// Root mode: pointer button that opens the menu
    pub root_button: String,
    /// Root mode: modifier that must be held
    pub root_modifier: String,
    /// How many times to try capturing input before giving up
    pub grab_attempts: u32,
    /// Pause between capture attempts in milliseconds
    pub grab_interval_ms: u64,
}

impl Default for PieMenuConfig {
    fn default() -> Self {
        Self {
            diameter_pixels: 200,
            border_pixels: 1,
            separator_pixels: 1,
            separator_begin: 0.14,
            separator_end: 0.37,
            dead_zone: 0.14,
            triangle_width: 3,
            triangle_height: 7,
            triangle_distance: 6,
            icon_fraction: 0.5,
            font_size: 13.0,
            font: None,
            colors: ColorOverrides::default(),
            icon_paths: Vec::new(),
            shell: PathBuf::from("/bin/sh"),
            execute: false,
            warp: true,
            root_button: "right".to_string(),
            root_modifier: "super".to_string(),
            grab_attempts: 1000,
            grab_interval_ms: 1,
        }
    }
}

impl PieMenuConfig {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cosmic-pmenu")
            .join("config.json")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, or return defaults if it is missing or broken
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match Self::read(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), "ignoring config: {e}");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Icon directories: configured ones first, then `ICONPATH`
    pub fn icon_search_path(&self) -> Vec<PathBuf> {
        let env = std::env::var_os(ICONPATH_ENV);
        let mut dirs = self.icon_paths.clone();
        if let Some(env) = env {
            dirs.extend(std::env::split_paths(&env).filter(|p| !p.as_os_str().is_empty()));
        }
        dirs
    }

    /// Retry policy for input capture
    pub fn grab_interval(&self) -> Duration {
        Duration::from_millis(self.grab_interval_ms)
    }
}

/// Optional colours, each `#rrggbb` or `#rrggbbaa`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorOverrides {
    /// Slice and centre background
    pub background: Option<String>,
    /// Label and indicator color
    pub foreground: Option<String>,
    pub selected_background: Option<String>,
    pub selected_foreground: Option<String>,
    pub separator: Option<String>,
    pub border: Option<String>,
}

impl ColorOverrides {
    /// RGBA components of a configured colour; invalid values are ignored
    pub fn resolve(value: Option<&str>) -> Option<[f32; 4]> {
        let value = value?;
        let rgba = parse_hex_color(value);
        if rgba.is_none() {
            warn!(value, "ignoring invalid color");
        }
        rgba
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` into RGBA components in 0..=1
pub fn parse_hex_color(value: &str) -> Option<[f32; 4]> {
    let hex = value.trim().strip_prefix('#')?;
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(|v| f32::from(v) / 255.0);
    let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
    Some([channel(0)?, channel(2)?, channel(4)?, alpha])
}

/// Runtime pie geometry (derived from PieMenuConfig), in pixels and radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieGeometry {
    pub diameter: f64,
    pub radius: f64,
    pub border: f64,
    pub separator: f64,
    pub separator_begin: f64,
    pub separator_end: f64,
    /// Dead zone radius in pixels
    pub dead_zone: f64,
    pub triangle_width: f64,
    pub triangle_height: f64,
    pub triangle_distance: f64,
    pub icon_fraction: f64,
    pub font_size: f32,
}

impl Default for PieGeometry {
    fn default() -> Self {
        Self::from(&PieMenuConfig::default())
    }
}

impl From<&PieMenuConfig> for PieGeometry {
    fn from(config: &PieMenuConfig) -> Self {
        // an odd diameter would put the centre between pixels
        let diameter = f64::from(config.diameter_pixels.max(2) & !1);
        let radius = diameter / 2.0;
        Self {
            diameter,
            radius,
            border: f64::from(config.border_pixels),
            separator: f64::from(config.separator_pixels),
            separator_begin: config.separator_begin,
            separator_end: config.separator_end,
            dead_zone: radius * config.dead_zone.clamp(0.0, 1.0),
            triangle_width: f64::from(config.triangle_width),
            triangle_height: f64::from(config.triangle_height),
            triangle_distance: f64::from(config.triangle_distance),
            icon_fraction: config.icon_fraction,
            font_size: config.font_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PieMenuConfig::default();
        assert_eq!(config.diameter_pixels, 200);
        assert_eq!(config.shell, PathBuf::from("/bin/sh"));
        assert!(config.warp);
        assert!(!config.execute);

        let geometry = PieGeometry::from(&config);
        assert_eq!(geometry.radius, 100.0);
        assert!((geometry.dead_zone - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_odd_diameter_is_rounded_down() {
        let config = PieMenuConfig {
            diameter_pixels: 151,
            ..Default::default()
        };
        assert_eq!(PieGeometry::from(&config).diameter, 150.0);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "diameter_pixels": 300, "execute": true }"#).unwrap();

        let config = PieMenuConfig::load_from(&path);
        assert_eq!(config.diameter_pixels, 300);
        assert!(config.execute);
        assert_eq!(config.separator_pixels, 1);
        assert_eq!(config.grab_attempts, 1000);
    }

    #[test]
    fn test_missing_or_broken_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert_eq!(PieMenuConfig::load_from(&missing), PieMenuConfig::default());

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert_eq!(PieMenuConfig::load_from(&broken), PieMenuConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.json");
        let config = PieMenuConfig {
            font_size: 16.0,
            icon_paths: vec![PathBuf::from("/usr/share/pixmaps")],
            root_modifier: "alt".to_string(),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(PieMenuConfig::load_from(&path), config);
    }
    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_hex_color("#000000"), Some([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_hex_color("#FFFFFF80"), Some([1.0, 1.0, 1.0, 128.0 / 255.0]));
        let [r, g, b, _] = parse_hex_color(" #3465a4 ").unwrap();
        assert!((r - 0x34 as f32 / 255.0).abs() < 1e-6);
        assert!((g - 0x65 as f32 / 255.0).abs() < 1e-6);
        assert!((b - 0xa4 as f32 / 255.0).abs() < 1e-6);

        assert_eq!(parse_hex_color("3465a4"), None);
        assert_eq!(parse_hex_color("#3465a"), None);
        assert_eq!(parse_hex_color("#zz65a4"), None);
        assert_eq!(parse_hex_color("#é465a4"), None);
        assert_eq!(ColorOverrides::resolve(None), None);
        assert_eq!(ColorOverrides::resolve(Some("blue")), None);
    }

    #[test]
    fn test_colors_and_font_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r##"{ "font": "monospace", "colors": { "background": "#000000", "border": "#3465a4" } }"##,
        )
        .unwrap();

        let config = PieMenuConfig::load_from(&path);
        assert_eq!(config.font.as_deref(), Some("monospace"));
        assert_eq!(config.colors.background.as_deref(), Some("#000000"));
        assert_eq!(config.colors.border.as_deref(), Some("#3465a4"));
        assert_eq!(config.colors.foreground, None);
        assert_eq!(config.diameter_pixels, 200);
    }
}
