//! Icon lookup and sizing
//!
//! Resolves `IMG:` references to files and fits them into the square the
//! layout engine allows for them. Nothing here is fatal: an icon that cannot
//! be found or read just leaves its slice without an icon.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::layout::IconLoader;

/// A resolved icon scaled to fit its slice.
#[derive(Debug, Clone, PartialEq)]
pub struct IconImage {
    pub path: PathBuf,
    pub width: f64,
    pub height: f64,
    /// Vector image, drawn through the svg pipeline.
    pub vector: bool,
}

/// Finds icons on disk: absolute paths, then the search directories, then the
/// freedesktop icon theme.
#[derive(Debug, Clone, Default)]
pub struct IconResolver {
    search_path: Vec<PathBuf>,
}

impl IconResolver {
    pub fn new(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    /// Resolve an icon reference to an existing file.
    pub fn find(&self, reference: &str, size: u16) -> Option<PathBuf> {
        let path = Path::new(reference);
        if path.is_absolute() {
            return path.exists().then(|| path.to_path_buf());
        }

        if let Some(found) = self
            .search_path
            .iter()
            .map(|dir| dir.join(reference))
            .find(|candidate| candidate.is_file())
        {
            return Some(found);
        }

        // bare theme names like "utilities-terminal"
        let name = path.file_stem()?.to_str()?;
        freedesktop_icons::lookup(name)
            .with_size(size)
            .with_scale(1)
            .find()
    }
}

fn is_vector(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg") || ext.eq_ignore_ascii_case("svgz"))
}

/// Scale `(width, height)` to fit a `size` square, keeping the aspect ratio.
pub fn fit(width: u32, height: u32, size: f64) -> (f64, f64) {
    if width == 0 || height == 0 {
        return (size, size);
    }
    let (w, h) = (f64::from(width), f64::from(height));
    let scale = size / w.max(h);
    (w * scale, h * scale)
}

impl IconLoader for IconResolver {
    fn load(&self, reference: &str, size: f64) -> Option<IconImage> {
        let lookup_size = size.round().clamp(1.0, f64::from(u16::MAX)) as u16;
        let Some(path) = self.find(reference, lookup_size) else {
            warn!(icon = reference, "icon not found");
            return None;
        };

        if is_vector(&path) {
            return Some(IconImage {
                path,
                width: size,
                height: size,
                vector: true,
            });
        }

        match image::image_dimensions(&path) {
            Ok((w, h)) => {
                let (width, height) = fit(w, h, size);
                Some(IconImage {
                    path,
                    width,
                    height,
                    vector: false,
                })
            }
            Err(e) => {
                warn!(icon = %path.display(), "could not read icon: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_keeps_aspect_ratio() {
        assert_eq!(fit(100, 50, 40.0), (40.0, 20.0));
        assert_eq!(fit(10, 20, 40.0), (20.0, 40.0));
        assert_eq!(fit(0, 0, 8.0), (8.0, 8.0));
    }

    #[test]
    fn test_search_path_resolves_relative_names() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("term.png");
        image::RgbaImage::new(64, 32).save(&file).unwrap();

        let resolver = IconResolver::new(vec![PathBuf::from("/nonexistent"), dir.path().to_path_buf()]);
        assert_eq!(resolver.find("term.png", 32), Some(file.clone()));

        let icon = resolver.load("term.png", 32.0).unwrap();
        assert_eq!(icon.path, file);
        assert_eq!((icon.width, icon.height), (32.0, 16.0));
        assert!(!icon.vector);
    }

    #[test]
    fn test_missing_absolute_icon_degrades() {
        let resolver = IconResolver::default();
        assert!(resolver.load("/definitely/not/here.png", 32.0).is_none());
    }

    #[test]
    fn test_unreadable_icon_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.png");
        std::fs::write(&file, b"not a png").unwrap();
        let resolver = IconResolver::default();
        assert!(resolver.load(file.to_str().unwrap(), 32.0).is_none());
    }

    #[test]
    fn test_svg_is_square() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("logo.svg");
        std::fs::write(&file, "<svg xmlns=\"http://www.w3.org/2000/svg\"/>").unwrap();
        let icon = IconResolver::default().load(file.to_str().unwrap(), 24.0).unwrap();
        assert!(icon.vector);
        assert_eq!((icon.width, icon.height), (24.0, 24.0));
    }
}
