//! Slice geometry and menu placement
//!
//! All per-slice geometry is local to the pie's content box: the centre sits
//! at `(radius, radius)` and y grows downward. Angles are measured in the
//! usual mathematical sense (y up, counter-clockwise from east) and kept in
//! `[0, 2π)`. Slice 0 is centred on angle 0, so its span wraps: it runs from
//! `2π - h` through zero to `h`.

use std::f64::consts::PI;

use tracing::{debug, warn};
use unicode_width::UnicodeWidthStr;

use crate::config::PieGeometry;
use crate::error::{Error, Result};
use crate::icons::IconImage;
use crate::menu::{MenuId, MenuTree};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Screen area a menu must stay inside.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Cached drawing and hit-testing data for one slice.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SliceGeometry {
    /// Span start in radians, inclusive.
    pub angle_a: f64,
    /// Span end in radians, exclusive. Smaller than `angle_a` for a span
    /// crossing zero; equal to it for a full circle.
    pub angle_b: f64,
    pub center_angle: f64,
    /// Left end of the label, vertically on the spoke.
    pub label_anchor: Point,
    pub label_width: f64,
    /// Top-left corner of the icon.
    pub icon_anchor: Option<Point>,
    /// Side of the square the icon had to fit in.
    pub icon_size: f64,
    /// Separator polygon on the boundary with the next slice.
    pub separator: Option<[Point; 4]>,
    /// Outward-pointing triangle for slices that open a submenu.
    pub indicator: Option<[Point; 3]>,
    /// Where a submenu of this slice is centred.
    pub submenu_anchor: Point,
}

impl SliceGeometry {
    /// Whether `angle` (in `[0, 2π)`) falls inside this slice.
    pub fn contains(&self, angle: f64) -> bool {
        if self.angle_a < self.angle_b {
            angle >= self.angle_a && angle < self.angle_b
        } else {
            angle >= self.angle_a || angle < self.angle_b
        }
    }

    /// Angular width of the span.
    pub fn width(&self) -> f64 {
        match (self.angle_b - self.angle_a).rem_euclid(2.0 * PI) {
            w if w == 0.0 => 2.0 * PI,
            w => w,
        }
    }
}

/// Font measurement collaborator.
pub trait TextMeasure {
    /// Rendered width of `text` in pixels, `None` if it cannot be measured.
    fn width(&self, text: &str) -> Option<f64>;
}

/// Icon loading collaborator.
pub trait IconLoader {
    /// Load `reference` scaled to fit a `size` square.
    fn load(&self, reference: &str, size: f64) -> Option<IconImage>;
}

/// Width estimate from terminal column width and font size.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedText {
    pub font_size: f32,
}

impl TextMeasure for EstimatedText {
    fn width(&self, text: &str) -> Option<f64> {
        Some(text.width() as f64 * f64::from(self.font_size) * 0.6)
    }
}

/// Computes slice geometry and menu positions.
pub struct LayoutEngine {
    geometry: PieGeometry,
    text: Box<dyn TextMeasure>,
    icons: Box<dyn IconLoader>,
}

impl LayoutEngine {
    pub fn new(geometry: PieGeometry, text: Box<dyn TextMeasure>, icons: Box<dyn IconLoader>) -> Self {
        Self { geometry, text, icons }
    }

    pub fn geometry(&self) -> &PieGeometry {
        &self.geometry
    }

    /// Side of a menu's window, border included.
    pub fn full_diameter(&self) -> f64 {
        self.geometry.diameter + 2.0 * self.geometry.border
    }

    /// Local point `distance` out along `angle` from the centre.
    pub fn polar(&self, distance: f64, angle: f64) -> Point {
        let r = self.geometry.radius;
        Point::new(r + distance * angle.cos(), r - distance * angle.sin())
    }

    /// Lay out `menu` and, depth first, every submenu under it.
    pub fn layout(&self, tree: &mut MenuTree, menu: MenuId) {
        let slices = tree[menu].slices.clone();
        let n = slices.len().max(1);
        let half = PI / n as f64;
        tree[menu].half = half;

        let r = self.geometry.radius;
        let boundary = |k: usize| (2 * k) as f64 * half - half;

        for (i, id) in slices.into_iter().enumerate() {
            let center = 2.0 * i as f64 * half;
            let label_width = match tree[id].label.as_deref() {
                Some(label) => self.text.width(label).unwrap_or_else(|| {
                    warn!(label, "could not measure label");
                    0.0
                }),
                None => 0.0,
            };

            let mut label_anchor = self.polar(r * 2.0 / 3.0, center);
            label_anchor.x -= label_width / 2.0;

            let mut geometry = SliceGeometry {
                // slice 0 starts where the last one ends
                angle_a: boundary(if i == 0 { n } else { i }),
                angle_b: boundary(i + 1),
                center_angle: center,
                label_anchor,
                label_width,
                submenu_anchor: self.polar(self.geometry.diameter * 0.9, center),
                ..Default::default()
            };

            if n > 1 {
                geometry.separator = Some(self.separator(geometry.angle_b));
            }

            tree[id].icon_image = None;
            if let Some(reference) = tree[id].icon.clone() {
                let size = self.icon_size(half);
                geometry.icon_size = size;
                if let Some(icon) = self.icons.load(&reference, size) {
                    let mut anchor = self.polar(r * 0.6, center);
                    anchor.x -= icon.width / 2.0;
                    anchor.y -= icon.height / 2.0;
                    geometry.icon_anchor = Some(anchor);
                    tree[id].icon_image = Some(icon);
                }
            }

            if tree[id].has_indicator() {
                geometry.indicator = Some(self.indicator(center));
            }

            tree[id].geometry = geometry;

            if let Some(sub) = tree[id].submenu {
                self.layout(tree, sub);
            }
        }
        debug!(%menu, slices = n, "menu laid out");
    }

    /// Largest icon square for slices of half-angle `half`.
    ///
    /// Bounded by half the radius and by the chord the slice spans at
    /// `icon_fraction` of the radius.
    pub fn icon_size(&self, half: f64) -> f64 {
        let r = self.geometry.radius;
        let max = ((r + 1.0) / 2.0).floor();
        let span = (2.0 * half).min(PI);
        let chord = 2.0 * r * self.geometry.icon_fraction * (span / 2.0).sin();
        chord.floor().min(max).max(1.0)
    }

    fn separator(&self, boundary: f64) -> [Point; 4] {
        let g = &self.geometry;
        let inner = g.radius * g.separator_begin;
        let outer = g.radius * g.separator_end;
        let spread = |radius: f64| (g.separator / (2.0 * radius)).atan();
        let (di, dout) = (spread(inner), spread(outer));
        [
            self.polar(inner, boundary - di),
            self.polar(outer, boundary - dout),
            self.polar(outer, boundary + dout),
            self.polar(inner, boundary + di),
        ]
    }

    fn indicator(&self, angle: f64) -> [Point; 3] {
        let g = &self.geometry;
        let tip_distance = g.radius - g.triangle_distance;
        let tip = self.polar(tip_distance, angle);
        let base = self.polar(tip_distance - g.triangle_height, angle);
        // perpendicular to the spoke in screen coordinates
        let (px, py) = (angle.sin() * g.triangle_width, angle.cos() * g.triangle_width);
        [
            tip,
            Point::new(base.x + px, base.y + py),
            Point::new(base.x - px, base.y - py),
        ]
    }

    /// Position `menu` so its centre is at `at`, or, without `at`, at its
    /// caller slice's submenu anchor (the monitor centre for a root). The
    /// box is pushed back inside `monitor` where it would overflow.
    pub fn place(&self, tree: &mut MenuTree, menu: MenuId, monitor: Rect, at: Option<Point>) -> Result<()> {
        let target = match (at, tree[menu].caller) {
            (Some(at), _) => at,
            (None, Some(caller)) => {
                let parent = tree[caller].menu;
                let origin = tree[parent]
                    .position
                    .ok_or_else(|| Error::Geometry(format!("{parent} has no position")))?;
                let anchor = tree[caller].geometry.submenu_anchor;
                let border = self.geometry.border;
                Point::new(origin.x + border + anchor.x, origin.y + border + anchor.y)
            }
            (None, None) => monitor.center(),
        };

        let position = Point::new(
            self.clamp_axis(target.x, monitor.x, monitor.width),
            self.clamp_axis(target.y, monitor.y, monitor.height),
        );
        tree[menu].position = Some(position);
        Ok(())
    }

    fn clamp_axis(&self, center: f64, start: f64, extent: f64) -> f64 {
        let r = self.geometry.radius;
        let full = self.full_diameter();
        let mut pos = start;
        if center - start >= r {
            if start + extent - center >= r {
                pos = center - r - self.geometry.border;
            } else if start + extent >= full {
                pos = start + extent - full;
            }
        }
        pos
    }

    /// Place every submenu below `menu` from its caller, depth first.
    pub fn place_subtree(&self, tree: &mut MenuTree, menu: MenuId, monitor: Rect) -> Result<()> {
        let submenus: Vec<MenuId> = tree.slices_of(menu).filter_map(|(_, s)| s.submenu).collect();
        for sub in submenus {
            self.place(tree, sub, monitor, None)?;
            self.place_subtree(tree, sub, monitor)?;
        }
        Ok(())
    }

    /// Screen position of `menu`'s centre.
    pub fn center(&self, tree: &MenuTree, menu: MenuId) -> Option<Point> {
        let origin = tree.get_menu(menu)?.position?;
        let offset = self.geometry.border + self.geometry.radius;
        Some(Point::new(origin.x + offset, origin.y + offset))
    }

    /// Convert a local point of `menu` to screen coordinates.
    pub fn to_screen(&self, tree: &MenuTree, menu: MenuId, local: Point) -> Option<Point> {
        let origin = tree.get_menu(menu)?.position?;
        let border = self.geometry.border;
        Some(Point::new(local.x + origin.x + border, local.y + origin.y + border))
    }
}

/// Convert a screen point into `menu`'s local content coordinates.
///
/// `None` while the menu has no position.
pub fn to_local(geometry: &PieGeometry, tree: &MenuTree, menu: MenuId, screen: Point) -> Option<Point> {
    let origin = tree.get_menu(menu)?.position?;
    let border = geometry.border;
    Some(Point::new(screen.x - origin.x - border, screen.y - origin.y - border))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Every character is 10px wide.
    pub(crate) struct FixedText;

    impl TextMeasure for FixedText {
        fn width(&self, text: &str) -> Option<f64> {
            Some(text.chars().count() as f64 * 10.0)
        }
    }

    /// Loads every icon as a 2:1 image.
    pub(crate) struct WideIcons;

    impl IconLoader for WideIcons {
        fn load(&self, reference: &str, size: f64) -> Option<IconImage> {
            (!reference.contains("missing")).then(|| IconImage {
                path: PathBuf::from(reference),
                width: size,
                height: size / 2.0,
                vector: false,
            })
        }
    }

    pub(crate) fn engine() -> LayoutEngine {
        LayoutEngine::new(PieGeometry::default(), Box::new(FixedText), Box::new(WideIcons))
    }

    fn menu_of(n: usize) -> (MenuTree, MenuId) {
        let text: String = (0..n).map(|i| format!("s{i}\n")).collect();
        MenuTree::parse(text.as_bytes()).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_spans_cover_the_circle_once() {
        let engine = engine();
        for n in 1..=12 {
            let (mut tree, root) = menu_of(n);
            engine.layout(&mut tree, root);
            let spans: Vec<SliceGeometry> = tree.slices_of(root).map(|(_, s)| s.geometry).collect();

            let total: f64 = spans.iter().map(SliceGeometry::width).sum();
            assert!(close(total, 2.0 * PI), "n={n}");
            for pair in spans.windows(2) {
                assert_eq!(pair[0].angle_b, pair[1].angle_a, "n={n}");
            }
            assert_eq!(spans[n - 1].angle_b, spans[0].angle_a, "n={n}");

            for step in 0..720 {
                let angle = step as f64 * PI / 360.0;
                let hits = spans.iter().filter(|g| g.contains(angle)).count();
                assert_eq!(hits, 1, "n={n} angle={angle}");
            }
        }
    }

    #[test]
    fn test_flat_menu_thirds() {
        let engine = engine();
        let (mut tree, root) = menu_of(3);
        engine.layout(&mut tree, root);
        assert!(close(tree[root].half, PI / 3.0));
        for (_, slice) in tree.slices_of(root) {
            assert!(close(slice.geometry.width(), 2.0 * PI / 3.0));
        }
    }

    #[test]
    fn test_single_slice_spans_everything() {
        let engine = engine();
        let (mut tree, root) = menu_of(1);
        engine.layout(&mut tree, root);
        let g = tree[tree[root].slices[0]].geometry;
        assert!(close(tree[root].half, PI));
        assert!(close(g.width(), 2.0 * PI));
        assert!(g.contains(0.0) && g.contains(PI) && g.contains(6.0));
        assert!(g.separator.is_none());
    }

    #[test]
    fn test_label_is_centred_on_the_spoke() {
        let engine = engine();
        let (mut tree, root) = MenuTree::parse("abcd\nx\n".as_bytes()).unwrap();
        engine.layout(&mut tree, root);
        let g = tree[tree[root].slices[0]].geometry;
        // 2/3 of radius 100 east of the centre, minus half of 40px
        assert!(close(g.label_anchor.x, 100.0 + 200.0 / 3.0 - 20.0));
        assert!(close(g.label_anchor.y, 100.0));
        assert_eq!(g.label_width, 40.0);
    }

    #[test]
    fn test_icon_size_bounds() {
        let engine = engine();
        // few slices: limited by half the radius
        assert_eq!(engine.icon_size(PI / 2.0), 50.0);
        assert_eq!(engine.icon_size(PI), 50.0);
        // many slices: limited by the chord at half the radius
        let chord = (2.0 * 100.0 * 0.5 * (PI / 12.0).sin()).floor();
        assert_eq!(engine.icon_size(PI / 12.0), chord);
    }

    #[test]
    fn test_icon_anchor_and_fallback() {
        let engine = engine();
        let (mut tree, root) = MenuTree::parse("IMG:a.png\tgo\nIMG:missing.png\tLabel\tout\n".as_bytes()).unwrap();
        engine.layout(&mut tree, root);

        let loaded = &tree[tree[root].slices[0]];
        let icon = loaded.icon_image.as_ref().unwrap();
        let anchor = loaded.geometry.icon_anchor.unwrap();
        assert!(close(anchor.x + icon.width / 2.0, 160.0));
        assert!(close(anchor.y + icon.height / 2.0, 100.0));

        let missing = &tree[tree[root].slices[1]];
        assert!(missing.icon_image.is_none());
        assert!(missing.geometry.icon_anchor.is_none());
        assert_eq!(missing.label.as_deref(), Some("Label"));
    }

    #[test]
    fn test_thick_separator_fans_out() {
        let config = crate::config::PieMenuConfig {
            separator_pixels: 4,
            ..Default::default()
        };
        let engine = LayoutEngine::new(PieGeometry::from(&config), Box::new(FixedText), Box::new(WideIcons));
        let (mut tree, root) = menu_of(4);
        engine.layout(&mut tree, root);
        let [inner_a, outer_a, outer_b, inner_b] = tree[tree[root].slices[0]].geometry.separator.unwrap();

        let dist = |p: Point, q: Point| ((p.x - q.x).powi(2) + (p.y - q.y).powi(2)).sqrt();
        // chord widths match the configured thickness at both radii
        let expected = |radius: f64| 2.0 * radius * (4.0 / (2.0 * radius)).atan().sin();
        assert!(close(dist(inner_a, inner_b), expected(14.0)));
        assert!(close(dist(outer_a, outer_b), expected(37.0)));
    }

    #[test]
    fn test_indicator_only_on_submenus_and_commands() {
        let engine = engine();
        let (mut tree, root) = MenuTree::parse("a\n\tb\nc\t$ ls\nd\n".as_bytes()).unwrap();
        engine.layout(&mut tree, root);
        let flags: Vec<bool> = tree
            .slices_of(root)
            .map(|(_, s)| s.geometry.indicator.is_some())
            .collect();
        assert_eq!(flags, [true, true, false]);

        // submenu laid out too
        let sub = tree[tree[root].slices[0]].submenu.unwrap();
        assert!(close(tree[sub].half, PI));
    }

    #[test]
    fn test_placement_clamps_into_monitor() {
        let engine = engine();
        let (mut tree, root) = menu_of(2);
        let monitor = Rect::new(0.0, 0.0, 1000.0, 800.0);

        engine.place(&mut tree, root, monitor, Some(Point::new(500.0, 400.0))).unwrap();
        assert_eq!(tree[root].position, Some(Point::new(399.0, 299.0)));
        assert_eq!(engine.center(&tree, root), Some(Point::new(500.0, 400.0)));
        let local = to_local(engine.geometry(), &tree, root, Point::new(500.0, 400.0));
        assert_eq!(local, Some(Point::new(100.0, 100.0)));
        assert_eq!(engine.to_screen(&tree, root, Point::new(0.0, 0.0)), Some(Point::new(400.0, 300.0)));

        engine.place(&mut tree, root, monitor, Some(Point::new(20.0, 790.0))).unwrap();
        assert_eq!(tree[root].position, Some(Point::new(0.0, 598.0)));
    }

    #[test]
    fn test_submenu_is_placed_at_caller_anchor() {
        let engine = engine();
        let (mut tree, root) = MenuTree::parse("a\n\tb\nc\n".as_bytes()).unwrap();
        engine.layout(&mut tree, root);
        let monitor = Rect::new(0.0, 0.0, 2000.0, 2000.0);
        let sub = tree[tree[root].slices[0]].submenu.unwrap();

        assert!(matches!(engine.place(&mut tree, sub, monitor, None), Err(Error::Geometry(_))));

        engine.place(&mut tree, root, monitor, Some(Point::new(1000.0, 1000.0))).unwrap();
        engine.place_subtree(&mut tree, root, monitor).unwrap();
        let centre = engine.center(&tree, sub).unwrap();
        assert!(close(centre.x, 1000.0 + 180.0));
        assert!(close(centre.y, 1000.0));
    }
}
