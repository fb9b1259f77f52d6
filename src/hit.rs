//! Point to slice resolution.

use std::f64::consts::PI;

use crate::config::PieGeometry;
use crate::layout::Point;
use crate::menu::{MenuId, MenuTree, SliceId};

/// What a point over a menu's box lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// The central disc; selects nothing.
    DeadZone,
    Slice(SliceId),
    /// Past the outer radius (the corners of the box), or no span matched.
    Outside,
}

/// Centre-relative polar coordinates of a local point, y flipped upward.
/// The angle is normalised into `[0, 2π)`.
pub fn polar(geometry: &PieGeometry, local: Point) -> (f64, f64) {
    let x = local.x - geometry.radius;
    let y = geometry.radius - local.y;
    let r = x.hypot(y);
    let mut angle = y.atan2(x);
    if angle < 0.0 {
        angle += 2.0 * PI;
    }
    (r, angle)
}

/// Classify a local point of `menu`.
pub fn region(tree: &MenuTree, geometry: &PieGeometry, menu: MenuId, local: Point) -> Region {
    let (r, angle) = polar(geometry, local);
    if r <= geometry.dead_zone {
        return Region::DeadZone;
    }
    if r > geometry.radius {
        return Region::Outside;
    }
    tree.slices_of(menu)
        .find(|(_, slice)| slice.geometry.contains(angle))
        .map_or(Region::Outside, |(id, _)| Region::Slice(id))
}

/// Slice of `menu` under a local point, if any.
pub fn hit_test(tree: &MenuTree, geometry: &PieGeometry, menu: MenuId, local: Point) -> Option<SliceId> {
    match region(tree, geometry, menu, local) {
        Region::Slice(id) => Some(id),
        Region::DeadZone | Region::Outside => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::engine;

    fn laid_out(n: usize) -> (MenuTree, MenuId, PieGeometry) {
        let text: String = (0..n).map(|i| format!("s{i}\n")).collect();
        let (mut tree, root) = MenuTree::parse(text.as_bytes()).unwrap();
        let engine = engine();
        engine.layout(&mut tree, root);
        (tree, root, *engine.geometry())
    }

    fn at(geometry: &PieGeometry, r: f64, angle: f64) -> Point {
        Point::new(geometry.radius + r * angle.cos(), geometry.radius - r * angle.sin())
    }

    #[test]
    fn test_every_ring_point_hits_its_span() {
        for n in 1..=9 {
            let (tree, root, geometry) = laid_out(n);
            for step in 0..360 {
                let angle = step as f64 * PI / 180.0 + 0.001;
                for r in [geometry.dead_zone + 0.5, 50.0, geometry.radius - 0.5] {
                    let local = at(&geometry, r, angle);
                    let slice = hit_test(&tree, &geometry, root, local)
                        .unwrap_or_else(|| panic!("n={n} angle={angle} r={r}"));
                    let (_, computed) = polar(&geometry, local);
                    assert!(tree[slice].geometry.contains(computed));
                }
            }
        }
    }

    #[test]
    fn test_dead_zone_selects_nothing() {
        let (tree, root, geometry) = laid_out(4);
        assert_eq!(region(&tree, &geometry, root, Point::new(100.0, 100.0)), Region::DeadZone);
        for step in 0..36 {
            let local = at(&geometry, geometry.dead_zone - 0.01, step as f64 * PI / 18.0);
            assert_eq!(hit_test(&tree, &geometry, root, local), None);
        }
    }

    #[test]
    fn test_corners_are_outside() {
        let (tree, root, geometry) = laid_out(4);
        assert_eq!(region(&tree, &geometry, root, Point::new(2.0, 2.0)), Region::Outside);
        assert_eq!(region(&tree, &geometry, root, Point::new(-50.0, 100.0)), Region::Outside);
    }

    #[test]
    fn test_screen_y_is_flipped() {
        let (tree, root, geometry) = laid_out(4);
        let ids = tree[root].slices.clone();
        // east, north (up on screen), west, south
        assert_eq!(hit_test(&tree, &geometry, root, Point::new(180.0, 100.0)), Some(ids[0]));
        assert_eq!(hit_test(&tree, &geometry, root, Point::new(100.0, 20.0)), Some(ids[1]));
        assert_eq!(hit_test(&tree, &geometry, root, Point::new(20.0, 100.0)), Some(ids[2]));
        assert_eq!(hit_test(&tree, &geometry, root, Point::new(100.0, 180.0)), Some(ids[3]));
    }

    #[test]
    fn test_wraparound_goes_to_first_slice() {
        let (tree, root, geometry) = laid_out(3);
        let first = tree[root].slices[0];
        // just below east in screen terms is just under 2π
        assert_eq!(hit_test(&tree, &geometry, root, Point::new(180.0, 100.001)), Some(first));
        assert_eq!(hit_test(&tree, &geometry, root, Point::new(180.0, 99.999)), Some(first));
    }
}
