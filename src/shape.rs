// Shape mask: grid coordinate -> inside/outside the active silhouette.
// Evaluated on undistorted destination coordinates, so flips and warps move the
// picture but never the silhouette.

use std::f32::consts::PI;

use crate::settings::Shape;
use crate::types::GridSize;

#[derive(Clone, Copy, Debug)]
pub struct ShapeMask {
    shape: Shape,
    width: f32,
    height: f32,
    cx: f32,
    cy: f32,
    radius: f32,
}

impl ShapeMask {
    pub fn new(shape: Shape, grid: GridSize) -> Self {
        let width = grid.width as f32;
        let height = grid.height as f32;
        Self {
            shape,
            width,
            height,
            cx: width / 2.0,
            cy: height / 2.0,
            radius: width.min(height) / 2.0,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// True when grid cell (i,j) is rendered from the source.
    /// Cells outside the unmargined grid are always outside (scatter margin).
    pub fn is_inside(&self, i: i32, j: i32) -> bool {
        let (x, y) = (i as f32, j as f32);
        if x < 0.0 || y < 0.0 || x >= self.width || y >= self.height {
            return false;
        }
        let dx = x - self.cx;
        let dy = y - self.cy;

        match self.shape {
            Shape::Rectangle => true,
            Shape::Circle => (dx * dx + dy * dy).sqrt() <= self.radius,
            Shape::Square => {
                let size = self.width.min(self.height);
                let ox = (self.width - size) / 2.0;
                let oy = (self.height - size) / 2.0;
                x >= ox && x < ox + size && y >= oy && y < oy + size
            }
            Shape::Triangle => {
                // Apex at y=0, base spans the full width at the bottom.
                let half = y * (self.width / self.height) / 2.0;
                x >= self.cx - half && x <= self.cx + half
            }
            Shape::Diamond => dx.abs() + dy.abs() <= self.radius,
            Shape::Pentagon => self.inside_polygon(dx, dy, 5, -PI / 2.0),
            Shape::Hexagon => self.inside_polygon(dx, dy, 6, PI / 6.0),
            Shape::Octagon => self.inside_polygon(dx, dy, 8, PI / 8.0),
        }
    }

    /// Regular N-gon by polar angle bucketing.
    fn inside_polygon(&self, dx: f32, dy: f32, sides: u32, rotation: f32) -> bool {
        let sector = 2.0 * PI / sides as f32;
        let angle = (dy.atan2(dx) - rotation).rem_euclid(sector);
        let edge = self.radius * (sector / 2.0).cos() / (angle - sector / 2.0).cos();
        (dx * dx + dy * dy).sqrt() <= edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mask(shape: Shape, w: usize, h: usize) -> ShapeMask {
        ShapeMask::new(shape, GridSize::new(w, h))
    }

    #[test]
    fn circle_excludes_corners_includes_center() {
        let m = mask(Shape::Circle, 8, 8);
        assert!(!m.is_inside(0, 0));
        assert!(!m.is_inside(7, 7));
        assert!(m.is_inside(4, 4));
    }

    #[test]
    fn rectangle_is_the_whole_grid_only() {
        let m = mask(Shape::Rectangle, 4, 3);
        for j in 0..3 {
            for i in 0..4 {
                assert!(m.is_inside(i, j));
            }
        }
        assert!(!m.is_inside(-1, 0));
        assert!(!m.is_inside(4, 0));
        assert!(!m.is_inside(0, 3));
    }

    #[test]
    fn square_is_centered() {
        let m = mask(Shape::Square, 10, 6);
        assert!(!m.is_inside(1, 3));
        assert!(m.is_inside(2, 3));
        assert!(m.is_inside(7, 3));
        assert!(!m.is_inside(8, 3));
    }

    #[test]
    fn triangle_widens_toward_base() {
        let m = mask(Shape::Triangle, 16, 16);
        assert!(m.is_inside(8, 0));
        assert!(!m.is_inside(2, 2));
        assert!(m.is_inside(1, 15));
        let width_at = |j| (0..16).filter(|&i| m.is_inside(i, j)).count();
        assert!(width_at(4) < width_at(12));
    }

    #[test]
    fn diamond_is_manhattan() {
        let m = mask(Shape::Diamond, 10, 10);
        assert!(m.is_inside(5, 0));
        assert!(!m.is_inside(1, 1));
        assert!(m.is_inside(3, 3));
    }

    #[test]
    fn polygons_sit_inside_their_circle() {
        for shape in [Shape::Pentagon, Shape::Hexagon, Shape::Octagon] {
            let poly = mask(shape, 32, 32);
            let circle = mask(Shape::Circle, 32, 32);
            assert!(poly.is_inside(16, 16), "{shape:?} center");
            for j in 0..32 {
                for i in 0..32 {
                    if poly.is_inside(i, j) {
                        assert!(circle.is_inside(i, j), "{shape:?} ({i},{j}) outside circle");
                    }
                }
            }
        }
    }

    #[test]
    fn octagon_covers_more_than_pentagon() {
        let count = |s| {
            let m = mask(s, 40, 40);
            (0..40).flat_map(|j| (0..40).map(move |i| (i, j))).filter(|&(i, j)| m.is_inside(i, j)).count()
        };
        assert!(count(Shape::Octagon) > count(Shape::Pentagon));
    }

    proptest! {
        #[test]
        fn deterministic_for_every_shape(i in -20i32..150, j in -20i32..120, s in 0usize..8) {
            let m = mask(Shape::ALL[s], 128, 96);
            prop_assert_eq!(m.is_inside(i, j), m.is_inside(i, j));
            if i < 0 || j < 0 || i >= 128 || j >= 96 {
                prop_assert!(!m.is_inside(i, j));
            }
        }
    }
}
