//! Vector and bounding-box helpers for the periodic simulation cell.

pub use glam::DVec3 as Vec3;

/// Axis-aligned box, inclusive on both faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Edge lengths of the box.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// A box is usable only if it has non-negative extent on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }
}

/// Per-axis shift that moves `b` into the periodic image nearest to `a`.
///
/// Axes where the two points are within half a domain length of each other
/// get a zero component.
pub fn periodic_shift(a: Vec3, b: Vec3, size: Vec3) -> Vec3 {
    let delta = b - a;
    let axis = |d: f64, s: f64| {
        if s <= 0.0 || d.abs() <= s * 0.5 {
            0.0
        } else if d > 0.0 {
            -s
        } else {
            s
        }
    };
    Vec3::new(
        axis(delta.x, size.x),
        axis(delta.y, size.y),
        axis(delta.z, size.z),
    )
}

/// True if `a` and `b` are more than half a domain length apart on any axis.
pub fn crosses_periodic_boundary(a: Vec3, b: Vec3, size: Vec3) -> bool {
    periodic_shift(a, b, size) != Vec3::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Bounds {
        Bounds::new(Vec3::splat(-10.0), Vec3::splat(10.0))
    }

    #[test]
    fn test_contains_is_inclusive() {
        let b = cube();
        assert!(b.contains(Vec3::ZERO));
        assert!(b.contains(Vec3::new(10.0, -10.0, 0.0)));
        assert!(!b.contains(Vec3::new(10.5, 0.0, 0.0)));
        assert_eq!(b.size(), Vec3::splat(20.0));
    }

    #[test]
    fn test_periodic_shift_brings_points_together() {
        let size = cube().size();
        let a = Vec3::new(9.0, 0.0, 0.0);
        let b = Vec3::new(-9.0, 0.0, 0.0);

        let shift = periodic_shift(a, b, size);
        assert_eq!(shift, Vec3::new(20.0, 0.0, 0.0));
        assert!(((b + shift) - a).length() < 2.0 + 1e-12);

        // Reverse direction mirrors the sign
        assert_eq!(periodic_shift(b, a, size), Vec3::new(-20.0, 0.0, 0.0));
    }

    #[test]
    fn test_short_segment_has_no_shift() {
        let size = cube().size();
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-4.0, 5.0, -6.0);
        assert!(!crosses_periodic_boundary(a, b, size));
    }

    #[test]
    fn test_invalid_bounds() {
        let b = Bounds::new(Vec3::ONE, Vec3::ZERO);
        assert!(!b.is_valid());
        assert!(cube().is_valid());
    }
}
