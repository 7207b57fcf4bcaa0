//! Screen geometry and coordinate normalization.
//!
//! [`ScreenGeometry`] holds the logical and physical extents of the display
//! and converts points between logical, physical and unit space. Every
//! conversion is an affine map built from the two sizes, and each pair of
//! conversions is mutually inverse up to `f64` rounding. Once a result is
//! rounded to whole units for a pointer command, a round trip lands at most
//! one unit away from where it started for displays in the low thousands.
//!
//! Points outside the display rectangle convert like any other point.
//! Clamping is left to whoever consumes the result.

use pathreplay_common::error::{PathreplayError, PathreplayResult};
use serde::{Deserialize, Serialize};

use crate::devices::GeometryProbe;
use crate::space::{CoordinateSpace, Point, Size};

/// Logical and physical extents of one display, resolved once per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenGeometry {
    /// Extent the pointer I/O primitive addresses.
    pub logical: Size,
    /// Extent of frames produced by the capture primitive.
    pub physical: Size,
}

impl ScreenGeometry {
    /// Build a geometry from known sizes. A zero dimension is rejected.
    pub fn new(logical: Size, physical: Size) -> PathreplayResult<Self> {
        if !logical.is_positive() {
            return Err(PathreplayError::geometry(format!(
                "logical size {logical} has a zero dimension"
            )));
        }
        if !physical.is_positive() {
            return Err(PathreplayError::geometry(format!(
                "physical size {physical} has a zero dimension"
            )));
        }
        Ok(Self { logical, physical })
    }

    /// Geometry whose logical and physical extents coincide.
    pub fn uniform(width: u32, height: u32) -> PathreplayResult<Self> {
        let size = Size::new(width, height);
        Self::new(size, size)
    }

    /// Query both collaborators once and build the geometry.
    pub fn resolve(probe: &mut dyn GeometryProbe) -> PathreplayResult<Self> {
        let logical = probe.logical_size().map_err(|e| {
            PathreplayError::geometry(format!("could not query logical size: {e}"))
        })?;
        let physical = probe.physical_size().map_err(|e| {
            PathreplayError::geometry(format!("could not query physical size: {e}"))
        })?;

        let geometry = Self::new(logical, physical)?;
        let (sx, sy) = geometry.scale();
        tracing::info!(
            logical = %geometry.logical,
            physical = %geometry.physical,
            scale_x = sx,
            scale_y = sy,
            "Resolved screen geometry"
        );
        Ok(geometry)
    }

    /// Physical units per logical unit, per axis.
    pub fn scale(&self) -> (f64, f64) {
        (
            self.physical.width as f64 / self.logical.width as f64,
            self.physical.height as f64 / self.logical.height as f64,
        )
    }

    /// Logical units per physical unit, per axis.
    pub fn inverse_scale(&self) -> (f64, f64) {
        (
            self.logical.width as f64 / self.physical.width as f64,
            self.logical.height as f64 / self.physical.height as f64,
        )
    }

    /// Extent of a concrete space; unit space is `1x1`.
    pub fn extent(&self, space: CoordinateSpace) -> (f64, f64) {
        match space {
            CoordinateSpace::Logical => (self.logical.width as f64, self.logical.height as f64),
            CoordinateSpace::Physical => {
                (self.physical.width as f64, self.physical.height as f64)
            }
            CoordinateSpace::Unit => (1.0, 1.0),
        }
    }

    /// Logical → physical.
    pub fn to_physical(&self, logical: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(logical.x * sx, logical.y * sy)
    }

    /// Physical → logical.
    pub fn to_logical(&self, physical: Point) -> Point {
        let (sx, sy) = self.inverse_scale();
        Point::new(physical.x * sx, physical.y * sy)
    }

    /// Any space → unit.
    pub fn to_unit(&self, point: Point, from: CoordinateSpace) -> Point {
        let (w, h) = self.extent(from);
        Point::new(point.x / w, point.y / h)
    }

    /// Unit → any space.
    pub fn from_unit(&self, unit: Point, to: CoordinateSpace) -> Point {
        let (w, h) = self.extent(to);
        Point::new(unit.x * w, unit.y * h)
    }

    /// Convert between any two spaces of this geometry.
    pub fn convert(&self, point: Point, from: CoordinateSpace, to: CoordinateSpace) -> Point {
        match (from, to) {
            _ if from == to => point,
            (CoordinateSpace::Logical, CoordinateSpace::Physical) => self.to_physical(point),
            (CoordinateSpace::Physical, CoordinateSpace::Logical) => self.to_logical(point),
            _ => self.from_unit(self.to_unit(point, from), to),
        }
    }
}

/// Normalize a point measured against an arbitrary frame to unit space.
///
/// Used for estimates that reference a frame whose size differs from the
/// resolved physical size.
pub fn unit_from_frame(point: Point, frame: Size) -> Point {
    Point::new(
        point.x / frame.width.max(1) as f64,
        point.y / frame.height.max(1) as f64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct FixedProbe(PathreplayResult<Size>, PathreplayResult<Size>);

    impl GeometryProbe for FixedProbe {
        fn logical_size(&mut self) -> PathreplayResult<Size> {
            match &self.0 {
                Ok(size) => Ok(*size),
                Err(e) => Err(PathreplayError::pointer(e.to_string())),
            }
        }

        fn physical_size(&mut self) -> PathreplayResult<Size> {
            match &self.1 {
                Ok(size) => Ok(*size),
                Err(e) => Err(PathreplayError::capture(e.to_string())),
            }
        }
    }

    fn hidpi() -> ScreenGeometry {
        ScreenGeometry::new(Size::new(1440, 900), Size::new(2880, 1800)).unwrap()
    }

    #[test]
    fn zero_dimension_is_fatal() {
        let err = ScreenGeometry::new(Size::new(0, 1080), Size::new(1920, 1080)).unwrap_err();
        assert!(matches!(err, PathreplayError::GeometryUnavailable { .. }));
        assert!(err.is_fatal());

        let err = ScreenGeometry::new(Size::new(1920, 1080), Size::new(1920, 0)).unwrap_err();
        assert!(matches!(err, PathreplayError::GeometryUnavailable { .. }));
    }

    #[test]
    fn resolve_maps_collaborator_failure_to_geometry_unavailable() {
        let mut probe = FixedProbe(
            Ok(Size::new(1920, 1080)),
            Err(PathreplayError::capture("no display")),
        );
        let err = ScreenGeometry::resolve(&mut probe).unwrap_err();
        assert!(matches!(err, PathreplayError::GeometryUnavailable { .. }));
    }

    #[test]
    fn resolve_reads_both_sizes() {
        let mut probe = FixedProbe(Ok(Size::new(1440, 900)), Ok(Size::new(2880, 1800)));
        let geometry = ScreenGeometry::resolve(&mut probe).unwrap();
        assert_eq!(geometry, hidpi());
        assert_eq!(geometry.scale(), (2.0, 2.0));
        assert_eq!(geometry.inverse_scale(), (0.5, 0.5));
    }

    #[test]
    fn logical_to_physical_applies_scale() {
        let p = hidpi().to_physical(Point::new(720.0, 450.0));
        assert_eq!(p, Point::new(1440.0, 900.0));
    }

    #[test]
    fn unit_conversion_uses_target_extent() {
        let g = hidpi();
        let unit = g.to_unit(Point::new(720.0, 225.0), CoordinateSpace::Logical);
        assert_eq!(unit, Point::new(0.5, 0.25));
        assert_eq!(
            g.from_unit(unit, CoordinateSpace::Physical),
            Point::new(1440.0, 450.0)
        );
        assert_eq!(g.from_unit(unit, CoordinateSpace::Unit), unit);
    }

    #[test]
    fn out_of_range_points_are_not_clamped() {
        let g = ScreenGeometry::uniform(1920, 1080).unwrap();
        let unit = g.to_unit(Point::new(-100.0, 2160.0), CoordinateSpace::Physical);
        assert!(unit.x < 0.0);
        assert!((unit.y - 2.0).abs() < 1e-12);

        let back = g.from_unit(Point::new(1.5, -0.25), CoordinateSpace::Logical);
        assert_eq!(back, Point::new(2880.0, -270.0));
    }

    #[test]
    fn frame_normalization_uses_frame_size() {
        let unit = unit_from_frame(Point::new(512.0, 384.0), Size::new(1024, 768));
        assert_eq!(unit, Point::new(0.5, 0.5));
    }

    #[test]
    fn convert_between_every_pair_is_consistent() {
        let g = ScreenGeometry::new(Size::new(1536, 864), Size::new(1920, 1080)).unwrap();
        let logical = Point::new(300.0, 700.0);
        for to in CoordinateSpace::ALL {
            let there = g.convert(logical, CoordinateSpace::Logical, to);
            let back = g.convert(there, to, CoordinateSpace::Logical);
            assert!(back.distance_to(&logical) < 1e-9, "via {to}: {back:?}");
        }
    }

    proptest! {
        #[test]
        fn physical_roundtrip_within_one_unit(
            lw in 1u32..8000,
            lh in 1u32..8000,
            pw in 1u32..8000,
            ph in 1u32..8000,
            fx in 0.0f64..1.0,
            fy in 0.0f64..1.0,
        ) {
            let g = ScreenGeometry::new(Size::new(lw, lh), Size::new(pw, ph)).unwrap();
            let p = Point::new((fx * lw as f64).floor(), (fy * lh as f64).floor());
            let back = g.to_logical(g.to_physical(p));
            prop_assert!((back.x - p.x).abs() <= 1.0);
            prop_assert!((back.y - p.y).abs() <= 1.0);
            let (rx, ry) = back.rounded();
            prop_assert_eq!((rx as f64, ry as f64), (p.x, p.y));
        }

        #[test]
        fn unit_roundtrip_is_lossless(
            w in 1u32..8000,
            h in 1u32..8000,
            x in -10_000.0f64..10_000.0,
            y in -10_000.0f64..10_000.0,
        ) {
            let g = ScreenGeometry::uniform(w, h).unwrap();
            let p = Point::new(x, y);
            let back = g.from_unit(g.to_unit(p, CoordinateSpace::Logical), CoordinateSpace::Logical);
            prop_assert!(back.distance_to(&p) < 1e-6);
        }
    }
}
