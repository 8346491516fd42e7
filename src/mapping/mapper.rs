use serde::{Deserialize, Serialize};

use super::CalibrationPair;

/// Robot pose in the navigation frame, as reported by localization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub yaw: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, yaw: 0.0 }
    }
}

/// Marker offset in map-image pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MappedPosition {
    pub x: f32,
    pub y: f32,
}

/// Maps a pose onto the map image using per-axis scale factors derived from
/// the calibration pair.
///
/// An axis whose two real-world calibration values coincide gets a scale of
/// 1, which turns the mapping on that axis into a plain translation that
/// always lands on the first map point.
pub fn map_position(real: Pose, calib: &CalibrationPair) -> MappedPosition {
    let (scale_x, scale_y) = calib.scale();

    MappedPosition {
        x: calib.map_one.x + (real.x - calib.real_one.x) * scale_x,
        y: calib.map_one.y + (real.y - calib.real_one.y) * scale_y,
    }
}

/// Calibration fixed at startup, applied to every pose update.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    calibration: CalibrationPair,
}

impl CoordinateMapper {
    pub fn new(calibration: CalibrationPair) -> Self {
        let (scale_x, scale_y) = calibration.scale();
        log::info!(
            "Coordinate mapper ready (scale_x={scale_x}, scale_y={scale_y}, degenerate={})",
            calibration.is_degenerate()
        );
        Self { calibration }
    }

    pub fn calibration(&self) -> &CalibrationPair {
        &self.calibration
    }

    pub fn map(&self, pose: Pose) -> MappedPosition {
        map_position(pose, &self.calibration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::PlanePoint;

    const EPS: f32 = 1e-3;

    fn sample() -> CalibrationPair {
        CalibrationPair::new(
            PlanePoint::new(0.0, 0.0),
            PlanePoint::new(10.0, 0.0),
            PlanePoint::new(100.0, 200.0),
            PlanePoint::new(300.0, 200.0),
        )
    }

    fn skewed() -> CalibrationPair {
        CalibrationPair::new(
            PlanePoint::new(-1.25, 3.5),
            PlanePoint::new(4.75, -2.0),
            PlanePoint::new(-140.0, -90.0),
            PlanePoint::new(170.0, 125.0),
        )
    }

    #[test]
    fn midpoint_of_example_calibration() {
        let mapped = map_position(Pose::new(5.0, 0.0), &sample());
        assert_eq!(mapped, MappedPosition { x: 200.0, y: 200.0 });
    }

    #[test]
    fn calibration_points_map_onto_their_pixels() {
        let calib = skewed();

        let first = map_position(Pose::new(calib.real_one.x, calib.real_one.y), &calib);
        assert_eq!(first.x, calib.map_one.x);
        assert_eq!(first.y, calib.map_one.y);

        let second = map_position(Pose::new(calib.real_two.x, calib.real_two.y), &calib);
        assert!((second.x - calib.map_two.x).abs() < EPS);
        assert!((second.y - calib.map_two.y).abs() < EPS);
    }

    #[test]
    fn mapping_is_linear_between_poses() {
        let mapper = CoordinateMapper::new(skewed());
        let p1 = Pose::new(-3.0, 7.0);
        let p2 = Pose::new(12.5, -4.0);
        let m1 = mapper.map(p1);
        let m2 = mapper.map(p2);

        for step in 0..=10 {
            let a = step as f32 / 10.0;
            let blended = Pose::new(a * p1.x + (1.0 - a) * p2.x, a * p1.y + (1.0 - a) * p2.y);
            let mapped = mapper.map(blended);
            assert!((mapped.x - (a * m1.x + (1.0 - a) * m2.x)).abs() < EPS);
            assert!((mapped.y - (a * m1.y + (1.0 - a) * m2.y)).abs() < EPS);
        }
    }

    #[test]
    fn flat_axis_falls_back_to_unit_scale() {
        // Real y values coincide, so y is translated rather than scaled.
        let calib = sample();
        assert_eq!(calib.scale(), (20.0, 1.0));
        for y in [0.0_f32, 3.0, -8.0] {
            let mapped = map_position(Pose::new(2.0, y), &calib);
            assert_eq!(mapped.y, calib.map_one.y + y);
        }
    }

    #[test]
    fn flat_axis_is_constant_along_the_calibration_line() {
        let calib = sample();
        for x in [-4.0_f32, 0.0, 7.5, 30.0] {
            assert_eq!(map_position(Pose::new(x, 0.0), &calib).y, calib.map_one.y);
        }
    }

    #[test]
    fn coincident_points_degenerate_to_translation() {
        let calib = CalibrationPair::new(
            PlanePoint::new(2.0, 2.0),
            PlanePoint::new(2.0, 2.0),
            PlanePoint::new(50.0, 60.0),
            PlanePoint::new(90.0, 10.0),
        );
        assert!(calib.is_degenerate());
        assert_eq!(calib.scale(), (1.0, 1.0));

        let mapped = map_position(Pose::new(5.0, -1.0), &calib);
        assert_eq!(mapped, MappedPosition { x: 53.0, y: 57.0 });
    }

    #[test]
    fn repeated_calls_are_identical() {
        let mapper = CoordinateMapper::new(skewed());
        let pose = Pose { x: 1.5, y: -0.25, yaw: 0.7 };
        assert_eq!(mapper.map(pose), mapper.map(pose));
    }
}
