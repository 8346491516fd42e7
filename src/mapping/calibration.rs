use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::robot::MapData;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanePoint {
    pub x: f32,
    pub y: f32,
}

impl PlanePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Two matched (real-world, map-pixel) samples defining the affine mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationPair {
    pub real_one: PlanePoint,
    pub real_two: PlanePoint,
    pub map_one: PlanePoint,
    pub map_two: PlanePoint,
}

/// Shape of the marker overlay and how map metadata is reduced into the
/// second real-world reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerGeometry {
    /// Integer divisor applied to the map width/height.
    pub divisor: u32,
    /// Marker size in pixels; shifts the map points so the marker tip sits
    /// on the pose.
    pub marker_size: f32,
}

impl Default for MarkerGeometry {
    fn default() -> Self {
        Self {
            divisor: 20,
            marker_size: 30.0,
        }
    }
}

impl CalibrationPair {
    pub fn new(
        real_one: PlanePoint,
        real_two: PlanePoint,
        map_one: PlanePoint,
        map_two: PlanePoint,
    ) -> Self {
        Self {
            real_one,
            real_two,
            map_one,
            map_two,
        }
    }

    /// Derives the calibration from the robot's map metadata.
    ///
    /// The first real point is the map origin, the second is the origin
    /// advanced by the map extent divided by `geometry.divisor` (integer
    /// division). The pixel points sit a quarter of the image size either side
    /// of the image centre, nudged by the marker size.
    pub fn from_map_data(map: &MapData, geometry: &MarkerGeometry) -> Result<Self> {
        if geometry.divisor == 0 {
            bail!("calibration divisor must be greater than zero");
        }

        let info = &map.info;
        let real_one = PlanePoint::new(info.origin_x, info.origin_y);
        let real_two = PlanePoint::new(
            info.origin_x + (info.width / geometry.divisor) as f32,
            info.origin_y + (info.height / geometry.divisor) as f32,
        );

        let marker = geometry.marker_size;
        let x_offset = map.image.rows as f32 / 4.0;
        let y_offset = map.image.cols as f32 / 4.0 + marker;

        let map_one = PlanePoint::new(-x_offset + marker, -(y_offset - marker));
        let map_two = PlanePoint::new(x_offset + marker, y_offset - marker);

        Ok(Self::new(real_one, real_two, map_one, map_two))
    }

    /// Per-axis scale factors; an axis with no real-world extent scales by 1.
    pub fn scale(&self) -> (f32, f32) {
        (
            axis_scale(self.real_one.x, self.real_two.x, self.map_one.x, self.map_two.x),
            axis_scale(self.real_one.y, self.real_two.y, self.map_one.y, self.map_two.y),
        )
    }

    /// True when both real-world points coincide.
    pub fn is_degenerate(&self) -> bool {
        self.real_one == self.real_two
    }
}

fn axis_scale(real_one: f32, real_two: f32, map_one: f32, map_two: f32) -> f32 {
    let real_delta = real_two - real_one;
    if real_delta != 0.0 {
        (map_two - map_one) / real_delta
    } else {
        1.0
    }
}
