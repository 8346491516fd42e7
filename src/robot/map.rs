use serde::{Deserialize, Serialize};

use crate::mapping::Pose;

/// Map metadata as delivered by the SDK.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    pub info: MapInfo,
    pub image: MapImage,
    pub locations: Vec<MapLayer>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapInfo {
    pub origin_x: f32,
    pub origin_y: f32,
    pub width: u32,
    pub height: u32,
}

/// Occupancy image, row-major. Cell values: -1 unknown, 0 floor,
/// 70 obstacle, 100 wall.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapImage {
    pub rows: u32,
    pub cols: u32,
    pub data: Vec<i32>,
}

/// A named layer (saved location) with its poses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayer {
    pub layer_id: String,
    pub poses: Vec<Pose>,
}

impl MapData {
    pub fn layer(&self, layer_id: &str) -> Option<&MapLayer> {
        self.locations.iter().find(|layer| layer.layer_id == layer_id)
    }

    /// First pose of the "home base" layer, if the map has one.
    pub fn home_base(&self) -> Option<Pose> {
        self.layer("home base").and_then(|layer| layer.poses.first().copied())
    }
}
