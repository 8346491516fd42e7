use serde::{Deserialize, Serialize};

use crate::robot::MapData;

/// A saved map location offered on the directions screens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterest {
    pub id: String,
    /// Position of the layer within the map's location list.
    pub index: usize,
    pub x: f32,
    pub y: f32,
}

/// Resolves the configured location ids against the map layers, keeping the
/// configured order. Ids with no matching layer are skipped; a layer without
/// poses resolves to the origin.
pub fn points_of_interest(map: &MapData, ids: &[String]) -> Vec<PointOfInterest> {
    let mut resolved = Vec::with_capacity(ids.len());

    for id in ids {
        let Some(index) = map.locations.iter().position(|layer| &layer.layer_id == id) else {
            log::warn!("Location '{id}' not found on the current map");
            continue;
        };

        let pose = map.locations[index].poses.first();
        resolved.push(PointOfInterest {
            id: id.clone(),
            index,
            x: pose.map(|p| p.x).unwrap_or(0.0),
            y: pose.map(|p| p.y).unwrap_or(0.0),
        });
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Pose;
    use crate::robot::{MapImage, MapInfo, MapLayer};

    fn layer(id: &str, poses: Vec<Pose>) -> MapLayer {
        MapLayer {
            layer_id: id.to_string(),
            poses,
        }
    }

    fn map() -> MapData {
        MapData {
            info: MapInfo::default(),
            image: MapImage::default(),
            locations: vec![
                layer("home base", vec![Pose::new(0.0, 0.0)]),
                layer("cafe", vec![Pose::new(4.0, -1.5), Pose::new(9.0, 9.0)]),
                layer("art gallery", vec![]),
                layer("info services", vec![Pose::new(-3.0, 2.0)]),
            ],
        }
    }

    #[test]
    fn keeps_configured_order_and_skips_unknown() {
        let ids: Vec<String> = ["info services", "missing", "cafe"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let points = points_of_interest(&map(), &ids);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].id, "info services");
        assert_eq!(points[0].index, 3);
        assert_eq!((points[0].x, points[0].y), (-3.0, 2.0));
        assert_eq!(points[1].id, "cafe");
        assert_eq!((points[1].x, points[1].y), (4.0, -1.5));
    }

    #[test]
    fn layer_without_pose_resolves_to_origin() {
        let points = points_of_interest(&map(), &["art gallery".to_string()]);
        assert_eq!(points[0].index, 2);
        assert_eq!((points[0].x, points[0].y), (0.0, 0.0));
    }
}
