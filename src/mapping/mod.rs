pub mod calibration;
pub mod locations;
pub mod mapper;
pub mod tracker;

pub use calibration::{CalibrationPair, MarkerGeometry, PlanePoint};
pub use locations::{points_of_interest, PointOfInterest};
pub use mapper::{map_position, CoordinateMapper, MappedPosition, Pose};
pub use tracker::MarkerTracker;
