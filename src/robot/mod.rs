pub mod controller;
pub mod events;
pub mod map;
pub mod sdk;
pub mod sim;

pub use controller::RobotController;
pub use events::{
    AsrResult, BeWithMeState, ConversationStatus, DetectionData, DetectionState, Language,
    LocationState, Movement, MovementStatus, MovementType, RobotEvent, TtsStatus,
};
pub use map::{MapData, MapImage, MapInfo, MapLayer};
pub use sdk::{HardButton, RobotSdk, SpeedLevel, TtsRequest};
pub use sim::{SdkCommand, SimulatedRobot};
