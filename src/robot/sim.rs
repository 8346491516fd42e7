use std::sync::{Mutex, MutexGuard};

use anyhow::Result;

use super::{HardButton, MapData, MapImage, MapInfo, MapLayer, RobotSdk, SpeedLevel, TtsRequest};
use crate::mapping::Pose;

/// Every command the simulated robot has received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkCommand {
    Speak(TtsRequest),
    GoTo { location: String, backwards: bool },
    GoToPosition(Pose),
    SetGoToSpeed(SpeedLevel),
    TurnBy { degrees: i32, speed: f32 },
    TiltAngle { degrees: i32, speed: f32 },
    SkidJoy { x: f32, y: f32 },
    StopMovement,
    AskQuestion(String),
    WakeUp,
    FinishConversation,
    SetVolume(u8),
    SetDetectionMode { on: bool, distance: f32 },
    SetHardButtonEnabled { button: HardButton, enabled: bool },
    SetCliffDetection(bool),
    SetKioskMode(bool),
    HideTopBar,
}

/// In-memory stand-in for the vendor SDK, used off-robot.
#[derive(Debug, Default)]
pub struct SimulatedRobot {
    commands: Mutex<Vec<SdkCommand>>,
    position: Mutex<Option<Pose>>,
    map: Option<MapData>,
    battery: Option<u8>,
}

impl SimulatedRobot {
    pub fn new(map: Option<MapData>) -> Self {
        Self {
            map,
            battery: Some(100),
            ..Self::default()
        }
    }

    /// A small floor plan with a handful of saved locations.
    pub fn with_demo_map() -> Self {
        let layer = |id: &str, x: f32, y: f32| MapLayer {
            layer_id: id.to_string(),
            poses: vec![Pose::new(x, y)],
        };

        Self::new(Some(MapData {
            info: MapInfo {
                origin_x: -6.0,
                origin_y: -4.0,
                width: 480,
                height: 320,
            },
            image: MapImage {
                rows: 320,
                cols: 480,
                data: vec![0; 320 * 480],
            },
            locations: vec![
                layer("home base", 0.0, 0.0),
                layer("info services", 2.5, 1.0),
                layer("cafe", -3.0, 4.5),
                layer("art gallery", 8.0, -2.0),
                layer("exhibition space", 5.5, 6.0),
            ],
        }))
    }

    pub fn set_position(&self, pose: Pose) {
        *lock(&self.position) = Some(pose);
    }

    pub fn commands(&self) -> Vec<SdkCommand> {
        lock(&self.commands).clone()
    }

    fn record(&self, command: SdkCommand) -> Result<()> {
        log::debug!("sim robot <- {command:?}");
        lock(&self.commands).push(command);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl RobotSdk for SimulatedRobot {
    fn speak(&self, request: TtsRequest) -> Result<()> {
        self.record(SdkCommand::Speak(request))
    }

    fn go_to(&self, location: &str, backwards: bool) -> Result<()> {
        self.record(SdkCommand::GoTo {
            location: location.to_string(),
            backwards,
        })
    }

    fn go_to_position(&self, pose: Pose) -> Result<()> {
        self.record(SdkCommand::GoToPosition(pose))
    }

    fn set_go_to_speed(&self, speed: SpeedLevel) -> Result<()> {
        self.record(SdkCommand::SetGoToSpeed(speed))
    }

    fn turn_by(&self, degrees: i32, speed: f32) -> Result<()> {
        self.record(SdkCommand::TurnBy { degrees, speed })
    }

    fn tilt_angle(&self, degrees: i32, speed: f32) -> Result<()> {
        self.record(SdkCommand::TiltAngle { degrees, speed })
    }

    fn skid_joy(&self, x: f32, y: f32) -> Result<()> {
        self.record(SdkCommand::SkidJoy { x, y })
    }

    fn stop_movement(&self) -> Result<()> {
        self.record(SdkCommand::StopMovement)
    }

    fn ask_question(&self, question: &str) -> Result<()> {
        self.record(SdkCommand::AskQuestion(question.to_string()))
    }

    fn wake_up(&self) -> Result<()> {
        self.record(SdkCommand::WakeUp)
    }

    fn finish_conversation(&self) -> Result<()> {
        self.record(SdkCommand::FinishConversation)
    }

    fn set_volume(&self, level: u8) -> Result<()> {
        self.record(SdkCommand::SetVolume(level))
    }

    fn set_detection_mode(&self, on: bool, distance: f32) -> Result<()> {
        self.record(SdkCommand::SetDetectionMode { on, distance })
    }

    fn set_hard_button_enabled(&self, button: HardButton, enabled: bool) -> Result<()> {
        self.record(SdkCommand::SetHardButtonEnabled { button, enabled })
    }

    fn set_cliff_detection(&self, on: bool) -> Result<()> {
        self.record(SdkCommand::SetCliffDetection(on))
    }

    fn set_kiosk_mode(&self, on: bool) -> Result<()> {
        self.record(SdkCommand::SetKioskMode(on))
    }

    fn hide_top_bar(&self) -> Result<()> {
        self.record(SdkCommand::HideTopBar)
    }

    fn position(&self) -> Option<Pose> {
        *lock(&self.position)
    }

    fn map_data(&self) -> Option<MapData> {
        self.map.clone()
    }

    fn battery_level(&self) -> Option<u8> {
        self.battery
    }
}
