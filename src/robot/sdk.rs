use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::MapData;
use crate::mapping::Pose;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsRequest {
    pub speech: String,
    /// Show the text on the SDK's conversation layer.
    pub show_on_conversation_layer: bool,
    /// Animate the face only, without the text bubble.
    pub animation_only: bool,
    pub language: String,
}

impl TtsRequest {
    pub fn new(speech: impl Into<String>, animation_only: bool) -> Self {
        Self {
            speech: speech.into(),
            show_on_conversation_layer: false,
            animation_only,
            language: "en-US".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpeedLevel {
    Slow,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HardButton {
    Main,
    Power,
    Volume,
}

/// Command sink for the vendor robot SDK.
///
/// Implementations forward straight to the vendor API; errors are whatever
/// the binding reports.
pub trait RobotSdk: Send + Sync {
    fn speak(&self, request: TtsRequest) -> Result<()>;
    fn go_to(&self, location: &str, backwards: bool) -> Result<()>;
    fn go_to_position(&self, pose: Pose) -> Result<()>;
    fn set_go_to_speed(&self, speed: SpeedLevel) -> Result<()>;
    fn turn_by(&self, degrees: i32, speed: f32) -> Result<()>;
    fn tilt_angle(&self, degrees: i32, speed: f32) -> Result<()>;
    fn skid_joy(&self, x: f32, y: f32) -> Result<()>;
    fn stop_movement(&self) -> Result<()>;
    fn ask_question(&self, question: &str) -> Result<()>;
    fn wake_up(&self) -> Result<()>;
    fn finish_conversation(&self) -> Result<()>;
    fn set_volume(&self, level: u8) -> Result<()>;
    fn set_detection_mode(&self, on: bool, distance: f32) -> Result<()>;
    fn set_hard_button_enabled(&self, button: HardButton, enabled: bool) -> Result<()>;
    fn set_cliff_detection(&self, on: bool) -> Result<()>;
    fn set_kiosk_mode(&self, on: bool) -> Result<()>;
    fn hide_top_bar(&self) -> Result<()>;

    fn position(&self) -> Option<Pose>;
    fn map_data(&self) -> Option<MapData>;
    /// Battery percentage, `None` when the SDK has no reading.
    fn battery_level(&self) -> Option<u8>;
}
