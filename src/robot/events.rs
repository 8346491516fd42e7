use serde::{Deserialize, Serialize};

use crate::mapping::Pose;

/// Callback payloads from the robot SDK, one variant per listener.
#[derive(Debug, Clone, PartialEq)]
pub enum RobotEvent {
    Ready(bool),
    TtsStatusChanged(TtsStatus),
    DetectionStateChanged(i32),
    DetectionDataChanged(DetectionData),
    MovementStatusChanged { kind: String, status: String },
    Lifted { lifted: bool, reason: String },
    DragStateChanged(bool),
    AsrResult { text: String, language: i32 },
    WakeupWord { word: String, direction: i32 },
    TtsWaveform(Vec<u8>),
    ConversationStatusChanged { status: i32, text: String },
    ConversationAttached(bool),
    GoToLocationStatusChanged {
        location: String,
        status: String,
        description_id: i32,
        description: String,
    },
    BeWithMeStatusChanged(String),
    PositionChanged(Pose),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TtsStatus {
    #[default]
    Pending,
    Processing,
    Started,
    Completed,
    Error,
    NotAllowed,
    Cancelled,
}

impl TtsStatus {
    pub fn is_speaking(self) -> bool {
        matches!(self, TtsStatus::Processing | TtsStatus::Started)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetectionState {
    #[default]
    Idle,
    Lost,
    Detected,
}

impl DetectionState {
    pub fn from_state(state: i32) -> Option<Self> {
        match state {
            0 => Some(DetectionState::Idle),
            1 => Some(DetectionState::Lost),
            2 => Some(DetectionState::Detected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionData {
    pub angle: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MovementType {
    SkidJoy,
    TurnBy,
    #[default]
    None,
}

impl MovementType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "skidJoy" => Some(MovementType::SkidJoy),
            "turnBy" => Some(MovementType::TurnBy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MovementStatus {
    Start,
    Going,
    ObstacleDetected,
    #[default]
    NodeInactive,
    Calculating,
    Complete,
    Abort,
}

impl MovementStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "start" => Some(MovementStatus::Start),
            "going" => Some(MovementStatus::Going),
            "obstacle detected" => Some(MovementStatus::ObstacleDetected),
            "node inactive" => Some(MovementStatus::NodeInactive),
            "calculating" => Some(MovementStatus::Calculating),
            "complete" => Some(MovementStatus::Complete),
            "abort" => Some(MovementStatus::Abort),
            _ => None,
        }
    }

    pub fn is_in_progress(self) -> bool {
        matches!(
            self,
            MovementStatus::Start
                | MovementStatus::Going
                | MovementStatus::Calculating
                | MovementStatus::ObstacleDetected
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub kind: MovementType,
    pub status: MovementStatus,
}

/// Recognition language reported with ASR results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    System,
    EnUs,
    ZhCn,
    ZhHk,
    ZhTw,
    ThTh,
    HeIl,
    KoKr,
    JaJp,
    InId,
    IdId,
    DeDe,
    FrFr,
    FrCa,
    PtBr,
    ArEg,
    ArAe,
    ArXa,
    RuRu,
    ItIt,
    PlPl,
    EsEs,
    CaEs,
    HiIn,
    EtEe,
    TrTr,
    EnIn,
    MsMy,
    ViVn,
    ElGr,
}

impl Language {
    const ALL: [Language; 30] = [
        Language::System,
        Language::EnUs,
        Language::ZhCn,
        Language::ZhHk,
        Language::ZhTw,
        Language::ThTh,
        Language::HeIl,
        Language::KoKr,
        Language::JaJp,
        Language::InId,
        Language::IdId,
        Language::DeDe,
        Language::FrFr,
        Language::FrCa,
        Language::PtBr,
        Language::ArEg,
        Language::ArAe,
        Language::ArXa,
        Language::RuRu,
        Language::ItIt,
        Language::PlPl,
        Language::EsEs,
        Language::CaEs,
        Language::HiIn,
        Language::EtEe,
        Language::TrTr,
        Language::EnIn,
        Language::MsMy,
        Language::ViVn,
        Language::ElGr,
    ];

    pub fn from_value(value: i32) -> Option<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsrResult {
    pub text: String,
    /// Bumped on every result so repeated identical utterances still notify.
    pub sequence: u64,
}

/// Conversation layer state; `status` follows the SDK codes
/// (0 idle, 1 listening, 2 thinking, 3 speaking).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationStatus {
    pub status: i32,
    pub text: String,
}

impl ConversationStatus {
    pub const LISTENING: i32 = 1;
    pub const THINKING: i32 = 2;

    pub fn is_listening(&self) -> bool {
        self.status == Self::LISTENING
    }

    pub fn is_thinking(&self) -> bool {
        self.status == Self::THINKING
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationState {
    Start,
    Calculating,
    Going,
    Complete,
    #[default]
    Abort,
    Reposing,
}

impl LocationState {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "start" => Some(LocationState::Start),
            "calculating" => Some(LocationState::Calculating),
            "going" => Some(LocationState::Going),
            "complete" => Some(LocationState::Complete),
            "abort" => Some(LocationState::Abort),
            "reposing" => Some(LocationState::Reposing),
            _ => None,
        }
    }

    pub fn is_in_progress(self) -> bool {
        matches!(
            self,
            LocationState::Start
                | LocationState::Calculating
                | LocationState::Going
                | LocationState::Reposing
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BeWithMeState {
    #[default]
    Abort,
    Calculating,
    Search,
    Start,
    Track,
    ObstacleDetected,
}

impl BeWithMeState {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "abort" => Some(BeWithMeState::Abort),
            "calculating" => Some(BeWithMeState::Calculating),
            "search" => Some(BeWithMeState::Search),
            "start" => Some(BeWithMeState::Start),
            "track" => Some(BeWithMeState::Track),
            "obstacle detected" => Some(BeWithMeState::ObstacleDetected),
            _ => None,
        }
    }
}
