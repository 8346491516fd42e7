use std::{sync::Arc, time::Duration};

use anyhow::Result;
use log::{debug, info, warn};
use tokio::sync::watch;

use super::{
    AsrResult, BeWithMeState, ConversationStatus, DetectionData, DetectionState, HardButton,
    Language, LocationState, MapData, Movement, MovementStatus, MovementType, RobotEvent,
    RobotSdk, SpeedLevel, TtsRequest, TtsStatus,
};
use crate::mapping::Pose;
use crate::session::{ActivityFlags, ActivitySource};
use crate::settings::RobotSettings;

const SKID_JOY_SETTLE: Duration = Duration::from_millis(500);

/// Latest value of every SDK callback, each observable on its own channel.
struct Observables {
    ready: watch::Sender<bool>,
    tts_status: watch::Sender<TtsStatus>,
    detection_state: watch::Sender<DetectionState>,
    detection_data: watch::Sender<DetectionData>,
    movement: watch::Sender<Movement>,
    lifted: watch::Sender<bool>,
    dragged: watch::Sender<bool>,
    asr: watch::Sender<AsrResult>,
    language: watch::Sender<Language>,
    wake_word: watch::Sender<String>,
    waveform: watch::Sender<Vec<u8>>,
    conversation: watch::Sender<ConversationStatus>,
    conversation_attached: watch::Sender<bool>,
    location_state: watch::Sender<LocationState>,
    be_with_me: watch::Sender<BeWithMeState>,
    position: watch::Sender<Pose>,
    thinking: watch::Sender<bool>,
}

impl Observables {
    fn new() -> Self {
        Self {
            ready: watch::channel(false).0,
            tts_status: watch::channel(TtsStatus::default()).0,
            detection_state: watch::channel(DetectionState::default()).0,
            detection_data: watch::channel(DetectionData::default()).0,
            movement: watch::channel(Movement::default()).0,
            lifted: watch::channel(false).0,
            dragged: watch::channel(false).0,
            asr: watch::channel(AsrResult::default()).0,
            language: watch::channel(Language::default()).0,
            wake_word: watch::channel(String::new()).0,
            waveform: watch::channel(Vec::new()).0,
            conversation: watch::channel(ConversationStatus::default()).0,
            conversation_attached: watch::channel(false).0,
            location_state: watch::channel(LocationState::default()).0,
            be_with_me: watch::channel(BeWithMeState::default()).0,
            position: watch::channel(Pose::default()).0,
            thinking: watch::channel(false).0,
        }
    }
}

/// Thin layer over the robot SDK: mirrors its callbacks into observable state
/// and forwards commands.
#[derive(Clone)]
pub struct RobotController {
    sdk: Arc<dyn RobotSdk>,
    state: Arc<Observables>,
    setup: RobotSettings,
}

impl RobotController {
    pub fn new(sdk: Arc<dyn RobotSdk>, setup: RobotSettings) -> Self {
        Self {
            sdk,
            state: Arc::new(Observables::new()),
            setup,
        }
    }

    /// Routes one SDK callback into the matching observable. Payloads that do
    /// not parse leave the previous value in place.
    pub fn dispatch(&self, event: RobotEvent) {
        let state = &self.state;
        match event {
            RobotEvent::Ready(is_ready) => {
                state.ready.send_replace(is_ready);
                if is_ready {
                    self.apply_setup();
                }
            }
            RobotEvent::TtsStatusChanged(status) => {
                state.tts_status.send_replace(status);
            }
            RobotEvent::DetectionStateChanged(code) => match DetectionState::from_state(code) {
                Some(detection) => {
                    state.detection_state.send_replace(detection);
                }
                None => debug!("ignoring unknown detection state {code}"),
            },
            RobotEvent::DetectionDataChanged(data) => {
                state.detection_data.send_replace(data);
            }
            RobotEvent::MovementStatusChanged { kind, status } => {
                match (MovementType::parse(&kind), MovementStatus::parse(&status)) {
                    (Some(kind), Some(status)) => {
                        state.movement.send_replace(Movement { kind, status });
                    }
                    _ => debug!("ignoring movement update {kind}/{status}"),
                }
            }
            RobotEvent::Lifted { lifted, reason } => {
                if lifted {
                    warn!("robot lifted: {reason}");
                }
                state.lifted.send_replace(lifted);
            }
            RobotEvent::DragStateChanged(dragged) => {
                state.dragged.send_replace(dragged);
            }
            RobotEvent::AsrResult { text, language } => {
                state.asr.send_modify(|asr| {
                    asr.text = text;
                    asr.sequence = asr.sequence.wrapping_add(1);
                });
                if let Some(language) = Language::from_value(language) {
                    state.language.send_replace(language);
                }
            }
            RobotEvent::WakeupWord { word, direction } => {
                debug!("wake-up word '{word}' from direction {direction}");
                state.wake_word.send_replace(word);
            }
            RobotEvent::TtsWaveform(waveform) => {
                state.waveform.send_replace(waveform);
            }
            RobotEvent::ConversationStatusChanged { status, text } => {
                state
                    .conversation
                    .send_replace(ConversationStatus { status, text });
            }
            RobotEvent::ConversationAttached(attached) => {
                state.conversation_attached.send_replace(attached);
            }
            RobotEvent::GoToLocationStatusChanged {
                location,
                status,
                description_id,
                description,
            } => match LocationState::parse(&status) {
                Some(location_state) => {
                    info!("go-to '{location}': {status}");
                    state.location_state.send_replace(location_state);
                }
                None => debug!(
                    "ignoring go-to status '{status}' for '{location}' ({description_id}: {description})"
                ),
            },
            RobotEvent::BeWithMeStatusChanged(status) => match BeWithMeState::parse(&status) {
                Some(be_with_me) => {
                    state.be_with_me.send_replace(be_with_me);
                }
                None => debug!("ignoring be-with-me status '{status}'"),
            },
            RobotEvent::PositionChanged(pose) => {
                state.position.send_replace(pose);
            }
        }
    }

    fn apply_setup(&self) {
        let setup = &self.setup;
        let result = (|| -> Result<()> {
            self.sdk.set_cliff_detection(true)?;
            self.sdk.set_detection_mode(true, setup.detection_distance)?;
            self.sdk.set_volume(setup.volume)?;
            self.sdk
                .set_hard_button_enabled(HardButton::Volume, !setup.disable_volume_button)?;
            self.sdk
                .set_hard_button_enabled(HardButton::Main, !setup.disable_main_button)?;
            self.sdk.set_hard_button_enabled(HardButton::Power, true)?;
            if setup.hide_top_bar {
                self.sdk.hide_top_bar()?;
            }
            self.sdk.set_kiosk_mode(setup.kiosk_mode)?;
            Ok(())
        })();

        match result {
            Ok(()) => info!(
                "robot ready; volume {}, kiosk mode {}, battery {:?}",
                setup.volume,
                setup.kiosk_mode,
                self.sdk.battery_level()
            ),
            Err(err) => warn!("robot setup incomplete: {err:#}"),
        }
    }

    /// Marks that an answer is being prepared for the visitor.
    pub fn set_thinking(&self, thinking: bool) {
        self.state.thinking.send_replace(thinking);
    }

    pub fn is_ready(&self) -> bool {
        *self.state.ready.borrow()
    }

    pub fn tts_status(&self) -> watch::Receiver<TtsStatus> {
        self.state.tts_status.subscribe()
    }

    pub fn detection_state(&self) -> watch::Receiver<DetectionState> {
        self.state.detection_state.subscribe()
    }

    pub fn detection_data(&self) -> watch::Receiver<DetectionData> {
        self.state.detection_data.subscribe()
    }

    pub fn movement(&self) -> watch::Receiver<Movement> {
        self.state.movement.subscribe()
    }

    pub fn lifted(&self) -> watch::Receiver<bool> {
        self.state.lifted.subscribe()
    }

    pub fn dragged(&self) -> watch::Receiver<bool> {
        self.state.dragged.subscribe()
    }

    pub fn asr_result(&self) -> watch::Receiver<AsrResult> {
        self.state.asr.subscribe()
    }

    pub fn language(&self) -> watch::Receiver<Language> {
        self.state.language.subscribe()
    }

    pub fn wake_word(&self) -> watch::Receiver<String> {
        self.state.wake_word.subscribe()
    }

    pub fn waveform(&self) -> watch::Receiver<Vec<u8>> {
        self.state.waveform.subscribe()
    }

    pub fn conversation(&self) -> watch::Receiver<ConversationStatus> {
        self.state.conversation.subscribe()
    }

    pub fn conversation_attached(&self) -> watch::Receiver<bool> {
        self.state.conversation_attached.subscribe()
    }

    pub fn location_state(&self) -> watch::Receiver<LocationState> {
        self.state.location_state.subscribe()
    }

    pub fn be_with_me(&self) -> watch::Receiver<BeWithMeState> {
        self.state.be_with_me.subscribe()
    }

    pub fn positions(&self) -> watch::Receiver<Pose> {
        self.state.position.subscribe()
    }

    pub async fn speak(&self, speech: &str, buffer: Duration, animation_only: bool) -> Result<()> {
        tokio::time::sleep(buffer).await;
        self.sdk.speak(TtsRequest::new(speech, animation_only))?;
        tokio::time::sleep(buffer).await;
        Ok(())
    }

    pub async fn turn_by(&self, degrees: i32, speed: f32, buffer: Duration) -> Result<()> {
        tokio::time::sleep(buffer).await;
        self.sdk.turn_by(degrees, speed)?;
        tokio::time::sleep(buffer).await;
        Ok(())
    }

    pub async fn tilt_angle(&self, degrees: i32, speed: f32, buffer: Duration) -> Result<()> {
        tokio::time::sleep(buffer).await;
        self.sdk.tilt_angle(degrees, speed)?;
        tokio::time::sleep(buffer).await;
        Ok(())
    }

    pub async fn skid_joy(&self, x: f32, y: f32) -> Result<()> {
        self.sdk.skid_joy(x, y)?;
        tokio::time::sleep(SKID_JOY_SETTLE).await;
        Ok(())
    }

    pub fn go_to(&self, location: &str, backwards: bool) -> Result<()> {
        info!("heading to '{location}'");
        self.sdk.go_to(location, backwards)
    }

    pub fn go_to_position(&self, pose: Pose) -> Result<()> {
        self.sdk.go_to_position(pose)
    }

    pub fn set_go_to_speed(&self, speed: SpeedLevel) -> Result<()> {
        self.sdk.set_go_to_speed(speed)
    }

    pub fn stop_movement(&self) -> Result<()> {
        self.sdk.stop_movement()
    }

    pub fn ask_question(&self, question: &str) -> Result<()> {
        self.sdk.ask_question(question)
    }

    pub fn wake_up(&self) -> Result<()> {
        self.sdk.wake_up()
    }

    pub fn finish_conversation(&self) -> Result<()> {
        self.sdk.finish_conversation()
    }

    pub fn set_volume(&self, level: u8) -> Result<()> {
        self.sdk.set_volume(level)
    }

    pub fn set_detection_mode(&self, on: bool) -> Result<()> {
        self.sdk.set_detection_mode(on, self.setup.detection_distance)
    }

    pub fn set_power_button_enabled(&self, enabled: bool) -> Result<()> {
        self.sdk.set_hard_button_enabled(HardButton::Power, enabled)
    }

    pub fn set_main_button_enabled(&self, enabled: bool) -> Result<()> {
        self.sdk.set_hard_button_enabled(HardButton::Main, enabled)
    }

    pub fn set_cliff_detection(&self, on: bool) -> Result<()> {
        self.sdk.set_cliff_detection(on)
    }

    /// Current pose straight from the SDK, falling back to the last mirrored
    /// update.
    pub fn position(&self) -> Pose {
        self.sdk
            .position()
            .unwrap_or_else(|| *self.state.position.borrow())
    }

    pub fn map_data(&self) -> Option<MapData> {
        self.sdk.map_data()
    }

    pub fn battery_level(&self) -> Option<u8> {
        self.sdk.battery_level()
    }
}

impl ActivitySource for RobotController {
    fn activity(&self) -> ActivityFlags {
        let state = &self.state;
        let conversation = state.conversation.borrow();

        ActivityFlags {
            thinking: *state.thinking.borrow() || conversation.is_thinking(),
            talking: state.tts_status.borrow().is_speaking(),
            moving: state.location_state.borrow().is_in_progress()
                || state.movement.borrow().status.is_in_progress(),
            listening: conversation.is_listening(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::{SdkCommand, SimulatedRobot};

    fn controller() -> (Arc<SimulatedRobot>, RobotController) {
        let sim = Arc::new(SimulatedRobot::new(None));
        let controller = RobotController::new(sim.clone(), RobotSettings::default());
        (sim, controller)
    }

    #[test]
    fn unknown_payloads_keep_previous_state() {
        let (_sim, robot) = controller();
        let location = robot.location_state();

        robot.dispatch(RobotEvent::GoToLocationStatusChanged {
            location: "cafe".into(),
            status: "going".into(),
            description_id: 0,
            description: String::new(),
        });
        assert_eq!(*location.borrow(), LocationState::Going);

        robot.dispatch(RobotEvent::GoToLocationStatusChanged {
            location: "cafe".into(),
            status: "teleporting".into(),
            description_id: 0,
            description: String::new(),
        });
        assert_eq!(*location.borrow(), LocationState::Going);

        robot.dispatch(RobotEvent::DetectionStateChanged(2));
        robot.dispatch(RobotEvent::DetectionStateChanged(9));
        assert_eq!(*robot.detection_state().borrow(), DetectionState::Detected);
    }

    #[test]
    fn movement_needs_both_type_and_status() {
        let (_sim, robot) = controller();

        robot.dispatch(RobotEvent::MovementStatusChanged {
            kind: "turnBy".into(),
            status: "going".into(),
        });
        robot.dispatch(RobotEvent::MovementStatusChanged {
            kind: "hover".into(),
            status: "complete".into(),
        });

        let movement = *robot.movement().borrow();
        assert_eq!(movement.kind, MovementType::TurnBy);
        assert_eq!(movement.status, MovementStatus::Going);
    }

    #[test]
    fn activity_reflects_speech_motion_and_conversation() {
        let (_sim, robot) = controller();
        assert_eq!(robot.activity(), ActivityFlags::default());

        robot.dispatch(RobotEvent::TtsStatusChanged(TtsStatus::Started));
        assert!(robot.activity().talking);
        robot.dispatch(RobotEvent::TtsStatusChanged(TtsStatus::Completed));
        assert!(!robot.activity().talking);

        robot.dispatch(RobotEvent::ConversationStatusChanged {
            status: ConversationStatus::LISTENING,
            text: String::new(),
        });
        assert!(robot.activity().listening);

        robot.set_thinking(true);
        assert!(robot.activity().thinking);

        robot.dispatch(RobotEvent::GoToLocationStatusChanged {
            location: "art gallery".into(),
            status: "calculating".into(),
            description_id: 0,
            description: String::new(),
        });
        assert!(robot.activity().moving);
        assert!(robot.activity().any());
    }

    #[test]
    fn asr_results_bump_sequence_and_language() {
        let (_sim, robot) = controller();
        let asr = robot.asr_result();

        robot.dispatch(RobotEvent::AsrResult {
            text: "where is the cafe".into(),
            language: 1,
        });
        robot.dispatch(RobotEvent::AsrResult {
            text: "where is the cafe".into(),
            language: 99,
        });

        assert_eq!(asr.borrow().sequence, 2);
        assert_eq!(*robot.language().borrow(), Language::EnUs);
    }

    #[test]
    fn ready_applies_configured_setup() {
        let (sim, robot) = controller();

        robot.dispatch(RobotEvent::Ready(false));
        assert!(sim.commands().is_empty());

        robot.dispatch(RobotEvent::Ready(true));
        assert!(robot.is_ready());

        let commands = sim.commands();
        assert_eq!(commands.first(), Some(&SdkCommand::SetCliffDetection(true)));
        assert!(commands.contains(&SdkCommand::SetVolume(4)));
        assert!(commands.contains(&SdkCommand::SetHardButtonEnabled {
            button: HardButton::Main,
            enabled: false,
        }));
        assert_eq!(commands.last(), Some(&SdkCommand::SetKioskMode(false)));
    }

    #[test]
    fn position_falls_back_to_last_update() {
        let (sim, robot) = controller();
        robot.dispatch(RobotEvent::PositionChanged(Pose::new(1.0, 2.0)));
        assert_eq!(robot.position(), Pose::new(1.0, 2.0));

        sim.set_position(Pose::new(3.0, 4.0));
        assert_eq!(robot.position(), Pose::new(3.0, 4.0));
    }

    #[tokio::test(start_paused = true)]
    async fn speak_waits_out_the_buffer() {
        let (sim, robot) = controller();
        let started = tokio::time::Instant::now();

        robot
            .speak("Welcome to the library", Duration::from_millis(250), true)
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(500));
        assert_eq!(
            sim.commands(),
            vec![SdkCommand::Speak(TtsRequest::new("Welcome to the library", true))]
        );
    }
}
