pub mod mapping;
pub mod robot;
pub mod session;
pub mod settings;
pub mod speech;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use tokio::sync::{watch, Mutex};

use mapping::{
    points_of_interest, CalibrationPair, CoordinateMapper, MappedPosition, MarkerTracker,
    PointOfInterest,
};
use robot::{RobotController, RobotEvent, RobotSdk, SimulatedRobot};
use session::{ActivityWatcher, LoggingNavigator, Navigator, Screen, SessionController, SessionTiming};
use settings::SettingsStore;
use speech::{QuizCommentator, QuizOutcome};

const DEFAULT_SETTINGS_PATH: &str = "kiosk-settings.json";

/// Everything the kiosk runs on, constructed once at startup and torn down
/// with [`Kiosk::shutdown`].
pub struct Kiosk {
    pub robot: RobotController,
    pub session: SessionController,
    settings: SettingsStore,
    watcher: Mutex<ActivityWatcher>,
    tracker: Mutex<Option<MarkerTracker>>,
    marker: Option<watch::Receiver<MappedPosition>>,
    points_of_interest: Vec<PointOfInterest>,
    commentator: Mutex<QuizCommentator>,
}

impl Kiosk {
    pub async fn start(
        sdk: Arc<dyn RobotSdk>,
        navigator: Arc<dyn Navigator>,
        settings: SettingsStore,
    ) -> Result<Self> {
        let config = settings.snapshot();
        let robot = RobotController::new(sdk, config.robot.clone());
        let home_robot = robot.clone();
        let session = SessionController::new(navigator, SessionTiming::from(&config.session))
            .with_forced_home_hook(move || apply_speed_profile(&home_robot, Screen::Home));

        let mut watcher = ActivityWatcher::new();
        watcher.start(robot.clone(), session.clone())?;

        let (tracker, points) = match robot.map_data() {
            Some(map) => {
                let points = points_of_interest(&map, &config.map.points_of_interest);
                let tracker = match CalibrationPair::from_map_data(&map, &config.map.geometry()) {
                    Ok(calibration) => {
                        let mut tracker = MarkerTracker::new(CoordinateMapper::new(calibration));
                        tracker.start(robot.positions())?;
                        Some(tracker)
                    }
                    Err(err) => {
                        warn!("Position marker disabled: {err:#}");
                        None
                    }
                };
                (tracker, points)
            }
            None => {
                warn!("No map data from the robot; directions screens have no locations");
                (None, Vec::new())
            }
        };

        info!(
            "Kiosk started with {} points of interest, idle timeout {}s",
            points.len(),
            session.timing().idle_timeout.as_secs()
        );

        let kiosk = Self {
            marker: tracker.as_ref().map(MarkerTracker::subscribe),
            robot,
            session,
            settings,
            watcher: Mutex::new(watcher),
            tracker: Mutex::new(tracker),
            points_of_interest: points,
            commentator: Mutex::new(QuizCommentator::new()),
        };

        kiosk.screen_changed(Screen::Home).await;
        Ok(kiosk)
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn points_of_interest(&self) -> &[PointOfInterest] {
        &self.points_of_interest
    }

    /// Live marker position on the map image, if the map could be calibrated.
    pub fn marker(&self) -> Option<watch::Receiver<MappedPosition>> {
        self.marker.clone()
    }

    pub fn handle_robot_event(&self, event: RobotEvent) {
        self.robot.dispatch(event);
    }

    pub async fn touch(&self) {
        self.session.register_touch().await;
    }

    /// Destination-changed hook for the UI.
    pub async fn screen_changed(&self, screen: Screen) {
        apply_speed_profile(&self.robot, screen);
        self.session.screen_changed(screen).await;
    }

    pub async fn go_to_point(&self, id: &str) -> Result<()> {
        let point = self
            .points_of_interest
            .iter()
            .find(|point| point.id == id)
            .ok_or_else(|| anyhow!("unknown location '{id}'"))?;

        self.session.register_touch().await;
        self.robot.go_to(&point.id, false)
    }

    pub async fn announce_quiz_result(
        &self,
        correct: usize,
        total: usize,
        buffer: Duration,
    ) -> Result<()> {
        let outcome = QuizOutcome::from_score(correct, total);
        let line = self.commentator.lock().await.line(outcome);
        info!("Quiz {correct}/{total} ({outcome:?})");
        self.robot.speak(line, buffer, true).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.session.shutdown().await;
        self.watcher.lock().await.stop().await?;
        if let Some(mut tracker) = self.tracker.lock().await.take() {
            tracker.stop().await?;
        }
        info!("Kiosk shut down");
        Ok(())
    }
}

fn apply_speed_profile(robot: &RobotController, screen: Screen) {
    if let Some(speed) = screen.go_to_speed() {
        if let Err(err) = robot.set_go_to_speed(speed) {
            warn!("Failed to set go-to speed for {}: {err:#}", screen.route());
        }
    }
}

/// Headless entry point: runs the kiosk core against the simulated robot
/// until Ctrl-C.
pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Kiosk starting up...");

    let settings_path = std::env::var_os("KIOSK_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
    let settings = SettingsStore::new(settings_path)?;
    info!("Settings loaded from {}", settings.path().display());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build the kiosk runtime")?;

    runtime.block_on(async move {
        let sdk = Arc::new(SimulatedRobot::with_demo_map());
        let kiosk = Kiosk::start(sdk, Arc::new(LoggingNavigator), settings).await?;

        kiosk.handle_robot_event(RobotEvent::Ready(true));

        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for Ctrl-C")?;

        kiosk.shutdown().await
    })
}
