use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use log::{debug, info, warn};
use serde::Serialize;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{ActivityFlags, History, Navigator, Screen, SessionState, SessionStatus};
use crate::settings::SessionSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    pub idle_timeout: Duration,
    pub poll_interval: Duration,
    pub greet_delay: Duration,
}

impl From<&SessionSettings> for SessionTiming {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            idle_timeout: Duration::from_millis(settings.idle_timeout_ms),
            poll_interval: Duration::from_millis(settings.poll_interval_ms.max(1)),
            greet_delay: Duration::from_millis(settings.greet_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub status: SessionStatus,
    pub idle_ms: u64,
    /// Time left before the kiosk returns home; 0 while idle.
    pub remaining_ms: u64,
    pub greet_mode: bool,
}

/// Owns the idle countdown: leaves the home screen armed, returns to it once
/// the visitor has been inactive for the configured timeout.
#[derive(Clone)]
pub struct SessionController {
    state: Arc<Mutex<SessionState>>,
    navigator: Arc<dyn Navigator>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    greeter: Arc<Mutex<Option<CancellationToken>>>,
    greet_mode: Arc<watch::Sender<bool>>,
    generation: Arc<AtomicU64>,
    on_forced_home: Option<Arc<dyn Fn() + Send + Sync>>,
    timing: SessionTiming,
    log_every_ticks: u32,
}

impl SessionController {
    pub fn new(navigator: Arc<dyn Navigator>, timing: SessionTiming) -> Self {
        let debug_mode = std::env::var("KIOSK_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let (greet_mode, _) = watch::channel(false);

        Self {
            state: Arc::new(Mutex::new(SessionState::new(Instant::now()))),
            navigator,
            ticker: Arc::new(Mutex::new(None)),
            greeter: Arc::new(Mutex::new(None)),
            greet_mode: Arc::new(greet_mode),
            generation: Arc::new(AtomicU64::new(0)),
            on_forced_home: None,
            timing,
            log_every_ticks: if debug_mode { 1 } else { 10 },
        }
    }

    /// Runs after the idle timeout has taken the kiosk home on its own, where
    /// no screen change arrives from the UI.
    pub fn with_forced_home_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_forced_home = Some(Arc::new(hook));
        self
    }

    pub fn timing(&self) -> SessionTiming {
        self.timing
    }

    pub async fn get_state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn get_snapshot(&self) -> SessionSnapshot {
        let guard = self.state.lock().await;
        let idle = guard.idle_for(Instant::now());
        let remaining = if guard.is_countdown_running() {
            self.timing.idle_timeout.saturating_sub(idle)
        } else {
            Duration::ZERO
        };

        SessionSnapshot {
            status: guard.status(),
            idle_ms: idle.as_millis() as u64,
            remaining_ms: remaining.as_millis() as u64,
            greet_mode: *self.greet_mode.borrow(),
            state: guard.clone(),
        }
    }

    pub async fn is_countdown_running(&self) -> bool {
        self.state.lock().await.is_countdown_running()
    }

    pub fn greet_mode(&self) -> watch::Receiver<bool> {
        self.greet_mode.subscribe()
    }

    /// Any raw touch on the screen.
    pub async fn register_touch(&self) {
        self.state.lock().await.touch(Instant::now());
    }

    /// Refreshes the last interaction while the robot is busy with the visitor.
    pub async fn record_activity(&self, flags: ActivityFlags) {
        if flags.any() {
            debug!("robot activity {flags:?} refreshed idle countdown");
            self.state.lock().await.touch(Instant::now());
        }
    }

    /// Destination-changed hook from the UI framework.
    pub async fn screen_changed(&self, screen: Screen) {
        if screen.is_home() {
            self.enter_home().await;
        } else {
            self.enter_active(screen).await;
        }
    }

    /// Stops every background task; the session is left on its current screen.
    pub async fn shutdown(&self) {
        self.state.lock().await.countdown = None;
        self.cancel_ticker().await;
        if let Some(token) = self.greeter.lock().await.take() {
            token.cancel();
        }
    }

    async fn enter_home(&self) {
        {
            let mut state = self.state.lock().await;
            if let Some(session_id) = state.session_id.as_deref() {
                info!("visitor session {session_id} ended on the home screen");
            }
            state.enter_home();
        }
        self.cancel_ticker().await;
        self.schedule_greeting().await;
    }

    async fn enter_active(&self, screen: Screen) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock().await;
            state.enter_screen(screen, generation, || Uuid::new_v4().to_string());
            debug!(
                "entered {} (session {:?}, countdown #{generation})",
                screen.route(),
                state.session_id
            );
        }
        self.cancel_greeting().await;
        self.spawn_ticker(generation).await;
    }

    async fn spawn_ticker(&self, generation: u64) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let controller = self.clone();
        let handle = tokio::spawn(async move { controller.countdown_loop(generation).await });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    async fn countdown_loop(self, generation: u64) {
        let timeout = self.timing.idle_timeout;
        let mut interval = time::interval(self.timing.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks: u32 = 0;

        loop {
            interval.tick().await;

            let (idle, screen) = {
                let state = self.state.lock().await;
                if state.countdown != Some(generation) {
                    break;
                }
                (state.idle_for(Instant::now()), state.screen)
            };

            if idle < timeout {
                ticks = ticks.wrapping_add(1);
                if ticks % self.log_every_ticks == 0 {
                    debug!(
                        "idle for {}s of {}s on {}",
                        idle.as_secs(),
                        timeout.as_secs(),
                        screen.route()
                    );
                }
                continue;
            }

            // The navigator may report the screen change straight back.
            let navigated = self.navigator.navigate(Screen::Home, History::Clear);

            let mut state = self.state.lock().await;
            if state.countdown != Some(generation) {
                break;
            }

            match navigated {
                Ok(()) => {
                    info!(
                        "idle for {}s on {}; visitor session {} ended, returned to home screen",
                        idle.as_secs(),
                        screen.route(),
                        state.session_id.as_deref().unwrap_or("-")
                    );
                    state.enter_home();
                    drop(state);
                    if let Some(hook) = &self.on_forced_home {
                        hook();
                    }
                    self.schedule_greeting().await;
                }
                Err(err) => {
                    warn!("idle timeout could not navigate home, giving up: {err:#}");
                    state.countdown = None;
                }
            }
            break;
        }
    }

    async fn schedule_greeting(&self) {
        let mut greeter = self.greeter.lock().await;
        if let Some(token) = greeter.take() {
            token.cancel();
        }

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let state = self.state.clone();
        let greet_mode = self.greet_mode.clone();
        let delay = self.timing.greet_delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep(delay) => {
                    let state = state.lock().await;
                    if state.screen.is_home() && !cancelled.is_cancelled() {
                        info!("greet mode on");
                        greet_mode.send_replace(true);
                    }
                }
                _ = cancelled.cancelled() => {}
            }
        });

        *greeter = Some(token);
    }

    async fn cancel_greeting(&self) {
        if let Some(token) = self.greeter.lock().await.take() {
            token.cancel();
        }
        if self.greet_mode.send_replace(false) {
            info!("greet mode off");
        }
    }
}
