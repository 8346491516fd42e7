use anyhow::{bail, Context, Result};
use log::info;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{ActivitySource, SessionController};

/// Polls robot activity and keeps the idle countdown fresh while the robot
/// is talking, thinking, moving or listening.
pub struct ActivityWatcher {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl ActivityWatcher {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start<S>(&mut self, source: S, session: SessionController) -> Result<()>
    where
        S: ActivitySource + Send + 'static,
    {
        if self.handle.is_some() {
            bail!("activity watcher already running");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(watch_loop(source, session, cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("activity watcher task failed to join")
        } else {
            Ok(())
        }
    }
}

impl Default for ActivityWatcher {
    fn default() -> Self {
        Self::new()
    }
}

async fn watch_loop<S: ActivitySource>(
    source: S,
    session: SessionController,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval(session.timing().poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.record_activity(source.activity()).await;
            }
            _ = cancel_token.cancelled() => {
                info!("activity watcher shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    };
    use std::time::Duration;

    use anyhow::Result;

    use super::*;
    use crate::session::{ActivityFlags, History, Navigator, Screen, SessionTiming};

    #[derive(Clone, Default)]
    struct BusyFlag(Arc<AtomicBool>);

    impl ActivitySource for BusyFlag {
        fn activity(&self) -> ActivityFlags {
            ActivityFlags {
                moving: self.0.load(Ordering::SeqCst),
                ..ActivityFlags::default()
            }
        }
    }

    #[derive(Default)]
    struct CountingNavigator(Mutex<usize>);

    impl Navigator for CountingNavigator {
        fn navigate(&self, _screen: Screen, _history: History) -> Result<()> {
            *self.0.lock().unwrap() += 1;
            Ok(())
        }
    }

    async fn step_seconds(seconds: u64) {
        for _ in 0..seconds {
            time::advance(Duration::from_secs(1)).await;
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn busy_robot_keeps_the_session_alive() {
        let navigator = Arc::new(CountingNavigator::default());
        let session = SessionController::new(
            navigator.clone(),
            SessionTiming {
                idle_timeout: Duration::from_secs(10),
                poll_interval: Duration::from_secs(1),
                greet_delay: Duration::from_secs(5),
            },
        );
        let busy = BusyFlag::default();
        let mut watcher = ActivityWatcher::new();

        session.screen_changed(Screen::DirectionsCollections).await;
        watcher.start(busy.clone(), session.clone()).unwrap();
        busy.0.store(true, Ordering::SeqCst);

        step_seconds(15).await;
        assert_eq!(*navigator.0.lock().unwrap(), 0);

        busy.0.store(false, Ordering::SeqCst);
        step_seconds(8).await;
        assert_eq!(*navigator.0.lock().unwrap(), 0);

        step_seconds(4).await;
        assert_eq!(*navigator.0.lock().unwrap(), 1);

        watcher.stop().await.unwrap();
        assert!(!watcher.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn refuses_a_second_start() {
        let session = SessionController::new(
            Arc::new(CountingNavigator::default()),
            SessionTiming {
                idle_timeout: Duration::from_secs(10),
                poll_interval: Duration::from_secs(1),
                greet_delay: Duration::from_secs(5),
            },
        );
        let mut watcher = ActivityWatcher::new();

        watcher.start(BusyFlag::default(), session.clone()).unwrap();
        assert!(watcher.start(BusyFlag::default(), session).is_err());
        watcher.stop().await.unwrap();
    }
}
