use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::robot::SpeedLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Screen {
    Home,
    GeneralQuestions,
    DirectionsMain,
    DirectionsCollections,
    DirectionsFacilities,
    DirectionsSpaces,
}

impl Screen {
    pub const ALL: [Screen; 6] = [
        Screen::Home,
        Screen::GeneralQuestions,
        Screen::DirectionsMain,
        Screen::DirectionsCollections,
        Screen::DirectionsFacilities,
        Screen::DirectionsSpaces,
    ];

    pub fn route(self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::GeneralQuestions => "GeneralQuestions",
            Screen::DirectionsMain => "DirectionsAndLocations_Main",
            Screen::DirectionsCollections => "DirectionsAndLocations_Collections",
            Screen::DirectionsFacilities => "DirectionsAndLocations_Facilities",
            Screen::DirectionsSpaces => "DirectionsAndLocations_Spaces",
        }
    }

    pub fn from_route(route: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|screen| screen.route() == route)
    }

    pub fn is_home(self) -> bool {
        self == Screen::Home
    }

    /// Go-to speed while this screen is shown; `None` keeps the current one.
    pub fn go_to_speed(self) -> Option<SpeedLevel> {
        match self {
            Screen::Home => Some(SpeedLevel::Slow),
            Screen::GeneralQuestions => None,
            Screen::DirectionsMain
            | Screen::DirectionsCollections
            | Screen::DirectionsFacilities
            | Screen::DirectionsSpaces => Some(SpeedLevel::High),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    /// On the home screen, countdown stopped.
    #[default]
    Idle,
    /// On any other screen, countdown running.
    Active,
}

/// Robot activity that counts as the visitor still being engaged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFlags {
    pub thinking: bool,
    pub talking: bool,
    pub moving: bool,
    pub listening: bool,
}

impl ActivityFlags {
    pub fn any(&self) -> bool {
        self.thinking || self.talking || self.moving || self.listening
    }
}

/// Anything that can report current robot activity.
pub trait ActivitySource {
    fn activity(&self) -> ActivityFlags;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub screen: Screen,
    /// Visitor session id, assigned when the kiosk leaves the home screen.
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub last_interaction_at: DateTime<Utc>,
    #[serde(skip)]
    pub last_interaction: Instant,
    /// Generation of the countdown that currently owns the session.
    #[serde(skip)]
    pub countdown: Option<u64>,
}

impl SessionState {
    pub fn new(now: Instant) -> Self {
        Self {
            screen: Screen::Home,
            session_id: None,
            started_at: None,
            last_interaction_at: Utc::now(),
            last_interaction: now,
            countdown: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        if self.screen.is_home() {
            SessionStatus::Idle
        } else {
            SessionStatus::Active
        }
    }

    pub fn is_countdown_running(&self) -> bool {
        self.countdown.is_some()
    }

    /// Refreshes the last interaction; older timestamps never win.
    pub fn touch(&mut self, now: Instant) {
        if now > self.last_interaction {
            self.last_interaction = now;
            self.last_interaction_at = Utc::now();
        }
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_interaction)
    }

    pub fn enter_screen(&mut self, screen: Screen, countdown: u64, session_id: impl FnOnce() -> String) {
        if self.session_id.is_none() {
            self.session_id = Some(session_id());
            self.started_at = Some(Utc::now());
        }
        self.screen = screen;
        self.countdown = Some(countdown);
    }

    pub fn enter_home(&mut self) {
        self.screen = Screen::Home;
        self.countdown = None;
        self.session_id = None;
        self.started_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_round_trip() {
        for screen in Screen::ALL {
            assert_eq!(Screen::from_route(screen.route()), Some(screen));
        }
        assert_eq!(Screen::from_route("Settings"), None);
    }

    #[test]
    fn stale_touch_is_ignored() {
        let start = Instant::now();
        let mut state = SessionState::new(start + Duration::from_secs(5));
        state.touch(start);
        assert_eq!(state.last_interaction, start + Duration::from_secs(5));
        assert_eq!(state.idle_for(start), Duration::ZERO);
    }

    #[test]
    fn session_id_survives_screen_changes_until_home() {
        let mut state = SessionState::new(Instant::now());
        assert_eq!(state.status(), SessionStatus::Idle);

        state.enter_screen(Screen::DirectionsMain, 1, || "visit-1".into());
        state.enter_screen(Screen::DirectionsSpaces, 2, || "visit-2".into());
        assert_eq!(state.session_id.as_deref(), Some("visit-1"));
        assert_eq!(state.countdown, Some(2));
        assert_eq!(state.status(), SessionStatus::Active);

        state.enter_home();
        assert_eq!(state.session_id, None);
        assert!(!state.is_countdown_running());
        assert_eq!(state.status(), SessionStatus::Idle);
    }

    #[test]
    fn speed_profile_per_screen() {
        assert_eq!(Screen::Home.go_to_speed(), Some(SpeedLevel::Slow));
        assert_eq!(Screen::DirectionsFacilities.go_to_speed(), Some(SpeedLevel::High));
        assert_eq!(Screen::GeneralQuestions.go_to_speed(), None);
    }
}
