pub mod controller;
pub mod navigation;
pub mod state;
pub mod watcher;

pub use controller::{SessionController, SessionSnapshot, SessionTiming};
pub use navigation::{History, LoggingNavigator, Navigator};
pub use state::{ActivityFlags, ActivitySource, Screen, SessionState, SessionStatus};
pub use watcher::ActivityWatcher;
