use anyhow::Result;
use log::info;

use super::Screen;

/// What happens to the back stack on navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum History {
    Keep,
    /// Drop every entry so "back" cannot return to the previous screen.
    Clear,
}

/// Screen-navigation primitives of the UI framework.
pub trait Navigator: Send + Sync {
    fn navigate(&self, screen: Screen, history: History) -> Result<()>;
}

/// Navigator for headless runs; records nothing, only logs.
#[derive(Debug, Default)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, screen: Screen, history: History) -> Result<()> {
        info!("navigate -> {} ({history:?})", screen.route());
        Ok(())
    }
}
