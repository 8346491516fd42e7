use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::mapping::MarkerGeometry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub idle_timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Wait on the home screen before the greeting animation starts.
    pub greet_delay_ms: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout_ms: 3_000_000,
            poll_interval_ms: 1_000,
            greet_delay_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub divisor: u32,
    pub marker_size: f32,
    /// Map layer ids offered on the directions screens, in display order.
    pub points_of_interest: Vec<String>,
}

impl MapSettings {
    pub fn geometry(&self) -> MarkerGeometry {
        MarkerGeometry {
            divisor: self.divisor,
            marker_size: self.marker_size,
        }
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        let geometry = MarkerGeometry::default();
        Self {
            divisor: geometry.divisor,
            marker_size: geometry.marker_size,
            points_of_interest: [
                "lifestyle collection",
                "management collection r",
                "life sciences collectionr",
                "design collection r",
                "info services",
                "self check machines",
                "library portal pcs",
                "cafe",
                "smart kiosk",
                "smart learning hub r",
                "exhibition space",
                "art gallery",
                "learn for life pod",
            ]
            .iter()
            .map(|id| id.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotSettings {
    pub volume: u8,
    pub detection_distance: f32,
    pub kiosk_mode: bool,
    pub disable_volume_button: bool,
    pub disable_main_button: bool,
    pub hide_top_bar: bool,
}

impl Default for RobotSettings {
    fn default() -> Self {
        Self {
            volume: 4,
            detection_distance: 2.0,
            kiosk_mode: false,
            disable_volume_button: true,
            disable_main_button: true,
            hide_top_bar: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskSettings {
    pub session: SessionSettings,
    pub map: MapSettings,
    pub robot: RobotSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<KioskSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings in {}: {err}", path.display());
                KioskSettings::default()
            })
        } else {
            KioskSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> KioskSettings {
        self.read().clone()
    }

    pub fn session(&self) -> SessionSettings {
        self.read().session.clone()
    }

    pub fn map(&self) -> MapSettings {
        self.read().map.clone()
    }

    pub fn robot(&self) -> RobotSettings {
        self.read().robot.clone()
    }

    pub fn update_session(&self, settings: SessionSettings) -> Result<()> {
        let mut guard = self.write();
        guard.session = settings;
        self.persist(&guard)
    }

    pub fn update_map(&self, settings: MapSettings) -> Result<()> {
        let mut guard = self.write();
        guard.map = settings;
        self.persist(&guard)
    }

    pub fn update_robot(&self, settings: RobotSettings) -> Result<()> {
        let mut guard = self.write();
        guard.robot = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: KioskSettings = serde_json::from_str(&contents)?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &KioskSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, KioskSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, KioskSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
