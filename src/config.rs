//! Persisted timeline settings: label configuration, type colors, date
//! format and default zoom.
//!
//! Stored as JSON in the OS config directory. Every field carries
//! `#[serde(default)]`, so a partial file is valid and missing keys fall
//! back to the built-in defaults. Colors are `#RRGGBB` / `#RRGGBBAA`
//! strings so the file can be edited by hand.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use egui::Color32;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ProjectError;
use crate::timeline::labels::{is_valid_date_format, LabelConfig};
use crate::timeline::DEFAULT_DATE_FORMAT;

// ─── Hex-colour serde helpers ───────────────────────────────────────────────

pub mod hex_color {
    use egui::Color32;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn to_hex(color: Color32) -> String {
        let [r, g, b, a] = color.to_array();
        if a == 255 {
            format!("#{:02X}{:02X}{:02X}", r, g, b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
        }
    }

    pub fn parse_hex_color(s: &str) -> Result<Color32, String> {
        let s = s.trim().trim_start_matches('#');
        let byte = |i: usize| {
            s.get(i..i + 2)
                .ok_or_else(|| format!("Invalid hex color '{}'", s))
                .and_then(|h| u8::from_str_radix(h, 16).map_err(|e| e.to_string()))
        };
        match s.len() {
            6 => Ok(Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color32::from_rgba_unmultiplied(
                byte(0)?,
                byte(2)?,
                byte(4)?,
                byte(6)?,
            )),
            _ => Err(format!("Invalid hex color '{}': expected 6 or 8 hex digits", s)),
        }
    }

    pub fn serialize<S>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_hex(*color))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_hex_color(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde helper for a name -> color map stored as hex strings.
mod hex_color_map {
    use std::collections::BTreeMap;

    use egui::Color32;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::hex_color::{parse_hex_color, to_hex};

    pub fn serialize<S>(
        colors: &BTreeMap<String, Color32>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(colors.iter().map(|(k, c)| (k, to_hex(*c))))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, Color32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(k, v)| {
                parse_hex_color(&v)
                    .map(|c| (k, c))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

// ─── Settings ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Label configuration for every type without its own entry.
    pub labels: LabelConfig,
    /// Per-type label overrides, keyed by type name.
    pub type_labels: BTreeMap<String, LabelConfig>,
    #[serde(with = "hex_color_map")]
    pub type_colors: BTreeMap<String, Color32>,
    #[serde(with = "hex_color")]
    pub default_color: Color32,
    /// `chrono` format string for date labels.
    pub date_format: String,
    pub default_pixels_per_day: f32,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        let type_colors = [
            ("Milestone", Color32::from_rgb(255, 165, 0)),
            ("Phase", Color32::from_rgb(70, 120, 180)),
            ("Task", Color32::from_rgb(66, 133, 244)),
            ("Feature", Color32::from_rgb(52, 168, 83)),
            ("Bug", Color32::from_rgb(229, 57, 53)),
        ]
        .into_iter()
        .map(|(name, color)| (name.to_string(), color))
        .collect();

        Self {
            labels: LabelConfig::default(),
            type_labels: BTreeMap::new(),
            type_colors,
            default_color: Color32::from_rgb(70, 130, 180),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            default_pixels_per_day: 18.0,
        }
    }
}

impl TimelineSettings {
    pub fn labels_for(&self, item_type: &str) -> LabelConfig {
        self.type_labels
            .get(item_type)
            .copied()
            .unwrap_or(self.labels)
    }

    pub fn color_for(&self, item_type: &str) -> Color32 {
        self.type_colors
            .get(item_type)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Known type names, in display order.
    pub fn type_names(&self) -> Vec<String> {
        self.type_colors.keys().cloned().collect()
    }

    /// Replace values that would break rendering with their defaults.
    fn sanitize(mut self, path: &Path) -> Self {
        if !is_valid_date_format(&self.date_format) {
            warn!(
                path = %path.display(),
                date_format = %self.date_format,
                "invalid date format; using default"
            );
            self.date_format = DEFAULT_DATE_FORMAT.to_string();
        }
        if !(self.default_pixels_per_day.is_finite() && self.default_pixels_per_day > 0.0) {
            warn!(
                path = %path.display(),
                pixels_per_day = self.default_pixels_per_day,
                "invalid default zoom; using default"
            );
            self.default_pixels_per_day = TimelineSettings::default().default_pixels_per_day;
        }
        self
    }
}

/// Settings plus the file they live in.
pub struct SettingsStore {
    pub settings: TimelineSettings,
    path: PathBuf,
}

impl SettingsStore {
    /// Load settings from the OS config directory, falling back to defaults.
    pub fn load() -> Self {
        Self::open(Self::config_path())
    }

    /// Load settings from an explicit file.
    pub fn open(path: PathBuf) -> Self {
        Self {
            settings: load_settings(&path),
            path,
        }
    }

    pub fn save(&self) -> Result<(), ProjectError> {
        save_settings(&self.settings, &self.path)
    }

    fn config_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "MilestoneTimeline") {
            proj_dirs.config_dir().join("settings.json")
        } else {
            // Fallback
            PathBuf::from(".").join("settings.json")
        }
    }
}

/// Read settings from `path`. A missing file silently yields defaults, an
/// unreadable one is logged and also yields defaults. Individual values that
/// cannot be used are replaced by their defaults.
pub fn load_settings(path: &Path) -> TimelineSettings {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return TimelineSettings::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read settings");
            return TimelineSettings::default();
        }
    };
    match serde_json::from_str::<TimelineSettings>(&json) {
        Ok(settings) => settings.sanitize(path),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse settings; using defaults");
            TimelineSettings::default()
        }
    }
}

pub fn save_settings(settings: &TimelineSettings, path: &Path) -> Result<(), ProjectError> {
    let json = serde_json::to_string_pretty(settings)?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ProjectError::io(dir, e))?;
    }
    std::fs::write(path, json).map_err(|e| ProjectError::io(path, e))?;
    info!(path = %path.display(), "settings saved");
    Ok(())
}
