//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Timer defaults (practice/rest/B durations, set count, pattern)
//! - Cue behaviour (auto-stop timeouts, countdown threshold)
//! - Practice menus used to title finished sessions
//!
//! Configuration is stored at `~/.config/ascent/config.toml`.
//! Durations are kept exactly as entered; [`Config::plan_config`] runs them
//! through the duration model.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::duration::{from_min_sec, normalize, MAX_PHASE_SECS, STEP_SECS};
use crate::error::{ConfigError, CoreError, Result};
use crate::summary::{SessionDetails, DEFAULT_TITLE};
use crate::timer::{CueSettings, Pattern, PatternKind, PlanConfig, MAX_SETS};

/// Timer defaults, pre-normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_practice_min")]
    pub practice_min: i64,
    #[serde(default)]
    pub practice_sec: i64,
    #[serde(default = "default_rest_min")]
    pub rest_min: i64,
    #[serde(default)]
    pub rest_sec: i64,
    #[serde(default = "default_sets")]
    pub sets: i64,
    /// Give the B side its own duration instead of mirroring A.
    #[serde(default)]
    pub separate_b: bool,
    #[serde(default = "default_practice_min")]
    pub b_min: i64,
    #[serde(default)]
    pub b_sec: i64,
    #[serde(default)]
    pub pattern: PatternKind,
    #[serde(default = "default_step_secs")]
    pub step_secs: u32,
    #[serde(default = "default_max_phase_secs")]
    pub max_phase_secs: u32,
}

/// A named practice menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuPreset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    /// Title given to sessions started without an explicit one.
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub note: String,
    #[serde(default = "default_presets")]
    pub presets: Vec<MenuPreset>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/ascent/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub cues: CueSettings,
    #[serde(default)]
    pub menu: MenuConfig,
    /// Custom slot list, overriding `timer.pattern`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_pattern: Option<Pattern>,
}

// Default functions
fn default_practice_min() -> i64 {
    5
}
fn default_rest_min() -> i64 {
    2
}
fn default_sets() -> i64 {
    3
}
fn default_step_secs() -> u32 {
    STEP_SECS
}
fn default_max_phase_secs() -> u32 {
    MAX_PHASE_SECS
}
fn default_title() -> String {
    DEFAULT_TITLE.into()
}
fn default_presets() -> Vec<MenuPreset> {
    let preset = |id: &str, name: &str, note: &str| MenuPreset {
        id: id.into(),
        name: name.into(),
        note: note.into(),
    };
    vec![
        preset("basic", "Basic rallies", ""),
        preset("serve", "Serve practice", "50 per course\nCheck the spin"),
        preset("receive", "Receive practice", "Push / flick\nShort balls over the table"),
        preset("footwork", "Footwork", "Two-point to three-point\nFront-back switching"),
    ]
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            practice_min: default_practice_min(),
            practice_sec: 0,
            rest_min: default_rest_min(),
            rest_sec: 0,
            sets: default_sets(),
            separate_b: false,
            b_min: default_practice_min(),
            b_sec: 0,
            pattern: PatternKind::default(),
            step_secs: default_step_secs(),
            max_phase_secs: default_max_phase_secs(),
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            note: String::new(),
            presets: default_presets(),
        }
    }
}

impl TimerConfig {
    fn seconds(&self, minutes: i64, seconds: i64) -> u32 {
        let raw = from_min_sec(minutes as f64, seconds as f64);
        normalize(i64::from(raw), self.step_secs, self.max_phase_secs)
    }

    pub fn practice_secs(&self) -> u32 {
        self.seconds(self.practice_min, self.practice_sec)
    }

    pub fn rest_secs(&self) -> u32 {
        self.seconds(self.rest_min, self.rest_sec)
    }

    pub fn b_secs(&self) -> u32 {
        self.seconds(self.b_min, self.b_sec)
    }

    pub fn set_count(&self) -> u32 {
        self.sets.clamp(1, i64::from(MAX_SETS)) as u32
    }

    /// Normalized plan inputs.
    pub fn plan_config(&self) -> PlanConfig {
        PlanConfig::new(self.practice_secs(), self.rest_secs(), self.set_count())
            .with_alternate(self.separate_b.then(|| self.b_secs()))
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || CoreError::from(ConfigError::UnknownKey(key.to_string()));
        let invalid = |message: String| {
            CoreError::from(ConfigError::InvalidValue {
                key: key.to_string(),
                message,
            })
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as integer")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content)?;
        Ok(cfg)
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory. Returns error if the key is
    /// unknown or the value does not fit the existing type.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    pub fn plan_config(&self) -> PlanConfig {
        self.timer.plan_config()
    }

    pub fn pattern(&self) -> Pattern {
        match &self.custom_pattern {
            Some(custom) => custom.clone(),
            None => self.timer.pattern.pattern(),
        }
    }

    pub fn cue_settings(&self) -> CueSettings {
        self.cues
    }

    /// Session title/note from the named preset, or the menu defaults.
    pub fn session_details(&self, preset: Option<&str>) -> SessionDetails {
        let found = preset.and_then(|id| {
            self.menu
                .presets
                .iter()
                .find(|p| p.id == id || p.name == id)
        });
        match found {
            Some(p) => SessionDetails::new(p.name.clone(), p.note.clone()),
            None => SessionDetails::new(self.menu.title.clone(), self.menu.note.clone()),
        }
    }
}
