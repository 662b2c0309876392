use crate::error::ScriptError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SCRIPT: &str = "Quest.txt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,
    #[serde(default = "default_start_scene")]
    pub start_scene: i32,
    #[serde(default)]
    pub max_steps: Option<usize>,
    #[serde(skip, default = "default_env_name")]
    pub env_name: String,
}

fn default_script_path() -> PathBuf {
    PathBuf::from(DEFAULT_SCRIPT)
}

fn default_start_scene() -> i32 {
    1
}

fn default_env_name() -> String {
    String::from("default")
}

impl Default for Config {
    fn default() -> Self {
        Config {
            script_path: default_script_path(),
            start_scene: default_start_scene(),
            max_steps: None,
            env_name: default_env_name(),
        }
    }
}

impl Config {
    /// Loads the config for the current `QSCRIPT_ENV`, then applies any
    /// `QSCRIPT_*` environment overrides.
    pub fn load() -> Result<Self, ScriptError> {
        let mut config = Self::load_from(&Self::get_config_path())?;
        config.env_name = Self::env_name();
        config.with_overrides(|key| env::var(key).ok())
    }

    /// Reads a config file, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ScriptError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| {
            ScriptError::Config(format!("{}: {}", path.display(), e))
        })
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ScriptError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(script) = lookup("QSCRIPT_SCRIPT") {
            self.script_path = PathBuf::from(script);
        }
        if let Some(scene) = lookup("QSCRIPT_START_SCENE") {
            self.start_scene = scene.trim().parse().map_err(|_| {
                ScriptError::Config(format!(
                    "QSCRIPT_START_SCENE must be an integer, got {:?}",
                    scene
                ))
            })?;
        }
        if let Some(steps) = lookup("QSCRIPT_MAX_STEPS") {
            let steps: usize = steps.trim().parse().map_err(|_| {
                ScriptError::Config(format!(
                    "QSCRIPT_MAX_STEPS must be a positive integer, got {:?}",
                    steps
                ))
            })?;
            self.max_steps = Some(steps);
        }
        Ok(self)
    }

    pub fn save(&self) -> Result<(), ScriptError> {
        self.save_to(&Self::get_config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ScriptError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    fn env_name() -> String {
        env::var("QSCRIPT_ENV").unwrap_or_else(|_| default_env_name())
    }

    pub fn get_config_path() -> PathBuf {
        let home = if cfg!(windows) {
            env::var("USERPROFILE")
        } else {
            env::var("HOME")
        };

        PathBuf::from(home.unwrap_or_else(|_| String::from(".")))
            .join(".qscript")
            .join(Self::env_name())
            .join("config.json")
    }
}
