//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/nestcase/nestcase.toml`
//! 3. Local config: `<project_dir>/.nestcase.toml`
//! 4. Environment variables: `NESTCASE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ExecutionOrder};
use crate::domain::{DuplicateBindPolicy, SuiteTree};

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub description_separator: Option<String>,
    pub id_separator: Option<String>,
    pub order: Option<ExecutionOrder>,
    pub catch_panics: Option<bool>,
    pub duplicate_binds: Option<DuplicateBindPolicy>,
}

/// Unified configuration for nestcase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Joins group and example descriptions (default: " ")
    pub description_separator: String,
    /// Joins path segments into unit ids (default: "_")
    pub id_separator: String,
    /// Order the bundled runner walks units in
    pub order: ExecutionOrder,
    /// Report panics in hooks and bodies as failures instead of unwinding
    pub catch_panics: bool,
    /// Same-group bind redefinition policy
    pub duplicate_binds: DuplicateBindPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            description_separator: " ".into(),
            id_separator: "_".into(),
            order: ExecutionOrder::default(),
            catch_panics: true,
            duplicate_binds: DuplicateBindPolicy::default(),
        }
    }
}

/// Get the XDG config directory for nestcase.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "nestcase").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("nestcase.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".nestcase.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins for every field it specifies.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            description_separator: overlay
                .description_separator
                .clone()
                .unwrap_or_else(|| self.description_separator.clone()),
            id_separator: overlay
                .id_separator
                .clone()
                .unwrap_or_else(|| self.id_separator.clone()),
            order: overlay.order.unwrap_or(self.order),
            catch_panics: overlay.catch_panics.unwrap_or(self.catch_panics),
            duplicate_binds: overlay.duplicate_binds.unwrap_or(self.duplicate_binds),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path();
        let local = project_dir.map(local_config_path);
        let settings = Self::load_files(global.as_deref(), local.as_deref())?;
        Self::apply_env_overrides(settings)
    }

    /// Load defaults plus the given config files, skipping missing ones.
    /// Does NOT apply environment variables.
    pub fn load_files(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();
        for path in [global, local].into_iter().flatten() {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }
        current.validate()?;
        Ok(current)
    }

    /// Apply NESTCASE_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("NESTCASE"))
            .build()
            .map_err(config_err)?;
        let raw: RawSettings = config.try_deserialize().map_err(config_err)?;
        let settings = settings.merge_with(&raw);
        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn validate(&self) -> Result<(), ApplicationError> {
        if self.id_separator.is_empty() {
            return Err(ApplicationError::Config {
                message: "id_separator must not be empty".into(),
            });
        }
        if self.id_separator.chars().any(|c| c.is_ascii_digit()) {
            return Err(ApplicationError::Config {
                message: format!(
                    "id_separator must not contain digits: {:?}",
                    self.id_separator
                ),
            });
        }
        Ok(())
    }

    /// Empty tree honouring these settings.
    pub fn suite_tree(&self) -> SuiteTree {
        SuiteTree::new().with_duplicate_binds(self.duplicate_binds)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# nestcase configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/nestcase/nestcase.toml
#   Local:  <project_dir>/.nestcase.toml
#   Env:    NESTCASE_* environment variables

# Joins group and example descriptions
# description_separator = " "

# Joins path segments into unit ids (must not contain digits)
# id_separator = "_"

# Runner order: "declared", "reversed" or "parallel"
# order = "declared"

# Report panics in hooks and bodies as failures
# catch_panics = true

# Same-group bind redefinition: "reject" or "replace"
# duplicate_binds = "reject"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_files_when_loading_then_uses_defaults() {
        let settings = Settings::load_files(None, None).expect("load defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.id_separator, "_");
        assert!(settings.catch_panics);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_fields() {
        let base = Settings::default();
        let overlay = RawSettings {
            order: Some(ExecutionOrder::Parallel),
            ..Default::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.order, ExecutionOrder::Parallel);
        assert_eq!(merged.description_separator, " ");
        assert_eq!(merged.duplicate_binds, DuplicateBindPolicy::Reject);
    }

    #[test]
    fn given_digit_separator_when_validating_then_errors() {
        let settings = Settings {
            id_separator: "0".into(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("parse template");
        assert!(raw.order.is_none());
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips_through_raw() {
        let settings = Settings {
            order: ExecutionOrder::Reversed,
            ..Default::default()
        };
        let text = settings.to_toml().unwrap();
        let raw: RawSettings = toml::from_str(&text).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), settings);
    }
}
