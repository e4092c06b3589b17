//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/sigtree/sigtree.toml`
//! 3. Local config: `<dir>/.sigtree.toml` (usually the working directory)
//! 4. Environment variables: `SIGTREE_*` prefix
//!
//! Command-line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// External significance validator settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Validator executable, called as `<program> <agg_file> <result_file>`
    pub program: PathBuf,
    /// Seconds to wait for the validator (0 = wait forever)
    pub timeout_secs: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("./target/release/significance-clustering"),
            timeout_secs: 3600,
        }
    }
}

impl ValidatorConfig {
    /// Timeout as a duration, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Raw validator config for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawValidatorConfig {
    pub program: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub comment_marker: Option<String>,
    pub result_suffix: Option<String>,
    pub validator: RawValidatorConfig,
}

/// Unified configuration for sigtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Prefix of header lines in partition files (default: "#")
    pub comment_marker: String,
    /// Inserted before the aggregate file's extension to name the result file
    pub result_suffix: String,
    /// Validator settings
    pub validator: ValidatorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            comment_marker: "#".into(),
            result_suffix: "_output".into(),
            validator: ValidatorConfig::default(),
        }
    }
}

/// Get the XDG config directory for sigtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sigtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("sigtree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".sigtree.toml")
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

/// Expand `~`, `$VAR` and `${VAR}`; leaves the input unchanged on failure.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Expand shell variables and tilde in the validator path.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.validator.program.to_string_lossy().as_ref());
        self.validator.program = PathBuf::from(expanded);
    }

    /// Overlay wins field by field where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            comment_marker: overlay
                .comment_marker
                .clone()
                .unwrap_or_else(|| self.comment_marker.clone()),
            result_suffix: overlay
                .result_suffix
                .clone()
                .unwrap_or_else(|| self.result_suffix.clone()),
            validator: ValidatorConfig {
                program: overlay
                    .validator
                    .program
                    .clone()
                    .unwrap_or_else(|| self.validator.program.clone()),
                timeout_secs: overlay
                    .validator
                    .timeout_secs
                    .unwrap_or(self.validator.timeout_secs),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.sigtree.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/sigtree/sigtree.toml`
    /// 3. Local config: `<local_dir>/.sigtree.toml`
    /// 4. Environment variables: `SIGTREE_*` prefix, `__` between sections
    ///    (e.g. `SIGTREE_VALIDATOR__TIMEOUT_SECS=60`)
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply SIGTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SIGTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("comment_marker") {
            settings.comment_marker = val;
        }
        if let Ok(val) = config.get_string("result_suffix") {
            settings.result_suffix = val;
        }
        if let Ok(val) = config.get_string("validator.program") {
            settings.validator.program = PathBuf::from(val);
        }
        match config.get::<u64>("validator.timeout_secs") {
            Ok(val) => settings.validator.timeout_secs = val,
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(config_err(e)),
        }

        Ok(settings)
    }

    /// Reject settings that would make every run fail or misparse.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.comment_marker.is_empty() {
            return Err(ApplicationError::Config {
                message: "comment_marker must not be empty".into(),
            });
        }
        if self.validator.program.as_os_str().is_empty() {
            return Err(ApplicationError::Config {
                message: "validator.program must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r##"# sigtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/sigtree/sigtree.toml
#   Local:  ./.sigtree.toml
#   Env:    SIGTREE_* environment variables (SIGTREE_VALIDATOR__PROGRAM, ...)

# Prefix of header lines in partition files
# comment_marker = "#"

# Result file name: <agg_stem><result_suffix>.<agg_ext>
# result_suffix = "_output"

[validator]
# Significance clustering executable, called as <program> <agg_file> <result_file>
# program = "./target/release/significance-clustering"

# Seconds before the validator is killed (0 disables the timeout)
# timeout_secs = 3600
"##
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
    fn given_default_settings_when_created_then_has_expected_values() {
        let settings = Settings::default();
        assert_eq!(settings.comment_marker, "#");
        assert_eq!(settings.result_suffix, "_output");
        assert_eq!(settings.validator.timeout(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn given_zero_timeout_when_converting_then_disabled() {
        let validator = ValidatorConfig {
            timeout_secs: 0,
            ..ValidatorConfig::default()
        };
        assert_eq!(validator.timeout(), None);
    }

    #[test]
    fn given_tilde_in_program_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            validator: ValidatorConfig {
                program: PathBuf::from("~/bin/significance-clustering"),
                timeout_secs: 10,
            },
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let program = settings.validator.program.to_string_lossy();
        assert!(program.starts_with(&home), "program: {}", program);
        assert!(!program.contains('~'), "program: {}", program);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_unspecified_fields() {
        let overlay: RawSettings = toml::from_str(
            r#"
[validator]
timeout_secs = 5
"#,
        )
        .unwrap();

        let merged = Settings::default().merge_with(&overlay);

        assert_eq!(merged.validator.timeout_secs, 5);
        assert_eq!(merged.validator.program, ValidatorConfig::default().program);
        assert_eq!(merged.comment_marker, "#");
    }

    #[test]
    fn given_empty_marker_when_validating_then_fails() {
        let settings = Settings {
            comment_marker: String::new(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.comment_marker.is_none());
        assert!(raw.validator.program.is_none());
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }
}
