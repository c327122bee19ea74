//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/yangtree/yangtree.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `YANGTREE_*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::BuildOptions;

/// How a built tree is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented tree of framed nodes and leaves
    #[default]
    Tree,
    /// One writer event per line
    Events,
}

impl std::str::FromStr for OutputFormat {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tree" => Ok(Self::Tree),
            "events" => Ok(Self::Events),
            other => Err(ApplicationError::Config {
                message: format!("unknown output format '{other}' (expected tree or events)"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildSettings {
    /// Reject augmenting nodes that match no augmentation of their parent
    pub strict_augmentation: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            strict_augmentation: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
}

/// Raw settings for intermediate parsing.
///
/// `None` means "not specified in this layer, inherit from below".
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub schema: Option<PathBuf>,
    pub build: RawBuildSettings,
    pub output: RawOutputSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawBuildSettings {
    pub strict_augmentation: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawOutputSettings {
    pub format: Option<OutputFormat>,
}

/// Unified configuration for yangtree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Schema file used when `--schema` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<PathBuf>,
    pub build: BuildSettings,
    pub output: OutputSettings,
}

/// Get the XDG config directory for yangtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "yangtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("yangtree.toml"))
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
    /// Load settings with layered precedence.
    ///
    /// A missing global file is skipped; a missing `local` file is an error
    /// since it was asked for explicitly.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_with_env(local, None)
    }

    /// Like [`Settings::load`], reading `YANGTREE_*` variables from `env`
    /// instead of the process environment when given.
    pub fn load_with_env(
        local: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("Loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(local_path) = local {
            debug!("Loading local config {}", local_path.display());
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        current = Self::apply_env_overrides(current, env)?;
        current.expand_paths()?;

        Ok(current)
    }

    /// Scalar options: overlay wins if Some, otherwise keep base.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            schema: overlay.schema.clone().or_else(|| self.schema.clone()),
            build: BuildSettings {
                strict_augmentation: overlay
                    .build
                    .strict_augmentation
                    .unwrap_or(self.build.strict_augmentation),
            },
            output: OutputSettings {
                format: overlay.output.format.unwrap_or(self.output.format),
            },
        }
    }

    /// Apply YANGTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(
        mut settings: Self,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("YANGTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("schema") {
            settings.schema = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("build.strict_augmentation") {
            settings.build.strict_augmentation = val;
        }
        if let Ok(val) = config.get_string("output.format") {
            settings.output.format = val.parse()?;
        }

        Ok(settings)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in the schema path.
    fn expand_paths(&mut self) -> Result<(), ApplicationError> {
        if let Some(schema) = &self.schema {
            let raw = schema.to_string_lossy();
            let expanded = shellexpand::full(&raw).map_err(|e| ApplicationError::Config {
                message: format!("expand schema path {}: {}", raw, e),
            })?;
            self.schema = Some(PathBuf::from(expanded.as_ref()));
        }
        Ok(())
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            strict_augmentation: self.build.strict_augmentation,
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
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
    fn given_defaults_when_created_then_augmentation_is_strict() {
        let settings = Settings::default();
        assert!(settings.build.strict_augmentation);
        assert_eq!(settings.output.format, OutputFormat::Tree);
        assert!(settings.schema.is_none());
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unset_fields_are_inherited() {
        let base = Settings {
            schema: Some(PathBuf::from("/base.toml")),
            build: BuildSettings {
                strict_augmentation: false,
            },
            output: OutputSettings::default(),
        };
        let overlay = RawSettings {
            output: RawOutputSettings {
                format: Some(OutputFormat::Events),
            },
            ..RawSettings::default()
        };

        let result = base.merge_with(&overlay);

        assert_eq!(result.schema, Some(PathBuf::from("/base.toml")));
        assert!(!result.build.strict_augmentation);
        assert_eq!(result.output.format, OutputFormat::Events);
    }

    #[test]
    fn given_tilde_in_schema_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            schema: Some(PathBuf::from("~/schemas/net.toml")),
            ..Settings::default()
        };

        settings.expand_paths().expect("expand");

        let home = std::env::var("HOME").expect("HOME should be set");
        let schema = settings.schema.expect("schema");
        assert!(schema.to_string_lossy().starts_with(&home));
    }

    #[test]
    fn given_mixed_case_when_parsing_format_then_accepted() {
        assert_eq!("Events".parse::<OutputFormat>().unwrap(), OutputFormat::Events);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
