//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. Environment (`GITLAB_URL`, `GITLAB_TOKEN`) for GitLab settings the
//!    file leaves unset
//! 4. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$GITFLEET_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitfleet/config.toml`
//! 3. `~/.gitfleet/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use gitfleet::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("Remote: {}", config.remote());
//! println!("Tip policy: {}", config.tip_policy());
//!
//! let mut config = config;
//! config.global.remote = Some("upstream".to_string());
//! config.save().unwrap();
//! ```

pub mod schema;

pub use schema::{AuthorConfig, GitLabConfig, GlobalConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::tips::TipPolicy;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Where configuration is looked up.
///
/// [`Config::load`] fills this from the process environment; tests build it
/// directly so they never touch shared environment variables.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Explicit config file (`$GITFLEET_CONFIG`)
    pub explicit: Option<PathBuf>,
    /// `$XDG_CONFIG_HOME`
    pub xdg_config_home: Option<PathBuf>,
    /// The user's home directory
    pub home: Option<PathBuf>,
    /// `$GITLAB_URL`
    pub gitlab_url: Option<String>,
    /// `$GITLAB_TOKEN`
    pub gitlab_token: Option<String>,
}

impl ConfigSources {
    /// Read lookup locations from the process environment.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            explicit: var("GITFLEET_CONFIG").map(PathBuf::from),
            xdg_config_home: var("XDG_CONFIG_HOME").map(PathBuf::from),
            home: dirs::home_dir(),
            gitlab_url: var("GITLAB_URL"),
            gitlab_token: var("GITLAB_TOKEN"),
        }
    }

    /// Candidate config files, in lookup order.
    fn candidates(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(path) = &self.explicit {
            paths.push(path.clone());
        }
        if let Some(xdg) = &self.xdg_config_home {
            paths.push(xdg.join("gitfleet/config.toml"));
        }
        if let Some(home) = &self.home {
            paths.push(home.join(".gitfleet/config.toml"));
        }
        paths
    }
}

/// Loaded configuration.
///
/// Accessor methods apply defaults and environment fallbacks.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Configuration file contents
    pub global: GlobalConfig,
    /// Path to the config file (if loaded)
    pub(crate) global_path: Option<PathBuf>,
    /// Target for [`Config::save`]
    pub(crate) write_path: Option<PathBuf>,
    /// `$GITLAB_URL` at load time
    pub(crate) env_gitlab_url: Option<String>,
    /// `$GITLAB_TOKEN` at load time
    pub(crate) env_gitlab_token: Option<String>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// fails validation. A missing config file is not an error (defaults
    /// are used).
    pub fn load() -> Result<Config, ConfigError> {
        Self::load_from(&ConfigSources::from_env())
    }

    /// Load configuration from explicit sources.
    pub fn load_from(sources: &ConfigSources) -> Result<Config, ConfigError> {
        let found = sources.candidates().into_iter().find(|p| p.exists());

        let global = match &found {
            Some(path) => Self::read_global_config(path)?,
            None => GlobalConfig::default(),
        };
        global.validate()?;

        let write_path = sources
            .explicit
            .clone()
            .or_else(|| found.clone())
            .or_else(|| sources.home.as_ref().map(|h| h.join(".gitfleet/config.toml")));

        Ok(Config {
            global,
            global_path: found,
            write_path,
            env_gitlab_url: sources.gitlab_url.clone(),
            env_gitlab_token: sources.gitlab_token.clone(),
        })
    }

    /// Read and parse a config file.
    fn read_global_config(path: &Path) -> Result<GlobalConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Where [`Config::save`] writes.
    ///
    /// `$GITFLEET_CONFIG` when set, else the file that was loaded, else
    /// `~/.gitfleet/config.toml`.
    pub fn write_path(&self) -> Result<PathBuf, ConfigError> {
        self.write_path.clone().ok_or(ConfigError::NoHomeDir)
    }

    /// Validate and write the configuration atomically to [`Config::write_path`].
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = self.write_path()?;
        Self::write_config_atomic(&path, &self.global)?;
        Ok(path)
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed, writes a sibling temp file and
    /// renames it over the target.
    pub fn write_config_atomic(path: &Path, config: &GlobalConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Tip policy for `tips` and `prune`.
    ///
    /// Defaults to [`TipPolicy::Commit`].
    pub fn tip_policy(&self) -> TipPolicy {
        self.global.tip_policy.unwrap_or_default()
    }

    /// Remote name rewritten by `remote`.
    ///
    /// Defaults to "origin" if not configured.
    pub fn remote(&self) -> &str {
        self.global.remote.as_deref().unwrap_or("origin")
    }

    /// Configured author name.
    pub fn author_name(&self) -> Option<&str> {
        self.global.author.as_ref().and_then(|a| a.name.as_deref())
    }

    /// Configured author email.
    pub fn author_email(&self) -> Option<&str> {
        self.global.author.as_ref().and_then(|a| a.email.as_deref())
    }

    /// GitLab base URL, from the config file or `$GITLAB_URL`.
    pub fn gitlab_url(&self) -> Option<&str> {
        self.global
            .gitlab
            .as_ref()
            .and_then(|g| g.url.as_deref())
            .or(self.env_gitlab_url.as_deref())
    }

    /// GitLab token, from the config file or `$GITLAB_TOKEN`.
    pub fn gitlab_token(&self) -> Option<&str> {
        self.global
            .gitlab
            .as_ref()
            .and_then(|g| g.token.as_deref())
            .or(self.env_gitlab_token.as_deref())
    }

    /// Whether `clone` uses HTTPS URLs.
    ///
    /// Defaults to `false` (SSH).
    pub fn gitlab_https(&self) -> bool {
        self.global
            .gitlab
            .as_ref()
            .and_then(|g| g.https)
            .unwrap_or(false)
    }

    /// Get the path to the loaded config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn isolated(temp: &TempDir) -> ConfigSources {
        ConfigSources {
            home: Some(temp.path().join("home")),
            ..Default::default()
        }
    }

    #[test]
    fn load_empty_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&isolated(&temp)).unwrap();

        assert!(config.loaded_from().is_none());
        assert_eq!(config.remote(), "origin");
        assert_eq!(config.tip_policy(), TipPolicy::Commit);
        assert!(config.author_name().is_none());
        assert!(config.gitlab_url().is_none());
        assert!(!config.gitlab_https());
    }

    #[test]
    fn load_from_explicit_path() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("custom.toml");
        fs::write(
            &config_path,
            r#"
            tip_policy = "ref"
            remote = "upstream"
            "#,
        )
        .unwrap();

        let sources = ConfigSources {
            explicit: Some(config_path.clone()),
            ..isolated(&temp)
        };
        let config = Config::load_from(&sources).unwrap();

        assert_eq!(config.loaded_from(), Some(config_path.as_path()));
        assert_eq!(config.tip_policy(), TipPolicy::Ref);
        assert_eq!(config.remote(), "upstream");
    }

    #[test]
    fn missing_explicit_path_falls_through() {
        let temp = TempDir::new().unwrap();
        let home_config = temp.path().join("home/.gitfleet/config.toml");
        fs::create_dir_all(home_config.parent().unwrap()).unwrap();
        fs::write(&home_config, "remote = \"home\"").unwrap();

        let sources = ConfigSources {
            explicit: Some(temp.path().join("does-not-exist.toml")),
            ..isolated(&temp)
        };
        let config = Config::load_from(&sources).unwrap();
        assert_eq!(config.remote(), "home");
    }

    #[test]
    fn xdg_wins_over_home() {
        let temp = TempDir::new().unwrap();
        let xdg = temp.path().join("xdg");
        fs::create_dir_all(xdg.join("gitfleet")).unwrap();
        fs::write(xdg.join("gitfleet/config.toml"), "remote = \"xdg\"").unwrap();

        let home_config = temp.path().join("home/.gitfleet/config.toml");
        fs::create_dir_all(home_config.parent().unwrap()).unwrap();
        fs::write(&home_config, "remote = \"home\"").unwrap();

        let sources = ConfigSources {
            xdg_config_home: Some(xdg),
            ..isolated(&temp)
        };
        assert_eq!(Config::load_from(&sources).unwrap().remote(), "xdg");
    }

    #[test]
    fn gitlab_env_fallback() {
        let temp = TempDir::new().unwrap();
        let sources = ConfigSources {
            gitlab_url: Some("https://env.example.com".to_string()),
            gitlab_token: Some("env-token".to_string()),
            ..isolated(&temp)
        };
        let config = Config::load_from(&sources).unwrap();
        assert_eq!(config.gitlab_url(), Some("https://env.example.com"));
        assert_eq!(config.gitlab_token(), Some("env-token"));
    }

    #[test]
    fn gitlab_file_overrides_env() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
            [gitlab]
            url = "https://file.example.com"
            https = true
            "#,
        )
        .unwrap();

        let sources = ConfigSources {
            explicit: Some(config_path),
            gitlab_url: Some("https://env.example.com".to_string()),
            gitlab_token: Some("env-token".to_string()),
            ..isolated(&temp)
        };
        let config = Config::load_from(&sources).unwrap();
        assert_eq!(config.gitlab_url(), Some("https://file.example.com"));
        assert_eq!(config.gitlab_token(), Some("env-token"));
        assert!(config.gitlab_https());
    }

    #[test]
    fn invalid_value_rejected() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "remote = \"\"").unwrap();

        let sources = ConfigSources {
            explicit: Some(config_path),
            ..isolated(&temp)
        };
        assert!(matches!(
            Config::load_from(&sources),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "unknown_field = true").unwrap();

        let sources = ConfigSources {
            explicit: Some(config_path),
            ..isolated(&temp)
        };
        assert!(matches!(
            Config::load_from(&sources),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn write_config_atomic_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/config.toml");

        let config = GlobalConfig {
            author: Some(AuthorConfig {
                name: Some("Jane Doe".to_string()),
                email: Some("jane@example.com".to_string()),
            }),
            ..Default::default()
        };
        Config::write_config_atomic(&path, &config).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());

        let sources = ConfigSources {
            explicit: Some(path),
            ..isolated(&temp)
        };
        let loaded = Config::load_from(&sources).unwrap();
        assert_eq!(loaded.author_name(), Some("Jane Doe"));
        assert_eq!(loaded.author_email(), Some("jane@example.com"));
    }

    #[test]
    fn save_targets_loaded_file() {
        let temp = TempDir::new().unwrap();
        let xdg = temp.path().join("xdg");
        fs::create_dir_all(xdg.join("gitfleet")).unwrap();
        let path = xdg.join("gitfleet/config.toml");
        fs::write(&path, "remote = \"xdg\"").unwrap();

        let sources = ConfigSources {
            xdg_config_home: Some(xdg),
            ..isolated(&temp)
        };
        let mut config = Config::load_from(&sources).unwrap();
        config.global.tip_policy = Some(TipPolicy::Ref);
        assert_eq!(config.save().unwrap(), path);

        let reloaded = Config::load_from(&sources).unwrap();
        assert_eq!(reloaded.tip_policy(), TipPolicy::Ref);
        assert_eq!(reloaded.remote(), "xdg");
    }

    #[test]
    fn save_defaults_to_home() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&isolated(&temp)).unwrap();
        assert_eq!(
            config.write_path().unwrap(),
            temp.path().join("home/.gitfleet/config.toml")
        );
    }

    #[test]
    fn write_refuses_invalid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let config = GlobalConfig {
            remote: Some(String::new()),
            ..Default::default()
        };
        assert!(Config::write_config_atomic(&path, &config).is_err());
        assert!(!path.exists());
    }
}
