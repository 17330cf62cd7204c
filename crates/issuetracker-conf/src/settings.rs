//! Typed application settings

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::builder::{SettingsBuilder, SettingsError};
use crate::profile::Profile;
use crate::sources::{DefaultSource, LowPriorityEnvSource, TomlFileSource};

/// Prefix of environment variables read as settings
pub const ENV_PREFIX: &str = "ISSUETRACKER_";

/// Environment variable naming the active profile
pub const PROFILE_ENV_VAR: &str = "ISSUETRACKER_ENV";

const DATABASE_SCHEMES: &[&str] = &["memory", "mongodb", "mongodb+srv"];

/// Issue tracker settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub debug: bool,
	pub host: String,
	pub port: u16,
	/// `memory://`, `mongodb://...` or `mongodb+srv://...`
	pub database_url: String,
	pub database_name: String,
	/// Collection holding issue documents
	pub collection: String,
	/// Default log filter when `RUST_LOG` is unset
	pub log_level: String,
	pub shutdown_timeout_secs: u64,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			debug: true,
			host: "127.0.0.1".to_string(),
			port: 8000,
			database_url: "memory://".to_string(),
			database_name: "issuetracker".to_string(),
			collection: "issues".to_string(),
			log_level: "info".to_string(),
			shutdown_timeout_secs: 30,
		}
	}
}

impl Settings {
	/// Built-in defaults as the lowest-priority source
	pub fn defaults() -> DefaultSource {
		let defaults = Settings::default();
		DefaultSource::new()
			.with_value("debug", Value::Bool(defaults.debug))
			.with_value("host", json!(defaults.host))
			.with_value("port", json!(defaults.port))
			.with_value("database_url", json!(defaults.database_url))
			.with_value("database_name", json!(defaults.database_name))
			.with_value("collection", json!(defaults.collection))
			.with_value("log_level", json!(defaults.log_level))
			.with_value("shutdown_timeout_secs", json!(defaults.shutdown_timeout_secs))
	}

	/// Load settings from `./settings` using the profile in `ISSUETRACKER_ENV`
	pub fn load() -> Result<Self, SettingsError> {
		let profile = Profile::parse(
			&std::env::var(PROFILE_ENV_VAR).unwrap_or_else(|_| "local".to_string()),
		);
		let base_dir = std::env::current_dir().map_err(|e| SettingsError::Source {
			source_name: "current directory".to_string(),
			error: e.into(),
		})?;

		Self::load_from(base_dir.join("settings"), profile)
	}

	/// Load settings from `settings_dir` for `profile` and validate them
	pub fn load_from(settings_dir: impl AsRef<Path>, profile: Profile) -> Result<Self, SettingsError> {
		let settings_dir = settings_dir.as_ref();

		let settings: Settings = SettingsBuilder::new()
			.profile(profile.clone())
			.add_source(Self::defaults())
			.add_source(LowPriorityEnvSource::new().with_prefix(ENV_PREFIX))
			.add_source(TomlFileSource::new(settings_dir.join("base.toml")))
			.add_source(TomlFileSource::new(
				settings_dir.join(profile.toml_file_name()),
			))
			.build()?
			.into_typed()?;

		settings.validate()?;
		tracing::debug!(%profile, dir = %settings_dir.display(), "settings loaded");
		Ok(settings)
	}

	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.port == 0 {
			return Err(SettingsError::Validation("port must not be 0".to_string()));
		}
		if self.database_name.trim().is_empty() {
			return Err(SettingsError::Validation(
				"database_name must not be empty".to_string(),
			));
		}
		if self.collection.trim().is_empty() {
			return Err(SettingsError::Validation(
				"collection must not be empty".to_string(),
			));
		}

		let scheme = self.database_url.split_once("://").map(|(scheme, _)| scheme);
		if !scheme.is_some_and(|s| DATABASE_SCHEMES.contains(&s)) {
			return Err(SettingsError::Validation(format!(
				"unsupported database_url '{}'",
				self.database_url
			)));
		}

		Ok(())
	}

	/// Socket address to serve on
	pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
		format!("{}:{}", self.host, self.port)
			.parse()
			.map_err(|e: std::net::AddrParseError| SettingsError::InvalidValue {
				key: "host".to_string(),
				message: e.to_string(),
			})
	}

	pub fn shutdown_timeout(&self) -> Duration {
		Duration::from_secs(self.shutdown_timeout_secs)
	}
}
