//! Merging configuration sources

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::profile::Profile;
use crate::sources::{ConfigSource, SourceError};

/// Errors raised while building or reading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to load {source_name}: {error}")]
	Source {
		source_name: String,
		#[source]
		error: SourceError,
	},

	#[error("Missing setting: {0}")]
	Missing(String),

	#[error("Invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("Invalid settings: {0}")]
	Validation(String),
}

/// Collects sources and merges them into [`MergedSettings`]
///
/// Sources are applied from lowest to highest priority; among equal
/// priorities the source added last wins.
#[derive(Default)]
pub struct SettingsBuilder {
	profile: Profile,
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn profile(mut self, profile: Profile) -> Self {
		self.profile = profile;
		self
	}

	pub fn add_source(mut self, source: impl ConfigSource + 'static) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	pub fn build(mut self) -> Result<MergedSettings, SettingsError> {
		self.sources.sort_by_key(|source| source.priority());

		let mut values = IndexMap::new();
		for source in &self.sources {
			let loaded = source.load().map_err(|error| SettingsError::Source {
				source_name: source.description(),
				error,
			})?;
			tracing::trace!(source = %source.description(), keys = loaded.len(), "settings source loaded");
			values.extend(loaded);
		}

		Ok(MergedSettings {
			profile: self.profile,
			values,
		})
	}
}

/// Result of merging every source
#[derive(Debug, Clone)]
pub struct MergedSettings {
	profile: Profile,
	values: IndexMap<String, Value>,
}

impl MergedSettings {
	pub fn profile(&self) -> &Profile {
		&self.profile
	}

	pub fn as_map(&self) -> &IndexMap<String, Value> {
		&self.values
	}

	/// Read and deserialize a single key
	pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, SettingsError> {
		let value = self
			.values
			.get(key)
			.ok_or_else(|| SettingsError::Missing(key.to_string()))?;

		serde_json::from_value(value.clone()).map_err(|e| SettingsError::InvalidValue {
			key: key.to_string(),
			message: e.to_string(),
		})
	}

	/// Deserialize every merged key into a typed settings struct
	pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, SettingsError> {
		let object: serde_json::Map<String, Value> = self.values.into_iter().collect();
		serde_json::from_value(Value::Object(object)).map_err(|e| SettingsError::InvalidValue {
			key: "settings".to_string(),
			message: e.to_string(),
		})
	}
}
