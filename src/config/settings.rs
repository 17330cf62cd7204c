//! Settings for the issue tracker project
//!
//! Priority order (highest to lowest):
//! 1. Profile TOML file (e.g. `settings/production.toml`)
//! 2. Base TOML file (`settings/base.toml`)
//! 3. Environment variables with the `ISSUETRACKER_` prefix
//! 4. Default values
//!
//! The profile is read from `ISSUETRACKER_ENV` and defaults to `local`.

pub use issuetracker_conf::{Profile, Settings, SettingsError};

use issuetracker_db::NoSQLBackend;

use crate::apps::issues::store::IssueStore;

/// Load and validate the project settings from `./settings`
pub fn get_settings() -> Result<Settings, SettingsError> {
	Settings::load()
}

/// Connect to the configured document store and open the issue collection
pub async fn open_store(settings: &Settings) -> issuetracker_db::Result<IssueStore> {
	let backend = issuetracker_db::connect(&settings.database_url, &settings.database_name).await?;
	tracing::info!(
		backend = %backend.backend_type(),
		collection = %settings.collection,
		"document store ready"
	);
	Ok(IssueStore::new(backend, settings.collection.clone()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;

	#[rstest]
	#[tokio::test]
	async fn test_open_store_uses_configured_collection() {
		// Arrange
		let settings = Settings {
			collection: "tickets".to_string(),
			..Settings::default()
		};

		// Act
		let store = open_store(&settings).await.unwrap();

		// Assert
		assert_eq!(store.collection(), "tickets");
		assert!(store.health_check().await.is_ok());
	}

	#[rstest]
	#[tokio::test]
	async fn test_open_store_rejects_unknown_scheme() {
		// Arrange
		let settings = Settings {
			database_url: "postgres://localhost/issues".to_string(),
			..Settings::default()
		};

		// Act
		let result = open_store(&settings).await;

		// Assert
		assert!(matches!(
			result,
			Err(issuetracker_db::NoSQLError::ConfigError(_))
		));
	}
}
