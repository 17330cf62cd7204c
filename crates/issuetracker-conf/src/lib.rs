//! Settings for the issue tracker
//!
//! Configuration is merged from several [`ConfigSource`]s in priority order,
//! then deserialized into the typed [`Settings`]:
//!
//! 1. `settings/<profile>.toml`
//! 2. `settings/base.toml`
//! 3. `ISSUETRACKER_*` environment variables
//! 4. built-in defaults
//!
//! ```rust
//! use issuetracker_conf::{DefaultSource, Profile, Settings, SettingsBuilder};
//! use serde_json::json;
//!
//! let merged = SettingsBuilder::new()
//!     .profile(Profile::Local)
//!     .add_source(Settings::defaults())
//!     .add_source(DefaultSource::new().with_value("port", json!(9000)))
//!     .build()
//!     .unwrap();
//!
//! let settings: Settings = merged.into_typed().unwrap();
//! assert_eq!(settings.port, 9000);
//! ```

pub mod builder;
pub mod profile;
pub mod settings;
pub mod sources;

pub use builder::{MergedSettings, SettingsBuilder, SettingsError};
pub use profile::Profile;
pub use settings::{ENV_PREFIX, PROFILE_ENV_VAR, Settings};
pub use sources::{
	ConfigSource, DefaultSource, EnvSource, LowPriorityEnvSource, SourceError, TomlFileSource,
};
