//! Deployment profiles

use std::fmt;

/// Named settings profile, selecting `settings/<profile>.toml`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Profile {
	#[default]
	Local,
	Development,
	Staging,
	Production,
	Custom(String),
}

impl Profile {
	/// Parse a profile name. Unknown names become [`Profile::Custom`].
	///
	/// ```
	/// use issuetracker_conf::Profile;
	///
	/// assert_eq!(Profile::parse("prod"), Profile::Production);
	/// assert_eq!(Profile::parse("ci"), Profile::Custom("ci".to_string()));
	/// ```
	pub fn parse(name: &str) -> Self {
		match name.trim().to_lowercase().as_str() {
			"" | "local" => Profile::Local,
			"dev" | "development" => Profile::Development,
			"staging" => Profile::Staging,
			"prod" | "production" => Profile::Production,
			other => Profile::Custom(other.to_string()),
		}
	}

	pub fn name(&self) -> &str {
		match self {
			Profile::Local => "local",
			Profile::Development => "development",
			Profile::Staging => "staging",
			Profile::Production => "production",
			Profile::Custom(name) => name,
		}
	}

	/// File name of this profile's settings file
	pub fn toml_file_name(&self) -> String {
		format!("{}.toml", self.name())
	}

	pub fn is_production(&self) -> bool {
		matches!(self, Profile::Production)
	}
}

impl fmt::Display for Profile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
