//! `tracing` subscriber setup

use tracing_subscriber::EnvFilter;

use crate::error::SettingsError;
use crate::settings::LoggingSettings;

/// Environment variable holding a full filter directive.
pub const LOG_ENV: &str = "APPUNIT_LOG";

/// Build the filter: `APPUNIT_LOG` if set, `settings.level` otherwise.
pub fn build_filter(settings: &LoggingSettings) -> Result<EnvFilter, SettingsError> {
	if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
		return Ok(filter);
	}
	EnvFilter::try_new(&settings.level).map_err(|e| SettingsError::Logging(e.to_string()))
}

/// Install the global `tracing` subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), SettingsError> {
	let filter = build_filter(settings)?;
	let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

	let result = if settings.json {
		builder.json().try_init()
	} else {
		builder.try_init()
	};
	result.map_err(|e| SettingsError::Logging(e.to_string()))?;

	tracing::debug!(level = %settings.level, json = settings.json, "logging initialised");
	Ok(())
}
