use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to read settings file {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Invalid settings: {0}")]
	Parse(#[from] toml::de::Error),

	/// An environment override could not be parsed.
	#[error("Invalid value for {key}: {value:?} ({reason})")]
	Env {
		key: &'static str,
		value: String,
		reason: String,
	},

	#[error("Invalid server address {0}")]
	Address(String),

	#[error("Failed to initialise logging: {0}")]
	Logging(String),
}
