//! Settings model and loading

use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;

use crate::error::SettingsError;

/// Top-level application settings.
///
/// Every field has a default, so an empty document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Render unhandled errors as plain-text reports instead of a bare 500.
	pub debug: bool,
	/// Let the container synthesize bindings for `Injectable` types.
	pub auto_bind: bool,
	pub server: ServerSettings,
	pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
	pub host: String,
	pub port: u16,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_string(),
			port: 8000,
		}
	}
}

impl ServerSettings {
	/// Resolve `host:port` to the first matching socket address.
	pub fn addr(&self) -> Result<SocketAddr, SettingsError> {
		let spec = format!("{}:{}", self.host, self.port);
		spec.to_socket_addrs()
			.ok()
			.and_then(|mut addrs| addrs.next())
			.ok_or(SettingsError::Address(spec))
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
	/// Default filter directive, e.g. `info` or `appunit_di=debug,info`.
	pub level: String,
	/// Emit JSON lines instead of human-readable output.
	pub json: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			json: false,
		}
	}
}

impl Settings {
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(source)?)
	}

	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&source)
	}

	/// Apply `APPUNIT_*` overrides from the process environment.
	pub fn apply_env(self) -> Result<Self, SettingsError> {
		self.apply_env_from(|key| std::env::var(key).ok())
	}

	/// Apply `APPUNIT_*` overrides using `lookup` as the environment.
	pub fn apply_env_from(
		mut self,
		lookup: impl Fn(&str) -> Option<String>,
	) -> Result<Self, SettingsError> {
		if let Some(value) = lookup("APPUNIT_DEBUG") {
			self.debug = parse_bool("APPUNIT_DEBUG", value)?;
		}
		if let Some(value) = lookup("APPUNIT_AUTO_BIND") {
			self.auto_bind = parse_bool("APPUNIT_AUTO_BIND", value)?;
		}
		if let Some(value) = lookup("APPUNIT_HOST") {
			self.server.host = value;
		}
		if let Some(value) = lookup("APPUNIT_PORT") {
			self.server.port = value.trim().parse().map_err(|e: std::num::ParseIntError| {
				SettingsError::Env {
					key: "APPUNIT_PORT",
					reason: e.to_string(),
					value,
				}
			})?;
		}
		if let Some(value) = lookup("APPUNIT_LOG_LEVEL") {
			self.logging.level = value;
		}
		Ok(self)
	}
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, SettingsError> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" | "" => Ok(false),
		_ => Err(SettingsError::Env {
			key,
			value,
			reason: "expected a boolean".to_string(),
		}),
	}
}
