//! Application-level errors

use appunit_commands::{BoxError, CommandError};
use appunit_conf::SettingsError;
use appunit_di::DiError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
	/// A module's application was requested before it was installed.
	#[error("{0} is not configured.")]
	ModuleNotConfigured(String),

	/// A feature needs a component that was not compiled in.
	#[error("`{0}` is not installed.")]
	OptionalDependencyMissing(&'static str),

	/// A startup or shutdown hook failed.
	#[error("Lifecycle hook failed: {0}")]
	Hook(#[source] BoxError),

	#[error(transparent)]
	Di(#[from] DiError),

	#[error(transparent)]
	Http(#[from] appunit_http::Error),

	#[error(transparent)]
	Settings(#[from] SettingsError),

	#[error(transparent)]
	Command(#[from] CommandError),

	#[cfg(feature = "server")]
	#[error(transparent)]
	Server(#[from] appunit_server::ServerError),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}
