use std::process::ExitCode;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
	/// Argument parsing failed, or help or version output was requested.
	#[error(transparent)]
	Usage(#[from] clap::Error),

	#[error("No such command: {0}")]
	UnknownCommand(String),

	/// The command body returned an error.
	#[error("Command `{command}` failed: {source}")]
	Failed {
		command: String,
		#[source]
		source: Box<dyn std::error::Error + Send + Sync + 'static>,
	},

	#[error("Command `{command}` panicked: {message}")]
	Panicked { command: String, message: String },

	#[error("Failed to start the async runtime: {0}")]
	Runtime(#[source] std::io::Error),
}

impl CommandError {
	pub fn failed<E>(command: impl Into<String>, error: E) -> Self
	where
		E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
	{
		CommandError::Failed {
			command: command.into(),
			source: error.into(),
		}
	}

	/// Process exit status for this error. Usage errors follow clap (2, or 0
	/// for help and version output), everything else exits with 1.
	pub fn exit_code(&self) -> ExitCode {
		match self {
			CommandError::Usage(error) => ExitCode::from(error.exit_code().clamp(0, 255) as u8),
			_ => ExitCode::FAILURE,
		}
	}
}
