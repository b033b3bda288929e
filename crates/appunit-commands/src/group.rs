//! Command registry and dispatch

use async_trait::async_trait;
use clap::{Arg, ArgMatches};
use futures::FutureExt;
use indexmap::IndexMap;
use std::ffi::OsString;
use std::panic::AssertUnwindSafe;
use std::process::ExitCode;
use std::sync::Arc;

use crate::error::CommandError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The body of a command.
#[async_trait]
pub trait CommandRunner: Send + Sync {
	async fn run(&self, matches: ArgMatches) -> Result<(), BoxError>;
}

/// One named command: its clap definition and the runner it dispatches to.
#[derive(Clone)]
pub struct Command {
	definition: clap::Command,
	runner: Arc<dyn CommandRunner>,
}

impl Command {
	pub fn new(name: impl Into<String>, runner: Arc<dyn CommandRunner>) -> Self {
		Self {
			definition: clap::Command::new(name.into()),
			runner,
		}
	}

	pub fn name(&self) -> &str {
		self.definition.get_name()
	}

	pub fn about(mut self, about: impl Into<String>) -> Self {
		self.definition = self.definition.about(about.into());
		self
	}

	pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
		self.definition = self.definition.arg(arg);
		self
	}

	/// Edit the underlying clap definition directly. The name is kept.
	pub fn configure(mut self, f: impl FnOnce(clap::Command) -> clap::Command) -> Self {
		let name = self.definition.get_name().to_string();
		self.definition = f(self.definition).name(name);
		self
	}
}

impl std::fmt::Debug for Command {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Command")
			.field("name", &self.name())
			.finish_non_exhaustive()
	}
}

/// A named set of commands and nested groups, parsed with clap.
///
/// Registering a command or group under an existing name replaces it.
#[derive(Debug, Clone)]
pub struct CommandGroup {
	name: String,
	about: Option<String>,
	commands: IndexMap<String, Command>,
	groups: IndexMap<String, CommandGroup>,
}

impl CommandGroup {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			about: None,
			commands: IndexMap::new(),
			groups: IndexMap::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn about(mut self, about: impl Into<String>) -> Self {
		self.about = Some(about.into());
		self
	}

	pub fn add_command(&mut self, command: Command) -> &mut Self {
		self.commands.insert(command.name().to_string(), command);
		self
	}

	pub fn add_group(&mut self, group: CommandGroup) -> &mut Self {
		self.groups.insert(group.name.clone(), group);
		self
	}

	/// Nested group by name, created on first use.
	pub fn group_mut(&mut self, name: &str) -> &mut CommandGroup {
		self.groups
			.entry(name.to_string())
			.or_insert_with(|| CommandGroup::new(name))
	}

	pub fn command_names(&self) -> impl Iterator<Item = &str> {
		self.commands.keys().map(String::as_str)
	}

	pub fn is_empty(&self) -> bool {
		self.commands.is_empty() && self.groups.is_empty()
	}

	/// Build the clap command tree for this group.
	pub fn to_clap(&self) -> clap::Command {
		let mut cli = clap::Command::new(self.name.clone())
			.subcommand_required(true)
			.arg_required_else_help(true);
		if let Some(about) = &self.about {
			cli = cli.about(about.clone());
		}
		for command in self.commands.values() {
			cli = cli.subcommand(command.definition.clone());
		}
		for group in self.groups.values() {
			cli = cli.subcommand(group.to_clap());
		}
		cli
	}

	/// Parse `args` (including the program name) and run the selected command.
	pub async fn execute<I, T>(&self, args: I) -> Result<(), CommandError>
	where
		I: IntoIterator<Item = T>,
		T: Into<OsString> + Clone,
	{
		let matches = self.to_clap().try_get_matches_from(args)?;
		self.dispatch(&matches).await
	}

	/// Run the command selected in already-parsed `matches`.
	pub async fn dispatch(&self, matches: &ArgMatches) -> Result<(), CommandError> {
		let Some((name, sub_matches)) = matches.subcommand() else {
			return Err(CommandError::UnknownCommand(self.name.clone()));
		};

		if let Some(group) = self.groups.get(name) {
			return Box::pin(group.dispatch(sub_matches)).await;
		}
		let command = self
			.commands
			.get(name)
			.ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;

		tracing::debug!(command = name, "running command");
		let outcome = AssertUnwindSafe(command.runner.run(sub_matches.clone()))
			.catch_unwind()
			.await;
		match outcome {
			Ok(Ok(())) => Ok(()),
			Ok(Err(error)) => Err(CommandError::failed(name, error)),
			Err(payload) => Err(CommandError::Panicked {
				command: name.to_string(),
				message: panic_message(&*payload),
			}),
		}
	}

	/// Run the command line on a fresh current-thread runtime and map the
	/// outcome to a process exit status.
	pub fn main(&self) -> ExitCode {
		self.main_from(std::env::args_os())
	}

	pub fn main_from<I, T>(&self, args: I) -> ExitCode
	where
		I: IntoIterator<Item = T>,
		T: Into<OsString> + Clone,
	{
		let runtime = match tokio::runtime::Builder::new_current_thread()
			.enable_all()
			.build()
		{
			Ok(runtime) => runtime,
			Err(error) => return report(CommandError::Runtime(error)),
		};
		match runtime.block_on(self.execute(args)) {
			Ok(()) => ExitCode::SUCCESS,
			Err(error) => report(error),
		}
	}
}

fn report(error: CommandError) -> ExitCode {
	let code = error.exit_code();
	match &error {
		// clap renders its own help, version and usage output
		CommandError::Usage(usage) => {
			let _ = usage.print();
		}
		other => {
			tracing::error!(error = %other, "command failed");
			eprintln!("Error: {other}");
		}
	}
	code
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		(*message).to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic payload".to_string()
	}
}
