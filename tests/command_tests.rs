//! Commands and the application lifespan

use appunit::prelude::*;
use appunit_commands::CommandError;
use clap::{Arg, ArgMatches};
use rstest::rstest;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Log = Mutex<Vec<String>>;

fn entries(log: &Arc<Log>) -> Vec<String> {
	log.lock().unwrap().clone()
}

fn app_with_hooks() -> (AppUnit, Arc<Log>) {
	let log = Arc::new(Log::default());
	let app = AppUnit::new();
	app.singleton::<Log>(Provide::instance(log.clone()));
	app.add_startup_event(|log: Injected<Log>| async move {
		log.lock().unwrap().push("startup".into());
	});
	app.add_shutdown_event(blocking(|log: Injected<Log>| {
		log.lock().unwrap().push("shutdown".into());
	}));
	(app, log)
}

fn corrupt_ledger(_matches: ArgMatches) {
	panic!("ledger corrupted");
}

#[rstest]
#[tokio::test]
async fn test_command_runs_inside_lifespan() {
	// Arrange
	let (app, log) = app_with_hooks();
	app.add_command("migrate", |_matches: ArgMatches, log: Injected<Log>| async move {
		log.lock().unwrap().push("migrate".into());
	});

	// Act
	app.execute(["manage", "migrate"]).await.unwrap();

	// Assert
	assert_eq!(entries(&log), vec!["startup", "migrate", "shutdown"]);
}

#[rstest]
#[tokio::test]
async fn test_shutdown_runs_when_command_fails() {
	let (app, log) = app_with_hooks();
	app.add_command("import", |_matches: ArgMatches| async {
		Err::<(), _>("feed unavailable")
	});

	let error = app.execute(["manage", "import"]).await.unwrap_err();

	assert!(matches!(
		error,
		AppError::Command(CommandError::Failed { ref command, .. }) if command == "import"
	));
	assert_eq!(entries(&log), vec!["startup", "shutdown"]);
}

#[rstest]
#[tokio::test]
async fn test_shutdown_runs_when_command_panics() {
	let (app, log) = app_with_hooks();
	app.add_command("audit", blocking(corrupt_ledger));

	let error = app.execute(["manage", "audit"]).await.unwrap_err();

	assert!(matches!(
		error,
		AppError::Command(CommandError::Panicked { ref message, .. }) if message == "ledger corrupted"
	));
	assert_eq!(entries(&log), vec!["startup", "shutdown"]);
}

#[rstest]
#[tokio::test]
async fn test_shutdown_runs_when_command_is_cancelled() {
	// Arrange
	let (app, log) = app_with_hooks();
	app.add_command("serve", |_matches: ArgMatches| async {
		tokio::time::sleep(Duration::from_secs(5)).await;
	});

	// Act
	let outcome = tokio::time::timeout(Duration::from_millis(50), app.execute(["manage", "serve"])).await;
	// Shutdown is driven on its own task once the command is dropped
	tokio::time::sleep(Duration::from_millis(50)).await;

	// Assert
	assert!(outcome.is_err());
	assert_eq!(entries(&log), vec!["startup", "shutdown"]);
}

#[rstest]
#[tokio::test]
async fn test_failed_startup_skips_command_and_shutdown() {
	let (app, log) = app_with_hooks();
	app.add_startup_event(|| async { Err::<(), _>("database unreachable") });
	app.add_command("migrate", |_matches: ArgMatches, log: Injected<Log>| async move {
		log.lock().unwrap().push("migrate".into());
	});

	let result = app.execute(["manage", "migrate"]).await;

	assert!(result.is_err());
	assert_eq!(entries(&log), vec!["startup"]);
}

#[rstest]
#[tokio::test]
async fn test_command_without_lifespan_skips_hooks() {
	let (app, log) = app_with_hooks();
	app.add_command_with(
		"version",
		blocking(|_matches: ArgMatches, log: Injected<Log>| {
			log.lock().unwrap().push("version".into());
		}),
		CommandOptions::new().lifespan(false),
	);

	app.execute(["manage", "version"]).await.unwrap();

	assert_eq!(entries(&log), vec!["version"]);
}

#[rstest]
#[tokio::test]
async fn test_grouped_command_with_arguments() {
	let (app, log) = app_with_hooks();
	app.add_command_with(
		"create",
		|matches: ArgMatches, log: Injected<Log>| async move {
			let name = matches.get_one::<String>("name").cloned().unwrap_or_default();
			log.lock().unwrap().push(format!("create {name}"));
		},
		CommandOptions::new()
			.group("users")
			.about("Create a user")
			.arg(Arg::new("name").required(true)),
	);

	app.execute(["manage", "users", "create", "ada"]).await.unwrap();

	assert_eq!(entries(&log), vec!["startup", "create ada", "shutdown"]);
	assert!(app.commands().to_clap().find_subcommand("users").is_some());
}

#[rstest]
#[case::unknown(&["manage", "nope"])]
#[case::missing_argument(&["manage", "users", "create"])]
#[tokio::test]
async fn test_usage_errors(#[case] args: &[&str]) {
	let (app, log) = app_with_hooks();
	app.add_command_with(
		"create",
		|_matches: ArgMatches| async {},
		CommandOptions::new()
			.group("users")
			.arg(Arg::new("name").required(true)),
	);

	let error = app.execute(args.iter().copied()).await.unwrap_err();

	assert!(matches!(error, AppError::Command(CommandError::Usage(_))));
	assert!(entries(&log).is_empty());
}
