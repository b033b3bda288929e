//! Serving the application

use appunit::prelude::*;
use appunit::conf::Settings;
use rstest::rstest;
use std::sync::{Arc, Mutex};

type Log = Mutex<Vec<String>>;

fn app() -> (AppUnit, Arc<Log>) {
	let mut settings = Settings::default();
	settings.server.port = 0;
	let app = AppUnit::builder().settings(settings).build().unwrap();
	let log = Arc::new(Log::default());
	app.singleton::<Log>(Provide::instance(log.clone()));
	app.add_startup_event(blocking(|log: Injected<Log>| {
		log.lock().unwrap().push("startup".into());
	}));
	app.add_shutdown_event(blocking(|log: Injected<Log>| {
		log.lock().unwrap().push("shutdown".into());
	}));
	(app, log)
}

#[cfg(feature = "server")]
#[rstest]
#[tokio::test]
async fn test_run_wraps_serving_in_lifespan() {
	let (app, log) = app();

	app.run_with_shutdown(async {}).await.unwrap();

	assert_eq!(*log.lock().unwrap(), vec!["startup", "shutdown"]);
}

#[cfg(feature = "server")]
#[rstest]
#[tokio::test]
async fn test_bad_address_fails_before_startup() {
	let mut settings = Settings::default();
	settings.server.host = "not a host".into();
	let app = AppUnit::builder().settings(settings).build().unwrap();

	let result = app.run_with_shutdown(async {}).await;

	assert!(matches!(result, Err(AppError::Settings(_))));
}

#[cfg(not(feature = "server"))]
#[rstest]
#[tokio::test]
async fn test_run_without_server_feature() {
	let (app, log) = app();

	let error = app.run().await.unwrap_err();

	assert_eq!(error.to_string(), "`appunit-server` is not installed.");
	assert!(log.lock().unwrap().is_empty());
}
