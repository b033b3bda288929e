//! Installing modules into an application

use appunit::prelude::*;
use appunit_http::Handler;
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Mailer {
	sender: &'static str,
}

#[derive(Default)]
struct MailModule {
	app: AppRef,
	registered: AtomicUsize,
}

impl Module for MailModule {
	fn app_ref(&self) -> &AppRef {
		&self.app
	}

	fn configure(&self, app: &AppUnit) -> AppResult<()> {
		app.singleton::<Mailer>(Provide::instance(Arc::new(Mailer {
			sender: "noreply@example.com",
		})));
		app.get("/mail/sender", |mailer: Injected<Mailer>| async move { mailer.sender });
		Ok(())
	}

	fn register(&self) -> AppResult<()> {
		// The back-reference is usable by the time register runs
		self.app()?;
		self.registered.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}

#[derive(Default)]
struct BrokenModule {
	app: AppRef,
}

impl Module for BrokenModule {
	fn app_ref(&self) -> &AppRef {
		&self.app
	}

	fn configure(&self, _app: &AppUnit) -> AppResult<()> {
		Err(AppError::ModuleNotConfigured("smtp".into()))
	}
}

#[rstest]
fn test_module_not_configured_before_install() {
	let module = MailModule::default();

	let error = module.app().unwrap_err();

	assert_eq!(error.to_string(), "MailModule is not configured.");
}

#[rstest]
#[tokio::test]
async fn test_builder_installs_then_registers() {
	// Arrange
	let module = Arc::new(MailModule::default());

	// Act
	let app = AppUnit::builder().module(module.clone()).build().unwrap();

	// Assert
	assert!(module.app().unwrap().ptr_eq(&app));
	assert_eq!(module.registered.load(Ordering::SeqCst), 1);
	let request = Request::builder().uri("/mail/sender").build().unwrap();
	let response = app.handle(request).await.unwrap();
	assert_eq!(response.body_text(), r#""noreply@example.com""#);
}

#[rstest]
fn test_add_module_on_built_app_registers_immediately() {
	let app = AppUnit::new();
	let module = Arc::new(MailModule::default());

	app.add_module(module.clone()).unwrap();

	assert_eq!(module.registered.load(Ordering::SeqCst), 1);
	assert_eq!(app.modules().len(), 1);
}

#[rstest]
fn test_configure_error_aborts_build() {
	let result = AppUnit::builder()
		.module(Arc::new(BrokenModule::default()))
		.build();

	assert!(matches!(result, Err(AppError::ModuleNotConfigured(name)) if name == "smtp"));
}

#[rstest]
#[tokio::test]
async fn test_handlers_receive_the_application() {
	let module = Arc::new(MailModule::default());
	let app = AppUnit::builder().module(module.clone()).build().unwrap();
	app.get("/modules", |app: AppUnit| async move { Payload(app.modules().len()) });

	let request = Request::builder().uri("/modules").build().unwrap();
	let response = app.handle(request).await.unwrap();

	assert_eq!(response.body_text(), "1");
}
