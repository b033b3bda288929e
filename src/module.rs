//! Application modules
//!
//! A module bundles bindings, routes and hooks. When installed with
//! [`AppUnit::add_module`] it receives a back-reference to the application,
//! then [`Module::configure`] runs. [`Module::register`] runs once the
//! application is fully built.
//!
//! ```rust
//! use appunit::{AppRef, AppUnit, AppResult, Module};
//! use appunit_di::Provide;
//! use std::sync::Arc;
//!
//! struct Greeting(&'static str);
//!
//! #[derive(Default)]
//! struct GreetingModule {
//!     app: AppRef,
//! }
//!
//! impl Module for GreetingModule {
//!     fn app_ref(&self) -> &AppRef {
//!         &self.app
//!     }
//!
//!     fn configure(&self, app: &AppUnit) -> AppResult<()> {
//!         app.singleton::<Greeting>(Provide::instance(Arc::new(Greeting("hello"))));
//!         Ok(())
//!     }
//! }
//!
//! let module = Arc::new(GreetingModule::default());
//! assert!(module.app().is_err());
//!
//! let app = AppUnit::builder().module(module.clone()).build().unwrap();
//! assert!(module.app().unwrap().ptr_eq(&app));
//! ```

use std::sync::{PoisonError, RwLock, Weak};

use crate::application::{AppInner, AppUnit};
use crate::error::{AppError, AppResult};

/// A module's back-reference to the application that installed it.
///
/// Holds the application weakly, so a module stored inside its own
/// application does not keep it alive.
#[derive(Default)]
pub struct AppRef {
	app: RwLock<Weak<AppInner>>,
}

impl AppRef {
	pub fn new() -> Self {
		Self::default()
	}

	/// The installing application, if it was installed and is still alive.
	pub fn get(&self) -> Option<AppUnit> {
		self.app
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.upgrade()
			.map(AppUnit::from_inner)
	}

	pub(crate) fn set(&self, app: &AppUnit) {
		*self.app.write().unwrap_or_else(PoisonError::into_inner) = app.downgrade();
	}
}

impl std::fmt::Debug for AppRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppRef")
			.field("configured", &self.get().is_some())
			.finish()
	}
}

pub trait Module: Send + Sync + 'static {
	/// Storage for the back-reference, usually a field of the module.
	fn app_ref(&self) -> &AppRef;

	/// Add bindings, routes and hooks to `app`.
	fn configure(&self, _app: &AppUnit) -> AppResult<()> {
		Ok(())
	}

	/// Runs once after the application is fully built.
	fn register(&self) -> AppResult<()> {
		Ok(())
	}

	/// Name used in error messages. Defaults to the type name without its
	/// module path.
	fn name(&self) -> &'static str {
		let full = std::any::type_name::<Self>();
		full.rsplit("::").next().unwrap_or(full)
	}

	/// The application this module was installed into.
	///
	/// # Errors
	///
	/// [`AppError::ModuleNotConfigured`] before installation.
	fn app(&self) -> AppResult<AppUnit> {
		self.app_ref()
			.get()
			.ok_or_else(|| AppError::ModuleNotConfigured(self.name().to_string()))
	}
}
