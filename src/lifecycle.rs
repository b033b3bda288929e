//! Startup and shutdown hooks
//!
//! Hooks run in registration order. The first failing hook stops the run and
//! its error is returned.

use std::sync::{Arc, PoisonError, RwLock};

use crate::adapter::LifecycleHook;
use crate::error::AppResult;

/// Registry of startup and shutdown hooks.
#[derive(Default)]
pub struct Lifecycle {
	startup: RwLock<Vec<Arc<dyn LifecycleHook>>>,
	shutdown: RwLock<Vec<Arc<dyn LifecycleHook>>>,
}

impl Lifecycle {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_startup(&self, hook: Arc<dyn LifecycleHook>) {
		self.startup
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.push(hook);
	}

	pub fn add_shutdown(&self, hook: Arc<dyn LifecycleHook>) {
		self.shutdown
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.push(hook);
	}

	/// Number of `(startup, shutdown)` hooks.
	pub fn counts(&self) -> (usize, usize) {
		(
			self.startup.read().unwrap_or_else(PoisonError::into_inner).len(),
			self.shutdown.read().unwrap_or_else(PoisonError::into_inner).len(),
		)
	}

	pub async fn startup(&self) -> AppResult<()> {
		run_hooks("startup", &self.startup).await
	}

	pub async fn shutdown(&self) -> AppResult<()> {
		run_hooks("shutdown", &self.shutdown).await
	}
}

async fn run_hooks(phase: &'static str, hooks: &RwLock<Vec<Arc<dyn LifecycleHook>>>) -> AppResult<()> {
	// Hooks may register further hooks; never hold the lock across a call
	let hooks = hooks.read().unwrap_or_else(PoisonError::into_inner).clone();
	tracing::info!(phase, count = hooks.len(), "running lifecycle hooks");

	for (index, hook) in hooks.iter().enumerate() {
		if let Err(error) = hook.call().await {
			tracing::error!(phase, index, %error, "lifecycle hook failed");
			return Err(error);
		}
	}
	Ok(())
}

impl std::fmt::Debug for Lifecycle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let (startup, shutdown) = self.counts();
		f.debug_struct("Lifecycle")
			.field("startup", &startup)
			.field("shutdown", &shutdown)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::AppError;
	use async_trait::async_trait;
	use rstest::rstest;
	use std::sync::Mutex;

	struct Record {
		label: &'static str,
		log: Arc<Mutex<Vec<&'static str>>>,
		fail: bool,
	}

	#[async_trait]
	impl LifecycleHook for Record {
		async fn call(&self) -> AppResult<()> {
			self.log.lock().unwrap().push(self.label);
			if self.fail {
				return Err(AppError::Hook(format!("{} failed", self.label).into()));
			}
			Ok(())
		}
	}

	fn hook(label: &'static str, log: &Arc<Mutex<Vec<&'static str>>>, fail: bool) -> Arc<dyn LifecycleHook> {
		Arc::new(Record {
			label,
			log: log.clone(),
			fail,
		})
	}

	#[rstest]
	#[tokio::test]
	async fn test_hooks_run_in_registration_order() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let lifecycle = Lifecycle::new();
		lifecycle.add_startup(hook("first", &log, false));
		lifecycle.add_startup(hook("second", &log, false));
		lifecycle.add_shutdown(hook("closing", &log, false));

		lifecycle.startup().await.unwrap();
		lifecycle.shutdown().await.unwrap();

		assert_eq!(*log.lock().unwrap(), vec!["first", "second", "closing"]);
		assert_eq!(lifecycle.counts(), (2, 1));
	}

	#[rstest]
	#[tokio::test]
	async fn test_first_failure_stops_the_run() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let lifecycle = Lifecycle::new();
		lifecycle.add_startup(hook("database", &log, true));
		lifecycle.add_startup(hook("cache", &log, false));

		let result = lifecycle.startup().await;

		assert!(matches!(result, Err(AppError::Hook(_))));
		assert_eq!(*log.lock().unwrap(), vec!["database"]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_empty_lifecycle_succeeds() {
		let lifecycle = Lifecycle::new();

		assert!(lifecycle.startup().await.is_ok());
		assert!(lifecycle.shutdown().await.is_ok());
	}
}
