//! Call-site adapters
//!
//! Each adapter owns an [`InjectFn`] plus the container to resolve its
//! dependencies from, and implements the trait its call site expects.

use appunit_commands::{BoxError, CommandRunner};
use appunit_di::Container;
use appunit_http::{Error, ExceptionHandler, Handler, Middleware, Next, Request, Response};
use async_trait::async_trait;
use clap::ArgMatches;
use futures::FutureExt;
use serde_json::Value;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::handler::{InjectFn, IntoCompletion, IntoOutcome, Outcome};
use crate::lifecycle::Lifecycle;

/// Turns route payloads into responses.
pub type ResponseClass = Arc<dyn Fn(Value) -> appunit_http::Result<Response> + Send + Sync>;

/// Renders payloads as `application/json`.
pub fn json_response_class() -> ResponseClass {
	Arc::new(|value: Value| Response::json(&value))
}

fn render(output: impl IntoOutcome, response_class: &ResponseClass) -> appunit_http::Result<Response> {
	match output.into_outcome()? {
		Outcome::Response(response) => Ok(response),
		Outcome::Payload(value) => response_class(value),
	}
}

/// Route endpoint. The request itself is not passed positionally; handlers
/// that need it declare a `Request` dependency.
pub struct RouteEndpoint<F, M> {
	f: F,
	container: Container,
	response_class: ResponseClass,
	_marker: PhantomData<fn() -> M>,
}

impl<F, M> RouteEndpoint<F, M> {
	pub fn new(f: F, container: Container, response_class: ResponseClass) -> Self {
		Self {
			f,
			container,
			response_class,
			_marker: PhantomData,
		}
	}
}

#[async_trait]
impl<F, M> Handler for RouteEndpoint<F, M>
where
	F: InjectFn<(), M>,
	F::Output: IntoOutcome,
	M: 'static,
{
	async fn handle(&self, _request: Request) -> appunit_http::Result<Response> {
		let output = self.f.invoke(&self.container, ()).await?;
		render(output, &self.response_class)
	}
}

/// Exception handler called with `(Request, Error)` then its dependencies.
pub struct ExceptionEndpoint<F, M> {
	f: F,
	container: Container,
	response_class: ResponseClass,
	_marker: PhantomData<fn() -> M>,
}

impl<F, M> ExceptionEndpoint<F, M> {
	pub fn new(f: F, container: Container, response_class: ResponseClass) -> Self {
		Self {
			f,
			container,
			response_class,
			_marker: PhantomData,
		}
	}
}

#[async_trait]
impl<F, M> ExceptionHandler for ExceptionEndpoint<F, M>
where
	F: InjectFn<(Request, Error), M>,
	F::Output: IntoOutcome,
	M: 'static,
{
	async fn handle(&self, request: Request, error: Error) -> appunit_http::Result<Response> {
		let output = self.f.invoke(&self.container, (request, error)).await?;
		render(output, &self.response_class)
	}
}

/// Middleware function called with `(Request, Next)` then its dependencies.
/// It may return without running `next`.
pub struct FnMiddleware<F, M> {
	f: F,
	container: Container,
	response_class: ResponseClass,
	_marker: PhantomData<fn() -> M>,
}

impl<F, M> FnMiddleware<F, M> {
	pub fn new(f: F, container: Container, response_class: ResponseClass) -> Self {
		Self {
			f,
			container,
			response_class,
			_marker: PhantomData,
		}
	}
}

#[async_trait]
impl<F, M> Middleware for FnMiddleware<F, M>
where
	F: InjectFn<(Request, Next), M>,
	F::Output: IntoOutcome,
	M: 'static,
{
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> appunit_http::Result<Response> {
		let output = self
			.f
			.invoke(&self.container, (request, Next::new(next)))
			.await?;
		render(output, &self.response_class)
	}
}

/// A startup or shutdown hook.
#[async_trait]
pub trait LifecycleHook: Send + Sync {
	async fn call(&self) -> AppResult<()>;
}

pub struct HookAdapter<F, M> {
	f: F,
	container: Container,
	_marker: PhantomData<fn() -> M>,
}

impl<F, M> HookAdapter<F, M> {
	pub fn new(f: F, container: Container) -> Self {
		Self {
			f,
			container,
			_marker: PhantomData,
		}
	}
}

#[async_trait]
impl<F, M> LifecycleHook for HookAdapter<F, M>
where
	F: InjectFn<(), M>,
	F::Output: IntoCompletion,
	M: 'static,
{
	async fn call(&self) -> AppResult<()> {
		let output = self.f.invoke(&self.container, ()).await?;
		output.into_completion().map_err(AppError::Hook)
	}
}

/// Command body called with its `ArgMatches` then its dependencies.
///
/// With `lifespan` the application's startup hooks run first and its
/// shutdown hooks always run afterwards, even if the body fails, panics or
/// is cancelled.
/// A failing startup hook aborts the command before the body runs.
pub struct CommandAdapter<F, M> {
	f: F,
	container: Container,
	lifecycle: Arc<Lifecycle>,
	lifespan: bool,
	_marker: PhantomData<fn() -> M>,
}

impl<F, M> CommandAdapter<F, M> {
	pub fn new(f: F, container: Container, lifecycle: Arc<Lifecycle>, lifespan: bool) -> Self {
		Self {
			f,
			container,
			lifecycle,
			lifespan,
			_marker: PhantomData,
		}
	}
}

impl<F, M> CommandAdapter<F, M>
where
	F: InjectFn<(ArgMatches,), M>,
	F::Output: IntoCompletion,
	M: 'static,
{
	async fn body(&self, matches: ArgMatches) -> Result<(), BoxError> {
		let output = self.f.invoke(&self.container, (matches,)).await?;
		output.into_completion()
	}
}

/// Runs the shutdown hooks on a fresh task if the command future is dropped
/// between startup and its own shutdown call.
struct PendingShutdown {
	lifecycle: Option<Arc<Lifecycle>>,
}

impl PendingShutdown {
	fn arm(lifecycle: Arc<Lifecycle>) -> Self {
		Self {
			lifecycle: Some(lifecycle),
		}
	}

	fn disarm(mut self) {
		self.lifecycle = None;
	}
}

impl Drop for PendingShutdown {
	fn drop(&mut self) {
		let Some(lifecycle) = self.lifecycle.take() else {
			return;
		};
		let Ok(runtime) = tokio::runtime::Handle::try_current() else {
			tracing::error!("command cancelled outside a runtime, shutdown hooks skipped");
			return;
		};
		tracing::warn!("command cancelled, running shutdown hooks");
		runtime.spawn(async move {
			if let Err(error) = lifecycle.shutdown().await {
				tracing::error!(%error, "shutdown hook failed after command cancellation");
			}
		});
	}
}

#[async_trait]
impl<F, M> CommandRunner for CommandAdapter<F, M>
where
	F: InjectFn<(ArgMatches,), M>,
	F::Output: IntoCompletion,
	M: 'static,
{
	async fn run(&self, matches: ArgMatches) -> Result<(), BoxError> {
		if !self.lifespan {
			return self.body(matches).await;
		}

		self.lifecycle.startup().await?;
		let pending = PendingShutdown::arm(self.lifecycle.clone());
		let outcome = AssertUnwindSafe(self.body(matches)).catch_unwind().await;
		pending.disarm();
		let shutdown = self.lifecycle.shutdown().await;

		match outcome {
			Ok(result) => {
				result?;
				shutdown.map_err(Into::into)
			}
			Err(payload) => {
				if let Err(error) = shutdown {
					tracing::error!(%error, "shutdown hook failed after command panic");
				}
				std::panic::resume_unwind(payload)
			}
		}
	}
}
