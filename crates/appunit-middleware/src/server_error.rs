//! Outermost error layer

use appunit_http::{
	Error, ExceptionHandler, Handler, Middleware, Request, Response, Result, StatusCode,
};
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

const GENERIC_BODY: &str = "Internal Server Error";

/// Turns every error or panic that reaches it into a response.
///
/// - In debug mode the response is a plain-text report of the error and its
///   source chain.
/// - Otherwise the catastrophic handler (registered for status 500 or for all
///   errors) renders it. If that handler fails too, or none is registered, a
///   generic 500 is returned.
///
/// The error is always logged before it is rendered.
pub struct ServerErrorMiddleware {
	handler: Option<Arc<dyn ExceptionHandler>>,
	debug: bool,
}

impl ServerErrorMiddleware {
	pub fn new(handler: Option<Arc<dyn ExceptionHandler>>, debug: bool) -> Self {
		Self { handler, debug }
	}

	pub fn debug(&self) -> bool {
		self.debug
	}

	fn debug_response(error: &Error) -> Response {
		Response::text(
			StatusCode::INTERNAL_SERVER_ERROR,
			format!("{GENERIC_BODY}\n\n{}\n", error.report()),
		)
	}

	fn generic_response() -> Response {
		Response::text(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_BODY)
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		(*message).to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic payload".to_string()
	}
}

#[async_trait]
impl Middleware for ServerErrorMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let retained = request.clone();
		let outcome = AssertUnwindSafe(next.handle(request)).catch_unwind().await;

		let error = match outcome {
			Ok(Ok(response)) => return Ok(response),
			Ok(Err(error)) => error,
			Err(payload) => Error::Internal(format!("handler panicked: {}", panic_message(&*payload))),
		};

		tracing::error!(
			method = %retained.method,
			path = %retained.path(),
			error = %error.report(),
			"unhandled error in request pipeline"
		);

		if self.debug {
			return Ok(Self::debug_response(&error));
		}

		let Some(handler) = &self.handler else {
			return Ok(Self::generic_response());
		};
		match handler.handle(retained, error).await {
			Ok(response) => Ok(response),
			Err(nested) => {
				tracing::error!(error = %nested.report(), "server error handler failed");
				Ok(Self::generic_response())
			}
		}
	}
}
