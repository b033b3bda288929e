//! Middleware and handler traits for HTTP request processing.
//!
//! ## Middleware
//!
//! Middleware wraps handlers to add cross-cutting concerns:
//!
//! ```rust
//! use appunit_http::{Handler, Middleware, Request, Response, Result};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct LoggingMiddleware;
//!
//! #[async_trait]
//! impl Middleware for LoggingMiddleware {
//!     async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
//!         println!("Request: {} {}", request.method, request.uri);
//!         next.handle(request).await
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::{Error, Request, Response, Result};

/// Handler trait for processing requests.
///
/// This is the core abstraction - the route dispatcher, every composed
/// pipeline layer and the application itself implement this trait.
#[async_trait]
pub trait Handler: Send + Sync {
	/// Handles an HTTP request and produces a response.
	///
	/// # Errors
	///
	/// Returns an error if the request cannot be processed.
	async fn handle(&self, request: Request) -> Result<Response>;
}

/// Blanket implementation for `Arc<T>` where T: Handler.
#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

/// Middleware trait for request/response processing.
///
/// Middleware can modify requests before passing to the next handler, modify
/// responses after it, or return a response without calling `next` at all.
#[async_trait]
pub trait Middleware: Send + Sync {
	/// Processes a request through this middleware.
	///
	/// # Errors
	///
	/// Returns an error if the middleware or next handler fails.
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;
}

/// Renders an error raised further down the pipeline into a response.
#[async_trait]
pub trait ExceptionHandler: Send + Sync {
	async fn handle(&self, request: Request, error: Error) -> Result<Response>;
}

#[async_trait]
impl<T: ExceptionHandler + ?Sized> ExceptionHandler for Arc<T> {
	async fn handle(&self, request: Request, error: Error) -> Result<Response> {
		(**self).handle(request, error).await
	}
}

/// The remainder of the pipeline, as seen from a middleware function.
///
/// Dropping a `Next` without calling [`Next::run`] short-circuits the chain.
#[derive(Clone)]
pub struct Next {
	inner: Arc<dyn Handler>,
}

impl Next {
	pub fn new(inner: Arc<dyn Handler>) -> Self {
		Self { inner }
	}

	/// Pass the request to the next stage.
	pub async fn run(self, request: Request) -> Result<Response> {
		self.inner.handle(request).await
	}
}

impl std::fmt::Debug for Next {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Next").finish_non_exhaustive()
	}
}

/// Middleware chain - composes multiple middleware around a handler.
///
/// Middleware run in the order they were added: the first one added is the
/// outermost and sees the request first.
pub struct MiddlewareChain {
	middlewares: Vec<Arc<dyn Middleware>>,
	handler: Arc<dyn Handler>,
}

impl MiddlewareChain {
	/// Creates a new middleware chain with the given handler.
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			middlewares: Vec::new(),
			handler,
		}
	}

	/// Adds a middleware to the chain using builder pattern.
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	/// Adds a middleware to the chain.
	pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
		self.middlewares.push(middleware);
	}

	/// Builds the final handler by composing all middleware, innermost first.
	pub fn build(self) -> Arc<dyn Handler> {
		let mut handler = self.handler;

		for middleware in self.middlewares.into_iter().rev() {
			handler = Arc::new(ComposedHandler {
				middleware,
				next: handler,
			});
		}

		handler
	}
}

/// Internal handler that wraps a middleware with its next handler.
struct ComposedHandler {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for ComposedHandler {
	async fn handle(&self, request: Request) -> Result<Response> {
		self.middleware.process(request, self.next.clone()).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::Method;
	use rstest::rstest;

	// Mock handler for testing
	struct MockHandler {
		response_body: String,
	}

	#[async_trait]
	impl Handler for MockHandler {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Ok(Response::ok().with_body(self.response_body.clone()))
		}
	}

	// Mock middleware for testing
	struct MockMiddleware {
		prefix: String,
	}

	#[async_trait]
	impl Middleware for MockMiddleware {
		async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
			let response = next.handle(request).await?;
			let new_body = format!("{}{}", self.prefix, response.body_text());
			Ok(Response::ok().with_body(new_body))
		}
	}

	// Never calls next
	struct ShortCircuit;

	#[async_trait]
	impl Middleware for ShortCircuit {
		async fn process(&self, _request: Request, _next: Arc<dyn Handler>) -> Result<Response> {
			Ok(Response::new(http::StatusCode::UNAUTHORIZED))
		}
	}

	fn create_test_request(method: Method) -> Request {
		Request::builder().method(method).uri("/").build().unwrap()
	}

	fn handler(body: &str) -> Arc<dyn Handler> {
		Arc::new(MockHandler {
			response_body: body.to_string(),
		})
	}

	#[rstest]
	#[tokio::test]
	async fn test_middleware_chain_empty() {
		let chain = MiddlewareChain::new(handler("Test")).build();
		let response = chain.handle(create_test_request(Method::GET)).await.unwrap();
		assert_eq!(response.body_text(), "Test");
	}

	#[rstest]
	#[tokio::test]
	async fn test_middleware_chain_order() {
		// Arrange
		let chain = MiddlewareChain::new(handler("Data"))
			.with_middleware(Arc::new(MockMiddleware {
				prefix: "M1:".to_string(),
			}))
			.with_middleware(Arc::new(MockMiddleware {
				prefix: "M2:".to_string(),
			}))
			.build();

		// Act
		let response = chain.handle(create_test_request(Method::GET)).await.unwrap();

		// Assert: M1 is outermost, so its prefix is applied last
		assert_eq!(response.body_text(), "M1:M2:Data");
	}

	#[rstest]
	#[tokio::test]
	async fn test_short_circuit_skips_inner_stages() {
		let mut chain = MiddlewareChain::new(handler("Data"));
		chain.add_middleware(Arc::new(ShortCircuit));
		chain.add_middleware(Arc::new(MockMiddleware {
			prefix: "never:".to_string(),
		}));

		let response = chain
			.build()
			.handle(create_test_request(Method::GET))
			.await
			.unwrap();

		assert_eq!(response.status, http::StatusCode::UNAUTHORIZED);
		assert!(response.body.is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_next_runs_remaining_pipeline() {
		let next = Next::new(handler("inner"));
		let response = next.run(create_test_request(Method::GET)).await.unwrap();
		assert_eq!(response.body_text(), "inner");
	}
}
