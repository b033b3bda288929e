use appunit_di::context;
use appunit_http::{Handler, Middleware, Request, Response, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Installs the incoming request as the ambient request for the rest of the
/// pipeline.
///
/// Everything below this layer can resolve `Request` and request-scoped
/// bindings. The previous context is restored when the rest of the pipeline
/// returns, fails or is cancelled.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestScopeMiddleware;

impl RequestScopeMiddleware {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Middleware for RequestScopeMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		context::with_request(request.clone(), next.handle(request)).await
	}
}
