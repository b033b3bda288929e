use appunit_http::{Handler, Middleware, Request, Response, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Access log middleware
///
/// Logs each request with its method, path, status code and duration at
/// `INFO`, or the error at `WARN` if the rest of the pipeline failed.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use appunit_middleware::AccessLogMiddleware;
/// use appunit_http::{Handler, Middleware, Request, Response, StatusCode};
///
/// struct Ok200;
///
/// #[async_trait::async_trait]
/// impl Handler for Ok200 {
///     async fn handle(&self, _request: Request) -> appunit_http::Result<Response> {
///         Ok(Response::ok().with_body("OK"))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let middleware = AccessLogMiddleware::new();
/// let request = Request::builder().uri("/api/users").build().unwrap();
///
/// let response = middleware.process(request, Arc::new(Ok200)).await.unwrap();
/// assert_eq!(response.status, StatusCode::OK);
/// // Logs: GET /api/users status=200 elapsed_ms=0
/// # });
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct AccessLogMiddleware;

impl AccessLogMiddleware {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Middleware for AccessLogMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let start = Instant::now();
		let method = request.method.clone();
		let path = request.path().to_string();

		let result = next.handle(request).await;

		let elapsed_ms = start.elapsed().as_millis() as u64;
		match &result {
			Ok(response) => {
				tracing::info!(
					%method,
					%path,
					status = response.status.as_u16(),
					elapsed_ms,
					"request completed"
				);
			}
			Err(error) => {
				tracing::warn!(%method, %path, %error, elapsed_ms, "request failed");
			}
		}

		result
	}
}
