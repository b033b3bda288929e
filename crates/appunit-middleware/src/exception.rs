//! Typed exception handling

use appunit_http::{
	Error, ExceptionHandler, Handler, Method, Middleware, Request, Response, Result, StatusCode,
};
use async_trait::async_trait;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// What an exception handler is registered against.
#[derive(Clone, Copy)]
pub enum ExceptionKey {
	/// Errors carrying this HTTP status.
	Status(StatusCode),
	/// Custom errors of one concrete type. Build with [`ExceptionKey::of`].
	Type {
		type_id: TypeId,
		name: &'static str,
		matches: fn(&Error) -> bool,
	},
	/// Every error. Like `Status(500)`, handled by the outermost layer.
	Any,
}

fn is_error<E: std::error::Error + 'static>(error: &Error) -> bool {
	error.is::<E>()
}

impl ExceptionKey {
	pub fn status(status: StatusCode) -> Self {
		ExceptionKey::Status(status)
	}

	/// Key for custom errors of type `E`.
	pub fn of<E: std::error::Error + 'static>() -> Self {
		ExceptionKey::Type {
			type_id: TypeId::of::<E>(),
			name: std::any::type_name::<E>(),
			matches: is_error::<E>,
		}
	}

	/// Whether handlers under this key belong to the outermost error layer
	/// rather than the typed exception layer.
	pub fn is_catastrophic(&self) -> bool {
		match self {
			ExceptionKey::Any => true,
			ExceptionKey::Status(status) => *status == StatusCode::INTERNAL_SERVER_ERROR,
			ExceptionKey::Type { .. } => false,
		}
	}

	/// Whether `error` should be rendered by a handler registered under this key.
	pub fn matches(&self, error: &Error) -> bool {
		match self {
			ExceptionKey::Status(status) => error.status() == Some(*status),
			ExceptionKey::Type { matches, .. } => matches(error),
			ExceptionKey::Any => true,
		}
	}
}

impl From<StatusCode> for ExceptionKey {
	fn from(status: StatusCode) -> Self {
		ExceptionKey::Status(status)
	}
}

impl PartialEq for ExceptionKey {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(ExceptionKey::Status(a), ExceptionKey::Status(b)) => a == b,
			(ExceptionKey::Type { type_id: a, .. }, ExceptionKey::Type { type_id: b, .. }) => a == b,
			(ExceptionKey::Any, ExceptionKey::Any) => true,
			_ => false,
		}
	}
}

impl Eq for ExceptionKey {}

impl Hash for ExceptionKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::mem::discriminant(self).hash(state);
		match self {
			ExceptionKey::Status(status) => status.hash(state),
			ExceptionKey::Type { type_id, .. } => type_id.hash(state),
			ExceptionKey::Any => {}
		}
	}
}

impl fmt::Debug for ExceptionKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ExceptionKey::Status(status) => write!(f, "Status({})", status.as_u16()),
			ExceptionKey::Type { name, .. } => write!(f, "Type({name})"),
			ExceptionKey::Any => f.write_str("Any"),
		}
	}
}

/// Innermost pipeline layer: renders errors that have a registered handler.
///
/// HTTP errors are looked up by status, other errors by type, in registration
/// order. HTTP errors without a handler are rendered as plain text with their
/// status. Everything else propagates to the outer layers.
pub struct ExceptionMiddleware {
	handlers: Vec<(ExceptionKey, Arc<dyn ExceptionHandler>)>,
}

impl ExceptionMiddleware {
	pub fn new(handlers: impl IntoIterator<Item = (ExceptionKey, Arc<dyn ExceptionHandler>)>) -> Self {
		Self {
			handlers: handlers.into_iter().collect(),
		}
	}

	fn lookup(&self, error: &Error) -> Option<(&ExceptionKey, &Arc<dyn ExceptionHandler>)> {
		self.handlers
			.iter()
			.find(|(key, _)| key.matches(error))
			.map(|(key, handler)| (key, handler))
	}
}

#[async_trait]
impl Middleware for ExceptionMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let retained = request.clone();
		let error = match next.handle(request).await {
			Ok(response) => return Ok(response),
			Err(error) => error,
		};

		if let Some((key, handler)) = self.lookup(&error) {
			tracing::debug!(?key, %error, "rendering error with exception handler");
			return handler.handle(retained, error).await;
		}
		match &error {
			Error::Http { status, detail } => Ok(http_error_response(*status, detail)),
			Error::MethodNotAllowed { allowed } => Ok(method_not_allowed_response(allowed)),
			_ => Err(error),
		}
	}
}

/// `405` with an `Allow` header listing `allowed`.
pub fn method_not_allowed_response(allowed: &[Method]) -> Response {
	let allow = allowed
		.iter()
		.map(Method::as_str)
		.collect::<Vec<_>>()
		.join(", ");
	Response::text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").with_header("allow", &allow)
}

/// Default rendering for HTTP errors without a registered handler.
pub fn http_error_response(status: StatusCode, detail: &str) -> Response {
	if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
		return Response::new(status);
	}
	Response::text(status, detail.to_string())
}
