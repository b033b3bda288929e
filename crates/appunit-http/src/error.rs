//! Errors raised by handler bodies and pipeline layers.
//!
//! HTTP errors carry a status code and are rendered by status; every other
//! failure travels as [`Error::Custom`] so exception handlers can match on the
//! concrete error type.

use http::{Method, StatusCode};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// An error with an explicit HTTP status, rendered as-is when unhandled.
	#[error("{status}: {detail}")]
	Http { status: StatusCode, detail: String },

	/// The path exists but does not accept the request method.
	#[error("405 Method Not Allowed")]
	MethodNotAllowed { allowed: Vec<Method> },

	#[error("Serialization error: {0}")]
	Serialization(String),

	#[error("Internal server error: {0}")]
	Internal(String),

	/// Any application error. Exception handlers can match on its type.
	#[error(transparent)]
	Custom(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
	pub fn http(status: StatusCode, detail: impl Into<String>) -> Self {
		Error::Http {
			status,
			detail: detail.into(),
		}
	}

	pub fn bad_request(detail: impl Into<String>) -> Self {
		Self::http(StatusCode::BAD_REQUEST, detail)
	}

	pub fn not_found(detail: impl Into<String>) -> Self {
		Self::http(StatusCode::NOT_FOUND, detail)
	}

	pub fn method_not_allowed(allowed: impl IntoIterator<Item = Method>) -> Self {
		Error::MethodNotAllowed {
			allowed: allowed.into_iter().collect(),
		}
	}

	/// Wrap an arbitrary application error.
	///
	/// # Examples
	///
	/// ```
	/// use appunit_http::Error;
	///
	/// #[derive(Debug, thiserror::Error)]
	/// #[error("quota exceeded")]
	/// struct QuotaExceeded;
	///
	/// let error = Error::custom(QuotaExceeded);
	/// assert!(error.is::<QuotaExceeded>());
	/// assert_eq!(error.status(), None);
	/// ```
	pub fn custom<E>(error: E) -> Self
	where
		E: std::error::Error + Send + Sync + 'static,
	{
		Error::Custom(Box::new(error))
	}

	/// The HTTP status of this error, if it carries one.
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Error::Http { status, .. } => Some(*status),
			Error::MethodNotAllowed { .. } => Some(StatusCode::METHOD_NOT_ALLOWED),
			_ => None,
		}
	}

	/// Whether this is a custom error of type `E`.
	pub fn is<E: std::error::Error + 'static>(&self) -> bool {
		self.downcast_ref::<E>().is_some()
	}

	pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
		match self {
			Error::Custom(inner) => inner.downcast_ref::<E>(),
			_ => None,
		}
	}

	/// Render the error and its source chain, one cause per line.
	pub fn report(&self) -> String {
		let mut out = self.to_string();
		let mut source = std::error::Error::source(self);
		while let Some(cause) = source {
			out.push_str("\n  caused by: ");
			out.push_str(&cause.to_string());
			source = cause.source();
		}
		out
	}
}

impl From<serde_json::Error> for Error {
	fn from(error: serde_json::Error) -> Self {
		Error::Serialization(error.to_string())
	}
}
