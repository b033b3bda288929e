use bytes::Bytes;
use http::header::{self, HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use serde::Serialize;

/// HTTP Response representation
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	/// Create a new Response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use appunit_http::{Response, StatusCode};
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn created() -> Self {
		Self::new(StatusCode::CREATED)
	}

	pub fn no_content() -> Self {
		Self::new(StatusCode::NO_CONTENT)
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Create a `200 OK` JSON response from any serializable value.
	///
	/// # Examples
	///
	/// ```
	/// use appunit_http::Response;
	/// use serde_json::json;
	///
	/// let response = Response::json(&json!({"message": "hi"})).unwrap();
	/// assert_eq!(response.content_type(), Some("application/json"));
	/// assert_eq!(response.body_text(), r#"{"message":"hi"}"#);
	/// ```
	pub fn json<T: Serialize + ?Sized>(data: &T) -> crate::Result<Self> {
		Self::ok().with_json(data)
	}

	/// Create a `text/plain` response with the given status.
	pub fn text(status: StatusCode, body: impl Into<Bytes>) -> Self {
		Self::new(status)
			.with_body(body)
			.with_content_type("text/plain; charset=utf-8")
	}

	pub fn with_status(mut self, status: StatusCode) -> Self {
		self.status = status;
		self
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Add a custom header to the response. Invalid names or values are ignored.
	///
	/// # Examples
	///
	/// ```
	/// use appunit_http::Response;
	///
	/// let response = Response::ok().with_header("X-Custom-Header", "custom-value");
	/// assert_eq!(
	///     response.headers.get("X-Custom-Header").unwrap().to_str().unwrap(),
	///     "custom-value"
	/// );
	/// ```
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) {
			if let Ok(header_value) = HeaderValue::from_str(value) {
				self.headers.insert(header_name, header_value);
			}
		}
		self
	}

	pub fn with_content_type(mut self, content_type: &'static str) -> Self {
		self.headers
			.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
		self
	}

	/// Set the response body to JSON and add appropriate Content-Type header
	pub fn with_json<T: Serialize + ?Sized>(mut self, data: &T) -> crate::Result<Self> {
		let json = serde_json::to_vec(data)?;
		self.body = Bytes::from(json);
		Ok(self.with_content_type("application/json"))
	}

	pub fn content_type(&self) -> Option<&str> {
		self.headers
			.get(header::CONTENT_TYPE)
			.and_then(|v| v.to_str().ok())
	}

	/// The body decoded as UTF-8, lossy.
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}
