use bytes::Bytes;
use http::{HeaderMap, Method, Uri, Version};
use std::collections::HashMap;

use crate::{Error, Result};

/// HTTP Request representation.
///
/// Requests are cheap to clone: the body is reference counted, so layers that
/// need to keep a copy while handing the original downstream may do so.
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// Parameters captured from `{name}` segments by the router.
	pub path_params: HashMap<String, String>,
	pub query_params: HashMap<String, String>,
}

impl Request {
	/// Create a new request from already-parsed parts.
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		let query_params = Self::parse_query_params(&uri);
		Self {
			method,
			uri,
			version,
			headers,
			body,
			path_params: HashMap::new(),
			query_params,
		}
	}

	/// Start building a request.
	///
	/// # Examples
	///
	/// ```
	/// use appunit_http::{Method, Request};
	///
	/// let request = Request::builder()
	///     .method(Method::POST)
	///     .uri("/users?page=2")
	///     .body("payload")
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.path(), "/users");
	/// assert_eq!(request.query_params.get("page"), Some(&"2".to_string()));
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	fn parse_query_params(uri: &Uri) -> HashMap<String, String> {
		uri.query()
			.map(|q| {
				q.split('&')
					.filter(|pair| !pair.is_empty())
					.filter_map(|pair| {
						// Split on first '=' only to preserve '=' in values
						let mut parts = pair.splitn(2, '=');
						Some((
							parts.next()?.to_string(),
							parts.next().unwrap_or("").to_string(),
						))
					})
					.collect()
			})
			.unwrap_or_default()
	}

	/// Get the request path.
	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Get a header value as a string, if present and valid UTF-8.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	/// Set a path parameter (used by the router for `{name}` segments).
	pub fn set_path_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.path_params.insert(key.into(), value.into());
	}

	/// Get a path parameter captured by the router.
	pub fn path_param(&self, key: &str) -> Option<&str> {
		self.path_params.get(key).map(String::as_str)
	}

	/// Deserialize the body as JSON.
	pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
		serde_json::from_slice(&self.body).map_err(|e| Error::Serialization(e.to_string()))
	}
}

/// Builder for [`Request`].
#[derive(Debug, Default)]
pub struct RequestBuilder {
	method: Method,
	uri: Option<String>,
	version: Version,
	headers: HeaderMap,
	body: Bytes,
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = version;
		self
	}

	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Add a single header. Invalid names or values are ignored.
	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			http::header::HeaderName::from_bytes(name.as_bytes()),
			http::header::HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Build the request.
	///
	/// # Errors
	///
	/// Returns [`Error::Http`] with `400 Bad Request` if the URI cannot be parsed.
	pub fn build(self) -> Result<Request> {
		let uri = match self.uri {
			Some(raw) => raw
				.parse::<Uri>()
				.map_err(|e| Error::bad_request(format!("Invalid URI: {e}")))?,
			None => Uri::from_static("/"),
		};
		Ok(Request::new(
			self.method,
			uri,
			self.version,
			self.headers,
			self.body,
		))
	}
}
