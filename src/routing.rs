//! Minimal path router
//!
//! Routes are matched in registration order. A path pattern is a sequence of
//! `/`-separated segments where `{name}` captures one segment and a final
//! `{name:*}` captures the rest of the path.

use appunit_di::context;
use appunit_http::{Error, Handler, Method, Request, Response, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Param(String),
	Rest(String),
}

/// A compiled route path such as `/users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
	pattern: String,
	segments: Vec<Segment>,
}

impl PathPattern {
	pub fn new(pattern: impl Into<String>) -> Self {
		let pattern = pattern.into();
		let segments = pattern
			.split('/')
			.map(|segment| {
				match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
					Some(name) => match name.strip_suffix(":*") {
						Some(rest) => Segment::Rest(rest.to_string()),
						None => Segment::Param(name.to_string()),
					},
					None => Segment::Literal(segment.to_string()),
				}
			})
			.collect();
		Self { pattern, segments }
	}

	pub fn as_str(&self) -> &str {
		&self.pattern
	}

	/// Parameter names in the order they appear.
	pub fn param_names(&self) -> impl Iterator<Item = &str> {
		self.segments.iter().filter_map(|segment| match segment {
			Segment::Param(name) | Segment::Rest(name) => Some(name.as_str()),
			Segment::Literal(_) => None,
		})
	}

	/// Match `path`, returning the captured parameters.
	pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
		let mut params = HashMap::new();
		let mut parts = path.split('/');

		for (index, segment) in self.segments.iter().enumerate() {
			match segment {
				Segment::Rest(name) if index == self.segments.len() - 1 => {
					let rest = parts.collect::<Vec<_>>().join("/");
					params.insert(name.clone(), rest);
					return Some(params);
				}
				Segment::Rest(_) => return None,
				Segment::Literal(literal) => {
					if parts.next()? != literal {
						return None;
					}
				}
				Segment::Param(name) => {
					let value = parts.next().filter(|value| !value.is_empty())?;
					params.insert(name.clone(), value.to_string());
				}
			}
		}

		parts.next().is_none().then_some(params)
	}

	/// Build a path from this pattern. `None` if a parameter is missing.
	pub fn reverse(&self, params: &[(&str, &str)]) -> Option<String> {
		let lookup = |name: &str| {
			params
				.iter()
				.find(|(key, _)| *key == name)
				.map(|(_, value)| (*value).to_string())
		};
		let segments = self
			.segments
			.iter()
			.map(|segment| match segment {
				Segment::Literal(literal) => Some(literal.clone()),
				Segment::Param(name) | Segment::Rest(name) => lookup(name),
			})
			.collect::<Option<Vec<_>>>()?;
		Some(segments.join("/"))
	}
}

/// Per-route registration options.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
	pub(crate) methods: Option<Vec<Method>>,
	pub(crate) name: Option<String>,
}

impl RouteOptions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Accepted methods. Defaults to `GET`. `HEAD` is accepted wherever
	/// `GET` is.
	pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
		self.methods = Some(methods.into_iter().collect());
		self
	}

	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}
}

/// One registered route.
#[derive(Clone)]
pub struct Route {
	pattern: PathPattern,
	methods: Vec<Method>,
	name: Option<String>,
	endpoint: Arc<dyn Handler>,
}

impl Route {
	pub fn new(path: impl Into<String>, endpoint: Arc<dyn Handler>, options: RouteOptions) -> Self {
		let mut methods = options.methods.unwrap_or_else(|| vec![Method::GET]);
		if methods.contains(&Method::GET) && !methods.contains(&Method::HEAD) {
			methods.push(Method::HEAD);
		}
		Self {
			pattern: PathPattern::new(path),
			methods,
			name: options.name,
			endpoint,
		}
	}

	pub fn path(&self) -> &str {
		self.pattern.as_str()
	}

	pub fn methods(&self) -> &[Method] {
		&self.methods
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}
}

impl std::fmt::Debug for Route {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Route")
			.field("path", &self.pattern.as_str())
			.field("methods", &self.methods)
			.field("name", &self.name)
			.finish_non_exhaustive()
	}
}

/// Dispatches requests to the first route matching path and method.
///
/// - No route matches the path: [`Error::Http`] with `404`.
/// - Routes match the path but none accepts the method:
///   [`Error::MethodNotAllowed`] listing the accepted methods.
///
/// Matched path parameters are stored on the request handed to the endpoint
/// and on the request installed in the ambient context.
#[derive(Default)]
pub struct Router {
	routes: RwLock<Vec<Route>>,
}

impl Router {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&self, route: Route) {
		tracing::debug!(path = route.path(), methods = ?route.methods, "adding route");
		self.routes
			.write()
			.unwrap_or_else(PoisonError::into_inner)
			.push(route);
	}

	pub fn routes(&self) -> Vec<Route> {
		self.routes
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Path of the route registered under `name`, filled with `params`.
	pub fn url_path_for(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
		self.routes
			.read()
			.unwrap_or_else(PoisonError::into_inner)
			.iter()
			.filter(|route| route.name() == Some(name))
			.find_map(|route| route.pattern.reverse(params))
	}

	fn find(&self, method: &Method, path: &str) -> Result<(Arc<dyn Handler>, HashMap<String, String>)> {
		let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
		let mut allowed: Vec<Method> = Vec::new();

		for route in routes.iter() {
			let Some(params) = route.pattern.matches(path) else {
				continue;
			};
			if route.methods.contains(method) {
				return Ok((route.endpoint.clone(), params));
			}
			for candidate in &route.methods {
				if !allowed.contains(candidate) {
					allowed.push(candidate.clone());
				}
			}
		}

		if allowed.is_empty() {
			Err(Error::not_found("Not Found"))
		} else {
			Err(Error::method_not_allowed(allowed))
		}
	}
}

#[async_trait]
impl Handler for Router {
	async fn handle(&self, mut request: Request) -> Result<Response> {
		let (endpoint, params) = self.find(&request.method, request.path())?;

		if !params.is_empty() {
			for (key, value) in &params {
				request.set_path_param(key.clone(), value.clone());
			}
			// Outside a request context there is nothing to publish to
			let _ = context::update_request(|current| {
				for (key, value) in params {
					current.set_path_param(key, value);
				}
			});
		}

		endpoint.handle(request).await
	}
}

impl std::fmt::Debug for Router {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Router")
			.field("routes", &self.routes())
			.finish()
	}
}
