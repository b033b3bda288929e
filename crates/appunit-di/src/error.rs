//! Dependency resolution errors

pub type DiResult<T> = Result<T, DiError>;

#[derive(Debug, thiserror::Error)]
pub enum DiError {
	/// No provider is bound for the interface and auto-binding did not apply.
	#[error("No provider bound for interface `{interface}`")]
	UnboundInterface { interface: &'static str },

	/// An auto-bound interface could not be built from concrete providers.
	#[error("Cannot resolve `{interface}`: {source}")]
	UnresolvableDependency {
		interface: &'static str,
		#[source]
		source: Box<DiError>,
	},

	/// A request-scoped lookup happened outside any installed request context.
	#[error("Trying to get request out of context.")]
	NoActiveRequest,

	#[error(
		"Circular dependency detected: {interface}\n  Path: {path}\nThis forms a cycle that cannot be resolved."
	)]
	CircularDependency {
		interface: &'static str,
		/// Format: A -> B -> C -> A
		path: String,
	},

	#[error(
		"Maximum resolution depth exceeded: {0}\nThis likely indicates an extremely deep or circular dependency chain."
	)]
	ResolutionDepthExceeded(usize),

	/// `install` was called outside a task that established the context slot.
	#[error(
		"Request context used outside of a task-local scope. Use `context::scope` or `context::with_request` to initialize."
	)]
	ContextScopeMissing,

	/// `restore` was given a token that is not the innermost installed one.
	#[error("Context token does not match the innermost installed request context")]
	TokenMismatch,

	/// A cached or provided instance did not have the bound type.
	#[error("Provider for `{interface}` produced a value of the wrong type")]
	TypeMismatch { interface: &'static str },

	/// A user provider failed.
	#[error("Provider for `{interface}` failed: {source}")]
	Provider {
		interface: &'static str,
		#[source]
		source: Box<dyn std::error::Error + Send + Sync + 'static>,
	},
}

impl DiError {
	/// Wrap a provider failure for the interface `T`.
	pub fn provider<T: ?Sized + 'static, E>(error: E) -> Self
	where
		E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
	{
		DiError::Provider {
			interface: std::any::type_name::<T>(),
			source: error.into(),
		}
	}
}

impl From<DiError> for appunit_http::Error {
	fn from(error: DiError) -> Self {
		appunit_http::Error::custom(error)
	}
}
