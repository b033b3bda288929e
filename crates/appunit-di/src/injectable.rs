//! Injectable types and handler dependencies

use appunit_http::Request;
use async_trait::async_trait;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::scope::Scope;

/// A type that knows how to build itself from the container.
///
/// Containers created with auto-binding synthesize a binding for an
/// `Injectable` type the first time it is requested through
/// [`Container::get`] or [`Autowired`].
///
/// # Example
///
/// ```rust
/// use appunit_di::{Container, DiResult, Injectable, Scope};
/// use async_trait::async_trait;
///
/// struct Settings {
///     greeting: String,
/// }
///
/// #[async_trait]
/// impl Injectable for Settings {
///     async fn inject(_container: &Container) -> DiResult<Self> {
///         Ok(Settings { greeting: "hi".to_string() })
///     }
///
///     fn scope() -> Scope {
///         Scope::Singleton
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let container = Container::builder().auto_bind(true).build();
/// let first = container.get::<Settings>().await.unwrap();
/// let second = container.get::<Settings>().await.unwrap();
/// assert_eq!(first.greeting, "hi");
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// # });
/// ```
#[async_trait]
pub trait Injectable: Sized + Send + Sync + 'static {
	async fn inject(container: &Container) -> DiResult<Self>;

	/// Scope used when this type is auto-bound.
	fn scope() -> Scope {
		Scope::Transient
	}
}

/// A value a handler can declare as a parameter.
///
/// Each dependency parameter is resolved from the container right before the
/// handler runs.
#[async_trait]
pub trait Dependency: Sized + Send + 'static {
	async fn resolve(container: &Container) -> DiResult<Self>;
}

/// A bound interface, resolved with [`Container::resolve`].
pub struct Injected<T: ?Sized>(pub Arc<T>);

impl<T: ?Sized> Injected<T> {
	pub fn into_inner(self) -> Arc<T> {
		self.0
	}
}

impl<T: ?Sized> Deref for Injected<T> {
	type Target = T;

	fn deref(&self) -> &T {
		&self.0
	}
}

impl<T: ?Sized> Clone for Injected<T> {
	fn clone(&self) -> Self {
		Injected(self.0.clone())
	}
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Injected<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Injected").field(&&*self.0).finish()
	}
}

#[async_trait]
impl<T> Dependency for Injected<T>
where
	T: ?Sized + Send + Sync + 'static,
{
	async fn resolve(container: &Container) -> DiResult<Self> {
		container.resolve::<T>().await.map(Injected)
	}
}

/// An [`Injectable`] type, resolved with [`Container::get`] so it may be
/// auto-bound.
pub struct Autowired<T>(pub Arc<T>);

impl<T> Autowired<T> {
	pub fn into_inner(self) -> Arc<T> {
		self.0
	}
}

impl<T> Deref for Autowired<T> {
	type Target = T;

	fn deref(&self) -> &T {
		&self.0
	}
}

impl<T> Clone for Autowired<T> {
	fn clone(&self) -> Self {
		Autowired(self.0.clone())
	}
}

impl<T: fmt::Debug> fmt::Debug for Autowired<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Autowired").field(&*self.0).finish()
	}
}

#[async_trait]
impl<T: Injectable> Dependency for Autowired<T> {
	async fn resolve(container: &Container) -> DiResult<Self> {
		container.get::<T>().await.map(Autowired)
	}
}

#[async_trait]
impl Dependency for Container {
	async fn resolve(container: &Container) -> DiResult<Self> {
		Ok(container.clone())
	}
}

/// The current request, through the request-scoped binding.
#[async_trait]
impl Dependency for Request {
	async fn resolve(container: &Container) -> DiResult<Self> {
		container
			.resolve::<Request>()
			.await
			.map(Arc::unwrap_or_clone)
	}
}

/// Optional dependency: `None` when the interface is unbound.
#[async_trait]
impl<D: Dependency> Dependency for Option<D> {
	async fn resolve(container: &Container) -> DiResult<Self> {
		match D::resolve(container).await {
			Ok(value) => Ok(Some(value)),
			Err(DiError::UnboundInterface { .. }) => Ok(None),
			Err(other) => Err(other),
		}
	}
}
