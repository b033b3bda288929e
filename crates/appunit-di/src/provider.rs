//! Providers and the interface keys they are bound under

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::any::{Any, TypeId};
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::injectable::Injectable;

/// A type-erased resolved value. Always holds an `Arc<T>` for the bound `T`,
/// which lets unsized interfaces such as `dyn Trait` be bound.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Stable identity of a bound interface.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceKey {
	type_id: TypeId,
	name: &'static str,
}

impl InterfaceKey {
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self {
			type_id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}

	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl PartialEq for InterfaceKey {
	fn eq(&self, other: &Self) -> bool {
		self.type_id == other.type_id
	}
}

impl Eq for InterfaceKey {}

impl Hash for InterfaceKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.type_id.hash(state);
	}
}

/// Produces one instance of a bound interface.
///
/// Providers receive the container so they can resolve their own
/// sub-dependencies. Caching is the scope's job, not the provider's.
#[async_trait]
pub trait Provider: Send + Sync {
	async fn provide(&self, container: &Container) -> DiResult<Instance>;
}

/// A typed provider ready to be bound to the interface `T`.
///
/// # Examples
///
/// ```
/// use appunit_di::{Container, Provide, Scope};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let container = Container::new();
/// container.bind::<dyn Greeter>(
///     Provide::instance(Arc::new(English) as Arc<dyn Greeter>),
///     Scope::Singleton,
/// );
///
/// let greeter = container.resolve::<dyn Greeter>().await.unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// # });
/// ```
pub struct Provide<T: ?Sized> {
	provider: Arc<dyn Provider>,
	_marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Provide<T> {
	/// Always hand out the given instance.
	pub fn instance(value: Arc<T>) -> Self {
		Self::from_provider(InstanceProvider {
			instance: Arc::new(value),
		})
	}

	/// Build the instance synchronously.
	pub fn factory<F>(factory: F) -> Self
	where
		F: Fn(&Container) -> DiResult<Arc<T>> + Send + Sync + 'static,
	{
		Self::from_provider(FactoryProvider {
			factory: Box::new(move |container| {
				factory(container).map(|value| Arc::new(value) as Instance)
			}),
		})
	}

	/// Build the instance asynchronously.
	pub fn async_factory<F, Fut>(factory: F) -> Self
	where
		F: Fn(Container) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = DiResult<Arc<T>>> + Send + 'static,
	{
		Self::from_provider(AsyncFactoryProvider {
			factory: Box::new(move |container| -> BoxFuture<'static, DiResult<Instance>> {
				let fut = factory(container);
				Box::pin(async move { fut.await.map(|value| Arc::new(value) as Instance) })
			}),
		})
	}

	/// Use a hand-written provider. It must produce an `Arc<T>` wrapped in
	/// [`Instance`], otherwise resolution fails with [`DiError::TypeMismatch`].
	pub fn from_provider(provider: impl Provider + 'static) -> Self {
		Self {
			provider: Arc::new(provider),
			_marker: PhantomData,
		}
	}

	pub(crate) fn into_provider(self) -> Arc<dyn Provider> {
		self.provider
	}
}

impl<T: Injectable> Provide<T> {
	/// Build the instance through [`Injectable::inject`].
	pub fn injectable() -> Self {
		Self::from_provider(InjectableProvider::<T>(PhantomData))
	}
}

struct InstanceProvider {
	instance: Instance,
}

#[async_trait]
impl Provider for InstanceProvider {
	async fn provide(&self, _container: &Container) -> DiResult<Instance> {
		Ok(self.instance.clone())
	}
}

type SyncFactory = Box<dyn Fn(&Container) -> DiResult<Instance> + Send + Sync>;

struct FactoryProvider {
	factory: SyncFactory,
}

#[async_trait]
impl Provider for FactoryProvider {
	async fn provide(&self, container: &Container) -> DiResult<Instance> {
		(self.factory)(container)
	}
}

type AsyncFactory = Box<dyn Fn(Container) -> BoxFuture<'static, DiResult<Instance>> + Send + Sync>;

struct AsyncFactoryProvider {
	factory: AsyncFactory,
}

#[async_trait]
impl Provider for AsyncFactoryProvider {
	async fn provide(&self, container: &Container) -> DiResult<Instance> {
		(self.factory)(container.clone()).await
	}
}

/// Provider synthesized for auto-bound [`Injectable`] types.
pub(crate) struct InjectableProvider<T>(PhantomData<fn() -> T>);

#[async_trait]
impl<T: Injectable> Provider for InjectableProvider<T> {
	async fn provide(&self, container: &Container) -> DiResult<Instance> {
		match T::inject(container).await {
			Ok(value) => Ok(Arc::new(Arc::new(value)) as Instance),
			// No concrete provider chain exists below this type
			Err(
				source @ (DiError::UnboundInterface { .. }
				| DiError::UnresolvableDependency { .. }
				| DiError::CircularDependency { .. }
				| DiError::ResolutionDepthExceeded(_)),
			) => Err(DiError::UnresolvableDependency {
				interface: std::any::type_name::<T>(),
				source: Box::new(source),
			}),
			Err(other) => Err(other),
		}
	}
}
