//! The dependency container

use appunit_http::Request;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::context;
use crate::error::{DiError, DiResult};
use crate::injectable::Injectable;
use crate::provider::{Instance, InterfaceKey, Provide, Provider};
use crate::scope::{Scope, SingletonScope};

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(u64);

#[derive(Clone)]
struct Binding {
	provider: Arc<dyn Provider>,
	scope: Scope,
}

struct ContainerInner {
	id: ContainerId,
	bindings: RwLock<HashMap<InterfaceKey, Binding>>,
	singletons: SingletonScope,
	auto_bind: bool,
}

/// Registry of bindings from interfaces to providers and scopes.
///
/// Cloning a container is cheap and yields a handle to the same registry and
/// singleton cache. Every container binds [`Request`] to the request currently
/// installed in the ambient [`context`], read afresh on every resolution.
#[derive(Clone)]
pub struct Container {
	inner: Arc<ContainerInner>,
}

impl Container {
	pub fn new() -> Self {
		Self::builder().build()
	}

	pub fn builder() -> ContainerBuilder {
		ContainerBuilder::default()
	}

	pub fn id(&self) -> ContainerId {
		self.inner.id
	}

	/// Whether [`Container::get`] synthesizes bindings for unbound types.
	pub fn auto_bind(&self) -> bool {
		self.inner.auto_bind
	}

	pub(crate) fn singletons(&self) -> &SingletonScope {
		&self.inner.singletons
	}

	/// Bind the interface `T`. A later binding for the same interface replaces
	/// this one.
	pub fn bind<T>(&self, provide: Provide<T>, scope: Scope) -> &Self
	where
		T: ?Sized + Send + Sync + 'static,
	{
		let key = InterfaceKey::of::<T>();
		tracing::debug!(interface = key.name(), ?scope, "binding interface");
		let binding = Binding {
			provider: provide.into_provider(),
			scope,
		};
		self.write_bindings().insert(key, binding);
		self
	}

	/// Bind the interface `T` in singleton scope.
	pub fn singleton<T>(&self, provide: Provide<T>) -> &Self
	where
		T: ?Sized + Send + Sync + 'static,
	{
		self.bind(provide, Scope::Singleton)
	}

	/// Bind the interface `T` to an existing instance.
	pub fn bind_instance<T>(&self, instance: Arc<T>) -> &Self
	where
		T: ?Sized + Send + Sync + 'static,
	{
		self.bind(Provide::instance(instance), Scope::Singleton)
	}

	/// Register a set of bindings at once. Modules may install other modules.
	pub fn install(&self, module: &dyn Module) -> DiResult<()> {
		tracing::debug!(container = self.inner.id.0, "installing module");
		module.configure(self)
	}

	pub fn is_bound<T: ?Sized + 'static>(&self) -> bool {
		self.read_bindings().contains_key(&InterfaceKey::of::<T>())
	}

	/// Resolve the interface `T` using its bound scope.
	///
	/// # Errors
	///
	/// [`DiError::UnboundInterface`] if nothing is bound for `T`;
	/// [`DiError::NoActiveRequest`] for request-scoped interfaces outside a
	/// request context; any error raised by the provider.
	pub async fn resolve<T>(&self) -> DiResult<Arc<T>>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		let key = InterfaceKey::of::<T>();
		let instance = self.resolve_key(key, None).await?;
		downcast(key, instance)
	}

	/// Resolve the interface `T`, overriding its bound scope.
	pub async fn resolve_with_scope<T>(&self, scope: Scope) -> DiResult<Arc<T>>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		let key = InterfaceKey::of::<T>();
		let instance = self.resolve_key(key, Some(scope)).await?;
		downcast(key, instance)
	}

	/// Resolve an [`Injectable`] type, auto-binding it first when the container
	/// allows it and no binding exists.
	///
	/// # Errors
	///
	/// [`DiError::UnboundInterface`] if `T` is unbound and auto-binding is off;
	/// [`DiError::UnresolvableDependency`] if `T` or anything it needs cannot
	/// be built from bound or auto-bindable providers.
	pub async fn get<T: Injectable>(&self) -> DiResult<Arc<T>> {
		let key = InterfaceKey::of::<T>();
		if !self.is_bound::<T>() {
			if !self.inner.auto_bind {
				return Err(DiError::UnboundInterface {
					interface: key.name(),
				});
			}
			let binding = Binding {
				provider: Provide::<T>::injectable().into_provider(),
				scope: T::scope(),
			};
			let mut bindings = self.write_bindings();
			if !bindings.contains_key(&key) {
				tracing::debug!(interface = key.name(), "auto-binding injectable");
				bindings.insert(key, binding);
			}
		}
		self.resolve::<T>().await
	}

	async fn resolve_key(&self, key: InterfaceKey, scope: Option<Scope>) -> DiResult<Instance> {
		let binding = self
			.read_bindings()
			.get(&key)
			.cloned()
			.ok_or(DiError::UnboundInterface {
				interface: key.name(),
			})?;
		let scope = scope.unwrap_or(binding.scope);
		tracing::trace!(interface = key.name(), ?scope, "resolving");
		scope.instance(key, &binding.provider, self).await
	}

	fn read_bindings(&self) -> std::sync::RwLockReadGuard<'_, HashMap<InterfaceKey, Binding>> {
		self.inner
			.bindings
			.read()
			.unwrap_or_else(PoisonError::into_inner)
	}

	fn write_bindings(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<InterfaceKey, Binding>> {
		self.inner
			.bindings
			.write()
			.unwrap_or_else(PoisonError::into_inner)
	}
}

impl Default for Container {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Container {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Container")
			.field("id", &self.inner.id)
			.field("bindings", &self.read_bindings().len())
			.field("auto_bind", &self.inner.auto_bind)
			.finish()
	}
}

fn downcast<T>(key: InterfaceKey, instance: Instance) -> DiResult<Arc<T>>
where
	T: ?Sized + Send + Sync + 'static,
{
	instance
		.downcast_ref::<Arc<T>>()
		.cloned()
		.ok_or(DiError::TypeMismatch {
			interface: key.name(),
		})
}

#[derive(Debug, Default)]
pub struct ContainerBuilder {
	auto_bind: bool,
}

impl ContainerBuilder {
	pub fn auto_bind(mut self, enabled: bool) -> Self {
		self.auto_bind = enabled;
		self
	}

	pub fn build(self) -> Container {
		let container = Container {
			inner: Arc::new(ContainerInner {
				id: ContainerId(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed)),
				bindings: RwLock::new(HashMap::new()),
				singletons: SingletonScope::new(),
				auto_bind: self.auto_bind,
			}),
		};
		container.bind::<Request>(
			Provide::factory(|_| context::current_request().map(Arc::new)),
			Scope::Transient,
		);
		container
	}
}

/// A bundle of bindings installed with [`Container::install`].
///
/// Any `Fn(&Container) -> DiResult<()>` closure is a module.
pub trait Module: Send + Sync {
	fn configure(&self, container: &Container) -> DiResult<()>;
}

impl<F> Module for F
where
	F: Fn(&Container) -> DiResult<()> + Send + Sync,
{
	fn configure(&self, container: &Container) -> DiResult<()> {
		self(container)
	}
}
