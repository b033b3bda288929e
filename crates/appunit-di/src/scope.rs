//! Dependency scopes
//!
//! A [`Scope`] decides whether resolving an interface invokes its provider or
//! returns a cached instance. Singleton instances live in the container's
//! [`SingletonScope`]; request instances live in the [`RequestScope`] of the
//! request installed in the ambient context.
//!
//! Neither cache holds its lock while a provider runs. Two concurrent first
//! resolutions of the same interface may both invoke the provider; the first
//! value inserted wins and every later lookup sees that value. Providers for
//! cached scopes should therefore be cheap and idempotent.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::container::{Container, ContainerId};
use crate::context;
use crate::cycle_detection::track_resolution;
use crate::error::DiResult;
use crate::provider::{Instance, InterfaceKey, Provider};

#[derive(Clone, Default)]
pub enum Scope {
	/// Invoke the provider on every resolution.
	#[default]
	Transient,
	/// One instance for the lifetime of the container.
	Singleton,
	/// One instance per installed request context.
	Request,
	Custom(Arc<dyn ScopeStrategy>),
}

impl fmt::Debug for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Scope::Transient => f.write_str("Transient"),
			Scope::Singleton => f.write_str("Singleton"),
			Scope::Request => f.write_str("Request"),
			Scope::Custom(strategy) => write!(f, "Custom({})", strategy.name()),
		}
	}
}

impl PartialEq for Scope {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Scope::Transient, Scope::Transient)
			| (Scope::Singleton, Scope::Singleton)
			| (Scope::Request, Scope::Request) => true,
			(Scope::Custom(a), Scope::Custom(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl Scope {
	pub(crate) async fn instance(
		&self,
		key: InterfaceKey,
		provider: &Arc<dyn Provider>,
		container: &Container,
	) -> DiResult<Instance> {
		let production = Production {
			key,
			provider,
			container,
		};
		match self {
			Scope::Transient => production.run().await,
			Scope::Singleton => {
				let singletons = container.singletons();
				if let Some(hit) = singletons.get(&key) {
					return Ok(hit);
				}
				let instance = production.run().await?;
				Ok(singletons.insert_if_absent(key, instance))
			}
			Scope::Request => {
				// Fails before the provider is ever invoked
				let cache = context::request_scope()?;
				if let Some(hit) = cache.get(container.id(), &key) {
					return Ok(hit);
				}
				let instance = production.run().await?;
				Ok(cache.insert_if_absent(container.id(), key, instance))
			}
			Scope::Custom(strategy) => strategy.get_or_provide(production).await,
		}
	}
}

/// A pending provider invocation handed to a [`ScopeStrategy`].
pub struct Production<'a> {
	key: InterfaceKey,
	provider: &'a Arc<dyn Provider>,
	container: &'a Container,
}

impl Production<'_> {
	pub fn key(&self) -> InterfaceKey {
		self.key
	}

	pub fn container(&self) -> &Container {
		self.container
	}

	/// Invoke the provider, with cycle detection.
	pub async fn run(&self) -> DiResult<Instance> {
		track_resolution(self.key, self.provider.provide(self.container)).await
	}
}

/// A user-defined caching policy, bound with [`Scope::Custom`].
#[async_trait]
pub trait ScopeStrategy: Send + Sync {
	async fn get_or_provide(&self, production: Production<'_>) -> DiResult<Instance>;

	fn name(&self) -> &'static str {
		"custom"
	}
}

type Cache<K> = Arc<RwLock<HashMap<K, Instance>>>;

/// Container-lifetime cache.
#[derive(Clone, Default)]
pub struct SingletonScope {
	cache: Cache<InterfaceKey>,
}

impl SingletonScope {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &InterfaceKey) -> Option<Instance> {
		let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
		cache.get(key).cloned()
	}

	/// Store `instance` unless a value is already cached, and return whichever
	/// value ends up cached.
	pub fn insert_if_absent(&self, key: InterfaceKey, instance: Instance) -> Instance {
		let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
		cache.entry(key).or_insert(instance).clone()
	}

	pub fn len(&self) -> usize {
		self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Per-request cache. Created empty when a request context is installed and
/// dropped with it.
///
/// Entries are keyed by the resolving container as well as the interface, so
/// two containers resolving inside one request never share instances.
#[derive(Clone, Default)]
pub struct RequestScope {
	cache: Cache<(ContainerId, InterfaceKey)>,
}

impl RequestScope {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, container: ContainerId, key: &InterfaceKey) -> Option<Instance> {
		let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
		cache.get(&(container, *key)).cloned()
	}

	pub fn insert_if_absent(
		&self,
		container: ContainerId,
		key: InterfaceKey,
		instance: Instance,
	) -> Instance {
		let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
		cache.entry((container, key)).or_insert(instance).clone()
	}

	pub fn len(&self) -> usize {
		self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Whether both handles refer to the same request's cache.
	pub fn same_cache(&self, other: &RequestScope) -> bool {
		Arc::ptr_eq(&self.cache, &other.cache)
	}
}
