//! # AppUnit Dependency Injection
//!
//! A dependency container whose instances live for the whole process or for a
//! single in-flight request.
//!
//! ## Scopes
//!
//! - **Transient**: the provider runs on every resolution (the default)
//! - **Singleton**: one instance per container
//! - **Request**: one instance per request installed in the ambient
//!   [`context`]; the cache is dropped with the request
//! - **Custom**: any [`ScopeStrategy`]
//!
//! ## Binding and resolving
//!
//! ```rust
//! use appunit_di::{Container, Provide, Scope};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserRepository {
//!     db: Arc<Database>,
//! }
//!
//! # tokio_test::block_on(async {
//! let container = Container::new();
//! container.singleton::<Database>(Provide::factory(|_| {
//!     Ok(Arc::new(Database { url: "postgres://localhost".into() }))
//! }));
//! container.bind::<UserRepository>(
//!     Provide::async_factory(|c: Container| async move {
//!         let db = c.resolve::<Database>().await?;
//!         Ok(Arc::new(UserRepository { db }))
//!     }),
//!     Scope::Transient,
//! );
//!
//! let repo = container.resolve::<UserRepository>().await.unwrap();
//! assert_eq!(repo.db.url, "postgres://localhost");
//! # });
//! ```
//!
//! ## Request scope
//!
//! Request-scoped resolution reads the request cache from the ambient
//! context, so it only works below [`context::with_request`] (installed by
//! the pipeline for every request). Outside it, resolution fails with
//! [`DiError::NoActiveRequest`] without running the provider.
//!
//! ## Circular Dependency Detection
//!
//! Provider invocations are tracked on a task-local path. Re-entering an
//! interface that is still being built fails with
//! [`DiError::CircularDependency`]; chains deeper than
//! [`cycle_detection::MAX_RESOLUTION_DEPTH`] fail with
//! [`DiError::ResolutionDepthExceeded`].

pub mod container;
pub mod context;
pub mod cycle_detection;
pub mod error;
pub mod injectable;
pub mod provider;
pub mod scope;

pub use container::{Container, ContainerBuilder, ContainerId, Module};
pub use context::{ContextGuard, ContextToken};
pub use error::{DiError, DiResult};
pub use injectable::{Autowired, Dependency, Injectable, Injected};
pub use provider::{Instance, InterfaceKey, Provide, Provider};
pub use scope::{Production, RequestScope, Scope, ScopeStrategy, SingletonScope};
