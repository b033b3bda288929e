//! # AppUnit
//!
//! Request-scoped dependency injection for async HTTP pipelines.
//!
//! An [`AppUnit`] couples a dependency [`Container`](appunit_di::Container)
//! with a request pipeline. Route handlers, middleware functions, exception
//! handlers, lifecycle hooks and commands are plain functions whose
//! parameters are resolved from the container on every call.
//!
//! ## Scopes
//!
//! - **Singleton**: one instance for the life of the application
//! - **Request**: one instance per in-flight request, dropped with it
//! - **Transient**: a fresh instance on every resolution
//!
//! The pipeline installs each request in an ambient, task-local context
//! ([`appunit_di::context`]), so request-scoped dependencies and the current
//! [`Request`](appunit_http::Request) can be resolved anywhere below it
//! without being passed around.
//!
//! ## Quick Example
//!
//! ```rust
//! use appunit::{AppUnit, Payload};
//! use appunit_di::{Injected, Provide, Scope};
//! use appunit_http::{Handler, Request};
//! use serde::Serialize;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! static NEXT_ID: AtomicU64 = AtomicU64::new(1);
//!
//! struct RequestId(u64);
//!
//! #[derive(Serialize)]
//! struct Echo {
//!     id: u64,
//!     path: String,
//! }
//!
//! # tokio_test::block_on(async {
//! let app = AppUnit::new();
//! app.bind::<RequestId>(
//!     Provide::factory(|_| Ok(Arc::new(RequestId(NEXT_ID.fetch_add(1, Ordering::SeqCst))))),
//!     Scope::Request,
//! );
//! app.get("/echo", |id: Injected<RequestId>, request: Request| async move {
//!     Payload(Echo {
//!         id: id.0.0,
//!         path: request.path().to_string(),
//!     })
//! });
//!
//! let response = app
//!     .handle(Request::builder().uri("/echo").build().unwrap())
//!     .await
//!     .unwrap();
//! assert_eq!(response.body_text(), r#"{"id":1,"path":"/echo"}"#);
//! # });
//! ```
//!
//! ## Feature Flags
//!
//! - `server` (default): [`AppUnit::run`] serves the application with
//!   `appunit-server`. Without it `run` fails with
//!   [`AppError::OptionalDependencyMissing`].

pub mod adapter;
pub mod application;
pub mod error;
pub mod handler;
pub mod lifecycle;
pub mod module;
pub mod pipeline;
pub mod routing;

pub use adapter::{LifecycleHook, ResponseClass, json_response_class};
pub use application::{AppUnit, AppUnitBuilder, CommandOptions, RouteGroup};
pub use error::{AppError, AppResult};
pub use handler::{
	AsyncCall, BlockingCall, BlockingFn, InjectFn, IntoCompletion, IntoOutcome, Outcome, Payload,
	blocking,
};
pub use lifecycle::Lifecycle;
pub use module::{AppRef, Module};
pub use pipeline::{ExceptionHandlers, LayerId, MiddlewareLayer, build_middleware_stack};
pub use routing::{PathPattern, Route, RouteOptions, Router};

// Member crates, for users who depend on `appunit` alone.
pub use appunit_commands as commands;
pub use appunit_conf as conf;
pub use appunit_di as di;
pub use appunit_http as http;
pub use appunit_middleware as middleware;
#[cfg(feature = "server")]
pub use appunit_server as server;

pub mod prelude {
	pub use crate::{
		AppError, AppRef, AppResult, AppUnit, CommandOptions, Module, Payload, RouteOptions,
		blocking,
	};
	pub use appunit_di::{
		Autowired, Container, DiError, Injectable, Injected, Provide, Scope, context,
	};
	pub use appunit_http::{Error, Method, Next, Request, Response, StatusCode};
	pub use appunit_middleware::ExceptionKey;

	// External
	pub use async_trait::async_trait;
	pub use serde::{Deserialize, Serialize};
}
