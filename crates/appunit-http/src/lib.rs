//! HTTP primitives shared by every AppUnit crate.
//!
//! This crate deliberately stays small: it defines the opaque [`Request`] and
//! [`Response`] objects the pipeline passes around, the [`Error`] type handler
//! bodies raise, and the [`Handler`] / [`Middleware`] / [`ExceptionHandler`]
//! traits the pipeline is composed from.
//!
//! ## Handler
//!
//! ```rust
//! use appunit_http::{Handler, Request, Response, Result};
//! use async_trait::async_trait;
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Handler for Hello {
//!     async fn handle(&self, _request: Request) -> Result<Response> {
//!         Ok(Response::ok().with_body("Hello!"))
//!     }
//! }
//! ```

pub mod error;
pub mod middleware;
pub mod request;
pub mod response;

pub use error::{Error, Result};
pub use middleware::{ExceptionHandler, Handler, Middleware, MiddlewareChain, Next};
pub use request::{Request, RequestBuilder};
pub use response::Response;

// Re-exported so downstream crates name one `http` version.
pub use http::{HeaderMap, Method, StatusCode, Uri, Version, header};
