//! Built-in pipeline layers
//!
//! - [`ServerErrorMiddleware`]: outermost layer, turns any unhandled error or
//!   panic into a response
//! - [`RequestScopeMiddleware`]: installs the request in the ambient context
//!   for the rest of the pipeline
//! - [`ExceptionMiddleware`]: innermost layer, renders errors that have a
//!   registered handler
//! - [`AccessLogMiddleware`]: optional user layer logging every request

pub mod access_log;
pub mod context;
pub mod exception;
pub mod server_error;

pub use access_log::AccessLogMiddleware;
pub use context::RequestScopeMiddleware;
pub use exception::{ExceptionKey, ExceptionMiddleware};
pub use server_error::ServerErrorMiddleware;
