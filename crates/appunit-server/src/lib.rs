//! # AppUnit Server
//!
//! A small hyper HTTP/1 server. Every connection runs on its own tokio task
//! and every request is handed to one [`appunit_http::Handler`], usually an
//! application's composed pipeline.

pub mod error;
pub mod http;

pub use error::ServerError;
pub use http::{HttpServer, shutdown_signal};
