use appunit_http::{Handler, Request, Response};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

use crate::error::ServerError;

/// HTTP/1 server driving a [`Handler`]
pub struct HttpServer {
	handler: Arc<dyn Handler>,
}

impl HttpServer {
	/// Create a new server with the given handler
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use appunit_server::HttpServer;
	/// use appunit_http::{Handler, Request, Response};
	///
	/// struct Hello;
	///
	/// #[async_trait::async_trait]
	/// impl Handler for Hello {
	///     async fn handle(&self, _req: Request) -> appunit_http::Result<Response> {
	///         Ok(Response::ok().with_body("Hello"))
	///     }
	/// }
	///
	/// let server = HttpServer::new(Arc::new(Hello));
	/// ```
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self { handler }
	}

	/// Bind `addr` and serve until an accept error occurs.
	pub async fn listen(self, addr: SocketAddr) -> Result<(), ServerError> {
		self.listen_with_shutdown(addr, std::future::pending()).await
	}

	/// Bind `addr` and serve until `signal` completes.
	pub async fn listen_with_shutdown(
		self,
		addr: SocketAddr,
		signal: impl Future<Output = ()>,
	) -> Result<(), ServerError> {
		let listener = TcpListener::bind(addr)
			.await
			.map_err(|source| ServerError::Bind { addr, source })?;
		self.serve(listener, signal).await
	}

	/// Serve connections from an already bound listener until `signal`
	/// completes. Connections in flight when it fires are left to finish on
	/// their own tasks.
	pub async fn serve(
		self,
		listener: TcpListener,
		signal: impl Future<Output = ()>,
	) -> Result<(), ServerError> {
		let local = listener.local_addr().map_err(ServerError::Accept)?;
		tracing::info!(addr = %local, "server listening on http://{local}");

		tokio::pin!(signal);
		loop {
			tokio::select! {
				result = listener.accept() => {
					let (stream, remote_addr) = result.map_err(ServerError::Accept)?;
					let handler = self.handler.clone();
					tokio::task::spawn(async move {
						if let Err(error) = Self::handle_connection(stream, remote_addr, handler).await {
							tracing::warn!(%remote_addr, %error, "error handling connection");
						}
					});
				}
				_ = &mut signal => {
					tracing::info!("shutdown signal received, stopping server");
					break;
				}
			}
		}
		Ok(())
	}

	/// Serve every HTTP request arriving on one TCP connection.
	pub async fn handle_connection(
		stream: TcpStream,
		remote_addr: SocketAddr,
		handler: Arc<dyn Handler>,
	) -> Result<(), ServerError> {
		let io = TokioIo::new(stream);
		let service = RequestService {
			handler,
			remote_addr,
		};

		http1::Builder::new()
			.serve_connection(io, service)
			.await
			.map_err(ServerError::Connection)
	}
}

/// Completes on Ctrl-C.
pub async fn shutdown_signal() {
	if let Err(error) = tokio::signal::ctrl_c().await {
		tracing::error!(%error, "failed to listen for Ctrl-C");
		std::future::pending::<()>().await;
	}
}

struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = Box<dyn std::error::Error + Send + Sync>;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let remote_addr = self.remote_addr;

		Box::pin(async move {
			let (parts, body) = req.into_parts();
			let body = body.collect().await?.to_bytes();
			let request = Request::new(parts.method, parts.uri, parts.version, parts.headers, body);

			let response = handler.handle(request).await.unwrap_or_else(|error| {
				tracing::error!(%remote_addr, %error, "handler returned an error");
				Response::internal_server_error()
			});

			into_hyper_response(response)
		})
	}
}

fn into_hyper_response(
	response: Response,
) -> Result<hyper::Response<Full<Bytes>>, Box<dyn std::error::Error + Send + Sync>> {
	let mut builder = hyper::Response::builder().status(response.status);
	if let Some(headers) = builder.headers_mut() {
		headers.extend(response.headers);
	}
	Ok(builder.body(Full::new(response.body))?)
}
