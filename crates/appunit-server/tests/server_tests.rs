//! End-to-end requests over a real TCP socket

use appunit_http::{Error, Handler, Request, Response, StatusCode};
use appunit_server::{HttpServer, ServerError};
use async_trait::async_trait;
use rstest::rstest;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

struct Echo;

#[async_trait]
impl Handler for Echo {
	async fn handle(&self, request: Request) -> appunit_http::Result<Response> {
		if request.path() == "/fail" {
			return Err(Error::Internal("boom".into()));
		}
		Ok(Response::ok()
			.with_header("x-method", request.method.as_str())
			.with_body(format!("{} {}", request.path(), String::from_utf8_lossy(&request.body))))
	}
}

async fn start() -> (SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<Result<(), ServerError>>) {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let (stop, stopped) = oneshot::channel::<()>();
	let server = HttpServer::new(Arc::new(Echo));
	let task = tokio::spawn(server.serve(listener, async {
		let _ = stopped.await;
	}));
	(addr, stop, task)
}

async fn roundtrip(addr: SocketAddr, raw: &str) -> String {
	let mut stream = TcpStream::connect(addr).await.unwrap();
	stream.write_all(raw.as_bytes()).await.unwrap();
	let mut out = String::new();
	stream.read_to_string(&mut out).await.unwrap();
	out
}

#[rstest]
#[tokio::test]
async fn test_serves_request_with_body() {
	// Arrange
	let (addr, stop, task) = start().await;

	// Act
	let response = roundtrip(
		addr,
		"POST /items HTTP/1.1\r\nHost: test\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
	)
	.await;

	// Assert
	assert!(response.starts_with("HTTP/1.1 200 OK"));
	assert!(response.to_ascii_lowercase().contains("x-method: post"));
	assert!(response.ends_with("/items hello"));

	stop.send(()).unwrap();
	task.await.unwrap().unwrap();
}

#[rstest]
#[tokio::test]
async fn test_handler_error_becomes_500() {
	let (addr, stop, task) = start().await;

	let response = roundtrip(addr, "GET /fail HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n").await;

	assert!(response.starts_with(&format!("HTTP/1.1 {}", StatusCode::INTERNAL_SERVER_ERROR.as_u16())));

	stop.send(()).unwrap();
	task.await.unwrap().unwrap();
}

#[rstest]
#[tokio::test]
async fn test_bind_failure_reports_address() {
	let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = taken.local_addr().unwrap();

	let result = HttpServer::new(Arc::new(Echo))
		.listen_with_shutdown(addr, async {})
		.await;

	assert!(matches!(result, Err(ServerError::Bind { addr: reported, .. }) if reported == addr));
}
