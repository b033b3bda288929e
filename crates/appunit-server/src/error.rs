use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("Failed to bind {addr}: {source}")]
	Bind {
		addr: SocketAddr,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to accept connection: {0}")]
	Accept(#[source] std::io::Error),

	#[error("Connection error: {0}")]
	Connection(#[source] hyper::Error),
}
