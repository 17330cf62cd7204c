use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use issuetracker_http::{Error, Handler, Middleware, MiddlewareChain, Request, Response};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

use crate::shutdown::ShutdownCoordinator;

/// Error type returned by the server entry points
pub type ServerError = Box<dyn std::error::Error + Send + Sync>;

/// Largest request body read into memory unless configured otherwise
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// HTTP/1.1 server with middleware support
pub struct HttpServer {
	pub handler: Arc<dyn Handler>,
	pub(crate) middlewares: Vec<Arc<dyn Middleware>>,
	max_body_size: usize,
}

impl HttpServer {
	/// Create a new server with the given handler
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use issuetracker_server::HttpServer;
	/// use issuetracker_http::{Handler, Request, Response, Result};
	///
	/// struct MyHandler;
	///
	/// #[async_trait::async_trait]
	/// impl Handler for MyHandler {
	///     async fn handle(&self, _req: Request) -> Result<Response> {
	///         Ok(Response::ok().with_body("Hello"))
	///     }
	/// }
	///
	/// let server = HttpServer::new(Arc::new(MyHandler));
	/// ```
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			handler,
			middlewares: Vec::new(),
			max_body_size: DEFAULT_MAX_BODY_SIZE,
		}
	}

	/// Reject request bodies larger than `bytes` with `413`
	pub fn with_max_body_size(mut self, bytes: usize) -> Self {
		self.max_body_size = bytes;
		self
	}

	/// Add a middleware; middlewares run in the order they are added
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	fn build_handler(&self) -> Arc<dyn Handler> {
		if self.middlewares.is_empty() {
			return self.handler.clone();
		}

		let mut chain = MiddlewareChain::new(self.handler.clone());
		for middleware in &self.middlewares {
			chain.add_middleware(middleware.clone());
		}

		Arc::new(chain)
	}

	/// Bind `addr` and serve until an accept error occurs
	pub async fn listen(self, addr: SocketAddr) -> Result<(), ServerError> {
		let listener = TcpListener::bind(addr).await?;
		tracing::info!(%addr, "server listening on http://{}", addr);

		let handler = self.build_handler();
		let max_body_size = self.max_body_size;

		loop {
			let (stream, socket_addr) = listener.accept().await?;
			let handler = handler.clone();

			tokio::task::spawn(async move {
				if let Err(err) =
					Self::handle_connection(stream, socket_addr, handler, max_body_size).await
				{
					tracing::warn!(peer = %socket_addr, error = %err, "error handling connection");
				}
			});
		}
	}

	/// Bind `addr` and serve until the coordinator requests shutdown
	///
	/// # Examples
	///
	/// ```no_run
	/// use std::sync::Arc;
	/// use std::time::Duration;
	/// use issuetracker_server::{HttpServer, ShutdownCoordinator};
	/// use issuetracker_http::{Handler, Request, Response, Result};
	///
	/// struct MyHandler;
	///
	/// #[async_trait::async_trait]
	/// impl Handler for MyHandler {
	///     async fn handle(&self, _req: Request) -> Result<Response> {
	///         Ok(Response::ok())
	///     }
	/// }
	///
	/// # async fn example() -> std::result::Result<(), issuetracker_server::ServerError> {
	/// let server = HttpServer::new(Arc::new(MyHandler));
	/// let coordinator = ShutdownCoordinator::new(Duration::from_secs(30));
	/// server
	///     .listen_with_shutdown("127.0.0.1:8000".parse()?, coordinator)
	///     .await?;
	/// # Ok(())
	/// # }
	/// ```
	pub async fn listen_with_shutdown(
		self,
		addr: SocketAddr,
		coordinator: ShutdownCoordinator,
	) -> Result<(), ServerError> {
		let listener = TcpListener::bind(addr).await?;
		self.serve_with_listener(listener, coordinator).await
	}

	/// Serve connections from an already bound listener until shutdown
	///
	/// On shutdown the server stops accepting, asks open connections to
	/// finish their current request, and waits up to the coordinator's
	/// timeout before aborting whatever is left.
	pub async fn serve_with_listener(
		self,
		listener: TcpListener,
		coordinator: ShutdownCoordinator,
	) -> Result<(), ServerError> {
		let local_addr = listener.local_addr()?;
		tracing::info!(addr = %local_addr, "server listening on http://{}", local_addr);

		let handler = self.build_handler();
		let max_body_size = self.max_body_size;
		let mut shutdown = coordinator.subscribe();
		let mut connections = JoinSet::new();

		loop {
			tokio::select! {
				result = listener.accept() => {
					let (stream, socket_addr) = match result {
						Ok(accepted) => accepted,
						Err(err) => {
							tracing::warn!(error = %err, "failed to accept connection");
							continue;
						}
					};
					let service = RequestService {
						handler: handler.clone(),
						remote_addr: socket_addr,
						max_body_size,
					};
					let conn_shutdown = coordinator.subscribe();

					connections.spawn(async move {
						if let Err(err) = Self::handle_connection_graceful(stream, service, conn_shutdown).await {
							tracing::warn!(peer = %socket_addr, error = %err, "error handling connection");
						}
					});
				}
				Some(_) = connections.join_next(), if !connections.is_empty() => {}
				_ = shutdown.recv() => {
					tracing::info!("shutdown signal received, stopping server");
					break;
				}
			}
		}

		drop(listener);

		let drained = tokio::time::timeout(coordinator.timeout(), async {
			while connections.join_next().await.is_some() {}
		})
		.await;
		if drained.is_err() {
			tracing::warn!(
				remaining = connections.len(),
				"aborting connections still open after grace period"
			);
			connections.abort_all();
		}

		coordinator.notify_shutdown_complete();
		tracing::info!("server stopped");

		Ok(())
	}

	/// Serve HTTP/1.1 requests on a single TCP connection
	pub async fn handle_connection(
		stream: TcpStream,
		socket_addr: SocketAddr,
		handler: Arc<dyn Handler>,
		max_body_size: usize,
	) -> Result<(), ServerError> {
		let io = TokioIo::new(stream);
		let service = RequestService {
			handler,
			remote_addr: socket_addr,
			max_body_size,
		};

		http1::Builder::new().serve_connection(io, service).await?;

		Ok(())
	}

	async fn handle_connection_graceful(
		stream: TcpStream,
		service: RequestService,
		mut shutdown: crate::ShutdownSignal,
	) -> Result<(), ServerError> {
		let io = TokioIo::new(stream);

		let conn = http1::Builder::new().serve_connection(io, service);
		tokio::pin!(conn);

		tokio::select! {
			result = conn.as_mut() => result?,
			_ = shutdown.recv() => {
				conn.as_mut().graceful_shutdown();
				conn.await?;
			}
		}

		Ok(())
	}
}

/// Service implementation for hyper
struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
	max_body_size: usize,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = ServerError;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let remote_addr = self.remote_addr;
		let max_body_size = self.max_body_size;

		Box::pin(async move {
			let (parts, body) = req.into_parts();
			let body_bytes = match Limited::new(body, max_body_size).collect().await {
				Ok(collected) => collected.to_bytes(),
				Err(err) if err.is::<LengthLimitError>() => {
					tracing::warn!(
						peer = %remote_addr,
						limit = max_body_size,
						"request body too large"
					);
					return into_hyper_response(Error::PayloadTooLarge(max_body_size).into());
				}
				Err(err) => return Err(err),
			};

			let mut request = Request::new(
				parts.method,
				parts.uri,
				parts.version,
				parts.headers,
				body_bytes,
			);
			request.remote_addr = Some(remote_addr);

			let response = handler.handle(request).await.unwrap_or_else(|err| {
				if err.status_code() >= 500 {
					tracing::error!(error = %err, "unhandled error escaped handler");
				}
				Response::from(err)
			});

			into_hyper_response(response)
		})
	}
}

fn into_hyper_response(response: Response) -> Result<hyper::Response<Full<Bytes>>, ServerError> {
	let mut hyper_response = hyper::Response::builder().status(response.status);

	for (key, value) in response.headers.iter() {
		hyper_response = hyper_response.header(key, value);
	}

	Ok(hyper_response.body(Full::new(response.body))?)
}

/// Create a server for `handler` and serve on `addr`
pub async fn serve(addr: SocketAddr, handler: Arc<dyn Handler>) -> Result<(), ServerError> {
	HttpServer::new(handler).listen(addr).await
}

/// Create a server for `handler` and serve on `addr` until shutdown
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use issuetracker_server::{serve_with_shutdown, shutdown_signal, ShutdownCoordinator};
/// use issuetracker_http::{Handler, Request, Response, Result};
///
/// struct MyHandler;
///
/// #[async_trait::async_trait]
/// impl Handler for MyHandler {
///     async fn handle(&self, _req: Request) -> Result<Response> {
///         Ok(Response::ok().with_body("Hello, World!"))
///     }
/// }
///
/// # async fn example() -> std::result::Result<(), issuetracker_server::ServerError> {
/// let coordinator = ShutdownCoordinator::new(Duration::from_secs(30));
/// let trigger = coordinator.clone();
/// tokio::spawn(async move {
///     shutdown_signal().await;
///     trigger.shutdown();
/// });
///
/// serve_with_shutdown("127.0.0.1:3000".parse()?, Arc::new(MyHandler), coordinator).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve_with_shutdown(
	addr: SocketAddr,
	handler: Arc<dyn Handler>,
	coordinator: ShutdownCoordinator,
) -> Result<(), ServerError> {
	HttpServer::new(handler)
		.listen_with_shutdown(addr, coordinator)
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use issuetracker_http::{Error, Result as HttpResult};
	use rstest::rstest;
	use std::time::Duration;
	use tokio::io::{AsyncReadExt, AsyncWriteExt};

	struct TestHandler;

	#[async_trait::async_trait]
	impl Handler for TestHandler {
		async fn handle(&self, request: Request) -> HttpResult<Response> {
			match request.path() {
				"/boom" => Err(Error::Internal("store offline".to_string())),
				_ => Ok(Response::ok().with_body("Hello, World!")),
			}
		}
	}

	struct PrefixMiddleware {
		prefix: &'static str,
	}

	#[async_trait::async_trait]
	impl Middleware for PrefixMiddleware {
		async fn process(&self, request: Request, next: Arc<dyn Handler>) -> HttpResult<Response> {
			let response = next.handle(request).await?;
			let current_body = String::from_utf8(response.body.to_vec()).unwrap_or_default();
			Ok(Response::ok().with_body(format!("{}{}", self.prefix, current_body)))
		}
	}

	async fn raw_request(addr: SocketAddr, path: &str) -> String {
		let mut stream = TcpStream::connect(addr).await.unwrap();
		let request = format!(
			"GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
			path, addr
		);
		stream.write_all(request.as_bytes()).await.unwrap();
		let mut buf = Vec::new();
		stream.read_to_end(&mut buf).await.unwrap();
		String::from_utf8(buf).unwrap()
	}

	async fn spawn_server(
		server: HttpServer,
	) -> (SocketAddr, ShutdownCoordinator, tokio::task::JoinHandle<()>) {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let coordinator = ShutdownCoordinator::new(Duration::from_secs(2));
		let server_coordinator = coordinator.clone();
		let task = tokio::spawn(async move {
			server
				.serve_with_listener(listener, server_coordinator)
				.await
				.unwrap();
		});
		(addr, coordinator, task)
	}

	#[rstest]
	#[tokio::test]
	async fn test_middleware_chain_execution() {
		// Arrange
		let server = HttpServer::new(Arc::new(TestHandler))
			.with_middleware(Arc::new(PrefixMiddleware { prefix: "First:" }))
			.with_middleware(Arc::new(PrefixMiddleware { prefix: "Second:" }));
		let handler = server.build_handler();
		let request = Request::builder().uri("/").build().unwrap();

		// Act
		let response = handler.handle(request).await.unwrap();

		// Assert
		assert_eq!(server.middlewares.len(), 2);
		assert_eq!(response.body, "First:Second:Hello, World!");
	}

	#[rstest]
	#[tokio::test]
	async fn test_serves_requests_over_tcp() {
		// Arrange
		let (addr, coordinator, task) = spawn_server(HttpServer::new(Arc::new(TestHandler))).await;

		// Act
		let raw = raw_request(addr, "/").await;

		// Assert
		assert!(raw.starts_with("HTTP/1.1 200 OK"));
		assert!(raw.ends_with("Hello, World!"));

		coordinator.shutdown();
		task.await.unwrap();
	}

	#[rstest]
	#[tokio::test]
	async fn test_escaped_error_becomes_json_500() {
		// Arrange
		let (addr, coordinator, task) = spawn_server(HttpServer::new(Arc::new(TestHandler))).await;

		// Act
		let raw = raw_request(addr, "/boom").await;

		// Assert
		assert!(raw.starts_with("HTTP/1.1 500 Internal Server Error"));
		assert!(raw.contains("content-type: application/json"));
		let body = raw.split("\r\n\r\n").nth(1).unwrap();
		let json: serde_json::Value = serde_json::from_str(body).unwrap();
		assert_eq!(json["error"], "Internal server error: store offline");

		coordinator.shutdown();
		task.await.unwrap();
	}

	#[rstest]
	#[tokio::test]
	async fn test_oversized_body_is_rejected_with_413() {
		// Arrange
		let server = HttpServer::new(Arc::new(TestHandler)).with_max_body_size(16);
		let (addr, coordinator, task) = spawn_server(server).await;
		let body = "x".repeat(64);

		// Act
		let mut stream = TcpStream::connect(addr).await.unwrap();
		let request = format!(
			"PUT /api/issues/apitest HTTP/1.1\r\nHost: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
			addr,
			body.len(),
			body
		);
		stream.write_all(request.as_bytes()).await.unwrap();
		let mut buf = Vec::new();
		stream.read_to_end(&mut buf).await.unwrap();
		let raw = String::from_utf8(buf).unwrap();

		// Assert
		assert!(raw.starts_with("HTTP/1.1 413 Payload Too Large"));
		let body = raw.split("\r\n\r\n").nth(1).unwrap();
		let json: serde_json::Value = serde_json::from_str(body).unwrap();
		assert_eq!(json["error"], "Payload too large: body exceeds 16 bytes");

		coordinator.shutdown();
		task.await.unwrap();
	}

	#[rstest]
	#[tokio::test]
	async fn test_shutdown_stops_accept_loop_and_reports_completion() {
		// Arrange
		let (addr, coordinator, task) = spawn_server(HttpServer::new(Arc::new(TestHandler))).await;
		let _ = raw_request(addr, "/").await;

		// Act
		coordinator.shutdown();
		let finished = coordinator.wait_for_shutdown().await;

		// Assert
		assert!(finished);
		task.await.unwrap();
		assert!(TcpStream::connect(addr).await.is_err());
	}
}
