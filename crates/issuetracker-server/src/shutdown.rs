//! Graceful shutdown coordination.

use std::time::Duration;
use tokio::sync::watch;

/// Coordinates graceful shutdown between the accept loop, open connections
/// and whoever triggers the shutdown.
///
/// Clones share state: calling [`shutdown`](Self::shutdown) on any clone
/// notifies every subscriber, including subscribers created afterwards.
///
/// # Examples
///
/// ```
/// use issuetracker_server::ShutdownCoordinator;
/// use std::time::Duration;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let coordinator = ShutdownCoordinator::new(Duration::from_secs(1));
/// let mut signal = coordinator.subscribe();
///
/// coordinator.shutdown();
/// signal.recv().await;
/// assert!(coordinator.is_shutting_down());
/// # });
/// ```
#[derive(Clone)]
pub struct ShutdownCoordinator {
	timeout: Duration,
	shutdown_tx: watch::Sender<bool>,
	complete_tx: watch::Sender<bool>,
}

/// Receiving side of a shutdown notification
pub struct ShutdownSignal {
	rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
	/// Wait until shutdown has been requested
	///
	/// Returns immediately if shutdown was already requested.
	pub async fn recv(&mut self) {
		// The sender lives in the coordinator; if every coordinator is
		// gone nobody can trigger shutdown anymore, which counts as shutdown.
		let _ = self.rx.wait_for(|requested| *requested).await;
	}
}

impl ShutdownCoordinator {
	/// Create a coordinator that gives connections `timeout` to drain
	pub fn new(timeout: Duration) -> Self {
		let (shutdown_tx, _) = watch::channel(false);
		let (complete_tx, _) = watch::channel(false);
		Self {
			timeout,
			shutdown_tx,
			complete_tx,
		}
	}

	/// Grace period for in-flight connections
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	pub fn subscribe(&self) -> ShutdownSignal {
		ShutdownSignal {
			rx: self.shutdown_tx.subscribe(),
		}
	}

	/// Request shutdown. Idempotent.
	pub fn shutdown(&self) {
		self.shutdown_tx.send_replace(true);
	}

	pub fn is_shutting_down(&self) -> bool {
		*self.shutdown_tx.borrow()
	}

	/// Called by the server once it stopped accepting and drained connections
	pub fn notify_shutdown_complete(&self) {
		self.complete_tx.send_replace(true);
	}

	/// Wait for the server to report completion, bounded by the timeout
	///
	/// Returns `true` if the server finished within the grace period.
	pub async fn wait_for_shutdown(&self) -> bool {
		let mut rx = self.complete_tx.subscribe();
		match tokio::time::timeout(self.timeout, rx.wait_for(|done| *done)).await {
			Ok(_) => true,
			Err(_) => {
				tracing::warn!(
					timeout_secs = self.timeout.as_secs(),
					"graceful shutdown timed out"
				);
				false
			}
		}
	}
}

/// Resolves when the process receives Ctrl-C (or SIGTERM on Unix)
pub async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "failed to listen for Ctrl-C");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut sig) => {
				sig.recv().await;
			}
			Err(e) => {
				tracing::error!(error = %e, "failed to install SIGTERM handler");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => tracing::info!("received Ctrl-C, shutting down gracefully"),
		_ = terminate => tracing::info!("received SIGTERM, shutting down gracefully"),
	}
}
