use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use apiclient_contract::Executor;
use tokio::task::JoinHandle;
use tracing::debug;

/// The owned scheduling model for streaming operations: every `MethodHandler::invoke_streaming` task is spawned
/// onto the ambient tokio runtime, grounded in the same "owned background
/// task with an explicit shutdown path" shape as
/// `v_exchanges_api_generics::websocket::WebSocketConnection`, adapted from
/// a single connection's handle to a pool of in-flight streaming calls.
#[derive(Default)]
pub struct TokioExecutor {
	handles: Mutex<Vec<JoinHandle<()>>>,
	closed: AtomicBool,
}

impl TokioExecutor {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}
}

#[async_trait::async_trait]
impl Executor for TokioExecutor {
	fn submit(&self, task: Pin<Box<dyn Future<Output = ()> + Send>>) {
		let handle = tokio::spawn(task);
		let mut handles = self.handles.lock().expect("executor handle list poisoned");
		handles.retain(|h| !h.is_finished());
		handles.push(handle);
	}

	async fn close(&self) {
		self.closed.store(true, Ordering::SeqCst);
		let pending: Vec<JoinHandle<()>> = std::mem::take(&mut *self.handles.lock().expect("executor handle list poisoned"));
		debug!(pending = pending.len(), "draining in-flight streaming tasks");
		for handle in pending {
			let _ = handle.await;
		}
	}
}
