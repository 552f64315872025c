/// A push sink for a streamed operation.
///
/// Contract: a session delivers zero or more [`on_next`](Observer::on_next)
/// calls followed by exactly one terminal call — either
/// [`on_success`](Observer::on_success) xor
/// [`on_failure`](Observer::on_failure). The runtime (`apiclient_contract`'s
/// streaming `MethodHandler`) is responsible for upholding that guarantee
/// even if this trait's own methods panic-unwind-free-error out; this trait
/// itself makes no promises beyond "call me with one item or one terminal".
///
/// Generic over the terminal error type `E` so that this crate does not need
/// to know about `apiclient_contract`'s `FeignError`.
pub trait Observer<T, E>: Send {
	/// Called once per decoded element, in decoder-produced order.
	fn on_next(&mut self, item: T);

	/// Called exactly once, after the last `on_next`, on a successful stream.
	fn on_success(&mut self);

	/// Called exactly once, instead of `on_success`, on a terminal failure.
	///
	/// An error raised from within `on_failure` itself is not swallowed by
	/// the runtime — implementations that can fail here should expect the
	/// failure to propagate to whatever polls the streaming task.
	fn on_failure(&mut self, error: E);
}
