use apiclient_contract::{FeignError, Options, RetryableError, Transport, TransportError};
use apiclient_wire::{OrderedParams, Request, Response};
use tracing::{Span, debug, field::Empty, instrument, warn};

/// The default [`Transport`]: one request/response round-trip over
/// [`reqwest`], grounded on
/// `v_exchanges_api_generics::http::Client::request`'s single attempt body
/// (the retry loop itself lives one layer up, in
/// `apiclient_contract::handler::run_pipeline` — here we only classify one
/// attempt).
///
/// Any failure that happens before a status line is produced — connection
/// refused, TLS handshake failure, a timed-out send — is retryable, since
/// nothing has been sent-and-unacknowledged yet. Once a status line is back,
/// the request has had an effect on the server that a replay could double;
/// a failure reading the response body past that point is reported as
/// terminal rather than re-driving the retry loop.
pub struct ReqwestTransport {
	client: reqwest::Client,
}

impl ReqwestTransport {
	pub fn new(client: reqwest::Client) -> Self {
		Self { client }
	}
}

impl Default for ReqwestTransport {
	fn default() -> Self {
		Self::new(reqwest::Client::new())
	}
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
	#[instrument(skip_all, fields(method = %request.method, url = %request.url, status = Empty))]
	async fn execute(&self, request: Request, options: &Options) -> Result<Response, TransportError> {
		let method_name = request.method.clone();
		let url = request.url.clone();
		let method: reqwest::Method = request.method.parse().map_err(|_| TransportError::Retryable(RetryableError::new(format!("unsupported method {method_name}"))))?;

		// `connect_timeout` is a `reqwest::ClientBuilder`-time setting, not a
		// per-request one; callers who need a per-operation connect timeout
		// build a dedicated `reqwest::Client` and register it under that
		// operation's configKey.
		let mut builder = self.client.request(method, &request.url).timeout(options.read_timeout);
		for (name, value) in request.headers.iter() {
			builder = builder.header(name, value.unwrap_or_default());
		}
		if let Some(body) = request.body {
			builder = builder.body(body);
		}

		let response = builder.send().await.map_err(|e| {
			warn!(error = %e, "request send failed");
			TransportError::Retryable(RetryableError::with_source("error executing request", e))
		})?;

		let status = response.status().as_u16();
		Span::current().record("status", status);
		let reason = response.status().canonical_reason().unwrap_or("").to_string();

		let mut headers = OrderedParams::new();
		for (name, value) in response.headers().iter() {
			headers.push(name.as_str(), value.to_str().unwrap_or_default());
		}

		let body = response.bytes().await.map_err(|e| {
			warn!(error = %e, "failed to read response body");
			TransportError::Terminal(FeignError::ErrorReading { method: method_name.clone(), url: url.clone(), source: Box::new(e) })
		})?;
		debug!(len = body.len(), "received response body");

		Ok(Response { status, reason, headers, body: Some(body) })
	}
}
