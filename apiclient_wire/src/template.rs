use std::collections::{HashMap, HashSet};

use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::{error::TemplateError, message::Request, params::OrderedParams};

/// Characters that must survive substitution unescaped because they are
/// already meaningful in URI grammar (RFC 3986 reserved + unreserved sets).
/// Everything else gets percent-encoded.
const ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'~')
	.remove(b':')
	.remove(b'/')
	.remove(b'?')
	.remove(b'#')
	.remove(b'[')
	.remove(b']')
	.remove(b'@')
	.remove(b'!')
	.remove(b'$')
	.remove(b'&')
	.remove(b'\'')
	.remove(b'(')
	.remove(b')')
	.remove(b'*')
	.remove(b'+')
	.remove(b',')
	.remove(b';')
	.remove(b'=');

/// A mutable builder for an HTTP request with `{name}` placeholders. Built
/// up incrementally by `apiclient_contract::Contract` while parsing one
/// operation, then frozen into a [`Request`] once every placeholder has a
/// bound value.
#[derive(Clone, Debug, Default)]
pub struct RequestTemplate {
	pub method: String,
	/// Path portion only — query fragments passed to [`append_url`](Self::append_url)
	/// are lifted out into `queries` at parse time, so this never contains `?`.
	pub url: String,
	pub queries: OrderedParams,
	pub headers: OrderedParams,
	pub body: Option<Bytes>,
	pub body_template: Option<String>,
}

impl RequestTemplate {
	pub fn new(method: impl Into<String>) -> Self {
		Self { method: method.into(), ..Default::default() }
	}

	pub fn method(mut self, verb: impl Into<String>) -> Self {
		self.method = verb.into();
		self
	}

	/// Appends a url fragment, lifting any `?k=v&k2=v2&flag` portion out into
	/// `queries`. A bare `k` with no `=` is recorded as a present key with an
	/// empty value set.
	pub fn append_url(mut self, fragment: &str) -> Self {
		let (path, query) = match fragment.split_once('?') {
			Some((p, q)) => (p, Some(q)),
			None => (fragment, None),
		};
		self.url.push_str(path);
		if let Some(query) = query {
			if !query.is_empty() {
				for piece in query.split('&') {
					match piece.split_once('=') {
						Some((k, v)) => self.queries.push(k, v),
						None => self.queries.push_flag(piece),
					}
				}
			}
		}
		self
	}

	pub fn query(mut self, name: &str, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
		let mut any = false;
		for v in values {
			self.queries.push(name, v);
			any = true;
		}
		if !any {
			self.queries.push_flag(name);
		}
		self
	}

	pub fn header(mut self, name: &str, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
		for v in values {
			self.headers.push(name, v);
		}
		self
	}

	/// Sets a literal, final body. Mutually exclusive with `body_template`.
	pub fn body(mut self, bytes: Bytes, content_type: Option<&str>) -> Self {
		self.body = Some(bytes);
		self.body_template = None;
		if let Some(ct) = content_type {
			self.headers.push("Content-Type", ct);
		}
		self
	}

	/// Sets an unresolved body template, to be rendered into `body` by
	/// `resolve()`. Mutually exclusive with `body`.
	pub fn body_template(mut self, template: impl Into<String>) -> Self {
		self.body_template = Some(template.into());
		self.body = None;
		self
	}

	/// Expands every `{name}` placeholder using `bindings`. Path and query
	/// values are percent-encoded (reserved/unreserved characters pass
	/// through unescaped); header values and the body template are
	/// substituted verbatim. Placeholders with no entry in `bindings` are
	/// left literal. Idempotent: resolving twice with the same bindings (the
	/// second call sees no more placeholders to substitute) yields identical
	/// bytes.
	pub fn resolve(&self, bindings: &HashMap<String, String>) -> RequestTemplate {
		let url = substitute(&self.url, bindings, Encoding::Percent);
		let queries = self.queries.map_values(|_, v| substitute(v, bindings, Encoding::Percent));
		let headers = self.headers.map_values(|_, v| substitute(v, bindings, Encoding::Verbatim));

		let (body, body_template) = match (&self.body, &self.body_template) {
			(Some(b), _) => (Some(b.clone()), None),
			(None, Some(bt)) => {
				let substituted = substitute(bt, bindings, Encoding::Verbatim);
				(Some(Bytes::from(decode_literal_braces(&substituted))), None)
			}
			(None, None) => (None, None),
		};

		RequestTemplate {
			method: self.method.clone(),
			url,
			queries,
			headers,
			body,
			body_template,
		}
	}

	/// Validates that no `{name}` placeholder remains, then freezes this
	/// template into a [`Request`]. Fails with
	/// [`TemplateError::TemplateNotFullyResolved`] otherwise.
	pub fn request(self) -> Result<Request, TemplateError> {
		match (&self.body, &self.body_template) {
			(Some(_), None) | (None, Some(_)) | (None, None) => {}
			(Some(_), Some(_)) => {
				return Err(TemplateError::AmbiguousBody { has_body: true, has_body_template: true });
			}
		}

		let mut unresolved = HashSet::new();
		unresolved.extend(find_placeholders(&self.url));
		for (_, v) in self.queries.iter() {
			if let Some(v) = v {
				unresolved.extend(find_placeholders(v));
			}
		}
		for (_, v) in self.headers.iter() {
			if let Some(v) = v {
				unresolved.extend(find_placeholders(v));
			}
		}
		if let Some(bt) = &self.body_template {
			unresolved.extend(find_placeholders(bt));
		}
		if !unresolved.is_empty() {
			let mut names: Vec<String> = unresolved.into_iter().collect();
			names.sort();
			return Err(TemplateError::TemplateNotFullyResolved(names));
		}

		let mut url = self.url;
		if !self.queries.is_empty() {
			url.push('?');
			url.push_str(&render_query_string(&self.queries));
		}

		let body = match self.body_template {
			Some(bt) => Some(Bytes::from(bt.into_bytes())),
			None => self.body,
		};

		Ok(Request { method: self.method, url, headers: self.headers, body })
	}

	/// Deterministic textual rendering for logs and test assertions:
	/// `"{METHOD} {url}[?{queryString}] HTTP/1.1\n{headers}\n\n{body}"`.
	pub fn render(&self) -> String {
		let mut out = format!("{} {}", self.method, self.url);
		if !self.queries.is_empty() {
			out.push('?');
			out.push_str(&render_query_string(&self.queries));
		}
		out.push_str(" HTTP/1.1\n");
		for (name, value) in self.headers.iter() {
			out.push_str(name);
			out.push_str(": ");
			out.push_str(value.unwrap_or_default());
			out.push('\n');
		}
		out.push('\n');
		if let Some(body) = &self.body {
			out.push_str(&String::from_utf8_lossy(body));
		} else if let Some(bt) = &self.body_template {
			out.push_str(bt);
		}
		out
	}
}

fn render_query_string(queries: &OrderedParams) -> String {
	queries
		.iter()
		.map(|(k, v)| match v {
			Some(v) => format!("{k}={v}"),
			None => k.to_string(),
		})
		.collect::<Vec<_>>()
		.join("&")
}

#[derive(Clone, Copy)]
enum Encoding {
	Percent,
	Verbatim,
}

/// Scans `s` left-to-right, replacing every `{name}` whose `name` is a key
/// in `bindings`; anything else (including `{name}` with no binding) is
/// copied through unchanged.
fn substitute(s: &str, bindings: &HashMap<String, String>, encoding: Encoding) -> String {
	let mut out = String::with_capacity(s.len());
	let mut rest = s;
	while let Some(open) = rest.find('{') {
		out.push_str(&rest[..open]);
		let after_open = &rest[open + 1..];
		match after_open.find('}') {
			Some(close) => {
				let name = &after_open[..close];
				match bindings.get(name) {
					Some(value) => {
						match encoding {
							Encoding::Percent => out.push_str(&utf8_percent_encode(value, ENCODE_SET).to_string()),
							Encoding::Verbatim => out.push_str(value),
						}
						rest = &after_open[close + 1..];
					}
					None => {
						// Unbound: leave the literal placeholder in place and keep scanning past it.
						out.push('{');
						rest = after_open;
					}
				}
			}
			None => {
				// Unmatched `{` with no closing brace: not a placeholder, copy literally.
				out.push('{');
				rest = after_open;
			}
		}
	}
	out.push_str(rest);
	out
}

/// Collects the distinct placeholder names still present in `s`.
pub fn find_placeholders(s: &str) -> Vec<String> {
	let mut names = Vec::new();
	let mut rest = s;
	while let Some(open) = rest.find('{') {
		let after_open = &rest[open + 1..];
		match after_open.find('}') {
			Some(close) => {
				names.push(after_open[..close].to_string());
				rest = &after_open[close + 1..];
			}
			None => break,
		}
	}
	names
}

/// One-pass decode for `bodyTemplate`: a literal brace that would otherwise
/// be mistaken for placeholder syntax is written percent-encoded
/// (`%7B` / `%7D`) by the template author, and decoded back to `{` / `}`
/// here, after placeholder substitution has already happened.
fn decode_literal_braces(s: &str) -> String {
	s.replace("%7B", "{").replace("%7D", "}")
}
