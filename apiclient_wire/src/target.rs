use crate::{
	error::{TargetError, UrlError},
	message::Request,
	template::RequestTemplate,
};

/// Rewrites a resolved [`RequestTemplate`] into a concrete [`Request`] —
/// prepending a base URL, signing, adding default headers, etc.
///
/// Mirrors `v_exchanges_api_generics::http::RequestHandler::base_url` +
/// `build_request`, collapsed into a single `apply` hook.
pub trait Target: Send + Sync {
	/// Turn a resolved template into a request. Implementations must be safe
	/// to call concurrently.
	fn apply(&self, template: RequestTemplate) -> Result<Request, TargetError>;
}

/// The default [`Target`]: prepends `base_url` to the template's url, unless
/// the template's url is already absolute (i.e. a `urlIndex`-bound argument
/// overrode it at bind time — see `apiclient_contract::binder`), in which
/// case the template's url replaces the base entirely.
#[derive(Clone, Debug)]
pub struct DefaultTarget {
	pub base_url: String,
}

impl DefaultTarget {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self { base_url: base_url.into() }
	}

	fn is_absolute(url: &str) -> bool {
		url::Url::parse(url).is_ok()
	}
}

impl Target for DefaultTarget {
	fn apply(&self, template: RequestTemplate) -> Result<Request, TargetError> {
		let request = template.request()?;
		if Self::is_absolute(&request.url) {
			return Ok(request);
		}
		let base = url::Url::parse(&self.base_url).map_err(UrlError::Parse)?;
		if base.host().is_none() {
			return Err(UrlError::MissingHost(self.base_url.clone()).into());
		}
		let mut joined = self.base_url.trim_end_matches('/').to_owned();
		if !request.url.starts_with('/') {
			joined.push('/');
		}
		joined.push_str(&request.url);
		Ok(Request { url: joined, ..request })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn joins_base_url_with_relative_template_url() {
		let target = DefaultTarget::new("https://api.example.test/v1");
		let template = RequestTemplate::new("GET").append_url("/users/1");
		let request = target.apply(template).unwrap();
		assert_eq!(request.url, "https://api.example.test/v1/users/1");
	}

	#[test]
	fn absolute_template_url_replaces_base_entirely() {
		let target = DefaultTarget::new("https://api.example.test");
		let template = RequestTemplate::new("GET").append_url("https://override.example/resource");
		let request = target.apply(template).unwrap();
		assert_eq!(request.url, "https://override.example/resource");
	}

	#[test]
	fn base_url_with_no_host_is_rejected() {
		let target = DefaultTarget::new("file:///var/www");
		let template = RequestTemplate::new("GET").append_url("/users/1");
		let err = target.apply(template).unwrap_err();
		assert!(matches!(err, TargetError::Url(UrlError::MissingHost(_))));
	}

	#[test]
	fn unparseable_base_url_is_rejected() {
		let target = DefaultTarget::new("/just/a/path");
		let template = RequestTemplate::new("GET").append_url("/users/1");
		let err = target.apply(template).unwrap_err();
		assert!(matches!(err, TargetError::Url(UrlError::Parse(_))));
	}
}
