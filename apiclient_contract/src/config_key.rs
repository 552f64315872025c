use std::fmt;

/// Canonical textual identity of one operation: `Interface#method(Type1,Type2,...)`.
///
/// Used as the lookup key for per-operation collaborator overrides
/// (`ClientFactory`'s `configKey`-exact-match-then-`interfaceType`-fallback
/// rule), mirroring the role a per-exchange `RequestConfig` override key
/// plays in `v_exchanges_adapters`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey(String);

impl ConfigKey {
	pub fn new(interface_name: &str, method_name: &str, param_types: &[&str]) -> Self {
		Self(format!("{interface_name}#{method_name}({})", param_types.join(",")))
	}

	/// The fallback key: just the interface name, with no method/params.
	pub fn interface_fallback(interface_name: &str) -> Self {
		Self(interface_name.to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ConfigKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn formats_with_simple_param_types_and_no_whitespace() {
		let key = ConfigKey::new("GitHub", "contributors", &["String", "String"]);
		assert_eq!(key.as_str(), "GitHub#contributors(String,String)");
		assert!(!key.as_str().contains(' '));
	}

	#[test]
	fn formats_with_no_params() {
		let key = ConfigKey::new("Route53", "list", &[]);
		assert_eq!(key.as_str(), "Route53#list()");
	}
}
