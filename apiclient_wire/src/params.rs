/// An insertion-ordered multimap of `name -> value`, with support for
/// "keys-only" entries (a query flag with no `=value`, e.g. `?flag`).
///
/// Entries are stored flat, in the exact order they were pushed, so that a
/// sequence like `a=1&b=2&a=3&flag` round-trips byte-for-byte instead of
/// being grouped by key — grouping would reorder `a=1&a=3` to be adjacent,
/// which the wire format does not do.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderedParams {
	entries: Vec<(String, Option<String>)>,
}

impl OrderedParams {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a `name=value` entry, preserving prior entries for the same name.
	pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.entries.push((name.into(), Some(value.into())));
	}

	/// Append a keys-only entry (e.g. the `flag` in `?flag&Action=...`).
	///
	/// If `name` has no entries at all yet, this still registers the key as
	/// present with an empty value set.
	pub fn push_flag(&mut self, name: impl Into<String>) {
		self.entries.push((name.into(), None));
	}

	/// All values bound to `name`, in insertion order. Empty (not absent) if
	/// `name` was only ever pushed as a flag.
	pub fn values_of(&self, name: &str) -> Vec<&str> {
		self.entries.iter().filter(|(k, v)| k == name && v.is_some()).filter_map(|(_, v)| v.as_deref()).collect()
	}

	/// Whether `name` appears at all (as a value or as a bare flag).
	pub fn contains_key(&self, name: &str) -> bool {
		self.entries.iter().any(|(k, _)| k == name)
	}

	/// Whether `name` appears as a bare flag (an entry with no value).
	pub fn contains_flag(&self, name: &str) -> bool {
		self.entries.iter().any(|(k, v)| k == name && v.is_none())
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
	}

	/// Remove every entry named `name`. Used by the binder's null-drop policy
	/// for optional query filters.
	pub fn remove(&mut self, name: &str) {
		self.entries.retain(|(k, _)| k != name);
	}

	/// Replace every occurrence of `value` under `name` in place, preserving
	/// position. Used during template resolution.
	pub fn map_values(&self, mut f: impl FnMut(&str, &str) -> String) -> Self {
		let entries = self.entries.iter().map(|(k, v)| (k.clone(), v.as_ref().map(|v| f(k, v)))).collect();
		Self { entries }
	}
}

impl<'a> IntoIterator for &'a OrderedParams {
	type Item = (&'a str, Option<&'a str>);
	type IntoIter = std::vec::IntoIter<(&'a str, Option<&'a str>)>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter().collect::<Vec<_>>().into_iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn preserves_flat_insertion_order_with_duplicates() {
		let mut p = OrderedParams::new();
		p.push("a", "1");
		p.push("b", "2");
		p.push("a", "3");
		p.push_flag("flag");

		let rendered: Vec<String> = p
			.iter()
			.map(|(k, v)| match v {
				Some(v) => format!("{k}={v}"),
				None => k.to_string(),
			})
			.collect();
		assert_eq!(rendered.join("&"), "a=1&b=2&a=3&flag");
		assert_eq!(p.values_of("a"), vec!["1", "3"]);
		assert!(p.contains_flag("flag"));
	}
}
