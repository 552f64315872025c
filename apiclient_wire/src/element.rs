/// A caller-supplied descriptor of "the type a streaming decoder must
/// produce", standing in for a type resolver walking a generic supertype
/// chain at runtime.
///
/// A reflective runtime can walk a parameterised supertype chain at runtime
/// (`Observer<List<String>>` → `List<String>`) because its generics carry
/// runtime type information. Rust erases generics at compile time, so the
/// element type is supplied explicitly by the caller alongside the observer
/// parameter instead of being discovered by walking a type hierarchy.
/// Resolution therefore collapses to the identity function: resolving an
/// `ElementKind` just returns the same `ElementKind` back, after checking
/// one was supplied at all.
///
/// `name` is a short, human-readable label for the element type (used in
/// `configKey`-adjacent error messages); it carries no type information
/// beyond what the registered [`apiclient_contract::ObserverDecoder`] already
/// knows how to produce for a given operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementKind(pub &'static str);

impl ElementKind {
	pub const fn new(name: &'static str) -> Self {
		Self(name)
	}

	/// The identity resolution step standing in for walking to the first
	/// type parameter of a parameterised supertype.
	///
	/// Has no failure modes of its own in this collapsed form — an absent
	/// descriptor is a contract-parse error (`MissingElementDescriptor`),
	/// not a resolution error, because there is no partial type information
	/// to fail on.
	pub fn resolve(&self) -> &ElementKind {
		self
	}
}

impl std::fmt::Display for ElementKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}
