use apiclient_wire::ElementKind;

/// An HTTP verb marker. `Custom` covers extension verbs beyond the usual six.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verb {
	Get,
	Post,
	Put,
	Delete,
	Head,
	Options,
	Custom(String),
}

impl Verb {
	pub fn as_str(&self) -> &str {
		match self {
			Verb::Get => "GET",
			Verb::Post => "POST",
			Verb::Put => "PUT",
			Verb::Delete => "DELETE",
			Verb::Head => "HEAD",
			Verb::Options => "OPTIONS",
			Verb::Custom(s) => s,
		}
	}

	/// Matches a method-name prefix against the well-known verbs, longest
	/// recognised prefix wins (used by `MethodStyleContract`). Case-sensitive
	/// on the verb's own spelling, as the method-name convention it mirrors is.
	pub(crate) fn from_method_name_prefix(method_name: &str) -> Option<Verb> {
		const KNOWN: [(&str, fn() -> Verb); 6] =
			[("get", || Verb::Get), ("post", || Verb::Post), ("put", || Verb::Put), ("delete", || Verb::Delete), ("head", || Verb::Head), ("options", || Verb::Options)];
		KNOWN.iter().filter(|(prefix, _)| method_name.starts_with(prefix)).max_by_key(|(prefix, _)| prefix.len()).map(|(_, ctor)| ctor())
	}
}

/// The role one parameter position plays in the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamRole {
	UrlOverride,
	Path(String),
	Query(String),
	Header(String),
	Form(String),
	Observer,
	/// Unmarked, non-observer parameter: the raw body object.
	Body,
}

#[derive(Clone, Debug)]
pub struct ParamDescriptor {
	pub role: ParamRole,
	/// Simple type name, used in `configKey` formatting and error messages.
	pub type_name: String,
}

impl ParamDescriptor {
	pub fn new(role: ParamRole, type_name: impl Into<String>) -> Self {
		Self { role, type_name: type_name.into() }
	}
}

/// What an operation decodes a success response into, absent an observer parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclaredReturn {
	Void,
	/// A normal decoded return; carries the simple type name.
	Value(String),
	/// The raw `Response` sentinel — caller owns the body.
	Response,
}

/// The declarative description of one operation, fed to a [`crate::Contract`].
///
/// Stands in for the source runtime's reflected interface method: since Rust
/// has no reflection over a trait's declared methods, callers building a
/// dispatcher (`apiclient::factory`) construct one `OperationDescriptor` per
/// operation by hand or via a small macro, the same way
/// `v_exchanges_adapters`'s per-exchange adapters hand-assemble one
/// `HandlerOptions` per exchange instead of discovering it reflectively.
#[derive(Clone, Debug)]
pub struct OperationDescriptor {
	pub interface_name: String,
	pub method_name: String,
	pub verbs: Vec<Verb>,
	pub path: Option<String>,
	pub produces: Option<String>,
	pub body_template: Option<String>,
	pub params: Vec<ParamDescriptor>,
	pub returns: DeclaredReturn,
	/// Required when a parameter has [`ParamRole::Observer`]; stands in for
	/// `TypeResolver`'s walked element type.
	pub element_kind: Option<ElementKind>,
}

impl OperationDescriptor {
	pub fn new(interface_name: impl Into<String>, method_name: impl Into<String>) -> Self {
		Self {
			interface_name: interface_name.into(),
			method_name: method_name.into(),
			verbs: Vec::new(),
			path: None,
			produces: None,
			body_template: None,
			params: Vec::new(),
			returns: DeclaredReturn::Void,
			element_kind: None,
		}
	}

	pub fn verb(mut self, verb: Verb) -> Self {
		self.verbs.push(verb);
		self
	}

	pub fn path(mut self, path: impl Into<String>) -> Self {
		self.path = Some(path.into());
		self
	}

	pub fn produces(mut self, media_type: impl Into<String>) -> Self {
		self.produces = Some(media_type.into());
		self
	}

	pub fn body_template(mut self, template: impl Into<String>) -> Self {
		self.body_template = Some(template.into());
		self
	}

	pub fn param(mut self, param: ParamDescriptor) -> Self {
		self.params.push(param);
		self
	}

	pub fn returns(mut self, returns: DeclaredReturn) -> Self {
		self.returns = returns;
		self
	}

	pub fn element_kind(mut self, kind: ElementKind) -> Self {
		self.element_kind = Some(kind);
		self
	}

	pub(crate) fn simple_param_types(&self) -> Vec<&str> {
		self.params.iter().map(|p| p.type_name.as_str()).collect()
	}
}
