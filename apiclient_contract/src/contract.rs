use std::collections::{HashMap, HashSet};

use apiclient_wire::{RequestTemplate, find_placeholders};

use crate::{
	config_key::ConfigKey,
	descriptor::{DeclaredReturn, OperationDescriptor, ParamRole, Verb},
	error::ContractError,
	metadata::{DecodeInto, MethodMetadata},
};

/// Parses a described operation into a [`MethodMetadata`].
///
/// Two dialects ship here ([`StandardContract`] and [`MethodStyleContract`]);
/// callers choose one. Both produce identical metadata for an identically
/// shaped operation — they only differ in how the verb is determined.
pub trait Contract {
	fn parse(&self, op: &OperationDescriptor) -> Result<MethodMetadata, ContractError>;
}

/// The primary dialect: the verb comes from exactly one [`Verb`] marker
/// attached to the operation.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardContract;

impl Contract for StandardContract {
	fn parse(&self, op: &OperationDescriptor) -> Result<MethodMetadata, ContractError> {
		let verb = match op.verbs.as_slice() {
			[one] => one.clone(),
			_ => return Err(ContractError::MissingOrAmbiguousVerb),
		};
		parse_common(op, verb)
	}
}

/// The secondary dialect: the verb is encoded in the method name itself
/// (`getUser`, `postOrder`, ...) rather than a separate marker, falling back
/// to an explicit marker if one was supplied anyway.
#[derive(Clone, Copy, Debug, Default)]
pub struct MethodStyleContract;

impl Contract for MethodStyleContract {
	fn parse(&self, op: &OperationDescriptor) -> Result<MethodMetadata, ContractError> {
		let verb = match op.verbs.as_slice() {
			[one] => one.clone(),
			[] => Verb::from_method_name_prefix(&op.method_name).ok_or(ContractError::MissingOrAmbiguousVerb)?,
			_ => return Err(ContractError::MissingOrAmbiguousVerb),
		};
		parse_common(op, verb)
	}
}

fn parse_common(op: &OperationDescriptor, verb: Verb) -> Result<MethodMetadata, ContractError> {
	let config_key = ConfigKey::new(&op.interface_name, &op.method_name, &op.simple_param_types());

	let mut template = RequestTemplate::new(verb.as_str());
	if let Some(path) = &op.path {
		template = template.append_url(path);
	}
	if let Some(media_type) = &op.produces {
		template = template.header("Content-Type", [media_type.clone()]);
	}
	if let Some(body_template) = &op.body_template {
		template = template.body_template(body_template.clone());
	}

	let mut url_index = None;
	let mut observer_index = None;
	let mut body_index = None;
	let mut form_params = Vec::new();
	let mut index_to_name: HashMap<usize, Vec<String>> = HashMap::new();
	let mut element_kind = None;

	for (i, param) in op.params.iter().enumerate() {
		match &param.role {
			ParamRole::UrlOverride => url_index = Some(i),
			ParamRole::Path(name) => {
				index_to_name.entry(i).or_default().push(name.clone());
			}
			ParamRole::Query(name) => {
				template = template.query(name, [format!("{{{name}}}")]);
				index_to_name.entry(i).or_default().push(name.clone());
			}
			ParamRole::Header(name) => {
				template = template.header(name, [format!("{{{name}}}")]);
				index_to_name.entry(i).or_default().push(name.clone());
			}
			ParamRole::Form(name) => {
				form_params.push(name.clone());
				index_to_name.entry(i).or_default().push(name.clone());
			}
			ParamRole::Observer => {
				observer_index = Some(i);
				let descriptor = op.element_kind.as_ref().ok_or(ContractError::MissingElementDescriptor)?;
				element_kind = Some(descriptor.resolve().clone());
			}
			ParamRole::Body => body_index = Some(i),
		}
	}

	if let Some(oi) = observer_index {
		if !matches!(op.returns, DeclaredReturn::Void) {
			return Err(ContractError::ObserverMethodMustReturnVoid);
		}
		if oi != op.params.len() - 1 {
			return Err(ContractError::ObserverMustBeLast);
		}
	}

	let indices: Vec<usize> = [url_index, observer_index, body_index].into_iter().flatten().collect();
	let mut seen = HashSet::new();
	if !indices.iter().all(|i| seen.insert(*i)) {
		return Err(ContractError::IndicesNotDisjoint);
	}

	let bound_names: HashSet<&str> = index_to_name.values().flatten().map(String::as_str).collect();
	for name in find_placeholders(&template.url) {
		if !bound_names.contains(name.as_str()) {
			return Err(ContractError::UnresolvedPlaceholder(name));
		}
	}
	for (_, value) in template.headers.iter() {
		if let Some(value) = value {
			for name in find_placeholders(value) {
				if !bound_names.contains(name.as_str()) {
					return Err(ContractError::UnresolvedPlaceholder(name));
				}
			}
		}
	}
	// Query placeholders are deliberately NOT validated here: a query value
	// is allowed to stay `{name}` with no bound parameter, to be dropped
	// entirely at bind time by the null-drop policy.

	let decode_into = match element_kind {
		Some(kind) => DecodeInto::Element(kind),
		None => match &op.returns {
			DeclaredReturn::Void => DecodeInto::Void,
			DeclaredReturn::Response => DecodeInto::Response,
			DeclaredReturn::Value(type_name) => DecodeInto::Value(type_name.clone()),
		},
	};

	Ok(MethodMetadata { config_key, template, url_index, observer_index, body_index, form_params, index_to_name, decode_into })
}

#[cfg(test)]
mod tests {
	use apiclient_wire::ElementKind;

	use super::*;
	use crate::descriptor::ParamDescriptor;

	#[test]
	fn verb_only_operations_round_trip() {
		for (verb, expected) in [(Verb::Get, "GET"), (Verb::Post, "POST"), (Verb::Put, "PUT"), (Verb::Delete, "DELETE")] {
			let op = OperationDescriptor::new("Iface", "op").verb(verb);
			let metadata = StandardContract.parse(&op).unwrap();
			assert_eq!(metadata.template.method, expected);
			assert_eq!(metadata.template.url, "");
			assert!(metadata.template.headers.is_empty());
			assert!(metadata.template.body.is_none());
		}
	}

	#[test]
	fn zero_or_many_verb_markers_is_ambiguous() {
		let op = OperationDescriptor::new("Iface", "op");
		assert!(matches!(StandardContract.parse(&op), Err(ContractError::MissingOrAmbiguousVerb)));

		let op = OperationDescriptor::new("Iface", "op").verb(Verb::Get).verb(Verb::Post);
		assert!(matches!(StandardContract.parse(&op), Err(ContractError::MissingOrAmbiguousVerb)));
	}

	#[test]
	fn url_override_param_is_recorded_with_no_placeholders() {
		let op = OperationDescriptor::new("Iface", "op").verb(Verb::Custom("PATCH".into())).param(ParamDescriptor::new(ParamRole::UrlOverride, "URI"));
		let metadata = StandardContract.parse(&op).unwrap();
		assert_eq!(metadata.template.method, "PATCH");
		assert_eq!(metadata.template.url, "");
		assert_eq!(metadata.url_index, Some(0));
		assert!(metadata.template.headers.is_empty());
	}

	#[test]
	fn path_and_query_params_produce_expected_metadata() {
		let op = OperationDescriptor::new("Route53", "records")
			.verb(Verb::Get)
			.path("/domains/{domainId}/records")
			.param(ParamDescriptor::new(ParamRole::Path("domainId".into()), "int"))
			.param(ParamDescriptor::new(ParamRole::Query("name".into()), "String"))
			.param(ParamDescriptor::new(ParamRole::Query("type".into()), "String"));
		let metadata = StandardContract.parse(&op).unwrap();
		assert_eq!(metadata.template.url, "/domains/{domainId}/records");
		assert_eq!(metadata.template.queries.values_of("name"), vec!["{name}"]);
		assert_eq!(metadata.template.queries.values_of("type"), vec!["{type}"]);
		assert_eq!(metadata.index_to_name.get(&0), Some(&vec!["domainId".to_string()]));
		assert_eq!(metadata.template.render(), "GET /domains/{domainId}/records?name={name}&type={type} HTTP/1.1\n\n");
	}

	#[test]
	fn observer_must_be_last_and_method_must_return_void() {
		let op = OperationDescriptor::new("Iface", "stream")
			.verb(Verb::Get)
			.param(ParamDescriptor::new(ParamRole::Observer, "Observer<List<String>>"))
			.param(ParamDescriptor::new(ParamRole::Path("extra".into()), "String"));
		assert!(matches!(StandardContract.parse(&op), Err(ContractError::ObserverMustBeLast)));

		let op = OperationDescriptor::new("Iface", "stream")
			.verb(Verb::Get)
			.param(ParamDescriptor::new(ParamRole::Observer, "Observer<List<String>>"))
			.returns(DeclaredReturn::Value("String".into()))
			.element_kind(ElementKind::new("List<String>"));
		assert!(matches!(StandardContract.parse(&op), Err(ContractError::ObserverMethodMustReturnVoid)));
	}

	#[test]
	fn observer_without_element_kind_fails_to_parse() {
		let op = OperationDescriptor::new("Iface", "stream").verb(Verb::Get).param(ParamDescriptor::new(ParamRole::Observer, "Observer<List<String>>"));
		assert!(matches!(StandardContract.parse(&op), Err(ContractError::MissingElementDescriptor)));
	}

	#[test]
	fn method_style_contract_infers_verb_from_method_name() {
		let op = OperationDescriptor::new("Iface", "getUser").param(ParamDescriptor::new(ParamRole::Path("id".into()), "String")).path("/users/{id}");
		let metadata = MethodStyleContract.parse(&op).unwrap();
		assert_eq!(metadata.template.method, "GET");
	}
}
