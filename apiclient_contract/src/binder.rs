use std::collections::HashMap;

use apiclient_wire::RequestTemplate;

use crate::{
	collaborators::{BodyEncoder, FormEncoder},
	error::BindError,
	metadata::MethodMetadata,
	value::ArgValue,
};

/// Pure function `(MethodMetadata, argv) -> RequestTemplate`.
pub struct ArgumentBinder;

impl ArgumentBinder {
	pub fn bind(
		metadata: &MethodMetadata,
		argv: &[ArgValue],
		body_encoder: Option<&dyn BodyEncoder>,
		form_encoder: Option<&dyn FormEncoder>,
	) -> Result<RequestTemplate, BindError> {
		let mut template = metadata.template.clone();

		if let Some(i) = metadata.url_index {
			if let Some(value) = argv.get(i).and_then(ArgValue::as_str) {
				template.url = value.to_string();
			}
		}

		let mut bindings: HashMap<String, String> = HashMap::new();
		for (&i, names) in &metadata.index_to_name {
			let arg = argv.get(i);
			for name in names {
				match arg {
					Some(ArgValue::Str(s)) => {
						bindings.insert(name.clone(), s.clone());
					}
					Some(ArgValue::Body(_)) => {
						// A raw body argument can never be the source of a
						// named placeholder; nothing to bind for this name.
					}
					Some(ArgValue::Null) | None => {
						let bare_placeholder = format!("{{{name}}}");
						let only_a_bare_query = template.queries.iter().any(|(k, v)| k == name && v == Some(bare_placeholder.as_str()));
						if only_a_bare_query {
							template.queries.remove(name);
						} else {
							bindings.insert(name.clone(), String::new());
						}
					}
				}
			}
		}

		if let Some(i) = metadata.body_index {
			let encoder = body_encoder.ok_or(BindError::MissingBodyEncoder)?;
			if let Some(ArgValue::Body(value)) = argv.get(i) {
				encoder.encode(value.as_ref(), &mut template);
			}
		}

		if !metadata.form_params.is_empty() {
			let encoder = form_encoder.ok_or(BindError::MissingFormEncoder)?;
			let mut fields = HashMap::new();
			for (&i, names) in &metadata.index_to_name {
				for name in names {
					if metadata.form_params.contains(name) {
						let value = match argv.get(i) {
							Some(ArgValue::Str(s)) => s.clone(),
							_ => String::new(),
						};
						fields.insert(name.clone(), value);
					}
				}
			}
			encoder.encode(&fields, &mut template);
		}

		Ok(template.resolve(&bindings))
	}
}
