use std::any::Any;
use std::collections::HashMap;

use apiclient_contract::{BodyEncoder, ClassifiedError, Decoder, DecodeError, DecodeInto, ErrorDecoder, FeignError, FormEncoder, ObserverDecoder, RetryableError};
use apiclient_wire::{Observer, RequestTemplate, Response};
use bytes::Bytes;
use serde_json::Value;

/// Decodes a response body as a single JSON value. `decode_into` is not
/// inspected — this crate has no compile-time knowledge of the caller's
/// target type, so the decoded `serde_json::Value` is handed back for the
/// caller to `downcast_ref`/deserialize further via `serde_json::from_value`.
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
	fn decode(&self, body: &[u8], _decode_into: &DecodeInto) -> Result<Box<dyn Any + Send>, DecodeError> {
		let value: Value = serde_json::from_slice(body).map_err(|e| DecodeError::Malformed(e.to_string()))?;
		Ok(Box::new(value))
	}
}

/// Decodes a response body as a JSON array, pushing one `on_next` per
/// element.
pub struct JsonObserverDecoder;

impl ObserverDecoder for JsonObserverDecoder {
	fn decode(&self, body: &[u8], _decode_into: &DecodeInto, observer: &mut dyn Observer<Box<dyn Any + Send>, FeignError>) -> Result<(), DecodeError> {
		let elements: Vec<Value> = serde_json::from_slice(body).map_err(|e| DecodeError::Malformed(e.to_string()))?;
		for element in elements {
			observer.on_next(Box::new(element));
		}
		Ok(())
	}
}

/// Encodes a `serde_json::Value` body argument as the request body, setting
/// `Content-Type` if the contract-level media-type marker did not already
/// set one.
pub struct JsonBodyEncoder;

impl BodyEncoder for JsonBodyEncoder {
	fn encode(&self, value: &dyn Any, template: &mut RequestTemplate) {
		let Some(json) = value.downcast_ref::<Value>() else {
			return;
		};
		let bytes = serde_json::to_vec(json).expect("serde_json::Value always serializes");
		let content_type = if template.headers.contains_key("Content-Type") { None } else { Some("application/json") };
		*template = std::mem::take(template).body(Bytes::from(bytes), content_type);
	}
}

/// Substitutes form field values into `bodyTemplate`'s `{name}` placeholders,
/// freezing the result into `body`. Form parameters are never sent as a
/// standalone `k=v&k=v` payload — a form-parameterised operation always
/// carries a `bodyTemplate` naming the same placeholders, so encoding is just
/// the ordinary template substitution `apiclient_wire::RequestTemplate`
/// already does for path and query placeholders.
pub struct TemplateFormEncoder;

impl FormEncoder for TemplateFormEncoder {
	fn encode(&self, fields: &HashMap<String, String>, template: &mut RequestTemplate) {
		let resolved = template.resolve(fields);
		template.body = resolved.body;
		template.body_template = resolved.body_template;
	}
}

/// Classifies 429/503 as retryable, everything else non-2xx as a terminal
/// status error carrying the response body as its message.
pub struct DefaultErrorDecoder;

impl ErrorDecoder for DefaultErrorDecoder {
	fn decode(&self, config_key: &str, response: &Response) -> ClassifiedError {
		if matches!(response.status, 429 | 503) {
			return ClassifiedError::Retryable(RetryableError::new(format!("{config_key} responded {}", response.status)));
		}
		let message = response.body.as_ref().map(|b| String::from_utf8_lossy(b).into_owned()).unwrap_or_default();
		ClassifiedError::Terminal(FeignError::Status { status: response.status, method: String::new(), url: String::new(), message })
	}
}

#[cfg(test)]
mod tests {
	use apiclient_contract::{ArgValue, ArgumentBinder, Contract, OperationDescriptor, ParamDescriptor, ParamRole, StandardContract, Verb};

	use super::*;

	#[test]
	fn template_form_encoder_substitutes_fields_into_body_template() {
		let op = OperationDescriptor::new("Denominator", "createAccount")
			.verb(Verb::Post)
			.path("/accounts")
			.body_template(r#"%7B"customer_name": "{customer_name}", "user_name": "{user_name}", "password": "{password}"%7D"#)
			.param(ParamDescriptor::new(ParamRole::Form("customer_name".into()), "String"))
			.param(ParamDescriptor::new(ParamRole::Form("user_name".into()), "String"))
			.param(ParamDescriptor::new(ParamRole::Form("password".into()), "String"));
		let metadata = StandardContract.parse(&op).unwrap();

		let argv = vec![ArgValue::from("netflix"), ArgValue::from("denominator"), ArgValue::from("password")];
		let template = ArgumentBinder::bind(&metadata, &argv, None, Some(&TemplateFormEncoder)).unwrap();
		let body = template.request().unwrap().body.unwrap();

		assert_eq!(body, Bytes::from_static(br#"{"customer_name": "netflix", "user_name": "denominator", "password": "password"}"#));
	}
}
