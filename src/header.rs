//! Types for working with message headers.

use crate::{Error, JsonObject, JsonValue, Result};

/// The decoded JOSE header of a compact JWS message.
///
/// Only the protected header exists in the compact serialization,
/// so every parameter is integrity protected by the signature.
#[derive(Clone, Debug, PartialEq)]
pub struct JoseHeader {
	/// The `alg` parameter, exactly as it appeared in the header.
	pub algorithm : String,

	/// The `x5c` parameter: standard base64 encoded DER certificates, leaf first.
	pub certificate_chain : Vec<String>,

	/// All header parameters, including `alg` and `x5c`.
	pub params : JsonObject,
}

impl JoseHeader {
	/// Extract the required parameters from a decoded header object.
	pub fn from_params(params: JsonObject) -> Result<Self> {
		let algorithm         : String      = parse_required_header_param(&params, "alg")?;
		let certificate_chain : Vec<String> = parse_required_header_param(&params, "x5c")?;
		Ok(Self{algorithm, certificate_chain, params})
	}

	/// Get an arbitrary header parameter.
	pub fn get(&self, key: &str) -> Option<&JsonValue> {
		get_header_param(&self.params, key)
	}
}

/// Get a parameter from the header.
pub fn get_header_param<'a>(header: &'a JsonObject, key: &str) -> Option<&'a JsonValue> {
	header.get(key)
}

/// Get a required parameter from the header.
///
/// This is almost identical to [`get_header_param`], except that this function returns a properly formatted error instead of an empty optional.
pub fn get_required_header_param<'a>(header: &'a JsonObject, key: &str) -> Result<&'a JsonValue> {
	get_header_param(header, key).ok_or_else(|| Error::missing_header_param(key))
}

/// Get and deserialize a required parameter from the header.
///
/// This function delegates to [`get_required_header_param`] and deserializes the result into the desired type.
/// Deserialization errors are reported as [`ErrorKind::MalformedHeader`](crate::ErrorKind::MalformedHeader).
pub fn parse_required_header_param<T: serde::de::DeserializeOwned>(header: &JsonObject, key: &str) -> Result<T> {
	let value = get_required_header_param(header, key)?;
	T::deserialize(value).map_err(|_| Error::invalid_header_param(key))
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{json_object, ErrorKind};
	use assert2::assert;

	#[test]
	fn test_from_params() {
		let header = JoseHeader::from_params(json_object!{
			"alg": "ES256",
			"x5c": ["bGVhZg==", "aW50ZXJtZWRpYXRl"],
			"kid": "key-1",
		}).unwrap();

		assert!(header.algorithm == "ES256");
		assert!(header.certificate_chain == ["bGVhZg==", "aW50ZXJtZWRpYXRl"]);
		assert!(header.get("kid") == Some(&JsonValue::from("key-1")));
	}

	#[test]
	fn test_empty_chain_is_not_a_header_error() {
		let header = JoseHeader::from_params(json_object!{"alg": "ES256", "x5c": []}).unwrap();
		assert!(header.certificate_chain.is_empty());
	}

	#[test]
	fn test_missing_params() {
		let error = JoseHeader::from_params(json_object!{"x5c": []}).unwrap_err();
		assert!(error.kind() == ErrorKind::MalformedHeader);
		assert!(error.message() == "missing required header parameter: alg");

		let error = JoseHeader::from_params(json_object!{"alg": "ES256"}).unwrap_err();
		assert!(error.kind() == ErrorKind::MalformedHeader);
		assert!(error.message() == "missing required header parameter: x5c");
	}

	#[test]
	fn test_wrong_param_types() {
		let error = JoseHeader::from_params(json_object!{"alg": 7, "x5c": []}).unwrap_err();
		assert!(error.kind() == ErrorKind::MalformedHeader);
		assert!(error.message() == "invalid type for header parameter: alg");

		let error = JoseHeader::from_params(json_object!{"alg": "ES256", "x5c": "bGVhZg=="}).unwrap_err();
		assert!(error.message() == "invalid type for header parameter: x5c");

		let error = JoseHeader::from_params(json_object!{"alg": "ES256", "x5c": [1, 2]}).unwrap_err();
		assert!(error.message() == "invalid type for header parameter: x5c");
	}
}
