//! JWS Compact Serialization implementation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::{Error, JoseHeader, JsonObject, Result, Verifier};

/// The stages a message passes through while being verified.
///
/// Stages are strictly ordered: a message either reaches [`Stage::PayloadDecoded`],
/// or it is rejected with an error whose [`ErrorKind::stage`](crate::ErrorKind::stage) is the last stage it reached.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Stage {
	Start,
	HeaderParsed,
	AlgorithmAccepted,
	ChainValidated,
	SignatureVerified,
	PayloadDecoded,
}

/// Split the parts of a JWS Compact Serialization message.
///
/// A JWS Compact Serialization message contains three base64-url encoded parts separated by period '.' characters:
///   - header
///   - payload
///   - signature
///
/// This function splits a byte slice into these three parts without decoding them.
pub fn split_encoded_parts(data: &[u8]) -> Result<CompactSerializedParts<'_>> {
	// Split data into parts.
	let mut parts = data.splitn(4, |&c| c == b'.');

	let header    = parts.next().ok_or_else(|| Error::malformed_token("encoded message does not contain a header"))?;
	let payload   = parts.next().ok_or_else(|| Error::malformed_token("encoded message does not contain a payload"))?;
	let signature = parts.next().ok_or_else(|| Error::malformed_token("encoded message does not contain a signature"))?;

	// Make sure there are no additional message parts in the input.
	if parts.next().is_some() {
		return Err(Error::malformed_token("encoded message contains an additional field after the signature"));
	}

	if header.is_empty() || payload.is_empty() || signature.is_empty() {
		return Err(Error::malformed_token("encoded message contains an empty part"));
	}

	Ok(CompactSerializedParts{header, payload, signature})
}

/// Decode and verify a JWS Compact Serialization message.
///
/// The payload is only decoded and returned if the verifier accepts the message.
pub fn decode_and_verify(data: &[u8], verifier: &impl Verifier) -> Result<Vec<u8>> {
	let parts = split_encoded_parts(data)?;
	let header = parts.decode_header()?;
	tracing::trace!(stage = ?Stage::HeaderParsed, alg = %header.algorithm, chain_len = header.certificate_chain.len(), "parsed header");

	verifier.verify(&header, parts.header, parts.payload, parts.signature)?;
	tracing::trace!(stage = ?Stage::SignatureVerified, "signature verified");

	let payload = parts.decode_payload()?;
	tracing::trace!(stage = ?Stage::PayloadDecoded, payload_len = payload.len(), "decoded payload");
	Ok(payload)
}

/// The individual (still encoded) parts of a JWS Compact Serialized message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CompactSerializedParts<'a> {
	pub header:    &'a [u8],
	pub payload:   &'a [u8],
	pub signature: &'a [u8],
}

impl<'a> CompactSerializedParts<'a> {
	/// Decode the header part.
	///
	/// The header must be a base64-url encoded JSON object with at least the `alg` and `x5c` parameters.
	pub fn decode_header(&self) -> Result<JoseHeader> {
		let header = URL_SAFE_NO_PAD.decode(self.header)
			.map_err(|_| Error::malformed_token("invalid header encoding"))?;
		let header: JsonObject = serde_json::from_slice(&header)
			.map_err(|_| Error::malformed_token("invalid header JSON"))?;
		JoseHeader::from_params(header)
	}

	/// Decode the payload part.
	///
	/// Only call this on a message with a verified signature.
	pub fn decode_payload(&self) -> Result<Vec<u8>> {
		URL_SAFE_NO_PAD.decode(self.payload)
			.map_err(|_| Error::payload_decode_error("invalid payload encoding"))
	}
}
