//! [`Verifier`] for messages signed by a certificate from an `x5c` chain that ends at a pinned root.

use std::sync::Arc;

use serde_derive::Deserialize;

use crate::algorithm::{Algorithm, AllowList};
use crate::chain::{CertificateChain, ValidationOptions, VerifiedChain};
use crate::compact::{self, Stage};
use crate::trust::TrustedRootSet;
use crate::{ecdsa, Error, JoseHeader, Result, Verifier};

/// Message verifier that trusts signatures made by the leaf of a valid `x5c` certificate chain.
///
/// The verifier checks, in order:
///   - the `alg` header parameter is in the allow-list,
///   - the `x5c` chain decodes and leads from the leaf to one of the trusted roots,
///   - the signature verifies with the public key of the leaf certificate.
///
/// The verifier holds no mutable state and can be shared between threads.
#[derive(Clone, Debug)]
pub struct X5cVerifier {
	roots      : Arc<TrustedRootSet>,
	algorithms : AllowList,
	options    : ValidationOptions,
}

/// The envelope some services wrap a compact JWS message in.
#[derive(Debug, Deserialize)]
struct SignedPayload {
	#[serde(rename = "signedPayload", default)]
	signed_payload: String,
}

impl X5cVerifier {
	/// Create a verifier that accepts ES256 signatures from chains ending at one of `roots`.
	pub fn new(roots: Arc<TrustedRootSet>) -> Self {
		Self {
			roots,
			algorithms : AllowList::default(),
			options    : ValidationOptions::default(),
		}
	}

	/// Replace the algorithm allow-list.
	pub fn with_algorithms(mut self, algorithms: AllowList) -> Self {
		self.algorithms = algorithms;
		self
	}

	/// Replace the certificate path validation options.
	pub fn with_options(mut self, options: ValidationOptions) -> Self {
		self.options = options;
		self
	}

	pub fn roots(&self) -> &TrustedRootSet {
		&self.roots
	}

	pub fn algorithms(&self) -> &AllowList {
		&self.algorithms
	}

	pub fn options(&self) -> &ValidationOptions {
		&self.options
	}

	/// Check the algorithm and certificate chain of a decoded header.
	///
	/// This runs every check except the signature itself.
	pub fn verify_chain(&self, header: &JoseHeader) -> Result<VerifiedChain> {
		self.verify_chain_inner(header).map(|(_, chain)| chain)
	}

	/// Verify a compact JWS message and return the decoded payload.
	pub fn verify_token(&self, token: &str) -> Result<Vec<u8>> {
		log_outcome(compact::decode_and_verify(token.as_bytes(), self))
	}

	/// Verify a compact JWS message wrapped in a `{"signedPayload": "..."}` envelope.
	pub fn verify_signed_payload(&self, envelope: &[u8]) -> Result<Vec<u8>> {
		log_outcome(self.verify_envelope(envelope))
	}

	fn verify_envelope(&self, envelope: &[u8]) -> Result<Vec<u8>> {
		let envelope: SignedPayload = serde_json::from_slice(envelope)
			.map_err(|e| Error::malformed_token(format!("invalid envelope: {}", e)))?;
		if envelope.signed_payload.is_empty() {
			return Err(Error::malformed_token("missing signedPayload"));
		}
		compact::decode_and_verify(envelope.signed_payload.as_bytes(), self)
	}

	fn verify_chain_inner(&self, header: &JoseHeader) -> Result<(Algorithm, VerifiedChain)> {
		let algorithm = self.algorithms.accept(&header.algorithm)?;
		tracing::trace!(stage = ?Stage::AlgorithmAccepted, alg = %algorithm, "accepted algorithm");

		let chain = CertificateChain::decode(&header.certificate_chain)?;
		let verified = chain.validate(&self.roots, &self.options)?;
		tracing::trace!(
			stage   = ?Stage::ChainValidated,
			leaf    = %verified.leaf().subject(),
			root    = %verified.root().subject(),
			issuers = verified.issuers().len(),
			"validated certificate chain"
		);

		Ok((algorithm, verified))
	}
}

/// Log the outcome of verifying a message.
fn log_outcome(result: Result<Vec<u8>>) -> Result<Vec<u8>> {
	match &result {
		Ok(payload) => tracing::debug!(payload_len = payload.len(), "accepted signed payload"),
		Err(error) => tracing::warn!(
			code   = error.kind().code(),
			stage  = ?error.kind().stage(),
			reason = %error.message(),
			"rejected signed payload"
		),
	}
	result
}

impl Verifier for X5cVerifier {
	fn verify(&self, header: &JoseHeader, encoded_header: &[u8], encoded_payload: &[u8], encoded_signature: &[u8]) -> Result<()> {
		let (algorithm, chain) = self.verify_chain_inner(header)?;
		ecdsa::verify_signature(algorithm, chain.leaf(), encoded_header, encoded_payload, encoded_signature)
	}
}
