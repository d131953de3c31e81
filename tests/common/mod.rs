//! Test certificate chains and token construction.

#![allow(dead_code)]

use std::sync::Arc;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use jws_x5c::{TrustedRootSet, X5cVerifier};
use p256::ecdsa::signature::Signer;
use p256::pkcs8::DecodePrivateKey;
use rcgen::{BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair, KeyUsagePurpose};

/// A certificate with its private key.
pub struct Credential {
	pub cert : rcgen::Certificate,
	pub key  : KeyPair,
}

/// Parameters for a certificate authority.
pub fn ca_params(common_name: &str) -> CertificateParams {
	let mut params = leaf_params(common_name);
	params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
	params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
	params
}

/// Parameters for an end-entity certificate.
pub fn leaf_params(common_name: &str) -> CertificateParams {
	let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
	params.distinguished_name = DistinguishedName::new();
	params.distinguished_name.push(DnType::CommonName, common_name);
	params
}

pub fn p256_key() -> KeyPair {
	KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).unwrap()
}

pub fn p384_key() -> KeyPair {
	KeyPair::generate_for(&rcgen::PKCS_ECDSA_P384_SHA384).unwrap()
}

impl Credential {
	pub fn self_signed(params: CertificateParams, key: KeyPair) -> Self {
		let cert = params.self_signed(&key).unwrap();
		Self{cert, key}
	}

	/// A self-signed P-256 root certificate authority.
	pub fn root(common_name: &str) -> Self {
		Self::self_signed(ca_params(common_name), p256_key())
	}

	/// Issue a certificate signed by this credential.
	pub fn issue(&self, params: CertificateParams, key: KeyPair) -> Self {
		let cert = params.signed_by(&key, &self.cert, &self.key).unwrap();
		Self{cert, key}
	}

	pub fn der(&self) -> Vec<u8> {
		self.cert.der().to_vec()
	}

	/// The certificate as an `x5c` entry.
	pub fn x5c(&self) -> String {
		STANDARD.encode(self.cert.der())
	}

	/// Sign with ECDSA P-256 and SHA-256, DER encoded.
	pub fn sign_es256(&self, data: &[u8]) -> Vec<u8> {
		let key = p256::ecdsa::SigningKey::from_pkcs8_der(&self.key.serialize_der()).unwrap();
		let signature: p256::ecdsa::Signature = key.sign(data);
		signature.to_der().as_bytes().to_vec()
	}

	/// Sign with ECDSA P-384 and SHA-384, DER encoded.
	pub fn sign_es384(&self, data: &[u8]) -> Vec<u8> {
		let key = p384::ecdsa::SigningKey::from_pkcs8_der(&self.key.serialize_der()).unwrap();
		let signature: p384::ecdsa::Signature = key.sign(data);
		signature.to_der().as_bytes().to_vec()
	}
}

/// Encode a header and payload and sign the result.
pub fn encode_token(header: &serde_json::Value, payload: &[u8], sign: impl FnOnce(&[u8]) -> Vec<u8>) -> String {
	let header  = URL_SAFE_NO_PAD.encode(serde_json::to_vec(header).unwrap());
	let payload = URL_SAFE_NO_PAD.encode(payload);
	let signing_input = format!("{}.{}", header, payload);
	let signature = URL_SAFE_NO_PAD.encode(sign(signing_input.as_bytes()));
	format!("{}.{}", signing_input, signature)
}

/// Split a token into its three encoded parts.
pub fn split(token: &str) -> (String, String, String) {
	let parts: Vec<&str> = token.split('.').collect();
	assert_eq!(parts.len(), 3);
	(parts[0].to_string(), parts[1].to_string(), parts[2].to_string())
}

/// A root -> intermediate -> leaf chain, all P-256.
pub struct TestChain {
	pub root         : Credential,
	pub intermediate : Credential,
	pub leaf         : Credential,
}

impl TestChain {
	pub fn new() -> Self {
		let root         = Credential::root("Test Root CA");
		let intermediate = root.issue(ca_params("Test Intermediate CA"), p256_key());
		let leaf         = intermediate.issue(leaf_params("Test Signing Leaf"), p256_key());
		Self{root, intermediate, leaf}
	}

	pub fn roots(&self) -> Arc<TrustedRootSet> {
		Arc::new(TrustedRootSet::from_der([self.root.der()]).unwrap())
	}

	pub fn verifier(&self) -> X5cVerifier {
		X5cVerifier::new(self.roots())
	}

	/// The `x5c` header parameter: leaf first, then the intermediate.
	pub fn x5c(&self) -> Vec<String> {
		vec![self.leaf.x5c(), self.intermediate.x5c()]
	}

	/// A valid ES256 token for the payload.
	pub fn token(&self, payload: &[u8]) -> String {
		let header = serde_json::json!({"alg": "ES256", "x5c": self.x5c()});
		encode_token(&header, payload, |input| self.leaf.sign_es256(input))
	}
}
