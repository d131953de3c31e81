//! Owned X.509 certificates.

use p256::pkcs8::DecodePublicKey;
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use sha2::{Digest, Sha256, Sha384, Sha512};
use x509_parser::prelude::*;

use crate::{Error, Result};

const OID_ECDSA_WITH_SHA256 : &str = "1.2.840.10045.4.3.2";
const OID_ECDSA_WITH_SHA384 : &str = "1.2.840.10045.4.3.3";
const OID_ECDSA_WITH_SHA512 : &str = "1.2.840.10045.4.3.4";

/// A parsed X.509 certificate.
///
/// Holds the parts of the certificate needed for path validation,
/// so it does not borrow from the DER it was parsed from.
#[derive(Clone, Debug)]
pub struct Certificate {
	der                     : Vec<u8>,
	subject                 : String,
	subject_raw             : Vec<u8>,
	issuer_raw              : Vec<u8>,
	public_key_der          : Vec<u8>,
	tbs_der                 : Vec<u8>,
	signature_algorithm     : String,
	tbs_signature_algorithm : String,
	signature               : Vec<u8>,
	not_before              : i64,
	not_after               : i64,
	is_ca                   : bool,
	path_len_constraint     : Option<u32>,
}

impl Certificate {
	/// Parse a DER encoded certificate.
	///
	/// The input must contain exactly one certificate, trailing data is rejected.
	pub fn from_der(der: &[u8]) -> Result<Self> {
		let (rest, cert) = X509Certificate::from_der(der)
			.map_err(|e| Error::invalid_certificate(format!("failed to parse certificate: {}", e)))?;
		if !rest.is_empty() {
			return Err(Error::invalid_certificate("trailing data after certificate"));
		}

		let basic_constraints = cert.basic_constraints()
			.map_err(|e| Error::invalid_certificate(format!("invalid basic constraints: {}", e)))?;
		let (is_ca, path_len_constraint) = match basic_constraints {
			Some(ext) => (ext.value.ca, ext.value.path_len_constraint),
			None      => (false, None),
		};

		Ok(Self {
			der                     : der.to_vec(),
			subject                 : cert.subject().to_string(),
			subject_raw             : cert.subject().as_raw().to_vec(),
			issuer_raw              : cert.issuer().as_raw().to_vec(),
			public_key_der          : cert.public_key().raw.to_vec(),
			tbs_der                 : cert.tbs_certificate.as_ref().to_vec(),
			signature_algorithm     : cert.signature_algorithm.algorithm.to_id_string(),
			tbs_signature_algorithm : cert.tbs_certificate.signature.algorithm.to_id_string(),
			signature               : cert.signature_value.data.to_vec(),
			not_before              : cert.validity().not_before.timestamp(),
			not_after               : cert.validity().not_after.timestamp(),
			is_ca,
			path_len_constraint,
		})
	}

	/// The DER encoding of the certificate.
	pub fn der(&self) -> &[u8] {
		&self.der
	}

	/// The subject distinguished name, formatted for humans.
	pub fn subject(&self) -> &str {
		&self.subject
	}

	/// The DER encoded SubjectPublicKeyInfo.
	pub fn public_key_der(&self) -> &[u8] {
		&self.public_key_der
	}

	/// The not-before and not-after times as unix timestamps.
	pub fn validity(&self) -> (i64, i64) {
		(self.not_before, self.not_after)
	}

	/// Check if the validity period covers the given unix timestamp.
	pub fn is_valid_at(&self, time: i64) -> bool {
		self.not_before <= time && time <= self.not_after
	}

	/// Check if the basic constraints mark this certificate as a certificate authority.
	pub fn is_ca(&self) -> bool {
		self.is_ca
	}

	pub fn path_len_constraint(&self) -> Option<u32> {
		self.path_len_constraint
	}

	/// Check if the issuer name of this certificate matches the subject name of `issuer`.
	pub fn names_issuer(&self, issuer: &Certificate) -> bool {
		self.issuer_raw == issuer.subject_raw
	}

	/// Check if `issuer` produced the signature on this certificate.
	pub fn is_signed_by(&self, issuer: &Certificate) -> bool {
		if self.signature_algorithm != self.tbs_signature_algorithm {
			return false;
		}

		match self.signature_algorithm.as_str() {
			OID_ECDSA_WITH_SHA256 => verify_ecdsa_prehash(&issuer.public_key_der, &Sha256::digest(&self.tbs_der), &self.signature),
			OID_ECDSA_WITH_SHA384 => verify_ecdsa_prehash(&issuer.public_key_der, &Sha384::digest(&self.tbs_der), &self.signature),
			OID_ECDSA_WITH_SHA512 => verify_ecdsa_prehash(&issuer.public_key_der, &Sha512::digest(&self.tbs_der), &self.signature),
			_                     => false,
		}
	}
}

impl PartialEq for Certificate {
	fn eq(&self, other: &Self) -> bool {
		self.der == other.der
	}
}

impl Eq for Certificate {}

/// Verify a DER encoded ECDSA signature over a digest with a P-256 or P-384 public key.
fn verify_ecdsa_prehash(public_key_der: &[u8], digest: &[u8], signature: &[u8]) -> bool {
	if let Ok(key) = p256::ecdsa::VerifyingKey::from_public_key_der(public_key_der) {
		return match p256::ecdsa::Signature::from_der(signature) {
			Ok(signature) => key.verify_prehash(digest, &signature).is_ok(),
			Err(_)        => false,
		};
	}

	if let Ok(key) = p384::ecdsa::VerifyingKey::from_public_key_der(public_key_der) {
		return match p384::ecdsa::Signature::from_der(signature) {
			Ok(signature) => key.verify_prehash(digest, &signature).is_ok(),
			Err(_)        => false,
		};
	}

	false
}
