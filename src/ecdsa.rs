//! ECDSA signature verification using [RustCrypto](https://github.com/RustCrypto).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::pkcs8::DecodePublicKey;
use sha2::{Digest, Sha256, Sha384};

use crate::algorithm::Algorithm;
use crate::certificate::Certificate;
use crate::{Error, Result};

/// Verify the signature of a JWS Compact Serialization message with the public key of a leaf certificate.
///
/// The signature is computed over the still encoded header and payload, exactly as they appeared in the message.
/// A signature that is not valid DER and a signature that does not match are reported as the same error.
pub fn verify_signature(algorithm: Algorithm, leaf: &Certificate, encoded_header: &[u8], encoded_payload: &[u8], encoded_signature: &[u8]) -> Result<()> {
	let signature = URL_SAFE_NO_PAD.decode(encoded_signature)
		.map_err(|_| Error::invalid_signature_encoding("invalid signature encoding"))?;

	match algorithm {
		Algorithm::Es256 => {
			let key = p256::ecdsa::VerifyingKey::from_public_key_der(leaf.public_key_der())
				.map_err(|_| Error::invalid_certificate("leaf certificate does not contain a P-256 public key"))?;
			let digest = compute_digest(encoded_header, encoded_payload, Sha256::new());
			let signature = p256::ecdsa::Signature::from_der(&signature)
				.map_err(|_| Error::signature_invalid("signature verification failed"))?;
			key.verify_prehash(&digest, &signature)
				.map_err(|_| Error::signature_invalid("signature verification failed"))
		},
		Algorithm::Es384 => {
			let key = p384::ecdsa::VerifyingKey::from_public_key_der(leaf.public_key_der())
				.map_err(|_| Error::invalid_certificate("leaf certificate does not contain a P-384 public key"))?;
			let digest = compute_digest(encoded_header, encoded_payload, Sha384::new());
			let signature = p384::ecdsa::Signature::from_der(&signature)
				.map_err(|_| Error::signature_invalid("signature verification failed"))?;
			key.verify_prehash(&digest, &signature)
				.map_err(|_| Error::signature_invalid("signature verification failed"))
		},
	}
}

/// Feed the encoded header and payload to a hash function in the proper format.
fn feed_digest(encoded_header: &[u8], encoded_payload: &[u8], digest: &mut impl Digest) {
	digest.update(encoded_header);
	digest.update(b".");
	digest.update(encoded_payload);
}

/// Compute the hash of the signing input.
fn compute_digest<D: Digest>(encoded_header: &[u8], encoded_payload: &[u8], mut digest: D) -> Vec<u8> {
	feed_digest(encoded_header, encoded_payload, &mut digest);
	digest.finalize().to_vec()
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::ErrorKind;
	use assert2::assert;
	use p256::ecdsa::signature::Signer;
	use p256::pkcs8::DecodePrivateKey;

	fn leaf() -> (Certificate, p256::ecdsa::SigningKey) {
		let certified = rcgen::generate_simple_self_signed(["leaf.example".to_string()]).unwrap();
		let key = p256::ecdsa::SigningKey::from_pkcs8_der(&certified.key_pair.serialize_der()).unwrap();
		(Certificate::from_der(certified.cert.der()).unwrap(), key)
	}

	fn sign(key: &p256::ecdsa::SigningKey, encoded_header: &str, encoded_payload: &str) -> String {
		let signature: p256::ecdsa::Signature = key.sign(format!("{}.{}", encoded_header, encoded_payload).as_bytes());
		URL_SAFE_NO_PAD.encode(signature.to_der().as_bytes())
	}

	#[test]
	fn test_signing_input_is_dot_separated() {
		let digest = compute_digest(b"header", b"payload", Sha256::new());
		assert!(digest == Sha256::digest(b"header.payload").to_vec());
	}

	#[test]
	fn test_verify_es256() {
		let (leaf, key) = leaf();
		let signature = sign(&key, "eyJhIjoxfQ", "eyJiIjoyfQ");

		assert!(let Ok(()) = verify_signature(Algorithm::Es256, &leaf, b"eyJhIjoxfQ", b"eyJiIjoyfQ", signature.as_bytes()));

		let error = verify_signature(Algorithm::Es256, &leaf, b"eyJhIjoxfQ", b"eyJiIjozfQ", signature.as_bytes()).unwrap_err();
		assert!(error.kind() == ErrorKind::SignatureInvalid);
	}

	#[test]
	fn test_malformed_and_wrong_signatures_look_the_same() {
		let (leaf, key) = leaf();
		let (_, other_key) = self::leaf();

		let wrong     = sign(&other_key, "eyJhIjoxfQ", "eyJiIjoyfQ");
		let malformed = URL_SAFE_NO_PAD.encode(b"not DER at all");
		let raw       = {
			let signature: p256::ecdsa::Signature = key.sign(b"eyJhIjoxfQ.eyJiIjoyfQ");
			URL_SAFE_NO_PAD.encode(signature.to_bytes())
		};

		let wrong     = verify_signature(Algorithm::Es256, &leaf, b"eyJhIjoxfQ", b"eyJiIjoyfQ", wrong.as_bytes()).unwrap_err();
		let malformed = verify_signature(Algorithm::Es256, &leaf, b"eyJhIjoxfQ", b"eyJiIjoyfQ", malformed.as_bytes()).unwrap_err();
		let raw       = verify_signature(Algorithm::Es256, &leaf, b"eyJhIjoxfQ", b"eyJiIjoyfQ", raw.as_bytes()).unwrap_err();

		assert!(wrong == malformed);
		assert!(wrong == raw);
		assert!(wrong.kind() == ErrorKind::SignatureInvalid);
	}

	#[test]
	fn test_signature_encoding() {
		let (leaf, _) = leaf();
		let error = verify_signature(Algorithm::Es256, &leaf, b"eyJhIjoxfQ", b"eyJiIjoyfQ", b"not+base64url/").unwrap_err();
		assert!(error.kind() == ErrorKind::InvalidSignatureEncoding);

		let error = verify_signature(Algorithm::Es256, &leaf, b"eyJhIjoxfQ", b"eyJiIjoyfQ", b"AAAA==").unwrap_err();
		assert!(error.kind() == ErrorKind::InvalidSignatureEncoding);
	}

	#[test]
	fn test_key_must_match_algorithm() {
		let (leaf, key) = leaf();
		let signature = sign(&key, "eyJhIjoxfQ", "eyJiIjoyfQ");

		let error = verify_signature(Algorithm::Es384, &leaf, b"eyJhIjoxfQ", b"eyJiIjoyfQ", signature.as_bytes()).unwrap_err();
		assert!(error.kind() == ErrorKind::InvalidCertificate);
	}
}
