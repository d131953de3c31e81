//! This library verifies JSON Web Signature messages signed with an `x5c` certificate chain.
//!
//! A message is accepted only if:
//!   - it is a well formed JWS Compact Serialization message,
//!   - its `alg` header parameter is in a fixed allow-list,
//!   - the certificate chain in the `x5c` header parameter leads to a pinned root certificate,
//!   - the signature verifies with the public key of the leaf certificate.
//!
//! Only then is the payload decoded and returned, as raw bytes.
//!
//! The [`X5cVerifier`] in the [`x5c`] module does all of the above.
//! It plugs into [`compact::decode_and_verify`] through the [`Verifier`] trait.
//! Root certificates are loaded once into a [`TrustedRootSet`], either directly or through a [`VerifierConfig`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use jws_x5c::{TrustedRootSet, X5cVerifier};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let roots = TrustedRootSet::from_files(["AppleRootCA-G3.pem"])?;
//! let verifier = X5cVerifier::new(Arc::new(roots));
//!
//! # let token = "";
//! let payload = verifier.verify_token(token)?;
//! # Ok(())
//! # }
//! ```

pub mod algorithm;
pub mod certificate;
pub mod chain;
pub mod compact;
pub mod config;
pub mod ecdsa;
pub mod error;
pub mod header;
pub mod trust;
pub mod x5c;

pub use serde_json::Value as JsonValue;
pub use crate::algorithm::{Algorithm, AllowList};
pub use crate::certificate::Certificate;
pub use crate::chain::{CertificateChain, ValidationOptions, VerifiedChain};
pub use crate::compact::Stage;
pub use crate::config::VerifierConfig;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::header::JoseHeader;
pub use crate::trust::{LoadError, TrustedRootSet};
pub use crate::x5c::X5cVerifier;

#[doc(hidden)]
pub use serde_json;

/// A JSON object.
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A verifier for JWS messages.
pub trait Verifier {
	/// Verify the signature of a JWS message.
	///
	/// This function needs access to the decoded message header in order to determine how to verify the message.
	/// It also needs access to the raw encoded parts, since the signature is computed over those.
	///
	/// If the signature is invalid, the function should return an [`ErrorKind::SignatureInvalid`] error.
	/// It may also report any of the other error kinds.
	///
	/// # Args:
	///   - header:            The decoded protected header.
	///   - encoded_header:    The raw encoded header, needed to compute the signing input.
	///   - encoded_payload:   The raw encoded payload, needed to compute the signing input.
	///   - encoded_signature: The still base64-url encoded signature.
	fn verify(
		&self,
		header            : &JoseHeader,
		encoded_header    : &[u8],
		encoded_payload   : &[u8],
		encoded_signature : &[u8],
	) -> Result<()>;
}

/// Create a [`JsonObject`] using JSON syntax.
#[macro_export]
macro_rules! json_object {
	($($tokens:tt)*) => {
		match $crate::serde_json::json!({$($tokens)*}) {
			$crate::JsonValue::Object(object) => object,
			_ => unreachable!("a JSON object literal is always an object"),
		}
	};
}
