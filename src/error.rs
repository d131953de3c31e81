//! Error types for this crate.

use std::fmt;

use crate::compact::Stage;

pub type Result<T> = std::result::Result<T, Error>;

/// The category of a verification failure.
///
/// The set of categories is closed: every stage of the verification pipeline reports exactly one of these.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
	/// Wrong segment count, non-decodable base64 or a header that is not a JSON object.
	MalformedToken,
	/// The header JSON is missing a required parameter or has one of the wrong type.
	MalformedHeader,
	/// The declared `alg` is not in the allow-list.
	UnsupportedAlgorithm,
	/// Empty, undecodable or unparsable `x5c` entries.
	InvalidCertificate,
	/// No path from the leaf certificate to a trusted root.
	UntrustedChain,
	/// The signature segment is not valid base64url.
	InvalidSignatureEncoding,
	/// The signature did not verify.
	SignatureInvalid,
	/// The payload segment is not valid base64url.
	PayloadDecodeError,
}

/// A verification failure with a category and a diagnostic reason.
///
/// The reason is meant for logs only, callers should branch on [`Error::kind`].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{kind}{}", reason_suffix(.message))]
pub struct Error {
	pub kind    : ErrorKind,
	pub message : String,
}

impl ErrorKind {
	/// Stable code for this category, suitable for metrics and logs.
	pub fn code(self) -> &'static str {
		match self {
			ErrorKind::MalformedToken           => "MALFORMED_TOKEN",
			ErrorKind::MalformedHeader          => "MALFORMED_HEADER",
			ErrorKind::UnsupportedAlgorithm     => "UNSUPPORTED_ALGORITHM",
			ErrorKind::InvalidCertificate       => "INVALID_CERTIFICATE",
			ErrorKind::UntrustedChain           => "UNTRUSTED_CHAIN",
			ErrorKind::InvalidSignatureEncoding => "INVALID_SIGNATURE_ENCODING",
			ErrorKind::SignatureInvalid         => "SIGNATURE_INVALID",
			ErrorKind::PayloadDecodeError       => "PAYLOAD_DECODE_ERROR",
		}
	}

	/// The last pipeline stage that was reached before the token was rejected.
	pub fn stage(self) -> Stage {
		match self {
			ErrorKind::MalformedToken           => Stage::Start,
			ErrorKind::MalformedHeader          => Stage::Start,
			ErrorKind::UnsupportedAlgorithm     => Stage::HeaderParsed,
			ErrorKind::InvalidCertificate       => Stage::AlgorithmAccepted,
			ErrorKind::UntrustedChain           => Stage::AlgorithmAccepted,
			ErrorKind::InvalidSignatureEncoding => Stage::ChainValidated,
			ErrorKind::SignatureInvalid         => Stage::ChainValidated,
			ErrorKind::PayloadDecodeError       => Stage::SignatureVerified,
		}
	}
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.code())
	}
}

impl Error {
	/// Create a new error with a kind and a reason.
	pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
		Self{kind, message: message.into()}
	}

	pub fn kind(&self) -> ErrorKind {
		self.kind
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn missing_header_param(name: impl AsRef<str>) -> Self {
		Self::malformed_header(format!("missing required header parameter: {}", name.as_ref()))
	}

	pub fn invalid_header_param(name: impl AsRef<str>) -> Self {
		Self::malformed_header(format!("invalid type for header parameter: {}", name.as_ref()))
	}
}

macro_rules! define_error_constructor {
	($name:ident, $kind:ident) => {
		impl Error {
			#[doc = concat!("Create a new [`ErrorKind::", stringify!($kind), "`] error.")]
			pub fn $name(message: impl Into<String>) -> Self {
				Self::new(ErrorKind::$kind, message)
			}
		}
	};
}

define_error_constructor!(malformed_token,            MalformedToken);
define_error_constructor!(malformed_header,           MalformedHeader);
define_error_constructor!(unsupported_algorithm,      UnsupportedAlgorithm);
define_error_constructor!(invalid_certificate,        InvalidCertificate);
define_error_constructor!(untrusted_chain,            UntrustedChain);
define_error_constructor!(invalid_signature_encoding, InvalidSignatureEncoding);
define_error_constructor!(signature_invalid,          SignatureInvalid);
define_error_constructor!(payload_decode_error,       PayloadDecodeError);

/// The `": reason"` suffix of a displayed error, empty without a reason.
fn reason_suffix(message: &str) -> String {
	if message.is_empty() {
		String::new()
	} else {
		format!(": {}", message)
	}
}
