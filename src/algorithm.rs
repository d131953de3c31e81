//! The closed set of signature algorithms and the allow-list checked against the `alg` header parameter.

use serde_derive::Deserialize;

use crate::{Error, Result};

/// A JWS signature algorithm this crate can verify.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize)]
pub enum Algorithm {
	/// ECDSA using P-256 and SHA-256.
	#[serde(rename = "ES256")]
	Es256,

	/// ECDSA using P-384 and SHA-384.
	#[serde(rename = "ES384")]
	Es384,
}

impl Algorithm {
	/// The JOSE identifier of the algorithm.
	pub fn name(self) -> &'static str {
		match self {
			Algorithm::Es256 => "ES256",
			Algorithm::Es384 => "ES384",
		}
	}

	/// Look up an algorithm by its exact, case-sensitive JOSE identifier.
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"ES256" => Some(Algorithm::Es256),
			"ES384" => Some(Algorithm::Es384),
			_       => None,
		}
	}
}

impl std::fmt::Display for Algorithm {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// The algorithms a verifier accepts.
///
/// The list is fixed when the verifier is constructed.
/// The `alg` header parameter is only ever checked for membership, it never selects anything outside the list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AllowList {
	algorithms: Vec<Algorithm>,
}

impl AllowList {
	/// Create an allow-list from a set of algorithms.
	///
	/// Returns [`None`] if the list is empty.
	pub fn new(algorithms: impl IntoIterator<Item = Algorithm>) -> Option<Self> {
		let mut list = Vec::new();
		for algorithm in algorithms {
			if !list.contains(&algorithm) {
				list.push(algorithm);
			}
		}

		if list.is_empty() {
			None
		} else {
			Some(Self{algorithms: list})
		}
	}

	/// An allow-list containing only ES256.
	pub fn es256() -> Self {
		Self{algorithms: vec![Algorithm::Es256]}
	}

	pub fn algorithms(&self) -> &[Algorithm] {
		&self.algorithms
	}

	pub fn contains(&self, algorithm: Algorithm) -> bool {
		self.algorithms.contains(&algorithm)
	}

	/// Check a declared `alg` value against the allow-list.
	pub fn accept(&self, declared: &str) -> Result<Algorithm> {
		match Algorithm::from_name(declared) {
			Some(algorithm) if self.contains(algorithm) => Ok(algorithm),
			_ => Err(Error::unsupported_algorithm(format!("expected {}, got {:?}", self, declared))),
		}
	}
}

impl Default for AllowList {
	fn default() -> Self {
		Self::es256()
	}
}

impl std::fmt::Display for AllowList {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		for (i, algorithm) in self.algorithms.iter().enumerate() {
			if i > 0 {
				f.write_str(" or ")?;
			}
			write!(f, "{}", algorithm)?;
		}
		Ok(())
	}
}
