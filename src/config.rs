//! Verifier configuration.
//!
//! A configuration file is a JSON document:
//!
//! ```json
//! {
//!   "trusted_roots": ["certs/AppleRootCA-G3.pem"],
//!   "algorithms": ["ES256"],
//!   "max_chain_depth": 8
//! }
//! ```
//!
//! Only `trusted_roots` is required.
//! Relative root paths are resolved against the directory of the configuration file when loaded with [`VerifierConfig::from_file`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_derive::Deserialize;

use crate::algorithm::{Algorithm, AllowList};
use crate::chain::ValidationOptions;
use crate::trust::{LoadError, TrustedRootSet};
use crate::x5c::X5cVerifier;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VerifierConfig {
	/// Files with trusted root certificates, in PEM or DER format.
	pub trusted_roots : Vec<PathBuf>,

	/// The accepted signature algorithms.
	#[serde(default = "default_algorithms")]
	pub algorithms : Vec<Algorithm>,

	/// Maximum number of issuers above the leaf certificate.
	#[serde(default = "default_max_chain_depth")]
	pub max_chain_depth : usize,
}

fn default_algorithms() -> Vec<Algorithm> {
	vec![Algorithm::Es256]
}

fn default_max_chain_depth() -> usize {
	ValidationOptions::default().max_depth
}

impl VerifierConfig {
	/// Parse a configuration from JSON.
	pub fn from_json(data: &[u8]) -> Result<Self, LoadError> {
		Ok(serde_json::from_slice(data)?)
	}

	/// Read a configuration file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
		let path = path.as_ref();
		let data = std::fs::read(path).map_err(|source| LoadError::Io { path: path.to_owned(), source })?;
		let mut config = Self::from_json(&data)?;

		if let Some(dir) = path.parent() {
			for root in &mut config.trusted_roots {
				if root.is_relative() {
					*root = dir.join(&*root);
				}
			}
		}

		Ok(config)
	}

	/// Load the trusted roots and create a verifier.
	pub fn build(&self) -> Result<X5cVerifier, LoadError> {
		let algorithms = AllowList::new(self.algorithms.iter().copied()).ok_or(LoadError::NoAlgorithms)?;
		let roots = TrustedRootSet::from_files(&self.trusted_roots)?;
		let options = ValidationOptions {
			max_depth: self.max_chain_depth,
			..ValidationOptions::default()
		};

		Ok(X5cVerifier::new(Arc::new(roots))
			.with_algorithms(algorithms)
			.with_options(options))
	}
}
