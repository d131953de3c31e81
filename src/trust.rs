//! The set of pinned root certificates.

use std::path::{Path, PathBuf};

use x509_parser::error::PEMError;
use x509_parser::pem::Pem;

use crate::certificate::Certificate;
use crate::Error;

/// Failure to construct a [`TrustedRootSet`] or a verifier.
///
/// These errors happen before any token is verified, so they are kept apart from the verification [`Error`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	#[error("failed to read {}: {source}", .path.display())]
	Io {
		path   : PathBuf,
		source : std::io::Error,
	},

	#[error("invalid PEM data: {0}")]
	Pem(#[from] PEMError),

	#[error("invalid trusted root certificate #{index}: {source}")]
	InvalidRoot {
		index  : usize,
		source : Error,
	},

	#[error("no trusted root certificates provided")]
	NoRoots,

	#[error("invalid configuration: {0}")]
	Config(#[from] serde_json::Error),

	#[error("the algorithm allow-list is empty")]
	NoAlgorithms,
}

/// An immutable set of trusted root certificates.
///
/// Built once, before any verification takes place, and shared read-only afterwards.
#[derive(Clone, Debug)]
pub struct TrustedRootSet {
	roots: Vec<Certificate>,
}

impl TrustedRootSet {
	/// Create a root set from DER encoded certificates.
	pub fn from_der<I, D>(certificates: I) -> Result<Self, LoadError>
	where
		I: IntoIterator<Item = D>,
		D: AsRef<[u8]>,
	{
		let mut roots = Vec::new();
		for (index, der) in certificates.into_iter().enumerate() {
			let root = Certificate::from_der(der.as_ref()).map_err(|source| LoadError::InvalidRoot { index, source })?;
			if !roots.contains(&root) {
				roots.push(root);
			}
		}

		if roots.is_empty() {
			return Err(LoadError::NoRoots);
		}

		tracing::debug!(count = roots.len(), "loaded trusted root certificates");
		Ok(Self{roots})
	}

	/// Create a root set from a PEM bundle.
	///
	/// Blocks with a label other than `CERTIFICATE` are ignored.
	pub fn from_pem(data: &[u8]) -> Result<Self, LoadError> {
		Self::from_der(read_pem_certificates(data)?)
	}

	/// Load a root set from files.
	///
	/// Each file may hold a PEM bundle or a single DER encoded certificate.
	pub fn from_files<I, P>(paths: I) -> Result<Self, LoadError>
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		let mut certificates = Vec::new();
		for path in paths {
			let path = path.as_ref();
			let data = std::fs::read(path).map_err(|source| LoadError::Io { path: path.to_owned(), source })?;
			if looks_like_pem(&data) {
				certificates.extend(read_pem_certificates(&data)?);
			} else {
				certificates.push(data);
			}
		}
		Self::from_der(certificates)
	}

	/// Check if a certificate is a member of the set.
	pub fn contains(&self, certificate: &Certificate) -> bool {
		self.roots.contains(certificate)
	}

	pub fn iter(&self) -> impl Iterator<Item = &Certificate> {
		self.roots.iter()
	}

	pub fn len(&self) -> usize {
		self.roots.len()
	}

	/// Always false: a root set holds at least one certificate.
	pub fn is_empty(&self) -> bool {
		self.roots.is_empty()
	}
}

fn looks_like_pem(data: &[u8]) -> bool {
	let start = data.iter().position(|c| !c.is_ascii_whitespace()).unwrap_or(data.len());
	data[start..].starts_with(b"-----BEGIN")
}

fn read_pem_certificates(data: &[u8]) -> Result<Vec<Vec<u8>>, LoadError> {
	let mut certificates = Vec::new();
	for pem in Pem::iter_from_buffer(data) {
		let pem = pem?;
		if pem.label == "CERTIFICATE" {
			certificates.push(pem.contents);
		}
	}
	Ok(certificates)
}
