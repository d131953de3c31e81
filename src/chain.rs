//! Decoding and validation of `x5c` certificate chains.
//!
//! The first certificate of an `x5c` chain is the leaf that produced the signature.
//! The other certificates are treated as an unordered pool of candidate intermediates:
//! the validator searches for any path from the leaf through those intermediates to a [`TrustedRootSet`] member.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::certificate::Certificate;
use crate::trust::TrustedRootSet;
use crate::{Error, Result};

/// Options for certificate path validation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationOptions {
	/// Validate at this unix timestamp instead of the current time.
	pub at_time : Option<i64>,

	/// Maximum number of issuers above the leaf, including the root.
	pub max_depth : usize,
}

impl Default for ValidationOptions {
	fn default() -> Self {
		Self {
			at_time   : None,
			max_depth : 8,
		}
	}
}

impl ValidationOptions {
	/// The instant to validate certificates at.
	pub fn validation_time(&self) -> i64 {
		match self.at_time {
			Some(time) => time,
			None => SystemTime::now()
				.duration_since(UNIX_EPOCH)
				.map(|elapsed| elapsed.as_secs() as i64)
				.unwrap_or(0),
		}
	}
}

/// A decoded, but not yet validated, `x5c` certificate chain.
#[derive(Clone, Debug)]
pub struct CertificateChain {
	leaf          : Certificate,
	intermediates : Vec<Certificate>,
}

/// A certificate chain that was validated against a [`TrustedRootSet`].
///
/// Can only be obtained from [`CertificateChain::validate`].
#[derive(Clone, Debug)]
pub struct VerifiedChain {
	leaf    : Certificate,
	issuers : Vec<Certificate>,
}

/// Maximum number of certificate signatures checked while searching for a path.
const MAX_SIGNATURE_CHECKS: usize = 100;

/// Maximum number of certificates visited while searching for a path.
const MAX_SEARCH_STEPS: usize = 1000;

/// A certificate that needs an issuer while building a path.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
enum Subject {
	Leaf,
	Intermediate(usize),
}

/// Where to find an issuer while building a path.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
enum Issuer {
	Intermediate(usize),
	Root(usize),
}

impl CertificateChain {
	/// Decode the certificates of an `x5c` header parameter.
	///
	/// Entries are standard base64 (not base64url) encoded DER certificates.
	pub fn decode<S: AsRef<str>>(x5c: &[S]) -> Result<Self> {
		if x5c.is_empty() {
			return Err(Error::invalid_certificate("empty x5c chain"));
		}

		let mut certificates = Vec::with_capacity(x5c.len());
		for (index, encoded) in x5c.iter().enumerate() {
			let der = STANDARD.decode(encoded.as_ref())
				.map_err(|_| Error::invalid_certificate(format!("invalid base64 encoding for x5c certificate #{}", index)))?;
			let certificate = Certificate::from_der(&der)
				.map_err(|e| Error::invalid_certificate(format!("x5c certificate #{}: {}", index, e.message())))?;
			certificates.push(certificate);
		}

		let leaf = certificates.remove(0);
		Ok(Self{leaf, intermediates: certificates})
	}

	/// The certificate that produced the signature.
	pub fn leaf(&self) -> &Certificate {
		&self.leaf
	}

	/// The candidate intermediates, in the order they were presented.
	pub fn intermediates(&self) -> &[Certificate] {
		&self.intermediates
	}

	/// Find a path from the leaf to a trusted root.
	///
	/// Every issuer on the path must be a certificate authority, respect its path length constraint,
	/// be valid at the validation time and have signed the certificate below it.
	pub fn validate(&self, roots: &TrustedRootSet, options: &ValidationOptions) -> Result<VerifiedChain> {
		let time = options.validation_time();

		if !self.leaf.is_valid_at(time) {
			let (not_before, not_after) = self.leaf.validity();
			return Err(Error::untrusted_chain(format!(
				"leaf certificate is not valid at {} (valid from {} to {})", time, not_before, not_after
			)));
		}

		if roots.contains(&self.leaf) {
			return Ok(VerifiedChain{leaf: self.leaf.clone(), issuers: Vec::new()});
		}

		let roots: Vec<&Certificate> = roots.iter().collect();
		let mut search = PathSearch::new(self, &roots, time);
		let path = search.find_path(Subject::Leaf, options.max_depth, &mut Vec::new());

		let path = match path {
			Some(path) => path,
			None if search.exhausted => {
				return Err(Error::untrusted_chain(format!(
					"search limit reached before finding a path from {:?} to a trusted root",
					self.leaf.subject(),
				)));
			},
			None => return Err(Error::untrusted_chain(format!("no path from {:?} to a trusted root", self.leaf.subject()))),
		};

		let issuers = path.into_iter()
			.map(|issuer| match issuer {
				Issuer::Intermediate(i) => self.intermediates[i].clone(),
				Issuer::Root(i)         => roots[i].clone(),
			})
			.collect();

		Ok(VerifiedChain{leaf: self.leaf.clone(), issuers})
	}

	fn subject(&self, subject: Subject) -> &Certificate {
		match subject {
			Subject::Leaf            => &self.leaf,
			Subject::Intermediate(i) => &self.intermediates[i],
		}
	}
}

/// Depth-first search for a path from the leaf to a trusted root.
///
/// Signature results are cached per (subject, issuer) pair.
/// The search gives up after [`MAX_SIGNATURE_CHECKS`] signature checks or [`MAX_SEARCH_STEPS`] visited nodes,
/// so a pool of certificates that can all issue each other cannot make it explore every ordering.
struct PathSearch<'a> {
	chain            : &'a CertificateChain,
	roots            : &'a [&'a Certificate],
	time             : i64,
	signatures       : HashMap<(Subject, Issuer), bool>,
	signature_checks : usize,
	steps            : usize,
	exhausted        : bool,
}

impl<'a> PathSearch<'a> {
	fn new(chain: &'a CertificateChain, roots: &'a [&'a Certificate], time: i64) -> Self {
		Self {
			chain,
			roots,
			time,
			signatures       : HashMap::new(),
			signature_checks : 0,
			steps            : 0,
			exhausted        : false,
		}
	}

	/// Find the issuers of `current`, ending at a trusted root.
	///
	/// `used` holds the intermediates already on the path, in order.
	fn find_path(&mut self, current: Subject, depth_left: usize, used: &mut Vec<usize>) -> Option<Vec<Issuer>> {
		if depth_left == 0 || self.exhausted {
			return None;
		}

		if self.steps == MAX_SEARCH_STEPS {
			self.exhausted = true;
			return None;
		}
		self.steps += 1;

		for i in 0..self.roots.len() {
			if self.can_issue(current, Issuer::Root(i), used.len()) {
				return Some(vec![Issuer::Root(i)]);
			}
		}

		for i in 0..self.chain.intermediates.len() {
			if used.contains(&i) || !self.can_issue(current, Issuer::Intermediate(i), used.len()) {
				continue;
			}

			used.push(i);
			if let Some(mut rest) = self.find_path(Subject::Intermediate(i), depth_left - 1, used) {
				rest.insert(0, Issuer::Intermediate(i));
				return Some(rest);
			}
			used.pop();
		}

		None
	}

	/// Check if `issuer` can be the issuer of `subject` on a path with `below` intermediates under it.
	fn can_issue(&mut self, subject: Subject, issuer: Issuer, below: usize) -> bool {
		let chain = self.chain;
		let roots = self.roots;
		let child = chain.subject(subject);
		let issuer_cert = match issuer {
			Issuer::Intermediate(i) => &chain.intermediates[i],
			Issuer::Root(i)         => roots[i],
		};

		if !child.names_issuer(issuer_cert) || !issuer_cert.is_ca() || !issuer_cert.is_valid_at(self.time) {
			return false;
		}

		if let Some(max) = issuer_cert.path_len_constraint() {
			if below > max as usize {
				return false;
			}
		}

		if let Some(&valid) = self.signatures.get(&(subject, issuer)) {
			return valid;
		}

		if self.signature_checks == MAX_SIGNATURE_CHECKS {
			self.exhausted = true;
			return false;
		}
		self.signature_checks += 1;

		let valid = child.is_signed_by(issuer_cert);
		self.signatures.insert((subject, issuer), valid);
		valid
	}
}

impl VerifiedChain {
	/// The certificate that produced the signature.
	pub fn leaf(&self) -> &Certificate {
		&self.leaf
	}

	/// The issuers from the leaf up to and including the trusted root.
	///
	/// Empty if the leaf itself is a trusted root.
	pub fn issuers(&self) -> &[Certificate] {
		&self.issuers
	}

	/// The trusted root the chain ends at.
	pub fn root(&self) -> &Certificate {
		self.issuers.last().unwrap_or(&self.leaf)
	}
}
