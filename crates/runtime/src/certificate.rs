//! PEM client identity for certificate-based login.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to load a certificate/key pair.
#[derive(Debug, Error)]
pub enum CertificateError {
	#[error("failed to read {}: {source}", path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("malformed PEM in {}: {source}", path.display())]
	Malformed {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("no certificate found in {}", path.display())]
	NoCertificate { path: PathBuf },

	#[error("no private key found in {}", path.display())]
	NoPrivateKey { path: PathBuf },
}

/// Certificate chain plus private key, kept as one PEM bundle.
#[derive(Clone)]
pub struct ClientCertificate {
	cert_path: PathBuf,
	pem: Vec<u8>,
}

impl std::fmt::Debug for ClientCertificate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ClientCertificate").field("cert_path", &self.cert_path).finish_non_exhaustive()
	}
}

impl ClientCertificate {
	/// Loads a certificate from `cert_path` and its key from `key_path`.
	///
	/// Without a key path the certificate file must also hold the key.
	pub fn load(cert_path: &Path, key_path: Option<&Path>) -> Result<Self, CertificateError> {
		let cert_pem = read(cert_path)?;
		match rustls_pemfile::certs(&mut cert_pem.as_slice()).next() {
			None => {
				return Err(CertificateError::NoCertificate {
					path: cert_path.to_path_buf(),
				});
			}
			Some(Err(source)) => {
				return Err(CertificateError::Malformed {
					path: cert_path.to_path_buf(),
					source,
				});
			}
			Some(Ok(_)) => {}
		}

		let (key_path, key_pem) = match key_path {
			Some(path) if path != cert_path => (path, read(path)?),
			_ => (cert_path, cert_pem.clone()),
		};
		match rustls_pemfile::private_key(&mut key_pem.as_slice()) {
			Ok(Some(_)) => {}
			Ok(None) => {
				return Err(CertificateError::NoPrivateKey {
					path: key_path.to_path_buf(),
				});
			}
			Err(source) => {
				return Err(CertificateError::Malformed {
					path: key_path.to_path_buf(),
					source,
				});
			}
		}

		let mut pem = cert_pem;
		if key_path != cert_path {
			if !pem.ends_with(b"\n") {
				pem.push(b'\n');
			}
			pem.extend_from_slice(&key_pem);
		}

		Ok(Self {
			cert_path: cert_path.to_path_buf(),
			pem,
		})
	}

	/// Path the certificate was loaded from.
	pub fn cert_path(&self) -> &Path {
		&self.cert_path
	}

	/// Combined certificate + key PEM bundle.
	pub fn pem(&self) -> &[u8] {
		&self.pem
	}
}

fn read(path: &Path) -> Result<Vec<u8>, CertificateError> {
	fs::read(path).map_err(|source| CertificateError::Read {
		path: path.to_path_buf(),
		source,
	})
}
