// Copyright (C) 2020-2026  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Resolution of the relying-party client certificate.
//!
//! The BankID service authenticates relying parties with mutual TLS, so every request must present
//! the RP certificate together with its private key.  The certificate is identified by its SHA-1
//! [`Thumbprint`] and searched for in an ordered list of [`CertificateSource`]s.
//!
//! Only certificates that are valid at the time of the search are considered; expired or not yet
//! valid certificates are skipped before the thumbprint is compared.  The first match with a private
//! key wins.  A match without a key fails the search only if no source holds the key.

use std::{
    cmp::Ordering,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use bherror::traits::{ErrorContext as _, ForeignError as _};
use openssl::{
    asn1::{Asn1Time, Asn1TimeRef},
    error::ErrorStack,
    hash::MessageDigest,
    pkcs12::Pkcs12,
    pkey::{PKey, Private},
    x509::{X509Ref, X509},
};
use serde::Deserialize;

use crate::{Error, Result};

/// Characters that are silently dropped when parsing a [`Thumbprint`].
///
/// Certificate managers display thumbprints with separators, and copying them frequently carries
/// along an invisible left-to-right mark or byte order mark.
const IGNORED_THUMBPRINT_CHARS: [char; 3] = [':', '\u{200E}', '\u{FEFF}'];

/// Length of a hex encoded SHA-1 digest.
const THUMBPRINT_LENGTH: usize = 40;

/// SHA-1 thumbprint of a DER encoded certificate, as upper-case hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Thumbprint(String);

impl Thumbprint {
    /// Computes the thumbprint of the given certificate.
    pub fn of(certificate: &X509Ref) -> std::result::Result<Self, ErrorStack> {
        let digest = certificate.digest(MessageDigest::sha1())?;
        Ok(Self(hex::encode_upper(digest)))
    }

    /// The thumbprint as upper-case hex.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Thumbprint {
    type Err = bherror::Error<Error>;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && !IGNORED_THUMBPRINT_CHARS.contains(c))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if normalized.len() != THUMBPRINT_LENGTH
            || !normalized.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(bherror::Error::root(Error::InvalidThumbprint(s.to_owned())));
        }

        Ok(Self(normalized))
    }
}

impl TryFrom<String> for Thumbprint {
    type Error = bherror::Error<Error>;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for Thumbprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A certificate as found in a [`CertificateSource`], with its private key if the source has it.
#[derive(Clone)]
pub struct StoredCertificate {
    certificate: X509,
    private_key: Option<PKey<Private>>,
}

impl StoredCertificate {
    /// Create a new [`StoredCertificate`].
    pub fn new(certificate: X509, private_key: Option<PKey<Private>>) -> Self {
        Self {
            certificate,
            private_key,
        }
    }

    /// The certificate.
    pub fn certificate(&self) -> &X509 {
        &self.certificate
    }
}

impl fmt::Debug for StoredCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCertificate")
            .field("thumbprint", &Thumbprint::of(&self.certificate).ok())
            .field("has_private_key", &self.private_key.is_some())
            .finish()
    }
}

/// A place certificates can be loaded from, e.g. a file or a directory.
pub trait CertificateSource {
    /// Human readable name, used in diagnostics.
    fn name(&self) -> String;

    /// Loads every certificate available in this source.
    fn load(&self) -> Result<Vec<StoredCertificate>>;
}

/// The certificate sources that can be configured.
#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CertificateStore {
    /// PEM file with one or more certificates, and an optional PEM private key file.
    PemFile {
        /// Path of the certificate file.
        certificate: PathBuf,
        /// Path of the private key file.
        #[serde(default)]
        private_key: Option<PathBuf>,
    },
    /// PKCS#12 bundle holding the certificate, its private key and optionally CA certificates.
    Pkcs12File {
        /// Path of the bundle.
        path: PathBuf,
        /// Password protecting the bundle.
        password: String,
    },
    /// Directory of `*.pem` and `*.crt` files.
    ///
    /// A certificate file `<stem>.pem` or `<stem>.crt` is paired with the private key in
    /// `<stem>.key`, if such a file exists.
    Directory {
        /// Path of the directory.
        path: PathBuf,
    },
}

// Written by hand so the PKCS#12 password never ends up in logs.
impl fmt::Debug for CertificateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PemFile {
                certificate,
                private_key,
            } => f
                .debug_struct("PemFile")
                .field("certificate", certificate)
                .field("private_key", private_key)
                .finish(),
            Self::Pkcs12File { path, .. } => f
                .debug_struct("Pkcs12File")
                .field("path", path)
                .finish_non_exhaustive(),
            Self::Directory { path } => f.debug_struct("Directory").field("path", path).finish(),
        }
    }
}

impl CertificateSource for CertificateStore {
    fn name(&self) -> String {
        match self {
            Self::PemFile { certificate, .. } => format!("pem_file/{}", certificate.display()),
            Self::Pkcs12File { path, .. } => format!("pkcs12_file/{}", path.display()),
            Self::Directory { path } => format!("directory/{}", path.display()),
        }
    }

    fn load(&self) -> Result<Vec<StoredCertificate>> {
        let certificates = match self {
            Self::PemFile {
                certificate,
                private_key,
            } => load_pem_file(certificate, private_key.as_deref()),
            Self::Pkcs12File { path, password } => load_pkcs12_file(path, password),
            Self::Directory { path } => load_directory(path),
        };

        certificates.ctx(|| self.name())
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).foreign_err(|| Error::CertificateSource(path.display().to_string()))
}

fn load_pem_file(certificate: &Path, private_key: Option<&Path>) -> Result<Vec<StoredCertificate>> {
    let certificates = X509::stack_from_pem(&read_file(certificate)?)
        .foreign_err(|| Error::CertificateSource(certificate.display().to_string()))
        .ctx(|| "invalid PEM certificate")?;

    let private_key = private_key
        .map(|path| {
            PKey::private_key_from_pem(&read_file(path)?)
                .foreign_err(|| Error::CertificateSource(path.display().to_string()))
                .ctx(|| "invalid PEM private key")
        })
        .transpose()?;

    pair_with_key(certificates, private_key)
        .foreign_err(|| Error::CertificateSource(certificate.display().to_string()))
}

fn load_pkcs12_file(path: &Path, password: &str) -> Result<Vec<StoredCertificate>> {
    let bundle = Pkcs12::from_der(&read_file(path)?)
        .and_then(|pkcs12| pkcs12.parse2(password))
        .foreign_err(|| Error::CertificateSource(path.display().to_string()))
        .ctx(|| "unable to open the PKCS#12 bundle")?;

    let mut certificates = Vec::new();

    if let Some(certificate) = bundle.cert {
        certificates.push(StoredCertificate::new(certificate, bundle.pkey));
    }

    for certificate in bundle.ca.into_iter().flatten() {
        certificates.push(StoredCertificate::new(certificate, None));
    }

    Ok(certificates)
}

fn load_directory(path: &Path) -> Result<Vec<StoredCertificate>> {
    let mut files = std::fs::read_dir(path)
        .and_then(|entries| {
            entries
                .map(|entry| entry.map(|entry| entry.path()))
                .collect::<std::io::Result<Vec<_>>>()
        })
        .foreign_err(|| Error::CertificateSource(path.display().to_string()))?;

    // `read_dir` order is platform dependent
    files.sort();

    let mut certificates = Vec::new();

    for file in files {
        let is_certificate = file
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| matches!(extension, "pem" | "crt"));

        if !is_certificate || !file.is_file() {
            continue;
        }

        let key_file = file.with_extension("key");
        let key_file = key_file.is_file().then_some(key_file);

        certificates.extend(load_pem_file(&file, key_file.as_deref())?);
    }

    Ok(certificates)
}

/// Attaches `private_key` to the certificate carrying its public key.
///
/// Fails if a key is given but none of the certificates matches it.
fn pair_with_key(
    certificates: Vec<X509>,
    private_key: Option<PKey<Private>>,
) -> std::result::Result<Vec<StoredCertificate>, KeyMismatch> {
    let Some(private_key) = private_key else {
        return Ok(certificates
            .into_iter()
            .map(|certificate| StoredCertificate::new(certificate, None))
            .collect());
    };

    let mut is_paired = false;
    let mut paired = Vec::with_capacity(certificates.len());

    for certificate in certificates {
        let matches_key = certificate
            .public_key()
            .is_ok_and(|public_key| public_key.public_eq(&private_key));

        let key = (matches_key && !is_paired).then(|| private_key.clone());
        is_paired |= key.is_some();

        paired.push(StoredCertificate::new(certificate, key));
    }

    if !is_paired {
        return Err(KeyMismatch);
    }

    Ok(paired)
}

#[derive(Debug)]
struct KeyMismatch;

impl fmt::Display for KeyMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("the private key does not belong to any of the certificates")
    }
}

impl std::error::Error for KeyMismatch {}

/// Outcome of an unsuccessful certificate search: how many certificates each source held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    thumbprint: Thumbprint,
    sources: Vec<(String, usize)>,
}

impl SearchReport {
    fn new(thumbprint: Thumbprint) -> Self {
        Self {
            thumbprint,
            sources: Vec::new(),
        }
    }

    /// The thumbprint that was searched for.
    pub fn thumbprint(&self) -> &Thumbprint {
        &self.thumbprint
    }

    /// Names of the searched sources, in search order, with the number of certificates found in
    /// each.
    pub fn sources(&self) -> &[(String, usize)] {
        &self.sources
    }
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BankID certificate thumbprint \"{}\" was not found in the certificate stores.\n\n\
             Found certificates:",
            self.thumbprint
        )?;

        for (name, count) in &self.sources {
            write!(f, "\n{name}: {count}")?;
        }

        Ok(())
    }
}

/// The resolved RP certificate and its private key, used for every request.
#[derive(Clone)]
pub struct Credential {
    certificate: X509,
    private_key: PKey<Private>,
    thumbprint: Thumbprint,
}

impl Credential {
    /// Searches `sources` in order for a currently valid certificate with the given thumbprint.
    pub fn resolve<S: CertificateSource>(thumbprint: &Thumbprint, sources: &[S]) -> Result<Self> {
        let now = Asn1Time::days_from_now(0)
            .foreign_err(|| Error::InvalidConfiguration("unable to read the clock".to_owned()))?;

        Self::resolve_at(thumbprint, sources, &now)
    }

    /// Same as [`Credential::resolve`], with certificate validity checked at `now`.
    pub fn resolve_at<S: CertificateSource>(
        thumbprint: &Thumbprint,
        sources: &[S],
        now: &Asn1TimeRef,
    ) -> Result<Self> {
        let mut report = SearchReport::new(thumbprint.clone());
        // Source of the first match without a private key, reported if no later match has one
        let mut key_less_match = None;

        for source in sources {
            let certificates = source.load()?;
            report.sources.push((source.name(), certificates.len()));

            for StoredCertificate {
                certificate,
                private_key,
            } in certificates
            {
                let is_valid = is_time_valid(&certificate, now)
                    .foreign_err(|| Error::CertificateSource(source.name()))?;
                if !is_valid {
                    continue;
                }

                let candidate = Thumbprint::of(&certificate)
                    .foreign_err(|| Error::CertificateSource(source.name()))?;
                if &candidate != thumbprint {
                    continue;
                }

                let Some(private_key) = private_key else {
                    key_less_match.get_or_insert_with(|| source.name());
                    continue;
                };

                log::info!(
                    "Using BankID client certificate {} from {}",
                    thumbprint,
                    source.name()
                );

                return Ok(Self {
                    certificate,
                    private_key,
                    thumbprint: candidate,
                });
            }
        }

        if let Some(source_name) = key_less_match {
            return Err(
                bherror::Error::root(Error::MissingPrivateKey(thumbprint.clone())).ctx(source_name),
            );
        }

        Err(bherror::Error::root(Error::CertificateNotFound(report)))
    }

    /// The thumbprint of the certificate.
    pub fn thumbprint(&self) -> &Thumbprint {
        &self.thumbprint
    }

    /// The certificate.
    pub fn certificate(&self) -> &X509 {
        &self.certificate
    }

    /// Exports the certificate and key as a TLS client identity.
    pub fn identity(&self) -> Result<reqwest::Identity> {
        let certificate = self
            .certificate
            .to_pem()
            .foreign_err(|| Error::InvalidConfiguration("unusable client certificate".to_owned()))?;
        let private_key = self
            .private_key
            .private_key_to_pem_pkcs8()
            .foreign_err(|| Error::InvalidConfiguration("unusable private key".to_owned()))?;

        reqwest::Identity::from_pkcs8_pem(&certificate, &private_key)
            .foreign_err(|| Error::InvalidConfiguration("unusable TLS identity".to_owned()))
            .ctx(|| self.thumbprint.clone())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("thumbprint", &self.thumbprint)
            .finish_non_exhaustive()
    }
}

fn is_time_valid(certificate: &X509Ref, now: &Asn1TimeRef) -> std::result::Result<bool, ErrorStack> {
    Ok(certificate.not_before().compare(now)? != Ordering::Greater
        && certificate.not_after().compare(now)? != Ordering::Less)
}
