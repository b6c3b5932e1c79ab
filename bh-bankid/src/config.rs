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

use std::path::PathBuf;

use bherror::traits::{ErrorContext as _, ForeignError as _};
use openssl::x509::X509;
use serde::Deserialize;

use crate::{
    BankIdClient, CertificateStore, Credential, Environment, Error, HttpTransport, Result,
    Thumbprint,
};

/// Everything needed to construct a [`BankIdClient`] talking to the BankID service.
///
/// # Examples
///
/// ```
/// let config: bh_bankid::BankIdConfig = serde_json::from_str(r#"{
///     "environment": "test",
///     "certificate_thumbprint": "3a:0f:5c:9d:1e:2b:4a:6c:8d:0e:1f:2a:3b:4c:5d:6e:7f:80:91:12",
///     "certificate_stores": [
///         { "type": "pkcs12_file", "path": "FPTestcert4_20230629.p12", "password": "qwerty123" },
///         { "type": "directory", "path": "/etc/bankid/certs" }
///     ],
///     "server_root_certificates": ["/etc/bankid/test-root.pem"]
/// }"#).unwrap();
///
/// assert_eq!(config.environment, bh_bankid::Environment::Test);
/// assert_eq!(config.certificate_stores.len(), 2);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct BankIdConfig {
    /// The environment to connect to.
    pub environment: Environment,
    /// Thumbprint of the RP client certificate.
    pub certificate_thumbprint: Thumbprint,
    /// Where to search for the RP client certificate, in search order.
    pub certificate_stores: Vec<CertificateStore>,
    /// PEM files with additional roots to trust for the BankID server certificate.
    #[serde(default)]
    pub server_root_certificates: Vec<PathBuf>,
}

impl BankIdConfig {
    /// Reads the certificates listed in [`BankIdConfig::server_root_certificates`].
    pub fn load_server_roots(&self) -> Result<Vec<X509>> {
        let mut roots = Vec::new();

        for path in &self.server_root_certificates {
            let pem = std::fs::read(path)
                .foreign_err(|| Error::CertificateSource(path.display().to_string()))?;
            let certificates = X509::stack_from_pem(&pem)
                .foreign_err(|| Error::CertificateSource(path.display().to_string()))
                .ctx(|| "invalid PEM server root certificate")?;

            roots.extend(certificates);
        }

        Ok(roots)
    }
}

impl BankIdClient<HttpTransport> {
    /// Creates a client from its configuration, resolving the RP credential.
    ///
    /// Fails if the credential cannot be resolved, so a misconfigured client is detected at
    /// startup rather than on the first request.
    pub fn from_config(config: &BankIdConfig) -> Result<Self> {
        if config.certificate_stores.is_empty() {
            return Err(bherror::Error::root(Error::InvalidConfiguration(
                "no certificate stores are configured".to_owned(),
            )));
        }

        let credential =
            Credential::resolve(&config.certificate_thumbprint, &config.certificate_stores)?;
        let roots = config.load_server_roots()?;
        let transport = HttpTransport::new(config.environment, &credential, &roots)?;

        log::info!(
            "BankID client for the {} environment is ready",
            config.environment
        );

        Ok(Self::with_transport(transport))
    }
}
