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

use std::path::Path;

use bh_bankid::BankIdConfig;
use bherror::traits::ForeignError as _;
use serde::Deserialize;

use crate::{client_ip::DEFAULT_PUBLIC_IP_URL, error::StartupError};

/// Configuration file of the demo service, in TOML.
///
/// ```toml
/// public_ip_url = "https://api.ipify.org"
///
/// [bankid]
/// environment = "test"
/// certificate_thumbprint = "3A0F5C9D1E2B4A6C8D0E1F2A3B4C5D6E7F809112"
/// server_root_certificates = ["certs/test-root.pem"]
///
/// [[bankid.certificate_stores]]
/// type = "pkcs12_file"
/// path = "certs/FPTestcert4_20230629.p12"
/// password = "qwerty123"
/// ```
#[derive(Debug, Deserialize)]
pub struct DemoConfig {
    pub bankid: BankIdConfig,
    #[serde(default = "default_public_ip_url")]
    pub public_ip_url: String,
}

fn default_public_ip_url() -> String {
    DEFAULT_PUBLIC_IP_URL.to_owned()
}

impl DemoConfig {
    pub fn from_file(path: &Path) -> bherror::Result<Self, StartupError> {
        let content = std::fs::read_to_string(path)
            .foreign_err(|| StartupError::ReadConfig(path.display().to_string()))?;

        toml::from_str(&content)
            .foreign_err(|| StartupError::ParseConfig(path.display().to_string()))
    }
}
