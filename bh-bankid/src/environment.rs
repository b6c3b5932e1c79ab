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

use serde::Deserialize;

const PRODUCTION_URL: &str = "https://appapi2.bankid.com/rp/v5";
const TEST_URL: &str = "https://appapi2.test.bankid.com/rp/v5";

/// The BankID environment the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// The production environment, which requires a production RP certificate.
    #[strum(to_string = "production")]
    Production,
    /// The public test environment.
    #[strum(to_string = "test")]
    Test,
}

impl Environment {
    /// Base URL of the relying-party API in this environment.
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_URL,
            Self::Test => TEST_URL,
        }
    }
}
