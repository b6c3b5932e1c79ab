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

use std::{fmt, net::SocketAddr};

use bh_bankid::UserMessage;
use bherror::adapters::axum::{IntoAxumResponse, StatusCode};

/// Failure of an API request, carrying the message for the end user.
///
/// Responded with HTTP 400 and the message text as the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiError(pub UserMessage);

impl ApiError {
    /// Invalid request parameters, shown like any other unclassified failure.
    pub fn invalid_request() -> Self {
        Self(UserMessage::Rfa22)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl bherror::BhError for ApiError {}

impl IntoAxumResponse for ApiError {
    fn http_status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

/// Failures that prevent the demo service from starting.
#[derive(strum_macros::Display, Debug)]
pub enum StartupError {
    #[strum(to_string = "Unable to read the configuration file {0}")]
    ReadConfig(String),
    #[strum(to_string = "Invalid configuration file {0}")]
    ParseConfig(String),
    #[strum(to_string = "Unable to create the BankID client")]
    Client,
    #[strum(to_string = "Unable to listen on {0}")]
    Bind(SocketAddr),
    #[strum(to_string = "The server failed")]
    Serve,
}

impl bherror::BhError for StartupError {}

/// Failures of the public IP address lookup.
#[derive(strum_macros::Display, Debug)]
pub enum PublicIpError {
    #[strum(to_string = "Unable to look up the public IP address at {0}")]
    Lookup(String),
    #[strum(to_string = "Invalid public IP address \"{0}\"")]
    InvalidAddress(String),
}

impl bherror::BhError for PublicIpError {}
