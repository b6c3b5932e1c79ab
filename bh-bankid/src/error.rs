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

use crate::credential::{SearchReport, Thumbprint};

/// Error type defining all failures of the BankID client.
///
/// The variants from [`Error::AlreadyInProgress`] to [`Error::Generic`] are raised after an
/// unsuccessful response of the BankID service, based on its `errorCode`.  None of the errors are
/// retried by the client.
#[derive(strum_macros::Display, Debug, PartialEq)]
pub enum Error {
    /// A required argument is missing or empty, or a size limit is exceeded.
    ///
    /// Raised locally, before any request is sent.
    #[strum(to_string = "Invalid input: {0}")]
    InvalidInput(String),

    /// An order for the same user is already in progress (`alreadyInProgress`).
    #[strum(to_string = "An order for this user is already in progress")]
    AlreadyInProgress,

    /// The BankID service timed out while processing the request (`requestTimeout`).
    #[strum(to_string = "The BankID service timed out")]
    RequestTimeout,

    /// The BankID service failed internally (`internalError`).
    #[strum(to_string = "The BankID service reported an internal error")]
    InternalError,

    /// The BankID service is under maintenance (`Maintenance`).
    #[strum(to_string = "The BankID service is under maintenance")]
    Maintenance,

    /// Any other error code returned by the BankID service, with its code and details.
    #[strum(to_string = "{0}: {1}")]
    Generic(String, String),

    /// The request could not be sent, or the response could not be read.
    #[strum(to_string = "Transport failure")]
    Transport,

    /// The response body does not have the expected shape.
    #[strum(to_string = "Invalid response from the BankID service")]
    InvalidResponse,

    /// The certificate thumbprint is not 40 hexadecimal characters.
    #[strum(to_string = "Invalid certificate thumbprint \"{0}\"")]
    InvalidThumbprint(String),

    /// A certificate source could not be read.
    #[strum(to_string = "Unable to load certificates from {0}")]
    CertificateSource(String),

    /// No time-valid certificate with the requested thumbprint was found.
    #[strum(to_string = "{0}")]
    CertificateNotFound(SearchReport),

    /// The certificate was found, but without the private key needed for the TLS handshake.
    #[strum(to_string = "Certificate {0} has no matching private key")]
    MissingPrivateKey(Thumbprint),

    /// The client configuration is unusable.
    #[strum(to_string = "Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl bherror::BhError for Error {}

/// Result type alias for the crate.
pub type Result<T> = bherror::Result<T, Error>;
