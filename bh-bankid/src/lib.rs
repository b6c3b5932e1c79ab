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

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! A client for the [BankID][1] relying-party API, version 5.
//!
//! BankID is the Swedish electronic identification.  A relying party (RP) starts an
//! authentication or signing order, polls it with `collect` until it is complete or has failed,
//! and may cancel it in between.  All calls are JSON over HTTPS, authenticated with the RP client
//! certificate issued by BankID.
//!
//! [1]: <https://www.bankid.com/en/utvecklare/guider>
//!
//! # Details
//!
//! The entry point is the [`BankIdClient`], offering the four operations
//! [`authenticate`][BankIdClient::authenticate], [`sign`][BankIdClient::sign],
//! [`collect`][BankIdClient::collect] and [`cancel`][BankIdClient::cancel].  Its [`Credential`]
//! is resolved once, at construction, from an ordered list of [`CertificateSource`]s.
//!
//! Unsuccessful responses are mapped to [`Error`] variants based on their BankID error code.
//! Neither errors nor `collect` results should be shown to the end user directly; the
//! [`classify`] function and [`UserMessage::for_error`] turn them into one of the messages
//! recommended by BankID.
//!
//! The HTTP layer is abstracted by the [`Transport`] trait, with [`HttpTransport`] as the
//! [`reqwest`] based implementation.

mod client;
mod config;
mod credential;
mod encoding;
mod environment;
mod error;
mod messages;
mod models;
pub mod status;
mod transport;

#[cfg(test)]
mod test_utils;

pub use client::{BankIdClient, MAX_USER_NON_VISIBLE_DATA_LENGTH, MAX_USER_VISIBLE_DATA_LENGTH};
pub use config::BankIdConfig;
pub use credential::{
    CertificateSource, CertificateStore, Credential, SearchReport, StoredCertificate, Thumbprint,
};
pub use encoding::{encode_base64, EncodingMode};
pub use environment::Environment;
pub use error::{Error, Result};
pub use messages::{Language, UserMessage};
pub use models::{
    AuthorizeResponse, Cert, CollectResponse, CollectStatus, CompletionData, Device,
    ErrorResponse, Requirement, User,
};
pub use status::{classify, StatusType};
pub use transport::{HttpTransport, RawResponse, Resource, Transport};
