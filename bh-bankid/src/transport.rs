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

//! The HTTP layer of the client.
//!
//! Every BankID operation is a JSON `POST` to `{base_url}/{resource}`, authenticated with the RP
//! client certificate.  The [`Transport`] trait abstracts a single such call, returning the raw
//! status code and body; interpreting them is left to the [`BankIdClient`][crate::BankIdClient].

use std::future::Future;

use bh_uri_utils::UriPathExtensions as _;
use bherror::traits::{ErrorContext as _, ForeignError as _, PropagateError as _};
use openssl::x509::X509;
use reqwest::{
    header::{HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE},
    tls, Client, Url,
};
use serde::Serialize;

use crate::{Credential, Environment, Error, Result};

/// BankID does not limit the number of parallel connections, so neither does the client.
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 9999;

const APPLICATION_JSON: &str = "application/json";

/// The endpoints of the relying-party API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Resource {
    /// Starts an authentication order.
    #[strum(to_string = "auth")]
    Auth,
    /// Starts a signing order.
    #[strum(to_string = "sign")]
    Sign,
    /// Polls the state of an order.
    #[strum(to_string = "collect")]
    Collect,
    /// Cancels an ongoing order.
    #[strum(to_string = "cancel")]
    Cancel,
}

impl Resource {
    /// Path of the endpoint, relative to the environment base URL.
    pub fn path(&self) -> String {
        format!("/{self}")
    }
}

/// Status code and body of an HTTP response, as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl RawResponse {
    /// Whether the status code is in the `2xx` range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Interface for sending a single request to the BankID service.
///
/// Implementations must perform exactly one request per call and must not retry.  The body is
/// serialized as JSON; any status code, including `4xx` and `5xx`, is a successful result at this
/// level.  Only failing to send the request or to read the response is an error.
pub trait Transport: Sync {
    /// `POST`s `body` to the given `resource`.
    fn execute<B>(
        &self,
        resource: Resource,
        body: &B,
    ) -> impl Future<Output = Result<RawResponse>> + Send
    where
        B: Serialize + ?Sized;
}

/// [`Transport`] implementation using the [`reqwest`] crate.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Creates a transport for the given environment, authenticating with `credential`.
    ///
    /// The `trusted_roots` are trusted for the server certificate in addition to the system
    /// trust store.
    pub fn new(
        environment: Environment,
        credential: &Credential,
        trusted_roots: &[X509],
    ) -> Result<Self> {
        let mut builder = Client::builder()
            .use_native_tls()
            .identity(credential.identity()?)
            .min_tls_version(tls::Version::TLS_1_2)
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST);

        for root in trusted_roots {
            let der = root.to_der().foreign_err(|| {
                Error::InvalidConfiguration("unusable server root certificate".to_owned())
            })?;
            let certificate = reqwest::Certificate::from_der(&der).foreign_err(|| {
                Error::InvalidConfiguration("unusable server root certificate".to_owned())
            })?;

            builder = builder.add_root_certificate(certificate);
        }

        let client = builder.build().foreign_err(|| {
            Error::InvalidConfiguration("unable to build the HTTP client".to_owned())
        })?;

        Self::from_client(client, environment.base_url())
    }

    /// Creates a transport using an already configured [`Client`].
    pub fn from_client(client: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .foreign_err(|| Error::InvalidConfiguration(format!("invalid base URL {base_url}")))?;

        Ok(Self { client, base_url })
    }

    fn build_request<B>(&self, resource: Resource, body: &B) -> Result<reqwest::Request>
    where
        B: Serialize + ?Sized,
    {
        let url = self
            .base_url
            .clone()
            .add_path_suffix(&resource.path())
            .with_err(|| Error::InvalidConfiguration(format!("invalid base URL {}", self.base_url)))?;

        let body = serde_json::to_string(body)
            .foreign_err(|| Error::Transport)
            .ctx(|| format!("unable to serialize the {resource} request"))?;

        self.client
            .post(url)
            .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
            .header(ACCEPT, HeaderValue::from_static(APPLICATION_JSON))
            .header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
            .body(body)
            .build()
            .foreign_err(|| Error::Transport)
    }
}

impl Transport for HttpTransport {
    fn execute<B>(
        &self,
        resource: Resource,
        body: &B,
    ) -> impl Future<Output = Result<RawResponse>> + Send
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_request(resource, body);
        let client = self.client.clone();

        async move {
            let request = request?;
            log::debug!("Sending BankID request to {}", request.url());

            let response = client
                .execute(request)
                .await
                .foreign_err(|| Error::Transport)
                .ctx(|| resource)?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .foreign_err(|| Error::Transport)
                .ctx(|| resource)?;

            log::debug!("BankID {} responded with HTTP {}", resource, status);

            Ok(RawResponse { status, body })
        }
    }
}
