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

use bherror::traits::{ErrorContext as _, ForeignError as _};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    models::{AuthRequest, ErrorResponse, OrderRefRequest, SignRequest},
    AuthorizeResponse, CollectResponse, Credential, EncodingMode, Environment, Error,
    HttpTransport, RawResponse, Requirement, Resource, Result, Transport,
};

/// Maximum length of the encoded `userVisibleData`, in characters.
pub const MAX_USER_VISIBLE_DATA_LENGTH: usize = 40_000;

/// Maximum length of the encoded `userNonVisibleData`, in characters.
pub const MAX_USER_NON_VISIBLE_DATA_LENGTH: usize = 200_000;

// Error codes with a dedicated `Error` variant.
const ALREADY_IN_PROGRESS: &str = "alreadyInProgress";
const REQUEST_TIMEOUT: &str = "requestTimeout";
const INTERNAL_ERROR: &str = "internalError";
const MAINTENANCE: &str = "Maintenance";

/// Client for the BankID relying-party API.
///
/// The client holds no mutable state, so a single instance can serve any number of concurrent
/// orders.  Requests are never retried.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> bh_bankid::Result<()> {
/// use bh_bankid::{BankIdClient, CertificateStore, Credential, Environment, Thumbprint};
///
/// let thumbprint: Thumbprint = "3A0F5C9D1E2B4A6C8D0E1F2A3B4C5D6E7F809112".parse()?;
/// let stores = [CertificateStore::Pkcs12File {
///     path: "FPTestcert4_20230629.p12".into(),
///     password: "qwerty123".to_owned(),
/// }];
///
/// let credential = Credential::resolve(&thumbprint, &stores)?;
/// let client = BankIdClient::new(Environment::Test, &credential)?;
///
/// let order = client.authenticate("192.168.0.1", None, None).await?;
/// let collected = client.collect(&order.order_ref).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BankIdClient<T = HttpTransport> {
    transport: T,
}

impl BankIdClient<HttpTransport> {
    /// Creates a client for the given environment, authenticating with `credential`.
    pub fn new(environment: Environment, credential: &Credential) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(
            environment,
            credential,
            &[],
        )?))
    }
}

impl<T: Transport> BankIdClient<T> {
    /// Creates a client sending its requests through `transport`.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Starts an authentication order.
    ///
    /// `end_user_ip` is the IP address of the user agent, as seen by the RP.  Without
    /// `personal_number` the user is identified by scanning a QR code or using the autostart token.
    pub async fn authenticate(
        &self,
        end_user_ip: &str,
        personal_number: Option<&str>,
        requirement: Option<&Requirement>,
    ) -> Result<AuthorizeResponse> {
        let request = AuthRequest {
            end_user_ip: required("endUserIp", end_user_ip)?,
            personal_number: non_empty(personal_number),
            requirement,
        };

        self.post(Resource::Auth, &request).await
    }

    /// Starts a signing order.
    ///
    /// `user_visible_data` is shown to the user in the BankID app, and `user_non_visible_data` is
    /// only signed.  Both are encoded as told by `encoding`, and the encoded forms must not exceed
    /// [`MAX_USER_VISIBLE_DATA_LENGTH`] and [`MAX_USER_NON_VISIBLE_DATA_LENGTH`] respectively.
    pub async fn sign(
        &self,
        end_user_ip: &str,
        encoding: EncodingMode,
        user_visible_data: &str,
        user_non_visible_data: Option<&str>,
        personal_number: Option<&str>,
        requirement: Option<&Requirement>,
    ) -> Result<AuthorizeResponse> {
        let end_user_ip = required("endUserIp", end_user_ip)?;

        let user_visible_data =
            encoding.encode(required("userVisibleData", user_visible_data)?);
        check_length(
            "userVisibleData",
            &user_visible_data,
            MAX_USER_VISIBLE_DATA_LENGTH,
        )?;

        let user_non_visible_data =
            non_empty(user_non_visible_data).map(|data| encoding.encode(data));
        if let Some(data) = &user_non_visible_data {
            check_length("userNonVisibleData", data, MAX_USER_NON_VISIBLE_DATA_LENGTH)?;
        }

        let request = SignRequest {
            end_user_ip,
            user_visible_data: &user_visible_data,
            user_non_visible_data: user_non_visible_data.as_deref(),
            personal_number: non_empty(personal_number),
            requirement,
        };

        self.post(Resource::Sign, &request).await
    }

    /// Polls the state of an order.
    ///
    /// BankID recommends polling every two seconds, with at most one outstanding request per
    /// order.
    pub async fn collect(&self, order_ref: &str) -> Result<CollectResponse> {
        let request = OrderRefRequest {
            order_ref: required("orderRef", order_ref)?,
        };

        self.post(Resource::Collect, &request).await
    }

    /// Cancels an ongoing order.
    ///
    /// Returns `true` if the BankID service responded with HTTP 200.
    pub async fn cancel(&self, order_ref: &str) -> Result<bool> {
        let request = OrderRefRequest {
            order_ref: required("orderRef", order_ref)?,
        };

        let response = self.send(Resource::Cancel, &request).await?;

        Ok(response.status == 200)
    }

    async fn post<B, R>(&self, resource: Resource, body: &B) -> Result<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(resource, body).await?;

        serde_json::from_str(&response.body)
            .foreign_err(|| Error::InvalidResponse)
            .ctx(|| format!("HTTP {} from {}", response.status, resource))
    }

    async fn send<B>(&self, resource: Resource, body: &B) -> Result<RawResponse>
    where
        B: Serialize + Sync + ?Sized,
    {
        let response = self.transport.execute(resource, body).await?;

        check_response(resource, response)
    }
}

/// Turns an unsuccessful response carrying a BankID error code into the matching [`Error`].
///
/// Successful responses, and unsuccessful ones without an error code, are returned as is.
fn check_response(resource: Resource, response: RawResponse) -> Result<RawResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&response.body) else {
        return Ok(response);
    };

    let error = match error_response.error_code.as_str() {
        "" => return Ok(response),
        ALREADY_IN_PROGRESS => Error::AlreadyInProgress,
        REQUEST_TIMEOUT => Error::RequestTimeout,
        INTERNAL_ERROR => Error::InternalError,
        MAINTENANCE => Error::Maintenance,
        code => Error::Generic(code.to_owned(), error_response.details),
    };

    Err(bherror::Error::root(error).ctx(format!("HTTP {} from {}", response.status, resource)))
}

fn required<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(bherror::Error::root(Error::InvalidInput(format!(
            "`{name}` is required"
        ))));
    }

    Ok(value)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn check_length(name: &str, value: &str, max: usize) -> Result<()> {
    let length = value.chars().count();

    if length > max {
        return Err(bherror::Error::root(Error::InvalidInput(format!(
            "encoded `{name}` is {length} characters long, at most {max} are allowed"
        ))));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;
    use crate::{test_utils::RecordingTransport, CollectStatus};

    const ORDER_REF: &str = "131daac9-16c6-4618-beb0-365768f37288";

    fn client(status: u16, body: &str) -> BankIdClient<RecordingTransport> {
        BankIdClient::with_transport(RecordingTransport::new(status, body))
    }

    fn requests(client: &BankIdClient<RecordingTransport>) -> Vec<(Resource, serde_json::Value)> {
        client.transport.requests()
    }

    async fn sign_base64(
        client: &BankIdClient<RecordingTransport>,
        user_visible_data: &str,
        user_non_visible_data: Option<&str>,
    ) -> Result<AuthorizeResponse> {
        client
            .sign(
                "127.0.0.1",
                EncodingMode::Base64,
                user_visible_data,
                user_non_visible_data,
                None,
                None,
            )
            .await
    }

    #[tokio::test]
    async fn test_authenticate() {
        let client = client(200, r#"{"orderRef":"abc"}"#);

        let response = client.authenticate("127.0.0.1", None, None).await.unwrap();

        assert_eq!(response.order_ref, "abc");
        assert_eq!(response.auto_start_token, "");
        assert_eq!(
            requests(&client),
            vec![(Resource::Auth, json!({"endUserIp": "127.0.0.1"}))]
        );
    }

    #[tokio::test]
    async fn test_authenticate_with_personal_number_and_requirement() {
        let client = client(200, r#"{"orderRef":"abc"}"#);
        let requirement = Requirement {
            allow_fingerprint: Some(true),
            ..Default::default()
        };

        client
            .authenticate("192.168.0.1", Some("190000000000"), Some(&requirement))
            .await
            .unwrap();

        assert_eq!(
            requests(&client),
            vec![(
                Resource::Auth,
                json!({
                    "endUserIp": "192.168.0.1",
                    "personalNumber": "190000000000",
                    "requirement": {"allowFingerprint": true}
                })
            )]
        );
    }

    #[tokio::test]
    async fn test_empty_optional_arguments_are_omitted() {
        let client = client(200, r#"{"orderRef":"abc"}"#);

        client
            .authenticate("127.0.0.1", Some(""), None)
            .await
            .unwrap();
        client
            .sign(
                "127.0.0.1",
                EncodingMode::Base64,
                "VGV4dA==",
                Some(""),
                Some(""),
                None,
            )
            .await
            .unwrap();

        assert_eq!(
            requests(&client),
            vec![
                (Resource::Auth, json!({"endUserIp": "127.0.0.1"})),
                (
                    Resource::Sign,
                    json!({"endUserIp": "127.0.0.1", "userVisibleData": "VGV4dA=="})
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_required_arguments() {
        let client = client(200, r#"{"orderRef":"abc"}"#);

        let err = client.authenticate("", None, None).await.unwrap_err();
        assert_matches!(err.error, Error::InvalidInput(_));

        let err = client
            .sign("", EncodingMode::Plain, "Text", None, None, None)
            .await
            .unwrap_err();
        assert_matches!(err.error, Error::InvalidInput(_));

        let err = client
            .sign("127.0.0.1", EncodingMode::Plain, "", None, None, None)
            .await
            .unwrap_err();
        assert_matches!(err.error, Error::InvalidInput(_));

        let err = client.collect("").await.unwrap_err();
        assert_matches!(err.error, Error::InvalidInput(_));

        let err = client.cancel("").await.unwrap_err();
        assert_matches!(err.error, Error::InvalidInput(_));

        assert!(requests(&client).is_empty());
    }

    #[tokio::test]
    async fn test_sign_encodes_plain_text() {
        let client = client(200, r#"{"orderRef":"abc"}"#);

        client
            .sign(
                "127.0.0.1",
                EncodingMode::Plain,
                "Jag godkänner överföringen",
                Some("Hello, World!"),
                None,
                None,
            )
            .await
            .unwrap();

        assert_eq!(
            requests(&client),
            vec![(
                Resource::Sign,
                json!({
                    "endUserIp": "127.0.0.1",
                    "userVisibleData": "SmFnIGdvZGvDpG5uZXIgw7Z2ZXJmw7ZyaW5nZW4=",
                    "userNonVisibleData": "SGVsbG8sIFdvcmxkIQ=="
                })
            )]
        );
    }

    #[tokio::test]
    async fn test_sign_passes_base64_through() {
        let client = client(200, r#"{"orderRef":"abc"}"#);

        sign_base64(&client, "SGVsbG8sIFdvcmxkIQ==", Some("VGV4dA=="))
            .await
            .unwrap();

        assert_eq!(
            requests(&client)[0].1,
            json!({
                "endUserIp": "127.0.0.1",
                "userVisibleData": "SGVsbG8sIFdvcmxkIQ==",
                "userNonVisibleData": "VGV4dA=="
            })
        );
    }

    #[tokio::test]
    async fn test_sign_user_visible_data_limit() {
        let client = client(200, r#"{"orderRef":"abc"}"#);

        let longest = "A".repeat(MAX_USER_VISIBLE_DATA_LENGTH);
        sign_base64(&client, &longest, None).await.unwrap();

        let too_long = "A".repeat(MAX_USER_VISIBLE_DATA_LENGTH + 1);
        let err = sign_base64(&client, &too_long, None).await.unwrap_err();
        assert_matches!(err.error, Error::InvalidInput(_));

        assert_eq!(requests(&client).len(), 1);
    }

    #[tokio::test]
    async fn test_sign_user_non_visible_data_limit() {
        let client = client(200, r#"{"orderRef":"abc"}"#);

        let longest = "A".repeat(MAX_USER_NON_VISIBLE_DATA_LENGTH);
        sign_base64(&client, "VGV4dA==", Some(&longest))
            .await
            .unwrap();

        let too_long = "A".repeat(MAX_USER_NON_VISIBLE_DATA_LENGTH + 1);
        let err = sign_base64(&client, "VGV4dA==", Some(&too_long))
            .await
            .unwrap_err();
        assert_matches!(err.error, Error::InvalidInput(_));

        assert_eq!(requests(&client).len(), 1);
    }

    #[tokio::test]
    async fn test_sign_limit_applies_after_encoding() {
        let client = client(200, r#"{"orderRef":"abc"}"#);

        // 30 000 bytes encode to exactly 40 000 characters
        let longest = "a".repeat(30_000);
        client
            .sign("127.0.0.1", EncodingMode::Plain, &longest, None, None, None)
            .await
            .unwrap();

        let too_long = "a".repeat(30_001);
        let err = client
            .sign("127.0.0.1", EncodingMode::Plain, &too_long, None, None, None)
            .await
            .unwrap_err();
        assert_matches!(err.error, Error::InvalidInput(_));

        assert_eq!(requests(&client).len(), 1);
    }

    #[tokio::test]
    async fn test_sign_already_in_progress() {
        let client = client(400, r#"{"errorCode":"alreadyInProgress"}"#);

        let err = sign_base64(&client, "VGV4dA==", None).await.unwrap_err();

        assert_eq!(err.error, Error::AlreadyInProgress);
        assert_eq!(requests(&client).len(), 1);
    }

    #[tokio::test]
    async fn test_error_codes() {
        let cases = [
            (400, "alreadyInProgress", Error::AlreadyInProgress),
            (408, "requestTimeout", Error::RequestTimeout),
            (500, "internalError", Error::InternalError),
            (503, "Maintenance", Error::Maintenance),
            (
                400,
                "invalidParameters",
                Error::Generic("invalidParameters".to_owned(), "No such order".to_owned()),
            ),
            (
                503,
                "maintenance",
                Error::Generic("maintenance".to_owned(), "No such order".to_owned()),
            ),
        ];

        for (status, code, expected) in cases {
            let body = json!({"errorCode": code, "details": "No such order"}).to_string();
            let client = client(status, &body);

            let err = client.collect(ORDER_REF).await.unwrap_err();
            assert_eq!(err.error, expected, "{code}");

            let err = client.cancel(ORDER_REF).await.unwrap_err();
            assert_eq!(err.error, expected, "{code}");
        }
    }

    #[tokio::test]
    async fn test_generic_error_display() {
        let client = client(
            400,
            r#"{"errorCode":"invalidParameters","details":"Invalid endUserIp"}"#,
        );

        let err = client
            .authenticate("127.0.0.1", None, None)
            .await
            .unwrap_err();

        assert_eq!(err.error.to_string(), "invalidParameters: Invalid endUserIp");
    }

    #[tokio::test]
    async fn test_unsuccessful_response_without_error_code() {
        for body in ["{}", r#"{"errorCode":""}"#, "<html>Bad Gateway</html>", ""] {
            let client = client(502, body);

            let err = client
                .authenticate("127.0.0.1", None, None)
                .await
                .unwrap_err();
            assert_eq!(err.error, Error::InvalidResponse, "{body}");

            let err = client.collect(ORDER_REF).await.unwrap_err();
            assert_eq!(err.error, Error::InvalidResponse, "{body}");

            assert!(!client.cancel(ORDER_REF).await.unwrap(), "{body}");
        }
    }

    #[tokio::test]
    async fn test_cancel() {
        let client_ok = client(200, "{}");
        assert!(client_ok.cancel(ORDER_REF).await.unwrap());
        assert_eq!(
            requests(&client_ok),
            vec![(Resource::Cancel, json!({"orderRef": ORDER_REF}))]
        );

        let client_no_content = client(204, "");
        assert!(!client_no_content.cancel(ORDER_REF).await.unwrap());
    }

    #[tokio::test]
    async fn test_collect() {
        let body = json!({
            "orderRef": ORDER_REF,
            "status": "complete",
            "completionData": {
                "user": {
                    "personalNumber": "190000000000",
                    "name": "Karl Karlsson",
                    "givenName": "Karl",
                    "surname": "Karlsson"
                },
                "device": {"ipAddress": "192.168.0.1"},
                "signature": "PD94bWwgdmVyc2lvbj0iMS4wIj8+"
            }
        })
        .to_string();
        let client = client(200, &body);

        let response = client.collect(ORDER_REF).await.unwrap();

        assert_eq!(response.order_ref, ORDER_REF);
        assert_eq!(response.status, CollectStatus::Complete);
        let user = response.completion_data.unwrap().user.unwrap();
        assert_eq!(user.personal_number, "190000000000");
        assert_eq!(user.given_name, "Karl");

        assert_eq!(
            requests(&client),
            vec![(Resource::Collect, json!({"orderRef": ORDER_REF}))]
        );
    }

    #[tokio::test]
    async fn test_collect_pending() {
        let client = client(
            200,
            r#"{"orderRef":"abc","status":"pending","hintCode":"outstandingTransaction"}"#,
        );

        let response = client.collect("abc").await.unwrap();

        assert!(response.is_pending());
        assert_eq!(response.hint_code.as_deref(), Some("outstandingTransaction"));
        assert_eq!(response.completion_data, None);
    }

    #[test]
    fn test_client_new() {
        let credential = crate::test_utils::credential("rp");

        BankIdClient::new(Environment::Test, &credential).unwrap();
    }
}
